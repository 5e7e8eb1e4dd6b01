use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{Displayable, Identifiable};

/// A recorded dice roll such as `3d6`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiceRoll {
    pub id: Uuid,
    #[serde(default = "DiceRoll::default_num_rolled")]
    pub num_rolled: u32,
    #[serde(default = "DiceRoll::default_sides")]
    pub sides: u32,
    #[serde(default)]
    pub faces: Vec<u32>,
    pub total: u32,
    pub created_at: DateTime<Utc>,
}

impl DiceRoll {
    pub fn new(num_rolled: u32, sides: u32, faces: Vec<u32>) -> Self {
        let total = faces.iter().sum();
        Self {
            id: Uuid::new_v4(),
            num_rolled,
            sides,
            faces,
            total,
            created_at: Utc::now(),
        }
    }

    pub fn expression(&self) -> String {
        format!("{}d{}", self.num_rolled, self.sides)
    }

    fn default_num_rolled() -> u32 {
        1
    }

    fn default_sides() -> u32 {
        20
    }
}

impl Identifiable for DiceRoll {
    type Id = Uuid;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for DiceRoll {
    fn display_label(&self) -> String {
        if self.faces.len() > 1 {
            let faces: Vec<String> = self.faces.iter().map(u32::to_string).collect();
            format!("{} = {} ({})", self.expression(), self.total, faces.join(" + "))
        } else {
            format!("{} = {}", self.expression(), self.total)
        }
    }
}
