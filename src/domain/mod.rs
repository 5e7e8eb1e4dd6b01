pub mod combat;
pub mod common;
pub mod counter;
pub mod inventory;
pub mod item;
pub mod roll;

pub use combat::{CombatActor, CombatPhase};
pub use common::{Displayable, Identifiable, NamedEntity};
pub use counter::{Counter, MISC_SPENDING, TOTAL_EARNED};
pub use inventory::{Inventory, CURRENT_SCHEMA_VERSION};
pub use item::{ItemAttributes, ItemId, ItemStack, NewItem};
pub use roll::DiceRoll;
