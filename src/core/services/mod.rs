pub mod gold_service;
pub mod inventory_service;
pub mod item_service;
pub mod roll_service;

pub use gold_service::{GoldService, GoldSummary};
pub use inventory_service::{format_amount, InventoryService, ItemRow, StatusTag};
pub use item_service::{GainTarget, ItemService};
pub use roll_service::RollService;

pub type ServiceResult<T> = crate::core::errors::Result<T>;

/// Turns a failed checked operation into a validation error.
pub(crate) fn checked(value: Option<i64>, what: &str) -> ServiceResult<i64> {
    value.ok_or_else(|| {
        crate::core::errors::LedgerError::Validation(format!("{} is out of range", what))
    })
}
