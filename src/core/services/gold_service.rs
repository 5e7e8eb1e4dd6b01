use tracing::{debug, info};

use crate::{
    core::errors::LedgerError,
    domain::{Counter, MISC_SPENDING, TOTAL_EARNED},
    storage::{ItemQuery, LedgerStore},
};

use super::{checked, InventoryService, ServiceResult};

/// Snapshot of the gold books.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoldSummary {
    pub earned: i64,
    pub item_spending: f64,
    pub misc_spending: i64,
    pub balance: f64,
}

/// Lifetime earned/spent counters and the balance derived from them.
///
/// Selling a stack outright removes its cost from lifetime spending, which
/// credits its original price back to the balance. To record an in-game sale
/// at a different price, drop the stack and `earn` the proceeds instead.
pub struct GoldService;

impl GoldService {
    /// Creates both counters. Refuses to run when either one already exists.
    pub fn setup<S: LedgerStore + ?Sized>(store: &mut S, initial_gold: i64) -> ServiceResult<()> {
        if store.counter(TOTAL_EARNED)?.is_some() || store.counter(MISC_SPENDING)?.is_some() {
            return Err(LedgerError::AlreadySetup);
        }
        store.create_counter(Counter::new(
            TOTAL_EARNED,
            initial_gold,
            Some("Total number of GP you have ever had"),
        ))?;
        store.create_counter(Counter::new(
            MISC_SPENDING,
            0,
            Some("Number of GP lost to non-buying actions"),
        ))?;
        info!(initial_gold, "gold tracking set up");
        Ok(())
    }

    pub fn is_setup<S: LedgerStore + ?Sized>(store: &S) -> ServiceResult<bool> {
        Ok(store.counter(TOTAL_EARNED)?.is_some() && store.counter(MISC_SPENDING)?.is_some())
    }

    pub fn total_earned<S: LedgerStore + ?Sized>(store: &S) -> ServiceResult<i64> {
        Ok(Self::counter(store, TOTAL_EARNED)?.remaining())
    }

    /// Rewrites lifetime earnings to exactly `value`.
    pub fn set_total_earned<S: LedgerStore + ?Sized>(
        store: &mut S,
        value: i64,
    ) -> ServiceResult<i64> {
        let mut earned = Self::counter(store, TOTAL_EARNED)?;
        earned.consumed = checked(earned.initial.checked_sub(value), "total earned")?;
        earned.touch();
        store.save_counter(&earned)?;
        debug!(value, "total earned overwritten");
        Ok(earned.remaining())
    }

    /// Adds to lifetime earnings.
    pub fn earn<S: LedgerStore + ?Sized>(store: &mut S, amount: i64) -> ServiceResult<String> {
        if amount <= 0 {
            return Err(LedgerError::Validation(format!(
                "earned gold must be positive (got {})",
                amount
            )));
        }
        let mut earned = Self::counter(store, TOTAL_EARNED)?;
        earned.consumed = checked(earned.consumed.checked_sub(amount), "total earned")?;
        let total = checked(earned.initial.checked_sub(earned.consumed), "total earned")?;
        earned.touch();
        store.save_counter(&earned)?;
        debug!(amount, total, "gold earned");
        Ok(format!("added {} gold, {} earned in your career", amount, total))
    }

    /// Records gold spent on something other than an item. Negative amounts
    /// act as refunds.
    pub fn record_misc_spend<S: LedgerStore + ?Sized>(
        store: &mut S,
        amount: i64,
    ) -> ServiceResult<String> {
        let mut misc = Self::counter(store, MISC_SPENDING)?;
        misc.initial = checked(misc.initial.checked_add(amount), "misc spending")?;
        let total = checked(misc.initial.checked_sub(misc.consumed), "misc spending")?;
        misc.touch();
        store.save_counter(&misc)?;
        debug!(amount, total, "misc spending recorded");
        Ok(format!("you have spent {} extra in your career", total))
    }

    /// Item purchases plus miscellaneous spending.
    pub fn lifetime_spent<S: LedgerStore + ?Sized>(store: &S) -> ServiceResult<f64> {
        let items = InventoryService::total_spent(store, &ItemQuery::all())?;
        let misc = Self::counter(store, MISC_SPENDING)?;
        Ok(items + misc.initial as f64)
    }

    pub fn current_balance<S: LedgerStore + ?Sized>(store: &S) -> ServiceResult<f64> {
        Ok(Self::total_earned(store)? as f64 - Self::lifetime_spent(store)?)
    }

    pub fn summary<S: LedgerStore + ?Sized>(store: &S) -> ServiceResult<GoldSummary> {
        let earned = Self::total_earned(store)?;
        let item_spending = InventoryService::total_spent(store, &ItemQuery::all())?;
        let misc_spending = Self::counter(store, MISC_SPENDING)?.initial;
        Ok(GoldSummary {
            earned,
            item_spending,
            misc_spending,
            balance: earned as f64 - item_spending - misc_spending as f64,
        })
    }

    fn counter<S: LedgerStore + ?Sized>(store: &S, name: &str) -> ServiceResult<Counter> {
        store.counter(name)?.ok_or_else(|| {
            LedgerError::InvalidState(format!(
                "gold tracking is not set up (missing `{}`); run `gold setup` first",
                name
            ))
        })
    }
}
