use tracing::debug;

use crate::{
    core::dice::{DiceExpr, DiceRoller},
    domain::DiceRoll,
    storage::LedgerStore,
};

use super::ServiceResult;

/// Rolls dice and keeps the roll history in the ledger.
pub struct RollService;

impl RollService {
    pub fn roll<S: LedgerStore + ?Sized>(
        store: &mut S,
        roller: &mut DiceRoller,
        expr: DiceExpr,
    ) -> ServiceResult<DiceRoll> {
        let roll = roller.roll(expr);
        debug!(expr = %expr, total = roll.total, "dice rolled");
        store.record_roll(roll)
    }

    /// Most recent rolls first, at most `limit` of them. Stores return rolls
    /// in recording order.
    pub fn history<S: LedgerStore + ?Sized>(
        store: &S,
        limit: usize,
    ) -> ServiceResult<Vec<DiceRoll>> {
        let mut rolls = store.rolls()?;
        rolls.reverse();
        rolls.truncate(limit);
        Ok(rolls)
    }
}
