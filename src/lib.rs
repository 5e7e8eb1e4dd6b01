#![doc(test(attr(deny(warnings))))]

//! Tabletop Ledger keeps the books for a tabletop role-playing character:
//! item stacks bought or found, their weight and price, gold earned and
//! spent, dice rolls, and combat turn order.

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Tabletop ledger tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
