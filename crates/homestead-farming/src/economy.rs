//! Economy collaborator consulted when buying new land.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Economy error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EconomyError {
    /// Insufficient funds
    #[error("Insufficient funds: need {needed}, have {have}")]
    InsufficientFunds {
        /// Amount needed
        needed: u64,
        /// Amount available
        have: u64,
    },
}

/// Result type for economy operations.
pub type EconomyResult<T> = Result<T, EconomyError>;

/// Funds source the farm charges for expansion.
///
/// The farm only asks and spends; balances are the implementor's concern.
pub trait Economy {
    /// Check whether `amount` can be paid.
    fn has_funds(&self, amount: u64) -> bool;

    /// Pay `amount`.
    fn spend(&mut self, amount: u64) -> EconomyResult<()>;
}

/// A simple gold wallet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    /// Gold balance
    gold: u64,
}

impl Wallet {
    /// Creates a wallet holding `initial_gold`.
    #[must_use]
    pub const fn new(initial_gold: u64) -> Self {
        Self { gold: initial_gold }
    }

    /// Returns the gold balance.
    #[must_use]
    pub const fn balance(&self) -> u64 {
        self.gold
    }

    /// Adds gold to the wallet.
    pub fn earn(&mut self, amount: u64) {
        self.gold = self.gold.saturating_add(amount);
    }
}

impl Economy for Wallet {
    fn has_funds(&self, amount: u64) -> bool {
        self.gold >= amount
    }

    fn spend(&mut self, amount: u64) -> EconomyResult<()> {
        if self.gold < amount {
            return Err(EconomyError::InsufficientFunds {
                needed: amount,
                have: self.gold,
            });
        }
        self.gold -= amount;
        Ok(())
    }
}
