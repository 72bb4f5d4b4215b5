//! Token ledger for the platform's CLIMATE unit of account.
//!
//! Balances are non-negative by construction: every mutation goes through
//! [`TokenLedger`], which checks funds before applying and appends a signed
//! [`Transaction`] record for each balance change. Amounts and balances are
//! capped at `i64::MAX` so every movement fits the signed record and the
//! balance always equals the sum of its account's signed amounts.

mod models;
mod store;

pub use models::{AccountId, AccountSnapshot, Amount, Transaction, TxCategory};
pub use store::TokenLedger;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("insufficient funds in account {account}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        account: AccountId,
        balance: Amount,
        requested: Amount,
    },
    #[error("unknown account {account}")]
    AccountNotFound { account: AccountId },
    #[error("amount must be greater than zero")]
    ZeroAmount,
    #[error("amount {amount} exceeds the maximum recordable amount")]
    AmountTooLarge { amount: Amount },
    #[error("crediting account {account} would overflow its balance")]
    BalanceOverflow { account: AccountId },
    #[error("transfer source and destination must differ")]
    SelfTransfer,
}
