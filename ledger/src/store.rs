use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::{AccountId, AccountSnapshot, Amount, Transaction, TxCategory};
use crate::LedgerError;

#[derive(Debug, Clone)]
pub struct TokenLedger {
    state: Arc<RwLock<LedgerState>>,
}

#[derive(Debug, Default)]
struct LedgerState {
    balances: HashMap<AccountId, Amount>,
    transactions: Vec<Transaction>,
}

impl LedgerState {
    fn record(
        &mut self,
        account: &str,
        amount: i64,
        category: TxCategory,
        description: Option<String>,
    ) -> Transaction {
        let tx = Transaction {
            tx_id: Uuid::new_v4().to_string(),
            account: account.to_string(),
            amount,
            category,
            description,
            recorded_at: Utc::now(),
        };
        self.transactions.push(tx.clone());
        tx
    }
}

/// Amounts above this cannot be recorded as a signed transaction.
const MAX_AMOUNT: Amount = i64::MAX as u64;

fn check_amount(amount: Amount) -> Result<(), LedgerError> {
    if amount == 0 {
        return Err(LedgerError::ZeroAmount);
    }
    if amount > MAX_AMOUNT {
        return Err(LedgerError::AmountTooLarge { amount });
    }
    Ok(())
}

fn checked_balance(current: Amount, amount: Amount, account: &str) -> Result<Amount, LedgerError> {
    current
        .checked_add(amount)
        .filter(|updated| *updated <= MAX_AMOUNT)
        .ok_or_else(|| LedgerError::BalanceOverflow {
            account: account.to_string(),
        })
}

impl Default for TokenLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenLedger {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(LedgerState::default())),
        }
    }

    /// Credit an account, creating it on first use.
    pub async fn credit(
        &self,
        account: &str,
        amount: Amount,
        category: TxCategory,
        description: Option<String>,
    ) -> Result<Transaction, LedgerError> {
        check_amount(amount)?;
        let mut guard = self.state.write().await;
        let current = guard.balances.get(account).copied().unwrap_or(0);
        let updated = checked_balance(current, amount, account)?;
        guard.balances.insert(account.to_string(), updated);
        debug!(%account, amount, balance = updated, "credited account");
        Ok(guard.record(account, amount as i64, category, description))
    }

    /// Debit an existing account. Fails without mutating when funds are short.
    pub async fn debit(
        &self,
        account: &str,
        amount: Amount,
        category: TxCategory,
        description: Option<String>,
    ) -> Result<Transaction, LedgerError> {
        check_amount(amount)?;
        let mut guard = self.state.write().await;
        let balance = guard
            .balances
            .get_mut(account)
            .ok_or_else(|| LedgerError::AccountNotFound {
                account: account.to_string(),
            })?;
        if *balance < amount {
            return Err(LedgerError::InsufficientFunds {
                account: account.to_string(),
                balance: *balance,
                requested: amount,
            });
        }
        *balance -= amount;
        debug!(%account, amount, balance = *balance, "debited account");
        Ok(guard.record(account, -(amount as i64), category, description))
    }

    /// Move `amount` from one account to another as a single unit: both legs
    /// apply under one write guard, or neither does.
    pub async fn transfer(
        &self,
        from: &str,
        to: &str,
        amount: Amount,
    ) -> Result<(Transaction, Transaction), LedgerError> {
        check_amount(amount)?;
        if from == to {
            return Err(LedgerError::SelfTransfer);
        }
        let mut guard = self.state.write().await;
        let source = *guard
            .balances
            .get(from)
            .ok_or_else(|| LedgerError::AccountNotFound {
                account: from.to_string(),
            })?;
        if source < amount {
            return Err(LedgerError::InsufficientFunds {
                account: from.to_string(),
                balance: source,
                requested: amount,
            });
        }
        let dest = guard.balances.get(to).copied().unwrap_or(0);
        let dest_updated = checked_balance(dest, amount, to)?;
        guard.balances.insert(from.to_string(), source - amount);
        guard.balances.insert(to.to_string(), dest_updated);
        debug!(%from, %to, amount, "transferred tokens");
        let memo = format!("transfer {} -> {}", from, to);
        let debit = guard.record(
            from,
            -(amount as i64),
            TxCategory::Transfer,
            Some(memo.clone()),
        );
        let credit = guard.record(to, amount as i64, TxCategory::Transfer, Some(memo));
        Ok((debit, credit))
    }

    /// Credit every listed account the same amount in one locked batch.
    pub async fn airdrop(
        &self,
        accounts: &[AccountId],
        amount_each: Amount,
        description: Option<String>,
    ) -> Result<Vec<Transaction>, LedgerError> {
        check_amount(amount_each)?;
        let mut guard = self.state.write().await;
        // Validate the whole batch before touching any balance; a repeated
        // recipient is credited once per listing.
        let mut prospective: HashMap<AccountId, Amount> = HashMap::new();
        for account in accounts {
            let current = prospective
                .get(account)
                .copied()
                .unwrap_or_else(|| guard.balances.get(account).copied().unwrap_or(0));
            let updated = checked_balance(current, amount_each, account)?;
            prospective.insert(account.clone(), updated);
        }
        let mut recorded = Vec::with_capacity(accounts.len());
        for account in accounts {
            let balance = guard.balances.entry(account.clone()).or_insert(0);
            *balance += amount_each;
            recorded.push(guard.record(
                account,
                amount_each as i64,
                TxCategory::Airdrop,
                description.clone(),
            ));
        }
        debug!(
            recipients = accounts.len(),
            amount_each, "airdrop distributed"
        );
        Ok(recorded)
    }

    pub async fn balance(&self, account: &str) -> Result<Amount, LedgerError> {
        let guard = self.state.read().await;
        guard
            .balances
            .get(account)
            .copied()
            .ok_or_else(|| LedgerError::AccountNotFound {
                account: account.to_string(),
            })
    }

    /// Transactions touching `account`, newest first.
    pub async fn transactions(&self, account: &str) -> Vec<Transaction> {
        let guard = self.state.read().await;
        let mut txs: Vec<Transaction> = guard
            .transactions
            .iter()
            .filter(|tx| tx.account == account)
            .cloned()
            .collect();
        txs.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        txs
    }

    pub async fn accounts(&self) -> Vec<AccountSnapshot> {
        let guard = self.state.read().await;
        let mut snapshots: Vec<AccountSnapshot> = guard
            .balances
            .iter()
            .map(|(account, balance)| AccountSnapshot {
                account: account.clone(),
                balance: *balance,
            })
            .collect();
        snapshots.sort_by(|a, b| a.account.cmp(&b.account));
        snapshots
    }

    pub async fn total_supply(&self) -> Amount {
        let guard = self.state.read().await;
        guard.balances.values().sum()
    }
}
