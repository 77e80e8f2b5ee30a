use chrono::Utc;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::wallet::{Transaction, Wallet};
use crate::state::AppState;
use crate::store::keys;

/// Transaction history cap per wallet; oldest entries evicted first.
pub const TRANSACTION_HISTORY_CAP: usize = 100;

pub async fn wallet_for(state: &AppState, user_id: &str) -> Result<Wallet, AppError> {
    Ok(state
        .store
        .get(&keys::wallet(user_id))?
        .unwrap_or_else(|| Wallet::empty(user_id)))
}

/// Applies a signed amount to a wallet: positive credits, negative debits.
pub async fn apply(
    state: &AppState,
    user_id: &str,
    amount: f64,
    memo: &str,
) -> Result<Wallet, AppError> {
    let mut wallet = wallet_for(state, user_id).await?;

    wallet.balance += amount;
    wallet.transactions.push(Transaction {
        id: Uuid::new_v4(),
        amount,
        memo: memo.to_string(),
        at: Utc::now(),
    });

    if wallet.transactions.len() > TRANSACTION_HISTORY_CAP {
        let overflow = wallet.transactions.len() - TRANSACTION_HISTORY_CAP;
        wallet.transactions.drain(..overflow);
    }

    state.store.put(&keys::wallet(user_id), &wallet)?;
    Ok(wallet)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{TRANSACTION_HISTORY_CAP, apply, wallet_for};
    use crate::state::AppState;

    fn state() -> AppState {
        AppState::new(16, Duration::from_secs(0))
    }

    #[tokio::test]
    async fn balance_tracks_signed_amounts() {
        let state = state();

        apply(&state, "u1", 50.0, "credit").await.unwrap();
        apply(&state, "u1", -20.0, "debit").await.unwrap();

        let wallet = wallet_for(&state, "u1").await.unwrap();
        assert!((wallet.balance - 30.0).abs() < 1e-9);
        assert_eq!(wallet.transactions.len(), 2);
    }

    #[tokio::test]
    async fn unknown_wallet_is_empty() {
        let state = state();
        let wallet = wallet_for(&state, "nobody").await.unwrap();
        assert_eq!(wallet.balance, 0.0);
        assert!(wallet.transactions.is_empty());
    }

    #[tokio::test]
    async fn history_caps_with_fifo_eviction() {
        let state = state();

        for i in 0..(TRANSACTION_HISTORY_CAP + 5) {
            apply(&state, "u1", 1.0, &format!("tx {i}")).await.unwrap();
        }

        let wallet = wallet_for(&state, "u1").await.unwrap();
        assert_eq!(wallet.transactions.len(), TRANSACTION_HISTORY_CAP);
        // Oldest five evicted; the first surviving entry is tx 5.
        assert_eq!(wallet.transactions[0].memo, "tx 5");
        assert!(
            (wallet.balance - (TRANSACTION_HISTORY_CAP + 5) as f64).abs() < 1e-9,
            "balance keeps counting past the history cap"
        );
    }
}
