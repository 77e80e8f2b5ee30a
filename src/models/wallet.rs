use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    /// Signed amount: positive credits, negative debits.
    pub amount: f64,
    pub memo: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub user_id: String,
    pub balance: f64,
    /// Most recent transactions, oldest first, capped with FIFO eviction.
    pub transactions: Vec<Transaction>,
}

impl Wallet {
    pub fn empty(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            balance: 0.0,
            transactions: Vec::new(),
        }
    }
}
