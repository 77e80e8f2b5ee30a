//! Key layout for the store. Index lists under `orders:*` are redundant
//! copies of the canonical `order:{id}` record and must be rewritten on
//! every order mutation.

use std::fmt::Display;

pub const PENDING_REQUESTS: &str = "delivery:requests:pending";

pub fn order(id: impl Display) -> String {
    format!("order:{id}")
}

pub fn consumer_orders(consumer_id: impl Display) -> String {
    format!("orders:consumer:{consumer_id}")
}

pub fn farmer_orders(farmer_id: impl Display) -> String {
    format!("orders:farmer:{farmer_id}")
}

pub fn active_deliveries(driver_id: impl Display) -> String {
    format!("delivery:active:{driver_id}")
}

pub fn wallet(user_id: impl Display) -> String {
    format!("wallet:{user_id}")
}
