pub mod delivery;
pub mod identity;
pub mod order;
pub mod wallet;
