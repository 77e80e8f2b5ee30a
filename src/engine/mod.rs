pub mod delivery;
pub mod orders;
pub mod wallet;
