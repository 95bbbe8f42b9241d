pub mod activity;
pub mod balance;
pub mod expense;
pub mod group;
pub mod log;
pub mod money;
pub mod settlement;
pub mod user;
