pub mod api;
pub mod auth;
pub mod config;
pub mod constants;
pub mod core;
pub mod infrastructure;

pub use crate::core::errors::TallyError;
pub use crate::core::services::TallyService;

#[cfg(test)]
mod tests;
