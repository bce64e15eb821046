pub mod accounts;
pub mod config;
pub mod errors;
pub mod logger;
