// src/lib.rs — Library root for claimbot

pub mod api;
pub mod cli;
pub mod engine;
pub mod infra;
pub mod util;
