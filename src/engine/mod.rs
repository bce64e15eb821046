pub mod executor;
pub mod reconcile;
pub mod scheduler;
