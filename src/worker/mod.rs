pub mod account;
pub mod supervisor;

pub use account::{AccountWorker, ActionReport, CycleError, CycleOutcome, Timing};
pub use supervisor::{AccountSnapshot, Supervisor};
