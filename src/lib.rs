//! Farmton Bot
//!
//! Unattended farming for the Farmton web game. Every account gets its own
//! worker task that logs in, reads the farm, harvests, waters, plants, buys
//! what it needs and sells the wheat, over and over.

pub mod accounts;
pub mod api;
pub mod config;
pub mod display;
pub mod handlers;
pub mod logging;
pub mod state;
pub mod types;
pub mod worker;

#[cfg(test)]
pub(crate) mod test_support;

pub use api::{ApiError, Credential, FarmApi, RemoteClient};
pub use state::{FarmState, StateManager};
pub use types::{AccountStatus, Action, Plot, PlotIndex, PlotState};
pub use worker::{AccountWorker, Supervisor, Timing};
