pub mod farm;
pub mod manager;

pub use farm::FarmState;
pub use manager::StateManager;
