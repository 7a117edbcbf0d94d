pub mod loader;
pub mod types;

pub use loader::{executable_dir, ConfigLoader};
pub use types::{Config, HeaderConfig};
