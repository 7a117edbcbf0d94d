pub mod loader;

pub use loader::{load_accounts, parse_accounts, AccountEntry};
