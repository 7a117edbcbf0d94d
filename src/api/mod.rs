pub mod client;
pub mod credential;
pub mod error;
pub mod payloads;

pub use client::{ApiFuture, ClientSettings, FarmApi, HeaderTemplate, RemoteClient};
pub use credential::Credential;
pub use error::{ApiError, ErrorKind};
pub use payloads::{CropStateEntry, ProfileData};
