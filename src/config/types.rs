use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::api::{ClientSettings, HeaderTemplate};
use crate::worker::Timing;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_accounts_file")]
    pub accounts_file: PathBuf,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_settle_delay_secs")]
    pub settle_delay_secs: u64,

    #[serde(default = "default_cycle_pause_secs")]
    pub cycle_pause_secs: u64,

    #[serde(default = "default_error_pause_secs")]
    pub error_pause_secs: u64,

    #[serde(default = "default_status_interval_secs")]
    pub status_interval_secs: u64,

    #[serde(default)]
    pub headers: HeaderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderConfig {
    #[serde(default = "default_accept")]
    pub accept: String,

    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    #[serde(default = "default_referer")]
    pub referer: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

// Default values
fn default_base_url() -> String {
    "https://farmton.auto-crypto.click/api".to_string()
}

fn default_accounts_file() -> PathBuf {
    PathBuf::from("data.txt")
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_settle_delay_secs() -> u64 {
    30
}

fn default_cycle_pause_secs() -> u64 {
    1
}

fn default_error_pause_secs() -> u64 {
    5
}

fn default_status_interval_secs() -> u64 {
    2
}

fn default_accept() -> String {
    "application/json, text/plain, */*".to_string()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.9".to_string()
}

fn default_referer() -> String {
    "https://farmton.auto-crypto.click/".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            accept: default_accept(),
            accept_language: default_accept_language(),
            referer: default_referer(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            accounts_file: default_accounts_file(),
            request_timeout_secs: default_request_timeout_secs(),
            settle_delay_secs: default_settle_delay_secs(),
            cycle_pause_secs: default_cycle_pause_secs(),
            error_pause_secs: default_error_pause_secs(),
            status_interval_secs: default_status_interval_secs(),
            headers: HeaderConfig::default(),
        }
    }
}

impl Config {
    /// Settings every account's HTTP client is built from
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.base_url.clone(),
            // A zero timeout would fail every request immediately
            timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
            headers: HeaderTemplate {
                accept: self.headers.accept.clone(),
                accept_language: self.headers.accept_language.clone(),
                referer: self.headers.referer.clone(),
                user_agent: self.headers.user_agent.clone(),
            },
        }
    }

    pub fn timing(&self) -> Timing {
        Timing {
            settle_delay: Duration::from_secs(self.settle_delay_secs),
            cycle_pause: Duration::from_secs(self.cycle_pause_secs),
            error_pause: Duration::from_secs(self.error_pause_secs),
        }
    }

    pub fn status_interval(&self) -> Duration {
        Duration::from_secs(self.status_interval_secs.max(1))
    }
}
