use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, REFERER, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::num::NonZeroU64;
use std::pin::Pin;
use std::time::Duration;
use tracing::debug;

use super::credential::Credential;
use super::error::ApiError;
use super::payloads::{
    ActionResponse, AmountRequest, CropStateEntry, PlotRequest, ProfileData, ProfileResponse,
};
use crate::types::PlotIndex;

/// Header carrying the Telegram init data
pub const AUTH_HEADER: &str = "x-window-telegram";

pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// Boundary the worker uses to talk to the game server.
///
/// `RemoteClient` is the real implementation; tests drive workers with a
/// scripted fake instead.
pub trait FarmApi: Send + Sync {
    fn login(&self) -> ApiFuture<'_, ()>;

    fn profile(&self) -> ApiFuture<'_, ProfileData>;

    fn crop_states(&self) -> ApiFuture<'_, Vec<CropStateEntry>>;

    fn plant(&self, plot: PlotIndex) -> ApiFuture<'_, ProfileData>;

    fn water(&self, plot: PlotIndex) -> ApiFuture<'_, ProfileData>;

    fn harvest(&self, plot: PlotIndex) -> ApiFuture<'_, ProfileData>;

    fn buy_seeds(&self, amount: NonZeroU64) -> ApiFuture<'_, ProfileData>;

    fn buy_water(&self, amount: NonZeroU64) -> ApiFuture<'_, ProfileData>;

    fn sell_wheat(&self, amount: NonZeroU64) -> ApiFuture<'_, ProfileData>;
}

impl<T: FarmApi + ?Sized> FarmApi for std::sync::Arc<T> {
    fn login(&self) -> ApiFuture<'_, ()> {
        (**self).login()
    }

    fn profile(&self) -> ApiFuture<'_, ProfileData> {
        (**self).profile()
    }

    fn crop_states(&self) -> ApiFuture<'_, Vec<CropStateEntry>> {
        (**self).crop_states()
    }

    fn plant(&self, plot: PlotIndex) -> ApiFuture<'_, ProfileData> {
        (**self).plant(plot)
    }

    fn water(&self, plot: PlotIndex) -> ApiFuture<'_, ProfileData> {
        (**self).water(plot)
    }

    fn harvest(&self, plot: PlotIndex) -> ApiFuture<'_, ProfileData> {
        (**self).harvest(plot)
    }

    fn buy_seeds(&self, amount: NonZeroU64) -> ApiFuture<'_, ProfileData> {
        (**self).buy_seeds(amount)
    }

    fn buy_water(&self, amount: NonZeroU64) -> ApiFuture<'_, ProfileData> {
        (**self).buy_water(amount)
    }

    fn sell_wheat(&self, amount: NonZeroU64) -> ApiFuture<'_, ProfileData> {
        (**self).sell_wheat(amount)
    }
}

/// Browser-like headers sent with every request. Built once from config and
/// cloned into each account's client.
#[derive(Debug, Clone)]
pub struct HeaderTemplate {
    pub accept: String,
    pub accept_language: String,
    pub referer: String,
    pub user_agent: String,
}

impl HeaderTemplate {
    fn to_header_map(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, header_value(&self.accept)?);
        headers.insert(ACCEPT_LANGUAGE, header_value(&self.accept_language)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(REFERER, header_value(&self.referer)?);
        headers.insert(USER_AGENT, header_value(&self.user_agent)?);
        Ok(headers)
    }
}

/// Settings shared by every account's client
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub timeout: Duration,
    pub headers: HeaderTemplate,
}

/// HTTP client for a single account
pub struct RemoteClient {
    http: reqwest::Client,
    base_url: String,
}

impl RemoteClient {
    /// Derive the auth header from the credential and build a dedicated
    /// client. Fails with `CredentialInvalid` when the credential does not parse.
    pub fn new(settings: &ClientSettings, credential: &Credential) -> Result<Self, ApiError> {
        let mut headers = settings.headers.to_header_map()?;
        let auth = credential.auth_header_value()?;
        let auth = HeaderValue::from_str(&auth)
            .map_err(|e| ApiError::CredentialInvalid(format!("unusable header value: {}", e)))?;
        headers.insert(HeaderName::from_static(AUTH_HEADER), auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| ApiError::Setup(e.to_string()))?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        endpoint_url(&self.base_url, path)
    }

    async fn send(
        &self,
        operation: &'static str,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::Response, ApiError> {
        let mut request = self.http.request(method, self.url(path));
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(operation, e))?;

        let status = response.status();
        debug!("{} -> HTTP {}", operation, status.as_u16());
        if !status.is_success() {
            return Err(ApiError::Status {
                operation,
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
    ) -> Result<T, ApiError> {
        let response = self.send(operation, Method::GET, path, None).await?;
        read_json(operation, response).await
    }

    async fn post_action<B: Serialize>(
        &self,
        operation: &'static str,
        path: &str,
        body: &B,
    ) -> Result<ProfileData, ApiError> {
        let body = serde_json::to_value(body).map_err(|e| ApiError::Malformed {
            operation,
            message: e.to_string(),
        })?;
        let response = self.send(operation, Method::POST, path, Some(body)).await?;
        let result: ActionResponse = read_json(operation, response).await?;
        if !result.is_success() {
            return Err(ApiError::Rejected {
                operation,
                status: result.status,
            });
        }
        Ok(result.user)
    }
}

impl FarmApi for RemoteClient {
    fn login(&self) -> ApiFuture<'_, ()> {
        Box::pin(async move {
            let response = self.send("login", Method::GET, endpoints::LOGIN, None).await?;
            if response.status() != StatusCode::OK {
                return Err(ApiError::Status {
                    operation: "login",
                    status: response.status().as_u16(),
                });
            }
            Ok(())
        })
    }

    fn profile(&self) -> ApiFuture<'_, ProfileData> {
        Box::pin(async move {
            let profile: ProfileResponse = self.get_json("profile", endpoints::PROFILE).await?;
            Ok(profile.data)
        })
    }

    fn crop_states(&self) -> ApiFuture<'_, Vec<CropStateEntry>> {
        Box::pin(async move { self.get_json("crop states", endpoints::CROP_STATES).await })
    }

    fn plant(&self, plot: PlotIndex) -> ApiFuture<'_, ProfileData> {
        Box::pin(async move {
            self.post_action("plant", endpoints::PLANT, &PlotRequest { plot_index: plot.get() })
                .await
        })
    }

    fn water(&self, plot: PlotIndex) -> ApiFuture<'_, ProfileData> {
        Box::pin(async move {
            self.post_action("water", endpoints::WATER, &PlotRequest { plot_index: plot.get() })
                .await
        })
    }

    fn harvest(&self, plot: PlotIndex) -> ApiFuture<'_, ProfileData> {
        Box::pin(async move {
            self.post_action("harvest", endpoints::HARVEST, &PlotRequest { plot_index: plot.get() })
                .await
        })
    }

    fn buy_seeds(&self, amount: NonZeroU64) -> ApiFuture<'_, ProfileData> {
        Box::pin(async move {
            self.post_action("buy-seeds", endpoints::BUY_SEEDS, &AmountRequest { amount: amount.get() })
                .await
        })
    }

    fn buy_water(&self, amount: NonZeroU64) -> ApiFuture<'_, ProfileData> {
        Box::pin(async move {
            self.post_action("buy-water", endpoints::BUY_WATER, &AmountRequest { amount: amount.get() })
                .await
        })
    }

    fn sell_wheat(&self, amount: NonZeroU64) -> ApiFuture<'_, ProfileData> {
        Box::pin(async move {
            self.post_action("sell-wheat", endpoints::SELL_WHEAT, &AmountRequest { amount: amount.get() })
                .await
        })
    }
}

/// Paths relative to the API base URL
pub mod endpoints {
    pub const LOGIN: &str = "/login?ref=undefined";
    pub const PROFILE: &str = "/user/me";
    pub const CROP_STATES: &str = "/crop/states";
    pub const PLANT: &str = "/crop/plant";
    pub const WATER: &str = "/crop/water";
    pub const HARVEST: &str = "/crop/harvest";
    pub const BUY_SEEDS: &str = "/market/buy-seeds";
    pub const BUY_WATER: &str = "/market/buy-water";
    pub const SELL_WHEAT: &str = "/market/sell-wheat";
}

fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

fn header_value(value: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(value)
        .map_err(|e| ApiError::Setup(format!("bad header value {:?}: {}", value, e)))
}

async fn read_json<T: DeserializeOwned>(
    operation: &'static str,
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ApiError::from_reqwest(operation, e))?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Malformed {
        operation,
        message: e.to_string(),
    })
}
