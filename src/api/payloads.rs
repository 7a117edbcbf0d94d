use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// `GET /user/me`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileResponse {
    #[serde(default)]
    pub data: ProfileData,
}

/// Economy counters. Every field is optional: the server only sends what it has.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProfileData {
    #[serde(default, deserialize_with = "counter")]
    pub coins: Option<u64>,
    #[serde(default, deserialize_with = "counter")]
    pub seeds: Option<u64>,
    #[serde(default, deserialize_with = "counter")]
    pub water: Option<u64>,
    #[serde(default, deserialize_with = "counter")]
    pub wheat: Option<u64>,
}

/// One element of `GET /crop/states`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CropStateEntry {
    #[serde(rename = "plotIndex", default, deserialize_with = "signed_index")]
    pub plot_index: Option<i64>,

    #[serde(default)]
    pub state: Option<String>,

    #[serde(rename = "timerRemaining", default, deserialize_with = "counter")]
    pub timer_remaining: Option<u64>,
}

/// Body returned by every POST action
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub user: ProfileData,
}

impl ActionResponse {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }
}

/// Request body for plot actions
#[derive(Debug, Clone, Serialize)]
pub struct PlotRequest {
    #[serde(rename = "plotIndex")]
    pub plot_index: usize,
}

/// Request body for market actions
#[derive(Debug, Clone, Serialize)]
pub struct AmountRequest {
    pub amount: u64,
}

/// Accept any JSON number (or `null`) for a non-negative counter. Fractions
/// are truncated and negatives clamp to zero; anything else is an error.
fn counter<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(v) = n.as_u64() {
                Ok(Some(v))
            } else if let Some(v) = n.as_i64() {
                Ok(Some(v.max(0) as u64))
            } else {
                let v = n.as_f64().unwrap_or(0.0);
                Ok(Some(if v.is_finite() && v > 0.0 { v.trunc() as u64 } else { 0 }))
            }
        }
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a number, got {}",
            other
        ))),
    }
}

fn signed_index<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_i64().or_else(|| {
            // Huge or fractional indices are never valid plots
            n.as_f64().filter(|v| v.fract() == 0.0 && v.abs() < 1e15).map(|v| v as i64)
        })),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a plot index, got {}",
            other
        ))),
    }
}
