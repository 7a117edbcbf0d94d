/// Account credential handling
///
/// The game authenticates every request with the Telegram WebApp init data
/// the account was opened with. The raw string is a URL-encoded query
/// (`query_id=...&user=%7B...%7D&auth_date=...&signature=...&hash=...`); the
/// server wants it back both verbatim and parsed, bundled into one JSON
/// header value.

use serde::Serialize;
use serde_json::Value;

use super::error::ApiError;

/// Raw init data for one account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    raw: String,
}

/// Fields the server expects next to the raw init data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitDataUnsafe {
    pub query_id: String,
    pub user: Value,
    pub auth_date: String,
    pub signature: String,
    pub hash: String,
}

#[derive(Serialize)]
struct TelegramHeader<'a> {
    #[serde(rename = "initData")]
    init_data: &'a str,
    #[serde(rename = "initDataUnsafe")]
    init_data_unsafe: &'a InitDataUnsafe,
}

impl Credential {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into().trim().to_string() }
    }

    /// Decode the query string. Scalar fields default to empty strings like
    /// the web client does; `user` must be present and hold JSON.
    pub fn parse(&self) -> Result<InitDataUnsafe, ApiError> {
        if self.raw.is_empty() {
            return Err(ApiError::CredentialInvalid("empty credential".to_string()));
        }

        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(&self.raw)
            .map_err(|e| ApiError::CredentialInvalid(format!("not a query string: {}", e)))?;

        // First occurrence wins for repeated keys
        let field = |name: &str| {
            pairs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
        };

        let user_raw = field("user")
            .ok_or_else(|| ApiError::CredentialInvalid("missing user field".to_string()))?;
        let user: Value = serde_json::from_str(&user_raw)
            .map_err(|e| ApiError::CredentialInvalid(format!("user is not JSON: {}", e)))?;

        Ok(InitDataUnsafe {
            query_id: field("query_id").unwrap_or_default(),
            user,
            auth_date: field("auth_date").unwrap_or_default(),
            signature: field("signature").unwrap_or_default(),
            hash: field("hash").unwrap_or_default(),
        })
    }

    /// Build the `x-window-telegram` header value. Output is pure ASCII so it
    /// is always a legal header value.
    pub fn auth_header_value(&self) -> Result<String, ApiError> {
        let parsed = self.parse()?;
        let header = TelegramHeader {
            init_data: &self.raw,
            init_data_unsafe: &parsed,
        };
        let json = serde_json::to_string(&header)
            .map_err(|e| ApiError::CredentialInvalid(format!("cannot encode header: {}", e)))?;
        Ok(escape_non_ascii(&json))
    }
}

/// Replace every non-ASCII character with its `\uXXXX` JSON escape.
/// Only valid on text that is already JSON, where such characters can only
/// appear inside string literals.
fn escape_non_ascii(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for ch in json.chars() {
        if ch.is_ascii() {
            out.push(ch);
        } else {
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "query_id=AAH123&user=%7B%22id%22%3A42%2C%22first_name%22%3A%22Ana%22%7D&auth_date=1700000000&signature=sig&hash=abc";

    #[test]
    fn test_parse_credential() {
        let parsed = Credential::new(SAMPLE).parse().unwrap();
        assert_eq!(parsed.query_id, "AAH123");
        assert_eq!(parsed.user["id"], 42);
        assert_eq!(parsed.user["first_name"], "Ana");
        assert_eq!(parsed.auth_date, "1700000000");
        assert_eq!(parsed.signature, "sig");
        assert_eq!(parsed.hash, "abc");
    }

    #[test]
    fn test_missing_scalars_default_to_empty() {
        let parsed = Credential::new("user=%7B%22id%22%3A1%7D").parse().unwrap();
        assert_eq!(parsed.query_id, "");
        assert_eq!(parsed.hash, "");
    }

    #[test]
    fn test_invalid_credentials() {
        assert!(matches!(
            Credential::new("").parse(),
            Err(ApiError::CredentialInvalid(_))
        ));
        assert!(matches!(
            Credential::new("query_id=1&hash=x").parse(),
            Err(ApiError::CredentialInvalid(_))
        ));
        assert!(matches!(
            Credential::new("user=not-json").parse(),
            Err(ApiError::CredentialInvalid(_))
        ));
    }

    #[test]
    fn test_auth_header_value() {
        let header = Credential::new(SAMPLE).auth_header_value().unwrap();
        let value: Value = serde_json::from_str(&header).unwrap();
        assert_eq!(value["initData"], SAMPLE);
        assert_eq!(value["initDataUnsafe"]["user"]["id"], 42);
        assert_eq!(value["initDataUnsafe"]["query_id"], "AAH123");
    }

    #[test]
    fn test_auth_header_is_ascii() {
        // first_name = "Zoë 🌾"
        let raw = "user=%7B%22first_name%22%3A%22Zo%C3%AB%20%F0%9F%8C%BE%22%7D";
        let header = Credential::new(raw).auth_header_value().unwrap();
        assert!(header.is_ascii());
        assert!(header.contains("\\u00eb"));
        assert!(header.contains("\\ud83c\\udf3e"));

        let value: Value = serde_json::from_str(&header).unwrap();
        assert_eq!(value["initDataUnsafe"]["user"]["first_name"], "Zoë 🌾");
    }
}
