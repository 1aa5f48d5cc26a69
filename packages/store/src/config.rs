//! # Client configuration (`chama.toml`)
//!
//! Everything the client needs to reach the backend: the canister gateway, the
//! canister IDs of each domain, the identity provider, and the retry budget used
//! while the backend catches up after a login.
//!
//! ## Structure
//!
//! ```toml
//! [gateway]
//! url = "http://localhost:4943"
//!
//! [canisters]
//! user_management = "ulvla-h7777-77774-qaacq-cai"
//! chama_management = "ryjl3-tyaaa-aaaaa-aaaba-cai"
//! financial_operations = "rdmx6-jaaaa-aaaaa-aaadq-cai"
//! ai_chatbot = "be2us-64aaa-aaaaa-qaabq-cai"   # optional
//!
//! [identity]
//! provider_url = "http://127.0.0.1:4943/?canisterId=rdmx6-jaaaa-aaaaa-aaadq-cai"
//! callback_path = "/auth/callback"
//!
//! [retry]
//! profile_attempts = 3
//! profile_delay_ms = 1000
//! ```
//!
//! All sections derive defaults suitable for a local replica, so a missing or empty
//! file is equivalent to [`ClientConfig::default`]. A web build has no filesystem, so
//! [`ClientConfig::from_build_env`] layers `CHAMA_*` variables captured at compile time
//! on top of the defaults.

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialise configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("{0} is not configured")]
    Missing(&'static str),
}

/// Top-level client configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub canisters: CanisterIds,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_url")]
    pub url: String,
}

fn default_gateway_url() -> String {
    "http://localhost:4943".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: default_gateway_url(),
        }
    }
}

/// Canister IDs of the backend services.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanisterIds {
    #[serde(default = "default_user_canister")]
    pub user_management: String,
    #[serde(default = "default_chama_canister")]
    pub chama_management: String,
    #[serde(default = "default_financial_canister")]
    pub financial_operations: String,
    /// The chat assistant is optional; without it the chat widget reports itself unavailable.
    #[serde(default)]
    pub ai_chatbot: Option<String>,
}

fn default_user_canister() -> String {
    "ulvla-h7777-77774-qaacq-cai".to_string()
}

fn default_chama_canister() -> String {
    "ryjl3-tyaaa-aaaaa-aaaba-cai".to_string()
}

fn default_financial_canister() -> String {
    "rdmx6-jaaaa-aaaaa-aaadq-cai".to_string()
}

impl Default for CanisterIds {
    fn default() -> Self {
        Self {
            user_management: default_user_canister(),
            chama_management: default_chama_canister(),
            financial_operations: default_financial_canister(),
            ai_chatbot: None,
        }
    }
}

impl CanisterIds {
    pub fn ai_chatbot(&self) -> Result<&str, ConfigError> {
        self.ai_chatbot
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(ConfigError::Missing("AI chatbot canister ID"))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Where the browser is sent to authenticate.
    #[serde(default = "default_provider_url")]
    pub provider_url: String,
    /// Route the provider redirects back to with the delegation in the query string.
    #[serde(default = "default_callback_path")]
    pub callback_path: String,
}

fn default_provider_url() -> String {
    "http://127.0.0.1:4943/?canisterId=rdmx6-jaaaa-aaaaa-aaadq-cai".to_string()
}

fn default_callback_path() -> String {
    "/auth/callback".to_string()
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            provider_url: default_provider_url(),
            callback_path: default_callback_path(),
        }
    }
}

/// Retry budget for reading the profile right after login.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_profile_attempts")]
    pub profile_attempts: u32,
    #[serde(default = "default_profile_delay_ms")]
    pub profile_delay_ms: u64,
}

fn default_profile_attempts() -> u32 {
    3
}

fn default_profile_delay_ms() -> u64 {
    1000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            profile_attempts: default_profile_attempts(),
            profile_delay_ms: default_profile_delay_ms(),
        }
    }
}

impl ClientConfig {
    /// The well-known filename for the config file.
    pub fn filename() -> &'static str {
        "chama.toml"
    }

    /// Parse from TOML string.
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Serialize to TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Defaults overridden by `CHAMA_*` variables present when the crate was compiled.
    pub fn from_build_env() -> Self {
        Self::default().with_overrides(|key| match key {
            "CHAMA_GATEWAY_URL" => option_env!("CHAMA_GATEWAY_URL"),
            "CHAMA_IDENTITY_URL" => option_env!("CHAMA_IDENTITY_URL"),
            "CHAMA_USER_CANISTER_ID" => option_env!("CHAMA_USER_CANISTER_ID"),
            "CHAMA_CHAMA_CANISTER_ID" => option_env!("CHAMA_CHAMA_CANISTER_ID"),
            "CHAMA_FINANCIAL_CANISTER_ID" => option_env!("CHAMA_FINANCIAL_CANISTER_ID"),
            "CHAMA_CHATBOT_CANISTER_ID" => option_env!("CHAMA_CHATBOT_CANISTER_ID"),
            _ => None,
        })
    }

    /// Apply overrides from a variable lookup. Empty values are ignored.
    pub fn with_overrides<'a>(mut self, lookup: impl Fn(&str) -> Option<&'a str>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty()).map(str::to_string);

        if let Some(url) = get("CHAMA_GATEWAY_URL") {
            self.gateway.url = url;
        }
        if let Some(url) = get("CHAMA_IDENTITY_URL") {
            self.identity.provider_url = url;
        }
        if let Some(id) = get("CHAMA_USER_CANISTER_ID") {
            self.canisters.user_management = id;
        }
        if let Some(id) = get("CHAMA_CHAMA_CANISTER_ID") {
            self.canisters.chama_management = id;
        }
        if let Some(id) = get("CHAMA_FINANCIAL_CANISTER_ID") {
            self.canisters.financial_operations = id;
        }
        if let Some(id) = get("CHAMA_CHATBOT_CANISTER_ID") {
            self.canisters.ai_chatbot = Some(id);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_is_default() {
        let config = ClientConfig::from_toml("").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.retry.profile_attempts, 3);
        assert_eq!(config.retry.profile_delay_ms, 1000);
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = ClientConfig::from_toml(
            r#"
            [gateway]
            url = "https://icp0.io"

            [retry]
            profile_attempts = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.gateway.url, "https://icp0.io");
        assert_eq!(config.retry.profile_attempts, 5);
        assert_eq!(config.retry.profile_delay_ms, 1000);
        assert_eq!(config.canisters, CanisterIds::default());
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = ClientConfig::default();
        config.canisters.ai_chatbot = Some("be2us-64aaa-aaaaa-qaabq-cai".to_string());
        let text = config.to_toml().unwrap();
        assert_eq!(ClientConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_chatbot_id_required_when_used() {
        let config = ClientConfig::default();
        assert!(matches!(
            config.canisters.ai_chatbot(),
            Err(ConfigError::Missing(_))
        ));

        let mut config = ClientConfig::default();
        config.canisters.ai_chatbot = Some(String::new());
        assert!(config.canisters.ai_chatbot().is_err());
    }

    #[test]
    fn test_overrides_skip_empty_values() {
        let config = ClientConfig::default().with_overrides(|key| match key {
            "CHAMA_GATEWAY_URL" => Some("https://icp0.io"),
            "CHAMA_USER_CANISTER_ID" => Some(""),
            "CHAMA_CHATBOT_CANISTER_ID" => Some("chat-id"),
            _ => None,
        });

        assert_eq!(config.gateway.url, "https://icp0.io");
        assert_eq!(config.canisters.user_management, default_user_canister());
        assert_eq!(config.canisters.ai_chatbot().unwrap(), "chat-id");
    }
}
