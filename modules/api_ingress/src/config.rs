use anyhow::{ensure, Context};
use axum::http::HeaderName;
use serde::{Deserialize, Serialize};

/// Shared secret used when no api key is configured. Start-up warns about it.
pub const DEV_API_KEY: &str = "dev-api-key";

/// API ingress configuration (`modules.api_ingress`)
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ApiIngressConfig {
    /// Serve `/openapi.json` and `/docs`.
    #[serde(default = "default_true")]
    pub enable_docs: bool,
    #[serde(default)]
    pub cors_enabled: bool,
    #[serde(default = "default_body_limit_bytes")]
    pub body_limit_bytes: usize,
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Static shared-secret check applied to every request outside the bypass prefixes.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    #[serde(default = "default_header_name")]
    pub header_name: String,
    #[serde(default = "default_api_key")]
    pub api_key: String,
    /// Path prefixes served without the header (documentation and introspection).
    #[serde(default = "default_bypass_prefixes")]
    pub bypass_prefixes: Vec<String>,
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            enable_docs: true,
            cors_enabled: false,
            body_limit_bytes: default_body_limit_bytes(),
            auth: AuthConfig::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            header_name: default_header_name(),
            api_key: default_api_key(),
            bypass_prefixes: default_bypass_prefixes(),
        }
    }
}

impl ApiIngressConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.body_limit_bytes > 0, "body_limit_bytes must be positive");
        self.auth.validate()
    }
}

impl AuthConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        HeaderName::try_from(self.header_name.as_str())
            .with_context(|| format!("Invalid auth header name '{}'", self.header_name))?;
        ensure!(!self.api_key.trim().is_empty(), "auth.api_key must not be empty");
        for prefix in &self.bypass_prefixes {
            ensure!(
                prefix.starts_with('/'),
                "bypass prefix '{prefix}' must start with '/'"
            );
            // "/" would exempt every path from the key check.
            ensure!(
                !prefix.trim_end_matches('/').is_empty(),
                "bypass prefix '{prefix}' must name a path below '/'"
            );
        }
        Ok(())
    }

    pub fn uses_dev_key(&self) -> bool {
        self.api_key == DEV_API_KEY
    }
}

fn default_true() -> bool {
    true
}

fn default_body_limit_bytes() -> usize {
    16 * 1024 * 1024
}

fn default_header_name() -> String {
    "x-api-key".to_string()
}

fn default_api_key() -> String {
    DEV_API_KEY.to_string()
}

fn default_bypass_prefixes() -> Vec<String> {
    ["/docs", "/openapi.json", "/health"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_section_uses_defaults() {
        let cfg: ApiIngressConfig = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(cfg, ApiIngressConfig::default());
        assert_eq!(cfg.auth.header_name, "x-api-key");
        assert!(cfg.auth.uses_dev_key());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_auth_section_keeps_other_defaults() {
        let cfg: ApiIngressConfig = serde_json::from_value(serde_json::json!({
            "auth": { "api_key": "s3cret" }
        }))
        .unwrap();
        assert_eq!(cfg.auth.api_key, "s3cret");
        assert_eq!(cfg.auth.bypass_prefixes, default_bypass_prefixes());
        assert!(!cfg.auth.uses_dev_key());
    }

    #[test]
    fn rejects_unknown_keys() {
        let res: Result<ApiIngressConfig, _> =
            serde_json::from_value(serde_json::json!({ "bind_addr": "0.0.0.0:1" }));
        assert!(res.is_err());
    }

    #[test]
    fn validate_catches_bad_auth_settings() {
        let mut cfg = ApiIngressConfig::default();
        cfg.auth.api_key = "  ".into();
        assert!(cfg.validate().is_err());

        let mut cfg = ApiIngressConfig::default();
        cfg.auth.header_name = "bad header".into();
        assert!(cfg.validate().is_err());

        let mut cfg = ApiIngressConfig::default();
        cfg.auth.bypass_prefixes = vec!["docs".into()];
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn root_bypass_prefix_is_rejected() {
        for prefix in ["/", "//"] {
            let mut cfg = ApiIngressConfig::default();
            cfg.auth.bypass_prefixes = vec!["/docs".into(), prefix.into()];
            let err = cfg.validate().unwrap_err();
            assert!(err.to_string().contains("below '/'"), "{prefix}: {err}");
        }

        let mut cfg = ApiIngressConfig::default();
        cfg.auth.bypass_prefixes = vec!["/docs/".into()];
        assert!(cfg.validate().is_ok());
    }
}
