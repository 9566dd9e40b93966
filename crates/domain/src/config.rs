//! Client configuration
//!
//! [`RawConfig`] is what users write (file, environment, code); every field is
//! optional. [`Configuration`] is the validated, immutable result with
//! defaults applied. Validation failures name the offending option.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_TIMEOUT_SECS, DEFAULT_API_URL, MAX_NAME_PART_LENGTH, USER_AGENT_PREFIX, VERSION,
};
use crate::errors::{LapiError, Result};
use crate::impl_choice_conversions;
use crate::types::{AuthType, TlsOptions, TransportOptions};

/// Deployment environment; namespaces stored credentials.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Environment {
    #[default]
    Dev,
    Prod,
}

impl_choice_conversions!(Environment {
    Dev => "dev",
    Prod => "prod",
});

/// Unvalidated configuration as read from a file or the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawConfig {
    pub api_url: Option<String>,
    pub auth_type: Option<String>,
    pub api_key: Option<String>,
    pub tls_cert_path: Option<PathBuf>,
    pub tls_key_path: Option<PathBuf>,
    pub tls_verify_peer: Option<bool>,
    pub tls_ca_cert_path: Option<PathBuf>,
    /// Seconds; 0 disables the timeout.
    pub api_timeout: Option<u64>,
    pub user_agent_suffix: Option<String>,
    pub machine_id_prefix: Option<String>,
    pub scenarios: Option<Vec<String>>,
    pub env: Option<String>,
}

impl RawConfig {
    /// Start from the only required option.
    #[must_use]
    pub fn with_scenarios<I, S>(scenarios: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { scenarios: Some(scenarios.into_iter().map(Into::into).collect()), ..Self::default() }
    }

    /// Validate and apply defaults.
    ///
    /// # Errors
    /// Returns `LapiError::Configuration` naming the first invalid option.
    pub fn validate(self) -> Result<Configuration> {
        Configuration::try_from(self)
    }
}

/// Validated client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    api_url: String,
    auth_type: AuthType,
    api_key: Option<String>,
    tls: Option<TlsOptions>,
    tls_verify_peer: bool,
    api_timeout: Option<Duration>,
    user_agent_suffix: String,
    machine_id_prefix: String,
    scenarios: Vec<String>,
    env: Environment,
}

impl TryFrom<RawConfig> for Configuration {
    type Error = LapiError;

    fn try_from(raw: RawConfig) -> Result<Self> {
        let scenarios = validate_scenarios(raw.scenarios)?;

        let user_agent_suffix = raw.user_agent_suffix.unwrap_or_default();
        validate_name_part("user_agent_suffix", &user_agent_suffix)?;

        let machine_id_prefix = raw.machine_id_prefix.unwrap_or_default();
        validate_name_part("machine_id_prefix", &machine_id_prefix)?;

        let env = match raw.env {
            Some(value) => {
                value.parse::<Environment>().map_err(|reason| LapiError::configuration("env", reason))?
            }
            None => Environment::default(),
        };

        let auth_type = match raw.auth_type {
            Some(value) => value
                .parse::<AuthType>()
                .map_err(|reason| LapiError::configuration("auth_type", reason))?,
            None => AuthType::default(),
        };

        let api_url = raw.api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string());
        validate_api_url(&api_url)?;

        let tls_verify_peer = raw.tls_verify_peer.unwrap_or(true);
        let tls = match auth_type {
            AuthType::Tls => Some(TlsOptions {
                cert_path: required_path("tls_cert_path", raw.tls_cert_path)?,
                key_path: required_path("tls_key_path", raw.tls_key_path)?,
                verify_peer: tls_verify_peer,
                ca_cert_path: if tls_verify_peer {
                    Some(required_path("tls_ca_cert_path", raw.tls_ca_cert_path)?)
                } else {
                    None
                },
            }),
            AuthType::ApiKey => None,
        };

        let api_timeout = match raw.api_timeout.unwrap_or(DEFAULT_API_TIMEOUT_SECS) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Ok(Self {
            api_url,
            auth_type,
            api_key: raw.api_key.filter(|key| !key.is_empty()),
            tls,
            tls_verify_peer,
            api_timeout,
            user_agent_suffix,
            machine_id_prefix,
            scenarios,
            env,
        })
    }
}

impl Configuration {
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    #[must_use]
    pub const fn auth_type(&self) -> AuthType {
        self.auth_type
    }

    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    #[must_use]
    pub const fn tls(&self) -> Option<&TlsOptions> {
        self.tls.as_ref()
    }

    #[must_use]
    pub const fn tls_verify_peer(&self) -> bool {
        self.tls_verify_peer
    }

    #[must_use]
    pub const fn api_timeout(&self) -> Option<Duration> {
        self.api_timeout
    }

    #[must_use]
    pub fn user_agent_suffix(&self) -> &str {
        &self.user_agent_suffix
    }

    #[must_use]
    pub fn machine_id_prefix(&self) -> &str {
        &self.machine_id_prefix
    }

    /// De-duplicated, in first-seen order.
    #[must_use]
    pub fn scenarios(&self) -> &[String] {
        &self.scenarios
    }

    #[must_use]
    pub const fn env(&self) -> Environment {
        self.env
    }

    /// `<prefix>[_<suffix>]/<version>`
    #[must_use]
    pub fn user_agent(&self) -> String {
        if self.user_agent_suffix.is_empty() {
            format!("{USER_AGENT_PREFIX}/{VERSION}")
        } else {
            format!("{USER_AGENT_PREFIX}_{}/{VERSION}", self.user_agent_suffix)
        }
    }

    /// Options passed to the transport with every request.
    #[must_use]
    pub fn transport_options(&self) -> TransportOptions {
        TransportOptions {
            auth_type: self.auth_type,
            api_key: self.api_key.clone(),
            tls: self.tls.clone(),
            timeout: self.api_timeout,
        }
    }
}

fn validate_scenarios(scenarios: Option<Vec<String>>) -> Result<Vec<String>> {
    let scenarios = scenarios.ok_or_else(|| LapiError::configuration("scenarios", "must be configured"))?;
    if scenarios.is_empty() {
        return Err(LapiError::configuration("scenarios", "should have at least 1 element"));
    }

    let mut unique: Vec<String> = Vec::with_capacity(scenarios.len());
    for scenario in scenarios {
        if scenario.trim().is_empty() {
            return Err(LapiError::configuration("scenarios", "cannot contain an empty value"));
        }
        if !unique.contains(&scenario) {
            unique.push(scenario);
        }
    }
    Ok(unique)
}

fn validate_name_part(option: &str, value: &str) -> Result<()> {
    if value.chars().count() > MAX_NAME_PART_LENGTH {
        return Err(LapiError::configuration(
            option,
            format!("Length must be <= {MAX_NAME_PART_LENGTH}"),
        ));
    }
    if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(LapiError::configuration(option, "Allowed chars are a-z, A-Z, 0-9, _ and -"));
    }
    Ok(())
}

fn validate_api_url(value: &str) -> Result<()> {
    let parsed = url::Url::parse(value)
        .map_err(|e| LapiError::configuration("api_url", format!("invalid url: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(LapiError::configuration(
            "api_url",
            format!("unsupported scheme \"{other}\", expected http or https"),
        )),
    }
}

fn required_path(option: &str, value: Option<PathBuf>) -> Result<PathBuf> {
    match value {
        Some(path) if !path.as_os_str().is_empty() => Ok(path),
        _ => Err(LapiError::configuration(option, "must be configured when auth_type is \"tls\"")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason_for(raw: RawConfig) -> (String, String) {
        match raw.validate() {
            Err(LapiError::Configuration { option, reason }) => (option, reason),
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn defaults_are_applied() {
        let config = RawConfig::with_scenarios(["crowdsecurity/http-backdoors-attempts"])
            .validate()
            .unwrap();

        assert_eq!(config.api_url(), DEFAULT_API_URL);
        assert_eq!(config.auth_type(), AuthType::ApiKey);
        assert_eq!(config.env(), Environment::Dev);
        assert_eq!(config.api_timeout(), Some(Duration::from_secs(DEFAULT_API_TIMEOUT_SECS)));
        assert!(config.tls_verify_peer());
        assert_eq!(config.machine_id_prefix(), "");
        assert_eq!(config.user_agent(), format!("{USER_AGENT_PREFIX}/{VERSION}"));
    }

    #[test]
    fn user_agent_includes_suffix() {
        let config = RawConfig {
            user_agent_suffix: Some("MySuffix".into()),
            ..RawConfig::with_scenarios(["a"])
        }
        .validate()
        .unwrap();

        assert_eq!(config.user_agent(), format!("{USER_AGENT_PREFIX}_MySuffix/{VERSION}"));
    }

    #[test]
    fn scenarios_are_required_and_deduplicated() {
        let (option, reason) = reason_for(RawConfig::default());
        assert_eq!(option, "scenarios");
        assert_eq!(reason, "must be configured");

        let (_, reason) = reason_for(RawConfig::with_scenarios(Vec::<String>::new()));
        assert_eq!(reason, "should have at least 1 element");

        let (_, reason) = reason_for(RawConfig::with_scenarios(["a", ""]));
        assert_eq!(reason, "cannot contain an empty value");

        let config = RawConfig::with_scenarios(["b", "a", "b", "c", "a"]).validate().unwrap();
        assert_eq!(config.scenarios(), ["b", "a", "c"]);
    }

    #[test]
    fn name_parts_are_bounded() {
        let (option, reason) = reason_for(RawConfig {
            machine_id_prefix: Some("a".repeat(17)),
            ..RawConfig::with_scenarios(["a"])
        });
        assert_eq!(option, "machine_id_prefix");
        assert_eq!(reason, "Length must be <= 16");

        let (option, reason) = reason_for(RawConfig {
            user_agent_suffix: Some("bad suffix!".into()),
            ..RawConfig::with_scenarios(["a"])
        });
        assert_eq!(option, "user_agent_suffix");
        assert!(reason.starts_with("Allowed chars are"));

        let ok = RawConfig {
            machine_id_prefix: Some("Prefix_01-".into()),
            ..RawConfig::with_scenarios(["a"])
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn choices_list_permissible_values() {
        let (option, reason) =
            reason_for(RawConfig { env: Some("staging".into()), ..RawConfig::with_scenarios(["a"]) });
        assert_eq!(option, "env");
        assert_eq!(reason, "Permissible values: \"dev\", \"prod\"");

        let (option, reason) = reason_for(RawConfig {
            auth_type: Some("password".into()),
            ..RawConfig::with_scenarios(["a"])
        });
        assert_eq!(option, "auth_type");
        assert_eq!(reason, "Permissible values: \"api_key\", \"tls\"");
    }

    #[test]
    fn tls_requires_certificate_material() {
        let (option, _) =
            reason_for(RawConfig { auth_type: Some("tls".into()), ..RawConfig::with_scenarios(["a"]) });
        assert_eq!(option, "tls_cert_path");

        let (option, _) = reason_for(RawConfig {
            auth_type: Some("tls".into()),
            tls_cert_path: Some("cert.pem".into()),
            tls_key_path: Some("key.pem".into()),
            ..RawConfig::with_scenarios(["a"])
        });
        assert_eq!(option, "tls_ca_cert_path");

        let config = RawConfig {
            auth_type: Some("tls".into()),
            tls_cert_path: Some("cert.pem".into()),
            tls_key_path: Some("key.pem".into()),
            tls_verify_peer: Some(false),
            ..RawConfig::with_scenarios(["a"])
        }
        .validate()
        .unwrap();
        let tls = config.tls().unwrap();
        assert!(!tls.verify_peer);
        assert_eq!(tls.ca_cert_path, None);
        assert!(config.transport_options().uses_tls_auth());
    }

    #[test]
    fn api_url_must_be_http() {
        let (option, _) = reason_for(RawConfig {
            api_url: Some("ftp://example.com".into()),
            ..RawConfig::with_scenarios(["a"])
        });
        assert_eq!(option, "api_url");

        let (option, _) =
            reason_for(RawConfig { api_url: Some("not a url".into()), ..RawConfig::with_scenarios(["a"]) });
        assert_eq!(option, "api_url");
    }

    #[test]
    fn zero_timeout_disables_it() {
        let config = RawConfig { api_timeout: Some(0), ..RawConfig::with_scenarios(["a"]) }
            .validate()
            .unwrap();
        assert_eq!(config.api_timeout(), None);
        assert_eq!(config.transport_options().timeout, None);
    }

    #[test]
    fn api_key_is_exposed_to_transport() {
        let config = RawConfig { api_key: Some("secret".into()), ..RawConfig::with_scenarios(["a"]) }
            .validate()
            .unwrap();
        assert_eq!(config.transport_options().api_key_header(), Some("secret"));
    }
}
