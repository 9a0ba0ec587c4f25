//! Environment configuration for the bridge binary.
//!
//! Everything the process needs comes from the environment; a missing or
//! unparseable required value is fatal before any socket is opened.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

/// Environment variable names.
pub mod env_vars {
    /// Broker URL, `mqtt://host[:port]` (required).
    pub const MQTT_SERVER: &str = "MQTT_SERVER";
    pub const MQTT_USER: &str = "MQTT_USER";
    pub const MQTT_PASSWORD: &str = "MQTT_PASSWORD";
    /// Comma-separated telemetry mnemonic suffixes exposed as sensors.
    pub const EXTRA_SENSORS: &str = "EXTRA_SENSORS";
    pub const HTTP_PORT: &str = "HTTP_PORT";
    pub const HTTPS_PORT: &str = "HTTPS_PORT";
    pub const TLS_KEY_FILE: &str = "TLS_KEY_FILE";
    pub const TLS_CERT_FILE: &str = "TLS_CERT_FILE";
}

const DEFAULT_MQTT_PORT: u16 = 1883;
const DEFAULT_HTTP_PORT: u16 = 80;
const DEFAULT_HTTPS_PORT: u16 = 443;

/// Validated process configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub broker_host: String,
    pub broker_port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub extra_sensors: Vec<String>,
    pub http_port: u16,
    pub https_port: u16,
    /// HTTPS listener runs only when both PEM paths are configured.
    pub tls: Option<TlsFiles>,
}

#[derive(Debug, Clone)]
pub struct TlsFiles {
    pub key_file: PathBuf,
    pub cert_file: PathBuf,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let server = std::env::var(env_vars::MQTT_SERVER)
            .with_context(|| format!("{} must be set", env_vars::MQTT_SERVER))?;
        let (broker_host, broker_port) = parse_broker_url(&server)?;

        let tls = match (
            optional(env_vars::TLS_KEY_FILE),
            optional(env_vars::TLS_CERT_FILE),
        ) {
            (Some(key), Some(cert)) => Some(TlsFiles {
                key_file: PathBuf::from(key),
                cert_file: PathBuf::from(cert),
            }),
            (None, None) => None,
            _ => bail!(
                "{} and {} must be set together",
                env_vars::TLS_KEY_FILE,
                env_vars::TLS_CERT_FILE
            ),
        };

        Ok(Self {
            broker_host,
            broker_port,
            username: optional(env_vars::MQTT_USER),
            password: optional(env_vars::MQTT_PASSWORD),
            extra_sensors: parse_suffix_list(&optional(env_vars::EXTRA_SENSORS).unwrap_or_default()),
            http_port: port_or(env_vars::HTTP_PORT, DEFAULT_HTTP_PORT)?,
            https_port: port_or(env_vars::HTTPS_PORT, DEFAULT_HTTPS_PORT)?,
            tls,
        })
    }
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn port_or(name: &str, default: u16) -> Result<u16> {
    match optional(name) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{name} is not a valid port: {raw}")),
        None => Ok(default),
    }
}

/// Accepts `mqtt://host`, `mqtt://host:port`, or a bare `host[:port]`.
fn parse_broker_url(url: &str) -> Result<(String, u16)> {
    let rest = url.strip_prefix("mqtt://").unwrap_or(url);
    let rest = rest.trim_end_matches('/');
    if rest.is_empty() {
        bail!("broker URL has no host: {url}");
    }
    match rest.rsplit_once(':') {
        Some((host, port)) => {
            let port: u16 = port
                .parse()
                .with_context(|| format!("broker URL has an invalid port: {url}"))?;
            Ok((host.to_string(), port))
        }
        None => Ok((rest.to_string(), DEFAULT_MQTT_PORT)),
    }
}

fn parse_suffix_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
