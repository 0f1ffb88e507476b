// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup; a missing or malformed required value aborts startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `ETHEREUM_RPC_URL` | JSON-RPC endpoint of the chain | Required |
//! | `ADMIN_PRIVATE_KEY` | Hex private key of the relaying account | Required (or file) |
//! | `ADMIN_PRIVATE_KEY_FILE` | Path to a PEM private key | Alternative to the above |
//! | `MESSAGE_BOARD_ADDRESS` | Message board contract | Required |
//! | `TOKEN_CONTRACT_ADDRESS` | Token contract | Required |
//! | `NFT_CONTRACT_ADDRESS` | NFT contract | Required |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `3000` |
//! | `CONFIRMATION_TIMEOUT_SECS` | Wait for a receipt before answering 202 | `60` |
//! | `RECEIPT_POLL_INTERVAL_MS` | Receipt polling interval | `1000` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM certificate chain and key | Plain HTTP |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//! | `RELAY_SKIP_DOTENV` | Do not read `.env` | Unset |

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use alloy::primitives::Address;
use thiserror::Error;

use crate::blockchain::{parse_address, AdminSigner, ChainError, RelaySettings};

/// Environment variable name for the JSON-RPC endpoint.
pub const RPC_URL_ENV: &str = "ETHEREUM_RPC_URL";

/// Environment variable name for the hex-encoded admin key.
///
/// Every relayed write is signed with this key and paid from its balance.
pub const ADMIN_PRIVATE_KEY_ENV: &str = "ADMIN_PRIVATE_KEY";

/// Environment variable name for a PEM file holding the admin key
/// (SEC1 or PKCS#8).
pub const ADMIN_PRIVATE_KEY_FILE_ENV: &str = "ADMIN_PRIVATE_KEY_FILE";

pub const MESSAGE_BOARD_ADDRESS_ENV: &str = "MESSAGE_BOARD_ADDRESS";
pub const TOKEN_CONTRACT_ADDRESS_ENV: &str = "TOKEN_CONTRACT_ADDRESS";
pub const NFT_CONTRACT_ADDRESS_ENV: &str = "NFT_CONTRACT_ADDRESS";

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Seconds to wait for one confirmation before reporting a write as pending.
pub const CONFIRMATION_TIMEOUT_ENV: &str = "CONFIRMATION_TIMEOUT_SECS";
pub const RECEIPT_POLL_INTERVAL_ENV: &str = "RECEIPT_POLL_INTERVAL_MS";

pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";

/// Environment variable name for the logging format.
///
/// # Values
/// - `json` - Structured JSON logs (for production)
/// - `pretty` - Human-readable logs (for development)
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const SKIP_DOTENV_ENV: &str = "RELAY_SKIP_DOTENV";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_RECEIPT_POLL_INTERVAL_MS: u64 = 1000;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Where the admin key comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum AdminKeySource {
    Hex(String),
    PemFile(PathBuf),
}

impl AdminKeySource {
    /// Load the key. Called once at startup.
    pub fn load(&self) -> Result<AdminSigner, ConfigError> {
        match self {
            AdminKeySource::Hex(hex) => {
                AdminSigner::from_hex(hex).map_err(|source| ConfigError::AdminKey {
                    key: ADMIN_PRIVATE_KEY_ENV,
                    source,
                })
            }
            AdminKeySource::PemFile(path) => {
                let pem = std::fs::read(path).map_err(|source| ConfigError::KeyFile {
                    path: path.clone(),
                    source,
                })?;
                AdminSigner::from_pem(&pem).map_err(|source| ConfigError::AdminKey {
                    key: ADMIN_PRIVATE_KEY_FILE_ENV,
                    source,
                })
            }
        }
    }
}

impl fmt::Debug for AdminKeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminKeySource::Hex(_) => f.write_str("Hex(<redacted>)"),
            AdminKeySource::PemFile(path) => f.debug_tuple("PemFile").field(path).finish(),
        }
    }
}

/// Certificate chain and private key for HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Logging output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    pub fn from_env() -> Self {
        Self::parse(std::env::var(LOG_FORMAT_ENV).ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: String,
    pub admin_key: AdminKeySource,
    pub message_board_address: Address,
    pub token_address: Address,
    pub nft_address: Address,
    pub bind_addr: SocketAddr,
    pub confirmation_timeout: Duration,
    pub poll_interval: Duration,
    pub tls: Option<TlsPaths>,
}

impl Config {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key).and_then(|value| {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
        };
        let required = |key: &'static str| get(key).ok_or(ConfigError::MissingVar { key });
        let address = |key: &'static str| {
            let value = required(key)?;
            parse_address(&value, "contract").map_err(|e| ConfigError::InvalidValue {
                key,
                reason: e.to_string(),
            })
        };
        let number = |key: &'static str, default: u64| match get(key) {
            None => Ok(default),
            Some(value) => value.parse::<u64>().map_err(|e| ConfigError::InvalidValue {
                key,
                reason: e.to_string(),
            }),
        };

        let rpc_url = required(RPC_URL_ENV)?;
        url::Url::parse(&rpc_url).map_err(|e| ConfigError::InvalidValue {
            key: RPC_URL_ENV,
            reason: e.to_string(),
        })?;

        let admin_key = match (get(ADMIN_PRIVATE_KEY_ENV), get(ADMIN_PRIVATE_KEY_FILE_ENV)) {
            (Some(hex), None) => AdminKeySource::Hex(hex),
            (None, Some(path)) => AdminKeySource::PemFile(PathBuf::from(path)),
            (Some(_), Some(_)) => {
                return Err(ConfigError::InvalidValue {
                    key: ADMIN_PRIVATE_KEY_FILE_ENV,
                    reason: format!(
                        "set either {ADMIN_PRIVATE_KEY_ENV} or {ADMIN_PRIVATE_KEY_FILE_ENV}, not both"
                    ),
                });
            }
            (None, None) => {
                return Err(ConfigError::MissingVar {
                    key: ADMIN_PRIVATE_KEY_ENV,
                });
            }
        };

        let message_board_address = address(MESSAGE_BOARD_ADDRESS_ENV)?;
        let token_address = address(TOKEN_CONTRACT_ADDRESS_ENV)?;
        let nft_address = address(NFT_CONTRACT_ADDRESS_ENV)?;

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get(PORT_ENV) {
            None => DEFAULT_PORT,
            Some(value) => value.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                key: PORT_ENV,
                reason: e.to_string(),
            })?,
        };
        let bind_addr: SocketAddr = format!("{host}:{port}").parse().map_err(
            |e: std::net::AddrParseError| ConfigError::InvalidValue {
                key: HOST_ENV,
                reason: e.to_string(),
            },
        )?;

        let timeout_secs = number(CONFIRMATION_TIMEOUT_ENV, DEFAULT_CONFIRMATION_TIMEOUT_SECS)?;
        let poll_ms = number(RECEIPT_POLL_INTERVAL_ENV, DEFAULT_RECEIPT_POLL_INTERVAL_MS)?;
        if timeout_secs == 0 || poll_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: if timeout_secs == 0 {
                    CONFIRMATION_TIMEOUT_ENV
                } else {
                    RECEIPT_POLL_INTERVAL_ENV
                },
                reason: "must be greater than zero".to_string(),
            });
        }

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (None, None) => None,
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: PathBuf::from(cert),
                key: PathBuf::from(key),
            }),
            (Some(_), None) => return Err(ConfigError::MissingVar { key: TLS_KEY_PATH_ENV }),
            (None, Some(_)) => return Err(ConfigError::MissingVar { key: TLS_CERT_PATH_ENV }),
        };

        Ok(Self {
            rpc_url,
            admin_key,
            message_board_address,
            token_address,
            nft_address,
            bind_addr,
            confirmation_timeout: Duration::from_secs(timeout_secs),
            poll_interval: Duration::from_millis(poll_ms),
            tls,
        })
    }

    pub fn relay_settings(&self) -> RelaySettings {
        RelaySettings {
            confirmation_timeout: self.confirmation_timeout,
            poll_interval: self.poll_interval,
        }
    }
}

/// Load `.env` from the working directory if present.
///
/// Skipped when `RELAY_SKIP_DOTENV` is set. A missing file is not an error.
pub fn hydrate_env_file() -> Result<(), ConfigError> {
    if std::env::var_os(SKIP_DOTENV_ENV).is_some() {
        return Ok(());
    }
    match dotenvy::dotenv() {
        Ok(_) => {}
        Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(ConfigError::Dotenv { source: err }),
    }

    Ok(())
}

/// Errors emitted when `.env` hydration or environment parsing fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable `{key}`")]
    MissingVar { key: &'static str },

    #[error("invalid value in `{key}`: {reason}")]
    InvalidValue { key: &'static str, reason: String },

    #[error("invalid admin key in `{key}`: {source}")]
    AdminKey {
        key: &'static str,
        #[source]
        source: ChainError,
    },

    #[error("failed to read key file {}: {source}", path.display())]
    KeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load .env file: {source}")]
    Dotenv {
        #[from]
        source: dotenvy::Error,
    },
}
