use crate::{dialect::Backend, query::TranslationMode};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::{SocketAddr, ToSocketAddrs};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    /// Backend used when a request does not name one.
    pub backend: Backend,
    pub default_mode: TranslationMode,
    /// Upper bound for applied limits. Unset means no clamp.
    pub max_limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    srql_listen_addr: Option<String>,
    #[serde(default)]
    srql_listen_host: Option<String>,
    #[serde(default)]
    srql_listen_port: Option<u16>,
    #[serde(default)]
    srql_backend: Option<String>,
    #[serde(default)]
    srql_translation_mode: Option<String>,
    #[serde(default)]
    srql_max_limit: Option<u64>,
}

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8480;

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let raw: RawConfig =
            envy::from_env().context("failed to parse SRQL_* environment variables")?;

        let listen_addr = resolve_addr(
            raw.srql_listen_addr,
            raw.srql_listen_host,
            raw.srql_listen_port,
        )?;

        let backend = match raw.srql_backend {
            Some(value) => value
                .parse()
                .map_err(anyhow::Error::msg)
                .context("invalid SRQL_BACKEND value")?,
            None => Backend::Proton,
        };

        let default_mode = match raw.srql_translation_mode {
            Some(value) => value
                .parse()
                .map_err(anyhow::Error::msg)
                .context("invalid SRQL_TRANSLATION_MODE value")?,
            None => TranslationMode::Parameterized,
        };

        Ok(Self {
            listen_addr,
            backend,
            default_mode,
            max_limit: raw.srql_max_limit,
        })
    }

    /// Defaults for in-process use, without reading the environment.
    pub fn embedded() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            backend: Backend::Proton,
            default_mode: TranslationMode::Parameterized,
            max_limit: None,
        }
    }
}

fn resolve_addr(
    addr: Option<String>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<SocketAddr> {
    if let Some(addr) = addr {
        return addr
            .to_socket_addrs()
            .context("invalid SRQL_LISTEN_ADDR value")?
            .next()
            .context("SRQL_LISTEN_ADDR resolved to no addresses");
    }

    let host = host.unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = port.unwrap_or(DEFAULT_PORT);
    let combined = format!("{}:{}", host, port);
    combined
        .to_socket_addrs()
        .context("invalid SRQL listen host/port combination")?
        .next()
        .context("listen address resolved to no targets")
}
