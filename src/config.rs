//! Node configuration read from the process environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::error::ConfigError;

/// Runtime settings for the ledger node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Log the initial chain once at startup.
    pub startup_dump: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
            startup_dump: true,
        }
    }
}

impl NodeConfig {
    /// Build from `LEDGER_HOST`, `PORT` and `LEDGER_STARTUP_DUMP`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup; unset variables keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup("LEDGER_HOST") {
            config.host = v.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "LEDGER_HOST",
                value: v.clone(),
                expected: "IP address",
            })?;
        }
        if let Some(v) = lookup("PORT") {
            config.port = v.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "PORT",
                value: v.clone(),
                expected: "port number",
            })?;
        }
        if let Some(v) = lookup("LEDGER_STARTUP_DUMP") {
            config.startup_dump = match v.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "LEDGER_STARTUP_DUMP",
                        value: v,
                        expected: "boolean",
                    })
                }
            };
        }
        Ok(config)
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
