use std::fs;
use std::io;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Configuration for the permission client, loaded from a TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "defaults::endpoint")]
    pub endpoint: String,

    #[serde(default = "defaults::api_key")]
    pub api_key: String,
}

mod defaults {
    pub fn endpoint() -> String {
        String::from("http://127.0.0.1:8344")
    }

    pub fn api_key() -> String {
        String::new()
    }
}

impl ClientConfig {
    /// Loads configuration from `path`; `None` or a missing file yields
    /// defaults. The api key is validated later, when the client is built.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let cfg = Self::read(path)?;
        cfg.validate().context("validate config")?;
        Ok(cfg)
    }

    fn read<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => return Ok(Self::default()),
        };
        let path = path.as_ref();

        match fs::read(path) {
            Ok(data) => {
                let toml_str = String::from_utf8(data)
                    .with_context(|| format!("decode config file '{}' into utf-8", path.display()))?;
                let cfg: ClientConfig = toml::from_str(&toml_str)
                    .with_context(|| format!("parse config file '{}' toml", path.display()))?;
                Ok(cfg)
            }

            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),

            Err(err) => {
                Err(err).with_context(|| format!("read config file '{}'", path.display()))
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            bail!("endpoint cannot be empty");
        }
        Ok(())
    }

    fn default() -> Self {
        Self {
            endpoint: defaults::endpoint(),
            api_key: defaults::api_key(),
        }
    }
}
