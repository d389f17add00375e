use anyhow::Context;
use anyhow::Result;
use dirs::config_dir;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const LISTEN_ENV: &str = "FLASHCARDS_LISTEN";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub listen: SocketAddr,
    pub title: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 3333)),
            title: "FlashCards App".to_owned(),
        }
    }
}

pub fn get_config_path() -> Option<PathBuf> {
    let mut path = config_dir()?;
    path.push("flashcards-cli-rs");
    path.push("config.json");
    Some(path)
}

impl Config {
    /// Defaults, then the user config file if there is one, then the
    /// environment.
    pub fn load() -> Result<Self> {
        let path = get_config_path();
        Self::load_from(path.as_deref(), std::env::var(LISTEN_ENV).ok())
    }

    /// A missing file is not an error, the defaults stand in for it.
    pub fn load_from(path: Option<&Path>, listen_env: Option<String>) -> Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(path)?,
            _ => Self::default(),
        };
        if let Some(listen) = listen_env {
            config.set_listen(&listen)?;
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("fail to read config {:?}", path))?;
        serde_json::from_str(&text).with_context(|| format!("invalid config {:?}", path))
    }

    pub fn set_listen(&mut self, listen: &str) -> Result<()> {
        self.listen = listen
            .parse()
            .with_context(|| format!("invalid listen address {listen:?}"))?;
        Ok(())
    }
}
