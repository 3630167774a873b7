use std::env::VarError;
use std::path::PathBuf;

use anyhow::anyhow;

pub const REQUIRED_VARIABLES: &[&str] = &["PORT", "DATA_DIR"];

pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
}

impl Config {
    pub fn env() -> anyhow::Result<Self> {
        let port = env("PORT")?;
        let port = port
            .parse()
            .map_err(|_| anyhow!("PORT value {port} is not a valid port number"))?;

        let data_dir = PathBuf::from(env("DATA_DIR")?);

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        Ok(Self {
            host,
            port,
            data_dir,
        })
    }

    pub fn log(&self) {
        log::info!(
            "Config: host={} port={} data_dir={}",
            self.host,
            self.port,
            self.data_dir.display()
        );
    }
}

fn env(name: &str) -> anyhow::Result<String> {
    std::env::var(name).map_err(|e| match e {
        VarError::NotPresent => anyhow!("{name} not set"),
        VarError::NotUnicode(_) => anyhow!("{name} value is not valid unicode"),
    })
}
