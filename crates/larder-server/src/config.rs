use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use larder_api::uploads::UploadSigner;

pub struct Config {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub public_dir: PathBuf,
    pub uploads: Option<UploadSigner>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let host = var_or("LARDER_HOST", "0.0.0.0");
        let port: u16 = var_or("LARDER_PORT", "3000")
            .parse()
            .context("LARDER_PORT is not a valid port")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, port))?;

        Ok(Self {
            addr,
            db_path: var_or("LARDER_DB_PATH", "larder.db").into(),
            public_dir: var_or("LARDER_PUBLIC_DIR", "public").into(),
            uploads: upload_signer(),
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        info!("{} not set, using default: {}", key, default);
        default.to_string()
    })
}

/// All three upload credentials, or none.
fn upload_signer() -> Option<UploadSigner> {
    let secret = |key: &str| env::var(key).ok().filter(|v: &String| !v.is_empty());
    Some(UploadSigner {
        cloud_name: secret("LARDER_UPLOAD_CLOUD_NAME")?,
        api_key: secret("LARDER_UPLOAD_API_KEY")?,
        api_secret: secret("LARDER_UPLOAD_API_SECRET")?,
    })
}
