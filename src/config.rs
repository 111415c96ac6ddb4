use std::path::PathBuf;
use std::time::Duration;

use crate::cli::ClientSettings;
use crate::client::{HttpClient, HttpConfig, normalize_base_url};
use crate::error::{ClientError, ClientResult};
use crate::metadata::PKG_NAME;

/// Settings resolved into the values the client runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub data_dir: PathBuf,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn from_settings(settings: &ClientSettings) -> ClientResult<Self> {
        settings.validate().map_err(ClientError::Validation)?;

        let data_dir = match settings.data_dir.as_deref() {
            Some(dir) => PathBuf::from(dir.trim()),
            None => default_data_dir()?,
        };

        Ok(Self {
            api_url: normalize_base_url(&settings.api_url),
            data_dir,
            timeout: Duration::from_secs(settings.timeout_secs),
        })
    }

    pub fn http_client(&self) -> HttpClient {
        HttpClient::new(HttpConfig {
            base_url: self.api_url.clone(),
            timeout: self.timeout,
        })
    }
}

fn default_data_dir() -> ClientResult<PathBuf> {
    dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("share")))
        .map(|dir| dir.join(PKG_NAME))
        .ok_or_else(|| {
            ClientError::validation("Could not determine a data directory; set CULINARY_DATA_DIR")
        })
}
