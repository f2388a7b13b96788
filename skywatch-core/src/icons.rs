use bytes::Bytes;
use reqwest::{Client, Url};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;
use tracing::debug;

use crate::config::Config;
use crate::error::Error;

/// OpenWeather icon-download base URL; icons resolve to
/// `{base}/{icon_id}@2x.png`.
pub const DEFAULT_ICON_URL: &str = "https://openweathermap.org/img/wn";

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Session cache of condition icons, keyed by icon identifier.
///
/// The first successful fetch of an identifier is the only network request
/// it ever makes: later calls return the stored bytes, and concurrent
/// misses for one key join a single in-flight download. Failed downloads
/// store nothing, so a retry hits the network again.
///
/// Entries live as long as the cache does. There is no eviction: the
/// provider's icon alphabet is a few dozen codes, so the map stays tiny.
#[derive(Debug)]
pub struct IconCache {
    http: Client,
    base_url: String,
    entries: Mutex<HashMap<String, Arc<OnceCell<Bytes>>>>,
}

impl IconCache {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_ICON_URL)
    }

    /// Cache against a non-default icon host (tests, mirrors).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Icon bytes for `icon_id`, from the cache or the network.
    ///
    /// The returned value is the encoded PNG as served by the icon host;
    /// decoding into a displayable image is the shell's concern.
    pub async fn get(&self, icon_id: &str) -> Result<Bytes, Error> {
        let cell = self.entry(icon_id);
        let bytes = cell.get_or_try_init(|| self.download(icon_id)).await?;
        Ok(bytes.clone())
    }

    fn entry(&self, icon_id: &str) -> Arc<OnceCell<Bytes>> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(entries.entry(icon_id.to_string()).or_default())
    }

    async fn download(&self, icon_id: &str) -> Result<Bytes, Error> {
        let url = self.icon_url(icon_id)?;
        debug!(icon_id, %url, "icon cache miss, downloading");

        let res = self.http.get(url).send().await.map_err(Error::Network)?;

        let status = res.status();
        if !status.is_success() {
            return Err(Error::Http(status));
        }

        let bytes = res.bytes().await.map_err(Error::Network)?;
        if !bytes.starts_with(&PNG_SIGNATURE) {
            return Err(Error::Decode("icon response is not a PNG image".into()));
        }

        Ok(bytes)
    }

    fn icon_url(&self, icon_id: &str) -> Result<Url, Error> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|_| Error::MalformedRequest(self.base_url.clone()))?;

        url.path_segments_mut()
            .map_err(|()| Error::MalformedRequest(self.base_url.clone()))?
            .pop_if_empty()
            .push(&format!("{icon_id}@2x.png"));

        Ok(url)
    }
}

impl Default for IconCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Construct an icon cache from config, applying any base-URL override.
pub fn icon_cache_from_config(config: &Config) -> IconCache {
    match &config.icon_url {
        Some(url) => IconCache::with_base_url(url),
        None => IconCache::new(),
    }
}
