//! Stand-ins for the page's remote services when running headless

use spatial_site::{FeedError, FeedSource, FormRelay, RelayError};
use std::fs;
use std::path::PathBuf;

/// Serves the earthquake feed from a local GeoJSON file
///
/// Without a file every fetch fails, so the page shows its demo events.
pub struct FileFeed {
    path: Option<PathBuf>,
}

impl FileFeed {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

impl FeedSource for FileFeed {
    fn fetch(&self, url: &str) -> Result<String, FeedError> {
        let Some(path) = &self.path else {
            return Err(FeedError::Unavailable(format!("offline, not fetching {url}")));
        };
        fs::read_to_string(path)
            .map_err(|e| FeedError::Unavailable(format!("{}: {e}", path.display())))
    }
}

/// Refuses every submission
pub struct OfflineRelay;

impl FormRelay for OfflineRelay {
    fn post(&self, endpoint: &str, _body: &str) -> Result<String, RelayError> {
        Err(RelayError::Network(format!("offline, not posting to {endpoint}")))
    }
}
