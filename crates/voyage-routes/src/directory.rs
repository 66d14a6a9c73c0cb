//! City name to directory code resolution

use crate::error::RouteError;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};
use voyage_domain::traits::StationDirectory;
use voyage_domain::StationTree;

/// Resolves city names against the settlement directory
///
/// The directory is fetched on first use and cached for the lifetime of the
/// resolver. A failed fetch is not cached, so the next lookup tries again.
pub struct RouteDirectory<D>
where
    D: StationDirectory,
{
    directory: Arc<D>,
    lang: String,
    cache: RwLock<Option<Arc<StationTree>>>,
}

impl<D> RouteDirectory<D>
where
    D: StationDirectory,
    D::Error: Into<RouteError>,
{
    /// Create a resolver for the given directory language
    pub fn new(directory: Arc<D>, lang: impl Into<String>) -> Self {
        Self {
            directory,
            lang: lang.into(),
            cache: RwLock::new(None),
        }
    }

    /// Directory code of the settlement titled `name`
    ///
    /// Titles are compared case-insensitively and must match exactly. The
    /// first settlement with a non-empty code wins.
    pub fn resolve_city(&self, name: &str) -> Result<String, RouteError> {
        let wanted = name.trim().to_lowercase();
        let tree = self.stations()?;

        let code = tree
            .settlements()
            .find(|s| !s.code.is_empty() && s.title.to_lowercase() == wanted)
            .map(|s| s.code.clone())
            .ok_or_else(|| RouteError::CityNotFound(name.to_string()))?;

        debug!(city = name, code = %code, "Resolved city");
        Ok(code)
    }

    /// The cached station tree, fetching it if needed
    pub fn stations(&self) -> Result<Arc<StationTree>, RouteError> {
        if let Some(tree) = self.read_cache() {
            return Ok(tree);
        }

        let tree = Arc::new(self.directory.list_stations(&self.lang).map_err(Into::into)?);
        info!(settlements = tree.len(), "Loaded station directory");

        let mut cache = self.cache.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(Arc::clone(cache.get_or_insert(tree)))
    }

    /// Drop the cached tree
    pub fn invalidate(&self) {
        *self.cache.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }

    fn read_cache(&self) -> Option<Arc<StationTree>> {
        self.cache
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
            .map(Arc::clone)
    }
}
