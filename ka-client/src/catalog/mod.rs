//! Catalog cache manager
//!
//! Keeps a local redb copy of the remote catalog. The copy is served as long
//! as the remote `lastModified` marker is not newer than the last sync; when
//! it is (or the marker cannot be read) the catalog is fetched, transformed
//! and stored again. A failed fetch falls back to whatever the cache holds.

pub mod cache;
pub mod search;
pub mod transform;

pub use shared::sizes;

pub use cache::{CacheError, CatalogCache};
pub use search::{default_item, filter_items, sort_for_display};
pub use transform::{parse_rows, transform};

use crate::ClientError;
use crate::remote::RemoteStore;
use shared::{AppError, CatalogItem, ErrorCode};
use std::sync::Arc;
use thiserror::Error;

/// Catalog errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Remote store unreachable or answered with an error
    #[error("Remote catalog request failed: {0}")]
    Remote(#[from] ClientError),

    #[error("Remote catalog is empty")]
    EmptyRemoteData,

    #[error("Invalid catalog data: {0}")]
    InvalidShape(String),

    #[error("Catalog cache error: {0}")]
    Cache(#[from] CacheError),

    /// Nothing to show: the remote failed and the cache is empty
    #[error("Catalog unavailable: {0}")]
    Unavailable(Box<CatalogError>),
}

impl CatalogError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CatalogError::Remote(e) => match e.code() {
                ErrorCode::InvalidFormat => ErrorCode::CatalogInvalidShape,
                _ => ErrorCode::CatalogUnavailable,
            },
            CatalogError::EmptyRemoteData => ErrorCode::CatalogEmpty,
            CatalogError::InvalidShape(_) => ErrorCode::CatalogInvalidShape,
            CatalogError::Cache(e) => e.code(),
            CatalogError::Unavailable(_) => ErrorCode::CatalogUnavailable,
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        AppError::with_message(err.code(), err.to_string())
    }
}

/// Where a loaded catalog came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource {
    /// Cache was up to date; no rows fetched
    Cache,
    /// Freshly fetched; `persisted` is false if the cache write failed
    Remote { persisted: bool },
    /// Remote fetch failed; cached, possibly stale data served
    Fallback,
}

impl CatalogSource {
    /// Notice to show next to the items, if any
    pub fn notice(&self) -> Option<ErrorCode> {
        match self {
            CatalogSource::Fallback => Some(ErrorCode::CatalogStale),
            _ => None,
        }
    }
}

/// Result of [`CatalogManager::initialize_items`]
#[derive(Debug, Clone)]
pub struct CatalogLoad {
    pub items: Vec<CatalogItem>,
    pub source: CatalogSource,
}

impl CatalogLoad {
    /// False when the items are a fallback copy
    pub fn is_fresh(&self) -> bool {
        !matches!(self.source, CatalogSource::Fallback)
    }
}

/// Catalog cache manager
pub struct CatalogManager<R> {
    remote: Arc<R>,
    cache: CatalogCache,
}

impl<R: RemoteStore> CatalogManager<R> {
    pub fn new(remote: Arc<R>, cache: CatalogCache) -> Self {
        Self { remote, cache }
    }

    pub fn cache(&self) -> &CatalogCache {
        &self.cache
    }

    /// Load the catalog, refreshing the cache when it is empty or stale
    pub async fn initialize_items(&self) -> Result<CatalogLoad, CatalogError> {
        let cached = match self.cache.read_all() {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(error = %e, "Catalog cache unreadable, treating as empty");
                Vec::new()
            }
        };
        tracing::debug!(count = cached.len(), "Loaded catalog from cache");

        if !cached.is_empty() && !self.is_stale().await {
            tracing::info!(count = cached.len(), "Using cached catalog");
            return Ok(CatalogLoad {
                items: cached,
                source: CatalogSource::Cache,
            });
        }

        match self.fetch_remote().await {
            Ok(items) => {
                let persisted = match self.cache.replace_all(&items, shared::util::now_millis()) {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to cache fetched catalog");
                        false
                    }
                };
                tracing::info!(count = items.len(), persisted, "Catalog synced from remote");
                Ok(CatalogLoad {
                    items,
                    source: CatalogSource::Remote { persisted },
                })
            }
            Err(e) if !cached.is_empty() => {
                tracing::warn!(error = %e, count = cached.len(), "Catalog fetch failed, using cached data");
                Ok(CatalogLoad {
                    items: cached,
                    source: CatalogSource::Fallback,
                })
            }
            Err(e) => {
                tracing::error!(error = %e, "Catalog fetch failed and no cached data");
                Err(CatalogError::Unavailable(Box::new(e)))
            }
        }
    }

    /// Manual refresh; errors propagate and leave the cache untouched
    pub async fn sync_now(&self) -> Result<Vec<CatalogItem>, CatalogError> {
        let items = self.fetch_remote().await?;
        self.cache.replace_all(&items, shared::util::now_millis())?;
        tracing::info!(count = items.len(), "Catalog refreshed");
        Ok(items)
    }

    /// Remote marker newer than the last sync; an unreadable marker counts as stale
    async fn is_stale(&self) -> bool {
        let last_sync = match self.cache.last_sync() {
            Ok(value) => value.unwrap_or(0),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read last sync time");
                0
            }
        };

        match self.remote.catalog_last_modified().await {
            Ok(marker) => {
                let stale = marker > last_sync;
                tracing::debug!(marker, last_sync, stale, "Checked catalog freshness");
                stale
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read catalog marker");
                true
            }
        }
    }

    /// Fetch and transform; items come back ordered by style like the cache
    async fn fetch_remote(&self) -> Result<Vec<CatalogItem>, CatalogError> {
        let payload = self.remote.catalog_rows().await?;
        let rows = parse_rows(payload)?;
        let mut items = transform(&rows);
        if items.is_empty() {
            return Err(CatalogError::EmptyRemoteData);
        }
        tracing::debug!(rows = rows.len(), styles = items.len(), "Transformed catalog rows");

        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(CatalogError::EmptyRemoteData.code(), ErrorCode::CatalogEmpty);
        assert_eq!(
            CatalogError::Unavailable(Box::new(CatalogError::EmptyRemoteData)).code(),
            ErrorCode::CatalogUnavailable
        );
        assert_eq!(
            CatalogError::Remote(ClientError::InvalidResponse("x".into())).code(),
            ErrorCode::CatalogInvalidShape
        );
        let app: AppError = CatalogError::InvalidShape("row 3".into()).into();
        assert_eq!(app.code, ErrorCode::CatalogInvalidShape);
    }

    #[test]
    fn test_load_freshness() {
        let load = CatalogLoad {
            items: Vec::new(),
            source: CatalogSource::Fallback,
        };
        assert!(!load.is_fresh());
        assert!(CatalogLoad { items: Vec::new(), source: CatalogSource::Cache }.is_fresh());
        assert_eq!(CatalogSource::Fallback.notice(), Some(ErrorCode::CatalogStale));
        assert_eq!(CatalogSource::Remote { persisted: false }.notice(), None);
    }
}
