use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, warn};

/// Loads a read-only catalog table, failing open.
///
/// A missing or unreadable catalog only disables validation and pricing, so
/// both cases log a warning and yield `None` instead of an error.
pub fn load_catalog<C: DeserializeOwned>(path: &Path) -> Option<C> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(
                catalog = %path.display(),
                error = %e,
                "catalog not readable, skipping validation and pricing"
            );
            return None;
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(catalog) => {
            debug!(catalog = %path.display(), "catalog loaded");
            Some(catalog)
        }
        Err(e) => {
            warn!(
                catalog = %path.display(),
                error = %e,
                "catalog could not be parsed, skipping validation and pricing"
            );
            None
        }
    }
}
