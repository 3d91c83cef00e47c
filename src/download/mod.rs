pub mod cache;
pub mod client;
pub mod references;
pub mod retry;

pub use cache::*;
pub use client::*;
pub use references::*;
pub use retry::*;

use crate::error::Result;
use crate::parser::SpeciesData;
use crate::schema::EntityKind;

/// Supplies canonical names per entity kind
pub trait ReferenceSource {
    fn fetch_names(&self, kind: EntityKind) -> Result<Vec<String>>;
}

/// Supplies type and ability data for a pokemon species
pub trait SpeciesSource {
    /// Fails with `NotFound` for unknown species, `Connectivity` on transport errors
    fn fetch_species(&self, name: &str) -> Result<SpeciesData>;
}

/// Use cached reference lists unless `force` is set, fetching and caching otherwise.
///
/// The cache file is only replaced after every list has been fetched, so a
/// failed refresh leaves the previous lists in place.
pub fn ensure_references(
    cache: &CacheManager,
    source: &impl ReferenceSource,
    force: bool,
) -> anyhow::Result<ReferenceNames> {
    if !force && cache.is_cached() {
        match cache.load_references() {
            Ok(refs) => {
                tracing::info!(path = ?cache.references_path(), "using cached reference names");
                return Ok(refs);
            }
            Err(e) => tracing::warn!(error = %e, "ignoring unreadable reference cache"),
        }
    }

    let refs = ReferenceNames::fetch(source)?;
    cache.store_references(&refs)?;
    Ok(refs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::cell::Cell;
    use tempfile::TempDir;

    struct Counting(Cell<usize>);

    impl ReferenceSource for Counting {
        fn fetch_names(&self, kind: EntityKind) -> Result<Vec<String>> {
            self.0.set(self.0.get() + 1);
            Ok(vec![format!("{}-name", kind)])
        }
    }

    #[test]
    fn test_cache_is_reused_until_refresh() {
        let dir = TempDir::new().unwrap();
        let cache = CacheManager::new(Some(dir.path().to_path_buf())).unwrap();
        let source = Counting(Cell::new(0));

        let first = ensure_references(&cache, &source, false).unwrap();
        assert_eq!(source.0.get(), 3);
        assert_eq!(first.types, vec!["types-name"]);

        let second = ensure_references(&cache, &source, false).unwrap();
        assert_eq!(source.0.get(), 3);
        assert_eq!(first, second);

        ensure_references(&cache, &source, true).unwrap();
        assert_eq!(source.0.get(), 6);
    }

    struct Unreachable;

    impl ReferenceSource for Unreachable {
        fn fetch_names(&self, _kind: EntityKind) -> Result<Vec<String>> {
            Err(Error::Connectivity("connection refused".into()))
        }
    }

    #[test]
    fn test_failed_refresh_keeps_cached_lists() {
        let dir = TempDir::new().unwrap();
        let cache = CacheManager::new(Some(dir.path().to_path_buf())).unwrap();
        let cached = ReferenceNames {
            types: vec!["fire".into()],
            abilities: vec!["blaze".into()],
            pokemon: vec!["charmander".into()],
        };
        cache.store_references(&cached).unwrap();

        assert!(ensure_references(&cache, &Unreachable, true).is_err());
        assert!(cache.is_cached());
        assert_eq!(cache.load_references().unwrap(), cached);

        let reused = ensure_references(&cache, &Unreachable, false).unwrap();
        assert_eq!(reused, cached);
    }
}
