//! Technology Catalog: the source of truth for valid technology tokens.
//!
//! Lookups go through `CatalogCache`, a read-through cache of the whole catalog
//! keyed by lower-cased name. The snapshot is rebuilt when it is older than the
//! configured TTL or when `invalidate()` is called after a catalog change.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

use crate::models::technology::Technology;

pub mod handlers;
pub mod queries;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Case-insensitive equality.
    Exact,
    /// Case-insensitive "catalog name contains the query".
    Substring,
}

/// Read contract of the external catalog store.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// All technologies ordered by name.
    async fn list_all(&self) -> Result<Vec<Technology>>;

    async fn find_by_name(&self, name: &str, mode: MatchMode) -> Result<Option<Technology>>;
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory snapshot
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct TechnologyCatalog {
    technologies: Vec<Technology>,
    by_lower_name: HashMap<String, usize>,
}

impl TechnologyCatalog {
    pub fn new(mut technologies: Vec<Technology>) -> Self {
        technologies.sort_by(|a, b| a.name.cmp(&b.name));
        let by_lower_name = technologies
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.to_lowercase(), i))
            .collect();
        Self {
            technologies,
            by_lower_name,
        }
    }

    pub fn all(&self) -> &[Technology] {
        &self.technologies
    }

    pub fn len(&self) -> usize {
        self.technologies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.technologies.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.technologies.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn get(&self, id: i32) -> Option<&Technology> {
        self.technologies.iter().find(|t| t.id == id)
    }

    pub fn find_by_name(&self, name: &str, mode: MatchMode) -> Option<&Technology> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        match mode {
            MatchMode::Exact => self
                .by_lower_name
                .get(&needle)
                .map(|&i| &self.technologies[i]),
            MatchMode::Substring => self
                .technologies
                .iter()
                .find(|t| t.name.to_lowercase().contains(&needle)),
        }
    }

    /// Exact match first, then substring. Unresolvable references yield `None`.
    pub fn resolve(&self, reference: &str) -> Option<&Technology> {
        self.find_by_name(reference, MatchMode::Exact)
            .or_else(|| self.find_by_name(reference, MatchMode::Substring))
    }

    /// Every catalog technology mentioned in `text` as a whole word, in catalog order.
    pub fn find_in_text(&self, text: &str) -> Vec<Technology> {
        let haystack = text.to_lowercase();
        self.technologies
            .iter()
            .filter(|t| contains_word(&haystack, &t.name.to_lowercase()))
            .cloned()
            .collect()
    }
}

/// Whole-word containment where a word boundary is any non-alphanumeric char.
/// Unlike a `\b` regex this keeps names such as `C++` or `.NET` matchable.
pub fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(start, _)| {
        let end = start + needle.len();
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        before_ok && after_ok
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Read-through cache
// ────────────────────────────────────────────────────────────────────────────

struct Snapshot {
    catalog: Arc<TechnologyCatalog>,
    loaded_at: Instant,
}

pub struct CatalogCache {
    reader: Arc<dyn CatalogReader>,
    ttl: Duration,
    snapshot: RwLock<Option<Snapshot>>,
}

impl CatalogCache {
    pub fn new(reader: Arc<dyn CatalogReader>, ttl: Duration) -> Self {
        Self {
            reader,
            ttl,
            snapshot: RwLock::new(None),
        }
    }

    /// Returns the cached catalog, reloading it when missing or stale.
    /// A failed reload keeps serving the previous snapshot.
    pub async fn current(&self) -> Result<Arc<TechnologyCatalog>> {
        let cached = self.cached();
        match cached {
            Some((catalog, fresh)) if fresh => Ok(catalog),
            Some((stale, _)) => match self.refresh().await {
                Ok(catalog) => Ok(catalog),
                Err(e) => {
                    warn!("Catalog reload failed, serving stale snapshot: {e:#}");
                    Ok(stale)
                }
            },
            None => self.refresh().await,
        }
    }

    /// Rebuilds the snapshot from the reader unconditionally.
    pub async fn refresh(&self) -> Result<Arc<TechnologyCatalog>> {
        let technologies = self.reader.list_all().await?;
        let catalog = Arc::new(TechnologyCatalog::new(technologies));
        info!("Technology catalog loaded ({} entries)", catalog.len());

        let mut guard = self
            .snapshot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(Snapshot {
            catalog: catalog.clone(),
            loaded_at: Instant::now(),
        });
        Ok(catalog)
    }

    /// Drops the snapshot so the next `current()` reloads.
    pub fn invalidate(&self) {
        let mut guard = self
            .snapshot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = None;
    }

    fn cached(&self) -> Option<(Arc<TechnologyCatalog>, bool)> {
        let guard = self
            .snapshot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard
            .as_ref()
            .map(|s| (s.catalog.clone(), s.loaded_at.elapsed() < self.ttl))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub(crate) fn sample_catalog() -> TechnologyCatalog {
        TechnologyCatalog::new(vec![
            Technology::new(1, "Java", Some("backend")),
            Technology::new(2, "Spring Boot", Some("backend")),
            Technology::new(3, "PostgreSQL", Some("database")),
            Technology::new(4, "HTML", Some("frontend")),
            Technology::new(5, "CSS", Some("frontend")),
            Technology::new(6, "Kotlin", Some("mobile")),
            Technology::new(7, "Firebase", Some("mobile")),
            Technology::new(8, "UI/UX", Some("design")),
            Technology::new(9, "Python", Some("backend")),
            Technology::new(10, "Django", Some("backend")),
            Technology::new(11, "Stripe API", Some("payments")),
            Technology::new(12, "JavaScript", Some("frontend")),
            Technology::new(13, "React", Some("frontend")),
            Technology::new(14, "C++", Some("systems")),
        ])
    }

    /// Serves `sample_catalog()` and counts loads.
    pub(crate) struct CountingReader {
        pub loads: AtomicUsize,
    }

    impl CountingReader {
        pub(crate) fn new() -> Arc<Self> {
            Arc::new(Self {
                loads: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl CatalogReader for CountingReader {
        async fn list_all(&self) -> Result<Vec<Technology>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(sample_catalog().all().to_vec())
        }

        async fn find_by_name(&self, name: &str, mode: MatchMode) -> Result<Option<Technology>> {
            Ok(sample_catalog().find_by_name(name, mode).cloned())
        }
    }

    #[test]
    fn test_exact_lookup_is_case_insensitive() {
        let catalog = sample_catalog();
        assert_eq!(catalog.find_by_name("postgresql", MatchMode::Exact).unwrap().id, 3);
        assert!(catalog.find_by_name("postgres", MatchMode::Exact).is_none());
    }

    #[test]
    fn test_resolve_falls_back_to_substring() {
        let catalog = sample_catalog();
        assert_eq!(catalog.resolve("postgres").unwrap().name, "PostgreSQL");
        assert_eq!(catalog.resolve("stripe").unwrap().name, "Stripe API");
        assert!(catalog.resolve("Haskell").is_none());
        assert!(catalog.resolve("   ").is_none());
    }

    #[test]
    fn test_exact_wins_over_substring() {
        // "Java" is a substring of "JavaScript" but must resolve to Java.
        let catalog = sample_catalog();
        assert_eq!(catalog.resolve("java").unwrap().id, 1);
    }

    #[test]
    fn test_find_in_text_matches_whole_words_only() {
        let catalog = sample_catalog();
        let found = catalog.find_in_text("A React frontend with JavaScript and C++ bindings");
        let names: Vec<_> = found.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["C++", "JavaScript", "React"]);
        // "Java" must not match inside "JavaScript"
        assert!(!names.contains(&"Java"));
    }

    #[test]
    fn test_contains_word_boundaries() {
        assert!(contains_word("we use ui/ux research", "ui/ux"));
        assert!(!contains_word("reactive streams", "react"));
        assert!(contains_word("react.", "react"));
        assert!(!contains_word("anything", ""));
    }

    #[tokio::test]
    async fn test_cache_reads_through_once_until_invalidated() {
        let reader = CountingReader::new();
        let cache = CatalogCache::new(reader.clone(), Duration::from_secs(300));

        let first = cache.current().await.unwrap();
        let _second = cache.current().await.unwrap();
        assert_eq!(first.len(), 14);
        assert_eq!(reader.loads.load(Ordering::SeqCst), 1);

        cache.invalidate();
        cache.current().await.unwrap();
        assert_eq!(reader.loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_zero_ttl_reloads_every_time() {
        let reader = CountingReader::new();
        let cache = CatalogCache::new(reader.clone(), Duration::ZERO);
        cache.current().await.unwrap();
        cache.current().await.unwrap();
        assert_eq!(reader.loads.load(Ordering::SeqCst), 2);
    }
}
