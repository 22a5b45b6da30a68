//! Extraction driver: full-refresh staging load from the paginated API.
//!
//! The driver is fully sequential. It clears the staging tables, fetches
//! the index listing, then fetches and loads each detail URL in listing
//! order with a fixed pause between requests. A listing failure aborts the
//! run; a per-item failure is recorded and the run continues.

use std::thread;
use std::time::Duration;

use chrono::Utc;

use crate::api::{list_pokemon, Fetch, DEFAULT_BASE_URL};
use crate::error::Result;
use crate::melt::melt_pokemon;
use crate::store::{RawCounts, RawStore};

/// Knobs for one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// API root, e.g. `https://pokeapi.co/api/v2`.
    pub base_url: String,
    /// Number of items requested from the index endpoint.
    pub limit: u32,
    /// Fixed pause between consecutive requests. A courtesy throttle for
    /// the upstream API, not adaptive backoff.
    pub delay: Duration,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        ExtractConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            limit: 151,
            delay: Duration::from_millis(100),
        }
    }
}

/// One detail URL that failed to fetch or load.
#[derive(Debug, Clone)]
pub struct ItemFailure {
    pub url: String,
    pub error: String,
}

/// Aggregate result of one extraction run.
#[derive(Debug)]
pub struct ExtractReport {
    /// Items the listing returned.
    pub attempted: usize,
    /// Items that fetched, melted and inserted cleanly.
    pub loaded: usize,
    pub failures: Vec<ItemFailure>,
    /// Per-table row counts after the run.
    pub counts: RawCounts,
}

/// Run a full-refresh extraction: clear the staging tables, list the
/// items, then fetch and load each one in listing order.
///
/// Per-item errors are collected into the report rather than aborting the
/// run; the fixed delay applies between requests regardless of outcome.
pub fn run_extraction(
    fetcher: &impl Fetch,
    store: &RawStore,
    config: &ExtractConfig,
) -> Result<ExtractReport> {
    println!("Clearing existing raw data...");
    store.clear()?;
    println!("✓ Raw tables cleared\n");

    println!("Fetching list of {} pokemon...", config.limit);
    let refs = list_pokemon(fetcher, &config.base_url, config.limit)?;
    println!("✓ Found {} pokemon\n", refs.len());

    let mut loaded = 0usize;
    let mut failures = Vec::new();

    for (i, item) in refs.iter().enumerate() {
        match fetch_and_load(fetcher, store, &item.url) {
            Ok(()) => loaded += 1,
            Err(e) => {
                eprintln!("  ✗ Error processing {}: {}", item.url, e);
                failures.push(ItemFailure {
                    url: item.url.clone(),
                    error: e.to_string(),
                });
            }
        }

        if (i + 1) % 10 == 0 {
            println!("  Processed {}/{} pokemon...", i + 1, refs.len());
        }

        if i + 1 < refs.len() {
            thread::sleep(config.delay);
        }
    }

    Ok(ExtractReport {
        attempted: refs.len(),
        loaded,
        failures,
        counts: store.counts()?,
    })
}

fn fetch_and_load(fetcher: &impl Fetch, store: &RawStore, url: &str) -> Result<()> {
    let detail = fetcher.fetch_json(url)?;
    let melted = melt_pokemon(&detail, Utc::now())?;
    store.insert_pokemon(&melted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::{json, Value};
    use std::collections::{HashMap, HashSet};

    /// Serves canned payloads by URL; listed-but-missing URLs fail.
    struct StubFetcher {
        responses: HashMap<String, Value>,
        failing: HashSet<String>,
    }

    impl StubFetcher {
        fn new() -> Self {
            StubFetcher {
                responses: HashMap::new(),
                failing: HashSet::new(),
            }
        }

        fn with_listing(mut self, base_url: &str, names: &[&str]) -> Self {
            let results: Vec<Value> = names
                .iter()
                .map(|name| json!({"name": name, "url": detail_url(name)}))
                .collect();
            self.responses.insert(
                format!("{}/pokemon?limit={}", base_url, names.len()),
                json!({"results": results}),
            );
            self
        }

        fn with_detail(mut self, name: &str, id: i64) -> Self {
            self.responses.insert(detail_url(name), detail(name, id));
            self
        }

        fn with_failure(mut self, name: &str) -> Self {
            self.failing.insert(detail_url(name));
            self
        }
    }

    impl Fetch for StubFetcher {
        fn fetch_json(&self, url: &str) -> Result<Value> {
            if self.failing.contains(url) {
                return Err(Error::Status {
                    url: url.to_string(),
                    status: 500,
                    body: "internal server error".to_string(),
                });
            }
            self.responses.get(url).cloned().ok_or_else(|| Error::Status {
                url: url.to_string(),
                status: 404,
                body: "not found".to_string(),
            })
        }
    }

    fn detail_url(name: &str) -> String {
        format!("https://api.test/v2/pokemon/{name}/")
    }

    /// A detail payload with 2 types, 3 abilities and 6 stats.
    fn detail(name: &str, id: i64) -> Value {
        json!({
            "id": id,
            "name": name,
            "height": 10,
            "weight": 100,
            "base_experience": 64,
            "types": [
                {"slot": 1, "type": {"name": "grass"}},
                {"slot": 2, "type": {"name": "poison"}}
            ],
            "abilities": [
                {"slot": 1, "ability": {"name": "overgrow"}},
                {"slot": 2, "ability": {"name": "vigor"}},
                {"slot": 3, "ability": {"name": "chlorophyll"}, "is_hidden": true}
            ],
            "stats": [
                {"stat": {"name": "hp"}, "base_stat": 45, "effort": 0},
                {"stat": {"name": "attack"}, "base_stat": 49, "effort": 0},
                {"stat": {"name": "defense"}, "base_stat": 49, "effort": 0},
                {"stat": {"name": "special-attack"}, "base_stat": 65, "effort": 1},
                {"stat": {"name": "special-defense"}, "base_stat": 65, "effort": 0},
                {"stat": {"name": "speed"}, "base_stat": 45, "effort": 0}
            ]
        })
    }

    fn config(limit: u32) -> ExtractConfig {
        ExtractConfig {
            base_url: "https://api.test/v2".to_string(),
            limit,
            delay: Duration::ZERO,
        }
    }

    #[test]
    fn test_extraction_loads_every_listed_item() {
        let fetcher = StubFetcher::new()
            .with_listing("https://api.test/v2", &["bulbasaur", "ivysaur", "venusaur"])
            .with_detail("bulbasaur", 1)
            .with_detail("ivysaur", 2)
            .with_detail("venusaur", 3);
        let store = RawStore::open_in_memory().unwrap();

        let report = run_extraction(&fetcher, &store, &config(3)).unwrap();

        assert_eq!(report.attempted, 3);
        assert_eq!(report.loaded, 3);
        assert!(report.failures.is_empty());
        assert_eq!(report.counts.pokemon, 3);
        assert_eq!(report.counts.types, 6);
        assert_eq!(report.counts.abilities, 9);
        assert_eq!(report.counts.stats, 18);
    }

    #[test]
    fn test_one_failing_item_does_not_abort_the_run() {
        let fetcher = StubFetcher::new()
            .with_listing("https://api.test/v2", &["bulbasaur", "ivysaur", "venusaur"])
            .with_detail("bulbasaur", 1)
            .with_detail("venusaur", 3)
            .with_failure("ivysaur");
        let store = RawStore::open_in_memory().unwrap();

        let report = run_extraction(&fetcher, &store, &config(3)).unwrap();

        assert_eq!(report.loaded, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].url, detail_url("ivysaur"));
        assert_eq!(report.counts.pokemon, 2);
        assert_eq!(
            store.pokemon_names().unwrap(),
            vec!["bulbasaur".to_string(), "venusaur".to_string()]
        );
    }

    #[test]
    fn test_listing_failure_is_fatal() {
        // No listing response registered, so the index call 404s.
        let fetcher = StubFetcher::new().with_detail("bulbasaur", 1);
        let store = RawStore::open_in_memory().unwrap();

        let err = run_extraction(&fetcher, &store, &config(1)).unwrap_err();
        assert!(matches!(err, Error::Status { status: 404, .. }));
        assert_eq!(store.counts().unwrap().pokemon, 0);
    }

    #[test]
    fn test_rerun_is_an_idempotent_full_refresh() {
        let fetcher = StubFetcher::new()
            .with_listing("https://api.test/v2", &["bulbasaur", "ivysaur"])
            .with_detail("bulbasaur", 1)
            .with_detail("ivysaur", 2);
        let store = RawStore::open_in_memory().unwrap();

        let first = run_extraction(&fetcher, &store, &config(2)).unwrap();
        let second = run_extraction(&fetcher, &store, &config(2)).unwrap();

        assert_eq!(first.counts, second.counts);
        assert_eq!(second.counts.pokemon, 2);
        assert_eq!(
            store.pokemon_names().unwrap(),
            vec!["bulbasaur".to_string(), "ivysaur".to_string()]
        );
    }
}
