//! Blocking HTTP access to the PokeAPI REST boundary.
//!
//! Requests are issued one at a time over a shared agent; there are no
//! retries and no timeout beyond the library defaults. The caller decides
//! what to do with a failure.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// Public API root used when no override is given.
pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// One entry of the paginated index listing: a name and its detail URL.
#[derive(Debug, Clone, Deserialize)]
pub struct PokemonRef {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    results: Vec<PokemonRef>,
}

/// Fetch seam used by the extraction driver so tests can substitute a stub.
pub trait Fetch {
    /// GET `url` and parse the body as JSON.
    ///
    /// Non-2xx responses map to [`Error::Status`], network failures to
    /// [`Error::Transport`].
    fn fetch_json(&self, url: &str) -> Result<Value>;
}

/// Fetch the paginated index and return the detail refs in listing order.
pub fn list_pokemon(fetcher: &impl Fetch, base_url: &str, limit: u32) -> Result<Vec<PokemonRef>> {
    let url = format!("{base_url}/pokemon?limit={limit}");
    let listing: ListResponse = serde_json::from_value(fetcher.fetch_json(&url)?)?;
    Ok(listing.results)
}

/// Blocking client over a shared [`ureq::Agent`] (keeps connections alive
/// across the sequential detail fetches).
pub struct ApiClient {
    agent: ureq::Agent,
}

impl ApiClient {
    pub fn new() -> Self {
        ApiClient {
            agent: ureq::agent(),
        }
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        ApiClient::new()
    }
}

impl Fetch for ApiClient {
    fn fetch_json(&self, url: &str) -> Result<Value> {
        match self.agent.get(url).call() {
            Ok(resp) => {
                let body = resp.into_string()?;
                Ok(serde_json::from_str(&body)?)
            }
            Err(ureq::Error::Status(status, resp)) => Err(Error::Status {
                url: url.to_string(),
                status,
                body: resp.into_string().unwrap_or_default(),
            }),
            Err(ureq::Error::Transport(transport)) => Err(Error::Transport {
                url: url.to_string(),
                source: Box::new(transport),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct CannedFetcher(Value);

    impl Fetch for CannedFetcher {
        fn fetch_json(&self, _url: &str) -> Result<Value> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_listing_preserves_order() {
        let fetcher = CannedFetcher(json!({
            "count": 1302,
            "next": "https://pokeapi.co/api/v2/pokemon?offset=3&limit=3",
            "results": [
                {"name": "bulbasaur", "url": "https://pokeapi.co/api/v2/pokemon/1/"},
                {"name": "ivysaur", "url": "https://pokeapi.co/api/v2/pokemon/2/"},
                {"name": "venusaur", "url": "https://pokeapi.co/api/v2/pokemon/3/"}
            ]
        }));

        let refs = list_pokemon(&fetcher, DEFAULT_BASE_URL, 3).unwrap();
        assert_eq!(refs.len(), 3);
        assert_eq!(refs[0].name, "bulbasaur");
        assert_eq!(refs[2].url, "https://pokeapi.co/api/v2/pokemon/3/");
    }

    #[test]
    fn test_listing_without_results_is_a_json_error() {
        let fetcher = CannedFetcher(json!({"count": 0}));
        let err = list_pokemon(&fetcher, DEFAULT_BASE_URL, 3).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
