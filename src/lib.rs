//! # Kiln - PokeAPI ELT pipeline
//!
//! Extracts pokemon data from the public PokeAPI, stages it into raw
//! SQLite tables, and orchestrates dbt transformations over the staged
//! data.
//!
//! ## Modules
//!
//! - **api**: blocking REST access (index listing + detail fetches)
//! - **melt**: flatten one nested detail payload into staging rows
//! - **store**: SQLite staging store (schema, full-refresh clear, inserts)
//! - **extract**: sequential extraction driver with fixed-rate throttling
//! - **pipeline**: subprocess orchestration for extract/transform/docs
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::Utc;
//! use kiln::melt::melt_pokemon;
//! use kiln::store::RawStore;
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let detail = json!({
//!     "id": 1, "name": "bulbasaur", "height": 7, "weight": 69,
//!     "types": [{"slot": 1, "type": {"name": "grass"}}],
//!     "abilities": [{"slot": 1, "ability": {"name": "overgrow"}}],
//!     "stats": [{"stat": {"name": "hp"}, "base_stat": 45, "effort": 0}]
//! });
//!
//! let store = RawStore::open_in_memory()?;
//! store.insert_pokemon(&melt_pokemon(&detail, Utc::now())?)?;
//! assert_eq!(store.counts()?.pokemon, 1);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod error;
pub mod extract;
pub mod melt;
pub mod pipeline;
pub mod store;

// Re-export commonly used types for convenience
pub use api::{ApiClient, Fetch, PokemonRef};
pub use error::{Error, Result};
pub use extract::{run_extraction, ExtractConfig, ExtractReport};
pub use melt::{melt_pokemon, MeltedPokemon};
pub use pipeline::{run_pipeline, PipelineConfig, PipelineReport};
pub use store::{RawCounts, RawStore};
