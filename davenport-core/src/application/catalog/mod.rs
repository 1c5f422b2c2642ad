//! Hybrid inventory lookup: vector search first, keyword fallback.

mod envelope;
mod lookup;


pub use envelope::LookupEnvelope;
pub use lookup::{DEFAULT_RESULT_LIMIT, InventoryLookup, TOOL_NAME};
