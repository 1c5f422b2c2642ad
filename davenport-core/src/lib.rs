//! Davenport core: the conversational inventory agent engine.
//!
//! The engine is organised the same way end to end: `domain` holds the plain
//! data types, `application` holds the agent loop, lookup tool, and
//! checkpointing, and `infrastructure` holds the model clients, the catalog
//! store, and the REST surface.

mod application;
mod config;
mod domain;
mod infrastructure;

pub use application::{agent, catalog, checkpoint};
pub use config::{AppConfig, ConfigError, RestServerConfig};
pub use domain::types;
pub use infrastructure::{model, server, store};
