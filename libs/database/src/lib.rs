//! Database connectors and utilities.
//!
//! Currently backs the song catalog with MongoDB. Connection settings come
//! from [`mongodb::MongoConfig`], optionally loaded from the environment with
//! the `config` feature.
//!
//! # Features
//!
//! - `mongodb` (default) - MongoDB connector, health checks
//! - `config` - `core_config::FromEnv` support for `MongoConfig`
//!
//! # Example
//!
//! ```ignore
//! use database::mongodb;
//!
//! let config = mongodb::MongoConfig::with_database("mongodb://localhost:27017", "song_list");
//! let client = mongodb::connect_from_config_with_retry(&config, None).await?;
//! let db = client.database(config.database());
//! ```

pub mod common;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use common::{DatabaseError, DatabaseResult};
