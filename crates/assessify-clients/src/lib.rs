//! assessify-clients — collaborator implementations.
//!
//! Implements the `HierarchyFetcher` and `CacheGateway` traits from
//! `assessify-core`: a reqwest client for the knowledge platform, an
//! in-process TTL cache, and mock implementations for testing.

pub mod cache;
pub mod config;
pub mod error;
pub mod knowledge;
pub mod mock;

pub use cache::MemoryCache;
pub use config::{load_config, load_config_from, AssessifyConfig};
pub use error::ClientError;
pub use knowledge::KnowledgeClient;
pub use mock::{MockCache, MockFetcher};
