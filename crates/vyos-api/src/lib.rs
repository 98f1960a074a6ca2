// vyos-api: Async Rust client for the VyOS HTTP configuration API

pub mod client;
pub mod error;
pub mod path;
pub mod store;
pub mod transport;
pub mod tree;

pub use client::VyosClient;
pub use error::Error;
pub use path::{ConfigPath, PathError};
pub use store::{ConfigStore, Operation, StoreReply};
pub use transport::{TlsMode, TransportConfig};
pub use tree::TreeNode;

// Re-exported so downstream crates speak the same HTTP vocabulary.
pub use reqwest::{Method, StatusCode};
