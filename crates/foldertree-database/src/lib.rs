//! # foldertree-database
//!
//! SQLite connection management, the tree integrity checker, and the
//! transactional [`FolderStore`].

pub mod connection;
pub mod error;
pub mod migration;
pub mod repositories;
pub mod tree;

pub use connection::DatabasePool;
pub use repositories::FolderStore;
