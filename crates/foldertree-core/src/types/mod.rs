//! Core type definitions used across the FolderTree workspace.

pub mod id;
pub mod pagination;

pub use id::*;
pub use pagination::PageRequest;
