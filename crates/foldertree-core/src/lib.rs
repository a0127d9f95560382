//! # foldertree-core
//!
//! Core crate for FolderTree. Contains configuration schemas, typed
//! identifiers, pagination types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other FolderTree crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
