//! # GoodDeedGo Common Library
//!
//! Shared code for GoodDeedGo service binaries including:
//! - Error types
//! - Configuration loading and root folder resolution
//! - Database initialization and schema

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
