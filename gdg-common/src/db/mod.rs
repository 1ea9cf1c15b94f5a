//! Database access shared across GoodDeedGo binaries

pub mod init;

pub use init::{create_tables, init_database};
