//! Configuration sources
//!
//! Each source produces a [`PartialConfig`](crate::PartialConfig) that the
//! merger combines by priority.

pub mod env;
pub mod file;

pub use env::EnvSource;
pub use file::FileSource;
