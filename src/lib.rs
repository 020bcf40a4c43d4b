pub mod backend;
pub mod config;
pub mod error;
pub mod geometry;
pub mod host;
pub mod math;
pub mod operations;

pub use error::{ErrorKind, Result, SeismodensError};
