#![doc = include_str!("../README.md")]

// Modules
mod common;
mod config;
mod error;
mod kbucket;
mod shared;

pub use crate::common::{Distance, Id, Node, ID_SIZE, MAX_DISTANCE};
pub use config::{Config, DEFAULT_KSIZE, DEFAULT_REFRESH_INTERVAL};
pub use error::{Error, Result};
pub use kbucket::KBucket;
pub use shared::SharedBucket;
