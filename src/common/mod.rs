//! Identifier and node value types shared by every bucket.

mod id;
mod node;

pub use id::*;
pub use node::*;
