//! Type aliases for commonly used shared and callback types.

pub mod aliases;

pub use aliases::*;
