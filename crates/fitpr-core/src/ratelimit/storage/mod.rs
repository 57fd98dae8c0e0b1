//! Rate limit record stores

pub mod memory;
