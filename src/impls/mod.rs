//! Junction file system and archive implementations

pub mod junction;
pub mod memory;
pub mod physical;
