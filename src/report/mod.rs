//! Report module - summarizing prediction runs

pub mod export;
pub mod summary;

pub use export::*;
pub use summary::*;
