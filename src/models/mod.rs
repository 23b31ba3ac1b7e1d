//! Models module - artifacts, classifier evaluation and the repository

pub mod artifact;
pub mod classifier;
pub mod repository;

pub use artifact::*;
pub use repository::*;
