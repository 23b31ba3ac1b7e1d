//! Pipeline module - orchestrates the prediction stages

pub mod batch;
pub mod cleaner;
pub mod config;
pub mod encoder;
pub mod ensemble;
pub mod features;
pub mod loader;
pub mod missing;
pub mod router;
pub mod scaler;
pub mod schema;
pub mod service;
pub mod statistics;

pub use batch::{Batch, RowId};
pub use cleaner::*;
pub use config::*;
pub use encoder::*;
pub use ensemble::*;
pub use features::*;
pub use loader::*;
pub use missing::{detect_missing, impute, impute_with};
pub use router::*;
pub use scaler::*;
pub use schema::*;
pub use service::*;
pub use statistics::*;
