//! Data types for the proposal model.

mod collection;
mod document;
mod line_item;
mod metrics;
mod snapshot;

pub use collection::*;
pub use document::*;
pub use line_item::*;
pub use metrics::*;
pub use snapshot::*;
