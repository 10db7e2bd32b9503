//! Run orchestration for docreview: the keyed run registry, the background
//! run controller, and plain-text document loading.

pub mod controller;
pub mod document;
pub mod store;

pub use controller::{ReviewInput, ReviewRequest, cancel_run, start_review};
pub use document::load_document;
pub use store::{RunSnapshot, RunStore};
