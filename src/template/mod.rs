//! Shareable frame templates and their storage.

pub mod model;
pub mod share;
pub mod store;
