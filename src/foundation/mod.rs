pub mod core;
pub(crate) mod env;
pub mod error;
pub(crate) mod math;
