//! General-use utility functions.

pub mod errors;
pub mod files;
pub(crate) mod log;
