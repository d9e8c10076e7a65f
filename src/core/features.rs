//! User-facing actions run against a page session

pub mod translator;
pub mod undo;
