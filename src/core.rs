pub mod dom;
pub mod features;
pub mod history;
pub mod matching;
pub mod provenance;
pub mod session;
