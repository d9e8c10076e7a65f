pub mod error;
pub mod events;
pub mod emit;
pub mod settings;
pub mod types;

pub use error::{AppError, AppResult};
