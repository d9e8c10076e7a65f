//! In-page selection translation.
//!
//! A [`PageSession`] owns one page's document, its undo history and the
//! records of original content. The trigger layer sends it [`Message`]s;
//! every action ends in a [`Notification`] rather than an error.

pub mod api;
pub mod config;
pub mod core;
pub mod logging;
pub mod shared;

pub use crate::core::dom::{BoundaryPoint, Document, NodeId, Range, Selection};
pub use crate::core::features::translator::{DeepLService, TranslationResponse, TranslationService};
pub use crate::core::history::{HistoryEntry, UndoHistory};
pub use crate::core::session::PageSession;
pub use crate::shared::emit::{Notifier, RecordingNotifier, TracingNotifier};
pub use crate::shared::error::{AppError, AppResult};
pub use crate::shared::events::{Notification, NotificationKind};
pub use crate::shared::settings::{
    ApiType, FileSettingsStore, SettingsProvider, StaticSettings, UserSettings,
};
pub use crate::shared::types::Message;
