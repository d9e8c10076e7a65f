//! Entry points for the trigger layer
//!
//! The context menu and keyboard commands both end up as a [`Message`]
//! delivered to the page session.
//!
//! [`Message`]: crate::shared::types::Message

pub mod commands;
