//! Core moderation engine for turn-based parent-child conversations.
//!
//! The engine sits between a parent and a minimally verbal child: the parent
//! writes free text, the child answers by picking AAC cards, and
//! [`ModeratorSession`] enforces strict turn alternation while generator
//! collaborators supply card recommendations, parent guides, and example
//! messages. Everything a session does is persisted through the
//! [`storage::SessionStorage`] trait so a host can replay or resume it.

pub mod config;
pub mod error;
pub mod generators;
pub mod model;
pub mod moderator;
pub mod static_guides;
pub mod storage;
pub mod tasks;
pub mod topic;

pub use error::{ModerationError, Result};
pub use moderator::{Collaborators, ModeratorSession};
