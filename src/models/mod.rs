//! Data models for textenrich.

mod document;
mod entity;

pub use document::{Document, DocumentError};
pub use entity::{is_translatable, EntityRecord, MentionSpan, TRANSLATABLE_ENTITY_TYPES};
