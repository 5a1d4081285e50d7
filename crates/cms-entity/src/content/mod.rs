//! Content (posts and pages) entities.

pub mod model;

pub use model::{Content, ContentDraft, ContentKind, ContentStatus};
