// Paginated layout: views are composed into blocks, flowed through fixed page
// frames and returned as positioned items for the PDF writer.
// Pure CPU work; the batch runner calls it from spawn_blocking.

pub mod banner;
pub mod blocks;
pub mod document;
pub mod font_metrics;
pub mod paginator;
pub mod text;

pub use document::{compose, Item, LaidOutDocument, LayoutError, RuleKind};
pub use font_metrics::StandardFont;
