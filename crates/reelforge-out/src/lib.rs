//! Output rendering.
//!
//! Assembles the user-facing strings of an artifact: caption, posting-time
//! hint, posting tips, business rationale, and platform overlay lines.
//! Rendering uses Handlebars with a few custom helpers:
//! - `join`: join an array with a separator
//! - `truncate`: cap a string at a max length with ellipsis
//! - `title`: uppercase the first letter

pub mod renderer;
pub mod templates;

pub use renderer::OutputRenderer;
