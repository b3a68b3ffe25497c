// Resume generation service surface: HTTP handlers and output-directory housekeeping.
// All rendering goes through crate::render; nothing here builds LaTeX.

pub mod files;
pub mod handlers;
