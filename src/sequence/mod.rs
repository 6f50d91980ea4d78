//! Timeline assembly and frame production.

/// Per-entry frame cursors.
pub mod cursor;
/// Timeline entries.
pub mod entry;
/// Frame production over a timeline.
pub mod render;
/// Timeline layout and cross-fade windows.
pub mod timeline;
