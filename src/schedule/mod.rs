//! Schedule module turning cached death times into a board.
//!
//! This module handles:
//! - Display modes and derived board entries
//! - The parse/offset/sort pipeline
//! - HTML and JSON rendering of the board

pub mod pipeline;
pub mod render;
pub mod types;

pub use pipeline::{Presenter, DEATH_TIME_FORMAT, DISPLAY_TIME_FORMAT, RESPAWN_OFFSET_HOURS};
pub use render::{table_rows, BoardRenderer};
pub use types::{DisplayEntry, Mode, TableRow};
