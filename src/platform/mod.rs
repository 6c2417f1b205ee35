//! Platform layer
//!
//! Everything that touches the real terminal or the clock:
//! - Keyboard listener thread (held keys + discrete presses)
//! - Frame pacing
//! - Terminal session setup and size checks

pub mod input;
pub mod terminal;
pub mod time;

pub use input::{InputListener, KeyState};
pub use terminal::{SizeWatch, TerminalGuard, check_min_size};
pub use time::FramePacer;
