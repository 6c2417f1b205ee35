//! Terminal rendering module
//!
//! Draws into a cell canvas sized to the live terminal and flushes only the
//! cells that changed through crossterm.

pub mod canvas;
pub mod screens;
pub mod terminal;

pub use canvas::{Canvas, Cell};
pub use terminal::TerminalRenderer;
