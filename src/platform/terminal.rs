//! Terminal session setup and size checks

use std::io::Write;

use crossterm::{
    ExecutableCommand, cursor,
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    terminal,
};

use crate::audio::{AudioManager, SoundBank};
use crate::consts::{MIN_TERM_HEIGHT, MIN_TERM_WIDTH};
use crate::error::{GameError, Result};
use crate::sim::World;
use crate::sim::tick::{lock_for_resize, unlock_after_resize};

/// Current terminal size in cells
pub fn size() -> Result<(u16, u16)> {
    Ok(terminal::size()?)
}

/// Refuse to start on a terminal smaller than the minimum play field
pub fn check_min_size(width: u16, height: u16) -> Result<()> {
    if width < MIN_TERM_WIDTH || height < MIN_TERM_HEIGHT {
        return Err(GameError::TerminalTooSmall {
            width,
            height,
            min_width: MIN_TERM_WIDTH,
            min_height: MIN_TERM_HEIGHT,
        });
    }
    Ok(())
}

/// Raw mode + alternate screen for the lifetime of the guard
///
/// Restores the terminal on drop, including on early returns and panics
/// that unwind.
pub struct TerminalGuard<W: Write> {
    out: W,
    keyboard_enhanced: bool,
}

impl<W: Write> TerminalGuard<W> {
    pub fn enter(mut out: W) -> Result<Self> {
        terminal::enable_raw_mode()?;
        out.execute(terminal::EnterAlternateScreen)?;
        out.execute(cursor::Hide)?;

        // Key release events where the terminal supports them; others fall back
        // to the hold window in the listener
        let keyboard_enhanced = matches!(terminal::supports_keyboard_enhancement(), Ok(true))
            && out
                .execute(PushKeyboardEnhancementFlags(
                    KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
                ))
                .is_ok();
        log::info!("Terminal ready (keyboard enhancement: {})", keyboard_enhanced);

        Ok(Self {
            out,
            keyboard_enhanced,
        })
    }

    pub fn keyboard_enhanced(&self) -> bool {
        self.keyboard_enhanced
    }

    pub fn out(&mut self) -> &mut W {
        &mut self.out
    }
}

impl<W: Write> Drop for TerminalGuard<W> {
    fn drop(&mut self) {
        if self.keyboard_enhanced {
            let _ = self.out.execute(PopKeyboardEnhancementFlags);
        }
        let _ = self.out.execute(cursor::Show);
        let _ = self.out.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        let _ = self.out.flush();
        log::info!("Terminal restored");
    }
}

/// Compares the live terminal size against the size the session started at
#[derive(Debug, Clone, Copy)]
pub struct SizeWatch {
    min_width: u16,
    min_height: u16,
}

impl SizeWatch {
    pub fn new(min_width: u16, min_height: u16) -> Self {
        Self {
            min_width,
            min_height,
        }
    }

    pub fn fits(&self, width: u16, height: u16) -> bool {
        width >= self.min_width && height >= self.min_height
    }

    /// Lock or unlock the round for a live size; returns whether it fits
    pub fn apply<B: SoundBank>(
        &self,
        world: &mut World,
        audio: &mut AudioManager<B>,
        width: u16,
        height: u16,
    ) -> bool {
        let fits = self.fits(width, height);
        if fits {
            unlock_after_resize(world);
        } else {
            lock_for_resize(world, audio);
        }
        fits
    }
}
