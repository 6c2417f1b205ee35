//! Per-frame intent derived from keyboard state
//!
//! Movement and fire are level-triggered from held keys. Weapon select, pause,
//! quit, the abort confirmation answer and cheat codes are edge-triggered from
//! discrete key presses.

use glam::Vec2;

use super::weapon::WeaponKind;
use crate::consts::PLAYER_SPEED;

/// Keys currently held down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldKeys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub fire: bool,
}

/// A discrete key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPress {
    Char(char),
    Escape,
    Enter,
    Backspace,
    /// Arrow keys never touch the cheat buffer
    Arrow,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheatCode {
    /// `00000`: launch a drone wing
    DroneWing,
    /// `EEEEE`: unlock and equip the energy beam
    EnergyBeam,
}

/// What the player wants to do this frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameIntent {
    pub movement: Vec2,
    pub firing: bool,
    pub weapon_select: Option<WeaponKind>,
    pub pause_toggled: bool,
    pub cheat: Option<CheatCode>,
    /// ESC: asks to abort, or backs out of the abort prompt
    pub quit_requested: bool,
    /// Answer to the abort prompt: `y` is Some(true), `n` is Some(false)
    pub confirm: Option<bool>,
}

const CHEAT_LEN: usize = 5;

/// Turns raw key state into [`FrameIntent`]s, tracking the cheat buffer
#[derive(Debug, Default)]
pub struct InputSampler {
    cheat_buffer: String,
}

impl InputSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build this frame's intent from held keys and presses since last frame
    pub fn sample(&mut self, held: HeldKeys, presses: &[KeyPress]) -> FrameIntent {
        let mut intent = FrameIntent {
            movement: movement(held),
            firing: held.fire,
            ..FrameIntent::default()
        };

        for &press in presses {
            match press {
                KeyPress::Escape => intent.quit_requested = true,
                KeyPress::Char('p' | 'P') => intent.pause_toggled = !intent.pause_toggled,
                KeyPress::Char('y' | 'Y') => intent.confirm = Some(true),
                KeyPress::Char('n' | 'N') => intent.confirm = Some(false),
                KeyPress::Char(c) => {
                    if let Some(weapon) = WeaponKind::from_key(c) {
                        intent.weapon_select = Some(weapon);
                    }
                }
                _ => {}
            }
            if let Some(cheat) = self.feed_cheat(press) {
                intent.cheat = Some(cheat);
            }
        }
        intent
    }

    fn feed_cheat(&mut self, press: KeyPress) -> Option<CheatCode> {
        let symbol = match press {
            KeyPress::Char('0') => '0',
            KeyPress::Char('e' | 'E') => 'E',
            KeyPress::Arrow => return None,
            _ => {
                self.cheat_buffer.clear();
                return None;
            }
        };

        self.cheat_buffer.push(symbol);
        if self.cheat_buffer.len() > CHEAT_LEN {
            self.cheat_buffer.remove(0);
        }

        let cheat = match self.cheat_buffer.as_str() {
            "00000" => Some(CheatCode::DroneWing),
            "EEEEE" => Some(CheatCode::EnergyBeam),
            _ => None,
        };
        if cheat.is_some() {
            log::info!("Cheat code entered: {:?}", cheat);
            self.cheat_buffer.clear();
        }
        cheat
    }
}

/// Held arrows to velocity. Down wins over up, right over left.
fn movement(held: HeldKeys) -> Vec2 {
    let mut v = Vec2::ZERO;
    if held.up {
        v.y = -PLAYER_SPEED;
    }
    if held.down {
        v.y = PLAYER_SPEED;
    }
    if held.left {
        v.x = -PLAYER_SPEED;
    }
    if held.right {
        v.x = PLAYER_SPEED;
    }
    v
}
