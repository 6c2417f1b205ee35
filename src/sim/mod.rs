//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one call to [`tick`] per frame)
//! - Seeded RNG only
//! - Flat entity lists iterated in insertion order
//! - No terminal or device dependencies; audio goes through [`crate::audio::SoundBank`]

pub mod collision;
pub mod input;
pub mod outcome;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod weapon;

pub use input::{CheatCode, FrameIntent, HeldKeys, InputSampler, KeyPress};
pub use outcome::{Achievement, GameOverReason, RoundSummary, evaluate};
pub use state::{
    AbortPrompt, Boss, BossBullet, Bullet, Debris, Drone, Enemy, EnemyKind, EnergyBeam, Explosion, GameEvent,
    KillSource, Player, PowerUp, PowerUpKind, Star, World,
};
pub use tick::{advance_destruction, begin_ship_destruction, tick};
pub use weapon::{BeamPhase, WeaponKind};
