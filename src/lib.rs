//! BA-BAAM! - A side-scrolling space shooter for the terminal
//!
//! Core modules:
//! - `sim`: Fixed-timestep simulation (entities, weapons, spawning, collisions)
//! - `audio`: Sound bank interface and loop direction
//! - `renderer`: Terminal drawing of a world snapshot
//! - `platform`: Raw keyboard listener, frame pacing, terminal size checks
//! - `persistence`: High score file storage
//! - `highscores`: Per-screen-size leaderboard rules

pub mod audio;
pub mod error;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::{GameError, Result};
pub use highscores::HighScores;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Simulation rate (frames per second)
    pub const SIM_HZ: u32 = 30;

    /// Minimum supported terminal size
    pub const MIN_TERM_WIDTH: u16 = 80;
    pub const MIN_TERM_HEIGHT: u16 = 24;

    /// Player ship
    pub const PLAYER_WIDTH: f32 = 3.0;
    pub const PLAYER_HEIGHT: f32 = 3.0;
    pub const PLAYER_SPEED: f32 = 0.5;
    pub const PLAYER_START_HEALTH: i32 = 3;
    /// Health pickups may overflow max health by this much
    pub const HEALTH_OVERFLOW: i32 = 3;

    /// Weapon cooldowns (frames)
    pub const FIRE_COOLDOWN: u32 = 5;
    pub const RAPID_FIRE_COOLDOWN: u32 = 2;
    pub const BEAM_FIRE_COOLDOWN: u32 = 2;
    pub const PLASMA_DAMAGE: i32 = 3;
    pub const SPREAD_DAMAGE: i32 = 1;
    pub const BULLET_SPEED: f32 = 2.0;

    /// Energy beam
    pub const BEAM_MAX_LENGTH: u32 = 60;
    pub const BEAM_START_LENGTH: u32 = 15;
    pub const BEAM_LIFETIME: u32 = 10;
    /// Frames at full power before the beam overheats (3 seconds)
    pub const BEAM_DECAY_FRAMES: u32 = 90;
    pub const BEAM_BOSS_DAMAGE: f32 = 0.5;

    /// Power-up durations (frames)
    pub const RAPID_FIRE_FRAMES: u32 = 300;
    pub const SHIELD_FRAMES: u32 = 360;

    /// Generic hit flash (frames)
    pub const FLASH_FRAMES: u32 = 6;
    pub const SPARK_FRAMES: u32 = 6;

    /// Spawning cadence
    pub const INITIAL_SPAWN_RATE: u64 = 30;
    pub const MIN_SPAWN_RATE: u64 = 10;
    pub const DIFFICULTY_INTERVAL: u64 = 300;
    pub const FIRST_BOSS_KILLS: u32 = 30;
    pub const BOSS_KILL_STEP: u32 = 50;

    /// Boss
    pub const BOSS_SPEED: f32 = 0.15;
    pub const BOSS_FIRE_INTERVAL: u32 = 40;
    /// Fixed hit threshold around the boss anchor (not derived from its sprite)
    pub const BOSS_HIT_RADIUS: f32 = 2.0;
    pub const BOSS_BULLET_SPEED: f32 = 0.8;
    /// Boss bullets bounce off the cargo ship at this x
    pub const RICOCHET_X: f32 = 2.0;

    /// Drones
    pub const DRONE_LIFETIME: u32 = 480;
    pub const DRONE_SPEED: f32 = 0.4;
    pub const DRONE_STANDOFF: f32 = 8.0;
    pub const DRONE_FIRE_RANGE: f32 = 30.0;
    pub const DRONE_ORBIT_RADIUS: f32 = 8.0;
    pub const DRONE_ORBIT_STEP: f32 = 0.1;

    /// Power-ups
    pub const POWERUP_SPEED: f32 = 0.2;
    pub const POWERUP_PICKUP_POINTS: u32 = 10;

    /// Cargo ship (GENESIS) hull on the left edge
    pub const GENESIS_X: f32 = -23.0;
    pub const GENESIS_WIDTH: f32 = 24.0;

    /// Debris
    pub const DEBRIS_GRAVITY: f32 = 0.05;
    pub const DEBRIS_LIFETIME: u32 = 60;
}

/// Key identifying a terminal size, e.g. `"80x24"`
pub fn dimension_key(width: u16, height: u16) -> String {
    format!("{}x{}", width, height)
}
