//! Round outcome and achievements

use super::state::{RoundStats, World};

/// Why a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverReason {
    PlayerDied,
    CargoCaptured,
    NukeSacrifice,
    /// Player quit with ESC
    Aborted,
}

impl GameOverReason {
    pub fn as_str(self) -> &'static str {
        match self {
            GameOverReason::PlayerDied => "player_died",
            GameOverReason::CargoCaptured => "cargo_captured",
            GameOverReason::NukeSacrifice => "nuke_sacrifice",
            GameOverReason::Aborted => "aborted",
        }
    }

    /// Headline for the game over screen
    pub fn headline(self) -> &'static str {
        match self {
            GameOverReason::PlayerDied => "YOUR SHIP WAS DESTROYED",
            GameOverReason::CargoCaptured => "THE GENESIS CARGO WAS CAPTURED",
            GameOverReason::NukeSacrifice => "YOU SACRIFICED YOUR SHIP",
            GameOverReason::Aborted => "MISSION ABORTED",
        }
    }

    /// Whether the ship blows apart before the game over screen
    pub fn destroys_ship(self) -> bool {
        matches!(
            self,
            GameOverReason::PlayerDied | GameOverReason::NukeSacrifice
        )
    }
}

/// Boss generation a round must reach before achievements count
pub const ACHIEVEMENT_MIN_BOSS_LEVEL: u32 = 3;

/// Hit ratio needed for SHARPSHOOTER
pub const SHARPSHOOTER_ACCURACY: f32 = 0.18;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Achievement {
    /// No enemy reached the cargo ship
    PerfectDefense,
    /// Every kill came from plasma shots, rams or nukes
    PlasmaPurist,
    SharpShooter,
}

impl Achievement {
    pub fn title(self) -> &'static str {
        match self {
            Achievement::PerfectDefense => "PERFECT DEFENSE",
            Achievement::PlasmaPurist => "PLASMA PURIST",
            Achievement::SharpShooter => "SHARPSHOOTER",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Achievement::PerfectDefense => "No enemy breached the GENESIS",
            Achievement::PlasmaPurist => "Only plasma fire used",
            Achievement::SharpShooter => "Accuracy above 18%",
        }
    }
}

/// Everything the game over screen needs
#[derive(Debug, Clone, PartialEq)]
pub struct RoundSummary {
    pub reason: GameOverReason,
    pub score: u32,
    pub enemies_killed: u32,
    pub bosses_defeated: u32,
    pub accuracy: f32,
    pub achievements: Vec<Achievement>,
}

/// Hits per shot fired (0 when nothing was fired)
pub fn accuracy(stats: &RoundStats) -> f32 {
    if stats.total_shots_fired == 0 {
        0.0
    } else {
        stats.total_hits as f32 / stats.total_shots_fired as f32
    }
}

/// Summarize a finished round. An unfinished round is treated as aborted.
pub fn evaluate(world: &World) -> RoundSummary {
    let reason = world.game_over.unwrap_or(GameOverReason::Aborted);
    let stats = &world.stats;
    let accuracy = accuracy(stats);

    let mut achievements = Vec::new();
    if reason != GameOverReason::Aborted && world.boss_level >= ACHIEVEMENT_MIN_BOSS_LEVEL {
        if stats.enemies_breached == 0 {
            achievements.push(Achievement::PerfectDefense);
        }
        if stats.plasma_only_kills {
            achievements.push(Achievement::PlasmaPurist);
        }
        if stats.total_shots_fired > 0 && accuracy > SHARPSHOOTER_ACCURACY {
            achievements.push(Achievement::SharpShooter);
        }
    }

    RoundSummary {
        reason,
        score: world.player.score,
        enemies_killed: stats.enemies_killed,
        bosses_defeated: world.boss_level.saturating_sub(1),
        accuracy,
        achievements,
    }
}
