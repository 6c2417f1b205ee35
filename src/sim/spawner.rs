//! Enemy, boss and power-up spawning

use glam::Vec2;
use rand::Rng;

use super::state::{Boss, Enemy, EnemyKind, GameEvent, PowerUp, PowerUpKind, World};
use super::weapon::{UnlockedWeapons, WeaponKind};
use crate::audio::{AudioManager, SoundBank, SoundEffect};
use crate::consts::*;

/// Score needed before nukes can drop
const NUKE_MIN_SCORE: u32 = 500;
const NUKE_CHANCE: f64 = 0.05;
const POWERUP_CHANCE: f64 = 0.12;
/// Boss generation from which drones join the drop table
const DRONE_MIN_BOSS_LEVEL: u32 = 3;

/// Pick an enemy kind for the current score band from a roll in [0, 1)
pub fn enemy_kind_for_score(score: u32, roll: f32) -> EnemyKind {
    if score > 1000 {
        match roll {
            r if r < 0.3 => EnemyKind::Fast,
            r if r < 0.5 => EnemyKind::Tank,
            r if r < 0.7 => EnemyKind::ZigZag,
            _ => EnemyKind::Normal,
        }
    } else if score > 500 {
        match roll {
            r if r < 0.3 => EnemyKind::Fast,
            r if r < 0.5 => EnemyKind::ZigZag,
            _ => EnemyKind::Normal,
        }
    } else if score > 200 && roll < 0.3 {
        EnemyKind::Fast
    } else {
        EnemyKind::Normal
    }
}

/// Spawn one enemy at the right edge on a random row
pub fn spawn_enemy(world: &mut World) {
    let y = world.random_row(2, 3);
    let roll = world.rng.random::<f32>();
    let kind = enemy_kind_for_score(world.player.score, roll);
    let pos = Vec2::new(world.width as f32 - 2.0, y);

    let enemy = match kind {
        EnemyKind::ZigZag => {
            let dir = if world.rng.random_bool(0.5) { 1.0 } else { -1.0 };
            Enemy::zigzag(pos, dir)
        }
        _ => Enemy::new(kind, pos),
    };
    log::trace!("Spawned {:?} at {:?}", kind, pos);
    world.enemies.push(enemy);
}

/// Weighted drop table for the regular (non-nuke) power-up roll
pub fn powerup_table(unlocked: &UnlockedWeapons, boss_level: u32) -> Vec<(PowerUpKind, u32)> {
    let spread_unlocked = unlocked.contains(WeaponKind::Spread);
    let mut table = if spread_unlocked {
        // Shields are much rarer once spread is available
        vec![
            (PowerUpKind::RapidFire, 4),
            (PowerUpKind::Health, 5),
            (PowerUpKind::Shield, 1),
        ]
    } else {
        vec![
            (PowerUpKind::RapidFire, 1),
            (PowerUpKind::Shield, 1),
            (PowerUpKind::Health, 1),
            (PowerUpKind::SpreadShot, 1),
        ]
    };
    if !unlocked.contains(WeaponKind::EnergyBeam) {
        table.push((PowerUpKind::EnergyBeam, 1));
    }
    if boss_level >= DRONE_MIN_BOSS_LEVEL {
        table.push((PowerUpKind::Drone, 1));
    }
    table
}

/// Weighted pick from a table. Returns None for an empty or zero-weight table.
pub fn weighted_pick<T: Copy>(table: &[(T, u32)], rng: &mut impl Rng) -> Option<T> {
    let total: u32 = table.iter().map(|&(_, w)| w).sum();
    if total == 0 {
        return None;
    }
    let mut roll = rng.random_range(0..total);
    for &(item, weight) in table {
        if roll < weight {
            return Some(item);
        }
        roll -= weight;
    }
    None
}

/// Roll for a power-up drop at `pos`
pub fn roll_powerup(world: &mut World, pos: Vec2) {
    let dropped = if world.player.score >= NUKE_MIN_SCORE && world.rng.random_bool(NUKE_CHANCE) {
        Some(PowerUpKind::Nuke)
    } else if world.rng.random_bool(POWERUP_CHANCE) {
        let table = powerup_table(&world.player.unlocked, world.boss_level);
        weighted_pick(&table, &mut world.rng)
    } else {
        None
    };

    if let Some(kind) = dropped {
        world.powerups.push(PowerUp::new(kind, pos));
    }
    world.emit(GameEvent::PowerUpRolled { dropped });
}

/// Bring in the next boss and clear the regular enemies
pub fn spawn_boss<B: SoundBank>(world: &mut World, audio: &mut AudioManager<B>) {
    let y = world.random_row(5, 8);
    let generation = world.boss_level;
    world.boss = Some(Boss::new(
        Vec2::new(world.width as f32 - 5.0, y),
        generation,
    ));
    world.enemies.clear();
    audio.play(SoundEffect::Boss);
    world.emit(GameEvent::BossSpawned { generation });
    log::info!(
        "Boss {} spawned after {} kills",
        generation,
        world.stats.enemies_killed
    );
}

/// Per-frame spawn check: boss first, then regular enemies
pub fn spawn_tick<B: SoundBank>(world: &mut World, audio: &mut AudioManager<B>) {
    if world.boss.is_none() && world.stats.enemies_killed >= world.next_boss_kills {
        spawn_boss(world, audio);
    }
    if world.boss.is_none() && world.frame_count % world.spawn_rate == 0 {
        spawn_enemy(world);
    }
}

/// Tighten the spawn cadence every few seconds down to the floor
pub fn escalate(world: &mut World) {
    if world.frame_count % DIFFICULTY_INTERVAL == 0 && world.spawn_rate > MIN_SPAWN_RATE {
        world.spawn_rate -= 1;
        log::debug!("Spawn rate now every {} frames", world.spawn_rate);
    }
}
