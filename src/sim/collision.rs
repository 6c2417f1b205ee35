//! Collision detection and damage resolution
//!
//! Runs once per tick after everything has moved. Pairs are checked in a
//! fixed order and each pair mutates the world before the next is checked,
//! so a bullet spent on an enemy can no longer hit the boss in the same frame.

use glam::Vec2;
use rand::Rng;

use super::outcome::GameOverReason;
use super::spawner::roll_powerup;
use super::state::{Enemy, GameEvent, KillSource, PowerUpKind, World};
use super::weapon::WeaponKind;
use crate::audio::{AudioManager, SoundBank, SoundEffect};
use crate::consts::*;

/// How long the energy beam unlock tip scrolls across the HUD
const BEAM_TIP_FRAMES: u32 = 240;
const BEAM_TIP: &str = "ENERGY BEAM UNLOCKED! Efficient against CAPITAL WARSHIPS. Press 3 to equip.";
const NUKE_EFFECT_FRAMES: u32 = 20;
const NUKE_EXPLOSIONS: usize = 15;

/// Point inside an axis-aligned box given by top-left and size
#[inline]
pub fn point_in_box(point: Vec2, origin: Vec2, size: Vec2) -> bool {
    point.x >= origin.x
        && point.x < origin.x + size.x
        && point.y >= origin.y
        && point.y < origin.y + size.y
}

/// Two axis-aligned boxes overlap
#[inline]
pub fn boxes_overlap(a: Vec2, a_size: Vec2, b: Vec2, b_size: Vec2) -> bool {
    a.x < b.x + b_size.x && a.x + a_size.x > b.x && a.y < b.y + b_size.y && a.y + a_size.y > b.y
}

/// Bullet close enough to the boss anchor to count as a hit
#[inline]
fn near_boss(point: Vec2, boss: Vec2) -> bool {
    (point.x - boss.x).abs() < BOSS_HIT_RADIUS && (point.y - boss.y).abs() < BOSS_HIT_RADIUS
}

/// Horizontal beam span overlaps the enemy and the beam row is inside it
fn beam_hits_enemy(origin: Vec2, length: u32, enemy: &Enemy) -> bool {
    let size = enemy.size();
    origin.x < enemy.pos.x + size.x
        && origin.x + length as f32 > enemy.pos.x
        && origin.y >= enemy.pos.y
        && origin.y < enemy.pos.y + size.y
}

/// Beam-damage cue throttle: only some health values make a sound
fn throttled_hit_cue(health: f32) -> bool {
    ((health * 2.0).floor() as i64) % 3 == 0
}

/// Resolve every collision pair for this frame
pub fn resolve<B: SoundBank>(world: &mut World, audio: &mut AudioManager<B>) {
    drone_bullets_vs_enemies(world, audio);
    drone_bullets_vs_boss(world, audio);
    bullets_vs_enemies(world, audio);
    beams_vs_enemies(world, audio);
    bullets_vs_boss(world, audio);
    beams_vs_boss(world, audio);
    boss_bullets_vs_player(world, audio);
    drones_vs_enemies(world, audio);
    player_vs_enemies(world, audio);
    pickups(world, audio);
}

/// Bookkeeping shared by every enemy kill
fn credit_kill(world: &mut World, enemy: &Enemy, source: KillSource, award_points: bool) {
    world.stats.enemies_killed += 1;
    if source.breaks_plasma_only() {
        world.stats.plasma_only_kills = false;
    }
    if award_points {
        world.player.score += enemy.kind.points();
    }
    world.emit(GameEvent::EnemyDestroyed {
        kind: enemy.kind,
        source,
    });
}

/// Standard kill: credit, explosion at the enemy center, power-up roll
fn kill_enemy<B: SoundBank>(
    world: &mut World,
    index: usize,
    source: KillSource,
    audio: &mut AudioManager<B>,
) {
    let enemy = world.enemies.remove(index);
    credit_kill(world, &enemy, source, true);
    world.spawn_explosion(enemy.center(), false);
    roll_powerup(world, enemy.pos);
    audio.play(SoundEffect::Explosion);
}

/// Damage an enemy; kills it or makes it flash.
/// Returns true if it died.
fn damage_enemy<B: SoundBank>(
    world: &mut World,
    index: usize,
    damage: i32,
    source: KillSource,
    audio: &mut AudioManager<B>,
) -> bool {
    let enemy = &mut world.enemies[index];
    enemy.health -= damage;
    if enemy.health <= 0 {
        kill_enemy(world, index, source, audio);
        return true;
    }
    enemy.flash_timer = FLASH_FRAMES;
    let cue = source != KillSource::Beam || throttled_hit_cue(enemy.health as f32);
    if cue {
        audio.play(SoundEffect::BossHit);
    }
    false
}

/// Boss destroyed: points, next generation, three power-up rolls
fn defeat_boss<B: SoundBank>(world: &mut World, audio: &mut AudioManager<B>) {
    let Some(boss) = world.boss.take() else {
        return;
    };
    world.spawn_explosion(boss.pos, true);
    world.player.score += boss.points;
    world.boss_level += 1;
    world.next_boss_kills += BOSS_KILL_STEP;
    audio.play(SoundEffect::Boss);
    world.emit(GameEvent::BossDefeated {
        generation: boss.generation,
    });
    log::info!(
        "Boss {} defeated, next boss at {} kills",
        boss.generation,
        world.next_boss_kills
    );

    let x = world.width as f32 - 10.0;
    for _ in 0..3 {
        let y = world.random_row(2, 3);
        roll_powerup(world, Vec2::new(x, y));
    }
}

/// Boss takes a projectile hit. Returns true if it died.
fn hit_boss<B: SoundBank>(world: &mut World, damage: f32, audio: &mut AudioManager<B>) -> bool {
    let Some(boss) = world.boss.as_mut() else {
        return false;
    };
    boss.health -= damage;
    boss.flash_timer = FLASH_FRAMES;
    let (pos, dead) = (boss.pos, boss.health <= 0.0);
    world.spawn_explosion(pos, false);
    audio.play(SoundEffect::BossHit);
    if dead {
        defeat_boss(world, audio);
    }
    dead
}

/// Unshielded player loses a health point
fn damage_player<B: SoundBank>(world: &mut World, audio: &mut AudioManager<B>) {
    let player = &mut world.player;
    player.health -= 1;
    player.flash_timer = FLASH_FRAMES;
    let health = player.health;
    audio.play(SoundEffect::Damage);
    world.emit(GameEvent::PlayerHit { health });
    if health <= 0 {
        world.end_round(GameOverReason::PlayerDied);
    }
}

fn drone_bullets_vs_enemies<B: SoundBank>(world: &mut World, audio: &mut AudioManager<B>) {
    let mut i = 0;
    while i < world.drone_bullets.len() {
        let bullet = world.drone_bullets[i];
        let hit = world
            .enemies
            .iter()
            .position(|e| point_in_box(bullet.pos, e.pos, e.size()));
        match hit {
            Some(index) => {
                world.drone_bullets.remove(i);
                damage_enemy(world, index, bullet.damage, KillSource::DroneBullet, audio);
            }
            None => i += 1,
        }
    }
}

fn drone_bullets_vs_boss<B: SoundBank>(world: &mut World, audio: &mut AudioManager<B>) {
    let Some(boss_pos) = world.boss.as_ref().map(|b| b.pos) else {
        return;
    };
    // One drone bullet per frame connects with the boss
    if let Some(i) = world
        .drone_bullets
        .iter()
        .position(|b| near_boss(b.pos, boss_pos))
    {
        let bullet = world.drone_bullets.remove(i);
        hit_boss(world, bullet.damage as f32, audio);
    }
}

fn bullets_vs_enemies<B: SoundBank>(world: &mut World, audio: &mut AudioManager<B>) {
    let mut i = 0;
    while i < world.bullets.len() {
        let bullet = world.bullets[i];
        let hit = world
            .enemies
            .iter()
            .position(|e| point_in_box(bullet.pos, e.pos, e.size()));
        match hit {
            Some(index) => {
                world.bullets.remove(i);
                world.stats.total_hits += 1;
                let source = if bullet.damage == PLASMA_DAMAGE {
                    KillSource::Plasma
                } else {
                    KillSource::Spread
                };
                damage_enemy(world, index, bullet.damage, source, audio);
            }
            None => i += 1,
        }
    }
}

fn beams_vs_enemies<B: SoundBank>(world: &mut World, audio: &mut AudioManager<B>) {
    for b in 0..world.energy_beams.len() {
        let beam = world.energy_beams[b];
        let mut e = 0;
        while e < world.enemies.len() {
            if beam_hits_enemy(beam.pos, beam.length, &world.enemies[e])
                && damage_enemy(world, e, 1, KillSource::Beam, audio)
            {
                continue;
            }
            e += 1;
        }
    }
}

fn bullets_vs_boss<B: SoundBank>(world: &mut World, audio: &mut AudioManager<B>) {
    let Some(boss_pos) = world.boss.as_ref().map(|b| b.pos) else {
        return;
    };
    // One bullet per frame connects with the boss
    if let Some(i) = world.bullets.iter().position(|b| near_boss(b.pos, boss_pos)) {
        let bullet = world.bullets.remove(i);
        hit_boss(world, bullet.damage as f32, audio);
    }
}

fn beams_vs_boss<B: SoundBank>(world: &mut World, audio: &mut AudioManager<B>) {
    for b in 0..world.energy_beams.len() {
        let beam = world.energy_beams[b];
        let Some(boss) = world.boss.as_mut() else {
            return;
        };
        let d = beam.pos - boss.pos;
        if d.x.abs() >= beam.length as f32 || d.y.abs() >= BOSS_HIT_RADIUS {
            continue;
        }
        boss.health -= BEAM_BOSS_DAMAGE;
        boss.flash_timer = FLASH_FRAMES;
        let (health, dead) = (boss.health, boss.health <= 0.0);
        if throttled_hit_cue(health) {
            audio.play(SoundEffect::BossHit);
        }
        if dead {
            defeat_boss(world, audio);
            return;
        }
    }
}

fn boss_bullets_vs_player<B: SoundBank>(world: &mut World, audio: &mut AudioManager<B>) {
    let mut i = 0;
    while i < world.boss_bullets.len() {
        let bullet = world.boss_bullets[i];
        if !point_in_box(bullet.pos, world.player.pos, world.player.size()) {
            i += 1;
            continue;
        }
        world.boss_bullets.remove(i);
        if world.player.shield {
            world.emit(GameEvent::ShieldAbsorbed);
        } else {
            let center = world.player.center();
            world.spawn_explosion(center, false);
            damage_player(world, audio);
        }
    }
}

fn drones_vs_enemies<B: SoundBank>(world: &mut World, audio: &mut AudioManager<B>) {
    let mut d = 0;
    while d < world.drones.len() {
        let (pos, size) = (world.drones[d].pos, world.drones[d].size());
        let hit = world
            .enemies
            .iter()
            .position(|e| boxes_overlap(pos, size, e.pos, e.size()));
        let Some(index) = hit else {
            d += 1;
            continue;
        };
        world.drones.remove(d);
        let enemy = world.enemies.remove(index);
        credit_kill(world, &enemy, KillSource::DroneRam, true);
        world.spawn_explosion(enemy.center(), false);
        world.spawn_explosion(pos + size / 2.0, false);
        roll_powerup(world, enemy.pos);
        audio.play(SoundEffect::Explosion);
    }
}

fn player_vs_enemies<B: SoundBank>(world: &mut World, audio: &mut AudioManager<B>) {
    let mut e = 0;
    while e < world.enemies.len() {
        let enemy = &world.enemies[e];
        if !boxes_overlap(
            world.player.pos,
            world.player.size(),
            enemy.pos,
            enemy.size(),
        ) {
            e += 1;
            continue;
        }
        let enemy = world.enemies.remove(e);
        // Ramming earns the kill but no points
        credit_kill(world, &enemy, KillSource::PlayerRam, false);
        world.spawn_explosion(enemy.center(), false);
        audio.play(SoundEffect::Explosion);
        if !world.player.shield {
            damage_player(world, audio);
        }
    }
}

fn pickups<B: SoundBank>(world: &mut World, audio: &mut AudioManager<B>) {
    let mut i = 0;
    while i < world.powerups.len() {
        let center = world.player.center();
        let pos = world.powerups[i].pos;
        if (center.x - pos.x).abs() < 3.0 && (center.y - pos.y).abs() < 2.0 {
            let powerup = world.powerups.remove(i);
            world.player.score += POWERUP_PICKUP_POINTS;
            apply_powerup(world, powerup.kind, audio);
            audio.play(SoundEffect::PowerUp);
            world.emit(GameEvent::PowerUpCollected { kind: powerup.kind });
        } else {
            i += 1;
        }
    }
}

/// Apply a collected power-up to the player and world
pub fn apply_powerup<B: SoundBank>(
    world: &mut World,
    kind: PowerUpKind,
    audio: &mut AudioManager<B>,
) {
    log::debug!("Power-up collected: {:?}", kind);
    let player = &mut world.player;
    match kind {
        PowerUpKind::RapidFire => {
            player.rapid_fire = true;
            player.rapid_fire_timer = RAPID_FIRE_FRAMES;
        }
        PowerUpKind::Shield => {
            player.shield = true;
            player.shield_timer = SHIELD_FRAMES;
        }
        PowerUpKind::Health => {
            if player.health < player.max_health + HEALTH_OVERFLOW {
                player.health += 1;
            }
        }
        PowerUpKind::SpreadShot => {
            player.unlock(WeaponKind::Spread);
            player.equip(WeaponKind::Spread);
        }
        PowerUpKind::EnergyBeam => {
            player.unlock(WeaponKind::EnergyBeam);
            if !world.beam_tip_shown {
                world.notification.show(BEAM_TIP, BEAM_TIP_FRAMES);
                world.beam_tip_shown = true;
            }
        }
        PowerUpKind::Nuke => detonate_nuke(world, audio),
        PowerUpKind::Drone => world.launch_drones(),
    }
}

/// Wipe every enemy and the boss at the cost of one health point
fn detonate_nuke<B: SoundBank>(world: &mut World, audio: &mut AudioManager<B>) {
    world.nuke_effect_timer = NUKE_EFFECT_FRAMES;
    world.stats.nukes_used += 1;

    let enemies = std::mem::take(&mut world.enemies);
    for enemy in &enemies {
        world.spawn_explosion(enemy.center(), true);
        credit_kill(world, enemy, KillSource::Nuke, true);
    }

    if let Some(boss) = world.boss.take() {
        world.spawn_explosion(boss.pos, true);
        world.player.score += boss.points;
        world.boss_level += 1;
        world.next_boss_kills += BOSS_KILL_STEP;
        world.emit(GameEvent::BossDefeated {
            generation: boss.generation,
        });
    }

    let max_x = world.width.saturating_sub(5).max(5);
    for _ in 0..NUKE_EXPLOSIONS {
        let x = world.rng.random_range(5..=max_x) as f32;
        let y = world.random_row(2, 3);
        world.spawn_explosion(Vec2::new(x, y), true);
    }
    audio.play(SoundEffect::Nuke);
    log::info!(
        "Nuke detonated: {} enemies destroyed (nukes used: {})",
        enemies.len(),
        world.stats.nukes_used
    );

    // Paid after the blast
    world.player.health -= 1;
    if world.player.health <= 0 {
        world.end_round(GameOverReason::NukeSacrifice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::CueRecorder;
    use crate::sim::state::{Boss, BossBullet, Bullet, EnemyKind, EnergyBeam, PowerUp};

    fn setup() -> (World, AudioManager<CueRecorder>) {
        (
            World::new(80, 24, 21),
            AudioManager::new(CueRecorder::default()),
        )
    }

    #[test]
    fn test_point_in_box_edges() {
        let origin = Vec2::new(10.0, 5.0);
        let size = Vec2::new(2.0, 2.0);
        assert!(point_in_box(Vec2::new(10.0, 5.0), origin, size));
        assert!(point_in_box(Vec2::new(11.9, 6.9), origin, size));
        assert!(!point_in_box(Vec2::new(12.0, 5.0), origin, size));
        assert!(!point_in_box(Vec2::new(10.0, 7.0), origin, size));
    }

    #[test]
    fn test_spread_kill_breaks_plasma_only() {
        let (mut world, mut audio) = setup();
        world
            .enemies
            .push(Enemy::new(EnemyKind::Normal, Vec2::new(50.0, 10.0)));
        world.bullets.push(Bullet::spread(Vec2::new(50.5, 10.5)));
        resolve(&mut world, &mut audio);
        assert!(world.enemies.is_empty());
        assert!(!world.stats.plasma_only_kills);
        assert_eq!(world.stats.total_hits, 1);
    }

    #[test]
    fn test_bullet_spent_on_first_enemy() {
        let (mut world, mut audio) = setup();
        world
            .enemies
            .push(Enemy::new(EnemyKind::Tank, Vec2::new(50.0, 10.0)));
        world
            .enemies
            .push(Enemy::new(EnemyKind::Tank, Vec2::new(50.0, 10.0)));
        world.bullets.push(Bullet::plasma(Vec2::new(51.0, 10.0)));
        resolve(&mut world, &mut audio);
        assert_eq!(world.enemies[0].health, 7);
        assert_eq!(world.enemies[1].health, 10);
        assert!(world.bullets.is_empty());
    }

    #[test]
    fn test_only_one_bullet_hits_boss_per_frame() {
        let (mut world, mut audio) = setup();
        world.boss = Some(Boss::new(Vec2::new(60.0, 10.0), 1));
        world.bullets.push(Bullet::plasma(Vec2::new(60.5, 10.0)));
        world.bullets.push(Bullet::plasma(Vec2::new(59.5, 10.5)));
        resolve(&mut world, &mut audio);
        assert_eq!(world.boss.as_ref().map(|b| b.health), Some(52.0));
        assert_eq!(world.bullets.len(), 1);
        assert_eq!(audio.bank().count(SoundEffect::BossHit), 1);
    }

    #[test]
    fn test_boss_defeat_advances_generation() {
        let (mut world, mut audio) = setup();
        let mut boss = Boss::new(Vec2::new(60.0, 10.0), 1);
        boss.health = 2.0;
        world.boss = Some(boss);
        world.bullets.push(Bullet::plasma(Vec2::new(60.0, 10.0)));
        resolve(&mut world, &mut audio);
        assert!(world.boss.is_none());
        assert_eq!(world.player.score, 300);
        assert_eq!(world.boss_level, 2);
        assert_eq!(world.next_boss_kills, 80);
        assert_eq!(audio.bank().count(SoundEffect::Boss), 1);
        let rolls = world
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::PowerUpRolled { .. }))
            .count();
        assert_eq!(rolls, 3);
    }

    #[test]
    fn test_beam_damages_boss_by_half() {
        let (mut world, mut audio) = setup();
        world.boss = Some(Boss::new(Vec2::new(60.0, 10.0), 1));
        world
            .energy_beams
            .push(EnergyBeam::new(Vec2::new(30.0, 10.0), 60));
        world
            .energy_beams
            .push(EnergyBeam::new(Vec2::new(30.0, 12.0), 60));
        resolve(&mut world, &mut audio);
        // Second beam row is exactly 2 rows off: outside the threshold
        assert_eq!(world.boss.as_ref().map(|b| b.health), Some(54.5));
    }

    #[test]
    fn test_beam_hits_every_overlapping_enemy() {
        let (mut world, mut audio) = setup();
        world
            .enemies
            .push(Enemy::new(EnemyKind::Normal, Vec2::new(40.0, 10.0)));
        world
            .enemies
            .push(Enemy::new(EnemyKind::Tank, Vec2::new(45.0, 9.0)));
        world
            .energy_beams
            .push(EnergyBeam::new(Vec2::new(30.0, 10.0), 20));
        resolve(&mut world, &mut audio);
        assert_eq!(world.enemies.len(), 1);
        assert_eq!(world.enemies[0].health, 9);
        assert_eq!(world.enemies[0].flash_timer, FLASH_FRAMES);
        assert!(!world.stats.plasma_only_kills);
    }

    #[test]
    fn test_boss_bullet_hits_player() {
        let (mut world, mut audio) = setup();
        let pos = world.player.pos + Vec2::new(1.0, 1.0);
        world.boss_bullets.push(BossBullet::new(pos));
        resolve(&mut world, &mut audio);
        assert_eq!(world.player.health, 2);
        assert_eq!(world.player.flash_timer, FLASH_FRAMES);
        assert_eq!(audio.bank().count(SoundEffect::Damage), 1);
        assert!(world.boss_bullets.is_empty());
    }

    #[test]
    fn test_player_ram_costs_health_and_no_points() {
        let (mut world, mut audio) = setup();
        world.player.health = 1;
        let pos = world.player.pos;
        world.enemies.push(Enemy::new(EnemyKind::Fast, pos));
        resolve(&mut world, &mut audio);
        assert!(world.enemies.is_empty());
        assert_eq!(world.player.score, 0);
        assert_eq!(world.stats.enemies_killed, 1);
        assert!(world.stats.plasma_only_kills);
        assert_eq!(world.game_over, Some(GameOverReason::PlayerDied));
    }

    #[test]
    fn test_drone_ram_destroys_both() {
        let (mut world, mut audio) = setup();
        world.drones.push(crate::sim::state::Drone::new(Vec2::new(50.0, 10.0), 0));
        world
            .enemies
            .push(Enemy::new(EnemyKind::Tank, Vec2::new(49.5, 9.5)));
        resolve(&mut world, &mut audio);
        assert!(world.drones.is_empty());
        assert!(world.enemies.is_empty());
        assert_eq!(world.player.score, 30);
        assert!(world.stats.plasma_only_kills);
    }

    #[test]
    fn test_health_pickup_capped() {
        let (mut world, mut audio) = setup();
        world.player.health = 6;
        let pos = world.player.center();
        world.powerups.push(PowerUp::new(PowerUpKind::Health, pos));
        resolve(&mut world, &mut audio);
        assert_eq!(world.player.health, 6);
        assert_eq!(world.player.score, POWERUP_PICKUP_POINTS);
        assert_eq!(audio.bank().count(SoundEffect::PowerUp), 1);
    }

    #[test]
    fn test_beam_pickup_unlocks_without_equipping() {
        let (mut world, mut audio) = setup();
        apply_powerup(&mut world, PowerUpKind::EnergyBeam, &mut audio);
        assert!(world.player.unlocked.contains(WeaponKind::EnergyBeam));
        assert_eq!(world.player.weapon, WeaponKind::Plasma);
        assert!(world.notification.is_active());

        world.notification.timer = 0;
        apply_powerup(&mut world, PowerUpKind::EnergyBeam, &mut audio);
        assert!(!world.notification.is_active());
    }

    #[test]
    fn test_spread_pickup_equips() {
        let (mut world, mut audio) = setup();
        apply_powerup(&mut world, PowerUpKind::SpreadShot, &mut audio);
        assert_eq!(world.player.weapon, WeaponKind::Spread);
    }

    #[test]
    fn test_throttle() {
        assert!(throttled_hit_cue(0.0));
        assert!(throttled_hit_cue(1.5));
        assert!(!throttled_hit_cue(1.0));
        assert!(!throttled_hit_cue(2.5));
    }
}
