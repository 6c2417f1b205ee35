//! Fixed timestep simulation tick
//!
//! Core game loop that advances one round by exactly one frame.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::collision;
use super::input::{CheatCode, FrameIntent};
use super::outcome::GameOverReason;
use super::spawner;
use super::state::{
    AbortPrompt, Boss, BossBullet, Bullet, Debris, Enemy, EnemyKind, GameEvent, Target, World,
    ZIGZAG_VERTICAL_SPEED,
};
use super::weapon::{self, WeaponKind};
use crate::audio::{AudioManager, SoundBank, SoundEffect};
use crate::consts::*;

/// Advance the round by one frame
pub fn tick<B: SoundBank>(world: &mut World, intent: &FrameIntent, audio: &mut AudioManager<B>) {
    world.events.clear();
    if world.is_over() {
        return;
    }

    let opened = world.abort_prompt.is_none() && intent.quit_requested;
    if opened {
        open_abort_prompt(world, audio);
    }
    if world.abort_prompt.is_some() {
        // ESC on the frame that opened the prompt is not an answer
        let backed_out = !opened && intent.quit_requested;
        match intent.confirm {
            Some(true) => {
                world.abort_prompt = None;
                world.end_round(GameOverReason::Aborted);
            }
            Some(false) => close_abort_prompt(world, audio),
            None if backed_out => close_abort_prompt(world, audio),
            None => {}
        }
        return;
    }
    if intent.pause_toggled {
        toggle_pause(world, audio);
    }
    if let Some(selected) = intent.weapon_select {
        world.player.equip(selected);
    }
    if let Some(cheat) = intent.cheat {
        apply_cheat(world, cheat);
    }

    // Don't tick if paused
    if world.paused {
        return;
    }

    world.player.vel = intent.movement;
    if intent.firing {
        weapon::fire(world, audio);
    }
    step(world, intent.firing, audio);
}

fn toggle_pause<B: SoundBank>(world: &mut World, audio: &mut AudioManager<B>) {
    if !world.paused {
        world.paused = true;
        audio.pause_loops();
        log::debug!("Paused at frame {}", world.frame_count);
    } else if world.size_locked {
        log::debug!("Unpause refused: terminal too small");
    } else {
        world.paused = false;
        audio.resume_loops();
        log::debug!("Resumed at frame {}", world.frame_count);
    }
}

/// ESC pressed: pause and wait for the player to confirm
fn open_abort_prompt<B: SoundBank>(world: &mut World, audio: &mut AudioManager<B>) {
    world.abort_prompt = Some(AbortPrompt {
        was_paused: world.paused,
    });
    if !world.paused {
        world.paused = true;
        audio.pause_loops();
    }
    log::debug!("Abort prompt opened at frame {}", world.frame_count);
}

/// Player declined: restore the pause state from before the prompt
fn close_abort_prompt<B: SoundBank>(world: &mut World, audio: &mut AudioManager<B>) {
    let Some(prompt) = world.abort_prompt.take() else {
        return;
    };
    if !prompt.was_paused && !world.size_locked {
        world.paused = false;
        audio.resume_loops();
    }
    log::debug!("Abort cancelled");
}

/// Terminal shrank below the round's size: force a pause the player can't lift
pub fn lock_for_resize<B: SoundBank>(world: &mut World, audio: &mut AudioManager<B>) {
    if world.size_locked {
        return;
    }
    world.size_locked = true;
    if !world.paused {
        world.paused = true;
        audio.pause_loops();
    }
    log::warn!("Terminal shrank below {}x{}, pausing", world.width, world.height);
}

/// Terminal is big enough again. The round stays paused until the player unpauses.
pub fn unlock_after_resize(world: &mut World) {
    if world.size_locked {
        world.size_locked = false;
        log::info!("Terminal size restored");
    }
}

fn apply_cheat(world: &mut World, cheat: CheatCode) {
    match cheat {
        CheatCode::DroneWing => world.launch_drones(),
        CheatCode::EnergyBeam => {
            world.player.unlock(WeaponKind::EnergyBeam);
            world.player.equip(WeaponKind::EnergyBeam);
        }
    }
}

/// Everything that happens in one unpaused frame after the weapon fired
fn step<B: SoundBank>(world: &mut World, trigger_held: bool, audio: &mut AudioManager<B>) {
    world.frame_count += 1;

    update_wobble(world);
    update_starfield(world);

    let at_right_limit = move_player(world);
    update_stationarity(world);
    weapon::check_trigger_release(world, trigger_held);
    audio.update_engine(world.player.vel, at_right_limit);

    update_timers(world);
    audio.update_music(world.player.shield, world.player.rapid_fire);

    spawner::spawn_tick(world, audio);

    update_bullets(world);
    update_beams(world);
    weapon::update_decay(world, trigger_held, audio);
    update_drones(world, audio);
    update_drone_bullets(world);
    update_enemies(world, audio);
    update_boss(world, audio);
    update_boss_bullets(world, audio);
    update_powerups(world);
    update_explosions(world);

    collision::resolve(world, audio);

    spawner::escalate(world);
}

fn update_wobble(world: &mut World) {
    world.genesis_wobble_phase += 0.02;
    let phase = world.genesis_wobble_phase;
    world.genesis_wobble = Vec2::new((phase * 1.3).sin() * 0.5, (phase * 0.9).cos() * 0.3);
}

/// Parallax scroll; stars leaving the left edge reappear on the right
fn update_starfield(world: &mut World) {
    let wrap_x = world.width as f32 - 2.0;
    let max_y = world.height.saturating_sub(2).max(1);
    for star in &mut world.stars {
        star.pos.x -= star.speed;
        if star.pos.x < 1.0 {
            star.pos.x = wrap_x;
            star.pos.y = world.rng.random_range(1..=max_y) as f32;
        }
    }
}

/// Integrate velocity and clamp between the cargo ship and the right limit.
/// Returns true if the ship was stopped by the right limit.
fn move_player(world: &mut World) -> bool {
    let left = world.genesis_right_edge() + 1.0;
    let right = world.right_limit();
    let bottom = world.height as f32 - 1.0 - PLAYER_HEIGHT;

    let player = &mut world.player;
    player.pos += player.vel;

    let mut at_right_limit = false;
    if player.pos.x < left {
        player.pos.x = left;
    }
    if player.pos.x + PLAYER_WIDTH > right {
        player.pos.x = right - PLAYER_WIDTH;
        at_right_limit = true;
    }
    if player.pos.y < 1.0 {
        player.pos.y = 1.0;
    }
    if player.pos.y > bottom {
        player.pos.y = bottom;
    }
    at_right_limit
}

/// Actual displacement (not key state) cancels the beam charge
fn update_stationarity(world: &mut World) {
    let moved = world.player.pos != world.player.prev_pos;
    if moved {
        weapon::cancel_on_move(world);
    }
    world.player.was_stationary = !moved;
    world.player.prev_pos = world.player.pos;
}

fn countdown(timer: &mut u32) {
    *timer = timer.saturating_sub(1);
}

fn update_timers(world: &mut World) {
    let player = &mut world.player;
    countdown(&mut player.fire_cooldown);

    if player.shield_timer > 0 {
        player.shield_timer -= 1;
        if player.shield_timer == 0 {
            player.shield = false;
        }
    }
    if player.rapid_fire_timer > 0 {
        player.rapid_fire_timer -= 1;
        if player.rapid_fire_timer == 0 {
            player.rapid_fire = false;
        }
    }

    countdown(&mut world.nuke_effect_timer);
    countdown(&mut world.ship_flash_timer);
    countdown(&mut player.flash_timer);
    countdown(&mut world.wall_flash_timer);
    countdown(&mut player.spark_timer);

    let notification = &mut world.notification;
    if notification.timer > 0 {
        notification.timer -= 1;
        // Scroll one cell every other frame
        if world.frame_count % 2 == 0 {
            notification.scroll_offset += 1;
        }
    }
}

fn update_bullets(world: &mut World) {
    for bullet in &mut world.bullets {
        bullet.pos += bullet.vel;
    }
    let (w, h) = (world.width as f32, world.height as f32);
    world
        .bullets
        .retain(|b| b.pos.x < w - 1.0 && b.pos.y >= 1.0 && b.pos.y < h - 1.0);
}

fn update_beams(world: &mut World) {
    for beam in &mut world.energy_beams {
        countdown(&mut beam.lifetime);
    }
    world.energy_beams.retain(|b| b.lifetime > 0);
}

/// Closest enemy (by top-left corner) or the boss, enemies winning ties
fn nearest_target(from: Vec2, enemies: &[Enemy], boss: Option<&Boss>) -> Option<(Target, Vec2)> {
    let mut best: Option<(Target, Vec2, f32)> = None;
    let candidates = enemies
        .iter()
        .enumerate()
        .map(|(i, e)| (Target::Enemy(i), e.pos))
        .chain(boss.map(|b| (Target::Boss, b.pos)));
    for (target, pos) in candidates {
        let dist = from.distance(pos);
        if best.is_none_or(|(_, _, d)| dist < d) {
            best = Some((target, pos, dist));
        }
    }
    best.map(|(target, pos, _)| (target, pos))
}

fn clamp_drone(pos: &mut Vec2, size: Vec2, width: f32, height: f32) {
    pos.x = pos.x.min(width - 1.0 - size.x).max(2.0);
    pos.y = pos.y.min(height - 1.0 - size.y).max(1.0);
}

/// Drones hunt the nearest target from a stand-off distance, or orbit the
/// player when there is nothing to shoot
fn update_drones<B: SoundBank>(world: &mut World, audio: &mut AudioManager<B>) {
    for drone in &mut world.drones {
        countdown(&mut drone.lifetime);
    }
    world.drones.retain(|d| d.lifetime > 0);

    let (w, h) = (world.width as f32, world.height as f32);
    let orbit_center = Vec2::new(
        world.player.pos.x + PLAYER_WIDTH / 2.0,
        world.player.pos.y + 1.0,
    );

    for d in 0..world.drones.len() {
        let target = nearest_target(world.drones[d].pos, &world.enemies, world.boss.as_ref());
        let drone = &mut world.drones[d];
        countdown(&mut drone.fire_cooldown);
        drone.target = target.map(|(t, _)| t);
        let size = drone.size();

        match target {
            Some((_, target_pos)) => {
                let delta = target_pos - drone.pos;
                let dist = delta.length();
                if dist <= 0.0 {
                    continue;
                }
                let dir = delta / dist;
                if dist > DRONE_STANDOFF {
                    drone.pos += dir * DRONE_SPEED;
                    clamp_drone(&mut drone.pos, size, w, h);
                }
                if dist < DRONE_FIRE_RANGE && drone.fire_cooldown == 0 {
                    world.drone_bullets.push(Bullet::drone(drone.pos, dir));
                    // Stagger the wing
                    drone.fire_cooldown = world.rng.random_range(7..=9);
                    audio.play(SoundEffect::DroneShoot);
                }
            }
            None => {
                drone.orbit_angle += DRONE_ORBIT_STEP;
                if drone.orbit_angle > TAU {
                    drone.orbit_angle -= TAU;
                }
                let slot = orbit_center
                    + DRONE_ORBIT_RADIUS * Vec2::new(drone.orbit_angle.cos(), drone.orbit_angle.sin());
                let delta = slot - drone.pos;
                let dist = delta.length();
                if dist > 0.5 {
                    drone.pos += delta / dist * DRONE_SPEED;
                }
                clamp_drone(&mut drone.pos, size, w, h);
            }
        }
    }
}

fn update_drone_bullets(world: &mut World) {
    for bullet in &mut world.drone_bullets {
        bullet.pos += bullet.vel;
    }
    let (w, h) = (world.width as f32, world.height as f32);
    world
        .drone_bullets
        .retain(|b| b.pos.x < w - 1.0 && b.pos.x >= 1.0 && b.pos.y >= 1.0 && b.pos.y < h - 1.0);
}

fn update_enemies<B: SoundBank>(world: &mut World, audio: &mut AudioManager<B>) {
    let top = 2.0;
    let bottom = world.height as f32 - 3.0;
    let mut i = 0;
    while i < world.enemies.len() {
        let enemy = &mut world.enemies[i];
        enemy.pos.x -= enemy.kind.speed();
        countdown(&mut enemy.flash_timer);

        if enemy.kind == EnemyKind::ZigZag {
            enemy.pos.y += enemy.direction * ZIGZAG_VERTICAL_SPEED;
            if enemy.pos.y <= top {
                enemy.pos.y = top;
                enemy.direction = 1.0;
            } else if enemy.pos.y >= bottom {
                enemy.pos.y = bottom;
                enemy.direction = -1.0;
            }
        }

        if enemy.pos.x <= 0.0 {
            let enemy = world.enemies.remove(i);
            breach(world, &enemy, audio);
        } else {
            i += 1;
        }
    }
}

/// An enemy reached the cargo ship
fn breach<B: SoundBank>(world: &mut World, enemy: &Enemy, audio: &mut AudioManager<B>) {
    world.spawn_explosion(enemy.center(), true);
    audio.play(SoundEffect::Explosion);
    world.stats.enemies_breached += 1;
    world.wall_flash_timer = FLASH_FRAMES;
    world.emit(GameEvent::EnemyBreached { kind: enemy.kind });
    log::debug!("{:?} breached the cargo hull", enemy.kind);

    if !world.player.shield {
        world.player.health -= 1;
        let health = world.player.health;
        world.emit(GameEvent::PlayerHit { health });
        if health <= 0 {
            world.end_round(GameOverReason::CargoCaptured);
        }
    }
}

fn update_boss<B: SoundBank>(world: &mut World, audio: &mut AudioManager<B>) {
    let low = world.height as f32 - 5.0;
    let Some(boss) = world.boss.as_mut() else {
        return;
    };
    boss.pos.x -= boss.speed;
    countdown(&mut boss.flash_timer);

    // Sweep down for a second, then up
    boss.move_pattern += 1;
    if boss.move_pattern % 60 < 30 {
        if boss.pos.y < low {
            boss.pos.y += 0.1;
        }
    } else if boss.pos.y > 5.0 {
        boss.pos.y -= 0.1;
    }

    boss.shoot_timer += 1;
    if boss.shoot_timer >= BOSS_FIRE_INTERVAL {
        boss.shoot_timer = 0;
        let muzzle = Vec2::new(boss.pos.x - 1.0, boss.pos.y);
        world.boss_bullets.push(BossBullet::new(muzzle));
        audio.play(SoundEffect::BossFire);
    }

    if boss.pos.x <= 0.0 {
        let pos = boss.pos;
        world.boss = None;
        world.spawn_explosion(pos, true);
        for _ in 0..5 {
            let offset = Vec2::new(
                world.rng.random_range(-2.0..=2.0),
                world.rng.random_range(-2.0..=2.0),
            );
            world.spawn_explosion(pos + offset, true);
        }
        audio.play(SoundEffect::Nuke);
        world.player.health = 0;
        world.emit(GameEvent::BossBreached);
        world.end_round(GameOverReason::CargoCaptured);
    }
}

/// Boss bullets bounce once off the cargo ship hull
fn update_boss_bullets<B: SoundBank>(world: &mut World, audio: &mut AudioManager<B>) {
    let mut ricochets = Vec::new();
    for bullet in &mut world.boss_bullets {
        bullet.pos += bullet.vel;
        if bullet.pos.x <= RICOCHET_X && bullet.vel.x < 0.0 {
            bullet.vel.x = bullet.vel.x.abs();
            bullet.vel.y = world.rng.random_range(-0.6..=0.6);
            ricochets.push(Vec2::new(RICOCHET_X, bullet.pos.y));
        }
    }
    for spark in ricochets {
        world.spawn_explosion(spark, false);
        audio.play(SoundEffect::Ricochet);
        world.emit(GameEvent::Ricochet);
    }

    let (w, h) = (world.width as f32, world.height as f32);
    world
        .boss_bullets
        .retain(|b| b.pos.x < w - 1.0 && b.pos.y >= 1.0 && b.pos.y < h - 1.0);
}

fn update_powerups(world: &mut World) {
    for powerup in &mut world.powerups {
        powerup.pos.x -= POWERUP_SPEED;
    }
    world.powerups.retain(|p| p.pos.x > 0.0);
}

fn update_explosions(world: &mut World) {
    for explosion in &mut world.explosions {
        countdown(&mut explosion.lifetime);
    }
    world.explosions.retain(|e| e.lifetime > 0);
}

/// Blow the player's ship apart: debris, big explosions and the nuke cue
pub fn begin_ship_destruction<B: SoundBank>(world: &mut World, audio: &mut AudioManager<B>) {
    let center = world.player.center();
    for _ in 0..30 {
        let angle = world.rng.random_range(0.0..TAU);
        let speed = world.rng.random_range(0.5..2.5);
        let vel = Vec2::new(angle.cos(), angle.sin()) * speed;
        let debris = Debris::new(center, vel, &mut world.rng);
        world.debris.push(debris);
    }
    for _ in 0..8 {
        let offset = Vec2::new(
            world.rng.random_range(-2.0..=2.0),
            world.rng.random_range(-2.0..=2.0),
        );
        world.spawn_explosion(center + offset, true);
    }
    audio.play(SoundEffect::Nuke);
    log::info!("Player ship destroyed at {:?}", center);
}

/// One frame of the destruction animation. Returns true while debris or
/// explosions are still on screen.
pub fn advance_destruction(world: &mut World) -> bool {
    update_wobble(world);
    update_starfield(world);

    let (w, h) = (world.width as f32, world.height as f32);
    for debris in &mut world.debris {
        debris.pos += debris.vel;
        debris.vel.y += DEBRIS_GRAVITY;
        countdown(&mut debris.lifetime);
    }
    world.debris.retain(|d| {
        d.lifetime > 0 && d.pos.x >= 1.0 && d.pos.x < w - 1.0 && d.pos.y >= 1.0 && d.pos.y < h - 1.0
    });
    update_explosions(world);

    !world.debris.is_empty() || !world.explosions.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{CueRecorder, LoopTrack};
    use crate::sim::state::{Drone, PowerUp, PowerUpKind};

    fn setup() -> (World, AudioManager<CueRecorder>) {
        (
            World::new(80, 24, 17),
            AudioManager::new(CueRecorder::default()),
        )
    }

    fn moving(movement: Vec2) -> FrameIntent {
        FrameIntent {
            movement,
            ..FrameIntent::default()
        }
    }

    #[test]
    fn test_player_clamped_to_right_limit() {
        let (mut world, mut audio) = setup();
        for _ in 0..100 {
            tick(&mut world, &moving(Vec2::new(PLAYER_SPEED, 0.0)), &mut audio);
        }
        assert_eq!(world.player.pos.x + PLAYER_WIDTH, world.right_limit());
        // Pushing against the limit drops the engine to idle
        assert_eq!(audio.engine_track(), Some(LoopTrack::EngineIdle));
    }

    #[test]
    fn test_player_clamped_by_cargo_ship() {
        let (mut world, mut audio) = setup();
        for _ in 0..100 {
            tick(&mut world, &moving(Vec2::new(-PLAYER_SPEED, -PLAYER_SPEED)), &mut audio);
            assert!(world.player.pos.x >= world.genesis_right_edge() + 1.0);
        }
        assert_eq!(world.player.pos.y, 1.0);
    }

    #[test]
    fn test_bottom_clamp() {
        let (mut world, mut audio) = setup();
        for _ in 0..100 {
            tick(&mut world, &moving(Vec2::new(0.0, PLAYER_SPEED)), &mut audio);
        }
        assert_eq!(world.player.pos.y, 24.0 - 1.0 - 3.0);
    }

    #[test]
    fn test_movement_cancels_charge_same_frame() {
        let (mut world, mut audio) = setup();
        world.player.unlock(WeaponKind::EnergyBeam);
        world.player.equip(WeaponKind::EnergyBeam);
        let fire = FrameIntent {
            firing: true,
            ..FrameIntent::default()
        };
        for _ in 0..10 {
            tick(&mut world, &fire, &mut audio);
        }
        assert!(world.player.beam.charge_time > 0);

        let fire_and_move = FrameIntent {
            firing: true,
            movement: Vec2::new(0.0, PLAYER_SPEED),
            ..FrameIntent::default()
        };
        tick(&mut world, &fire_and_move, &mut audio);
        assert_eq!(world.player.beam.charge_time, 0);
        assert_eq!(world.player.beam.center, BEAM_START_LENGTH);
        assert!(world.energy_beams.is_empty());
        assert!(!world.player.was_stationary);
    }

    #[test]
    fn test_pause_freezes_world() {
        let (mut world, mut audio) = setup();
        let pause = FrameIntent {
            pause_toggled: true,
            ..FrameIntent::default()
        };
        tick(&mut world, &pause, &mut audio);
        let frame = world.frame_count;
        let pos = world.player.pos;
        for _ in 0..10 {
            tick(&mut world, &moving(Vec2::new(PLAYER_SPEED, 0.0)), &mut audio);
        }
        assert_eq!(world.frame_count, frame);
        assert_eq!(world.player.pos, pos);

        tick(&mut world, &pause, &mut audio);
        assert!(!world.paused);
        assert_eq!(world.frame_count, frame + 1);
    }

    #[test]
    fn test_size_lock_refuses_unpause() {
        let (mut world, mut audio) = setup();
        lock_for_resize(&mut world, &mut audio);
        assert!(world.paused);
        let pause = FrameIntent {
            pause_toggled: true,
            ..FrameIntent::default()
        };
        tick(&mut world, &pause, &mut audio);
        assert!(world.paused);

        unlock_after_resize(&mut world);
        // Still paused until the player asks
        tick(&mut world, &FrameIntent::default(), &mut audio);
        assert!(world.paused);
        tick(&mut world, &pause, &mut audio);
        assert!(!world.paused);
    }

    fn key(press: impl FnOnce(&mut FrameIntent)) -> FrameIntent {
        let mut intent = FrameIntent::default();
        press(&mut intent);
        intent
    }

    #[test]
    fn test_quit_needs_confirmation() {
        let (mut world, mut audio) = setup();
        tick(&mut world, &key(|i| i.quit_requested = true), &mut audio);
        assert!(!world.is_over());
        assert!(world.paused);
        assert_eq!(world.abort_prompt, Some(AbortPrompt { was_paused: false }));

        // Prompt holds the round still
        let frame = world.frame_count;
        tick(&mut world, &FrameIntent::default(), &mut audio);
        assert_eq!(world.frame_count, frame);

        tick(&mut world, &key(|i| i.confirm = Some(true)), &mut audio);
        assert_eq!(world.game_over, Some(GameOverReason::Aborted));
        assert!(world.abort_prompt.is_none());
        tick(&mut world, &FrameIntent::default(), &mut audio);
        assert_eq!(world.frame_count, frame);
    }

    #[test]
    fn test_declined_abort_restores_pause_state() {
        let (mut world, mut audio) = setup();
        tick(&mut world, &key(|i| i.quit_requested = true), &mut audio);
        tick(&mut world, &key(|i| i.confirm = Some(false)), &mut audio);
        assert!(world.abort_prompt.is_none());
        assert!(!world.paused);
        assert!(!world.is_over());

        // Already paused before ESC: stays paused after backing out with ESC
        tick(&mut world, &key(|i| i.pause_toggled = true), &mut audio);
        tick(&mut world, &key(|i| i.quit_requested = true), &mut audio);
        tick(&mut world, &key(|i| i.quit_requested = true), &mut audio);
        assert!(world.abort_prompt.is_none());
        assert!(world.paused);
    }

    #[test]
    fn test_prompt_ignores_other_keys() {
        let (mut world, mut audio) = setup();
        tick(&mut world, &key(|i| i.quit_requested = true), &mut audio);
        tick(&mut world, &key(|i| i.pause_toggled = true), &mut audio);
        assert!(world.paused);
        assert!(world.abort_prompt.is_some());
    }

    #[test]
    fn test_cheat_equips_beam() {
        let (mut world, mut audio) = setup();
        let cheat = FrameIntent {
            cheat: Some(CheatCode::EnergyBeam),
            ..FrameIntent::default()
        };
        tick(&mut world, &cheat, &mut audio);
        assert_eq!(world.player.weapon, WeaponKind::EnergyBeam);
    }

    #[test]
    fn test_enemy_breach_costs_health() {
        let (mut world, mut audio) = setup();
        world.player.health = 1;
        world
            .enemies
            .push(Enemy::new(EnemyKind::Normal, Vec2::new(0.2, 10.0)));
        tick(&mut world, &FrameIntent::default(), &mut audio);
        assert_eq!(world.stats.enemies_breached, 1);
        assert_eq!(world.wall_flash_timer, FLASH_FRAMES);
        assert_eq!(world.game_over, Some(GameOverReason::CargoCaptured));
    }

    #[test]
    fn test_shielded_breach_is_free() {
        let (mut world, mut audio) = setup();
        world.player.shield = true;
        world.player.shield_timer = SHIELD_FRAMES;
        world
            .enemies
            .push(Enemy::new(EnemyKind::Normal, Vec2::new(0.2, 10.0)));
        tick(&mut world, &FrameIntent::default(), &mut audio);
        assert_eq!(world.player.health, PLAYER_START_HEALTH);
        assert_eq!(world.stats.enemies_breached, 1);
        assert!(!world.is_over());
    }

    #[test]
    fn test_boss_reaching_hull_ends_round() {
        let (mut world, mut audio) = setup();
        world.boss = Some(Boss::new(Vec2::new(0.1, 10.0), 1));
        tick(&mut world, &FrameIntent::default(), &mut audio);
        assert!(world.boss.is_none());
        assert_eq!(world.player.health, 0);
        assert_eq!(world.game_over, Some(GameOverReason::CargoCaptured));
        assert!(world.events.contains(&GameEvent::BossBreached));
    }

    #[test]
    fn test_boss_fires_every_forty_frames() {
        let (mut world, mut audio) = setup();
        world.boss = Some(Boss::new(Vec2::new(70.0, 10.0), 1));
        world.stats.enemies_killed = 0;
        for _ in 0..40 {
            tick(&mut world, &FrameIntent::default(), &mut audio);
        }
        assert_eq!(audio.bank().count(SoundEffect::BossFire), 1);
        assert_eq!(world.boss_bullets.len(), 1);
    }

    #[test]
    fn test_boss_bullet_ricochets_once() {
        let (mut world, mut audio) = setup();
        // Keep the player out of the bullet's row
        world.player.pos.y = 1.0;
        world.player.prev_pos = world.player.pos;
        world.boss_bullets.push(BossBullet::new(Vec2::new(2.5, 15.0)));
        tick(&mut world, &FrameIntent::default(), &mut audio);
        assert_eq!(audio.bank().count(SoundEffect::Ricochet), 1);
        assert!(world.boss_bullets.iter().all(|b| b.has_ricocheted()));
        for _ in 0..10 {
            tick(&mut world, &FrameIntent::default(), &mut audio);
        }
        assert_eq!(audio.bank().count(SoundEffect::Ricochet), 1);
    }

    #[test]
    fn test_drone_orbits_without_targets() {
        let (mut world, mut audio) = setup();
        world.drones.push(Drone::new(Vec2::new(30.0, 12.0), 0));
        tick(&mut world, &FrameIntent::default(), &mut audio);
        let drone = &world.drones[0];
        assert!(drone.target.is_none());
        assert!((drone.orbit_angle - DRONE_ORBIT_STEP).abs() < 1e-6);
        assert_eq!(drone.lifetime, DRONE_LIFETIME - 1);
    }

    #[test]
    fn test_drone_engages_enemy_in_range() {
        let (mut world, mut audio) = setup();
        world.drones.push(Drone::new(Vec2::new(40.0, 10.0), 0));
        world
            .enemies
            .push(Enemy::new(EnemyKind::Tank, Vec2::new(60.0, 10.0)));
        tick(&mut world, &FrameIntent::default(), &mut audio);
        assert_eq!(world.drones[0].target, Some(Target::Enemy(0)));
        assert_eq!(audio.bank().count(SoundEffect::DroneShoot), 1);
        assert!((7..=9).contains(&world.drones[0].fire_cooldown));
    }

    #[test]
    fn test_drones_expire() {
        let (mut world, mut audio) = setup();
        let mut drone = Drone::new(Vec2::new(30.0, 12.0), 0);
        drone.lifetime = 1;
        world.drones.push(drone);
        tick(&mut world, &FrameIntent::default(), &mut audio);
        assert!(world.drones.is_empty());
    }

    #[test]
    fn test_powerups_drift_and_expire() {
        let (mut world, mut audio) = setup();
        world
            .powerups
            .push(PowerUp::new(PowerUpKind::Shield, Vec2::new(0.1, 20.0)));
        world
            .powerups
            .push(PowerUp::new(PowerUpKind::Shield, Vec2::new(60.0, 20.0)));
        tick(&mut world, &FrameIntent::default(), &mut audio);
        assert_eq!(world.powerups.len(), 1);
        assert!((world.powerups[0].pos.x - 59.8).abs() < 1e-4);
    }

    #[test]
    fn test_timers_expire_powerups() {
        let (mut world, mut audio) = setup();
        world.player.rapid_fire = true;
        world.player.rapid_fire_timer = 1;
        tick(&mut world, &FrameIntent::default(), &mut audio);
        assert!(!world.player.rapid_fire);
        assert_eq!(audio.music_track(), None);
    }

    #[test]
    fn test_stars_wrap() {
        let (mut world, mut audio) = setup();
        world.stars[0].pos.x = 1.05;
        tick(&mut world, &FrameIntent::default(), &mut audio);
        assert_eq!(world.stars[0].pos.x, 78.0);
    }

    #[test]
    fn test_notification_scrolls_every_other_frame() {
        let (mut world, mut audio) = setup();
        world.notification.show("hello", 10);
        for _ in 0..4 {
            tick(&mut world, &FrameIntent::default(), &mut audio);
        }
        assert_eq!(world.notification.timer, 6);
        assert_eq!(world.notification.scroll_offset, 2);
    }

    #[test]
    fn test_ship_destruction_runs_out() {
        let (mut world, mut audio) = setup();
        begin_ship_destruction(&mut world, &mut audio);
        assert_eq!(world.debris.len(), 30);
        assert_eq!(audio.bank().count(SoundEffect::Nuke), 1);
        let mut frames = 0;
        while advance_destruction(&mut world) {
            frames += 1;
            assert!(frames <= DEBRIS_LIFETIME);
        }
        assert!(world.debris.is_empty());
    }
}
