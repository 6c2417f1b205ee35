//! Weapons and the energy beam charge cycle
//!
//! Plasma and spread are plain cooldown emitters. The energy beam only fires
//! while the ship holds still, and walks through
//! Idle -> Charging -> FullPower -> Flickering -> Overheated, resetting when
//! the trigger is released or the ship moves.

use glam::Vec2;
use rand::Rng;

use super::state::{Bullet, EnergyBeam, GameEvent, World};
use crate::audio::{AudioManager, SoundBank, SoundEffect};
use crate::consts::*;

/// Player weapon types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeaponKind {
    Plasma,
    Spread,
    EnergyBeam,
}

impl WeaponKind {
    pub fn label(self) -> &'static str {
        match self {
            WeaponKind::Plasma => "PLASMA",
            WeaponKind::Spread => "SPREAD",
            WeaponKind::EnergyBeam => "ENERGY BEAM",
        }
    }

    /// Weapon bound to a number key
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            '1' => Some(WeaponKind::Plasma),
            '2' => Some(WeaponKind::Spread),
            '3' => Some(WeaponKind::EnergyBeam),
            _ => None,
        }
    }
}

/// Weapons available to the player. Plasma is always unlocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnlockedWeapons {
    spread: bool,
    beam: bool,
}

impl UnlockedWeapons {
    pub fn contains(&self, weapon: WeaponKind) -> bool {
        match weapon {
            WeaponKind::Plasma => true,
            WeaponKind::Spread => self.spread,
            WeaponKind::EnergyBeam => self.beam,
        }
    }

    pub fn insert(&mut self, weapon: WeaponKind) {
        match weapon {
            WeaponKind::Plasma => {}
            WeaponKind::Spread => self.spread = true,
            WeaponKind::EnergyBeam => self.beam = true,
        }
    }
}

/// Where the energy beam is in its charge cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeamPhase {
    Idle,
    Charging,
    FullPower,
    Flickering,
    Overheated,
}

/// Energy beam charge state carried by the player
#[derive(Debug, Clone, PartialEq)]
pub struct BeamCharge {
    /// Center beam length (grows first)
    pub center: u32,
    pub top: u32,
    pub bottom: u32,
    /// Firing frames spent charging
    pub charge_time: u32,
    /// Frames spent at full power
    pub decay_time: u32,
    /// Frames a beam segment was emitted since the last reset
    pub active_time: u32,
    pub overheated: bool,
    pub trigger_was_pressed: bool,
    pub side_beams_activated: bool,
}

impl Default for BeamCharge {
    fn default() -> Self {
        Self {
            center: BEAM_START_LENGTH,
            top: 0,
            bottom: 0,
            charge_time: 0,
            decay_time: 0,
            active_time: 0,
            overheated: false,
            trigger_was_pressed: false,
            side_beams_activated: false,
        }
    }
}

impl BeamCharge {
    /// Back to a fresh charge (keeps the trigger edge tracker)
    pub fn reset(&mut self) {
        *self = Self {
            trigger_was_pressed: self.trigger_was_pressed,
            ..Self::default()
        };
    }

    pub fn at_full_power(&self) -> bool {
        self.center >= BEAM_MAX_LENGTH
            && self.top >= BEAM_MAX_LENGTH
            && self.bottom >= BEAM_MAX_LENGTH
    }

    pub fn phase(&self) -> BeamPhase {
        if self.overheated {
            BeamPhase::Overheated
        } else if self.decay_time > 0 {
            BeamPhase::Flickering
        } else if self.at_full_power() {
            BeamPhase::FullPower
        } else if self.charge_time > 0 {
            BeamPhase::Charging
        } else {
            BeamPhase::Idle
        }
    }

    /// Grow the center beam, then both side beams together.
    /// Returns true on the frame the side beams come online.
    pub fn grow(&mut self, rate: u32) -> bool {
        if self.center < BEAM_MAX_LENGTH {
            self.center = (self.center + rate).min(BEAM_MAX_LENGTH);
            false
        } else if self.top < BEAM_MAX_LENGTH || self.bottom < BEAM_MAX_LENGTH {
            let activating = !self.side_beams_activated && self.top == 0;
            if activating {
                self.side_beams_activated = true;
            }
            self.top = (self.top + rate).min(BEAM_MAX_LENGTH);
            self.bottom = (self.bottom + rate).min(BEAM_MAX_LENGTH);
            activating
        } else {
            false
        }
    }

    /// Lengths of the segments to emit, as (row offset, length)
    fn segments(&self) -> impl Iterator<Item = (f32, u32)> {
        [(1.0, self.center), (0.0, self.top), (2.0, self.bottom)]
            .into_iter()
            .filter(|&(_, len)| len > 0)
    }
}

/// Beam growth per firing frame, accelerating with charge time
pub fn growth_rate(charge_time: u32, rapid_fire: bool) -> u32 {
    let rate = match charge_time {
        0..30 => 3,
        30..60 => 6,
        60..90 => 9,
        _ => 12,
    };
    if rapid_fire { rate * 2 } else { rate }
}

/// Flicker schedule during the full-power window.
///
/// Period 2 (~15 Hz) for the first second, widening through the second,
/// then long outages in the last second before shutdown.
pub fn flicker_visible(decay_time: u32) -> bool {
    let t = decay_time.saturating_sub(1);
    let period = if t < 30 {
        2
    } else if t < 60 {
        2 + (t - 30) / 5
    } else {
        8 + (t - 60) / 3
    };
    t % period < period / 2
}

const SPARK_GLYPHS: [char; 15] = [
    '*', '✦', '✧', '✵', '✶', '✷', '✸', '✹', '※', '⁕', '⁎', '∗', '⋆', '★', '☆',
];

/// Fire the current weapon if the cooldown allows it
pub fn fire<B: SoundBank>(world: &mut World, audio: &mut AudioManager<B>) {
    let player = &mut world.player;
    if player.fire_cooldown > 0 {
        return;
    }

    player.fire_cooldown = match player.weapon {
        WeaponKind::EnergyBeam => BEAM_FIRE_COOLDOWN,
        _ if player.rapid_fire => RAPID_FIRE_COOLDOWN,
        _ => FIRE_COOLDOWN,
    };

    let muzzle = Vec2::new(player.pos.x + PLAYER_WIDTH, player.pos.y);
    match player.weapon {
        WeaponKind::Plasma => {
            world.bullets.push(Bullet::plasma(muzzle + Vec2::Y));
            world.stats.total_shots_fired += 1;
            audio.play(SoundEffect::Shoot);
        }
        WeaponKind::Spread => {
            // Wings and center, all straight ahead
            for row in [1.0, 0.0, 2.0] {
                world.bullets.push(Bullet::spread(muzzle + Vec2::new(0.0, row)));
            }
            world.stats.total_shots_fired += 3;
            audio.play(SoundEffect::SpreadShoot);
        }
        WeaponKind::EnergyBeam => fire_beam(world, muzzle, audio),
    }
}

fn fire_beam<B: SoundBank>(world: &mut World, muzzle: Vec2, audio: &mut AudioManager<B>) {
    if world.player.beam.overheated || !world.player.was_stationary {
        blocked(world, audio);
        return;
    }

    let rapid = world.player.rapid_fire;
    let beam = &mut world.player.beam;
    if !beam.at_full_power() {
        beam.charge_time += 1;
        if beam.grow(growth_rate(beam.charge_time, rapid)) {
            audio.play(SoundEffect::SideBeamActivate);
        }
    }
    beam.active_time += 1;

    world.energy_beams.clear();
    world.energy_beams.extend(
        beam.segments()
            .map(|(row, len)| EnergyBeam::new(muzzle + Vec2::new(0.0, row), len)),
    );

    if beam.decay_time > 0 {
        audio.play_at(SoundEffect::EnergyBeamDying, 0.9);
    } else if beam.top > 0 || beam.bottom > 0 {
        audio.play_at(SoundEffect::EnergyBeam, 0.9);
    } else {
        audio.play_at(SoundEffect::EnergyBeam, 0.6);
    }
}

/// Refused beam shot: quiet "blocked" cue and a spark at the muzzle
fn blocked<B: SoundBank>(world: &mut World, audio: &mut AudioManager<B>) {
    audio.play_at(SoundEffect::Blocked, 0.3);
    world.player.spark_timer = SPARK_FRAMES;
    world.player.spark_glyph = SPARK_GLYPHS[world.rng.random_range(0..SPARK_GLYPHS.len())];
}

/// Reset the charge when the trigger goes from held to released
pub fn check_trigger_release(world: &mut World, trigger_held: bool) {
    if world.player.weapon != WeaponKind::EnergyBeam {
        return;
    }
    let beam = &mut world.player.beam;
    if beam.trigger_was_pressed && !trigger_held {
        beam.reset();
        world.energy_beams.clear();
    }
    beam.trigger_was_pressed = trigger_held;
}

/// Advance the full-power window every frame: flicker, then overheat
pub fn update_decay<B: SoundBank>(
    world: &mut World,
    trigger_held: bool,
    audio: &mut AudioManager<B>,
) {
    let player = &mut world.player;
    if player.weapon != WeaponKind::EnergyBeam || !player.was_stationary {
        return;
    }
    if !trigger_held || player.beam.overheated || !player.beam.at_full_power() {
        return;
    }

    player.beam.decay_time += 1;
    if player.beam.decay_time >= BEAM_DECAY_FRAMES {
        let beam = &mut player.beam;
        beam.overheated = true;
        beam.center = 0;
        beam.top = 0;
        beam.bottom = 0;
        world.energy_beams.clear();
        blocked(world, audio);
        world.emit(GameEvent::BeamOverheated);
        log::debug!("Energy beam overheated at frame {}", world.frame_count);
    } else if !flicker_visible(player.beam.decay_time) {
        world.energy_beams.clear();
    }
}

/// Drop the charge and any live beam the moment the ship moves
pub fn cancel_on_move(world: &mut World) {
    world.player.beam.reset();
    world.energy_beams.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::CueRecorder;

    fn beam_world() -> (World, AudioManager<CueRecorder>) {
        let mut world = World::new(80, 24, 7);
        world.player.unlock(WeaponKind::EnergyBeam);
        world.player.equip(WeaponKind::EnergyBeam);
        world.player.was_stationary = true;
        (world, AudioManager::new(CueRecorder::default()))
    }

    #[test]
    fn test_growth_rate_tiers() {
        assert_eq!(growth_rate(1, false), 3);
        assert_eq!(growth_rate(29, false), 3);
        assert_eq!(growth_rate(30, false), 6);
        assert_eq!(growth_rate(60, false), 9);
        assert_eq!(growth_rate(90, false), 12);
        assert_eq!(growth_rate(10, true), 6);
        assert_eq!(growth_rate(200, true), 24);
    }

    #[test]
    fn test_flicker_starts_near_half_duty() {
        let visible: Vec<bool> = (1..=4).map(flicker_visible).collect();
        assert_eq!(visible, vec![true, false, true, false]);
    }

    #[test]
    fn test_flicker_outages_lengthen() {
        let off_early = (1..=30).filter(|&t| !flicker_visible(t)).count();
        let off_late = (61..=89).filter(|&t| !flicker_visible(t)).count();
        assert_eq!(off_early, 15);
        // Late window has a long period so visibility comes in long blocks
        assert!((61..=89).any(flicker_visible));
        assert!(off_late > 0);
    }

    #[test]
    fn test_center_grows_before_sides() {
        let mut beam = BeamCharge::default();
        assert!(!beam.grow(12));
        assert_eq!((beam.center, beam.top, beam.bottom), (27, 0, 0));
        for _ in 0..3 {
            beam.grow(12);
        }
        assert_eq!(beam.center, 60);
        assert_eq!(beam.top, 0);
        assert!(beam.grow(12));
        assert_eq!((beam.top, beam.bottom), (12, 12));
        assert!(!beam.grow(12));
    }

    #[test]
    fn test_plasma_cooldown_and_shot_count() {
        let mut world = World::new(80, 24, 7);
        let mut audio = AudioManager::new(CueRecorder::default());
        fire(&mut world, &mut audio);
        fire(&mut world, &mut audio);
        assert_eq!(world.bullets.len(), 1);
        assert_eq!(world.bullets[0].damage, 3);
        assert_eq!(world.bullets[0].pos.y, world.player.pos.y + 1.0);
        assert_eq!(world.player.fire_cooldown, FIRE_COOLDOWN);
        assert_eq!(world.stats.total_shots_fired, 1);
        assert_eq!(audio.bank().count(SoundEffect::Shoot), 1);
    }

    #[test]
    fn test_spread_fires_three_parallel_bullets() {
        let mut world = World::new(80, 24, 7);
        let mut audio = AudioManager::new(CueRecorder::default());
        world.player.unlock(WeaponKind::Spread);
        world.player.equip(WeaponKind::Spread);
        world.player.rapid_fire = true;
        fire(&mut world, &mut audio);
        assert_eq!(world.bullets.len(), 3);
        assert!(world.bullets.iter().all(|b| b.damage == 1 && b.vel.y == 0.0));
        assert_eq!(world.player.fire_cooldown, RAPID_FIRE_COOLDOWN);
        assert_eq!(world.stats.total_shots_fired, 3);
    }

    #[test]
    fn test_beam_blocked_while_moving() {
        let (mut world, mut audio) = beam_world();
        world.player.was_stationary = false;
        fire(&mut world, &mut audio);
        assert!(world.energy_beams.is_empty());
        assert_eq!(world.player.spark_timer, SPARK_FRAMES);
        assert_eq!(audio.bank().count(SoundEffect::Blocked), 1);
        assert_eq!(world.player.beam.charge_time, 0);
    }

    #[test]
    fn test_beam_emits_one_segment_per_cannon() {
        let (mut world, mut audio) = beam_world();
        world.player.beam.center = 60;
        world.player.beam.top = 30;
        world.player.beam.bottom = 30;
        fire(&mut world, &mut audio);
        assert_eq!(world.energy_beams.len(), 3);
        world.player.fire_cooldown = 0;
        fire(&mut world, &mut audio);
        // Regenerated, not stacked
        assert_eq!(world.energy_beams.len(), 3);
    }

    #[test]
    fn test_side_beam_cue_plays_once() {
        let (mut world, mut audio) = beam_world();
        for _ in 0..60 {
            world.player.fire_cooldown = 0;
            fire(&mut world, &mut audio);
        }
        assert!(world.player.beam.at_full_power());
        assert_eq!(audio.bank().count(SoundEffect::SideBeamActivate), 1);
    }

    #[test]
    fn test_overheat_after_decay_window() {
        let (mut world, mut audio) = beam_world();
        world.player.beam.center = 60;
        world.player.beam.top = 60;
        world.player.beam.bottom = 60;
        for _ in 0..BEAM_DECAY_FRAMES {
            update_decay(&mut world, true, &mut audio);
        }
        let beam = &world.player.beam;
        assert!(beam.overheated);
        assert_eq!(beam.phase(), BeamPhase::Overheated);
        assert_eq!((beam.center, beam.top, beam.bottom), (0, 0, 0));
        assert!(world.events.contains(&GameEvent::BeamOverheated));

        // Refused until release
        world.player.fire_cooldown = 0;
        fire(&mut world, &mut audio);
        assert!(world.energy_beams.is_empty());
    }

    #[test]
    fn test_release_resets_charge() {
        let (mut world, mut audio) = beam_world();
        check_trigger_release(&mut world, true);
        fire(&mut world, &mut audio);
        assert_eq!(world.player.beam.phase(), BeamPhase::Charging);
        world.player.beam.overheated = true;

        check_trigger_release(&mut world, false);
        let beam = &world.player.beam;
        assert!(!beam.overheated);
        assert_eq!(beam.center, BEAM_START_LENGTH);
        assert_eq!(beam.charge_time, 0);
        assert_eq!(beam.phase(), BeamPhase::Idle);
        assert!(world.energy_beams.is_empty());
    }
}
