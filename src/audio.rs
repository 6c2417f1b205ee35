//! Audio direction
//!
//! Sound synthesis lives behind [`SoundBank`]; the game only names cues and
//! loop tracks. [`AudioManager`] applies volume settings and decides which
//! engine and music loops should be running from the ship's state.

use std::collections::HashMap;

use glam::Vec2;

use crate::settings::Settings;

/// One-shot sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Plasma shot
    Shoot,
    SpreadShoot,
    EnergyBeam,
    /// Beam in its flicker window
    EnergyBeamDying,
    SideBeamActivate,
    /// Refused action (beam while moving or overheated)
    Blocked,
    Explosion,
    BossHit,
    /// Boss arrival or defeat
    Boss,
    BossFire,
    Ricochet,
    /// Player took a hit
    Damage,
    PowerUp,
    Nuke,
    DroneShoot,
    GameStart,
}

impl SoundEffect {
    pub fn cue_id(self) -> &'static str {
        match self {
            SoundEffect::Shoot => "shoot",
            SoundEffect::SpreadShoot => "spread_shoot",
            SoundEffect::EnergyBeam => "energy_beam",
            SoundEffect::EnergyBeamDying => "energy_beam_dying",
            SoundEffect::SideBeamActivate => "side_beam_activate",
            SoundEffect::Blocked => "blocked",
            SoundEffect::Explosion => "explosion",
            SoundEffect::BossHit => "boss_hit",
            SoundEffect::Boss => "boss",
            SoundEffect::BossFire => "boss_fire",
            SoundEffect::Ricochet => "ricochet",
            SoundEffect::Damage => "damage",
            SoundEffect::PowerUp => "powerup",
            SoundEffect::Nuke => "nuke",
            SoundEffect::DroneShoot => "drone_shoot",
            SoundEffect::GameStart => "game_start",
        }
    }
}

/// Looping tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopTrack {
    EngineIdle,
    /// Forward thrust
    EngineRight,
    EngineLeft,
    EngineVertical,
    MenuMusic,
    /// Ticking clock while a power-up runs
    GameMusic,
    GameMusicIntense,
    /// Fanfare behind the high-score prompt. Backends play it through once.
    HeroMusic,
}

impl LoopTrack {
    pub fn id(self) -> &'static str {
        match self {
            LoopTrack::EngineIdle => "engine_idle",
            LoopTrack::EngineRight => "engine_right",
            LoopTrack::EngineLeft => "engine_left",
            LoopTrack::EngineVertical => "engine_vertical",
            LoopTrack::MenuMusic => "menu_music",
            LoopTrack::GameMusic => "game_music",
            LoopTrack::GameMusicIntense => "game_music_intense",
            LoopTrack::HeroMusic => "hero_music",
        }
    }

    fn is_music(self) -> bool {
        !matches!(
            self,
            LoopTrack::EngineIdle
                | LoopTrack::EngineRight
                | LoopTrack::EngineLeft
                | LoopTrack::EngineVertical
        )
    }
}

/// Handle to a running loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoopHandle(pub u32);

/// Sound backend: plays named cues and loops. Fire-and-forget.
pub trait SoundBank {
    fn play(&mut self, effect: SoundEffect, volume: f32);
    fn start_loop(&mut self, track: LoopTrack, volume: f32) -> LoopHandle;
    fn stop(&mut self, handle: LoopHandle);
    fn pause(&mut self, handle: LoopHandle);
    fn resume(&mut self, handle: LoopHandle);
    fn set_volume(&mut self, handle: LoopHandle, volume: f32);
    fn is_playing(&self, handle: LoopHandle) -> bool;
}

#[derive(Debug, Clone, Copy)]
struct LoopState {
    track: LoopTrack,
    volume: f32,
    paused: bool,
}

/// Bank with no output device. Tracks loop state so the game logic behaves
/// the same as with real audio.
#[derive(Debug, Default)]
pub struct SilentBank {
    loops: HashMap<LoopHandle, LoopState>,
    next_handle: u32,
}

impl SilentBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track of a running loop
    pub fn track(&self, handle: LoopHandle) -> Option<LoopTrack> {
        self.loops.get(&handle).map(|state| state.track)
    }

    pub fn volume(&self, handle: LoopHandle) -> Option<f32> {
        self.loops.get(&handle).map(|state| state.volume)
    }

    /// Number of loops that exist (paused or not)
    pub fn live_loops(&self) -> usize {
        self.loops.len()
    }
}

impl SoundBank for SilentBank {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        log::trace!("cue {} at {:.2}", effect.cue_id(), volume);
    }

    fn start_loop(&mut self, track: LoopTrack, volume: f32) -> LoopHandle {
        let handle = LoopHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        self.loops.insert(
            handle,
            LoopState {
                track,
                volume,
                paused: false,
            },
        );
        handle
    }

    fn stop(&mut self, handle: LoopHandle) {
        self.loops.remove(&handle);
    }

    fn pause(&mut self, handle: LoopHandle) {
        if let Some(state) = self.loops.get_mut(&handle) {
            state.paused = true;
        }
    }

    fn resume(&mut self, handle: LoopHandle) {
        if let Some(state) = self.loops.get_mut(&handle) {
            state.paused = false;
        }
    }

    fn set_volume(&mut self, handle: LoopHandle, volume: f32) {
        if let Some(state) = self.loops.get_mut(&handle) {
            state.volume = volume;
        }
    }

    fn is_playing(&self, handle: LoopHandle) -> bool {
        self.loops.get(&handle).is_some_and(|state| !state.paused)
    }
}

/// Bank that records every cue it is asked to play
#[derive(Debug, Default)]
pub struct CueRecorder {
    pub cues: Vec<(SoundEffect, f32)>,
    /// Every loop started, in order
    pub loops_started: Vec<LoopTrack>,
    inner: SilentBank,
}

impl CueRecorder {
    /// How many times a cue was played
    pub fn count(&self, effect: SoundEffect) -> usize {
        self.cues.iter().filter(|(e, _)| *e == effect).count()
    }

    pub fn last_volume(&self, effect: SoundEffect) -> Option<f32> {
        self.cues
            .iter()
            .rev()
            .find(|(e, _)| *e == effect)
            .map(|&(_, v)| v)
    }

    pub fn clear(&mut self) {
        self.cues.clear();
        self.loops_started.clear();
    }

    /// Track behind a running loop handle
    pub fn track(&self, handle: LoopHandle) -> Option<LoopTrack> {
        self.inner.track(handle)
    }
}

impl SoundBank for CueRecorder {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        self.cues.push((effect, volume));
    }

    fn start_loop(&mut self, track: LoopTrack, volume: f32) -> LoopHandle {
        self.loops_started.push(track);
        self.inner.start_loop(track, volume)
    }

    fn stop(&mut self, handle: LoopHandle) {
        self.inner.stop(handle);
    }

    fn pause(&mut self, handle: LoopHandle) {
        self.inner.pause(handle);
    }

    fn resume(&mut self, handle: LoopHandle) {
        self.inner.resume(handle);
    }

    fn set_volume(&mut self, handle: LoopHandle, volume: f32) {
        self.inner.set_volume(handle, volume);
    }

    fn is_playing(&self, handle: LoopHandle) -> bool {
        self.inner.is_playing(handle)
    }
}

/// Pick the engine loop for the current velocity
pub fn engine_track(velocity: Vec2, at_forward_limit: bool) -> LoopTrack {
    if velocity.x > 0.0 {
        if at_forward_limit {
            LoopTrack::EngineIdle
        } else {
            LoopTrack::EngineRight
        }
    } else if velocity.x < 0.0 && velocity.y != 0.0 {
        // Vertical is the louder of the two
        LoopTrack::EngineVertical
    } else if velocity.x < 0.0 {
        LoopTrack::EngineLeft
    } else if velocity.y != 0.0 {
        LoopTrack::EngineVertical
    } else {
        LoopTrack::EngineIdle
    }
}

/// Audio manager for the game
pub struct AudioManager<B: SoundBank> {
    bank: B,
    master_volume: f32,
    sfx_volume: f32,
    music_volume: f32,
    muted: bool,
    engine: Option<(LoopHandle, LoopTrack)>,
    prev_velocity: Option<Vec2>,
    music: Option<(LoopHandle, LoopTrack)>,
}

impl<B: SoundBank> AudioManager<B> {
    pub fn new(bank: B) -> Self {
        Self {
            bank,
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,
            engine: None,
            prev_velocity: None,
            music: None,
        }
    }

    pub fn with_settings(bank: B, settings: &Settings) -> Self {
        let mut audio = Self::new(bank);
        audio.set_master_volume(settings.master_volume);
        audio.set_sfx_volume(settings.sfx_volume);
        audio.set_music_volume(settings.music_volume);
        audio.set_muted(settings.muted);
        audio
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_music_volume(&mut self, vol: f32) {
        self.music_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self, channel: f32) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * channel
        }
    }

    /// Play a cue at full cue volume
    pub fn play(&mut self, effect: SoundEffect) {
        self.play_at(effect, 1.0);
    }

    /// Play a cue at a relative volume
    pub fn play_at(&mut self, effect: SoundEffect, volume: f32) {
        let vol = self.effective_volume(self.sfx_volume) * volume;
        if vol <= 0.0 {
            return;
        }
        self.bank.play(effect, vol);
    }

    fn start(&mut self, track: LoopTrack) -> LoopHandle {
        let channel = if track.is_music() {
            self.music_volume
        } else {
            self.sfx_volume
        };
        let vol = self.effective_volume(channel);
        self.bank.start_loop(track, vol)
    }

    /// Switch the engine loop to match the ship's velocity.
    /// Restarted only when the velocity or the wanted track changes.
    pub fn update_engine(&mut self, velocity: Vec2, at_forward_limit: bool) {
        let desired = engine_track(velocity, at_forward_limit);
        let velocity_changed = self.prev_velocity != Some(velocity);
        self.prev_velocity = Some(velocity);

        let track_changed = self.engine.is_none_or(|(_, track)| track != desired);
        if !velocity_changed && !track_changed {
            return;
        }
        if let Some((handle, _)) = self.engine.take() {
            self.bank.stop(handle);
        }
        let handle = self.start(desired);
        self.engine = Some((handle, desired));
    }

    /// Ticking music while a power-up runs; intense with both running
    pub fn update_music(&mut self, shield: bool, rapid_fire: bool) {
        let desired = match (shield, rapid_fire) {
            (true, true) => Some(LoopTrack::GameMusicIntense),
            (true, false) | (false, true) => Some(LoopTrack::GameMusic),
            (false, false) => None,
        };
        let current = self
            .music
            .filter(|&(handle, _)| self.bank.is_playing(handle))
            .map(|(_, track)| track);
        if current == desired {
            return;
        }
        match desired {
            Some(track) => self.start_music(track),
            None => self.stop_music(),
        }
    }

    /// Title screen background loop
    pub fn start_menu_music(&mut self) {
        if self.music_track() != Some(LoopTrack::MenuMusic) {
            self.start_music(LoopTrack::MenuMusic);
        }
    }

    /// One-shot fanfare for a new high score
    pub fn start_hero_music(&mut self) {
        self.start_music(LoopTrack::HeroMusic);
    }

    /// Replace whatever music is running with `track`
    pub fn start_music(&mut self, track: LoopTrack) {
        self.stop_music();
        let handle = self.start(track);
        self.music = Some((handle, track));
    }

    pub fn stop_music(&mut self) {
        if let Some((handle, _)) = self.music.take() {
            self.bank.stop(handle);
        }
    }

    /// Track currently in the music slot
    pub fn music_track(&self) -> Option<LoopTrack> {
        self.music.map(|(_, track)| track)
    }

    pub fn engine_track(&self) -> Option<LoopTrack> {
        self.engine.map(|(_, track)| track)
    }

    fn loops(&self) -> impl Iterator<Item = LoopHandle> + use<B> {
        let engine = self.engine.map(|(h, _)| h);
        let music = self.music.map(|(h, _)| h);
        engine.into_iter().chain(music)
    }

    pub fn pause_loops(&mut self) {
        for handle in self.loops() {
            self.bank.pause(handle);
        }
    }

    pub fn resume_loops(&mut self) {
        for handle in self.loops() {
            self.bank.resume(handle);
        }
    }

    /// Stop engine and music (round over)
    pub fn stop_loops(&mut self) {
        if let Some((handle, _)) = self.engine.take() {
            self.bank.stop(handle);
        }
        self.prev_velocity = None;
        self.stop_music();
    }

    pub fn bank(&self) -> &B {
        &self.bank
    }
}
