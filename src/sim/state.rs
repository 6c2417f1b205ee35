//! World state and entity types
//!
//! Every entity is a plain struct in a flat list owned by [`World`]. Kind
//! enums fix the immutable launch parameters (sprite, speed, health, points)
//! at construction; mutable fields (health, timers) live on the instance.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::outcome::GameOverReason;
use super::weapon::{BeamCharge, UnlockedWeapons, WeaponKind};
use crate::consts::*;

/// Enemy types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Normal,
    Fast,
    Tank,
    ZigZag,
}

impl EnemyKind {
    pub fn sprite(self) -> &'static [&'static str] {
        match self {
            EnemyKind::Normal => &["╔►", "╚►"],
            EnemyKind::Fast => &["══►"],
            EnemyKind::Tank => &["╔▓╗", "╚▓╝"],
            EnemyKind::ZigZag => &["╱►", "╲►"],
        }
    }

    /// Bounding box (width, height) in cells
    pub fn size(self) -> Vec2 {
        match self {
            EnemyKind::Normal => Vec2::new(2.0, 2.0),
            EnemyKind::Fast => Vec2::new(3.0, 1.0),
            EnemyKind::Tank => Vec2::new(3.0, 2.0),
            EnemyKind::ZigZag => Vec2::new(2.0, 2.0),
        }
    }

    /// Leftward drift per frame
    pub fn speed(self) -> f32 {
        match self {
            EnemyKind::Normal => 0.3,
            EnemyKind::Fast => 0.6,
            EnemyKind::Tank => 0.2,
            EnemyKind::ZigZag => 0.4,
        }
    }

    pub fn max_health(self) -> i32 {
        match self {
            EnemyKind::Normal => 1,
            EnemyKind::Fast => 1,
            EnemyKind::Tank => 10,
            // Matches plasma damage, so one plasma bolt or three spread pellets
            EnemyKind::ZigZag => 3,
        }
    }

    pub fn points(self) -> u32 {
        match self {
            EnemyKind::Normal => 10,
            EnemyKind::Fast => 20,
            EnemyKind::Tank => 30,
            EnemyKind::ZigZag => 25,
        }
    }
}

/// Vertical speed of zigzag enemies
pub const ZIGZAG_VERTICAL_SPEED: f32 = 0.2;

/// An enemy ship
#[derive(Debug, Clone)]
pub struct Enemy {
    pub kind: EnemyKind,
    /// Top-left corner of the sprite
    pub pos: Vec2,
    pub health: i32,
    pub flash_timer: u32,
    /// Vertical direction sign (zigzag only, otherwise 0)
    pub direction: f32,
}

impl Enemy {
    pub fn new(kind: EnemyKind, pos: Vec2) -> Self {
        Self {
            kind,
            pos,
            health: kind.max_health(),
            flash_timer: 0,
            direction: 0.0,
        }
    }

    pub fn zigzag(pos: Vec2, direction: f32) -> Self {
        Self {
            direction: direction.signum(),
            ..Self::new(EnemyKind::ZigZag, pos)
        }
    }

    pub fn size(&self) -> Vec2 {
        self.kind.size()
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size() / 2.0
    }
}

/// The boss (capital warship)
#[derive(Debug, Clone)]
pub struct Boss {
    /// Sprite center
    pub pos: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub speed: f32,
    pub points: u32,
    pub shoot_timer: u32,
    /// Frame counter driving the vertical back-and-forth
    pub move_pattern: u32,
    pub flash_timer: u32,
    /// Which boss this is (1 for the first)
    pub generation: u32,
}

impl Boss {
    pub const SPRITE: [&'static str; 3] = ["╔═╗", "║◈║", "╚═╝"];

    pub fn new(pos: Vec2, generation: u32) -> Self {
        let health = (33 + 22 * generation) as f32;
        Self {
            pos,
            health,
            max_health: health,
            speed: BOSS_SPEED,
            points: 200 + 100 * generation,
            shoot_timer: 0,
            move_pattern: 0,
            flash_timer: 0,
            generation,
        }
    }

    /// Remaining health as a fraction of max
    pub fn health_fraction(&self) -> f32 {
        (self.health / self.max_health).clamp(0.0, 1.0)
    }
}

/// What fired a player-side bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulletSource {
    Plasma,
    Spread,
    Drone,
}

/// A player or drone bullet
#[derive(Debug, Clone, Copy)]
pub struct Bullet {
    pub pos: Vec2,
    /// x = horizontal speed, y = vertical drift
    pub vel: Vec2,
    pub damage: i32,
    pub source: BulletSource,
}

impl Bullet {
    pub fn plasma(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::new(BULLET_SPEED, 0.0),
            damage: PLASMA_DAMAGE,
            source: BulletSource::Plasma,
        }
    }

    pub fn spread(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::new(BULLET_SPEED, 0.0),
            damage: SPREAD_DAMAGE,
            source: BulletSource::Spread,
        }
    }

    /// Drone shot along a unit direction
    pub fn drone(pos: Vec2, dir: Vec2) -> Self {
        Self {
            pos,
            vel: dir * BULLET_SPEED,
            damage: 1,
            source: BulletSource::Drone,
        }
    }

    pub fn glyph(&self) -> char {
        match self.source {
            BulletSource::Drone => '✦',
            _ => '─',
        }
    }
}

/// A live energy beam segment, regenerated every firing frame
#[derive(Debug, Clone, Copy)]
pub struct EnergyBeam {
    /// Cannon origin
    pub pos: Vec2,
    pub length: u32,
    pub lifetime: u32,
}

impl EnergyBeam {
    pub fn new(pos: Vec2, length: u32) -> Self {
        Self {
            pos,
            length,
            lifetime: BEAM_LIFETIME,
        }
    }
}

/// A boss bullet
#[derive(Debug, Clone, Copy)]
pub struct BossBullet {
    pub pos: Vec2,
    /// x < 0 while heading for the cargo ship, > 0 after a ricochet
    pub vel: Vec2,
}

impl BossBullet {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::new(-BOSS_BULLET_SPEED, 0.0),
        }
    }

    pub fn has_ricocheted(&self) -> bool {
        self.vel.x > 0.0
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerUpKind {
    RapidFire,
    Shield,
    Health,
    SpreadShot,
    EnergyBeam,
    Nuke,
    Drone,
}

impl PowerUpKind {
    pub fn glyph(self) -> char {
        match self {
            PowerUpKind::RapidFire => 'R',
            PowerUpKind::Shield => 'S',
            PowerUpKind::Health => '+',
            PowerUpKind::SpreadShot => 'W',
            PowerUpKind::EnergyBeam => 'E',
            PowerUpKind::Nuke => 'N',
            PowerUpKind::Drone => 'D',
        }
    }
}

/// A drifting power-up
#[derive(Debug, Clone, Copy)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub pos: Vec2,
}

impl PowerUp {
    pub fn new(kind: PowerUpKind, pos: Vec2) -> Self {
        Self { kind, pos }
    }
}

/// What a drone is currently locked onto (re-resolved every frame)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Enemy(usize),
    Boss,
}

/// An autonomous fighting drone
#[derive(Debug, Clone)]
pub struct Drone {
    pub pos: Vec2,
    pub lifetime: u32,
    pub fire_cooldown: u32,
    pub target: Option<Target>,
    pub orbit_angle: f32,
}

impl Drone {
    pub const GLYPH: char = '◆';

    pub fn new(pos: Vec2, initial_cooldown: u32) -> Self {
        Self {
            pos,
            lifetime: DRONE_LIFETIME,
            fire_cooldown: initial_cooldown,
            target: None,
            orbit_angle: 0.0,
        }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::ONE
    }
}

/// Cosmetic explosion
#[derive(Debug, Clone, Copy)]
pub struct Explosion {
    pub pos: Vec2,
    pub glyph: char,
    pub lifetime: u32,
    pub big: bool,
}

impl Explosion {
    const BIG_GLYPHS: [char; 4] = ['*', '✦', '✧', '○'];
    const SMALL_GLYPHS: [char; 2] = ['*', '·'];

    pub fn new(pos: Vec2, big: bool, rng: &mut impl Rng) -> Self {
        let glyph = if big {
            Self::BIG_GLYPHS[rng.random_range(0..Self::BIG_GLYPHS.len())]
        } else {
            Self::SMALL_GLYPHS[rng.random_range(0..Self::SMALL_GLYPHS.len())]
        };
        Self {
            pos,
            glyph,
            lifetime: if big { 8 } else { 5 },
            big,
        }
    }
}

/// Ship wreckage flying out of a destroyed player ship
#[derive(Debug, Clone, Copy)]
pub struct Debris {
    pub pos: Vec2,
    pub vel: Vec2,
    pub glyph: char,
    pub lifetime: u32,
}

impl Debris {
    const GLYPHS: [char; 13] = [
        '█', '▓', '▒', '░', '■', '▪', '●', '◆', '◈', '╱', '╲', '═', '║',
    ];

    pub fn new(pos: Vec2, vel: Vec2, rng: &mut impl Rng) -> Self {
        Self {
            pos,
            vel,
            glyph: Self::GLYPHS[rng.random_range(0..Self::GLYPHS.len())],
            lifetime: DEBRIS_LIFETIME,
        }
    }
}

/// Background star (parallax layer 1 is farthest)
#[derive(Debug, Clone, Copy)]
pub struct Star {
    pub pos: Vec2,
    pub speed: f32,
    pub layer: u8,
}

/// Star layers: (count, speed). Speeds avoid matching any enemy speed.
const STAR_LAYERS: [(usize, f32); 3] = [(30, 0.12), (20, 0.25), (15, 0.5)];

/// The player's ship
#[derive(Debug, Clone)]
pub struct Player {
    /// Top-left corner of the 3x3 sprite
    pub pos: Vec2,
    pub vel: Vec2,
    /// Position at the end of the previous frame
    pub prev_pos: Vec2,
    /// Position did not change last frame (energy beam precondition)
    pub was_stationary: bool,
    pub health: i32,
    pub max_health: i32,
    pub score: u32,
    pub shield: bool,
    pub shield_timer: u32,
    pub rapid_fire: bool,
    pub rapid_fire_timer: u32,
    pub fire_cooldown: u32,
    pub weapon: WeaponKind,
    pub unlocked: UnlockedWeapons,
    pub beam: BeamCharge,
    pub flash_timer: u32,
    pub spark_timer: u32,
    pub spark_glyph: char,
}

impl Player {
    pub const SPRITE: [&'static str; 3] = ["╱█►", "██►", "╲█►"];
    pub const SPRITE_SHIELDED: [&'static str; 3] = ["╱█▶", "██▶", "╲█▶"];

    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            prev_pos: pos,
            was_stationary: false,
            health: PLAYER_START_HEALTH,
            max_health: PLAYER_START_HEALTH,
            score: 0,
            shield: false,
            shield_timer: 0,
            rapid_fire: false,
            rapid_fire_timer: 0,
            fire_cooldown: 0,
            weapon: WeaponKind::Plasma,
            unlocked: UnlockedWeapons::default(),
            beam: BeamCharge::default(),
            flash_timer: 0,
            spark_timer: 0,
            spark_glyph: '*',
        }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size() / 2.0
    }

    /// Switch weapons. Locked weapons are refused.
    pub fn equip(&mut self, weapon: WeaponKind) -> bool {
        if !self.unlocked.contains(weapon) {
            return false;
        }
        self.weapon = weapon;
        true
    }

    pub fn unlock(&mut self, weapon: WeaponKind) {
        self.unlocked.insert(weapon);
    }
}

/// Scrolling HUD message
#[derive(Debug, Clone, Default)]
pub struct Notification {
    pub text: String,
    pub timer: u32,
    pub scroll_offset: u32,
}

impl Notification {
    pub fn show(&mut self, text: &str, frames: u32) {
        self.text = text.to_string();
        self.timer = frames;
        self.scroll_offset = 0;
    }

    pub fn is_active(&self) -> bool {
        self.timer > 0
    }
}

/// Open "ABORT MISSION?" prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbortPrompt {
    /// Pause state to restore when the player backs out
    pub was_paused: bool,
}

/// How an enemy was destroyed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillSource {
    Plasma,
    Spread,
    DroneBullet,
    Beam,
    DroneRam,
    PlayerRam,
    Nuke,
}

impl KillSource {
    /// Kill sources that disqualify the plasma-only achievement
    pub fn breaks_plasma_only(self) -> bool {
        matches!(
            self,
            KillSource::Spread | KillSource::DroneBullet | KillSource::Beam
        )
    }
}

/// Things that happened during a tick (cleared at the start of each tick)
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    EnemyDestroyed { kind: EnemyKind, source: KillSource },
    EnemyBreached { kind: EnemyKind },
    BossSpawned { generation: u32 },
    BossDefeated { generation: u32 },
    BossBreached,
    PowerUpRolled { dropped: Option<PowerUpKind> },
    PowerUpCollected { kind: PowerUpKind },
    PlayerHit { health: i32 },
    ShieldAbsorbed,
    Ricochet,
    BeamOverheated,
    DronesLaunched,
}

/// Achievement bookkeeping for the current round
#[derive(Debug, Clone)]
pub struct RoundStats {
    /// Kill counter driving boss spawns
    pub enemies_killed: u32,
    pub enemies_breached: u32,
    pub total_shots_fired: u32,
    pub total_hits: u32,
    pub plasma_only_kills: bool,
    pub nukes_used: u32,
}

impl Default for RoundStats {
    fn default() -> Self {
        Self {
            enemies_killed: 0,
            enemies_breached: 0,
            total_shots_fired: 0,
            total_hits: 0,
            plasma_only_kills: true,
            nukes_used: 0,
        }
    }
}

/// Complete game state for one round
#[derive(Debug, Clone)]
pub struct World {
    /// Play field size (terminal size at round start)
    pub width: u16,
    pub height: u16,
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub frame_count: u64,
    /// Frames between enemy spawns
    pub spawn_rate: u64,
    /// Generation of the next boss to appear
    pub boss_level: u32,
    pub next_boss_kills: u32,
    pub player: Player,
    pub bullets: Vec<Bullet>,
    pub drone_bullets: Vec<Bullet>,
    pub energy_beams: Vec<EnergyBeam>,
    pub enemies: Vec<Enemy>,
    pub boss: Option<Boss>,
    pub boss_bullets: Vec<BossBullet>,
    pub powerups: Vec<PowerUp>,
    pub drones: Vec<Drone>,
    pub explosions: Vec<Explosion>,
    pub debris: Vec<Debris>,
    pub stars: Vec<Star>,
    pub stats: RoundStats,
    pub paused: bool,
    /// Terminal shrank below the round's size; unpausing is refused
    pub size_locked: bool,
    /// Waiting for a yes/no after ESC; the round is paused meanwhile
    pub abort_prompt: Option<AbortPrompt>,
    pub game_over: Option<GameOverReason>,
    pub genesis_wobble_phase: f32,
    pub genesis_wobble: Vec2,
    pub nuke_effect_timer: u32,
    pub wall_flash_timer: u32,
    pub ship_flash_timer: u32,
    pub notification: Notification,
    pub beam_tip_shown: bool,
    pub events: Vec<GameEvent>,
}

impl World {
    /// Create a fresh round on a `width` x `height` play field
    pub fn new(width: u16, height: u16, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let right_limit = Self::right_limit_for(width);
        let start = Vec2::new(
            (2.0 + (right_limit - PLAYER_WIDTH)) / 2.0,
            (height / 2) as f32 - 1.0,
        );
        let stars = generate_starfield(width, height, &mut rng);

        Self {
            width,
            height,
            seed,
            rng,
            frame_count: 0,
            spawn_rate: INITIAL_SPAWN_RATE,
            boss_level: 1,
            next_boss_kills: FIRST_BOSS_KILLS,
            player: Player::new(start),
            bullets: Vec::new(),
            drone_bullets: Vec::new(),
            energy_beams: Vec::new(),
            enemies: Vec::new(),
            boss: None,
            boss_bullets: Vec::new(),
            powerups: Vec::new(),
            drones: Vec::new(),
            explosions: Vec::new(),
            debris: Vec::new(),
            stars,
            stats: RoundStats::default(),
            paused: false,
            size_locked: false,
            abort_prompt: None,
            game_over: None,
            genesis_wobble_phase: 0.0,
            genesis_wobble: Vec2::ZERO,
            nuke_effect_timer: 0,
            wall_flash_timer: 0,
            ship_flash_timer: 30,
            notification: Notification::default(),
            beam_tip_shown: false,
            events: Vec::new(),
        }
    }

    fn right_limit_for(width: u16) -> f32 {
        (width / 3) as f32 + 8.0
    }

    /// Rightmost column the player's ship may reach
    pub fn right_limit(&self) -> f32 {
        Self::right_limit_for(self.width)
    }

    /// Rightmost visible column of the cargo ship hull (wobbles)
    pub fn genesis_right_edge(&self) -> f32 {
        GENESIS_X + self.genesis_wobble.x + GENESIS_WIDTH
    }

    pub fn is_over(&self) -> bool {
        self.game_over.is_some()
    }

    /// End the round. The first reason recorded wins.
    pub fn end_round(&mut self, reason: GameOverReason) {
        if self.game_over.is_none() {
            log::info!(
                "Round over: {} (score {}, frame {})",
                reason.as_str(),
                self.player.score,
                self.frame_count
            );
            self.game_over = Some(reason);
        }
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn spawn_explosion(&mut self, pos: Vec2, big: bool) {
        let explosion = Explosion::new(pos, big, &mut self.rng);
        self.explosions.push(explosion);
    }

    /// Random row inside the field, `margin` rows from top and bottom
    pub fn random_row(&mut self, top: u16, bottom_margin: u16) -> f32 {
        let bottom = self.height.saturating_sub(bottom_margin).max(top);
        self.rng.random_range(top..=bottom) as f32
    }

    /// Launch a wing of three drones ahead of the player
    pub fn launch_drones(&mut self) {
        let x = self.player.pos.x;
        let cy = self.player.pos.y + 1.0;
        self.drones.push(Drone::new(Vec2::new(x + 12.0, cy - 8.0), 0));
        self.drones.push(Drone::new(Vec2::new(x + 15.0, cy), 3));
        self.drones.push(Drone::new(Vec2::new(x + 12.0, cy + 8.0), 6));
        self.emit(GameEvent::DronesLaunched);
        log::debug!("Drone wing launched ({} drones active)", self.drones.len());
    }
}

fn generate_starfield(width: u16, height: u16, rng: &mut impl Rng) -> Vec<Star> {
    let max_x = (width as f32 - 1.0).max(1.0);
    let max_y = height.saturating_sub(2).max(1);
    let mut stars = Vec::with_capacity(STAR_LAYERS.iter().map(|(n, _)| n).sum());
    for (layer, &(count, speed)) in STAR_LAYERS.iter().enumerate() {
        for _ in 0..count {
            stars.push(Star {
                pos: Vec2::new(
                    rng.random_range(0.0..max_x),
                    rng.random_range(1..=max_y) as f32,
                ),
                speed,
                layer: layer as u8 + 1,
            });
        }
    }
    stars
}
