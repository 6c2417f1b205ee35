//! In-round frame drawing
//!
//! Translates a [`World`] snapshot into canvas cells. No game logic happens
//! here; the renderer only reads state.

use std::io::Write;

use crossterm::style::Color;

use super::canvas::Canvas;
use super::screens;
use crate::Settings;
use crate::consts::*;
use crate::sim::state::{Boss, BulletSource, Drone, Player};
use crate::sim::{BeamPhase, EnemyKind, PowerUpKind, WeaponKind, World};

// Palette

const C_BORDER: Color = Color::DarkBlue;
const C_HUD: Color = Color::Yellow;
const C_HUD_DIM: Color = Color::DarkGrey;
const C_HEALTH: Color = Color::Red;
const C_PLAYER: Color = Color::White;
const C_SHIELD: Color = Color::Cyan;
const C_FLASH: Color = Color::Red;
const C_SPARK: Color = Color::Yellow;
const C_HULL: Color = Color::Grey;
const C_LIMIT: Color = Color::DarkGrey;
const C_BULLET: Color = Color::Cyan;
const C_DRONE_BULLET: Color = Color::Yellow;
const C_BEAM: Color = Color::Magenta;
const C_BOSS: Color = Color::DarkRed;
const C_BOSS_BULLET: Color = Color::Red;
const C_RICOCHET: Color = Color::Magenta;
const C_DRONE: Color = Color::Green;
const C_EXPLOSION_BIG: Color = Color::Yellow;
const C_EXPLOSION_SMALL: Color = Color::DarkYellow;
const C_DEBRIS: Color = Color::DarkGrey;
const C_TICKER: Color = Color::Green;
const C_OVERLAY: Color = Color::White;

const STAR_GLYPHS: [(char, Color); 3] = [
    ('.', Color::DarkGrey),
    ('·', Color::Grey),
    ('∙', Color::White),
];

const HEALTH_BAR_WIDTH: usize = 10;

/// Draws rounds to the terminal
pub struct TerminalRenderer {
    canvas: Canvas,
    previous: Option<Canvas>,
    flashes: bool,
    high_score: u32,
}

impl TerminalRenderer {
    pub fn new(width: u16, height: u16, settings: &Settings) -> Self {
        Self {
            canvas: Canvas::new(width, height),
            previous: None,
            flashes: settings.effective_flashes(),
            high_score: 0,
        }
    }

    /// Match the live terminal size; the next frame is a full redraw
    pub fn resize(&mut self, width: u16, height: u16) {
        if width != self.canvas.width() || height != self.canvas.height() {
            self.canvas = Canvas::new(width, height);
            self.previous = None;
        }
    }

    pub fn set_high_score(&mut self, score: u32) {
        self.high_score = score;
    }

    /// Force a full redraw next frame
    pub fn invalidate(&mut self) {
        self.previous = None;
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub(crate) fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    /// Compose one frame of the round without touching the terminal
    pub fn compose(&mut self, world: &World) {
        self.canvas.clear();
        let flashes = self.flashes;
        let canvas = &mut self.canvas;

        draw_stars(canvas, world);
        draw_border(canvas, world, flashes);
        draw_limit_markers(canvas, world);
        draw_hull(canvas, world, flashes);

        for powerup in &world.powerups {
            let (x, y) = (cell(powerup.pos.x), cell(powerup.pos.y));
            canvas.put(x, y, powerup.kind.glyph(), powerup_color(powerup.kind));
        }
        for enemy in &world.enemies {
            let color = if enemy.flash_timer > 0 && flashes {
                Color::White
            } else {
                enemy_color(enemy.kind)
            };
            canvas.sprite(cell(enemy.pos.x), cell(enemy.pos.y), enemy.kind.sprite(), color);
        }
        if let Some(boss) = &world.boss {
            draw_boss(canvas, boss, flashes);
        }
        for beam in &world.energy_beams {
            let (x, y) = (cell(beam.pos.x), cell(beam.pos.y));
            for i in 0..beam.length as i32 {
                canvas.put(x + i, y, '═', C_BEAM);
            }
        }
        for bullet in world.bullets.iter().chain(&world.drone_bullets) {
            let color = match bullet.source {
                BulletSource::Drone => C_DRONE_BULLET,
                _ => C_BULLET,
            };
            canvas.put(cell(bullet.pos.x), cell(bullet.pos.y), bullet.glyph(), color);
        }
        for bullet in &world.boss_bullets {
            let color = if bullet.has_ricocheted() {
                C_RICOCHET
            } else {
                C_BOSS_BULLET
            };
            canvas.put(cell(bullet.pos.x), cell(bullet.pos.y), '●', color);
        }
        for drone in &world.drones {
            canvas.put(cell(drone.pos.x), cell(drone.pos.y), Drone::GLYPH, C_DRONE);
        }

        if !world.game_over.is_some_and(|r| r.destroys_ship()) {
            let blink = world.ship_flash_timer > 0 && flashes && world.frame_count % 4 < 2;
            if !blink {
                draw_player(canvas, &world.player, flashes);
            }
        }

        for explosion in &world.explosions {
            let color = if explosion.big {
                C_EXPLOSION_BIG
            } else {
                C_EXPLOSION_SMALL
            };
            let (x, y) = (cell(explosion.pos.x), cell(explosion.pos.y));
            canvas.put(x, y, explosion.glyph, color);
        }
        for debris in &world.debris {
            canvas.put(cell(debris.pos.x), cell(debris.pos.y), debris.glyph, C_DEBRIS);
        }

        draw_hud(canvas, world, self.high_score);
        draw_ticker(canvas, world);

        if world.abort_prompt.is_some() {
            screens::draw_abort_dialog(canvas);
        } else if world.size_locked {
            draw_overlay(
                canvas,
                &[
                    "TERMINAL TOO SMALL",
                    &format!("Resize to at least {}x{}", world.width, world.height),
                ],
            );
        } else if world.paused {
            draw_overlay(canvas, &["PAUSED", "Press P to resume"]);
        }
    }

    /// Draw the round and push changed cells to the terminal
    pub fn draw<W: Write>(&mut self, out: &mut W, world: &World) -> std::io::Result<()> {
        self.compose(world);
        self.present(out)
    }

    /// Flush the composed canvas
    pub fn present<W: Write>(&mut self, out: &mut W) -> std::io::Result<()> {
        self.canvas.flush_to(out, self.previous.as_ref())?;
        self.previous = Some(self.canvas.clone());
        Ok(())
    }
}

/// Continuous coordinate to a terminal cell
fn cell(v: f32) -> i32 {
    v.round() as i32
}

fn enemy_color(kind: EnemyKind) -> Color {
    match kind {
        EnemyKind::Normal => Color::Red,
        EnemyKind::Fast => Color::Yellow,
        EnemyKind::Tank => Color::DarkMagenta,
        EnemyKind::ZigZag => Color::Green,
    }
}

fn powerup_color(kind: PowerUpKind) -> Color {
    match kind {
        PowerUpKind::RapidFire => Color::Yellow,
        PowerUpKind::Shield => Color::Cyan,
        PowerUpKind::Health => Color::Red,
        PowerUpKind::SpreadShot => Color::Blue,
        PowerUpKind::EnergyBeam => Color::Magenta,
        PowerUpKind::Nuke => Color::White,
        PowerUpKind::Drone => Color::Green,
    }
}

fn draw_stars(canvas: &mut Canvas, world: &World) {
    for star in &world.stars {
        let (glyph, color) = STAR_GLYPHS[(star.layer.saturating_sub(1) as usize).min(2)];
        canvas.put(cell(star.pos.x), cell(star.pos.y), glyph, color);
    }
}

fn draw_border(canvas: &mut Canvas, world: &World, flashes: bool) {
    let color = if world.nuke_effect_timer > 0 && flashes && world.nuke_effect_timer % 2 == 0 {
        Color::White
    } else {
        C_BORDER
    };
    let bottom = world.height as i32 - 1;
    for x in 0..world.width as i32 {
        canvas.put(x, 1, '─', color);
        canvas.put(x, bottom, '─', color);
    }
}

/// Dotted column just past the furthest the ship can fly
fn draw_limit_markers(canvas: &mut Canvas, world: &World) {
    let x = cell(world.right_limit());
    for y in (2..world.height as i32 - 1).step_by(2) {
        canvas.put(x, y, '┊', C_LIMIT);
    }
}

/// The visible sliver of the cargo ship's hull on the left edge
fn draw_hull(canvas: &mut Canvas, world: &World, flashes: bool) {
    let color = if world.wall_flash_timer > 0 && flashes {
        C_FLASH
    } else {
        C_HULL
    };
    let edge = cell(world.genesis_right_edge());
    let shift = cell(world.genesis_wobble.y);
    for y in 2..world.height as i32 - 1 {
        for x in 0..edge {
            let glyph = if (y + shift) % 3 == 0 { '▓' } else { '█' };
            canvas.put(x, y, glyph, color);
        }
    }
}

fn draw_player(canvas: &mut Canvas, player: &Player, flashes: bool) {
    let sprite = if player.shield {
        &Player::SPRITE_SHIELDED
    } else {
        &Player::SPRITE
    };
    let color = if player.flash_timer > 0 && flashes {
        C_FLASH
    } else if player.shield {
        C_SHIELD
    } else {
        C_PLAYER
    };
    let (x, y) = (cell(player.pos.x), cell(player.pos.y));
    canvas.sprite(x, y, sprite, color);
    if player.spark_timer > 0 {
        canvas.put(x + PLAYER_WIDTH as i32, y + 1, player.spark_glyph, C_SPARK);
    }
}

fn draw_boss(canvas: &mut Canvas, boss: &Boss, flashes: bool) {
    let color = if boss.flash_timer > 0 && flashes {
        Color::White
    } else {
        C_BOSS
    };
    // Anchor is the sprite's middle cell
    let (x, y) = (cell(boss.pos.x) - 1, cell(boss.pos.y) - 1);
    canvas.sprite(x, y, &Boss::SPRITE, color);
    canvas.text(x - 4, y - 1, &health_bar(boss.health_fraction(), HEALTH_BAR_WIDTH), C_HEALTH);
}

/// `[█████░░░░░]` style bar
pub fn health_bar(fraction: f32, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f32).ceil() as usize).min(width);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(width - filled))
}

fn weapon_label(player: &Player) -> String {
    match player.weapon {
        WeaponKind::EnergyBeam => {
            let state = match player.beam.phase() {
                BeamPhase::Idle => "",
                BeamPhase::Charging => " CHARGING",
                BeamPhase::FullPower => " FULL",
                BeamPhase::Flickering => " UNSTABLE",
                BeamPhase::Overheated => " OVERHEAT",
            };
            format!("{}{}", player.weapon.label(), state)
        }
        weapon => weapon.label().to_string(),
    }
}

fn seconds(frames: u32) -> u32 {
    frames.div_ceil(SIM_HZ)
}

fn draw_hud(canvas: &mut Canvas, world: &World, high_score: u32) {
    let player = &world.player;
    let hearts: String = "♥".repeat(player.health.max(0) as usize);
    let mut x = 1;
    canvas.text(x, 0, "HP ", C_HUD_DIM);
    x += 3;
    canvas.text(x, 0, &hearts, C_HEALTH);
    x += hearts.chars().count() as i32 + 2;

    let score = format!("SCORE {:06}", player.score);
    canvas.text(x, 0, &score, C_HUD);
    x += score.len() as i32 + 2;
    let hi = format!("HI {:06}", high_score.max(player.score));
    canvas.text(x, 0, &hi, C_HUD_DIM);
    x += hi.len() as i32 + 2;

    let weapon = weapon_label(player);
    canvas.text(x, 0, &weapon, Color::Cyan);
    x += weapon.len() as i32 + 2;

    if player.rapid_fire {
        let label = format!("RAPID {}s", seconds(player.rapid_fire_timer));
        canvas.text(x, 0, &label, Color::Yellow);
        x += label.len() as i32 + 2;
    }
    if player.shield {
        let label = format!("SHIELD {}s", seconds(player.shield_timer));
        canvas.text(x, 0, &label, C_SHIELD);
        x += label.len() as i32 + 2;
    }
    if !world.drones.is_empty() {
        canvas.text(x, 0, &format!("DRONES {}", world.drones.len()), C_DRONE);
    }

    if let Some(boss) = &world.boss {
        let label = format!("BOSS MK{}", boss.generation);
        canvas.text(world.width as i32 - label.len() as i32 - 1, 0, &label, C_BOSS);
    }
}

/// Visible slice of a message scrolling right to left through `width` cells
pub fn ticker_window(text: &str, offset: u32, width: usize) -> String {
    let padded: Vec<char> = " "
        .repeat(width)
        .chars()
        .chain(text.chars())
        .chain(" ".repeat(width).chars())
        .collect();
    let span = padded.len() - width;
    let start = offset as usize % span.max(1);
    padded[start..start + width].iter().collect()
}

fn draw_ticker(canvas: &mut Canvas, world: &World) {
    let notification = &world.notification;
    if !notification.is_active() {
        return;
    }
    let width = (world.width as usize).saturating_sub(4);
    let window = ticker_window(&notification.text, notification.scroll_offset, width);
    canvas.text(2, world.height as i32 - 1, &window, C_TICKER);
}

fn draw_overlay(canvas: &mut Canvas, lines: &[&str]) {
    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 4;
    let top = canvas.height() as i32 / 2 - lines.len() as i32 / 2 - 1;
    let blank = " ".repeat(width);
    for i in 0..lines.len() as i32 + 2 {
        canvas.centered(top + i, &blank, C_OVERLAY);
    }
    for (i, line) in lines.iter().enumerate() {
        canvas.centered(top + 1 + i as i32, line, C_OVERLAY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{BossBullet, Enemy};
    use glam::Vec2;

    fn renderer_for(world: &World) -> TerminalRenderer {
        TerminalRenderer::new(world.width, world.height, &Settings::default())
    }

    fn screen(renderer: &TerminalRenderer) -> String {
        (0..renderer.canvas().height())
            .map(|y| renderer.canvas().row_string(y))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_health_bar() {
        assert_eq!(health_bar(1.0, 4), "[████]");
        assert_eq!(health_bar(0.0, 4), "[░░░░]");
        assert_eq!(health_bar(0.3, 4), "[██░░]");
    }

    #[test]
    fn test_ticker_scrolls_in_from_the_right() {
        assert_eq!(ticker_window("HI", 0, 4), "    ");
        assert_eq!(ticker_window("HI", 1, 4), "   H");
        assert_eq!(ticker_window("HI", 2, 4), "  HI");
        assert_eq!(ticker_window("HI", 4, 4), "HI  ");
        // Wraps around
        assert_eq!(ticker_window("HI", 6, 4), "    ");
        assert_eq!(ticker_window("HI", 7, 4), "   H");
    }

    #[test]
    fn test_hud_and_entities_drawn() {
        let mut world = World::new(80, 24, 3);
        world.ship_flash_timer = 0;
        world.player.score = 120;
        world.enemies.push(Enemy::new(EnemyKind::Fast, Vec2::new(60.0, 10.0)));
        world.boss_bullets.push(BossBullet::new(Vec2::new(50.0, 5.0)));

        let mut renderer = renderer_for(&world);
        renderer.set_high_score(500);
        renderer.compose(&world);
        let text = screen(&renderer);

        assert!(renderer.canvas().row_string(0).contains("SCORE 000120"));
        assert!(renderer.canvas().row_string(0).contains("HI 000500"));
        assert!(renderer.canvas().row_string(10).contains("══►"));
        assert_eq!(renderer.canvas().get(50, 5).map(|c| c.ch), Some('●'));
        assert!(text.contains("╱█►"));
    }

    #[test]
    fn test_entities_off_screen_are_clipped() {
        let mut world = World::new(80, 24, 3);
        world.enemies.push(Enemy::new(EnemyKind::Tank, Vec2::new(79.0, 23.0)));
        world.boss_bullets.push(BossBullet::new(Vec2::new(-5.0, 300.0)));
        let mut renderer = renderer_for(&world);
        renderer.compose(&world);
        assert_eq!(renderer.canvas().get(79, 23).map(|c| c.ch), Some('╔'));
    }

    #[test]
    fn test_pause_and_resize_overlays() {
        let mut world = World::new(80, 24, 3);
        world.paused = true;
        let mut renderer = renderer_for(&world);
        renderer.compose(&world);
        assert!(screen(&renderer).contains("PAUSED"));

        world.size_locked = true;
        renderer.resize(70, 20);
        renderer.compose(&world);
        let text = screen(&renderer);
        assert!(text.contains("TERMINAL TOO SMALL"));
        assert!(text.contains("80x24"));
        assert!(!text.contains("PAUSED"));
    }

    #[test]
    fn test_reduced_motion_suppresses_flash() {
        let mut world = World::new(80, 24, 3);
        world.ship_flash_timer = 0;
        world.player.flash_timer = 5;
        let (x, y) = (cell(world.player.pos.x), cell(world.player.pos.y));

        let mut renderer = renderer_for(&world);
        renderer.compose(&world);
        assert_eq!(renderer.canvas().get(x, y).map(|c| c.fg), Some(C_FLASH));

        let calm = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        let mut renderer = TerminalRenderer::new(80, 24, &calm);
        renderer.compose(&world);
        assert_eq!(renderer.canvas().get(x, y).map(|c| c.fg), Some(C_PLAYER));
    }
}
