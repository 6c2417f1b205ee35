//! Full-screen text pages between rounds

use std::io::Write;

use crossterm::style::Color;

use super::canvas::Canvas;
use super::terminal::TerminalRenderer;
use crate::highscores::{HighScores, MAX_INITIALS};
use crate::sim::RoundSummary;

const C_TITLE: Color = Color::Yellow;
const C_TEXT: Color = Color::White;
const C_DIM: Color = Color::DarkGrey;
const C_GOOD: Color = Color::Green;
const C_BAD: Color = Color::Red;

const BANNER: [&str; 5] = [
    "█▀▄ ▄▀▄    █▀▄ ▄▀▄ ▄▀▄ █▄ ▄█ █",
    "█▀▄ █▀█ ▀▀ █▀▄ █▀█ █▀█ █ ▀ █ ▀",
    "▀▀  ▀ ▀    ▀▀  ▀ ▀ ▀ ▀ ▀   ▀ ▀",
    "",
    "Defend the GENESIS cargo ship",
];

const CONTROLS: [&str; 5] = [
    "ARROWS  move        SPACE  fire",
    "1 2 3   weapons     P      pause",
    "ESC     abort mission",
    "",
    "Keep the enemy off the GENESIS hull on the left.",
];

const ABORT_TITLE: &str = "ABORT MISSION?";
const ABORT_MESSAGE: &str = "Are you sure you want to quit?";
const ABORT_OPTIONS: &str = "[Y] Yes    [N] No";

/// Yes/No box drawn over the frozen round while an abort is pending
pub(super) fn draw_abort_dialog(canvas: &mut Canvas) {
    let inner = ABORT_MESSAGE.chars().count().max(20) + 2;
    let edge = "═".repeat(inner);
    let blank = " ".repeat(inner);
    let top = canvas.height() as i32 / 2 - 3;

    canvas.centered(top, &format!("╔{}╗", edge), C_TEXT);
    for row in 1..5 {
        canvas.centered(top + row, &format!("║{}║", blank), C_TEXT);
    }
    canvas.centered(top + 5, &format!("╚{}╝", edge), C_TEXT);
    canvas.centered(top + 1, ABORT_TITLE, C_BAD);
    canvas.centered(top + 2, ABORT_MESSAGE, C_TEXT);
    canvas.centered(top + 4, ABORT_OPTIONS, C_TITLE);
}

/// Rows of a leaderboard, or a placeholder when empty
pub fn score_rows(scores: &HighScores, highlight: Option<usize>) -> Vec<(String, bool)> {
    if scores.is_empty() {
        return vec![("No high scores yet".to_string(), false)];
    }
    scores
        .entries
        .iter()
        .enumerate()
        .map(|(i, e)| (format!("{}. {:<3}  {:>7}", i + 1, e.initials, e.score), highlight == Some(i)))
        .collect()
}

fn draw_scores(canvas: &mut Canvas, top: i32, title: &str, scores: &HighScores, highlight: Option<usize>) {
    canvas.centered(top, title, C_TITLE);
    for (i, (row, marked)) in score_rows(scores, highlight).iter().enumerate() {
        let color = if *marked { C_GOOD } else { C_TEXT };
        canvas.centered(top + 2 + i as i32, row, color);
    }
}

impl TerminalRenderer {
    /// Title page with controls and this screen size's leaderboard
    pub fn draw_title<W: Write>(
        &mut self,
        out: &mut W,
        scores: &HighScores,
        dimension_key: &str,
    ) -> std::io::Result<()> {
        let canvas = self.canvas_mut();
        canvas.clear();
        let mut y = 2;
        for line in BANNER {
            canvas.centered(y, line, C_TITLE);
            y += 1;
        }
        y += 1;
        for line in CONTROLS {
            canvas.centered(y, line, C_DIM);
            y += 1;
        }
        y += 1;
        draw_scores(canvas, y, &format!("HIGH SCORES ({})", dimension_key), scores, None);

        let bottom = canvas.height() as i32 - 2;
        canvas.centered(bottom, "Press ENTER to launch, ESC to quit", C_TEXT);
        self.present(out)
    }

    /// Round results, achievements and the leaderboard
    pub fn draw_game_over<W: Write>(
        &mut self,
        out: &mut W,
        summary: &RoundSummary,
        scores: &HighScores,
        new_rank: Option<usize>,
    ) -> std::io::Result<()> {
        let canvas = self.canvas_mut();
        canvas.clear();
        let mut y = 2;
        canvas.centered(y, "GAME OVER", C_BAD);
        y += 1;
        canvas.centered(y, summary.reason.headline(), C_TEXT);
        y += 2;

        let stats = [
            format!("SCORE           {:>7}", summary.score),
            format!("ENEMIES KILLED  {:>7}", summary.enemies_killed),
            format!("BOSSES DEFEATED {:>7}", summary.bosses_defeated),
            format!("ACCURACY        {:>6.1}%", summary.accuracy * 100.0),
        ];
        for line in &stats {
            canvas.centered(y, line, C_TEXT);
            y += 1;
        }
        y += 1;

        if !summary.achievements.is_empty() {
            canvas.centered(y, "ACHIEVEMENTS", C_TITLE);
            y += 1;
            for achievement in &summary.achievements {
                let line = format!("{} - {}", achievement.title(), achievement.description());
                canvas.centered(y, &line, C_GOOD);
                y += 1;
            }
            y += 1;
        }

        draw_scores(canvas, y, "HIGH SCORES", scores, new_rank);

        let bottom = canvas.height() as i32 - 2;
        canvas.centered(bottom, "Press ENTER to play again, ESC to quit", C_TEXT);
        self.present(out)
    }

    /// Initials entry after a qualifying score
    pub fn draw_initials_prompt<W: Write>(
        &mut self,
        out: &mut W,
        score: u32,
        initials: &str,
    ) -> std::io::Result<()> {
        let canvas = self.canvas_mut();
        canvas.clear();
        let mid = canvas.height() as i32 / 2;
        canvas.centered(mid - 3, "NEW HIGH SCORE!", C_TITLE);
        canvas.centered(mid - 1, &format!("{}", score), C_TEXT);

        let slots: String = initials
            .chars()
            .chain(std::iter::repeat('_'))
            .take(MAX_INITIALS)
            .flat_map(|c| [c, ' '])
            .collect();
        canvas.centered(mid + 1, slots.trim_end(), C_GOOD);
        canvas.centered(mid + 3, "Type up to 3 letters, ENTER to finish early", C_DIM);
        self.present(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Settings;
    use crate::sim::{Achievement, GameOverReason};

    fn screen(renderer: &TerminalRenderer) -> String {
        (0..renderer.canvas().height())
            .map(|y| renderer.canvas().row_string(y))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_score_rows() {
        assert_eq!(score_rows(&HighScores::new(), None).len(), 1);

        let mut scores = HighScores::new();
        scores.add_score(900, "abc");
        scores.add_score(100, "z");
        let rows = score_rows(&scores, Some(1));
        assert_eq!(rows[0], ("1. ABC      900".to_string(), false));
        assert_eq!(rows[1], ("2. Z        100".to_string(), true));
    }

    #[test]
    fn test_game_over_lists_achievements() {
        let mut renderer = TerminalRenderer::new(80, 24, &Settings::default());
        let summary = RoundSummary {
            reason: GameOverReason::CargoCaptured,
            score: 4200,
            enemies_killed: 77,
            bosses_defeated: 2,
            accuracy: 0.25,
            achievements: vec![Achievement::SharpShooter],
        };
        let mut out = Vec::new();
        renderer
            .draw_game_over(&mut out, &summary, &HighScores::new(), None)
            .expect("draw");
        let text = screen(&renderer);
        assert!(text.contains("THE GENESIS CARGO WAS CAPTURED"));
        assert!(text.contains("25.0%"));
        assert!(text.contains("SHARPSHOOTER"));
        assert!(text.contains("No high scores yet"));
    }

    #[test]
    fn test_abort_dialog_replaces_pause_notice() {
        let mut world = crate::sim::World::new(80, 24, 3);
        world.paused = true;
        world.abort_prompt = Some(crate::sim::AbortPrompt { was_paused: false });
        let mut renderer = TerminalRenderer::new(80, 24, &Settings::default());
        renderer.compose(&world);
        let text = screen(&renderer);
        assert!(text.contains("ABORT MISSION?"));
        assert!(text.contains("[Y] Yes    [N] No"));
        assert!(!text.contains("PAUSED"));
    }

    #[test]
    fn test_initials_prompt_slots() {
        let mut renderer = TerminalRenderer::new(80, 24, &Settings::default());
        let mut out = Vec::new();
        renderer.draw_initials_prompt(&mut out, 1500, "AB").expect("draw");
        assert!(screen(&renderer).contains("A B _"));
    }
}
