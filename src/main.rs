//! BA-BAAM! entry point
//!
//! Sets up logging and the terminal, then cycles title -> round -> game over.

use std::fs::File;
use std::io::{BufWriter, Stdout, stdout};
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use babaam::audio::{AudioManager, SilentBank, SoundEffect};
use babaam::dimension_key;
use babaam::highscores::{HighScores, InitialsEntry};
use babaam::persistence::{JsonScoreFile, ScoreStore};
use babaam::platform::terminal::{self, SizeWatch, TerminalGuard, check_min_size};
use babaam::platform::{FramePacer, InputListener};
use babaam::renderer::TerminalRenderer;
use babaam::sim::{InputSampler, KeyPress, RoundSummary, World, evaluate, tick};
use babaam::sim::{advance_destruction, begin_ship_destruction};
use babaam::{Result, Settings};

const LOG_FILE: &str = "babaam.log";
/// Frames the finished initials stay on screen
const INITIALS_HOLD_FRAMES: u32 = 24;

fn main() -> ExitCode {
    init_logging();
    log::info!("BA-BAAM! starting...");

    match run() {
        Ok(()) => {
            log::info!("Bye");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// The screen belongs to the game, so logs go to a file in the temp dir
fn init_logging() {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    let path = std::env::temp_dir().join(LOG_FILE);
    match File::create(&path) {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(_) => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    builder.init();
}

fn run() -> Result<()> {
    let settings = Settings::load();

    let (width, height) = terminal::size()?;
    check_min_size(width, height)?;
    log::info!("Terminal {}x{}", width, height);

    let guard = TerminalGuard::enter(BufWriter::new(stdout()))?;
    let input = InputListener::spawn(guard.keyboard_enhanced());
    let mut session = Session::new(settings, width, height, input, guard);
    session.run()
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// What a menu screen is waiting for
enum MenuChoice {
    Continue,
    Quit,
}

struct Session {
    // Listener drops (and joins) before the terminal is restored
    input: InputListener,
    guard: TerminalGuard<BufWriter<Stdout>>,
    renderer: TerminalRenderer,
    audio: AudioManager<SilentBank>,
    pacer: FramePacer,
    size_watch: SizeWatch,
    width: u16,
    height: u16,
    dimension_key: String,
    store: JsonScoreFile,
    scores: HighScores,
}

impl Session {
    fn new(
        settings: Settings,
        width: u16,
        height: u16,
        input: InputListener,
        guard: TerminalGuard<BufWriter<Stdout>>,
    ) -> Self {
        let key = dimension_key(width, height);
        let store = JsonScoreFile::new(&settings.high_score_path);
        let scores = store.load_high_scores(&key);
        Self {
            input,
            guard,
            renderer: TerminalRenderer::new(width, height, &settings),
            audio: AudioManager::with_settings(SilentBank::new(), &settings),
            pacer: FramePacer::new(settings.frame_rate),
            size_watch: SizeWatch::new(width, height),
            width,
            height,
            dimension_key: key,
            store,
            scores,
        }
    }

    fn run(&mut self) -> Result<()> {
        if let MenuChoice::Quit = self.title()? {
            return Ok(());
        }
        loop {
            let world = self.play_round()?;
            let summary = evaluate(&world);
            let rank = self.record_score(summary.score)?;
            if let MenuChoice::Quit = self.game_over(&summary, rank)? {
                return Ok(());
            }
        }
    }

    /// Keep the canvas matched to the live terminal size
    fn sync_size(&mut self) -> (u16, u16) {
        let size = terminal::size().unwrap_or((self.width, self.height));
        self.renderer.resize(size.0, size.1);
        size
    }

    /// Run a menu screen at frame rate until ENTER or ESC
    fn menu<F>(&mut self, mut draw: F) -> Result<MenuChoice>
    where
        F: FnMut(&mut TerminalRenderer, &mut BufWriter<Stdout>) -> std::io::Result<()>,
    {
        self.input.reset();
        self.renderer.invalidate();
        loop {
            self.pacer.begin();
            self.sync_size();
            for press in self.input.drain() {
                match press {
                    KeyPress::Enter | KeyPress::Char(' ') => return Ok(MenuChoice::Continue),
                    KeyPress::Escape => return Ok(MenuChoice::Quit),
                    _ => {}
                }
            }
            draw(&mut self.renderer, self.guard.out())?;
            self.pacer.finish();
        }
    }

    fn title(&mut self) -> Result<MenuChoice> {
        let scores = self.scores.clone();
        let key = self.dimension_key.clone();
        self.audio.start_menu_music();
        let choice = self.menu(|renderer, out| renderer.draw_title(out, &scores, &key));
        self.audio.stop_music();
        choice
    }

    fn game_over(&mut self, summary: &RoundSummary, rank: Option<usize>) -> Result<MenuChoice> {
        let scores = self.scores.clone();
        self.menu(|renderer, out| renderer.draw_game_over(out, summary, &scores, rank))
    }

    fn play_round(&mut self) -> Result<World> {
        let seed = clock_seed();
        log::info!("Starting round with seed: {}", seed);
        let mut world = World::new(self.width, self.height, seed);
        let mut sampler = InputSampler::new();

        self.input.reset();
        self.renderer.invalidate();
        self.renderer.set_high_score(self.scores.top_score().unwrap_or(0));
        self.audio.play(SoundEffect::GameStart);

        while !world.is_over() {
            self.pacer.begin();
            let (w, h) = self.sync_size();
            self.size_watch.apply(&mut world, &mut self.audio, w, h);

            let presses = self.input.drain();
            let intent = sampler.sample(self.input.held(), &presses);
            tick(&mut world, &intent, &mut self.audio);

            self.draw(&world);
            self.pacer.finish();
        }
        self.audio.stop_loops();

        if world.game_over.is_some_and(|r| r.destroys_ship()) {
            begin_ship_destruction(&mut world, &mut self.audio);
            while advance_destruction(&mut world) {
                self.pacer.begin();
                self.sync_size();
                self.draw(&world);
                self.pacer.finish();
            }
        }
        log::info!("Overruns so far: {}", self.pacer.overruns());
        Ok(world)
    }

    fn draw(&mut self, world: &World) {
        if let Err(e) = self.renderer.draw(self.guard.out(), world) {
            log::debug!("Frame dropped: {}", e);
        }
    }

    /// Ask for initials when the score makes the table; returns its rank
    fn record_score(&mut self, score: u32) -> Result<Option<usize>> {
        if !self.scores.qualifies(score) {
            return Ok(None);
        }

        self.input.reset();
        self.renderer.invalidate();
        self.audio.start_hero_music();
        let mut entry = InitialsEntry::new();
        while !entry.is_done() {
            self.pacer.begin();
            self.sync_size();
            for press in self.input.drain() {
                if entry.feed(press) {
                    break;
                }
            }
            self.renderer
                .draw_initials_prompt(self.guard.out(), score, entry.as_str())?;
            self.pacer.finish();
        }
        for _ in 0..INITIALS_HOLD_FRAMES {
            self.pacer.begin();
            self.pacer.finish();
        }
        self.audio.stop_music();

        let rank = self.scores.add_score(score, entry.as_str());
        self.store
            .save_high_scores(&self.dimension_key, &self.scores.entries);
        Ok(rank)
    }
}
