//! Keyboard listener thread
//!
//! A background thread blocks on crossterm events. Held movement/fire keys are
//! published as last-seen timestamps in relaxed atomics; discrete presses are
//! forwarded over an mpsc channel. The simulation thread never blocks on it.
//!
//! Terminals with keyboard enhancement report `Release`, so keys are dropped
//! exactly. Classic terminals only send repeated `Press` events, so a key
//! counts as held while it was seen within [`HOLD_WINDOW_MS`].

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::sim::{HeldKeys, KeyPress};

/// Four frames at 30 Hz; OS key repeat refreshes faster than this
pub const HOLD_WINDOW_MS: u64 = 133;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Keys sampled level-triggered by the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeldKey {
    Up,
    Down,
    Left,
    Right,
    Fire,
}

impl HeldKey {
    pub fn from_code(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::Up => Some(Self::Up),
            KeyCode::Down => Some(Self::Down),
            KeyCode::Left => Some(Self::Left),
            KeyCode::Right => Some(Self::Right),
            KeyCode::Char(' ') => Some(Self::Fire),
            _ => None,
        }
    }
}

/// Held-key state shared between the listener and the simulation
///
/// Each slot holds `1 + ms since epoch` of the last press or repeat, 0 when
/// released.
#[derive(Debug)]
pub struct KeyState {
    slots: [AtomicU64; 5],
    enhanced: AtomicBool,
    epoch: Instant,
}

impl KeyState {
    pub fn new(enhanced: bool) -> Self {
        Self {
            slots: Default::default(),
            enhanced: AtomicBool::new(enhanced),
            epoch: Instant::now(),
        }
    }

    fn slot(&self, key: HeldKey) -> &AtomicU64 {
        &self.slots[key as usize]
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    pub fn is_enhanced(&self) -> bool {
        self.enhanced.load(Ordering::Relaxed)
    }

    pub fn record_at(&self, key: HeldKey, now_ms: u64) {
        self.slot(key).store(now_ms + 1, Ordering::Relaxed);
    }

    pub fn release(&self, key: HeldKey) {
        self.slot(key).store(0, Ordering::Relaxed);
    }

    /// Forget everything, e.g. after a modal screen
    pub fn clear(&self) {
        for slot in &self.slots {
            slot.store(0, Ordering::Relaxed);
        }
    }

    pub fn held_at(&self, now_ms: u64) -> HeldKeys {
        let enhanced = self.is_enhanced();
        let is_held = |key: HeldKey| {
            let stamp = self.slot(key).load(Ordering::Relaxed);
            stamp != 0 && (enhanced || (now_ms + 1).saturating_sub(stamp) <= HOLD_WINDOW_MS)
        };
        HeldKeys {
            up: is_held(HeldKey::Up),
            down: is_held(HeldKey::Down),
            left: is_held(HeldKey::Left),
            right: is_held(HeldKey::Right),
            fire: is_held(HeldKey::Fire),
        }
    }

    /// Snapshot of held keys right now
    pub fn held(&self) -> HeldKeys {
        self.held_at(self.now_ms())
    }

    /// Apply one key event; returns the discrete press to forward, if any
    pub fn apply(&self, key: &KeyEvent) -> Option<KeyPress> {
        let held = HeldKey::from_code(key.code);
        match key.kind {
            KeyEventKind::Press => {
                if let Some(held) = held {
                    self.record_at(held, self.now_ms());
                }
                Some(translate(key.code, key.modifiers))
            }
            KeyEventKind::Repeat => {
                if let Some(held) = held {
                    self.record_at(held, self.now_ms());
                }
                None
            }
            KeyEventKind::Release => {
                if let Some(held) = held {
                    self.release(held);
                }
                None
            }
        }
    }
}

/// Map a pressed key to what the sampler and menus care about
pub fn translate(code: KeyCode, modifiers: KeyModifiers) -> KeyPress {
    match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => KeyPress::Escape,
        KeyCode::Char(c) => KeyPress::Char(c),
        KeyCode::Esc => KeyPress::Escape,
        KeyCode::Enter => KeyPress::Enter,
        KeyCode::Backspace => KeyPress::Backspace,
        KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right => KeyPress::Arrow,
        _ => KeyPress::Other,
    }
}

/// Handle to the running listener thread
pub struct InputListener {
    keys: Arc<KeyState>,
    presses: Receiver<KeyPress>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl InputListener {
    /// Start reading terminal events on a background thread
    pub fn spawn(enhanced: bool) -> Self {
        let keys = Arc::new(KeyState::new(enhanced));
        let running = Arc::new(AtomicBool::new(true));
        let (tx, presses) = mpsc::channel();

        let thread_keys = Arc::clone(&keys);
        let thread_running = Arc::clone(&running);
        let handle = thread::spawn(move || listen(&thread_keys, &thread_running, &tx));
        log::info!("Input listener started (keyboard enhancement: {})", enhanced);

        Self {
            keys,
            presses,
            running,
            handle: Some(handle),
        }
    }

    pub fn held(&self) -> HeldKeys {
        self.keys.held()
    }

    /// All presses since the last drain, oldest first
    pub fn drain(&self) -> Vec<KeyPress> {
        self.presses.try_iter().collect()
    }

    /// Drop queued presses and held state before a new screen
    pub fn reset(&self) {
        self.drain();
        self.keys.clear();
    }
}

impl Drop for InputListener {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn listen(keys: &KeyState, running: &AtomicBool, tx: &Sender<KeyPress>) {
    while running.load(Ordering::Relaxed) {
        // Poll with a timeout so shutdown is noticed without a keypress
        match event::poll(POLL_INTERVAL) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => {
                log::warn!("Input poll failed: {}", e);
                break;
            }
        }
        match event::read() {
            Ok(Event::Key(key)) => {
                if let Some(press) = keys.apply(&key) {
                    if tx.send(press).is_err() {
                        break;
                    }
                }
            }
            Ok(_) => {}
            Err(e) => {
                log::warn!("Input read failed: {}", e);
                break;
            }
        }
    }
    log::debug!("Input listener stopped");
}
