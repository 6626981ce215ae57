use std::io::IsTerminal;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tokio_util::sync::CancellationToken;
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Watches the keyboard for 'q' or Ctrl-C and cancels the scan when either is
/// pressed. Raw mode stays on until the handle is dropped.
pub struct InputHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl InputHandle {
    /// Returns `None` when stdin is not a terminal or raw mode is unavailable.
    pub fn start(cancel: CancellationToken) -> Option<Self> {
        if !std::io::stdin().is_terminal() {
            return None;
        }
        if let Err(e) = enable_raw_mode() {
            debug!("raw mode unavailable, key listener disabled: {e}");
            return None;
        }

        let stop: Arc<AtomicBool> = Arc::new(AtomicBool::new(false));
        let stop_flag: Arc<AtomicBool> = Arc::clone(&stop);

        let thread: JoinHandle<()> = thread::spawn(move || {
            while !stop_flag.load(Ordering::Relaxed) && !cancel.is_cancelled() {
                match event::poll(POLL_INTERVAL) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(_) => break,
                }
                if let Ok(Event::Key(key_event)) = event::read() {
                    if is_interrupt(&key_event) {
                        cancel.cancel();
                        break;
                    }
                }
            }
        });

        Some(Self {
            stop,
            thread: Some(thread),
        })
    }
}

fn is_interrupt(key_event: &KeyEvent) -> bool {
    let is_q: bool = key_event.code == KeyCode::Char('q');
    let is_ctrl_c: bool = key_event.code == KeyCode::Char('c')
        && key_event.modifiers.contains(KeyModifiers::CONTROL);

    (is_q || is_ctrl_c) && key_event.kind == KeyEventKind::Press
}

impl Drop for InputHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
        let _ = disable_raw_mode();
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
