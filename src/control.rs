//! Remote control via Unix socket
//!
//! Accepts commands over a Unix socket, one per line, and turns them into
//! driver [`Command`]s. Lines are either plain text (`pause`, `3`,
//! `color synthwave`, `light 0.5 -0.2`, ...) or a JSON command object.

use crate::config::ColorMode;
use crate::driver::Command;
use std::io::{BufRead, BufReader};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub const DEFAULT_SOCKET_PATH: &str = "/tmp/mobius.sock";

/// Parse one plain-text command line
pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim().to_lowercase();
    let mut words = line.split_whitespace();
    let head = words.next()?;
    let args: Vec<&str> = words.collect();

    let numbers = |args: &[&str]| -> Option<(f64, f64)> {
        match args {
            [a, b] => Some((a.parse().ok()?, b.parse().ok()?)),
            _ => None,
        }
    };

    match (head, args.as_slice()) {
        ("pause" | "space" | "p", []) => Some(Command::TogglePause),
        ("+" | "=" | "faster", []) => Some(Command::Faster),
        ("-" | "slower", []) => Some(Command::Slower),
        ("grab", []) | ("drag", ["start"]) => Some(Command::DragStart),
        ("release" | "drop", []) | ("drag", ["end"]) => Some(Command::DragEnd),
        ("drag", rest) => numbers(rest).map(|(dx, dy)| Command::DragMove { dx, dy }),
        ("light", rest) => numbers(rest).map(|(x, y)| Command::PointLight { x, y }),
        ("q" | "quit" | "exit", []) => Some(Command::Quit),
        ("color" | "mode", [name]) => name
            .parse::<ColorMode>()
            .ok()
            .map(|mode| Command::SelectColor { mode }),
        (key, []) => {
            // 1-5 pick a color mode, as do bare mode names
            let mode = match key.parse::<usize>() {
                Ok(n) if n >= 1 => ColorMode::from_index(n - 1),
                Ok(_) => None,
                Err(_) => key.parse::<ColorMode>().ok(),
            };
            mode.map(|mode| Command::SelectColor { mode })
        },
        _ => None,
    }
}

/// Parse a message that is either a JSON command or a text command line
pub fn parse_message(text: &str) -> Option<Command> {
    let text = text.trim();
    if text.starts_with('{') {
        match serde_json::from_str::<Command>(text) {
            Ok(command) => return Some(command),
            Err(e) => log::debug!("Not a JSON command ({}), trying text", e),
        }
    }
    parse_command(text)
}

/// Controller that listens for commands on a Unix socket
pub struct Controller {
    receiver: Receiver<Command>,
    path: PathBuf,
    shutdown: Arc<AtomicBool>,
    listener_thread: Option<thread::JoinHandle<()>>,
}

impl Controller {
    /// Create a new controller listening on the Unix socket at `path`
    pub fn new(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref().to_path_buf();

        // Remove existing socket if present
        let _ = std::fs::remove_file(&path);

        let listener = UnixListener::bind(&path)
            .map_err(|e| format!("Failed to bind socket {}: {}", path.display(), e))?;

        // Set non-blocking so we can check for new connections
        listener
            .set_nonblocking(true)
            .map_err(|e| format!("Failed to set non-blocking: {}", e))?;

        let (sender, receiver) = mpsc::channel();
        let shutdown = Arc::new(AtomicBool::new(false));
        let listener_shutdown = Arc::clone(&shutdown);

        let handle = thread::spawn(move || {
            Self::listener_loop(listener, sender, &listener_shutdown);
        });

        log::info!("Control socket listening on {}", path.display());

        Ok(Self {
            receiver,
            path,
            shutdown,
            listener_thread: Some(handle),
        })
    }

    fn listener_loop(listener: UnixListener, sender: Sender<Command>, shutdown: &AtomicBool) {
        while !shutdown.load(Ordering::Relaxed) {
            match listener.accept() {
                Ok((stream, _)) => {
                    let sender = sender.clone();
                    thread::spawn(move || {
                        Self::handle_client(stream, sender);
                    });
                },
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    // No connection ready, sleep briefly
                    thread::sleep(Duration::from_millis(50));
                },
                Err(e) => {
                    log::error!("Control socket closed: {}", e);
                    break;
                },
            }
        }
    }

    fn handle_client(stream: UnixStream, sender: Sender<Command>) {
        // Accepted sockets inherit non-blocking mode on some platforms
        if let Err(e) = stream.set_nonblocking(false) {
            log::warn!("Control client dropped: {}", e);
            return;
        }
        let reader = BufReader::new(stream);
        for line in reader.lines().map_while(Result::ok) {
            if line.trim().is_empty() {
                continue;
            }
            match parse_message(&line) {
                Some(command) => {
                    log::info!("Control command: {:?}", command);
                    if sender.send(command).is_err() {
                        break;
                    }
                },
                None => log::warn!("Unknown control command: {:?}", line),
            }
        }
    }

    /// Get any pending commands (non-blocking)
    pub fn poll(&self) -> Vec<Command> {
        self.receiver.try_iter().collect()
    }

    /// Get the socket path
    pub fn socket_path(&self) -> &Path {
        &self.path
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.listener_thread.take() {
            if handle.join().is_err() {
                log::error!("Control socket listener panicked");
            }
        }
        // Clean up the socket file
        let _ = std::fs::remove_file(&self.path);
    }
}
