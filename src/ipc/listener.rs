//! Unix-socket [`CommandSource`] implementation.
//!
//! Binds a Unix stream socket and accepts one connection at a time.
//! Each line received is parsed as a JSON-encoded [`Command`].
//!
//! # Wire format
//!
//! Every message is a single line of JSON followed by `\n`:
//!
//! ```json
//! {"Trigger":"halves shift"}
//! {"Trigger":{"binding":"halves","modifiers":["shift"]}}
//! {"Cycle":{"target":"active","spec":"2x1 0:0, 1:0","stages":["Reverse"]}}
//! {"ForgetTarget":"active"}
//! "ResetCycles"
//! ```

use crate::command::Command;
use crate::traits::CommandSource;
use log::{debug, error, info, warn};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

/// Default socket path: `$XDG_RUNTIME_DIR/hyprcycle.sock`, or `/tmp` when
/// the runtime directory is unset.
pub fn default_socket_path() -> PathBuf {
    let runtime = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(runtime).join("hyprcycle.sock")
}

/// A [`CommandSource`] that listens on a Unix stream socket for
/// JSON-encoded commands.
///
/// Each accepted connection can send multiple newline-delimited JSON
/// commands.  When the connection closes, the listener waits for the
/// next one.
pub struct UnixSocketListener {
    path: PathBuf,
}

/// Errors produced by the Unix socket listener and client.
#[derive(Debug, thiserror::Error)]
pub enum UnixSocketError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl UnixSocketListener {
    /// Create a new listener bound to `path`.
    ///
    /// The socket file is created when [`run`](CommandSource::run) is called
    /// and removed once the command sink goes away.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The filesystem path of the socket.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Forward every command of one connection.  Returns `false` once the
    /// sink has been dropped.
    fn serve(&self, stream: UnixStream, sink: &mpsc::Sender<Command>) -> bool {
        for line in BufReader::new(stream).lines() {
            let text = match line {
                Ok(text) => text,
                Err(e) => {
                    error!("read error: {}", e);
                    break;
                }
            };
            if text.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Command>(&text) {
                Ok(cmd) => {
                    debug!("received {:?}", cmd);
                    if sink.send(cmd).is_err() {
                        return false;
                    }
                }
                Err(e) => error!("bad command: {}: {}", text, e),
            }
        }
        true
    }
}

impl CommandSource for UnixSocketListener {
    type Error = UnixSocketError;

    /// Bind the socket and start accepting connections.
    ///
    /// This method **blocks** until the receiving end of `sink` is dropped.
    /// Run it on a dedicated thread.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error> {
        // Remove stale socket if present.
        let _ = std::fs::remove_file(&self.path);

        let listener = UnixListener::bind(&self.path)?;
        info!("listening on {}", self.path.display());

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    debug!("client connected");
                    if !self.serve(stream, &sink) {
                        info!("sink closed, shutting down");
                        break;
                    }
                    debug!("client disconnected");
                }
                Err(e) => {
                    error!("accept error: {}", e);
                }
            }
        }

        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!("could not remove {}: {}", self.path.display(), e);
        }
        Ok(())
    }
}

/// Send `commands` to a running daemon listening on `path`.
pub fn send(path: &Path, commands: &[Command]) -> Result<(), UnixSocketError> {
    let mut stream = UnixStream::connect(path)?;
    for cmd in commands {
        let line = serde_json::to_string(cmd)?;
        writeln!(stream, "{}", line)?;
    }
    stream.flush()?;
    Ok(())
}

/// Send one pre-encoded JSON line, checking that it is a valid [`Command`]
/// first.
pub fn send_raw(path: &Path, line: &str) -> Result<(), UnixSocketError> {
    let cmd: Command = serde_json::from_str(line)?;
    send(path, &[cmd])
}

//  Tests
