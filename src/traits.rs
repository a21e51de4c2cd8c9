//! Core traits that decouple hyprcycle from any specific window manager or
//! transport mechanism.
//!
//! Every concrete backend (Hyprland, a Unix-socket listener, a test harness,
//! …) implements one of these traits.  The [`CycleEngine`](crate::engine::CycleEngine)
//! only depends on these abstractions.

use crate::command::Command;
use crate::geometry::{ChromeOffset, Placement, Rectangle, WorkArea};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::mpsc;

/// Opaque identifier of a resolved window (on Hyprland, its address).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowHandle(String);

impl WindowHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a window is and how much decoration surrounds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowGeometry {
    /// The rectangle as reported by the window manager, in global logical
    /// pixels.  Its viewport fields are not meaningful.
    pub rect: Rectangle,
    /// How far `rect` extends beyond the visible window on each side.
    pub chrome: ChromeOffset,
}

/// Abstraction over a window manager that can find, measure and move
/// windows.
///
/// An implementation might talk to Hyprland via IPC, or it might be an
/// in-memory stub used in tests.
pub trait WindowManager {
    /// The error type produced by this window manager.
    type Error: std::error::Error + Send + 'static;

    /// Resolve a target identifier (`"active"`, `"class:kitty"`, …) to at
    /// most one window.  `Ok(None)` means nothing matched.
    fn resolve_window(&self, target: &str) -> Result<Option<WindowHandle>, Self::Error>;

    /// Current rectangle and chrome offset of `window`.
    fn window_geometry(&self, window: &WindowHandle) -> Result<WindowGeometry, Self::Error>;

    /// Work area of the monitor currently hosting `window`.
    fn work_area(&self, window: &WindowHandle) -> Result<WorkArea, Self::Error>;

    /// Move and resize `window` so its reported rectangle becomes `placement`.
    fn move_resize(&self, window: &WindowHandle, placement: Placement) -> Result<(), Self::Error>;
}

//  Command Source

/// A source of [`Command`]s.
///
/// Implementations listen on some transport (a Unix socket, an in-memory
/// channel, …) and forward parsed commands into the provided
/// [`mpsc::Sender`].
///
/// # Contract
///
/// * [`run`](CommandSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each received command must be sent through `sink` exactly once.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait CommandSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`Command`] into `sink`.
    ///
    /// This method blocks the calling thread.  To run multiple sources
    /// concurrently, spawn each one on its own thread.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error>;
}
