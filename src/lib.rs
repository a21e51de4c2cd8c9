//! **hyprcycle** — cycle a window through grid positions.
//!
//! A binding names a window (`"active"`, `"class:kitty"`, …) and a grid
//! spec such as `"2x1 0:0, 1:0, 1x1 0:0"` (left half, right half, full).
//! Each time the binding fires, the window moves to the next position; after
//! the last one it goes back to where it was before the cycle started.
//!
//! # Architecture
//!
//! Per invocation, data flows through:
//!
//! 1. [`grammar`] — parse the grid spec into [`GridCell`](geometry::GridCell)s.
//! 2. [`scale`] — turn cells into pixel [`Rectangle`](geometry::Rectangle)s
//!    for the monitor's work area.
//! 3. [`pipeline`] — reorder/filter the candidates.
//! 4. [`cycle`] — pick the next rectangle and track the original.
//!
//! [`engine::CycleEngine`] drives these steps against two core traits:
//!
//! * [`traits::WindowManager`] — finds, measures and moves windows, so the
//!   engine is not coupled to any specific compositor.
//! * [`traits::CommandSource`] — delivers user intent (a Unix socket, a test
//!   harness, …), so the main loop is not coupled to any IPC mechanism.
//!
//! Concrete implementations live in [`hyprland`] (Hyprland IPC) and
//! [`ipc`] (Unix-socket command listener).

pub mod command;
pub mod config;
pub mod cycle;
pub mod engine;
pub mod geometry;
pub mod grammar;
pub mod hyprland;
pub mod ipc;
pub mod pipeline;
pub mod scale;
pub mod traits;
