//! [`WindowManager`] implementation backed by Hyprland IPC.
//!
//! Communicates directly with Hyprland through its Unix socket at
//! `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket.sock`,
//! avoiding any shell command invocation or third-party crate for socket
//! discovery.
//!
//! # Target identifiers
//!
//! | Target            | Window                                         |
//! |-------------------|------------------------------------------------|
//! | `active` or empty | the focused window                             |
//! | `address:0x…`     | the window with that address                   |
//! | `class:<name>`    | most recently focused window of that class     |
//! | `title:<text>`    | most recently focused window whose title contains `<text>` |
//! | `<name>`          | same as `class:<name>`                         |

use crate::geometry::{ChromeOffset, Placement, Rectangle, WorkArea};
use crate::traits::{WindowGeometry, WindowHandle, WindowManager};
use log::debug;
use serde::Deserialize;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;

/// Hyprland-backed window manager.
///
/// All communication happens over Hyprland's IPC socket
/// (`$XDG_RUNTIME_DIR/hypr/<instance>/.socket.sock`).  No child processes
/// are spawned.
pub struct HyprlandWm;

/// Errors that can occur when talking to Hyprland.
#[derive(Debug, thiserror::Error)]
#[error("hyprland IPC error: {0}")]
pub struct HyprlandWmError(String);

impl Default for HyprlandWm {
    fn default() -> Self {
        Self
    }
}

impl HyprlandWm {
    /// Create a new handle.
    ///
    /// No connection is opened eagerly; each method call opens a short-lived
    /// IPC request.
    pub fn new() -> Self {
        Self
    }
}

//  Direct Hyprland IPC helpers

/// Resolve the Hyprland command socket path.
///
/// Hyprland ≥ 0.40 stores its sockets at
/// `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket.sock`.
fn socket_path() -> Result<PathBuf, HyprlandWmError> {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR")
        .map_err(|_| HyprlandWmError("XDG_RUNTIME_DIR not set".into()))?;
    let his = std::env::var("HYPRLAND_INSTANCE_SIGNATURE")
        .map_err(|_| HyprlandWmError("HYPRLAND_INSTANCE_SIGNATURE not set".into()))?;
    Ok(PathBuf::from(format!(
        "{}/hypr/{}/.socket.sock",
        runtime_dir, his
    )))
}

/// Send a raw command to the Hyprland command socket and return the
/// response as a string.
fn ipc_request(command: &str) -> Result<String, HyprlandWmError> {
    let path = socket_path()?;
    let mut stream = UnixStream::connect(&path)
        .map_err(|e| HyprlandWmError(format!("connect to {}: {}", path.display(), e)))?;

    stream
        .write_all(command.as_bytes())
        .map_err(|e| HyprlandWmError(format!("write: {}", e)))?;

    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .map_err(|e| HyprlandWmError(format!("read: {}", e)))?;

    String::from_utf8(response).map_err(|e| HyprlandWmError(format!("utf-8: {}", e)))
}

/// Send a JSON data query (`j/<command>`) and deserialize the answer.
fn ipc_json<T: serde::de::DeserializeOwned>(data_command: &str) -> Result<T, HyprlandWmError> {
    let json = ipc_request(&format!("j/{}", data_command))?;
    serde_json::from_str(&json)
        .map_err(|e| HyprlandWmError(format!("parse {}: {}", data_command, e)))
}

/// Send several dispatches in one `[[BATCH]]` request.
///
/// Hyprland runs the whole batch within one request, so the window cannot
/// be observed between the steps.  Every reply must be `"ok"`.
fn ipc_dispatch_batch(dispatches: &[String]) -> Result<(), HyprlandWmError> {
    let request = batch_request(dispatches);
    debug!("dispatch {}", request);
    check_batch_response(&ipc_request(&request)?, dispatches.len())
}

fn batch_request(dispatches: &[String]) -> String {
    let body: Vec<String> = dispatches.iter().map(|d| format!("dispatch {}", d)).collect();
    format!("[[BATCH]]{}", body.join(";"))
}

fn check_batch_response(response: &str, expected: usize) -> Result<(), HyprlandWmError> {
    let replies: Vec<&str> = response
        .split("\n\n")
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .collect();
    if replies.len() == expected && replies.iter().all(|r| *r == "ok") {
        Ok(())
    } else {
        Err(HyprlandWmError(format!("batch dispatch error: {}", response.trim())))
    }
}

//  Minimal serde structs for the JSON we care about

/// Subset of the JSON object returned by `j/monitors`.
#[derive(Debug, Clone, Deserialize)]
struct MonitorJson {
    id: i64,
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    #[serde(default = "unit_scale")]
    scale: f64,
    /// Space reserved by bars and panels: left, top, right, bottom.
    #[serde(default)]
    reserved: [i32; 4],
}

fn unit_scale() -> f64 {
    1.0
}

/// Subset of a client object returned by `j/clients` and `j/activewindow`.
#[derive(Debug, Clone, Deserialize)]
struct ClientJson {
    address: String,
    at: [i32; 2],
    size: [i32; 2],
    monitor: i64,
    #[serde(default)]
    class: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    floating: bool,
    /// 0 for the focused window, growing with time since last focus.
    #[serde(rename = "focusHistoryID", default)]
    focus_history_id: i64,
}

/// Subset of the JSON object returned by `j/getoption`.
#[derive(Debug, Deserialize)]
struct OptionJson {
    #[serde(default)]
    int: i64,
}

//  Target selection

/// A parsed target identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Selector<'a> {
    Active,
    Address(&'a str),
    Class(&'a str),
    Title(&'a str),
}

fn parse_selector(target: &str) -> Selector<'_> {
    let target = target.trim();
    if target.is_empty() || target == "active" {
        Selector::Active
    } else if let Some(a) = target.strip_prefix("address:") {
        Selector::Address(a)
    } else if let Some(c) = target.strip_prefix("class:") {
        Selector::Class(c)
    } else if let Some(t) = target.strip_prefix("title:") {
        Selector::Title(t)
    } else {
        Selector::Class(target)
    }
}

/// Pick the client matching a non-[`Active`](Selector::Active) selector.
fn select_client<'c>(clients: &'c [ClientJson], selector: &Selector<'_>) -> Option<&'c ClientJson> {
    let matches = |c: &&ClientJson| match selector {
        Selector::Active => c.focus_history_id == 0,
        Selector::Address(a) => c.address == *a,
        Selector::Class(name) => c.class.eq_ignore_ascii_case(name),
        Selector::Title(text) => c.title.contains(text),
    };
    clients
        .iter()
        .filter(matches)
        .min_by_key(|c| c.focus_history_id)
}

/// Logical work area of a monitor: its scaled size minus reserved space.
fn work_area_of(m: &MonitorJson) -> WorkArea {
    let scale = if m.scale > 0.0 { m.scale } else { 1.0 };
    let width = (m.width as f64 / scale).round() as i32;
    let height = (m.height as f64 / scale).round() as i32;
    let [left, top, right, bottom] = m.reserved;
    WorkArea {
        x: m.x + left,
        y: m.y + top,
        width: width - left - right,
        height: height - top - bottom,
    }
}

fn client_rect(c: &ClientJson) -> Rectangle {
    Rectangle::new(c.at[0], c.at[1], c.size[0], c.size[1], 0, 0)
}

fn clients() -> Result<Vec<ClientJson>, HyprlandWmError> {
    ipc_json("clients")
}

fn client(window: &WindowHandle) -> Result<ClientJson, HyprlandWmError> {
    clients()?
        .into_iter()
        .find(|c| c.address == window.as_str())
        .ok_or_else(|| HyprlandWmError(format!("window {} is gone", window)))
}

/// Hyprland draws borders outside the reported `at`/`size` box, so the
/// visible window is larger than reported by the border width on every side.
fn chrome_offset() -> Result<ChromeOffset, HyprlandWmError> {
    let option: OptionJson = ipc_json("getoption general:border_size")?;
    Ok(ChromeOffset::uniform(-(option.int as i32)))
}

//  WindowManager implementation

impl WindowManager for HyprlandWm {
    type Error = HyprlandWmError;

    fn resolve_window(&self, target: &str) -> Result<Option<WindowHandle>, Self::Error> {
        let selector = parse_selector(target);
        if selector == Selector::Active {
            let json = ipc_request("j/activewindow")?;
            // Hyprland returns an empty object `{}` when no window is focused.
            if json.trim() == "{}" {
                return Ok(None);
            }
            let w: ClientJson = serde_json::from_str(&json)
                .map_err(|e| HyprlandWmError(format!("parse activewindow: {}", e)))?;
            return Ok(Some(WindowHandle::new(w.address)));
        }
        let clients = clients()?;
        Ok(select_client(&clients, &selector).map(|c| WindowHandle::new(c.address.clone())))
    }

    fn window_geometry(&self, window: &WindowHandle) -> Result<WindowGeometry, Self::Error> {
        let c = client(window)?;
        Ok(WindowGeometry {
            rect: client_rect(&c),
            chrome: chrome_offset()?,
        })
    }

    fn work_area(&self, window: &WindowHandle) -> Result<WorkArea, Self::Error> {
        let c = client(window)?;
        let monitors: Vec<MonitorJson> = ipc_json("monitors")?;
        monitors
            .iter()
            .find(|m| m.id == c.monitor)
            .map(work_area_of)
            .ok_or_else(|| HyprlandWmError(format!("unknown monitor id: {}", c.monitor)))
    }

    fn move_resize(&self, window: &WindowHandle, placement: Placement) -> Result<(), Self::Error> {
        let c = client(window)?;
        ipc_dispatch_batch(&move_dispatches(window, placement, c.floating))
    }
}

/// Dispatches that put `window` at `placement`.
fn move_dispatches(window: &WindowHandle, placement: Placement, floating: bool) -> Vec<String> {
    let mut dispatches = Vec::with_capacity(3);
    // Tiled windows ignore pixel moves.
    if !floating {
        dispatches.push(format!("setfloating address:{}", window));
    }
    dispatches.push(format!(
        "resizewindowpixel exact {} {},address:{}",
        placement.width, placement.height, window
    ));
    dispatches.push(format!(
        "movewindowpixel exact {} {},address:{}",
        placement.x, placement.y, window
    ));
    dispatches
}

//  Tests
