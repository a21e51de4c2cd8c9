//! `hyprcycle-msg` — send a command to a running hyprcycle daemon.
//!
//! ```text
//! hyprcycle-msg <binding> [modifier...]   trigger a configured binding
//! hyprcycle-msg --reset                   forget every cycle in progress
//! hyprcycle-msg --raw '<json>'            send a raw JSON command
//! ```
//!
//! Meant to be called from Hyprland key bindings, e.g.
//! `bind = SUPER, Left, exec, hyprcycle-msg halves` and
//! `bind = SUPER SHIFT, Left, exec, hyprcycle-msg halves shift`.
//!
//! The socket path can be overridden with `HYPRCYCLE_SOCKET`.

use hyprcycle::command::{Command, TriggerRequest};
use hyprcycle::ipc::listener::{default_socket_path, send, send_raw};
use hyprcycle::pipeline::InvocationContext;
use log::error;
use std::path::PathBuf;

const USAGE: &str = "usage: hyprcycle-msg <binding> [modifier...] | --reset | --raw <json>";

fn main() {
    env_logger::init();

    let socket = std::env::var_os("HYPRCYCLE_SOCKET")
        .map(PathBuf::from)
        .unwrap_or_else(default_socket_path);
    let args: Vec<String> = std::env::args().skip(1).collect();

    let result = match args.first().map(String::as_str) {
        None | Some("-h") | Some("--help") => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
        Some("--reset") => send(&socket, &[Command::ResetCycles]),
        Some("--raw") => match args.get(1) {
            Some(json) => send_raw(&socket, json),
            None => {
                eprintln!("{}", USAGE);
                std::process::exit(2);
            }
        },
        Some(binding) => send(
            &socket,
            &[Command::Trigger(TriggerRequest {
                binding: binding.to_string(),
                context: InvocationContext::with_modifiers(&args[1..]),
            })],
        ),
    };

    if let Err(e) = result {
        error!("failed to reach {}: {}", socket.display(), e);
        std::process::exit(1);
    }
}
