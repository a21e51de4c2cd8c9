//! Entry point for the **hyprcycle** daemon.
//!
//! Spawns all configured [`CommandSource`](hyprcycle::traits::CommandSource)s
//! on background threads and processes incoming commands one at a time on
//! the main thread, which is the only owner of the cycle memory.

use hyprcycle::command::Command;
use hyprcycle::config::Config;
use hyprcycle::engine::CycleEngine;
use hyprcycle::hyprland::wm::HyprlandWm;
use hyprcycle::ipc::listener::{default_socket_path, UnixSocketListener};
use hyprcycle::traits::{CommandSource, WindowManager};
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::sync::mpsc;

/// Resolve the config directory (`$XDG_CONFIG_HOME/hyprcycle`).
fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("hyprcycle")
}

/// Try to load the config from `$XDG_CONFIG_HOME/hyprcycle/config.json`,
/// falling back to compiled-in defaults.
fn load_config() -> Config {
    let path = config_dir().join("config.json");
    match Config::load(&path) {
        Ok(cfg) => {
            info!(
                "loaded config from {} ({} bindings)",
                path.display(),
                cfg.bindings.len()
            );
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

fn main() {
    env_logger::init();

    let config = load_config();
    for (name, err) in config.validate() {
        warn!("binding {:?} will fail: {}", name, err);
    }

    let socket = config.socket_path.clone().unwrap_or_else(default_socket_path);

    let mut engine = CycleEngine::new(HyprlandWm::new());
    engine.set_bindings(config.bindings);

    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
    spawn_command_sources(cmd_tx, socket);

    run_event_loop(engine, cmd_rx);
}

//  Event loop

fn run_event_loop<W: WindowManager>(mut engine: CycleEngine<W>, cmd_rx: mpsc::Receiver<Command>) {
    info!("hyprcycle running");
    for cmd in cmd_rx {
        match engine.handle(cmd) {
            Ok(Some(placement)) => info!("placed window at {:?}", placement),
            Ok(None) => {}
            Err(e) => error!("command error: {}", e),
        }
        debug!("{} window(s) mid-cycle", engine.memory().len());
    }
    info!("all command sources closed, exiting");
}

//  Helpers

fn spawn_command_sources(tx: mpsc::Sender<Command>, socket: PathBuf) {
    std::thread::spawn(move || {
        let mut source = UnixSocketListener::new(&socket);
        if let Err(e) = source.run(tx) {
            error!("socket listener error: {}", e);
        }
    });
}
