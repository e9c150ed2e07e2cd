mod audit;
mod backup;
mod calc;
mod config;
mod db;
mod gate;
mod ipc;
mod model;
mod store;
mod views;

use log::{debug, info, warn};
use std::io::{self, BufRead, Write};

fn main() {
    // stdout carries the protocol, so logs go to stderr.
    env_logger::builder()
        .target(env_logger::Target::Stderr)
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
    info!("tutordeskd {} ready", env!("CARGO_PKG_VERSION"));

    let mut state = ipc::AppState::default();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                warn!("unparseable request line: {}", e);
                let _ = writeln!(stdout, "{}", ipc::unparseable(e.to_string()));
                let _ = stdout.flush();
                continue;
            }
        };

        debug!("request {} {}", req.id, req.method);
        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
    info!("stdin closed, shutting down");
}
