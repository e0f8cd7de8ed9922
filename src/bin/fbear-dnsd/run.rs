// Copyright 2022 Matthew Ingwersen.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you
// may not use this file except in compliance with the License. You may
// obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied. See the License for the specific language governing
// permissions and limitations under the License.

//! Implements the `run` command (i.e., running the server).

use std::fmt::{self, Write};
use std::process;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};
use env_logger::Env;
use log::{error, info};
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;

use fbear_dns::zone::FixedZone;

use crate::args::RunArgs;
use crate::config;
use crate::console;

/// The specific [`Server`](fbear_dns::server::Server) type we use.
pub type Server = fbear_dns::server::Server<FixedZone>;

/// Why the server is shutting down.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ShutdownReason {
    Signal(i32),
    Console,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::Signal(SIGINT) => f.write_str("Received SIGINT"),
            Self::Signal(SIGTERM) => f.write_str("Received SIGTERM"),
            Self::Signal(other) => write!(f, "Received signal {}", other),
            Self::Console => f.write_str("Console closed or quit"),
        }
    }
}

/// Runs the server.
pub fn run(args: RunArgs) {
    env_logger::init_from_env(Env::new().default_filter_or("warn"));

    if let Err(e) = try_running(args) {
        let mut message = String::from("Failed to run:");
        for (i, cause) in e.chain().enumerate() {
            write!(message, "\n[{}] {}", i + 1, cause).unwrap();
        }
        message.push_str("\nExiting with failure.");
        error!("{}", message);
        process::exit(1);
    }
    info!("Exiting with success.");
}

fn try_running(run_args: RunArgs) -> Result<()> {
    info!(
        "fbear-dnsd v{}.{}.{} starting.",
        env!("CARGO_PKG_VERSION_MAJOR"),
        env!("CARGO_PKG_VERSION_MINOR"),
        env!("CARGO_PKG_VERSION_PATCH"),
    );

    // Get the configuration, either from the file system or from the
    // command line arguments, as appropriate.
    let config = if let Some(ref config_path) = run_args.config {
        info!("Loading the configuration from {}.", config_path.display());
        config::load_from_path(config_path).context("failed to load the configuration")?
    } else {
        info!("Loading the configuration from the command line.");
        config::load_from_args(&run_args)
    };

    // Set up shutdown triggers before we start serving, so that a
    // failure here doesn't leave a running provider behind.
    let (shutdown_sender, shutdown_receiver) = mpsc::channel();
    let signals = set_up_signal_handling().context("failed to set up signal handling")?;
    spawn_signal_forwarder(signals, shutdown_sender.clone())
        .context("failed to start the signal thread")?;
    if !run_args.no_console {
        console::spawn(shutdown_sender).context("failed to start the console")?;
    }

    info!("Set-up is complete; starting the server.");
    let server = Arc::new(Server::new(config.fixed_zone()));
    let provider = config
        .io
        .start(config.bind, server)
        .context("failed to start the I/O provider")?;
    info!("Serving on {}.", config.bind);

    // If every sender is gone (no console and the signal thread died),
    // there is nothing left to wait for.
    match shutdown_receiver.recv() {
        Ok(reason) => info!("{}; shutting down.", reason),
        Err(_) => info!("No shutdown triggers remain; shutting down."),
    }
    provider.shut_down();
    Ok(())
}

fn set_up_signal_handling() -> Result<Signals> {
    let term_signals = &[SIGINT, SIGTERM];
    let already_terminating = Arc::new(AtomicBool::new(false));

    // This sets up signal handlers to exit immediately if a second
    // termination signal arrives before the process finishes shutting
    // down gracefully.
    for sig in term_signals {
        signal_hook::flag::register_conditional_shutdown(*sig, 1, already_terminating.clone())?;
        signal_hook::flag::register(*sig, already_terminating.clone())?;
    }

    Signals::new(term_signals).map_err(Into::into)
}

/// Forwards the first termination signal to the main thread.
fn spawn_signal_forwarder(mut signals: Signals, sender: Sender<ShutdownReason>) -> Result<()> {
    thread::Builder::new()
        .name("signals".to_owned())
        .spawn(move || {
            if let Some(signal) = signals.forever().next() {
                let _ = sender.send(ShutdownReason::Signal(signal));
            }
        })?;
    Ok(())
}
