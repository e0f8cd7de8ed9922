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

//! Implements command-line argument parsing.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand};

/// Parses the command line arguments.
pub fn parse() -> Args {
    Args::parse()
}

/// The fbear DNS responder
#[derive(Debug, Parser)]
#[clap(author, version)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the server
    Run(RunArgs),
}

#[derive(Debug, Parser)]
#[clap(group(ArgGroup::new("ports").args(&["port", "listen_port"])))]
pub struct RunArgs {
    /// Set the configuration file to use
    #[clap(
        long,
        conflicts_with_all = &["bind", "ip", "port", "listen_port"],
        value_name = "FILE"
    )]
    pub config: Option<PathBuf>,

    /// Set the server bind IP address and port
    #[clap(long, value_name = "IP:PORT")]
    pub bind: Option<SocketAddr>,

    /// Set the server bind IP address
    #[clap(long, conflicts_with = "bind", value_name = "IP")]
    pub ip: Option<IpAddr>,

    /// Set the server port
    #[clap(long, conflicts_with = "bind", value_name = "PORT")]
    pub port: Option<u16>,

    /// Set the server port (same as --port)
    #[clap(conflicts_with = "bind", value_name = "PORT")]
    pub listen_port: Option<u16>,

    /// Do not read commands from standard input
    #[clap(long)]
    pub no_console: bool,
}

impl RunArgs {
    /// Returns the port given either with `--port` or positionally.
    pub fn port(&self) -> Option<u16> {
        self.port.or(self.listen_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(argv: &[&str]) -> RunArgs {
        let args = Args::try_parse_from(argv.iter().copied()).unwrap();
        match args.command {
            Command::Run(run_args) => run_args,
        }
    }

    #[test]
    fn port_may_be_positional() {
        let args = run_args(&["fbear-dnsd", "run", "5353"]);
        assert_eq!(args.port(), Some(5353));
        let args = run_args(&["fbear-dnsd", "run", "--port", "5354"]);
        assert_eq!(args.port(), Some(5354));
    }

    #[test]
    fn config_conflicts_with_addresses() {
        assert!(Args::try_parse_from(["fbear-dnsd", "run", "--config", "a.toml", "53"]).is_err());
        assert!(Args::try_parse_from(["fbear-dnsd", "run", "--port", "53", "54"]).is_err());
    }
}
