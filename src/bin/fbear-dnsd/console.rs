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

//! Implements the interactive console on standard input.

use std::io::{self, BufRead};
use std::sync::mpsc::Sender;
use std::thread;

use log::warn;

use crate::run::ShutdownReason;

/// A command read from the console.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConsoleCommand {
    Quit,
    Unknown,
}

impl ConsoleCommand {
    /// Interprets one line of console input.
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "quit" => Self::Quit,
            _ => Self::Unknown,
        }
    }
}

/// Starts a thread reading commands from standard input.
///
/// `quit`, or the end of input, requests shutdown through `sender`. Any
/// other line is answered with `Unknown command`.
pub fn spawn(sender: Sender<ShutdownReason>) -> io::Result<()> {
    thread::Builder::new()
        .name("console".to_owned())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                match line.as_deref().map(ConsoleCommand::parse) {
                    Ok(ConsoleCommand::Quit) => break,
                    Ok(ConsoleCommand::Unknown) => println!("Unknown command"),
                    Err(e) => {
                        warn!("Failed to read from the console: {}", e);
                        break;
                    }
                }
            }

            // The main thread may already be shutting down.
            let _ = sender.send(ShutdownReason::Console);
        })
        .map(drop)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_recognizes_quit() {
        assert_eq!(ConsoleCommand::parse("quit"), ConsoleCommand::Quit);
        assert_eq!(ConsoleCommand::parse("quit\r"), ConsoleCommand::Quit);
        assert_eq!(ConsoleCommand::parse("exit"), ConsoleCommand::Unknown);
        assert_eq!(ConsoleCommand::parse(""), ConsoleCommand::Unknown);
    }
}
