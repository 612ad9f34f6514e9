//! Operator console on stdin.
//!
//! A helper thread reads lines and forwards them over a channel; the run loop
//! drains the channel between ticks, so the simulation is only ever touched
//! from its own thread.

use crate::error::{CliError, CliResult};
use rx_controls::PidGains;
use rx_sim::{ControlMode, ParameterUpdate};
use std::io::BufRead;
use std::sync::mpsc::{Receiver, TryRecvError, channel};
use std::thread::{self, JoinHandle};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Update(ParameterUpdate),
    Quit,
}

pub const HELP: &str =
    "commands: sp <C> | kp <v> | ki <v> | kd <v> | gains <kp> <ki> <kd> | av <v> | mode open|closed | quit";

fn number(word: Option<&str>, what: &str) -> CliResult<f64> {
    let word = word.ok_or_else(|| CliError::InvalidInput(format!("{what} needs a value")))?;
    word.parse::<f64>()
        .map_err(|_| CliError::InvalidInput(format!("{what}: '{word}' is not a number")))
}

/// Parse one console line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> CliResult<Option<Command>> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };

    let command = match head.to_ascii_lowercase().as_str() {
        "sp" | "setpoint" => Command::Update(ParameterUpdate::Setpoint(number(words.next(), "sp")?)),
        "kp" => Command::Update(ParameterUpdate::Kp(number(words.next(), "kp")?)),
        "ki" => Command::Update(ParameterUpdate::Ki(number(words.next(), "ki")?)),
        "kd" => Command::Update(ParameterUpdate::Kd(number(words.next(), "kd")?)),
        "gains" => Command::Update(ParameterUpdate::Gains(PidGains {
            kp: number(words.next(), "gains kp")?,
            ki: number(words.next(), "gains ki")?,
            kd: number(words.next(), "gains kd")?,
        })),
        "av" | "valve" => Command::Update(ParameterUpdate::Valve(number(words.next(), "av")?)),
        "mode" => {
            let mode = match words.next() {
                Some("open") => ControlMode::OpenLoop,
                Some("closed") => ControlMode::ClosedLoop,
                _ => {
                    return Err(CliError::InvalidInput(
                        "mode takes 'open' or 'closed'".to_string(),
                    ));
                }
            };
            Command::Update(ParameterUpdate::Mode(mode))
        }
        "quit" | "q" | "exit" => Command::Quit,
        other => {
            return Err(CliError::InvalidInput(format!(
                "unknown command '{other}' ({HELP})"
            )));
        }
    };

    if let Some(extra) = words.next() {
        return Err(CliError::InvalidInput(format!(
            "unexpected argument '{extra}'"
        )));
    }
    Ok(Some(command))
}

pub struct Console {
    lines: Receiver<String>,
    _handle: JoinHandle<()>,
}

impl Console {
    /// Start reading stdin on a helper thread.
    pub fn spawn() -> Self {
        let (tx, rx) = channel();
        let handle = thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "console input closed");
                        break;
                    }
                }
            }
        });
        Self {
            lines: rx,
            _handle: handle,
        }
    }

    /// Parse every line received since the last call. Bad lines are logged
    /// and dropped.
    pub fn drain(&self) -> Vec<Command> {
        let mut commands = Vec::new();
        loop {
            match self.lines.try_recv() {
                Ok(line) => match parse_command(&line) {
                    Ok(Some(command)) => commands.push(command),
                    Ok(None) => {}
                    Err(e) => tracing::warn!(line = %line, error = %e, "ignored console command"),
                },
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        commands
    }
}
