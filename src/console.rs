//! Line-oriented operator console.
//!
//! Headless stand-in for the reference control panel: reads commands from
//! stdin, dispatches writes through the [`CommandGateway`], and renders
//! register snapshots on demand. Runs alongside the protocol server and the
//! simulator tasks without blocking either.

use std::sync::Arc;

use colored::Colorize;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::context::SimContext;
use crate::gateway::CommandGateway;
use crate::registers::BREAKER_COUNT;
use crate::snapshot::{BreakerSnapshot, MotorSnapshot};

/// A parsed operator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Motor {
        unit: u8,
        cmd: Option<u16>,
        sp: Option<u16>,
        hoa: Option<u16>,
    },
    Breaker {
        id: u8,
        status: u16,
    },
    ShowMotor(u8),
    ShowBreaker(u8),
    ShowAll,
    Dump,
    Help,
    Quit,
}

/// Parse one console line. `Ok(None)` means a blank line.
pub fn parse(line: &str) -> Result<Option<ConsoleCommand>, String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((&keyword, args)) = tokens.split_first() else {
        return Ok(None);
    };
    let command = match keyword {
        "motor" => parse_motor(args)?,
        "breaker" => parse_breaker(args)?,
        "show" => parse_show(args)?,
        "dump" => ConsoleCommand::Dump,
        "help" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => return Err(format!("unknown command '{other}' (try 'help')")),
    };
    Ok(Some(command))
}

fn parse_motor(args: &[&str]) -> Result<ConsoleCommand, String> {
    let Some((&id_token, fields)) = args.split_first() else {
        return Err("usage: motor <id> [cmd=N] [sp=N] [hoa=N]".to_string());
    };
    let unit = parse_num::<u8>(id_token, "motor id")?;
    let mut cmd = None;
    let mut sp = None;
    let mut hoa = None;
    for field in fields {
        let Some((key, value)) = field.split_once('=') else {
            return Err(format!("expected key=value, got '{field}'"));
        };
        let value = parse_num::<u16>(value, key)?;
        match key {
            "cmd" => cmd = Some(value),
            "sp" => sp = Some(value),
            "hoa" => hoa = Some(value),
            other => return Err(format!("unknown motor field '{other}'")),
        }
    }
    if cmd.is_none() && sp.is_none() && hoa.is_none() {
        return Err("nothing to write: give at least one of cmd=, sp=, hoa=".to_string());
    }
    Ok(ConsoleCommand::Motor { unit, cmd, sp, hoa })
}

fn parse_breaker(args: &[&str]) -> Result<ConsoleCommand, String> {
    match args {
        [id, status] => Ok(ConsoleCommand::Breaker {
            id: parse_num(id, "breaker id")?,
            status: parse_num(status, "status")?,
        }),
        _ => Err("usage: breaker <id> <0|1>".to_string()),
    }
}

fn parse_show(args: &[&str]) -> Result<ConsoleCommand, String> {
    match args {
        [] => Ok(ConsoleCommand::ShowAll),
        ["motor", id] => Ok(ConsoleCommand::ShowMotor(parse_num(id, "motor id")?)),
        ["breaker", id] => Ok(ConsoleCommand::ShowBreaker(parse_num(id, "breaker id")?)),
        _ => Err("usage: show [motor <id> | breaker <id>]".to_string()),
    }
}

fn parse_num<T: std::str::FromStr>(token: &str, what: &str) -> Result<T, String> {
    token
        .parse()
        .map_err(|_| format!("{what} must be a number, got '{token}'"))
}

#[derive(Serialize)]
struct PlantDump {
    motors: Vec<MotorSnapshot>,
    breakers: Vec<BreakerSnapshot>,
}

/// Read commands from stdin until EOF or `quit`.
pub async fn run(context: Arc<SimContext>, gateway: CommandGateway) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    print_help();
    while let Some(line) = lines.next_line().await? {
        match parse(&line) {
            Ok(None) => {}
            Ok(Some(ConsoleCommand::Quit)) => break,
            Ok(Some(command)) => execute(&context, &gateway, command),
            Err(message) => println!("{}", message.red()),
        }
    }
    Ok(())
}

fn execute(context: &SimContext, gateway: &CommandGateway, command: ConsoleCommand) {
    match command {
        ConsoleCommand::Motor { unit, cmd, sp, hoa } => {
            report(gateway.set_motor(unit, cmd, sp, hoa));
        }
        ConsoleCommand::Breaker { id, status } => {
            report(gateway.set_breaker(id, status));
        }
        ConsoleCommand::ShowMotor(unit) => match context.motor(unit) {
            Some(bank) => show(MotorSnapshot::read(unit, bank)),
            None => println!("{}", format!("no motor unit {unit}").red()),
        },
        ConsoleCommand::ShowBreaker(id) => {
            if (1..=BREAKER_COUNT as u8).contains(&id) {
                show(BreakerSnapshot::read(id, context.breaker_bank()));
            } else {
                println!("{}", format!("no breaker {id}").red());
            }
        }
        ConsoleCommand::ShowAll => {
            for (unit, bank) in context.motor_units() {
                show(MotorSnapshot::read(unit, bank));
            }
            for id in 1..=BREAKER_COUNT as u8 {
                show(BreakerSnapshot::read(id, context.breaker_bank()));
            }
        }
        ConsoleCommand::Dump => {
            let dump = PlantDump {
                motors: context
                    .motor_units()
                    .filter_map(|(unit, bank)| MotorSnapshot::read(unit, bank).ok())
                    .collect(),
                breakers: (1..=BREAKER_COUNT as u8)
                    .filter_map(|id| BreakerSnapshot::read(id, context.breaker_bank()).ok())
                    .collect(),
            };
            match serde_json::to_string_pretty(&dump) {
                Ok(json) => println!("{json}"),
                Err(e) => println!("{}", format!("dump failed: {e}").red()),
            }
        }
        ConsoleCommand::Help => print_help(),
        ConsoleCommand::Quit => {}
    }
}

fn report(result: Result<(), crate::gateway::CommandError>) {
    match result {
        Ok(()) => println!("{}", "ok".green()),
        Err(e) => println!("{}", e.to_string().red()),
    }
}

fn show<T: std::fmt::Display>(snapshot: Result<T, crate::registers::RegisterError>) {
    match snapshot {
        Ok(snap) => println!("{snap}"),
        Err(e) => println!("{}", e.to_string().red()),
    }
}

fn print_help() {
    println!("commands:");
    println!("  motor <id> [cmd=N] [sp=N] [hoa=N]   write motor control registers");
    println!("  breaker <id> <0|1>                  set breaker status");
    println!("  show [motor <id> | breaker <id>]    decoded register view");
    println!("  dump                                all units as JSON");
    println!("  quit                                stop the simulator");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_motor_fields() {
        assert_eq!(
            parse("motor 2 cmd=1 sp=50 hoa=0").unwrap(),
            Some(ConsoleCommand::Motor {
                unit: 2,
                cmd: Some(1),
                sp: Some(50),
                hoa: Some(0),
            })
        );
        assert_eq!(
            parse("motor 5 hoa=2").unwrap(),
            Some(ConsoleCommand::Motor {
                unit: 5,
                cmd: None,
                sp: None,
                hoa: Some(2),
            })
        );
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        assert!(parse("motor").is_err());
        assert!(parse("motor 1").is_err());
        assert!(parse("motor one cmd=1").is_err());
        assert!(parse("breaker 1").is_err());
        assert!(parse("breaker 1 up").is_err());
        assert!(parse("bogus").is_err());
    }

    #[test]
    fn test_parse_show_and_blank() {
        assert_eq!(parse("   ").unwrap(), None);
        assert_eq!(parse("show").unwrap(), Some(ConsoleCommand::ShowAll));
        assert_eq!(
            parse("show breaker 3").unwrap(),
            Some(ConsoleCommand::ShowBreaker(3))
        );
        assert_eq!(parse("quit").unwrap(), Some(ConsoleCommand::Quit));
    }
}
