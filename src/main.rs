use std::io::{BufRead, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use vimap::cli::{CliArgs, StartupConfig};
use vimap::config::EngineConfig;
use vimap::keymap::{load_default_keymap, load_keymap_file, merge_mappings, Keymap};
use vimap::session::{Input, Report, Session};

fn main() -> Result<()> {
    vimap::tracing::init();

    let startup = CliArgs::parse()
        .into_config()
        .map_err(anyhow::Error::msg)?;

    let mut config = EngineConfig::load();
    if let Some(timeout_ms) = startup.timeout_ms {
        config.timeout_ms = timeout_ms;
    }

    let mut keymap = if startup.use_defaults {
        load_default_keymap()
    } else {
        Keymap::new()
    };
    for path in &startup.keymap_files {
        let entries = load_keymap_file(path)
            .with_context(|| format!("Failed to load keymap {}", path.display()))?;
        merge_mappings(&mut keymap, entries);
    }

    let mut session = Session::new(keymap, &config, startup.mode);
    for command in &startup.commands {
        if !session.execute(command) {
            tracing::warn!("No such mapping: {}", command.lhs());
        }
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if startup.interactive {
        run_interactive(&mut session, &startup, &mut out)
    } else {
        run_bursts(&mut session, &startup, &mut out)
    }
}

/// Feed every argument as one burst, then flush whatever is still pending
fn run_bursts(session: &mut Session, startup: &StartupConfig, out: &mut impl Write) -> Result<()> {
    for burst in &startup.bursts {
        let report = session.feed(burst, Instant::now());
        print_report(out, &report, startup.json)?;
    }

    if session.mapper().is_pending() {
        let report = session.timeout();
        print_report(out, &report, startup.json)?;
    }
    Ok(())
}

/// Read lines from stdin, resolving ambiguous keys when the timer expires
fn run_interactive(
    session: &mut Session,
    startup: &StartupConfig,
    out: &mut impl Write,
) -> Result<()> {
    let (tx, rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    loop {
        let line = match session.time_until_timeout(Instant::now()) {
            Some(wait) => match rx.recv_timeout(wait) {
                Ok(line) => line,
                Err(RecvTimeoutError::Timeout) => {
                    if let Some(report) = session.tick(Instant::now()) {
                        print_report(out, &report, startup.json)?;
                    }
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            },
            None => match rx.recv() {
                Ok(line) => line,
                Err(_) => break,
            },
        };

        let input = match Input::parse(&line) {
            Ok(input) => input,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };

        if input == Input::List {
            for mapping in session.mapping_lines() {
                writeln!(out, "{}", mapping)?;
            }
            out.flush()?;
            continue;
        }

        if let Some(report) = session.apply(input, Instant::now()) {
            print_report(out, &report, startup.json)?;
        }
    }

    if session.mapper().is_pending() {
        let report = session.timeout();
        print_report(out, &report, startup.json)?;
    }
    Ok(())
}

fn print_report(out: &mut impl Write, report: &Report, json: bool) -> Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string(&report.to_json())?)?;
    } else {
        writeln!(out, "{}", report.to_line())?;
    }
    out.flush()?;
    Ok(())
}
