//! desk-runner: headless driver for the CS performance desk.
//!
//! Usage:
//!   desk-runner --db desk.db
//!   desk-runner --db desk.db --config desk.json --ipc-mode

use anyhow::{Context, Result};
use csdesk_core::{
    command::DeskCommand,
    config::DeskConfig,
    engine::DeskEngine,
    report::dashboard_summary,
    store::{KeyValuePort, SqlitePort},
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Apply { command: DeskCommand },
    Profile { staff_id: String },
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = arg_value(&args, "--db").unwrap_or(":memory:");
    let config_path = arg_value(&args, "--config");

    let config = match config_path {
        Some(path) => DeskConfig::load(path)?,
        None => DeskConfig::builtin(),
    };

    if !ipc_mode {
        println!("CS Desk - desk-runner");
        println!("  db:      {db}");
        println!("  config:  {}", config_path.unwrap_or("(built-in)"));
        println!("  started: {}", chrono::Local::now().format("%Y-%m-%d %H:%M"));
        println!();
    }

    let port = if db == ":memory:" {
        SqlitePort::in_memory()?
    } else {
        SqlitePort::open(db).with_context(|| format!("opening {db}"))?
    };
    port.migrate()?;
    let port: Box<dyn KeyValuePort> = Box::new(port);

    let mut engine = DeskEngine::open(config, port);
    log::info!("desk opened: {} staff, {} evaluations", engine.config().roster.len(), engine.store().evaluations().len());

    if ipc_mode {
        run_ipc_loop(&mut engine)?;
    } else {
        print!("{}", dashboard_summary(&engine.snapshot()));
    }

    Ok(())
}

fn run_ipc_loop(engine: &mut DeskEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                write_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => {
                writeln!(stdout, "{}", serde_json::to_string(&engine.snapshot())?)?;
            }
            IpcCommand::Apply { command } => match engine.apply(command) {
                Ok(outcome) => writeln!(stdout, "{}", serde_json::to_string(&outcome)?)?,
                Err(e) => write_error(&mut stdout, &e.to_string())?,
            },
            IpcCommand::Profile { staff_id } => match engine.staff_profile(&staff_id) {
                Ok(profile) => writeln!(stdout, "{}", serde_json::to_string(&profile)?)?,
                Err(e) => write_error(&mut stdout, &e.to_string())?,
            },
        }
        stdout.flush()?;
    }
    Ok(())
}

fn write_error(stdout: &mut io::Stdout, message: &str) -> Result<()> {
    let err_json = serde_json::json!({ "error": message });
    writeln!(stdout, "{err_json}")?;
    stdout.flush()?;
    Ok(())
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}
