use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;

use hourglass_console::{
    load_or_default, logging, Endpoints, FirmwareFile, HttpTransport, Session, TerminalPresenter,
};

#[derive(Parser)]
#[command(name = "hourglass-console")]
#[command(about = "Hourglass clock status and OTA update tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Device address or URL (default: http://192.168.4.1/)
    #[arg(short, long, global = true)]
    device: Option<String>,

    /// JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Show battery voltages, charger state and firmware version
    Status,
    /// Upload a firmware image
    Update {
        /// Firmware image (.bin)
        firmware: PathBuf,
    },
    /// Reboot the device
    Restart,
    /// Show credits
    Credits,
    /// Write the effective configuration to a file
    SaveConfig {
        path: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{} {:#}", "❌".red(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    let mut config = load_or_default(cli.config.as_deref())?;
    if let Some(device) = cli.device {
        config.device_url = device;
    }

    let command = cli.command.unwrap_or(Commands::Status);
    if let Commands::SaveConfig { path } = &command {
        config.save(path)?;
        return Ok(true);
    }

    let transport = HttpTransport::new(&config)?;
    println!("{} Hourglass console", "🚀".blue());
    println!("{}Device: {}", "   ".dimmed(), transport.base_url());

    let mut session = Session::new(transport, TerminalPresenter::new(), Endpoints::from(&config));

    match command {
        Commands::Status => {
            // An unreachable device still renders, as "Unknown"
            session.ready();
            Ok(true)
        }
        Commands::Update { firmware } => {
            // Battery gating depends on this fetch having completed
            session.ready();
            session.open_update();

            let selected = match FirmwareFile::open(&firmware) {
                Ok(file) => {
                    println!(
                        "{}Firmware: {} bytes ({:.2} MB)",
                        "   ".dimmed(),
                        file.size(),
                        file.size() as f64 / 1024.0 / 1024.0
                    );
                    Some(file)
                }
                Err(e) => {
                    eprintln!("{} Firmware not found: {} ({})", "❌".red(), firmware.display(), e);
                    None
                }
            };
            session.select_file(selected);

            let outcome = session.start_update();
            if outcome.is_success() {
                println!("\n{} OTA update completed successfully!", "✨".green());
            }
            Ok(outcome.is_success())
        }
        Commands::Restart => match session.restart_device() {
            Ok(()) => {
                println!("{} Restart requested. Device will reboot.", "✅".green());
                Ok(true)
            }
            Err(e) => {
                eprintln!("{} Restart failed: {}", "❌".red(), e);
                Ok(false)
            }
        },
        Commands::Credits => {
            session.show_credits();
            Ok(true)
        }
        Commands::SaveConfig { .. } => Ok(true),
    }
}
