use clap::{Parser, Subcommand};
use log::error;
use std::path::PathBuf;
use std::process::ExitCode;

use pilaroid::{frame, run_appliance, Config, Printer};

#[derive(Parser)]
#[command(name = "pilaroid", about = "Photobooth with a thermal-printer output")]
struct Cli {
    /// Path to the configuration file (defaults to ./pilaroid.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full appliance: button, display and printer (default).
    Run,
    /// Encode one image and send it to the printer, then exit.
    Print {
        /// Source photo to print.
        image: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command.unwrap_or(Command::Run) {
        Command::Run => run_appliance(config),
        Command::Print { image } => print_once(&config, &image),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_once(config: &Config, image: &PathBuf) -> Result<(), pilaroid::Error> {
    let raster = pilaroid::encode(image, config.printer.max_width, config.printer.enhance_factor)?;
    let printer = Printer::open(&config.printer_config())?;
    printer.send(&frame(&raster))?;
    printer.feed()?;
    println!("Image sent to the thermal printer successfully!");
    Ok(())
}
