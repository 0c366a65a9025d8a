use std::process::ExitCode;

use clap::Parser;

use hexlane::config;
use hexlane::model::navigation;
use hexlane::model::space::file;
use hexlane::view;

/// Bit-addressable hex viewer
#[derive(Parser, Debug)]
#[command(name = "hexlane")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File to view
    #[arg(value_name = "FILE")]
    file: std::path::PathBuf,

    /// Bytes per row
    #[arg(long)]
    cols: Option<u32>,

    /// Rows per page
    #[arg(long)]
    rows: Option<u32>,

    /// Navigation commands to apply before printing, e.g. "down lane+ select pgdn confirm"
    #[arg(short, long, default_value = "")]
    commands: String,

    /// Configuration file to use instead of $XDG_CONFIG_HOME/hexlane/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<std::path::PathBuf>,
}

fn setup_tracing(level: tracing::Level) {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .pretty()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("couldn't install log subscriber: {}", e);
    }
}

fn load_config(args: &Args) -> Result<config::Config, config::ConfigError> {
    let mut config = match &args.config {
        Some(path) => config::Config::load_from(path)?,
        None => config::Config::load()?,
    };

    if let Some(cols) = args.cols {
        config.cols = cols;
    }
    if let Some(rows) = args.rows {
        config.rows = rows;
    }

    config.validate()?;
    Ok(config)
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    setup_tracing(config.tracing_level());
    *config::set() = config;

    let commands = match navigation::command::parse_script(&args.commands) {
        Ok(commands) => commands,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let source = match file::FileSource::open(args.file.clone(), &args.file.to_string_lossy()) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Couldn't open {}: {}", args.file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let mut nav = navigation::NavigationModel::new(&config::get());

    if let Err(e) = nav.attach(source.into()) {
        eprintln!("{}", e);
    }

    for command in commands {
        if let Err(e) = nav.apply(command) {
            eprintln!("{:?}: {}", command, e);
        }
    }

    println!("{}", view::text::render(&nav));

    ExitCode::SUCCESS
}
