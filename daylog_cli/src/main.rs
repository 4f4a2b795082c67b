use clap::{Parser, Subcommand};
use daylog_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "daylog")]
#[command(about = "Browse and write day-file logs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding the log directory (default: config, then current directory)
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List day logs
    List {
        /// Subdirectory of the log directory to list
        #[arg(long, default_value = "", value_parser = |s: &str| Ok::<PathBuf, std::convert::Infallible>(PathBuf::from(s)))]
        subdir: PathBuf,
    },

    /// Print a day log (default: today's)
    Show {
        name: Option<String>,
    },

    /// Print the path of today's log file
    Today,

    /// Append one record to today's log
    Write {
        /// Severity (notset, debug, info, warn, warning, error, critical, fatal)
        #[arg(long, default_value = "info")]
        level: Level,

        /// Append a stack block to the record
        #[arg(long)]
        stack: bool,

        message: String,
    },
}

fn main() -> Result<()> {
    daylog_core::diagnostics::init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(base_dir) = cli.base_dir {
        config.logging.base_dir = Some(base_dir);
    }

    match cli.command {
        Commands::List { subdir } => cmd_list(&config, subdir),
        Commands::Show { name } => cmd_show(&config, name),
        Commands::Today => cmd_today(&config),
        Commands::Write {
            level,
            stack,
            message,
        } => cmd_write(&config, level, stack, &message),
    }
}

fn cmd_list(config: &Config, subdir: PathBuf) -> Result<()> {
    let dir = config.logging.log_dir()?;
    let mut names = dir.list(&subdir)?;
    names.sort();

    if names.is_empty() {
        tracing::info!("No log files in {:?}", dir.path().join(&subdir));
    }
    for name in names {
        println!("{}", name);
    }
    Ok(())
}

fn cmd_show(config: &Config, name: Option<String>) -> Result<()> {
    let dir = config.logging.log_dir()?;
    let name = name.unwrap_or_else(today_file_name);
    let contents = dir.read(&name)?;
    print!("{}", contents);
    Ok(())
}

fn cmd_today(config: &Config) -> Result<()> {
    let dir = config.logging.log_dir()?;
    println!("{}", dir.today_path().display());
    Ok(())
}

fn cmd_write(config: &Config, level: Level, stack: bool, message: &str) -> Result<()> {
    let logger = Logger::from_config(config)?;
    if level < logger.threshold() {
        tracing::warn!(
            "{} is below the configured level {}; nothing written",
            level,
            logger.threshold()
        );
    }
    if stack {
        logger.logf_stack(level, "%s", &[&message])
    } else {
        logger.logf(level, "%s", &[&message])
    }
}
