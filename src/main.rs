//! Photo Organiser - camera card import tool
//!
//! Mounts a camera card, sorts its photos into per-day directories,
//! syncs them to a remote host and optionally clears the card.

use anyhow::Result;
use clap::CommandFactory;
use photo_organiser::{Cli, Commands, Config, RunReport, pipeline};
use std::path::Path;
use tracing::{Level, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// CLI Output Module
mod cli_output {
    //! Colored summary output for the terminal

    use crossterm::{
        queue,
        style::{Color, Print, PrintStyledContent, Stylize},
    };
    use photo_organiser::{FileResult, FileStatus};
    use std::io::{Write, stdout};
    use std::path::Path;

    pub struct CliTheme;

    impl CliTheme {
        pub const SUCCESS: Color = Color::Green;
        pub const WARNING: Color = Color::Yellow;
        pub const ERROR: Color = Color::Red;
        pub const HINT: Color = Color::DarkGrey;
        pub const ACCENT: Color = Color::Cyan;
    }

    const KEY_WIDTH: usize = 28;

    pub fn print_separator() {
        println!("{}", "─".repeat(60));
    }

    pub fn print_warning(msg: &str) {
        let mut out = stdout();
        let _ = queue!(
            out,
            PrintStyledContent("⚠ ".with(CliTheme::WARNING).bold()),
            Print(msg),
            Print("\n")
        );
        let _ = out.flush();
    }

    /// Print an aligned `key  value` row
    pub fn print_stat(key: &str, value: impl ToString, color: Color) {
        let mut out = stdout();
        let _ = queue!(
            out,
            PrintStyledContent(format!("  {key:<KEY_WIDTH$}").with(CliTheme::HINT)),
            PrintStyledContent(value.to_string().with(color).bold()),
            Print("\n")
        );
        let _ = out.flush();
    }

    fn relative(path: &Path, root: &Path) -> String {
        path.strip_prefix(root).unwrap_or(path).display().to_string()
    }

    /// Icon, colour, source and detail text for one file line
    pub fn file_line(result: &FileResult, root: &Path) -> (&'static str, Color, String, String) {
        let (icon, color, detail) = match result.status {
            FileStatus::Moved => ("✓", CliTheme::SUCCESS, None),
            FileStatus::DryRun => ("~", CliTheme::ACCENT, None),
            FileStatus::Skipped(ref reason) => ("⊘", CliTheme::WARNING, Some(reason.to_string())),
        };
        let detail = detail.unwrap_or_else(|| {
            result
                .destination
                .as_deref()
                .map(|d| format!("→ {}", relative(d, root)))
                .unwrap_or_default()
        });
        (icon, color, relative(&result.source, root), detail)
    }

    /// Print one file line with paths shown relative to the source root
    pub fn print_file(result: &FileResult, root: &Path) {
        let (icon, color, source, detail) = file_line(result, root);
        let mut out = stdout();
        let _ = queue!(
            out,
            Print("  "),
            PrintStyledContent(icon.with(color).bold()),
            Print(format!(" {source} ")),
            PrintStyledContent(detail.with(CliTheme::HINT)),
            Print("\n")
        );
        let _ = out.flush();
    }
}

fn main() {
    let cli = Cli::parse_args();

    let command = match cli.command {
        Some(Commands::Version) => {
            println!("photo-organiser version {}", env!("CARGO_PKG_VERSION"));
            return;
        }
        Some(command) => command,
        None => {
            let _ = Cli::command().print_help();
            return;
        }
    };

    let _guard = match setup_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&cli, command) {
        error!(error = %format!("{:#}", e), "Run failed");
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli, command: Commands) -> Result<()> {
    let Some(vendor) = command.vendor() else {
        return Ok(());
    };

    info!(version = env!("CARGO_PKG_VERSION"), "Photo Organiser starting");

    let config = load_config(cli)?;
    if config.verbose {
        info!(?config, "Configuration loaded");
    }

    let report = pipeline::run(vendor, &config)?;
    print_summary(&report, &config);
    Ok(())
}

/// Load configuration from file or CLI arguments
fn load_config(cli: &Cli) -> Result<Config> {
    let config = if let Some(ref config_path) = cli.config {
        info!(config_file = %config_path.display(), "Loading configuration from file");
        let file_config = Config::load_from_file(config_path)?;
        cli.merge_with_config(file_config)
    } else {
        cli.to_config()
    };
    Ok(config)
}

/// Setup logging: stderr, plus an optional log file
fn setup_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let (file_layer, guard) = match cli.log_file.as_deref() {
        Some(log_path) => {
            let (writer, guard) = tracing_appender::non_blocking(open_log_file(log_path)?);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);

    if cli.json_log {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(guard)
}

fn open_log_file(log_path: &Path) -> Result<std::fs::File> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;
    Ok(file)
}

fn print_summary(report: &RunReport, config: &Config) {
    use cli_output::*;

    let stats = &report.organise.stats;

    print_separator();
    print_stat("Camera", report.vendor.name(), CliTheme::ACCENT);
    print_stat("Source", report.source_dir.display(), CliTheme::ACCENT);
    if config.dry_run {
        print_stat("Would move", stats.would_move, CliTheme::SUCCESS);
    } else {
        print_stat("Moved", stats.moved, CliTheme::SUCCESS);
    }
    print_stat("Skipped", stats.skipped, CliTheme::WARNING);
    print_stat("Empty folders removed", stats.dirs_removed, CliTheme::SUCCESS);
    if stats.dirs_failed > 0 {
        print_stat("Folder removal failures", stats.dirs_failed, CliTheme::ERROR);
    }
    if let Some(ref cleanup) = report.cleanup {
        print_stat(
            "Source directories cleaned",
            cleanup.removed.len(),
            CliTheme::SUCCESS,
        );
    }

    if config.verbose {
        print_separator();
        for result in &report.organise.files {
            print_file(result, &report.source_dir);
        }
    }

    if config.dry_run {
        print_separator();
        print_warning("Dry run: no files were moved, transferred or deleted");
    }
    print_separator();
}
