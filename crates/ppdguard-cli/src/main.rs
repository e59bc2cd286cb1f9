mod collection;
mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::{EXIT_FAILURE, EXIT_RESOURCE_ERROR};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "ppdguard",
    version,
    about = "Extract Foomatic directive values from PPDs and build a SHA-256 allow-list"
)]
struct Cli {
    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract directive values from PPDs into a value corpus file
    /// (append mode: existing corpus entries are kept).
    Scan {
        /// Single PPD file to read.
        #[arg(long, conflicts_with = "ppd_paths")]
        ppd: Option<PathBuf>,
        /// Comma-separated directories to search recursively for PPDs.
        #[arg(long)]
        ppd_paths: Option<String>,
        /// Value corpus file to create or extend.
        output: PathBuf,
    },
    /// Hash a value corpus and write the digests not already trusted.
    Hash {
        /// Value corpus file, output of `scan`.
        input: PathBuf,
        /// Output hash file.
        output: PathBuf,
        /// Trusted hash directory (repeatable; replaces the defaults).
        #[arg(long = "hash-dir")]
        hash_dirs: Vec<PathBuf>,
    },
    /// Scan PPDs and write net-new hashes in one step.
    Generate {
        /// Single PPD file to read.
        #[arg(long, conflicts_with = "ppd_paths")]
        ppd: Option<PathBuf>,
        /// Comma-separated directories to search recursively for PPDs.
        #[arg(long)]
        ppd_paths: Option<String>,
        /// Output hash file.
        output: PathBuf,
        /// Also persist the raw extracted values to this corpus file.
        #[arg(long)]
        values: Option<PathBuf>,
        /// Trusted hash directory (repeatable; replaces the defaults).
        #[arg(long = "hash-dir")]
        hash_dirs: Vec<PathBuf>,
    },
    /// Report which of a PPD's directive values are already trusted.
    /// Exits non-zero when untrusted values are found.
    Check {
        /// Single PPD file to read.
        #[arg(long, conflicts_with = "ppd_paths")]
        ppd: Option<PathBuf>,
        /// Comma-separated directories to search recursively for PPDs.
        #[arg(long)]
        ppd_paths: Option<String>,
        /// Trusted hash directory (repeatable; replaces the defaults).
        #[arg(long = "hash-dir")]
        hash_dirs: Vec<PathBuf>,
    },
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
    /// Generate man pages in the specified directory.
    ManPages {
        /// Output directory for man pages.
        #[arg(default_value = "man")]
        dir: PathBuf,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("PPDGUARD_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let json_output = cli.json;

    let result = match cli.command {
        Commands::Scan {
            ppd,
            ppd_paths,
            output,
        } => commands::scan::run(ppd.as_deref(), ppd_paths.as_deref(), &output, json_output),
        Commands::Hash {
            input,
            output,
            hash_dirs,
        } => commands::hash::run(&input, &output, &hash_dirs, json_output),
        Commands::Generate {
            ppd,
            ppd_paths,
            output,
            values,
            hash_dirs,
        } => commands::generate::run(
            ppd.as_deref(),
            ppd_paths.as_deref(),
            &output,
            values.as_deref(),
            &hash_dirs,
            json_output,
        ),
        Commands::Check {
            ppd,
            ppd_paths,
            hash_dirs,
        } => commands::check::run(ppd.as_deref(), ppd_paths.as_deref(), &hash_dirs, json_output),
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
        Commands::ManPages { dir } => commands::man_pages::run::<Cli>(&dir),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            let code = if msg.starts_with("store I/O error")
                || msg.starts_with("failed to read PPD stream")
                || msg.starts_with("failed to replace output file")
                || msg.starts_with("cannot open")
            {
                EXIT_RESOURCE_ERROR
            } else {
                EXIT_FAILURE
            };
            ExitCode::from(code)
        }
    }
}
