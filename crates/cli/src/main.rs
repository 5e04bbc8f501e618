mod config_commands;
mod generate_commands;
mod secret_commands;

use std::{path::PathBuf, process::ExitCode};

use {
    clap::{Parser, Subcommand},
    tracing::debug,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "pwvault", about = "Password generator and vault codec")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file to use instead of the discovered one.
    #[arg(long, global = true, env = "PWVAULT_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate random passwords.
    Generate(generate_commands::GenerateArgs),
    /// Score a password (reads stdin when no argument is given).
    Strength { password: Option<String> },
    /// Encrypt a secret from stdin into its storage form.
    Seal {
        #[command(flatten)]
        key: secret_commands::KeyArgs,
    },
    /// Recover a secret from its storage form on stdin.
    Open {
        #[command(flatten)]
        key: secret_commands::KeyArgs,
    },
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
}

/// Logs go to stderr so stdout carries only command output.
fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);
    debug!(version = env!("CARGO_PKG_VERSION"), "pwvault starting");

    Ok(ExitCode::from(run(cli)?))
}

/// Dispatch a parsed command line and return the process exit status.
fn run(cli: Cli) -> anyhow::Result<u8> {
    let path = cli.config.as_deref();
    match cli.command {
        // Config commands read the file themselves: `init` may target a
        // missing path and `check` reports parse errors as diagnostics.
        Commands::Config { action } => config_commands::handle_config(action, path),
        Commands::Generate(args) => {
            let config = config_commands::load_effective(path)?;
            generate_commands::handle_generate(&args, &config.generator)?;
            Ok(0)
        },
        Commands::Strength { password } => {
            generate_commands::handle_strength(password)?;
            Ok(0)
        },
        Commands::Seal { key } => {
            let config = config_commands::load_effective(path)?;
            secret_commands::handle_seal(&key, &config.kdf)?;
            Ok(0)
        },
        Commands::Open { key } => {
            let config = config_commands::load_effective(path)?;
            secret_commands::handle_open(&key, &config.kdf)
        },
    }
}
