//! saferc - Local target store for vault clients
//!
//! Commands:
//! - target [ALIAS|URL] [URL]: Show, select, or define the current target
//! - targets: List known targets
//! - token <TOKEN>: Store a token for the current target
//! - env [TARGET]: Output the target as environment variables
//! - exec <CMD>: Run a command with the target in its environment

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use saferc::{Config, Error};
use saferc_core::{MemoryEnv, Paths, ProcessEnv};
use std::path::PathBuf;
use std::process::Command;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "saferc")]
#[command(about = "Local target store for vault clients - server URLs, tokens, and TLS policy by alias")]
#[command(version)]
#[command(after_help = r#"FILES:
    ~/.saferc       All targets and the current selection (mode 0600)
    ~/.svtoken      The current target only, for other tooling (mode 0600)
    ~/.vault-token  Token used when no target is selected

ENVIRONMENT:
    Applying a target sets VAULT_ADDR, VAULT_TOKEN, and VAULT_SKIP_VERIFY=1
    when TLS verification is disabled for it."#)]
struct Cli {
    /// Directory holding .saferc and .svtoken (defaults to your home directory)
    #[arg(long, global = true, env = "SAFERC_HOME")]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current target, select one, or define a new one
    Target {
        /// Alias (or URL) of an existing target, or alias of a new one
        alias: Option<String>,
        /// URL for a new target
        url: Option<String>,
        /// Skip TLS certificate verification for this target
        #[arg(short = 'k', long)]
        skip_verify: bool,
    },

    /// List known targets
    Targets {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Store an auth token for the current target
    Token {
        token: String,
    },

    /// Output a target as shell export statements (eval $(saferc env))
    Env {
        /// Alias or URL (defaults to the current target)
        target: Option<String>,
    },

    /// Run a command with a target applied to its environment
    Exec {
        /// Alias or URL (defaults to the current target)
        #[arg(long, short)]
        target: Option<String>,
        /// Command to run
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        command: Vec<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let paths = match cli.home {
        Some(home) => Paths::under(home),
        None => Paths::new(&ProcessEnv),
    };

    let result = match cli.command {
        Some(Commands::Target {
            alias,
            url,
            skip_verify,
        }) => cmd_target(&paths, alias, url, skip_verify),
        Some(Commands::Targets { json }) => cmd_targets(&paths, json),
        Some(Commands::Token { token }) => cmd_token(&paths, &token),
        Some(Commands::Env { target }) => cmd_env(&paths, target.as_deref()),
        Some(Commands::Exec { target, command }) => {
            cmd_exec(&paths, target.as_deref(), &command)
        }
        None => cmd_target(&paths, None, None, false),
    };

    if let Err(e) = &result {
        if let Some(err) = e.downcast_ref::<Error>().filter(|err| err.is_fatal()) {
            eprintln!("!!! {}", err);
            std::process::exit(1);
        }
    }
    result
}

fn load(paths: &Paths) -> Result<Config> {
    Ok(Config::load(paths)?)
}

fn save(config: &Config, paths: &Paths) -> Result<()> {
    config
        .persist(paths)
        .with_context(|| format!("Failed to save targets to {}", paths.config.display()))
}

/// Show, select, or define the current target
fn cmd_target(
    paths: &Paths,
    alias: Option<String>,
    url: Option<String>,
    skip_verify: bool,
) -> Result<()> {
    let mut config = load(paths)?;

    match (alias, url) {
        (None, None) => {
            if skip_verify {
                bail!("-k needs a target to apply to");
            }
        }
        (Some(alias), None) => {
            config.set_current(&alias, skip_verify)?;
            save(&config, paths)?;
        }
        (Some(alias), Some(url)) => {
            config.set_target(&alias, &url, skip_verify);
            save(&config, paths)?;
        }
        (None, Some(_)) => bail!("A target URL needs an alias"),
    }

    print_current(&config);
    Ok(())
}

fn print_current(config: &Config) {
    match config.current() {
        None => println!("No target selected"),
        Some(alias) => {
            println!("Currently targeting {} at {}", alias, config.url());
            if !config.verified() {
                println!("Skipping TLS certificate verification");
            }
        }
    }
}

/// List known targets
fn cmd_targets(paths: &Paths, json: bool) -> Result<()> {
    let config = load(paths)?;
    let current = config.current().and_then(|c| config.locate(c).ok().flatten());

    if json {
        let targets: Vec<_> = config
            .targets()
            .map(|(alias, v)| {
                serde_json::json!({
                    "alias": alias,
                    "url": v.url,
                    "skip_verify": v.skip_verify,
                    "current": current == Some(alias),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&targets)?);
        return Ok(());
    }

    if config.vaults.is_empty() {
        println!("No targets defined. Add one with: saferc target <alias> <url>");
        return Ok(());
    }

    println!("Known Targets");
    println!();

    let width = config.vaults.keys().map(|a| a.len()).max().unwrap_or(0);
    for (alias, v) in config.targets() {
        let marker = if current == Some(alias) { "*" } else { " " };
        let skip = if v.skip_verify { " (noverify)" } else { "" };
        println!("{} {:<width$}  {}{}", marker, alias, v.url, skip, width = width);
    }

    Ok(())
}

/// Store a token for the current target
fn cmd_token(paths: &Paths, token: &str) -> Result<()> {
    let mut config = load(paths)?;
    config.set_token(token)?;
    save(&config, paths)?;

    println!("Token stored for {}", config.current);
    Ok(())
}

/// Output a target as environment variable exports
fn cmd_env(paths: &Paths, target: Option<&str>) -> Result<()> {
    let config = load(paths)?;
    let mut env = MemoryEnv::from_process();
    config.apply(target.unwrap_or(""), paths, &mut env)?;

    for (name, value) in env.exported() {
        // Escape single quotes in the value
        let escaped = value.replace('\'', "'\\''");
        println!("export {}='{}'", name, escaped);
    }

    Ok(())
}

/// Run a command with a target applied
fn cmd_exec(paths: &Paths, target: Option<&str>, command: &[String]) -> Result<()> {
    let Some((program, args)) = command.split_first() else {
        bail!("Command required. Usage: saferc exec <command>");
    };

    let config = load(paths)?;
    config.apply(target.unwrap_or(""), paths, &mut ProcessEnv)?;

    let status = Command::new(program)
        .args(args)
        .status()
        .with_context(|| format!("Failed to execute {}", program))?;

    std::process::exit(status.code().unwrap_or(1));
}
