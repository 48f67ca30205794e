use std::{net::SocketAddr, path::PathBuf, process::ExitCode, sync::Arc, time::Duration};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio::{net::TcpListener, signal};
use tracing::{error, info};
use zonekeeper::{
    AppState, api, config::ZoneConfig, manager::OperationResult, manager::ZoneManager,
    zone::DEFAULT_TTL,
};

#[derive(Parser, Debug)]
#[command(author, version, about, rename_all = "kebab-case")]
struct Cli {
    /// Zone name passed to named-checkzone (e.g. internal.local)
    #[arg(long, value_name = "ZONE", default_value = "internal.local", global = true)]
    zone_name: String,
    /// Path to the zone file
    #[arg(
        long,
        value_name = "PATH",
        default_value = "/etc/bind/zones/db.internal.local",
        global = true
    )]
    zone_file: PathBuf,
    /// Directory receiving a copy of the zone before every change
    #[arg(long, value_name = "PATH", default_value = "/var/backups/dns", global = true)]
    backup_dir: PathBuf,
    /// Directory for the staged zone before it is committed (defaults to the system temp dir)
    #[arg(long, value_name = "PATH", global = true)]
    staging_dir: Option<PathBuf>,
    /// Owner applied to the zone file; empty string keeps the current owner
    #[arg(long, value_name = "USER:GROUP", default_value = "bind:bind", global = true)]
    owner: String,
    /// Octal permission bits applied to the zone file
    #[arg(long, value_name = "MODE", default_value = "644", global = true)]
    mode: String,
    /// Privilege elevation command; empty string disables elevation
    #[arg(long, value_name = "CMD", default_value = "sudo", global = true)]
    elevate: String,
    /// Zone syntax checker
    #[arg(long, value_name = "CMD", default_value = "named-checkzone", global = true)]
    checkzone: String,
    /// Name server reload command (whitespace separated)
    #[arg(long, value_name = "CMD", default_value = "systemctl reload bind9", global = true)]
    reload: String,
    /// Seconds an external command may run before it is killed
    #[arg(long, value_name = "SECS", default_value_t = 10, global = true)]
    command_timeout: u64,
    /// Restore the backup when named-checkzone rejects the edited zone
    #[arg(long, global = true)]
    rollback_on_invalid: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a record
    Add {
        hostname: String,
        #[arg(value_name = "TYPE")]
        rrtype: String,
        value: String,
        #[arg(default_value_t = DEFAULT_TTL)]
        ttl: u32,
    },
    /// Remove the records of a host, optionally only one type
    Remove {
        hostname: String,
        #[arg(value_name = "TYPE")]
        rrtype: Option<String>,
    },
    /// List the records of the zone
    List,
    /// Serve the HTTP API
    Serve {
        /// Listen address for the HTTP server
        #[arg(long, value_name = "ADDR", default_value = "0.0.0.0:8080")]
        listen: SocketAddr,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();

    let cli = Cli::parse();
    let config = build_zone_config(&cli)?;
    let manager = ZoneManager::new(config);

    let result = match cli.command {
        Command::Add {
            hostname,
            rrtype,
            value,
            ttl,
        } => manager.add(&hostname, &rrtype, &value, ttl).await,
        Command::Remove { hostname, rrtype } => manager.remove(&hostname, rrtype.as_deref()).await,
        Command::List => manager.list().await,
        Command::Serve { listen } => {
            serve(manager, listen).await?;
            return Ok(ExitCode::SUCCESS);
        }
    };

    print_result(&result)?;
    Ok(if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn serve(manager: ZoneManager, listen: SocketAddr) -> Result<()> {
    let state = Arc::new(AppState::new(manager));
    let app = api::create_router(state);

    let listener = TcpListener::bind(listen)
        .await
        .with_context(|| format!("failed to bind to {listen}"))?;

    info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server exited with error")?;

    Ok(())
}

fn build_zone_config(cli: &Cli) -> Result<ZoneConfig> {
    if cli.zone_name.trim().is_empty() {
        bail!("--zone-name cannot be empty");
    }

    let mode = u32::from_str_radix(cli.mode.trim_start_matches("0o"), 8)
        .with_context(|| format!("invalid --mode '{}'", cli.mode))?;
    if mode > 0o7777 {
        bail!("--mode '{}' is out of range", cli.mode);
    }

    let reload_command: Vec<String> = cli.reload.split_whitespace().map(String::from).collect();
    if reload_command.is_empty() {
        bail!("--reload cannot be empty");
    }
    if cli.command_timeout == 0 {
        bail!("--command-timeout must be greater than 0");
    }

    let owner = Some(cli.owner.trim())
        .filter(|o| !o.is_empty())
        .map(String::from);

    Ok(ZoneConfig {
        zone_name: cli.zone_name.trim().trim_end_matches('.').to_string(),
        zone_file: cli.zone_file.clone(),
        backup_dir: cli.backup_dir.clone(),
        staging_dir: cli.staging_dir.clone().unwrap_or_else(std::env::temp_dir),
        owner,
        mode,
        elevate_command: cli.elevate.split_whitespace().map(String::from).collect(),
        checkzone_command: cli.checkzone.clone(),
        reload_command,
        command_timeout: Duration::from_secs(cli.command_timeout),
        rollback_on_invalid: cli.rollback_on_invalid,
    })
}

fn print_result(result: &OperationResult) -> Result<()> {
    let json = serde_json::to_string(result).context("failed to encode result")?;
    println!("{json}");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        error!("failed to install CTRL+C handler: {err}");
    }
    info!("shutdown signal received");
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
