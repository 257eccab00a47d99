// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use mattermost_mcp::utils::logging::{format_error, format_info, format_success, format_warning};
use mattermost_mcp::{
    Config, HealthCheck, HealthReport, HealthStatus, MattermostClient, MattermostMcp,
};
use rmcp::ServiceExt;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "mattermost-mcp")]
#[command(version)]
#[command(about = "MCP server exposing Mattermost channels, messages, users and files", long_about = None)]
struct Cli {
    /// TOML config file (defaults to config/default.toml when present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP (Model Context Protocol) server for agentic tool integration
    Mcp {
        #[arg(long, default_value = "stdio")]
        transport: String,
    },

    /// Verify configuration, authentication and team access
    Check,

    /// List the tools the MCP server exposes
    Tools,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    mattermost_mcp::utils::logging::init_logger(cli.color, cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Mcp { transport } => {
            cmd_mcp(config, &transport).await?;
        }
        Commands::Check => {
            cmd_check(&config).await?;
        }
        Commands::Tools => {
            cmd_tools(config);
        }
    }

    Ok(())
}

/// An invalid value is an error; defaults never replace a broken configuration.
fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        info!("Loading configuration from: {}", path.display());
    }
    Config::load(path).context("Failed to load configuration")
}

async fn cmd_mcp(config: Config, transport: &str) -> Result<()> {
    info!("Starting MCP server (transport: {})", transport);

    if transport != "stdio" {
        error!("Only stdio transport is currently supported");
        return Err(anyhow::anyhow!("Unsupported transport: {}", transport));
    }

    if !config.has_credentials() {
        warn!("MATTERMOST_URL or MATTERMOST_TOKEN not set; tool calls will fail until configured");
    }

    let mcp_server = MattermostMcp::new(config);

    info!("MCP server ready. Available tools:");
    for tool in mcp_server.tools() {
        info!("  - {}", tool.name);
    }

    let service = mcp_server
        .serve(rmcp::transport::stdio())
        .await
        .context("Failed to start MCP stdio transport")?;
    let reason = service.waiting().await?;
    info!("MCP server stopped: {:?}", reason);

    Ok(())
}

async fn cmd_check(config: &Config) -> Result<()> {
    let mut checks = Vec::new();

    let start = Instant::now();
    if !config.has_credentials() {
        checks.push(HealthCheck::unhealthy(
            "configuration",
            "MATTERMOST_URL and MATTERMOST_TOKEN are required".to_string(),
            start.elapsed(),
        ));
        return report(checks);
    }
    let client = MattermostClient::new(config).context("Failed to create Mattermost client")?;
    checks.push(HealthCheck::healthy(
        "configuration",
        Some(client.api_url().to_string()),
        start.elapsed(),
    ));

    let start = Instant::now();
    match client.get_me().await {
        Ok(me) => checks.push(HealthCheck::healthy(
            "authentication",
            Some(format!("authenticated as {}", me.username)),
            start.elapsed(),
        )),
        Err(e) => {
            checks.push(HealthCheck::unhealthy(
                "authentication",
                e.to_string(),
                start.elapsed(),
            ));
            return report(checks);
        }
    }

    let start = Instant::now();
    match client.get_server_version().await {
        Ok(version) => checks.push(HealthCheck::healthy(
            "server version",
            Some(version),
            start.elapsed(),
        )),
        Err(e) => checks.push(HealthCheck::degraded(
            "server version",
            e.to_string(),
            start.elapsed(),
        )),
    }

    let start = Instant::now();
    if client.default_team_id().is_some() {
        match client.get_team_stats(None).await {
            Ok(stats) => checks.push(HealthCheck::healthy(
                "default team",
                Some(format!("{} members", stats.total_member_count)),
                start.elapsed(),
            )),
            Err(e) => checks.push(HealthCheck::unhealthy(
                "default team",
                e.to_string(),
                start.elapsed(),
            )),
        }
    } else {
        checks.push(HealthCheck::degraded(
            "default team",
            "MATTERMOST_TEAM_ID not set; team-scoped tools need team_id".to_string(),
            start.elapsed(),
        ));
    }

    report(checks)
}

fn report(checks: Vec<HealthCheck>) -> Result<()> {
    let report = HealthReport::new(checks, env!("CARGO_PKG_VERSION").to_string());
    println!("{}", report.format());

    if report.overall_status == HealthStatus::Degraded {
        println!("{}", format_warning("Mattermost connection works with warnings"));
        Ok(())
    } else if report.is_healthy() {
        println!("{}", format_success("Mattermost connection is healthy"));
        Ok(())
    } else {
        eprintln!("{}", format_error("Mattermost connection check failed"));
        Err(anyhow::anyhow!("Health check failed"))
    }
}

fn cmd_tools(config: Config) {
    let mcp_server = MattermostMcp::new(config);
    let tools = mcp_server.tools();

    println!("{}", format_info(&format!("{} tools available", tools.len())));
    for tool in tools {
        println!(
            "  {:<26} {}",
            tool.name,
            tool.description.as_deref().unwrap_or("No description")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_env_value_fails_startup() {
        // SAFETY: the only test in this binary touching the environment
        unsafe {
            std::env::set_var("MATTERMOST_URL", "https://chat.example.com");
            std::env::set_var("MATTERMOST_TOKEN", "env-token");
            std::env::set_var("MATTERMOST_MAX_RETRIES", "three");
        }

        let result = load_config(None);

        unsafe {
            std::env::remove_var("MATTERMOST_URL");
            std::env::remove_var("MATTERMOST_TOKEN");
            std::env::remove_var("MATTERMOST_MAX_RETRIES");
        }

        let err = result.unwrap_err();
        let rendered = format!("{:#}", err);
        assert!(rendered.starts_with("Failed to load configuration"));
        assert!(rendered.contains("max_retries"));
    }
}
