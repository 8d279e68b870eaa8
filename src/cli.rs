// src/cli.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::time::Instant;
use tracing::{error, info};

use crate::app::AppContext;
use crate::core::{ConfigManager, Database};
use crate::job_aggregation::Platform;
use crate::web::{start_web_server, ScrapeJobsPayload, ScrapeJobsResponse};

#[derive(Parser, Debug)]
#[command(name = "jobsweep")]
#[command(about = "Aggregate job postings from public ATS boards")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[arg(long, env = "ROCKET_PORT", default_value_t = 3001, global = true)]
    pub port: u16,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Run one aggregation and print the response JSON
    Scrape {
        #[arg(long, default_value = "")]
        query: String,
        /// Platform id, repeatable; omit for the default selection
        #[arg(long = "platform")]
        platforms: Vec<String>,
        #[arg(long, default_value_t = 400)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: usize,
        /// Keep postings outside the USA
        #[arg(long)]
        all_locations: bool,
        /// Skip duplicate filtering against stored postings
        #[arg(long)]
        no_dedup: bool,
        #[arg(long)]
        max_age_days: Option<u32>,
    },
    /// Manage saved job tables
    Tables {
        #[command(subcommand)]
        command: TableCommand,
    },
    /// List supported platforms
    Platforms,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum TableCommand {
    Create { name: String },
    List,
    /// Delete by id or name
    Delete { id_or_name: String },
}

pub async fn run(cli: Cli, config: ConfigManager) -> Result<()> {
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let ctx = AppContext::build(&config).await?;
            start_web_server(ctx, cli.port).await
        }
        Command::Scrape {
            query,
            platforms,
            limit,
            offset,
            all_locations,
            no_dedup,
            max_age_days,
        } => {
            let payload = ScrapeJobsPayload {
                query: Some(query),
                platforms: Some(platforms),
                limit: Some(Value::from(limit)),
                offset: Some(Value::from(offset)),
                filter_duplicates: Some(!no_dedup),
                usa_only: Some(!all_locations),
                max_age_days,
                ..Default::default()
            };
            handle_scrape(payload, &config).await
        }
        Command::Tables { command } => handle_tables(command, &config).await,
        Command::Platforms => {
            print_platforms();
            Ok(())
        }
    }
}

async fn handle_scrape(payload: ScrapeJobsPayload, config: &ConfigManager) -> Result<()> {
    let started = Instant::now();
    let request = payload.into_request().map_err(anyhow::Error::msg)?;
    let ctx = AppContext::build(config).await?;

    let report = ctx.scrape.scrape(request).await?;
    let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let response = ScrapeJobsResponse::from_report(report, elapsed);

    info!(
        "Scrape finished: {} jobs, {} duplicates filtered",
        response.metadata.total_jobs, response.metadata.duplicates_filtered
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&response).context("Failed to render scrape response")?
    );
    Ok(())
}

async fn handle_tables(command: TableCommand, config: &ConfigManager) -> Result<()> {
    let database = Database::new(&config.environment.database_path).await?;
    let tables = database.tables();

    match command {
        TableCommand::Create { name } => {
            let table = tables.create(&name).await?;
            println!("✅ Created table '{}' ({})", table.name, table.id);
        }
        TableCommand::List => {
            let all = tables.list().await?;
            if all.is_empty() {
                println!("No job tables found.");
            } else {
                println!("{:<38} {:<25} {:>8} {:<17}", "ID", "Name", "Jobs", "Created");
                println!("{}", "-".repeat(91));
                for table in all {
                    println!(
                        "{:<38} {:<25} {:>8} {:<17}",
                        table.id,
                        table.name,
                        table.job_count,
                        table.created_at.format("%Y-%m-%d %H:%M")
                    );
                }
            }
        }
        TableCommand::Delete { id_or_name } => {
            if tables.delete(&id_or_name).await? {
                println!("✅ Deleted table '{}'", id_or_name);
            } else {
                error!("No job table matches '{}'", id_or_name);
                println!("❌ No job table matches '{}'", id_or_name);
            }
        }
    }

    Ok(())
}

fn print_platforms() {
    let defaults = Platform::default_selection();
    for platform in Platform::ALL {
        let marker = if platform.is_stub() {
            " (stub)"
        } else if defaults.contains(&platform) {
            ""
        } else {
            " (opt-in)"
        };
        println!("{:<16} {}{}", platform.id(), platform.display_name(), marker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["jobsweep", "--port", "8080"]).unwrap();
        assert_eq!(cli.command, None);
        assert_eq!(cli.port, 8080);
    }

    #[test]
    fn scrape_flags() {
        let cli = Cli::try_parse_from([
            "jobsweep",
            "scrape",
            "--query",
            "rust",
            "--platform",
            "lever",
            "--platform",
            "greenhouse",
            "--all-locations",
        ])
        .unwrap();

        match cli.command {
            Some(Command::Scrape {
                query,
                platforms,
                limit,
                all_locations,
                no_dedup,
                ..
            }) => {
                assert_eq!(query, "rust");
                assert_eq!(platforms, vec!["lever", "greenhouse"]);
                assert_eq!(limit, 400);
                assert!(all_locations);
                assert!(!no_dedup);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn table_subcommands() {
        let cli = Cli::try_parse_from(["jobsweep", "tables", "delete", "favourites"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Tables {
                command: TableCommand::Delete {
                    id_or_name: "favourites".to_string()
                }
            })
        );
    }

    #[tokio::test]
    async fn table_lifecycle_against_a_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = format!("local:\n  database_path: {}\n", dir.path().join("jobs.db").display());
        let config = ConfigManager::from_yaml_str(&yaml, "local").unwrap();

        handle_tables(TableCommand::Create { name: "favourites".to_string() }, &config)
            .await
            .unwrap();
        handle_tables(TableCommand::List, &config).await.unwrap();
        handle_tables(TableCommand::Delete { id_or_name: "favourites".to_string() }, &config)
            .await
            .unwrap();

        let database = Database::new(&config.environment.database_path).await.unwrap();
        assert!(database.tables().list().await.unwrap().is_empty());
    }
}
