//! Price Monitor command-line client.
//!
//! Thin front end over the SDK: watch a scrape job, start one, print price
//! analytics and browse or export raw tables. Output goes through `tracing`
//! via [`LogUi`].

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

use price_monitor_sdk::browser::{format_cell, header_name, FilterInput};
use price_monitor_sdk::dashboard::ScrapeForm;
use price_monitor_sdk::models::{JobId, Table};
use price_monitor_sdk::{Dashboard, LogUi, PriceMonitorSdk};

#[derive(Parser)]
#[command(name = "price-cli")]
#[command(about = "Price Monitor command-line client")]
#[command(version)]
struct Cli {
    /// Backend base URL (defaults to $PRICE_MONITOR_URL or http://127.0.0.1:8000)
    #[arg(long)]
    url: Option<String>,

    /// Answer yes to every confirmation
    #[arg(short = 'y', long)]
    yes: bool,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List workspaces
    Workspaces,

    /// Follow a running scrape job until it finishes
    Watch {
        job_id: String,
    },

    /// Start a bulk scrape in a workspace season and follow it
    Scrape {
        #[arg(long)]
        workspace: i64,
        #[arg(long)]
        season: i64,
        /// Listing ids, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        listings: Vec<i64>,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(long, default_value = "airbnb")]
        provider: String,
        #[arg(long)]
        guests: Option<u32>,
        #[arg(long)]
        currency: Option<String>,
    },

    /// Price statistics for one or more listings
    Analytics {
        /// Listing ids, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        listings: Vec<i64>,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Provider filter (`all` for every provider)
        #[arg(long, default_value = "all")]
        provider: String,
        /// Also write the CSV export
        #[arg(long)]
        export: bool,
    },

    /// Browse or export a raw table
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Print one page of a table
    Browse {
        table: Table,
        #[arg(long, default_value = "1")]
        page: u32,
        /// Column to sort by; repeat the flag to sort descending
        #[arg(long)]
        sort: Vec<String>,
        #[arg(long)]
        listing_id: Option<i64>,
    },
    /// Download the table as CSV
    Export {
        table: Table,
        #[arg(long)]
        listing_id: Option<i64>,
    },
    /// Delete every row matching the filters
    Delete {
        table: Table,
        #[arg(long)]
        listing_id: Option<i64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    let mut builder = PriceMonitorSdk::builder();
    if let Some(url) = cli.url {
        builder = builder.base_url(url);
    }
    let sdk = builder.build().context("invalid backend configuration")?;
    info!("{sdk}");

    let mut dashboard = Dashboard::new(sdk, Arc::new(LogUi::new(cli.yes)));

    match cli.command {
        Commands::Workspaces => {
            for ws in dashboard.sdk().workspaces().list()? {
                println!("{:>5}  {}", ws.id, ws.name);
            }
        }

        Commands::Watch { job_id } => {
            let closure = dashboard.monitor().watch(JobId(job_id), None);
            info!(?closure, "job finished");
        }

        Commands::Scrape {
            workspace,
            season,
            listings,
            start,
            end,
            provider,
            guests,
            currency,
        } => {
            dashboard.select_workspace(Some(workspace))?;
            dashboard.select_season(Some(season));
            dashboard.set_scrape_provider(&provider);
            for id in listings {
                dashboard.toggle_scrape_listing(id);
            }
            let started = dashboard.start_bulk_scrape(&ScrapeForm {
                guests,
                currency,
                start_date: start,
                end_date: end,
            })?;
            if let Some(watcher) = started.watcher {
                let closure = watcher
                    .join()
                    .map_err(|_| anyhow::anyhow!("monitor thread panicked"))?;
                info!(?closure, "job finished");
                // Let the post-job refresh run before exiting.
                std::thread::sleep(dashboard.sdk().refresh_delay() * 2);
            }
        }

        Commands::Analytics {
            listings,
            start,
            end,
            provider,
            export,
        } => {
            dashboard.load_analytics_tab()?;
            if start.is_some() || end.is_some() {
                let current = dashboard.analytics().clone();
                dashboard.set_analytics_range(start.or(current.start), end.or(current.end));
            }
            dashboard.set_analytics_provider(&provider);
            let mut report = None;
            for id in listings {
                report = dashboard.toggle_analytics_listing(id)?;
            }
            if let Some(report) = report {
                for row in report.stats.rows.iter().chain(report.stats.total.iter()) {
                    println!(
                        "{:<30} avg {:>9.2}  min {:>9.2}  max {:>9.2}  {:>5.1}% ({})",
                        row.label,
                        row.avg_price,
                        row.min_price,
                        row.max_price,
                        row.availability_rate,
                        row.days_label()
                    );
                }
            }
            if export {
                let path = dashboard.export_analytics()?;
                println!("{}", path.display());
            }
        }

        Commands::Db { action } => match action {
            DbAction::Browse {
                table,
                page,
                sort,
                listing_id,
            } => {
                dashboard.load_database_table(table)?;
                if listing_id.is_some() {
                    dashboard.apply_database_filters(&FilterInput {
                        listing_id,
                        ..Default::default()
                    })?;
                }
                for column in &sort {
                    dashboard.sort_database(column)?;
                }
                let rows = dashboard.go_to_database_page(page)?;
                let columns = rows.columns();
                println!(
                    "{}",
                    columns.iter().map(|c| header_name(c)).collect::<Vec<_>>().join(" | ")
                );
                for item in &rows.items {
                    let cells: Vec<String> = columns
                        .iter()
                        .map(|c| format_cell(c, item.get(c).unwrap_or(&Value::Null)))
                        .collect();
                    println!("{}", cells.join(" | "));
                }
                let browser = dashboard.browser();
                println!("{} · {}", browser.record_count_label(), browser.page_label());
            }
            DbAction::Export { table, listing_id } => {
                dashboard.load_database_table(table)?;
                if listing_id.is_some() {
                    dashboard.apply_database_filters(&FilterInput {
                        listing_id,
                        ..Default::default()
                    })?;
                }
                let path = dashboard.export_database_table()?;
                println!("{}", path.display());
            }
            DbAction::Delete { table, listing_id } => {
                dashboard.load_database_table(table)?;
                if listing_id.is_some() {
                    dashboard.apply_database_filters(&FilterInput {
                        listing_id,
                        ..Default::default()
                    })?;
                }
                println!("{}", dashboard.delete_filtered_records()?);
            }
        },
    }

    Ok(())
}
