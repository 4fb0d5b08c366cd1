use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use strata_db::command::handlers::{clean_partitions, list_cleans};
use strata_db::engine::clean::runner::CleanRunner;
use strata_db::engine::table::TableContext;
use strata_db::logging;
use strata_db::shared::config::CONFIG;

#[derive(Parser)]
#[command(name = "stratadb_cleaner", about = "Retention cleaner for StrataDB tables")]
struct Cli {
    /// Table root directory, or a table name under engine.data_dir.
    #[arg(long)]
    table: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a clean under the configured retention policy.
    Clean,
    /// List completed cleans, newest first.
    Cleans,
    /// Show the per-partition breakdown of one completed clean.
    CleanPartitions {
        #[arg(long)]
        clean: String,
    },
}

fn resolve_table_root(table: &PathBuf) -> PathBuf {
    if table.is_absolute() || table.exists() {
        table.clone()
    } else {
        PathBuf::from(&CONFIG.engine.data_dir).join(table)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init()?;
    let cli = Cli::parse();
    let root = resolve_table_root(&cli.table);
    let ctx = TableContext::open(&root)?;

    match cli.command {
        Command::Clean => {
            let runner = CleanRunner::from_config(ctx, &CONFIG.cleaner)?;
            let metadata = runner.run().await?;
            info!(
                total_deleted = metadata.total_deleted,
                total_failed = metadata.total_failed,
                time_taken_ms = metadata.time_taken_ms,
                "Clean finished"
            );
            println!(
                "cleaned: {} deleted, {} failed, earliest retained {}, {} ms",
                metadata.total_deleted,
                metadata.total_failed,
                metadata.earliest_retained.as_deref().unwrap_or("-"),
                metadata.time_taken_ms
            );
        }
        Command::Cleans => {
            println!(
                "{:<20} {:<20} {:>14} {:>14}",
                "clean_time", "earliest_retained", "total_deleted", "time_taken_ms"
            );
            for row in list_cleans(&ctx)? {
                println!(
                    "{:<20} {:<20} {:>14} {:>14}",
                    row.clean_time, row.earliest_retained, row.total_deleted, row.time_taken_ms
                );
            }
        }
        Command::CleanPartitions { clean } => {
            println!(
                "{:<30} {:<26} {:>8} {:>8}",
                "partition", "policy", "deleted", "failed"
            );
            for row in clean_partitions(&ctx, &clean)? {
                println!(
                    "{:<30} {:<26} {:>8} {:>8}",
                    row.partition, row.policy, row.deleted, row.failed
                );
            }
        }
    }

    Ok(())
}
