use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Map, Value};
use tracing_subscriber::EnvFilter;

use sitelens::config::{Config, QueryPolicy};
use sitelens::tool::fetch::fetch_analytics_definition;
use sitelens::tool::{registry_from_config, FETCH_ANALYTICS};

#[derive(Parser)]
#[command(name = "sitelens-query")]
#[command(about = "Run search analytics lookups from the command line", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one fetchAnalytics call and print its text
    Run {
        /// Grouping dimension (query, page, country, device, date)
        #[arg(short, long, default_value = "query")]
        dimension: String,
        /// Days to look back from today
        #[arg(long)]
        days_ago: Option<u32>,
        /// First day of an explicit range (YYYY-MM-DD)
        #[arg(long, requires = "end_date")]
        start_date: Option<String>,
        /// Last day of an explicit range (YYYY-MM-DD)
        #[arg(long, requires = "start_date")]
        end_date: Option<String>,
        /// Number of rows
        #[arg(short, long)]
        limit: Option<u32>,
        /// 3-letter country code
        #[arg(long)]
        country: Option<String>,
        /// Only pages whose URL contains this text
        #[arg(long)]
        page: Option<String>,
        #[arg(short, long, value_enum)]
        format: Option<Format>,
    },
    /// Print the tool definitions as JSON
    Schema,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Markdown,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Schema => {
            let policy = QueryPolicy::from_env()?;
            let definitions = vec![fetch_analytics_definition(&policy)];
            println!("{}", serde_json::to_string_pretty(&definitions)?);
        }
        Commands::Run {
            dimension,
            days_ago,
            start_date,
            end_date,
            limit,
            country,
            page,
            format,
        } => {
            let config = Config::from_env()?;
            let registry = registry_from_config(&config)?;
            let tool = registry
                .get(FETCH_ANALYTICS)
                .context("fetchAnalytics tool is not registered")?;

            let mut arguments = Map::new();
            arguments.insert("dimension".into(), json!(dimension));
            if let Some(days) = days_ago {
                arguments.insert("daysAgo".into(), json!(days));
            }
            if let Some(start) = start_date {
                arguments.insert("startDate".into(), json!(start));
            }
            if let Some(end) = end_date {
                arguments.insert("endDate".into(), json!(end));
            }
            if let Some(limit) = limit {
                arguments.insert("limit".into(), json!(limit));
            }
            if let Some(country) = country {
                arguments.insert("countryFilter".into(), json!(country));
            }
            if let Some(page) = page {
                arguments.insert("pageFilter".into(), json!(page));
            }
            if let Some(format) = format {
                let name = match format {
                    Format::Csv => "csv",
                    Format::Markdown => "markdown",
                };
                arguments.insert("format".into(), json!(name));
            }

            println!("{}", tool.invoke(Value::Object(arguments)).await);
        }
    }

    Ok(())
}
