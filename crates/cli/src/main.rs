use crate::{error::CliError, output::CompiledStatement};
use clap::Parser;
use commands::Commands;
use model::{QuerySpec, SchemaModel};
use planner::{QueryCompiler, Settings, inference::required_joins};
use query_builder::DialectKind;
use std::str::FromStr;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod output;

#[derive(Parser)]
#[command(
    name = "specql",
    version = "0.1.0",
    about = "Compiles declarative query specifications into SQL"
)]
struct Cli {
    #[arg(long, global = true, help = "Log at debug level")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    // Initialize logger; stdout carries the command output
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Compile {
            schema,
            spec,
            dialect,
            settings,
            output,
        } => {
            let schema = load_schema(&schema).await?;
            let spec = load_spec(&spec).await?;
            let settings = load_settings(settings.as_deref(), dialect.as_deref()).await?;
            info!(model = %schema.name, dialect = %settings.dialect, "Compiling specification");

            let statement = QueryCompiler::new(&schema).statement(&spec, &settings)?;
            let (sql, params) = statement.to_sql();
            let compiled = CompiledStatement {
                dialect: settings.dialect.to_string(),
                sql,
                params,
            };
            output::emit(&compiled, output).await?;
        }
        Commands::Joins { schema, spec } => {
            let schema = load_schema(&schema).await?;
            let spec = load_spec(&spec).await?;
            let joins = required_joins(&schema, &spec);
            debug!(count = joins.len(), "Inferred joins");
            output::emit(&joins, None).await?;
        }
    }

    Ok(())
}

async fn load_schema(path: &str) -> Result<SchemaModel, CliError> {
    let source = tokio::fs::read_to_string(path).await?;
    Ok(SchemaModel::from_json(&source)?)
}

async fn load_spec(path: &str) -> Result<QuerySpec, CliError> {
    let source = tokio::fs::read_to_string(path).await?;
    Ok(QuerySpec::from_json(&source)?)
}

async fn load_settings(path: Option<&str>, dialect: Option<&str>) -> Result<Settings, CliError> {
    let mut settings = match path {
        Some(path) => Settings::from_json(&tokio::fs::read_to_string(path).await?)?,
        None => Settings::from_env()?,
    };
    if let Some(dialect) = dialect {
        settings.dialect = DialectKind::from_str(dialect)
            .map_err(|_| CliError::InvalidDialect(dialect.to_string()))?;
    }
    Ok(settings)
}
