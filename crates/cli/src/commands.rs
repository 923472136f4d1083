use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Compile a query specification into SQL and bind parameters
    Compile {
        #[arg(long, help = "Schema model JSON file")]
        schema: String,

        #[arg(long, help = "Query specification JSON file")]
        spec: String,

        #[arg(long, help = "SQL dialect: mysql or postgres (overrides settings)")]
        dialect: Option<String>,

        #[arg(
            long,
            help = "Settings JSON file; defaults come from SPECQL_* environment variables"
        )]
        settings: Option<String>,

        #[arg(
            long,
            help = "If specified, writes the compiled statement to this file instead of stdout"
        )]
        output: Option<String>,
    },
    /// Print the joins a specification needs
    Joins {
        #[arg(long, help = "Schema model JSON file")]
        schema: String,

        #[arg(long, help = "Query specification JSON file")]
        spec: String,
    },
}
