use clap::{Parser as ClapParser, Subcommand};
use std::io::{self, Read};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use userquery::cli::{self, CheckOptions, CheckResult, CliError};

#[derive(ClapParser)]
#[command(name = "userquery")]
#[command(about = "Filter and sort JSON records with a search-box query language")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a query and run it over JSON records
    Check {
        /// The query to run
        query: String,

        /// Schema configuration file
        #[arg(short, long)]
        schema: PathBuf,

        /// JSON records (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Only compile the query, don't run it
        #[arg(long)]
        syntax_only: bool,

        /// Print the query as SQL against this table
        #[arg(long, value_name = "TABLE")]
        sql: Option<String>,
    },

    /// List the queryable fields of a schema
    Fields {
        /// Schema configuration file
        #[arg(short, long)]
        schema: PathBuf,
    },

    /// Show the query language reference
    Syntax {
        /// Category name (omit to list categories)
        category: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            query,
            schema,
            input,
            pretty,
            syntax_only,
            sql,
        } => run_check(
            CheckOptions {
                query,
                schema,
                input,
                syntax_only,
                sql,
            },
            pretty,
        ),
        Commands::Fields { schema } => userquery::json::schema_from_file(&schema)
            .map(|schema| print!("{}", cli::describe_fields(&schema)))
            .map_err(CliError::from),
        Commands::Syntax { category: None } => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Syntax {
            category: Some(category),
        } => cli::get_doc_category(&category).map(|content| print!("{}", content)),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_check(mut options: CheckOptions, pretty: bool) -> Result<(), CliError> {
    let reads_records = !options.syntax_only && options.sql.is_none();
    if options.input.is_none() && reads_records && !atty::is(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        options.input = Some(buffer);
    }

    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid => println!("Query is valid"),
        CheckResult::Sql(sql) => println!("{}", sql),
        CheckResult::Success(output) => {
            let json = if pretty {
                serde_json::to_string_pretty(&output)
            } else {
                serde_json::to_string(&output)
            }?;
            println!("{}", json);
        }
    }
    Ok(())
}
