//! Command-line interface for the package finder application

use crate::category::Category;
use crate::client::PypiClient;
use crate::config::{AppConfig, LoggingConfig, RuntimeEnvironment};
use crate::error::{PyLibFinderError, Result};
use crate::recommend::Recommender;
use crate::server::start_server;
use crate::session::ExploreSession;
use crate::types::*;
use crate::utils::{parse_timeout, truncate_text};
use crate::{DEFAULT_SERVER_PORT, NO_SIMILAR_MESSAGE};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tabled::{Table, Tabled};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// PyLib Finder - look up Python packages and discover similar ones
#[derive(Parser)]
#[command(
    name = "pylib-finder",
    version = "1.0.0",
    about = "Look up Python packages on PyPI and discover similar ones",
    long_about = "A tool for retrieving information about Python packages from PyPI.
Shows package details and install commands, recommends similar packages,
lets you explore from one package to the next, and can run as an HTTP API server."
)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Enable quiet mode (only errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Timeout for requests (e.g. 30s, 2m, 1h)
    #[arg(long, global = true)]
    pub timeout: Option<String>,

    /// Custom PyPI JSON API URL
    #[arg(long, global = true, env = "PYLIB_FINDER_API_URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show package details, install commands and similar packages
    Info {
        /// Name of the package
        package: String,

        /// Skip the similar packages section
        #[arg(long)]
        no_similar: bool,
    },

    /// Recommend packages similar to the given one
    Similar {
        /// Name of the package
        package: String,
    },

    /// List the curated packages of each category
    Categories {
        /// Show only this category
        #[arg(short, long)]
        category: Option<Category>,
    },

    /// Interactively follow recommendations from package to package
    Explore {
        /// Package to start from
        package: String,
    },

    /// Start HTTP API server
    Server {
        /// Port to bind to
        #[arg(short, long, default_value_t = DEFAULT_SERVER_PORT)]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Enable CORS
        #[arg(long)]
        cors: bool,
    },

    /// Generate sample configuration file
    Config {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Output format options
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
    /// Compact single-line JSON
    Compact,
}

/// One labelled row of the package details table
#[derive(Tabled)]
struct FieldDisplay {
    #[tabled(rename = "Field")]
    field: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

/// Tabled display for recommendations
#[derive(Tabled)]
struct SimilarDisplay {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "Package")]
    name: String,
}

/// Tabled display for the category table
#[derive(Tabled)]
struct CategoryDisplay {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Packages")]
    packages: String,
}

/// Machine-readable output of the info command
#[derive(Serialize)]
struct InfoOutput<'a> {
    #[serde(flatten)]
    details: &'a PackageDetails,
    install: &'a InstallCommands,
    #[serde(skip_serializing_if = "Option::is_none")]
    similar: Option<&'a [String]>,
}

/// Client and recommendation engine shared by the commands
struct Finder {
    client: Arc<PypiClient>,
    recommender: Recommender,
}

/// Parse arguments, build the registry client and dispatch the subcommand
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_from_file(cli.config.as_ref())?;
    RuntimeEnvironment::detect().apply_overrides(&mut config);
    config.validate().map_err(PyLibFinderError::validation)?;

    init_logging(&effective_logging(
        &config.logging,
        cli.verbose,
        cli.quiet,
        &cli.format,
    ));

    let timeout = match &cli.timeout {
        Some(timeout) => parse_timeout(timeout)?,
        None => Duration::from_secs(config.pypi.timeout_seconds),
    };

    let client = Arc::new(
        PypiClient::builder()
            .base_url(cli.api_url.as_deref().unwrap_or(&config.pypi.api_url))
            .user_agent(&config.pypi.user_agent)
            .timeout(timeout)
            .build()?,
    );
    let finder = Finder {
        recommender: Recommender::new(client.clone())
            .with_settings(config.recommendations.clone()),
        client,
    };

    match cli.command {
        Commands::Info {
            package,
            no_similar,
        } => {
            handle_info(&finder, &package, !no_similar, &cli.format).await?;
        }
        Commands::Similar { package } => {
            handle_similar(&finder, &package, &cli.format).await?;
        }
        Commands::Categories { category } => {
            handle_categories(category, &cli.format)?;
        }
        Commands::Explore { package } => {
            handle_explore(&finder, package).await?;
        }
        Commands::Server { port, host, cors } => {
            let mut server_config = config;
            server_config.server.port = port;
            server_config.server.host = host;
            server_config.server.enable_cors = cors;
            if let Some(url) = cli.api_url {
                server_config.pypi.api_url = url;
            }
            server_config.pypi.timeout_seconds = timeout.as_secs().max(1);

            start_server(server_config).await?;
        }
        Commands::Config { output } => {
            handle_config(output.as_deref())?;
        }
    }

    Ok(())
}

/// Handle the info command
async fn handle_info(
    finder: &Finder,
    package: &str,
    include_similar: bool,
    format: &OutputFormat,
) -> Result<()> {
    let metadata = finder.client.get_package(package).await?;
    let details = PackageDetails::from(&metadata);
    let install = InstallCommands::for_package(&details.name);

    let similar = if include_similar {
        Some(
            finder
                .recommender
                .recommend_with_metadata(package, &metadata)
                .await,
        )
    } else {
        None
    };

    match format {
        OutputFormat::Table => {
            print_details(&details);
            print_install(&install);
            if let Some(similar) = &similar {
                println!("\nSimilar packages:");
                print_similar(similar);
            }
        }
        _ => {
            let output = InfoOutput {
                details: &details,
                install: &install,
                similar: similar.as_deref(),
            };
            output_result(&serde_json::to_value(&output)?, format)?;
        }
    }

    Ok(())
}

/// Handle the similar command
async fn handle_similar(finder: &Finder, package: &str, format: &OutputFormat) -> Result<()> {
    let similar = finder.recommender.recommend(package).await;

    match format {
        OutputFormat::Table => print_similar(&similar),
        _ => {
            let result = serde_json::json!({
                "package": package,
                "similar": similar,
            });
            output_result(&result, format)?;
        }
    }

    Ok(())
}

/// Handle the categories command
fn handle_categories(only: Option<Category>, format: &OutputFormat) -> Result<()> {
    let categories: Vec<Category> = match only {
        Some(category) => vec![category],
        None => Category::ALL.to_vec(),
    };

    match format {
        OutputFormat::Table => {
            let displays: Vec<CategoryDisplay> = categories
                .into_iter()
                .map(|c| CategoryDisplay {
                    category: c.to_string(),
                    packages: c.packages().join(", "),
                })
                .collect();
            println!("{}", Table::new(displays));
        }
        _ => {
            let entries: Vec<CategoryEntry> = categories
                .into_iter()
                .map(|c| CategoryEntry {
                    category: c.to_string(),
                    packages: c.packages().iter().map(|p| p.to_string()).collect(),
                })
                .collect();
            output_result(&serde_json::to_value(entries)?, format)?;
        }
    }

    Ok(())
}

/// Handle the explore command.
///
/// Each round looks the current package up, shows it with its
/// recommendations and waits for the user to pick the next one.
async fn handle_explore(finder: &Finder, start: String) -> Result<()> {
    let mut session = ExploreSession::new();
    session.start(start);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let current = session.current().unwrap_or_default().to_string();
        debug!("Exploring '{}'", current);

        match finder.client.get_package(&current).await {
            Ok(metadata) => {
                let details = PackageDetails::from(&metadata);
                print_details(&details);

                let similar = finder
                    .recommender
                    .recommend_with_metadata(&current, &metadata)
                    .await;
                println!("\nSimilar packages:");
                print_similar(&similar);
                session.show(similar);
            }
            Err(e) => {
                println!("{}", e.user_message());
                session.show(Vec::new());
            }
        }

        println!("\nEnter a number to explore it, a package name to search, 'b' to go back, 'q' to quit.");

        let next = loop {
            let Some(line) = lines.next_line().await? else {
                return Ok(());
            };

            match line.trim() {
                "" => continue,
                "q" | "quit" | "exit" => return Ok(()),
                "b" | "back" => match session.back() {
                    Some(previous) => break previous,
                    None => println!("Nothing to go back to."),
                },
                input => match input.parse::<usize>() {
                    Ok(position) => match session.select(position) {
                        Some(next) => break next,
                        None => println!("No recommendation at position {}.", position),
                    },
                    Err(_) => {
                        session.start(input);
                        break input.to_string();
                    }
                },
            }
        };

        debug!("Following to '{}'", next);
        println!();
    }
}

/// Print or write the default configuration
fn handle_config(output: Option<&std::path::Path>) -> Result<()> {
    let sample_config = AppConfig::create_sample_config();

    if let Some(path) = output {
        std::fs::write(path, sample_config)?;
        println!("Configuration written to: {}", path.display());
    } else {
        println!("{}", sample_config);
    }

    Ok(())
}

fn print_details(details: &PackageDetails) {
    let mut rows = vec![
        FieldDisplay {
            field: "Name",
            value: details.name.clone(),
        },
        FieldDisplay {
            field: "Version",
            value: details.version.clone(),
        },
        FieldDisplay {
            field: "Author",
            value: details.author.clone(),
        },
        FieldDisplay {
            field: "License",
            value: truncate_text(&details.license, 60),
        },
    ];
    if let Some(url) = &details.project_url {
        rows.push(FieldDisplay {
            field: "Project",
            value: url.clone(),
        });
    }
    if let Some(url) = &details.docs_url {
        rows.push(FieldDisplay {
            field: "Docs",
            value: url.clone(),
        });
    }

    println!("{}", Table::new(rows));
    println!("\n{}", details.description);

    if !details.requirements.is_empty() {
        println!("\nRequirements:");
        for requirement in &details.requirements {
            println!("  - {}", requirement);
        }
    }
}

fn print_install(install: &InstallCommands) {
    println!("\nInstall:");
    println!("  Windows:      {}", install.windows);
    println!("  Linux/macOS:  {}", install.unix);
    println!("  Virtualenv:");
    for line in install.virtualenv.lines() {
        println!("    {}", line);
    }
}

fn print_similar(similar: &[String]) {
    if similar.is_empty() {
        println!("{}", NO_SIMILAR_MESSAGE);
        return;
    }

    let displays: Vec<SimilarDisplay> = similar
        .iter()
        .enumerate()
        .map(|(idx, name)| SimilarDisplay {
            position: idx + 1,
            name: name.clone(),
        })
        .collect();
    println!("{}", Table::new(displays));
}

fn output_result(value: &serde_json::Value, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(value)?);
        }
        OutputFormat::Compact => {
            println!("{}", serde_json::to_string(value)?);
        }
        OutputFormat::Json | OutputFormat::Table => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
    }

    Ok(())
}

/// `[logging]` with the command-line flags applied on top: `--quiet` and
/// machine-readable output formats keep only errors, `--verbose` shows debug.
fn effective_logging(
    logging: &LoggingConfig,
    verbose: bool,
    quiet: bool,
    format: &OutputFormat,
) -> LoggingConfig {
    let level = if quiet || !matches!(format, OutputFormat::Table) {
        "error"
    } else if verbose {
        "debug"
    } else {
        logging.level.as_str()
    };

    LoggingConfig {
        level: level.to_string(),
        format: logging.format.clone(),
    }
}

/// Logs go to stderr so structured output on stdout stays parseable
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match logging.format.as_str() {
        "json" => subscriber.json().init(),
        "compact" => subscriber.compact().init(),
        _ => subscriber.init(),
    }
}
