use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use pkgsite_details::config::{Config, log_path};
use pkgsite_details::frontend::{DetailsRequest, FrontendError, Server, TabRegistries};
use pkgsite_details::logging::init_logging;
use pkgsite_details::store::SqliteStore;

#[derive(Parser)]
#[command(name = "pkgsite-details")]
#[command(version, about = "Resolve package and module details pages")]
struct Cli {
    /// Path to a JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the SQLite database (overrides the configuration)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show a package page: /<import-path>[@<version>]
    Pkg(PageArgs),
    /// Show a module page: /<module-path>@<version>
    Mod(PageArgs),
}

#[derive(Args)]
struct PageArgs {
    /// URL path without the /pkg or /mod prefix
    url_path: String,

    /// Tab to show; unknown tabs fall back to the default tab
    #[arg(long, default_value = "")]
    tab: String,

    /// Page of the "importedby" tab, starting at 1
    #[arg(long)]
    page: Option<usize>,

    /// Page size of the "importedby" tab
    #[arg(long)]
    limit: Option<usize>,
}

impl PageArgs {
    fn into_request(self) -> DetailsRequest {
        DetailsRequest::new(&self.url_path)
            .with_tab(&self.tab)
            .with_pagination(self.page, self.limit)
    }
}

fn print_page<T: Serialize>(result: Result<T, FrontendError>) -> anyhow::Result<ExitCode> {
    match result {
        Ok(page) => {
            println!("{}", serde_json::to_string_pretty(&page)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("{} {}", err.status_code(), err.message());
            if let Some(secondary) = err.secondary_message() {
                eprintln!("{}", secondary);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let _guard = init_logging(&log_path())?;

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(db) = cli.db {
        config.database = Some(db);
    }

    let db_path = config.database_path();
    info!("Using database {:?}", db_path);
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let store = Arc::new(SqliteStore::new(&db_path)?);
    let server = Server::new(store, Arc::new(TabRegistries::new()?), config.imported_by);

    match cli.command {
        Command::Pkg(args) => print_page(server.serve_package_details(&args.into_request())),
        Command::Mod(args) => print_page(server.serve_module_details(&args.into_request())),
    }
}
