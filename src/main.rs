//! mongo-paginate
//!
//! Fetches one page of a MongoDB query using cursor-based pagination and
//! prints it as JSON, along with the tokens for the adjacent pages.
//!
//! # Usage
//!
//! ```bash
//! # First page of items sorted by name
//! mongo-paginate mongodb://localhost:27017/shop --collection items --sort name --limit 20
//!
//! # Following page
//! mongo-paginate mongodb://localhost:27017/shop --collection items --sort name --limit 20 \
//!     --next <token>
//! ```

use tracing_subscriber::EnvFilter;

use mongo_cursor_pagination::cli::CliInterface;
use mongo_cursor_pagination::error::{ErrorInfo, Result};

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        match ErrorInfo::from_error(&e).to_json() {
            Ok(json) => eprintln!("{}", json),
            Err(_) => eprintln!("Error: {}", e),
        }
        std::process::exit(if e.is_client_error() { 2 } else { 1 });
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Handle subcommands or fetch the requested page
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    if cli.handle_subcommand()? {
        return Ok(());
    }

    cli.run_query().await
}

/// Initialize logging system
///
/// `RUST_LOG` takes precedence over the configured (or flag-adjusted) level.
/// Logs go to stderr so stdout stays valid JSON.
fn initialize_logging(cli: &CliInterface) {
    let level = cli.config().logging.level.to_tracing_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
