//! list-pager — CLI
//!
//! Pages through a JSON array of rows with the same engine the list views
//! use: filters, one sort order, a page and a page size.
//!
//! ```sh
//! # Page 3 of the active products, most expensive first
//! list-pager --rows products.json --filter status:eq:active --order price:desc --page 3
//!
//! # Case-insensitive search, 10 rows per page
//! list-pager --rows products.json --filter "name:matches-ignore-case:%shirt%" --page-size 10
//!
//! # Validate config without running a query
//! list-pager --check
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use list_pager::{
    default_config_path, AppConfig, FilterSpec, InMemoryBackend, OrderSpec, PageSnapshot,
    PaginationController, RemoteQueryFetcher,
};

/// Page through JSON rows with filters, ordering and an ellipsis page window.
#[derive(Parser, Debug)]
#[command(
    name = "list-pager",
    version,
    about = "Paginated, filtered views over a JSON array of rows",
    long_about = "list-pager — runs bounded range queries over a JSON array of objects \
                  and prints one page plus its page window.\n\n\
                  Default config: ~/.config/list-pager/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "LIST_PAGER_CONFIG")]
    config: Option<PathBuf>,

    /// JSON file holding an array of row objects.
    #[arg(short, long, required_unless_present = "check")]
    rows: Option<PathBuf>,

    /// Filter as field:operator:value (repeatable, AND-combined).
    #[arg(short, long = "filter", value_name = "FIELD:OP:VALUE")]
    filters: Vec<String>,

    /// Sort order as field, field:asc or field:desc.
    #[arg(short, long)]
    order: Option<String>,

    /// Page to show (1-based).
    #[arg(short, long, default_value_t = 1)]
    page: u32,

    /// Rows per page; must be one of the configured options.
    #[arg(long)]
    page_size: Option<u32>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit.
    #[arg(long)]
    check: bool,
}

fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn print_page(page: &PageSnapshot<serde_json::Value>) {
    for row in &page.rows {
        println!("{}", row);
    }

    if page.total_items == 0 {
        println!("No rows match.");
        return;
    }

    println!(
        "Rows {}–{} of {} · page {}/{} · {} per page",
        page.start_index + 1,
        page.end_index,
        page.total_items,
        page.current_page,
        page.total_pages,
        page.items_per_page
    );

    let window: Vec<String> = page
        .page_window
        .iter()
        .map(|label| match label.page() {
            Some(n) if n == page.current_page => format!("[{}]", n),
            _ => label.to_string(),
        })
        .collect();
    println!("{}", window.join(" "));
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config_exists = config_path.exists();

    let mut config = if config_exists {
        match AppConfig::load(&config_path) {
            Ok(cfg) => {
                init_tracing(cli.log_level.as_deref().unwrap_or(&cfg.logging.level));
                info!("Configuration loaded from {}", config_path.display());
                cfg
            }
            Err(e) => {
                init_tracing("info");
                error!("Failed to load config from {}: {}", config_path.display(), e);
                if cli.check {
                    return Err(e.into());
                }
                error!("Using default configuration.");
                AppConfig::default()
            }
        }
    } else {
        let cfg = AppConfig::default();
        init_tracing(cli.log_level.as_deref().unwrap_or(&cfg.logging.level));
        cfg
    };

    // ── CLI overrides ──────────────────────────────────────────
    if let Some(size) = cli.page_size {
        info!("CLI override: items_per_page = {}", size);
        config.pagination.items_per_page = size;
    }
    config.pagination.initial_page = cli.page;

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        config.pagination.check()?;
        println!("✅ Configuration is valid");
        if config_exists {
            println!("   Config file    : {}", config_path.display());
        } else {
            println!("   Config file    : {} (missing, defaults)", config_path.display());
        }
        println!("   Page size      : {}", config.pagination.items_per_page);
        println!("   Page sizes     : {:?}", config.pagination.items_per_page_options);
        println!("   Database       : {}", config.database.url);
        println!("   Log level      : {}", config.logging.level);
        return Ok(());
    }

    // ── Query ──────────────────────────────────────────────────
    let rows_path = cli.rows.ok_or("--rows is required")?;
    let raw = std::fs::read_to_string(&rows_path)?;
    let backend = Arc::new(InMemoryBackend::from_json(&raw)?);
    info!("Loaded {} rows from {}", backend.len().await, rows_path.display());

    let filters = cli
        .filters
        .iter()
        .map(|f| FilterSpec::parse(f))
        .collect::<Result<Vec<_>, _>>()?;

    let mut controller =
        PaginationController::new(RemoteQueryFetcher::new(backend), config.pagination)?
            .with_filters(filters);
    if let Some(order) = cli.order.as_deref() {
        controller = controller.with_order(OrderSpec::parse(order)?);
    }

    controller.refresh().await?;
    let page = controller.snapshot().await;
    if page.current_page != cli.page {
        info!("Page {} does not exist, showing page {}", cli.page, page.current_page);
    }
    print_page(&page);

    controller.teardown();
    Ok(())
}
