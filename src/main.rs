mod app;
mod catalog;
mod config;
mod debounce;
mod events;
mod product;
mod query;
mod report;
mod ui;

use app::{App, InputMode, View};
use catalog::{CatalogClient, CatalogSource};
use clap::{Parser, Subcommand};
use config::Config;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use events::EventReceiver;
use product::ProductId;
use query::{QueryState, SortOrder};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Browse a remote product catalog from the terminal
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Catalog API base URL (`/products` is appended)
    #[arg(long, env = "CATALOG_API_URL", global = true)]
    api_url: Option<String>,

    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Where the interactive browser writes its log
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive browser (default)
    Browse,
    /// Print one page of products
    List {
        /// 1-based page number
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        /// Keep products whose name contains this text (case-insensitive)
        #[arg(short, long)]
        search: Option<String>,
        /// Keep products in exactly this category
        #[arg(long)]
        category: Option<String>,
        /// Order by price: asc or desc
        #[arg(long, value_parser = parse_sort)]
        sort: Option<SortOrder>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print a single product
    Show {
        /// Product identifier
        #[arg(value_parser = parse_product_id)]
        id: ProductId,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn parse_product_id(s: &str) -> Result<ProductId, String> {
    let id = s.trim();
    if id.is_empty() {
        return Err("product id must not be empty".to_string());
    }
    Ok(ProductId::new(id))
}

fn parse_sort(s: &str) -> Result<SortOrder, String> {
    SortOrder::parse(s).ok_or_else(|| format!("expected `asc` or `desc`, got `{}`", s))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Browse);

    let config = Config::load(cli.config.as_deref(), cli.api_url)?;

    match command {
        Commands::List {
            page,
            search,
            category,
            sort,
            json,
        } => {
            init_tracing(cli.verbose, None)?;
            let client = CatalogClient::new(&config.api_base_url, config.request_timeout())?;
            let query = QueryState {
                page: page.max(1),
                search: search.unwrap_or_default(),
                category: category.unwrap_or_default(),
                sort: sort.unwrap_or_default(),
            };

            match client.fetch_page(query.page).await {
                Ok(rows) => {
                    let products = query::apply(rows, &query);
                    if json {
                        println!("{}", serde_json::to_string_pretty(&products)?);
                    } else {
                        print!("{}", report::format_table(&products));
                    }
                }
                Err(e) => {
                    error!(error = %e, page = query.page, "failed to load catalog page");
                    eprintln!("Error: {}", e.user_message());
                    std::process::exit(1);
                }
            }
        }
        Commands::Show { id, json } => {
            init_tracing(cli.verbose, None)?;
            let client = CatalogClient::new(&config.api_base_url, config.request_timeout())?;

            match client.fetch_one(&id).await {
                Ok(product) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&product)?);
                    } else {
                        print!("{}", report::format_product(&product));
                    }
                }
                Err(e) if e.is_not_found() => {
                    eprintln!("Error: product {} not found", id);
                    std::process::exit(1);
                }
                Err(e) => {
                    error!(error = %e, %id, "failed to load product");
                    eprintln!("Error: {}", e.user_message());
                    std::process::exit(1);
                }
            }
        }
        Commands::Browse => {
            let log_file = match cli.log_file {
                Some(path) => Some(path),
                None => default_log_path(),
            };
            init_tracing(cli.verbose, log_file.as_deref())?;
            info!(api = %config.api_base_url, "starting catalog browser");

            let client = CatalogClient::new(&config.api_base_url, config.request_timeout())?;
            let (tx, mut rx) = events::channel();
            let mut app = App::new(Arc::new(client), &config, tx);
            app.mount();

            // Init terminal
            let mut terminal = ratatui::init();

            // Main loop
            let result = run_app(&mut terminal, &mut app, &mut rx).await;

            // Restore terminal
            ratatui::restore();

            if let Err(e) = result {
                error!(error = %e, "browser exited with an error");
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// `<cache dir>/catalog-browser.log`, created on demand.
fn default_log_path() -> Option<PathBuf> {
    let dirs = directories::ProjectDirs::from("dev", "catalog", "catalog-browser")?;
    let cache_dir = dirs.cache_dir();
    std::fs::create_dir_all(cache_dir).ok()?;
    Some(cache_dir.join("catalog-browser.log"))
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` with `--verbose`.
/// With a log file the output is appended there, since the TUI owns the
/// terminal; without one it goes to stderr.
fn init_tracing(verbose: bool, log_file: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn"))
    });

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::registry()
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .with(filter)
                .try_init()?;
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
                .with(filter)
                .try_init()?;
        }
    }
    Ok(())
}

async fn run_app(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
    rx: &mut EventReceiver,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        // Apply timer and fetch results before drawing
        while let Ok(ev) = rx.try_recv() {
            app.handle_event(ev);
        }

        terminal.draw(|frame| ui::render(app, frame))?;

        if app.should_quit {
            return Ok(());
        }

        // Short poll keeps the spinner moving and fetch results flowing in
        if crossterm::event::poll(Duration::from_millis(80))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                handle_key(app, key);
            }
        } else {
            app.on_tick();
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Help toggle (global)
    if key.code == KeyCode::Char('?') && app.input_mode == InputMode::Normal {
        app.show_help = !app.show_help;
        return;
    }

    // If help is showing, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    // Ctrl+C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.input_mode == InputMode::Editing {
        handle_search_input(app, key);
        return;
    }
    match app.view {
        View::Table => handle_table_key(app, key),
        View::Details => handle_details_key(app, key),
    }
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            app.pop_search_char();
        }
        KeyCode::Char(c) => {
            app.push_search_char(c);
        }
        _ => {}
    }
}

fn handle_table_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
        }
        KeyCode::Char('/') => {
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.table.select_next();
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.table.select_prev();
        }
        KeyCode::Char('g') => {
            app.table.select_first();
        }
        KeyCode::Char('G') => {
            app.table.select_last();
        }
        KeyCode::Char('c') => {
            app.cycle_category();
        }
        KeyCode::Char('s') => {
            app.cycle_sort();
        }
        KeyCode::Char(']') | KeyCode::Right => {
            app.next_page();
        }
        KeyCode::Char('[') | KeyCode::Left => {
            app.prev_page();
        }
        KeyCode::Char('r') => {
            app.refresh();
        }
        KeyCode::Enter => {
            app.open_details();
        }
        KeyCode::Esc => {
            app.clear_search();
        }
        _ => {}
    }
}

fn handle_details_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            app.close_details();
        }
        KeyCode::Char('o') => {
            if let Some(link) = app.details_image() {
                let link = link.to_string();
                match std::process::Command::new("xdg-open").arg(&link).spawn() {
                    Ok(_) => app.status_msg = format!("Opening: {}", link),
                    Err(e) => {
                        info!(error = %e, "could not launch xdg-open");
                        app.status_msg = format!("Image: {} (no opener available)", link);
                    }
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_rejects_blank_id() {
        assert!(Cli::try_parse_from(["catalog-browser", "show", ""]).is_err());
        assert!(Cli::try_parse_from(["catalog-browser", "show", "   "]).is_err());
    }

    #[test]
    fn test_show_trims_id() {
        let cli = Cli::try_parse_from(["catalog-browser", "show", " 42 "]).unwrap();
        match cli.command {
            Some(Commands::Show { id, json }) => {
                assert_eq!(id, ProductId::from(42));
                assert!(!json);
            }
            _ => panic!("expected show"),
        }
    }

    #[test]
    fn test_list_sort_parser() {
        assert!(Cli::try_parse_from(["catalog-browser", "list", "--sort", "asc"]).is_ok());
        assert!(Cli::try_parse_from(["catalog-browser", "list", "--sort", "up"]).is_err());
    }
}
