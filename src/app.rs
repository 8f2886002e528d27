use crate::catalog::{CatalogError, CatalogSource};
use crate::config::Config;
use crate::debounce::Debouncer;
use crate::events::{AppEvent, EventSender};
use crate::product::{Product, ProductId};
use crate::query::{self, QueryState};
use chrono::{DateTime, Local};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Which view is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Table,
    Details,
}

/// Input mode for the search bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Table view load cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Displaying,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailsState {
    Loading,
    Loaded(Product),
    NotFound,
    Failed(String),
}

/// A page fetch that has been started but not yet applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub seq: u64,
    pub query: QueryState,
}

/// Rows, query and load state behind the table view.
#[derive(Debug)]
pub struct TableView {
    pub query: QueryState,
    pub products: Vec<Product>,
    pub load_state: LoadState,
    pub selected: usize,
    pub last_error: Option<String>,
    pub updated_at: Option<DateTime<Local>>,
    latest_seq: u64,
}

impl Default for TableView {
    fn default() -> Self {
        Self {
            query: QueryState::default(),
            products: Vec::new(),
            load_state: LoadState::Idle,
            selected: 0,
            last_error: None,
            updated_at: None,
            latest_seq: 0,
        }
    }
}

impl TableView {
    /// Enter `Loading` for `query` and hand out the sequence number that
    /// its completion has to present.
    pub fn begin_fetch(&mut self, query: QueryState) -> PageRequest {
        self.latest_seq += 1;
        self.load_state = LoadState::Loading;
        PageRequest {
            seq: self.latest_seq,
            query,
        }
    }

    /// Apply a finished fetch. Returns `false` when the response belongs to
    /// a superseded request and was ignored.
    pub fn finish_fetch(
        &mut self,
        seq: u64,
        query: &QueryState,
        result: Result<Vec<Product>, CatalogError>,
    ) -> bool {
        if seq != self.latest_seq {
            debug!(seq, latest = self.latest_seq, "dropping stale page response");
            return false;
        }

        self.load_state = LoadState::Displaying;
        match result {
            Ok(page) => {
                self.products = query::apply(page, query);
                self.selected = 0;
                self.last_error = None;
                self.updated_at = Some(Local::now());
            }
            Err(e) => {
                warn!(page = query.page, error = %e, "failed to load catalog page");
                self.last_error = Some(e.user_message());
            }
        }
        true
    }

    pub fn is_loading(&self) -> bool {
        self.load_state == LoadState::Loading
    }

    pub fn selected_product(&self) -> Option<&Product> {
        self.products.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.products.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.products.len().saturating_sub(1);
    }
}

/// The product shown by the details view.
#[derive(Debug)]
pub struct DetailsView {
    pub id: ProductId,
    pub state: DetailsState,
    seq: u64,
}

/// Main application state.
pub struct App {
    catalog: Arc<dyn CatalogSource>,
    events: EventSender,
    debouncer: Debouncer<QueryState>,
    pub categories: Vec<String>,

    pub should_quit: bool,
    pub view: View,
    pub show_help: bool,
    pub input_mode: InputMode,

    pub table: TableView,
    pub details: Option<DetailsView>,
    details_seq: u64,

    // Drives the loading spinner
    pub tick: usize,
    pub status_msg: String,
}

impl App {
    pub fn new(catalog: Arc<dyn CatalogSource>, config: &Config, events: EventSender) -> Self {
        let tx = events.clone();
        let debouncer = Debouncer::new(config.debounce(), move |query: QueryState| {
            let _ = tx.send(AppEvent::QueryReady(query));
        });

        Self {
            catalog,
            events,
            debouncer,
            categories: config.categories.clone(),

            should_quit: false,
            view: View::Table,
            show_help: false,
            input_mode: InputMode::Normal,

            table: TableView::default(),
            details: None,
            details_seq: 0,

            tick: 0,
            status_msg: "Connecting to catalog...".to_string(),
        }
    }

    /// Initial fetch for the table view.
    pub fn mount(&mut self) {
        let query = self.table.query.clone();
        self.start_page_fetch(query);
    }

    pub fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    pub fn has_pending_query(&self) -> bool {
        self.debouncer.is_pending()
    }

    // ── Query controls ──

    /// Replace the query and schedule a debounced fetch if it changed.
    pub fn update_query(&mut self, query: QueryState) {
        if query == self.table.query {
            return;
        }
        self.table.query = query.clone();
        self.debouncer.call(query);
    }

    pub fn push_search_char(&mut self, c: char) {
        let mut search = self.table.query.search.clone();
        search.push(c);
        self.update_query(self.table.query.with_search(search));
    }

    pub fn pop_search_char(&mut self) {
        let mut search = self.table.query.search.clone();
        if search.pop().is_some() {
            self.update_query(self.table.query.with_search(search));
        }
    }

    pub fn clear_search(&mut self) {
        self.update_query(self.table.query.with_search(""));
    }

    /// Step through "all categories" followed by the configured list.
    pub fn cycle_category(&mut self) {
        let current = &self.table.query.category;
        let next = if current.is_empty() {
            self.categories.first().cloned().unwrap_or_default()
        } else {
            match self.categories.iter().position(|c| c == current) {
                Some(i) => self.categories.get(i + 1).cloned().unwrap_or_default(),
                None => String::new(),
            }
        };
        self.update_query(self.table.query.with_category(next));
    }

    pub fn cycle_sort(&mut self) {
        let sort = self.table.query.sort.next();
        self.update_query(self.table.query.with_sort(sort));
    }

    pub fn next_page(&mut self) {
        let page = self.table.query.page.saturating_add(1);
        self.update_query(self.table.query.with_page(page));
    }

    pub fn prev_page(&mut self) {
        let page = self.table.query.page.saturating_sub(1);
        self.update_query(self.table.query.with_page(page));
    }

    /// Fetch the current query right away, skipping the debounce window.
    pub fn refresh(&mut self) {
        self.debouncer.cancel();
        let query = self.table.query.clone();
        self.start_page_fetch(query);
    }

    // ── Fetching ──

    fn start_page_fetch(&mut self, query: QueryState) {
        let PageRequest { seq, query } = self.table.begin_fetch(query);
        self.status_msg = format!("Loading page {}...", query.page);

        let catalog = Arc::clone(&self.catalog);
        let tx = self.events.clone();
        tokio::spawn(async move {
            let result = catalog.fetch_page(query.page).await;
            let _ = tx.send(AppEvent::PageLoaded { seq, query, result });
        });
    }

    fn start_details_fetch(&mut self, id: ProductId) {
        self.details_seq += 1;
        let seq = self.details_seq;
        self.details = Some(DetailsView {
            id: id.clone(),
            state: DetailsState::Loading,
            seq,
        });

        let catalog = Arc::clone(&self.catalog);
        let tx = self.events.clone();
        tokio::spawn(async move {
            let result = catalog.fetch_one(&id).await;
            let _ = tx.send(AppEvent::ProductLoaded { seq, id, result });
        });
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::QueryReady(query) => {
                self.start_page_fetch(query);
            }
            AppEvent::PageLoaded { seq, query, result } => {
                if self.table.finish_fetch(seq, &query, result) {
                    self.status_msg = match &self.table.last_error {
                        Some(msg) => msg.clone(),
                        None => format!(
                            "{} products on page {}",
                            self.table.products.len(),
                            query.page
                        ),
                    };
                }
            }
            AppEvent::ProductLoaded { seq, id, result } => {
                let Some(details) = self.details.as_mut().filter(|d| d.seq == seq) else {
                    debug!(seq, %id, "dropping stale product response");
                    return;
                };
                details.state = match result {
                    Ok(product) => DetailsState::Loaded(product),
                    Err(e) if e.is_not_found() => {
                        info!(%id, "product not found");
                        DetailsState::NotFound
                    }
                    Err(e) => {
                        warn!(%id, error = %e, "failed to load product");
                        DetailsState::Failed(e.user_message())
                    }
                };
            }
        }
    }

    // ── Navigation ──

    /// Open the details view for the selected row.
    pub fn open_details(&mut self) {
        let Some(id) = self.table.selected_product().and_then(|p| p.id.clone()) else {
            return;
        };
        self.start_details_fetch(id);
        self.view = View::Details;
    }

    pub fn close_details(&mut self) {
        self.details = None;
        self.view = View::Table;
    }

    /// Image URL of the loaded product, if there is one.
    pub fn details_image(&self) -> Option<&str> {
        match &self.details.as_ref()?.state {
            DetailsState::Loaded(p) if !p.image.is_empty() => Some(p.image.as_str()),
            _ => None,
        }
    }
}
