mod details;
mod help;
pub mod table;

use crate::app::{App, View};
use ratatui::Frame;

/// Top-level render dispatch.
pub fn render(app: &App, frame: &mut Frame) {
    match app.view {
        View::Table => table::render(app, frame),
        View::Details => details::render(app, frame),
    }

    // Render help overlay on top if active
    if app.show_help {
        help::render(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogError, CatalogSource};
    use crate::config::Config;
    use crate::events;
    use crate::product::{Product, ProductId};
    use async_trait::async_trait;
    use ratatui::{Terminal, backend::TestBackend};
    use std::sync::Arc;

    struct EmptyCatalog;

    #[async_trait]
    impl CatalogSource for EmptyCatalog {
        async fn fetch_page(&self, _page: u32) -> Result<Vec<Product>, CatalogError> {
            Ok(Vec::new())
        }

        async fn fetch_one(&self, id: &ProductId) -> Result<Product, CatalogError> {
            Err(CatalogError::NotFound(id.clone()))
        }
    }

    fn screen_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    fn new_app() -> App {
        let (tx, _rx) = events::channel();
        App::new(Arc::new(EmptyCatalog), &Config::default(), tx)
    }

    #[tokio::test]
    async fn test_table_renders_rows_and_controls() {
        let mut app = new_app();
        let request = app.table.begin_fetch(app.table.query.clone());
        let rows = vec![Product {
            id: Some(ProductId::from(1)),
            name: "Mop".to_string(),
            category: "CLEANING & HOUSEHOLD".to_string(),
            price: 10.0,
            image: "https://cdn.example/mop.png".to_string(),
        }];
        app.table.finish_fetch(request.seq, &request.query, Ok(rows));

        let text = screen_text(&app);
        assert!(text.contains("Mop"));
        assert!(text.contains("$10.00"));
        assert!(text.contains("All Categories"));
        assert!(text.contains("Sort By Price"));
    }

    #[tokio::test]
    async fn test_loading_indicator() {
        let mut app = new_app();
        app.table.begin_fetch(app.table.query.clone());
        assert!(screen_text(&app).contains("Loading..."));
    }

    #[tokio::test]
    async fn test_details_not_found_and_help() {
        let (tx, mut rx) = events::channel();
        let mut app = App::new(Arc::new(EmptyCatalog), &Config::default(), tx);
        app.table.products = vec![Product {
            id: Some(ProductId::from(404)),
            name: "Ghost".to_string(),
            category: String::new(),
            price: 0.0,
            image: String::new(),
        }];

        app.open_details();
        assert!(screen_text(&app).contains("Loading product 404"));

        let event = rx.recv().await.unwrap();
        app.handle_event(event);
        assert!(screen_text(&app).contains("Product 404 was not found"));

        app.show_help = true;
        assert!(screen_text(&app).contains("Keybindings"));
    }
}
