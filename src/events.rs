use crate::catalog::CatalogError;
use crate::product::{Product, ProductId};
use crate::query::QueryState;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Messages delivered to the UI loop from timers and fetch tasks.
#[derive(Debug)]
pub enum AppEvent {
    /// The debounce window closed; fetch for this query.
    QueryReady(QueryState),

    /// A page fetch finished. `seq` identifies the request that produced it.
    PageLoaded {
        seq: u64,
        query: QueryState,
        result: Result<Vec<Product>, CatalogError>,
    },

    /// A single-product fetch finished.
    ProductLoaded {
        seq: u64,
        id: ProductId,
        result: Result<Product, CatalogError>,
    },
}

pub type EventSender = UnboundedSender<AppEvent>;
pub type EventReceiver = UnboundedReceiver<AppEvent>;

pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}
