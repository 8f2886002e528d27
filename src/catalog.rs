use crate::product::{Product, ProductId, raw_json_to_product};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Failures talking to the catalog API.
///
/// `NotFound` is the only variant that means "the request worked but the
/// product does not exist"; everything else is a fetch failure.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Product {0} not found")]
    NotFound(ProductId),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Catalog API error: HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Could not decode catalog response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid catalog URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl CatalogError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound(_))
    }

    /// Short message for the status line.
    pub fn user_message(&self) -> String {
        match self {
            CatalogError::NotFound(id) => format!("No product with id {}", id),
            CatalogError::Http(e) if e.is_timeout() => "Catalog request timed out".to_string(),
            CatalogError::Http(e) if e.is_connect() => "Could not reach the catalog".to_string(),
            CatalogError::Http(e) => format!("Network error: {}", e),
            CatalogError::Status { status, .. } => format!("Catalog API returned HTTP {}", status),
            CatalogError::Decode(_) => "Catalog sent data in an unexpected format".to_string(),
            CatalogError::InvalidUrl(e) => format!("Invalid catalog URL: {}", e),
        }
    }
}

/// Read access to the product catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// One page of products, unfiltered and in API order.
    async fn fetch_page(&self, page: u32) -> Result<Vec<Product>, CatalogError>;

    async fn fetch_one(&self, id: &ProductId) -> Result<Product, CatalogError>;
}

/// The two envelope shapes seen from catalog deployments.
#[derive(Deserialize)]
#[serde(untagged)]
enum PageEnvelope {
    Bare(Vec<Value>),
    Wrapped { products: Vec<Value> },
}

/// Decode a page body, accepting either a bare array or `{"products": [...]}`.
///
/// Rows that are not JSON objects are skipped; the rest of the page is kept.
pub fn decode_page(body: &[u8]) -> Result<Vec<Product>, CatalogError> {
    let rows = match serde_json::from_slice::<PageEnvelope>(body)? {
        PageEnvelope::Bare(rows) | PageEnvelope::Wrapped { products: rows } => rows,
    };
    let products = rows
        .into_iter()
        .filter_map(|row| match raw_json_to_product(row) {
            Ok(product) => Some(product),
            Err(e) => {
                debug!(error = %e, "skipping malformed catalog row");
                None
            }
        })
        .collect();
    Ok(products)
}

/// Decode a single-product body. A `null` body or an object without an
/// identifier counts as not found.
pub fn decode_product(id: &ProductId, body: &[u8]) -> Result<Product, CatalogError> {
    let value: Value = serde_json::from_slice(body)?;
    if value.is_null() {
        return Err(CatalogError::NotFound(id.clone()));
    }
    let product = raw_json_to_product(value)?;
    if product.id.is_none() {
        return Err(CatalogError::NotFound(id.clone()));
    }
    Ok(product)
}

/// HTTP client for `{base}/products` and `{base}/products/{id}`.
#[derive(Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base: Url,
}

impl CatalogClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CatalogError> {
        let base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(CatalogError::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("catalog-browser/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, base })
    }

    fn products_url(&self) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("products");
        }
        url
    }

    pub fn page_url(&self, page: u32) -> Url {
        let mut url = self.products_url();
        url.query_pairs_mut().append_pair("page", &page.to_string());
        url
    }

    pub fn product_url(&self, id: &ProductId) -> Url {
        let mut url = self.products_url();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(id.as_str());
        }
        url
    }
}

#[async_trait]
impl CatalogSource for CatalogClient {
    async fn fetch_page(&self, page: u32) -> Result<Vec<Product>, CatalogError> {
        let url = self.page_url(page);
        debug!(%url, page, "fetching catalog page");

        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.bytes().await?;
        let products = decode_page(&body)?;
        debug!(page, rows = products.len(), "catalog page decoded");
        Ok(products)
    }

    async fn fetch_one(&self, id: &ProductId) -> Result<Product, CatalogError> {
        // An empty segment would address the list endpoint instead.
        if id.as_str().trim().is_empty() {
            return Err(CatalogError::NotFound(id.clone()));
        }
        let url = self.product_url(id);
        debug!(%url, %id, "fetching product");

        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(id.clone()));
        }
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.bytes().await?;
        decode_product(id, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;
    use axum::Router;
    use axum::extract::{Path, Query};
    use axum::http::StatusCode as AxumStatus;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use serde_json::json;
    use std::collections::HashMap;

    fn client(base: &str) -> CatalogClient {
        CatalogClient::new(base, Duration::from_secs(5)).unwrap()
    }

    /// Serve `router` on an ephemeral port and return its `/cms` base URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/cms", addr)
    }

    async fn page_handler(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
        let page = params.get("page").cloned().unwrap_or_default();
        Json(json!({
            "products": [
                { "id": 1, "name": format!("Mop p{}", page), "category": "A", "price": 10 },
                { "id": null, "name": "bad" }
            ]
        }))
    }

    async fn product_handler(Path(id): Path<String>) -> axum::response::Response {
        match id.as_str() {
            "1" => Json(json!({ "id": 1, "name": "Mop", "main_category": "A", "compare_price": 10 }))
                .into_response(),
            "boom" => (AxumStatus::INTERNAL_SERVER_ERROR, "boom").into_response(),
            "null" => Json(Value::Null).into_response(),
            _ => (AxumStatus::NOT_FOUND, "no such product").into_response(),
        }
    }

    fn catalog_router() -> Router {
        Router::new()
            .route("/cms/products", get(page_handler))
            .route("/cms/products/:id", get(product_handler))
    }

    #[test]
    fn test_urls() {
        let c = client("https://catalog.example/cms");
        assert_eq!(
            c.page_url(3).as_str(),
            "https://catalog.example/cms/products?page=3"
        );
        assert_eq!(
            c.product_url(&ProductId::from(42)).as_str(),
            "https://catalog.example/cms/products/42"
        );

        let c = client("https://catalog.example/cms/");
        assert_eq!(
            c.page_url(1).as_str(),
            "https://catalog.example/cms/products?page=1"
        );
    }

    #[test]
    fn test_product_url_escapes_id() {
        let c = client("https://catalog.example/cms");
        let url = c.product_url(&ProductId::new("a/b c"));
        assert_eq!(url.as_str(), "https://catalog.example/cms/products/a%2Fb%20c");
    }

    #[test]
    fn test_rejects_non_base_url() {
        assert!(CatalogClient::new("mailto:someone@example.com", Duration::from_secs(1)).is_err());
        assert!(CatalogClient::new("not a url", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_decode_page_both_envelopes() {
        let bare = br#"[{"id": 1, "name": "Mop", "price": 2}]"#;
        let wrapped = br#"{"products": [{"id": 1, "name": "Mop", "price": 2}]}"#;
        let a = decode_page(bare).unwrap();
        let b = decode_page(wrapped).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn test_decode_page_skips_non_object_rows() {
        let body = br#"[{"id": 1, "name": "Mop", "price": 10}, null, "junk", {"id": 2, "name": "Broom", "price": 5}]"#;
        let products = decode_page(body).unwrap();
        let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Mop", "Broom"]);

        let wrapped = br#"{"products": [null, {"id": 3, "name": "Bucket"}]}"#;
        assert_eq!(decode_page(wrapped).unwrap().len(), 1);
    }

    #[test]
    fn test_decode_page_rejects_unknown_shape() {
        let err = decode_page(br#"{"items": []}"#).unwrap_err();
        assert!(matches!(err, CatalogError::Decode(_)));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_decode_product_null_is_not_found() {
        let id = ProductId::from(5);
        assert!(decode_product(&id, b"null").unwrap_err().is_not_found());
        assert!(decode_product(&id, b"{}").unwrap_err().is_not_found());
        assert!(decode_product(&id, br#"{"id": 5}"#).is_ok());
    }

    #[test]
    fn test_user_messages() {
        let err = CatalogError::Status {
            status: 503,
            url: "https://catalog.example/cms/products?page=1".to_string(),
        };
        assert!(err.user_message().contains("503"));
        let err = CatalogError::NotFound(ProductId::from(9));
        assert_eq!(err.user_message(), "No product with id 9");
    }

    #[tokio::test]
    async fn test_fetch_page_sends_page_number() {
        let base = serve(catalog_router()).await;
        let products = client(&base).fetch_page(4).await.unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].name, "Mop p4");
        assert!(products[1].id.is_none());
    }

    #[tokio::test]
    async fn test_fetch_one_outcomes() {
        let base = serve(catalog_router()).await;
        let c = client(&base);

        let p = c.fetch_one(&ProductId::from(1)).await.unwrap();
        assert_eq!(p.category, "A");
        assert_eq!(p.price, 10.0);

        let err = c.fetch_one(&ProductId::from(999)).await.unwrap_err();
        assert!(err.is_not_found());

        let err = c.fetch_one(&ProductId::new("null")).await.unwrap_err();
        assert!(err.is_not_found());

        let err = c.fetch_one(&ProductId::new("boom")).await.unwrap_err();
        assert!(matches!(err, CatalogError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_fetch_one_blank_id_is_not_found() {
        // Nothing listens here; a blank id must not reach the network.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let c = client(&format!("http://{}/cms", addr));

        assert!(c.fetch_one(&ProductId::new("")).await.unwrap_err().is_not_found());
        assert!(c.fetch_one(&ProductId::new("  ")).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_fetch_page_server_error() {
        let router = Router::new().route(
            "/cms/products",
            get(|| async { (AxumStatus::BAD_GATEWAY, "upstream down") }),
        );
        let base = serve(router).await;
        let err = client(&base).fetch_page(1).await.unwrap_err();
        assert!(matches!(err, CatalogError::Status { status: 502, .. }));
    }

    #[tokio::test]
    async fn test_fetch_page_connection_refused() {
        // Bind then drop to get a port nobody listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(&format!("http://{}/cms", addr))
            .fetch_page(1)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Http(_)));
    }
}
