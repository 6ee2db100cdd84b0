use super::{ResourceClient, check_page_request, endpoint, parse_json};
use crate::error::{Error, Result};
use crate::models::{Page, Product};
use crate::pagination;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

/// Client for the product catalog.
///
/// The upstream has no pagination, so every `list` downloads the whole
/// catalog and slices it here.
#[derive(Debug, Clone)]
pub struct ProductClient {
    http: reqwest::Client,
    base_url: String,
}

impl ProductClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// The entire catalog, in upstream order.
    pub async fn fetch_all(&self) -> Result<Vec<Product>> {
        let url = endpoint(&self.base_url, "/products");
        log::debug!("GET {}", url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        let data: serde_json::Value = parse_json(status, &text)?;
        if !data.is_array() {
            return Err(Error::UnexpectedResponse(
                "Unexpected products response".to_string(),
            ));
        }
        serde_json::from_value(data).map_err(|e| Error::UnexpectedResponse(e.to_string()))
    }
}

/// Cuts page `page` out of the full catalog. Totals describe the catalog, not
/// the slice.
pub fn paginate(all: Vec<Product>, limit: u32, page: u32) -> Page<Product> {
    let total_count = all.len() as u64;
    let (start, end) = pagination::slice_bounds(page, limit);
    let items = all
        .into_iter()
        .skip(start)
        .take(end - start)
        .collect();

    Page {
        items,
        current_page: page,
        total_pages: pagination::total_pages(total_count, limit),
        total_count,
        limit,
    }
}

#[async_trait]
impl ResourceClient for ProductClient {
    type Item = Product;

    async fn list(&self, limit: u32, page: u32) -> Result<Page<Product>> {
        check_page_request(limit, page)?;
        let all = self.fetch_all().await?;
        Ok(paginate(all, limit, page))
    }

    async fn get_by_id(&self, id: &str) -> Result<Product> {
        let id = id.trim();
        if id.is_empty() {
            return Err(Error::invalid("id", "Product id is required"));
        }

        let url = endpoint(&self.base_url, &format!("/products/{}", id));
        log::debug!("GET {}", url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        // Unknown ids come back as 200 with an empty body.
        if status.is_success() && text.trim().is_empty() {
            return Err(Error::Http {
                status: StatusCode::NOT_FOUND.as_u16(),
                message: format!("Product {} not found", id),
            });
        }
        parse_json(status, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(n: u64) -> Vec<Product> {
        (1..=n)
            .map(|id| Product {
                id,
                title: format!("Product {id}"),
                description: String::new(),
                price: 9.99,
                category: "misc".into(),
                rating: None,
                stock: None,
                image: None,
                images: Vec::new(),
            })
            .collect()
    }

    #[test]
    fn last_page_is_short() {
        let page = paginate(catalog(25), 10, 3);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_count, 25);
        assert_eq!(
            page.items.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![21, 22, 23, 24, 25]
        );
    }

    #[test]
    fn past_the_end_is_empty_but_keeps_totals() {
        let page = paginate(catalog(25), 10, 4);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn slices_never_exceed_limit() {
        let all = catalog(47);
        for limit in 1..12 {
            let pages = pagination::total_pages(47, limit);
            let mut seen = 0;
            for page in 1..=pages {
                let slice = paginate(all.clone(), limit, page);
                assert!(slice.items.len() <= limit as usize);
                let (start, _) = pagination::slice_bounds(page, limit);
                assert_eq!(slice.items.first().map(|p| p.id), Some(start as u64 + 1));
                seen += slice.items.len();
            }
            assert_eq!(seen, 47);
        }
    }

    #[tokio::test]
    async fn blank_id_never_hits_the_network() {
        // Nothing listens on port 9; a network attempt would be a Transport error.
        let client = ProductClient::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
        let err = client.get_by_id("  ").await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
