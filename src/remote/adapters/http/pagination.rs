//! Paginated collection walking.

use super::{RemoteRequest, RetryingHttpExecutor};
use crate::remote::domain::RemoteResult;
use mockable::Clock;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

const DEFAULT_PAGE_SIZE: usize = 30;

/// OData query options sent with every page of a catalog listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    select: Option<String>,
    filter: Option<String>,
    order_by: Option<String>,
    top: Option<usize>,
}

impl CatalogQuery {
    /// Creates a query without options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts returned fields (`$select`).
    #[must_use]
    pub fn select(mut self, fields: impl Into<String>) -> Self {
        self.select = Some(fields.into());
        self
    }

    /// Filters returned records (`$filter`).
    #[must_use]
    pub fn filter(mut self, expression: impl Into<String>) -> Self {
        self.filter = Some(expression.into());
        self
    }

    /// Orders returned records (`$orderby`).
    #[must_use]
    pub fn order_by(mut self, expression: impl Into<String>) -> Self {
        self.order_by = Some(expression.into());
        self
    }

    /// Sets the page size (`$top`).
    #[must_use]
    pub const fn top(mut self, page_size: usize) -> Self {
        self.top = Some(page_size);
        self
    }

    /// Returns the effective page size.
    #[must_use]
    pub fn page_size(&self) -> usize {
        self.top.filter(|size| *size > 0).unwrap_or(DEFAULT_PAGE_SIZE)
    }

    fn params_at(&self, skip: usize) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(6);
        if let Some(select) = &self.select {
            params.push(("$select".to_owned(), select.clone()));
        }
        if let Some(filter) = &self.filter {
            params.push(("$filter".to_owned(), filter.clone()));
        }
        if let Some(order_by) = &self.order_by {
            params.push(("$orderby".to_owned(), order_by.clone()));
        }
        params.push(("$top".to_owned(), self.page_size().to_string()));
        params.push(("$skip".to_owned(), skip.to_string()));
        params.push(("$count".to_owned(), "true".to_owned()));
        params
    }
}

/// Loads every record of a paginated collection.
///
/// Pages are followed through `@odata.nextLink` when the server provides one
/// and through `$skip` offsets otherwise. A page shorter than the page size
/// ends the walk.
pub struct PaginatedCatalogLoader<C>
where
    C: Clock + Send + Sync,
{
    executor: Arc<RetryingHttpExecutor<C>>,
    base_url: String,
}

impl<C> PaginatedCatalogLoader<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a loader resolving endpoints against `base_url`.
    #[must_use]
    pub fn new(executor: Arc<RetryingHttpExecutor<C>>, base_url: impl Into<String>) -> Self {
        Self {
            executor,
            base_url: base_url.into(),
        }
    }

    /// Returns every record of `endpoint`, in server order.
    ///
    /// A page failure mid-walk is logged and the records gathered so far are
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns [`crate::remote::domain::RemoteError::Auth`] when no bearer
    /// token can be obtained; the walk stops without a partial result.
    pub async fn load_all(
        &self,
        endpoint: &str,
        query: &CatalogQuery,
    ) -> RemoteResult<Vec<Value>> {
        let collection_url = format!("{}{endpoint}", self.base_url);
        let page_size = query.page_size();
        let mut records = Vec::new();
        let mut request = RemoteRequest::get(&collection_url).with_params(query.params_at(0));
        let mut first_page = true;

        loop {
            let page = match self.fetch_page(&request).await {
                Ok(page) => page,
                Err(err) if err.is_auth() => {
                    error!(endpoint, error = %err, "catalog listing aborted; no access token");
                    return Err(err);
                }
                Err(err) => {
                    error!(
                        endpoint,
                        loaded = records.len(),
                        error = %err,
                        "catalog page failed; returning partial result"
                    );
                    break;
                }
            };

            if first_page {
                log_server_count(endpoint, &page);
                first_page = false;
            }

            let items = page_items(&page);
            let fetched = items.len();
            records.extend(items);

            if let Some(next_link) = page.get("@odata.nextLink").and_then(Value::as_str) {
                if next_link == request.url() && request.query().is_empty() {
                    warn!(endpoint, next_link, "next link repeats the current page; stopping");
                    break;
                }
                request = RemoteRequest::get(next_link);
                continue;
            }
            if fetched < page_size {
                break;
            }
            request = RemoteRequest::get(&collection_url).with_params(query.params_at(records.len()));
        }

        info!(endpoint, total = records.len(), "catalog listing loaded");
        Ok(records)
    }

    async fn fetch_page(&self, request: &RemoteRequest) -> RemoteResult<Value> {
        self.executor.execute(request).await?.json::<Value>()
    }
}

fn log_server_count(endpoint: &str, page: &Value) {
    match page.get("@odata.count").and_then(Value::as_u64) {
        Some(count) => info!(endpoint, server_count = count, "catalog listing started"),
        None => info!(endpoint, "catalog listing started; server reported no count"),
    }
}

fn page_items(page: &Value) -> Vec<Value> {
    ["value", "items"]
        .iter()
        .find_map(|key| page.get(*key).and_then(Value::as_array))
        .cloned()
        .unwrap_or_default()
}
