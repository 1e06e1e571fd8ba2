//! REST implementation of the remote-system port.

use super::{
    CatalogQuery, PaginatedCatalogLoader, RemoteRequest, RetryingHttpExecutor, TokenManager,
};
use crate::config::RemoteApiConfig;
use crate::remote::domain::{
    ExternalId, RemoteError, RemoteLawsuit, RemoteOffice, RemoteResult, RemoteTask,
    RemoteTaskSubtype, RemoteTaskType, RemoteUser, TaskLink, TaskPayload, TaskTypeCatalog,
    lenient_i64,
};
use crate::remote::ports::RemoteSystem;
use async_trait::async_trait;
use mockable::Clock;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

const LAWSUIT_ENDPOINT: &str = "/Lawsuits";
const TASK_ENDPOINT: &str = "/Tasks";
const OFFICE_ENDPOINT: &str = "/areas";
const USER_ENDPOINT: &str = "/Users";
const TASK_TYPE_ENDPOINT: &str = "/UpdateAppointmentTaskTypes";
const TASK_SUBTYPE_ENDPOINT: &str = "/UpdateAppointmentTaskSubtypes";
const CASE_FIELDS: &str = "id,identifierNumber,responsibleOfficeId";

/// Client for the remote case-management REST API.
pub struct RemoteSystemClient<C>
where
    C: Clock + Send + Sync,
{
    base_url: String,
    executor: Arc<RetryingHttpExecutor<C>>,
    loader: PaginatedCatalogLoader<C>,
    fallback_case_endpoint: String,
    page_size: usize,
}

impl<C> RemoteSystemClient<C>
where
    C: Clock + Send + Sync,
{
    /// Builds a client, its token manager, and its executor from settings.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Configuration`] when the HTTP client cannot be
    /// built.
    pub fn from_config(config: &RemoteApiConfig, clock: Arc<C>) -> RemoteResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("casebridge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| RemoteError::Configuration(err.to_string()))?;
        let tokens = Arc::new(TokenManager::new(http.clone(), config, clock));
        let executor = Arc::new(RetryingHttpExecutor::new(http, tokens, config.retry));
        Ok(Self::with_executor(config, executor))
    }

    /// Creates a client around an existing executor.
    #[must_use]
    pub fn with_executor(
        config: &RemoteApiConfig,
        executor: Arc<RetryingHttpExecutor<C>>,
    ) -> Self {
        let base_url = config.normalized_base_url().to_owned();
        Self {
            loader: PaginatedCatalogLoader::new(Arc::clone(&executor), base_url.clone()),
            base_url,
            executor,
            fallback_case_endpoint: config.fallback_case_endpoint.clone(),
            page_size: usize::try_from(config.page_size).unwrap_or(usize::MAX),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn find_case_in(
        &self,
        endpoint: &str,
        identifier: &str,
    ) -> RemoteResult<Option<RemoteLawsuit>> {
        let filter = format!("identifierNumber eq '{}'", identifier.replace('\'', "''"));
        let request = RemoteRequest::get(self.url(endpoint))
            .with_param("$filter", filter)
            .with_param("$select", CASE_FIELDS)
            .with_param("$top", "1");
        let page: Value = self.executor.execute(&request).await?.json()?;
        let Some(first) = page
            .get("value")
            .and_then(Value::as_array)
            .and_then(|records| records.first())
        else {
            return Ok(None);
        };
        match serde_json::from_value(first.clone()) {
            Ok(lawsuit) => Ok(Some(lawsuit)),
            Err(err) => {
                warn!(
                    endpoint,
                    identifier,
                    error = %err,
                    "case record is unusable; treating as not found"
                );
                Ok(None)
            }
        }
    }

    async fn load_records<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: CatalogQuery,
    ) -> RemoteResult<Vec<T>> {
        let raw = self
            .loader
            .load_all(endpoint, &query.top(self.page_size))
            .await?;
        Ok(decode_records(endpoint, raw))
    }
}

fn decode_records<T: DeserializeOwned>(endpoint: &str, raw: Vec<Value>) -> Vec<T> {
    raw.into_iter()
        .filter_map(|record| match serde_json::from_value(record) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                warn!(endpoint, error = %err, "skipping malformed catalog record");
                None
            }
        })
        .collect()
}

/// Keeps subtypes whose parent type is listed, logging the rest.
fn join_task_types(
    types: Vec<RemoteTaskType>,
    subtypes: Vec<RemoteTaskSubtype>,
) -> TaskTypeCatalog {
    let type_ids: HashSet<ExternalId> = types.iter().map(|task_type| task_type.id).collect();
    let (kept, orphans): (Vec<_>, Vec<_>) = subtypes.into_iter().partition(|subtype| {
        subtype
            .parent_type_id
            .is_some_and(|parent| type_ids.contains(&parent))
    });
    for orphan in &orphans {
        warn!(
            subtype_id = %orphan.id,
            parent_type_id = ?orphan.parent_type_id.map(ExternalId::value),
            "task subtype references an unknown task type; skipping"
        );
    }
    TaskTypeCatalog {
        types,
        subtypes: kept,
    }
}

#[async_trait]
impl<C> RemoteSystem for RemoteSystemClient<C>
where
    C: Clock + Send + Sync + 'static,
{
    async fn search_case(&self, identifier: &str) -> RemoteResult<Option<RemoteLawsuit>> {
        for endpoint in [LAWSUIT_ENDPOINT, self.fallback_case_endpoint.as_str()] {
            if let Some(lawsuit) = self.find_case_in(endpoint, identifier).await? {
                debug!(identifier, endpoint, lawsuit_id = %lawsuit.id, "case found");
                return Ok(Some(lawsuit));
            }
        }
        info!(identifier, "case not found in any collection");
        Ok(None)
    }

    async fn create_task(&self, payload: &TaskPayload) -> RemoteResult<RemoteTask> {
        let body =
            serde_json::to_value(payload).map_err(|err| RemoteError::Decode(err.to_string()))?;
        let response = self
            .executor
            .execute(&RemoteRequest::post(self.url(TASK_ENDPOINT), body))
            .await?;
        let created: Value = response
            .json()
            .map_err(|err| RemoteError::TaskCreation(err.to_string()))?;
        let id = created
            .get("id")
            .and_then(lenient_i64)
            .ok_or_else(|| {
                RemoteError::TaskCreation("response did not carry a task id".to_owned())
            })?;
        info!(task_id = id, "remote task created");
        Ok(RemoteTask {
            id: ExternalId::new(id),
        })
    }

    async fn link_task(&self, task_id: ExternalId, link: &TaskLink) -> bool {
        let body = match serde_json::to_value(link) {
            Ok(body) => body,
            Err(err) => {
                warn!(%task_id, error = %err, "could not encode task link");
                return false;
            }
        };
        let url = self.url(&format!("/tasks/{task_id}/relationships"));
        match self.executor.execute(&RemoteRequest::post(url, body)).await {
            Ok(_) => {
                debug!(%task_id, link_id = %link.link_id, "task linked");
                true
            }
            Err(err) => {
                warn!(%task_id, link_id = %link.link_id, error = %err, "task link failed");
                false
            }
        }
    }

    async fn list_offices(&self) -> RemoteResult<Vec<RemoteOffice>> {
        let query = CatalogQuery::new()
            .select("id,name,path,allocateData")
            .order_by("id");
        let offices: Vec<RemoteOffice> = self.load_records(OFFICE_ENDPOINT, query).await?;
        Ok(offices
            .into_iter()
            .filter(|office| office.allocate_data)
            .collect())
    }

    async fn list_users(&self) -> RemoteResult<Vec<RemoteUser>> {
        let query = CatalogQuery::new()
            .select("id,name,email,isActive")
            .order_by("id");
        self.load_records(USER_ENDPOINT, query).await
    }

    async fn list_task_types(&self) -> RemoteResult<TaskTypeCatalog> {
        let type_query = CatalogQuery::new()
            .filter("isTaskType eq true")
            .select("id,name")
            .order_by("id");
        let subtype_query = CatalogQuery::new()
            .select("id,name,parentTypeId")
            .order_by("id");
        let types = self.load_records(TASK_TYPE_ENDPOINT, type_query).await?;
        let subtypes = self
            .load_records(TASK_SUBTYPE_ENDPOINT, subtype_query)
            .await?;
        Ok(join_task_types(types, subtypes))
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_records, join_task_types};
    use crate::remote::domain::{ExternalId, RemoteTaskSubtype, RemoteTaskType, RemoteUser};
    use rstest::rstest;
    use serde_json::json;

    fn task_type(id: i64) -> RemoteTaskType {
        RemoteTaskType {
            id: ExternalId::new(id),
            name: format!("type {id}"),
        }
    }

    fn subtype(id: i64, parent: Option<i64>) -> RemoteTaskSubtype {
        RemoteTaskSubtype {
            id: ExternalId::new(id),
            name: format!("subtype {id}"),
            parent_type_id: parent.map(ExternalId::new),
        }
    }

    #[rstest]
    fn join_drops_subtypes_without_a_listed_parent() {
        let catalog = join_task_types(
            vec![task_type(26)],
            vec![subtype(1132, Some(26)), subtype(7, Some(99)), subtype(8, None)],
        );

        let kept: Vec<i64> = catalog.subtypes.iter().map(|s| s.id.value()).collect();
        assert_eq!(kept, vec![1132]);
        assert_eq!(catalog.subtypes_of(ExternalId::new(26)).count(), 1);
    }

    #[rstest]
    fn decode_skips_malformed_records() {
        let users: Vec<RemoteUser> = decode_records(
            "/Users",
            vec![
                json!({"id": 1, "name": "Ana", "isActive": true}),
                json!({"id": "not-a-number"}),
                json!({"id": "2", "name": "Bruno"}),
            ],
        );

        let ids: Vec<i64> = users.iter().map(|user| user.id.value()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(users.iter().all(|user| user.is_active));
    }
}
