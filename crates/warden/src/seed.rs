//! Test-data seeding through the API.
//!
//! Everything the seeder creates is tracked for cleanup the moment the API
//! confirms it exists.

use crate::api::ApiContext;
use crate::resource::{HttpVerb, ResourceKey, TrackedResource};
use crate::result::{WardenError, WardenResult};
use crate::scope::TrackerHandle;
use serde_json::Value;
use tracing::debug;

/// Creates resources with POST requests and tracks them.
#[derive(Debug)]
pub struct ApiSeeder<'a, A: ?Sized> {
    api: &'a A,
    tracker: TrackerHandle,
    project: Option<String>,
}

impl<'a, A> ApiSeeder<'a, A>
where
    A: ApiContext + ?Sized,
{
    /// Seeder posting through `api` and tracking into `tracker`
    pub fn new(api: &'a A, tracker: TrackerHandle) -> Self {
        Self {
            api,
            tracker,
            project: None,
        }
    }

    /// Tag every seeded resource with a project
    #[must_use]
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// POST `body` to `collection` and track the created resource.
    ///
    /// The response must be a JSON object with an `id` (string or number).
    /// The resource is deleted later with `DELETE {collection}/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the API rejects it, or the
    /// response carries no id.
    pub async fn create(&self, kind: &str, collection: &str, body: Value) -> WardenResult<Value> {
        self.create_inner(kind, collection, body, None).await
    }

    /// Like [`ApiSeeder::create`] for a resource living inside `parent`.
    ///
    /// # Errors
    ///
    /// Same as [`ApiSeeder::create`].
    pub async fn create_child(
        &self,
        kind: &str,
        collection: &str,
        body: Value,
        parent: ResourceKey,
    ) -> WardenResult<Value> {
        self.create_inner(kind, collection, body, Some(parent)).await
    }

    async fn create_inner(
        &self,
        kind: &str,
        collection: &str,
        body: Value,
        parent: Option<ResourceKey>,
    ) -> WardenResult<Value> {
        let response = self
            .api
            .send(HttpVerb::Post, collection, Some(&body))
            .await?
            .error_for_status(HttpVerb::Post, collection)?;
        let created: Value = response.json()?;

        let id = created_id(&created).ok_or_else(|| WardenError::Api {
            verb: HttpVerb::Post.to_string(),
            path: collection.to_string(),
            status: response.status,
            body: "response has no id".to_string(),
        })?;
        let name = ["name", "title"]
            .iter()
            .find_map(|field| created.get(*field).and_then(Value::as_str))
            .unwrap_or(id.as_str())
            .to_string();

        let path = format!("{}/{id}", collection.trim_end_matches('/'));
        let mut resource = TrackedResource::api(kind, &id, name, path);
        if let Some(project) = &self.project {
            resource = resource.with_project(project);
        }
        if let Some(parent) = parent {
            resource = resource.with_parent(parent);
        }
        debug!(kind, %id, "seeded resource");
        self.tracker.track(resource);
        Ok(created)
    }
}

fn created_id(created: &Value) -> Option<String> {
    match created.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
