//! Tracked resources and cleanup failures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a tracked resource gets deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletionMethod {
    /// HTTP request against the API
    Api,
    /// Browser-driven deletion supplied by the caller
    Ui,
}

impl fmt::Display for DeletionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api => write!(f, "api"),
            Self::Ui => write!(f, "ui"),
        }
    }
}

/// HTTP verb for API requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpVerb {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    #[default]
    Delete,
}

impl HttpVerb {
    /// Upper-case verb name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a tracked resource (`kind` + `id`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceKey {
    /// Resource kind
    pub kind: String,
    /// Resource identifier
    pub id: String,
}

impl ResourceKey {
    /// Create a key
    #[must_use]
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// A real object created in the system under test, registered for teardown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedResource {
    /// Resource kind, e.g. `deck` or `card`
    pub kind: String,
    /// Identifier in the system under test
    pub id: String,
    /// Human-readable name for reports
    pub name: String,
    /// Deletion strategy
    pub method: DeletionMethod,
    /// Path the deletion request is sent to (API deletions)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Verb for the deletion request, `DELETE` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verb: Option<HttpVerb>,
    /// Project that created the resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Resource this one lives inside; it is deleted before its parent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ResourceKey>,
    /// When the resource was registered
    pub created_at: DateTime<Utc>,
}

impl TrackedResource {
    /// A resource deleted with an API request to `path`
    #[must_use]
    pub fn api(
        kind: impl Into<String>,
        id: impl Into<String>,
        name: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
            name: name.into(),
            method: DeletionMethod::Api,
            path: Some(path.into()),
            verb: None,
            project: None,
            parent: None,
            created_at: Utc::now(),
        }
    }

    /// A resource deleted through the browser
    #[must_use]
    pub fn ui(kind: impl Into<String>, id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
            name: name.into(),
            method: DeletionMethod::Ui,
            path: None,
            verb: None,
            project: None,
            parent: None,
            created_at: Utc::now(),
        }
    }

    /// Use a verb other than `DELETE`
    #[must_use]
    pub const fn with_verb(mut self, verb: HttpVerb) -> Self {
        self.verb = Some(verb);
        self
    }

    /// Tag the owning project
    #[must_use]
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Declare the resource this one depends on
    #[must_use]
    pub fn with_parent(mut self, parent: ResourceKey) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Verb used for API deletion
    #[must_use]
    pub fn deletion_verb(&self) -> HttpVerb {
        self.verb.unwrap_or_default()
    }

    /// Identity of this resource
    #[must_use]
    pub fn key(&self) -> ResourceKey {
        ResourceKey::new(&self.kind, &self.id)
    }

    /// One-line description for logs and reports
    #[must_use]
    pub fn describe(&self) -> String {
        let target = match (self.method, self.path.as_deref()) {
            (DeletionMethod::Api, Some(path)) => format!("api {} {path}", self.deletion_verb()),
            (DeletionMethod::Api, None) => "api <no path>".to_string(),
            (DeletionMethod::Ui, _) => "ui".to_string(),
        };
        format!("[{}] {} \"{}\" ({target})", self.kind, self.id, self.name)
    }
}

/// A resource whose deletion failed on every attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedCleanup {
    /// The resource that was not deleted
    pub resource: TrackedResource,
    /// Error from the final attempt
    pub error: String,
    /// Attempts made
    pub attempts: u32,
    /// When the final attempt failed
    pub failed_at: DateTime<Utc>,
}

impl FailedCleanup {
    /// Error form of this failure
    #[must_use]
    pub fn to_error(&self) -> crate::result::WardenError {
        crate::result::WardenError::CleanupDeleteFailed {
            kind: self.resource.kind.clone(),
            id: self.resource.id.clone(),
            attempts: self.attempts,
            message: self.error.clone(),
        }
    }
}
