use serde::Deserialize;

use super::CONFIG_BASE;
use crate::api::client::Client;
use crate::api::common::AppMessage;
use crate::api::error::ApiError;
use crate::enums::TaskStatus;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub ext_id: Option<String>,
    pub operation: Option<String>,
    pub operation_description: Option<String>,
    pub status: Option<TaskStatus>,
    pub progress_percentage: Option<i64>,
    pub created_time: Option<String>,
    pub started_time: Option<String>,
    pub completed_time: Option<String>,
    pub entities_affected: Option<Vec<EntityReference>>,
    pub error_messages: Option<Vec<AppMessage>>,
    pub completion_details: Option<Vec<KvPair>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityReference {
    pub ext_id: Option<String>,
    pub rel: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KvPair {
    pub name: Option<String>,
    pub value: Option<serde_json::Value>,
}

impl Task {
    /// First affected entity of the given kind, e.g. `clustermgmt:config:storage-containers`
    pub fn entity_ext_id(&self, rel: &str) -> Option<&str> {
        self.entities_affected
            .as_deref()?
            .iter()
            .find(|e| e.rel.as_deref() == Some(rel))
            .and_then(|e| e.ext_id.as_deref())
    }

    pub fn first_error_message(&self) -> Option<&str> {
        self.error_messages
            .as_deref()?
            .iter()
            .find_map(|m| m.message.as_deref())
    }
}

pub struct TasksApi<'a> {
    client: &'a Client,
}

impl<'a> TasksApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn get(&self, ext_id: &str) -> Result<Task, ApiError> {
        self.client
            .get(&format!("{}/tasks/{}", CONFIG_BASE, ext_id))
            .await
    }
}
