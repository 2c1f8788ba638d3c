//! Common types and utilities for the Nutanix v4 API

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Keys whose values never reach the logs
const SECRET_KEYS: &[&str] = &[
    "password",
    "privateKey",
    "passphrase",
    "authKey",
    "privKey",
    "communityString",
];

pub const REDACTED: &str = "**REDACTED**";

/// The v4 response envelope
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
    #[serde(default)]
    pub metadata: Option<ApiMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMetadata {
    pub total_available_results: Option<i64>,
    #[serde(default)]
    pub links: Option<Vec<ApiLink>>,
}

/// `{"data": {"error": [...]}}` as returned on 4xx/5xx
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub data: ApiErrorData,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorData {
    #[serde(default)]
    pub error: ErrorPayload,
}

/// Some services return a list of app messages, others a single schema
/// validation error object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ErrorPayload {
    Messages(Vec<AppMessage>),
    Single(AppMessage),
}

impl Default for ErrorPayload {
    fn default() -> Self {
        ErrorPayload::Messages(Vec::new())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppMessage {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
}

#[derive(Debug, thiserror::Error)]
#[error("API error details: {messages:?}")]
pub struct ApiErrorDetails {
    pub messages: Vec<AppMessage>,
}

impl ApiErrorDetails {
    pub fn from_response(response: ApiErrorResponse) -> Self {
        let messages = match response.data.error {
            ErrorPayload::Messages(messages) => messages,
            ErrorPayload::Single(message) => vec![message],
        };
        Self { messages }
    }

    /// Joined human-readable messages, e.g. for a diagnostic detail
    pub fn summary(&self) -> String {
        self.messages
            .iter()
            .filter_map(|m| match (&m.code, &m.message) {
                (Some(code), Some(msg)) => Some(format!("[{}] {}", code, msg)),
                (None, Some(msg)) => Some(msg.clone()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiLink {
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub rel: Option<String>,
}

/// Returned by every asynchronous mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskReference {
    pub ext_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IPv4Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix_length: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IPv6Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix_length: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fqdn {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IPAddress {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4: Option<IPv4Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv6: Option<IPv6Address>,
}

impl IPAddress {
    /// Stable identity used when matching nodes across plan and server state
    pub fn key(&self) -> Option<String> {
        if let Some(v4) = self.ipv4.as_ref().and_then(|ip| ip.value.as_ref().map(|v| (v, ip))) {
            return Some(format!(
                "ipv4:{}/{}",
                v4.0,
                v4.1.prefix_length.unwrap_or(32)
            ));
        }
        if let Some(v6) = self.ipv6.as_ref().and_then(|ip| ip.value.as_ref().map(|v| (v, ip))) {
            return Some(format!(
                "ipv6:{}/{}",
                v6.0,
                v6.1.prefix_length.unwrap_or(128)
            ));
        }
        None
    }

    pub fn address_type(&self) -> Option<crate::enums::AddressType> {
        use crate::enums::AddressType;
        if self.ipv4.as_ref().is_some_and(|ip| ip.value.is_some()) {
            Some(AddressType::Ipv4)
        } else if self.ipv6.as_ref().is_some_and(|ip| ip.value.is_some()) {
            Some(AddressType::Ipv6)
        } else {
            None
        }
    }

    /// Compares addresses by value only; prefix lengths default differently
    /// on the server
    pub fn same_address(&self, other: &IPAddress) -> bool {
        let v4 = |ip: &IPAddress| ip.ipv4.as_ref().and_then(|a| a.value.clone());
        let v6 = |ip: &IPAddress| ip.ipv6.as_ref().and_then(|a| a.value.clone());
        v4(self) == v4(other) && v6(self) == v6(other)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IPAddressOrFQDN {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4: Option<IPv4Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv6: Option<IPv6Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fqdn: Option<Fqdn>,
}

#[derive(Debug, Clone, Default)]
pub struct ApiQueryParams {
    params: Vec<(String, String)>,
}

impl ApiQueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn add_optional<K: Into<String>, V: ToString>(mut self, key: K, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.params.push((key.into(), v.to_string()));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// `$`-prefixed keys are kept literal, values are percent-encoded
    pub fn to_query_string(&self) -> String {
        if self.params.is_empty() {
            String::new()
        } else {
            format!(
                "?{}",
                self.params
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
                    .collect::<Vec<_>>()
                    .join("&")
            )
        }
    }
}

/// OData list options shared by every list endpoint. Passed through as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub filter: Option<String>,
    pub order_by: Option<String>,
    pub apply: Option<String>,
    pub select: Option<String>,
    pub expand: Option<String>,
}

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn to_query_params(&self) -> ApiQueryParams {
        ApiQueryParams::new()
            .add_optional("$page", self.page)
            .add_optional("$limit", self.limit)
            .add_optional("$filter", self.filter.as_ref())
            .add_optional("$orderby", self.order_by.as_ref())
            .add_optional("$apply", self.apply.as_ref())
            .add_optional("$select", self.select.as_ref())
            .add_optional("$expand", self.expand.as_ref())
    }
}

/// Quotes `value` as an OData string literal; embedded quotes are doubled
pub fn odata_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Replaces secret values at any depth so request bodies can be logged
pub fn redact(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    if SECRET_KEYS.contains(&k.as_str()) && !v.is_null() {
                        (k.clone(), Value::String(REDACTED.to_string()))
                    } else {
                        (k.clone(), redact(v))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact).collect()),
        other => other.clone(),
    }
}

/// Splits the `"{prefix}=:{uuid}"` form some task ids carry
pub fn task_uuid(ext_id: &str) -> &str {
    ext_id.split_once("=:").map_or(ext_id, |(_, uuid)| uuid)
}
