use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::CONFIG_BASE;
use crate::api::client::{Client, Versioned};
use crate::api::common::TaskReference;
use crate::api::error::ApiError;
use crate::enums::PrivateKeyAlgorithm;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SslCertificate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_certificate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_chain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key_algorithm: Option<PrivateKeyAlgorithm>,
}

impl SslCertificate {
    /// Interprets the `data` member of a certificate response. `null` is
    /// `Ok(None)`; anything that is not a certificate object is an error.
    pub fn from_data(data: Option<Value>) -> Result<Option<Self>, ApiError> {
        match data {
            None | Some(Value::Null) => Ok(None),
            Some(value @ Value::Object(_)) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| ApiError::Decode(e.to_string())),
            Some(other) => Err(ApiError::UnexpectedResponse(format!(
                "expected SSL certificate, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub struct SslCertificatesApi<'a> {
    client: &'a Client,
}

impl<'a> SslCertificatesApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    fn certificate_path(cluster_ext_id: &str) -> String {
        format!("{}/clusters/{}/ssl-certificate", CONFIG_BASE, cluster_ext_id)
    }

    /// Raw response data; see [`SslCertificate::from_data`]
    pub async fn get(&self, cluster_ext_id: &str) -> Result<Option<Value>, ApiError> {
        self.client
            .get(&Self::certificate_path(cluster_ext_id))
            .await
    }

    pub async fn get_with_etag(
        &self,
        cluster_ext_id: &str,
    ) -> Result<Versioned<Option<Value>>, ApiError> {
        self.client
            .get_with_etag(&Self::certificate_path(cluster_ext_id))
            .await
    }

    pub async fn update(
        &self,
        cluster_ext_id: &str,
        certificate: &SslCertificate,
        etag: &str,
    ) -> Result<TaskReference, ApiError> {
        self.client
            .put(&Self::certificate_path(cluster_ext_id), certificate, etag)
            .await
    }
}
