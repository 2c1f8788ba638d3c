//! SSL certificate of a cluster
//!
//! The certificate always exists, so create and update both replace it in
//! place and delete only forgets it. Reads retry for a while because the
//! cluster's API is briefly unavailable after a certificate is replaced.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tfplug::context::Context;
use tfplug::plan_modifier::RequiresReplace;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceSchemaRequest, ResourceSchemaResponse,
    ResourceWithConfigure, UpdateResourceRequest, UpdateResourceResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tracing::{debug, info};

use crate::api::clustermgmt::ssl_certificates::SslCertificate;
use crate::api::ApiError;
use crate::common::schema::{id_attribute, one_of};
use crate::common::{api_error, not_configured, random_id, state_error, task_error, Attrs};
use crate::enums::{expand_enum, ApiEnum, PrivateKeyAlgorithm};
use crate::provider_data::NutanixProviderData;

const READ_ATTEMPTS: u32 = 10;
const READ_INITIAL_DELAY: Duration = Duration::from_secs(2);

pub struct SslCertificateResource {
    provider_data: Option<NutanixProviderData>,
    read_delay: Duration,
}

impl Default for SslCertificateResource {
    fn default() -> Self {
        Self {
            provider_data: None,
            read_delay: READ_INITIAL_DELAY,
        }
    }
}

impl SslCertificateResource {
    pub fn new() -> Self {
        Self::default()
    }

    /// GET the certificate, retrying failures with a growing delay. Each
    /// attempt is a single request; the client's own retries are off here.
    async fn get_with_retry(
        &self,
        ctx: &Context,
        data: &NutanixProviderData,
        cluster_ext_id: &str,
    ) -> Result<Option<Value>, Diagnostic> {
        let client = data.client.without_retries();
        let api = client.clustermgmt().ssl_certificates();
        let mut delay = self.read_delay;
        let mut last_error: Option<ApiError> = None;

        for attempt in 1..=READ_ATTEMPTS {
            match api.get(cluster_ext_id).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    debug!(attempt, max = READ_ATTEMPTS, error = %e, "fetching SSL certificate failed");
                    last_error = Some(e);
                }
            }
            if attempt == READ_ATTEMPTS {
                break;
            }
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = ctx.cancelled() => {
                    return Err(Diagnostic::error(
                        "context cancelled while fetching SSL certificate",
                        "the request was cancelled before the certificate could be read",
                    ));
                }
            }
            delay = delay.mul_f64(1.5);
        }

        Err(Diagnostic::error(
            format!(
                "error while fetching SSL certificate after {} attempts",
                READ_ATTEMPTS
            ),
            last_error.map_or_else(String::new, |e| format!("API error: {}", e)),
        ))
    }

    /// Refreshes `input` from the API. `Ok(None)` when the cluster reports no
    /// certificate at all.
    async fn fetch(
        &self,
        ctx: &Context,
        data: &NutanixProviderData,
        input: &DynamicValue,
    ) -> Result<Option<DynamicValue>, Diagnostic> {
        let cluster_ext_id = Attrs::of(input).str("cluster_ext_id").unwrap_or_default();
        let raw = self.get_with_retry(ctx, data, &cluster_ext_id).await?;
        let certificate = SslCertificate::from_data(raw).map_err(|e| {
            Diagnostic::error("unexpected response type", e.to_string())
        })?;
        let Some(certificate) = certificate else {
            return Ok(None);
        };

        let mut state = input.clone();
        let configured = Attrs::of(input);
        if !configured.is_set("public_certificate") {
            set_optional(&mut state, "public_certificate", certificate.public_certificate)?;
        }
        if let Some(ca_chain) = certificate.ca_chain {
            state
                .set_string(&AttributePath::new("ca_chain"), ca_chain)
                .map_err(state_error)?;
        }
        if let Some(algorithm) = certificate.private_key_algorithm {
            state
                .set_string(&AttributePath::new("private_key_algorithm"), algorithm.flatten())
                .map_err(state_error)?;
        }
        for key in ["public_certificate", "ca_chain", "private_key_algorithm"] {
            clear_unknown(&mut state, key)?;
        }
        Ok(Some(state))
    }

    /// Replaces the certificate with the planned one: GET for the etag, PUT,
    /// wait for the task
    async fn apply(
        &self,
        ctx: &Context,
        data: &NutanixProviderData,
        planned: &DynamicValue,
    ) -> Result<(), Diagnostic> {
        let attrs = Attrs::of(planned);
        let cluster_ext_id = attrs.str("cluster_ext_id").unwrap_or_default();
        let api = data.client.clustermgmt().ssl_certificates();

        let current = api
            .get_with_etag(&cluster_ext_id)
            .await
            .map_err(|e| api_error("error while fetching SSL certificate", &e))?;

        let body = expand_ssl_certificate(attrs);
        debug!(cluster = %cluster_ext_id, "updating SSL certificate");
        let task = api
            .update(&cluster_ext_id, &body, &current.etag)
            .await
            .map_err(|e| api_error("error while updating SSL certificate", &e))?;

        data.waiter
            .wait(ctx, &task, data.timeout())
            .await
            .map_err(|e| task_error("SSL certificate to update", task.ext_id.as_deref(), &e))?;
        info!(cluster = %cluster_ext_id, "SSL certificate replaced");
        Ok(())
    }

    /// State after a successful replacement: `planned` with `id`, refreshed
    async fn refreshed(
        &self,
        ctx: &Context,
        data: &NutanixProviderData,
        planned: &DynamicValue,
        id: String,
    ) -> (DynamicValue, Vec<Diagnostic>) {
        let mut diagnostics = vec![];
        let mut state = planned.clone();
        if let Err(e) = state.set_string(&AttributePath::new("id"), id) {
            diagnostics.push(state_error(e));
            return (state, diagnostics);
        }
        match self.fetch(ctx, data, &state).await {
            Ok(Some(refreshed)) => (refreshed, diagnostics),
            Ok(None) => {
                diagnostics.push(no_certificate());
                (state, diagnostics)
            }
            Err(diag) => {
                diagnostics.push(diag);
                (state, diagnostics)
            }
        }
    }
}

pub(crate) fn expand_ssl_certificate(attrs: Attrs<'_>) -> SslCertificate {
    SslCertificate {
        passphrase: attrs.str("passphrase"),
        private_key: attrs.str("private_key"),
        public_certificate: attrs.str("public_certificate"),
        ca_chain: attrs.str("ca_chain"),
        private_key_algorithm: expand_enum::<PrivateKeyAlgorithm>(
            attrs.str("private_key_algorithm").as_deref(),
            "private_key_algorithm",
        ),
    }
}

pub(crate) fn no_certificate() -> Diagnostic {
    Diagnostic::warning(
        "No SSL certificate found.",
        "The API returned no SSL certificate data.",
    )
}

fn set_optional(
    state: &mut DynamicValue,
    key: &str,
    value: Option<String>,
) -> Result<(), Diagnostic> {
    let path = AttributePath::new(key);
    match value {
        Some(v) => state.set_string(&path, v),
        None => state.set_null(&path),
    }
    .map_err(state_error)
}

fn clear_unknown(state: &mut DynamicValue, key: &str) -> Result<(), Diagnostic> {
    let path = AttributePath::new(key);
    if state.get(&path).is_some_and(Dynamic::is_unknown) {
        state.set_null(&path).map_err(state_error)?;
    }
    Ok(())
}

#[async_trait]
impl Resource for SslCertificateResource {
    fn type_name(&self) -> &str {
        "nutanix_ssl_certificate_v2"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Replaces the SSL certificate of a cluster")
            .attribute(id_attribute())
            .attribute(
                AttributeBuilder::new("cluster_ext_id", AttributeType::String)
                    .required()
                    .plan_modifier(RequiresReplace::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("passphrase", AttributeType::String)
                    .optional()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("private_key", AttributeType::String)
                    .description("PEM encoded private key")
                    .optional()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("public_certificate", AttributeType::String)
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("ca_chain", AttributeType::String)
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("private_key_algorithm", AttributeType::String)
                    .optional()
                    .computed()
                    .validator(one_of::<PrivateKeyAlgorithm>())
                    .build(),
            )
            .build();

        ResourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let Some(data) = &self.provider_data else {
            return CreateResourceResponse {
                new_state: request.planned_state,
                diagnostics: vec![not_configured()],
            };
        };

        if let Err(diag) = self.apply(&ctx, data, &request.planned_state).await {
            return CreateResourceResponse {
                new_state: request.planned_state,
                diagnostics: vec![diag],
            };
        }
        let (new_state, diagnostics) = self
            .refreshed(&ctx, data, &request.planned_state, random_id())
            .await;
        CreateResourceResponse {
            new_state,
            diagnostics,
        }
    }

    async fn read(&self, ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics,
            };
        };

        match self.fetch(&ctx, data, &request.current_state).await {
            Ok(Some(state)) => ReadResourceResponse {
                new_state: Some(state),
                diagnostics,
            },
            Ok(None) => {
                diagnostics.push(no_certificate());
                ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                }
            }
            Err(diag) => {
                diagnostics.push(diag);
                ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                }
            }
        }
    }

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let Some(data) = &self.provider_data else {
            return UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics: vec![not_configured()],
            };
        };

        if let Err(diag) = self.apply(&ctx, data, &request.planned_state).await {
            return UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics: vec![diag],
            };
        }
        let id = request
            .prior_state
            .get_optional_string(&AttributePath::new("id"))
            .unwrap_or_else(random_id);
        let (new_state, diagnostics) = self
            .refreshed(&ctx, data, &request.planned_state, id)
            .await;
        UpdateResourceResponse {
            new_state,
            diagnostics,
        }
    }

    async fn delete(&self, _ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        debug!(
            cluster = ?request.prior_state.get_optional_string(&AttributePath::new("cluster_ext_id")),
            "SSL certificates cannot be deleted, forgetting it"
        );
        DeleteResourceResponse {
            diagnostics: vec![],
        }
    }
}

#[async_trait]
impl ResourceWithConfigure for SslCertificateResource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
        let mut diagnostics = vec![];
        match NutanixProviderData::from_any(request.provider_data) {
            Ok(data) => self.provider_data = Some(data),
            Err(diag) => diagnostics.push(diag),
        }
        ConfigureResourceResponse { diagnostics }
    }
}

#[path = "./resource_ssl_certificate_test.rs"]
mod resource_ssl_certificate_test;
