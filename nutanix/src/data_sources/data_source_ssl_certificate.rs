//! SSL certificate data source implementation

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceSchemaRequest,
    DataSourceSchemaResponse, DataSourceWithConfigure, ReadDataSourceRequest,
    ReadDataSourceResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic};
use tracing::debug;

use super::data_source_state;
use crate::api::clustermgmt::ssl_certificates::SslCertificate;
use crate::common::schema::computed;
use crate::common::{api_error, not_configured, Attrs, Obj};
use crate::provider_data::NutanixProviderData;
use crate::resources::clusters::resource_ssl_certificate::no_certificate;

#[derive(Default)]
pub struct SslCertificateDataSource {
    provider_data: Option<NutanixProviderData>,
}

impl SslCertificateDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

fn certificate_obj(certificate: &SslCertificate) -> Obj {
    Obj::new()
        .set("public_certificate", certificate.public_certificate.as_ref())
        .set("ca_chain", certificate.ca_chain.as_ref())
        .set_enum(
            "private_key_algorithm",
            certificate.private_key_algorithm.as_ref(),
        )
}

#[async_trait]
impl DataSource for SslCertificateDataSource {
    fn type_name(&self) -> &str {
        "nutanix_ssl_certificate_v2"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        SchemaBuilder::new()
            .version(0)
            .description("Reads the SSL certificate of a cluster")
            .attribute(computed("id", AttributeType::String))
            .attribute(
                AttributeBuilder::new("cluster_ext_id", AttributeType::String)
                    .description("Cluster serving the certificate")
                    .required()
                    .build(),
            )
            .attribute(computed("public_certificate", AttributeType::String))
            .attribute(computed("ca_chain", AttributeType::String))
            .attribute(computed("private_key_algorithm", AttributeType::String))
            .build()
            .into()
    }

    async fn read(&self, _ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return ReadDataSourceResponse::failed(diagnostics);
        };

        let Some(cluster_ext_id) = Attrs::of(&request.config).str("cluster_ext_id") else {
            diagnostics.push(
                Diagnostic::error("Missing cluster id", "cluster_ext_id must be set")
                    .with_attribute(AttributePath::new("cluster_ext_id")),
            );
            return ReadDataSourceResponse::failed(diagnostics);
        };
        debug!(cluster = %cluster_ext_id, "reading SSL certificate");

        let raw = match data
            .client
            .clustermgmt()
            .ssl_certificates()
            .get(&cluster_ext_id)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                diagnostics.push(api_error("error while fetching SSL certificate", &e));
                return ReadDataSourceResponse::failed(diagnostics);
            }
        };

        let read = match SslCertificate::from_data(raw) {
            Ok(Some(certificate)) => certificate_obj(&certificate),
            Ok(None) => {
                diagnostics.push(no_certificate());
                ["public_certificate", "ca_chain", "private_key_algorithm"]
                    .iter()
                    .fold(Obj::new(), |obj, key| obj.set(key, Dynamic::Null))
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error("unexpected response type", e.to_string()));
                return ReadDataSourceResponse::failed(diagnostics);
            }
        };

        ReadDataSourceResponse {
            state: data_source_state(&request.config, read.set("id", cluster_ext_id.as_str())),
            diagnostics,
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for SslCertificateDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        let mut diagnostics = vec![];
        match NutanixProviderData::from_any(request.provider_data) {
            Ok(data) => self.provider_data = Some(data),
            Err(diag) => diagnostics.push(diag),
        }
        ConfigureDataSourceResponse { diagnostics }
    }
}

#[path = "./data_source_ssl_certificate_test.rs"]
mod data_source_ssl_certificate_test;
