//! Storage container resource implementation

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::defaults::StaticDefault;
use tfplug::import_state_passthrough_id;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceSchemaRequest, ResourceSchemaResponse,
    ResourceWithConfigure, UpdateResourceRequest, UpdateResourceResponse,
    ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tracing::{debug, info};

use crate::api::clustermgmt::storage_containers::StorageContainer;
use crate::common::schema::{
    computed, expand_ip_or_fqdn_list, flatten_ip_or_fqdn_list, flatten_links, id_attribute,
    ip_or_fqdn_list_block, links_block, one_of, optional_computed, Mode,
};
use crate::common::{api_error, carry, has_change, not_configured, task_error, Attrs, Obj};
use crate::enums::{expand_enum, CacheDeduplication, ErasureCodeStatus, OnDiskDedup};
use crate::provider_data::NutanixProviderData;
use crate::tasks::STORAGE_CONTAINER_REL;

/// Attributes that only exist on the Terraform side
const INPUT_ONLY: &[&str] = &["ignore_small_files"];

#[derive(Default)]
pub struct StorageContainerResource {
    provider_data: Option<NutanixProviderData>,
}

impl StorageContainerResource {
    pub fn new() -> Self {
        Self::default()
    }

    /// GET the container and flatten it, keeping the input-only attributes of
    /// `input`. `Ok(None)` when the container no longer exists.
    async fn fetch(
        &self,
        data: &NutanixProviderData,
        ext_id: &str,
        input: &DynamicValue,
    ) -> Result<Option<DynamicValue>, Diagnostic> {
        let container = match data
            .client
            .clustermgmt()
            .storage_containers()
            .get(ext_id)
            .await
        {
            Ok(versioned) => versioned.data,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(api_error("error while fetching storage container", &e)),
        };

        let mut state = storage_container_obj(&container)
            .set("id", ext_id)
            .set("ext_id", container.ext_id.as_deref().unwrap_or(ext_id))
            .into_state();
        carry(input, &mut state, INPUT_ONLY);
        if state
            .get_optional_bool(&AttributePath::new("ignore_small_files"))
            .is_none()
        {
            state
                .set_bool(&AttributePath::new("ignore_small_files"), true)
                .map_err(crate::common::state_error)?;
        }
        Ok(Some(state))
    }
}

fn container_ext_id(state: &DynamicValue) -> Option<String> {
    state
        .get_optional_string(&AttributePath::new("ext_id"))
        .or_else(|| state.get_optional_string(&AttributePath::new("id")))
}

pub(crate) fn expand_storage_container(attrs: Attrs<'_>) -> StorageContainer {
    StorageContainer {
        ext_id: attrs.str("ext_id"),
        container_ext_id: attrs.str("container_ext_id"),
        owner_ext_id: attrs.str("owner_ext_id"),
        name: attrs.str("name"),
        cluster_ext_id: attrs.str("cluster_ext_id"),
        logical_explicit_reserved_capacity_bytes: attrs
            .i64("logical_explicit_reserved_capacity_bytes"),
        logical_advertised_capacity_bytes: attrs.i64("logical_advertised_capacity_bytes"),
        replication_factor: attrs.i64("replication_factor"),
        nfs_whitelist_address: expand_ip_or_fqdn_list(attrs.blocks("nfs_whitelist_addresses")),
        erasure_code: expand_enum(attrs.str("erasure_code").as_deref(), "erasure_code"),
        is_inline_ec_enabled: attrs.bool("is_inline_ec_enabled"),
        has_higher_ec_fault_domain_preference: attrs
            .bool("has_higher_ec_fault_domain_preference"),
        erasure_code_delay_secs: attrs.i64("erasure_code_delay_secs"),
        cache_deduplication: expand_enum(
            attrs.str("cache_deduplication").as_deref(),
            "cache_deduplication",
        ),
        on_disk_dedup: expand_enum(attrs.str("on_disk_dedup").as_deref(), "on_disk_dedup"),
        is_compression_enabled: attrs.bool("is_compression_enabled"),
        compression_delay_secs: attrs.i64("compression_delay_secs"),
        is_internal: attrs.bool("is_internal"),
        is_software_encryption_enabled: attrs.bool("is_software_encryption_enabled"),
        affinity_host_ext_id: attrs.str("affinity_host_ext_id"),
        ..Default::default()
    }
}

/// Every attribute the API reports for a container, shared with the data sources
pub(crate) fn storage_container_obj(sc: &StorageContainer) -> Obj {
    Obj::new()
        .set("ext_id", sc.ext_id.as_ref())
        .set("tenant_id", sc.tenant_id.as_ref())
        .set("links", flatten_links(sc.links.as_ref()))
        .set("container_ext_id", sc.container_ext_id.as_ref())
        .set("owner_ext_id", sc.owner_ext_id.as_ref())
        .set("name", sc.name.as_ref())
        .set("cluster_ext_id", sc.cluster_ext_id.as_ref())
        .set("storage_pool_ext_id", sc.storage_pool_ext_id.as_ref())
        .set("is_marked_for_removal", sc.is_marked_for_removal)
        .set("max_capacity_bytes", sc.max_capacity_bytes)
        .set(
            "logical_explicit_reserved_capacity_bytes",
            sc.logical_explicit_reserved_capacity_bytes,
        )
        .set(
            "logical_implicit_reserved_capacity_bytes",
            sc.logical_implicit_reserved_capacity_bytes,
        )
        .set(
            "logical_advertised_capacity_bytes",
            sc.logical_advertised_capacity_bytes,
        )
        .set("replication_factor", sc.replication_factor)
        .set(
            "nfs_whitelist_addresses",
            flatten_ip_or_fqdn_list(sc.nfs_whitelist_address.as_ref()),
        )
        .set_enum("erasure_code", sc.erasure_code.as_ref())
        .set("is_inline_ec_enabled", sc.is_inline_ec_enabled)
        .set(
            "has_higher_ec_fault_domain_preference",
            sc.has_higher_ec_fault_domain_preference,
        )
        .set("erasure_code_delay_secs", sc.erasure_code_delay_secs)
        .set_enum("cache_deduplication", sc.cache_deduplication.as_ref())
        .set_enum("on_disk_dedup", sc.on_disk_dedup.as_ref())
        .set("is_compression_enabled", sc.is_compression_enabled)
        .set("compression_delay_secs", sc.compression_delay_secs)
        .set("is_internal", sc.is_internal)
        .set(
            "is_software_encryption_enabled",
            sc.is_software_encryption_enabled,
        )
        .set("is_encrypted", sc.is_encrypted)
        .set("affinity_host_ext_id", sc.affinity_host_ext_id.as_ref())
        .set("cluster_name", sc.cluster_name.as_ref())
}

/// Copies the fields whose attribute changed in the plan onto `body`
fn overlay_changes(
    body: &mut StorageContainer,
    desired: StorageContainer,
    prior: &DynamicValue,
    planned: &DynamicValue,
) {
    let changed = |key: &str| has_change(prior, planned, key);

    macro_rules! overlay {
        ($($field:ident),+ $(,)?) => {
            $(if changed(stringify!($field)) {
                body.$field = desired.$field;
            })+
        };
    }

    overlay!(
        container_ext_id,
        owner_ext_id,
        name,
        cluster_ext_id,
        logical_explicit_reserved_capacity_bytes,
        logical_advertised_capacity_bytes,
        replication_factor,
        erasure_code,
        is_inline_ec_enabled,
        has_higher_ec_fault_domain_preference,
        erasure_code_delay_secs,
        cache_deduplication,
        on_disk_dedup,
        is_compression_enabled,
        compression_delay_secs,
        is_internal,
        is_software_encryption_enabled,
        affinity_host_ext_id,
    );
    // Removing every block clears the whitelist
    if changed("nfs_whitelist_addresses") {
        body.nfs_whitelist_address = Some(desired.nfs_whitelist_address.unwrap_or_default());
    }
}

#[async_trait]
impl Resource for StorageContainerResource {
    fn type_name(&self) -> &str {
        "nutanix_storage_containers_v2"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Manages a storage container on a Nutanix cluster")
            .attribute(id_attribute())
            .attribute(
                AttributeBuilder::new("ext_id", AttributeType::String)
                    .description("Identifier of the storage container")
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(computed("tenant_id", AttributeType::String))
            .block(links_block())
            .attribute(optional_computed("container_ext_id", AttributeType::String))
            .attribute(optional_computed("owner_ext_id", AttributeType::String))
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("Name of the storage container")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("cluster_ext_id", AttributeType::String)
                    .description("Cluster that owns the storage container")
                    .required()
                    .build(),
            )
            .attribute(computed("storage_pool_ext_id", AttributeType::String))
            .attribute(computed("is_marked_for_removal", AttributeType::Bool))
            .attribute(computed("max_capacity_bytes", AttributeType::Number))
            .attribute(optional_computed(
                "logical_explicit_reserved_capacity_bytes",
                AttributeType::Number,
            ))
            .attribute(computed(
                "logical_implicit_reserved_capacity_bytes",
                AttributeType::Number,
            ))
            .attribute(optional_computed(
                "logical_advertised_capacity_bytes",
                AttributeType::Number,
            ))
            .attribute(optional_computed("replication_factor", AttributeType::Number))
            .block(ip_or_fqdn_list_block("nfs_whitelist_addresses", Mode::Input))
            .attribute(
                AttributeBuilder::new("erasure_code", AttributeType::String)
                    .description("Erasure coding: NONE, OFF or ON")
                    .optional()
                    .computed()
                    .validator(one_of::<ErasureCodeStatus>())
                    .build(),
            )
            .attribute(optional_computed("is_inline_ec_enabled", AttributeType::Bool))
            .attribute(optional_computed(
                "has_higher_ec_fault_domain_preference",
                AttributeType::Bool,
            ))
            .attribute(optional_computed(
                "erasure_code_delay_secs",
                AttributeType::Number,
            ))
            .attribute(
                AttributeBuilder::new("cache_deduplication", AttributeType::String)
                    .description("Cache deduplication: NONE, OFF or ON")
                    .optional()
                    .computed()
                    .validator(one_of::<CacheDeduplication>())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("on_disk_dedup", AttributeType::String)
                    .description("On-disk deduplication: NONE, OFF or POST_PROCESS")
                    .optional()
                    .computed()
                    .validator(one_of::<OnDiskDedup>())
                    .build(),
            )
            .attribute(optional_computed("is_compression_enabled", AttributeType::Bool))
            .attribute(optional_computed("compression_delay_secs", AttributeType::Number))
            .attribute(optional_computed("is_internal", AttributeType::Bool))
            .attribute(optional_computed(
                "is_software_encryption_enabled",
                AttributeType::Bool,
            ))
            .attribute(computed("is_encrypted", AttributeType::Bool))
            .attribute(optional_computed("affinity_host_ext_id", AttributeType::String))
            .attribute(computed("cluster_name", AttributeType::String))
            .attribute(
                AttributeBuilder::new("ignore_small_files", AttributeType::Bool)
                    .description("Delete the container even if it still holds small files")
                    .optional()
                    .default(StaticDefault::bool(true))
                    .build(),
            )
            .build();

        ResourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        let mut diagnostics = vec![];

        if let Some(rf) = request
            .config
            .get_optional_number(&AttributePath::new("replication_factor"))
        {
            if rf < 1.0 {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid replication factor",
                        format!("replication_factor must be at least 1, got {}", rf),
                    )
                    .with_attribute(AttributePath::new("replication_factor")),
                );
            }
        }

        ValidateResourceConfigResponse { diagnostics }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return CreateResourceResponse {
                new_state: request.planned_state,
                diagnostics,
            };
        };

        let attrs = Attrs::of(&request.planned_state);
        let Some(cluster_ext_id) = attrs.str("cluster_ext_id") else {
            diagnostics.push(
                Diagnostic::error("Missing cluster", "cluster_ext_id must be set")
                    .with_attribute(AttributePath::new("cluster_ext_id")),
            );
            return CreateResourceResponse {
                new_state: request.planned_state,
                diagnostics,
            };
        };
        let body = expand_storage_container(attrs);

        let task = match data
            .client
            .clustermgmt()
            .storage_containers()
            .create(&cluster_ext_id, &body)
            .await
        {
            Ok(task) => task,
            Err(e) => {
                diagnostics.push(api_error("error while creating storage containers", &e));
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        let ext_id = match data
            .waiter
            .wait_for_entity(&ctx, &task, STORAGE_CONTAINER_REL, data.timeout())
            .await
        {
            Ok(ext_id) => ext_id,
            Err(e) => {
                diagnostics.push(task_error(
                    "storage container to be created",
                    task.ext_id.as_deref(),
                    &e,
                ));
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };
        info!(ext_id = %ext_id, cluster = %cluster_ext_id, "created storage container");

        match self.fetch(data, &ext_id, &request.planned_state).await {
            Ok(Some(state)) => CreateResourceResponse {
                new_state: state,
                diagnostics,
            },
            Ok(None) => {
                diagnostics.push(Diagnostic::error(
                    "Storage container not found",
                    format!("storage container {} vanished right after creation", ext_id),
                ));
                CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                }
            }
            Err(diag) => {
                diagnostics.push(diag);
                CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                }
            }
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let mut diagnostics = vec![];

        let Some(ext_id) = container_ext_id(&request.current_state) else {
            return ReadResourceResponse {
                new_state: None,
                diagnostics,
            };
        };

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics,
            };
        };

        match self.fetch(data, &ext_id, &request.current_state).await {
            Ok(Some(state)) => ReadResourceResponse {
                new_state: Some(state),
                diagnostics,
            },
            Ok(None) => {
                debug!(ext_id = %ext_id, "storage container is gone, dropping it from state");
                ReadResourceResponse::removed(diagnostics)
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
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics,
            };
        };

        let Some(ext_id) = container_ext_id(&request.prior_state) else {
            diagnostics.push(Diagnostic::error(
                "Missing storage container id",
                "the prior state has no ext_id",
            ));
            return UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics,
            };
        };

        let api = data.client.clustermgmt().storage_containers();
        let current = match api.get(&ext_id).await {
            Ok(current) => current,
            Err(e) => {
                diagnostics.push(api_error("error while fetching storage container", &e));
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        };

        let desired = expand_storage_container(Attrs::of(&request.planned_state));
        let mut body = current.data;
        overlay_changes(
            &mut body,
            desired,
            &request.prior_state,
            &request.planned_state,
        );
        debug!(ext_id = %ext_id, "updating storage container");

        let task = match api.update(&ext_id, &body, &current.etag).await {
            Ok(task) => task,
            Err(e) => {
                diagnostics.push(api_error("error while updating storage container", &e));
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        };

        if let Err(e) = data.waiter.wait(&ctx, &task, data.timeout()).await {
            diagnostics.push(task_error(
                "storage container to be updated",
                task.ext_id.as_deref(),
                &e,
            ));
            return UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics,
            };
        }

        match self.fetch(data, &ext_id, &request.planned_state).await {
            Ok(Some(state)) => UpdateResourceResponse {
                new_state: state,
                diagnostics,
            },
            Ok(None) => {
                diagnostics.push(Diagnostic::error(
                    "Storage container not found",
                    format!("storage container {} vanished during update", ext_id),
                ));
                UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                }
            }
            Err(diag) => {
                diagnostics.push(diag);
                UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                }
            }
        }
    }

    async fn delete(&self, ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return DeleteResourceResponse { diagnostics };
        };

        let Some(ext_id) = container_ext_id(&request.prior_state) else {
            return DeleteResourceResponse { diagnostics };
        };
        let ignore_small_files = request
            .prior_state
            .get_optional_bool(&AttributePath::new("ignore_small_files"))
            .unwrap_or(true);

        let task = match data
            .client
            .clustermgmt()
            .storage_containers()
            .delete(&ext_id, ignore_small_files)
            .await
        {
            Ok(task) => task,
            Err(e) => {
                diagnostics.push(api_error("error while deleting storage container", &e));
                return DeleteResourceResponse { diagnostics };
            }
        };

        if let Err(e) = data.waiter.wait(&ctx, &task, data.timeout()).await {
            diagnostics.push(task_error(
                "storage container to be deleted",
                task.ext_id.as_deref(),
                &e,
            ));
        } else {
            info!(ext_id = %ext_id, "deleted storage container");
        }

        DeleteResourceResponse { diagnostics }
    }
}

#[async_trait]
impl ResourceWithConfigure for StorageContainerResource {
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

    async fn import_state(
        &self,
        _ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        import_state_passthrough_id("ext_id", &request)
    }
}

#[path = "./resource_storage_container_test.rs"]
mod resource_storage_container_test;
