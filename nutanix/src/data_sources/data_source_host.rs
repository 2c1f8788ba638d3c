//! Host data source implementation

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceSchemaRequest,
    DataSourceSchemaResponse, DataSourceWithConfigure, ReadDataSourceRequest,
    ReadDataSourceResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, BlockBuilder, NestedBlock, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic};
use tracing::debug;

use super::data_source_state;
use crate::api::clustermgmt::clusters::{ControllerVmReference, Host, HypervisorReference};
use crate::common::schema::{
    computed, flatten_ip_address, flatten_ip_address_list, flatten_links, ip_address_block,
    ip_address_list_block, links_block, Mode,
};
use crate::common::{api_error, many, not_configured, single, Attrs, Obj};
use crate::provider_data::NutanixProviderData;

fn hypervisor_block() -> NestedBlock {
    NestedBlock::list(
        "hypervisor",
        BlockBuilder::new()
            .block(ip_address_block("external_address", Mode::Computed))
            .attribute(computed("user_name", AttributeType::String))
            .attribute(computed("full_name", AttributeType::String))
            .attribute(computed("type", AttributeType::String))
            .attribute(computed("number_of_vms", AttributeType::Number))
            .attribute(computed("state", AttributeType::String))
            .attribute(computed("acropolis_connection_state", AttributeType::String))
            .build(),
    )
}

fn controller_vm_block() -> NestedBlock {
    NestedBlock::list(
        "controller_vm",
        BlockBuilder::new()
            .block(ip_address_block("external_address", Mode::Computed))
            .block(ip_address_block("backplane_address", Mode::Computed))
            .block(ip_address_list_block("rdma_backplane_address", Mode::Computed))
            .block(ip_address_block("nat_ip", Mode::Computed))
            .attribute(computed("nat_port", AttributeType::Number))
            .attribute(computed("is_in_maintenance_mode", AttributeType::Bool))
            .build(),
    )
}

/// Attributes of a host as reported by the cluster
pub(crate) fn host_fields(builder: SchemaBuilder) -> SchemaBuilder {
    let strings = || AttributeType::list_of(AttributeType::String);
    builder
        .attribute(computed("tenant_id", AttributeType::String))
        .block(links_block())
        .attribute(computed("host_name", AttributeType::String))
        .attribute(computed("host_type", AttributeType::String))
        .block(hypervisor_block())
        .block(NestedBlock::list(
            "cluster",
            BlockBuilder::new()
                .attribute(computed("uuid", AttributeType::String))
                .attribute(computed("name", AttributeType::String))
                .build(),
        ))
        .block(controller_vm_block())
        .block(NestedBlock::list(
            "disk",
            BlockBuilder::new()
                .attribute(computed("uuid", AttributeType::String))
                .attribute(computed("mount_path", AttributeType::String))
                .attribute(computed("size_in_bytes", AttributeType::Number))
                .attribute(computed("serial_id", AttributeType::String))
                .attribute(computed("storage_tier", AttributeType::String))
                .build(),
        ))
        .attribute(computed("is_degraded", AttributeType::Bool))
        .attribute(computed("is_secure_booted", AttributeType::Bool))
        .attribute(computed("is_hardware_virtualized", AttributeType::Bool))
        .attribute(computed("has_csr", AttributeType::Bool))
        .block(NestedBlock::list(
            "key_management_device_to_cert_status",
            BlockBuilder::new()
                .attribute(computed("key_management_server_name", AttributeType::String))
                .attribute(computed("is_certificate_present", AttributeType::Bool))
                .build(),
        ))
        .attribute(computed("number_of_cpu_cores", AttributeType::Number))
        .attribute(computed("number_of_cpu_threads", AttributeType::Number))
        .attribute(computed("number_of_cpu_sockets", AttributeType::Number))
        .attribute(computed("cpu_capacity_hz", AttributeType::Number))
        .attribute(computed("cpu_frequency_hz", AttributeType::Number))
        .attribute(computed("cpu_model", AttributeType::String))
        .attribute(computed("gpu_driver_version", AttributeType::String))
        .attribute(computed("gpu_list", strings()))
        .attribute(computed("default_vhd_location", AttributeType::String))
        .attribute(computed("default_vhd_container_uuid", AttributeType::String))
        .attribute(computed("default_vm_location", AttributeType::String))
        .attribute(computed("default_vm_container_uuid", AttributeType::String))
        .attribute(computed("is_reboot_pending", AttributeType::Bool))
        .attribute(computed("failover_cluster_fqdn", AttributeType::String))
        .attribute(computed("failover_cluster_node_status", AttributeType::String))
        .attribute(computed("boot_time_usecs", AttributeType::Number))
        .attribute(computed("memory_size_bytes", AttributeType::Number))
        .attribute(computed("block_serial", AttributeType::String))
        .attribute(computed("block_model", AttributeType::String))
        .attribute(computed("maintenance_state", AttributeType::String))
        .attribute(computed("node_status", AttributeType::String))
        .block(NestedBlock::list(
            "ipmi",
            BlockBuilder::new()
                .block(ip_address_block("ip", Mode::Computed))
                .attribute(computed("username", AttributeType::String))
                .build(),
        ))
        .attribute(computed("rackable_unit_uuid", AttributeType::String))
}

fn hypervisor_obj(hypervisor: &HypervisorReference) -> Obj {
    Obj::new()
        .set(
            "external_address",
            flatten_ip_address(hypervisor.external_address.as_ref()),
        )
        .set("user_name", hypervisor.user_name.as_ref())
        .set("full_name", hypervisor.full_name.as_ref())
        .set_enum("type", hypervisor.hypervisor_type.as_ref())
        .set("number_of_vms", hypervisor.number_of_vms)
        .set_enum("state", hypervisor.state.as_ref())
        .set_enum(
            "acropolis_connection_state",
            hypervisor.acropolis_connection_state.as_ref(),
        )
}

fn controller_vm_obj(cvm: &ControllerVmReference) -> Obj {
    Obj::new()
        .set("external_address", flatten_ip_address(cvm.external_address.as_ref()))
        .set("backplane_address", flatten_ip_address(cvm.backplane_address.as_ref()))
        .set(
            "rdma_backplane_address",
            flatten_ip_address_list(cvm.rdma_backplane_address.as_ref()),
        )
        .set("nat_ip", flatten_ip_address(cvm.nat_ip.as_ref()))
        .set("nat_port", cvm.nat_port)
        .set("is_in_maintenance_mode", cvm.is_in_maintenance_mode)
}

pub(crate) fn host_obj(host: &Host) -> Obj {
    Obj::new()
        .set("ext_id", host.ext_id.as_ref())
        .set("tenant_id", host.tenant_id.as_ref())
        .set("links", flatten_links(host.links.as_ref()))
        .set("host_name", host.host_name.as_ref())
        .set_enum("host_type", host.host_type.as_ref())
        .set("hypervisor", single(host.hypervisor.as_ref(), hypervisor_obj))
        .set(
            "cluster",
            single(host.cluster.as_ref(), |c| {
                Obj::new()
                    .set("uuid", c.uuid.as_ref())
                    .set("name", c.name.as_ref())
            }),
        )
        .set("controller_vm", single(host.controller_vm.as_ref(), controller_vm_obj))
        .set(
            "disk",
            many(host.disk.as_ref(), |d| {
                Obj::new()
                    .set("uuid", d.uuid.as_ref())
                    .set("mount_path", d.mount_path.as_ref())
                    .set("size_in_bytes", d.size_in_bytes)
                    .set("serial_id", d.serial_id.as_ref())
                    .set_enum("storage_tier", d.storage_tier.as_ref())
            }),
        )
        .set("is_degraded", host.is_degraded)
        .set("is_secure_booted", host.is_secure_booted)
        .set("is_hardware_virtualized", host.is_hardware_virtualized)
        .set("has_csr", host.has_csr)
        .set(
            "key_management_device_to_cert_status",
            many(host.key_management_device_to_cert_status.as_ref(), |k| {
                Obj::new()
                    .set("key_management_server_name", k.key_management_server_name.as_ref())
                    .set("is_certificate_present", k.is_certificate_present)
            }),
        )
        .set("number_of_cpu_cores", host.number_of_cpu_cores)
        .set("number_of_cpu_threads", host.number_of_cpu_threads)
        .set("number_of_cpu_sockets", host.number_of_cpu_sockets)
        .set("cpu_capacity_hz", host.cpu_capacity_hz)
        .set("cpu_frequency_hz", host.cpu_frequency_hz)
        .set("cpu_model", host.cpu_model.as_ref())
        .set("gpu_driver_version", host.gpu_driver_version.as_ref())
        .set_strings("gpu_list", host.gpu_list.as_ref())
        .set("default_vhd_location", host.default_vhd_location.as_ref())
        .set("default_vhd_container_uuid", host.default_vhd_container_uuid.as_ref())
        .set("default_vm_location", host.default_vm_location.as_ref())
        .set("default_vm_container_uuid", host.default_vm_container_uuid.as_ref())
        .set("is_reboot_pending", host.is_reboot_pending)
        .set("failover_cluster_fqdn", host.failover_cluster_fqdn.as_ref())
        .set(
            "failover_cluster_node_status",
            host.failover_cluster_node_status.as_ref(),
        )
        .set("boot_time_usecs", host.boot_time_usecs)
        .set("memory_size_bytes", host.memory_size_bytes)
        .set("block_serial", host.block_serial.as_ref())
        .set("block_model", host.block_model.as_ref())
        .set("maintenance_state", host.maintenance_state.as_ref())
        .set_enum("node_status", host.node_status.as_ref())
        .set(
            "ipmi",
            single(host.ipmi.as_ref(), |i| {
                Obj::new()
                    .set("ip", flatten_ip_address(i.ip.as_ref()))
                    .set("username", i.username.as_ref())
            }),
        )
        .set("rackable_unit_uuid", host.rackable_unit_uuid.as_ref())
}

#[derive(Default)]
pub struct HostDataSource {
    provider_data: Option<NutanixProviderData>,
}

impl HostDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSource for HostDataSource {
    fn type_name(&self) -> &str {
        "nutanix_host_v2"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        let builder = SchemaBuilder::new()
            .version(0)
            .description("Reads a host of a cluster")
            .attribute(computed("id", AttributeType::String))
            .attribute(
                AttributeBuilder::new("ext_id", AttributeType::String)
                    .description("Identifier of the host")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("cluster_ext_id", AttributeType::String)
                    .description("Cluster the host belongs to")
                    .required()
                    .build(),
            );

        DataSourceSchemaResponse {
            schema: host_fields(builder).build(),
            diagnostics: vec![],
        }
    }

    async fn read(&self, _ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return ReadDataSourceResponse::failed(diagnostics);
        };

        let attrs = Attrs::of(&request.config);
        let (Some(cluster_ext_id), Some(ext_id)) = (attrs.str("cluster_ext_id"), attrs.str("ext_id"))
        else {
            diagnostics.push(
                Diagnostic::error(
                    "Missing host id",
                    "both cluster_ext_id and ext_id must be set",
                )
                .with_attribute(AttributePath::new("ext_id")),
            );
            return ReadDataSourceResponse::failed(diagnostics);
        };
        debug!(cluster = %cluster_ext_id, host = %ext_id, "reading host");

        match data
            .client
            .clustermgmt()
            .clusters()
            .get_host(&cluster_ext_id, &ext_id)
            .await
        {
            Ok(host) => ReadDataSourceResponse {
                state: data_source_state(
                    &request.config,
                    host_obj(&host)
                        .set("id", ext_id.as_str())
                        .set("ext_id", ext_id.as_str()),
                ),
                diagnostics,
            },
            Err(e) => {
                diagnostics.push(api_error("error while fetching host", &e));
                ReadDataSourceResponse::failed(diagnostics)
            }
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for HostDataSource {
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

#[path = "./data_source_host_test.rs"]
mod data_source_host_test;
