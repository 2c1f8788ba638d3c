//! Cluster profile resource implementation
//!
//! A profile bundles the cluster-wide settings (name servers, NTP, SMTP,
//! SNMP, rsyslog, pulse) that can later be applied to many clusters through
//! `nutanix_cluster_profile_association_v2`.

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
use tfplug::schema::{AttributeBuilder, AttributeType, BlockBuilder, NestedBlock, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tfplug::validator::{StringLength, StringPattern};
use tracing::{debug, info};

use crate::api::clustermgmt::cluster_profiles::{
    ClusterProfile, ManagedCluster, RsyslogModuleItem, RsyslogServer, SnmpConfig, SnmpTransport,
    SnmpTrap, SnmpUser,
};
use crate::common::network::{
    configured_smtp_password, expand_pulse_status, expand_smtp_server, flatten_pulse_status,
    flatten_smtp_server, pulse_status_block, smtp_server_block, SUBNET_MASK_PATTERN,
};
use crate::common::schema::{
    computed, expand_ip_address, expand_ip_address_list, expand_ip_or_fqdn_list,
    flatten_ip_address, flatten_ip_address_list, flatten_ip_or_fqdn_list, flatten_links,
    id_attribute, ip_address_block, ip_address_list_block, ip_or_fqdn_list_block, links_block,
    one_of, optional_in, required_in, Mode,
};
use crate::common::{
    api_error, carry, has_change, many, not_configured, state_error, task_error, Attrs, Obj,
};
use crate::enums::{
    expand_enum, expand_enum_list, ConfigType, RsyslogModuleLogSeverityLevel, RsyslogModuleName,
    RsyslogNetworkProtocol, SnmpAuthType, SnmpPrivType, SnmpProtocol, SnmpTrapVersion,
};
use crate::provider_data::NutanixProviderData;
use crate::tasks::CLUSTER_PROFILE_REL;

const INPUT_ONLY: &[&str] = &["dryrun"];

const NO_QUOTES_PATTERN: &str = r"^[^']+$";
const HEX_PATTERN: &str = r"^(?:0[xX])?[0-9a-fA-F]+$";

#[derive(Default)]
pub struct ClusterProfileResource {
    provider_data: Option<NutanixProviderData>,
}

impl ClusterProfileResource {
    pub fn new() -> Self {
        Self::default()
    }

    /// GET and flatten the profile; `Ok(None)` once it is gone
    async fn fetch(
        &self,
        data: &NutanixProviderData,
        ext_id: &str,
        input: &DynamicValue,
    ) -> Result<Option<DynamicValue>, Diagnostic> {
        let profile = match data.client.clustermgmt().cluster_profiles().get(ext_id).await {
            Ok(versioned) => versioned.data,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(api_error("error while fetching cluster profile", &e)),
        };
        let Some(profile) = profile else {
            return Err(Diagnostic::error(
                "error while fetching cluster profile",
                format!("ClusterProfile API returned empty data for ID {}", ext_id),
            ));
        };

        let mut state = cluster_profile_obj(&profile, Some(Attrs::of(input)))
            .set("id", ext_id)
            .set("ext_id", profile.ext_id.as_deref().unwrap_or(ext_id))
            .into_state();
        carry(input, &mut state, INPUT_ONLY);
        if state
            .get_optional_bool(&AttributePath::new("dryrun"))
            .is_none()
        {
            state
                .set_bool(&AttributePath::new("dryrun"), false)
                .map_err(state_error)?;
        }
        Ok(Some(state))
    }
}

fn profile_ext_id(state: &DynamicValue) -> Option<String> {
    state
        .get_optional_string(&AttributePath::new("ext_id"))
        .or_else(|| state.get_optional_string(&AttributePath::new("id")))
}

// Schema

fn snmp_config_block(mode: Mode) -> NestedBlock {
    let auth_key = required_in(mode, "auth_key", AttributeType::String)
        .validator(StringPattern::create(NO_QUOTES_PATTERN, "cannot contain single quotes"));
    let priv_key = optional_in(mode, "priv_key", AttributeType::String)
        .validator(StringPattern::create(NO_QUOTES_PATTERN, "cannot contain single quotes"));
    let users = BlockBuilder::new()
        .attribute(computed("ext_id", AttributeType::String))
        .attribute(computed("tenant_id", AttributeType::String))
        .block(links_block())
        .attribute(
            required_in(mode, "username", AttributeType::String)
                .validator(StringLength::between(1, 64))
                .build(),
        )
        .attribute(
            required_in(mode, "auth_type", AttributeType::String)
                .description("MD5 or SHA")
                .validator(one_of::<SnmpAuthType>())
                .build(),
        )
        .attribute(match mode {
            Mode::Input => auth_key.sensitive().build(),
            Mode::Computed => auth_key.build(),
        })
        .attribute(
            optional_in(mode, "priv_type", AttributeType::String)
                .description("DES or AES")
                .validator(one_of::<SnmpPrivType>())
                .build(),
        )
        .attribute(match mode {
            Mode::Input => priv_key.sensitive().build(),
            Mode::Computed => priv_key.build(),
        })
        .build();

    let transports = BlockBuilder::new()
        .attribute(
            required_in(mode, "protocol", AttributeType::String)
                .validator(one_of::<SnmpProtocol>())
                .build(),
        )
        .attribute(required_in(mode, "port", AttributeType::Number).build())
        .build();

    let traps = BlockBuilder::new()
        .attribute(computed("ext_id", AttributeType::String))
        .attribute(computed("tenant_id", AttributeType::String))
        .block(links_block())
        .block(match mode {
            Mode::Input => ip_address_block("address", mode).min_items(1),
            Mode::Computed => ip_address_block("address", mode),
        })
        .attribute(
            optional_in(mode, "username", AttributeType::String)
                .validator(StringLength::between(1, 64))
                .build(),
        )
        .attribute(
            optional_in(mode, "protocol", AttributeType::String)
                .validator(one_of::<SnmpProtocol>())
                .build(),
        )
        .attribute(optional_in(mode, "port", AttributeType::Number).build())
        .attribute(optional_in(mode, "should_inform", AttributeType::Bool).build())
        .attribute(
            optional_in(mode, "engine_id", AttributeType::String)
                .validator(StringPattern::create(HEX_PATTERN, "must be a valid hex string"))
                .build(),
        )
        .attribute(
            required_in(mode, "version", AttributeType::String)
                .description("V2 or V3")
                .validator(one_of::<SnmpTrapVersion>())
                .build(),
        )
        .attribute(
            optional_in(mode, "receiver_name", AttributeType::String)
                .validator(StringLength::between(1, 64))
                .build(),
        )
        .attribute(match mode {
            Mode::Input => optional_in(mode, "community_string", AttributeType::String)
                .sensitive()
                .build(),
            Mode::Computed => computed("community_string", AttributeType::String),
        })
        .build();

    NestedBlock::list(
        "snmp_config",
        BlockBuilder::new()
            .attribute(computed("ext_id", AttributeType::String))
            .attribute(computed("tenant_id", AttributeType::String))
            .block(links_block())
            .attribute(optional_in(mode, "is_enabled", AttributeType::Bool).build())
            .block(NestedBlock::list("users", users))
            .block(NestedBlock::list("transports", transports))
            .block(NestedBlock::list("traps", traps))
            .build(),
    )
    .max_items(1)
}

fn rsyslog_server_list_block(mode: Mode) -> NestedBlock {
    let should_log_monitor_files = match mode {
        Mode::Input => AttributeBuilder::new("should_log_monitor_files", AttributeType::Bool)
            .optional()
            .default(StaticDefault::bool(true))
            .build(),
        Mode::Computed => computed("should_log_monitor_files", AttributeType::Bool),
    };
    let modules = BlockBuilder::new()
        .attribute(
            required_in(mode, "name", AttributeType::String)
                .validator(one_of::<RsyslogModuleName>())
                .build(),
        )
        .attribute(
            required_in(mode, "log_severity_level", AttributeType::String)
                .validator(one_of::<RsyslogModuleLogSeverityLevel>())
                .build(),
        )
        .attribute(should_log_monitor_files)
        .build();

    NestedBlock::list(
        "rsyslog_server_list",
        BlockBuilder::new()
            .attribute(computed("ext_id", AttributeType::String))
            .attribute(computed("tenant_id", AttributeType::String))
            .block(links_block())
            .attribute(
                required_in(mode, "server_name", AttributeType::String)
                    .validator(StringLength::between(1, 64))
                    .build(),
            )
            .block(match mode {
                Mode::Input => ip_address_block("ip_address", mode).min_items(1),
                Mode::Computed => ip_address_block("ip_address", mode),
            })
            .attribute(required_in(mode, "port", AttributeType::Number).build())
            .attribute(
                required_in(mode, "network_protocol", AttributeType::String)
                    .description("UDP, TCP or RELP")
                    .validator(one_of::<RsyslogNetworkProtocol>())
                    .build(),
            )
            .block(NestedBlock::list("modules", modules))
            .build(),
    )
}

fn managed_clusters_block() -> NestedBlock {
    NestedBlock::list(
        "clusters",
        BlockBuilder::new()
            .attribute(computed("ext_id", AttributeType::String))
            .attribute(computed("is_compliant", AttributeType::Bool))
            .attribute(computed("last_synced_time", AttributeType::String))
            .attribute(computed(
                "config_drifts",
                AttributeType::list_of(AttributeType::String),
            ))
            .build(),
    )
}

/// The profile's own attributes and blocks, configurable or read-only.
/// Data sources build on the `Computed` shape.
pub(crate) fn cluster_profile_fields(builder: SchemaBuilder, mode: Mode) -> SchemaBuilder {
    let name = match mode {
        Mode::Input => AttributeBuilder::new("name", AttributeType::String)
            .description("Name of the cluster profile")
            .required()
            .build(),
        Mode::Computed => computed("name", AttributeType::String),
    };
    let optional_computed = |name: &str, kind: AttributeType| match mode {
        Mode::Input => AttributeBuilder::new(name, kind).optional().computed(),
        Mode::Computed => AttributeBuilder::new(name, kind).computed(),
    };

    builder
        .attribute(computed("tenant_id", AttributeType::String))
        .block(links_block())
        .attribute(name)
        .attribute(optional_computed("description", AttributeType::String).build())
        .attribute(computed("create_time", AttributeType::String))
        .attribute(computed("last_update_time", AttributeType::String))
        .attribute(computed("created_by", AttributeType::String))
        .attribute(computed("last_updated_by", AttributeType::String))
        .attribute(computed("cluster_count", AttributeType::Number))
        .attribute(computed("drifted_cluster_count", AttributeType::Number))
        .block(managed_clusters_block())
        .attribute(
            optional_computed(
                "allowed_overrides",
                AttributeType::list_of(AttributeType::String),
            )
            .description("Settings a cluster may override locally")
            .validator(one_of::<ConfigType>())
            .build(),
        )
        .block(ip_address_list_block("name_server_ip_list", mode))
        .block(ip_or_fqdn_list_block("ntp_server_ip_list", mode))
        .block(smtp_server_block(mode))
        .attribute(
            optional_computed(
                "nfs_subnet_white_list",
                AttributeType::list_of(AttributeType::String),
            )
            .validator(StringPattern::create(
                SUBNET_MASK_PATTERN,
                "Must be in CIDR-like format x.x.x.x/y.y.y.y",
            ))
            .build(),
        )
        .block(snmp_config_block(mode))
        .block(rsyslog_server_list_block(mode))
        .block(pulse_status_block(mode))
}

// Expand

fn expand_snmp_user(attrs: Attrs<'_>) -> SnmpUser {
    SnmpUser {
        username: attrs.str("username"),
        auth_type: expand_enum(attrs.str("auth_type").as_deref(), "snmp_config.users.auth_type"),
        auth_key: attrs.str("auth_key"),
        priv_type: expand_enum(attrs.str("priv_type").as_deref(), "snmp_config.users.priv_type"),
        priv_key: attrs.str("priv_key"),
        ..Default::default()
    }
}

fn expand_snmp_trap(attrs: Attrs<'_>) -> SnmpTrap {
    SnmpTrap {
        address: expand_ip_address(attrs.block("address")),
        username: attrs.str("username"),
        protocol: expand_enum(attrs.str("protocol").as_deref(), "snmp_config.traps.protocol"),
        port: attrs.i64("port"),
        should_inform: attrs.bool("should_inform"),
        engine_id: attrs.str("engine_id"),
        version: expand_enum(attrs.str("version").as_deref(), "snmp_config.traps.version"),
        receiver_name: attrs.str("receiver_name"),
        community_string: attrs.str("community_string"),
        ..Default::default()
    }
}

fn non_empty<T>(list: Vec<T>) -> Option<Vec<T>> {
    (!list.is_empty()).then_some(list)
}

fn expand_snmp_config(attrs: Option<Attrs<'_>>) -> Option<SnmpConfig> {
    let attrs = attrs?;
    Some(SnmpConfig {
        is_enabled: attrs.bool("is_enabled"),
        users: non_empty(attrs.blocks("users").into_iter().map(expand_snmp_user).collect()),
        transports: non_empty(
            attrs
                .blocks("transports")
                .into_iter()
                .map(|t| SnmpTransport {
                    protocol: expand_enum(
                        t.str("protocol").as_deref(),
                        "snmp_config.transports.protocol",
                    ),
                    port: t.i64("port"),
                })
                .collect(),
        ),
        traps: non_empty(attrs.blocks("traps").into_iter().map(expand_snmp_trap).collect()),
        ..Default::default()
    })
}

fn expand_rsyslog_server(attrs: Attrs<'_>) -> RsyslogServer {
    RsyslogServer {
        server_name: attrs.str("server_name"),
        ip_address: expand_ip_address(attrs.block("ip_address")),
        port: attrs.i64("port"),
        network_protocol: expand_enum(
            attrs.str("network_protocol").as_deref(),
            "rsyslog_server_list.network_protocol",
        ),
        modules: non_empty(
            attrs
                .blocks("modules")
                .into_iter()
                .map(|m| RsyslogModuleItem {
                    name: expand_enum(m.str("name").as_deref(), "rsyslog_server_list.modules.name"),
                    log_severity_level: expand_enum(
                        m.str("log_severity_level").as_deref(),
                        "rsyslog_server_list.modules.log_severity_level",
                    ),
                    should_log_monitor_files: m.bool("should_log_monitor_files"),
                })
                .collect(),
        ),
        ..Default::default()
    }
}

pub(crate) fn expand_cluster_profile(attrs: Attrs<'_>) -> ClusterProfile {
    ClusterProfile {
        name: attrs.str("name"),
        description: attrs.str("description"),
        allowed_overrides: expand_enum_list(&attrs.strings("allowed_overrides"), "allowed_overrides"),
        name_server_ip_list: expand_ip_address_list(attrs.blocks("name_server_ip_list")),
        ntp_server_ip_list: expand_ip_or_fqdn_list(attrs.blocks("ntp_server_ip_list")),
        smtp_server: expand_smtp_server(attrs.block("smtp_server")),
        nfs_subnet_whitelist: attrs.string_list("nfs_subnet_white_list"),
        snmp_config: expand_snmp_config(attrs.block("snmp_config")),
        rsyslog_server_list: non_empty(
            attrs
                .blocks("rsyslog_server_list")
                .into_iter()
                .map(expand_rsyslog_server)
                .collect(),
        ),
        pulse_status: expand_pulse_status(attrs.block("pulse_status")),
        ..Default::default()
    }
}

// Flatten

/// The configured secrets of an SNMP user with the same name
fn configured_user<'a>(configured: Option<Attrs<'a>>, username: Option<&str>) -> Option<Attrs<'a>> {
    let username = username?;
    configured?
        .block("snmp_config")?
        .blocks("users")
        .into_iter()
        .find(|u| u.str("username").as_deref() == Some(username))
}

fn snmp_config_obj(snmp: &SnmpConfig, configured: Option<Attrs<'_>>) -> Obj {
    let configured_traps = configured
        .and_then(|c| c.block("snmp_config"))
        .map(|c| c.blocks("traps"))
        .unwrap_or_default();

    let users = many(snmp.users.as_ref(), |u| {
        let secrets = configured_user(configured, u.username.as_deref());
        Obj::new()
            .set("ext_id", u.ext_id.as_ref())
            .set("tenant_id", u.tenant_id.as_ref())
            .set("links", flatten_links(u.links.as_ref()))
            .set("username", u.username.as_ref())
            .set_enum("auth_type", u.auth_type.as_ref())
            .set(
                "auth_key",
                secrets.and_then(|s| s.str("auth_key")).or_else(|| u.auth_key.clone()),
            )
            .set_enum("priv_type", u.priv_type.as_ref())
            .set(
                "priv_key",
                secrets.and_then(|s| s.str("priv_key")).or_else(|| u.priv_key.clone()),
            )
    });

    let traps = Dynamic::List(
        snmp.traps
            .iter()
            .flatten()
            .enumerate()
            .map(|(i, t)| {
                let community_string = configured_traps
                    .get(i)
                    .and_then(|c| c.str("community_string"))
                    .or_else(|| t.community_string.clone());
                Obj::new()
                    .set("ext_id", t.ext_id.as_ref())
                    .set("tenant_id", t.tenant_id.as_ref())
                    .set("links", flatten_links(t.links.as_ref()))
                    .set("address", flatten_ip_address(t.address.as_ref()))
                    .set("username", t.username.as_ref())
                    .set_enum("protocol", t.protocol.as_ref())
                    .set("port", t.port)
                    .set("should_inform", t.should_inform)
                    .set("engine_id", t.engine_id.as_ref())
                    .set_enum("version", t.version.as_ref())
                    .set("receiver_name", t.receiver_name.as_ref())
                    .set("community_string", community_string)
                    .build()
            })
            .collect(),
    );

    Obj::new()
        .set("ext_id", snmp.ext_id.as_ref())
        .set("tenant_id", snmp.tenant_id.as_ref())
        .set("links", flatten_links(snmp.links.as_ref()))
        .set("is_enabled", snmp.is_enabled)
        .set("users", users)
        .set(
            "transports",
            many(snmp.transports.as_ref(), |t| {
                Obj::new()
                    .set_enum("protocol", t.protocol.as_ref())
                    .set("port", t.port)
            }),
        )
        .set("traps", traps)
}

fn rsyslog_server_obj(server: &RsyslogServer) -> Obj {
    Obj::new()
        .set("ext_id", server.ext_id.as_ref())
        .set("tenant_id", server.tenant_id.as_ref())
        .set("links", flatten_links(server.links.as_ref()))
        .set("server_name", server.server_name.as_ref())
        .set("ip_address", flatten_ip_address(server.ip_address.as_ref()))
        .set("port", server.port)
        .set_enum("network_protocol", server.network_protocol.as_ref())
        .set(
            "modules",
            many(server.modules.as_ref(), |m| {
                Obj::new()
                    .set_enum("name", m.name.as_ref())
                    .set_enum("log_severity_level", m.log_severity_level.as_ref())
                    .set("should_log_monitor_files", m.should_log_monitor_files)
            }),
        )
}

fn managed_cluster_obj(cluster: &ManagedCluster) -> Obj {
    Obj::new()
        .set("ext_id", cluster.ext_id.as_ref())
        .set("is_compliant", cluster.is_compliant)
        .set("last_synced_time", cluster.last_synced_time.as_ref())
        .set_enum_list("config_drifts", cluster.config_drifts.as_ref())
}

/// Every attribute the API reports for a profile. Secrets the API hides are
/// taken from `configured` when given.
pub(crate) fn cluster_profile_obj(profile: &ClusterProfile, configured: Option<Attrs<'_>>) -> Obj {
    let smtp_password = configured.and_then(configured_smtp_password);
    let snmp = match profile.snmp_config.as_ref() {
        Some(snmp) => Dynamic::List(vec![snmp_config_obj(snmp, configured).build()]),
        None => Dynamic::List(vec![]),
    };

    Obj::new()
        .set("ext_id", profile.ext_id.as_ref())
        .set("tenant_id", profile.tenant_id.as_ref())
        .set("links", flatten_links(profile.links.as_ref()))
        .set("name", profile.name.as_ref())
        .set("description", profile.description.as_ref())
        .set("create_time", profile.create_time.as_ref())
        .set("last_update_time", profile.last_update_time.as_ref())
        .set("created_by", profile.created_by.as_ref())
        .set("last_updated_by", profile.last_updated_by.as_ref())
        .set("cluster_count", profile.cluster_count)
        .set("drifted_cluster_count", profile.drifted_cluster_count)
        .set("clusters", many(profile.clusters.as_ref(), managed_cluster_obj))
        .set_enum_list("allowed_overrides", profile.allowed_overrides.as_ref())
        .set(
            "name_server_ip_list",
            flatten_ip_address_list(profile.name_server_ip_list.as_ref()),
        )
        .set(
            "ntp_server_ip_list",
            flatten_ip_or_fqdn_list(profile.ntp_server_ip_list.as_ref()),
        )
        .set(
            "smtp_server",
            flatten_smtp_server(profile.smtp_server.as_ref(), smtp_password),
        )
        .set_strings("nfs_subnet_white_list", profile.nfs_subnet_whitelist.as_ref())
        .set("snmp_config", snmp)
        .set(
            "rsyslog_server_list",
            many(profile.rsyslog_server_list.as_ref(), rsyslog_server_obj),
        )
        .set("pulse_status", flatten_pulse_status(profile.pulse_status.as_ref()))
}

/// Update body: the fields whose attribute changed, plus the name, which the
/// API always requires
fn changed_fields(
    desired: ClusterProfile,
    current_name: Option<String>,
    prior: &DynamicValue,
    planned: &DynamicValue,
) -> ClusterProfile {
    let changed = |key: &str| has_change(prior, planned, key);
    let mut body = ClusterProfile {
        name: if changed("name") {
            desired.name.clone()
        } else {
            current_name.or_else(|| desired.name.clone())
        },
        ..Default::default()
    };

    macro_rules! overlay {
        ($($field:ident),+ $(,)?) => {
            $(if changed(stringify!($field)) {
                body.$field = desired.$field;
            })+
        };
    }

    overlay!(
        description,
        allowed_overrides,
        name_server_ip_list,
        ntp_server_ip_list,
        smtp_server,
        snmp_config,
        rsyslog_server_list,
        pulse_status,
    );
    if changed("nfs_subnet_white_list") {
        body.nfs_subnet_whitelist = desired.nfs_subnet_whitelist;
    }
    body
}

#[async_trait]
impl Resource for ClusterProfileResource {
    fn type_name(&self) -> &str {
        "nutanix_cluster_profile_v2"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        let builder = SchemaBuilder::new()
            .version(0)
            .description("Manages a cluster profile")
            .attribute(id_attribute())
            .attribute(computed("ext_id", AttributeType::String))
            .attribute(
                AttributeBuilder::new("dryrun", AttributeType::Bool)
                    .description("Validate updates without applying them")
                    .optional()
                    .default(StaticDefault::bool(false))
                    .build(),
            );

        ResourceSchemaResponse {
            schema: cluster_profile_fields(builder, Mode::Input).build(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        let mut diagnostics = vec![];

        let attrs = Attrs::of(&request.config);
        if let Some(snmp) = attrs.block("snmp_config") {
            for (i, user) in snmp.blocks("users").iter().enumerate() {
                if user.is_set("priv_key") && !user.is_set("priv_type") {
                    diagnostics.push(
                        Diagnostic::error(
                            "Missing privacy type",
                            "priv_type must be set together with priv_key",
                        )
                        .with_attribute(
                            AttributePath::new("snmp_config")
                                .index(0)
                                .attribute("users")
                                .index(i as i64)
                                .attribute("priv_type"),
                        ),
                    );
                }
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

        let body = expand_cluster_profile(Attrs::of(&request.planned_state));
        let task = match data.client.clustermgmt().cluster_profiles().create(&body).await {
            Ok(task) => task,
            Err(e) => {
                diagnostics.push(api_error("error while creating cluster profile", &e));
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        let ext_id = match data
            .waiter
            .wait_for_entity(&ctx, &task, CLUSTER_PROFILE_REL, data.timeout())
            .await
        {
            Ok(ext_id) => ext_id,
            Err(e) => {
                diagnostics.push(task_error(
                    "cluster profile to create",
                    task.ext_id.as_deref(),
                    &e,
                ));
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };
        info!(ext_id = %ext_id, "created cluster profile");

        match self.fetch(data, &ext_id, &request.planned_state).await {
            Ok(Some(state)) => CreateResourceResponse {
                new_state: state,
                diagnostics,
            },
            Ok(None) => {
                diagnostics.push(Diagnostic::error(
                    "Cluster profile not found",
                    format!("cluster profile {} vanished right after creation", ext_id),
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

        let Some(ext_id) = profile_ext_id(&request.current_state) else {
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
                debug!(ext_id = %ext_id, "cluster profile is gone, dropping it from state");
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

        let Some(ext_id) = profile_ext_id(&request.prior_state) else {
            diagnostics.push(Diagnostic::error(
                "Missing cluster profile id",
                "the prior state has no ext_id",
            ));
            return UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics,
            };
        };

        let api = data.client.clustermgmt().cluster_profiles();
        let current = match api.get(&ext_id).await {
            Ok(current) => current,
            Err(e) => {
                diagnostics.push(api_error("error while fetching cluster profile", &e));
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        };

        let body = changed_fields(
            expand_cluster_profile(Attrs::of(&request.planned_state)),
            current.data.and_then(|p| p.name),
            &request.prior_state,
            &request.planned_state,
        );
        let dryrun = request
            .planned_state
            .get_optional_bool(&AttributePath::new("dryrun"));
        debug!(ext_id = %ext_id, dryrun = ?dryrun, "updating cluster profile");

        let task = match api.update(&ext_id, &body, dryrun, &current.etag).await {
            Ok(task) => task,
            Err(e) => {
                diagnostics.push(api_error("error while updating cluster profile", &e));
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        };

        if let Err(e) = data.waiter.wait(&ctx, &task, data.timeout()).await {
            diagnostics.push(task_error(
                "cluster profile to update",
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
                    "Cluster profile not found",
                    format!("cluster profile {} vanished during update", ext_id),
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

        let Some(ext_id) = profile_ext_id(&request.prior_state) else {
            return DeleteResourceResponse { diagnostics };
        };

        let task = match data.client.clustermgmt().cluster_profiles().delete(&ext_id).await {
            Ok(task) => task,
            Err(e) => {
                diagnostics.push(api_error("error while deleting cluster profile", &e));
                return DeleteResourceResponse { diagnostics };
            }
        };

        if let Err(e) = data.waiter.wait(&ctx, &task, data.timeout()).await {
            diagnostics.push(task_error(
                "cluster profile to delete",
                task.ext_id.as_deref(),
                &e,
            ));
        } else {
            info!(ext_id = %ext_id, "deleted cluster profile");
        }

        DeleteResourceResponse { diagnostics }
    }
}

#[async_trait]
impl ResourceWithConfigure for ClusterProfileResource {
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

#[path = "./resource_cluster_profile_test.rs"]
mod resource_cluster_profile_test;
