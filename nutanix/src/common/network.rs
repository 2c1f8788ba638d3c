//! SMTP and pulse blocks, shared by clusters and cluster profiles

use tfplug::schema::{AttributeBuilder, AttributeType, BlockBuilder, NestedBlock};
use tfplug::types::Dynamic;

use super::attrs::Attrs;
use super::obj::{single, Obj};
use super::schema::{
    computed, expand_ip_or_fqdn, flatten_ip_or_fqdn, ip_or_fqdn_block, one_of,
    optional_computed, Mode,
};
use crate::api::clustermgmt::clusters::{PulseStatus, SmtpNetwork, SmtpServerRef};
use crate::enums::{expand_enum, PiiScrubbingLevel, SmtpType};

/// Same shape as an nfs subnet whitelist entry: `x.x.x.x/y.y.y.y`
pub const SUBNET_MASK_PATTERN: &str = r"^\b(?:\d{1,3}\.){3}\d{1,3}/(?:\d{1,3}\.){3}\d{1,3}\b$";

fn field(name: &str, kind: AttributeType, mode: Mode) -> tfplug::schema::Attribute {
    match mode {
        Mode::Input => optional_computed(name, kind),
        Mode::Computed => computed(name, kind),
    }
}

pub fn smtp_server_block(mode: Mode) -> NestedBlock {
    let password = match mode {
        Mode::Input => AttributeBuilder::new("password", AttributeType::String)
            .description("Password of the SMTP server")
            .optional()
            .sensitive()
            .build(),
        Mode::Computed => AttributeBuilder::new("password", AttributeType::String)
            .computed()
            .sensitive()
            .build(),
    };
    let server = BlockBuilder::new()
        .block(ip_or_fqdn_block("ip_address", mode))
        .attribute(field("port", AttributeType::Number, mode))
        .attribute(field("username", AttributeType::String, mode))
        .attribute(password)
        .build();

    let smtp_type = match mode {
        Mode::Input => AttributeBuilder::new("type", AttributeType::String)
            .description("SMTP transport: PLAIN, STARTTLS or SSL")
            .optional()
            .computed()
            .validator(one_of::<SmtpType>())
            .build(),
        Mode::Computed => computed("type", AttributeType::String),
    };

    NestedBlock::list(
        "smtp_server",
        BlockBuilder::new()
            .attribute(field("email_address", AttributeType::String, mode))
            .block(NestedBlock::list("server", server).max_items(1))
            .attribute(smtp_type)
            .build(),
    )
    .max_items(1)
}

pub fn pulse_status_block(mode: Mode) -> NestedBlock {
    let level = match mode {
        Mode::Input => AttributeBuilder::new("pii_scrubbing_level", AttributeType::String)
            .optional()
            .computed()
            .validator(one_of::<PiiScrubbingLevel>())
            .build(),
        Mode::Computed => computed("pii_scrubbing_level", AttributeType::String),
    };
    NestedBlock::list(
        "pulse_status",
        BlockBuilder::new()
            .attribute(field("is_enabled", AttributeType::Bool, mode))
            .attribute(level)
            .build(),
    )
    .max_items(1)
}

pub fn expand_smtp_server(attrs: Option<Attrs<'_>>) -> Option<SmtpServerRef> {
    let attrs = attrs?;
    Some(SmtpServerRef {
        email_address: attrs.str("email_address"),
        server: attrs.block("server").map(|server| SmtpNetwork {
            ip_address: expand_ip_or_fqdn(server.block("ip_address")),
            port: server.i64("port"),
            username: server.str("username"),
            password: server.str("password"),
        }),
        smtp_type: expand_enum(attrs.str("type").as_deref(), "smtp_server.type"),
    })
}

/// The SMTP password as configured, to keep in state when the API hides it
pub fn configured_smtp_password(attrs: Attrs<'_>) -> Option<String> {
    attrs
        .block("smtp_server")?
        .block("server")?
        .str("password")
}

pub fn flatten_smtp_server(smtp: Option<&SmtpServerRef>, password: Option<String>) -> Dynamic {
    single(smtp, |smtp| {
        Obj::new()
            .set("email_address", smtp.email_address.as_ref())
            .set(
                "server",
                single(smtp.server.as_ref(), |server| {
                    Obj::new()
                        .set("ip_address", flatten_ip_or_fqdn(server.ip_address.as_ref()))
                        .set("port", server.port)
                        .set("username", server.username.as_ref())
                        .set(
                            "password",
                            password.clone().or_else(|| server.password.clone()),
                        )
                }),
            )
            .set_enum("type", smtp.smtp_type.as_ref())
    })
}

pub fn expand_pulse_status(attrs: Option<Attrs<'_>>) -> Option<PulseStatus> {
    let attrs = attrs?;
    Some(PulseStatus {
        is_enabled: attrs.bool("is_enabled"),
        pii_scrubbing_level: expand_enum(
            attrs.str("pii_scrubbing_level").as_deref(),
            "pulse_status.pii_scrubbing_level",
        ),
    })
}

pub fn flatten_pulse_status(pulse: Option<&PulseStatus>) -> Dynamic {
    single(pulse, |p| {
        Obj::new()
            .set("is_enabled", p.is_enabled)
            .set_enum("pii_scrubbing_level", p.pii_scrubbing_level.as_ref())
    })
}
