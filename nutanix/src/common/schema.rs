//! Schema fragments shared by resources and data sources
//!
//! IP addresses travel as nested blocks: `ipv4 { value, prefix_length }`,
//! `ipv6 { value, prefix_length }` and `fqdn { value }`, each at most once.

use tfplug::defaults::StaticDefault;
use tfplug::plan_modifier::UseStateForUnknown;
use tfplug::schema::{
    Attribute, AttributeBuilder, AttributeType, Block, BlockBuilder, NestedBlock, Validator,
};
use tfplug::types::Dynamic;
use tfplug::validator::StringInSlice;

use super::attrs::Attrs;
use super::obj::{many, single, Obj};
use crate::api::common::{
    ApiLink, Fqdn, IPAddress, IPAddressOrFQDN, IPv4Address, IPv6Address,
};
use crate::enums::ApiEnum;

pub const IPV4_DEFAULT_PREFIX: i64 = 32;
pub const IPV6_DEFAULT_PREFIX: i64 = 128;

/// Whether a fragment is configurable or only reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Input,
    Computed,
}

pub fn computed(name: &str, kind: AttributeType) -> Attribute {
    AttributeBuilder::new(name, kind).computed().build()
}

pub fn optional_computed(name: &str, kind: AttributeType) -> Attribute {
    AttributeBuilder::new(name, kind).optional().computed().build()
}

/// Required when configurable, computed otherwise
pub fn required_in(mode: Mode, name: &str, kind: AttributeType) -> AttributeBuilder {
    match mode {
        Mode::Input => AttributeBuilder::new(name, kind).required(),
        Mode::Computed => AttributeBuilder::new(name, kind).computed(),
    }
}

/// Optional when configurable, computed otherwise
pub fn optional_in(mode: Mode, name: &str, kind: AttributeType) -> AttributeBuilder {
    match mode {
        Mode::Input => AttributeBuilder::new(name, kind).optional(),
        Mode::Computed => AttributeBuilder::new(name, kind).computed(),
    }
}

/// Accepts the wire names of `E`
pub fn one_of<E: ApiEnum>() -> Box<dyn Validator> {
    StringInSlice::create(E::NAMES)
}

/// Terraform's implicit resource id
pub fn id_attribute() -> Attribute {
    AttributeBuilder::new("id", AttributeType::String)
        .description("Identifier of this object in state")
        .computed()
        .plan_modifier(UseStateForUnknown::create())
        .build()
}

fn prefixed_value_block(default_prefix: i64, mode: Mode) -> Block {
    match mode {
        Mode::Input => BlockBuilder::new()
            .attribute(
                AttributeBuilder::new("value", AttributeType::String)
                    .description("The address")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("prefix_length", AttributeType::Number)
                    .description("Prefix length of the network")
                    .optional()
                    .default(StaticDefault::number(default_prefix as f64))
                    .build(),
            )
            .build(),
        Mode::Computed => BlockBuilder::new()
            .attribute(computed("value", AttributeType::String))
            .attribute(computed("prefix_length", AttributeType::Number))
            .build(),
    }
}

pub fn ipv4_block(mode: Mode) -> NestedBlock {
    ipv4_value_block("ipv4", mode)
}

/// A single `{value, prefix_length}` IPv4 block under its own name
pub fn ipv4_value_block(name: &str, mode: Mode) -> NestedBlock {
    NestedBlock::list(name, prefixed_value_block(IPV4_DEFAULT_PREFIX, mode)).max_items(1)
}

pub fn ipv6_block(mode: Mode) -> NestedBlock {
    NestedBlock::list("ipv6", prefixed_value_block(IPV6_DEFAULT_PREFIX, mode)).max_items(1)
}

pub fn fqdn_block(mode: Mode) -> NestedBlock {
    let value = match mode {
        Mode::Input => AttributeBuilder::new("value", AttributeType::String)
            .description("Fully qualified domain name")
            .optional()
            .build(),
        Mode::Computed => computed("value", AttributeType::String),
    };
    NestedBlock::list("fqdn", BlockBuilder::new().attribute(value).build()).max_items(1)
}

pub fn ip_address_fields(mode: Mode) -> Block {
    BlockBuilder::new()
        .block(ipv4_block(mode))
        .block(ipv6_block(mode))
        .build()
}

pub fn ip_or_fqdn_fields(mode: Mode) -> Block {
    BlockBuilder::new()
        .block(ipv4_block(mode))
        .block(ipv6_block(mode))
        .block(fqdn_block(mode))
        .build()
}

/// A single `{ipv4, ipv6}` block
pub fn ip_address_block(name: &str, mode: Mode) -> NestedBlock {
    NestedBlock::list(name, ip_address_fields(mode)).max_items(1)
}

/// A list of `{ipv4, ipv6}` blocks
pub fn ip_address_list_block(name: &str, mode: Mode) -> NestedBlock {
    NestedBlock::list(name, ip_address_fields(mode))
}

pub fn ip_or_fqdn_block(name: &str, mode: Mode) -> NestedBlock {
    NestedBlock::list(name, ip_or_fqdn_fields(mode)).max_items(1)
}

pub fn ip_or_fqdn_list_block(name: &str, mode: Mode) -> NestedBlock {
    NestedBlock::list(name, ip_or_fqdn_fields(mode))
}

pub fn links_block() -> NestedBlock {
    NestedBlock::list(
        "links",
        BlockBuilder::new()
            .attribute(computed("href", AttributeType::String))
            .attribute(computed("rel", AttributeType::String))
            .build(),
    )
}

// Expand

pub fn expand_ipv4(attrs: Option<Attrs<'_>>) -> Option<IPv4Address> {
    let attrs = attrs?;
    Some(IPv4Address {
        value: attrs.str("value"),
        prefix_length: attrs.i64("prefix_length"),
    })
}

pub fn expand_ipv6(attrs: Option<Attrs<'_>>) -> Option<IPv6Address> {
    let attrs = attrs?;
    Some(IPv6Address {
        value: attrs.str("value"),
        prefix_length: attrs.i64("prefix_length"),
    })
}

pub fn expand_fqdn(attrs: Option<Attrs<'_>>) -> Option<Fqdn> {
    let attrs = attrs?;
    Some(Fqdn {
        value: attrs.str("value"),
    })
}

pub fn expand_ip_address(attrs: Option<Attrs<'_>>) -> Option<IPAddress> {
    let attrs = attrs?;
    Some(IPAddress {
        ipv4: expand_ipv4(attrs.block("ipv4")),
        ipv6: expand_ipv6(attrs.block("ipv6")),
    })
}

pub fn expand_ip_address_list(blocks: Vec<Attrs<'_>>) -> Option<Vec<IPAddress>> {
    let list: Vec<IPAddress> = blocks
        .into_iter()
        .filter_map(|b| expand_ip_address(Some(b)))
        .collect();
    (!list.is_empty()).then_some(list)
}

pub fn expand_ip_or_fqdn(attrs: Option<Attrs<'_>>) -> Option<IPAddressOrFQDN> {
    let attrs = attrs?;
    Some(IPAddressOrFQDN {
        ipv4: expand_ipv4(attrs.block("ipv4")),
        ipv6: expand_ipv6(attrs.block("ipv6")),
        fqdn: expand_fqdn(attrs.block("fqdn")),
    })
}

pub fn expand_ip_or_fqdn_list(blocks: Vec<Attrs<'_>>) -> Option<Vec<IPAddressOrFQDN>> {
    let list: Vec<IPAddressOrFQDN> = blocks
        .into_iter()
        .filter_map(|b| expand_ip_or_fqdn(Some(b)))
        .collect();
    (!list.is_empty()).then_some(list)
}

// Flatten

fn flatten_prefixed(value: &Option<String>, prefix_length: &Option<i64>) -> Obj {
    Obj::new()
        .set("value", value.clone())
        .set("prefix_length", *prefix_length)
}

pub fn flatten_ipv4(ip: Option<&IPv4Address>) -> Dynamic {
    single(ip, |ip| flatten_prefixed(&ip.value, &ip.prefix_length))
}

pub fn flatten_ipv6(ip: Option<&IPv6Address>) -> Dynamic {
    single(ip, |ip| flatten_prefixed(&ip.value, &ip.prefix_length))
}

pub fn flatten_fqdn(fqdn: Option<&Fqdn>) -> Dynamic {
    single(fqdn, |f| Obj::new().set("value", f.value.clone()))
}

pub fn ip_address_obj(ip: &IPAddress) -> Obj {
    Obj::new()
        .set("ipv4", flatten_ipv4(ip.ipv4.as_ref()))
        .set("ipv6", flatten_ipv6(ip.ipv6.as_ref()))
}

pub fn ip_or_fqdn_obj(ip: &IPAddressOrFQDN) -> Obj {
    Obj::new()
        .set("ipv4", flatten_ipv4(ip.ipv4.as_ref()))
        .set("ipv6", flatten_ipv6(ip.ipv6.as_ref()))
        .set("fqdn", flatten_fqdn(ip.fqdn.as_ref()))
}

pub fn flatten_ip_address(ip: Option<&IPAddress>) -> Dynamic {
    single(ip, ip_address_obj)
}

pub fn flatten_ip_address_list(ips: Option<&Vec<IPAddress>>) -> Dynamic {
    many(ips, ip_address_obj)
}

pub fn flatten_ip_or_fqdn(ip: Option<&IPAddressOrFQDN>) -> Dynamic {
    single(ip, ip_or_fqdn_obj)
}

pub fn flatten_ip_or_fqdn_list(ips: Option<&Vec<IPAddressOrFQDN>>) -> Dynamic {
    many(ips, ip_or_fqdn_obj)
}

pub fn flatten_links(links: Option<&Vec<ApiLink>>) -> Dynamic {
    many(links, |l| {
        Obj::new()
            .set("href", l.href.clone())
            .set("rel", l.rel.clone())
    })
}
