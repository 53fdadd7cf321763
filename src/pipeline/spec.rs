//! Pipeline descriptions handed to the provisioning device.
//!
//! Both supported pipelines match all outer IPv4/UDP traffic and differ
//! only in what they do with it: hairpin forwards to a physical port,
//! RSS-meta tags packets with metadata and spreads them over RSS queues.

use std::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;

/// Which hardware pipeline a strategy provisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineKind {
    Hairpin,
    RssMeta,
}

impl PipelineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineKind::Hairpin => "hairpin",
            PipelineKind::RssMeta => "rss_meta",
        }
    }
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum L3Type {
    Ipv4,
    Ipv6,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum L4Type {
    Udp,
    Tcp,
}

/// Outer-header match criteria.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchSpec {
    pub outer_l4_type: L4Type,
    pub outer_l3_type: L3Type,
    pub src_ip: Ipv4Addr,
    pub dst_ip: Ipv4Addr,
    pub src_port: u16,
    pub dst_port: u16,
}

impl MatchSpec {
    /// Match any outer IPv4/UDP packet.
    pub fn any_udp_ipv4() -> Self {
        Self {
            outer_l4_type: L4Type::Udp,
            outer_l3_type: L3Type::Ipv4,
            src_ip: Ipv4Addr::UNSPECIFIED,
            dst_ip: Ipv4Addr::BROADCAST,
            src_port: 0,
            dst_port: u16::MAX,
        }
    }
}

/// Inner header types considered by RSS hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RssFlag {
    Ipv4,
    Udp,
}

/// What the pipeline does with matched packets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineAction {
    /// Forward to a physical port.
    Forward { port_id: u16 },
    /// Attach packet metadata and distribute over RSS queues.
    RssMeta {
        pkt_meta: u32,
        rss_queues: Vec<u16>,
        rss_inner_flags: Vec<RssFlag>,
    },
}

/// Complete pipeline description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineSpec {
    pub kind: PipelineKind,
    #[serde(rename = "match")]
    pub match_spec: MatchSpec,
    pub action: PipelineAction,
}

impl PipelineSpec {
    pub fn hairpin(port_id: u16) -> Self {
        Self {
            kind: PipelineKind::Hairpin,
            match_spec: MatchSpec::any_udp_ipv4(),
            action: PipelineAction::Forward { port_id },
        }
    }

    pub fn rss_meta(pkt_meta: u32, rss_queues: Vec<u16>) -> Self {
        Self {
            kind: PipelineKind::RssMeta,
            match_spec: MatchSpec::any_udp_ipv4(),
            action: PipelineAction::RssMeta {
                pkt_meta,
                rss_queues,
                rss_inner_flags: vec![RssFlag::Ipv4, RssFlag::Udp],
            },
        }
    }

    /// Build the spec for `kind` from pipeline configuration.
    pub fn from_config(kind: PipelineKind, config: &PipelineConfig) -> Self {
        match kind {
            PipelineKind::Hairpin => Self::hairpin(config.hairpin_port_id),
            PipelineKind::RssMeta => Self::rss_meta(config.pkt_meta, config.rss_queues.clone()),
        }
    }
}
