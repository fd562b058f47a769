//! Record list → [`Topology`].
//!
//! Records without a name, spec values of the wrong shape and link entries with missing ports
//! are skipped and logged at `debug`, never reported as errors.

use crate::model::{Link, LinkKind, McLagRole, Node, NodeKind, Topology, port_node};
use crate::record::{Record, RecordKind};
use rustc_hash::FxHashSet;
use serde_json::Value;
use std::collections::BTreeMap;

/// How one connection key lays out its link entries.
struct LinkShape {
    key: &'static str,
    kind: LinkKind,
    /// Field holding the entries; `single` entries are one object instead of a list.
    list: &'static str,
    single: bool,
    source: &'static str,
    target: &'static str,
    mclag: Option<McLagRole>,
}

const LINK_SHAPES: &[LinkShape] = &[
    LinkShape {
        key: "fabric",
        kind: LinkKind::Fabric,
        list: "links",
        single: false,
        source: "spine",
        target: "leaf",
        mclag: None,
    },
    LinkShape {
        key: "mclag",
        kind: LinkKind::Mclag,
        list: "links",
        single: false,
        source: "server",
        target: "switch",
        mclag: None,
    },
    LinkShape {
        key: "bundled",
        kind: LinkKind::Bundled,
        list: "links",
        single: false,
        source: "server",
        target: "switch",
        mclag: None,
    },
    LinkShape {
        key: "unbundled",
        kind: LinkKind::Unbundled,
        list: "link",
        single: true,
        source: "server",
        target: "switch",
        mclag: None,
    },
    LinkShape {
        key: "eslag",
        kind: LinkKind::Eslag,
        list: "links",
        single: false,
        source: "server",
        target: "switch",
        mclag: None,
    },
    LinkShape {
        key: "mclagDomain",
        kind: LinkKind::Mclag,
        list: "peerLinks",
        single: false,
        source: "switch1",
        target: "switch2",
        mclag: Some(McLagRole::Peer),
    },
    LinkShape {
        key: "mclagDomain",
        kind: LinkKind::Mclag,
        list: "sessionLinks",
        single: false,
        source: "switch1",
        target: "switch2",
        mclag: Some(McLagRole::Session),
    },
    LinkShape {
        key: "gateway",
        kind: LinkKind::Gateway,
        list: "links",
        single: false,
        source: "gateway",
        target: "switch",
        mclag: None,
    },
];

/// Builds a [`Topology`] from a list of typed records.
pub fn extract_topology(records: &[Record]) -> Topology {
    let mut extractor = Extractor::default();
    for record in records {
        extractor.add_record(record);
    }
    extractor.finish()
}

/// Incremental extractor; records can be fed in any order.
#[derive(Debug, Default)]
pub struct Extractor {
    nodes: Vec<Node>,
    node_ids: FxHashSet<String>,
    links: Vec<Link>,
    /// connection name → switch port of its external link
    external_ports: BTreeMap<String, String>,
    /// connection name → external names attached to it
    attachments: BTreeMap<String, Vec<String>>,
}

impl Extractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_record(&mut self, record: &Record) {
        let Some(kind) = record.record_kind() else {
            tracing::debug!(kind = %record.kind, "ignoring record of unknown kind");
            return;
        };
        let Some(name) = record.name() else {
            tracing::debug!(kind = kind.as_str(), "skipping record without a name");
            return;
        };

        match kind {
            RecordKind::Switch => {
                let role = record.spec_str(&["role"]);
                let description = record.spec_str(&["description"]);
                self.push_node(Node::switch(name, role, description));
            }
            RecordKind::Server => {
                let description = record.spec_str(&["description"]);
                self.push_node(Node::server(name, description));
            }
            RecordKind::Node => {
                if has_gateway_role(record) {
                    let description = record.spec_str(&["description"]);
                    self.push_node(Node::gateway(name, description));
                } else {
                    tracing::debug!(name, "dropping node record without gateway role");
                }
            }
            RecordKind::External => self.push_node(Node::external(name)),
            RecordKind::Connection => self.add_connection(name, record),
            RecordKind::ExternalAttachment => {
                let connection = record.spec_str(&["connection"]);
                let external = record.spec_str(&["external"]);
                if let (Some(connection), Some(external)) = (connection, external) {
                    self.attachments
                        .entry(connection.to_string())
                        .or_default()
                        .push(external.to_string());
                } else {
                    tracing::debug!(name, "external attachment without connection/external");
                }
            }
        }
    }

    fn push_node(&mut self, node: Node) {
        if self.node_ids.insert(node.id.clone()) {
            self.nodes.push(node);
        } else {
            tracing::debug!(id = %node.id, "ignoring duplicate node record");
        }
    }

    fn add_connection(&mut self, name: &str, record: &Record) {
        if !record.spec.is_object() {
            tracing::debug!(name, "connection spec is not a map");
            return;
        }

        for shape in LINK_SHAPES {
            let Some(section) = record.spec_at(&[shape.key]) else {
                continue;
            };
            let Some(entries) = section.get(shape.list) else {
                continue;
            };
            if shape.single {
                self.push_link_entry(shape, entries);
            } else if let Some(entries) = entries.as_array() {
                for entry in entries {
                    self.push_link_entry(shape, entry);
                }
            }
        }

        if let Some(port) = record.spec_str(&["external", "link", "switch", "port"]) {
            self.external_ports
                .insert(name.to_string(), port.to_string());
        }
    }

    fn push_link_entry(&mut self, shape: &LinkShape, entry: &Value) {
        let source = entry_port(entry, shape.source);
        let target = entry_port(entry, shape.target);
        let (Some(source), Some(target)) = (source, target) else {
            tracing::debug!(key = shape.key, "skipping link entry without both ports");
            return;
        };
        let mut link = Link::between_ports(shape.kind, source, target);
        link.mclag = shape.mclag;
        self.links.push(link);
    }

    /// Synthesizes external links and assembles the topology.
    pub fn finish(mut self) -> Topology {
        let first_external = self
            .nodes
            .iter()
            .filter(|n| n.kind == NodeKind::External)
            .map(|n| n.id.clone())
            .min();

        let external_ports = std::mem::take(&mut self.external_ports);
        for (connection, switch_port) in &external_ports {
            let attached = self
                .attachments
                .get(connection)
                .and_then(|names| names.iter().min().cloned());
            let external = match attached.or_else(|| first_external.clone()) {
                Some(external) => external,
                None => {
                    tracing::debug!(
                        connection = %connection,
                        "no external declared; adding placeholder external node"
                    );
                    self.push_node(Node::external(connection));
                    connection.clone()
                }
            };

            self.links.push(Link {
                source: external,
                target: port_node(switch_port).to_string(),
                kind: LinkKind::External,
                mclag: None,
                source_port: None,
                target_port: Some(switch_port.clone()),
            });
        }

        Topology::from_parts(self.nodes, self.links)
    }
}

fn has_gateway_role(record: &Record) -> bool {
    record
        .spec_at(&["roles"])
        .and_then(Value::as_array)
        .is_some_and(|roles| roles.iter().any(|r| r.as_str() == Some("gateway")))
}

fn entry_port<'a>(entry: &'a Value, side: &str) -> Option<&'a str> {
    entry
        .get(side)?
        .get("port")?
        .as_str()
        .map(str::trim)
        .filter(|p| !p.is_empty())
}
