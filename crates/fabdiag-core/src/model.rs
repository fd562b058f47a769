//! Uniform fabric graph: nodes, typed links and the topology aggregate.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const SPINE_ROLE: &str = "spine";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Switch,
    Server,
    Gateway,
    External,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Switch => "switch",
            Self::Server => "server",
            Self::Gateway => "gateway",
            Self::External => "external",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Fabric,
    Mclag,
    Bundled,
    Unbundled,
    Eslag,
    Gateway,
    External,
}

impl LinkKind {
    pub const ALL: [LinkKind; 7] = [
        Self::Fabric,
        Self::Mclag,
        Self::Bundled,
        Self::Unbundled,
        Self::Eslag,
        Self::Gateway,
        Self::External,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fabric => "fabric",
            Self::Mclag => "mclag",
            Self::Bundled => "bundled",
            Self::Unbundled => "unbundled",
            Self::Eslag => "eslag",
            Self::Gateway => "gateway",
            Self::External => "external",
        }
    }

    /// Link kinds that attach a server to a leaf.
    pub fn is_server_attachment(self) -> bool {
        matches!(
            self,
            Self::Mclag | Self::Bundled | Self::Unbundled | Self::Eslag
        )
    }
}

/// Sub-type of an `mclag` link. A link without one is an MCLAG server link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum McLagRole {
    Peer,
    Session,
}

/// Splits `"<node>/<port>"` and returns the node part.
pub fn port_node(port: &str) -> &str {
    port.split_once('/').map_or(port, |(node, _)| node)
}

/// Splits `"<node>/<port>"` and returns the port part (`E1/1` for `leaf-01/E1/1`).
pub fn port_name(port: &str) -> &str {
    port.split_once('/').map_or(port, |(_, name)| name)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, String>,
}

impl Node {
    fn base(id: &str, kind: NodeKind, description: Option<&str>) -> Self {
        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        let mut properties = IndexMap::new();
        if let Some(d) = &description {
            properties.insert("description".to_string(), d.clone());
        }
        Self {
            id: id.to_string(),
            kind,
            label: id.to_string(),
            role: None,
            description,
            properties,
        }
    }

    /// A switch node; the role is appended to the label on its own line.
    pub fn switch(id: &str, role: Option<&str>, description: Option<&str>) -> Self {
        let mut node = Self::base(id, NodeKind::Switch, description);
        if let Some(role) = role.map(str::trim).filter(|r| !r.is_empty()) {
            node.label = format!("{id}\n{role}");
            node.role = Some(role.to_string());
            node.properties.insert("role".to_string(), role.to_string());
        }
        node
    }

    pub fn server(id: &str, description: Option<&str>) -> Self {
        Self::base(id, NodeKind::Server, description)
    }

    pub fn gateway(id: &str, description: Option<&str>) -> Self {
        let mut node = Self::base(id, NodeKind::Gateway, description);
        node.properties
            .insert("role".to_string(), "gateway".to_string());
        node
    }

    pub fn external(id: &str) -> Self {
        Self::base(id, NodeKind::External, None)
    }

    pub fn is_spine(&self) -> bool {
        self.kind == NodeKind::Switch && self.role.as_deref() == Some(SPINE_ROLE)
    }

    pub fn is_leaf(&self) -> bool {
        self.kind == NodeKind::Switch && !self.is_spine()
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub source: String,
    pub target: String,
    pub kind: LinkKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mclag: Option<McLagRole>,
    #[serde(
        rename = "sourcePort",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub source_port: Option<String>,
    #[serde(
        rename = "targetPort",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub target_port: Option<String>,
}

impl Link {
    /// Builds a link from two port-qualified endpoints (`"<node>/<port>"`).
    pub fn between_ports(kind: LinkKind, source_port: &str, target_port: &str) -> Self {
        Self {
            source: port_node(source_port).to_string(),
            target: port_node(target_port).to_string(),
            kind,
            mclag: None,
            source_port: Some(source_port.to_string()),
            target_port: Some(target_port.to_string()),
        }
    }

    pub fn with_mclag(mut self, role: McLagRole) -> Self {
        self.mclag = Some(role);
        self
    }

    pub fn source_port_name(&self) -> Option<&str> {
        self.source_port.as_deref().map(port_name)
    }

    pub fn target_port_name(&self) -> Option<&str> {
        self.target_port.as_deref().map(port_name)
    }

    pub fn touches(&self, id: &str) -> bool {
        self.source == id || self.target == id
    }

    /// Returns the far endpoint when `id` is one of this link's endpoints.
    pub fn other_end(&self, id: &str) -> Option<&str> {
        if self.source == id {
            Some(&self.target)
        } else if self.target == id {
            Some(&self.source)
        } else {
            None
        }
    }

    fn dedup_key(&self) -> (&str, &str, LinkKind, Option<&str>) {
        (
            &self.source,
            &self.target,
            self.kind,
            self.target_port.as_deref(),
        )
    }

    fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.source
            .cmp(&other.source)
            .then_with(|| self.target.cmp(&other.target))
            .then_with(|| self.kind.cmp(&other.kind))
            .then_with(|| self.target_port.cmp(&other.target_port))
            .then_with(|| self.mclag.cmp(&other.mclag))
            .then_with(|| self.source_port.cmp(&other.source_port))
    }
}

/// The node set and link set passed between pipeline stages.
///
/// Nodes are kept sorted by id and links in a canonical order, so the order in which records
/// were read never shows up in rendered output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    nodes: Vec<Node>,
    links: Vec<Link>,
}

impl Topology {
    /// Assembles a topology. Duplicate node ids keep the first node, links are deduplicated by
    /// `(source, target, kind, targetPort)` and links with an unknown endpoint are dropped.
    pub fn from_parts(nodes: Vec<Node>, links: Vec<Link>) -> Self {
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut nodes: Vec<Node> = nodes
            .into_iter()
            .filter(|n| seen.insert(n.id.clone()))
            .collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));

        let mut links = links;
        links.sort_by(Link::canonical_cmp);
        // The dedup key is a prefix of the canonical order, so duplicates are adjacent.
        links.dedup_by(|b, a| a.dedup_key() == b.dedup_key());

        let before = links.len();
        links.retain(|l| seen.contains(&l.source) && seen.contains(&l.target));
        if links.len() != before {
            tracing::debug!(
                dropped = before - links.len(),
                "dropped links with unresolved endpoints"
            );
        }

        Self { nodes, links }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes
            .binary_search_by(|n| n.id.as_str().cmp(id))
            .ok()
            .map(|i| &self.nodes[i])
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of links touching `id`.
    pub fn degree(&self, id: &str) -> usize {
        self.links.iter().filter(|l| l.touches(id)).count()
    }

    pub fn has_link_kind(&self, kind: LinkKind) -> bool {
        self.links.iter().any(|l| l.kind == kind)
    }
}
