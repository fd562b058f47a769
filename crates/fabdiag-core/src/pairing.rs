//! Redundancy inference for dual-homed servers and leaves.
//!
//! Nothing in the wiring records says "these two servers form a redundancy group". Pairs are
//! inferred from connectivity: two servers wired to exactly the same leaves with the same link
//! kinds are partners, MCLAG when any of those links is `mclag`, otherwise ESLAG when any is
//! `eslag`. This is best-effort presentation logic and it silently leaves anomalies unpaired
//! (a third server with an identical pattern keeps no partner).

use crate::layers::LayeredNodes;
use crate::model::{LinkKind, McLagRole, NodeKind, Topology};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Server endpoints are recognized by name.
pub const SERVER_PREFIX: &str = "server-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Redundancy {
    Mclag,
    Eslag,
}

impl Redundancy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mclag => "MCLAG",
            Self::Eslag => "ESLAG",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partner {
    pub id: String,
    pub redundancy: Redundancy,
}

/// Working state for one server attached to one or more leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConnection {
    pub server: String,
    /// leaf id → sorted kinds of the links reaching it
    pub leaves: BTreeMap<String, Vec<LinkKind>>,
    pub primary: Option<String>,
    pub secondary: Option<String>,
    pub partner: Option<Partner>,
}

impl ServerConnection {
    pub fn is_multi_homed(&self) -> bool {
        self.leaves.len() > 1
    }

    fn redundancy(&self) -> Option<Redundancy> {
        let kinds = || self.leaves.values().flatten();
        if kinds().any(|k| *k == LinkKind::Mclag) {
            Some(Redundancy::Mclag)
        } else if kinds().any(|k| *k == LinkKind::Eslag) {
            Some(Redundancy::Eslag)
        } else {
            None
        }
    }
}

/// Two leaves acting as one redundancy domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafGroup {
    pub redundancy: Redundancy,
    /// Members in leaf tier order.
    pub leaves: [String; 2],
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pairing {
    pub servers: BTreeMap<String, ServerConnection>,
    pub leaf_groups: Vec<LeafGroup>,
}

impl Pairing {
    pub fn compute(topology: &Topology, layers: &LayeredNodes<'_>) -> Self {
        let leaf_rank: FxHashMap<&str, usize> = layers
            .leaf
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.as_str(), i))
            .collect();

        let mut servers = collect_server_connections(topology, &leaf_rank);
        assign_partners(&mut servers);
        for conn in servers.values_mut() {
            assign_primary(conn, &leaf_rank);
        }
        let leaf_groups = collect_leaf_groups(topology, &servers, &leaf_rank);

        Self {
            servers,
            leaf_groups,
        }
    }

    pub fn connection(&self, server: &str) -> Option<&ServerConnection> {
        self.servers.get(server)
    }

    pub fn partner(&self, server: &str) -> Option<&Partner> {
        self.servers.get(server)?.partner.as_ref()
    }

    /// Server pairs as `(lower id, higher id, redundancy)`, sorted by the lower id.
    pub fn server_pairs(&self) -> Vec<(&str, &str, Redundancy)> {
        self.servers
            .values()
            .filter_map(|conn| {
                let partner = conn.partner.as_ref()?;
                (conn.server < partner.id).then_some((
                    conn.server.as_str(),
                    partner.id.as_str(),
                    partner.redundancy,
                ))
            })
            .collect()
    }

    pub fn leaf_group_of(&self, leaf: &str) -> Option<&LeafGroup> {
        self.leaf_groups
            .iter()
            .find(|g| g.leaves.iter().any(|l| l == leaf))
    }

    /// Synthesizes the server tier order.
    ///
    /// Servers are grouped by primary leaf following the leaf order. Within a group partners
    /// stay adjacent (lower id first); groups under the left half of the leaf row put
    /// single-homed servers first, groups under the right half put multi-homed servers first.
    pub fn server_order(&self, layers: &LayeredNodes<'_>) -> Vec<String> {
        let leaf_count = layers.leaf.len();
        let mut out = Vec::with_capacity(self.servers.len());

        for (leaf_idx, leaf) in layers.leaf.iter().enumerate() {
            let members: Vec<&ServerConnection> = self
                .servers
                .values()
                .filter(|c| c.primary.as_deref() == Some(leaf.id.as_str()))
                .collect();
            if members.is_empty() {
                continue;
            }
            let left_half = (leaf_idx as f64) < (leaf_count as f64) / 2.0;

            let mut placed: FxHashSet<&str> = FxHashSet::default();
            let mut units: Vec<(bool, Vec<&str>)> = Vec::new();
            for conn in &members {
                if !placed.insert(conn.server.as_str()) {
                    continue;
                }
                let mut unit = vec![conn.server.as_str()];
                let mut multi = conn.is_multi_homed();
                if let Some(partner) = &conn.partner {
                    if let Some(other) = members.iter().find(|m| m.server == partner.id) {
                        if placed.insert(other.server.as_str()) {
                            unit.push(other.server.as_str());
                            unit.sort_unstable();
                            multi |= other.is_multi_homed();
                        }
                    }
                }
                units.push((multi, unit));
            }

            units.sort_by(|(multi_a, a), (multi_b, b)| {
                let rank = |multi: bool| if multi == left_half { 1 } else { 0 };
                rank(*multi_a)
                    .cmp(&rank(*multi_b))
                    .then_with(|| a[0].cmp(b[0]))
            });
            out.extend(
                units
                    .into_iter()
                    .flat_map(|(_, unit)| unit.into_iter().map(str::to_string)),
            );
        }
        out
    }
}

fn collect_server_connections(
    topology: &Topology,
    leaf_rank: &FxHashMap<&str, usize>,
) -> BTreeMap<String, ServerConnection> {
    let is_server = |id: &str| {
        id.starts_with(SERVER_PREFIX)
            && topology
                .node(id)
                .is_some_and(|n| n.kind == NodeKind::Server)
    };

    let mut servers: BTreeMap<String, ServerConnection> = BTreeMap::new();
    for link in topology.links() {
        if !link.kind.is_server_attachment() || link.mclag.is_some() {
            continue;
        }
        let (server, leaf) = if is_server(&link.source) {
            (&link.source, &link.target)
        } else if is_server(&link.target) {
            (&link.target, &link.source)
        } else {
            continue;
        };
        if !leaf_rank.contains_key(leaf.as_str()) {
            continue;
        }

        servers
            .entry(server.clone())
            .or_insert_with(|| ServerConnection {
                server: server.clone(),
                leaves: BTreeMap::new(),
                primary: None,
                secondary: None,
                partner: None,
            })
            .leaves
            .entry(leaf.clone())
            .or_default()
            .push(link.kind);
    }

    for conn in servers.values_mut() {
        for kinds in conn.leaves.values_mut() {
            kinds.sort_unstable();
        }
    }
    servers
}

fn assign_partners(servers: &mut BTreeMap<String, ServerConnection>) {
    let ids: Vec<String> = servers.keys().cloned().collect();
    let mut found: Vec<(usize, usize, Redundancy)> = Vec::new();
    let mut paired = vec![false; ids.len()];

    for i in 0..ids.len() {
        if paired[i] {
            continue;
        }
        let a = &servers[&ids[i]];
        let Some(redundancy) = a.redundancy() else {
            continue;
        };
        let candidate = ((i + 1)..ids.len())
            .find(|&j| !paired[j] && servers[&ids[j]].leaves == a.leaves);
        match candidate {
            Some(j) => {
                paired[i] = true;
                paired[j] = true;
                found.push((i, j, redundancy));
            }
            None if (0..i).any(|k| servers[&ids[k]].leaves == a.leaves) => {
                tracing::debug!(server = %ids[i], "identical wiring to an existing pair; left unpaired");
            }
            None => {}
        }
    }

    for (i, j, redundancy) in found {
        if let Some(a) = servers.get_mut(&ids[i]) {
            a.partner = Some(Partner {
                id: ids[j].clone(),
                redundancy,
            });
        }
        if let Some(b) = servers.get_mut(&ids[j]) {
            b.partner = Some(Partner {
                id: ids[i].clone(),
                redundancy,
            });
        }
    }
}

fn assign_primary(conn: &mut ServerConnection, leaf_rank: &FxHashMap<&str, usize>) {
    let rank = |leaf: &&String| leaf_rank.get(leaf.as_str()).copied().unwrap_or(usize::MAX);

    let bundled = conn
        .leaves
        .iter()
        .filter(|(_, kinds)| kinds.contains(&LinkKind::Bundled))
        .map(|(leaf, _)| leaf)
        .min_by_key(rank);
    let primary = bundled
        .or_else(|| conn.leaves.keys().min_by_key(rank))
        .cloned();
    let secondary = conn
        .leaves
        .keys()
        .filter(|leaf| Some(*leaf) != primary.as_ref())
        .min_by_key(rank)
        .cloned();

    conn.primary = primary;
    conn.secondary = secondary;
}

fn collect_leaf_groups(
    topology: &Topology,
    servers: &BTreeMap<String, ServerConnection>,
    leaf_rank: &FxHashMap<&str, usize>,
) -> Vec<LeafGroup> {
    let mut grouped: FxHashSet<String> = FxHashSet::default();
    let mut groups: Vec<LeafGroup> = Vec::new();

    let mut push = |a: &str, b: &str, redundancy: Redundancy, groups: &mut Vec<LeafGroup>| {
        if a == b || grouped.contains(a) || grouped.contains(b) {
            return;
        }
        let (Some(ra), Some(rb)) = (leaf_rank.get(a), leaf_rank.get(b)) else {
            return;
        };
        let leaves = if ra <= rb {
            [a.to_string(), b.to_string()]
        } else {
            [b.to_string(), a.to_string()]
        };
        grouped.insert(a.to_string());
        grouped.insert(b.to_string());
        groups.push(LeafGroup { redundancy, leaves });
    };

    for link in topology.links() {
        if link.kind == LinkKind::Mclag
            && matches!(link.mclag, Some(McLagRole::Peer | McLagRole::Session))
        {
            push(&link.source, &link.target, Redundancy::Mclag, &mut groups);
        }
    }

    for conn in servers.values() {
        let mut eslag: Vec<&String> = conn
            .leaves
            .iter()
            .filter(|(_, kinds)| kinds.contains(&LinkKind::Eslag))
            .map(|(leaf, _)| leaf)
            .collect();
        eslag.sort_by_key(|leaf| leaf_rank.get(leaf.as_str()).copied().unwrap_or(usize::MAX));
        if let [a, b, ..] = eslag.as_slice() {
            push(a, b, Redundancy::Eslag, &mut groups);
        }
    }

    groups.sort_by_key(|g| leaf_rank.get(g.leaves[0].as_str()).copied());
    groups
}
