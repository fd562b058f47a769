//! Legend categories shared by all emitters.

use fabdiag_core::{Link, LinkKind, McLagRole, Topology};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LegendEntry {
    Fabric,
    McLagPeer,
    McLagSession,
    McLagServer,
    Bundled,
    Unbundled,
    Eslag,
    Gateway,
    External,
}

impl LegendEntry {
    pub const ALL: [LegendEntry; 9] = [
        Self::Fabric,
        Self::McLagPeer,
        Self::McLagSession,
        Self::McLagServer,
        Self::Bundled,
        Self::Unbundled,
        Self::Eslag,
        Self::Gateway,
        Self::External,
    ];

    pub fn for_link(link: &Link) -> Self {
        match (link.kind, link.mclag) {
            (LinkKind::Fabric, _) => Self::Fabric,
            (LinkKind::Mclag, Some(McLagRole::Peer)) => Self::McLagPeer,
            (LinkKind::Mclag, Some(McLagRole::Session)) => Self::McLagSession,
            (LinkKind::Mclag, None) => Self::McLagServer,
            (LinkKind::Bundled, _) => Self::Bundled,
            (LinkKind::Unbundled, _) => Self::Unbundled,
            (LinkKind::Eslag, _) => Self::Eslag,
            (LinkKind::Gateway, _) => Self::Gateway,
            (LinkKind::External, _) => Self::External,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Fabric => "Fabric",
            Self::McLagPeer => "MCLAG peer",
            Self::McLagSession => "MCLAG session",
            Self::McLagServer => "MCLAG server",
            Self::Bundled => "Bundled",
            Self::Unbundled => "Unbundled",
            Self::Eslag => "ESLAG",
            Self::Gateway => "Gateway",
            Self::External => "External",
        }
    }

    /// Identifier-safe slug.
    pub fn key(self) -> &'static str {
        match self {
            Self::Fabric => "fabric",
            Self::McLagPeer => "mclag_peer",
            Self::McLagSession => "mclag_session",
            Self::McLagServer => "mclag_server",
            Self::Bundled => "bundled",
            Self::Unbundled => "unbundled",
            Self::Eslag => "eslag",
            Self::Gateway => "gateway",
            Self::External => "external",
        }
    }

    /// Graphviz / Mermaid stroke color.
    pub fn color(self) -> &'static str {
        match self {
            Self::Fabric => "#1f77b4",
            Self::McLagPeer | Self::McLagSession => "#9467bd",
            Self::McLagServer => "#2ca02c",
            Self::Bundled => "#ff7f0e",
            Self::Unbundled => "#7f7f7f",
            Self::Eslag => "#d62728",
            Self::Gateway => "#17becf",
            Self::External => "#8c564b",
        }
    }

    pub fn is_dashed(self) -> bool {
        matches!(
            self,
            Self::McLagPeer | Self::McLagSession | Self::Gateway | Self::External
        )
    }
}

/// Categories with at least one link, in legend order.
pub fn legend_entries(topology: &Topology) -> Vec<LegendEntry> {
    let mut present = [false; LegendEntry::ALL.len()];
    for link in topology.links() {
        present[LegendEntry::for_link(link) as usize] = true;
    }
    LegendEntry::ALL
        .into_iter()
        .filter(|e| present[*e as usize])
        .collect()
}
