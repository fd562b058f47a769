//! Named draw.io themes. DOT and Mermaid use fixed palettes and only validate the name.

use crate::Error;
use crate::legend::LegendEntry;
use fabdiag_core::Tier;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StyleName {
    #[default]
    Default,
    Cisco,
    Hedgehog,
}

impl StyleName {
    pub const ALL: [StyleName; 3] = [Self::Default, Self::Cisco, Self::Hedgehog];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Cisco => "cisco",
            Self::Hedgehog => "hedgehog",
        }
    }

    pub fn style(self) -> &'static Style {
        match self {
            Self::Default => &DEFAULT_STYLE,
            Self::Cisco => &CISCO_STYLE,
            Self::Hedgehog => &HEDGEHOG_STYLE,
        }
    }
}

impl fmt::Display for StyleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StyleName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|n| n.as_str() == name)
            .ok_or_else(|| Error::UnsupportedStyle {
                style: s.to_string(),
            })
    }
}

/// Stroke settings per legend category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkStyles {
    pub fabric: &'static str,
    pub mclag_peer: &'static str,
    pub mclag_session: &'static str,
    pub mclag_server: &'static str,
    pub bundled: &'static str,
    pub unbundled: &'static str,
    pub eslag: &'static str,
    pub gateway: &'static str,
    pub external: &'static str,
}

/// draw.io style strings for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub name: StyleName,
    pub gateway: &'static str,
    pub spine: &'static str,
    pub leaf: &'static str,
    pub server: &'static str,
    pub external: &'static str,
    pub tier_container: &'static str,
    pub pair_container: &'static str,
    pub legend_container: &'static str,
    pub port_label: &'static str,
    pub links: LinkStyles,
}

impl Style {
    pub fn node_style(&self, tier: Tier) -> &'static str {
        match tier {
            Tier::Gateway => self.gateway,
            Tier::Spine => self.spine,
            Tier::Leaf => self.leaf,
            Tier::Server => self.server,
            Tier::External => self.external,
        }
    }

    pub fn link_style(&self, entry: LegendEntry) -> &'static str {
        let l = &self.links;
        match entry {
            LegendEntry::Fabric => l.fabric,
            LegendEntry::McLagPeer => l.mclag_peer,
            LegendEntry::McLagSession => l.mclag_session,
            LegendEntry::McLagServer => l.mclag_server,
            LegendEntry::Bundled => l.bundled,
            LegendEntry::Unbundled => l.unbundled,
            LegendEntry::Eslag => l.eslag,
            LegendEntry::Gateway => l.gateway,
            LegendEntry::External => l.external,
        }
    }
}

impl Default for Style {
    fn default() -> Self {
        DEFAULT_STYLE
    }
}

pub(crate) const EDGE_BASE: &str = "endArrow=none;rounded=0;";

const DEFAULT_LINKS: LinkStyles = LinkStyles {
    fabric: "strokeColor=#1f77b4;strokeWidth=2;",
    mclag_peer: "strokeColor=#9467bd;strokeWidth=2;dashed=1;",
    mclag_session: "strokeColor=#9467bd;strokeWidth=1;dashed=1;dashPattern=1 2;",
    mclag_server: "strokeColor=#2ca02c;strokeWidth=2;",
    bundled: "strokeColor=#ff7f0e;strokeWidth=2;",
    unbundled: "strokeColor=#7f7f7f;strokeWidth=1;",
    eslag: "strokeColor=#d62728;strokeWidth=2;",
    gateway: "strokeColor=#17becf;strokeWidth=2;dashed=1;",
    external: "strokeColor=#8c564b;strokeWidth=2;dashed=1;dashPattern=8 4;",
};

const CISCO_LINKS: LinkStyles = LinkStyles {
    fabric: "strokeColor=#036897;strokeWidth=3;",
    mclag_peer: "strokeColor=#005073;strokeWidth=2;dashed=1;",
    mclag_session: "strokeColor=#005073;strokeWidth=1;dashed=1;dashPattern=1 2;",
    mclag_server: "strokeColor=#6cc04a;strokeWidth=2;",
    bundled: "strokeColor=#fbab18;strokeWidth=2;",
    unbundled: "strokeColor=#9e9ea2;strokeWidth=1;",
    eslag: "strokeColor=#e2231a;strokeWidth=2;",
    gateway: "strokeColor=#00bceb;strokeWidth=2;dashed=1;",
    external: "strokeColor=#58585b;strokeWidth=2;dashed=1;dashPattern=8 4;",
};

const HEDGEHOG_LINKS: LinkStyles = LinkStyles {
    fabric: "strokeColor=#b58b00;strokeWidth=2;",
    mclag_peer: "strokeColor=#7a5c00;strokeWidth=2;dashed=1;",
    mclag_session: "strokeColor=#7a5c00;strokeWidth=1;dashed=1;dashPattern=1 2;",
    mclag_server: "strokeColor=#5b8c2a;strokeWidth=2;",
    bundled: "strokeColor=#e07b00;strokeWidth=2;",
    unbundled: "strokeColor=#8c8c8c;strokeWidth=1;",
    eslag: "strokeColor=#c0392b;strokeWidth=2;",
    gateway: "strokeColor=#2b7a78;strokeWidth=2;dashed=1;",
    external: "strokeColor=#6b4f2a;strokeWidth=2;dashed=1;dashPattern=8 4;",
};

static DEFAULT_STYLE: Style = Style {
    name: StyleName::Default,
    gateway: "rounded=1;whiteSpace=wrap;fillColor=#e1d5e7;strokeColor=#9673a6;",
    spine: "rounded=1;whiteSpace=wrap;fillColor=#dae8fc;strokeColor=#6c8ebf;",
    leaf: "rounded=1;whiteSpace=wrap;fillColor=#d5e8d4;strokeColor=#82b366;",
    server: "rounded=0;whiteSpace=wrap;fillColor=#f5f5f5;strokeColor=#666666;",
    external: "ellipse;whiteSpace=wrap;fillColor=#ffe6cc;strokeColor=#d79b00;",
    tier_container: "rounded=0;whiteSpace=wrap;fillColor=none;strokeColor=#b3b3b3;dashed=1;verticalAlign=top;align=left;spacingLeft=6;container=1;collapsible=0;",
    pair_container: "rounded=1;whiteSpace=wrap;fillColor=none;strokeColor=#999999;dashed=1;verticalAlign=top;fontSize=9;container=1;collapsible=0;",
    legend_container: "rounded=0;whiteSpace=wrap;fillColor=#ffffff;strokeColor=#666666;verticalAlign=top;align=left;spacingLeft=6;container=1;collapsible=0;",
    port_label: "text;align=center;verticalAlign=middle;fontSize=8;fontColor=#333333;labelBackgroundColor=#ffffff;",
    links: DEFAULT_LINKS,
};

static CISCO_STYLE: Style = Style {
    name: StyleName::Cisco,
    gateway: "shape=mxgraph.cisco.routers.router;pointerEvents=1;dashed=0;fillColor=#036897;strokeColor=#ffffff;strokeWidth=2;verticalLabelPosition=bottom;verticalAlign=top;align=center;outlineConnect=0;",
    spine: "shape=mxgraph.cisco.switches.layer_3_switch;pointerEvents=1;dashed=0;fillColor=#036897;strokeColor=#ffffff;strokeWidth=2;verticalLabelPosition=bottom;verticalAlign=top;align=center;outlineConnect=0;",
    leaf: "shape=mxgraph.cisco.switches.workgroup_switch;pointerEvents=1;dashed=0;fillColor=#036897;strokeColor=#ffffff;strokeWidth=2;verticalLabelPosition=bottom;verticalAlign=top;align=center;outlineConnect=0;",
    server: "shape=mxgraph.cisco.servers.fileserver;pointerEvents=1;dashed=0;fillColor=#036897;strokeColor=#ffffff;strokeWidth=2;verticalLabelPosition=bottom;verticalAlign=top;align=center;outlineConnect=0;",
    external: "shape=mxgraph.cisco.storage.cloud;pointerEvents=1;dashed=0;fillColor=#036897;strokeColor=#ffffff;strokeWidth=2;verticalLabelPosition=bottom;verticalAlign=top;align=center;outlineConnect=0;",
    tier_container: "rounded=0;whiteSpace=wrap;fillColor=none;strokeColor=#036897;dashed=1;verticalAlign=top;align=left;spacingLeft=6;container=1;collapsible=0;",
    pair_container: "rounded=1;whiteSpace=wrap;fillColor=none;strokeColor=#036897;dashed=1;verticalAlign=top;fontSize=9;container=1;collapsible=0;",
    legend_container: "rounded=0;whiteSpace=wrap;fillColor=#ffffff;strokeColor=#036897;verticalAlign=top;align=left;spacingLeft=6;container=1;collapsible=0;",
    port_label: "text;align=center;verticalAlign=middle;fontSize=8;fontColor=#036897;labelBackgroundColor=#ffffff;",
    links: CISCO_LINKS,
};

static HEDGEHOG_STYLE: Style = Style {
    name: StyleName::Hedgehog,
    gateway: "rounded=1;whiteSpace=wrap;fillColor=#fff2cc;strokeColor=#d6b656;fontStyle=1;",
    spine: "rounded=1;whiteSpace=wrap;fillColor=#ffcd28;strokeColor=#b58b00;fontStyle=1;",
    leaf: "rounded=1;whiteSpace=wrap;fillColor=#fff2cc;strokeColor=#d6b656;fontStyle=1;",
    server: "rounded=1;whiteSpace=wrap;fillColor=#ffffff;strokeColor=#b58b00;",
    external: "ellipse;shape=cloud;whiteSpace=wrap;fillColor=#f9f7ed;strokeColor=#b58b00;",
    tier_container: "rounded=1;whiteSpace=wrap;fillColor=#fffdf5;strokeColor=#d6b656;verticalAlign=top;align=left;spacingLeft=6;container=1;collapsible=0;",
    pair_container: "rounded=1;whiteSpace=wrap;fillColor=none;strokeColor=#b58b00;dashed=1;verticalAlign=top;fontSize=9;container=1;collapsible=0;",
    legend_container: "rounded=1;whiteSpace=wrap;fillColor=#fffdf5;strokeColor=#d6b656;verticalAlign=top;align=left;spacingLeft=6;container=1;collapsible=0;",
    port_label: "text;align=center;verticalAlign=middle;fontSize=8;fontColor=#5c4700;labelBackgroundColor=#fffdf5;",
    links: HEDGEHOG_LINKS,
};
