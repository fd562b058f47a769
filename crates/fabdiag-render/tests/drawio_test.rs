use fabdiag_core::Topology;
use fabdiag_render::{Format, LegendEntry, RenderOptions, StyleName, render_topology};
use std::path::PathBuf;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn fixture(name: &str) -> Topology {
    let path = workspace_root().join("fixtures").join("fabric").join(name);
    let text = std::fs::read_to_string(&path).expect("fixture");
    fabdiag_core::topology_from_yaml(&text).expect("valid records")
}

fn drawio(topology: &Topology, style: StyleName) -> String {
    render_topology(
        topology,
        &RenderOptions {
            format: Format::Drawio,
            style,
        },
    )
    .expect("render ok")
}

fn cell_line<'a>(xml: &'a str, id: &str) -> &'a str {
    let needle = format!("<mxCell id=\"{id}\" ");
    xml.lines()
        .find(|l| l.trim_start().starts_with(&needle))
        .unwrap_or_else(|| panic!("cell {id} missing"))
}

#[test]
fn mclag_partners_share_a_nested_pair_container() {
    let xml = drawio(&fixture("mclag-pair.yaml"), StyleName::Default);

    assert!(cell_line(&xml, "pair-server-01-server-02").contains("parent=\"tier-server\""));
    assert!(cell_line(&xml, "pair-server-01-server-02").contains("value=\"MCLAG\""));
    assert!(cell_line(&xml, "node-server-01").contains("parent=\"pair-server-01-server-02\""));
    assert!(cell_line(&xml, "node-server-02").contains("parent=\"pair-server-01-server-02\""));
    assert!(cell_line(&xml, "group-leaf-01-leaf-02").contains("parent=\"tier-leaf\""));
}

#[test]
fn nested_geometry_is_relative_to_the_container() {
    let xml = drawio(&fixture("mclag-pair.yaml"), StyleName::Default);
    let lines: Vec<&str> = xml.lines().collect();
    let at = lines
        .iter()
        .position(|l| l.contains("<mxCell id=\"node-server-01\" "))
        .unwrap();
    assert_eq!(
        lines[at + 1].trim(),
        r#"<mxGeometry x="8" y="20" width="90" height="40" as="geometry"/>"#
    );
}

#[test]
fn switch_labels_keep_the_role_on_a_second_line() {
    let xml = drawio(&fixture("mclag-pair.yaml"), StyleName::Default);
    assert!(cell_line(&xml, "node-leaf-01").contains("value=\"leaf-01&#xa;server-leaf\""));
}

#[test]
fn edges_carry_anchor_and_offset_styles() {
    let topology = fixture("mclag-pair.yaml");
    let xml = drawio(&topology, StyleName::Default);

    let edges: Vec<&str> = xml
        .lines()
        .filter(|l| l.contains("edge=\"1\" parent=\"1\""))
        .collect();
    assert_eq!(edges.len(), topology.links().len());

    let peer = cell_line(&xml, "edge-0");
    assert!(peer.contains("exitX=1;exitY=0.5;exitDx=0;exitDy=6;"), "{peer}");
    assert!(peer.contains("entryX=0;entryY=0.5;entryDx=0;entryDy=6;"), "{peer}");
    assert!(peer.contains("source=\"node-leaf-01\" target=\"node-leaf-02\""));

    let label = cell_line(&xml, "port-0-src");
    assert!(label.contains("value=\"E1/10\""));
    assert!(label.contains("rotation=0;"));
}

#[test]
fn legend_lists_only_present_link_kinds() {
    let xml = drawio(&fixture("mclag-pair.yaml"), StyleName::Default);
    assert!(xml.contains("id=\"legend-mclag_peer\""));
    assert!(xml.contains("id=\"legend-mclag_session\""));
    assert!(xml.contains("value=\"MCLAG server\""));
    assert!(!xml.contains("ESLAG"));
    assert!(!xml.contains("legend-fabric"));

    let full = drawio(&fixture("full-fabric.yaml"), StyleName::Default);
    assert!(full.contains("value=\"ESLAG\""));
    assert!(full.contains("id=\"legend-external\""));
}

#[test]
fn style_selects_node_shapes() {
    let topology = fixture("spine-leaf.yaml");
    let cisco = drawio(&topology, StyleName::Cisco);
    assert!(cell_line(&cisco, "node-spine-01").contains("mxgraph.cisco.switches.layer_3_switch"));

    let default = drawio(&topology, StyleName::Default);
    assert!(!default.contains("mxgraph.cisco"));
    assert_ne!(cisco, default);
}

#[test]
fn cells_are_balanced() {
    let xml = drawio(&fixture("full-fabric.yaml"), StyleName::Hedgehog);
    let opened = xml.matches("<mxCell ").count();
    let closed = xml.matches("</mxCell>").count();
    assert_eq!(opened, closed + 2);
    assert!(xml.starts_with("<mxfile"));
    assert!(xml.ends_with("</mxfile>\n"));
}

#[test]
fn empty_topology_renders_an_empty_page() {
    let xml = drawio(&Topology::default(), StyleName::Default);
    assert!(xml.contains("<mxCell id=\"1\" parent=\"0\"/>"));
    assert!(!xml.contains("vertex=\"1\""));
    assert!(!xml.contains("edge=\"1\""));
}

#[test]
fn each_style_has_its_own_link_palette() {
    let [default, cisco, hedgehog] = StyleName::ALL.map(StyleName::style);
    for entry in LegendEntry::ALL {
        let strokes = [default, cisco, hedgehog].map(|s| s.link_style(entry));
        assert_ne!(strokes[0], strokes[1], "{entry:?}");
        assert_ne!(strokes[0], strokes[2], "{entry:?}");
        assert_ne!(strokes[1], strokes[2], "{entry:?}");
        for stroke in strokes {
            assert_eq!(stroke.contains("dashed=1;"), entry.is_dashed(), "{entry:?}");
        }
    }

    let topology = fixture("spine-leaf.yaml");
    let cisco_xml = drawio(&topology, StyleName::Cisco);
    assert!(cell_line(&cisco_xml, "edge-0").contains("strokeColor=#036897;"));
    let hedgehog_xml = drawio(&topology, StyleName::Hedgehog);
    assert!(cell_line(&hedgehog_xml, "edge-0").contains("strokeColor=#b58b00;"));
}
