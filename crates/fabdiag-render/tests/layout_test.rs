use fabdiag_core::{LinkKind, McLagRole, Record, Tier, Topology, extract_topology};
use fabdiag_render::Layout;
use fabdiag_render::model::PortLabel;
use serde_json::json;
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

fn mesh(spines: usize, leaves: usize) -> Topology {
    let mut records = Vec::new();
    for s in 1..=spines {
        records.push(Record::new(
            "Switch",
            &format!("spine-0{s}"),
            json!({ "role": "spine" }),
        ));
    }
    for l in 1..=leaves {
        records.push(Record::new(
            "Switch",
            &format!("leaf-0{l}"),
            json!({ "role": "server-leaf" }),
        ));
    }
    for s in 1..=spines {
        for l in 1..=leaves {
            records.push(Record::new(
                "Connection",
                &format!("spine-0{s}--fabric--leaf-0{l}"),
                json!({ "fabric": { "links": [{
                    "spine": { "port": format!("spine-0{s}/E1/{l}") },
                    "leaf": { "port": format!("leaf-0{l}/E1/{}", 48 + s) }
                }] } }),
            ));
        }
    }
    extract_topology(&records)
}

fn edge_between<'l>(
    topology: &Topology,
    layout: &'l Layout<'_>,
    source: &str,
    target: &str,
) -> &'l fabdiag_render::model::EdgeGeometry {
    let idx = topology
        .links()
        .iter()
        .position(|l| l.source == source && l.target == target)
        .expect("link exists");
    layout.edge(idx).expect("edge routed")
}

#[test]
fn rows_are_centered_with_count_based_spacing() {
    let topology = fixture("spine-leaf.yaml");
    let layout = Layout::compute(&topology);

    let leaf = layout.node_box("leaf-01").unwrap();
    assert_eq!((leaf.x, leaf.y, leaf.width, leaf.height), (410.0, 380.0, 100.0, 50.0));
    assert_eq!(layout.node_box("leaf-04").unwrap().x, 890.0);

    let spine = layout.node_box("spine-02").unwrap();
    assert_eq!((spine.x, spine.y), (800.0, 200.0));
    assert_eq!(spine.tier, Tier::Spine);
    assert_eq!(layout.nodes.len(), 6);
}

#[test]
fn rows_shift_up_without_spines() {
    let topology = fixture("mclag-pair.yaml");
    let layout = Layout::compute(&topology);

    let leaf = layout.node_box("leaf-01").unwrap();
    assert_eq!((leaf.x, leaf.y), (550.0, 200.0));
    let server = layout.node_box("server-02").unwrap();
    assert_eq!((server.x, server.y, server.width, server.height), (735.0, 380.0, 90.0, 40.0));
}

#[test]
fn spine_row_widens_to_half_the_leaf_span() {
    let topology = mesh(2, 8);
    let layout = Layout::compute(&topology);
    // 8 leaves at 120 px span 840; two spines are pulled out to 420 apart.
    assert_eq!(layout.node_box("spine-01").unwrap().center().x, 490.0);
    assert_eq!(layout.node_box("spine-02").unwrap().center().x, 910.0);
}

#[test]
fn anchors_lie_on_the_node_outline() {
    let topology = fixture("full-fabric.yaml");
    let layout = Layout::compute(&topology);
    assert_eq!(layout.edges.len(), topology.links().len());

    for edge in &layout.edges {
        for anchor in [edge.exit, edge.entry] {
            assert!((0.0..=1.0).contains(&anchor.x), "{anchor:?}");
            assert!((0.0..=1.0).contains(&anchor.y), "{anchor:?}");
            let on_outline = [anchor.x, anchor.y].iter().any(|v| *v == 0.0 || *v == 1.0);
            assert!(on_outline, "{} -> {}: {anchor:?}", edge.source, edge.target);
        }
        for label in edge.source_label.iter().chain(edge.target_label.iter()) {
            assert!((-90.0..=90.0).contains(&label.rotation), "{label:?}");
        }
    }
}

#[test]
fn repeated_sectors_fan_out_and_parallel_links_spread() {
    let topology = fixture("mclag-pair.yaml");
    let layout = Layout::compute(&topology);

    let peers: Vec<_> = topology
        .links()
        .iter()
        .enumerate()
        .filter(|(_, l)| l.kind == LinkKind::Mclag && l.mclag.is_some())
        .map(|(i, _)| layout.edge(i).unwrap())
        .collect();
    assert_eq!(peers.len(), 2);

    assert_eq!((peers[0].exit.x, peers[0].exit.y), (1.0, 0.5));
    assert_eq!(peers[1].exit.x, 1.0);
    assert!(peers[1].exit.y > 0.5);

    // -4 / +4 spread plus the leaf-to-leaf nudge.
    assert_eq!((peers[0].offset.dx, peers[0].offset.dy), (0.0, 6.0));
    assert_eq!((peers[1].offset.dx, peers[1].offset.dy), (0.0, 14.0));
}

#[test]
fn port_labels_sit_along_the_edge() {
    let topology = fixture("mclag-pair.yaml");
    let layout = Layout::compute(&topology);

    let idx = topology
        .links()
        .iter()
        .position(|l| l.mclag == Some(McLagRole::Peer))
        .unwrap();
    let edge = layout.edge(idx).unwrap();
    assert_eq!(
        edge.source_label,
        Some(PortLabel {
            text: "E1/10".to_string(),
            x: 680.0,
            y: 243.0,
            rotation: 0.0,
        })
    );
    assert_eq!(edge.target_label.as_ref().map(|l| (l.x, l.y)), Some((720.0, 243.0)));
}

#[test]
fn spine_links_crossing_the_center_get_nudged_on_large_fabrics() {
    let large = mesh(3, 4);
    let layout = Layout::compute(&large);
    assert_eq!(edge_between(&large, &layout, "spine-03", "leaf-01").offset.dy, 6.0);
    assert_eq!(edge_between(&large, &layout, "spine-01", "leaf-01").offset.dy, 0.0);
    assert_eq!(edge_between(&large, &layout, "spine-02", "leaf-01").offset.dy, 0.0);

    let small = fixture("spine-leaf.yaml");
    let layout = Layout::compute(&small);
    assert_eq!(edge_between(&small, &layout, "spine-02", "leaf-01").offset.dy, 0.0);
}

#[test]
fn external_and_gateway_share_the_top_row() {
    let topology = fixture("full-fabric.yaml");
    let layout = Layout::compute(&topology);
    let gw = layout.node_box("gw-01").unwrap();
    let ext = layout.node_box("ext-internet").unwrap();
    assert_eq!(gw.y, 40.0);
    assert_eq!(ext.y, 40.0);
    assert!(gw.x < ext.x);
    assert_eq!(layout.node_box("leaf-01").unwrap().y, 380.0);
}

#[test]
fn layout_json_lists_tiers_and_edges() {
    let topology = fixture("full-fabric.yaml");
    let layout = Layout::compute(&topology);
    let json = layout.to_json().unwrap();

    let tiers: Vec<&str> = json["tiers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["tier"].as_str().unwrap())
        .collect();
    assert_eq!(tiers, vec!["gateway", "spine", "leaf", "server", "external"]);
    assert_eq!(
        json["edges"].as_array().unwrap().len(),
        topology.links().len()
    );
    assert_eq!(json["pairing"]["servers"]["server-01"]["partner"]["id"], "server-02");
}

#[test]
fn empty_topology_has_empty_layout() {
    let topology = Topology::default();
    let layout = Layout::compute(&topology);
    assert!(layout.nodes.is_empty());
    assert!(layout.edges.is_empty());
    assert!(layout.bounds().is_none());
}

#[test]
fn reversed_parallel_links_still_spread_apart() {
    let mut records = vec![
        Record::new("Switch", "leaf-01", json!({ "role": "server-leaf" })),
        Record::new("Switch", "leaf-02", json!({ "role": "server-leaf" })),
    ];
    for (name, a, b) in [
        ("leaf-01--mclag-domain--a", "leaf-01/E1/10", "leaf-02/E1/10"),
        ("leaf-01--mclag-domain--b", "leaf-02/E1/11", "leaf-01/E1/11"),
    ] {
        records.push(Record::new(
            "Connection",
            name,
            json!({ "mclagDomain": { "peerLinks": [{
                "switch1": { "port": a },
                "switch2": { "port": b }
            }] } }),
        ));
    }
    let topology = extract_topology(&records);
    let layout = Layout::compute(&topology);

    let forward = edge_between(&topology, &layout, "leaf-01", "leaf-02");
    let reversed = edge_between(&topology, &layout, "leaf-02", "leaf-01");
    assert_ne!(forward.offset, reversed.offset);
    assert_eq!((forward.offset.dx, forward.offset.dy), (0.0, 6.0));
    assert_eq!((reversed.offset.dx, reversed.offset.dy), (0.0, 14.0));
}

#[test]
fn wide_rows_stay_inside_the_canvas() {
    let mut records = vec![Record::new(
        "Switch",
        "leaf-01",
        json!({ "role": "server-leaf" }),
    )];
    for i in 1..=24 {
        let server = format!("server-{i:02}");
        records.push(Record::new("Server", &server, json!({})));
        records.push(Record::new(
            "Connection",
            &format!("{server}--unbundled--leaf-01"),
            json!({ "unbundled": { "link": {
                "server": { "port": format!("{server}/enp2s1") },
                "switch": { "port": format!("leaf-01/E1/{i}") }
            } } }),
        ));
    }
    let topology = extract_topology(&records);
    let layout = Layout::compute(&topology);

    let bounds = layout.bounds().unwrap();
    assert_eq!(bounds.min_x, 40.0);
    assert!(layout.width >= bounds.max_x + 40.0);

    // The leaf stays centered over the shifted server row.
    let leaf = layout.node_box("leaf-01").unwrap();
    assert_eq!(leaf.center().x, (bounds.min_x + bounds.max_x) / 2.0);
    for edge in &layout.edges {
        assert!(edge.start.x >= 0.0 && edge.end.x >= 0.0, "{edge:?}");
    }
}
