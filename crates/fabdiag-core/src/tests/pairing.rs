use super::{connection, server, server_links, switch, unbundled};
use crate::*;
use serde_json::json;

fn leaves(n: usize) -> Vec<Record> {
    (1..=n)
        .map(|i| switch(&format!("leaf-0{i}"), "server-leaf"))
        .collect()
}

fn dual_homed(server_name: &str, key: &str, a: &str, b: &str) -> Record {
    let nic1 = format!("{server_name}/enp2s1");
    let nic2 = format!("{server_name}/enp2s2");
    let port_a = format!("{a}/E1/1");
    let port_b = format!("{b}/E1/1");
    server_links(&format!("{server_name}--{key}"), key, &[
        (nic1.as_str(), port_a.as_str()),
        (nic2.as_str(), port_b.as_str()),
    ])
}

#[test]
fn identical_mclag_wiring_forms_an_mclag_pair() {
    let mut records = leaves(2);
    records.push(server("server-01"));
    records.push(server("server-02"));
    records.push(dual_homed("server-01", "mclag", "leaf-01", "leaf-02"));
    records.push(dual_homed("server-02", "mclag", "leaf-01", "leaf-02"));
    let topology = extract_topology(&records);
    let (_, pairing) = layer_topology(&topology);

    let partner = pairing.partner("server-01").unwrap();
    assert_eq!(partner.id, "server-02");
    assert_eq!(partner.redundancy, Redundancy::Mclag);
    assert_eq!(pairing.partner("server-02").unwrap().id, "server-01");
    assert_eq!(
        pairing.server_pairs(),
        vec![("server-01", "server-02", Redundancy::Mclag)]
    );
}

#[test]
fn identical_eslag_wiring_forms_an_eslag_pair() {
    let mut records = leaves(2);
    records.push(server("server-01"));
    records.push(server("server-02"));
    records.push(dual_homed("server-01", "eslag", "leaf-01", "leaf-02"));
    records.push(dual_homed("server-02", "eslag", "leaf-01", "leaf-02"));
    let topology = extract_topology(&records);
    let (_, pairing) = layer_topology(&topology);

    assert_eq!(
        pairing.partner("server-02").unwrap().redundancy,
        Redundancy::Eslag
    );
    assert_eq!(pairing.leaf_groups.len(), 1);
    assert_eq!(pairing.leaf_groups[0].redundancy, Redundancy::Eslag);
    assert_eq!(pairing.leaf_groups[0].leaves, ["leaf-01".to_string(), "leaf-02".to_string()]);
}

#[test]
fn mclag_takes_priority_over_eslag() {
    let mut records = leaves(2);
    for name in ["server-01", "server-02"] {
        let nic1 = format!("{name}/enp2s1");
        let nic2 = format!("{name}/enp2s2");
        records.push(server(name));
        records.push(server_links(&format!("{name}--mclag"), "mclag", &[(
            nic1.as_str(),
            "leaf-01/E1/1",
        )]));
        records.push(server_links(&format!("{name}--eslag"), "eslag", &[(
            nic2.as_str(),
            "leaf-02/E1/1",
        )]));
    }
    let topology = extract_topology(&records);
    let (_, pairing) = layer_topology(&topology);
    assert_eq!(
        pairing.partner("server-01").unwrap().redundancy,
        Redundancy::Mclag
    );
}

#[test]
fn unbundled_only_servers_are_never_paired() {
    let mut records = leaves(1);
    for name in ["server-01", "server-02"] {
        records.push(server(name));
        records.push(unbundled(
            &format!("{name}--unbundled"),
            &format!("{name}/enp2s1"),
            "leaf-01/E1/1",
        ));
    }
    let topology = extract_topology(&records);
    let (_, pairing) = layer_topology(&topology);
    assert!(pairing.server_pairs().is_empty());
    assert_eq!(
        pairing.connection("server-01").unwrap().primary.as_deref(),
        Some("leaf-01")
    );
}

#[test]
fn third_identical_server_stays_unpaired() {
    let mut records = leaves(2);
    for name in ["server-01", "server-02", "server-03"] {
        records.push(server(name));
        records.push(dual_homed(name, "mclag", "leaf-01", "leaf-02"));
    }
    let topology = extract_topology(&records);
    let (_, pairing) = layer_topology(&topology);
    assert_eq!(pairing.partner("server-01").unwrap().id, "server-02");
    assert!(pairing.partner("server-03").is_none());
}

#[test]
fn servers_without_prefix_are_not_considered() {
    let mut records = leaves(2);
    for name in ["compute-01", "compute-02"] {
        records.push(server(name));
        records.push(dual_homed(name, "mclag", "leaf-01", "leaf-02"));
    }
    let topology = extract_topology(&records);
    let (_, pairing) = layer_topology(&topology);
    assert!(pairing.servers.is_empty());
}

#[test]
fn primary_leaf_prefers_bundled_then_leaf_order() {
    let mut records = leaves(3);
    records.push(server("server-01"));
    records.push(unbundled("u", "server-01/enp2s1", "leaf-01/E1/1"));
    records.push(server_links("b", "bundled", &[
        ("server-01/enp2s2", "leaf-03/E1/1"),
        ("server-01/enp2s3", "leaf-03/E1/2"),
    ]));
    records.push(server("server-02"));
    records.push(dual_homed("server-02", "mclag", "leaf-03", "leaf-02"));
    let topology = extract_topology(&records);
    let (_, pairing) = layer_topology(&topology);

    let s1 = pairing.connection("server-01").unwrap();
    assert_eq!(s1.primary.as_deref(), Some("leaf-03"));
    assert_eq!(s1.secondary.as_deref(), Some("leaf-01"));
    assert_eq!(
        s1.leaves["leaf-03"],
        vec![LinkKind::Bundled, LinkKind::Bundled]
    );

    let s2 = pairing.connection("server-02").unwrap();
    assert_eq!(s2.primary.as_deref(), Some("leaf-02"));
    assert_eq!(s2.secondary.as_deref(), Some("leaf-03"));
}

#[test]
fn server_order_groups_by_primary_leaf_and_homing() {
    let mut records = leaves(4);
    for i in 1..=9 {
        records.push(server(&format!("server-0{i}")));
    }
    records.push(unbundled("u1", "server-01/enp2s1", "leaf-01/E1/1"));
    records.push(dual_homed("server-02", "mclag", "leaf-01", "leaf-02"));
    records.push(dual_homed("server-03", "mclag", "leaf-01", "leaf-02"));
    records.push(unbundled("u4", "server-04/enp2s1", "leaf-01/E1/4"));
    records.push(dual_homed("server-05", "eslag", "leaf-03", "leaf-04"));
    records.push(dual_homed("server-06", "eslag", "leaf-03", "leaf-04"));
    records.push(unbundled("u7", "server-07/enp2s1", "leaf-03/E1/7"));
    records.push(server_links("b8", "bundled", &[("server-08/enp2s1", "leaf-04/E1/8")]));
    records.push(unbundled("u8", "server-08/enp2s2", "leaf-02/E1/8"));
    records.push(connection(
        "leaf-01--mclag-domain--leaf-02",
        json!({ "mclagDomain": { "peerLinks": [
            { "switch1": { "port": "leaf-01/E1/10" }, "switch2": { "port": "leaf-02/E1/10" } }
        ] } }),
    ));

    let topology = extract_topology(&records);
    let (layers, pairing) = layer_topology(&topology);

    assert_eq!(
        layers.ids(Tier::Server),
        vec![
            "server-01", "server-04", "server-02", "server-03", "server-05", "server-06",
            "server-07", "server-08", "server-09",
        ]
    );

    let groups: Vec<_> = pairing
        .leaf_groups
        .iter()
        .map(|g| (g.redundancy, g.leaves[0].as_str(), g.leaves[1].as_str()))
        .collect();
    assert_eq!(
        groups,
        vec![
            (Redundancy::Mclag, "leaf-01", "leaf-02"),
            (Redundancy::Eslag, "leaf-03", "leaf-04"),
        ]
    );
    assert_eq!(
        pairing.leaf_group_of("leaf-04").unwrap().redundancy,
        Redundancy::Eslag
    );
}

#[test]
fn pairing_is_symmetric_and_exclusive() {
    let mut records = leaves(4);
    let wiring = [
        ("server-01", "mclag", "leaf-01", "leaf-02"),
        ("server-02", "mclag", "leaf-01", "leaf-02"),
        ("server-03", "mclag", "leaf-01", "leaf-02"),
        ("server-04", "eslag", "leaf-03", "leaf-04"),
        ("server-05", "eslag", "leaf-03", "leaf-04"),
        ("server-06", "eslag", "leaf-01", "leaf-04"),
        ("server-07", "mclag", "leaf-01", "leaf-04"),
        ("server-08", "mclag", "leaf-01", "leaf-04"),
    ];
    for (name, key, a, b) in wiring {
        records.push(server(name));
        records.push(dual_homed(name, key, a, b));
    }
    let topology = extract_topology(&records);
    let (_, pairing) = layer_topology(&topology);

    let mut partnered = 0;
    for (id, conn) in &pairing.servers {
        if let Some(partner) = &conn.partner {
            partnered += 1;
            let back = pairing.partner(&partner.id).expect("partner is paired back");
            assert_eq!(&back.id, id);
            assert_eq!(back.redundancy, partner.redundancy);
        }
    }
    assert_eq!(partnered, 6);
    assert_eq!(pairing.server_pairs().len(), 3);
}
