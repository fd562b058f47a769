use fabdiag_core::{Topology, extract_topology, parse_records};
use fabdiag_render::{
    Error, Format, RenderOptions, StyleName, emitter_for, legend_entries, render_topology,
};
use std::path::PathBuf;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn fixture_text(name: &str) -> String {
    let path = workspace_root().join("fixtures").join("fabric").join(name);
    std::fs::read_to_string(&path).expect("fixture")
}

#[test]
fn format_names_parse_with_aliases() {
    assert_eq!("drawio".parse::<Format>().unwrap(), Format::Drawio);
    assert_eq!("DOT".parse::<Format>().unwrap(), Format::Dot);
    assert_eq!("mmd".parse::<Format>().unwrap(), Format::Mermaid);
    assert_eq!(Format::Mermaid.default_file_name(), "diagram.mmd");
    assert_eq!(Format::Drawio.default_file_name(), "diagram.drawio");

    let err = "svg".parse::<Format>().unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat { ref format } if format == "svg"));
    assert!(err.to_string().contains("svg"));
}

#[test]
fn style_names_are_validated() {
    assert_eq!("cisco".parse::<StyleName>().unwrap(), StyleName::Cisco);
    assert_eq!(StyleName::default(), StyleName::Default);
    let err = "neon".parse::<StyleName>().unwrap_err();
    assert!(matches!(err, Error::UnsupportedStyle { ref style } if style == "neon"));

    assert!(RenderOptions::from_names("dot", "hedgehog").is_ok());
    assert!(matches!(
        RenderOptions::from_names("dot", "neon"),
        Err(Error::UnsupportedStyle { .. })
    ));
}

#[test]
fn emitters_report_their_format() {
    for format in Format::ALL {
        assert_eq!(emitter_for(format).format(), format);
    }
}

#[test]
fn rendering_ignores_record_order() {
    let text = fixture_text("full-fabric.yaml");
    let records = parse_records(&text).unwrap();
    let forward = extract_topology(&records);

    let mut shuffled = records.clone();
    shuffled.reverse();
    shuffled.rotate_left(7);
    let shuffled = extract_topology(&shuffled);

    for format in Format::ALL {
        for style in StyleName::ALL {
            let options = RenderOptions { format, style };
            let a = render_topology(&forward, &options).unwrap();
            let b = render_topology(&shuffled, &options).unwrap();
            let again = render_topology(&forward, &options).unwrap();
            assert_eq!(a, b, "{format} / {style}");
            assert_eq!(a, again, "{format} / {style}");
        }
    }
}

#[test]
fn no_backend_mentions_eslag_without_eslag_links() {
    let topology = fabdiag_core::topology_from_yaml(&fixture_text("spine-leaf.yaml")).unwrap();
    for format in Format::ALL {
        let out = render_topology(
            &topology,
            &RenderOptions {
                format,
                style: StyleName::Default,
            },
        )
        .unwrap();
        assert!(!out.contains("ESLAG"), "{format}");
    }
}

#[test]
fn legend_entries_follow_link_kinds() {
    let topology = fabdiag_core::topology_from_yaml(&fixture_text("full-fabric.yaml")).unwrap();
    let labels: Vec<&str> = legend_entries(&topology)
        .into_iter()
        .map(|e| e.label())
        .collect();
    assert_eq!(
        labels,
        vec![
            "Fabric",
            "MCLAG peer",
            "MCLAG session",
            "MCLAG server",
            "Bundled",
            "Unbundled",
            "ESLAG",
            "Gateway",
            "External",
        ]
    );
    assert!(legend_entries(&Topology::default()).is_empty());
}

#[test]
fn concurrent_renders_match_sequential_output() {
    let topology = fabdiag_core::topology_from_yaml(&fixture_text("full-fabric.yaml")).unwrap();
    let options = RenderOptions::default();
    let expected = render_topology(&topology, &options).unwrap();

    let outputs: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| render_topology(&topology, &options).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    for out in outputs {
        assert_eq!(out, expected);
    }
}
