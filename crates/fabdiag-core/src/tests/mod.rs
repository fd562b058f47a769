mod pairing;

use crate::Record;
use serde_json::{Map, Value, json};

pub(crate) fn switch(name: &str, role: &str) -> Record {
    Record::new("Switch", name, json!({ "role": role }))
}

pub(crate) fn server(name: &str) -> Record {
    Record::new("Server", name, json!({}))
}

pub(crate) fn connection(name: &str, spec: Value) -> Record {
    Record::new("Connection", name, spec)
}

pub(crate) fn fabric(name: &str, spine_port: &str, leaf_port: &str) -> Record {
    connection(
        name,
        json!({ "fabric": { "links": [
            { "spine": { "port": spine_port }, "leaf": { "port": leaf_port } }
        ] } }),
    )
}

/// A server connection of kind `key` (`mclag`, `bundled`, `eslag`) with one link per port pair.
pub(crate) fn server_links(name: &str, key: &str, pairs: &[(&str, &str)]) -> Record {
    let links: Vec<Value> = pairs
        .iter()
        .map(|(server, switch)| {
            json!({ "server": { "port": server }, "switch": { "port": switch } })
        })
        .collect();
    let mut spec = Map::new();
    spec.insert(key.to_string(), json!({ "links": links }));
    connection(name, Value::Object(spec))
}

pub(crate) fn unbundled(name: &str, server_port: &str, switch_port: &str) -> Record {
    connection(
        name,
        json!({ "unbundled": { "link": {
            "server": { "port": server_port },
            "switch": { "port": switch_port }
        } } }),
    )
}
