#![forbid(unsafe_code)]

//! Fabric wiring records → topology model (headless).
//!
//! Pipeline stages provided here:
//! - [`parse_records`]: multi-document YAML → [`Record`] list
//! - [`extract_topology`]: records → [`Topology`] (nodes + typed links)
//! - [`layer_topology`]: tiers, redundancy pairing and the final server order
//!
//! Every stage is a pure function of its input and independent of record order.

pub mod error;
pub mod extract;
pub mod layers;
pub mod model;
pub mod pairing;
pub mod record;

pub use error::{Error, Result};
pub use extract::{Extractor, extract_topology};
pub use layers::{LayeredNodes, Tier, layer_topology};
pub use model::{Link, LinkKind, McLagRole, Node, NodeKind, Topology};
pub use pairing::{LeafGroup, Pairing, Partner, Redundancy, ServerConnection};
pub use record::{Record, RecordKind, parse_records};

/// Parses a record stream and extracts its topology in one step.
pub fn topology_from_yaml(text: &str) -> Result<Topology> {
    let records = parse_records(text)?;
    Ok(extract_topology(&records))
}

#[cfg(test)]
mod tests;
