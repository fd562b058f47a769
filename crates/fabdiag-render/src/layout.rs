//! Deterministic tier-row layout.
//!
//! Every tier is one horizontal row centered on the canvas. Edges are straight lines between
//! boundary anchors; anchors are spread per node so several edges leaving the same side do not
//! collapse onto one point. Working counters live in a [`LayoutSession`] created per call.

use crate::Result;
use crate::geom::{Point, Vector, vector};
use crate::model::{Anchor, Bounds, EdgeGeometry, EdgeOffset, LayoutPoint, NodeBox, PortLabel};
use crate::util::round_to;
use fabdiag_core::{LayeredNodes, Link, Node, NodeKind, Pairing, Tier, Topology, layer_topology};
use rustc_hash::FxHashMap;
use serde::Serialize;

pub const CANVAS_WIDTH: f64 = 1400.0;
pub const CANVAS_MARGIN: f64 = 40.0;

/// Row tops: gateway/external, spine, leaf, server.
const ROW_Y: [f64; 4] = [40.0, 200.0, 380.0, 560.0];

const SWITCH_SIZE: (f64, f64) = (100.0, 50.0);
const SERVER_SIZE: (f64, f64) = (90.0, 40.0);
const EDGE_NODE_SIZE: (f64, f64) = (100.0, 50.0);

const MIN_SPINE_SPACING: f64 = 120.0;
const SPINE_SPAN_MIN_RATIO: f64 = 0.5;
const SPINE_SPAN_MAX_RATIO: f64 = 1.2;

const ANCHOR_SECTOR_DEG: f64 = 15.0;
const ANCHOR_NUDGE_DEG: f64 = 4.0;
const SPINE_NUDGE_SCALE: f64 = 1.5;

const PARALLEL_STEP: f64 = 8.0;
const LEAF_PEER_NUDGE: f64 = 10.0;
const SPINE_CROSS_NUDGE: f64 = 6.0;

const LABEL_DISTANCE: f64 = 30.0;
const LABEL_OFFSET_AXIS: f64 = 12.0;
const LABEL_OFFSET_DIAGONAL: f64 = 7.0;
const AXIS_TOLERANCE_DEG: f64 = 15.0;

const EPS: f64 = 1e-9;

fn leaf_spacing(count: usize) -> f64 {
    match count {
        0..=3 => 200.0,
        4..=5 => 160.0,
        _ => 120.0,
    }
}

fn server_spacing(count: usize) -> f64 {
    match count {
        0..=4 => 160.0,
        5..=8 => 130.0,
        _ => 110.0,
    }
}

fn spine_base_spacing(count: usize) -> f64 {
    match count {
        0..=2 => 300.0,
        3..=4 => 220.0,
        _ => 160.0,
    }
}

fn top_row_spacing(count: usize) -> f64 {
    if count <= 3 { 200.0 } else { 150.0 }
}

/// Keeps the spine row span between 50% and 120% of the leaf row span.
fn spine_spacing(spines: usize, leaves: usize) -> f64 {
    let mut spacing = spine_base_spacing(spines);
    if spines >= 2 && leaves >= 2 {
        let gaps = (spines - 1) as f64;
        let leaf_span = (leaves - 1) as f64 * leaf_spacing(leaves);
        let span = gaps * spacing;
        if span < SPINE_SPAN_MIN_RATIO * leaf_span {
            spacing = SPINE_SPAN_MIN_RATIO * leaf_span / gaps;
        } else if span > SPINE_SPAN_MAX_RATIO * leaf_span {
            spacing = SPINE_SPAN_MAX_RATIO * leaf_span / gaps;
        }
        spacing = spacing.max(MIN_SPINE_SPACING);
    }
    spacing
}

fn node_size(node: &Node) -> (f64, f64) {
    match node.kind {
        NodeKind::Switch => SWITCH_SIZE,
        NodeKind::Server => SERVER_SIZE,
        NodeKind::Gateway | NodeKind::External => EDGE_NODE_SIZE,
    }
}

#[derive(Debug, Clone)]
pub struct Layout<'a> {
    pub layers: LayeredNodes<'a>,
    pub pairing: Pairing,
    /// Placed nodes in tier order.
    pub nodes: Vec<NodeBox>,
    /// One entry per topology link, in link order.
    pub edges: Vec<EdgeGeometry>,
    pub width: f64,
    pub height: f64,
    index: FxHashMap<String, usize>,
}

impl<'a> Layout<'a> {
    pub fn compute(topology: &'a Topology) -> Self {
        let (layers, pairing) = layer_topology(topology);

        let mut session = LayoutSession::new(&layers);
        session.place_tiers(&layers);
        let edges = session.route_edges(topology.links());

        let nodes: Vec<NodeBox> = layers
            .iter()
            .filter_map(|(_, n)| session.boxes.get(n.id.as_str()).cloned())
            .collect();
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();

        let (width, height) = match Bounds::from_boxes(&nodes) {
            Some(b) => (
                CANVAS_WIDTH.max(b.max_x + CANVAS_MARGIN),
                b.max_y + CANVAS_MARGIN,
            ),
            None => (CANVAS_WIDTH, 0.0),
        };

        tracing::trace!(
            nodes = nodes.len(),
            edges = edges.len(),
            width,
            height,
            "layout computed"
        );

        Self {
            layers,
            pairing,
            nodes,
            edges,
            width,
            height,
            index,
        }
    }

    pub fn node_box(&self, id: &str) -> Option<&NodeBox> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_boxes(&self.nodes)
    }

    /// Bounds of a set of placed nodes; ids without a box are ignored.
    pub fn bounds_of<'b>(&self, ids: impl IntoIterator<Item = &'b str>) -> Option<Bounds> {
        Bounds::from_boxes(ids.into_iter().filter_map(|id| self.node_box(id)))
    }

    /// Geometry of the edge drawn for `topology.links()[link]`.
    pub fn edge(&self, link: usize) -> Option<&EdgeGeometry> {
        self.edges
            .binary_search_by_key(&link, |e| e.link)
            .ok()
            .map(|i| &self.edges[i])
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        #[derive(Serialize)]
        struct TierRow<'b> {
            tier: Tier,
            nodes: Vec<&'b str>,
        }

        #[derive(Serialize)]
        struct Snapshot<'b> {
            width: f64,
            height: f64,
            tiers: Vec<TierRow<'b>>,
            pairing: &'b Pairing,
            nodes: &'b [NodeBox],
            edges: &'b [EdgeGeometry],
        }

        let tiers = Tier::ALL
            .into_iter()
            .filter(|t| !self.layers.tier(*t).is_empty())
            .map(|tier| TierRow {
                tier,
                nodes: self.layers.ids(tier),
            })
            .collect();

        Ok(serde_json::to_value(Snapshot {
            width: self.width,
            height: self.height,
            tiers,
            pairing: &self.pairing,
            nodes: &self.nodes,
            edges: &self.edges,
        })?)
    }
}

/// Mutable state for one layout pass.
#[derive(Debug)]
pub struct LayoutSession<'a> {
    boxes: FxHashMap<&'a str, NodeBox>,
    anchor_usage: FxHashMap<(&'a str, i32), u32>,
    spine_count: usize,
    leaf_count: usize,
    /// Canvas x of the row centers; moves right when wide rows are shifted into view.
    center_x: f64,
}

impl<'a> LayoutSession<'a> {
    pub fn new(layers: &LayeredNodes<'a>) -> Self {
        Self {
            boxes: FxHashMap::default(),
            anchor_usage: FxHashMap::default(),
            spine_count: layers.spine.len(),
            leaf_count: layers.leaf.len(),
            center_x: CANVAS_WIDTH / 2.0,
        }
    }

    pub fn place_tiers(&mut self, layers: &LayeredNodes<'a>) {
        let top: Vec<(Tier, &'a Node)> = layers
            .gateway
            .iter()
            .map(|n| (Tier::Gateway, *n))
            .chain(layers.external.iter().map(|n| (Tier::External, *n)))
            .collect();
        self.place_row(&top, ROW_Y[0], top_row_spacing(top.len()));

        let mut row = 1;
        if !layers.spine.is_empty() {
            let spacing = spine_spacing(layers.spine.len(), layers.leaf.len());
            self.place_row(&tagged(Tier::Spine, &layers.spine), ROW_Y[row], spacing);
            row += 1;
        }
        self.place_row(
            &tagged(Tier::Leaf, &layers.leaf),
            ROW_Y[row],
            leaf_spacing(layers.leaf.len()),
        );
        self.place_row(
            &tagged(Tier::Server, &layers.server),
            ROW_Y[row + 1],
            server_spacing(layers.server.len()),
        );
        self.keep_in_margin();
    }

    /// Shifts every box right when a wide row starts left of the canvas margin.
    fn keep_in_margin(&mut self) {
        let Some(min_x) = self.boxes.values().map(|b| b.x).reduce(f64::min) else {
            return;
        };
        if min_x >= CANVAS_MARGIN {
            return;
        }
        let dx = CANVAS_MARGIN - min_x;
        for b in self.boxes.values_mut() {
            b.x = round_to(b.x + dx, 2);
        }
        self.center_x += dx;
        tracing::trace!(dx, "rows shifted right into the canvas margin");
    }

    fn place_row(&mut self, nodes: &[(Tier, &'a Node)], top: f64, spacing: f64) {
        if nodes.is_empty() {
            return;
        }
        let first = CANVAS_WIDTH / 2.0 - (nodes.len() - 1) as f64 * spacing / 2.0;
        for (i, &(tier, node)) in nodes.iter().enumerate() {
            let (width, height) = node_size(node);
            let cx = first + i as f64 * spacing;
            self.boxes.insert(
                node.id.as_str(),
                NodeBox {
                    id: node.id.clone(),
                    tier,
                    x: round_to(cx - width / 2.0, 2),
                    y: top,
                    width,
                    height,
                },
            );
        }
    }

    pub fn node_box(&self, id: &str) -> Option<&NodeBox> {
        self.boxes.get(id)
    }

    /// Routes every link whose endpoints are both placed. Links between the same unordered
    /// node pair are spread apart in link order.
    pub fn route_edges(&mut self, links: &'a [Link]) -> Vec<EdgeGeometry> {
        let mut bundles: FxHashMap<(&str, &str), Vec<usize>> = FxHashMap::default();
        for (i, link) in links.iter().enumerate() {
            let key = if link.source <= link.target {
                (link.source.as_str(), link.target.as_str())
            } else {
                (link.target.as_str(), link.source.as_str())
            };
            bundles.entry(key).or_default().push(i);
        }
        let mut slots = vec![(0usize, 1usize); links.len()];
        for members in bundles.values() {
            for (pos, &i) in members.iter().enumerate() {
                slots[i] = (pos, members.len());
            }
        }

        links
            .iter()
            .enumerate()
            .filter_map(|(i, link)| self.route_edge(i, link, slots[i]))
            .collect()
    }

    fn route_edge(
        &mut self,
        index: usize,
        link: &'a Link,
        (slot, bundle): (usize, usize),
    ) -> Option<EdgeGeometry> {
        let Some(src) = self.boxes.get(link.source.as_str()).cloned() else {
            tracing::debug!(source = %link.source, "edge source not placed; skipped");
            return None;
        };
        let Some(dst) = self.boxes.get(link.target.as_str()).cloned() else {
            tracing::debug!(target = %link.target, "edge target not placed; skipped");
            return None;
        };
        let (sc, dc) = (src.center(), dst.center());

        let exit = self.anchor(link.source.as_str(), &src, dc);
        let entry = self.anchor(link.target.as_str(), &dst, sc);

        // Bundles are keyed by the unordered pair; the normal follows lower id → higher id.
        let along = if link.source <= link.target {
            dc - sc
        } else {
            sc - dc
        };
        let spread = PARALLEL_STEP * (slot as f64 - (bundle as f64 - 1.0) / 2.0);
        let mut shift = unit_normal(along) * spread;
        shift.y += self.corrective_nudge(&src, &dst);
        let shift = vector(round_to(shift.x, 2), round_to(shift.y, 2));

        let start = src.point_at(exit) + shift;
        let end = dst.point_at(entry) + shift;
        let (source_label, target_label) =
            port_labels(start, end, link.source_port_name(), link.target_port_name());

        Some(EdgeGeometry {
            link: index,
            source: link.source.clone(),
            target: link.target.clone(),
            exit,
            entry,
            offset: EdgeOffset::from(shift),
            start: LayoutPoint::from(start),
            end: LayoutPoint::from(end),
            source_label,
            target_label,
        })
    }

    /// Picks the boundary point of `node` facing `toward`.
    ///
    /// The bearing is quantized to a sector; repeated use of the same sector on the same node
    /// fans out by alternating nudges.
    fn anchor(&mut self, id: &'a str, node: &NodeBox, toward: Point) -> Anchor {
        let d = toward - node.center();
        let bearing = d.y.atan2(d.x).to_degrees();
        let sectors = (360.0 / ANCHOR_SECTOR_DEG) as i32;
        let sector = ((bearing / ANCHOR_SECTOR_DEG).round() as i32).rem_euclid(sectors);

        let used = self.anchor_usage.entry((id, sector)).or_insert(0);
        let k = *used;
        *used += 1;

        let step = if node.tier == Tier::Spine {
            ANCHOR_NUDGE_DEG * SPINE_NUDGE_SCALE
        } else {
            ANCHOR_NUDGE_DEG
        };
        let nudge = match k {
            0 => 0.0,
            k => {
                let magnitude = k.div_ceil(2) as f64 * step;
                if k % 2 == 1 { magnitude } else { -magnitude }
            }
        };

        let angle = (sector as f64 * ANCHOR_SECTOR_DEG + nudge).to_radians();
        rect_anchor(node.width, node.height, angle)
    }

    fn corrective_nudge(&self, src: &NodeBox, dst: &NodeBox) -> f64 {
        match (src.tier, dst.tier) {
            (Tier::Leaf, Tier::Leaf) => LEAF_PEER_NUDGE,
            (Tier::Spine, Tier::Leaf) | (Tier::Leaf, Tier::Spine)
                if self.spine_count > 2 && self.leaf_count > 3 =>
            {
                let mid = self.center_x;
                let a = src.center().x - mid;
                let b = dst.center().x - mid;
                if a * b < 0.0 { SPINE_CROSS_NUDGE } else { 0.0 }
            }
            _ => 0.0,
        }
    }
}

fn tagged<'a>(tier: Tier, nodes: &[&'a Node]) -> Vec<(Tier, &'a Node)> {
    nodes.iter().map(|n| (tier, *n)).collect()
}

fn unit_normal(d: Vector) -> Vector {
    let len = d.length();
    if len < EPS {
        vector(0.0, 0.0)
    } else {
        vector(-d.y / len, d.x / len)
    }
}

/// Intersects a ray from the box center at `angle` (radians) with the box outline.
fn rect_anchor(width: f64, height: f64, angle: f64) -> Anchor {
    let (hw, hh) = (width / 2.0, height / 2.0);
    let (cos, sin) = (angle.cos(), angle.sin());
    let tx = if cos.abs() > EPS { hw / cos.abs() } else { f64::INFINITY };
    let ty = if sin.abs() > EPS { hh / sin.abs() } else { f64::INFINITY };
    let t = tx.min(ty);
    Anchor {
        x: round_to(((hw + t * cos) / width).clamp(0.0, 1.0), 3),
        y: round_to(((hh + t * sin) / height).clamp(0.0, 1.0), 3),
    }
}

fn label_offset(angle_deg: f64) -> f64 {
    let a = angle_deg.abs() % 180.0;
    let horizontal = a < AXIS_TOLERANCE_DEG || a > 180.0 - AXIS_TOLERANCE_DEG;
    let vertical = (a - 90.0).abs() < AXIS_TOLERANCE_DEG;
    if horizontal || vertical {
        LABEL_OFFSET_AXIS
    } else {
        LABEL_OFFSET_DIAGONAL
    }
}

/// Folds an edge angle into `[-90, 90]` so text never renders upside down.
pub(crate) fn upright(angle_deg: f64) -> f64 {
    let mut r = angle_deg;
    while r > 90.0 {
        r -= 180.0;
    }
    while r < -90.0 {
        r += 180.0;
    }
    round_to(r, 2)
}

fn port_labels(
    start: Point,
    end: Point,
    source_text: Option<&str>,
    target_text: Option<&str>,
) -> (Option<PortLabel>, Option<PortLabel>) {
    let d = end - start;
    let len = d.length();
    if len < EPS {
        return (None, None);
    }
    let u = d / len;
    let angle = u.y.atan2(u.x).to_degrees();
    let side = vector(-u.y, u.x) * label_offset(angle);
    let rotation = upright(angle);

    let place = |text: &str, at: Point| PortLabel {
        text: text.to_string(),
        x: round_to(at.x, 2),
        y: round_to(at.y, 2),
        rotation,
    };
    let source = source_text
        .filter(|t| !t.is_empty())
        .map(|t| place(t, start + u * LABEL_DISTANCE + side));
    let target = target_text
        .filter(|t| !t.is_empty())
        .map(|t| place(t, end - u * LABEL_DISTANCE + side));
    (source, target)
}
