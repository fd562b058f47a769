use crate::geom::{Point, Vector, point};
use fabdiag_core::Tier;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutPoint {
    pub x: f64,
    pub y: f64,
}

impl From<Point> for LayoutPoint {
    fn from(p: Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn from_boxes<'a>(boxes: impl IntoIterator<Item = &'a NodeBox>) -> Option<Self> {
        let mut it = boxes.into_iter();
        let first = it.next()?;
        let mut b = Self {
            min_x: first.x,
            min_y: first.y,
            max_x: first.right(),
            max_y: first.bottom(),
        };
        for n in it {
            b.min_x = b.min_x.min(n.x);
            b.min_y = b.min_y.min(n.y);
            b.max_x = b.max_x.max(n.right());
            b.max_y = b.max_y.max(n.bottom());
        }
        Some(b)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn pad(self, padding: f64) -> Self {
        Self {
            min_x: self.min_x - padding,
            min_y: self.min_y - padding,
            max_x: self.max_x + padding,
            max_y: self.max_y + padding,
        }
    }
}

/// A placed node. `x`/`y` is the top-left corner in canvas coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeBox {
    pub id: String,
    pub tier: Tier,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl NodeBox {
    pub fn center(&self) -> Point {
        point(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Absolute position of a relative anchor on this box.
    pub fn point_at(&self, anchor: Anchor) -> Point {
        point(
            self.x + anchor.x * self.width,
            self.y + anchor.y * self.height,
        )
    }
}

/// Where an edge attaches to a node, relative to its box (`0..=1` on both axes).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Anchor {
    pub x: f64,
    pub y: f64,
}

/// Absolute shift applied to both ends of an edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EdgeOffset {
    pub dx: f64,
    pub dy: f64,
}

impl From<Vector> for EdgeOffset {
    fn from(v: Vector) -> Self {
        Self { dx: v.x, dy: v.y }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortLabel {
    pub text: String,
    /// Label center.
    pub x: f64,
    pub y: f64,
    /// Degrees, always within `[-90, 90]`.
    pub rotation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeGeometry {
    /// Index into `Topology::links()`.
    pub link: usize,
    pub source: String,
    pub target: String,
    pub exit: Anchor,
    pub entry: Anchor,
    pub offset: EdgeOffset,
    pub start: LayoutPoint,
    pub end: LayoutPoint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_label: Option<PortLabel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_label: Option<PortLabel>,
}
