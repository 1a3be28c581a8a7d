// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Static partition tree: a binary space partition rebuilt wholesale on commit.

use core::fmt::Debug;
use core::ops::ControlFlow;

use kurbo::{Point, Rect};
use shapecast_geom::{Ray, RectExt, ray_rect};

use crate::backend::{Backend, keep_nearest};
use crate::result::RayHit;
use crate::shape::ShapeId;

type Item = (ShapeId, Rect);

/// Immutable binary partition over static shapes.
///
/// Nodes live in an arena. Each internal node splits its shapes in two along
/// x or y at the median of their maximum coordinate, choosing whichever axis
/// gives the more balanced split. A node stops splitting once it holds at most
/// `leaf_size` shapes or no split separates them.
#[derive(Default)]
pub struct StaticTree {
    nodes: Vec<Node>,
    root: Option<NodeIdx>,
    len: usize,
}

enum Kind {
    Leaf(Vec<Item>),
    Internal { side0: NodeIdx, side1: NodeIdx },
}

struct Node {
    bounds: Rect,
    kind: Kind,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct NodeIdx(usize);

impl NodeIdx {
    const fn get(self) -> usize {
        self.0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

/// How a ray meets the two children of an internal node.
#[derive(Copy, Clone, Debug, PartialEq)]
enum Descent {
    Neither,
    Only(NodeIdx),
    /// The origin is inside both children; their hits are unordered.
    Both(NodeIdx, NodeIdx),
    /// The ray reaches `near` first and enters `far` at distance `far_entry`.
    Ordered {
        near: NodeIdx,
        far: NodeIdx,
        far_entry: f64,
    },
}

fn union_bounds(items: &[Item]) -> Rect {
    let mut it = items.iter();
    let Some((_, first)) = it.next() else {
        return Rect::ZERO;
    };
    it.fold(*first, |acc, (_, b)| acc.union(*b))
}

fn split_axis(items: &[Item], axis: Axis) -> Option<(Vec<Item>, Vec<Item>)> {
    let key_max = |r: &Rect| match axis {
        Axis::X => r.x1,
        Axis::Y => r.y1,
    };
    let key_min = |r: &Rect| match axis {
        Axis::X => r.x0,
        Axis::Y => r.y0,
    };
    let mut sorted: Vec<Item> = items.to_vec();
    sorted.sort_by(|a, b| key_max(&a.1).total_cmp(&key_max(&b.1)));
    let n = sorted.len();
    let middle = if n % 2 == 0 { n / 2 - 1 } else { n / 2 };
    let split = key_max(&sorted[middle].1);
    let (side0, side1): (Vec<Item>, Vec<Item>) =
        sorted.into_iter().partition(|(_, b)| key_min(b) < split);
    (!side0.is_empty() && !side1.is_empty()).then_some((side0, side1))
}

fn best_split(items: &[Item]) -> Option<(Vec<Item>, Vec<Item>)> {
    let half = items.len() as f64 / 2.0;
    let imbalance = |s: &(Vec<Item>, Vec<Item>)| (half - s.0.len() as f64).abs();
    match (split_axis(items, Axis::X), split_axis(items, Axis::Y)) {
        (Some(x), Some(y)) => Some(if imbalance(&y) < imbalance(&x) { y } else { x }),
        (x, y) => x.or(y),
    }
}

impl StaticTree {
    /// Build a tree over `items` (handle and bounds pairs).
    pub fn build(items: Vec<(ShapeId, Rect)>, leaf_size: usize) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            root: None,
            len: items.len(),
        };
        if !items.is_empty() {
            tree.root = Some(tree.partition(items, leaf_size.max(1)));
        }
        tree
    }

    fn partition(&mut self, items: Vec<Item>, leaf_size: usize) -> NodeIdx {
        let bounds = union_bounds(&items);
        let split = if items.len() > leaf_size {
            best_split(&items)
        } else {
            None
        };
        let kind = match split {
            Some((s0, s1)) => {
                let side0 = self.partition(s0, leaf_size);
                let side1 = self.partition(s1, leaf_size);
                Kind::Internal { side0, side1 }
            }
            None => Kind::Leaf(items),
        };
        self.nodes.push(Node { bounds, kind });
        NodeIdx(self.nodes.len() - 1)
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of nodes on the longest root-to-leaf path (0 when empty).
    pub fn depth(&self) -> usize {
        let Some(root) = self.root else {
            return 0;
        };
        let mut deepest = 0;
        let mut stack = vec![(root, 1_usize)];
        while let Some((i, d)) = stack.pop() {
            deepest = deepest.max(d);
            if let Kind::Internal { side0, side1 } = self.nodes[i.get()].kind {
                stack.push((side0, d + 1));
                stack.push((side1, d + 1));
            }
        }
        deepest
    }

    fn classify(&self, ray: &Ray, a: NodeIdx, b: NodeIdx) -> Descent {
        let ba = self.nodes[a.get()].bounds;
        let bb = self.nodes[b.get()].bounds;
        match (ray_rect(ray, &ba), ray_rect(ray, &bb)) {
            (None, None) => Descent::Neither,
            (Some(_), None) => Descent::Only(a),
            (None, Some(_)) => Descent::Only(b),
            (Some(pa), Some(pb)) => {
                let origin = ray.origin();
                let (ta, tb) = (ray.parameter_of(pa), ray.parameter_of(pb));
                match (ba.contains_inclusive(origin), bb.contains_inclusive(origin)) {
                    (true, true) => Descent::Both(a, b),
                    (true, false) => Descent::Ordered {
                        near: a,
                        far: b,
                        far_entry: tb,
                    },
                    (false, true) => Descent::Ordered {
                        near: b,
                        far: a,
                        far_entry: ta,
                    },
                    (false, false) if ta <= tb => Descent::Ordered {
                        near: a,
                        far: b,
                        far_entry: tb,
                    },
                    (false, false) => Descent::Ordered {
                        near: b,
                        far: a,
                        far_entry: ta,
                    },
                }
            }
        }
    }

    fn ray_cast_node<F>(
        &self,
        node: NodeIdx,
        ray: &Ray,
        max_distance: f64,
        hit_test: &mut F,
    ) -> Option<RayHit>
    where
        F: FnMut(ShapeId) -> Option<Point>,
    {
        let (side0, side1) = match &self.nodes[node.get()].kind {
            Kind::Leaf(items) => {
                let mut best = None;
                for &(id, _) in items {
                    if let Some(p) = hit_test(id) {
                        keep_nearest(&mut best, ray, id, p, max_distance);
                    }
                }
                return best;
            }
            Kind::Internal { side0, side1 } => (*side0, *side1),
        };
        let nearer = |a: Option<RayHit>, b: Option<RayHit>| match (a, b) {
            (Some(a), Some(b)) => Some(if b.parameter < a.parameter { b } else { a }),
            (a, b) => a.or(b),
        };
        match self.classify(ray, side0, side1) {
            Descent::Neither => None,
            Descent::Only(child) => self.ray_cast_node(child, ray, max_distance, hit_test),
            Descent::Both(a, b) => nearer(
                self.ray_cast_node(a, ray, max_distance, hit_test),
                self.ray_cast_node(b, ray, max_distance, hit_test),
            ),
            Descent::Ordered {
                near,
                far,
                far_entry,
            } => {
                let near_hit = self.ray_cast_node(near, ray, max_distance, hit_test);
                // Nothing in `far` can be closer than where the ray enters it.
                if near_hit.is_some_and(|h| h.parameter <= far_entry) || far_entry > max_distance {
                    return near_hit;
                }
                nearer(
                    near_hit,
                    self.ray_cast_node(far, ray, max_distance, hit_test),
                )
            }
        }
    }
}

impl Backend for StaticTree {
    fn len(&self) -> usize {
        self.len
    }

    fn bounds(&self) -> Option<Rect> {
        self.root.map(|r| self.nodes[r.get()].bounds)
    }

    fn visit_rect<F>(&self, rect: Rect, mut f: F) -> ControlFlow<()>
    where
        F: FnMut(ShapeId) -> ControlFlow<()>,
    {
        let Some(root) = self.root else {
            return ControlFlow::Continue(());
        };
        let mut stack = vec![root];
        while let Some(i) = stack.pop() {
            let n = &self.nodes[i.get()];
            if !n.bounds.touches(&rect) {
                continue;
            }
            match &n.kind {
                Kind::Leaf(items) => {
                    for (id, b) in items {
                        if b.touches(&rect) {
                            f(*id)?;
                        }
                    }
                }
                Kind::Internal { side0, side1 } => {
                    stack.push(*side1);
                    stack.push(*side0);
                }
            }
        }
        ControlFlow::Continue(())
    }

    fn visit_point<F>(&self, point: Point, mut f: F) -> ControlFlow<()>
    where
        F: FnMut(ShapeId) -> ControlFlow<()>,
    {
        let Some(root) = self.root else {
            return ControlFlow::Continue(());
        };
        let mut stack = vec![root];
        while let Some(i) = stack.pop() {
            let n = &self.nodes[i.get()];
            if !n.bounds.contains_inclusive(point) {
                continue;
            }
            match &n.kind {
                Kind::Leaf(items) => {
                    for (id, b) in items {
                        if b.contains_inclusive(point) {
                            f(*id)?;
                        }
                    }
                }
                Kind::Internal { side0, side1 } => {
                    stack.push(*side1);
                    stack.push(*side0);
                }
            }
        }
        ControlFlow::Continue(())
    }

    fn ray_cast<F>(&self, ray: &Ray, max_distance: f64, mut hit_test: F) -> Option<RayHit>
    where
        F: FnMut(ShapeId) -> Option<Point>,
    {
        if ray.is_degenerate() {
            return None;
        }
        let root = self.root?;
        self.ray_cast_node(root, ray, max_distance, &mut hit_test)
    }
}

impl Debug for StaticTree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StaticTree")
            .field("shapes", &self.len)
            .field("nodes", &self.nodes.len())
            .field("depth", &self.depth())
            .finish_non_exhaustive()
    }
}
