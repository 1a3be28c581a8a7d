// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`SpatialTree`] index: registration, commit and the four query kinds.

use core::fmt::Debug;
use core::ops::ControlFlow;
use std::collections::BTreeSet;

use kurbo::{Affine, Point, Rect};
use rustc_hash::FxHashSet;
use shapecast_geom::{Ray, RayIntersect, overlap};

use crate::backend::Backend;
use crate::config::IndexConfig;
use crate::error::ConfigError;
use crate::grid::DynamicGrid;
use crate::result::{
    Contact, IntersectionQueryResult, MAX_RESULTS, PartitionFilter, RangeQueryResult,
    RayCastResult, ResultBuffer,
};
use crate::shape::{IndexId, Partition, Registration, Shape, ShapeArena, ShapeId, ShapeMask};
use crate::static_tree::StaticTree;

/// Push `item`, or record truncation and stop the walk.
fn offer<T: Copy>(out: &mut ResultBuffer<T>, item: T, query: &str) -> ControlFlow<()> {
    match out.try_push(item) {
        Ok(()) => ControlFlow::Continue(()),
        Err(_) => {
            log::debug!("{query} stopped at {MAX_RESULTS} results");
            ControlFlow::Break(())
        }
    }
}

/// A two-partition spatial index over shapes stored in a [`ShapeArena`].
///
/// Immobile shapes go in the static partition, a binary partition tree that is
/// rebuilt wholesale by [`commit`](Self::commit). Moving shapes go in the
/// dynamic partition, a hash grid that is updated in place by
/// [`transform`](Self::transform).
///
/// Static changes are staged: queries read the tree built by the last commit,
/// skip shapes removed since then, and do not yet see shapes added since then.
/// Dynamic changes are visible immediately.
///
/// The index stores handles only. Shapes record their registration, so
/// [`clear`](Self::clear) the index (or [`remove`](Self::remove) its shapes)
/// before dropping it; otherwise the arena keeps treating them as registered.
pub struct SpatialTree {
    id: IndexId,
    config: IndexConfig,
    grid: DynamicGrid,
    static_tree: StaticTree,
    static_members: BTreeSet<ShapeId>,
    pending_static: FxHashSet<ShapeId>,
    dirty: bool,
}

impl Default for SpatialTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatialTree {
    /// Create an empty index with the default configuration.
    pub fn new() -> Self {
        Self::build(IndexConfig::default())
    }

    /// Create an empty index with `config`.
    pub fn with_config(config: IndexConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: IndexConfig) -> Self {
        Self {
            id: IndexId::next(),
            config,
            grid: DynamicGrid::new(config.cell_size),
            static_tree: StaticTree::default(),
            static_members: BTreeSet::new(),
            pending_static: FxHashSet::default(),
            dirty: false,
        }
    }

    /// Identity recorded in the registrations of this index's shapes.
    pub fn id(&self) -> IndexId {
        self.id
    }

    /// The configuration the index was built with.
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    fn register(&self, arena: &mut ShapeArena, id: ShapeId, partition: Partition) -> Rect {
        let Some(shape) = arena.get_mut(id) else {
            panic!("{id:?} is not a live shape");
        };
        if let Some(r) = shape.registration() {
            panic!("{id:?} is already registered in {:?}", r.index);
        }
        shape.set_registration(Some(Registration {
            index: self.id,
            partition,
        }));
        log::trace!("{id:?} registered as {partition:?}");
        shape.bounding_box()
    }

    /// Register a shape in the static partition.
    ///
    /// The shape becomes visible to queries after the next [`commit`](Self::commit).
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale or the shape is already registered.
    pub fn add_static(&mut self, arena: &mut ShapeArena, id: ShapeId) {
        let _ = self.register(arena, id, Partition::Static);
        self.static_members.insert(id);
        self.pending_static.insert(id);
        self.dirty = true;
    }

    /// Register a shape in the dynamic partition. It is queryable immediately.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale or the shape is already registered.
    pub fn add_dynamic(&mut self, arena: &mut ShapeArena, id: ShapeId) {
        let bounds = self.register(arena, id, Partition::Dynamic);
        self.grid.insert(id, bounds);
    }

    /// Unregister a shape from whichever partition holds it.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale or the shape is not registered in this index.
    pub fn remove(&mut self, arena: &mut ShapeArena, id: ShapeId) {
        let Some(shape) = arena.get_mut(id) else {
            panic!("{id:?} is not a live shape");
        };
        let partition = match shape.registration() {
            Some(r) if r.index == self.id => r.partition,
            _ => panic!("{id:?} is not registered in {:?}", self.id),
        };
        shape.set_registration(None);
        match partition {
            Partition::Static => {
                self.static_members.remove(&id);
                self.pending_static.remove(&id);
                self.dirty = true;
            }
            Partition::Dynamic => {
                self.grid.remove(id);
            }
        }
        log::trace!("{id:?} removed from {partition:?}");
    }

    /// Apply `affine` to a dynamic shape and move it in the grid.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale or the shape is not registered as dynamic in
    /// this index. Static shapes never move; remove and re-add them instead.
    pub fn transform(&mut self, arena: &mut ShapeArena, id: ShapeId, affine: Affine) {
        let Some(shape) = arena.get_mut(id) else {
            panic!("{id:?} is not a live shape");
        };
        assert_eq!(
            shape.registration(),
            Some(Registration {
                index: self.id,
                partition: Partition::Dynamic,
            }),
            "only dynamic shapes of this index can be transformed"
        );
        shape.transform_registered(affine);
        let bounds = shape.bounding_box();
        self.grid.relocate(id, bounds);
    }

    /// Whether static changes are waiting for [`commit`](Self::commit).
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Rebuild the static partition if it changed. Returns whether a rebuild happened.
    pub fn commit(&mut self, arena: &ShapeArena) -> bool {
        if !self.dirty {
            return false;
        }
        let items: Vec<(ShapeId, Rect)> = self
            .static_members
            .iter()
            .filter_map(|&id| arena.get(id).map(|s| (id, s.bounding_box())))
            .collect();
        self.static_tree = StaticTree::build(items, self.config.static_leaf_size);
        self.pending_static.clear();
        self.dirty = false;
        log::debug!(
            "static partition rebuilt: {} shapes, {} nodes, depth {}",
            self.static_tree.len(),
            self.static_tree.node_count(),
            self.static_tree.depth()
        );
        true
    }

    /// A committed static shape of this index matching `mask`.
    fn static_shape<'a>(
        &self,
        arena: &'a ShapeArena,
        id: ShapeId,
        mask: ShapeMask,
    ) -> Option<&'a Shape> {
        if self.pending_static.contains(&id) {
            return None;
        }
        let shape = arena.get(id)?;
        let current = shape.registration()
            == Some(Registration {
                index: self.id,
                partition: Partition::Static,
            });
        (current && shape.type_mask().intersects(mask)).then_some(shape)
    }

    /// A dynamic shape of this index matching `mask`.
    fn dynamic_shape<'a>(
        &self,
        arena: &'a ShapeArena,
        id: ShapeId,
        mask: ShapeMask,
    ) -> Option<&'a Shape> {
        arena
            .get(id)
            .filter(|s| s.type_mask().intersects(mask))
    }

    /// Nearest shape hit by `ray` among shapes whose type mask intersects `mask`.
    ///
    /// When both partitions are searched, the static hit bounds the dynamic
    /// walk and wins ties.
    pub fn ray_cast(
        &self,
        arena: &ShapeArena,
        ray: &Ray,
        mask: ShapeMask,
        filter: PartitionFilter,
    ) -> RayCastResult {
        if ray.is_degenerate() {
            return None;
        }
        let static_hit = if filter.contains(PartitionFilter::STATIC) {
            self.static_tree.ray_cast(ray, f64::INFINITY, |id| {
                self.static_shape(arena, id, mask)?
                    .geometry()
                    .ray_intersection(ray)
            })
        } else {
            None
        };
        if !filter.contains(PartitionFilter::DYNAMIC) {
            return static_hit;
        }
        let bound = static_hit.map_or(f64::INFINITY, |h| h.parameter);
        let dynamic_hit = self.grid.ray_cast(ray, bound, |id| {
            self.dynamic_shape(arena, id, mask)?
                .geometry()
                .ray_intersection(ray)
        });
        match (static_hit, dynamic_hit) {
            (Some(s), Some(d)) if d.parameter < s.parameter => Some(d),
            (Some(s), _) => Some(s),
            (None, d) => d,
        }
    }

    /// Collect shapes whose bounds touch `rect` into `out`.
    ///
    /// The dynamic partition is searched first. Collection stops when `out`
    /// is full, and [`truncated`](ResultBuffer::truncated) reports whether a
    /// further match was dropped.
    pub fn range_query_into(
        &self,
        arena: &ShapeArena,
        rect: Rect,
        mask: ShapeMask,
        filter: PartitionFilter,
        exclude: Option<ShapeId>,
        out: &mut RangeQueryResult,
    ) {
        let _ = self.collect_range(arena, rect.abs(), mask, filter, exclude, out);
    }

    /// Value-returning form of [`range_query_into`](Self::range_query_into).
    pub fn range_query(
        &self,
        arena: &ShapeArena,
        rect: Rect,
        mask: ShapeMask,
        filter: PartitionFilter,
        exclude: Option<ShapeId>,
    ) -> RangeQueryResult {
        let mut out = RangeQueryResult::new();
        self.range_query_into(arena, rect, mask, filter, exclude, &mut out);
        out
    }

    fn collect_range(
        &self,
        arena: &ShapeArena,
        rect: Rect,
        mask: ShapeMask,
        filter: PartitionFilter,
        exclude: Option<ShapeId>,
        out: &mut RangeQueryResult,
    ) -> ControlFlow<()> {
        if filter.contains(PartitionFilter::DYNAMIC) {
            self.grid.visit_rect(rect, |id| {
                if Some(id) == exclude || self.dynamic_shape(arena, id, mask).is_none() {
                    return ControlFlow::Continue(());
                }
                offer(out, id, "range query")
            })?;
        }
        if filter.contains(PartitionFilter::STATIC) {
            self.static_tree.visit_rect(rect, |id| {
                if Some(id) == exclude || self.static_shape(arena, id, mask).is_none() {
                    return ControlFlow::Continue(());
                }
                offer(out, id, "range query")
            })?;
        }
        ControlFlow::Continue(())
    }

    /// Collect shapes containing `point` into `out`.
    pub fn pick_query_into(
        &self,
        arena: &ShapeArena,
        point: Point,
        mask: ShapeMask,
        filter: PartitionFilter,
        out: &mut RangeQueryResult,
    ) {
        let _ = self.collect_pick(arena, point, mask, filter, out);
    }

    /// Value-returning form of [`pick_query_into`](Self::pick_query_into).
    pub fn pick_query(
        &self,
        arena: &ShapeArena,
        point: Point,
        mask: ShapeMask,
        filter: PartitionFilter,
    ) -> RangeQueryResult {
        let mut out = RangeQueryResult::new();
        self.pick_query_into(arena, point, mask, filter, &mut out);
        out
    }

    fn collect_pick(
        &self,
        arena: &ShapeArena,
        point: Point,
        mask: ShapeMask,
        filter: PartitionFilter,
        out: &mut RangeQueryResult,
    ) -> ControlFlow<()> {
        if filter.contains(PartitionFilter::DYNAMIC) {
            self.grid.visit_point(point, |id| {
                match self.dynamic_shape(arena, id, mask) {
                    Some(s) if s.geometry().contains(point) => offer(out, id, "pick query"),
                    _ => ControlFlow::Continue(()),
                }
            })?;
        }
        if filter.contains(PartitionFilter::STATIC) {
            self.static_tree.visit_point(point, |id| {
                match self.static_shape(arena, id, mask) {
                    Some(s) if s.geometry().contains(point) => offer(out, id, "pick query"),
                    _ => ControlFlow::Continue(()),
                }
            })?;
        }
        ControlFlow::Continue(())
    }

    /// Collect the shapes overlapping shape `id` into `out`.
    ///
    /// Candidates are shapes whose type mask intersects the collision mask of
    /// `id`. Each [`Contact`] normal is the direction that pushes `id` out of
    /// the candidate.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale or not registered in this index.
    pub fn intersection_query_into(
        &self,
        arena: &ShapeArena,
        id: ShapeId,
        filter: PartitionFilter,
        out: &mut IntersectionQueryResult,
    ) {
        let Some(shape) = arena.get(id) else {
            panic!("{id:?} is not a live shape");
        };
        assert_eq!(
            shape.parent(),
            Some(self.id),
            "intersection queries need a shape registered in this index"
        );
        let _ = self.collect_contacts(arena, id, shape, filter, out);
    }

    /// Value-returning form of [`intersection_query_into`](Self::intersection_query_into).
    pub fn intersection_query(
        &self,
        arena: &ShapeArena,
        id: ShapeId,
        filter: PartitionFilter,
    ) -> IntersectionQueryResult {
        let mut out = IntersectionQueryResult::new();
        self.intersection_query_into(arena, id, filter, &mut out);
        out
    }

    fn collect_contacts(
        &self,
        arena: &ShapeArena,
        id: ShapeId,
        shape: &Shape,
        filter: PartitionFilter,
        out: &mut IntersectionQueryResult,
    ) -> ControlFlow<()> {
        let bounds = shape.bounding_box();
        let mask = shape.collision_mask();
        let mut test = |other_id: ShapeId, other: Option<&Shape>| {
            let Some(other) = other.filter(|_| other_id != id) else {
                return ControlFlow::Continue(());
            };
            match overlap(shape.geometry(), other.geometry()) {
                Some(m) => offer(
                    out,
                    Contact {
                        shape_a: id,
                        shape_b: other_id,
                        normal: m.normal,
                        penetration: m.penetration,
                    },
                    "intersection query",
                ),
                None => ControlFlow::Continue(()),
            }
        };
        if filter.contains(PartitionFilter::DYNAMIC) {
            self.grid.visit_rect(bounds, |other| {
                test(other, self.dynamic_shape(arena, other, mask))
            })?;
        }
        if filter.contains(PartitionFilter::STATIC) {
            self.static_tree.visit_rect(bounds, |other| {
                test(other, self.static_shape(arena, other, mask))
            })?;
        }
        ControlFlow::Continue(())
    }

    /// Number of shapes registered as static, committed or not.
    pub fn static_len(&self) -> usize {
        self.static_members.len()
    }

    /// Number of shapes registered as dynamic.
    pub fn dynamic_len(&self) -> usize {
        self.grid.len()
    }

    /// Extent of the occupied grid cells, if any dynamic shapes are registered.
    pub fn dynamic_bounds(&self) -> Option<Rect> {
        self.grid.bounds()
    }

    /// Whether shape `id` is registered in this index.
    pub fn is_registered(&self, arena: &ShapeArena, id: ShapeId) -> bool {
        arena.get(id).and_then(Shape::parent) == Some(self.id)
    }

    /// Unregister every shape and drop both partitions.
    pub fn clear(&mut self, arena: &mut ShapeArena) {
        let ids = self.static_members.iter().copied().chain(self.grid.ids());
        for id in ids {
            if let Some(shape) = arena.get_mut(id) {
                shape.set_registration(None);
            }
        }
        self.static_members.clear();
        self.pending_static.clear();
        self.static_tree = StaticTree::default();
        self.grid.clear();
        self.dirty = false;
    }
}

impl Debug for SpatialTree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SpatialTree")
            .field("id", &self.id)
            .field("static", &self.static_members.len())
            .field("dynamic", &self.grid.len())
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}
