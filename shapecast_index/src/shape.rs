// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shapes, their masks and the caller-owned arena that stores them.

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

use bitflags::bitflags;
use kurbo::{Affine, Circle, Rect};
use shapecast_geom::{Geometry, GeometryError, Polygon};

bitflags! {
    /// Category bits used to classify shapes and to select what they are tested against.
    ///
    /// All 64 bits are meaningful; use [`ShapeMask::bit`] to name a single category.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ShapeMask: u64 {
        const _ = !0;
    }
}

impl ShapeMask {
    /// A mask with only bit `n` set.
    ///
    /// # Panics
    ///
    /// Panics if `n >= 64`.
    pub const fn bit(n: u32) -> Self {
        assert!(n < 64, "shape masks have 64 bits");
        Self::from_bits_retain(1 << n)
    }
}

/// Process-unique identity of a [`SpatialTree`](crate::SpatialTree).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexId(u64);

impl IndexId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Which half of an index a shape lives in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Partition {
    /// Immobile shapes, held in the rebuildable partition tree.
    Static,
    /// Movable shapes, held in the hash grid.
    Dynamic,
}

/// Where a shape is currently registered.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Registration {
    /// The owning index.
    pub index: IndexId,
    /// The partition inside that index.
    pub partition: Partition,
}

/// A geometry plus the classification data an index needs.
///
/// Polygon shapes always hold the convex hull of the polygon they were built from.
#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    geometry: Geometry,
    type_mask: ShapeMask,
    collision_mask: ShapeMask,
    registration: Option<Registration>,
}

impl Shape {
    fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            type_mask: ShapeMask::all(),
            collision_mask: ShapeMask::all(),
            registration: None,
        }
    }

    /// A circle shape.
    pub fn from_circle(circle: Circle) -> Self {
        Self::new(Geometry::Circle(circle))
    }

    /// A rectangle shape; the rectangle is normalized first.
    pub fn from_rect(rect: Rect) -> Self {
        Self::new(Geometry::Rect(rect.abs()))
    }

    /// A polygon shape holding the convex hull of `polygon`.
    pub fn from_polygon(polygon: &Polygon) -> Result<Self, GeometryError> {
        Ok(Self::new(Geometry::Polygon(polygon.to_convex()?)))
    }

    /// Builder-style [`set_type_mask`](Self::set_type_mask).
    #[must_use]
    pub fn with_type_mask(mut self, mask: ShapeMask) -> Self {
        self.type_mask = mask;
        self
    }

    /// Builder-style [`set_collision_mask`](Self::set_collision_mask).
    #[must_use]
    pub fn with_collision_mask(mut self, mask: ShapeMask) -> Self {
        self.collision_mask = mask;
        self
    }

    /// The geometry.
    #[inline]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Axis-aligned bounds of the geometry, computed on demand.
    #[inline]
    pub fn bounding_box(&self) -> Rect {
        self.geometry.bounding_box()
    }

    /// The categories this shape belongs to.
    #[inline]
    pub fn type_mask(&self) -> ShapeMask {
        self.type_mask
    }

    /// Set the categories this shape belongs to.
    pub fn set_type_mask(&mut self, mask: ShapeMask) {
        self.type_mask = mask;
    }

    /// The categories this shape is tested against in intersection queries.
    #[inline]
    pub fn collision_mask(&self) -> ShapeMask {
        self.collision_mask
    }

    /// Set the categories this shape is tested against.
    pub fn set_collision_mask(&mut self, mask: ShapeMask) {
        self.collision_mask = mask;
    }

    /// The index holding this shape, if any.
    #[inline]
    pub fn parent(&self) -> Option<IndexId> {
        self.registration.map(|r| r.index)
    }

    /// Current registration, if any.
    #[inline]
    pub fn registration(&self) -> Option<Registration> {
        self.registration
    }

    /// Whether the shape is registered in a dynamic partition.
    #[inline]
    pub fn is_dynamic(&self) -> bool {
        self.registration
            .is_some_and(|r| r.partition == Partition::Dynamic)
    }

    /// Transform an unregistered shape.
    ///
    /// Registered dynamic shapes move through
    /// [`SpatialTree::transform`](crate::SpatialTree::transform) so the grid follows them.
    ///
    /// # Panics
    ///
    /// Panics if the shape is registered in an index.
    pub fn apply_transform(&mut self, affine: Affine) {
        assert!(
            self.registration.is_none(),
            "registered shapes must be moved through their index"
        );
        self.geometry.apply_transform(affine);
    }

    pub(crate) fn transform_registered(&mut self, affine: Affine) {
        self.geometry.apply_transform(affine);
    }

    pub(crate) fn set_registration(&mut self, registration: Option<Registration>) {
        self.registration = registration;
    }
}

/// Generational handle for shapes stored in a [`ShapeArena`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(u32, u32);

impl ShapeId {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Arena slots are 32-bit; the arena refuses to grow past u32::MAX slots."
    )]
    const fn new(slot: usize, generation: u32) -> Self {
        Self(slot as u32, generation)
    }

    /// Slot position inside the arena.
    #[inline]
    pub const fn slot(self) -> usize {
        self.0 as usize
    }

    /// Generation of the slot when this handle was issued.
    #[inline]
    pub const fn generation(self) -> u32 {
        self.1
    }
}

impl fmt::Debug for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShapeId({}v{})", self.0, self.1)
    }
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    shape: Option<Shape>,
}

/// Caller-owned storage for shapes.
///
/// Indexes never own shapes; they store [`ShapeId`]s and read the arena that
/// queries are given. A handle stays valid until its shape is removed; after
/// that the slot may be reused under a newer generation and the old handle
/// resolves to nothing.
#[derive(Clone, Default)]
pub struct ShapeArena {
    slots: Vec<Slot>,
    free_list: Vec<usize>,
    len: usize,
}

impl ShapeArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a shape and return its handle.
    ///
    /// # Panics
    ///
    /// Panics if the shape is already registered in an index, or if the arena
    /// would exceed `u32::MAX` slots.
    pub fn insert(&mut self, shape: Shape) -> ShapeId {
        assert!(
            shape.registration.is_none(),
            "shapes enter the arena unregistered"
        );
        self.len += 1;
        if let Some(slot) = self.free_list.pop() {
            let entry = &mut self.slots[slot];
            entry.generation = entry.generation.wrapping_add(1).max(1);
            entry.shape = Some(shape);
            return ShapeId::new(slot, entry.generation);
        }
        assert!(
            u32::try_from(self.slots.len()).is_ok(),
            "shape arena is full"
        );
        self.slots.push(Slot {
            generation: 1,
            shape: Some(shape),
        });
        ShapeId::new(self.slots.len() - 1, 1)
    }

    /// Remove a shape, returning it.
    ///
    /// # Panics
    ///
    /// Panics if the shape is still registered in an index.
    pub fn remove(&mut self, id: ShapeId) -> Option<Shape> {
        let slot = self.slots.get_mut(id.slot())?;
        if slot.generation != id.generation() {
            return None;
        }
        if let Some(shape) = &slot.shape {
            assert!(
                shape.registration.is_none(),
                "remove {id:?} from its index before dropping it"
            );
        }
        let shape = slot.shape.take()?;
        self.free_list.push(id.slot());
        self.len -= 1;
        Some(shape)
    }

    /// Look up a shape.
    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        let slot = self.slots.get(id.slot())?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.shape.as_ref()
    }

    /// Look up a shape mutably.
    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        let slot = self.slots.get_mut(id.slot())?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.shape.as_mut()
    }

    /// Whether `id` refers to a live shape.
    pub fn contains(&self, id: ShapeId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live shapes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the arena holds no shapes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate live shapes with their handles, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ShapeId, &Shape)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.shape
                .as_ref()
                .map(|shape| (ShapeId::new(i, slot.generation), shape))
        })
    }
}

impl fmt::Debug for ShapeArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShapeArena")
            .field("slots", &self.slots.len())
            .field("live", &self.len)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    #[test]
    fn masks_default_to_every_category() {
        let s = Shape::from_rect(Rect::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(s.type_mask(), ShapeMask::all());
        assert_eq!(s.collision_mask(), ShapeMask::all());
        assert!(s.type_mask().intersects(ShapeMask::bit(63)));
        assert!(s.parent().is_none());
        assert!(!s.is_dynamic());
    }

    #[test]
    fn polygon_shapes_are_hull_reduced() {
        let dart = Polygon::new([
            Point::new(0.0, 0.0),
            Point::new(2.0, 1.0),
            Point::new(0.0, 2.0),
            Point::new(1.0, 1.0),
        ])
        .unwrap();
        let s = Shape::from_polygon(&dart).unwrap();
        let Geometry::Polygon(p) = s.geometry() else {
            panic!("polygon geometry expected");
        };
        assert_eq!(p.vertex_count(), 3);
        assert!(p.is_convex());
    }

    #[test]
    fn stale_handles_resolve_to_nothing() {
        let mut arena = ShapeArena::new();
        let a = arena.insert(Shape::from_circle(Circle::new((0.0, 0.0), 1.0)));
        assert!(arena.remove(a).is_some());
        let b = arena.insert(Shape::from_circle(Circle::new((5.0, 0.0), 1.0)));
        assert_eq!(a.slot(), b.slot());
        assert_ne!(a, b);
        assert!(arena.get(a).is_none());
        assert!(arena.remove(a).is_none());
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.iter().map(|(id, _)| id).collect::<Vec<_>>(), vec![b]);
    }

    #[test]
    fn unregistered_shapes_transform_freely() {
        let mut s = Shape::from_rect(Rect::new(0.0, 0.0, 1.0, 1.0));
        s.apply_transform(Affine::translate((2.0, 3.0)));
        assert_eq!(s.bounding_box(), Rect::new(2.0, 3.0, 3.0, 4.0));
    }
}
