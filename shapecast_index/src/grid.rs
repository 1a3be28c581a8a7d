// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dynamic hash grid: shapes bucketed by the cells their bounds cover.

use core::fmt::Debug;
use core::ops::ControlFlow;
use std::collections::BTreeMap;

use kurbo::{Point, Rect};
use rustc_hash::{FxHashMap, FxHashSet};
use shapecast_geom::{Ray, RectExt};

use crate::backend::{Backend, keep_nearest};
use crate::result::RayHit;
use crate::shape::ShapeId;

/// Inclusive range of cell coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct CellRange {
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
}

impl CellRange {
    fn clamp_to(self, other: Self) -> Option<Self> {
        let r = Self {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        };
        (r.x0 <= r.x1 && r.y0 <= r.y1).then_some(r)
    }

    fn cell_count(self) -> u64 {
        let w = i64::from(self.x1) - i64::from(self.x0) + 1;
        let h = i64::from(self.y1) - i64::from(self.y0) + 1;
        w.unsigned_abs() * h.unsigned_abs()
    }

    fn contains(self, (x, y): (i32, i32)) -> bool {
        (self.x0..=self.x1).contains(&x) && (self.y0..=self.y1).contains(&y)
    }

    fn cells(self) -> impl Iterator<Item = (i32, i32)> {
        (self.y0..=self.y1).flat_map(move |y| (self.x0..=self.x1).map(move |x| (x, y)))
    }
}

#[derive(Copy, Clone, Debug)]
struct GridEntry {
    bounds: Rect,
    range: CellRange,
}

/// Uniform spatial hash over square cells.
///
/// A shape is listed in every cell its bounds touch, edges included, so two
/// shapes whose bounds touch always share a cell. Column and row occupancy
/// counts track the extent of the populated area without scanning cells.
pub struct DynamicGrid {
    cell_size: f64,
    cells: FxHashMap<(i32, i32), Vec<ShapeId>>,
    entries: FxHashMap<ShapeId, GridEntry>,
    columns: BTreeMap<i32, usize>,
    rows: BTreeMap<i32, usize>,
}

fn add_count(counts: &mut BTreeMap<i32, usize>, lo: i32, hi: i32) {
    for k in lo..=hi {
        *counts.entry(k).or_insert(0) += 1;
    }
}

fn sub_count(counts: &mut BTreeMap<i32, usize>, lo: i32, hi: i32) {
    for k in lo..=hi {
        if let Some(n) = counts.get_mut(&k) {
            *n -= 1;
            if *n == 0 {
                counts.remove(&k);
            }
        }
    }
}

fn extent(counts: &BTreeMap<i32, usize>) -> Option<(i32, i32)> {
    Some((*counts.first_key_value()?.0, *counts.last_key_value()?.0))
}

/// Entry and exit distances of `ray` through `bounds`, plus the axis it enters on.
fn slab(ray: &Ray, bounds: Rect) -> Option<(f64, f64, Option<usize>)> {
    let o = ray.origin();
    let d = ray.direction();
    let mut t_enter = 0.0_f64;
    let mut t_exit = f64::INFINITY;
    let mut entry_axis = None;
    for (axis, (o, d, lo, hi)) in [(o.x, d.x, bounds.x0, bounds.x1), (o.y, d.y, bounds.y0, bounds.y1)]
        .into_iter()
        .enumerate()
    {
        if d == 0.0 {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }
        let (a, b) = ((lo - o) / d, (hi - o) / d);
        let (near, far) = if a <= b { (a, b) } else { (b, a) };
        if near > t_enter {
            t_enter = near;
            entry_axis = Some(axis);
        }
        t_exit = t_exit.min(far);
    }
    (t_enter <= t_exit).then_some((t_enter, t_exit, entry_axis))
}

impl DynamicGrid {
    /// Create an empty grid with square cells of side `cell_size`.
    ///
    /// # Panics
    ///
    /// Panics if `cell_size` is not finite and positive.
    pub fn new(cell_size: f64) -> Self {
        assert!(
            cell_size.is_finite() && cell_size > 0.0,
            "grid cells must have a finite positive size"
        );
        Self {
            cell_size,
            cells: FxHashMap::default(),
            entries: FxHashMap::default(),
            columns: BTreeMap::new(),
            rows: BTreeMap::new(),
        }
    }

    /// Side length of a cell.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "Float to int casts saturate; coordinates beyond i32 cells clamp to the outermost cell."
    )]
    fn coord(&self, v: f64) -> i32 {
        (v / self.cell_size).floor() as i32
    }

    fn key(&self, p: Point) -> (i32, i32) {
        (self.coord(p.x), self.coord(p.y))
    }

    fn range_of(&self, r: Rect) -> CellRange {
        CellRange {
            x0: self.coord(r.x0),
            y0: self.coord(r.y0),
            x1: self.coord(r.x1),
            y1: self.coord(r.y1),
        }
    }

    fn occupied(&self) -> Option<CellRange> {
        let (x0, x1) = extent(&self.columns)?;
        let (y0, y1) = extent(&self.rows)?;
        Some(CellRange { x0, y0, x1, y1 })
    }

    fn link(&mut self, id: ShapeId, entry: GridEntry) {
        let r = entry.range;
        for cell in r.cells() {
            self.cells.entry(cell).or_default().push(id);
        }
        add_count(&mut self.columns, r.x0, r.x1);
        add_count(&mut self.rows, r.y0, r.y1);
        self.entries.insert(id, entry);
    }

    fn unlink(&mut self, id: ShapeId) -> Option<GridEntry> {
        let entry = self.entries.remove(&id)?;
        let r = entry.range;
        for cell in r.cells() {
            if let Some(ids) = self.cells.get_mut(&cell) {
                if let Some(pos) = ids.iter().position(|&s| s == id) {
                    ids.swap_remove(pos);
                }
                if ids.is_empty() {
                    self.cells.remove(&cell);
                }
            }
        }
        sub_count(&mut self.columns, r.x0, r.x1);
        sub_count(&mut self.rows, r.y0, r.y1);
        Some(entry)
    }

    /// Add a shape with its current bounds.
    ///
    /// # Panics
    ///
    /// Panics if the shape is already in the grid.
    pub fn insert(&mut self, id: ShapeId, bounds: Rect) {
        assert!(
            !self.entries.contains_key(&id),
            "{id:?} is already in the grid"
        );
        let range = self.range_of(bounds);
        self.link(id, GridEntry { bounds, range });
    }

    /// Drop a shape. Returns whether it was present.
    pub fn remove(&mut self, id: ShapeId) -> bool {
        self.unlink(id).is_some()
    }

    /// Move a shape to new bounds.
    ///
    /// Returns `false` (and does nothing) if the shape is not in the grid.
    pub fn relocate(&mut self, id: ShapeId, bounds: Rect) -> bool {
        let range = self.range_of(bounds);
        let Some(entry) = self.entries.get_mut(&id) else {
            return false;
        };
        if entry.range == range {
            entry.bounds = bounds;
            log::trace!("{id:?} moved within its cells");
            return true;
        }
        let _ = self.unlink(id);
        self.link(id, GridEntry { bounds, range });
        log::trace!(
            "{id:?} relocated to cells ({}, {})..=({}, {})",
            range.x0,
            range.y0,
            range.x1,
            range.y1
        );
        true
    }

    /// Whether the shape is in the grid.
    pub fn contains(&self, id: ShapeId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Cached bounds of a shape.
    pub fn bounds_of(&self, id: ShapeId) -> Option<Rect> {
        self.entries.get(&id).map(|e| e.bounds)
    }

    /// Handles of every shape in the grid, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = ShapeId> + '_ {
        self.entries.keys().copied()
    }

    /// Number of non-empty cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Remove every shape.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.entries.clear();
        self.columns.clear();
        self.rows.clear();
    }
}

impl Backend for DynamicGrid {
    fn len(&self) -> usize {
        self.entries.len()
    }

    /// Union of the occupied cells, not the tight union of shape bounds.
    fn bounds(&self) -> Option<Rect> {
        let r = self.occupied()?;
        let cs = self.cell_size;
        Some(Rect::new(
            f64::from(r.x0) * cs,
            f64::from(r.y0) * cs,
            (f64::from(r.x1) + 1.0) * cs,
            (f64::from(r.y1) + 1.0) * cs,
        ))
    }

    fn visit_rect<F>(&self, rect: Rect, mut f: F) -> ControlFlow<()>
    where
        F: FnMut(ShapeId) -> ControlFlow<()>,
    {
        let rect = rect.abs();
        let Some(query) = self
            .occupied()
            .and_then(|occupied| self.range_of(rect).clamp_to(occupied))
        else {
            return ControlFlow::Continue(());
        };
        if query.cell_count() > self.entries.len() as u64 {
            // Sparse: fewer shapes than cells to probe.
            for (id, e) in &self.entries {
                if e.bounds.touches(&rect) {
                    f(*id)?;
                }
            }
            return ControlFlow::Continue(());
        }
        for (x, y) in query.cells() {
            let Some(ids) = self.cells.get(&(x, y)) else {
                continue;
            };
            for id in ids {
                let e = &self.entries[id];
                // Report each shape only from the first cell it shares with the query.
                let first = (e.range.x0.max(query.x0), e.range.y0.max(query.y0));
                if first == (x, y) && e.bounds.touches(&rect) {
                    f(*id)?;
                }
            }
        }
        ControlFlow::Continue(())
    }

    fn visit_point<F>(&self, point: Point, mut f: F) -> ControlFlow<()>
    where
        F: FnMut(ShapeId) -> ControlFlow<()>,
    {
        let Some(ids) = self.cells.get(&self.key(point)) else {
            return ControlFlow::Continue(());
        };
        for id in ids {
            if self.entries[id].bounds.contains_inclusive(point) {
                f(*id)?;
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
        let occupied = self.occupied()?;
        let (t_enter, t_exit, entry_axis) = slab(ray, self.bounds()?)?;
        if t_enter > max_distance {
            return None;
        }
        let o = ray.origin();
        let d = ray.direction();
        let start = ray.at(t_enter);
        let cs = self.cell_size;

        // On the entry axis the start cell is the boundary column or row itself.
        let mut cx = match entry_axis {
            Some(0) if d.x > 0.0 => occupied.x0,
            Some(0) => occupied.x1,
            _ => self.coord(start.x).clamp(occupied.x0, occupied.x1),
        };
        let mut cy = match entry_axis {
            Some(1) if d.y > 0.0 => occupied.y0,
            Some(1) => occupied.y1,
            _ => self.coord(start.y).clamp(occupied.y0, occupied.y1),
        };

        let axis = |c: i32, o: f64, d: f64| -> (i32, f64, f64) {
            if d > 0.0 {
                (1, ((f64::from(c) + 1.0) * cs - o) / d, cs / d)
            } else if d < 0.0 {
                (-1, (f64::from(c) * cs - o) / d, -cs / d)
            } else {
                (0, f64::INFINITY, f64::INFINITY)
            }
        };
        let (step_x, mut t_max_x, t_delta_x) = axis(cx, o.x, d.x);
        let (step_y, mut t_max_y, t_delta_y) = axis(cy, o.y, d.y);

        let mut tested = FxHashSet::default();
        let mut best: Option<RayHit> = None;
        loop {
            if let Some(ids) = self.cells.get(&(cx, cy)) {
                for &id in ids {
                    if !tested.insert(id) {
                        continue;
                    }
                    if let Some(p) = hit_test(id) {
                        keep_nearest(&mut best, ray, id, p, max_distance);
                    }
                }
            }
            let t_next = t_max_x.min(t_max_y);
            if best.is_some_and(|b| b.parameter <= t_next) {
                break;
            }
            if t_next > t_exit || t_next > max_distance {
                break;
            }
            // A diagonal step through a cell corner advances both axes at once.
            let mut advanced = false;
            if step_x != 0 && t_max_x == t_next {
                cx += step_x;
                t_max_x += t_delta_x;
                advanced = true;
            }
            if step_y != 0 && t_max_y == t_next {
                cy += step_y;
                t_max_y += t_delta_y;
                advanced = true;
            }
            if !advanced || !occupied.contains((cx, cy)) {
                break;
            }
        }
        best
    }
}

impl Debug for DynamicGrid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DynamicGrid")
            .field("cell_size", &self.cell_size)
            .field("shapes", &self.entries.len())
            .field("cells", &self.cells.len())
            .finish_non_exhaustive()
    }
}
