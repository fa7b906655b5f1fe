use std::collections::HashMap;

use super::Point3;

/// Spatial hash-based point merger.
///
/// Groups points by grid cell and resolves each new point to the first
/// registered point within `tolerance` in the same or a neighboring cell.
#[derive(Debug)]
pub struct PointMerger<K> {
    cell_size: f64,
    tolerance: f64,
    map: HashMap<(i64, i64, i64), Vec<(K, Point3)>>,
}

impl<K: Copy> PointMerger<K> {
    /// Creates a merger that treats points within `tolerance` as coincident.
    #[must_use]
    pub fn new(tolerance: f64) -> Self {
        Self {
            cell_size: tolerance.max(f64::EPSILON),
            tolerance,
            map: HashMap::new(),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn cell_key(&self, p: &Point3) -> (i64, i64, i64) {
        let inv = 1.0 / self.cell_size;
        (
            (p.x * inv).floor() as i64,
            (p.y * inv).floor() as i64,
            (p.z * inv).floor() as i64,
        )
    }

    /// Returns the key of a registered point within tolerance of `point`.
    #[must_use]
    pub fn find(&self, point: &Point3) -> Option<K> {
        let key = self.cell_key(point);

        // Search in neighboring cells (3x3x3) for a match
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let neighbor = (key.0 + dx, key.1 + dy, key.2 + dz);
                    if let Some(entries) = self.map.get(&neighbor) {
                        for &(id, ref existing) in entries {
                            if (point - existing).norm() <= self.tolerance {
                                return Some(id);
                            }
                        }
                    }
                }
            }
        }
        None
    }

    /// Registers `point` under `id` without searching.
    pub fn insert(&mut self, id: K, point: &Point3) {
        let key = self.cell_key(point);
        self.map.entry(key).or_default().push((id, *point));
    }

    /// Returns the key of a coincident registered point, or registers
    /// `point` under `id` and returns `id`.
    pub fn get_or_insert(&mut self, id: K, point: &Point3) -> K {
        if let Some(existing) = self.find(point) {
            return existing;
        }
        self.insert(id, point);
        id
    }
}
