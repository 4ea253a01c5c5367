//! Bounding volume types for 3D Tiles
//!
//! The producer side works in f64 throughout: per-block bounds are folded
//! into one aggregate and emitted as the 12-number oriented box encoding
//! used by tileset documents.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::{TileError, TileResult};

/// Axis-aligned bounding box in the local Cartesian frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Aabb {
    /// The fold identity: +inf mins and -inf maxes, strictly widened by any
    /// real contribution
    pub fn empty() -> Self {
        Self {
            min: DVec3::INFINITY,
            max: DVec3::NEG_INFINITY,
        }
    }

    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    pub fn from_min_max(min: [f64; 3], max: [f64; 3]) -> Self {
        Self {
            min: DVec3::from_array(min),
            max: DVec3::from_array(max),
        }
    }

    /// Componentwise min/max fold; commutative and associative
    pub fn union_with(&mut self, other: &Aabb) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// True until at least one real bound has been folded in
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn center(&self) -> DVec3 {
        (self.min + self.max) / 2.0
    }

    pub fn half_extents(&self) -> DVec3 {
        (self.max - self.min) / 2.0
    }
}

/// Oriented bounding box defined by center and three half-axis vectors
///
/// 12 numbers: [cx, cy, cz, xx, xy, xz, yx, yy, yz, zx, zy, zz], serialized
/// under the `box` key of a boundingVolume object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    #[serde(rename = "box")]
    pub data: [f64; 12],
}

impl BoundingBox {
    /// Encode an axis-aligned bound as an oriented box.
    ///
    /// Center = (min+max)/2, half-axis vectors are axis-aligned with lengths
    /// (max-min)/2. Exact in f64, no padding.
    pub fn from_aabb(aabb: &Aabb) -> Self {
        let c = aabb.center();
        let h = aabb.half_extents();
        Self {
            data: [
                c.x, c.y, c.z,
                h.x, 0.0, 0.0,
                0.0, h.y, 0.0,
                0.0, 0.0, h.z,
            ],
        }
    }

    pub fn center(&self) -> DVec3 {
        DVec3::new(self.data[0], self.data[1], self.data[2])
    }

    /// Axis-aligned bound enclosing the box: center offset by the
    /// componentwise absolute sum of the half-axis vectors. Exact for
    /// axis-aligned boxes, conservative otherwise.
    pub fn to_aabb(&self) -> Aabb {
        let c = self.center();
        let x = DVec3::new(self.data[3], self.data[4], self.data[5]).abs();
        let y = DVec3::new(self.data[6], self.data[7], self.data[8]).abs();
        let z = DVec3::new(self.data[9], self.data[10], self.data[11]).abs();
        let h = x + y + z;
        Aabb::new(c - h, c + h)
    }
}

/// Single-coordinator reduction over per-block bounds.
///
/// Workers never touch this directly; the batch driver folds results in
/// discovery order after collection.
#[derive(Debug)]
pub struct BoundsAccumulator {
    aggregate: Aabb,
    folded: usize,
}

impl BoundsAccumulator {
    pub fn new() -> Self {
        Self {
            aggregate: Aabb::empty(),
            folded: 0,
        }
    }

    pub fn fold(&mut self, bound: &Aabb) {
        self.aggregate.union_with(bound);
        self.folded += 1;
    }

    /// The union of everything folded so far; errors if nothing was
    pub fn aggregate(&self) -> TileResult<Aabb> {
        if self.folded == 0 {
            return Err(TileError::EmptyAggregate);
        }
        Ok(self.aggregate)
    }

    /// Emit the aggregate as an oriented box
    pub fn finalize(&self) -> TileResult<BoundingBox> {
        Ok(BoundingBox::from_aabb(&self.aggregate()?))
    }
}

impl Default for BoundsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
