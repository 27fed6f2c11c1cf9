use serde::{Deserialize, Serialize};

/// sqrt(3) / 2, the ratio between a hexagon's apothem and its corner radius.
pub const SQRT3_HALF: f64 = 0.866_025_403_784_438_6;

/// Axial coordinate on the hex lattice. The third cube coordinate `s` is
/// derived so that `q + r + s == 0` always holds.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

/// Unit steps along the three axes, both signs.
pub const DIRECTIONS: [HexCoord; 6] = [
    HexCoord { q: 1, r: 0 },
    HexCoord { q: 1, r: -1 },
    HexCoord { q: 0, r: -1 },
    HexCoord { q: -1, r: 0 },
    HexCoord { q: -1, r: 1 },
    HexCoord { q: 0, r: 1 },
];

impl HexCoord {
    #[inline(always)]
    pub const fn new(q: i32, r: i32) -> Self { Self { q, r } }
    #[inline(always)]
    pub const fn origin() -> Self { Self::new(0, 0) }
    #[inline(always)]
    pub const fn s(self) -> i32 { -self.q - self.r }
    #[inline(always)]
    pub const fn add(self, other: Self) -> Self { Self::new(self.q + other.q, self.r + other.r) }
    #[inline(always)]
    pub const fn sub(self, other: Self) -> Self { Self::new(self.q - other.q, self.r - other.r) }
    #[inline(always)]
    pub const fn scale(self, k: i32) -> Self { Self::new(self.q * k, self.r * k) }

    /// Largest absolute cube component, i.e. the distance from the origin.
    #[inline(always)]
    pub fn magnitude(self) -> i32 {
        self.q.abs().max(self.r.abs()).max(self.s().abs())
    }

    /// The six adjacent coordinates.
    pub fn neighbors(self) -> [HexCoord; 6] {
        DIRECTIONS.map(|d| self.add(d))
    }

    /// Cube distance in cells. Zero iff both coordinates are equal.
    #[inline(always)]
    pub fn distance(self, other: Self) -> u32 {
        let d = other.sub(self);
        ((d.q.abs() + d.r.abs() + d.s().abs()) / 2) as u32
    }

    /// First cell of a shortest path from `self` to `target`.
    ///
    /// Returns `target` itself when the two are equal or adjacent. Otherwise
    /// steps along the axis with the largest absolute delta; ties resolve in
    /// q, r, s order so the result is deterministic.
    pub fn step_toward(self, target: Self) -> Self {
        if self == target {
            return target;
        }
        let d = target.sub(self);
        let (dq, dr, ds) = (d.q, d.r, d.s());
        let deltas = [dq.abs(), dr.abs(), ds.abs()];
        let max_delta = deltas[0].max(deltas[1]).max(deltas[2]);
        if max_delta == 1 {
            return target;
        }

        // A zero delta on one axis means the target lies on a straight line
        // that keeps that axis fixed.
        let step = if dq == 0 {
            HexCoord::new(0, sign(dr))
        } else if dr == 0 {
            HexCoord::new(sign(dq), 0)
        } else if ds == 0 {
            HexCoord::new(sign(dq), -sign(dq))
        } else if deltas[0] == max_delta {
            HexCoord::new(sign(dq), -sign(dq))
        } else if deltas[1] == max_delta {
            HexCoord::new(0, sign(dr))
        } else {
            HexCoord::new(-sign(ds), 0)
        };
        self.add(step)
    }
}

#[inline(always)]
fn sign(v: i32) -> i32 {
    if v < 0 { -1 } else { 1 }
}

/// Round half away from zero (7.5 -> 8, -7.5 -> -8).
#[inline(always)]
pub fn round_half_away(x: f64) -> i32 {
    x.round() as i32
}

/// Maps hex coordinates to a continuous drawing plane and back.
///
/// `left0`/`top0` are the plane coordinates of the centre of the origin hex,
/// `hex_radius` is the centre-to-corner distance. `top` grows downwards.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct HexConverter {
    pub left0: f64,
    pub top0: f64,
    pub hex_radius: f64,
    hex_height: f64,
}

impl Default for HexConverter {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }
}

impl HexConverter {
    pub fn new(left0: f64, top0: f64, hex_radius: f64) -> Self {
        Self {
            left0,
            top0,
            hex_radius,
            hex_height: SQRT3_HALF * hex_radius,
        }
    }

    /// Largest hex radius that fits a field of the given extent into a
    /// `width` x `height` plane.
    pub fn fit_radius(width: f64, height: f64, max_extent: i32) -> f64 {
        let cells = 2.0 * max_extent as f64 + 1.0;
        (width / (2.0 * cells)).min(height / (2.0 * SQRT3_HALF * cells))
    }

    pub fn hex_height(&self) -> f64 {
        self.hex_height
    }

    /// Plane coordinates `(left, top)` of the centre of `hex`.
    pub fn hex_to_plane(&self, hex: HexCoord) -> (f64, f64) {
        let left = self.left0 + hex.q as f64 * 1.5 * self.hex_radius;
        let top = self.top0 - hex.r as f64 * 2.0 * self.hex_height - hex.q as f64 * self.hex_height;
        (left, top)
    }

    /// The hex whose centre is nearest to the plane point.
    pub fn plane_to_hex(&self, left: f64, top: f64) -> HexCoord {
        let q = round_half_away((left - self.left0) / (1.5 * self.hex_radius));
        let r = round_half_away((top - self.top0 + q as f64 * self.hex_height) / (-2.0 * self.hex_height));
        HexCoord::new(q, r)
    }

    /// Corner points of `hex`, clockwise from the left corner.
    pub fn hex_vertices(&self, hex: HexCoord) -> [(f64, f64); 6] {
        let (cx, cy) = self.hex_to_plane(hex);
        let (rad, h) = (self.hex_radius, self.hex_height);
        [
            (cx - rad, cy),
            (cx - rad / 2.0, cy - h),
            (cx + rad / 2.0, cy - h),
            (cx + rad, cy),
            (cx + rad / 2.0, cy + h),
            (cx - rad / 2.0, cy + h),
        ]
    }
}
