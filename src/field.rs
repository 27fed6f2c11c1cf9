use bacterio_common::{HexCoord, DIRECTIONS};
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::HashSet;

/// The fixed set of playable cells.
///
/// Built once when a simulation starts or a snapshot is loaded and never
/// mutated afterwards. Every query only ever returns members of the set,
/// and a query centred on a non-member returns nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexField {
    cells: HashSet<HexCoord>,
    extent: u32,
}

impl HexField {
    /// All cells within cube distance `radius` of the origin.
    pub fn circle(radius: u32) -> Self {
        Self::from_cells(disc(HexCoord::origin(), radius))
    }

    /// A field of arbitrary shape, e.g. the one stored in a snapshot.
    pub fn from_cells<I: IntoIterator<Item = HexCoord>>(cells: I) -> Self {
        let cells: HashSet<HexCoord> = cells.into_iter().collect();
        let extent = cells.iter().map(|c| c.magnitude() as u32).max().unwrap_or(0);
        Self { cells, extent }
    }

    #[inline(always)]
    pub fn contains(&self, c: HexCoord) -> bool {
        self.cells.contains(&c)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Members in ascending coordinate order.
    pub fn sorted_cells(&self) -> Vec<HexCoord> {
        let mut cells: Vec<HexCoord> = self.cells.iter().copied().collect();
        cells.sort_unstable();
        cells
    }

    pub fn iter(&self) -> impl Iterator<Item = &HexCoord> {
        self.cells.iter()
    }

    /// Largest distance from `c` at which a member can still lie.
    ///
    /// Radii beyond this select nothing new, so every query clamps to it.
    pub fn reach(&self, c: HexCoord) -> u32 {
        (c.magnitude() as u32).saturating_add(self.extent)
    }

    /// Members within `radius` of `c`, excluding `c` itself.
    pub fn neighbors(&self, c: HexCoord, radius: u32) -> Vec<HexCoord> {
        if !self.contains(c) {
            return Vec::new();
        }
        disc(c, radius.min(self.reach(c))).filter(|&h| h != c && self.contains(h)).collect()
    }

    /// Members within `radius` of `c`, including `c`.
    pub fn within(&self, c: HexCoord, radius: u32) -> Vec<HexCoord> {
        if !self.contains(c) {
            return Vec::new();
        }
        disc(c, radius.min(self.reach(c))).filter(|&h| self.contains(h)).collect()
    }

    /// Members at exactly `radius` from `c`. Ring 0 is `c` itself.
    pub fn exact_ring(&self, c: HexCoord, radius: u32) -> Vec<HexCoord> {
        if !self.contains(c) {
            return Vec::new();
        }
        if radius == 0 {
            return vec![c];
        }
        if radius > self.reach(c) {
            return Vec::new();
        }
        let k = radius as i32;
        // Walk the ring: start `radius` steps out along one axis, then go
        // `radius` steps along each of the six directions in turn.
        let mut hex = c.add(DIRECTIONS[4].scale(k));
        let mut ring = Vec::with_capacity(6 * radius as usize);
        for dir in DIRECTIONS {
            for _ in 0..k {
                if self.contains(hex) {
                    ring.push(hex);
                }
                hex = hex.add(dir);
            }
        }
        ring
    }

    /// Sum of `count` over the members within `radius` of `c`, `c` included.
    pub fn count_within<F>(&self, c: HexCoord, radius: u32, count: F) -> usize
    where
        F: FnMut(HexCoord) -> usize,
    {
        if !self.contains(c) {
            return 0;
        }
        disc(c, radius.min(self.reach(c)))
            .filter(|&h| self.contains(h))
            .map(count)
            .sum()
    }

    /// A uniformly chosen member adjacent to `c`, if there is one.
    pub fn random_neighbor<R: Rng>(&self, c: HexCoord, rng: &mut R) -> Option<HexCoord> {
        let options: Vec<HexCoord> = c.neighbors().into_iter().filter(|&h| self.contains(h)).collect();
        options.choose(rng).copied()
    }

    /// Largest absolute cube component over all members.
    pub fn max_extent(&self) -> i32 {
        self.extent as i32
    }
}

/// Every lattice coordinate within `radius` of `center`, row by row.
fn disc(center: HexCoord, radius: u32) -> impl Iterator<Item = HexCoord> {
    let k = radius as i32;
    (-k..=k).flat_map(move |dq| {
        let lo = (-k).max(-dq - k);
        let hi = k.min(k - dq);
        (lo..=hi).map(move |dr| HexCoord::new(center.q + dq, center.r + dr))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sorted(mut v: Vec<HexCoord>) -> Vec<HexCoord> {
        v.sort();
        v
    }

    #[test]
    fn circle_sizes() {
        for (radius, expected) in [(0, 1), (1, 7), (2, 19), (7, 127), (15, 721)] {
            assert_eq!(HexField::circle(radius).len(), expected, "radius {}", radius);
            let r = radius as usize;
            assert_eq!(expected, 3 * r * r + 3 * r + 1);
        }
    }

    #[test]
    fn neighbors_inside_and_on_edge() {
        let field = HexField::circle(2);
        assert_eq!(field.neighbors(HexCoord::new(1, 0), 1).len(), 6);

        let edge = field.neighbors(HexCoord::new(0, 2), 1);
        assert_eq!(
            sorted(edge),
            sorted(vec![HexCoord::new(-1, 2), HexCoord::new(0, 1), HexCoord::new(1, 1)])
        );
        assert_eq!(field.neighbors(HexCoord::new(0, 2), 2).len(), 8);
    }

    #[test]
    fn neighbors_are_members_at_distance_one() {
        let field = HexField::circle(3);
        for &c in field.iter() {
            let nb = field.neighbors(c, 1);
            assert!(nb.len() <= 6);
            for n in nb {
                assert!(field.contains(n));
                assert_eq!(c.distance(n), 1);
            }
        }
    }

    #[test]
    fn within_includes_center() {
        let field = HexField::circle(2);
        assert_eq!(field.within(HexCoord::new(1, 0), 1).len(), 7);
        let nb = field.within(HexCoord::new(0, 2), 1);
        assert_eq!(nb.len(), 4);
        assert!(nb.contains(&HexCoord::new(0, 2)));
        assert_eq!(field.within(HexCoord::new(0, 2), 2).len(), 9);
    }

    #[test]
    fn exact_ring_examples() {
        let field = HexField::circle(2);
        let ring = field.exact_ring(HexCoord::new(0, 2), 1);
        assert_eq!(
            sorted(ring),
            sorted(vec![HexCoord::new(-1, 2), HexCoord::new(0, 1), HexCoord::new(1, 1)])
        );
        let ring = field.exact_ring(HexCoord::new(0, 2), 2);
        assert_eq!(
            sorted(ring),
            sorted(vec![
                HexCoord::new(-2, 2),
                HexCoord::new(-1, 1),
                HexCoord::new(0, 0),
                HexCoord::new(1, 0),
                HexCoord::new(2, 0),
            ])
        );
    }

    #[test]
    fn within_is_disjoint_union_of_rings() {
        let field = HexField::circle(5);
        let center = HexCoord::new(2, -3);
        for radius in 0..=4 {
            let mut union = Vec::new();
            for k in 0..=radius {
                let ring = field.exact_ring(center, k);
                for &h in &ring {
                    assert_eq!(center.distance(h), k);
                }
                union.extend(ring);
            }
            let union = sorted(union);
            let mut dedup = union.clone();
            dedup.dedup();
            assert_eq!(union, dedup, "rings overlap at radius {}", radius);
            assert_eq!(union, sorted(field.within(center, radius)));
        }
    }

    #[test]
    fn full_rings_in_open_field() {
        let field = HexField::circle(10);
        for radius in 1..=5 {
            assert_eq!(field.exact_ring(HexCoord::origin(), radius).len(), 6 * radius as usize);
        }
    }

    #[test]
    fn degenerate_queries_are_empty() {
        let field = HexField::circle(2);
        let outside = HexCoord::new(5, 5);
        assert!(field.neighbors(outside, 1).is_empty());
        assert!(field.within(outside, 3).is_empty());
        assert!(field.exact_ring(outside, 1).is_empty());
        assert!(field.neighbors(HexCoord::origin(), 0).is_empty());
        assert_eq!(field.exact_ring(HexCoord::origin(), 0), vec![HexCoord::origin()]);
        assert_eq!(field.count_within(outside, 2, |_| 1), 0);
    }

    #[test]
    fn max_extent_matches_radius() {
        assert_eq!(HexField::circle(7).max_extent(), 7);
        assert_eq!(HexField::circle(0).max_extent(), 0);
        let skewed = HexField::from_cells([HexCoord::new(0, 0), HexCoord::new(2, 1)]);
        assert_eq!(skewed.max_extent(), 3);
    }

    #[test]
    fn huge_radii_are_clamped_to_the_field() {
        let field = HexField::circle(3);
        let edge = HexCoord::new(3, 0);
        assert_eq!(field.reach(edge), 6);
        assert_eq!(field.within(edge, u32::MAX).len(), field.len());
        assert_eq!(field.neighbors(edge, u32::MAX).len(), field.len() - 1);
        assert_eq!(field.count_within(HexCoord::origin(), u32::MAX, |_| 1), 37);
        assert!(field.exact_ring(edge, 7).is_empty());
        assert!(field.exact_ring(edge, u32::MAX).is_empty());
        assert_eq!(field.exact_ring(edge, 6).len(), 4);
    }

    #[test]
    fn random_neighbor_stays_in_field() {
        let field = HexField::circle(1);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let n = field.random_neighbor(HexCoord::new(1, 0), &mut rng).unwrap();
            assert!(field.contains(n));
            assert_eq!(n.distance(HexCoord::new(1, 0)), 1);
        }
        assert_eq!(HexField::circle(0).random_neighbor(HexCoord::origin(), &mut rng), None);
    }
}
