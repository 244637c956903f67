//! Robust geometric predicates for validity checks.
//!
//! Orientation tests use Shewchuk's adaptive precision arithmetic, so
//! near-collinear configurations get the right sign. The ring checks built on
//! them decide whether a polygon is simple.
//!
//! ```rust
//! use polyfit_core::robust::{orient2d, segments_intersect, Turn};
//!
//! assert_eq!(orient2d((0.0, 0.0), (1.0, 0.0), (0.5, 1.0)), Turn::Left);
//! assert!(segments_intersect((0.0, 0.0), (2.0, 2.0), (0.0, 2.0), (2.0, 0.0)));
//! ```

use robust::Coord;

/// Side of a directed line on which a point falls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Left,
    Right,
    Collinear,
}

impl Turn {
    /// True when `self` and `other` are strictly on opposite sides.
    #[inline]
    fn opposes(self, other: Turn) -> bool {
        matches!(
            (self, other),
            (Turn::Left, Turn::Right) | (Turn::Right, Turn::Left)
        )
    }
}

/// Which side of the line `a`→`b` the point `c` lies on.
#[inline]
pub fn orient2d(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> Turn {
    let det = robust::orient2d(
        Coord { x: a.0, y: a.1 },
        Coord { x: b.0, y: b.1 },
        Coord { x: c.0, y: c.1 },
    );
    match det.partial_cmp(&0.0) {
        Some(std::cmp::Ordering::Greater) => Turn::Left,
        Some(std::cmp::Ordering::Less) => Turn::Right,
        _ => Turn::Collinear,
    }
}

/// Returns true if `p` lies on the closed segment `a`-`b`, given that the
/// three points are already known to be collinear.
#[inline]
fn within_segment_box(a: (f64, f64), b: (f64, f64), p: (f64, f64)) -> bool {
    p.0 >= a.0.min(b.0) && p.0 <= a.0.max(b.0) && p.1 >= a.1.min(b.1) && p.1 <= a.1.max(b.1)
}

/// Returns true if the closed segments `p1`-`p2` and `q1`-`q2` share a point.
///
/// Touching endpoints and collinear overlaps count as intersections.
pub fn segments_intersect(p1: (f64, f64), p2: (f64, f64), q1: (f64, f64), q2: (f64, f64)) -> bool {
    let o1 = orient2d(p1, p2, q1);
    let o2 = orient2d(p1, p2, q2);
    let o3 = orient2d(q1, q2, p1);
    let o4 = orient2d(q1, q2, p2);
    if o1.opposes(o2) && o3.opposes(o4) {
        return true;
    }

    let on = |turn: Turn, a, b, p| turn == Turn::Collinear && within_segment_box(a, b, p);
    on(o1, p1, p2, q1) || on(o2, p1, p2, q2) || on(o3, q1, q2, p1) || on(o4, q1, q2, p2)
}

/// Signed area of an open ring by the shoelace formula with compensated
/// summation. Positive for counter-clockwise rings.
pub fn ring_signed_area(ring: &[(f64, f64)]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let (sum, _) = ring
        .iter()
        .zip(ring.iter().cycle().skip(1))
        .map(|(a, b)| a.0 * b.1 - b.0 * a.1)
        .fold((0.0_f64, 0.0_f64), |(sum, carry), term| {
            let y = term - carry;
            let t = sum + y;
            (t, (t - sum) - y)
        });
    sum / 2.0
}

/// Finds the first defect that keeps a ring from being simple.
///
/// The ring may be open or closed (first vertex repeated at the end);
/// consecutive duplicate vertices are ignored. Returns `None` for a simple
/// ring with non-zero area.
pub fn ring_defect(ring: &[(f64, f64)]) -> Option<String> {
    if ring.iter().any(|&(x, y)| !x.is_finite() || !y.is_finite()) {
        return Some("non-finite coordinate".to_string());
    }

    let mut pts: Vec<(f64, f64)> = Vec::with_capacity(ring.len());
    for &p in ring {
        if pts.last() != Some(&p) {
            pts.push(p);
        }
    }
    if pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }

    let n = pts.len();
    if n < 3 {
        return Some(format!("ring has {} distinct vertices, need at least 3", n));
    }
    if ring_signed_area(&pts) == 0.0 {
        return Some("ring has zero area".to_string());
    }

    // Spikes: an edge folding back over its predecessor
    for i in 0..n {
        let prev = pts[(i + n - 1) % n];
        let curr = pts[i];
        let next = pts[(i + 1) % n];
        if orient2d(prev, curr, next) == Turn::Collinear {
            let dot =
                (curr.0 - prev.0) * (next.0 - curr.0) + (curr.1 - prev.1) * (next.1 - curr.1);
            if dot < 0.0 {
                return Some(format!("spike at vertex {}", i));
            }
        }
    }

    for i in 0..n {
        let (a1, a2) = (pts[i], pts[(i + 1) % n]);
        for j in (i + 2)..n {
            // Edges i and j share a vertex when they wrap around
            if i == 0 && j == n - 1 {
                continue;
            }
            let (b1, b2) = (pts[j], pts[(j + 1) % n]);
            if segments_intersect(a1, a2, b1, b2) {
                return Some(format!("self-intersection between edges {} and {}", i, j));
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turns() {
        let (o, x) = ((0.0, 0.0), (4.0, 0.0));
        assert_eq!(orient2d(o, x, (2.0, 3.0)), Turn::Left);
        assert_eq!(orient2d(o, x, (2.0, -3.0)), Turn::Right);
        assert_eq!(orient2d(o, x, (9.0, 0.0)), Turn::Collinear);
    }

    #[test]
    fn test_turn_far_from_origin() {
        // Offset is a few ulps of the coordinates
        let base = 2.0_f64.powi(40);
        let a = (base, base);
        let b = (base + 1.0, base + 1.0);
        let c = (base + 2.0, base + 2.0 + 1e-3);
        assert_eq!(orient2d(a, b, c), Turn::Left);
    }

    #[test]
    fn test_segments_intersect() {
        // Crossing diagonals
        assert!(segments_intersect((0.0, 0.0), (2.0, 2.0), (0.0, 2.0), (2.0, 0.0)));
        // Parallel, apart
        assert!(!segments_intersect((0.0, 0.0), (2.0, 0.0), (0.0, 1.0), (2.0, 1.0)));
        // Touching at an endpoint
        assert!(segments_intersect((0.0, 0.0), (1.0, 0.0), (1.0, 0.0), (1.0, 1.0)));
        // Collinear overlap
        assert!(segments_intersect((0.0, 0.0), (2.0, 0.0), (1.0, 0.0), (3.0, 0.0)));
        // Collinear, disjoint
        assert!(!segments_intersect((0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)));
    }

    #[test]
    fn test_ring_signed_area() {
        let tri = [(0.0, 0.0), (6.0, 0.0), (0.0, 4.0)];
        assert!((ring_signed_area(&tri) - 12.0).abs() < 1e-12);
        let reversed: Vec<_> = tri.iter().rev().copied().collect();
        assert!((ring_signed_area(&reversed) + 12.0).abs() < 1e-12);
        assert_eq!(ring_signed_area(&tri[..2]), 0.0);
    }

    #[test]
    fn test_simple_rings() {
        let square = vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        assert_eq!(ring_defect(&square), None);

        let mut closed = square.clone();
        closed.push((0.0, 0.0));
        assert_eq!(ring_defect(&closed), None);

        let l_shape = vec![
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 5.0),
            (5.0, 5.0),
            (5.0, 10.0),
            (0.0, 10.0),
        ];
        assert_eq!(ring_defect(&l_shape), None);

        // Repeated vertex is tolerated
        let repeated = vec![(0.0, 0.0), (4.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)];
        assert_eq!(ring_defect(&repeated), None);
    }

    #[test]
    fn test_bow_tie_is_defective() {
        let bow_tie = vec![(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 6.0)];
        let reason = ring_defect(&bow_tie).expect("bow tie must be rejected");
        assert!(reason.contains("self-intersection"), "{}", reason);
    }

    #[test]
    fn test_degenerate_rings() {
        assert!(ring_defect(&[(0.0, 0.0), (1.0, 0.0)]).is_some());
        assert!(ring_defect(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]).is_some());
        assert!(ring_defect(&[(0.0, 0.0), (f64::NAN, 0.0), (1.0, 1.0)]).is_some());
    }

    #[test]
    fn test_spike_is_defective() {
        let spike = vec![
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (10.0, 15.0),
            (10.0, 12.0),
            (0.0, 10.0),
        ];
        assert!(ring_defect(&spike).is_some());
    }
}
