//! End-to-end path properties on hand-built and generated masks.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use maskpath_core::{
    Coord, DistanceField, EndpointPolicy, Mask, Path, PathFinder, Query, QueryConfig,
    UNREACHED, shortest_path,
};

/// Reference distances computed by repeated relaxation until nothing
/// changes. Slow but independent of the engine's queue discipline.
fn oracle_distances(mask: &Mask, start: Coord) -> Vec<u32> {
    let w = mask.width() as i32;
    let h = mask.height() as i32;
    let mut dist = vec![UNREACHED; (w * h) as usize];
    dist[(start.y * w + start.x) as usize] = 0;
    let mut changed = true;
    while changed {
        changed = false;
        for y in 0..h {
            for x in 0..w {
                let here = Coord::new(x, y);
                if !mask.is_passable(here) {
                    continue;
                }
                for dy in -1..=1 {
                    for dx in -1..=1 {
                        let n = Coord::new(x + dx, y + dy);
                        if n == here || !mask.contains(n) {
                            continue;
                        }
                        let nd = dist[(n.y * w + n.x) as usize];
                        let i = (y * w + x) as usize;
                        if nd != UNREACHED && nd + 1 < dist[i] {
                            dist[i] = nd + 1;
                            changed = true;
                        }
                    }
                }
            }
        }
    }
    dist
}

/// Check every structural property a returned path must have.
fn assert_valid_path(mask: &Mask, path: &Path, start: Coord, end: Coord) {
    assert_eq!(path.end(), Some(end), "path must begin at the end point");
    assert_eq!(path.start(), Some(start), "path must finish at the start point");
    for c in path.coords() {
        assert!(mask.is_passable(*c), "{c} is not passable");
    }
    for pair in path.coords().windows(2) {
        assert!(
            pair[0].is_adjacent(pair[1]),
            "{} and {} are not 8-adjacent",
            pair[0],
            pair[1]
        );
    }
}

/// A filled disc ring between two radii, centred in a square image.
fn annulus(size: u32, inner: f64, outer: f64) -> Mask {
    let c = f64::from(size - 1) / 2.0;
    Mask::from_fn(size, size, |x, y| {
        let dx = f64::from(x) - c;
        let dy = f64::from(y) - c;
        let r = dx.hypot(dy);
        r >= inner && r <= outer
    })
    .unwrap()
}

/// Small xorshift generator so generated masks are reproducible.
struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
}

#[test]
fn open_square_takes_the_diagonal() {
    let mask = Mask::from_fn(5, 5, |_, _| true).unwrap();
    let path = shortest_path(&mask, Coord::new(0, 0), Coord::new(4, 4)).unwrap();
    assert_eq!(
        path.coords(),
        &[
            Coord::new(4, 4),
            Coord::new(3, 3),
            Coord::new(2, 2),
            Coord::new(1, 1),
            Coord::new(0, 0),
        ]
    );
}

#[test]
fn start_equal_to_end_is_single_coordinate() {
    let mask = Mask::from_rows(&["..#..", "#.#.#"]).unwrap();
    for c in [Coord::new(2, 0), Coord::new(0, 1), Coord::new(4, 1)] {
        let path = shortest_path(&mask, c, c).unwrap();
        assert_eq!(path.coords(), &[c]);
    }
}

#[test]
fn blocking_row_separates_halves() {
    let mask = Mask::from_rows(&[
        "#######", "#######", "#######", ".......", "#######", "#######",
    ])
    .unwrap();
    let path = shortest_path(&mask, Coord::new(3, 0), Coord::new(3, 5)).unwrap();
    assert!(path.is_empty());

    // Same side is still fine.
    let path = shortest_path(&mask, Coord::new(0, 4), Coord::new(6, 5)).unwrap();
    assert_valid_path(&mask, &path, Coord::new(0, 4), Coord::new(6, 5));
}

#[test]
fn disconnected_components_are_unreachable() {
    let mask = Mask::from_rows(&["##...", "##...", ".....", "...##", "...##"]).unwrap();
    let path = shortest_path(&mask, Coord::new(0, 0), Coord::new(4, 4)).unwrap();
    assert!(path.is_empty());
}

#[test]
fn ring_path_goes_around_the_hole() {
    let mask = annulus(41, 12.0, 18.0);
    let start = Coord::new(5, 20);
    let end = Coord::new(35, 20);
    assert!(mask.is_passable(start) && mask.is_passable(end));
    assert!(!mask.is_passable(Coord::new(20, 20)), "hole must block the chord");

    let path = shortest_path(&mask, start, end).unwrap();
    assert_valid_path(&mask, &path, start, end);

    let oracle = oracle_distances(&mask, start);
    let expected = oracle[(end.y * 41 + end.x) as usize] as usize;
    assert_eq!(path.steps(), Some(expected));
    assert!(expected > start.chebyshev(end) as usize);
}

#[test]
fn path_length_matches_distance_field() {
    let mask = annulus(31, 6.0, 14.0);
    let start = Coord::new(2, 15);
    let end = Coord::new(27, 10);
    let finder = PathFinder::new(mask, QueryConfig::default());

    let mut end_distance = UNREACHED;
    let mut capture = |q: &Query, f: &DistanceField| end_distance = f.at(q.end);
    let path = finder.find_observed(start, end, &mut capture).unwrap();

    assert_ne!(end_distance, UNREACHED);
    assert_eq!(path.steps(), Some(end_distance as usize));
}

#[test]
fn repeated_queries_are_identical() {
    let mask = annulus(25, 4.0, 11.0);
    let finder = PathFinder::new(mask, QueryConfig::default());
    let a = finder.find(Coord::new(1, 12), Coord::new(23, 12)).unwrap();
    let b = finder.find(Coord::new(1, 12), Coord::new(23, 12)).unwrap();
    assert!(!a.is_empty());
    assert_eq!(a, b);
}

#[test]
fn queries_with_different_starts_do_not_leak_state() {
    let mask = Mask::from_fn(9, 9, |_, _| true).unwrap();
    let finder = PathFinder::new(mask, QueryConfig::default());
    let first = finder.find(Coord::new(0, 0), Coord::new(8, 8)).unwrap();
    let second = finder.find(Coord::new(8, 0), Coord::new(8, 8)).unwrap();
    assert_eq!(first.steps(), Some(8));
    assert_eq!(second.steps(), Some(8));
    assert_eq!(second.start(), Some(Coord::new(8, 0)));
}

#[test]
fn generated_masks_match_reference_distances() {
    let mut rng = XorShift(0x9E37_79B9_7F4A_7C15);
    for round in 0..40 {
        let w = 6 + (rng.next() % 14) as u32;
        let h = 6 + (rng.next() % 14) as u32;
        let mask = Mask::from_fn(w, h, |_, _| rng.next() % 100 < 62).unwrap();

        let passable: Vec<Coord> = (0..h as i32)
            .flat_map(|y| (0..w as i32).map(move |x| Coord::new(x, y)))
            .filter(|&c| mask.is_passable(c))
            .collect();
        if passable.len() < 2 {
            continue;
        }
        let start = passable[(rng.next() % passable.len() as u64) as usize];
        let end = passable[(rng.next() % passable.len() as u64) as usize];

        let path = shortest_path(&mask, start, end).unwrap();
        let oracle = oracle_distances(&mask, start);
        let expected = oracle[(end.y * w as i32 + end.x) as usize];

        if expected == UNREACHED {
            assert!(path.is_empty(), "round {round}: expected no path");
        } else {
            assert_valid_path(&mask, &path, start, end);
            assert_eq!(
                path.steps(),
                Some(expected as usize),
                "round {round}: {start} -> {end}"
            );
        }
    }
}

#[test]
fn lenient_policy_tolerates_background_end() {
    let mask = Mask::from_rows(&["###.", "####"]).unwrap();
    let config = QueryConfig {
        endpoint_policy: EndpointPolicy::Lenient,
        ..QueryConfig::default()
    };
    let finder = PathFinder::new(mask, config);
    let path = finder.find(Coord::new(0, 0), Coord::new(3, 0)).unwrap();
    assert_eq!(path.end(), Some(Coord::new(3, 0)));
    assert_eq!(path.start(), Some(Coord::new(0, 0)));
    assert_eq!(path.steps(), Some(3));
}
