// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end reconstruction scenarios over the public pipeline entry.

use approx::assert_relative_eq;
use roomplan_geometry::{Point2D, Segment, Tolerances};
use roomplan_regions::types::EdgeLabel;
use roomplan_regions::{edge_label_strings, reconstruct_level, Region};

fn seg(x0: f64, y0: f64, x1: f64, y1: f64) -> Segment {
    Segment::new(Point2D::new(x0, y0), Point2D::new(x1, y1))
}

fn tolerances() -> Tolerances {
    Tolerances {
        point: 0.01,
        band: 0.2,
        grouping: 0.5,
        perimeter: 1.0,
        theta: 0.0,
    }
}

fn rectangle(x: f64, y: f64, w: f64, h: f64) -> Vec<Segment> {
    vec![
        seg(x, y, x + w, y),
        seg(x + w, y, x + w, y + h),
        seg(x + w, y + h, x, y + h),
        seg(x, y + h, x, y),
    ]
}

fn interiors(regions: &[Region]) -> Vec<&Region> {
    regions.iter().filter(|r| !r.is_shell).collect()
}

#[test]
fn clean_rectangle_round_trips() {
    let rec = reconstruct_level(&rectangle(0.0, 0.0, 10.0, 8.0), &tolerances(), "L0").unwrap();
    assert_eq!(rec.stats.clusters, 1);
    assert_eq!(rec.stats.failed_clusters, 0);

    let rooms = interiors(&rec.regions);
    assert_eq!(rooms.len(), 1);
    assert_relative_eq!(rooms[0].area(), 80.0, epsilon = 1e-9);
    assert_eq!(rooms[0].outer.len(), 4);
    assert!(rooms[0].edge_labels.iter().all(|l| *l == EdgeLabel::Outside));

    let labels = edge_label_strings(rooms[0], &rec.level);
    for (e, label) in labels.iter().enumerate() {
        assert_eq!(label, &format!("L0::0::Z{}::Outside_{e}", rooms[0].id));
    }
}

#[test]
fn noisy_rectangle_snaps_onto_the_lattice() {
    // Endpoints perturbed well inside the band tolerance.
    let input = vec![
        seg(0.0, 0.004, 10.0, 0.0),
        seg(10.003, 0.0, 10.0, 8.0),
        seg(10.0, 8.002, 0.0, 8.0),
        seg(0.0, 8.0, 0.0, 0.003),
    ];
    let rec = reconstruct_level(&input, &tolerances(), "L0").unwrap();
    let rooms = interiors(&rec.regions);
    assert_eq!(rooms.len(), 1);
    assert_relative_eq!(rooms[0].area(), 80.0, epsilon = 1e-2);
}

#[test]
fn dividing_wall_yields_adjacent_rooms() {
    let mut input = rectangle(0.0, 0.0, 12.0, 8.0);
    input.push(seg(7.0, 0.0, 7.0, 8.0));
    let rec = reconstruct_level(&input, &tolerances(), "L0").unwrap();
    let rooms = interiors(&rec.regions);
    assert_eq!(rooms.len(), 2);
    let total: f64 = rooms.iter().map(|r| r.area()).sum();
    assert_relative_eq!(total, 96.0, epsilon = 1e-9);
    for room in &rooms {
        let shared = room
            .edge_labels
            .iter()
            .filter(|l| matches!(l, EdgeLabel::Neighbor { .. }))
            .count();
        assert_eq!(shared, 1);
    }
}

#[test]
fn concentric_rectangles_fold_into_one_hole() {
    // Two clusters: an outer room and an island inside it, far enough
    // apart that fuzzy clustering keeps them separate.
    let mut input = rectangle(0.0, 0.0, 20.0, 20.0);
    input.extend(rectangle(7.0, 7.0, 6.0, 6.0));
    let rec = reconstruct_level(&input, &tolerances(), "L0").unwrap();
    assert_eq!(rec.stats.clusters, 2);
    assert_eq!(rec.stats.dropped_shells, 0);

    let host = rec
        .regions
        .iter()
        .find(|r| r.is_multiply_connected())
        .expect("outer room carries the island as a hole");
    assert!(!host.is_shell);
    assert_eq!(host.inner_loops.len(), 1);
    assert_relative_eq!(host.area(), 400.0 - 36.0, epsilon = 1e-9);

    // The multiply-connected host received a rectangle decomposition.
    let tiles = host.tiles.as_ref().expect("tiles computed for the host");
    let tiled: f64 = tiles.iter().map(|t| t.area()).sum();
    assert_relative_eq!(tiled, host.area(), epsilon = 1e-6);

    // The island room's walls all face the host.
    let island = rec
        .regions
        .iter()
        .find(|r| !r.is_shell && !r.is_multiply_connected() && r.id != host.id)
        .expect("island interior survives");
    assert!(island
        .edge_labels
        .iter()
        .all(|l| matches!(l, EdgeLabel::Neighbor { region, .. } if *region == host.id)));
}

#[test]
fn tight_concentric_rectangles_share_one_cluster() {
    // Close enough that fuzzy grouping fuses the outer room and the island
    // into a single cluster; the walls still form two separate connected
    // components and the island must fold into the outer room as a hole.
    let mut input = rectangle(0.0, 0.0, 10.0, 10.0);
    input.extend(rectangle(3.0, 3.0, 4.0, 4.0));
    let tol = Tolerances {
        grouping: 2.0,
        ..tolerances()
    };
    let rec = reconstruct_level(&input, &tol, "L0").unwrap();
    assert_eq!(rec.stats.clusters, 1);
    assert_eq!(rec.stats.failed_clusters, 0);
    assert_eq!(rec.stats.dropped_shells, 0);

    let rooms = interiors(&rec.regions);
    assert_eq!(rooms.len(), 2);

    let host = rec
        .regions
        .iter()
        .find(|r| r.is_multiply_connected())
        .expect("outer room carries the island as a hole");
    assert!(!host.is_shell);
    assert_eq!(host.inner_loops.len(), 1);
    assert_relative_eq!(host.area(), 100.0 - 16.0, epsilon = 1e-9);

    let island = rooms.iter().find(|r| r.id != host.id).unwrap();
    assert_relative_eq!(island.area(), 16.0, epsilon = 1e-9);
    assert!(island
        .edge_labels
        .iter()
        .all(|l| matches!(l, EdgeLabel::Neighbor { region, .. } if *region == host.id)));
}

#[test]
fn overlapping_collinear_runs_still_close_the_boundary() {
    // The bottom wall arrives as two overlapping runs instead of one span.
    let input = vec![
        seg(0.0, 0.0, 6.0, 0.0),
        seg(4.0, 0.0, 10.0, 0.0),
        seg(10.0, 0.0, 10.0, 10.0),
        seg(10.0, 10.0, 0.0, 10.0),
        seg(0.0, 10.0, 0.0, 0.0),
    ];
    let rec = reconstruct_level(&input, &tolerances(), "L0").unwrap();
    let rooms = interiors(&rec.regions);
    assert_eq!(rooms.len(), 1);
    assert_relative_eq!(rooms[0].area(), 100.0, epsilon = 1e-9);
}

#[test]
fn clustering_is_input_order_independent() {
    let mut input = rectangle(0.0, 0.0, 10.0, 8.0);
    input.extend(rectangle(30.0, 0.0, 6.0, 6.0));
    let forward = reconstruct_level(&input, &tolerances(), "L0").unwrap();
    input.reverse();
    let reversed = reconstruct_level(&input, &tolerances(), "L0").unwrap();

    assert_eq!(forward.regions.len(), reversed.regions.len());
    let mut fwd: Vec<f64> = interiors(&forward.regions).iter().map(|r| r.area()).collect();
    let mut rev: Vec<f64> = interiors(&reversed.regions).iter().map(|r| r.area()).collect();
    fwd.sort_by(|a, b| a.total_cmp(b));
    rev.sort_by(|a, b| a.total_cmp(b));
    for (a, b) in fwd.iter().zip(rev.iter()) {
        assert_relative_eq!(*a, *b, epsilon = 1e-9);
    }
}

#[test]
fn reconstruction_is_idempotent_on_its_own_output() {
    let input = vec![
        seg(0.0, 0.005, 10.0, 0.0),
        seg(10.004, 0.0, 10.0, 8.0),
        seg(10.0, 8.003, 0.0, 8.0),
        seg(0.0, 8.0, 0.0, 0.002),
    ];
    let first = reconstruct_level(&input, &tolerances(), "L0").unwrap();
    let room = interiors(&first.regions)[0];

    // Feed the clean reconstructed loop back through the pipeline.
    let n = room.outer.len();
    let walls: Vec<Segment> = (0..n)
        .map(|i| Segment::new(room.outer[i], room.outer[(i + 1) % n]))
        .collect();
    let second = reconstruct_level(&walls, &tolerances(), "L0").unwrap();
    let room2 = interiors(&second.regions)[0];
    assert_relative_eq!(room.area(), room2.area(), epsilon = 1e-9);
    assert_eq!(room.outer.len(), room2.outer.len());
}

#[test]
fn short_noise_cluster_is_dropped_by_perimeter_filter() {
    let mut input = rectangle(0.0, 0.0, 10.0, 8.0);
    // A speck far outside: larger than the band so it still traces,
    // but with perimeter 0.88, below the 1.0 threshold.
    input.extend(rectangle(50.0, 50.0, 0.22, 0.22));
    let rec = reconstruct_level(&input, &tolerances(), "L0").unwrap();
    assert_eq!(rec.stats.dropped_clusters, 1);
    assert_eq!(interiors(&rec.regions).len(), 1);
}
