use celestial_htm::mesh::{self, Mesh};
use celestial_htm::{match_coordinates, Coordinates, SetExtractor};
use proptest::prelude::*;

fn position() -> impl Strategy<Value = (f64, f64)> {
    (0.0..360.0f64, -90.0..=90.0f64)
}

proptest! {
    #[test]
    fn lookup_is_deterministic((ra, dec) in position(), depth in 0u8..=25) {
        let mesh = Mesh::new(depth).unwrap();
        let id = mesh.lookup_id(ra, dec);
        prop_assert_eq!(id, mesh.lookup_id(ra, dec));
        prop_assert_eq!(mesh::depth_of(id).unwrap(), depth);
    }

    #[test]
    fn lookup_inside_zero_radius_cover((ra, dec) in position(), depth in 0u8..=25) {
        let mesh = Mesh::new(depth).unwrap();
        let ranges = mesh.intersect_ranges(ra, dec, 0.0, true).unwrap();
        prop_assert!(ranges.contains(mesh.lookup_id(ra, dec)));
    }

    #[test]
    fn lookup_refines_parent((ra, dec) in position(), depth in 1u8..=25) {
        let fine = Mesh::new(depth).unwrap().lookup_id(ra, dec);
        let coarse = Mesh::new(depth - 1).unwrap().lookup_id(ra, dec);
        prop_assert_eq!(mesh::parent(fine).unwrap(), Some(coarse));
    }

    #[test]
    fn matched_points_are_covered(
        (ra, dec) in position(),
        offsets in prop::collection::vec((-0.01..0.01f64, -0.01..0.01f64), 1..20),
        radius in 0.0..0.02f64,
    ) {
        let mesh = Mesh::new(12).unwrap();
        let center = Coordinates::single(ra, dec).unwrap();
        let others = Coordinates::new(
            offsets.iter().map(|o| (ra + o.0).rem_euclid(360.0)).collect(),
            offsets.iter().map(|o| (dec + o.1).clamp(-90.0, 90.0)).collect(),
        ).unwrap();

        let (ra1, dec1) = center.get(0).unwrap();
        let m = match_coordinates(mesh, &center, &others, radius, 0).unwrap();
        for (j, (ra2, dec2)) in others.iter().enumerate() {
            let sep = celestial_core::angular_separation_deg(ra1, dec1, ra2, dec2);
            let found = m.idx2.contains(&j);
            prop_assert_eq!(found, sep <= radius, "point {} at {} deg", j, sep);
        }
    }

    #[test]
    fn all_pairs_not_fewer_than_nearest(
        ra in prop::collection::vec(10.0..10.05f64, 1..30),
        dec in prop::collection::vec(-5.0..-4.95f64, 30),
        radius in 0.0..0.05f64,
    ) {
        let n = ra.len();
        let coords = Coordinates::new(ra, dec[..n].to_vec()).unwrap();
        let mesh = Mesh::new(14).unwrap();
        let all = match_coordinates(mesh, &coords, &coords, radius, 0).unwrap();
        let nearest = match_coordinates(mesh, &coords, &coords, radius, 1).unwrap();
        prop_assert!(all.len() >= nearest.len());
        prop_assert_eq!(nearest.len(), n);
        for m in nearest.iter() {
            prop_assert_eq!(m.sep_deg, 0.0);
        }
    }

    #[test]
    fn sets_partition_input(
        ra in prop::collection::vec(20.0..20.01f64, 1..40),
        dec in prop::collection::vec(30.0..30.01f64, 40),
        radius_arcsec in 0.5..20.0f64,
    ) {
        let n = ra.len();
        let coords = Coordinates::new(ra, dec[..n].to_vec()).unwrap();
        let ids: Vec<usize> = (0..n).collect();
        let sets = SetExtractor::new(radius_arcsec / 3600.0)
            .unwrap()
            .extract(&coords, &ids)
            .unwrap();

        let mut seen: Vec<usize> = sets.into_iter().flatten().collect();
        seen.sort_unstable();
        prop_assert_eq!(seen, ids);
    }

    #[test]
    fn area_quarters_per_level(depth in 1u8..=25) {
        let a = Mesh::new(depth).unwrap().area();
        let b = Mesh::new(depth - 1).unwrap().area();
        prop_assert!(a > 0.0);
        prop_assert!((a * 4.0 - b).abs() <= b * 1e-12);
    }
}
