//! Unit tests for sr-core primitives.

#[cfg(test)]
mod ids {
    use crate::{EdgeId, NodeId, SegmentId};

    #[test]
    fn index_roundtrip() {
        let id = NodeId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(NodeId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(NodeId::INVALID.0, u32::MAX);
        assert_eq!(EdgeId::INVALID.0, u32::MAX);
        assert_eq!(SegmentId::INVALID.0, u64::MAX);
        assert_eq!(NodeId::default(), NodeId::INVALID);
    }

    #[test]
    fn display() {
        assert_eq!(SegmentId(1207).to_string(), "SegmentId(1207)");
    }
}

#[cfg(test)]
mod geo {
    use crate::{CoreError, GeoPoint, PlanarPoint};

    #[test]
    fn planar_distance_is_euclidean() {
        let a = PlanarPoint::new(0.0, 0.0);
        let b = PlanarPoint::new(3.0, 4.0);
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(b.distance(a), 5.0);
    }

    #[test]
    fn checked_accepts_valid_degrees() {
        let p = GeoPoint::checked(-71.208, 46.813).unwrap();
        assert_eq!(p.lon, -71.208);
        assert_eq!(p.lat, 46.813);
    }

    #[test]
    fn checked_rejects_bad_input() {
        assert!(matches!(
            GeoPoint::checked(-71.0, 91.0),
            Err(CoreError::InvalidCoordinate(_))
        ));
        assert!(matches!(
            GeoPoint::checked(181.0, 46.0),
            Err(CoreError::InvalidCoordinate(_))
        ));
        assert!(GeoPoint::checked(f64::NAN, 46.0).is_err());
        assert!(GeoPoint::checked(-71.0, f64::INFINITY).is_err());
    }
}

#[cfg(test)]
mod projection {
    use crate::{GeoPoint, Identity, PlanarPoint, Projection, TransverseMercator};

    #[test]
    fn identity_passes_through() {
        let p = Identity.to_planar(GeoPoint::new(12.5, -3.0));
        assert_eq!(p, PlanarPoint::new(12.5, -3.0));
        assert_eq!(Identity.to_geodetic(p), GeoPoint::new(12.5, -3.0));
    }

    #[test]
    fn input_validation_depends_on_projection() {
        let planar = GeoPoint::new(250_100.5, 5_185_200.0);
        assert!(Identity.validate_input(planar).is_ok());
        assert!(Identity.validate_input(GeoPoint::new(f64::NAN, 0.0)).is_err());

        let tm = TransverseMercator::mtm_zone7();
        assert!(tm.validate_input(planar).is_err());
        assert!(tm.validate_input(GeoPoint::new(-71.2, 46.8)).is_ok());

        // Forwarded through boxes and references.
        let boxed: Box<dyn Projection> = Box::new(Identity);
        assert!(boxed.validate_input(planar).is_ok());
        assert!((&tm).validate_input(planar).is_err());
    }

    #[test]
    fn central_meridian_maps_to_false_easting() {
        let tm = TransverseMercator::mtm_zone7();
        let origin = tm.to_planar(GeoPoint::new(-70.5, 0.0));
        assert!((origin.x - 304_800.0).abs() < 1e-6, "x = {}", origin.x);
        assert!(origin.y.abs() < 1e-6, "y = {}", origin.y);

        let north = tm.to_planar(GeoPoint::new(-70.5, 46.8));
        assert!((north.x - 304_800.0).abs() < 1e-6);
        // ~46.8° of meridian arc, scaled by k0.
        assert!(north.y > 5_180_000.0 && north.y < 5_190_000.0, "y = {}", north.y);
    }

    #[test]
    fn easting_is_symmetric_about_central_meridian() {
        let tm = TransverseMercator::mtm_zone7();
        let east = tm.to_planar(GeoPoint::new(-69.5, 46.8));
        let west = tm.to_planar(GeoPoint::new(-71.5, 46.8));
        assert!(((east.x - 304_800.0) + (west.x - 304_800.0)).abs() < 1e-6);
        assert!((east.y - west.y).abs() < 1e-6);
    }

    #[test]
    fn roundtrip_within_zone() {
        let tm = TransverseMercator::mtm_zone7();
        for &(lon, lat) in &[(-71.2080, 46.8139), (-70.5, 45.0), (-72.0, 47.5), (-69.1, 46.0)] {
            let back = tm.to_geodetic(tm.to_planar(GeoPoint::new(lon, lat)));
            assert!((back.lon - lon).abs() < 1e-6, "lon {lon} -> {}", back.lon);
            assert!((back.lat - lat).abs() < 1e-6, "lat {lat} -> {}", back.lat);
        }
    }

    #[test]
    fn boxed_projection_delegates() {
        let boxed: Box<dyn Projection> = Box::new(TransverseMercator::mtm_zone7());
        let direct = TransverseMercator::mtm_zone7().to_planar(GeoPoint::new(-71.0, 46.0));
        assert_eq!(boxed.to_planar(GeoPoint::new(-71.0, 46.0)), direct);
    }

    #[test]
    fn validate_rejects_degenerate_ellipsoid() {
        let mut tm = TransverseMercator::mtm_zone7();
        assert!(tm.validate().is_ok());
        tm.semi_major = 0.0;
        assert!(tm.validate().is_err());
    }
}
