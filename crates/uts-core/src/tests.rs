//! Unit tests for uts-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AgentId, EdgeId, NodeId};

    #[test]
    fn index_roundtrip() {
        let id = NodeId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(NodeId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn ordering() {
        assert!(AgentId(0) < AgentId(1));
        assert!(NodeId(100) > NodeId(99));
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(AgentId::INVALID.0, u32::MAX);
        assert_eq!(NodeId::INVALID.0, u32::MAX);
        assert_eq!(EdgeId::INVALID.0, u32::MAX);
    }

    #[test]
    fn display() {
        assert_eq!(EdgeId(7).to_string(), "EdgeId(7)");
    }
}

#[cfg(test)]
mod point {
    use crate::Point;

    #[test]
    fn zero_distance() {
        let p = Point::new(3.0, 4.0);
        assert_eq!(p.distance(p), 0.0);
    }

    #[test]
    fn pythagorean() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-12);
        assert!((b.distance(a) - 5.0).abs() < 1e-12);
    }
}

#[cfg(test)]
mod mode {
    use crate::{ModeMask, VehicleMode};

    #[test]
    fn parse_known_modes() {
        assert_eq!("car".parse::<VehicleMode>().unwrap(), VehicleMode::Car);
        assert_eq!("bicycle".parse::<VehicleMode>().unwrap(), VehicleMode::Bicycle);
        assert_eq!("pedestrian".parse::<VehicleMode>().unwrap(), VehicleMode::Pedestrian);
    }

    #[test]
    fn parse_unknown_mode_errors() {
        assert!("tram".parse::<VehicleMode>().is_err());
    }

    #[test]
    fn all_mask_allows_everything() {
        for mode in VehicleMode::ALL {
            assert!(ModeMask::ALL.allows(mode));
        }
    }

    #[test]
    fn only_mask_is_exclusive() {
        let mask = ModeMask::only(VehicleMode::Car);
        assert!(mask.allows(VehicleMode::Car));
        assert!(!mask.allows(VehicleMode::Bicycle));
        assert!(!mask.allows(VehicleMode::Pedestrian));
    }

    #[test]
    fn mask_from_iterator() {
        let mask: ModeMask = [VehicleMode::Car, VehicleMode::Bicycle].into_iter().collect();
        assert!(mask.allows(VehicleMode::Car));
        assert!(mask.allows(VehicleMode::Bicycle));
        assert!(!mask.allows(VehicleMode::Pedestrian));
        assert_eq!(mask.modes().count(), 2);
    }
}

#[cfg(test)]
mod config {
    use crate::{SimConfig, SimRng, VehicleMode};

    #[test]
    fn defaults_validate() {
        SimConfig::default().validate().unwrap();
    }

    #[test]
    fn default_speeds_and_capacities() {
        let cfg = SimConfig::default();
        assert_eq!(cfg.speed_profile(VehicleMode::Car).mean, 60.0);
        assert_eq!(cfg.speed_profile(VehicleMode::Bicycle).mean, 40.0);
        assert_eq!(cfg.speed_profile(VehicleMode::Pedestrian).mean, 20.0);
        assert_eq!(cfg.capacity_usage(VehicleMode::Car), 1.0);
        assert_eq!(cfg.capacity_usage(VehicleMode::Bicycle), 0.5);
        assert_eq!(cfg.capacity_usage(VehicleMode::Pedestrian), 0.2);
    }

    #[test]
    fn bad_distribution_rejected() {
        let cfg = SimConfig {
            spawn_distribution: [0.5, 0.5, 0.5],
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn negative_dt_cap_rejected() {
        let cfg = SimConfig { max_dt: -1.0, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn speed_sample_respects_clamps() {
        let cfg = SimConfig::default();
        let mut rng = SimRng::new(7);
        let profile = cfg.speed_profile(VehicleMode::Car);
        for _ in 0..1000 {
            let v = profile.sample(&mut rng);
            assert!(v >= profile.min && v <= profile.max, "sample {v} out of range");
        }
    }
}

#[cfg(test)]
mod clock {
    use crate::SimClock;

    #[test]
    fn dt_clamped_to_cap() {
        let clock = SimClock::new(0.2);
        assert_eq!(clock.clamp_dt(5.0), 0.2);
        assert_eq!(clock.clamp_dt(0.05), 0.05);
        assert_eq!(clock.clamp_dt(-1.0), 0.0);
        assert_eq!(clock.clamp_dt(f64::NAN), 0.0);
    }

    #[test]
    fn advance_accumulates() {
        let mut clock = SimClock::new(0.2);
        clock.advance(0.1);
        clock.advance(0.1);
        assert_eq!(clock.step, 2);
        assert!((clock.elapsed_secs - 0.2).abs() < 1e-12);
    }

    #[test]
    fn reset_zeroes_state() {
        let mut clock = SimClock::new(0.2);
        clock.advance(0.2);
        clock.reset();
        assert_eq!(clock.step, 0);
        assert_eq!(clock.elapsed_secs, 0.0);
    }
}

#[cfg(test)]
mod rng {
    use crate::SimRng;

    #[test]
    fn same_seed_same_stream() {
        let mut a = SimRng::new(42);
        let mut b = SimRng::new(42);
        for _ in 0..32 {
            assert_eq!(a.gen_range(0u32..1000), b.gen_range(0u32..1000));
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = SimRng::new(1);
        let mut b = SimRng::new(2);
        let xs: Vec<u32> = (0..16).map(|_| a.gen_range(0..u32::MAX)).collect();
        let ys: Vec<u32> = (0..16).map(|_| b.gen_range(0..u32::MAX)).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn choose_on_empty_slice() {
        let mut rng = SimRng::new(0);
        let empty: [u8; 0] = [];
        assert!(rng.choose(&empty).is_none());
    }
}
