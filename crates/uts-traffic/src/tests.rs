//! Unit tests for uts-traffic.

#[cfg(test)]
mod helpers {
    use uts_core::{AgentId, ModeMask, NodeId, Point, VehicleMode};
    use uts_agent::{Agent, AgentStatus, AgentStore};
    use uts_graph::{RoadNetwork, RoadNetworkBuilder};

    /// Two nodes joined by a single 100-unit one-way edge.
    pub fn single_edge() -> (RoadNetwork, NodeId, NodeId) {
        let mut b = RoadNetworkBuilder::new();
        let from = b.add_node("F", Point::new(0.0, 0.0)).unwrap();
        let to   = b.add_node("T", Point::new(100.0, 0.0)).unwrap();
        b.add_edge(from, to, 100.0, ModeMask::ALL, true).unwrap();
        (b.build(), from, to)
    }

    /// Put `n` moving cars on the (from → to) edge of `net`.
    pub fn store_with_cars(net: &RoadNetwork, from: NodeId, to: NodeId, n: usize) -> AgentStore {
        let mut store = AgentStore::new();
        for i in 0..n {
            let (id, label) = store.peek_handle(VehicleMode::Car);
            debug_assert_eq!(id, AgentId(i as u32));
            let mut agent =
                Agent::new(id, label, VehicleMode::Car, vec![from, to], 60.0, 1.0, 0.0);
            agent.status = AgentStatus::Moving;
            agent.position_on_edge = i as f64 * 0.1;
            store.insert(agent);
        }
        store.rebuild_occupancy(net);
        store
    }
}

// ── Bands ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod bands {
    use crate::CongestionLevel;

    #[test]
    fn density_thresholds() {
        assert_eq!(CongestionLevel::from_density(0.0), CongestionLevel::FreeFlow);
        assert_eq!(CongestionLevel::from_density(0.19), CongestionLevel::FreeFlow);
        assert_eq!(CongestionLevel::from_density(0.2), CongestionLevel::Light);
        assert_eq!(CongestionLevel::from_density(0.4), CongestionLevel::Moderate);
        assert_eq!(CongestionLevel::from_density(0.7), CongestionLevel::Heavy);
        assert_eq!(CongestionLevel::from_density(1.0), CongestionLevel::Congested);
        assert_eq!(CongestionLevel::from_density(5.0), CongestionLevel::Congested);
    }

    #[test]
    fn sample_ranges_are_ordered_and_disjoint_enough() {
        let mut previous_hi = 0.0;
        for level in CongestionLevel::ALL {
            let (lo, hi) = level.sample_range();
            assert!(lo < hi, "{level}: empty range");
            assert!(lo >= previous_hi - 0.5, "{level}: range regressed");
            previous_hi = hi;
        }
        assert_eq!(CongestionLevel::Congested.sample_range().1, 6.0);
    }
}

// ── Analyzer ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod analyzer {
    use uts_core::SimRng;

    use crate::{CongestionAnalyzer, CongestionLevel};

    use super::helpers::{single_edge, store_with_cars};

    #[test]
    fn density_from_occupancy() {
        let (net, from, to) = single_edge();
        // Capacity = 3.0 × 100 = 300 usage-units; 3 cars = 3.0 usage.
        let store = store_with_cars(&net, from, to, 3);
        let mut analyzer = CongestionAnalyzer::new(net.edge_count(), 100);
        analyzer.measure(&net, &store, 3.0);
        let edge = net.edge_between(from, to).unwrap();
        assert!((analyzer.density(edge) - 0.01).abs() < 1e-12);
        assert_eq!(analyzer.level(edge), CongestionLevel::FreeFlow);
    }

    #[test]
    fn heavy_density_classifies_and_bottlenecks() {
        let (net, from, to) = single_edge();
        // 240 cars on a 300-capacity edge → density 0.8.
        let store = store_with_cars(&net, from, to, 240);
        let mut analyzer = CongestionAnalyzer::new(net.edge_count(), 100);
        analyzer.measure(&net, &store, 3.0);
        let edge = net.edge_between(from, to).unwrap();
        assert!((analyzer.density(edge) - 0.8).abs() < 1e-9);
        assert_eq!(analyzer.level(edge), CongestionLevel::Heavy);

        let bottlenecks = analyzer.bottlenecks(0.7, 10);
        assert_eq!(bottlenecks.len(), 1);
        assert_eq!(bottlenecks[0].0, edge);
    }

    #[test]
    fn samples_stay_in_band_and_fill_history() {
        let (net, from, to) = single_edge();
        let store = store_with_cars(&net, from, to, 0);
        let mut analyzer = CongestionAnalyzer::new(net.edge_count(), 100);
        analyzer.measure(&net, &store, 3.0);
        let edge = net.edge_between(from, to).unwrap();
        let mut rng = SimRng::new(3);
        let (lo, hi) = CongestionLevel::FreeFlow.sample_range();
        for _ in 0..250 {
            let s = analyzer.sample_multiplier(edge, &mut rng);
            assert!(s >= lo && s < hi, "sample {s} outside band");
        }
        // Ring-buffered at capacity 100.
        assert_eq!(analyzer.history_len(edge), 100);
        assert!(analyzer.history_mean(edge) < 1.0);
    }

    #[test]
    fn probability_combines_density_and_history() {
        let (net, from, to) = single_edge();
        let edge = net.edge_between(from, to).unwrap();
        let mut analyzer = CongestionAnalyzer::new(net.edge_count(), 100);

        // Empty history is neutral; zero density → probability 0.
        assert_eq!(analyzer.probability(edge), 0.0);

        // Saturated edge with a hot history clamps to 1.
        let store = store_with_cars(&net, from, to, 400);
        analyzer.measure(&net, &store, 3.0);
        let mut rng = SimRng::new(9);
        for _ in 0..50 {
            analyzer.sample_multiplier(edge, &mut rng);
        }
        assert_eq!(analyzer.probability(edge), 1.0);
    }

    #[test]
    fn distribution_sums_to_one_hundred() {
        let analyzer = CongestionAnalyzer::new(7, 100);
        let total: f64 = analyzer.level_distribution().iter().sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn bottlenecks_sorted_descending() {
        use uts_core::{ModeMask, Point, VehicleMode};
        use uts_agent::{Agent, AgentStatus, AgentStore};
        use uts_graph::RoadNetworkBuilder;

        // Two disjoint one-way edges with different loads.
        let mut b = RoadNetworkBuilder::new();
        let a0 = b.add_node("A0", Point::new(0.0, 0.0)).unwrap();
        let a1 = b.add_node("A1", Point::new(100.0, 0.0)).unwrap();
        let b0 = b.add_node("B0", Point::new(0.0, 50.0)).unwrap();
        let b1 = b.add_node("B1", Point::new(100.0, 50.0)).unwrap();
        b.add_edge(a0, a1, 100.0, ModeMask::ALL, true).unwrap();
        b.add_edge(b0, b1, 100.0, ModeMask::ALL, true).unwrap();
        let net = b.build();

        // 270 cars on A (density 0.9), 240 on B (density 0.8).
        let mut store = AgentStore::new();
        for (count, (from, to)) in [(270, (a0, a1)), (240, (b0, b1))] {
            for _ in 0..count {
                let (id, label) = store.peek_handle(VehicleMode::Car);
                let mut agent =
                    Agent::new(id, label, VehicleMode::Car, vec![from, to], 60.0, 1.0, 0.0);
                agent.status = AgentStatus::Moving;
                store.insert(agent);
            }
        }
        store.rebuild_occupancy(&net);

        let mut analyzer = CongestionAnalyzer::new(net.edge_count(), 100);
        analyzer.measure(&net, &store, 3.0);
        let hits = analyzer.bottlenecks(0.7, 10);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].0, net.edge_between(a0, a1).unwrap());
        assert!(hits[0].1 > hits[1].1);

        // top-k clipping
        assert_eq!(analyzer.bottlenecks(0.7, 1).len(), 1);
        assert!(CongestionAnalyzer::new(3, 100).bottlenecks(0.7, 5).is_empty());
    }
}

// ── Incidents ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod incidents {
    use uts_core::{EdgeId, SimRng};

    use crate::{random_duration, random_severity, AccidentTable, BlockedEdges, Severity, TrafficError};

    #[test]
    fn severity_parameters() {
        assert_eq!(Severity::Minor.boost(), 2.0);
        assert_eq!(Severity::Moderate.boost(), 4.0);
        assert_eq!(Severity::Severe.boost(), 10.0);
        assert_eq!(Severity::Minor.duration_range(), (30.0, 60.0));
        assert_eq!(Severity::Severe.duration_range(), (90.0, 120.0));
    }

    #[test]
    fn create_labels_sequentially() {
        let mut table = AccidentTable::new();
        let a = table.create(EdgeId(0), Severity::Minor, 0.0, 45.0, 1.2).unwrap();
        assert_eq!(a.label, "acc_0");
        let b = table.create(EdgeId(1), Severity::Severe, 1.0, 100.0, 0.9).unwrap();
        assert_eq!(b.label, "acc_1");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn duplicate_accident_rejected() {
        let mut table = AccidentTable::new();
        table.create(EdgeId(3), Severity::Minor, 0.0, 45.0, 1.0).unwrap();
        assert!(matches!(
            table.create(EdgeId(3), Severity::Severe, 1.0, 90.0, 1.0),
            Err(TrafficError::DuplicateAccident(_))
        ));
    }

    #[test]
    fn resolve_returns_prior_multiplier() {
        let mut table = AccidentTable::new();
        table.create(EdgeId(0), Severity::Moderate, 5.0, 70.0, 1.37).unwrap();
        let resolved = table.resolve("acc_0").unwrap();
        assert_eq!(resolved.prior_multiplier, 1.37);
        assert!(table.is_empty());
        assert!(!table.contains_edge(EdgeId(0)));
        assert!(matches!(
            table.resolve("acc_0"),
            Err(TrafficError::UnknownAccident(_))
        ));
    }

    #[test]
    fn expiry_is_strictly_past_due() {
        let mut table = AccidentTable::new();
        table.create(EdgeId(0), Severity::Minor, 0.0, 30.0, 1.0).unwrap();
        // Not expired exactly at the boundary.
        assert!(table.expire_due(30.0).is_empty());
        let expired = table.expire_due(30.01);
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].edge, EdgeId(0));
        assert!(table.is_empty());
    }

    #[test]
    fn random_draws_are_in_range() {
        let mut rng = SimRng::new(11);
        for _ in 0..100 {
            let severity = random_severity(&mut rng);
            let (lo, hi) = severity.duration_range();
            let duration = random_duration(severity, &mut rng);
            assert!(duration >= lo && duration < hi);
        }
    }

    #[test]
    fn block_unblock_round_trip() {
        let mut blocked = BlockedEdges::new();
        blocked.block(EdgeId(2), "construction", 1.5);
        assert!(blocked.contains(EdgeId(2)));
        assert!(blocked.as_set().contains(&EdgeId(2)));
        assert_eq!(blocked.len(), 1);

        assert!(blocked.unblock(EdgeId(2)));
        assert!(!blocked.contains(EdgeId(2)));
        // Unblocking again is a no-op.
        assert!(!blocked.unblock(EdgeId(2)));
    }

    #[test]
    fn iter_sorted_is_ascending() {
        let mut blocked = BlockedEdges::new();
        blocked.block(EdgeId(5), "a", 0.0);
        blocked.block(EdgeId(1), "b", 0.0);
        blocked.block(EdgeId(3), "c", 0.0);
        let order: Vec<u32> = blocked.iter_sorted().iter().map(|(e, _)| e.0).collect();
        assert_eq!(order, vec![1, 3, 5]);
    }
}
