//! Unit tests for uts-agent.

#[cfg(test)]
mod helpers {
    use uts_core::{AgentId, ModeMask, NodeId, Point, VehicleMode};
    use uts_graph::{RoadNetwork, RoadNetworkBuilder};

    use crate::Agent;

    /// Line network 0 ↔ 1 ↔ 2, 100-unit edges.
    pub fn line() -> (RoadNetwork, [NodeId; 3]) {
        let mut b = RoadNetworkBuilder::new();
        let n0 = b.add_node("N0", Point::new(0.0, 0.0)).unwrap();
        let n1 = b.add_node("N1", Point::new(100.0, 0.0)).unwrap();
        let n2 = b.add_node("N2", Point::new(200.0, 0.0)).unwrap();
        b.add_edge(n0, n1, 100.0, ModeMask::ALL, false).unwrap();
        b.add_edge(n1, n2, 100.0, ModeMask::ALL, false).unwrap();
        (b.build(), [n0, n1, n2])
    }

    pub fn car(id: u32, path: Vec<NodeId>) -> Agent {
        Agent::new(
            AgentId(id),
            format!("car_{id}"),
            VehicleMode::Car,
            path,
            60.0,
            1.0,
            0.0,
        )
    }
}

#[cfg(test)]
mod agent {
    use crate::AgentStatus;

    use super::helpers::{car, line};

    #[test]
    fn spawn_state_from_path() {
        let (_, [n0, n1, n2]) = line();
        let a = car(0, vec![n0, n1, n2]);
        assert_eq!(a.origin, n0);
        assert_eq!(a.destination, n2);
        assert_eq!(a.current, n0);
        assert_eq!(a.next, Some(n1));
        assert_eq!(a.status, AgentStatus::Waiting);
        assert_eq!(a.position_on_edge, 0.0);
        assert_eq!(a.current_speed, a.nominal_speed);
    }

    #[test]
    fn single_node_path_has_no_next() {
        let (_, [n0, ..]) = line();
        let a = car(0, vec![n0]);
        assert_eq!(a.next, None);
        assert_eq!(a.destination, n0);
        assert!(a.current_edge_key().is_none());
    }

    #[test]
    fn advance_node_steps_the_path() {
        let (_, [n0, n1, n2]) = line();
        let mut a = car(0, vec![n0, n1, n2]);
        a.position_on_edge = 1.0;
        a.advance_node();
        assert_eq!(a.current, n1);
        assert_eq!(a.next, Some(n2));
        assert_eq!(a.path_index, 1);
        assert_eq!(a.position_on_edge, 0.0);
        a.position_on_edge = 1.0;
        a.advance_node();
        assert_eq!(a.current, n2);
        assert_eq!(a.next, None);
    }

    #[test]
    fn adopt_path_resets_position_on_new_heading() {
        let (_, [n0, n1, n2]) = line();
        let mut a = car(0, vec![n0, n1, n2]);
        a.position_on_edge = 0.5;
        // Same next hop → keep rolling.
        a.adopt_path(vec![n0, n1]);
        assert_eq!(a.position_on_edge, 0.5);
        assert_eq!(a.destination, n1);
        // Different next hop → restart from the node.
        a.adopt_path(vec![n0, n2]);
        assert_eq!(a.position_on_edge, 0.0);
        assert_eq!(a.next, Some(n2));
    }

    #[test]
    fn upcoming_edges_clip_at_path_end() {
        let (_, [n0, n1, n2]) = line();
        let a = car(0, vec![n0, n1, n2]);
        let upcoming: Vec<_> = a.upcoming_edges(3).collect();
        assert_eq!(upcoming, vec![(n0, n1), (n1, n2)]);
    }

    #[test]
    fn status_classification() {
        assert!(AgentStatus::Waiting.is_active());
        assert!(!AgentStatus::Waiting.is_en_route());
        assert!(AgentStatus::Stuck.is_en_route());
        assert!(AgentStatus::Rerouting.is_en_route());
        assert!(!AgentStatus::Arrived.is_active());
        assert!(!AgentStatus::Arrived.is_en_route());
    }
}

#[cfg(test)]
mod store {
    use uts_core::VehicleMode;

    use crate::agent::AgentStatus;
    use crate::{Agent, AgentStore};

    use super::helpers::line;

    #[test]
    fn labels_count_per_mode() {
        let (_, [n0, n1, _]) = line();
        let mut store = AgentStore::new();

        let (id, label) = store.peek_handle(VehicleMode::Car);
        assert_eq!(label, "car_0");
        store.insert(Agent::new(id, label, VehicleMode::Car, vec![n0, n1], 60.0, 1.0, 0.0));

        let (id, label) = store.peek_handle(VehicleMode::Bicycle);
        assert_eq!(label, "bicycle_0");
        store.insert(Agent::new(id, label, VehicleMode::Bicycle, vec![n0, n1], 40.0, 0.5, 0.0));

        let (_, label) = store.peek_handle(VehicleMode::Car);
        assert_eq!(label, "car_1");
        assert_eq!(store.total_spawned(), 2);
    }

    #[test]
    fn failed_spawn_does_not_consume_a_label() {
        let store = AgentStore::new();
        let (_, first) = store.peek_handle(VehicleMode::Car);
        // No insert happened; peeking again yields the same handle.
        let (_, second) = store.peek_handle(VehicleMode::Car);
        assert_eq!(first, second);
    }

    #[test]
    fn remove_by_label_round_trip() {
        let (_, [n0, n1, _]) = line();
        let mut store = AgentStore::new();
        let (id, label) = store.peek_handle(VehicleMode::Car);
        store.insert(Agent::new(id, label.clone(), VehicleMode::Car, vec![n0, n1], 60.0, 1.0, 0.0));

        let removed = store.remove_by_label(&label).unwrap();
        assert_eq!(removed.id, id);
        assert!(store.is_empty());
        assert!(store.remove_by_label(&label).is_err());
    }

    #[test]
    fn occupancy_tracks_en_route_agents_only() {
        let (net, [n0, n1, n2]) = line();
        let mut store = AgentStore::new();
        for _ in 0..3 {
            let (id, label) = store.peek_handle(VehicleMode::Car);
            store.insert(Agent::new(id, label, VehicleMode::Car, vec![n0, n1, n2], 60.0, 1.0, 0.0));
        }
        let ids = store.ids();

        // Waiting agents occupy nothing.
        store.rebuild_occupancy(&net);
        let edge = net.edge_between(n0, n1).unwrap();
        assert!(store.agents_on_edge(edge).is_empty());

        store.get_mut(ids[0]).unwrap().status = AgentStatus::Moving;
        store.get_mut(ids[1]).unwrap().status = AgentStatus::Stuck;
        store.get_mut(ids[2]).unwrap().status = AgentStatus::Arrived;
        store.rebuild_occupancy(&net);
        assert_eq!(store.agents_on_edge(edge), &ids[..2]);
        assert_eq!(store.active_count(), 2);
    }

    #[test]
    fn clear_resets_counters() {
        let (_, [n0, n1, _]) = line();
        let mut store = AgentStore::new();
        let (id, label) = store.peek_handle(VehicleMode::Car);
        store.insert(Agent::new(id, label, VehicleMode::Car, vec![n0, n1], 60.0, 1.0, 0.0));
        store.clear();
        assert_eq!(store.total_spawned(), 0);
        let (_, label) = store.peek_handle(VehicleMode::Car);
        assert_eq!(label, "car_0");
    }

    #[test]
    fn iteration_is_ascending_by_id() {
        let (_, [n0, n1, _]) = line();
        let mut store = AgentStore::new();
        for _ in 0..5 {
            let (id, label) = store.peek_handle(VehicleMode::Car);
            store.insert(Agent::new(id, label, VehicleMode::Car, vec![n0, n1], 60.0, 1.0, 0.0));
        }
        let ids: Vec<u32> = store.iter().map(|a| a.id.0).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }

}
