//! Unit tests for sr-graph.
//!
//! All tests use hand-crafted segments so they run without any source file.

#[cfg(test)]
mod helpers {
    use sr_core::{NodeId, PlanarPoint, SegmentId};

    use crate::{build_graph, Graph, Segment};

    pub fn seg(id: u64, from: (f64, f64), to: (f64, f64), length: f64) -> Segment {
        Segment::new(
            SegmentId(id),
            vec![PlanarPoint::new(from.0, from.1), PlanarPoint::new(to.0, to.1)],
        )
        .with_length(length)
    }

    /// Small grid for routing tests.
    ///
    /// Nodes (x, y):
    ///   0:(0,0)    1:(100,0)   2:(200,0)
    ///   3:(0,100)              4:(200,100)
    ///
    /// Segments: 0-1, 1-2, 2-4 (100 each), 0-3 (500), 3-4 (100).
    /// Shortest 0→4 is 0→1→2→4 = 300 against 0→3→4 = 600.
    pub fn grid_segments() -> Vec<Segment> {
        vec![
            seg(1, (0.0, 0.0), (100.0, 0.0), 100.0),
            seg(2, (100.0, 0.0), (200.0, 0.0), 100.0),
            seg(3, (200.0, 0.0), (200.0, 100.0), 100.0),
            seg(4, (0.0, 0.0), (0.0, 100.0), 500.0),
            seg(5, (0.0, 100.0), (200.0, 100.0), 100.0),
        ]
    }

    pub fn grid_graph() -> (Graph, [NodeId; 5]) {
        let g = build_graph(&grid_segments()).unwrap();
        let at = |x, y| g.node_at(PlanarPoint::new(x, y)).unwrap();
        let nodes = [at(0.0, 0.0), at(100.0, 0.0), at(200.0, 0.0), at(0.0, 100.0), at(200.0, 100.0)];
        (g, nodes)
    }
}

// ── Builder & graph structure ─────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use sr_core::{PlanarPoint, SegmentId};

    use super::helpers::{grid_graph, grid_segments, seg};
    use crate::{build_graph, shortest_path_cost, GraphBuilder, GraphError, Segment};

    #[test]
    fn empty_source_is_fatal() {
        let result = build_graph(std::iter::empty::<&Segment>());
        assert!(matches!(result, Err(GraphError::EmptyGraph { skipped: 0 })));
    }

    #[test]
    fn only_endpoints_become_nodes() {
        let s = Segment::new(
            SegmentId(7),
            vec![
                PlanarPoint::new(0.0, 0.0),
                PlanarPoint::new(3.0, 4.0),
                PlanarPoint::new(3.0, 10.0),
                PlanarPoint::new(9.0, 18.0),
            ],
        );
        let g = build_graph(&[s]).unwrap();
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);
        // 5 + 6 + 10
        assert_eq!(g.edges[0].weight, 21.0);
        assert_eq!(g.edges[0].segment, SegmentId(7));
        assert!(g.node_at(PlanarPoint::new(3.0, 4.0)).is_none());
    }

    #[test]
    fn explicit_length_overrides_geometry() {
        let g = build_graph(&[seg(1, (0.0, 0.0), (3.0, 4.0), 42.0)]).unwrap();
        assert_eq!(g.edges[0].weight, 42.0);
    }

    #[test]
    fn shared_endpoints_connect() {
        let (g, [n0, n1, n2, n3, n4]) = grid_graph();
        assert_eq!(g.node_count(), 5);
        assert_eq!(g.edge_count(), 5);
        assert_eq!(g.degree(n0), 2);
        assert_eq!(g.degree(n1), 2);
        assert_eq!(g.degree(n2), 2);
        assert_eq!(g.degree(n3), 2);
        assert_eq!(g.degree(n4), 2);
    }

    #[test]
    fn degenerate_segments_are_skipped() {
        let short = Segment::new(SegmentId(1), vec![PlanarPoint::new(0.0, 0.0)]);
        let nan = Segment::new(
            SegmentId(2),
            vec![PlanarPoint::new(f64::NAN, 0.0), PlanarPoint::new(1.0, 0.0)],
        );
        let good = seg(3, (0.0, 0.0), (1.0, 0.0), 1.0);

        let mut b = GraphBuilder::new();
        assert!(matches!(b.add_segment(&short), Err(GraphError::DegenerateSegment { .. })));
        assert!(matches!(b.add_segment(&nan), Err(GraphError::DegenerateSegment { .. })));
        assert_eq!(b.node_count(), 0, "failed segments must not leave nodes behind");

        let g = build_graph(&[short, nan, good]).unwrap();
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.edges[0].segment, SegmentId(3));
    }

    #[test]
    fn invalid_lengths_are_rejected() {
        let mut b = GraphBuilder::new();
        let negative = seg(1, (0.0, 0.0), (1.0, 0.0), -1.0);
        let infinite = seg(2, (0.0, 0.0), (1.0, 0.0), f64::INFINITY);
        assert!(matches!(b.add_segment(&negative), Err(GraphError::InvalidLength { .. })));
        assert!(matches!(b.add_segment(&infinite), Err(GraphError::InvalidLength { .. })));

        let result = build_graph(&[negative, infinite]);
        assert!(matches!(result, Err(GraphError::EmptyGraph { skipped: 2 })));
    }

    #[test]
    fn duplicate_pair_last_write_wins() {
        let first = seg(10, (0.0, 0.0), (5.0, 0.0), 8.0);
        // Same pair, reversed direction.
        let second = seg(11, (5.0, 0.0), (0.0, 0.0), 6.0).with_speed(30.0);

        let mut b = GraphBuilder::new();
        let e1 = b.add_segment(&first).unwrap();
        let e2 = b.add_segment(&second).unwrap();
        assert_eq!(e1, e2);
        assert_eq!(b.replaced_count(), 1);

        let g = b.build();
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.edges[0].weight, 6.0);
        assert_eq!(g.edges[0].segment, SegmentId(11));
        assert_eq!(g.edges[0].speed, Some(30.0));
    }

    #[test]
    fn negative_zero_is_the_same_node() {
        let a = seg(1, (0.0, 0.0), (1.0, 0.0), 1.0);
        let b = seg(2, (-0.0, -0.0), (0.0, 1.0), 1.0);
        let g = build_graph(&[a, b]).unwrap();
        assert_eq!(g.node_count(), 3);
    }

    #[test]
    fn self_loop_counts_twice() {
        let lp = seg(1, (2.0, 2.0), (2.0, 2.0), 12.0);
        let g = build_graph(&[lp]).unwrap();
        let n = g.node_at(PlanarPoint::new(2.0, 2.0)).unwrap();
        assert_eq!(g.node_count(), 1);
        assert_eq!(g.degree(n), 2);
    }

    #[test]
    fn out_of_range_ids_are_guarded_by_checked_accessors() {
        let (g, nodes) = grid_graph();
        let stray = sr_core::NodeId(g.node_count() as u32);
        assert!(!g.contains(stray));
        assert_eq!(g.position(stray), None);
        assert_eq!(g.edge_between(stray, nodes[0]), None);
    }

    #[test]
    #[should_panic]
    fn degree_panics_on_stray_node() {
        let (g, _) = grid_graph();
        g.degree(sr_core::NodeId(g.node_count() as u32));
    }

    #[test]
    #[should_panic]
    fn edge_panics_on_stray_id() {
        let (g, _) = grid_graph();
        g.edge(sr_core::EdgeId(g.edge_count() as u32));
    }

    #[test]
    fn edges_are_symmetric() {
        let (g, _) = grid_graph();
        for (i, e) in g.edges.iter().enumerate() {
            let forward = g.edge_between(e.a, e.b);
            let backward = g.edge_between(e.b, e.a);
            assert_eq!(forward, backward);
            assert_eq!(forward.map(|id| id.index()), Some(i));
            assert_eq!(
                shortest_path_cost(&g, e.a, e.b).unwrap(),
                shortest_path_cost(&g, e.b, e.a).unwrap()
            );
        }
    }

    #[test]
    fn rebuild_is_idempotent() {
        let (a, _) = grid_graph();
        let (b, _) = grid_graph();
        assert_eq!(a.node_pos, b.node_pos);
        assert_eq!(a.edges, b.edges);
        assert_eq!(a.adj_start, b.adj_start);
        assert_eq!(a.adj_node, b.adj_node);
        assert_eq!(a.adj_edge, b.adj_edge);

        let segments = grid_segments();
        let c = build_graph(&segments).unwrap();
        let d = build_graph(&segments).unwrap();
        for from in 0..c.node_count() as u32 {
            for to in 0..c.node_count() as u32 {
                let (from, to) = (sr_core::NodeId(from), sr_core::NodeId(to));
                assert_eq!(
                    crate::shortest_path(&c, from, to).unwrap(),
                    crate::shortest_path(&d, from, to).unwrap()
                );
            }
        }
    }
}

// ── Spatial index ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod snap {
    use sr_core::{NodeId, PlanarPoint};

    use super::helpers::grid_graph;
    use crate::{GraphError, SpatialIndex};

    #[test]
    fn every_node_snaps_to_itself() {
        let (g, _) = grid_graph();
        let idx = SpatialIndex::from_graph(&g);
        assert_eq!(idx.len(), g.node_count());
        for (i, &p) in g.node_pos.iter().enumerate() {
            let (node, dist) = idx.nearest(p).unwrap();
            assert_eq!(node, NodeId(i as u32));
            assert_eq!(dist, 0.0);
        }
    }

    #[test]
    fn single_node_distance() {
        let idx = SpatialIndex::build([(NodeId(0), PlanarPoint::new(0.0, 0.0))]);
        let (node, dist) = idx.nearest(PlanarPoint::new(3.0, 4.0)).unwrap();
        assert_eq!(node, NodeId(0));
        assert_eq!(dist, 5.0);
    }

    #[test]
    fn nearest_picks_closer_node() {
        let (g, [n0, n1, ..]) = grid_graph();
        let idx = SpatialIndex::from_graph(&g);
        assert_eq!(idx.nearest(PlanarPoint::new(40.0, 1.0)).unwrap().0, n0);
        assert_eq!(idx.nearest(PlanarPoint::new(60.0, 1.0)).unwrap().0, n1);
    }

    #[test]
    fn empty_index_is_not_found() {
        let idx = SpatialIndex::build(std::iter::empty::<(NodeId, PlanarPoint)>());
        assert!(idx.is_empty());
        assert!(matches!(
            idx.nearest(PlanarPoint::new(0.0, 0.0)),
            Err(GraphError::EmptyIndex)
        ));
    }

    #[test]
    fn k_nearest_order() {
        let (g, [n0, n1, _, n3, _]) = grid_graph();
        let idx = SpatialIndex::from_graph(&g);
        let nearest = idx.k_nearest(PlanarPoint::new(0.0, 0.0), 3);
        assert_eq!(nearest.len(), 3);
        assert_eq!(nearest[0], (n0, 0.0));
        // n1 and n3 are both 100 away; either order is valid.
        let rest = [nearest[1].0, nearest[2].0];
        assert!(rest.contains(&n1) && rest.contains(&n3));
        assert_eq!(nearest[1].1, 100.0);
    }
}

// ── Dijkstra routing ──────────────────────────────────────────────────────────

#[cfg(test)]
mod routing {
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use sr_core::{NodeId, PlanarPoint, SegmentId};

    use super::helpers::{grid_graph, seg};
    use crate::{
        build_graph, shortest_path, shortest_path_cost, DijkstraRouter, GraphError, Router,
        SearchLimits,
    };

    #[test]
    fn detour_beats_expensive_direct_edge() {
        // A–B 10, B–C 5, A–C 20.
        let g = build_graph(&[
            seg(1, (0.0, 0.0), (10.0, 0.0), 10.0),
            seg(2, (10.0, 0.0), (10.0, 5.0), 5.0),
            seg(3, (0.0, 0.0), (10.0, 5.0), 20.0),
        ])
        .unwrap();
        let a = g.node_at(PlanarPoint::new(0.0, 0.0)).unwrap();
        let b = g.node_at(PlanarPoint::new(10.0, 0.0)).unwrap();
        let c = g.node_at(PlanarPoint::new(10.0, 5.0)).unwrap();

        let path = shortest_path(&g, a, c).unwrap();
        assert_eq!(path.nodes, vec![a, b, c]);
        assert_eq!(path.segments, vec![SegmentId(1), SegmentId(2)]);
        assert_eq!(path.total_cost, 15.0);
    }

    #[test]
    fn trivial_same_node() {
        let (g, [n0, ..]) = grid_graph();
        let path = shortest_path(&g, n0, n0).unwrap();
        assert!(path.is_trivial());
        assert_eq!(path.nodes, vec![n0]);
        assert_eq!(path.total_cost, 0.0);
    }

    #[test]
    fn shortest_path_correct() {
        let (g, [n0, n1, n2, _, n4]) = grid_graph();
        let path = DijkstraRouter.route(&g, n0, n4, &SearchLimits::none()).unwrap();
        assert_eq!(path.nodes, vec![n0, n1, n2, n4]);
        assert_eq!(path.edges.len(), 3);
        assert_eq!(path.total_cost, 300.0);
    }

    #[test]
    fn total_cost_is_sum_of_edge_weights() {
        let (g, nodes) = grid_graph();
        for &from in &nodes {
            for &to in &nodes {
                let path = shortest_path(&g, from, to).unwrap();
                assert_eq!(path.nodes.len(), path.edges.len() + 1);
                let mut sum = 0.0;
                for (pair, &edge) in path.nodes.windows(2).zip(&path.edges) {
                    assert_eq!(g.edge_between(pair[0], pair[1]), Some(edge));
                    sum += g.edge(edge).weight;
                }
                assert_eq!(path.total_cost, sum);
            }
        }
    }

    #[test]
    fn cost_is_symmetric() {
        let (g, nodes) = grid_graph();
        for &a in &nodes {
            for &b in &nodes {
                assert_eq!(
                    shortest_path_cost(&g, a, b).unwrap(),
                    shortest_path_cost(&g, b, a).unwrap()
                );
            }
        }
    }

    #[test]
    fn no_path_between_components() {
        let g = build_graph(&[
            seg(1, (0.0, 0.0), (1.0, 0.0), 1.0),
            seg(2, (50.0, 50.0), (51.0, 50.0), 1.0),
        ])
        .unwrap();
        let a = g.node_at(PlanarPoint::new(0.0, 0.0)).unwrap();
        let d = g.node_at(PlanarPoint::new(51.0, 50.0)).unwrap();
        assert!(matches!(shortest_path(&g, a, d), Err(GraphError::NoPathFound { .. })));
        assert!(matches!(shortest_path_cost(&g, d, a), Err(GraphError::NoPathFound { .. })));
    }

    #[test]
    fn unknown_node_is_reported() {
        let (g, [n0, ..]) = grid_graph();
        assert!(matches!(
            shortest_path(&g, n0, NodeId(99)),
            Err(GraphError::NodeNotFound(NodeId(99)))
        ));
    }

    #[test]
    fn speed_does_not_affect_cost() {
        // Short slow road against long fast road: the short one wins.
        let g = build_graph(&[
            seg(1, (0.0, 0.0), (10.0, 0.0), 10.0).with_speed(10.0),
            seg(2, (0.0, 0.0), (0.0, 10.0), 30.0).with_speed(100.0),
            seg(3, (0.0, 10.0), (10.0, 0.0), 30.0).with_speed(100.0),
        ])
        .unwrap();
        let a = g.node_at(PlanarPoint::new(0.0, 0.0)).unwrap();
        let b = g.node_at(PlanarPoint::new(10.0, 0.0)).unwrap();
        let path = shortest_path(&g, a, b).unwrap();
        assert_eq!(path.segments, vec![SegmentId(1)]);
        assert_eq!(path.total_cost, 10.0);
    }

    #[test]
    fn cancelled_search_stops() {
        let (g, [n0, _, _, _, n4]) = grid_graph();
        let flag = Arc::new(AtomicBool::new(true));
        let limits = SearchLimits::none().cancel_on(flag);
        assert!(matches!(
            DijkstraRouter.route(&g, n0, n4, &limits),
            Err(GraphError::Cancelled)
        ));
    }

    #[test]
    fn expired_deadline_times_out() {
        let (g, [n0, _, _, _, n4]) = grid_graph();
        let limits = SearchLimits { deadline: Some(Instant::now()), cancel: None };
        assert!(matches!(
            DijkstraRouter.route(&g, n0, n4, &limits),
            Err(GraphError::TimedOut)
        ));
        // A generous deadline does not interfere.
        let limits = SearchLimits::with_timeout(Duration::from_secs(60));
        assert!(DijkstraRouter.route(&g, n0, n4, &limits).is_ok());
    }

    #[test]
    fn long_chain_polls_limits_mid_search() {
        // Enough nodes that the loop reaches the periodic check.
        let segments: Vec<_> = (0..3_000)
            .map(|i| seg(i as u64, (i as f64, 0.0), (i as f64 + 1.0, 0.0), 1.0))
            .collect();
        let g = build_graph(&segments).unwrap();
        let a = g.node_at(PlanarPoint::new(0.0, 0.0)).unwrap();
        let z = g.node_at(PlanarPoint::new(3_000.0, 0.0)).unwrap();

        let path = shortest_path(&g, a, z).unwrap();
        assert_eq!(path.total_cost, 3_000.0);
        assert_eq!(path.edges.len(), 3_000);
    }
}

// ── CSV loader ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use std::io::{Cursor, Write};

    use sr_core::{PlanarPoint, SegmentId};

    use crate::loader::parse_linestring;
    use crate::{build_graph, load_segments_csv, load_segments_reader, GraphError, SegmentCatalog};

    const SEGMENTS_CSV: &str = "\
segment_id,length,speed,geometry\n\
1201,,50,\"LINESTRING (0 0, 3 4)\"\n\
1202,87.5,,\"3 4, 10 4, 10 10\"\n\
1203,,,\"LINESTRING Z (10 10 5.0, 20 10 5.0)\"\n\
1204,,,\"LINESTRING (oops)\"\n\
";

    #[test]
    fn parses_rows_and_optional_columns() {
        let segments = load_segments_reader(Cursor::new(SEGMENTS_CSV)).unwrap();
        // Row 1204 has unparseable geometry and is skipped.
        assert_eq!(segments.len(), 3);

        assert_eq!(segments[0].id, SegmentId(1201));
        assert_eq!(segments[0].length, None);
        assert_eq!(segments[0].speed, Some(50.0));
        assert_eq!(segments[0].weight(), 5.0);

        assert_eq!(segments[1].length, Some(87.5));
        assert_eq!(segments[1].speed, None);
        assert_eq!(segments[1].vertices.len(), 3);

        assert_eq!(
            segments[2].vertices,
            vec![PlanarPoint::new(10.0, 10.0), PlanarPoint::new(20.0, 10.0)]
        );

        let g = build_graph(&segments).unwrap();
        assert_eq!(g.node_count(), 4);
        assert_eq!(g.edge_count(), 3);
    }

    #[test]
    fn malformed_row_is_an_error() {
        let csv = "segment_id,length,speed,geometry\nabc,,,\"0 0, 1 1\"\n";
        assert!(matches!(
            load_segments_reader(Cursor::new(csv)),
            Err(GraphError::Parse(_))
        ));
    }

    #[test]
    fn linestring_variants() {
        assert_eq!(parse_linestring("LINESTRING EMPTY").unwrap(), vec![]);
        assert_eq!(parse_linestring("  ").unwrap(), vec![]);
        assert_eq!(
            parse_linestring("LineString(1 2,3 4)").unwrap(),
            vec![PlanarPoint::new(1.0, 2.0), PlanarPoint::new(3.0, 4.0)]
        );
        assert!(parse_linestring("LINESTRING (1 2, 3 4").is_err());
        assert!(parse_linestring("POINT (1 2)").is_err());
        assert!(parse_linestring("1 2, 3").is_err());
    }

    #[test]
    fn extra_ordinates_are_dropped() {
        let flat = vec![PlanarPoint::new(0.0, 0.0), PlanarPoint::new(1.0, 1.0)];
        assert_eq!(parse_linestring("LINESTRING Z (0 0 5, 1 1 5)").unwrap(), flat);
        assert_eq!(parse_linestring("LINESTRING M (0 0 7, 1 1 8)").unwrap(), flat);
        assert_eq!(parse_linestring("LINESTRING ZM (0 0 5 7, 1 1 5 8)").unwrap(), flat);
    }

    #[test]
    fn loads_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SEGMENTS_CSV.as_bytes()).unwrap();
        let segments = load_segments_csv(file.path()).unwrap();
        assert_eq!(segments.len(), 3);
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = load_segments_csv(std::path::Path::new("/nonexistent/segments.csv"));
        assert!(matches!(result, Err(GraphError::Io(_))));
    }

    #[test]
    fn catalog_keeps_full_geometry() {
        let segments = load_segments_reader(Cursor::new(SEGMENTS_CSV)).unwrap();
        let catalog = SegmentCatalog::from_segments(&segments);
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get(SegmentId(1202)).map(<[_]>::len), Some(3));
        assert!(catalog.get(SegmentId(1204)).is_none());
    }
}
