//! In-memory road graph fixture implementing the [`RoadGraph`] façade,
//! plus a small node-based Dijkstra to derive the paths the synthesizer
//! consumes. Only compiled into the test binaries.
#![allow(dead_code)]

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use waysign::{
    Coordinate, DirectedEdge, EdgeId, EdgeKey, EnUs, InstructionList, NodeId, Path, RoadClass,
    RoadEnvironment, RoadGraph, SptEntry, Translation, Weighting, extract_path,
};

#[derive(Debug, Clone)]
pub struct StoredEdge {
    nodes: [NodeId; 2],
    distance: f64,
    geometry: Vec<Coordinate>,
    name: String,
    road_class: RoadClass,
    link: bool,
    environment: RoadEnvironment,
    roundabout: bool,
    speed: (f64, f64),
    access: (bool, bool),
}

impl StoredEdge {
    pub fn distance(&mut self, meters: f64) -> &mut Self {
        self.distance = meters;
        self
    }

    pub fn name(&mut self, name: &str) -> &mut Self {
        self.name = name.to_string();
        self
    }

    /// Pillar points as `(lat, lon)` pairs, in stored direction.
    pub fn geometry(&mut self, pillars: &[(f64, f64)]) -> &mut Self {
        self.geometry = pillars.iter().map(|&(lat, lon)| Coordinate::new(lat, lon)).collect();
        self
    }

    /// Speeds in meters per second, stored direction first.
    pub fn speed(&mut self, forward: f64, backward: f64) -> &mut Self {
        self.speed = (forward, backward);
        self
    }

    pub fn access(&mut self, forward: bool, backward: bool) -> &mut Self {
        self.access = (forward, backward);
        self
    }

    pub fn road_class(&mut self, road_class: RoadClass) -> &mut Self {
        self.road_class = road_class;
        self
    }

    pub fn link(&mut self, link: bool) -> &mut Self {
        self.link = link;
        self
    }

    pub fn environment(&mut self, environment: RoadEnvironment) -> &mut Self {
        self.environment = environment;
        self
    }

    pub fn roundabout(&mut self, roundabout: bool) -> &mut Self {
        self.roundabout = roundabout;
        self
    }
}

#[derive(Debug, Default)]
pub struct MemoryGraph {
    nodes: Vec<Coordinate>,
    edges: Vec<StoredEdge>,
    adjacency: Vec<Vec<u32>>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_node(&mut self, id: u32, lat: f64, lon: f64) {
        let index = id as usize;
        if self.nodes.len() <= index {
            self.nodes.resize(index + 1, Coordinate::default());
            self.adjacency.resize(index + 1, vec![]);
        }
        self.nodes[index] = Coordinate::new(lat, lon);
    }

    pub fn add_edge(&mut self, from: u32, to: u32) -> &mut StoredEdge {
        let id = self.edges.len() as u32;
        self.adjacency[from as usize].push(id);
        self.adjacency[to as usize].push(id);
        self.edges.push(StoredEdge {
            nodes: [NodeId(from), NodeId(to)],
            distance: 0.0,
            geometry: vec![],
            name: String::new(),
            road_class: RoadClass::default(),
            link: false,
            environment: RoadEnvironment::default(),
            roundabout: false,
            speed: (0.0, 0.0),
            access: (true, true),
        });
        self.edges.last_mut().expect("just pushed")
    }

    fn view(&self, id: EdgeId, reversed: bool) -> DirectedEdge {
        let stored = &self.edges[id.0 as usize];
        let [a, b] = stored.nodes;
        let (base, adj) = if reversed { (b, a) } else { (a, b) };
        let geometry = if reversed {
            stored.geometry.iter().rev().copied().collect()
        } else {
            stored.geometry.clone()
        };
        let (speed_forward, speed_backward) = if reversed {
            (stored.speed.1, stored.speed.0)
        } else {
            stored.speed
        };
        let (access_forward, access_backward) = if reversed {
            (stored.access.1, stored.access.0)
        } else {
            stored.access
        };
        DirectedEdge {
            edge: id,
            key: EdgeKey::new(id, reversed),
            base,
            adj,
            distance: stored.distance,
            geometry,
            name: stored.name.clone(),
            road_class: stored.road_class,
            road_class_link: stored.link,
            road_environment: stored.environment,
            roundabout: stored.roundabout,
            speed_forward,
            speed_backward,
            access_forward,
            access_backward,
        }
    }
}

impl RoadGraph for MemoryGraph {
    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn coordinate(&self, node: NodeId) -> Option<Coordinate> {
        self.nodes.get(node.index()).copied()
    }

    fn edges_from(&self, node: NodeId) -> impl Iterator<Item = DirectedEdge> {
        self.adjacency
            .get(node.index())
            .into_iter()
            .flatten()
            .map(move |&id| {
                let reversed = self.edges[id as usize].nodes[0] != node;
                self.view(EdgeId(id), reversed)
            })
    }

    fn directed_edge(&self, edge: EdgeId, base: NodeId) -> Option<DirectedEdge> {
        let stored = self.edges.get(edge.0 as usize)?;
        if stored.nodes[0] == base {
            Some(self.view(edge, false))
        } else if stored.nodes[1] == base {
            Some(self.view(edge, true))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct HeapElement {
    weight: f64,
    node: NodeId,
}

impl Eq for HeapElement {}

// The priority queue depends on the implementation of the Ord trait.
// By default std::BinaryHeap is a max heap.
// Explicitly implement the trait so the queue becomes a min heap.
impl Ord for HeapElement {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .weight
            .total_cmp(&self.weight)
            // breaking ties in a deterministic way
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for HeapElement {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Node-based Dijkstra over the fixture graph, returning the predecessor
/// chain the synthesizer consumes. None when the destination is
/// unreachable under the weighting.
pub fn shortest_path<W: Weighting>(
    graph: &MemoryGraph,
    weighting: &W,
    from: u32,
    to: u32,
) -> Option<SptEntry> {
    let origin = NodeId(from);
    let destination = NodeId(to);

    let mut shortest: HashMap<NodeId, f64> = HashMap::from([(origin, 0.0)]);
    let mut previous: HashMap<NodeId, (EdgeId, NodeId)> = HashMap::new();
    let mut frontier = BinaryHeap::from([HeapElement {
        weight: 0.0,
        node: origin,
    }]);

    while let Some(element) = frontier.pop() {
        if element.node == destination {
            break;
        }
        if element.weight > *shortest.get(&element.node).unwrap_or(&f64::INFINITY) {
            continue;
        }

        for edge in graph.edges_from(element.node) {
            let edge_weight = weighting.edge_weight(&edge, false);
            if !edge_weight.is_finite() {
                continue;
            }
            let weight = element.weight + edge_weight;
            if weight < *shortest.get(&edge.adj).unwrap_or(&f64::INFINITY) {
                shortest.insert(edge.adj, weight);
                previous.insert(edge.adj, (edge.edge, element.node));
                frontier.push(HeapElement {
                    weight,
                    node: edge.adj,
                });
            }
        }
    }

    if from != to && !previous.contains_key(&destination) {
        return None;
    }

    let mut hops = vec![];
    let mut node = destination;
    while let Some(&(edge, prev)) = previous.get(&node) {
        hops.push((edge, node));
        node = prev;
    }
    hops.reverse();

    let mut entry = SptEntry::root(origin);
    for (edge, node) in hops {
        let weight = shortest[&node];
        entry = SptEntry::new(edge, node, weight, entry);
    }
    Some(entry)
}

/// Routes and extracts in one go; panics on unroutable pairs, fixtures
/// are expected to be connected.
pub fn route<W: Weighting>(graph: &MemoryGraph, weighting: &W, from: u32, to: u32) -> Path {
    let entry = shortest_path(graph, weighting, from, to)
        .unwrap_or_else(|| panic!("no route {from} -> {to}"));
    extract_path(graph, weighting, &entry).expect("extractable path")
}

pub fn node_ids(path: &Path) -> Vec<u32> {
    path.calc_nodes().iter().map(|n| n.0).collect()
}

pub fn descriptions(instructions: &InstructionList) -> Vec<String> {
    instructions.iter().map(|i| EnUs.describe(i)).collect()
}

/// Variations of the shared junction/roundabout fixture.
///
/// ```text
///                                        18
///       8                 14              |
///        \                 |      / 16 - 17
///          5              12 - 13          \-- 19
///        /  \              |      \ 15
///   1 - 2    4 - 7 - 10 - 11
///        \  /
///         3
///         | \
///         6 [ 9 ]  edge 3-9 is closed unless opened
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MixedConfig {
    /// Ring runs clockwise instead of the default counter-clockwise.
    pub clockwise: bool,
    /// Opens the one-way branch 3 -> 9.
    pub open_3_9: bool,
    /// Flips 3-6 to one-way into the ring.
    pub invert_3_6: bool,
}

pub fn mixed_graph(config: MixedConfig) -> MemoryGraph {
    let mut g = MemoryGraph::new();
    g.set_node(0, 52.512, 13.347);
    g.set_node(1, 52.514, 13.348);
    g.set_node(2, 52.514, 13.349);
    g.set_node(3, 52.5135, 13.35);
    g.set_node(4, 52.514, 13.351);
    g.set_node(5, 52.5145, 13.351);
    g.set_node(6, 52.513, 13.35);
    g.set_node(7, 52.514, 13.352);
    g.set_node(8, 52.515, 13.351);
    g.set_node(9, 52.513, 13.351);
    g.set_node(10, 52.514, 13.353);
    g.set_node(11, 52.514, 13.354);
    g.set_node(12, 52.515, 13.354);
    g.set_node(13, 52.515, 13.355);
    g.set_node(14, 52.516, 13.354);
    g.set_node(15, 52.516, 13.360);
    g.set_node(16, 52.514, 13.360);
    g.set_node(17, 52.514, 13.361);
    g.set_node(18, 52.513, 13.361);
    g.set_node(19, 52.515, 13.368);

    let ring_speed = if config.clockwise { (70.0, 0.0) } else { (0.0, 70.0) };
    for (from, to, name) in [(3, 2, "2-3"), (4, 3, "3-4"), (5, 4, "4-5"), (2, 5, "5-2")] {
        g.add_edge(from, to)
            .distance(5.0)
            .name(name)
            .speed(ring_speed.0, ring_speed.1)
            .roundabout(true);
    }

    g.add_edge(1, 2).distance(5.0).name("MainStreet 1 2").speed(70.0, 70.0);
    g.add_edge(4, 7).distance(5.0).name("MainStreet 4 7").speed(70.0, 70.0);
    g.add_edge(5, 8).distance(5.0).name("5-8").speed(70.0, 70.0);

    let speed_3_6 = if config.invert_3_6 { (0.0, 70.0) } else { (70.0, 70.0) };
    g.add_edge(3, 6).distance(5.0).name("3-6").speed(speed_3_6.0, speed_3_6.1);
    let speed_3_9 = if config.open_3_9 { (70.0, 0.0) } else { (0.0, 0.0) };
    g.add_edge(3, 9).distance(5.0).name("3-9").speed(speed_3_9.0, speed_3_9.1);

    for (from, to) in [
        (7, 10),
        (10, 11),
        (11, 12),
        (12, 13),
        (12, 14),
        (13, 15),
        (13, 16),
        (16, 17),
        (17, 18),
        (17, 19),
    ] {
        g.add_edge(from, to).distance(5.0).speed(70.0, 70.0);
    }
    g
}

/// Fixture for the path-detail extractor: four normal edges and one
/// sub-meter edge behind node 5.
pub fn path_detail_graph() -> MemoryGraph {
    let mut g = MemoryGraph::new();
    g.set_node(0, 52.513, 13.347);
    g.set_node(1, 52.514, 13.348);
    g.set_node(2, 52.514, 13.349);
    g.set_node(3, 52.514, 13.350);
    g.set_node(4, 52.515, 13.349);
    g.set_node(5, 52.516, 13.3452);
    g.set_node(6, 52.516, 13.344);

    g.add_edge(1, 2).distance(5.0).name("1-2").speed(45.0, 45.0);
    g.add_edge(4, 5).distance(5.0).name("4-5").speed(45.0, 45.0);
    g.add_edge(2, 3).distance(5.0).name("2-3").speed(90.0, 90.0);
    g.add_edge(3, 4).distance(10.0).name("3-4").speed(10.0, 10.0);
    g.add_edge(5, 6).distance(0.001).name("3-4").speed(10.0, 10.0);
    g
}
