use approx::abs_diff_eq;

/// Identifies a junction node (tower node) of the road graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Identifies an undirected edge of the road graph.
/// The same edge is traversed in two directions; see [`EdgeKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EdgeId(pub u32);

/// Identifies a directed edge traversal: `2 * edge + direction bit`.
/// Every edge owns two keys, one per traversal direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EdgeKey(u32);

impl EdgeKey {
    pub const fn new(edge: EdgeId, reversed: bool) -> Self {
        Self(2 * edge.0 + reversed as u32)
    }

    pub const fn edge(&self) -> EdgeId {
        EdgeId(self.0 / 2)
    }

    pub const fn is_reversed(&self) -> bool {
        self.0 % 2 == 1
    }

    pub const fn value(&self) -> u32 {
        self.0
    }
}

/// A WGS84 latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, Default)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        const EPSILON: f64 = 1e-7;
        abs_diff_eq!(self.lat, other.lat, epsilon = EPSILON)
            && abs_diff_eq!(self.lon, other.lon, epsilon = EPSILON)
    }
}

/// Road classification of an edge, by decreasing importance.
/// Only the motorway/trunk distinction influences instruction synthesis
/// (motorway forks through link edges are not announced); the remaining
/// variants are carried through for callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum RoadClass {
    Motorway = 0,
    Trunk = 1,
    Primary = 2,
    Secondary = 3,
    Tertiary = 4,
    Residential = 5,
    Unclassified = 6,
    Service = 7,
    /// Anything the import pipeline could not classify.
    Other = 8,
}

impl RoadClass {
    /// True for the grade-separated classes where forks are signposted
    /// and ramp handling replaces turn instructions.
    pub const fn is_major_highway(&self) -> bool {
        matches!(self, Self::Motorway | Self::Trunk)
    }
}

impl Default for RoadClass {
    fn default() -> Self {
        Self::Other
    }
}

/// Physical environment an edge runs through.
/// Ferry transitions produce their own instructions; the other variants
/// are passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum RoadEnvironment {
    Road = 0,
    Ferry = 1,
    Tunnel = 2,
    Bridge = 3,
    Ford = 4,
    Other = 5,
}

impl RoadEnvironment {
    pub const fn is_ferry(&self) -> bool {
        matches!(self, Self::Ferry)
    }
}

impl Default for RoadEnvironment {
    fn default() -> Self {
        Self::Road
    }
}
