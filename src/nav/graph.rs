//! The building's waypoint graph.
//!
//! DESIGN
//! ======
//! A static undirected graph over corridor waypoints and room doors,
//! built once at startup. Nodes live in a vector and edges in an
//! index-based adjacency list; string IDs map to indices through a side
//! table, so the planner works on plain `usize` handles. Edge weights
//! are Euclidean pixel distances.
//!
//! The alias table routes the many names a destination can arrive under
//! (numeric room codes, Turkish and English labels, raw node IDs) to one
//! node.

use std::collections::HashMap;

use crate::geometry::Point;

/// A graph node: corridor intersection, room door, or landmark.
#[derive(Debug, Clone)]
pub struct Waypoint {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub display_name: String,
}

impl Waypoint {
    #[must_use]
    pub fn location(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Static undirected weighted waypoint graph plus destination aliases.
pub struct RouteGraph {
    nodes: Vec<Waypoint>,
    /// adjacency[i] = [(neighbor index, pixel distance), ...]
    adjacency: Vec<Vec<(usize, f64)>>,
    index_by_id: HashMap<String, usize>,
    /// Destination alias (lowercase) → node id.
    aliases: HashMap<&'static str, &'static str>,
}

impl RouteGraph {
    fn new() -> Self {
        Self {
            nodes: Vec::new(),
            adjacency: Vec::new(),
            index_by_id: HashMap::new(),
            aliases: HashMap::new(),
        }
    }

    fn add_node(&mut self, id: &str, x: f64, y: f64, display_name: &str) {
        let index = self.nodes.len();
        self.index_by_id.insert(id.to_string(), index);
        self.nodes.push(Waypoint {
            id: id.to_string(),
            x,
            y,
            display_name: display_name.to_string(),
        });
        self.adjacency.push(Vec::new());
    }

    fn connect(&mut self, a: &str, b: &str) {
        let (Some(&ia), Some(&ib)) = (self.index_by_id.get(a), self.index_by_id.get(b)) else {
            return;
        };
        let distance = self.nodes[ia].location().distance_to(self.nodes[ib].location());
        self.adjacency[ia].push((ib, distance));
        self.adjacency[ib].push((ia, distance));
    }

    #[must_use]
    pub fn node(&self, index: usize) -> &Waypoint {
        &self.nodes[index]
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn neighbors(&self, index: usize) -> &[(usize, f64)] {
        &self.adjacency[index]
    }

    /// Index of the node nearest to `p`, or `None` on an empty graph.
    #[must_use]
    pub fn closest_node(&self, p: Point) -> Option<usize> {
        self.nodes
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                p.distance_to(a.location()).total_cmp(&p.distance_to(b.location()))
            })
            .map(|(index, _)| index)
    }

    /// Resolve a requested destination to a node index.
    ///
    /// Tried in order: alias table (lowercased, trimmed), direct node ID,
    /// case-insensitive substring of a display name.
    #[must_use]
    pub fn resolve_target(&self, target: &str) -> Option<usize> {
        let normalized = target.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }

        if let Some(node_id) = self.aliases.get(normalized.as_str()) {
            return self.index_by_id.get(*node_id).copied();
        }

        if let Some(&index) = self.index_by_id.get(&normalized) {
            return Some(index);
        }

        self.nodes
            .iter()
            .position(|node| node.display_name.to_lowercase().contains(&normalized))
    }

    /// Destinations a client can route to: rooms, landmarks, stairs, WCs.
    #[must_use]
    pub fn routable_destinations(&self) -> Vec<&Waypoint> {
        self.nodes
            .iter()
            .filter(|node| {
                node.id.starts_with("room-")
                    || node.id.starts_with("wc")
                    || node.id.starts_with("stairs")
                    || node.id == "entrance"
                    || node.id == "yemekhane"
            })
            .collect()
    }

    /// The surveyed floor graph: main and left corridor waypoints, both
    /// room rows, and the left-wing landmarks. Coordinates in pixels,
    /// 18 px = 1 m.
    #[must_use]
    pub fn building_graph() -> Self {
        let mut g = Self::new();

        // Main corridor spine (centre line y=225).
        g.add_node("corridor-w1", 245.0, 225.0, "Koridor Kavşak");
        g.add_node("corridor-w2", 360.0, 225.0, "Koridor 141-160");
        g.add_node("corridor-w3", 490.0, 225.0, "Koridor 142-159");
        g.add_node("corridor-w4", 630.0, 225.0, "Koridor 143-158");
        g.add_node("corridor-w5", 760.0, 225.0, "Koridor 144-157");
        g.add_node("corridor-w6", 870.0, 225.0, "Koridor Merdiven-1");
        g.add_node("corridor-w7", 1000.0, 225.0, "Koridor 146-156");
        g.add_node("corridor-w8", 1175.0, 225.0, "Koridor 147-155");
        g.add_node("corridor-w9", 1310.0, 225.0, "Koridor 148-WC");
        g.add_node("corridor-w10", 1430.0, 225.0, "Koridor 149-151");
        g.add_node("corridor-w11", 1575.0, 225.0, "Koridor 150-131");

        // Left corridor spine (centre line x=245).
        g.add_node("left-w1", 245.0, 345.0, "Sol Koridor Üst");
        g.add_node("left-w2", 245.0, 435.0, "Sol Koridor Orta");
        g.add_node("left-w3", 245.0, 540.0, "Sol Koridor Alt");
        g.add_node("left-w4", 245.0, 695.0, "Giriş");

        // North room row.
        g.add_node("room-161", 250.0, 110.0, "TTO Ofisi");
        g.add_node("room-160", 370.0, 110.0, "Derslik 160");
        g.add_node("room-159", 500.0, 110.0, "Derslik 159");
        g.add_node("room-158", 630.0, 110.0, "Derslik 158");
        g.add_node("room-157", 760.0, 110.0, "Derslik 157");
        g.add_node("stairs-1", 870.0, 110.0, "Merdiven 1");
        g.add_node("room-156", 1000.0, 110.0, "Kimya Lab");
        g.add_node("room-155", 1160.0, 110.0, "Modelleme Lab");
        g.add_node("wc-1", 1275.0, 110.0, "WC");
        g.add_node("room-151", 1385.0, 110.0, "Maket Atölyesi");
        g.add_node("room-131", 1540.0, 110.0, "Temel Elektronik Lab");

        // South room row.
        g.add_node("room-141", 360.0, 345.0, "Areli İletişim USAM");
        g.add_node("room-142", 490.0, 345.0, "Derslik 142");
        g.add_node("room-143", 620.0, 345.0, "Derslik 143");
        g.add_node("room-144", 750.0, 345.0, "Derslik 144");
        g.add_node("room-145", 870.0, 345.0, "Müh. Öğr. Çal. Ofisi");
        g.add_node("room-146", 1010.0, 345.0, "Fizik Lab");
        g.add_node("room-147", 1175.0, 345.0, "Büyük Veri IoT Lab");
        g.add_node("room-148", 1310.0, 345.0, "Araştırma Görev Girişi");
        g.add_node("room-149", 1430.0, 345.0, "Öğrenci Proje Ofisi");
        g.add_node("room-150", 1575.0, 345.0, "Kalibrasyon Lab");

        // Left wing.
        g.add_node("yemekhane", 105.0, 230.0, "Yemekhane");
        g.add_node("wc-bay", 105.0, 330.0, "WC Bay");
        g.add_node("stairs-left", 105.0, 435.0, "Merdiven 2");
        g.add_node("room-139", 105.0, 540.0, "Derslik 139");
        g.add_node("room-120", 360.0, 500.0, "Derslik 120");
        g.add_node("entrance", 245.0, 695.0, "Giriş");

        // Main corridor chain.
        for pair in [
            ("corridor-w1", "corridor-w2"),
            ("corridor-w2", "corridor-w3"),
            ("corridor-w3", "corridor-w4"),
            ("corridor-w4", "corridor-w5"),
            ("corridor-w5", "corridor-w6"),
            ("corridor-w6", "corridor-w7"),
            ("corridor-w7", "corridor-w8"),
            ("corridor-w8", "corridor-w9"),
            ("corridor-w9", "corridor-w10"),
            ("corridor-w10", "corridor-w11"),
        ] {
            g.connect(pair.0, pair.1);
        }

        // Left corridor chain.
        for pair in [
            ("corridor-w1", "left-w1"),
            ("left-w1", "left-w2"),
            ("left-w2", "left-w3"),
            ("left-w3", "left-w4"),
        ] {
            g.connect(pair.0, pair.1);
        }

        // North rooms onto the corridor.
        for pair in [
            ("room-161", "corridor-w1"),
            ("room-160", "corridor-w2"),
            ("room-159", "corridor-w3"),
            ("room-158", "corridor-w4"),
            ("room-157", "corridor-w5"),
            ("stairs-1", "corridor-w6"),
            ("room-156", "corridor-w7"),
            ("room-155", "corridor-w8"),
            ("wc-1", "corridor-w9"),
            ("room-151", "corridor-w10"),
            ("room-131", "corridor-w11"),
        ] {
            g.connect(pair.0, pair.1);
        }

        // South rooms onto the corridor.
        for pair in [
            ("room-141", "corridor-w2"),
            ("room-142", "corridor-w3"),
            ("room-143", "corridor-w4"),
            ("room-144", "corridor-w5"),
            ("room-145", "corridor-w6"),
            ("room-146", "corridor-w7"),
            ("room-147", "corridor-w8"),
            ("room-148", "corridor-w9"),
            ("room-149", "corridor-w10"),
            ("room-150", "corridor-w11"),
        ] {
            g.connect(pair.0, pair.1);
        }

        // Left-wing rooms.
        for pair in [
            ("yemekhane", "corridor-w1"),
            ("wc-bay", "left-w1"),
            ("stairs-left", "left-w2"),
            ("room-139", "left-w3"),
            ("room-120", "left-w2"),
            ("entrance", "left-w4"),
        ] {
            g.connect(pair.0, pair.1);
        }

        // Destination aliases: numeric room codes, Turkish/English
        // variants, and landmark shorthands.
        g.aliases = HashMap::from([
            ("161", "room-161"),
            ("160", "room-160"),
            ("159", "room-159"),
            ("158", "room-158"),
            ("157", "room-157"),
            ("156", "room-156"),
            ("155", "room-155"),
            ("151", "room-151"),
            ("131", "room-131"),
            ("141", "room-141"),
            ("142", "room-142"),
            ("143", "room-143"),
            ("144", "room-144"),
            ("145", "room-145"),
            ("146", "room-146"),
            ("147", "room-147"),
            ("148", "room-148"),
            ("149", "room-149"),
            ("150", "room-150"),
            ("139", "room-139"),
            ("120", "room-120"),
            ("entrance", "entrance"),
            ("giris", "entrance"),
            ("giriş", "entrance"),
            ("yemekhane", "yemekhane"),
            ("wc", "wc-1"),
            ("wc-1", "wc-1"),
            ("wc-bay", "wc-bay"),
            ("merdiven", "stairs-1"),
            ("stairs-1", "stairs-1"),
            ("stairs-left", "stairs-left"),
            ("merdiven-2", "stairs-left"),
        ]);

        g
    }
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
