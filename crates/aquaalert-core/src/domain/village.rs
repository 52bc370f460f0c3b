//! Static village registry.

use geo::Point;

/// Village that is always reported as contaminated by the sensor simulator.
pub const DEMO_VILLAGE_ID: &str = "majuli_assam";

/// A monitored village.
#[derive(Debug, Clone, PartialEq)]
pub struct Village {
    /// Stable identifier used in reports
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Reference coordinate (x = longitude, y = latitude)
    pub location: Point<f64>,
}

impl Village {
    /// Create a village from latitude/longitude.
    pub const fn new(id: &'static str, name: &'static str, lat: f64, lng: f64) -> Self {
        Self {
            id,
            name,
            location: Point(geo::Coord { x: lng, y: lat }),
        }
    }

    /// Latitude in degrees
    pub fn lat(&self) -> f64 {
        self.location.y()
    }

    /// Longitude in degrees
    pub fn lng(&self) -> f64 {
        self.location.x()
    }
}

const NORTHEAST_VILLAGES: [Village; 8] = [
    Village::new("mawlynnong_meghalaya", "Mawlynnong", 25.195, 92.019),
    Village::new("ziro_arunachal", "Ziro", 27.63, 93.83),
    Village::new("majuli_assam", "Majuli", 26.91, 94.13),
    Village::new("khonoma_nagaland", "Khonoma", 25.67, 94.01),
    Village::new("moirang_manipur", "Moirang", 24.50, 93.77),
    Village::new("pelling_sikkim", "Pelling", 27.32, 88.24),
    Village::new("champhai_mizoram", "Champhai", 23.46, 93.33),
    Village::new("unakoti_tripura", "Unakoti", 24.08, 92.07),
];

/// Ordered set of villages. Iteration order is the order alerts and chart
/// ties are reported in.
#[derive(Debug, Clone, PartialEq)]
pub struct VillageRegistry {
    villages: Vec<Village>,
}

impl VillageRegistry {
    /// Build a registry from an explicit, ordered list.
    pub fn new(villages: Vec<Village>) -> Self {
        Self { villages }
    }

    /// The eight north-east India villages the service monitors.
    pub fn northeast() -> Self {
        Self::new(NORTHEAST_VILLAGES.to_vec())
    }

    /// Look up a village by identifier.
    pub fn get(&self, id: &str) -> Option<&Village> {
        self.villages.iter().find(|v| v.id == id)
    }

    /// Whether `id` names a registered village.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Villages in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &Village> {
        self.villages.iter()
    }

    /// Number of villages
    pub fn len(&self) -> usize {
        self.villages.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.villages.is_empty()
    }
}

impl Default for VillageRegistry {
    fn default() -> Self {
        Self::northeast()
    }
}
