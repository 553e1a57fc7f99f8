//! Operating bases and the communities served from each.

use crate::model::Location;

/// A base together with the communities it delivers to.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub origin: Location,
    pub destinations: Vec<Location>,
}

impl Scenario {
    pub fn destination(&self, id: &str) -> Option<&Location> {
        self.destinations.iter().find(|d| d.id == id)
    }

    /// Every community except `destination_id`, the candidate set for
    /// on-route matching.
    pub fn candidates_for(&self, destination_id: &str) -> Vec<Location> {
        self.destinations
            .iter()
            .filter(|d| d.id != destination_id)
            .cloned()
            .collect()
    }

    /// Looks up manually selected ids, ignoring unknown ones.
    pub fn select(&self, ids: &[&str]) -> Vec<Location> {
        ids.iter().filter_map(|id| self.destination(id).cloned()).collect()
    }
}

const JMM: (&str, &str, f64, f64) = ("jmm", "José María Morelos", 19.7485, -88.7060);
const FCP: (&str, &str, f64, f64) = ("fcp", "Felipe Carrillo Puerto", 19.57987006324777, -88.04392203071264);

const JMM_COMMUNITIES: &[(&str, &str, f64, f64)] = &[
    ("candelaria", "Candelaria", 19.7362, -88.9580),
    ("dziuche", "Dziuché", 19.8971, -88.8098),
    ("la-presumida", "La Presumida", 19.8010, -88.7534),
    ("santa-gertrudis", "Santa Gertrudis", 19.7996, -88.7724),
    ("kancabchen", "Kancabchén", 19.7139, -88.8612),
    ("cafetalito", "Cafetalito", 19.7276, -88.7990),
    ("cafetal-grande", "Cafetal Grande", 19.7163, -88.8217),
    ("benito-juarez", "Benito Juárez", 19.7106, -88.7707),
    ("pozo-pirata", "Pozo Pirata", 19.6149, -88.8900),
    ("san-carlos", "San Carlos", 19.6336, -88.9393),
    ("chunhuhub", "Chunhuhub", 19.5850, -88.5914),
    ("polyuc", "Polyuc", 19.6099, -88.5612),
    ("dos-aguadas", "Dos Aguadas", 19.6663, -88.6984),
    ("el-naranjal", "El Naranjal", 19.6449, -88.7857),
    ("othon-p-blanco", "Othón P. Blanco", 19.6203, -89.0054),
    ("puerto-arturo", "Puerto Arturo", 19.6591, -89.0668),
];

const FCP_COMMUNITIES: &[(&str, &str, f64, f64)] = &[
    ("dzula", "Dzulá", 19.602682832330864, -88.41559225310304),
    ("X-Yatil", "X-Yatil", 19.662795041921463, -88.4435691850896),
    ("el-senor", "El Señor", 19.843208408219397, -88.13529197133691),
    ("tihosuco", "Tihosuco", 20.19546282557715, -88.37403728985683),
];

fn location(&(id, name, lat, lng): &(&str, &str, f64, f64)) -> Location {
    Location::new(id, name, lat, lng)
}

/// Ids of the known bases.
pub fn base_ids() -> [&'static str; 2] {
    [JMM.0, FCP.0]
}

pub fn scenario(base_id: &str) -> Option<Scenario> {
    let (base, communities) = match base_id {
        "jmm" => (&JMM, JMM_COMMUNITIES),
        "fcp" => (&FCP, FCP_COMMUNITIES),
        _ => return None,
    };

    Some(Scenario {
        origin: location(base),
        destinations: communities.iter().map(location).collect(),
    })
}
