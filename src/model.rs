use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub origin: i64,
    pub destination: i64,
    pub flow: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// One retrieved instance. The coordinate and count sequences are aligned
/// by station index; routes reference stations by id, not by index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowData {
    pub routes: Vec<Route>,

    pub coordinates: Vec<Coordinate>,

    #[serde(rename = "availableBikes")]
    pub available_bikes: Vec<i64>,

    #[serde(rename = "freeSlots")]
    pub free_slots: Vec<i64>,
}
