use serde::Deserialize;
use serde_json::Value;

use crate::model::{Coordinate, FlowData, Route};

/// Wire shape of a response. Tuples arrive as untyped arrays (a route is
/// `[origin, destination, flow]`, not a named object), so every field is
/// decoded loosely first and converted afterwards.
#[derive(Default, Deserialize)]
#[serde(default)]
struct RawPayload {
    routes: Vec<Value>,

    coordinates: Vec<Value>,

    #[serde(rename = "availableBikes")]
    available_bikes: Vec<Value>,

    #[serde(rename = "freeSlots")]
    free_slots: Vec<Value>,
}

/// Decodes an accumulated response body into typed records.
///
/// Malformed JSON fails the whole decode. Individual malformed records do
/// not: a route that is not a 3-element numeric array, a coordinate that is
/// not a 2-element numeric array, or a non-numeric count entry is skipped
/// and the rest of the document still decodes. Absent fields decode as
/// empty sequences.
pub fn decode(bytes: &[u8]) -> Result<FlowData, serde_json::Error> {
    let raw: RawPayload = serde_json::from_slice(bytes)?;

    Ok(FlowData {
        routes: raw.routes.iter().filter_map(to_route).collect(),
        coordinates: raw.coordinates.iter().filter_map(to_coordinate).collect(),
        available_bikes: raw.available_bikes.iter().filter_map(to_count).collect(),
        free_slots: raw.free_slots.iter().filter_map(to_count).collect(),
    })
}

fn to_route(value: &Value) -> Option<Route> {
    let parts = value.as_array()?;
    if parts.len() != 3 {
        return None;
    }

    Some(Route {
        origin: parts[0].as_f64()? as i64,
        destination: parts[1].as_f64()? as i64,
        flow: parts[2].as_f64()?,
    })
}

fn to_coordinate(value: &Value) -> Option<Coordinate> {
    let parts = value.as_array()?;
    if parts.len() != 2 {
        return None;
    }

    Some(Coordinate {
        latitude: parts[0].as_f64()?,
        longitude: parts[1].as_f64()?,
    })
}

fn to_count(value: &Value) -> Option<i64> {
    value.as_f64().map(|n| n as i64)
}
