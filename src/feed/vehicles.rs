use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::feed::models::{VehiclePositionsResponse, VehicleTrip};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct VehicleInfo {
    pub display_name: Option<String>,
    pub wheelchair_accessible: Option<bool>,
}

/// Vehicle metadata keyed by trip id, ignoring case.
#[derive(Debug, Clone, Default)]
pub struct VehicleInfos {
    by_trip: HashMap<String, VehicleInfo>,
}

impl VehicleInfos {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn insert(&mut self, trip_id: &str, info: VehicleInfo) {
        self.by_trip.insert(trip_id.to_lowercase(), info);
    }

    pub fn get(&self, trip_id: &str) -> Option<&VehicleInfo> {
        self.by_trip.get(&trip_id.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.by_trip.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_trip.is_empty()
    }

    /// Keeps only the requested trips, first feature per trip wins.
    pub(crate) fn from_response(response: VehiclePositionsResponse, trip_ids: &[String]) -> Self {
        let wanted: HashSet<String> = trip_ids.iter().map(|id| id.to_lowercase()).collect();
        let mut infos = Self::new();
        response
            .features
            .into_iter()
            .filter_map(|feature| feature.properties?.trip)
            .for_each(|trip| {
                let Some(trip_id) = trip.gtfs.as_ref().and_then(|gtfs| gtfs.trip_id.clone()) else {
                    return;
                };
                let key = trip_id.to_lowercase();
                if !wanted.contains(&key) || infos.by_trip.contains_key(&key) {
                    return;
                }
                let info = VehicleInfo {
                    display_name: display_name(&trip),
                    wheelchair_accessible: trip.wheelchair_accessible,
                };
                infos.by_trip.insert(key, info);
            });
        infos
    }
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Manufacturer and model, else the fleet label, else a description.
fn display_name(trip: &VehicleTrip) -> Option<String> {
    if let Some(descriptor) = &trip.vehicle_descriptor {
        let make: Vec<&str> = [
            non_blank(descriptor.manufacturer.as_ref()),
            non_blank(descriptor.model.as_ref()),
        ]
        .into_iter()
        .flatten()
        .collect();
        if !make.is_empty() {
            return Some(make.join(" "));
        }
        if let Some(label) = non_blank(descriptor.label.as_ref()) {
            return Some(label.to_string());
        }
        if let Some(description) = non_blank(descriptor.description_cs.as_ref())
            .or(non_blank(descriptor.description_en.as_ref()))
        {
            return Some(description.to_string());
        }
    }
    let vehicle_type = trip.vehicle_type.as_ref()?;
    non_blank(vehicle_type.description_cs.as_ref())
        .or(non_blank(vehicle_type.description_en.as_ref()))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> VehiclePositionsResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn keeps_only_requested_trips() {
        let response = parse(
            r#"{"features":[
                {"properties":{"trip":{"gtfs":{"trip_id":"T1"},"wheelchair_accessible":true}}},
                {"properties":{"trip":{"gtfs":{"trip_id":"T2"},"wheelchair_accessible":false}}}
            ]}"#,
        );
        let infos = VehicleInfos::from_response(response, &["t1".to_string()]);
        assert_eq!(infos.len(), 1);
        assert_eq!(infos.get("T1").unwrap().wheelchair_accessible, Some(true));
        assert!(infos.get("T2").is_none());
    }

    #[test]
    fn display_name_prefers_make_and_model() {
        let response = parse(
            r#"{"features":[{"properties":{"trip":{
                "gtfs":{"trip_id":"T1"},
                "vehicle_descriptor":{"manufacturer":"Škoda","model":"15T","label":"9201"}
            }}}]}"#,
        );
        let infos = VehicleInfos::from_response(response, &["T1".to_string()]);
        assert_eq!(infos.get("t1").unwrap().display_name.as_deref(), Some("Škoda 15T"));
    }

    #[test]
    fn display_name_falls_back_to_label_then_description() {
        let response = parse(
            r#"{"features":[
                {"properties":{"trip":{"gtfs":{"trip_id":"A"},"vehicle_descriptor":{"label":"9201"}}}},
                {"properties":{"trip":{"gtfs":{"trip_id":"B"},"vehicle_type":{"description_cs":"autobus","description_en":"bus"}}}},
                {"properties":{"trip":{"gtfs":{"trip_id":"C"}}}}
            ]}"#,
        );
        let ids: Vec<String> = ["A", "B", "C"].iter().map(|id| id.to_string()).collect();
        let infos = VehicleInfos::from_response(response, &ids);
        assert_eq!(infos.get("A").unwrap().display_name.as_deref(), Some("9201"));
        assert_eq!(infos.get("B").unwrap().display_name.as_deref(), Some("autobus"));
        assert_eq!(infos.get("C").unwrap().display_name, None);
    }
}
