use serde::{Deserialize, Serialize};

/// One row of `stops.txt`. Columns are looked up by header name,
/// anything beyond these is ignored.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GtfsStop {
    pub stop_id: String,
    pub stop_name: String,
    #[serde(default)]
    pub location_type: Option<String>,
    #[serde(default)]
    pub parent_station: Option<String>,
}

impl GtfsStop {
    /// Stations (`location_type == 1`) group platforms but are not boardable.
    pub fn is_station(&self) -> bool {
        self.location_type
            .as_deref()
            .is_some_and(|value| value.trim() == "1")
    }
}
