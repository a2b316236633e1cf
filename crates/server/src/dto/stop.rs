use perron::stops::StopGroup;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopDto {
    pub id: String,
    pub name: String,
    pub stop_ids: Vec<String>,
}

impl From<&StopGroup> for StopDto {
    fn from(group: &StopGroup) -> Self {
        Self {
            id: group.primary_id().to_string(),
            name: group.name.clone(),
            stop_ids: group.stop_ids.clone(),
        }
    }
}
