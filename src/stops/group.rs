use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::{
    gtfs::models::GtfsStop,
    shared::{Identifiable, text},
};

/// One named place, merging every boardable stop id that shares its name.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StopGroup {
    pub name: String,
    pub stop_ids: Vec<String>,
    #[serde(default)]
    pub source_names: BTreeSet<String>,
    pub search_key: String,
    #[serde(default)]
    pub parent_id: Option<String>,
}

impl StopGroup {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            stop_ids: Vec::new(),
            source_names: BTreeSet::new(),
            search_key: text::normalize(name),
            parent_id: None,
        }
    }

    pub fn primary_id(&self) -> &str {
        self.stop_ids.first().map(String::as_str).unwrap_or_default()
    }

    pub fn contains_id(&self, stop_id: &str) -> bool {
        self.stop_ids
            .iter()
            .any(|id| text::eq_ignore_case(id, stop_id))
    }

    /// Appends unless an id differing only in case is already there.
    pub fn add_stop_id(&mut self, stop_id: &str) -> bool {
        if self.contains_id(stop_id) {
            return false;
        }
        self.stop_ids.push(stop_id.to_string());
        true
    }

    fn add_source_name(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty()
            || self
                .source_names
                .iter()
                .any(|known| text::eq_ignore_case(known, name))
        {
            return;
        }
        self.source_names.insert(name.to_string());
    }
}

impl Identifiable for StopGroup {
    fn id(&self) -> &str {
        self.primary_id()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn normalized_name(&self) -> &str {
        &self.search_key
    }

    fn ids(&self) -> &[String] {
        &self.stop_ids
    }
}

/// Folds `stops.txt` rows into groups keyed by normalized name.
/// Groups keep the order in which their name was first seen.
#[derive(Default)]
pub struct StopGroupBuilder {
    groups: Vec<StopGroup>,
    by_key: HashMap<String, usize>,
    stations_skipped: usize,
}

impl StopGroupBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn push(&mut self, stop: GtfsStop) {
        if stop.is_station() {
            self.stations_skipped += 1;
            return;
        }
        let stop_id = stop.stop_id.trim();
        if stop_id.is_empty() || stop.stop_name.trim().is_empty() {
            return;
        }

        let key = text::normalize(&stop.stop_name);
        let index = match self.by_key.get(&key) {
            Some(index) => *index,
            None => {
                let mut group = StopGroup::new(&stop.stop_name);
                group.parent_id = stop
                    .parent_station
                    .as_deref()
                    .map(str::trim)
                    .filter(|parent| !parent.is_empty())
                    .map(str::to_string);
                self.groups.push(group);
                self.by_key.insert(key, self.groups.len() - 1);
                self.groups.len() - 1
            }
        };

        let group = &mut self.groups[index];
        group.add_source_name(&stop.stop_name);
        group.add_stop_id(stop_id);
    }

    pub fn stations_skipped(&self) -> usize {
        self.stations_skipped
    }

    pub fn build(self) -> Vec<StopGroup> {
        self.groups
    }
}
