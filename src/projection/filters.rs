use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::shared::text::eq_ignore_case;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FilterOption {
    pub name: String,
    pub is_selected: bool,
}

/// Selectable values seen in the latest fetch, e.g. platforms or lines.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    options: Vec<FilterOption>,
}

impl FilterSet {
    pub fn new() -> Self {
        Default::default()
    }

    /// Builds the set for `values`, carrying over the selection of names this
    /// set already knew. New names start selected, vanished names are dropped.
    pub fn rebuild<'a, I>(&self, values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let options = values
            .into_iter()
            .map(|name| FilterOption {
                name: name.to_string(),
                is_selected: self.selection(name).unwrap_or(true),
            })
            .collect();
        Self { options }
    }

    pub fn options(&self) -> &[FilterOption] {
        &self.options
    }

    pub fn is_populated(&self) -> bool {
        !self.options.is_empty()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn selection(&self, name: &str) -> Option<bool> {
        self.options
            .iter()
            .find(|option| eq_ignore_case(&option.name, name))
            .map(|option| option.is_selected)
    }

    /// Whether `value` is one of the selected options.
    pub fn is_selected(&self, value: &str) -> bool {
        self.selection(value.trim()).unwrap_or(false)
    }

    /// Returns whether anything changed.
    pub fn set_selected(&mut self, name: &str, selected: bool) -> bool {
        match self
            .options
            .iter_mut()
            .find(|option| eq_ignore_case(&option.name, name.trim()))
        {
            Some(option) if option.is_selected != selected => {
                option.is_selected = selected;
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.options.clear();
    }
}

/// Trimmed, non-blank values deduplicated ignoring case, first spelling kept.
pub(crate) fn distinct<'a, I>(values: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: HashSet<String> = HashSet::new();
    values
        .into_iter()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .filter(|value| seen.insert(value.to_lowercase()))
        .collect()
}
