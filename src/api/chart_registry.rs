use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::ChartId;

/// Group name used when a chart is registered without one.
pub const DEFAULT_CHART_GROUP: &str = "__default_chart_group__";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredChart {
    pub id: ChartId,
    pub anchor: String,
}

/// Group name -> member charts, in registration order.
///
/// A chart is a member of at most one group: registering it again moves it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartGroupRegistry {
    groups: IndexMap<String, Vec<RegisteredChart>>,
}

#[must_use]
pub fn group_name(group: Option<&str>) -> &str {
    group.unwrap_or(DEFAULT_CHART_GROUP)
}

impl ChartGroupRegistry {
    pub fn register(&mut self, id: ChartId, anchor: &str, group: Option<&str>) {
        self.remove_id(id);
        let group = group_name(group);
        debug!(chart = %id, anchor, group, "registering chart");
        self.groups
            .entry(group.to_owned())
            .or_default()
            .push(RegisteredChart {
                id,
                anchor: anchor.to_owned(),
            });
    }

    /// Removes the chart registered under `anchor`; unknown anchors and
    /// groups are ignored. Returns the removed id.
    pub fn deregister(&mut self, anchor: &str, group: Option<&str>) -> Option<ChartId> {
        let group = group_name(group);
        let members = self.groups.get_mut(group)?;
        let index = members.iter().position(|member| member.anchor == anchor)?;
        let removed = members.remove(index);
        debug!(chart = %removed.id, anchor, group, "deregistered chart");
        Some(removed.id)
    }

    #[must_use]
    pub fn list(&self, group: Option<&str>) -> Vec<ChartId> {
        self.groups
            .get(group_name(group))
            .map(|members| members.iter().map(|member| member.id).collect())
            .unwrap_or_default()
    }

    /// Empties one group, or every group when `group` is `None`.
    pub fn clear(&mut self, group: Option<&str>) {
        match group {
            Some(group) => {
                self.groups.shift_remove(group);
            }
            None => self.groups.clear(),
        }
    }

    #[must_use]
    pub fn has(&self, id: ChartId) -> bool {
        self.group_of(id).is_some()
    }

    #[must_use]
    pub fn group_of(&self, id: ChartId) -> Option<&str> {
        self.groups
            .iter()
            .find(|(_, members)| members.iter().any(|member| member.id == id))
            .map(|(name, _)| name.as_str())
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Updates the anchor a member is matched by.
    pub fn rename_anchor(&mut self, id: ChartId, anchor: &str) {
        for member in self.groups.values_mut().flatten() {
            if member.id == id {
                member.anchor = anchor.to_owned();
            }
        }
    }

    pub(crate) fn remove_id(&mut self, id: ChartId) {
        for members in self.groups.values_mut() {
            members.retain(|member| member.id != id);
        }
    }
}
