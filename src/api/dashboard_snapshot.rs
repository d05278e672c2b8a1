use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{ChartId, Filter};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{BrushSelection, InteractionMode, ZoomTransform};

use super::Dashboard;

pub const DASHBOARD_SNAPSHOT_JSON_SCHEMA_V1: u32 = 1;

/// Filter and axis state of one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSnapshot {
    pub id: ChartId,
    pub anchor: String,
    pub group: Option<String>,
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub x_domain: Option<(f64, f64)>,
    #[serde(default)]
    pub x_original_domain: Option<(f64, f64)>,
    #[serde(default)]
    pub refocused: bool,
    #[serde(default)]
    pub range_chart: Option<ChartId>,
    #[serde(default)]
    pub focus_chart: Option<ChartId>,
    #[serde(default)]
    pub brush: Option<BrushSelection>,
    #[serde(default)]
    pub zoom: Option<ZoomTransform>,
    #[serde(default)]
    pub interaction_mode: Option<InteractionMode>,
}

/// Serializable deterministic state snapshot used by regression tests and
/// debugging tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub now_ms: u64,
    pub pending_action: bool,
    pub groups: IndexMap<String, Vec<ChartId>>,
    pub charts: Vec<ChartSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshotJsonContractV1 {
    pub schema_version: u32,
    pub snapshot: DashboardSnapshot,
}

impl Dashboard {
    #[must_use]
    pub fn snapshot(&self) -> DashboardSnapshot {
        let groups = self
            .registry()
            .group_names()
            .map(|name| (name.to_owned(), self.list(Some(name))))
            .collect();
        let charts = self
            .charts()
            .map(|chart| {
                let grid = chart.grid();
                ChartSnapshot {
                    id: chart.id(),
                    anchor: chart.anchor().to_owned(),
                    group: self.chart_group(chart.id()).map(str::to_owned),
                    filters: chart.filters().to_vec(),
                    x_domain: grid.and_then(|grid| grid.x_domain()),
                    x_original_domain: grid.and_then(|grid| grid.x_original_domain()),
                    refocused: grid.is_some_and(|grid| grid.refocused()),
                    range_chart: grid.and_then(|grid| grid.range_chart()),
                    focus_chart: grid.and_then(|grid| grid.focus_chart()),
                    brush: grid.and_then(|grid| grid.brush().selection()),
                    zoom: grid.and_then(|grid| grid.zoom()).map(|zoom| zoom.transform()),
                    interaction_mode: grid.map(|grid| grid.interaction_mode()),
                }
            })
            .collect();
        DashboardSnapshot {
            now_ms: self.now().as_millis() as u64,
            pending_action: self.has_pending_action(),
            groups,
            charts,
        }
    }
}

impl DashboardSnapshot {
    #[must_use]
    pub fn chart(&self, id: ChartId) -> Option<&ChartSnapshot> {
        self.charts.iter().find(|chart| chart.id == id)
    }

    pub fn to_json_contract_v1_pretty(&self) -> ChartResult<String> {
        let payload = DashboardSnapshotJsonContractV1 {
            schema_version: DASHBOARD_SNAPSHOT_JSON_SCHEMA_V1,
            snapshot: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            ChartError::InvalidData(format!("failed to serialize snapshot contract v1: {e}"))
        })
    }

    /// Accepts both the bare snapshot and the versioned contract.
    pub fn from_json_compat_str(input: &str) -> ChartResult<Self> {
        if let Ok(snapshot) = serde_json::from_str::<Self>(input) {
            return Ok(snapshot);
        }
        let payload: DashboardSnapshotJsonContractV1 = serde_json::from_str(input).map_err(|e| {
            ChartError::InvalidData(format!("failed to parse snapshot json payload: {e}"))
        })?;
        if payload.schema_version != DASHBOARD_SNAPSHOT_JSON_SCHEMA_V1 {
            return Err(ChartError::InvalidData(format!(
                "unsupported snapshot schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.snapshot)
    }
}
