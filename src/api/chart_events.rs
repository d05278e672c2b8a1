use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{ChartId, Filter};
use crate::error::{ChartError, ChartResult};

/// Event names a chart listener can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartEventKind {
    PreRender,
    PostRender,
    PreRedraw,
    PostRedraw,
    Filtered,
    Zoomed,
    Renderlet,
    Pretransition,
}

impl ChartEventKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PreRender => "preRender",
            Self::PostRender => "postRender",
            Self::PreRedraw => "preRedraw",
            Self::PostRedraw => "postRedraw",
            Self::Filtered => "filtered",
            Self::Zoomed => "zoomed",
            Self::Renderlet => "renderlet",
            Self::Pretransition => "pretransition",
        }
    }
}

impl fmt::Display for ChartEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartEventKind {
    type Err = ChartError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "preRender" => Ok(Self::PreRender),
            "postRender" => Ok(Self::PostRender),
            "preRedraw" => Ok(Self::PreRedraw),
            "postRedraw" => Ok(Self::PostRedraw),
            "filtered" => Ok(Self::Filtered),
            "zoomed" => Ok(Self::Zoomed),
            "renderlet" => Ok(Self::Renderlet),
            "pretransition" => Ok(Self::Pretransition),
            other => Err(ChartError::InvalidData(format!(
                "unknown chart event `{other}`"
            ))),
        }
    }
}

/// What a filter call did, as reported to `filtered` listeners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterChange {
    Toggled(Filter),
    ToggledEach(Vec<Filter>),
    Reset,
}

impl FilterChange {
    /// The single toggled filter, if this was a single toggle.
    #[must_use]
    pub fn toggled(&self) -> Option<&Filter> {
        match self {
            Self::Toggled(filter) => Some(filter),
            Self::ToggledEach(_) | Self::Reset => None,
        }
    }

    #[must_use]
    pub fn is_reset(&self) -> bool {
        matches!(self, Self::Reset)
    }
}

/// Notification delivered to chart listeners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChartEvent {
    PreRender { chart: ChartId },
    PostRender { chart: ChartId },
    PreRedraw { chart: ChartId },
    PostRedraw { chart: ChartId },
    Pretransition { chart: ChartId },
    Renderlet { chart: ChartId },
    Filtered {
        chart: ChartId,
        change: FilterChange,
        filters: Vec<Filter>,
    },
    Zoomed {
        chart: ChartId,
        x_domain: (f64, f64),
    },
}

impl ChartEvent {
    #[must_use]
    pub fn kind(&self) -> ChartEventKind {
        match self {
            Self::PreRender { .. } => ChartEventKind::PreRender,
            Self::PostRender { .. } => ChartEventKind::PostRender,
            Self::PreRedraw { .. } => ChartEventKind::PreRedraw,
            Self::PostRedraw { .. } => ChartEventKind::PostRedraw,
            Self::Pretransition { .. } => ChartEventKind::Pretransition,
            Self::Renderlet { .. } => ChartEventKind::Renderlet,
            Self::Filtered { .. } => ChartEventKind::Filtered,
            Self::Zoomed { .. } => ChartEventKind::Zoomed,
        }
    }

    #[must_use]
    pub fn chart(&self) -> ChartId {
        match self {
            Self::PreRender { chart }
            | Self::PostRender { chart }
            | Self::PreRedraw { chart }
            | Self::PostRedraw { chart }
            | Self::Pretransition { chart }
            | Self::Renderlet { chart }
            | Self::Filtered { chart, .. }
            | Self::Zoomed { chart, .. } => *chart,
        }
    }
}

pub type ChartListener = Box<dyn FnMut(&ChartEvent)>;

/// Listener table keyed by `(event, namespace)`.
///
/// `"filtered"` and `"filtered.monitor"` are distinct keys; registering the
/// same key twice replaces the earlier listener. Listeners of one event fire
/// in registration order.
#[derive(Default)]
pub struct ChartListeners {
    entries: IndexMap<(ChartEventKind, String), ChartListener>,
}

impl ChartListeners {
    pub fn on(&mut self, spec: &str, listener: ChartListener) -> ChartResult<()> {
        let key = parse_spec(spec)?;
        trace!(event = %key.0, namespace = %key.1, "registering chart listener");
        if let Some(slot) = self.entries.get_mut(&key) {
            *slot = listener;
        } else {
            self.entries.insert(key, listener);
        }
        Ok(())
    }

    /// Removes a listener; returns whether one was registered under `spec`.
    pub fn off(&mut self, spec: &str) -> ChartResult<bool> {
        let key = parse_spec(spec)?;
        Ok(self.entries.shift_remove(&key).is_some())
    }

    #[must_use]
    pub fn has(&self, kind: ChartEventKind) -> bool {
        self.entries.keys().any(|(entry, _)| *entry == kind)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn emit(&mut self, event: &ChartEvent) {
        let kind = event.kind();
        for ((entry, _), listener) in &mut self.entries {
            if *entry == kind {
                listener(event);
            }
        }
    }
}

impl fmt::Debug for ChartListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.keys()).finish()
    }
}

fn parse_spec(spec: &str) -> ChartResult<(ChartEventKind, String)> {
    let (event, namespace) = spec.split_once('.').unwrap_or((spec, ""));
    Ok((event.parse()?, namespace.to_owned()))
}
