use thiserror::Error;

use crate::core::ChartId;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    /// A mandatory attribute was not configured before rendering.
    #[error("chart `{anchor}` is missing mandatory attribute `{attribute}`")]
    InvalidState {
        anchor: String,
        attribute: &'static str,
    },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("unknown chart id {0}")]
    UnknownChart(ChartId),
}
