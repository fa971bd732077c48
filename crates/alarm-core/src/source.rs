//! Seam to the upstream flight-tracking service.

use std::future::Future;

use thiserror::Error;

use crate::geo::BoundingBox;
use crate::models::{RawAircraft, ScanStatus};

/// Why a fetch produced no aircraft list.
///
/// None of these are fatal: the scan is recorded and the scheduler re-arms.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Transport failure or non-success HTTP status
    #[error("network error: {0}")]
    Network(String),
    /// Response body did not have the expected shape
    #[error("parse error: {0}")]
    Parse(String),
    /// Well-formed response that carried no state data
    #[error("no data in response")]
    NoData,
}

impl FetchError {
    pub fn status(&self) -> ScanStatus {
        match self {
            FetchError::Network(_) => ScanStatus::NetworkError,
            FetchError::Parse(_) => ScanStatus::ParseError,
            FetchError::NoData => ScanStatus::NoData,
        }
    }
}

/// Anything that can list the aircraft inside a bounding box.
pub trait DataSource: Send + Sync {
    fn fetch_states(
        &self,
        bbox: BoundingBox,
    ) -> impl Future<Output = Result<Vec<RawAircraft>, FetchError>> + Send;
}
