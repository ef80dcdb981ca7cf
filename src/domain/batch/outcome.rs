use std::path::PathBuf;

use serde::Serialize;

use super::SkipRecord;
use crate::domain::address::{AddressRecord, Coordinate};
use crate::domain::render::RenderedMailer;

/// A sold home near a client
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbySale {
    pub record: AddressRecord,
    pub coordinate: Coordinate,
    pub distance_miles: f64,
}

/// A geocoded client and its ranked nearby sales
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientMatch {
    pub client: AddressRecord,
    pub coordinate: Coordinate,
    pub nearby: Vec<NearbySale>,
}

/// Counters for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BatchStats {
    pub clients: usize,
    pub sold: usize,
    pub cache_hits: usize,
    pub fetched: usize,
}

/// Everything a finished run produced
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchOutcome {
    pub matched: Vec<ClientMatch>,
    pub skipped: Vec<SkipRecord>,
    pub rendered: Vec<RenderedMailer>,
    pub merged: Option<PathBuf>,
    pub skip_report: Option<PathBuf>,
    pub stats: BatchStats,
}

impl BatchOutcome {
    pub fn rendered_count(&self) -> usize {
        self.rendered.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}
