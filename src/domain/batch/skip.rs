use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::address::AddressKey;

/// Which input list a row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListKind {
    Client,
    Sold,
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client => write!(f, "Client"),
            Self::Sold => write!(f, "Sold"),
        }
    }
}

/// Why a row was left out of the results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkipReason {
    #[serde(rename = "Geocoding failed")]
    GeocodingFailed,
    #[serde(rename = "Render failed")]
    RenderFailed,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GeocodingFailed => write!(f, "Geocoding failed"),
            Self::RenderFailed => write!(f, "Render failed"),
        }
    }
}

/// One skipped row; field names double as skip report columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkipRecord {
    #[serde(rename = "Address")]
    pub address: AddressKey,
    #[serde(rename = "Type")]
    pub list: ListKind,
    #[serde(rename = "Row")]
    pub row: usize,
    #[serde(rename = "Reason")]
    pub reason: SkipReason,
    #[serde(rename = "Detail")]
    pub detail: Option<String>,
}

impl SkipRecord {
    pub fn geocoding_failed(
        address: AddressKey,
        list: ListKind,
        row: usize,
        detail: Option<String>,
    ) -> Self {
        Self {
            address,
            list,
            row,
            reason: SkipReason::GeocodingFailed,
            detail,
        }
    }

    pub fn render_failed(address: AddressKey, row: usize, detail: impl Into<String>) -> Self {
        Self {
            address,
            list: ListKind::Client,
            row,
            reason: SkipReason::RenderFailed,
            detail: Some(detail.into()),
        }
    }
}
