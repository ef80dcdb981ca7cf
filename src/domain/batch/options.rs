use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::matching::{DEFAULT_MIN_DISTANCE_MILES, DEFAULT_NUM_NEARBY};

/// How many client rows a run processes, by input order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientLimit {
    #[default]
    All,
    First(usize),
}

impl ClientLimit {
    /// Parse the user-facing option: `"all"` or empty means no limit, an
    /// integer keeps the first N rows, anything else is ignored
    pub fn parse(value: &str) -> Self {
        let value = value.trim();

        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            return Self::All;
        }

        value.parse::<usize>().map(Self::First).unwrap_or(Self::All)
    }

    pub fn apply<T>(&self, rows: Vec<T>) -> Vec<T> {
        match self {
            Self::All => rows,
            Self::First(limit) => rows.into_iter().take(*limit).collect(),
        }
    }
}

impl fmt::Display for ClientLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::First(limit) => write!(f, "{}", limit),
        }
    }
}

impl Serialize for ClientLimit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClientLimit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::parse(&value))
    }
}

/// Per-run knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOptions {
    #[serde(default = "default_num_nearby")]
    pub num_nearby: usize,
    #[serde(default = "default_min_distance")]
    pub min_distance_miles: f64,
    #[serde(default)]
    pub client_limit: ClientLimit,
}

fn default_num_nearby() -> usize {
    DEFAULT_NUM_NEARBY
}

fn default_min_distance() -> f64 {
    DEFAULT_MIN_DISTANCE_MILES
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            num_nearby: DEFAULT_NUM_NEARBY,
            min_distance_miles: DEFAULT_MIN_DISTANCE_MILES,
            client_limit: ClientLimit::All,
        }
    }
}

impl BatchOptions {
    pub fn with_num_nearby(mut self, num_nearby: usize) -> Self {
        self.num_nearby = num_nearby;
        self
    }

    pub fn with_min_distance(mut self, miles: f64) -> Self {
        self.min_distance_miles = miles;
        self
    }

    pub fn with_client_limit(mut self, limit: ClientLimit) -> Self {
        self.client_limit = limit;
        self
    }
}
