use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;

/// Health of a single registered component.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    /// No determination was made. Counts as a failure when aggregating.
    #[default]
    Unknown,
    /// Configured, dependencies reachable, smoke checks passed.
    On,
    /// Disabled on purpose (configuration or feature flag). Not a failure.
    Off,
    /// Enabled but a dependency, config value or smoke check failed.
    Fail,
    /// No terminal result before the caller's deadline.
    Timeout,
}

impl ComponentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::On => "on",
            Self::Off => "off",
            Self::Fail => "fail",
            Self::Timeout => "timeout",
        }
    }

    /// Whether this status forces `NotServing` when reported by a required component.
    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::On)
    }
}

impl fmt::Display for ComponentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a component's failure can by itself take the service out of rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Presence {
    #[default]
    Required,
    Optional,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallStatus {
    #[default]
    Unknown,
    Serving,
    NotServing,
}

impl OverallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Serving => "SERVING",
            Self::NotServing => "NOT_SERVING",
        }
    }

    pub fn is_serving(&self) -> bool {
        *self == Self::Serving
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw output of one checker invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentResult {
    pub status: ComponentStatus,
    pub description: String,
    /// Checker-defined numeric telemetry, e.g. open connection counts.
    pub stats: HashMap<String, i64>,
}

impl ComponentResult {
    pub fn on(description: impl Into<String>) -> Self {
        Self::new(ComponentStatus::On, description)
    }

    pub fn off(description: impl Into<String>) -> Self {
        Self::new(ComponentStatus::Off, description)
    }

    pub fn fail(description: impl Into<String>) -> Self {
        Self::new(ComponentStatus::Fail, description)
    }

    pub fn new(status: ComponentStatus, description: impl Into<String>) -> Self {
        Self {
            status,
            description: description.into(),
            stats: HashMap::new(),
        }
    }

    pub fn with_stat(mut self, key: impl Into<String>, value: i64) -> Self {
        self.stats.insert(key.into(), value);
        self
    }
}

/// A component result annotated with its owner and the time elapsed since the check began.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ComponentReport {
    #[serde(rename = "component_name")]
    pub name: String,
    pub status: ComponentStatus,
    pub description: String,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub stats: HashMap<String, i64>,
    #[serde(serialize_with = "serialize_nanos")]
    pub duration: Duration,
}

impl ComponentReport {
    pub fn from_result(name: impl Into<String>, result: ComponentResult, duration: Duration) -> Self {
        Self {
            name: name.into(),
            status: result.status,
            description: result.description,
            stats: result.stats,
            duration,
        }
    }

    pub fn timeout(name: impl Into<String>, description: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            status: ComponentStatus::Timeout,
            description: description.into(),
            stats: HashMap::new(),
            duration,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct OverallReport {
    pub status: OverallStatus,
    /// Number of components per status name.
    pub stats: BTreeMap<String, usize>,
    /// Ordered by `duration`, fastest first.
    pub components: Vec<ComponentReport>,
    #[serde(serialize_with = "serialize_nanos")]
    pub duration: Duration,
}

impl OverallReport {
    pub fn is_serving(&self) -> bool {
        self.status.is_serving()
    }

    pub fn count(&self, status: ComponentStatus) -> usize {
        self.stats.get(status.as_str()).copied().unwrap_or(0)
    }

    pub fn component(&self, name: &str) -> Option<&ComponentReport> {
        self.components.iter().find(|c| c.name == name)
    }
}

// Durations go over the wire as integer nanoseconds.
fn serialize_nanos<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
    serializer.serialize_u64(nanos)
}
