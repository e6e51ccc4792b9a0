//! Domain types for zonewatch.
//!
//! Snapshots of Auto Scaling groups and DB clusters as read from the cloud
//! APIs, and the metric records built from them. Everything here is built
//! fresh at the start of a poll cycle and dropped at the end of it.

use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::error::{MetricError, MetricResult};

/// Name of an Auto Scaling group.
pub type GroupName = String;

/// Identifier of a DB cluster.
pub type ClusterId = String;

/// Availability zone label, e.g. `us-east-1a`.
pub type Zone = String;

/// Health status string Auto Scaling reports for a healthy instance.
pub const HEALTHY: &str = "Healthy";

// ── Auto Scaling ──────────────────────────────────────────────────

/// An Auto Scaling group and its instances at one point in time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AutoScalingGroup {
    pub name: GroupName,
    /// Zones the group is configured to launch into.
    pub availability_zones: Vec<Zone>,
    pub instances: Vec<AsgInstance>,
}

/// One instance of an Auto Scaling group.
///
/// Zone and lifecycle state are optional because the API models them as
/// optional; the aggregator skips instances missing either.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AsgInstance {
    pub instance_id: String,
    pub availability_zone: Option<Zone>,
    pub lifecycle_state: Option<LifecycleState>,
    /// Raw health status, `Healthy` or `Unhealthy`.
    pub health_status: Option<String>,
}

impl AsgInstance {
    pub fn is_healthy(&self) -> bool {
        self.health_status.as_deref() == Some(HEALTHY)
    }

    /// Healthy and in service.
    pub fn is_healthy_and_in_service(&self) -> bool {
        self.is_healthy() && self.lifecycle_state == Some(LifecycleState::InService)
    }
}

/// Lifecycle state of an Auto Scaling instance.
///
/// Closed set mirroring the Auto Scaling API. Declaration order is the
/// order states are reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LifecycleState {
    Pending,
    #[serde(rename = "Pending:Wait")]
    PendingWait,
    #[serde(rename = "Pending:Proceed")]
    PendingProceed,
    Quarantined,
    InService,
    Terminating,
    #[serde(rename = "Terminating:Wait")]
    TerminatingWait,
    #[serde(rename = "Terminating:Proceed")]
    TerminatingProceed,
    Terminated,
    Detaching,
    Detached,
    EnteringStandby,
    Standby,
    #[serde(rename = "Warmed:Pending")]
    WarmedPending,
    #[serde(rename = "Warmed:Pending:Wait")]
    WarmedPendingWait,
    #[serde(rename = "Warmed:Pending:Proceed")]
    WarmedPendingProceed,
    #[serde(rename = "Warmed:Terminating")]
    WarmedTerminating,
    #[serde(rename = "Warmed:Terminating:Wait")]
    WarmedTerminatingWait,
    #[serde(rename = "Warmed:Terminating:Proceed")]
    WarmedTerminatingProceed,
    #[serde(rename = "Warmed:Terminated")]
    WarmedTerminated,
    #[serde(rename = "Warmed:Stopped")]
    WarmedStopped,
    #[serde(rename = "Warmed:Running")]
    WarmedRunning,
    #[serde(rename = "Warmed:Hibernated")]
    WarmedHibernated,
}

impl LifecycleState {
    /// Every lifecycle state, in reporting order.
    pub const ALL: [LifecycleState; 23] = [
        LifecycleState::Pending,
        LifecycleState::PendingWait,
        LifecycleState::PendingProceed,
        LifecycleState::Quarantined,
        LifecycleState::InService,
        LifecycleState::Terminating,
        LifecycleState::TerminatingWait,
        LifecycleState::TerminatingProceed,
        LifecycleState::Terminated,
        LifecycleState::Detaching,
        LifecycleState::Detached,
        LifecycleState::EnteringStandby,
        LifecycleState::Standby,
        LifecycleState::WarmedPending,
        LifecycleState::WarmedPendingWait,
        LifecycleState::WarmedPendingProceed,
        LifecycleState::WarmedTerminating,
        LifecycleState::WarmedTerminatingWait,
        LifecycleState::WarmedTerminatingProceed,
        LifecycleState::WarmedTerminated,
        LifecycleState::WarmedStopped,
        LifecycleState::WarmedRunning,
        LifecycleState::WarmedHibernated,
    ];

    /// The label the Auto Scaling API uses for this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Pending => "Pending",
            LifecycleState::PendingWait => "Pending:Wait",
            LifecycleState::PendingProceed => "Pending:Proceed",
            LifecycleState::Quarantined => "Quarantined",
            LifecycleState::InService => "InService",
            LifecycleState::Terminating => "Terminating",
            LifecycleState::TerminatingWait => "Terminating:Wait",
            LifecycleState::TerminatingProceed => "Terminating:Proceed",
            LifecycleState::Terminated => "Terminated",
            LifecycleState::Detaching => "Detaching",
            LifecycleState::Detached => "Detached",
            LifecycleState::EnteringStandby => "EnteringStandby",
            LifecycleState::Standby => "Standby",
            LifecycleState::WarmedPending => "Warmed:Pending",
            LifecycleState::WarmedPendingWait => "Warmed:Pending:Wait",
            LifecycleState::WarmedPendingProceed => "Warmed:Pending:Proceed",
            LifecycleState::WarmedTerminating => "Warmed:Terminating",
            LifecycleState::WarmedTerminatingWait => "Warmed:Terminating:Wait",
            LifecycleState::WarmedTerminatingProceed => "Warmed:Terminating:Proceed",
            LifecycleState::WarmedTerminated => "Warmed:Terminated",
            LifecycleState::WarmedStopped => "Warmed:Stopped",
            LifecycleState::WarmedRunning => "Warmed:Running",
            LifecycleState::WarmedHibernated => "Warmed:Hibernated",
        }
    }

    /// Parse an API label. Unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|state| state.as_str() == label)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── DB clusters ───────────────────────────────────────────────────

/// A DB cluster and its members at one point in time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DbCluster {
    pub identifier: ClusterId,
    pub availability_zones: Vec<Zone>,
    pub members: Vec<DbClusterMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DbClusterMember {
    pub instance_identifier: Option<String>,
    pub role: Option<ClusterRole>,
}

/// Role of a member within a DB cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClusterRole {
    Writer,
    Reader,
}

impl ClusterRole {
    pub fn from_writer_flag(is_writer: bool) -> Self {
        if is_writer {
            ClusterRole::Writer
        } else {
            ClusterRole::Reader
        }
    }
}

/// Current placement of a DB instance, as returned by an instance lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct InstanceDetail {
    pub availability_zone: Option<Zone>,
}

// ── Metrics ───────────────────────────────────────────────────────

/// Unit of a metric record. Every record zonewatch emits is a count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Unit {
    #[default]
    Count,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

/// Ordered dimension set of a metric record. Names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dimensions(Vec<Dimension>);

impl Dimensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a dimension, rejecting a name that is already present.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) -> MetricResult<()> {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(MetricError::DuplicateDimension(name));
        }
        self.0.push(Dimension {
            name,
            value: value.into(),
        });
        Ok(())
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> MetricResult<Self> {
        self.push(name, value)?;
        Ok(self)
    }

    /// Value of the named dimension.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.value.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Dimension> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Dimensions {
    type Item = &'a Dimension;
    type IntoIter = std::slice::Iter<'a, Dimension>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A single timestamped, dimensioned observation bound for the
/// monitoring backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRecord {
    name: String,
    value: f64,
    timestamp: SystemTime,
    unit: Unit,
    dimensions: Dimensions,
}

impl MetricRecord {
    /// Build a count record.
    pub fn count(
        name: impl Into<String>,
        count: u64,
        timestamp: SystemTime,
        dimensions: Dimensions,
    ) -> Self {
        Self {
            name: name.into(),
            value: count as f64,
            timestamp,
            unit: Unit::Count,
            dimensions,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    /// Shorthand for a dimension value.
    pub fn dimension(&self, name: &str) -> Option<&str> {
        self.dimensions.get(name)
    }
}
