//! Fault reports for machines marked out of order.
//!
//! The engine only flips a machine to broken; whatever the user typed into
//! the report form goes to a [`FaultReporter`].

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use uuid::Uuid;

use crate::types::MachineId;

#[cfg(test)]
use mockall::automock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultReport {
    pub report_id: Uuid,
    pub machine_id: MachineId,
    pub message: String,
    pub reported_at: DateTime<Utc>,
}

impl FaultReport {
    pub fn new(machine_id: MachineId, message: impl Into<String>) -> Self {
        Self {
            report_id: Uuid::new_v4(),
            machine_id,
            message: message.into(),
            reported_at: Utc::now(),
        }
    }
}

/// Destination for fault reports
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FaultReporter: Send + Sync {
    async fn record(&self, report: &FaultReport) -> Result<()>;
}

/// Writes each report to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingFaultReporter;

#[async_trait]
impl FaultReporter for TracingFaultReporter {
    async fn record(&self, report: &FaultReport) -> Result<()> {
        tracing::warn!(
            report_id = %report.report_id,
            machine_id = %report.machine_id,
            reported_at = %report.reported_at.to_rfc3339(),
            "Reporting machine #{}: {}",
            report.machine_id,
            report.message
        );
        Ok(())
    }
}

/// Keeps reports in memory, oldest first.
#[derive(Debug, Default)]
pub struct MemoryFaultReporter {
    reports: Mutex<Vec<FaultReport>>,
}

impl MemoryFaultReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<FaultReport> {
        self.reports
            .lock()
            .map(|reports| reports.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().map(|reports| reports.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl FaultReporter for MemoryFaultReporter {
    async fn record(&self, report: &FaultReport) -> Result<()> {
        self.reports
            .lock()
            .map_err(|_| anyhow::anyhow!("Fault report store is poisoned"))?
            .push(report.clone());
        Ok(())
    }
}
