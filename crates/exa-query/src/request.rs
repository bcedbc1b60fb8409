//! Query parameters.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use exa_core::Error;

/// The seven reports, numbered as callers request them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportKind {
    /// 1: device count per cluster
    Inventory,
    /// 2: controller firmware per device
    Firmware,
    /// 3: software version per cluster
    ClusterVersion,
    /// 4: battery expiration per device
    BbuLifecycle,
    /// 5: capacity and port type per cluster
    Capacity,
    /// 6: controller serial numbers per device
    Serial,
    /// 7: controller and EMF addresses per device
    Ip,
}

impl ReportKind {
    /// Numeric id of the report.
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::Inventory => 1,
            Self::Firmware => 2,
            Self::ClusterVersion => 3,
            Self::BbuLifecycle => 4,
            Self::Capacity => 5,
            Self::Serial => 6,
            Self::Ip => 7,
        }
    }
}

impl TryFrom<i64> for ReportKind {
    type Error = Error;

    fn try_from(id: i64) -> Result<Self, Self::Error> {
        match id {
            1 => Ok(Self::Inventory),
            2 => Ok(Self::Firmware),
            3 => Ok(Self::ClusterVersion),
            4 => Ok(Self::BbuLifecycle),
            5 => Ok(Self::Capacity),
            6 => Ok(Self::Serial),
            7 => Ok(Self::Ip),
            other => Err(Error::InvalidReport(other)),
        }
    }
}

/// One query: which report, which filters, and the date battery life is measured from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Requested report id (1-7); validated when the query runs
    pub report_id: i64,
    /// Case-insensitive `Asset_owner` filter
    pub owner: Option<String>,
    /// Case-insensitive cluster name filter; the all-clusters sentinel disables it
    pub cluster: Option<String>,
    /// Current date for remaining-life calculations
    pub today: NaiveDate,
}

impl QueryRequest {
    /// Create an unfiltered request.
    #[must_use]
    pub fn new(report_id: i64, today: NaiveDate) -> Self {
        Self {
            report_id,
            owner: None,
            cluster: None,
            today,
        }
    }

    /// Filter by asset owner.
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Filter by cluster name.
    #[must_use]
    pub fn with_cluster(mut self, cluster: impl Into<String>) -> Self {
        self.cluster = Some(cluster.into());
        self
    }

    /// The requested report.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidReport`] for ids outside 1-7.
    pub fn kind(&self) -> Result<ReportKind, Error> {
        ReportKind::try_from(self.report_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_ids() {
        for id in 1..=7 {
            assert_eq!(i64::from(ReportKind::try_from(id).unwrap().id()), id);
        }
        assert_eq!(ReportKind::try_from(0), Err(Error::InvalidReport(0)));
        assert_eq!(ReportKind::try_from(8), Err(Error::InvalidReport(8)));
    }

    #[test]
    fn test_wide_report_ids_do_not_wrap() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert_eq!(
            QueryRequest::new(257, today).kind(),
            Err(Error::InvalidReport(257))
        );
        assert_eq!(
            QueryRequest::new(-1, today).kind(),
            Err(Error::InvalidReport(-1))
        );
        assert_eq!(
            ReportKind::try_from(i64::from(u32::MAX) + 1),
            Err(Error::InvalidReport(4_294_967_296))
        );
    }

    #[test]
    fn test_request_builder() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let request = QueryRequest::new(4, today)
            .with_owner("IDEA")
            .with_cluster("exa1");
        assert_eq!(request.owner.as_deref(), Some("IDEA"));
        assert_eq!(request.cluster.as_deref(), Some("exa1"));
        assert_eq!(request.kind().unwrap(), ReportKind::BbuLifecycle);
    }
}
