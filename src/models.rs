use serde::{Deserialize, Serialize};

/// One auto-debit enrollment row. All dates are `MM/DD/YYYY` text; Y/N flags
/// are stored as the single uppercase letter or empty when unknown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    /// Opaque backend identifier; empty until the record is persisted.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub eft_control: String,
    #[serde(default)]
    pub eft_eligible: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    /// Same underlying value as `routing_number`; kept under both names
    /// because the list view and the detail form label it differently.
    #[serde(default)]
    pub bank_id: String,
    #[serde(default)]
    pub routing_number: String,
    #[serde(default)]
    pub account_number: String,
    /// Checking/savings indicator, single letter, stored uppercase.
    #[serde(default)]
    pub cs_ind: String,
    #[serde(default)]
    pub last_change: String,
    /// `override` is a keyword; the outbound body calls this overrideSwitch.
    #[serde(default, rename = "override")]
    pub override_switch: String,
    /// Day-of-month as text; backends send both numbers and numeric strings.
    #[serde(default)]
    pub process_day: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BorrowerStatus {
    #[default]
    Active,
    Inactive,
}

/// A borrower located by SSN or account-number search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BorrowerRecord {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub status: BorrowerStatus,
    /// Display-formatted `XXX-XX-XXXX` when nine digits were supplied.
    #[serde(default)]
    pub ssn: String,
    #[serde(default)]
    pub account_number: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub avatar_url: String,
}

// ---------------------------------------------------------------------------
// Job console hierarchy: run -> file -> request
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobType {
    Enrollment,
    Ach,
}

impl JobType {
    /// Wire code used by the job-status endpoint.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Enrollment => "E",
            Self::Ach => "A",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RequestStatus {
    Succeeded,
    Failed,
    Rejected,
    Pending,
    #[default]
    Unclassified,
}

impl RequestStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Rejected => "Rejected",
            Self::Pending => "Pending",
            Self::Unclassified => "",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobRunItem {
    pub job_run_id: String,
    /// Display form `MM/DD/YYYY HH:MM AM/PM`.
    pub started_at: String,
    pub processed_file_count: u32,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobRequestDetail {
    pub request_key: String,
    pub payload: String,
    pub retry_attempt: u32,
    pub status: RequestStatus,
    pub started_at: String,
    pub finished_at: String,
}

/// Per-file detail for a run. The success/failed/rejected counts are always
/// derived from `requests`, never taken from the backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobFileDetail {
    pub file_run_id: String,
    pub file_name: String,
    pub file_location: String,
    pub status: String,
    pub requests: Vec<JobRequestDetail>,
    pub succeeded: u32,
    pub failed: u32,
    pub rejected: u32,
    pub pending: u32,
}

impl JobFileDetail {
    pub fn request_count(&self) -> usize {
        self.requests.len()
    }

    /// Recompute the derived status counts from the child requests.
    pub fn tally(&mut self) {
        self.succeeded = 0;
        self.failed = 0;
        self.rejected = 0;
        self.pending = 0;
        for req in &self.requests {
            match req.status {
                RequestStatus::Succeeded => self.succeeded += 1,
                RequestStatus::Failed => self.failed += 1,
                RequestStatus::Rejected => self.rejected += 1,
                RequestStatus::Pending => self.pending += 1,
                RequestStatus::Unclassified => {}
            }
        }
    }
}

/// Server-paged response window. Page numbers on the wire are 1-based.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub page_number: u32,
    pub page_size: u32,
    pub total_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_type_codes() {
        assert_eq!(JobType::Enrollment.code(), "E");
        assert_eq!(JobType::Ach.code(), "A");
    }

    #[test]
    fn test_file_tally_counts_by_status() {
        let mut file = JobFileDetail {
            requests: vec![
                JobRequestDetail { status: RequestStatus::Succeeded, ..Default::default() },
                JobRequestDetail { status: RequestStatus::Succeeded, ..Default::default() },
                JobRequestDetail { status: RequestStatus::Failed, ..Default::default() },
                JobRequestDetail { status: RequestStatus::Rejected, ..Default::default() },
                JobRequestDetail { status: RequestStatus::Pending, ..Default::default() },
                JobRequestDetail { status: RequestStatus::Unclassified, ..Default::default() },
            ],
            ..Default::default()
        };
        file.tally();
        assert_eq!(file.succeeded, 2);
        assert_eq!(file.failed, 1);
        assert_eq!(file.rejected, 1);
        assert_eq!(file.pending, 1);
        assert_eq!(file.request_count(), 6);
    }

    #[test]
    fn test_tally_resets_previous_counts() {
        let mut file = JobFileDetail {
            succeeded: 9,
            failed: 9,
            rejected: 9,
            pending: 9,
            ..Default::default()
        };
        file.tally();
        assert_eq!((file.succeeded, file.failed, file.rejected, file.pending), (0, 0, 0, 0));
    }
}
