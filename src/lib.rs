//! Data-presentation core for an auto-debit enrollment admin console.
//!
//! Everything here is framework-agnostic: services talk to the backend
//! through the [`client::Transport`] trait, publish normalized rows through
//! [`store::RecordStore`], and leave rendering, routing, and auth to the
//! hosting shell. The tolerant-normalization rules in [`normalize`] exist
//! because the backend's field names and formats drift between endpoints.

pub mod client;
pub mod dedupe;
pub mod drilldown;
pub mod error;
pub mod history;
pub mod models;
pub mod normalize;
pub mod sort;
pub mod store;

pub use client::{BorrowerSearch, EnrollmentService, JobStatusService, SearchBy, Transport};
pub use dedupe::Deduper;
pub use drilldown::{JobConsole, JobStatusClient};
pub use error::{ConsoleError, Result};
pub use models::{
    BorrowerRecord, BorrowerStatus, EnrollmentRecord, JobFileDetail, JobRequestDetail, JobRunItem,
    JobType, Page, RequestStatus,
};
pub use sort::{SortDirection, SortState};
pub use store::RecordStore;
