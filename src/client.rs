use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use crate::dedupe::{save_signature, Deduper};
use crate::drilldown::JobStatusClient;
use crate::error::{ConsoleError, Result};
use crate::models::{
    BorrowerRecord, EnrollmentRecord, JobFileDetail, JobRequestDetail, JobRunItem, JobType, Page,
};
use crate::normalize::{
    coerce_borrower, coerce_record_from_response, digits, extract_enrollment_list,
    format_date_time, normalize_enrollment, normalize_status, to_api_payload,
};
use crate::store::{RecordStore, SubscriptionId};

const ENROLLMENT_DETAILS_PATH: &str = "AutoDebitEnrollments/getAutoDebitDetails";
const SAVE_DETAILS_PATH: &str = "AutoDebitEnrollments/saveAutoDebitDetails";
const BORROWER_SEARCH_PATH: &str = "AutoDebitEnrollments/getBorrowerDetailsByParam";
const JOB_RUN_STATUS_PATH: &str = "JobStatus/getJobRunStatus";
const JOB_RUN_DETAILS_PATH: &str = "JobStatus/getJobRunDetails";
const INVOKE_ENROLLMENT_PATH: &str = "JobStatus/InvokeEnrollmentJob";
const INVOKE_ACH_PATH: &str = "JobStatus/InvokeACHJob";

/// The single capability the core consumes from the excluded HTTP layer.
/// Header injection, auth, and error toasts all live behind this boundary;
/// the core only sees decoded JSON or a failed future.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(
        &self,
        method: &str,
        path: &str,
        params: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<Value>;
}

// ---------------------------------------------------------------------------
// Enrollment service
// ---------------------------------------------------------------------------

/// Enrollment CRUD over a transport, with an observable record store and
/// in-flight deduplication for fetches (keyed by SSN digits) and saves
/// (keyed by payload signature).
pub struct EnrollmentService<T: Transport + 'static> {
    transport: Arc<T>,
    store: Arc<Mutex<RecordStore<EnrollmentRecord>>>,
    fetches: Deduper<Vec<EnrollmentRecord>>,
    saves: Deduper<Value>,
}

// The store mutex only guards plain collection updates; a poisoned lock still
// holds a coherent snapshot, so recover the guard instead of propagating.
fn lock_store(
    store: &Mutex<RecordStore<EnrollmentRecord>>,
) -> MutexGuard<'_, RecordStore<EnrollmentRecord>> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T: Transport + 'static> EnrollmentService<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            store: Arc::new(Mutex::new(RecordStore::new())),
            fetches: Deduper::new(),
            saves: Deduper::new(),
        }
    }

    /// Fetch enrollment details by SSN, normalize them, and replace the store
    /// contents. Concurrent calls for the same SSN share one request.
    pub async fn fetch_by_ssn(&self, ssn: &str) -> Result<Vec<EnrollmentRecord>> {
        let key = digits(ssn);
        let transport = Arc::clone(&self.transport);
        let store = Arc::clone(&self.store);
        let ssn_digits = key.clone();
        self.fetches
            .run(&key, move || async move {
                let resp = transport
                    .request(
                        "GET",
                        ENROLLMENT_DETAILS_PATH,
                        &[("ssn", ssn_digits)],
                        None,
                    )
                    .await?;
                let rows: Vec<EnrollmentRecord> = extract_enrollment_list(&resp)
                    .iter()
                    .map(normalize_enrollment)
                    .collect();
                lock_store(&store).set_all(rows.clone());
                Ok(rows)
            })
            .await
    }

    /// Fetch a single enrollment by its backend id.
    pub async fn fetch_by_id(&self, id: &str) -> Result<EnrollmentRecord> {
        let path = format!("{ENROLLMENT_DETAILS_PATH}/{id}");
        let resp = self.transport.request("GET", &path, &[], None).await?;
        coerce_record_from_response(&resp)
            .ok_or_else(|| ConsoleError::Payload(format!("no enrollment in response for id {id}")))
    }

    /// Create or update an enrollment. Two saves with identical derived
    /// payload fields inside the in-flight window coalesce into one POST,
    /// which is what prevents duplicate record creation on double-submit.
    pub async fn save_details(&self, record: &EnrollmentRecord, ssn: &str) -> Result<Value> {
        let body = to_api_payload(record, ssn);
        let key = save_signature(&body);
        let transport = Arc::clone(&self.transport);
        self.saves
            .run(&key, move || async move {
                transport
                    .request("POST", SAVE_DETAILS_PATH, &[], Some(body))
                    .await
            })
            .await
    }

    /// Optimistic update from a save response: patch the row that was being
    /// edited with the record echoed by the backend. A missing or id-less
    /// echo leaves the store untouched (the follow-up refetch reconciles).
    pub fn apply_saved(&self, edited_id: &str, resp: &Value) {
        let Some(saved) = coerce_record_from_response(resp) else {
            return;
        };
        if saved.id.is_empty() || edited_id.is_empty() {
            return;
        }
        lock_store(&self.store).patch_by_id(edited_id, |row| *row = saved.clone());
    }

    // -- store passthrough --------------------------------------------------

    pub fn rows(&self) -> Vec<EnrollmentRecord> {
        lock_store(&self.store).get_all()
    }

    pub fn set_rows(&self, rows: Vec<EnrollmentRecord>) {
        lock_store(&self.store).set_all(rows);
    }

    pub fn update_row(&self, index: usize, patch: impl FnOnce(&mut EnrollmentRecord)) {
        lock_store(&self.store).patch_at(index, patch);
    }

    pub fn update_row_by_id(&self, id: &str, patch: impl FnOnce(&mut EnrollmentRecord)) {
        lock_store(&self.store).patch_by_id(id, patch);
    }

    pub fn subscribe(
        &self,
        callback: impl Fn(&[EnrollmentRecord]) + Send + Sync + 'static,
    ) -> SubscriptionId {
        lock_store(&self.store).subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        lock_store(&self.store).unsubscribe(id);
    }
}

// ---------------------------------------------------------------------------
// Borrower search
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchBy {
    AccountNumber,
    Ssn,
}

impl SearchBy {
    fn code(&self) -> &'static str {
        match self {
            Self::AccountNumber => "accountnumber",
            Self::Ssn => "ssn",
        }
    }
}

pub struct BorrowerSearch<T: Transport> {
    transport: Arc<T>,
}

impl<T: Transport> BorrowerSearch<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// Search a borrower by account number or SSN. Transport failures and
    /// keyless payloads both come back as "no match" — the error surface for
    /// failures is the excluded toast layer, not this return value.
    pub async fn search(&self, search_by: SearchBy, value: &str) -> Option<BorrowerRecord> {
        let resp = self
            .transport
            .request(
                "GET",
                BORROWER_SEARCH_PATH,
                &[
                    ("searchBy", search_by.code().to_string()),
                    ("searchValue", value.trim().to_string()),
                ],
                None,
            )
            .await;
        match resp {
            Ok(resp) => coerce_borrower(&resp),
            Err(e) => {
                tracing::warn!(error = %e, "borrower search failed");
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Job status service
// ---------------------------------------------------------------------------

pub struct JobStatusService<T: Transport> {
    transport: Arc<T>,
}

impl<T: Transport> JobStatusService<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }
}

fn str_field(v: &Value, key: &str) -> String {
    match v.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn u32_field(v: &Value, key: &str) -> u32 {
    v.get(key).and_then(Value::as_u64).unwrap_or(0) as u32
}

fn parse_page_meta(resp: &Value, data_len: usize) -> (u32, u32, u64) {
    let page_number = u32_field(resp, "pageNumber");
    let page_size = u32_field(resp, "pageSize");
    let total_count = resp
        .get("totalCount")
        .and_then(Value::as_u64)
        .unwrap_or(data_len as u64);
    (page_number, page_size, total_count)
}

fn parse_request(raw: &Value) -> JobRequestDetail {
    let time = |key: &str| {
        let v = str_field(raw, key);
        if v.is_empty() {
            v
        } else {
            format_date_time(&v)
        }
    };
    JobRequestDetail {
        request_key: str_field(raw, "requestKey"),
        payload: str_field(raw, "requestPayload"),
        retry_attempt: u32_field(raw, "retryAttempt"),
        status: normalize_status(&str_field(raw, "status")),
        started_at: time("startedAt"),
        finished_at: time("finishedAt"),
    }
}

fn parse_file(raw: &Value) -> JobFileDetail {
    let requests = raw
        .get("requests")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().map(parse_request).collect())
        .unwrap_or_default();
    let mut file = JobFileDetail {
        file_run_id: str_field(raw, "fileRunId"),
        file_name: str_field(raw, "fileName"),
        file_location: str_field(raw, "fileLocation"),
        status: {
            let s = str_field(raw, "status");
            if s.is_empty() {
                "Completed".to_string()
            } else {
                s
            }
        },
        requests,
        ..Default::default()
    };
    file.tally();
    file
}

#[async_trait]
impl<T: Transport> JobStatusClient for JobStatusService<T> {
    async fn run_status(
        &self,
        job_type: JobType,
        page_number: u32,
        page_size: u32,
    ) -> Result<Page<JobRunItem>> {
        let resp = self
            .transport
            .request(
                "GET",
                JOB_RUN_STATUS_PATH,
                &[
                    ("jobType", job_type.code().to_string()),
                    ("pageNumber", page_number.to_string()),
                    ("pageSize", page_size.to_string()),
                ],
                None,
            )
            .await?;
        let data: Vec<JobRunItem> = resp
            .get("data")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .map(|raw| JobRunItem {
                        job_run_id: str_field(raw, "jobRunId"),
                        started_at: str_field(raw, "startedAt"),
                        processed_file_count: u32_field(raw, "processedFileCount"),
                        status: str_field(raw, "status"),
                    })
                    .collect()
            })
            .unwrap_or_default();
        let (page_number, page_size, total_count) = parse_page_meta(&resp, data.len());
        Ok(Page { data, page_number, page_size, total_count })
    }

    async fn run_details(
        &self,
        job_run_id: &str,
        page_number: u32,
        page_size: u32,
    ) -> Result<Page<JobFileDetail>> {
        let path = format!("{JOB_RUN_DETAILS_PATH}/{job_run_id}");
        let resp = self
            .transport
            .request(
                "GET",
                &path,
                &[
                    ("pageNumber", page_number.to_string()),
                    ("pageSize", page_size.to_string()),
                ],
                None,
            )
            .await?;
        let data: Vec<JobFileDetail> = resp
            .get("data")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().map(parse_file).collect())
            .unwrap_or_default();
        let (page_number, page_size, total_count) = parse_page_meta(&resp, data.len());
        Ok(Page { data, page_number, page_size, total_count })
    }

    async fn invoke_enrollment_job(&self) -> Result<()> {
        self.transport
            .request("POST", INVOKE_ENROLLMENT_PATH, &[], Some(Value::Null))
            .await?;
        Ok(())
    }

    async fn invoke_ach_job(&self, cycle_date: &str) -> Result<Option<String>> {
        let resp = self
            .transport
            .request(
                "POST",
                INVOKE_ACH_PATH,
                &[("cycleDate", cycle_date.to_string())],
                Some(Value::Null),
            )
            .await?;
        let message = resp
            .get("message")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Ok(message)
    }
}
