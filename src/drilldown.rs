use async_trait::async_trait;

use crate::error::{ConsoleError, Result};
use crate::models::{JobFileDetail, JobRequestDetail, JobRunItem, JobType, Page, RequestStatus};
use crate::normalize::{format_date_time, normalize_cycle_date};
use crate::sort::{apply_sort, paginate, total_pages, ColumnKind, SortKey, SortState};

/// Backend capability the console drills into. Page numbers here are 1-based
/// (the wire contract); the console tracks 0-based page indexes and converts.
#[async_trait]
pub trait JobStatusClient: Send + Sync {
    async fn run_status(
        &self,
        job_type: JobType,
        page_number: u32,
        page_size: u32,
    ) -> Result<Page<JobRunItem>>;

    async fn run_details(
        &self,
        job_run_id: &str,
        page_number: u32,
        page_size: u32,
    ) -> Result<Page<JobFileDetail>>;

    async fn invoke_enrollment_job(&self) -> Result<()>;

    async fn invoke_ach_job(&self, cycle_date: &str) -> Result<Option<String>>;
}

// ---------------------------------------------------------------------------
// Column identifiers per drill-down level
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunColumn {
    LastRun,
    FilesCount,
    Status,
}

impl RunColumn {
    fn kind(&self) -> ColumnKind {
        match self {
            Self::LastRun => ColumnKind::Date,
            Self::FilesCount => ColumnKind::Number,
            Self::Status => ColumnKind::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileColumn {
    Name,
    Location,
    Count,
    Succeeded,
    Failed,
    Rejected,
    Status,
}

impl FileColumn {
    fn kind(&self) -> ColumnKind {
        match self {
            Self::Count | Self::Succeeded | Self::Failed | Self::Rejected => ColumnKind::Number,
            _ => ColumnKind::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestColumn {
    Key,
    Payload,
    Status,
    Retry,
    Start,
    End,
}

impl RequestColumn {
    fn kind(&self) -> ColumnKind {
        match self {
            Self::Retry => ColumnKind::Number,
            Self::Start | Self::End => ColumnKind::Date,
            _ => ColumnKind::Text,
        }
    }
}

const DEFAULT_PAGE_SIZE: usize = 10;

/// Three-level drill-down (run -> file -> request) with one open row per
/// level. Expanding or collapsing a row resets every descendant level's
/// selection, filter, and page state; ancestor state is never touched by
/// descendant changes. Run and file levels are server-paged; the request
/// level pages the cached file detail in memory.
pub struct JobConsole {
    job_type: JobType,

    runs: Vec<JobRunItem>,
    run_sort: SortState<RunColumn>,
    run_page_index: usize,
    run_page_size: usize,
    run_total: usize,
    expanded_run: Option<usize>,
    current_job_run_id: Option<String>,

    files: Vec<JobFileDetail>,
    file_sort: SortState<FileColumn>,
    files_page_index: usize,
    files_page_size: usize,
    files_total: usize,
    expanded_file: Option<usize>,

    requests: Vec<JobRequestDetail>,
    request_sort: SortState<RequestColumn>,
    request_filter: Option<RequestStatus>,
    request_page_index: usize,
    request_page_size: usize,
}

impl JobConsole {
    pub fn new(job_type: JobType) -> Self {
        Self {
            job_type,
            runs: Vec::new(),
            run_sort: SortState::new(),
            run_page_index: 0,
            run_page_size: DEFAULT_PAGE_SIZE,
            run_total: 0,
            expanded_run: None,
            current_job_run_id: None,
            files: Vec::new(),
            file_sort: SortState::new(),
            files_page_index: 0,
            files_page_size: DEFAULT_PAGE_SIZE,
            files_total: 0,
            expanded_file: None,
            requests: Vec::new(),
            request_sort: SortState::new(),
            request_filter: None,
            request_page_index: 0,
            request_page_size: DEFAULT_PAGE_SIZE,
        }
    }

    // -- run level ----------------------------------------------------------

    /// Load one server page of job runs. Collapses the run selection (the row
    /// set underneath it is being replaced) and therefore all descendants.
    pub async fn load_run_page(
        &mut self,
        client: &impl JobStatusClient,
        page_index: usize,
        page_size: usize,
    ) -> Result<()> {
        let page = client
            .run_status(self.job_type, page_index as u32 + 1, page_size as u32)
            .await?;
        tracing::debug!(
            job_type = self.job_type.code(),
            page_index,
            rows = page.data.len(),
            "loaded run page"
        );
        self.runs = page
            .data
            .into_iter()
            .map(|mut run| {
                run.started_at = format_date_time(&run.started_at);
                run.status = if run.status.to_lowercase().contains("run") {
                    "Running".to_string()
                } else {
                    "Completed".to_string()
                };
                run
            })
            .collect();
        self.run_page_index = page_index;
        self.run_page_size = page_size;
        self.run_total = if page.total_count > 0 {
            page.total_count as usize
        } else {
            self.runs.len()
        };
        self.collapse_run_selection();
        Ok(())
    }

    /// Expand or collapse a run row. Expansion lazily fetches the first file
    /// page, but only when the run reports at least one processed file.
    pub async fn toggle_run(
        &mut self,
        client: &impl JobStatusClient,
        index: usize,
    ) -> Result<()> {
        let expanding = self.expanded_run != Some(index);
        self.expanded_run = if expanding { Some(index) } else { None };
        self.reset_file_level();
        self.reset_request_level();

        if !expanding {
            return Ok(());
        }
        match self.runs.get(index) {
            Some(run) if !run.job_run_id.is_empty() && run.processed_file_count > 0 => {
                self.current_job_run_id = Some(run.job_run_id.clone());
                self.load_files_page(client, 0, self.files_page_size).await
            }
            _ => {
                // Nothing to fetch; make sure stale detail is not shown.
                self.current_job_run_id = None;
                self.clear_file_data();
                Ok(())
            }
        }
    }

    pub fn set_run_sort(&mut self, column: RunColumn) {
        self.run_sort.cycle(column);
        self.collapse_run_selection();
    }

    /// Current run page in display order.
    pub fn visible_runs(&self) -> Vec<JobRunItem> {
        apply_sort(&self.runs, &self.run_sort, |run, column| {
            let cell = match column {
                RunColumn::LastRun => run.started_at.as_str(),
                RunColumn::Status => run.status.as_str(),
                RunColumn::FilesCount => {
                    return SortKey::Number(run.processed_file_count as f64)
                }
            };
            SortKey::from_cell(cell, column.kind())
        })
    }

    pub async fn go_to_run_page(
        &mut self,
        client: &impl JobStatusClient,
        page_index: usize,
    ) -> Result<()> {
        let bounded = page_index.min(self.total_run_pages() - 1);
        if bounded == self.run_page_index {
            return Ok(());
        }
        self.load_run_page(client, bounded, self.run_page_size).await
    }

    pub async fn set_run_page_size(
        &mut self,
        client: &impl JobStatusClient,
        page_size: usize,
    ) -> Result<()> {
        self.load_run_page(client, 0, page_size).await
    }

    pub fn total_run_pages(&self) -> usize {
        total_pages(self.run_total.max(self.runs.len()), self.run_page_size)
    }

    pub fn expanded_run(&self) -> Option<usize> {
        self.expanded_run
    }

    // -- file level ---------------------------------------------------------

    async fn load_files_page(
        &mut self,
        client: &impl JobStatusClient,
        page_index: usize,
        page_size: usize,
    ) -> Result<()> {
        let Some(run_id) = self.current_job_run_id.clone() else {
            self.clear_file_data();
            return Ok(());
        };
        let page = client
            .run_details(&run_id, page_index as u32 + 1, page_size as u32)
            .await?;
        tracing::debug!(run_id, page_index, files = page.data.len(), "loaded file page");
        self.files = page
            .data
            .into_iter()
            .map(|mut file| {
                // Counts are derived from the child requests, never trusted
                // from the wire.
                file.tally();
                file
            })
            .collect();
        self.files_page_index = page_index;
        self.files_page_size = page_size;
        self.files_total = if page.total_count > 0 {
            page.total_count as usize
        } else {
            self.files.len()
        };
        self.reset_request_level();
        self.expanded_file = None;
        Ok(())
    }

    /// Expand or collapse a file row. Opening populates the request level
    /// from the cached file detail; any active status filter is cleared.
    pub fn toggle_file(&mut self, index: usize) {
        let expanding = self.expanded_file != Some(index);
        self.expanded_file = if expanding { Some(index) } else { None };
        self.reset_request_level();
        if expanding {
            self.requests = self
                .files
                .get(index)
                .map(|f| f.requests.clone())
                .unwrap_or_default();
        }
    }

    /// Status-badge activation under a file row: opens the row if needed and
    /// applies the filter; re-activating the same status clears it.
    pub fn show_requests_for(&mut self, index: usize, status: RequestStatus) {
        if self.expanded_file != Some(index) {
            self.expanded_file = Some(index);
            self.requests = self
                .files
                .get(index)
                .map(|f| f.requests.clone())
                .unwrap_or_default();
            self.request_sort.reset();
            self.request_filter = Some(status);
        } else {
            self.request_filter = if self.request_filter == Some(status) {
                None
            } else {
                Some(status)
            };
        }
        self.request_page_index = 0;
    }

    pub fn set_file_sort(&mut self, column: FileColumn) {
        self.file_sort.cycle(column);
        self.reset_request_level();
        self.expanded_file = None;
    }

    /// Current file page in display order.
    pub fn visible_files(&self) -> Vec<JobFileDetail> {
        apply_sort(&self.files, &self.file_sort, |file, column| {
            let number = match column {
                FileColumn::Count => Some(file.request_count() as f64),
                FileColumn::Succeeded => Some(file.succeeded as f64),
                FileColumn::Failed => Some(file.failed as f64),
                FileColumn::Rejected => Some(file.rejected as f64),
                _ => None,
            };
            if let Some(n) = number {
                return SortKey::Number(n);
            }
            let cell = match column {
                FileColumn::Name => file.file_name.as_str(),
                FileColumn::Location => file.file_location.as_str(),
                _ => file.status.as_str(),
            };
            SortKey::from_cell(cell, column.kind())
        })
    }

    pub async fn go_to_files_page(
        &mut self,
        client: &impl JobStatusClient,
        page_index: usize,
    ) -> Result<()> {
        let bounded = page_index.min(self.total_file_pages() - 1);
        if bounded == self.files_page_index || self.current_job_run_id.is_none() {
            return Ok(());
        }
        self.load_files_page(client, bounded, self.files_page_size).await
    }

    /// Changing the page size resets to the first page and refetches (the
    /// file level is server-paged).
    pub async fn set_files_page_size(
        &mut self,
        client: &impl JobStatusClient,
        page_size: usize,
    ) -> Result<()> {
        self.files_page_size = page_size;
        self.files_page_index = 0;
        if self.current_job_run_id.is_some() {
            self.load_files_page(client, 0, page_size).await?;
        }
        Ok(())
    }

    pub fn total_file_pages(&self) -> usize {
        total_pages(self.files_total.max(self.files.len()), self.files_page_size)
    }

    pub fn expanded_file(&self) -> Option<usize> {
        self.expanded_file
    }

    // -- request level ------------------------------------------------------

    pub fn request_filter(&self) -> Option<RequestStatus> {
        self.request_filter
    }

    fn filtered_requests(&self) -> Vec<JobRequestDetail> {
        match self.request_filter {
            Some(status) => self
                .requests
                .iter()
                .filter(|r| r.status == status)
                .cloned()
                .collect(),
            None => self.requests.clone(),
        }
    }

    /// The current request page: filter, then sort, then slice.
    pub fn visible_requests(&self) -> Vec<JobRequestDetail> {
        let sorted = apply_sort(&self.filtered_requests(), &self.request_sort, |req, column| {
            let cell = match column {
                RequestColumn::Key => req.request_key.as_str(),
                RequestColumn::Payload => req.payload.as_str(),
                RequestColumn::Status => req.status.label(),
                RequestColumn::Retry => return SortKey::Number(req.retry_attempt as f64),
                RequestColumn::Start => req.started_at.as_str(),
                RequestColumn::End => req.finished_at.as_str(),
            };
            SortKey::from_cell(cell, column.kind())
        });
        paginate(&sorted, self.request_page_index, self.request_page_size).to_vec()
    }

    pub fn set_request_sort(&mut self, column: RequestColumn) {
        self.request_sort.cycle(column);
        self.request_page_index = 0;
    }

    pub fn go_to_request_page(&mut self, page_index: usize) {
        self.request_page_index = page_index.min(self.total_request_pages() - 1);
    }

    /// The request level is paged in memory; no refetch on size change.
    pub fn set_request_page_size(&mut self, page_size: usize) {
        self.request_page_size = page_size;
        self.request_page_index = 0;
    }

    pub fn total_request_pages(&self) -> usize {
        total_pages(self.filtered_requests().len(), self.request_page_size)
    }

    pub fn request_count(&self) -> usize {
        self.filtered_requests().len()
    }

    // -- job invocation -----------------------------------------------------

    /// Kick off the enrollment batch job, then reload the first run page.
    pub async fn invoke_enrollment(&mut self, client: &impl JobStatusClient) -> Result<()> {
        client.invoke_enrollment_job().await?;
        tracing::debug!("enrollment job invoked");
        self.load_run_page(client, 0, self.run_page_size).await
    }

    /// Kick off the ACH batch job for a cycle date, then reload the first run
    /// page. Returns the message to surface to the user.
    pub async fn invoke_ach(
        &mut self,
        client: &impl JobStatusClient,
        cycle_date: &str,
    ) -> Result<String> {
        let normalized = normalize_cycle_date(cycle_date);
        if normalized.is_empty() {
            return Err(ConsoleError::Other("Cycle Date is required".to_string()));
        }
        let message = client.invoke_ach_job(&normalized).await?;
        self.load_run_page(client, 0, self.run_page_size).await?;
        Ok(message.unwrap_or_else(|| "ACH job invoked successfully".to_string()))
    }

    // -- descendant resets --------------------------------------------------

    fn collapse_run_selection(&mut self) {
        self.expanded_run = None;
        self.current_job_run_id = None;
        self.clear_file_data();
        self.reset_file_level();
        self.reset_request_level();
    }

    fn clear_file_data(&mut self) {
        self.files.clear();
        self.files_total = 0;
        self.requests.clear();
    }

    fn reset_file_level(&mut self) {
        self.files_page_index = 0;
        self.expanded_file = None;
    }

    fn reset_request_level(&mut self) {
        self.requests.clear();
        self.request_filter = None;
        self.request_page_index = 0;
        self.request_sort.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn run(id: &str, files: u32, status: &str) -> JobRunItem {
        JobRunItem {
            job_run_id: id.to_string(),
            started_at: "2024-01-05T08:30:00".to_string(),
            processed_file_count: files,
            status: status.to_string(),
        }
    }

    fn request(key: &str, status: RequestStatus) -> JobRequestDetail {
        JobRequestDetail {
            request_key: key.to_string(),
            status,
            ..Default::default()
        }
    }

    fn file(name: &str, requests: Vec<JobRequestDetail>) -> JobFileDetail {
        JobFileDetail {
            file_run_id: format!("{name}-run"),
            file_name: name.to_string(),
            file_location: "/in".to_string(),
            status: "Completed".to_string(),
            requests,
            ..Default::default()
        }
    }

    /// Scripted backend: one run page, one file page per run id.
    struct ScriptedClient {
        runs: Vec<JobRunItem>,
        files: Vec<JobFileDetail>,
        status_calls: AtomicUsize,
        detail_calls: AtomicUsize,
        detail_args: Mutex<Vec<(String, u32, u32)>>,
        invocations: AtomicUsize,
    }

    impl ScriptedClient {
        fn new(runs: Vec<JobRunItem>, files: Vec<JobFileDetail>) -> Self {
            Self {
                runs,
                files,
                status_calls: AtomicUsize::new(0),
                detail_calls: AtomicUsize::new(0),
                detail_args: Mutex::new(Vec::new()),
                invocations: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl JobStatusClient for ScriptedClient {
        async fn run_status(
            &self,
            _job_type: JobType,
            page_number: u32,
            page_size: u32,
        ) -> Result<Page<JobRunItem>> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            Ok(Page {
                data: self.runs.clone(),
                page_number,
                page_size,
                total_count: self.runs.len() as u64,
            })
        }

        async fn run_details(
            &self,
            job_run_id: &str,
            page_number: u32,
            page_size: u32,
        ) -> Result<Page<JobFileDetail>> {
            self.detail_calls.fetch_add(1, Ordering::SeqCst);
            self.detail_args
                .lock()
                .unwrap()
                .push((job_run_id.to_string(), page_number, page_size));
            Ok(Page {
                data: self.files.clone(),
                page_number,
                page_size,
                total_count: self.files.len() as u64,
            })
        }

        async fn invoke_enrollment_job(&self) -> Result<()> {
            self.invocations.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn invoke_ach_job(&self, _cycle_date: &str) -> Result<Option<String>> {
            self.invocations.fetch_add(1, Ordering::SeqCst);
            Ok(Some("queued".to_string()))
        }
    }

    fn sample_client() -> ScriptedClient {
        let requests = vec![
            request("r1", RequestStatus::Succeeded),
            request("r2", RequestStatus::Failed),
            request("r3", RequestStatus::Succeeded),
            request("r4", RequestStatus::Rejected),
        ];
        ScriptedClient::new(
            vec![run("run-1", 2, "running"), run("run-2", 0, "done"), run("run-3", 1, "done")],
            vec![file("a.txt", requests), file("b.txt", vec![])],
        )
    }

    #[tokio::test]
    async fn load_run_page_normalizes_status_and_time() {
        let client = sample_client();
        let mut console = JobConsole::new(JobType::Enrollment);
        console.load_run_page(&client, 0, 10).await.unwrap();

        let runs = console.visible_runs();
        assert_eq!(runs[0].status, "Running");
        assert_eq!(runs[1].status, "Completed");
        assert_eq!(runs[0].started_at, "01/05/2024 08:30 AM");
    }

    #[tokio::test]
    async fn expanding_run_with_files_fetches_details() {
        let client = sample_client();
        let mut console = JobConsole::new(JobType::Enrollment);
        console.load_run_page(&client, 0, 10).await.unwrap();

        console.toggle_run(&client, 0).await.unwrap();
        assert_eq!(console.expanded_run(), Some(0));
        assert_eq!(client.detail_calls.load(Ordering::SeqCst), 1);
        assert_eq!(console.visible_files().len(), 2);
        // Derived counts come from the child requests.
        assert_eq!(console.visible_files()[0].succeeded, 2);
        assert_eq!(console.visible_files()[0].failed, 1);
        assert_eq!(console.visible_files()[0].rejected, 1);
    }

    #[tokio::test]
    async fn expanding_run_without_files_skips_fetch() {
        let client = sample_client();
        let mut console = JobConsole::new(JobType::Enrollment);
        console.load_run_page(&client, 0, 10).await.unwrap();

        console.toggle_run(&client, 1).await.unwrap();
        assert_eq!(console.expanded_run(), Some(1));
        assert_eq!(client.detail_calls.load(Ordering::SeqCst), 0);
        assert!(console.visible_files().is_empty());
    }

    #[tokio::test]
    async fn collapsing_run_clears_descendants() {
        let client = sample_client();
        let mut console = JobConsole::new(JobType::Enrollment);
        console.load_run_page(&client, 0, 10).await.unwrap();
        console.toggle_run(&client, 0).await.unwrap();
        console.toggle_file(0);
        assert!(!console.visible_requests().is_empty());

        console.toggle_run(&client, 0).await.unwrap();
        assert_eq!(console.expanded_run(), None);
        assert_eq!(console.expanded_file(), None);
        assert!(console.visible_requests().is_empty());
    }

    #[tokio::test]
    async fn expanding_second_run_replaces_first_and_resets_descendants() {
        let client = sample_client();
        let mut console = JobConsole::new(JobType::Enrollment);
        console.load_run_page(&client, 0, 10).await.unwrap();
        console.toggle_run(&client, 0).await.unwrap();
        console.toggle_file(0);
        console.show_requests_for(0, RequestStatus::Failed);

        console.toggle_run(&client, 2).await.unwrap();
        assert_eq!(console.expanded_run(), Some(2));
        assert_eq!(console.expanded_file(), None);
        assert_eq!(console.request_filter(), None);
        // Detail was fetched for each expandable run exactly once.
        assert_eq!(client.detail_calls.load(Ordering::SeqCst), 2);
        let args = client.detail_args.lock().unwrap();
        assert_eq!(args[0].0, "run-1");
        assert_eq!(args[1].0, "run-3");
    }

    #[tokio::test]
    async fn status_badge_opens_row_and_toggles_filter() {
        let client = sample_client();
        let mut console = JobConsole::new(JobType::Enrollment);
        console.load_run_page(&client, 0, 10).await.unwrap();
        console.toggle_run(&client, 0).await.unwrap();

        console.show_requests_for(0, RequestStatus::Succeeded);
        assert_eq!(console.expanded_file(), Some(0));
        assert_eq!(console.request_filter(), Some(RequestStatus::Succeeded));
        assert_eq!(console.visible_requests().len(), 2);

        // Same badge again clears the filter.
        console.show_requests_for(0, RequestStatus::Succeeded);
        assert_eq!(console.request_filter(), None);
        assert_eq!(console.visible_requests().len(), 4);

        // A different status replaces rather than clears.
        console.show_requests_for(0, RequestStatus::Failed);
        assert_eq!(console.request_filter(), Some(RequestStatus::Failed));
        assert_eq!(console.visible_requests().len(), 1);
    }

    #[tokio::test]
    async fn opening_a_different_file_clears_the_filter() {
        let client = sample_client();
        let mut console = JobConsole::new(JobType::Enrollment);
        console.load_run_page(&client, 0, 10).await.unwrap();
        console.toggle_run(&client, 0).await.unwrap();
        console.show_requests_for(0, RequestStatus::Failed);

        console.toggle_file(1);
        assert_eq!(console.expanded_file(), Some(1));
        assert_eq!(console.request_filter(), None);
    }

    #[tokio::test]
    async fn request_page_size_change_resets_only_request_level() {
        let client = sample_client();
        let mut console = JobConsole::new(JobType::Enrollment);
        console.load_run_page(&client, 0, 10).await.unwrap();
        console.toggle_run(&client, 0).await.unwrap();
        console.toggle_file(0);

        console.set_request_page_size(2);
        assert_eq!(console.visible_requests().len(), 2);
        assert_eq!(console.total_request_pages(), 2);
        console.go_to_request_page(1);
        assert_eq!(console.visible_requests().len(), 2);
        // Ancestor state untouched.
        assert_eq!(console.expanded_run(), Some(0));
        assert_eq!(console.expanded_file(), Some(0));
    }

    #[tokio::test]
    async fn files_page_size_change_refetches_with_new_size() {
        let client = sample_client();
        let mut console = JobConsole::new(JobType::Enrollment);
        console.load_run_page(&client, 0, 10).await.unwrap();
        console.toggle_run(&client, 0).await.unwrap();

        console.set_files_page_size(&client, 25).await.unwrap();
        let args = client.detail_args.lock().unwrap();
        assert_eq!(args.last().unwrap(), &("run-1".to_string(), 1, 25));
    }

    #[tokio::test]
    async fn run_sort_cycles_and_collapses_selection() {
        let client = sample_client();
        let mut console = JobConsole::new(JobType::Enrollment);
        console.load_run_page(&client, 0, 10).await.unwrap();
        console.toggle_run(&client, 0).await.unwrap();

        console.set_run_sort(RunColumn::FilesCount);
        assert_eq!(console.expanded_run(), None);
        let ascending: Vec<u32> = console
            .visible_runs()
            .iter()
            .map(|r| r.processed_file_count)
            .collect();
        assert_eq!(ascending, vec![0, 1, 2]);

        console.set_run_sort(RunColumn::FilesCount);
        let descending: Vec<u32> = console
            .visible_runs()
            .iter()
            .map(|r| r.processed_file_count)
            .collect();
        assert_eq!(descending, vec![2, 1, 0]);

        // Third activation restores original order.
        console.set_run_sort(RunColumn::FilesCount);
        let original: Vec<u32> = console
            .visible_runs()
            .iter()
            .map(|r| r.processed_file_count)
            .collect();
        assert_eq!(original, vec![2, 0, 1]);
    }

    #[tokio::test]
    async fn invoke_ach_requires_valid_cycle_date() {
        let client = sample_client();
        let mut console = JobConsole::new(JobType::Ach);
        let err = console.invoke_ach(&client, "02/30/2024").await.unwrap_err();
        assert_eq!(err, ConsoleError::Other("Cycle Date is required".to_string()));
        assert_eq!(client.invocations.load(Ordering::SeqCst), 0);

        let msg = console.invoke_ach(&client, "2024-01-05").await.unwrap();
        assert_eq!(msg, "queued");
        assert_eq!(client.invocations.load(Ordering::SeqCst), 1);
        // Run table refreshed after the invocation.
        assert_eq!(client.status_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invoke_enrollment_refreshes_run_table() {
        let client = sample_client();
        let mut console = JobConsole::new(JobType::Enrollment);
        console.invoke_enrollment(&client).await.unwrap();
        assert_eq!(client.invocations.load(Ordering::SeqCst), 1);
        assert_eq!(client.status_calls.load(Ordering::SeqCst), 1);
    }
}
