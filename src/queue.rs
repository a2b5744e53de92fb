//! Submit vendor URLs, poll their progress and collect the finished records.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::fetch::PageSource;
use crate::model::VendorRecord;
use crate::pipeline::{research_vendor, Progress, ResearchOptions};
use crate::rules::CompiledRules;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(u64);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    Running { pages_done: usize, pages_total: usize },
    Completed,
    Failed(String),
}

struct Job {
    url: String,
    status: JobStatus,
    result: Option<VendorRecord>,
}

type JobTable = Arc<Mutex<HashMap<JobId, Job>>>;

/// Runs research jobs on tokio tasks, at most `concurrency` at a time.
pub struct ResearchQueue {
    jobs: JobTable,
    next_id: AtomicU64,
    semaphore: Arc<Semaphore>,
    source: Arc<dyn PageSource>,
    rules: Arc<CompiledRules>,
    options: ResearchOptions,
}

impl ResearchQueue {
    pub fn new(
        source: Arc<dyn PageSource>,
        rules: Arc<CompiledRules>,
        options: ResearchOptions,
        concurrency: usize,
    ) -> Self {
        ResearchQueue {
            jobs: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
            semaphore: Arc::new(Semaphore::new(concurrency.max(1))),
            source,
            rules,
            options,
        }
    }

    /// Queue a vendor URL. Must be called from within a tokio runtime.
    pub fn submit(&self, url: &str) -> JobId {
        let id = JobId(self.next_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.jobs).insert(
            id,
            Job {
                url: url.to_string(),
                status: JobStatus::Queued,
                result: None,
            },
        );
        info!("Queued {} for {}", id, url);

        let jobs = Arc::clone(&self.jobs);
        let sem = Arc::clone(&self.semaphore);
        let source = Arc::clone(&self.source);
        let rules = Arc::clone(&self.rules);
        let options = self.options.clone();
        let url = url.to_string();

        tokio::spawn(async move {
            let Ok(_permit) = sem.acquire().await else {
                set_status(&jobs, id, JobStatus::Failed("queue closed".to_string()));
                return;
            };
            set_status(
                &jobs,
                id,
                JobStatus::Running {
                    pages_done: 0,
                    pages_total: 0,
                },
            );

            let report = |p: Progress| {
                set_status(
                    &jobs,
                    id,
                    JobStatus::Running {
                        pages_done: p.pages_done,
                        pages_total: p.pages_total,
                    },
                )
            };
            let outcome = research_vendor(source.as_ref(), &rules, &url, &options, &report).await;

            let mut table = lock(&jobs);
            if let Some(job) = table.get_mut(&id) {
                match outcome {
                    Ok(record) => {
                        info!("{} completed: {}", id, record.vendor_id);
                        job.status = JobStatus::Completed;
                        job.result = Some(record);
                    }
                    Err(e) => {
                        warn!("{} failed for {}: {}", id, job.url, e);
                        job.status = JobStatus::Failed(e.to_string());
                    }
                }
            }
        });
        id
    }

    pub fn status(&self, id: JobId) -> Option<JobStatus> {
        lock(&self.jobs).get(&id).map(|j| j.status.clone())
    }

    /// The finished record; `None` until the job has completed.
    pub fn result(&self, id: JobId) -> Option<VendorRecord> {
        lock(&self.jobs).get(&id).and_then(|j| j.result.clone())
    }

    /// Hand over a completed job's record and drop the job.
    pub fn take_result(&self, id: JobId) -> Option<VendorRecord> {
        let mut table = lock(&self.jobs);
        if table.get(&id)?.status != JobStatus::Completed {
            return None;
        }
        table.remove(&id).and_then(|j| j.result)
    }

    /// Drop a completed or failed job. Queued and running jobs are kept.
    pub fn forget(&self, id: JobId) -> bool {
        let mut table = lock(&self.jobs);
        match table.get(&id).map(|j| &j.status) {
            Some(JobStatus::Completed | JobStatus::Failed(_)) => table.remove(&id).is_some(),
            _ => false,
        }
    }

    /// Jobs currently tracked, finished ones included.
    pub fn len(&self) -> usize {
        lock(&self.jobs).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock(jobs: &JobTable) -> MutexGuard<'_, HashMap<JobId, Job>> {
    jobs.lock().unwrap_or_else(PoisonError::into_inner)
}

fn set_status(jobs: &JobTable, id: JobId, status: JobStatus) {
    if let Some(job) = lock(jobs).get_mut(&id) {
        job.status = status;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::fetch::testing::StaticSource;

    fn queue() -> ResearchQueue {
        ResearchQueue::new(
            Arc::new(StaticSource::acme()),
            Arc::new(CompiledRules::default()),
            ResearchOptions {
                max_pages: 10,
                delay: Duration::ZERO,
                use_sitemap: true,
            },
            1,
        )
    }

    async fn settle(queue: &ResearchQueue, id: JobId) -> JobStatus {
        for _ in 0..200 {
            match queue.status(id) {
                Some(s @ (JobStatus::Completed | JobStatus::Failed(_))) => return s,
                _ => tokio::time::sleep(Duration::from_millis(10)).await,
            }
        }
        panic!("{} did not finish", id);
    }

    #[tokio::test]
    async fn completed_job_has_result() {
        let queue = queue();
        let id = queue.submit("https://acme.example/");
        assert!(queue.result(id).is_none());

        assert_eq!(settle(&queue, id).await, JobStatus::Completed);
        let record = queue.result(id).unwrap();
        assert_eq!(record.vendor_id, "acme_cloud");
    }

    #[tokio::test]
    async fn failed_job_reports_reason() {
        let queue = queue();
        let ok = queue.submit("https://acme.example/");
        let bad = queue.submit("https://gone.example/");
        assert_ne!(ok, bad);

        match settle(&queue, bad).await {
            JobStatus::Failed(reason) => assert!(reason.contains("gone.example"), "{reason}"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(queue.result(bad).is_none());
        assert_eq!(settle(&queue, ok).await, JobStatus::Completed);
    }

    #[tokio::test]
    async fn finished_jobs_can_be_released() {
        let queue = queue();
        let ok = queue.submit("https://acme.example/");
        let bad = queue.submit("https://gone.example/");
        assert!(!queue.forget(ok), "unfinished job must stay");

        assert_eq!(settle(&queue, ok).await, JobStatus::Completed);
        assert!(matches!(settle(&queue, bad).await, JobStatus::Failed(_)));
        assert_eq!(queue.len(), 2);

        assert!(queue.take_result(bad).is_none());
        assert!(queue.forget(bad));
        let record = queue.take_result(ok).unwrap();
        assert_eq!(record.vendor_id, "acme_cloud");

        assert!(queue.is_empty());
        assert_eq!(queue.status(ok), None);
        assert!(queue.take_result(ok).is_none());
    }

    #[test]
    fn unknown_job_has_no_status() {
        let queue = queue();
        assert_eq!(queue.status(JobId(42)), None);
        assert_eq!(queue.result(JobId(42)), None);
    }
}
