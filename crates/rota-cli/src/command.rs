//! Line commands and their JSON replies.

use std::collections::BTreeMap;

use clap::{Parser, Subcommand};
use rota_core::{JobStore, JobView, LeasedJob, Realms, StoreError};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::warn;

#[derive(Parser, Debug)]
#[command(name = "rota", no_binary_name = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Store a job in a queue under a task
    ///
    /// Lines are split on whitespace, so DATA is a single token: it cannot
    /// contain spaces and is stored as its UTF-8 bytes.
    Add {
        job_id: String,
        task_id: String,
        queue_id: u64,
        /// Payload: one whitespace-free UTF-8 token, at most
        /// --max-payload-bytes long
        #[arg(default_value = "")]
        data: String,
    },
    /// Lease up to COUNT jobs
    Pull {
        #[arg(default_value_t = 1)]
        count: usize,
    },
    /// Remove a job from every queue and task
    Remove { job_id: String },
    /// Index sizes of the current realm
    Status,
    /// Show one job
    Job { job_id: String },
    /// Show every job carrying a task
    Task { task_id: String },
    /// Number of jobs carrying a task
    TaskStatus { task_id: String },
    /// Remove every job carrying a task
    RemoveTask { task_id: String },
    /// Move a job that is not leased to another queue
    Move { job_id: String, from: u64, to: u64 },
    /// Remove every job from a queue
    Clear { queue_id: u64 },
    /// Set a queue's own lease, in seconds
    Lease { queue_id: u64, secs: u64 },
    /// Set the lease used by queues without their own, in seconds
    DefaultLease { secs: u64 },
    /// Switch to another realm (created on first use)
    Realm { name: String },
    /// Status of every realm
    Realms,
    /// Drop a realm and its jobs
    DropRealm { name: String },
}

/// A job as printed: payload shown as text.
#[derive(Debug, Serialize)]
struct PrintedJob {
    job_id: String,
    queue_id: u64,
    data: String,
}

impl From<LeasedJob> for PrintedJob {
    fn from(job: LeasedJob) -> Self {
        Self {
            job_id: job.job_id.to_string(),
            queue_id: job.queue_id.get(),
            data: String::from_utf8_lossy(&job.data).into_owned(),
        }
    }
}

fn printed_view(view: JobView) -> Value {
    json!({
        "job_id": view.job_id,
        "data": String::from_utf8_lossy(&view.data),
        "tasks": view.tasks,
        "queues": view.queues,
    })
}

pub struct Session {
    realms: Realms,
    current: String,
}

impl Session {
    pub fn new(realms: Realms, current: String) -> Self {
        Self { realms, current }
    }

    /// Run one command line. Failures become `{"error": ...}` replies.
    pub async fn execute(&mut self, line: &str) -> Value {
        let command = match Line::try_parse_from(line.split_whitespace()) {
            Ok(parsed) => parsed.command,
            Err(e) => return json!({ "error": e.to_string().trim() }),
        };

        match self.dispatch(command).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, line, "command failed");
                json!({ "error": e.to_string(), "kind": error_kind(&e) })
            }
        }
    }

    async fn store(&self) -> JobStore {
        self.realms.get(&self.current).await
    }

    async fn dispatch(&mut self, command: Command) -> Result<Value, StoreError> {
        let reply = match command {
            Command::Add {
                job_id,
                task_id,
                queue_id,
                data,
            } => {
                let store = self.store().await;
                let max = store.config().await.max_payload_bytes;
                if data.len() > max {
                    warn!(job_id = %job_id, size = data.len(), max, "payload too large");
                    return Ok(json!({
                        "error": format!("payload for job {job_id} is {} bytes, limit is {max}", data.len()),
                        "kind": "payload_too_large",
                    }));
                }
                store.add(job_id, task_id, queue_id, data.into_bytes()).await?;
                json!({ "ok": true })
            }
            Command::Pull { count } => {
                let jobs: Vec<PrintedJob> = self
                    .store()
                    .await
                    .pull(count)
                    .await
                    .into_iter()
                    .map(PrintedJob::from)
                    .collect();
                json!(jobs)
            }
            Command::Remove { job_id } => {
                self.store().await.remove(job_id).await?;
                json!({ "ok": true })
            }
            Command::Status => json!(self.store().await.status().await),
            Command::Job { job_id } => printed_view(self.store().await.get_job(job_id).await?),
            Command::Task { task_id } => {
                let jobs: BTreeMap<String, Value> = self
                    .store()
                    .await
                    .task_jobs(task_id)
                    .await?
                    .into_iter()
                    .map(|(id, view)| (id.to_string(), printed_view(view)))
                    .collect();
                json!(jobs)
            }
            Command::TaskStatus { task_id } => json!(self.store().await.task_status(task_id).await?),
            Command::RemoveTask { task_id } => {
                let removed = self.store().await.remove_task(task_id).await?;
                json!({ "removed": removed })
            }
            Command::Move { job_id, from, to } => {
                self.store().await.move_job(job_id, from, to).await?;
                json!({ "ok": true })
            }
            Command::Clear { queue_id } => {
                let cleared = self.store().await.clear_queue(queue_id).await?;
                json!({ "cleared": cleared })
            }
            Command::Lease { queue_id, secs } => {
                self.store().await.set_queue_lease(queue_id, secs).await;
                json!({ "ok": true })
            }
            Command::DefaultLease { secs } => {
                self.store().await.set_default_lease(secs).await;
                json!({ "ok": true })
            }
            Command::Realm { name } => {
                self.realms.get(&name).await;
                self.current = name;
                json!({ "realm": self.current })
            }
            Command::Realms => json!(self.realms.status().await),
            Command::DropRealm { name } => {
                self.realms.delete(&name).await?;
                json!({ "ok": true })
            }
        };
        Ok(reply)
    }
}

fn error_kind(error: &StoreError) -> &'static str {
    match error {
        StoreError::Conflict { .. } => "conflict",
        StoreError::NotFound(_) => "not_found",
        StoreError::UnknownTask(_) => "unknown_task",
        StoreError::UnknownQueue(_) => "unknown_queue",
        StoreError::NotInQueue { .. } => "not_in_queue",
        StoreError::LeaseHeld { .. } => "lease_held",
        StoreError::UnknownRealm(_) => "unknown_realm",
    }
}
