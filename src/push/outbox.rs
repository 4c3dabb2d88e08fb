use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use super::{BranchPusher, PushStatus, PushTask};

/// Finished tasks kept for inspection when no limit is configured
pub const DEFAULT_HISTORY_LIMIT: usize = 1000;

/// Tasks oldest first. Finished tasks beyond `limit` are evicted oldest
/// first; pending tasks are never evicted.
struct History {
    tasks: VecDeque<PushTask>,
    limit: usize,
}

impl History {
    fn find_mut(&mut self, id: u64) -> Option<&mut PushTask> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    fn prune(&mut self) {
        while self.tasks.len() > self.limit {
            let Some(oldest) = self
                .tasks
                .iter()
                .position(|t| t.status != PushStatus::Pending)
            else {
                break;
            };
            if let Some(evicted) = self.tasks.remove(oldest) {
                debug!(id = evicted.id, branch = %evicted.branch, "evicted push task");
            }
        }
    }
}

/// Record of recent pushes, fed to one background worker.
#[derive(Clone)]
pub struct PushOutbox {
    remote: String,
    history: Arc<Mutex<History>>,
    next_id: Arc<AtomicU64>,
    sender: mpsc::UnboundedSender<u64>,
}

impl PushOutbox {
    /// Start the worker on the current tokio runtime
    pub fn spawn(remote: impl Into<String>, pusher: Arc<dyn BranchPusher>) -> Self {
        Self::spawn_with_limit(remote, pusher, DEFAULT_HISTORY_LIMIT)
    }

    /// Like [`PushOutbox::spawn`], keeping at most `limit` tasks once they finish
    pub fn spawn_with_limit(
        remote: impl Into<String>,
        pusher: Arc<dyn BranchPusher>,
        limit: usize,
    ) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<u64>();
        let history = Arc::new(Mutex::new(History {
            tasks: VecDeque::new(),
            limit,
        }));

        let worker_history = Arc::clone(&history);
        tokio::spawn(async move {
            while let Some(id) = receiver.recv().await {
                run_push(&worker_history, pusher.as_ref(), id).await;
            }
        });

        Self {
            remote: remote.into(),
            history,
            next_id: Arc::new(AtomicU64::new(1)),
            sender,
        }
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// Queue a push of `branch` and return its record as first stored
    pub fn schedule(&self, branch: &str) -> PushTask {
        let task = PushTask {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            remote: self.remote.clone(),
            branch: branch.to_string(),
            status: PushStatus::Pending,
            attempts: 0,
            last_error: None,
            created_at: Utc::now(),
            finished_at: None,
        };
        {
            let mut history = lock(&self.history);
            history.tasks.push_back(task.clone());
            history.prune();
        }

        if self.sender.send(task.id).is_err() {
            error!(id = task.id, branch, "push worker is not running");
            finish(&self.history, task.id, Err("push worker is not running".to_string()));
        } else {
            info!(id = task.id, branch, remote = %self.remote, "scheduled push");
        }

        self.get(task.id).unwrap_or(task)
    }

    /// Retained tasks, oldest first
    pub fn list(&self) -> Vec<PushTask> {
        lock(&self.history).tasks.iter().cloned().collect()
    }

    pub fn get(&self, id: u64) -> Option<PushTask> {
        lock(&self.history).tasks.iter().find(|t| t.id == id).cloned()
    }
}

fn lock(history: &Mutex<History>) -> MutexGuard<'_, History> {
    history.lock().unwrap_or_else(PoisonError::into_inner)
}

fn finish(history: &Mutex<History>, id: u64, outcome: Result<(), String>) {
    let mut history = lock(history);
    if let Some(task) = history.find_mut(id) {
        task.finished_at = Some(Utc::now());
        match outcome {
            Ok(()) => {
                task.status = PushStatus::Succeeded;
                task.last_error = None;
            }
            Err(message) => {
                task.status = PushStatus::Failed;
                task.last_error = Some(message);
            }
        }
    }
    history.prune();
}

async fn run_push(history: &Mutex<History>, pusher: &dyn BranchPusher, id: u64) {
    let target = lock(history).find_mut(id).map(|task| {
        task.attempts += 1;
        (task.remote.clone(), task.branch.clone())
    });
    let Some((remote, branch)) = target else {
        return;
    };

    match pusher.push(&remote, &branch).await {
        Ok(()) => {
            info!(id, %remote, %branch, "pushed branch");
            finish(history, id, Ok(()));
        }
        Err(e) => {
            error!(id, %remote, %branch, error = %format!("{e:#}"), "push failed");
            finish(history, id, Err(format!("{e:#}")));
        }
    }
}
