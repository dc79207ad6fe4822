//! Background hatching jobs
//!
//! A [`HatchWorker`] runs at most one [`ImageHatcher`] job at a time on a
//! dedicated thread. Starting a new job cancels and joins the one in flight.
//! Each job reports over a channel: any number of progress events followed
//! by exactly one terminal event.

use bildhatch_core::{thread_safe_none, CancellationToken, HatchData, ThreadSafeOption};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use uuid::Uuid;

use crate::error::{HatchError, HatchResult};
use crate::image_hatcher::{HatchOutcome, ImageHatcher};

/// Message sent from a running job
#[derive(Debug)]
pub enum JobEvent {
    /// Whole percent done, strictly increasing
    Progress(u8),
    /// Terminal: hatching completed
    Finished(HatchData),
    /// Terminal: the job was cancelled and its partial work discarded
    Cancelled,
    /// Terminal: the engine reported an error
    Failed(HatchError),
}

/// Terminal state of a job
#[derive(Debug)]
pub enum JobOutcome {
    /// Hatching completed
    Finished(HatchData),
    /// The job was cancelled
    Cancelled,
    /// The job failed
    Failed(HatchError),
}

impl JobOutcome {
    /// Whether the job was cancelled
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Caller side of one job
#[derive(Debug)]
pub struct JobHandle {
    id: Uuid,
    cancel: CancellationToken,
    events: Receiver<JobEvent>,
}

impl JobHandle {
    /// Job identity, also used in log output
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Request cooperative cancellation
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Next pending event without blocking
    ///
    /// Returns `None` when no event is queued or the job has already
    /// delivered its terminal event.
    pub fn try_event(&self) -> Option<JobEvent> {
        match self.events.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Block for the next event
    ///
    /// Returns `None` once the job thread is gone and every event was taken.
    pub fn next_event(&self) -> Option<JobEvent> {
        self.events.recv().ok()
    }

    /// Block until the job ends
    pub fn wait(self) -> JobOutcome {
        self.wait_with_progress(|_| {})
    }

    /// Block until the job ends, forwarding progress events
    pub fn wait_with_progress<F>(self, mut on_progress: F) -> JobOutcome
    where
        F: FnMut(u8),
    {
        for event in self.events.iter() {
            match event {
                JobEvent::Progress(percent) => on_progress(percent),
                JobEvent::Finished(data) => return JobOutcome::Finished(data),
                JobEvent::Cancelled => return JobOutcome::Cancelled,
                JobEvent::Failed(err) => return JobOutcome::Failed(err),
            }
        }
        JobOutcome::Failed(HatchError::JobPanicked(format!(
            "job {} ended without reporting a result",
            self.id
        )))
    }
}

struct InFlight {
    id: Uuid,
    cancel: CancellationToken,
    thread: JoinHandle<()>,
}

/// Single-slot job runner
pub struct HatchWorker {
    in_flight: ThreadSafeOption<InFlight>,
}

impl HatchWorker {
    /// Create an idle worker
    pub fn new() -> Self {
        Self {
            in_flight: thread_safe_none(),
        }
    }

    /// Start hatching on a background thread
    ///
    /// Any job still running is cancelled and joined first.
    pub fn start(&self, hatcher: ImageHatcher) -> HatchResult<JobHandle> {
        let mut slot = self.in_flight.lock();
        if let Some(previous) = slot.take() {
            Self::retire(previous);
        }

        let id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        let (tx, rx) = mpsc::channel();

        let token = cancel.clone();
        let thread = thread::Builder::new()
            .name("hatch-worker".to_string())
            .spawn(move || run_job(id, hatcher, token, tx))?;

        tracing::info!("Started hatch job {}", id);
        *slot = Some(InFlight {
            id,
            cancel: cancel.clone(),
            thread,
        });

        Ok(JobHandle {
            id,
            cancel,
            events: rx,
        })
    }

    /// Whether a job thread is still running
    pub fn is_running(&self) -> bool {
        self.in_flight
            .lock()
            .as_ref()
            .is_some_and(|job| !job.thread.is_finished())
    }

    /// Cancel the job in flight, if any, and wait for its thread to end
    pub fn cancel(&self) {
        if let Some(job) = self.in_flight.lock().take() {
            Self::retire(job);
        }
    }

    fn retire(job: InFlight) {
        if !job.thread.is_finished() {
            tracing::info!("Cancelling hatch job {}", job.id);
        }
        job.cancel.cancel();
        if job.thread.join().is_err() {
            tracing::warn!("Hatch job {} thread panicked", job.id);
        }
    }
}

impl Default for HatchWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for HatchWorker {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn run_job(id: Uuid, hatcher: ImageHatcher, cancel: CancellationToken, tx: Sender<JobEvent>) {
    let progress_tx = tx.clone();
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        hatcher.hatch_with_progress(&cancel, |percent| {
            let _ = progress_tx.send(JobEvent::Progress(percent));
        })
    }));

    let event = match result {
        Ok(Ok(HatchOutcome::Finished(data))) => {
            tracing::info!("Hatch job {} finished", id);
            JobEvent::Finished(data)
        }
        Ok(Ok(HatchOutcome::Cancelled)) => {
            tracing::info!("Hatch job {} cancelled", id);
            JobEvent::Cancelled
        }
        Ok(Err(err)) => {
            tracing::warn!("Hatch job {} failed: {}", id, err);
            JobEvent::Failed(err)
        }
        Err(payload) => {
            let message = panic_message(payload);
            tracing::error!("Hatch job {} panicked: {}", id, message);
            JobEvent::Failed(HatchError::JobPanicked(message))
        }
    };
    let _ = tx.send(event);
}
