//! Background reminder worker.
//!
//! Owns the scheduler and a prescription store on one thread. Jobs run in
//! submission order, so a cancel followed by a schedule for the same
//! prescription never interleave. Each submission returns a [`JobHandle`]
//! the caller can block on or poll.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::JoinHandle;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::recovery::{CurrentUser, PrescriptionStore, RecoveryOutcome, RestartRecovery};
use crate::core::scheduler::{CancelReport, ReminderScheduler, ScheduleReport, ScheduleStrategy};
use crate::models::med::Medication;
use crate::platform::AlarmPlatform;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkerError {
    #[error("reminder worker has stopped")]
    Stopped,

    #[error("timed out waiting for reminder job")]
    Timeout,
}

type Job<P, S> = Box<dyn FnOnce(&ReminderScheduler<P>, &S) + Send>;

/// The pending result of a submitted job.
pub struct JobHandle<T> {
    rx: Receiver<T>,
}

impl<T> JobHandle<T> {
    /// Block until the job finishes.
    pub fn wait(self) -> Result<T, WorkerError> {
        self.rx.recv().map_err(|_| WorkerError::Stopped)
    }

    pub fn wait_timeout(&self, timeout: Duration) -> Result<T, WorkerError> {
        self.rx.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => WorkerError::Timeout,
            RecvTimeoutError::Disconnected => WorkerError::Stopped,
        })
    }

    /// The result if the job has already finished.
    pub fn try_result(&self) -> Result<Option<T>, WorkerError> {
        match self.rx.try_recv() {
            Ok(v) => Ok(Some(v)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(WorkerError::Stopped),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RescheduleReport {
    pub cancelled: CancelReport,
    pub scheduled: ScheduleReport,
}

pub struct ReminderWorker<P: AlarmPlatform, S> {
    tx: Option<Sender<Job<P, S>>>,
    handle: Option<JoinHandle<()>>,
    strategy: ScheduleStrategy,
}

impl<P, S> ReminderWorker<P, S>
where
    P: AlarmPlatform + Send + 'static,
    S: PrescriptionStore + Send + 'static,
{
    pub fn spawn(scheduler: ReminderScheduler<P>, store: S) -> Self {
        let strategy = scheduler.strategy();
        let (tx, rx) = mpsc::channel::<Job<P, S>>();
        let handle = std::thread::spawn(move || {
            debug!("reminder worker started");
            // Ends once every sender is gone and the queue is empty.
            for job in rx {
                job(&scheduler, &store);
            }
            debug!("reminder worker stopped");
        });
        Self {
            tx: Some(tx),
            handle: Some(handle),
            strategy,
        }
    }

    /// Strategy for prescriptions saved through this worker.
    pub fn strategy(&self) -> ScheduleStrategy {
        self.strategy
    }

    /// Run `f` on the worker thread.
    pub fn submit<T, F>(&self, f: F) -> JobHandle<T>
    where
        T: Send + 'static,
        F: FnOnce(&ReminderScheduler<P>, &S) -> T + Send + 'static,
    {
        let (reply, rx) = mpsc::channel();
        let job: Job<P, S> = Box::new(move |scheduler, store| {
            // The caller may have dropped its handle.
            let _ = reply.send(f(scheduler, store));
        });
        match &self.tx {
            Some(tx) => {
                if tx.send(job).is_err() {
                    warn!("reminder worker is gone, job dropped");
                }
            }
            None => warn!("reminder worker shut down, job dropped"),
        }
        JobHandle { rx }
    }

    pub fn schedule(
        &self,
        prescription_id: &str,
        strategy: ScheduleStrategy,
        medications: Vec<Medication>,
    ) -> JobHandle<ScheduleReport> {
        let id = prescription_id.to_string();
        self.submit(move |scheduler, _| scheduler.schedule_as(strategy, &id, &medications))
    }

    pub fn cancel(
        &self,
        prescription_id: &str,
        strategy: ScheduleStrategy,
        medications: Vec<Medication>,
    ) -> JobHandle<CancelReport> {
        let id = prescription_id.to_string();
        self.submit(move |scheduler, _| scheduler.cancel_as(strategy, &id, &medications))
    }

    /// Withdraw the reminders of `previous`, then schedule `current`, both
    /// under `strategy`.
    pub fn reschedule(
        &self,
        prescription_id: &str,
        strategy: ScheduleStrategy,
        previous: Vec<Medication>,
        current: Vec<Medication>,
    ) -> JobHandle<RescheduleReport> {
        let id = prescription_id.to_string();
        self.submit(move |scheduler, _| RescheduleReport {
            cancelled: scheduler.cancel_as(strategy, &id, &previous),
            scheduled: scheduler.schedule_as(strategy, &id, &current),
        })
    }

    /// Restore reminders for whoever `session` says is signed in.
    pub fn recover(&self, session: &(impl CurrentUser + ?Sized)) -> JobHandle<RecoveryOutcome> {
        let user = session.current_user();
        self.submit(move |scheduler, store| RestartRecovery::new(&user, store, scheduler).run())
    }

    /// Stop accepting jobs, finish the queued ones and join the thread.
    pub fn shutdown(&mut self) {
        self.tx.take();
        if let Some(h) = self.handle.take() {
            if h.join().is_err() {
                warn!("reminder worker panicked");
            } else {
                info!("reminder worker shut down");
            }
        }
    }
}

impl<P: AlarmPlatform, S> Drop for ReminderWorker<P, S> {
    fn drop(&mut self) {
        self.tx.take();
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}
