use std::sync::Arc;
use std::time::Duration;
use log::{info, warn};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::{PracticeSession, RequestId, SessionError, SessionEvent};
use crate::practice::{Composition, FeedbackReport, Task, Ticker, TimerState, DEFAULT_TICK_PERIOD};
use crate::scoring::SubmissionGateway;

/// Result of one submit round trip.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub request_id: RequestId,
    pub report: FeedbackReport,
    /// False when the session moved on before the report arrived.
    pub applied: bool,
}

/// The running ticker, or how far into a second the timer was when paused.
#[derive(Default)]
struct TickClock {
    ticker: Option<Ticker>,
    carried: Duration,
}

/// Drives a [`PracticeSession`] from async code: owns the one-second ticker
/// while the timer runs and performs the scoring round trip on submit.
pub struct WritingController {
    machine: Arc<Mutex<PracticeSession>>,
    gateway: Arc<SubmissionGateway>,
    tick_period: Duration,
    clock: Mutex<TickClock>,
}

impl WritingController {
    pub fn new(gateway: Arc<SubmissionGateway>) -> Self {
        Self::with_tick_period(gateway, DEFAULT_TICK_PERIOD)
    }

    pub fn with_tick_period(gateway: Arc<SubmissionGateway>, tick_period: Duration) -> Self {
        Self {
            machine: Arc::new(Mutex::new(PracticeSession::new())),
            gateway,
            tick_period,
            clock: Mutex::new(TickClock::default()),
        }
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<SessionEvent> {
        self.machine.lock().subscribe()
    }

    /// Read access to the underlying state machine.
    pub fn with_machine<R>(&self, f: impl FnOnce(&PracticeSession) -> R) -> R {
        let machine = self.machine.lock();
        f(&*machine)
    }

    pub fn select_task(&self, task: Task) -> Result<Uuid, SessionError> {
        self.machine.lock().select_task(task)
    }

    pub fn update_draft(&self, text: &str) -> Result<Composition, SessionError> {
        self.machine.lock().update_draft(text)
    }

    /// Starts (or resumes) the timer and the ticker feeding it.
    ///
    /// A resumed ticker first fires after whatever was left of the second
    /// that was interrupted by the pause.
    pub fn start_timer(&self) -> Result<TimerState, SessionError> {
        let (session_id, state) = {
            let mut machine = self.machine.lock();
            let state = machine.start_timer()?;
            (machine.current_session_id(), state)
        };

        let mut clock = self.clock.lock();
        if let Some(session_id) = session_id {
            if clock.ticker.as_ref().map_or(true, Ticker::is_finished) {
                let machine = Arc::clone(&self.machine);
                let carried = std::mem::take(&mut clock.carried);
                clock.ticker = Some(Ticker::resume(self.tick_period, carried, move || {
                    machine.lock().tick(session_id)
                }));
                info!("⏱️ Timer running for session {} ({}ms carried)", session_id, carried.as_millis());
            }
        }
        Ok(state)
    }

    pub fn pause_timer(&self) -> Result<TimerState, SessionError> {
        let state = self.machine.lock().pause_timer()?;
        let mut clock = self.clock.lock();
        if let Some(ticker) = clock.ticker.take() {
            clock.carried = ticker.progress();
            ticker.cancel();
        }
        Ok(state)
    }

    pub fn stop_timer(&self) -> Result<TimerState, SessionError> {
        let state = self.machine.lock().stop_timer()?;
        self.cancel_ticker();
        Ok(state)
    }

    pub fn back_to_tasks(&self) -> Result<(), SessionError> {
        self.machine.lock().back_to_tasks()?;
        self.cancel_ticker();
        Ok(())
    }

    /// Submits the current draft and waits for feedback.
    ///
    /// The machine enters Review before the request goes out, so a second
    /// submit while this one is in flight fails instead of sending again.
    pub async fn submit(&self) -> Result<SubmitOutcome, SessionError> {
        let ticket = self.machine.lock().submit()?;
        self.cancel_ticker();

        let report = self.gateway.submit(&ticket.submission, &ticket.task).await;
        let applied = self.machine.lock().resolve_feedback(ticket.request_id, report.clone());
        if !applied {
            warn!("Feedback for request {} arrived after the session moved on", ticket.request_id);
        }

        Ok(SubmitOutcome {
            request_id: ticket.request_id,
            report,
            applied,
        })
    }

    pub fn reset(&self) -> Result<(), SessionError> {
        self.machine.lock().reset()
    }

    /// Reopens the submitted draft; the timer stays paused until started again.
    pub fn edit_again(&self) -> Result<(), SessionError> {
        self.machine.lock().edit_again()
    }

    pub fn toggle_annotation(&self, annotation: usize) -> Result<bool, SessionError> {
        self.machine.lock().toggle_annotation(annotation)
    }

    /// Stops ticking and forgets any partial second.
    fn cancel_ticker(&self) {
        let mut clock = self.clock.lock();
        clock.carried = Duration::ZERO;
        if let Some(ticker) = clock.ticker.take() {
            ticker.cancel();
        }
    }
}

impl Drop for WritingController {
    fn drop(&mut self) {
        self.cancel_ticker();
    }
}
