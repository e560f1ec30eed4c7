use chrono::Utc;
use log::{debug, info, warn};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::{EventBus, RequestId, SessionError, SessionEvent, Stage};
use crate::annotation::{AnnotatedText, AnnotationError};
use crate::practice::{Composition, FeedbackReport, Submission, Task, TimerState, WritingTimer};

/// The live, mutable state of one writing attempt.
#[derive(Debug, Clone)]
pub struct WritingSession {
    id: Uuid,
    task: Task,
    draft: String,
    composition: Composition,
    timer: WritingTimer,
}

impl WritingSession {
    fn new(task: Task) -> Self {
        let timer = WritingTimer::new(task.time_limit_seconds());
        Self {
            id: Uuid::new_v4(),
            composition: Composition::measure("", task.word_limit),
            draft: String::new(),
            task,
            timer,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn composition(&self) -> Composition {
        self.composition
    }

    pub fn timer(&self) -> &WritingTimer {
        &self.timer
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportStatus {
    Pending(RequestId),
    Ready(FeedbackReport),
}

/// A submitted attempt and its (possibly pending) feedback.
#[derive(Debug, Clone)]
pub struct ReviewState {
    session_id: Uuid,
    task: Task,
    /// Draft as typed, before trimming; edit-again restores it.
    draft: String,
    submission: Submission,
    report: ReportStatus,
    annotated: AnnotatedText,
    annotation_error: Option<AnnotationError>,
}

impl ReviewState {
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    pub fn report(&self) -> &ReportStatus {
        &self.report
    }

    /// The resolved report, or `None` while scoring is in flight.
    pub fn feedback(&self) -> Option<&FeedbackReport> {
        match &self.report {
            ReportStatus::Ready(report) => Some(report),
            ReportStatus::Pending(_) => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.report, ReportStatus::Pending(_))
    }

    pub fn annotated(&self) -> &AnnotatedText {
        &self.annotated
    }

    /// Set when the report's suggestions could not be laid over the text.
    pub fn annotation_error(&self) -> Option<&AnnotationError> {
        self.annotation_error.as_ref()
    }
}

/// Everything the gateway needs to score a submission, plus the identity of
/// the request it answers.
#[derive(Debug, Clone)]
pub struct SubmitTicket {
    pub session_id: Uuid,
    pub request_id: RequestId,
    pub submission: Submission,
    pub task: Task,
}

#[derive(Debug, Clone)]
enum StageState {
    TaskSelection,
    Writing(WritingSession),
    Review(ReviewState),
}

/// TaskSelection → Writing → Review → TaskSelection.
///
/// Transitions are plain method calls that either change the stage and emit
/// a [`SessionEvent`], or return a [`SessionError`] and change nothing.
#[derive(Debug)]
pub struct PracticeSession {
    state: StageState,
    next_request: RequestId,
    events: EventBus,
}

impl PracticeSession {
    pub fn new() -> Self {
        Self {
            state: StageState::TaskSelection,
            next_request: 1,
            events: EventBus::new(),
        }
    }

    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn stage(&self) -> Stage {
        match self.state {
            StageState::TaskSelection => Stage::TaskSelection,
            StageState::Writing(_) => Stage::Writing,
            StageState::Review(_) => Stage::Review,
        }
    }

    pub fn writing(&self) -> Option<&WritingSession> {
        match &self.state {
            StageState::Writing(session) => Some(session),
            _ => None,
        }
    }

    pub fn review(&self) -> Option<&ReviewState> {
        match &self.state {
            StageState::Review(review) => Some(review),
            _ => None,
        }
    }

    pub fn current_session_id(&self) -> Option<Uuid> {
        match &self.state {
            StageState::TaskSelection => None,
            StageState::Writing(session) => Some(session.id),
            StageState::Review(review) => Some(review.session_id),
        }
    }

    pub fn select_task(&mut self, task: Task) -> Result<Uuid, SessionError> {
        if !matches!(self.state, StageState::TaskSelection) {
            return Err(self.out_of_sequence("select a task"));
        }

        let session = WritingSession::new(task);
        let session_id = session.id;
        info!("🎯 Task {} selected (session {})", session.task.id, session_id);
        let task_id = session.task.id.clone();
        self.state = StageState::Writing(session);
        self.events.emit(SessionEvent::TaskSelected { session_id, task_id });
        Ok(session_id)
    }

    pub fn update_draft(&mut self, text: &str) -> Result<Composition, SessionError> {
        let session = self.writing_mut("update the draft")?;
        session.draft = text.to_string();
        session.composition = Composition::measure(&session.draft, session.task.word_limit);
        let (session_id, composition) = (session.id, session.composition);
        self.events.emit(SessionEvent::DraftUpdated { session_id, composition });
        Ok(composition)
    }

    pub fn start_timer(&mut self) -> Result<TimerState, SessionError> {
        self.with_timer("start the timer", |timer| {
            timer.start();
        })
    }

    pub fn pause_timer(&mut self) -> Result<TimerState, SessionError> {
        self.with_timer("pause the timer", |timer| {
            timer.pause();
        })
    }

    pub fn stop_timer(&mut self) -> Result<TimerState, SessionError> {
        self.with_timer("stop the timer", WritingTimer::stop)
    }

    /// Advances the timer of session `session_id` by one second.
    ///
    /// Ticks addressed to any other session are dropped. Returns whether the
    /// timer is still running, so a tick source knows when to stop.
    pub fn tick(&mut self, session_id: Uuid) -> bool {
        let session = match &mut self.state {
            StageState::Writing(session) if session.id == session_id => session,
            _ => {
                debug!("Dropping tick for inactive session {}", session_id);
                return false;
            }
        };

        if !session.timer.tick() {
            return false;
        }
        let timer = session.timer.state();
        self.events.emit(SessionEvent::TimerChanged { session_id, timer });
        true
    }

    /// Freezes the draft and moves to Review with the report pending.
    pub fn submit(&mut self) -> Result<SubmitTicket, SessionError> {
        let session = self.writing_mut("submit")?;
        if session.draft.trim().is_empty() {
            warn!("Submit rejected: draft for session {} is empty", session.id);
            return Err(SessionError::EmptyDraft);
        }
        session.timer.pause();

        let request_id = self.next_request;
        self.next_request += 1;

        let session = match std::mem::replace(&mut self.state, StageState::TaskSelection) {
            StageState::Writing(session) => session,
            other => {
                self.state = other;
                return Err(self.out_of_sequence("submit"));
            }
        };

        let submission = Submission {
            session_id: session.id,
            task_id: session.task.id.clone(),
            text: session.draft.trim().to_string(),
            word_count: session.composition.word_count,
            elapsed_seconds: session.timer.elapsed_seconds(),
            submitted_at: Utc::now(),
        };
        info!(
            "📤 Session {} submitted: {} words in {}s (request {})",
            session.id, submission.word_count, submission.elapsed_seconds, request_id
        );

        let ticket = SubmitTicket {
            session_id: session.id,
            request_id,
            submission: submission.clone(),
            task: session.task.clone(),
        };

        self.state = StageState::Review(ReviewState {
            session_id: session.id,
            annotated: AnnotatedText::plain(submission.text.clone()),
            task: session.task,
            draft: session.draft,
            submission,
            report: ReportStatus::Pending(request_id),
            annotation_error: None,
        });
        self.events.emit(SessionEvent::Submitted { session_id: ticket.session_id, request_id });
        Ok(ticket)
    }

    /// Stores the report for `request_id` if it is still the pending request.
    /// Returns false, and changes nothing, for stale responses.
    pub fn resolve_feedback(&mut self, request_id: RequestId, report: FeedbackReport) -> bool {
        let review = match &mut self.state {
            StageState::Review(review) if review.report == ReportStatus::Pending(request_id) => review,
            _ => {
                warn!("Ignoring feedback for stale request {}", request_id);
                self.events.emit(SessionEvent::StaleFeedbackIgnored { request_id });
                return false;
            }
        };

        match AnnotatedText::render(review.submission.text.clone(), report.annotations.clone()) {
            Ok(annotated) => {
                review.annotated = annotated;
                review.annotation_error = None;
            }
            Err(e) => {
                warn!("Suggestions for session {} could not be applied: {}", review.session_id, e);
                review.annotation_error = Some(e);
            }
        }

        let provenance = report.provenance;
        review.report = ReportStatus::Ready(report);
        let session_id = review.session_id;
        info!("📊 Feedback ready for session {} ({:?})", session_id, provenance);
        self.events.emit(SessionEvent::FeedbackReady { session_id, request_id, provenance });
        true
    }

    pub fn toggle_annotation(&mut self, annotation: usize) -> Result<bool, SessionError> {
        let stage = self.stage();
        let review = match &mut self.state {
            StageState::Review(review) => review,
            _ => return Err(SessionError::OutOfSequence { operation: "toggle a suggestion", stage }),
        };
        let showing_replacement = review.annotated.toggle(annotation)?;
        let session_id = review.session_id;
        self.events.emit(SessionEvent::AnnotationToggled { session_id, annotation, showing_replacement });
        Ok(showing_replacement)
    }

    /// Leaves Review for a fresh task selection, discarding the attempt.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        if !matches!(self.state, StageState::Review(_)) {
            return Err(self.out_of_sequence("reset"));
        }
        self.state = StageState::TaskSelection;
        info!("🔄 Back to task selection");
        self.events.emit(SessionEvent::Reset);
        Ok(())
    }

    /// Abandons the attempt in progress and returns to task selection.
    pub fn back_to_tasks(&mut self) -> Result<(), SessionError> {
        let session_id = self.writing_mut("go back to tasks")?.id;
        self.state = StageState::TaskSelection;
        info!("↩️ Session {} discarded", session_id);
        self.events.emit(SessionEvent::SessionDiscarded { session_id });
        Ok(())
    }

    /// Reopens a submitted attempt for editing with its timer paused.
    /// Any response still in flight for it becomes stale.
    pub fn edit_again(&mut self) -> Result<(), SessionError> {
        let review = match std::mem::replace(&mut self.state, StageState::TaskSelection) {
            StageState::Review(review) => review,
            other => {
                self.state = other;
                return Err(self.out_of_sequence("edit again"));
            }
        };

        let timer = WritingTimer::resumed_at(review.task.time_limit_seconds(), review.submission.elapsed_seconds);
        let session_id = review.session_id;
        self.state = StageState::Writing(WritingSession {
            id: session_id,
            composition: Composition::measure(&review.draft, review.task.word_limit),
            draft: review.draft,
            task: review.task,
            timer,
        });
        info!("✏️ Session {} reopened for editing", session_id);
        self.events.emit(SessionEvent::EditResumed { session_id });
        Ok(())
    }

    fn writing_mut(&mut self, operation: &'static str) -> Result<&mut WritingSession, SessionError> {
        let stage = self.stage();
        match &mut self.state {
            StageState::Writing(session) => Ok(session),
            _ => Err(SessionError::OutOfSequence { operation, stage }),
        }
    }

    fn with_timer<F>(&mut self, operation: &'static str, change: F) -> Result<TimerState, SessionError>
    where
        F: FnOnce(&mut WritingTimer),
    {
        let session = self.writing_mut(operation)?;
        change(&mut session.timer);
        let (session_id, timer) = (session.id, session.timer.state());
        self.events.emit(SessionEvent::TimerChanged { session_id, timer: timer.clone() });
        Ok(timer)
    }

    fn out_of_sequence(&self, operation: &'static str) -> SessionError {
        SessionError::OutOfSequence { operation, stage: self.stage() }
    }
}

impl Default for PracticeSession {
    fn default() -> Self {
        Self::new()
    }
}
