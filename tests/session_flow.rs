use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use writemate_lib::annotation::Annotation;
use writemate_lib::practice::{BandScores, FeedbackReport, Provenance, Task, TimerPhase};
use writemate_lib::scoring::{FallbackScorer, ScoringError, ScoringRequest, ScoringService, SubmissionGateway};
use writemate_lib::session::{SessionError, SessionEvent, Stage, WritingController};

const SENTENCE: &str = "I want to point out that, in order to succeed, one must work hard.";

/// Scoring service that answers after `delay`, counting calls.
struct SlowService {
    delay: Duration,
    calls: AtomicUsize,
    fail: bool,
}

impl SlowService {
    fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self { delay, calls: AtomicUsize::new(0), fail: false })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self { delay: Duration::from_millis(10), calls: AtomicUsize::new(0), fail: true })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScoringService for SlowService {
    async fn score(&self, request: &ScoringRequest) -> Result<FeedbackReport, ScoringError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(ScoringError::Status { status: 502, body: "bad gateway".to_string() });
        }

        let annotations = request
            .content
            .find("in order to")
            .map(|start| vec![Annotation::new("in order to", "to", start)])
            .unwrap_or_default();

        Ok(FeedbackReport {
            overall_score: 7.0,
            scores: BandScores {
                task_response: 7.0,
                coherence_cohesion: 7.0,
                lexical_resource: 7.0,
                grammatical_accuracy: 7.0,
            },
            strengths: vec!["Clear argument".to_string()],
            improvements: vec!["Vary sentence openings".to_string()],
            suggestions: vec![],
            annotations,
            // The gateway decides provenance.
            provenance: Provenance::Fallback,
        })
    }
}

fn controller(service: Arc<SlowService>) -> Arc<WritingController> {
    let gateway = SubmissionGateway::with_fallback(service, FallbackScorer::seeded(42));
    Arc::new(WritingController::new(Arc::new(gateway)))
}

fn task() -> Task {
    Task {
        id: "p2-opinion".to_string(),
        title: "Technology and Education".to_string(),
        description: "Discuss both views and give your own opinion.".to_string(),
        time_limit: 40,
        word_limit: 10,
        task_type: "Opinion Essay".to_string(),
    }
}

#[tokio::test(start_paused = true)]
async fn double_submit_makes_one_request() {
    let service = SlowService::new(Duration::from_secs(2));
    let controller = controller(service.clone());
    controller.select_task(task()).unwrap();
    controller.update_draft(SENTENCE).unwrap();

    let (first, second) = futures::join!(controller.submit(), controller.submit());

    let outcome = first.unwrap();
    assert!(outcome.applied);
    assert!(matches!(second, Err(SessionError::OutOfSequence { stage: Stage::Review, .. })));
    assert_eq!(service.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn service_report_is_marked_and_annotated() {
    let service = SlowService::new(Duration::from_millis(300));
    let controller = controller(service);
    let mut events = controller.subscribe();

    controller.select_task(task()).unwrap();
    controller.update_draft(SENTENCE).unwrap();
    let outcome = controller.submit().await.unwrap();
    assert_eq!(outcome.report.provenance, Provenance::Service);

    controller.with_machine(|machine| {
        let annotated = machine.review().unwrap().annotated();
        assert_eq!(annotated.suggestion_count(), 1);
        assert_eq!(annotated.annotations()[0].start(), 26);
        assert_eq!(annotated.display(), SENTENCE);
    });

    assert!(controller.toggle_annotation(0).unwrap());
    controller.with_machine(|machine| {
        assert_eq!(
            machine.review().unwrap().annotated().display(),
            "I want to point out that, to succeed, one must work hard."
        );
    });

    let mut saw_ready = false;
    let mut saw_toggle = false;
    while let Ok(event) = events.try_recv() {
        match event {
            SessionEvent::FeedbackReady { provenance, .. } => {
                assert_eq!(provenance, Provenance::Service);
                saw_ready = true;
            }
            SessionEvent::AnnotationToggled { annotation: 0, showing_replacement: true, .. } => saw_toggle = true,
            _ => {}
        }
    }
    assert!(saw_ready && saw_toggle);
}

#[tokio::test(start_paused = true)]
async fn failed_service_yields_fallback() {
    let service = SlowService::failing();
    let controller = controller(service.clone());
    controller.select_task(task()).unwrap();
    controller.update_draft("Technology helps students learn faster and more independently today.").unwrap();

    let outcome = controller.submit().await.unwrap();
    let report = outcome.report;
    assert_eq!(report.provenance, Provenance::Fallback);
    assert_eq!(report.overall_score, report.scores.overall());
    for score in report.scores.as_array() {
        assert!((0.0..=9.0).contains(&score));
    }
    assert!(report.annotations.is_empty());
    assert_eq!(service.calls(), 1);
    assert_eq!(controller.with_machine(|m| m.stage()), Stage::Review);
}

#[tokio::test(start_paused = true)]
async fn late_response_after_reset_is_ignored() {
    let service = SlowService::new(Duration::from_secs(5));
    let controller = controller(service);
    controller.select_task(task()).unwrap();
    controller.update_draft(SENTENCE).unwrap();

    let pending = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.submit().await })
    };
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(controller.with_machine(|m| m.review().unwrap().is_pending()));

    controller.reset().unwrap();
    let next = controller.select_task(task()).unwrap();

    let outcome = pending.await.unwrap().unwrap();
    assert!(!outcome.applied);
    controller.with_machine(|machine| {
        assert_eq!(machine.stage(), Stage::Writing);
        assert_eq!(machine.current_session_id(), Some(next));
        assert_eq!(machine.writing().unwrap().draft(), "");
    });
}

#[tokio::test(start_paused = true)]
async fn ticks_drive_elapsed_time() {
    let controller = controller(SlowService::new(Duration::from_millis(1)));
    let mut events = controller.subscribe();
    controller.select_task(task()).unwrap();
    controller.start_timer().unwrap();

    tokio::time::sleep(Duration::from_millis(90_500)).await;
    controller.with_machine(|machine| {
        let timer = machine.writing().unwrap().timer();
        assert_eq!(timer.elapsed_seconds(), 90);
        assert_eq!(timer.remaining_seconds(), 40 * 60 - 90);
        assert!(!timer.is_overrun());
    });

    controller.stop_timer().unwrap();
    tokio::time::sleep(Duration::from_secs(30)).await;
    controller.with_machine(|machine| {
        let timer = machine.writing().unwrap().timer();
        assert_eq!(timer.phase(), TimerPhase::Idle);
        assert_eq!(timer.elapsed_seconds(), 0);
    });

    let mut ticks = 0;
    while let Ok(event) = events.try_recv() {
        if let SessionEvent::TimerChanged { timer, .. } = event {
            if timer.phase == TimerPhase::Running && timer.elapsed_seconds > 0 {
                ticks += 1;
            }
        }
    }
    assert_eq!(ticks, 90);
}

#[tokio::test(start_paused = true)]
async fn overrun_keeps_counting() {
    let short = Task { time_limit: 1, ..task() };
    let controller = controller(SlowService::new(Duration::from_millis(1)));
    controller.select_task(short).unwrap();
    controller.start_timer().unwrap();

    tokio::time::sleep(Duration::from_millis(75_500)).await;
    controller.with_machine(|machine| {
        let timer = machine.writing().unwrap().timer();
        assert_eq!(timer.elapsed_seconds(), 75);
        assert_eq!(timer.remaining_seconds(), -15);
        assert!(timer.is_overrun());
        assert!(timer.is_running());
    });
}

#[tokio::test(start_paused = true)]
async fn edit_again_then_resubmit() {
    let service = SlowService::new(Duration::from_millis(100));
    let controller = controller(service.clone());
    controller.select_task(task()).unwrap();
    controller.update_draft(SENTENCE).unwrap();
    controller.start_timer().unwrap();
    tokio::time::sleep(Duration::from_millis(4_500)).await;
    controller.submit().await.unwrap();

    controller.edit_again().unwrap();
    controller.with_machine(|machine| {
        let session = machine.writing().unwrap();
        assert_eq!(session.draft(), SENTENCE);
        assert_eq!(session.timer().elapsed_seconds(), 4);
        assert_eq!(session.timer().phase(), TimerPhase::Paused);
    });

    controller.start_timer().unwrap();
    tokio::time::sleep(Duration::from_millis(2_500)).await;
    let outcome = controller.submit().await.unwrap();
    assert!(outcome.applied);
    assert_eq!(controller.with_machine(|m| m.review().unwrap().submission().elapsed_seconds), 6);
    assert_eq!(service.calls(), 2);
}

#[tokio::test]
async fn back_to_tasks_discards_session() {
    let controller = controller(SlowService::new(Duration::from_millis(1)));
    let mut events = controller.subscribe();
    let session_id = controller.select_task(task()).unwrap();
    controller.update_draft("draft text").unwrap();
    controller.back_to_tasks().unwrap();

    assert_eq!(controller.with_machine(|m| m.stage()), Stage::TaskSelection);
    let mut discarded = false;
    while let Ok(event) = events.try_recv() {
        if event == (SessionEvent::SessionDiscarded { session_id }) {
            discarded = true;
        }
    }
    assert!(discarded);
}
