use writemate_lib::practice::{word_count, Submission};
use writemate_lib::scoring::{HttpScoringService, ScoringRequest, ScoringService};
use writemate_lib::{QuestionBank, Settings};
use anyhow::{anyhow, Result};
use chrono::Utc;
use log::{info, error};
use std::time::{Duration, Instant};
use tokio::time::timeout;
use uuid::Uuid;

const SAMPLE_ESSAY: &str = "Some people believe that technology has made education more effective, \
while others argue that it distracts students. In my opinion, technology is beneficial when it is \
used with clear goals. Firstly, online resources give learners access to material that was once \
available only in libraries. Secondly, in order to succeed, students must learn to manage their own \
time, and digital tools can help with that. However, it is important to note that screens can also \
reduce concentration. In conclusion, technology improves education as long as teachers guide its use.";

#[tokio::main]
async fn main() -> Result<()> {
    writemate_lib::init_logging();

    info!("🧪 Checking the scoring service with a sample Task 2 essay...");

    let settings = Settings::load()?;
    let bank = QuestionBank::builtin()?;
    let (_, _, task) = bank.find("p2-opinion").ok_or_else(|| anyhow!("sample task p2-opinion missing"))?;

    let submission = Submission {
        session_id: Uuid::new_v4(),
        task_id: task.id.clone(),
        text: SAMPLE_ESSAY.to_string(),
        word_count: word_count(SAMPLE_ESSAY),
        elapsed_seconds: 25 * 60,
        submitted_at: Utc::now(),
    };
    let request = ScoringRequest::new(&submission, task);
    let service = HttpScoringService::from_settings(&settings.scoring);

    println!("\n=== SCORING SERVICE CHECK ===\n");
    println!("Endpoint: {}", service.endpoint());
    println!("Words:    {}", request.word_count);

    let started = Instant::now();
    let limit = Duration::from_secs(settings.scoring.timeout_secs + 5);
    match timeout(limit, service.score(&request)).await {
        Ok(Ok(report)) => {
            println!("✅ WORKING - overall band {:.1} in {:.1}s", report.overall_score, started.elapsed().as_secs_f64());
            println!(
                "   TR {:.1} · CC {:.1} · LR {:.1} · GA {:.1}",
                report.scores.task_response,
                report.scores.coherence_cohesion,
                report.scores.lexical_resource,
                report.scores.grammatical_accuracy
            );
            println!("   {} strengths, {} improvements, {} suggestions, {} corrections",
                report.strengths.len(), report.improvements.len(), report.suggestions.len(), report.annotations.len());
            Ok(())
        }
        Ok(Err(e)) => {
            error!("Scoring service check failed: {}", e);
            println!("❌ FAILED - {}", e);
            std::process::exit(1);
        }
        Err(_) => {
            println!("❌ FAILED - Timeout after {}s", limit.as_secs());
            std::process::exit(1);
        }
    }
}
