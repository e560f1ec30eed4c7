use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};

use writemate_lib::annotation::SegmentKind;
use writemate_lib::i18n::{Catalog, Language, Translate};
use writemate_lib::identity::{bearer_token, is_signed_in, UserIdentity};
use writemate_lib::practice::{format_clock, ReviewSummary, TaskCollection, TaskPart};
use writemate_lib::session::{SessionEvent, WritingController};
use writemate_lib::{HttpScoringService, QuestionBank, Settings, SubmissionGateway};

#[derive(Parser)]
#[command(name = "writemate", version, about = "Timed IELTS writing practice")]
struct Cli {
    /// Configuration file to read instead of ./writemate.toml
    #[arg(long, global = true)]
    config: Option<String>,

    /// Interface language (ko, en)
    #[arg(long, global = true)]
    lang: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the built-in writing tasks
    Tasks {
        /// task1_general, task1_academic or task2
        #[arg(long)]
        part: Option<String>,
        /// past or mock
        #[arg(long)]
        collection: Option<String>,
    },
    /// Write an answer with a running clock and get it scored
    Practice {
        /// Task id, e.g. p2-opinion
        #[arg(long)]
        task: String,
        /// Read the essay from a file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
        /// Display name of the signed-in user
        #[arg(long)]
        name: Option<String>,
        /// Email of the signed-in user
        #[arg(long)]
        email: Option<String>,
    },
    /// Print the effective configuration
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    writemate_lib::init_logging();
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_file(path)?,
        None => Settings::load()?,
    };
    let language = match cli.lang.as_deref() {
        Some(code) => Language::from_str(code).ok_or_else(|| anyhow!("Unknown language: {}", code))?,
        None => settings.language,
    };
    let catalog = Catalog::new(language);

    match cli.command {
        Command::Tasks { part, collection } => list_tasks(&catalog, part.as_deref(), collection.as_deref()),
        Command::Practice { task, file, name, email } => {
            let identity = if name.is_some() || email.is_some() {
                Some(UserIdentity {
                    display_name: name,
                    email,
                    token: settings.scoring.auth_token.clone(),
                })
            } else {
                None
            };
            practice(&settings, &catalog, &task, file, identity).await
        }
        Command::ShowConfig => {
            let mut shown = settings.clone();
            if shown.scoring.auth_token.is_some() {
                shown.scoring.auth_token = Some("********".to_string());
            }
            println!("{}", serde_json::to_string_pretty(&shown)?);
            Ok(())
        }
    }
}

fn list_tasks(catalog: &Catalog, part: Option<&str>, collection: Option<&str>) -> Result<()> {
    let bank = QuestionBank::builtin()?;

    let parts = match part {
        Some(p) => vec![TaskPart::from_str(p).ok_or_else(|| anyhow!("Unknown task part: {}", p))?],
        None => bank.parts(),
    };
    let collections = match collection {
        Some("past") => vec![TaskCollection::Past],
        Some("mock") => vec![TaskCollection::Mock],
        Some(other) => bail!("Unknown collection: {} (expected past or mock)", other),
        None => vec![TaskCollection::Past, TaskCollection::Mock],
    };

    println!("{}", catalog.translate("header.title", &[]));
    for part in parts {
        println!("\n== {} ==", catalog.translate(part.title_key(), &[]));
        for collection in &collections {
            println!("  -- {} --", catalog.translate(collection.title_key(), &[]));
            for task in bank.tasks(part, *collection) {
                println!(
                    "  {:<16} {} [{}] {} · {}",
                    task.id,
                    task.title,
                    task.task_type,
                    catalog.translate("task.minWords", &[&task.word_limit.to_string()]),
                    catalog.translate("task.timeRecommended", &[&task.time_limit.to_string()]),
                );
            }
        }
    }
    Ok(())
}

async fn practice(
    settings: &Settings,
    catalog: &Catalog,
    task_id: &str,
    file: Option<PathBuf>,
    identity: Option<UserIdentity>,
) -> Result<()> {
    let bank = QuestionBank::builtin()?;
    let (_, _, task) = bank.find(task_id).ok_or_else(|| anyhow!("No task with id {}", task_id))?;
    let task = task.clone();

    let mut service = HttpScoringService::from_settings(&settings.scoring);
    if is_signed_in(identity.as_ref()) {
        if let Some(user) = &identity {
            info!("👤 Signed in as {}", user.label());
        }
        service = service.with_auth_token(bearer_token(identity.as_ref()));
    }
    let gateway = SubmissionGateway::new(Arc::new(service));
    let controller = WritingController::with_tick_period(
        Arc::new(gateway),
        Duration::from_millis(settings.timer.tick_millis),
    );

    let mut events = controller.subscribe();
    let timer_catalog = catalog.clone();
    let clock = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if let SessionEvent::TimerChanged { timer, .. } = event {
                if timer.remaining_seconds == 0 {
                    eprintln!("⏰ {}", timer_catalog.translate("writing.timeUp", &[]));
                } else if timer.remaining_seconds > 0 && timer.remaining_seconds % 300 == 0 {
                    eprintln!(
                        "⏱️ {} {}",
                        timer_catalog.translate("writing.timeRemaining", &[]),
                        format_clock(timer.remaining_seconds)
                    );
                }
            }
        }
    });

    println!("{} · {}", task.title, task.task_type);
    println!("{}\n", task.description);
    println!(
        "{} · {}",
        catalog.translate("task.minWords", &[&task.word_limit.to_string()]),
        catalog.translate("task.timeRecommended", &[&task.time_limit.to_string()]),
    );

    controller.select_task(task.clone())?;
    controller.start_timer()?;

    let draft = match file {
        Some(path) => {
            let text = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            controller.update_draft(&text)?;
            text
        }
        None => read_draft(&controller, catalog, task.word_limit).await?,
    };
    info!("Draft complete: {} bytes", draft.len());

    let outcome = controller.submit().await?;
    clock.abort();

    controller.with_machine(|machine| -> Result<()> {
        let review = machine.review().ok_or_else(|| anyhow!("Session left review before printing"))?;
        let summary = ReviewSummary::new(review.submission(), review.task(), &outcome.report);
        print_review(catalog, &summary, review);
        Ok(())
    })
}

/// Reads the essay line by line from stdin, updating the word count as it goes.
async fn read_draft(controller: &WritingController, catalog: &Catalog, minimum: u32) -> Result<String> {
    eprintln!("(Type your answer. End with Ctrl-D to submit.)");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut draft = String::new();

    while let Some(line) = lines.next_line().await? {
        draft.push_str(&line);
        draft.push('\n');
        let composition = controller.update_draft(&draft)?;
        let status = if composition.threshold_met {
            catalog.translate("writing.wordCountMet", &[])
        } else {
            catalog.translate("writing.moreNeeded", &[&composition.words_needed.to_string()])
        };
        eprintln!(
            "  {} · {}",
            catalog.translate("writing.wordCount", &[&composition.word_count.to_string(), &minimum.to_string()]),
            status
        );
    }

    if draft.trim().is_empty() {
        warn!("Nothing was written");
    }
    Ok(draft)
}

fn print_review(catalog: &Catalog, summary: &ReviewSummary, review: &writemate_lib::session::ReviewState) {
    let Some(report) = review.feedback() else {
        return;
    };

    println!("\n=== {} ===", catalog.translate("review.overallBandScore", &[]));
    println!("{:.1} ({})", report.overall_score, catalog.translate(summary.band.key(), &[]));
    if report.is_fallback() {
        println!("(offline estimate)");
    }

    println!(
        "\n{}: {} · {}: {}",
        catalog.translate("review.wordCount", &[]),
        summary.word_count,
        catalog.translate("review.targetWords", &[]),
        summary.target_words
    );
    println!(
        "{}: {}m · {}: {}m",
        catalog.translate("review.timeSpent", &[]),
        summary.minutes_spent,
        catalog.translate("review.timeLimit", &[]),
        summary.time_limit
    );
    println!("{}", catalog.translate(summary.word_count_key(), &[]));
    println!("{}", catalog.translate(summary.time_limit_key(), &[]));

    println!();
    for (key, score) in [
        ("review.taskResponse", report.scores.task_response),
        ("review.coherenceCohesion", report.scores.coherence_cohesion),
        ("review.lexicalResource", report.scores.lexical_resource),
        ("review.grammaticalAccuracy", report.scores.grammatical_accuracy),
    ] {
        println!("  {:<24} {:.1}", catalog.translate(key, &[]), score);
    }

    for (key, items) in [
        ("review.strengths", &report.strengths),
        ("review.improvements", &report.improvements),
        ("review.suggestions", &report.suggestions),
    ] {
        if items.is_empty() {
            continue;
        }
        println!("\n{}", catalog.translate(key, &[]));
        for item in items {
            println!("  • {}", item);
        }
    }

    println!("\n--- {} ---", catalog.translate("review.yourEssay", &[]));
    let annotated = review.annotated();
    let count = annotated.suggestion_count();
    if count > 0 {
        let key = if count == 1 { "review.suggestionFound" } else { "review.suggestionsFound" };
        println!("{}", catalog.translate(key, &[&count.to_string()]));
        for (i, annotation) in annotated.annotations().iter().enumerate() {
            println!("  [{}] \"{}\" → \"{}\"", i + 1, annotation.original(), annotation.replacement());
        }
        println!();
    }
    if let Some(e) = review.annotation_error() {
        warn!("Suggestions not shown: {}", e);
    }

    let rendered: String = annotated
        .segments()
        .iter()
        .map(|segment| match segment.kind {
            SegmentKind::Literal => segment.text.to_string(),
            SegmentKind::Toggle { annotation, .. } => format!("[{}]{{{}}}", segment.text, annotation + 1),
        })
        .collect();
    println!("{}", rendered);
}
