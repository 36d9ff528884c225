//! Interactive interview loop.
//!
//! A thin display surface over [`InterviewSession`]: it reads state and
//! invokes the session operations, nothing more.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use ivx_core::api::{FinalEvaluation, InterviewClient};
use ivx_core::rounds::RoundSpec;
use ivx_core::session::{InterviewSession, RoundOutcome, Sender, SessionError};

pub async fn run(
    client: &InterviewClient,
    role: Option<String>,
    name: Option<String>,
) -> Result<()> {
    let role = match role {
        Some(r) => r,
        None => match prompt_line("Job role: ")? {
            Some(r) if !r.trim().is_empty() => r,
            _ => anyhow::bail!("a job role is required to start an interview"),
        },
    };

    let mut session = InterviewSession::new();
    session
        .start(client, &role, name.as_deref())
        .await
        .context("start interview")?;

    print_round_banner(session.round_info());
    if let Some(greeting) = session.messages.first() {
        println!("{}\n", greeting.text);
    }

    while !session.interview_complete() {
        let Some(line) = prompt_line("> ")? else {
            println!("\nInterview suspended. Bye!");
            return Ok(());
        };
        let answer = line.trim();
        if answer.is_empty() {
            continue;
        }
        if answer == "/quit" {
            println!("Interview suspended. Bye!");
            return Ok(());
        }

        let round_before = session.current_round;
        match session.submit_answer(client, answer).await {
            Ok(()) => {
                if let Some(reply) = session.messages.last() {
                    println!("\n{}\n", reply.text);
                }
                if session.current_round != round_before && !session.interview_complete() {
                    print_round_banner(session.round_info());
                }
                if !session.interview_complete() {
                    println!(
                        "[{} - question {}/{}]",
                        session.round_name, session.current_question, session.total_questions
                    );
                }
            }
            Err(SessionError::Api(_) | SessionError::StaleResponse) => {
                // The failure notice is already part of the transcript.
                if let Some(notice) = session.messages.last()
                    && notice.is_error
                    && notice.sender == Sender::Assistant
                {
                    println!("\n{}\n", notice.text);
                }
            }
            Err(e) => eprintln!("{e}"),
        }
    }

    print_outcome(&session);
    Ok(())
}

fn print_round_banner(round: &RoundSpec) {
    println!("\n=== Round {}: {} ===", round.ordinal, round.name);
    println!("{}", round.description);
    println!("Questions: {}\n", round.questions);
}

fn print_outcome(session: &InterviewSession) {
    match session.round_outcome {
        RoundOutcome::Failed => {
            println!("\nThe interview has ended.");
            if let Some(feedback) = session.round_feedback.as_deref() {
                println!("{feedback}");
            }
        }
        _ => {
            if let Some(eval) = session.final_evaluation.as_ref() {
                print_evaluation(eval);
            } else {
                println!("\nInterview complete.");
            }
        }
    }
}

fn print_evaluation(eval: &FinalEvaluation) {
    println!("\n=== Final Evaluation ===");
    println!("Overall score:    {:.1}%", eval.overall_score);
    println!("Confidence score: {:.1}%", eval.confidence_score);
    if !eval.batch.is_empty() {
        println!("Batch:            {}", eval.batch);
    }
    println!("Recommendation:   {}", eval.recommendation);
    for (round, score) in &eval.round_breakdown {
        println!("  Round {round}: {score:.1}%");
    }
    if !eval.summary.is_empty() {
        println!("\n{}", eval.summary);
    }
}

/// Prints a prompt and reads one line from stdin. Returns `None` on EOF.
fn prompt_line(prompt: &str) -> Result<Option<String>> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{prompt}").context("write prompt")?;
    stdout.flush().context("flush prompt")?;

    let mut line = String::new();
    let read = std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("read answer")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
}
