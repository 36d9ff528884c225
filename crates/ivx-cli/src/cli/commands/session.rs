//! Read-only session inspection commands.

use anyhow::{Context, Result};
use ivx_core::api::InterviewClient;

/// Prints the service's snapshot of a session.
pub async fn show(client: &InterviewClient, id: &str) -> Result<()> {
    let snapshot = client
        .fetch_session(id)
        .await
        .with_context(|| format!("fetch session '{id}'"))?;

    println!("Session:   {}", snapshot.session_id);
    println!("Job role:  {}", snapshot.job_role);
    if let Some(name) = snapshot.candidate_name.as_deref() {
        println!("Candidate: {name}");
    }
    println!("Status:    {}", snapshot.status);
    println!(
        "Progress:  round {}, question {}",
        snapshot.current_round,
        snapshot.current_question + 1
    );
    if !snapshot.created_at.is_empty() {
        println!("Created:   {}", snapshot.created_at);
    }

    for round in snapshot.rounds.values() {
        println!(
            "\nRound {} ({}): {} - score {:.1}{}",
            round.round_number,
            round.round_name,
            round.status,
            round.round_score,
            if round.passed { ", passed" } else { "" }
        );
        if !round.feedback.is_empty() {
            println!("  {}", round.feedback);
        }
    }

    if let Some(eval) = snapshot.final_evaluation.as_ref() {
        println!(
            "\nFinal: {:.1}% overall - {}",
            eval.overall_score, eval.recommendation
        );
    }
    Ok(())
}

/// Prints the transcript the service stored for a session.
pub async fn history(client: &InterviewClient, id: &str) -> Result<()> {
    let response = client
        .fetch_history(id)
        .await
        .with_context(|| format!("fetch history for session '{id}'"))?;

    for entry in &response.history {
        println!("[{}] {}", entry.role, entry.content);
    }
    Ok(())
}
