//! Service health check command.

use anyhow::{Context, Result};
use ivx_core::api::InterviewClient;

pub async fn run(client: &InterviewClient) -> Result<()> {
    let health = client.health().await.context("check service health")?;
    if health.service.is_empty() {
        println!("{}", health.status);
    } else {
        println!("{} ({})", health.status, health.service);
    }
    Ok(())
}
