//! `groundrag ask`: Answer a single question.

use std::path::PathBuf;

use groundrag_agent::Outcome;

use super::session;

pub async fn run(query: &str, docs: Option<PathBuf>, report: bool) -> Result<(), Box<dyn std::error::Error>> {
    let session = session::start(docs).await?;

    eprint!("  Thinking...");
    let result = session.agent.run(query).await;
    eprint!("\r              \r");
    let answer = result?;

    if report {
        println!("{}", serde_json::to_string_pretty(&answer)?);
        return Ok(());
    }

    for message in &answer.messages {
        println!("{}", message.content);
    }
    if answer.outcome == Outcome::Refused {
        eprintln!();
        eprintln!(
            "  (refused: answer not supported by {} context item(s))",
            answer.context_items
        );
    }
    Ok(())
}
