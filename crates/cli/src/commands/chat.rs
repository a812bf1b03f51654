//! `groundrag chat`: Interactive question loop.
//!
//! All questions share one short-term memory, so follow-ups see the last
//! few grounded exchanges.

use std::io::Write;
use std::path::PathBuf;

use tokio::io::{AsyncBufReadExt, BufReader};

use super::session;

pub async fn run(docs: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let session = session::start(docs).await?;
    let config = &session.config;

    println!();
    println!("  groundrag interactive mode");
    println!();
    println!("  Provider:   {}", config.core_provider());
    println!("  Model:      {}", config.core.model);
    println!(
        "  Judges:     {} (relevancy > {}), {} (grounding > {})",
        config.judge_model(&config.pre_filter),
        config.pre_filter.threshold,
        config.judge_model(&config.post_filter),
        config.post_filter.threshold
    );
    println!("  Knowledge:  {} chunk(s)", session.chunks);
    println!();
    println!("  Type your question and press Enter.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if matches!(query, "exit" | "quit") {
            break;
        }

        eprint!("  ...");
        match session.agent.ask(query).await {
            Ok(messages) => {
                eprint!("\r     \r");
                println!();
                for message in &messages {
                    for line in message.content.lines() {
                        println!("  Assistant > {line}");
                    }
                }
                println!();
            }
            Err(e) => {
                eprint!("\r     \r");
                eprintln!("  [Error] {e}");
                println!();
            }
        }
    }

    println!();
    Ok(())
}
