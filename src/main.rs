//! Interactive travel planning session over stdin

use std::io::{BufRead, Write};

use voyager::{AppContext, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voyager=info".into()),
        )
        .init();

    let settings = Settings::new()?;
    let context = AppContext::initialize(&settings).await?;

    let session_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(session_id, "Session started");
    println!("Where would you like to go? (Ctrl-D to quit)");

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let utterance = line.trim();
        if utterance.is_empty() {
            continue;
        }

        match context.runner.run_turn(&session_id, utterance).await {
            Ok(reply) => println!("\n{}\n", reply),
            Err(error) => {
                tracing::error!("Turn failed: {}", error);
                println!("\nSomething went wrong: {}\n", error);
            }
        }
    }

    Ok(())
}
