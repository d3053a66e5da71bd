//! Run one turn against an OpenAI-compatible endpoint.
//!
//! Run with: cargo run -p orchestrator --example chat_turn
//! Or with a custom message: cargo run -p orchestrator --example chat_turn -- "Your message here"
//!
//! Make sure to set environment variables in .env:
//!   OPENAI_API_KEY - API key for authentication

use std::env;
use std::sync::Arc;

use convo_tools::session_toolset;
use openai_model::OpenAiModel;
use orchestrator::TurnOrchestrator;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Get message from command line args or use default
    let args: Vec<String> = env::args().collect();
    let message_text = if args.len() > 1 {
        args[1..].join(" ")
    } else {
        "Hello! Please respond with a short greeting.".to_string()
    };

    println!("Initializing model...");
    let model = Arc::new(OpenAiModel::from_env()?);
    let orchestrator = TurnOrchestrator::new(model, session_toolset());

    println!("Sending: \"{}\"", message_text);
    println!("Waiting for response...\n");

    let output = orchestrator.run_turn("example-session", &message_text).await?;

    println!("=== Response ===");
    println!("{}", output.output_text);
    println!("================");
    if output.history_repaired {
        println!("(history was repaired during this turn)");
    }

    Ok(())
}
