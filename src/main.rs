use clap::Parser;
use std::error::Error;

use rpachat::auth;
use rpachat::core::config::Config;
use rpachat::ui::chat_loop;

#[derive(Parser)]
#[command(name = "rpachat")]
#[command(about = "A terminal chat interface for RPA coding help, streaming from OpenRouter")]
#[command(long_about = "Rpachat is a full-screen terminal chat interface that connects to \
OpenRouter's chat-completions API for real-time RPA and automation coding help. Responses \
stream into the transcript as they arrive.\n\n\
Environment Variables:\n\
  OPENROUTER_API_KEY    Your OpenRouter API key (required)\n\n\
Controls:\n\
  Type              Enter your message in the input field\n\
  Enter             Send the message\n\
  Up/Down/Mouse     Scroll through chat history\n\
  /log [file]       Toggle transcript logging\n\
  Ctrl+C            Quit the application")]
struct Args {
    /// Override the configured model
    #[arg(short, long)]
    model: Option<String>,

    /// Log the transcript to this file from startup
    #[arg(short, long)]
    log: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let mut config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    if let Some(model) = args.model {
        config.model = model;
    }

    let system_prompt = match config.system_prompt() {
        Ok(prompt) => prompt,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    // Fail fast before any terminal setup or API call.
    let api_key = match auth::resolve_api_key() {
        Ok(key) => key,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    chat_loop::run(config, system_prompt, api_key, args.log).await
}
