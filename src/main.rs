use anyhow::Result;
use clap::{Parser, Subcommand};
use creao_studio::app::{App, OneShotRequest};
use creao_studio::models::AspectRatio;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "creao-studio")]
#[command(about = "Generate images from prompts with Gemini")]
struct CliArgs {
    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Interactive studio session (default).
    Studio,
    /// Generate a single image and save it.
    Generate {
        /// Text prompt.
        #[arg(short, long, default_value = "")]
        prompt: String,
        /// Style preset name, e.g. "Oil Painting".
        #[arg(short, long, conflicts_with = "no_style")]
        style: Option<String>,
        /// Send the prompt without any style suffix.
        #[arg(long)]
        no_style: bool,
        /// Aspect ratio: 1:1, 4:3, 3:4, 16:9 or 9:16.
        #[arg(short, long, value_parser = parse_ratio_arg)]
        ratio: Option<AspectRatio>,
        /// Reference image to transform.
        #[arg(long, value_name = "PATH")]
        reference: Option<PathBuf>,
    },
}

fn parse_ratio_arg(input: &str) -> std::result::Result<AspectRatio, String> {
    input.parse().map_err(|e: creao_studio::Error| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "creao_studio=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let mut app = match App::new() {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    match args.command.unwrap_or(CliCommand::Studio) {
        CliCommand::Studio => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            app.run_interactive(stdin, tokio::io::stdout()).await?;
        }
        CliCommand::Generate {
            prompt,
            style,
            no_style,
            ratio,
            reference,
        } => {
            let request = OneShotRequest {
                prompt,
                style,
                no_style,
                aspect_ratio: ratio,
                reference,
            };
            match app.run_once(request).await {
                Ok(path) => {
                    info!("Generation completed successfully");
                    println!("{}", path.display());
                }
                Err(e) => {
                    error!("Generation failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
