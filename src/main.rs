use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vibe_coder::app::{format_idea_card, load_image, App};
use vibe_coder::credits::{CreditKind, Plan};
use vibe_coder::session::failure_message;

#[derive(Debug, Parser)]
#[command(name = "vibe-coder")]
#[command(about = "Generate websites and website ideas with Gemini")]
struct CliArgs {
    /// Plan to start the session on (free, basic, pro, business).
    #[arg(long, global = true, default_value = "free", value_parser = parse_plan_arg)]
    plan: Plan,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a website from a description.
    Site {
        #[arg(required = true, num_args = 1.., value_name = "DESCRIPTION")]
        prompt: Vec<String>,

        /// PNG, JPEG or WebP image the site should feature.
        #[arg(long, value_name = "PATH")]
        image: Option<PathBuf>,
    },
    /// Generate five website ideas for a topic.
    Ideas {
        #[arg(required = true, num_args = 1.., value_name = "TOPIC")]
        topic: Vec<String>,
    },
    /// Interactive session reading descriptions and commands from stdin.
    Shell,
}

fn parse_plan_arg(input: &str) -> std::result::Result<Plan, String> {
    input.parse().map_err(|e: vibe_coder::Error| e.to_string())
}

async fn run(app: &App, command: Command) -> vibe_coder::Result<()> {
    match command {
        Command::Site { prompt, image } => {
            let image = match image {
                Some(path) => Some(load_image(&path).await?),
                None => None,
            };
            let files = app
                .generate_site(&prompt.join(" "), image)
                .await
                .inspect_err(|e| {
                    if matches!(e, vibe_coder::Error::Io(_)) {
                        error!("{}", failure_message(CreditKind::Page, e));
                    }
                })?;
            println!("{}", files.index.display());
        }
        Command::Ideas { topic } => {
            let ideas = app.generate_ideas(&topic.join(" ")).await?;
            for (i, idea) in ideas.iter().enumerate() {
                println!("{}\n", format_idea_card(i, idea));
            }
        }
        Command::Shell => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();
            app.run_shell(stdin, &mut stdout).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vibe_coder=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting vibe-coder");

    let args = CliArgs::parse();

    match App::new(args.plan) {
        Ok(app) => match run(&app, args.command).await {
            Ok(_) => Ok(()),
            Err(e) => {
                error!("Generation failed: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    }
}
