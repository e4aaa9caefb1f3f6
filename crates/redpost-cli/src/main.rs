//! redpost CLI - AI-assisted creator-platform publishing
//!
//! Usage:
//!   redpost login                                  Open a browser to log in manually
//!   redpost generate --topic T [--provider P]      Generate a post, print it, no side effects
//!   redpost publish --topic T [--provider P]       Generate and publish through the browser

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use redpost_browser::{
    ChatSelectorInference, ElementResolver, OfflineInference, PublishWorkflow, Session,
    SessionConfig, StepOutcome,
};
use redpost_content::{
    deepseek_api_key, provider_for, ChatClient, ProviderKind, DEEPSEEK_API_BASE, DEEPSEEK_MODEL,
};
use redpost_core::RedpostConfig;
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "redpost")]
#[command(author, version, about = "AI-assisted creator-platform publishing")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a browser session and wait for a manual login
    Login,

    /// Generate a post for a topic and print it
    Generate {
        /// Topic to generate content for
        #[arg(long)]
        topic: String,

        /// Content provider
        #[arg(long, default_value = "mock")]
        provider: CliProvider,
    },

    /// Generate a post and publish it through the browser
    Publish {
        /// Topic to publish
        #[arg(long)]
        topic: String,

        /// Content provider
        #[arg(long, default_value = "mock")]
        provider: CliProvider,

        /// Image to attach to the post
        #[arg(long, default_value = "test_image.jpg")]
        image: PathBuf,
    },
}

/// CLI-friendly provider enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliProvider {
    Mock,
    Deepseek,
    Gemini,
}

impl From<CliProvider> for ProviderKind {
    fn from(p: CliProvider) -> Self {
        match p {
            CliProvider::Mock => ProviderKind::Mock,
            CliProvider::Deepseek => ProviderKind::DeepSeek,
            CliProvider::Gemini => ProviderKind::Gemini,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Login => cmd_login().await,
        Commands::Generate { topic, provider } => cmd_generate(&topic, provider.into()).await,
        Commands::Publish {
            topic,
            provider,
            image,
        } => cmd_publish(&topic, provider.into(), &image).await,
    }
}

async fn cmd_login() -> Result<()> {
    let config = RedpostConfig::load_or_default(Path::new("."))?;

    // Manual login needs a visible window regardless of config
    let session_config = SessionConfig {
        profile_dir: config.profile_dir.clone(),
        headless: false,
        ..SessionConfig::default()
    };
    let session = Session::launch(session_config).await?;

    let outcome = {
        let workflow = PublishWorkflow::new(&session, build_resolver(&config), config.clone());
        workflow.login().await
    };

    match outcome {
        Ok(()) => {
            println!("Login successful.");
            let state_path = config.state_export_path();
            if let Err(e) = session.export_state(&state_path) {
                warn!("Could not export session state: {}", e);
            } else {
                println!("Session state saved to {}", state_path.display());
            }
        }
        Err(e) => {
            session.close().await.ok();
            return Err(e).context("Login failed");
        }
    }

    // Keep the browser open briefly so the user sees the logged-in state
    tokio::time::sleep(std::time::Duration::from_secs(5)).await;
    session.close().await?;
    Ok(())
}

async fn cmd_generate(topic: &str, kind: ProviderKind) -> Result<()> {
    let post = generate_post(topic, kind).await?;
    print_post(&post);
    Ok(())
}

async fn cmd_publish(topic: &str, kind: ProviderKind, image: &Path) -> Result<()> {
    let config = RedpostConfig::load_or_default(Path::new("."))?;

    // Fail on a missing credential before any browser work starts
    let post = generate_post(topic, kind).await?;
    print_post(&post);

    if !image.exists() {
        bail!(
            "Image not found at {}. Fetch one first, e.g.: curl -o test_image.jpg https://picsum.photos/800/600",
            image.display()
        );
    }

    info!("Launching browser for publishing...");
    let session_config = SessionConfig {
        profile_dir: config.profile_dir.clone(),
        headless: config.headless,
        ..SessionConfig::default()
    };
    let session = Session::launch(session_config).await?;

    let outcome = {
        let workflow = PublishWorkflow::new(&session, build_resolver(&config), config.clone());
        workflow.publish(&post, image).await
    };

    let report = match outcome {
        Ok(report) => {
            // Keep the browser open briefly so the user can inspect the result
            tokio::time::sleep(std::time::Duration::from_secs(10)).await;
            session.close().await.ok();
            report
        }
        Err(e) => {
            session.close().await.ok();
            return Err(e).context("Publish failed");
        }
    };

    println!("\nPublish report:");
    for (step, result) in &report.steps {
        match result {
            StepOutcome::Completed => println!("  {:<22} ok", step.to_string()),
            StepOutcome::SoftFailed(reason) => {
                println!("  {:<22} warning: {}", step.to_string(), reason)
            }
        }
    }
    println!(
        "Submit clicked: {}. Confirmation: {:?}.",
        report.submit_clicked, report.confirmation
    );
    Ok(())
}

async fn generate_post(
    topic: &str,
    kind: ProviderKind,
) -> Result<redpost_core::GeneratedPost> {
    println!("Generating content for topic: '{}' using {}...", topic, kind);
    let provider = provider_for(kind).context("Could not build content provider")?;
    Ok(provider.generate(topic).await)
}

fn print_post(post: &redpost_core::GeneratedPost) {
    println!("\n{}", "=".repeat(30));
    println!("TITLE: {}", post.title);
    println!("{}", "-".repeat(30));
    println!("CONTENT:\n{}", post.content);
    println!("{}", "-".repeat(30));
    println!("IMAGE PROMPT: {}", post.image_prompt);
    println!("{}\n", "=".repeat(30));
}

/// The resolver speaks the DeepSeek chat contract when a key is present;
/// without one every resolution falls back to hardcoded selectors.
fn build_resolver(config: &RedpostConfig) -> ElementResolver {
    let resolver = match deepseek_api_key() {
        Ok(key) => {
            let client = ChatClient::new(key, DEEPSEEK_API_BASE, DEEPSEEK_MODEL);
            ElementResolver::new(Box::new(ChatSelectorInference::new(client)))
        }
        Err(_) => {
            warn!("DEEPSEEK_API_KEY not set; element resolution will use hardcoded selectors only");
            ElementResolver::new(Box::new(OfflineInference))
        }
    };
    resolver.with_max_markup_len(config.resolver.max_markup_len)
}
