use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nostr_event_kit::config::Settings;
use nostr_event_kit::{kind, EventContext, EventDraft, LocalSigner, RelayTransport};

#[derive(Parser)]
#[command(name = "nostr-event-kit", version, about = "Sign and publish Nostr events")]
struct Cli {
    /// Path to the `.env` configuration file.
    #[arg(long, default_value = ".env")]
    env: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign an event and print it as JSON.
    Sign(EventArgs),
    /// Sign an event and send it to the configured relays.
    Publish(EventArgs),
}

#[derive(Args)]
struct EventArgs {
    #[arg(long, default_value_t = kind::TEXT_NOTE)]
    kind: u32,
    #[arg(long, default_value = "")]
    content: String,
    /// Tag as comma-separated values, e.g. `--tag d,my-article`. Repeatable.
    #[arg(long = "tag")]
    tags: Vec<String>,
    #[arg(long)]
    subject: Option<String>,
    /// Unix timestamp; defaults to now.
    #[arg(long)]
    created_at: Option<i64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env(&cli.env)?;

    let secret = settings
        .secret_key
        .as_deref()
        .context("NOSTR_SECRET_KEY is required")?;
    let signer = LocalSigner::parse(secret).context("invalid NOSTR_SECRET_KEY")?;
    tracing::info!(pubkey = %signer.pubkey(), "loaded signing key");

    let ctx = EventContext::builder()
        .signer(signer)
        .transport(RelayTransport::from_settings(&settings))
        .build();

    match cli.command {
        Commands::Sign(args) => {
            let mut draft = build_draft(ctx, args);
            let signed = draft.sign().await?;
            println!("{}", serde_json::to_string_pretty(&signed)?);
        }
        Commands::Publish(args) => {
            if settings.relays.is_empty() {
                anyhow::bail!("NOSTR_RELAYS is empty");
            }
            let mut draft = build_draft(ctx, args);
            let acks = draft.publish().await?;
            tracing::info!(event_id = %draft.id, "published");
            println!("{}", serde_json::to_string_pretty(&acks)?);
        }
    }
    Ok(())
}

fn build_draft(ctx: std::sync::Arc<EventContext>, args: EventArgs) -> EventDraft {
    let mut draft = EventDraft::new(Some(ctx));
    draft.kind = Some(args.kind);
    draft.content = args.content;
    draft.subject = args.subject;
    draft.created_at = args.created_at;
    draft.tags = args
        .tags
        .iter()
        .map(|t| t.split(',').map(|s| s.to_string()).collect())
        .collect();
    draft
}
