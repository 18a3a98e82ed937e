use std::io::Write;
use std::sync::Arc;

use chatkeep_app::aws::{build_aws_config, build_object_store};
use chatkeep_app::config::AppConfig;
use chatkeep_app::handler::ConversationHandler;
use chatkeep_bedrock::chat::BedrockResponder;
use chatkeep_storage::bucket::ensure_bucket;
use chatkeep_storage::conversation::ConversationStore;
use eyre::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    init_tracing(config.log_json);
    info!(config = ?config.info(), "starting chatkeep");

    let objects = build_object_store(&config).await;
    ensure_bucket(objects.as_ref(), &config.bucket).await?;

    let store = ConversationStore::new(objects, config.bucket.clone())
        .with_timeout(config.store_timeout);

    let model_config = build_aws_config(&config.region, &config.model_credentials).await;
    let responder =
        BedrockResponder::from_config(&model_config, &config.model_id, &config.system_prompt);

    let handler = ConversationHandler::new(store, Arc::new(responder))
        .with_max_save_attempts(config.max_save_attempts);

    let conversation_id = &config.conversation_id;
    match handler.store().load(conversation_id).await {
        Ok(history) => {
            info!(
                conversation_id = %conversation_id,
                bucket = handler.store().bucket(),
                messages = history.len(),
                "conversation ready"
            )
        }
        Err(e) => warn!(conversation_id = %conversation_id, error = %e, "could not read conversation"),
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match handler.handle_message(conversation_id, input).await {
            Ok(reply) => println!("{reply}"),
            Err(e) => {
                if let Some(reply) = e.reply() {
                    println!("{reply}");
                }
                error!(conversation_id = %conversation_id, error = %e, "turn failed");
                eprintln!("error: {e}");
            }
        }
    }

    Ok(())
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
