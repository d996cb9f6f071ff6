use anyhow::{Context as _, Result};
use dotenvy::dotenv;
use log::{error, info, warn};
use serenity::async_trait;
use serenity::http::Http;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use std::sync::Arc;
use tokio::sync::mpsc;

use commandworks::commands::builtin;
use commandworks::core::Config;
use commandworks::discord::{BotIdentity, DiscordClient, DiscordMessage};
use commandworks::features::dispatch::{Listener, Processor};
use commandworks::features::queue::QueueForwarder;
use commandworks::source::{MessageRef, MessageSource};

struct Handler {
    inbound: mpsc::Sender<MessageRef>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let bot_user_id = ctx.cache.current_user_id().to_string();
        let message = DiscordMessage::from_gateway(&msg, &ctx.cache, &bot_user_id);
        if let Err(e) = self.inbound.send(Arc::new(message)).await {
            error!("Listener is gone, dropping message {}: {e}", msg.id);
        }
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("{} is connected and ready!", ready.user.name);
        info!("Connected to {} guilds", ready.guilds.len());
    }
}

/// Bot user, client id and owner; configured values win over what Discord
/// reports.
async fn resolve_identity(http: &Http, config: &Config) -> Result<BotIdentity> {
    let user = http
        .get_current_user()
        .await
        .context("Failed to fetch the bot user")?;

    let (application_id, application_owner) = match http.get_current_application_info().await {
        Ok(info) => (Some(info.id.to_string()), Some(info.owner.id.to_string())),
        Err(e) => {
            warn!("Failed to fetch application info: {e}");
            (None, None)
        }
    };

    Ok(BotIdentity {
        user_id: user.id.to_string(),
        user_name: user.name.clone(),
        client_id: config.client_id.clone().or(application_id),
        owner_user_id: config.owner_user_id.clone().or(application_owner),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting commandworks bot...");

    let (inbound_tx, inbound_rx) = mpsc::channel(config.queue_capacity);
    let (work_tx, work_rx) = mpsc::channel(config.queue_capacity);

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(Handler {
            inbound: inbound_tx,
        })
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    let http = client.cache_and_http.http.clone();
    let cache = client.cache_and_http.cache.clone();
    let identity = resolve_identity(&http, &config).await?;
    info!(
        "Bot user {} ({}), prefix '{}'",
        identity.user_name, identity.user_id, config.command_prefix
    );
    if identity.client_id.is_none() {
        warn!("No client id known, the invite command stays silent");
    }

    let source: Arc<dyn MessageSource> = Arc::new(DiscordClient::new(http, cache, identity));

    let mut listener = Listener::new(
        config.listener_config(),
        source.clone(),
        Arc::new(QueueForwarder::new(work_tx)),
    );
    for definition in builtin::listener_commands() {
        listener.register_command(definition);
    }

    let mut processor = Processor::new(source);
    for command in builtin::processor_commands(Some(listener.stats())) {
        processor.register_command(command);
    }

    let _processor_loop = processor.open(work_rx)?;
    let _listener_loop = listener.open(inbound_rx)?;

    info!("Establishing WebSocket connection to Discord gateway...");
    if let Err(why) = client.start().await {
        error!("Gateway connection failed: {why:?}");
        return Err(anyhow::anyhow!(
            "Failed to establish gateway connection: {}",
            why
        ));
    }

    Ok(())
}
