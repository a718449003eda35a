//! StarlyBot Telegram Bot
//!
//! Main application entry point

use std::sync::Arc;
use std::time::Duration as StdDuration;
use teloxide::{prelude::*, types::{CallbackQuery, Update}};
use teloxide::dispatching::UpdateHandler;
use tracing::{info, warn, error};

use StarlyBot::{
    config::Settings,
    utils::logging,
    database::{DatabaseService, create_pool, run_migrations},
    services::{ServiceFactory, TelegramMessenger},
    state::FormCleanupManager,
    handlers::{Command, handle_command, handle_callback_query, handle_message},
};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging; the guard flushes the log file on exit
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", StarlyBot::info());

    // Initialize database connection
    info!("Connecting to database...");
    let db_pool = create_pool(&settings.database).await?;

    info!("Running database migrations...");
    run_migrations(&db_pool).await?;

    let database_service = DatabaseService::new(db_pool);
    let instance_id = database_service.claim_instance().await?;

    // Initialize bot
    let bot = Bot::new(&settings.bot.token);

    // Initialize services
    info!("Initializing services...");
    let services = ServiceFactory::new(
        settings.clone(),
        database_service.user_store(),
        database_service.form_store(),
        Arc::new(TelegramMessenger::new(bot.clone())),
    )?;

    let mut cleanup = (settings.forms.pending_ttl_minutes > 0).then(|| {
        FormCleanupManager::new(
            database_service.form_store(),
            chrono::Duration::minutes(settings.forms.pending_ttl_minutes),
            StdDuration::from_secs(settings.forms.cleanup_interval_seconds),
        )
    });
    if let Some(manager) = cleanup.as_mut() {
        manager.start_cleanup();
    }

    let mut dispatcher = Dispatcher::builder(bot, create_handler())
        .dependencies(dptree::deps![Arc::new(services)])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.id);
        })
        .enable_ctrlc_handler()
        .build();

    info!("StarlyBot is ready, starting polling...");
    dispatcher.dispatch().await;

    if let Some(manager) = cleanup.as_mut() {
        manager.stop_cleanup();
    }
    if let Err(e) = database_service.release_instance(instance_id).await {
        error!(error = %e, instance_id = %instance_id, "Failed to release bot instance");
    }

    info!("StarlyBot has been shut down.");
    Ok(())
}

/// Create the main update handler
fn create_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    dptree::entry()
        .branch(
            Update::filter_message()
                .branch(
                    dptree::entry()
                        .filter_command::<Command>()
                        .endpoint(handle_commands),
                )
                .branch(dptree::endpoint(handle_messages)),
        )
        .branch(Update::filter_callback_query().endpoint(handle_callbacks))
}

/// Handle bot commands
async fn handle_commands(
    bot: Bot,
    msg: Message,
    cmd: Command,
    services: Arc<ServiceFactory>,
) -> HandlerResult {
    let services = (*services).clone();

    if let Err(e) = handle_command(bot, msg, cmd, services).await {
        error!(error = %e, severity = ?e.severity(), "Error handling command");
        return Err(e.into());
    }

    Ok(())
}

/// Handle regular messages
async fn handle_messages(bot: Bot, msg: Message, services: Arc<ServiceFactory>) -> HandlerResult {
    let services = (*services).clone();
    let chat_id = msg.chat.id;

    if let Err(e) = handle_message(bot.clone(), msg, services).await {
        error!(error = %e, severity = ?e.severity(), "Error handling message");
        if chat_id.is_user() && e.is_recoverable() {
            let _ = bot
                .send_message(chat_id, "❌ Произошла ошибка. Попробуйте позже.")
                .await;
        }
        return Err(e.into());
    }

    Ok(())
}

/// Handle callback queries
async fn handle_callbacks(bot: Bot, query: CallbackQuery, services: Arc<ServiceFactory>) -> HandlerResult {
    let user_id = query.from.id.0 as i64;
    let services = (*services).clone();

    if let Err(e) = handle_callback_query(bot, query, services).await {
        error!(user_id = user_id, error = %e, "Error handling callback query");
        return Err(e.into());
    }

    Ok(())
}
