//! Callback query handlers module
//!
//! Inline keyboard presses. The only inline control is the broadcast toggle
//! under the settings message.

use teloxide::{Bot, types::CallbackQuery, prelude::*};
use tracing::{debug, info, warn};
use crate::handlers::commands::settings::{broadcast_status_text, USER_NOT_FOUND_TEXT};
use crate::models::menu::{broadcast_toggle_keyboard, CALLBACK_TOGGLE_BROADCAST};
use crate::services::ServiceFactory;
use crate::utils::errors::Result;
use crate::utils::logging::log_user_action;

/// Main callback query dispatcher
pub async fn handle_callback_query(bot: Bot, query: CallbackQuery, services: ServiceFactory) -> Result<()> {
    let user_id = query.from.id.0 as i64;
    let message = query.message.as_ref().map(|m| (m.chat().id, m.id()));

    debug!(user_id = user_id, callback_data = ?query.data, "Processing callback query");

    // Answer first to remove the loading state
    if let Err(e) = bot.answer_callback_query(query.id.clone()).await {
        warn!(error = %e, callback_id = %query.id, "Failed to answer callback query");
    }

    match query.data.as_deref() {
        Some(CALLBACK_TOGGLE_BROADCAST) => {
            let toggled = services.user_service.toggle_broadcast(user_id).await?;
            let Some((chat_id, message_id)) = message else {
                return Ok(());
            };

            match toggled {
                Some(user) => {
                    let enabled = user.can_receive_broadcast;
                    log_user_action(user_id, "toggle_broadcast", Some(if enabled { "on" } else { "off" }));
                    info!(user_id = user_id, enabled = enabled, "Broadcast preference changed");

                    bot.edit_message_text(chat_id, message_id, format!("✅ {}", broadcast_status_text(enabled)))
                        .reply_markup(broadcast_toggle_keyboard(enabled))
                        .await?;
                }
                None => {
                    bot.edit_message_text(chat_id, message_id, USER_NOT_FOUND_TEXT).await?;
                }
            }
        }
        Some(other) => {
            warn!(user_id = user_id, callback_data = %other, "Unknown callback data");
        }
        None => {}
    }

    Ok(())
}
