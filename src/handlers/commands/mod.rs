//! Command handlers module
//!
//! Handlers for every slash command the bot understands.

pub mod admin;
pub mod broadcast;
pub mod settings;
pub mod start;

use teloxide::{Bot, types::Message, utils::command::BotCommands};
use crate::models::{Membership, UserFilter};
use crate::services::{Cohort, ServiceFactory};
use crate::handlers::forms;
use crate::utils::errors::Result;

/// All available bot commands
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "snake_case", description = "Команды бота:")]
pub enum Command {
    #[command(description = "Запустить бота и показать меню")]
    Start,
    #[command(description = "Настройки рассылки")]
    Settings,
    #[command(description = "Список команд")]
    Note,
    #[command(description = "Отменить заполнение анкеты или обращения")]
    Cancel,
    #[command(description = "Все пользователи")]
    ListAll,
    #[command(description = "Участники сквада")]
    ListSquad,
    #[command(description = "Участники города")]
    ListCity,
    #[command(description = "Заблокированные пользователи")]
    ListBanned,
    #[command(description = "Подписчики рассылки")]
    ListSubscribers,
    #[command(description = "Добавить в сквад: <id|@username>")]
    AddToSquad(String),
    #[command(description = "Добавить в город: <id|@username>")]
    AddToCity(String),
    #[command(description = "Убрать из сквада: <id|@username>")]
    RemoveFromSquad(String),
    #[command(description = "Убрать из города: <id|@username>")]
    RemoveFromCity(String),
    #[command(description = "Заблокировать: <id|@username>")]
    Ban(String),
    #[command(description = "Разблокировать: <id|@username>")]
    Unban(String),
    #[command(description = "Запретить функцию: <id|@username> <anketa|appeal>")]
    Restrict(String),
    #[command(description = "Разрешить функцию: <id|@username> <anketa|appeal>")]
    Unrestrict(String),
    #[command(description = "Рассылка всем подписчикам")]
    BroadcastAll(String),
    #[command(description = "Рассылка скваду")]
    BroadcastSquad(String),
    #[command(description = "Рассылка городу")]
    BroadcastCity(String),
    #[command(description = "Рассылка скваду и городу")]
    BroadcastStarly(String),
    #[command(description = "Сообщение пользователю: <id|@username> <текст>")]
    BroadcastToUser(String),
    #[command(description = "Сообщение в группу: <chat_id> <текст>")]
    BroadcastToGroup(String),
}

/// Main command dispatcher
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    services: ServiceFactory,
) -> Result<()> {
    match cmd {
        Command::Start => start::handle_start(bot, msg, services).await,
        Command::Note => start::handle_note(bot, msg, services).await,
        Command::Settings => settings::handle_settings(bot, msg, services).await,
        Command::Cancel => forms::handle_cancel(bot, msg, services).await,
        Command::ListAll => admin::handle_list(bot, msg, services, UserFilter::All).await,
        Command::ListSquad => admin::handle_list(bot, msg, services, UserFilter::Squad).await,
        Command::ListCity => admin::handle_list(bot, msg, services, UserFilter::City).await,
        Command::ListBanned => admin::handle_list(bot, msg, services, UserFilter::Banned).await,
        Command::ListSubscribers => admin::handle_list(bot, msg, services, UserFilter::Subscribers).await,
        Command::AddToSquad(args) => admin::handle_add_to(bot, msg, services, args, Membership::Squad).await,
        Command::AddToCity(args) => admin::handle_add_to(bot, msg, services, args, Membership::City).await,
        Command::RemoveFromSquad(args) => admin::handle_remove_from(bot, msg, services, args, Membership::Squad).await,
        Command::RemoveFromCity(args) => admin::handle_remove_from(bot, msg, services, args, Membership::City).await,
        Command::Ban(args) => admin::handle_ban(bot, msg, services, args).await,
        Command::Unban(args) => admin::handle_unban(bot, msg, services, args).await,
        Command::Restrict(args) => admin::handle_restrict(bot, msg, services, args, true).await,
        Command::Unrestrict(args) => admin::handle_restrict(bot, msg, services, args, false).await,
        Command::BroadcastAll(args) => broadcast::handle_cohort(bot, msg, services, args, Cohort::Subscribers).await,
        Command::BroadcastSquad(args) => broadcast::handle_cohort(bot, msg, services, args, Cohort::Squad).await,
        Command::BroadcastCity(args) => broadcast::handle_cohort(bot, msg, services, args, Cohort::City).await,
        Command::BroadcastStarly(args) => broadcast::handle_cohort(bot, msg, services, args, Cohort::Starly).await,
        Command::BroadcastToUser(args) => broadcast::handle_to_user(bot, msg, services, args).await,
        Command::BroadcastToGroup(args) => broadcast::handle_to_group(bot, msg, services, args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_snake_case_commands() {
        assert_eq!(Command::parse("/list_all", "starly_bot").ok(), Some(Command::ListAll));
        assert_eq!(
            Command::parse("/add_to_squad @vasya", "starly_bot").ok(),
            Some(Command::AddToSquad("@vasya".to_string()))
        );
        assert_eq!(
            Command::parse("/broadcast_to_user 42 привет всем", "starly_bot").ok(),
            Some(Command::BroadcastToUser("42 привет всем".to_string()))
        );
    }

    #[test]
    fn test_broadcast_without_args_parses_empty() {
        assert_eq!(
            Command::parse("/broadcast_all", "starly_bot").ok(),
            Some(Command::BroadcastAll(String::new()))
        );
    }
}
