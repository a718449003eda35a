//! Anketa and appeal conversation flows

mod helpers;

use std::sync::Arc;
use std::time::Duration as StdDuration;
use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use helpers::*;

use StarlyBot::database::{FormStore, UserStore};
use StarlyBot::models::MenuKind;
use StarlyBot::models::{Feature, FormKind};
use StarlyBot::services::{StartOutcome, StepOutcome, TextFormat};
use StarlyBot::state::{CooldownDenial, FormCleanupManager, PendingForm, ValidationError, CANCEL_TOKEN};
use StarlyBot::StarlyError;

const USER: i64 = 1;

async fn answer_all(ctx: &TestContext, inputs: &[&str]) -> Vec<StepOutcome> {
    let mut outcomes = Vec::new();
    for input in inputs {
        outcomes.push(
            ctx.services
                .conversation_service
                .handle_input(USER, input)
                .await
                .expect("Step failed"),
        );
    }
    outcomes
}

#[tokio::test]
async fn test_complete_anketa_reaches_admin_chat() {
    let ctx = TestContext::new();
    ctx.seed_user(USER, Some("anya")).await;
    ctx.messenger.set_handle(USER, "anya").await;

    let started = ctx.services.conversation_service.start(USER, FormKind::Anketa).await.unwrap();
    assert_matches!(started, StartOutcome::Started { .. });

    let outcomes = answer_all(&ctx, &["Аня", "17", "anya_17", "Люблю играть в команде!"]).await;
    assert_matches!(outcomes[0], StepOutcome::Prompt(_));
    assert_matches!(outcomes[2], StepOutcome::Prompt(_));
    assert_eq!(
        outcomes[3],
        StepOutcome::Submitted { kind: FormKind::Anketa, menu: MenuKind::Full }
    );

    let delivered = ctx.messenger.sent_to(ADMIN_CHAT_ID).await;
    assert_eq!(delivered.len(), 1);
    let text = delivered[0].text().unwrap();
    assert!(text.contains("📋 Новая анкета!"));
    assert!(text.contains("ID: <code>1</code> | @anya"));
    assert!(text.contains("anya_17"));
    assert_matches!(delivered[0], Sent::Text { format: TextFormat::Html, .. });

    assert!(ctx.forms.get(USER).await.is_none());
    let user = ctx.users.get(USER).await.unwrap();
    assert!(user.last_anketa_time.is_some());
    assert!(user.last_appeal_time.is_none());
}

#[tokio::test]
async fn test_underage_answer_is_retried_at_same_step() {
    let ctx = TestContext::new();
    ctx.seed_user(USER, None).await;
    ctx.services.conversation_service.start(USER, FormKind::Anketa).await.unwrap();

    let outcomes = answer_all(&ctx, &["Аня", "11"]).await;
    assert_eq!(outcomes[1], StepOutcome::Retry(ValidationError::AgeOutOfRange));

    let form = ctx.forms.get(USER).await.unwrap();
    assert_eq!(form.state.step(), "age");

    let outcomes = answer_all(&ctx, &["25"]).await;
    assert_matches!(outcomes[0], StepOutcome::Prompt(_));
    assert_eq!(ctx.forms.get(USER).await.unwrap().state.step(), "game_nickname");
}

#[tokio::test]
async fn test_appeal_without_handle_reports_unknown() {
    let ctx = TestContext::new();
    ctx.seed_user(USER, None).await;
    ctx.services.conversation_service.start(USER, FormKind::Appeal).await.unwrap();

    let outcomes = answer_all(&ctx, &["житель города", "Спасибо за турнир!"]).await;
    assert_eq!(
        outcomes[1],
        StepOutcome::Submitted { kind: FormKind::Appeal, menu: MenuKind::Full }
    );

    let delivered = ctx.messenger.sent_to(ADMIN_CHAT_ID).await;
    let text = delivered[0].text().unwrap();
    assert!(text.contains("📬 Новое обращение!"));
    assert!(text.contains("@unknown"));
}

#[tokio::test]
async fn test_banned_user_cannot_start() {
    let ctx = TestContext::new();
    ctx.seed_user(USER, None).await;
    ctx.users.set_ban(USER, true).await.unwrap();

    let outcome = ctx.services.conversation_service.start(USER, FormKind::Anketa).await.unwrap();
    assert_eq!(outcome, StartOutcome::Banned { menu: MenuKind::Reduced });
    assert!(ctx.forms.get(USER).await.is_none());
}

#[tokio::test]
async fn test_restriction_blocks_only_that_kind() {
    let ctx = TestContext::new();
    ctx.seed_user(USER, None).await;
    ctx.users.add_restriction(USER, Feature::Appeal).await.unwrap();

    let outcome = ctx.services.conversation_service.start(USER, FormKind::Appeal).await.unwrap();
    assert_eq!(
        outcome,
        StartOutcome::Restricted { kind: FormKind::Appeal, menu: MenuKind::WithoutAppeal }
    );

    let outcome = ctx.services.conversation_service.start(USER, FormKind::Anketa).await.unwrap();
    assert_matches!(outcome, StartOutcome::Started { .. });
}

#[tokio::test]
async fn test_second_form_refused_while_filling() {
    let ctx = TestContext::new();
    ctx.seed_user(USER, None).await;
    ctx.services.conversation_service.start(USER, FormKind::Anketa).await.unwrap();

    let again = ctx.services.conversation_service.start(USER, FormKind::Anketa).await.unwrap();
    assert_eq!(again, StartOutcome::AlreadyFilling);
    let other = ctx.services.conversation_service.start(USER, FormKind::Appeal).await.unwrap();
    assert_eq!(other, StartOutcome::AlreadyFilling);

    assert_eq!(ctx.forms.get(USER).await.unwrap().kind(), FormKind::Anketa);
}

#[tokio::test]
async fn test_cooldown_after_submission_covers_both_kinds() {
    let ctx = TestContext::new();
    ctx.seed_user(USER, None).await;
    ctx.services.conversation_service.start(USER, FormKind::Appeal).await.unwrap();
    answer_all(&ctx, &["участник", "Привет"]).await;

    let outcome = ctx.services.conversation_service.start(USER, FormKind::Anketa).await.unwrap();
    assert_matches!(outcome, StartOutcome::CoolingDown(CooldownDenial::Base { .. }));
    if let StartOutcome::CoolingDown(denial) = outcome {
        assert_eq!(denial.remaining_minutes(), 3);
    }
}

#[tokio::test]
async fn test_repeat_cooldown_after_burst() {
    let ctx = TestContext::new();
    let mut user = create_test_user(USER, None, "Test");
    user.last_appeal_time = Some(minutes_ago(5));
    user.prev_submission_time = Some(minutes_ago(10));
    ctx.users.insert(user).await;

    let outcome = ctx.services.conversation_service.start(USER, FormKind::Appeal).await.unwrap();
    assert_matches!(outcome, StartOutcome::CoolingDown(CooldownDenial::Repeat { .. }));

    let mut user = ctx.users.get(USER).await.unwrap();
    user.last_appeal_time = Some(minutes_ago(21));
    user.prev_submission_time = Some(minutes_ago(25));
    ctx.users.insert(user).await;

    let outcome = ctx.services.conversation_service.start(USER, FormKind::Appeal).await.unwrap();
    assert_matches!(outcome, StartOutcome::Started { .. });
}

#[tokio::test]
async fn test_failed_delivery_drops_form_without_recording() {
    let ctx = TestContext::new();
    ctx.seed_user(USER, None).await;
    ctx.services.conversation_service.start(USER, FormKind::Appeal).await.unwrap();
    answer_all(&ctx, &["участник"]).await;

    ctx.messenger.set_failing(true);
    let outcomes = answer_all(&ctx, &["Привет"]).await;
    assert_eq!(
        outcomes[0],
        StepOutcome::SubmissionFailed { kind: FormKind::Appeal, menu: MenuKind::Full }
    );

    assert!(ctx.forms.get(USER).await.is_none());
    let user = ctx.users.get(USER).await.unwrap();
    assert!(user.last_appeal_time.is_none());

    // No cool-down after a failed delivery
    ctx.messenger.set_failing(false);
    let outcome = ctx.services.conversation_service.start(USER, FormKind::Appeal).await.unwrap();
    assert_matches!(outcome, StartOutcome::Started { .. });
}

#[tokio::test]
async fn test_cancel_mid_form() {
    let ctx = TestContext::new();
    ctx.seed_user(USER, None).await;
    ctx.services.conversation_service.start(USER, FormKind::Anketa).await.unwrap();

    let outcomes = answer_all(&ctx, &["Аня", CANCEL_TOKEN]).await;
    assert_eq!(
        outcomes[1],
        StepOutcome::Cancelled { kind: FormKind::Anketa, menu: MenuKind::Full }
    );
    assert!(ctx.forms.get(USER).await.is_none());
    assert!(ctx.messenger.sent_to(ADMIN_CHAT_ID).await.is_empty());

    let cancelled = ctx.services.conversation_service.cancel(USER).await.unwrap();
    assert_eq!(cancelled, None);
}

#[tokio::test]
async fn test_cancel_command_returns_kind() {
    let ctx = TestContext::new();
    ctx.seed_user(USER, None).await;
    ctx.services.conversation_service.start(USER, FormKind::Appeal).await.unwrap();

    let cancelled = ctx.services.conversation_service.cancel(USER).await.unwrap();
    assert_eq!(cancelled, Some(FormKind::Appeal));
    assert_eq!(ctx.forms.len().await, 0);
}

#[tokio::test]
async fn test_input_without_form_is_idle() {
    let ctx = TestContext::new();
    ctx.seed_user(USER, None).await;

    let outcomes = answer_all(&ctx, &["просто текст"]).await;
    assert_eq!(outcomes[0], StepOutcome::Idle);
}

#[tokio::test]
async fn test_unknown_user_cannot_start() {
    let ctx = TestContext::new();

    let result = ctx.services.conversation_service.start(77, FormKind::Anketa).await;
    assert_matches!(result, Err(StarlyError::UserNotFound { user_id: 77 }));
}

#[tokio::test]
async fn test_idle_form_expires() {
    let mut settings = test_settings();
    settings.forms.pending_ttl_minutes = 60;
    let ctx = TestContext::with_settings(settings);
    ctx.seed_user(USER, None).await;

    let stale = PendingForm::new(USER, FormKind::Anketa, Utc::now() - Duration::hours(2));
    ctx.forms.save(&stale).await.unwrap();

    let outcomes = answer_all(&ctx, &["Аня"]).await;
    assert_eq!(outcomes[0], StepOutcome::Idle);
    assert!(ctx.forms.get(USER).await.is_none());

    let outcome = ctx.services.conversation_service.start(USER, FormKind::Anketa).await.unwrap();
    assert_matches!(outcome, StartOutcome::Started { .. });
}

#[tokio::test]
async fn test_cleanup_purges_only_idle_forms() {
    let forms = Arc::new(MemoryFormStore::new());
    forms
        .save(&PendingForm::new(1, FormKind::Anketa, Utc::now() - Duration::hours(30)))
        .await
        .unwrap();
    forms.save(&PendingForm::new(2, FormKind::Appeal, Utc::now())).await.unwrap();

    let manager = FormCleanupManager::new(forms.clone(), Duration::hours(24), StdDuration::from_secs(600));
    assert_eq!(manager.purge_once().await.unwrap(), 1);
    assert!(forms.get(1).await.is_none());
    assert!(forms.get(2).await.is_some());
}

#[tokio::test]
async fn test_age_out_of_range_then_accepted() {
    let ctx = TestContext::new();
    ctx.seed_user(USER, None).await;
    ctx.services.conversation_service.start(USER, FormKind::Anketa).await.unwrap();

    let outcomes = answer_all(&ctx, &["Ann Lee", "130", "25"]).await;
    assert_eq!(outcomes[1], StepOutcome::Retry(ValidationError::AgeOutOfRange));
    assert_eq!(
        outcomes[2],
        StepOutcome::Prompt("🎮 Введите ваш игровой ник (только латинские буквы, цифры и _):")
    );
}

#[tokio::test]
async fn test_banned_by_admin_then_start_gets_reduced_menu() {
    let ctx = TestContext::new();
    ctx.seed_user(12345, None).await;

    ctx.services
        .moderation_service
        .ban(&"12345".parse().unwrap())
        .await
        .unwrap();
    let user = ctx.users.get(12345).await.unwrap();
    assert!(user.is_banned);
    assert_eq!(user.banned_features, vec!["all".to_string()]);
    assert_eq!(MenuKind::for_user(Some(&user)), MenuKind::Reduced);

    let outcome = ctx.services.conversation_service.start(12345, FormKind::Appeal).await.unwrap();
    assert_eq!(outcome, StartOutcome::Banned { menu: MenuKind::Reduced });
}
