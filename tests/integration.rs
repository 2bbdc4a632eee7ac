#![cfg(test)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use crew_bot::{
    base::{
        config::{Config, ConfigInner},
        types::{ChatMessage, ReactionEvent, Res, Void},
    },
    interaction::{self, best_of, startup},
    runtime::Runtime,
    service::{
        brain::BrainClient,
        chat::{ChatClient, GenericChatClient},
        glossary::{GenericGlossarySource, Glossary, GlossaryClient},
    },
};
use mockall::mock;

// Mocks.

// Mock chat client for testing.

mock! {
    pub Chat {}

    #[async_trait]
    impl GenericChatClient for Chat {
        fn bot_user_id(&self) -> &str;
        async fn start(&self) -> Void;
        async fn send_message(&self, channel_id: &str, thread_ts: &str, text: &str) -> Void;
        async fn send_ephemeral(&self, channel_id: &str, user_id: &str, text: &str) -> Void;
        async fn react_to_message(&self, channel_id: &str, ts: &str, emoji: &str) -> Void;
        async fn get_user_timezone(&self, user_id: &str) -> Res<Option<String>>;
        async fn get_permalink(&self, channel_id: &str, ts: &str) -> Res<String>;
    }
}

/// Every outgoing call the mock chat client saw, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Sent {
    Message { channel: String, thread_ts: String, text: String },
    Ephemeral { channel: String, user: String, text: String },
    Reaction { channel: String, ts: String, emoji: String },
}

type Outbox = Arc<Mutex<Vec<Sent>>>;

fn get_mock_chat(outbox: Outbox, timezone: Option<&'static str>) -> MockChat {
    let mut mock = MockChat::new();

    let messages = outbox.clone();
    let ephemerals = outbox.clone();
    let reactions = outbox;

    mock.expect_bot_user_id().return_const("UBOT".to_string());
    mock.expect_start().returning(|| Ok(()));
    mock.expect_send_message().returning(move |channel, thread_ts, text| {
        messages.lock().unwrap().push(Sent::Message {
            channel: channel.to_string(),
            thread_ts: thread_ts.to_string(),
            text: text.to_string(),
        });
        Ok(())
    });
    mock.expect_send_ephemeral().returning(move |channel, user, text| {
        ephemerals.lock().unwrap().push(Sent::Ephemeral {
            channel: channel.to_string(),
            user: user.to_string(),
            text: text.to_string(),
        });
        Ok(())
    });
    mock.expect_react_to_message().returning(move |channel, ts, emoji| {
        reactions.lock().unwrap().push(Sent::Reaction {
            channel: channel.to_string(),
            ts: ts.to_string(),
            emoji: emoji.to_string(),
        });
        Ok(())
    });
    mock.expect_get_user_timezone().returning(move |_| Ok(timezone.map(str::to_string)));
    mock.expect_get_permalink().returning(|channel, ts| Ok(format!("https://example.slack.com/archives/{channel}/p{}", ts.replace('.', ""))));

    mock
}

// Glossary sources for testing.

const GLOSSARY: &str = r#"
entries:
  ATO:
    type: acronym
    term: Authority to Operate
  Authority to Operate:
    type: term
    description: Formal declaration that a system may be used in production.
"#;

struct StaticGlossary;

#[async_trait]
impl GenericGlossarySource for StaticGlossary {
    async fn fetch(&self) -> Res<Glossary> {
        Glossary::from_yaml(GLOSSARY)
    }
}

struct BrokenGlossary;

#[async_trait]
impl GenericGlossarySource for BrokenGlossary {
    async fn fetch(&self) -> Res<Glossary> {
        Err(anyhow::anyhow!("connection refused"))
    }
}

fn test_config() -> Config {
    Config::from(ConfigInner {
        slack_app_token: "xapp-test".to_string(),
        slack_bot_token: "xoxb-test".to_string(),
        best_of_channel: Some("best-of".to_string()),
        ..Default::default()
    })
}

/// Helper function to setup the test environment.
async fn setup_test_environment() -> (Runtime, Outbox) {
    setup_test_environment_with(GlossaryClient::new(Arc::new(StaticGlossary)), Some("America/Chicago")).await
}

async fn setup_test_environment_with(glossary: GlossaryClient, timezone: Option<&'static str>) -> (Runtime, Outbox) {
    let outbox = Outbox::default();

    // Initialize the brain (using in-memory for tests).
    let brain = BrainClient::surreal_memory().await.expect("Failed to create brain client");

    // We create a mocked version of the chat client that records every call.
    let chat = ChatClient::new(Arc::new(get_mock_chat(outbox.clone(), timezone)));

    (Runtime { config: test_config(), brain, glossary, chat }, outbox)
}

fn message(channel_id: &str, text: &str, addressed: bool) -> ChatMessage {
    ChatMessage {
        channel_id: channel_id.to_string(),
        user_id: "U54321".to_string(),
        text: text.to_string(),
        ts: "1234567890.123456".to_string(),
        thread_ts: None,
        addressed,
    }
}

fn texts(outbox: &Outbox) -> Vec<String> {
    outbox
        .lock()
        .unwrap()
        .iter()
        .filter_map(|sent| match sent {
            Sent::Message { text, .. } | Sent::Ephemeral { text, .. } => Some(text.clone()),
            Sent::Reaction { .. } => None,
        })
        .collect()
}

#[tokio::test]
async fn test_tock_line_round_trip() {
    let (runtime, outbox) = setup_test_environment().await;

    interaction::process_message(&message("C1", "set tock line alpha", true), &runtime).await.unwrap();
    interaction::process_message(&message("C1", "tock line", true), &runtime).await.unwrap();
    interaction::process_message(&message("C2", "tock line", true), &runtime).await.unwrap();

    let texts = texts(&outbox);

    assert_eq!(texts.len(), 3);
    assert_eq!(texts[0], "Okay, I set the tock line for <#C1> to `alpha`");
    assert_eq!(texts[1], "The tock line for <#C1> is `alpha`");
    assert!(texts[2].starts_with("I don't know a tock line for this room."));

    let reactions = outbox.lock().unwrap().iter().filter(|sent| matches!(sent, Sent::Reaction { .. })).cloned().collect::<Vec<_>>();

    assert_eq!(
        reactions,
        vec![Sent::Reaction {
            channel: "C1".to_string(),
            ts: "1234567890.123456".to_string(),
            emoji: "white_check_mark".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_respond_scripts_ignore_unaddressed_messages() {
    let (runtime, outbox) = setup_test_environment().await;

    interaction::process_message(&message("C1", "tock line", false), &runtime).await.unwrap();
    interaction::process_message(&message("C1", "glossary ATO", false), &runtime).await.unwrap();

    assert!(outbox.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_glossary_is_case_insensitive() {
    let (runtime, outbox) = setup_test_environment().await;

    interaction::process_message(&message("C1", "glossary ATO", true), &runtime).await.unwrap();
    interaction::process_message(&message("C1", "glossary ato", true), &runtime).await.unwrap();
    interaction::process_message(&message("C1", "define kanban", true), &runtime).await.unwrap();

    let texts = texts(&outbox);

    assert_eq!(texts.len(), 3);
    assert_eq!(texts[0], texts[1]);
    assert!(texts[0].starts_with("*ATO* means _Authority to Operate_"));
    assert_eq!(texts[2], "Sorry, I couldn't find *kanban* in the glossary.");
}

#[tokio::test]
async fn test_glossary_failure_is_not_reported_to_the_user() {
    let (runtime, outbox) = setup_test_environment_with(GlossaryClient::new(Arc::new(BrokenGlossary)), None).await;

    let result = interaction::process_message(&message("C1", "glossary ATO", true), &runtime).await;

    assert!(result.is_ok());
    assert!(outbox.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_replies_stay_in_thread() {
    let (runtime, outbox) = setup_test_environment().await;

    let mut threaded = message("C1", "what day is it", false);
    threaded.thread_ts = Some("1111111111.000001".to_string());

    interaction::process_message(&threaded, &runtime).await.unwrap();

    let sent = outbox.lock().unwrap().clone();

    assert_eq!(sent.len(), 1);
    assert!(matches!(&sent[0], Sent::Message { channel, thread_ts, text } if channel == "C1" && thread_ts == "1111111111.000001" && text.starts_with("It's March ")));
}

#[tokio::test]
async fn test_love_is_relayed() {
    let (runtime, outbox) = setup_test_environment().await;

    interaction::process_message(&message("C1", "love <@U777> for the great demo", false), &runtime).await.unwrap();

    let sent = outbox.lock().unwrap().clone();

    assert_eq!(sent.len(), 2);
    assert_eq!(
        sent[0],
        Sent::Message {
            channel: "love".to_string(),
            thread_ts: String::new(),
            text: "<@U54321>: love <@U777> for the great demo".to_string(),
        }
    );
    assert_eq!(
        sent[1],
        Sent::Ephemeral {
            channel: "C1".to_string(),
            user: "U54321".to_string(),
            text: "Yay, more love for #love! Thanks, <@U54321>!".to_string(),
        }
    );
}

#[tokio::test]
async fn test_haiku_is_silent_unless_seventeen_syllables() {
    let (runtime, outbox) = setup_test_environment().await;

    interaction::process_message(&message("C1", "peace is a haiku writing robot now", false), &runtime).await.unwrap();
    assert!(outbox.lock().unwrap().is_empty());

    interaction::process_message(&message("C1", "an old silent pond a frog jumps into the pond splash silence again", false), &runtime).await.unwrap();
    assert_eq!(texts(&outbox), vec!["an old silent pond\na frog jumps into the pond\nsplash silence again".to_string()]);
}

#[tokio::test]
async fn test_timecheck_uses_a_date_token() {
    let (runtime, outbox) = setup_test_environment().await;

    interaction::process_message(&message("C1", "timecheck 3:30pm", false), &runtime).await.unwrap();

    let texts = texts(&outbox);

    assert_eq!(texts.len(), 1);
    assert!(texts[0].starts_with("<@U54321> means <!date^"));
    // An explicit meridiem is kept even when the time has already passed today.
    assert!(texts[0].contains("|3:30 PM C"));
}

#[tokio::test]
async fn test_timecheck_falls_back_to_default_timezone() {
    for timezone in [None, Some("Not/AZone")] {
        let (runtime, outbox) = setup_test_environment_with(GlossaryClient::new(Arc::new(StaticGlossary)), timezone).await;

        interaction::process_message(&message("C1", "timecheck 3:30pm", false), &runtime).await.unwrap();

        let texts = texts(&outbox);

        assert_eq!(texts.len(), 1, "{timezone:?}");
        // The default zone is America/New_York (EDT or EST).
        assert!(texts[0].contains("|3:30 PM E"), "{timezone:?}: {}", texts[0]);
    }
}

#[tokio::test]
async fn test_timecheck_ignores_invalid_times() {
    let (runtime, outbox) = setup_test_environment().await;

    interaction::process_message(&message("C1", "timecheck 25:99", false), &runtime).await.unwrap();

    assert!(outbox.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_best_of_posts_permalink() {
    let (runtime, outbox) = setup_test_environment().await;

    let event = ReactionEvent {
        user_id: "U54321".to_string(),
        reaction: "best-of".to_string(),
        channel_id: "C1".to_string(),
        ts: "1234567890.123456".to_string(),
    };

    best_of::handle_reaction(&event, &runtime).await.unwrap();

    let texts = texts(&outbox);

    assert_eq!(texts.len(), 1);
    assert!(texts[0].ends_with("https://example.slack.com/archives/C1/p1234567890123456"));
}

#[tokio::test]
async fn test_best_of_ignores_other_reactions() {
    let (runtime, outbox) = setup_test_environment().await;

    let event = ReactionEvent {
        user_id: "U54321".to_string(),
        reaction: "thumbsup".to_string(),
        channel_id: "C1".to_string(),
        ts: "1234567890.123456".to_string(),
    };

    best_of::handle_reaction(&event, &runtime).await.unwrap();

    assert!(outbox.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_startup_announcement_waits_and_sends_once() {
    let started = tokio::time::Instant::now();

    let mut mock = MockChat::new();
    mock.expect_send_message()
        .times(1)
        .withf(move |channel, thread_ts, text| {
            started.elapsed() >= startup::STARTUP_DELAY && channel.to_string() == "bots" && thread_ts.is_empty() && text.to_string() == startup::STARTUP_MESSAGE
        })
        .returning(|_, _, _| Ok(()));

    let chat = ChatClient::new(Arc::new(mock));
    let config = test_config();

    startup::announce_startup(chat, config.status_channel.clone()).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_startup_announcement_not_sent_early() {
    let mut mock = MockChat::new();
    mock.expect_send_message().times(0);

    let chat = ChatClient::new(Arc::new(mock));
    let handle = startup::announce_startup(chat, "bots".to_string());

    tokio::time::sleep(startup::STARTUP_DELAY - std::time::Duration::from_millis(1)).await;

    assert!(!handle.is_finished());
    handle.abort();
}

#[test]
fn test_roll_command_stays_in_range() {
    use crew_bot::base::types::SlashCommand;

    let command = |text: &str| SlashCommand {
        command: "/roll".to_string(),
        text: text.to_string(),
        user_id: "U54321".to_string(),
        channel_id: "C1".to_string(),
    };

    let value = |reply: String| reply.trim_end_matches('.').rsplit(' ').next().unwrap().parse::<u32>().unwrap();

    for _ in 0..100 {
        assert!((1..=6).contains(&value(interaction::handle_command(&command("d6")))));
        assert!((1..=20).contains(&value(interaction::handle_command(&command("")))));
    }
}
