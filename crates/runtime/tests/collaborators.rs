mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use combat_core::{
    ActorProfile, Classification, Fighter, FighterId, LocationId, Rejection, Sentiment,
    SessionStatus, TurnSummary, Validation, VictorySummary,
};
use combat_runtime::{
    ActionValidator, Broadcaster, DeliveryError, InMemorySessionRepository, NarrativeGenerator,
    RuntimeConfig, RuntimeError, ScriptedWorld, ServiceError, SessionManager, SessionRepository,
    Topic, WorldProvider,
};
use common::*;

struct BrokenValidator;

#[async_trait]
impl ActionValidator for BrokenValidator {
    async fn validate(
        &self,
        _actor: &ActorProfile,
        _text: &str,
        _context: &str,
    ) -> Result<Validation, ServiceError> {
        Err(ServiceError::InvalidResponse("not json".into()))
    }
}

struct SlowValidator;

#[async_trait]
impl ActionValidator for SlowValidator {
    async fn validate(
        &self,
        _actor: &ActorProfile,
        _text: &str,
        _context: &str,
    ) -> Result<Validation, ServiceError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(Validation {
            classification: Classification::Unacceptable,
            sentiment: Sentiment::VeryPoor,
            feedback: "too late".into(),
        })
    }
}

/// Refuses anything mentioning magic, scores everything else as good.
struct StrictValidator;

#[async_trait]
impl ActionValidator for StrictValidator {
    async fn validate(
        &self,
        _actor: &ActorProfile,
        text: &str,
        _context: &str,
    ) -> Result<Validation, ServiceError> {
        if text.contains("fireball") {
            return Ok(Validation {
                classification: Classification::Unacceptable,
                sentiment: Sentiment::Average,
                feedback: "You don't know any spells.".into(),
            });
        }
        Ok(Validation {
            classification: Classification::Acceptable,
            sentiment: Sentiment::Good,
            feedback: "Nice footwork.".into(),
        })
    }
}

struct SilentNarrator;

#[async_trait]
impl NarrativeGenerator for SilentNarrator {
    async fn narrate_turn(&self, _summary: &TurnSummary) -> Result<String, ServiceError> {
        Err(ServiceError::Unavailable)
    }

    async fn narrate_victory(&self, _summary: &VictorySummary) -> Result<String, ServiceError> {
        Ok("   ".into())
    }
}

/// Narrates with a fixed delay per call.
struct SlowNarrator(Duration);

#[async_trait]
impl NarrativeGenerator for SlowNarrator {
    async fn narrate_turn(&self, summary: &TurnSummary) -> Result<String, ServiceError> {
        tokio::time::sleep(self.0).await;
        Ok(summary.fallback_narrative())
    }

    async fn narrate_victory(&self, summary: &VictorySummary) -> Result<String, ServiceError> {
        tokio::time::sleep(self.0).await;
        Ok(summary.fallback_narrative())
    }
}

/// Answers slowly for one location.
struct SlowWorld {
    inner: ScriptedWorld,
    slow: LocationId,
    delay: Duration,
}

#[async_trait]
impl WorldProvider for SlowWorld {
    async fn locate_eligible_participants(
        &self,
        location: LocationId,
    ) -> Result<Vec<Fighter>, ServiceError> {
        if location == self.slow {
            tokio::time::sleep(self.delay).await;
        }
        self.inner.locate_eligible_participants(location).await
    }
}

fn patient_config() -> RuntimeConfig {
    RuntimeConfig {
        service_timeout: Duration::from_secs(5),
        ..manual_config()
    }
}

/// Records deliveries; one recipient always fails.
#[derive(Clone, Default)]
struct RecordingBroadcaster {
    unreachable: Option<FighterId>,
    delivered: Arc<Mutex<Vec<(FighterId, String)>>>,
}

impl RecordingBroadcaster {
    fn lines_for(&self, recipient: FighterId) -> Vec<String> {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .filter(|(to, _)| *to == recipient)
            .map(|(_, text)| text.clone())
            .collect()
    }
}

impl Broadcaster for RecordingBroadcaster {
    fn send_to(&self, recipient: FighterId, text: &str) -> Result<(), DeliveryError> {
        if self.unreachable == Some(recipient) {
            return Err(DeliveryError::Failed {
                recipient,
                reason: "connection reset".into(),
            });
        }
        self.delivered.lock().unwrap().push((recipient, text.to_string()));
        Ok(())
    }
}

#[tokio::test]
async fn broken_validator_falls_back_to_neutral_verdict() {
    let manager = SessionManager::builder()
        .config(manual_config())
        .world(duel_world(300, 300))
        .validator(BrokenValidator)
        .build();
    manager.initiate(ARIA, ARENA).await.unwrap();

    let submission = manager.submit_action(ARIA, "I slash").await.unwrap();
    assert_eq!(submission.action.feedback, Validation::FALLBACK_FEEDBACK);
    assert_eq!(submission.action.sentiment, Sentiment::Average);
    manager.shutdown().await.unwrap();
}

#[tokio::test]
async fn slow_validator_is_cut_off() {
    let manager = SessionManager::builder()
        .config(manual_config())
        .world(duel_world(300, 300))
        .validator(SlowValidator)
        .build();
    manager.initiate(ARIA, ARENA).await.unwrap();

    let submission = manager.submit_action(ARIA, "I slash").await.unwrap();
    assert_eq!(submission.action.classification, Classification::Acceptable);
    manager.shutdown().await.unwrap();
}

#[tokio::test]
async fn refused_action_keeps_the_turn_open() {
    let manager = SessionManager::builder()
        .config(manual_config())
        .world(duel_world(300, 300))
        .validator(StrictValidator)
        .build();
    let handle = manager.initiate(ARIA, ARENA).await.unwrap();
    let before = handle.query_session().await.unwrap();

    let refused = manager.submit_action(ARIA, "I cast fireball").await.unwrap_err();
    assert!(matches!(
        refused,
        RuntimeError::Rejected(Rejection::Refused {
            classification: Classification::Unacceptable,
            ..
        })
    ));
    assert_eq!(refused.to_string(), "You don't know any spells.");
    assert_eq!(handle.query_session().await.unwrap(), before);

    let accepted = manager.submit_action(ARIA, "I lunge with my spear").await.unwrap();
    assert_eq!(accepted.action.sentiment, Sentiment::Good);
    let after = handle.query_session().await.unwrap();
    assert_eq!(after.sentiment_history(), &[Sentiment::Good]);

    // Passing never reaches the validator and is not scored.
    let passed = manager.submit_action(ARIA, "pass").await.unwrap();
    assert!(passed.action.is_pass());
    let after = handle.query_session().await.unwrap();
    assert_eq!(after.sentiment_history(), &[Sentiment::Good]);
    manager.shutdown().await.unwrap();
}

#[tokio::test]
async fn narration_failures_use_plain_text() {
    let broadcaster = RecordingBroadcaster::default();
    let manager = SessionManager::builder()
        .config(manual_config())
        .world(duel_world(300, 1))
        .narrator(SilentNarrator)
        .broadcaster(broadcaster.clone())
        .build();
    let handle = manager.initiate(ARIA, ARENA).await.unwrap();

    for _ in 0..100 {
        match handle.submit_action(ARIA, "I stomp on the orc").await {
            Ok(submission) if submission.status == SessionStatus::Ended => break,
            Ok(_) => {}
            Err(_) => break,
        }
    }

    let lines = broadcaster.lines_for(ARIA);
    assert!(lines.iter().any(|line| line.starts_with("Aria attacks Orc!")));
    assert_eq!(
        lines.last().map(String::as_str),
        Some("The combat is over. The winner is Players.")
    );
}

#[tokio::test]
async fn one_unreachable_player_does_not_silence_the_rest() {
    let broadcaster = RecordingBroadcaster {
        unreachable: Some(BRAM),
        ..RecordingBroadcaster::default()
    };
    let world = duel_world(300, 300).with_fighter(ARENA, Fighter::player(BRAM, "Bram", 300));
    let manager = SessionManager::builder()
        .config(manual_config())
        .world(world)
        .broadcaster(broadcaster.clone())
        .build();
    let mut bus = manager.event_bus().subscribe(Topic::Combat);

    manager.initiate(ARIA, ARENA).await.unwrap();

    let aria = broadcaster.lines_for(ARIA);
    assert_eq!(aria[0], "You roar and start a fight!");
    assert!(aria.iter().any(|line| line.starts_with("Bram: (")));
    assert!(broadcaster.lines_for(BRAM).is_empty());

    // Typed events still reach the bus.
    assert!(bus.try_recv().is_ok());
    manager.shutdown().await.unwrap();
}

#[tokio::test]
async fn turn_is_saved_before_narration_finishes() {
    let repository = Arc::new(InMemorySessionRepository::new());
    let manager = SessionManager::builder()
        .config(patient_config())
        .world(duel_world(300, 300))
        .narrator(SlowNarrator(Duration::from_millis(300)))
        .repository(repository.clone())
        .build();
    let handle = manager.initiate(ARIA, ARENA).await.unwrap();

    let submitter = handle.clone();
    let pending = tokio::spawn(async move { submitter.submit_action(ARIA, "I slash").await });
    tokio::time::sleep(Duration::from_millis(100)).await;

    let saved = repository.load(handle.id()).unwrap().expect("record saved");
    assert_eq!(saved.session.round_number(), 2);
    assert_eq!(saved.session.current_actor(), Some(ARIA));
    assert!(!pending.is_finished());

    pending.await.unwrap().unwrap();
    manager.shutdown().await.unwrap();
}

#[tokio::test]
async fn slow_world_lookup_does_not_block_other_sessions() {
    let world = duel_world(300, 300)
        .with_fighter(LocationId(2), Fighter::player(BRAM, "Bram", 30))
        .with_fighter(LocationId(2), Fighter::non_player(FighterId(20), "Rat", 5));
    let manager = Arc::new(
        SessionManager::builder()
            .config(patient_config())
            .world(SlowWorld {
                inner: world,
                slow: LocationId(2),
                delay: Duration::from_millis(1500),
            })
            .build(),
    );
    manager.initiate(ARIA, ARENA).await.unwrap();

    let starter = manager.clone();
    let second = tokio::spawn(async move { starter.initiate(BRAM, LocationId(2)).await });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let submitted = tokio::time::timeout(
        Duration::from_millis(500),
        manager.submit_action(ARIA, "I slash"),
    )
    .await
    .expect("submission is not held up by the lookup");
    submitted.unwrap();
    assert!(!second.is_finished());

    second.await.unwrap().unwrap();
    assert!(manager.session_for(BRAM).await.is_some());
    manager.shutdown().await.unwrap();
}
