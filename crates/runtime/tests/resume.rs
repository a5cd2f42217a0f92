mod common;

use std::sync::Arc;

use combat_core::SessionStatus;
use combat_runtime::{
    FileSessionRepository, InMemorySessionRepository, SessionManager, SessionRepository,
};
use common::*;

async fn interrupted_fight(repository: Arc<dyn SessionRepository>) -> combat_core::CombatSession {
    let manager = SessionManager::builder()
        .config(manual_config())
        .world(duel_world(400, 400))
        .repository(repository)
        .build();

    let handle = manager.initiate(ARIA, ARENA).await.unwrap();
    handle.submit_action(ARIA, "I feint left and stab").await.unwrap();
    handle.tick().await.unwrap();
    let snapshot = handle.query_session().await.unwrap();

    manager.shutdown().await.unwrap();
    snapshot
}

#[tokio::test]
async fn active_sessions_resume_from_memory() {
    let repository = Arc::new(InMemorySessionRepository::new());
    let snapshot = interrupted_fight(repository.clone()).await;
    assert_eq!(repository.len(), 1);

    let manager = SessionManager::builder()
        .config(manual_config())
        .world(duel_world(400, 400))
        .repository(repository.clone())
        .build();
    assert_eq!(manager.resume().await.unwrap(), 1);

    let handle = manager.session_for(ARIA).await.expect("session resumed");
    let resumed = handle.query_session().await.unwrap();
    assert_eq!(resumed, snapshot);
    assert_eq!(resumed.turn_timer(), 5);

    let submission = handle.submit_action(ARIA, "I shove the orc").await.unwrap();
    assert_eq!(submission.session, snapshot.id());

    // Already running sessions are not spawned twice.
    assert_eq!(manager.resume().await.unwrap(), 0);
    manager.shutdown().await.unwrap();
}

#[tokio::test]
async fn active_sessions_resume_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = {
        let repository = FileSessionRepository::new(dir.path()).unwrap();
        interrupted_fight(Arc::new(repository)).await
    };

    let repository = FileSessionRepository::new(dir.path()).unwrap();
    assert_eq!(repository.list_keys().unwrap(), vec![snapshot.id()]);

    let manager = SessionManager::builder()
        .config(manual_config())
        .repository(Arc::new(repository))
        .build();
    assert_eq!(manager.resume().await.unwrap(), 1);

    let handle = manager.handle(snapshot.id()).await.expect("session resumed");
    assert_eq!(handle.query_session().await.unwrap(), snapshot);
    manager.shutdown().await.unwrap();
}

#[tokio::test]
async fn finished_and_corrupt_records_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let repository = Arc::new(FileSessionRepository::new(dir.path()).unwrap());

    let manager = SessionManager::builder()
        .config(manual_config())
        .world(duel_world(300, 1))
        .repository(repository.clone())
        .build();
    let handle = manager.initiate(ARIA, ARENA).await.unwrap();
    let mut status = SessionStatus::Active;
    for _ in 0..100 {
        match handle.submit_action(ARIA, "I kick the orc").await {
            Ok(submission) => status = submission.status,
            Err(_) => break,
        }
        if status == SessionStatus::Ended {
            break;
        }
    }
    assert_eq!(status, SessionStatus::Ended);
    manager.shutdown().await.unwrap();

    std::fs::write(dir.path().join("session_00000000000000ff.json"), b"{ not json").unwrap();

    let restarted = SessionManager::builder()
        .config(manual_config())
        .repository(repository)
        .build();
    assert_eq!(restarted.resume().await.unwrap(), 0);
    assert!(restarted.handles().await.is_empty());
}
