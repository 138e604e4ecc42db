//! Concurrency tests for the assessment core
//!
//! These validate the per-session exclusivity rules:
//! - A `complete` call racing the expiry sweep records exactly one terminal
//!   transition
//! - Concurrent completes resolve to a single winner
//! - Parallel submits and monitor ingests keep counts consistent

use std::sync::Arc;

use gauge_core::{
    AssessmentService, Competency, ErrorKind, EventBus, GaugeConfig, GaugeEvent, Identity,
    MemoryCatalog, MemoryEventBus, Question, Role, SessionStatus, Severity, SignalKind,
    Specialization, Tier, Topic,
};

async fn full_catalog() -> MemoryCatalog {
    let catalog = MemoryCatalog::new();
    catalog
        .add_specialization(Specialization {
            id: 1,
            name: "Backend development".into(),
        })
        .await;
    for c in 0..5i64 {
        catalog
            .add_competency(Competency {
                id: c + 1,
                specialization_id: 1,
                name: format!("competency {}", c + 1),
                importance: 90 - (c as u8) * 10,
            })
            .await;
        for t in 0..4i64 {
            let topic_id = (c + 1) * 100 + t;
            catalog
                .add_topic(Topic {
                    id: topic_id,
                    competency_id: c + 1,
                    name: format!("topic {topic_id}"),
                })
                .await;
            for tier in Tier::ALL {
                catalog
                    .add_question(Question {
                        id: topic_id * 10 + i64::from(tier.rank()),
                        topic_id,
                        tier,
                        text: format!("question {topic_id}/{}", tier.as_str()),
                        options: ["a".into(), "b".into(), "c".into(), "d".into()],
                        correct_option: 1,
                    })
                    .await;
            }
        }
    }
    catalog
}

async fn setup() -> (Arc<AssessmentService>, Arc<MemoryEventBus>, Identity) {
    let bus = Arc::new(MemoryEventBus::new(4096));
    let service = Arc::new(AssessmentService::new(
        GaugeConfig::default(),
        Arc::new(full_catalog().await),
        bus.clone(),
    ));
    let user = Identity::new("emp-1", "Employee One", Role::Employee);
    (service, bus, user)
}

async fn started_session(service: &AssessmentService, user: &Identity) -> uuid::Uuid {
    let session = service.create_session(user, 1).await.unwrap();
    service.assemble_session(user, session.id, 1).await.unwrap();
    service.start_session(user, session.id).await.unwrap();
    session.id
}

/// Push a started session past its deadline without touching the status
async fn rewind_past_deadline(service: &AssessmentService, session_id: uuid::Uuid) {
    service
        .sessions()
        .with_session(session_id, |record| {
            record.session.started_at =
                Some(chrono::Utc::now() - chrono::Duration::minutes(41));
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn complete_racing_sweep_records_one_terminal_transition() {
    let (service, bus, user) = setup().await;
    let session_id = started_session(&service, &user).await;
    rewind_past_deadline(&service, session_id).await;

    let sweeper = Arc::new(service.sweeper());
    let complete_service = Arc::clone(&service);
    let sweep = Arc::clone(&sweeper);

    let (complete_result, swept) = tokio::join!(
        async move { complete_service.complete_session(&user, session_id).await },
        async move { sweep.sweep_once().await },
    );

    // The session is past its deadline: completion must not win
    let err = complete_result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::State);

    let reviewer = Identity::new("hr-1", "HR", Role::Hr);
    let session = service.get_session(&reviewer, session_id).await.unwrap();
    assert_eq!(session.status, SessionStatus::Expired);
    assert!(session.score.is_none());

    // Exactly one terminal transition was recorded and published,
    // whichever side won the lock
    let expired_events = bus
        .session_events(session_id)
        .await
        .into_iter()
        .filter(|(_, e)| matches!(e, GaugeEvent::SessionExpired { .. }))
        .count();
    assert_eq!(expired_events, 1);
    // The loser observed the terminal state: swept is 0 or 1, never both
    assert!(swept.len() <= 1);
}

#[tokio::test]
async fn sweep_leaves_in_time_completion_alone() {
    let (service, _, user) = setup().await;
    let session_id = started_session(&service, &user).await;

    let sweeper = service.sweeper();
    let complete_service = Arc::clone(&service);
    let user_clone = user.clone();

    let (complete_result, swept) = tokio::join!(
        async move { complete_service.complete_session(&user_clone, session_id).await },
        async { sweeper.sweep_once().await },
    );

    assert!(complete_result.is_ok());
    assert!(swept.is_empty());

    let session = service.get_session(&user, session_id).await.unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
}

#[tokio::test]
async fn concurrent_completes_have_exactly_one_winner() {
    let (service, _, user) = setup().await;
    let session_id = started_session(&service, &user).await;

    let s1 = Arc::clone(&service);
    let s2 = Arc::clone(&service);
    let u1 = user.clone();
    let u2 = user.clone();

    let (r1, r2) = tokio::join!(
        async move { s1.complete_session(&u1, session_id).await },
        async move { s2.complete_session(&u2, session_id).await },
    );

    let successes = [r1.is_ok(), r2.is_ok()].iter().filter(|&&ok| ok).count();
    assert_eq!(successes, 1, "exactly one completion may win");

    let loser = if r1.is_ok() { r2 } else { r1 };
    assert_eq!(loser.unwrap_err().kind(), ErrorKind::State);

    let session = service.get_session(&user, session_id).await.unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
}

#[tokio::test]
async fn parallel_submits_on_one_session_all_land() {
    let (service, _, user) = setup().await;
    let session_id = started_session(&service, &user).await;

    let questions = service.get_questions(&user, session_id).await.unwrap();
    let ids: Vec<i64> = questions.iter().map(|v| v.question_id).collect();

    let mut handles = vec![];
    for chunk in ids.chunks(6) {
        let service = Arc::clone(&service);
        let user = user.clone();
        let chunk = chunk.to_vec();
        handles.push(tokio::spawn(async move {
            for question_id in chunk {
                service
                    .submit_answer(&user, session_id, question_id, 1)
                    .await
                    .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let questions = service.get_questions(&user, session_id).await.unwrap();
    assert_eq!(questions.iter().filter(|v| v.answer.is_some()).count(), 24);

    let summary = service.complete_session(&user, session_id).await.unwrap();
    assert_eq!(summary.score, 1.0);
}

#[tokio::test]
async fn monitors_and_submits_race_without_losing_events() {
    let (service, _, user) = setup().await;
    let session_id = started_session(&service, &user).await;

    let questions = service.get_questions(&user, session_id).await.unwrap();
    let ids: Vec<i64> = questions.iter().map(|v| v.question_id).collect();

    let submit_service = Arc::clone(&service);
    let submit_user = user.clone();
    let submits = tokio::spawn(async move {
        for question_id in ids {
            submit_service
                .submit_answer(&submit_user, session_id, question_id, 1)
                .await
                .unwrap();
        }
    });

    let mut monitors = vec![];
    for _ in 0..3 {
        let service = Arc::clone(&service);
        let user = user.clone();
        monitors.push(tokio::spawn(async move {
            for _ in 0..5 {
                service
                    .ingest_proctoring_event(
                        &user,
                        session_id,
                        SignalKind::FocusLost,
                        Severity::Low,
                        "window blurred",
                    )
                    .await
                    .unwrap();
            }
        }));
    }

    submits.await.unwrap();
    for monitor in monitors {
        monitor.await.unwrap();
    }

    let reviewer = Identity::new("hr-1", "HR", Role::Hr);
    let summary = service.get_risk_summary(&reviewer, session_id).await.unwrap();
    assert_eq!(summary.suspicious_event_count, 15);

    let questions = service.get_questions(&user, session_id).await.unwrap();
    assert_eq!(questions.iter().filter(|v| v.answer.is_some()).count(), 24);
}

#[tokio::test]
async fn sessions_of_different_users_are_independent() {
    let (service, _, _) = setup().await;

    let mut handles = vec![];
    for i in 0..5 {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            let user = Identity::new(format!("emp-{i}"), format!("User {i}"), Role::Employee);
            let session_id = started_session(&service, &user).await;
            let questions = service.get_questions(&user, session_id).await.unwrap();
            for view in &questions {
                service
                    .submit_answer(&user, session_id, view.question_id, 1)
                    .await
                    .unwrap();
            }
            service.complete_session(&user, session_id).await.unwrap()
        }));
    }

    for handle in handles {
        let summary = handle.await.unwrap();
        assert_eq!(summary.score, 1.0);
    }
}
