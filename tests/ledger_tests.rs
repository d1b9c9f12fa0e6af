// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity ledger and scoring over the sample datasets.

mod common;

use chrono::{Duration, Utc};
use common::{file_ledger, test_ledger, BEAUSEJOUR, CENTRE_NATURE, LAVAL, REPENTIGNY, RIMOUSKI, SANGUINET};
use points_air::db::{collections, FileStore, RecordStore};
use points_air::error::AppError;
use points_air::models::{ActivityKind, ActivityRecord, ActivityUpsert, UserUpsert};
use std::collections::BTreeSet;
use std::fs;
use uuid::Uuid;

fn site(id: &str) -> Uuid {
    Uuid::parse_str(id).unwrap()
}

fn activity(user_id: Uuid, site_id: Uuid, kinds: &[ActivityKind]) -> ActivityUpsert {
    ActivityUpsert {
        id: None,
        user_id,
        activities: kinds.iter().copied().collect(),
        timestamp: None,
        confirmed: None,
        site_id,
    }
}

#[test]
fn test_scores_start_at_zero() {
    let ledger = test_ledger();
    let scores = ledger.compute_scores().unwrap();
    assert_eq!(scores.len(), 4);
    assert!(scores.values().all(|&s| s == 0));
}

#[test]
fn test_two_records_score_two() {
    let ledger = test_ledger();
    let user = Uuid::new_v4();

    ledger
        .upsert_activity(activity(user, site(SANGUINET), &[ActivityKind::Walk]))
        .unwrap();
    let scores = ledger.compute_scores().unwrap();
    assert_eq!(scores[REPENTIGNY], 1);
    assert_eq!(scores[LAVAL], 0);

    ledger
        .upsert_activity(activity(user, site(SANGUINET), &[ActivityKind::Run]))
        .unwrap();
    let scores = ledger.compute_scores().unwrap();
    assert_eq!(scores[REPENTIGNY], 2);
    assert_eq!(scores[LAVAL], 0);
    assert_eq!(scores[RIMOUSKI], 0);
}

#[test]
fn test_several_activities_count_once() {
    let ledger = test_ledger();
    ledger
        .upsert_activity(activity(
            Uuid::new_v4(),
            site(CENTRE_NATURE),
            &[ActivityKind::Walk, ActivityKind::Run, ActivityKind::Bike],
        ))
        .unwrap();
    assert_eq!(ledger.compute_scores().unwrap()[LAVAL], 1);
}

#[test]
fn test_unknown_site_rejected() {
    let ledger = test_ledger();
    let unknown = Uuid::new_v4();
    let result = ledger.upsert_activity(activity(Uuid::new_v4(), unknown, &[ActivityKind::Walk]));
    assert!(matches!(result, Err(AppError::UnknownSite(id)) if id == unknown));
    assert!(ledger.compute_scores().unwrap().values().all(|&s| s == 0));
}

#[test]
fn test_upsert_same_id_replaces() {
    let ledger = test_ledger();
    let user = Uuid::new_v4();
    let first = ledger
        .upsert_activity(activity(user, site(SANGUINET), &[ActivityKind::Walk]))
        .unwrap();

    // Move the record to Rimouski
    let moved = ledger
        .upsert_activity(ActivityUpsert {
            id: Some(first.id),
            ..activity(user, site(BEAUSEJOUR), &[ActivityKind::Walk])
        })
        .unwrap();
    assert_eq!(moved.id, first.id);
    assert_eq!(moved.timestamp, first.timestamp);

    let scores = ledger.compute_scores().unwrap();
    assert_eq!(scores[REPENTIGNY], 0);
    assert_eq!(scores[RIMOUSKI], 1);
}

#[test]
fn test_confirmation_is_one_way() {
    let ledger = test_ledger();
    let user = Uuid::new_v4();
    let record = ledger
        .upsert_activity(activity(user, site(SANGUINET), &[ActivityKind::Bike]))
        .unwrap();
    assert!(!record.confirmed);

    let confirmed = ledger.confirm_activity(record.id).unwrap().unwrap();
    assert!(confirmed.confirmed);

    let updated = ledger
        .upsert_activity(ActivityUpsert {
            id: Some(record.id),
            confirmed: Some(false),
            ..activity(user, site(SANGUINET), &[ActivityKind::Bike])
        })
        .unwrap();
    assert!(updated.confirmed);

    assert!(ledger.confirm_activity(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn test_activities_by_user_newest_first() {
    let ledger = test_ledger();
    let user = Uuid::new_v4();
    let now = Utc::now();

    for days in [3, 1, 2] {
        ledger
            .upsert_activity(ActivityUpsert {
                timestamp: Some(now - Duration::days(days)),
                ..activity(user, site(SANGUINET), &[ActivityKind::Walk])
            })
            .unwrap();
    }
    ledger
        .upsert_activity(activity(Uuid::new_v4(), site(SANGUINET), &[ActivityKind::Walk]))
        .unwrap();

    let records = ledger.activities_by_user(user).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].timestamp, now - Duration::days(1));
    assert_eq!(records[2].timestamp, now - Duration::days(3));
}

#[test]
fn test_user_upsert_keeps_created_at() {
    let ledger = test_ledger();
    let user = ledger
        .upsert_user(UserUpsert {
            id: None,
            short_name: "dhdaines".to_string(),
            full_name: None,
            activities: BTreeSet::from([ActivityKind::Run]),
        })
        .unwrap();

    let again = ledger
        .upsert_user(UserUpsert {
            id: Some(user.id),
            short_name: "dhd".to_string(),
            full_name: Some("David".to_string()),
            activities: BTreeSet::new(),
        })
        .unwrap();
    assert_eq!(again.created_at, user.created_at);
    assert!(again.last_active >= user.last_active);
    assert_eq!(ledger.user(user.id).unwrap().unwrap().short_name, "dhd");
}

#[test]
fn test_leaderboard_order() {
    let ledger = test_ledger();
    let user = Uuid::new_v4();
    for _ in 0..2 {
        ledger
            .upsert_activity(activity(user, site(BEAUSEJOUR), &[ActivityKind::Run]))
            .unwrap();
    }
    ledger
        .upsert_activity(activity(user, site(SANGUINET), &[ActivityKind::Run]))
        .unwrap();

    let board = ledger.leaderboard().unwrap();
    let order: Vec<(&str, u32)> = board
        .iter()
        .map(|s| (s.municipality.as_str(), s.score))
        .collect();
    assert_eq!(
        order,
        vec![
            (RIMOUSKI, 2),
            (REPENTIGNY, 1),
            (LAVAL, 0),
            ("ville-de-sainte-adele", 0),
        ]
    );
}

#[test]
fn test_concurrent_distinct_records_all_counted() {
    let ledger = test_ledger();
    let threads = 8;
    let per_thread = 10;

    std::thread::scope(|scope| {
        for _ in 0..threads {
            let ledger = ledger.clone();
            scope.spawn(move || {
                let user = Uuid::new_v4();
                for _ in 0..per_thread {
                    ledger
                        .upsert_activity(activity(user, site(SANGUINET), &[ActivityKind::Walk]))
                        .unwrap();
                }
            });
        }
    });

    assert_eq!(ledger.compute_scores().unwrap()[REPENTIGNY], threads * per_thread);
}

#[test]
fn test_concurrent_same_record_counts_once() {
    let ledger = test_ledger();
    let id = Uuid::new_v4();
    let user = Uuid::new_v4();

    std::thread::scope(|scope| {
        for kind in [ActivityKind::Walk, ActivityKind::Run, ActivityKind::Bike] {
            let ledger = ledger.clone();
            scope.spawn(move || {
                for _ in 0..10 {
                    ledger
                        .upsert_activity(ActivityUpsert {
                            id: Some(id),
                            ..activity(user, site(SANGUINET), &[kind])
                        })
                        .unwrap();
                }
            });
        }
    });

    assert_eq!(ledger.compute_scores().unwrap()[REPENTIGNY], 1);
    assert_eq!(ledger.activities_by_user(user).unwrap().len(), 1);
}

#[test]
fn test_concurrent_distinct_records_on_disk() {
    let (ledger, dir) = file_ledger();
    let threads = 6;
    let per_thread = 8;

    std::thread::scope(|scope| {
        for _ in 0..threads {
            let ledger = ledger.clone();
            scope.spawn(move || {
                let user = Uuid::new_v4();
                for _ in 0..per_thread {
                    ledger
                        .upsert_activity(activity(user, site(SANGUINET), &[ActivityKind::Run]))
                        .unwrap();
                }
            });
        }
    });

    assert_eq!(ledger.compute_scores().unwrap()[REPENTIGNY], threads * per_thread);
    let files = fs::read_dir(dir.join(collections::ACTIVITIES)).unwrap().count();
    assert_eq!(files as u32, threads * per_thread);

    fs::remove_dir_all(dir).ok();
}

#[test]
fn test_concurrent_same_record_on_disk() {
    let (ledger, dir) = file_ledger();
    let id = Uuid::new_v4();
    let user = Uuid::new_v4();

    std::thread::scope(|scope| {
        for kind in [ActivityKind::Walk, ActivityKind::Run, ActivityKind::Bike] {
            let ledger = ledger.clone();
            scope.spawn(move || {
                for _ in 0..10 {
                    ledger
                        .upsert_activity(ActivityUpsert {
                            id: Some(id),
                            ..activity(user, site(SANGUINET), &[kind])
                        })
                        .unwrap();
                }
            });
        }
    });

    // One committed file, no temp files left behind
    let names: Vec<String> = fs::read_dir(dir.join(collections::ACTIVITIES))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec![format!("{}.json", id)]);

    // Readable through a freshly opened store
    let store = FileStore::<ActivityRecord>::open(dir.join(collections::ACTIVITIES)).unwrap();
    let record = store.get(id).unwrap().expect("record survives");
    assert_eq!(record.user_id, user);
    assert_eq!(record.activities.len(), 1);
    assert_eq!(ledger.activities_by_user(user).unwrap().len(), 1);
    assert_eq!(ledger.compute_scores().unwrap()[REPENTIGNY], 1);

    fs::remove_dir_all(dir).ok();
}
