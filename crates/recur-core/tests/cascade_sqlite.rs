//! End-to-end cascade flow against the real SQLite store: register a
//! ladder, complete its first review late, and verify the cascade in the
//! persisted state.

use chrono::{Duration, TimeZone, Utc};
use rand::{SeedableRng, rngs::StdRng};
use recur_core::db::SqliteStore;
use recur_core::model::{NewReview, ReviewStatus};
use recur_core::schedule::{IntervalTable, Scheduler, cascade, due};
use recur_core::store::ReviewStore;

fn seeded_store() -> SqliteStore {
    let store = SqliteStore::open_in_memory().expect("open in-memory store");
    store
        .get_or_create_problem("215", Some("Kth Largest Element"), None)
        .expect("create problem");
    store
}

#[test]
fn generated_ladder_cascades_after_a_late_first_review() {
    let store = seeded_store();
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    let chain_id = "215-1704110400";

    let table = IntervalTable::new(vec![1, 7, 18, 35], 0.15, 1, 365).expect("valid table");
    let scheduler = Scheduler::new(table);
    let mut rng = StdRng::seed_from_u64(3);
    let schedule = scheduler
        .schedule(start, 4, false, &mut rng)
        .expect("schedule");

    for (index, scheduled_at) in schedule.iter().enumerate() {
        store
            .insert(&NewReview {
                problem_id: "215".to_string(),
                chain_id: chain_id.to_string(),
                iteration: u32::try_from(index).expect("small index") + 1,
                scheduled_at: *scheduled_at,
            })
            .expect("insert review");
    }

    // Complete the first review 3 days late.
    let first = store
        .earliest_pending_for_problem("215")
        .expect("query earliest")
        .expect("first review exists");
    assert_eq!(first.iteration, 1);

    let late = first.scheduled_at + Duration::days(3);
    let outcome = cascade::complete_and_cascade(&store, first, late).expect("cascade");
    assert_eq!(outcome.delay_days, 3);
    assert_eq!(outcome.updated_count, 3);

    // Every remaining pending review moved forward by exactly 3 days.
    let remaining = store
        .find_pending_future_in_chain(chain_id, 1)
        .expect("query future");
    assert_eq!(remaining.len(), 3);
    for (review, original) in remaining.iter().zip(&schedule[1..]) {
        assert_eq!(review.scheduled_at, *original + Duration::days(3));
    }

    // The completed review froze its schedule and completion instant.
    let done = store
        .find_by_chain_and_status(chain_id, ReviewStatus::Completed)
        .expect("query completed");
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].scheduled_at, schedule[0]);
    assert_eq!(done[0].completed_at, Some(late));

    // Chain statistics reflect the single late completion.
    let stats = cascade::chain_statistics(&store, chain_id).expect("stats");
    assert_eq!(stats.total_reviews, 4);
    assert_eq!(stats.completed_reviews, 1);
    assert_eq!(stats.pending_reviews, 3);
    assert_eq!(stats.total_delay_days, 3);
    assert_eq!(stats.max_delay_days, 3);
    assert_eq!(stats.reviews_with_delay, 1);
}

#[test]
fn preview_against_sqlite_matches_apply() {
    let store = seeded_store();
    let start = Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap();
    let chain_id = "215-1711962000";

    for (iteration, days) in [(1_u32, 0_i64), (2, 7), (3, 18)] {
        store
            .insert(&NewReview {
                problem_id: "215".to_string(),
                chain_id: chain_id.to_string(),
                iteration,
                scheduled_at: start + Duration::days(days),
            })
            .expect("insert review");
    }

    let first = store
        .earliest_pending_for_problem("215")
        .expect("query earliest")
        .expect("first review exists");
    let late = start + Duration::days(5);

    let completed = first.complete(late).expect("complete");
    let shifts = cascade::preview(&store, &completed, Some(late)).expect("preview");
    assert_eq!(shifts.len(), 2);

    store.save(&completed).expect("save completed");
    let updated = cascade::apply(&store, &completed, Some(late)).expect("apply");
    assert_eq!(updated, shifts.len());

    let remaining = store
        .find_pending_future_in_chain(chain_id, 1)
        .expect("query future");
    for (review, shift) in remaining.iter().zip(&shifts) {
        assert_eq!(review.id, shift.review_id);
        assert_eq!(review.scheduled_at, shift.new_date);
        assert_eq!(shift.delay_days, 5);
    }
}

#[test]
fn due_selection_includes_overdue_and_today_only() {
    let store = seeded_store();
    let now = Utc::now();

    for (iteration, days) in [(1_u32, -3_i64), (2, 0), (3, 30)] {
        store
            .insert(&NewReview {
                problem_id: "215".to_string(),
                chain_id: "215-due".to_string(),
                iteration,
                scheduled_at: now + Duration::days(days),
            })
            .expect("insert review");
    }

    let due = due::due_as_of(&store, now).expect("due query");
    let iterations: Vec<u32> = due.iter().map(|r| r.iteration).collect();
    assert_eq!(iterations, vec![1, 2]);
}
