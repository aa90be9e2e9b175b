use std::cmp::Ordering;

use chrono::{Duration, NaiveDate};
use labtrack::models::{Task, TaskStatus};
use labtrack::priority::focus;
use labtrack::{compare_by_urgency, priority_rank, sort_by_urgency, FixedClock, Priority};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

fn task(id: u64, priority: Priority, due: Option<i64>, status: TaskStatus) -> Task {
    Task {
        id,
        name: format!("task {id}"),
        project: None,
        category: None,
        priority,
        due: due.map(|n| today() + Duration::days(n)),
        status,
        created_at: "2025-06-01T09:00:00+00:00".into(),
        completed_at: None,
    }
}

fn ids(tasks: &[Task]) -> Vec<u64> {
    tasks.iter().map(|t| t.id).collect()
}

#[test]
fn test_priority_rank() {
    assert_eq!(priority_rank("p1"), 0);
    assert_eq!(priority_rank("p2"), 1);
    assert_eq!(priority_rank("p3"), 2);
    assert_eq!(priority_rank("p4"), 3);
    assert_eq!(priority_rank(" P2 "), 1);
    assert_eq!(priority_rank("unknown"), priority_rank("p4"));
    assert_eq!(priority_rank(""), 3);
}

#[test]
fn test_unknown_priority_deserializes_as_p4() {
    let p: Priority = serde_json::from_str("\"urgent!!\"").unwrap();
    assert_eq!(p, Priority::P4);
    assert_eq!(serde_json::to_string(&Priority::P1).unwrap(), "\"p1\"");
}

#[test]
fn test_overdue_beats_priority() {
    let clock = FixedClock(today());
    let a = task(1, Priority::P1, None, TaskStatus::Todo);
    let b = task(2, Priority::P4, Some(-1), TaskStatus::Todo);
    assert_eq!(compare_by_urgency(&b, &a, &clock), Ordering::Less);
    assert_eq!(compare_by_urgency(&a, &b, &clock), Ordering::Greater);
}

#[test]
fn test_incomplete_before_done() {
    let clock = FixedClock(today());
    let a = task(1, Priority::P1, Some(0), TaskStatus::Done);
    let b = task(2, Priority::P4, Some(30), TaskStatus::Todo);
    assert_eq!(compare_by_urgency(&b, &a, &clock), Ordering::Less);
}

#[test]
fn test_due_today_counts_as_pressing() {
    let clock = FixedClock(today());
    let today_p4 = task(1, Priority::P4, Some(0), TaskStatus::Progress);
    let tomorrow_p1 = task(2, Priority::P1, Some(1), TaskStatus::Todo);
    assert_eq!(compare_by_urgency(&today_p4, &tomorrow_p1, &clock), Ordering::Less);
}

#[test]
fn test_priority_then_due_date_then_undated() {
    let clock = FixedClock(today());
    let mut tasks = vec![
        task(1, Priority::P2, None, TaskStatus::Todo),
        task(2, Priority::P2, Some(20), TaskStatus::Todo),
        task(3, Priority::P1, Some(40), TaskStatus::Todo),
        task(4, Priority::P2, Some(5), TaskStatus::Todo),
        task(5, Priority::P3, Some(1), TaskStatus::Todo),
    ];
    sort_by_urgency(&mut tasks, &clock);
    assert_eq!(ids(&tasks), vec![3, 4, 2, 1, 5]);
}

#[test]
fn test_full_ordering_scenario() {
    let clock = FixedClock(today());
    let mut tasks = vec![
        task(1, Priority::P1, Some(3), TaskStatus::Done),
        task(2, Priority::P3, Some(10), TaskStatus::Todo),
        task(3, Priority::P4, Some(-2), TaskStatus::Todo),
        task(4, Priority::P1, None, TaskStatus::Todo),
        task(5, Priority::P2, Some(0), TaskStatus::Progress),
    ];
    sort_by_urgency(&mut tasks, &clock);
    assert_eq!(ids(&tasks), vec![5, 3, 4, 2, 1]);
}

#[test]
fn test_sort_is_stable_and_idempotent() {
    let clock = FixedClock(today());
    let mut tasks = vec![
        task(1, Priority::P3, Some(7), TaskStatus::Todo),
        task(2, Priority::P1, Some(-1), TaskStatus::Todo),
        task(3, Priority::P3, Some(7), TaskStatus::Todo),
        task(4, Priority::P3, Some(7), TaskStatus::Todo),
        task(5, Priority::P2, None, TaskStatus::Done),
    ];
    sort_by_urgency(&mut tasks, &clock);
    let first = ids(&tasks);
    assert_eq!(first, vec![2, 1, 3, 4, 5]);
    sort_by_urgency(&mut tasks, &clock);
    assert_eq!(ids(&tasks), first);
}

#[test]
fn test_comparator_is_antisymmetric() {
    let clock = FixedClock(today());
    let tasks = vec![
        task(1, Priority::P1, Some(-5), TaskStatus::Todo),
        task(2, Priority::P1, Some(-5), TaskStatus::Todo),
        task(3, Priority::P4, None, TaskStatus::Done),
        task(4, Priority::P2, Some(3), TaskStatus::Progress),
        task(5, Priority::P3, None, TaskStatus::Todo),
    ];
    for a in &tasks {
        assert_eq!(compare_by_urgency(a, a, &clock), Ordering::Equal);
        for b in &tasks {
            assert_eq!(compare_by_urgency(a, b, &clock), compare_by_urgency(b, a, &clock).reverse());
        }
    }
}

#[test]
fn test_focus_takes_top_open_tasks() {
    let clock = FixedClock(today());
    let tasks = vec![
        task(1, Priority::P1, Some(-1), TaskStatus::Done),
        task(2, Priority::P4, Some(9), TaskStatus::Todo),
        task(3, Priority::P1, Some(9), TaskStatus::Todo),
        task(4, Priority::P3, Some(-4), TaskStatus::Todo),
    ];
    let top: Vec<u64> = focus(&tasks, 2, &clock).iter().map(|t| t.id).collect();
    assert_eq!(top, vec![4, 3]);
    assert_eq!(focus(&tasks, 10, &clock).len(), 3);
}
