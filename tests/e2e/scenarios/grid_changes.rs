use crate::harness::{Assertion, Scenario};
use planner_core::{GridPos, Granularity};

#[test]
fn test_switch_to_buckets_moves_late_blocks_to_tray() {
    Scenario::new("hourly_to_buckets")
        .with_strength_habits()
        .place("early", "Squats", 0, 0)
        .place("next", "Squats", 0, 1)
        .place("late1", "Lunges", 2, 10)
        .place("late2", "Lunges", 2, 11)
        .assert_sessions(2)
        .set_granularity(Granularity::Buckets)
        .assert(Assertion::InTray("late1".into()))
        .assert(Assertion::InTray("late2".into()))
        .assert(Assertion::BlockAt {
            block: "early".into(),
            pos: GridPos::new(0, 0),
        })
        .assert_linked(&["early", "next"])
        .assert_unlinked("late1")
        .assert(Assertion::LastPassDeleted(1))
        .assert_sessions(1)
        .assert_settled()
        .run()
        .unwrap();
}

#[test]
fn test_removing_bucket_unlinks_stranded_blocks() {
    Scenario::new("remove_bucket")
        .from_fixture("buckets")
        .with_strength_habits()
        .place("a", "Squats", 0, 1)
        .place("b", "Squats", 0, 2)
        .assert_linked(&["a", "b"])
        .remove_bucket(2)
        .assert(Assertion::InTray("b".into()))
        .assert_unlinked("a")
        .assert_sessions(0)
        .run()
        .unwrap();
}

#[test]
fn test_placing_outside_grid_fails() {
    Scenario::new("out_of_range")
        .from_fixture("buckets")
        .with_strength_habits()
        .place("a", "Squats", 0, 3)
        .run()
        .expect_failure("is outside the grid (7 days x 3 slots)");
}
