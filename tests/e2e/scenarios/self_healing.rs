use crate::harness::{Assertion, Scenario};

#[test]
fn test_dangling_reference_is_repaired() {
    Scenario::new("dangling_reference")
        .with_strength_habits()
        .place("a", "Squats", 1, 2)
        .place("b", "Squats", 1, 3)
        .dangling_session("a")
        .reconcile()
        .assert(Assertion::LastPassCreated(0))
        .assert(Assertion::LastPassWrites(1))
        .assert_linked(&["a", "b"])
        .assert_settled()
        .run()
        .unwrap();
}

#[test]
fn test_dangling_reference_on_lone_block_is_cleared() {
    Scenario::new("dangling_lone")
        .with_strength_habits()
        .place("a", "Squats", 1, 2)
        .dangling_session("a")
        .reconcile()
        .assert_unlinked("a")
        .assert_sessions(0)
        .run()
        .unwrap();
}

#[test]
fn test_half_assigned_session_is_completed() {
    Scenario::new("half_assigned")
        .with_strength_habits()
        .place("a", "Squats", 3, 7)
        .place("b", "Squats", 3, 8)
        .place("c", "Squats", 3, 9)
        .detach_block("c")
        .reconcile()
        .assert(Assertion::LastPassWrites(1))
        .assert_linked(&["a", "b", "c"])
        .assert_sessions(1)
        .run()
        .unwrap();
}

#[test]
fn test_orphan_session_is_deleted() {
    Scenario::new("orphan_session")
        .with_strength_habits()
        .place("a", "Squats", 0, 2)
        .place("b", "Squats", 0, 3)
        .orphan_session()
        .assert_sessions(2)
        .reconcile()
        .assert(Assertion::LastPassDeleted(1))
        .assert(Assertion::SessionNumbers(vec![1]))
        .assert_settled()
        .run()
        .unwrap();
}

#[test]
fn test_damage_survives_crash_and_heals_on_next_pass() {
    Scenario::new("crash_then_heal")
        .with_strength_habits()
        .place("a", "Squats", 6, 0)
        .place("b", "Squats", 6, 1)
        .detach_block("b")
        .orphan_session()
        .crash()
        .restart()
        .assert_sessions(2)
        .reconcile()
        .assert_linked(&["a", "b"])
        .assert(Assertion::SessionNumbers(vec![1]))
        .assert_settled()
        .run()
        .unwrap();
}
