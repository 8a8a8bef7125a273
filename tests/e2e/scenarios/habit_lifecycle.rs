use crate::harness::{Assertion, Scenario};
use planner_core::GroupType;

#[test]
fn test_custom_group_never_links() {
    Scenario::new("custom_group")
        .with_strength_habits()
        .create_group("Fitness", "Evening", GroupType::Custom)
        .join_group("Reading", "Evening")
        .place("a", "Reading", 0, 14)
        .place("b", "Reading", 0, 15)
        .assert_sessions(0)
        .assert_unlinked("a")
        .run()
        .unwrap();
}

#[test]
fn test_leaving_group_breaks_session() {
    Scenario::new("leave_group")
        .with_strength_habits()
        .place("a", "Squats", 0, 2)
        .place("b", "Lunges", 0, 3)
        .assert_sessions(1)
        .leave_group("Lunges")
        .assert_sessions(0)
        .assert_unlinked("a")
        .join_group("Lunges", "Legs")
        .assert_linked(&["a", "b"])
        .run()
        .unwrap();
}

#[test]
fn test_deleting_group_breaks_session() {
    Scenario::new("delete_group")
        .with_strength_habits()
        .place("a", "Squats", 4, 2)
        .place("b", "Lunges", 4, 3)
        .delete_group("Legs")
        .assert(Assertion::LastPassDeleted(1))
        .assert_sessions(0)
        .run()
        .unwrap();
}

#[test]
fn test_deleting_habit_leaves_plain_blocks() {
    Scenario::new("delete_habit")
        .with_strength_habits()
        .place("a", "Squats", 0, 2)
        .place("b", "Squats", 0, 3)
        .toggle("a")
        .assert(Assertion::HabitDone {
            habit: "Squats".into(),
            count: 1,
        })
        .delete_habit("Squats")
        .assert(Assertion::PlainBlock("a".into()))
        .assert(Assertion::BlockCompleted {
            block: "a".into(),
            completed: false,
        })
        .assert_unlinked("a")
        .assert_unlinked("b")
        .assert_sessions(0)
        .run()
        .unwrap();
}

#[test]
fn test_toggle_counts_and_reset_clears() {
    Scenario::new("toggle_and_reset")
        .with_strength_habits()
        .place("a", "Squats", 0, 2)
        .place("b", "Squats", 1, 5)
        .toggle("a")
        .toggle("b")
        .assert(Assertion::HabitDone {
            habit: "Squats".into(),
            count: 2,
        })
        .toggle("b")
        .assert(Assertion::HabitDone {
            habit: "Squats".into(),
            count: 1,
        })
        .assert(Assertion::Custom(Box::new(|planner| {
            let summary = planner.week_summary()?;
            anyhow::ensure!(
                (summary.scheduled, summary.completed, summary.percent) == (2, 1, 50),
                "unexpected weekly progress {:?}",
                summary
            );
            Ok(())
        })))
        .reset_week()
        .assert(Assertion::HabitDone {
            habit: "Squats".into(),
            count: 0,
        })
        .assert(Assertion::BlockCompleted {
            block: "a".into(),
            completed: false,
        })
        .run()
        .unwrap();
}

#[test]
fn test_plain_block_cannot_be_toggled() {
    Scenario::new("toggle_plain")
        .add_block("note", "Call mom")
        .toggle("note")
        .run()
        .expect_failure("is not a habit block");
}

#[test]
fn test_plain_blocks_never_link() {
    Scenario::new("plain_blocks")
        .with_strength_habits()
        .add_block("p", "Stretch")
        .place("a", "Squats", 0, 2)
        .move_block("p", 0, 3)
        .assert_sessions(0)
        .assert_unlinked("a")
        .run()
        .unwrap();
}
