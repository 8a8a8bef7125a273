use crate::harness::{Assertion, Scenario};
use planner_core::AccentColor;

#[test]
fn test_sessions_survive_restart() {
    Scenario::new("restart")
        .with_strength_habits()
        .place("a", "Squats", 0, 2)
        .place("b", "Squats", 0, 3)
        .rename_session(1, Some("Legs"))
        .crash()
        .restart()
        .assert_linked(&["a", "b"])
        .assert(Assertion::SessionName {
            number: 1,
            name: "Legs".into(),
        })
        .assert_colors(&[AccentColor::Blue])
        .assert(Assertion::Stable)
        .run()
        .unwrap();
}

#[test]
fn test_open_planner_holds_lock() {
    Scenario::new("lock")
        .assert(Assertion::LockHeld)
        .crash()
        .restart()
        .assert(Assertion::LockHeld)
        .run()
        .unwrap();
}

#[test]
fn test_vertical_only_fixture_ignores_neighbor_days() {
    Scenario::new("vertical_only")
        .from_fixture("vertical_only")
        .with_strength_habits()
        .place("mon", "Squats", 0, 8)
        .place("tue", "Squats", 1, 8)
        .assert_sessions(0)
        .place("mon2", "Squats", 0, 9)
        .assert_linked(&["mon", "mon2"])
        .assert_unlinked("tue")
        .assert(Assertion::Custom(Box::new(|planner| {
            anyhow::ensure!(
                planner.user().to_string() == "fixture",
                "fixture user not loaded"
            );
            Ok(())
        })))
        .run()
        .unwrap();
}
