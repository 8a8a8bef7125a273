//! End-to-end scenarios against an on-disk planner.

mod scenarios;
