mod grid_changes;
mod habit_lifecycle;
mod persistence;
mod self_healing;
