// Readiness/progress aggregation: the per-user snapshot, the derived
// readiness score and task list, badges, streaks, and the write outbox.
// All persistence goes through the `store` boundary.

pub mod aggregator;
pub mod badges;
pub mod handlers;
pub mod outbox;
pub mod readiness;
pub mod streak;
pub mod tasks;
