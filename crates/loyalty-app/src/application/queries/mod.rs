mod check_in_history_queries;
mod user_queries;

pub use check_in_history_queries::CheckInHistoryQueryService;
pub use user_queries::UserQueryService;

/// Clamp an optional page size into `1..=max`, falling back to `default`
pub(crate) fn clamp_limit(limit: Option<u32>, default: u32, max: u32) -> u32 {
    limit.unwrap_or(default).clamp(1, max)
}
