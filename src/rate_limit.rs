/**
 * Submission Rate Limiter
 * One accepted contact submission per hour per network address or device id,
 * with the message inbox itself as the record of recent submissions
 */
use chrono::{Duration, Utc};
use sqlx::PgPool;

/// Window within which a second submission from the same tag is refused.
pub const SUBMISSION_WINDOW_MINUTES: i64 = 60;

/// Checks submission attempts against recently accepted messages.
///
/// A submission is refused when any accepted message inside the window
/// matches EITHER its network address OR its visitor id. Matching on either
/// tag closes both evasion paths (spoofed device id behind one IP, one
/// device hopping IPs) at the cost of occasional false positives behind a
/// shared NAT.
///
/// The lookup is a method on this type rather than inline SQL in the
/// handler so the storage strategy can be swapped (say, for an in-memory
/// sliding window) without touching callers.
pub struct SubmissionLimiter {
    window: Duration,
}

impl SubmissionLimiter {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    /// The production configuration: a 60-minute window.
    pub fn hourly() -> Self {
        Self::new(Duration::minutes(SUBMISSION_WINDOW_MINUTES))
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Whether an attempt tagged with `ip` / `visitor_id` must be refused.
    ///
    /// Missing tags never match: a NULL column compares false against any
    /// bound value, so an attempt with neither tag is always admitted.
    /// The check and the subsequent insert are separate statements; two
    /// duplicates landing in the same instant can both pass. Accepted.
    pub async fn is_blocked(
        &self,
        pool: &PgPool,
        ip: Option<&str>,
        visitor_id: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let cutoff = Utc::now() - self.window;

        let (blocked,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM messages
                WHERE created_at > $1
                  AND (ip = $2 OR visitor_id = $3)
            )
            "#,
        )
        .bind(cutoff)
        .bind(ip)
        .bind(visitor_id)
        .fetch_one(pool)
        .await?;

        Ok(blocked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hourly_window_is_sixty_minutes() {
        assert_eq!(SubmissionLimiter::hourly().window(), Duration::minutes(60));
    }

    #[test]
    fn test_window_is_configurable() {
        let limiter = SubmissionLimiter::new(Duration::minutes(5));
        assert_eq!(limiter.window(), Duration::minutes(5));
    }
}
