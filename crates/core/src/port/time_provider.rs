// Clock Port (Interface)

/// Clock behind every job timestamp.
///
/// All `created_at` / `completed_at` fields and the renderer's generated-at
/// input are epoch milliseconds read through this trait, never from the
/// system clock directly; fixing the clock in tests makes artifact names and
/// terminal timestamps reproducible.
pub trait TimeProvider: Send + Sync {
    /// Milliseconds since the Unix epoch, UTC.
    fn now_millis(&self) -> i64;
}

/// Wall-clock provider (production)
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}
