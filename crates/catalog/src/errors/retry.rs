/// Classification for how a refresh reacts to a failed upstream call.
///
/// Used by the catalog store to decide whether a category failure should
/// count against that category's circuit breaker.
///
/// # Behavior Summary
///
/// | Class | Skip category this refresh? | Record Circuit Breaker Failure? |
/// |-------|-----------------------------|--------------------------------|
/// | `Never` | n/a (caller error) | No |
/// | `WithPenalty` | Yes | Yes (affects future refreshes) |
/// | `NextRefresh` | Yes | No |
/// | `CircuitOpen` | Yes (already skipped) | No (already recorded) |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Never retry - the request itself is invalid.
    Never,

    /// Skip the category and record a circuit breaker penalty.
    ///
    /// Used for transport-level trouble: timeouts, rate limiting, network
    /// failures and server errors. After enough consecutive penalties the
    /// category is excluded from refreshes until its circuit recovers.
    WithPenalty,

    /// Skip the category without any penalty.
    ///
    /// The upstream answered but the payload was unusable. The next refresh
    /// simply tries again.
    NextRefresh,

    /// Circuit breaker is open for this category.
    CircuitOpen,
}
