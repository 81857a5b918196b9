//! Per-category circuit breaker.
//!
//! A category whose upstream keeps timing out or erroring is excluded from
//! refreshes for a while, so one dead endpoint does not add a full timeout to
//! every refresh. The circuit has three states:
//!
//! - **Closed**: Normal operation, the category is fetched.
//! - **Open**: The category is failing and is skipped.
//! - **HalfOpen**: The recovery timeout elapsed; the next refresh probes it.
//!
//! State is in-memory and resets on restart.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

/// Default number of consecutive failures before opening the circuit.
const DEFAULT_FAILURE_THRESHOLD: u32 = 3;

/// Default time to wait before probing an open circuit.
const DEFAULT_RECOVERY_TIMEOUT: Duration = Duration::from_secs(300);

/// Circuit breaker state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "Closed"),
            Self::Open => write!(f, "Open"),
            Self::HalfOpen => write!(f, "HalfOpen"),
        }
    }
}

#[derive(Debug)]
struct Circuit {
    state: CircuitState,
    failure_count: u32,
    opened_at: Option<Instant>,
}

impl Circuit {
    fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            failure_count: 0,
            opened_at: None,
        }
    }
}

/// Circuit breaker configuration.
#[derive(Clone, Debug)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before opening the circuit.
    pub failure_threshold: u32,
    /// Time an open circuit waits before a probe is allowed.
    pub recovery_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            recovery_timeout: DEFAULT_RECOVERY_TIMEOUT,
        }
    }
}

/// Thread-safe breaker keyed by an arbitrary string (`<league>/<category>`).
pub struct CircuitBreaker {
    circuits: Mutex<HashMap<String, Circuit>>,
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    pub fn with_config(config: CircuitBreakerConfig) -> Self {
        Self {
            circuits: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Lock the circuits map, recovering from poison if necessary.
    fn lock_circuits(&self) -> MutexGuard<'_, HashMap<String, Circuit>> {
        self.circuits.lock().unwrap_or_else(|poisoned| {
            warn!("Circuit breaker mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Whether `key` may be fetched now. Moves Open -> HalfOpen once the
    /// recovery timeout has elapsed.
    pub fn is_allowed(&self, key: &str) -> bool {
        let mut circuits = self.lock_circuits();
        let circuit = circuits.entry(key.to_string()).or_insert_with(Circuit::new);

        match circuit.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let recovered = circuit
                    .opened_at
                    .map(|at| at.elapsed() >= self.config.recovery_timeout)
                    .unwrap_or(true);
                if recovered {
                    info!("Circuit breaker: probing '{}' (Open -> HalfOpen)", key);
                    circuit.state = CircuitState::HalfOpen;
                }
                recovered
            }
        }
    }

    pub fn record_success(&self, key: &str) {
        let mut circuits = self.lock_circuits();
        let circuit = circuits.entry(key.to_string()).or_insert_with(Circuit::new);

        if circuit.state != CircuitState::Closed {
            info!("Circuit breaker: closing circuit for '{}'", key);
        }
        circuit.state = CircuitState::Closed;
        circuit.failure_count = 0;
        circuit.opened_at = None;
    }

    pub fn record_failure(&self, key: &str) {
        let mut circuits = self.lock_circuits();
        let circuit = circuits.entry(key.to_string()).or_insert_with(Circuit::new);

        circuit.failure_count += 1;
        match circuit.state {
            CircuitState::HalfOpen => {
                warn!("Circuit breaker: probe failed for '{}', reopening", key);
                circuit.state = CircuitState::Open;
                circuit.opened_at = Some(Instant::now());
            }
            CircuitState::Closed if circuit.failure_count >= self.config.failure_threshold => {
                warn!(
                    "Circuit breaker: opening circuit for '{}' after {} failures",
                    key, circuit.failure_count
                );
                circuit.state = CircuitState::Open;
                circuit.opened_at = Some(Instant::now());
            }
            _ => {
                debug!(
                    "Circuit breaker: failure {}/{} for '{}'",
                    circuit.failure_count, self.config.failure_threshold, key
                );
            }
        }
    }

    pub fn state(&self, key: &str) -> CircuitState {
        self.lock_circuits()
            .get(key)
            .map(|c| c.state)
            .unwrap_or(CircuitState::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker(threshold: u32, recovery: Duration) -> CircuitBreaker {
        CircuitBreaker::with_config(CircuitBreakerConfig {
            failure_threshold: threshold,
            recovery_timeout: recovery,
        })
    }

    #[test]
    fn test_new_key_is_closed() {
        let cb = CircuitBreaker::with_config(CircuitBreakerConfig::default());
        assert!(cb.is_allowed("Standard/Oil"));
        assert_eq!(cb.state("Standard/Oil"), CircuitState::Closed);
    }

    #[test]
    fn test_opens_after_threshold() {
        let cb = breaker(2, Duration::from_secs(60));
        cb.record_failure("Standard/Oil");
        assert!(cb.is_allowed("Standard/Oil"));
        cb.record_failure("Standard/Oil");
        assert_eq!(cb.state("Standard/Oil"), CircuitState::Open);
        assert!(!cb.is_allowed("Standard/Oil"));
    }

    #[test]
    fn test_success_resets_failures() {
        let cb = breaker(2, Duration::from_secs(60));
        cb.record_failure("Standard/Oil");
        cb.record_success("Standard/Oil");
        cb.record_failure("Standard/Oil");
        assert_eq!(cb.state("Standard/Oil"), CircuitState::Closed);
    }

    #[test]
    fn test_half_open_probe_then_close() {
        let cb = breaker(1, Duration::ZERO);
        cb.record_failure("Standard/Oil");
        assert_eq!(cb.state("Standard/Oil"), CircuitState::Open);

        assert!(cb.is_allowed("Standard/Oil"));
        assert_eq!(cb.state("Standard/Oil"), CircuitState::HalfOpen);

        cb.record_success("Standard/Oil");
        assert_eq!(cb.state("Standard/Oil"), CircuitState::Closed);
    }

    #[test]
    fn test_half_open_failure_reopens() {
        let cb = breaker(1, Duration::ZERO);
        cb.record_failure("Standard/Oil");
        assert!(cb.is_allowed("Standard/Oil"));
        cb.record_failure("Standard/Oil");
        assert_eq!(cb.state("Standard/Oil"), CircuitState::Open);
    }

    #[test]
    fn test_keys_are_isolated() {
        let cb = breaker(1, Duration::from_secs(60));
        cb.record_failure("Standard/Oil");
        assert!(!cb.is_allowed("Standard/Oil"));
        assert!(cb.is_allowed("Standard/Scarab"));
        assert!(cb.is_allowed("Hardcore/Oil"));
    }
}
