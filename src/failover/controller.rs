//! Failover controller.
//!
//! # Responsibilities
//! - Periodically probe the active endpoint
//! - Count consecutive failures
//! - Verify the candidate before switching the active endpoint
//!
//! # State Transitions
//! ```text
//! healthy probe                       → failures = 0
//! unhealthy probe                     → failures += 1
//! failures > threshold, candidate up  → active = candidate, failures = 0
//! failures > threshold, candidate down→ critical log, failures = 0
//! ```
//!
//! Resetting the counter after an aborted failover gives a cooldown of
//! `threshold + 1` further failures before the next attempt.

use std::sync::Arc;
use std::time::Duration;
use tokio::time;

use crate::cluster::{ClusterRegistry, EndpointId};
use crate::config::MonitorConfig;
use crate::failover::state::FailoverState;
use crate::health::{HealthVerdict, Prober};
use crate::lifecycle::ShutdownListener;
use crate::observability::metrics;

/// Timing and threshold parameters for the monitor loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    /// Time between health checks.
    pub interval: Duration,
    /// Failover is attempted once consecutive failures exceed this.
    pub failure_threshold: u32,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self::from(&MonitorConfig::default())
    }
}

impl From<&MonitorConfig> for MonitorSettings {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.interval_secs),
            failure_threshold: config.failure_threshold,
        }
    }
}

/// What a single monitoring tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Active endpoint answered; counter reset.
    Healthy,
    /// Active endpoint failed; threshold not yet exceeded.
    Failed { failures: u32 },
    /// Candidate verified and promoted.
    SwitchedOver { from: EndpointId, to: EndpointId },
    /// Candidate also failed; active endpoint kept.
    AllEndpointsDown { active: EndpointId, candidate: EndpointId },
}

/// Owns the decision loop; the only writer of `FailoverState`.
pub struct FailoverController<P> {
    registry: Arc<ClusterRegistry>,
    state: Arc<FailoverState>,
    prober: P,
    settings: MonitorSettings,
}

impl<P: Prober> FailoverController<P> {
    pub fn new(
        registry: Arc<ClusterRegistry>,
        state: Arc<FailoverState>,
        prober: P,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            registry,
            state,
            prober,
            settings,
        }
    }

    pub fn state(&self) -> &Arc<FailoverState> {
        &self.state
    }

    pub fn settings(&self) -> MonitorSettings {
        self.settings
    }

    /// Run until a shutdown signal arrives.
    ///
    /// Every check is preceded by a full interval of sleep; a slow probe
    /// lengthens the cycle. An in-flight probe is dropped on shutdown.
    pub async fn run(self, mut shutdown: ShutdownListener) {
        let active = self.state.active();
        tracing::info!(
            active = %active.id(),
            connection_url = %active.connection_url(),
            interval_ms = self.settings.interval.as_millis() as u64,
            failure_threshold = self.settings.failure_threshold,
            "Failover monitor starting"
        );
        metrics::record_active_endpoint(&self.registry, active.id());

        let interval = self.settings.interval;
        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::info!("Failover monitor received shutdown signal, exiting loop");
                    break;
                }
                _ = async {
                    time::sleep(interval).await;
                    self.tick().await
                } => {}
            }
        }
    }

    /// Probe the active endpoint once and apply the failover policy.
    pub async fn tick(&self) -> TickOutcome {
        let active = self.state.active();
        let endpoint = active.endpoint();
        tracing::info!(
            endpoint = %endpoint.id(),
            url = %endpoint.health_url(),
            "Checking active endpoint"
        );

        let verdict = self.prober.probe(endpoint.health_url()).await;
        metrics::record_probe(endpoint.id(), verdict);

        if verdict.is_healthy() {
            self.state.reset_failures();
            metrics::record_consecutive_failures(0);
            return TickOutcome::Healthy;
        }

        let failures = self.state.record_failure();
        metrics::record_consecutive_failures(failures);
        tracing::warn!(
            endpoint = %endpoint.id(),
            failures,
            "Active endpoint health check failed"
        );

        if failures <= self.settings.failure_threshold {
            return TickOutcome::Failed { failures };
        }

        self.attempt_failover(endpoint.id()).await
    }

    async fn attempt_failover(&self, active: &EndpointId) -> TickOutcome {
        tracing::error!(endpoint = %active, "Active endpoint considered down, attempting failover");

        let Some(candidate) = self.registry.candidate_for(active) else {
            // Unreachable with a validated registry (>= 2 endpoints, active is a member).
            tracing::error!(endpoint = %active, "No failover candidate configured");
            self.state.reset_failures();
            metrics::record_consecutive_failures(0);
            return TickOutcome::AllEndpointsDown {
                active: active.clone(),
                candidate: active.clone(),
            };
        };

        let verdict = self.prober.probe(candidate.health_url()).await;
        metrics::record_probe(candidate.id(), verdict);

        let outcome = match verdict {
            HealthVerdict::Healthy => {
                self.state.promote(candidate.clone());
                tracing::warn!(
                    from = %active,
                    to = %candidate.id(),
                    connection_url = %candidate.connection_url(),
                    "Switched active endpoint"
                );
                metrics::record_active_endpoint(&self.registry, candidate.id());
                TickOutcome::SwitchedOver {
                    from: active.clone(),
                    to: candidate.id().clone(),
                }
            }
            HealthVerdict::Unhealthy => {
                tracing::error!(
                    severity = "critical",
                    active = %active,
                    candidate = %candidate.id(),
                    "Both endpoints appear to be down"
                );
                TickOutcome::AllEndpointsDown {
                    active: active.clone(),
                    candidate: candidate.id().clone(),
                }
            }
        };

        metrics::record_failover_attempt(active, candidate.id(), verdict.is_healthy());
        self.state.record_attempt();
        self.state.reset_failures();
        metrics::record_consecutive_failures(0);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use tracing_test::traced_test;
    use url::Url;

    use crate::cluster::Endpoint;
    use crate::lifecycle::Shutdown;

    /// Replays queued verdicts per URL, then falls back to a fixed verdict.
    #[derive(Clone, Default)]
    struct ScriptedProber {
        inner: Arc<Mutex<Script>>,
    }

    #[derive(Default)]
    struct Script {
        queued: HashMap<String, VecDeque<HealthVerdict>>,
        fallback: HashMap<String, HealthVerdict>,
        calls: Vec<String>,
    }

    impl ScriptedProber {
        fn queue(&self, url: &Url, verdicts: impl IntoIterator<Item = HealthVerdict>) {
            let mut script = self.inner.lock().unwrap();
            script
                .queued
                .entry(url.to_string())
                .or_default()
                .extend(verdicts);
        }

        fn always(&self, url: &Url, verdict: HealthVerdict) {
            self.inner
                .lock()
                .unwrap()
                .fallback
                .insert(url.to_string(), verdict);
        }

        fn calls_to(&self, url: &Url) -> usize {
            let script = self.inner.lock().unwrap();
            script.calls.iter().filter(|c| *c == url.as_str()).count()
        }
    }

    impl Prober for ScriptedProber {
        async fn probe(&self, url: &Url) -> HealthVerdict {
            let mut script = self.inner.lock().unwrap();
            script.calls.push(url.to_string());
            if let Some(verdict) = script
                .queued
                .get_mut(url.as_str())
                .and_then(VecDeque::pop_front)
            {
                return verdict;
            }
            script
                .fallback
                .get(url.as_str())
                .copied()
                .unwrap_or(HealthVerdict::Healthy)
        }
    }

    use crate::health::HealthVerdict::{Healthy, Unhealthy};

    fn endpoint(name: &str) -> Endpoint {
        Endpoint::new(
            name,
            format!("https://{}.example.com:4984/_ping", name).parse().unwrap(),
            Some(format!("wss://{}.example.com:4984/db", name).parse().unwrap()),
        )
    }

    struct Fixture {
        controller: FailoverController<ScriptedProber>,
        prober: ScriptedProber,
        primary: Endpoint,
        secondary: Endpoint,
    }

    fn fixture() -> Fixture {
        let primary = endpoint("primary");
        let secondary = endpoint("secondary");
        let registry = Arc::new(ClusterRegistry::new(vec![primary.clone(), secondary.clone()]).unwrap());
        let state = Arc::new(FailoverState::new(primary.clone()));
        let prober = ScriptedProber::default();
        let controller = FailoverController::new(registry, state, prober.clone(), MonitorSettings::default());
        Fixture {
            controller,
            prober,
            primary,
            secondary,
        }
    }

    async fn run_ticks(controller: &FailoverController<ScriptedProber>, n: usize) -> Vec<TickOutcome> {
        let mut outcomes = Vec::with_capacity(n);
        for _ in 0..n {
            outcomes.push(controller.tick().await);
        }
        outcomes
    }

    #[tokio::test]
    async fn test_switches_after_ten_failures_when_candidate_healthy() {
        let f = fixture();
        f.prober.always(f.primary.health_url(), Unhealthy);
        f.prober.always(f.secondary.health_url(), Healthy);

        let outcomes = run_ticks(&f.controller, 10).await;

        for (i, outcome) in outcomes[..9].iter().enumerate() {
            assert_eq!(outcome, &TickOutcome::Failed { failures: i as u32 + 1 });
        }
        assert_eq!(
            outcomes[9],
            TickOutcome::SwitchedOver {
                from: "primary".into(),
                to: "secondary".into()
            }
        );
        let state = f.controller.state();
        assert_eq!(state.active_id().as_str(), "secondary");
        assert_eq!(state.current_target(), *f.secondary.connection_url());
        assert_eq!(state.consecutive_failures(), 0);
        assert_eq!(state.failovers(), 1);
        assert_eq!(f.prober.calls_to(f.secondary.health_url()), 1);
    }

    #[tokio::test]
    async fn test_stays_put_when_both_endpoints_down() {
        let f = fixture();
        f.prober.always(f.primary.health_url(), Unhealthy);
        f.prober.always(f.secondary.health_url(), Unhealthy);

        let outcomes = run_ticks(&f.controller, 10).await;

        let criticals = outcomes
            .iter()
            .filter(|o| matches!(o, TickOutcome::AllEndpointsDown { .. }))
            .count();
        assert_eq!(criticals, 1);
        assert_eq!(
            outcomes[9],
            TickOutcome::AllEndpointsDown {
                active: "primary".into(),
                candidate: "secondary".into()
            }
        );
        let state = f.controller.state();
        assert_eq!(state.active_id().as_str(), "primary");
        assert_eq!(state.current_target(), *f.primary.connection_url());
        assert_eq!(state.consecutive_failures(), 0);
        assert_eq!(state.failovers(), 0);
    }

    #[tokio::test]
    async fn test_recovery_before_threshold_resets_counter() {
        let f = fixture();
        f.prober.queue(f.primary.health_url(), std::iter::repeat(Unhealthy).take(9));
        f.prober.queue(f.primary.health_url(), [Healthy]);

        let outcomes = run_ticks(&f.controller, 10).await;

        assert_eq!(outcomes[8], TickOutcome::Failed { failures: 9 });
        assert_eq!(outcomes[9], TickOutcome::Healthy);
        assert_eq!(f.controller.state().active_id().as_str(), "primary");
        assert_eq!(f.controller.state().consecutive_failures(), 0);
        assert_eq!(f.prober.calls_to(f.secondary.health_url()), 0);
    }

    #[tokio::test]
    async fn test_counter_tracks_trailing_failures() {
        let f = fixture();
        f.prober.queue(
            f.primary.health_url(),
            [Unhealthy, Unhealthy, Healthy, Unhealthy, Unhealthy, Unhealthy],
        );

        let mut seen = Vec::new();
        for _ in 0..6 {
            f.controller.tick().await;
            seen.push(f.controller.state().consecutive_failures());
        }
        assert_eq!(seen, vec![1, 2, 0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_healthy_ticks_never_switch() {
        let f = fixture();

        let outcomes = run_ticks(&f.controller, 50).await;

        assert!(outcomes.iter().all(|o| *o == TickOutcome::Healthy));
        assert_eq!(f.controller.state().active_id().as_str(), "primary");
        assert_eq!(f.prober.calls_to(f.secondary.health_url()), 0);
    }

    #[tokio::test]
    async fn test_aborted_failover_waits_full_cooldown() {
        let f = fixture();
        f.prober.always(f.primary.health_url(), Unhealthy);
        f.prober.queue(f.secondary.health_url(), [Unhealthy]);

        // First attempt fails: secondary down.
        let first = run_ticks(&f.controller, 10).await;
        assert!(matches!(first[9], TickOutcome::AllEndpointsDown { .. }));

        // Secondary is back, but nine more failures do not trigger an attempt.
        let cooldown = run_ticks(&f.controller, 9).await;
        assert!(cooldown.iter().all(|o| matches!(o, TickOutcome::Failed { .. })));
        assert_eq!(f.prober.calls_to(f.secondary.health_url()), 1);

        let retry = f.controller.tick().await;
        assert!(matches!(retry, TickOutcome::SwitchedOver { .. }));
        assert_eq!(f.controller.state().active_id().as_str(), "secondary");
        assert_eq!(f.prober.calls_to(f.secondary.health_url()), 2);
    }

    #[tokio::test]
    async fn test_fails_back_to_primary() {
        let f = fixture();
        f.prober.queue(f.primary.health_url(), std::iter::repeat(Unhealthy).take(10));
        f.prober.always(f.secondary.health_url(), Unhealthy);
        f.prober.queue(f.secondary.health_url(), [Healthy]);

        run_ticks(&f.controller, 10).await;
        assert_eq!(f.controller.state().active_id().as_str(), "secondary");

        // Secondary now fails; primary's queue is drained so it probes healthy.
        let outcomes = run_ticks(&f.controller, 10).await;
        assert_eq!(
            outcomes[9],
            TickOutcome::SwitchedOver {
                from: "secondary".into(),
                to: "primary".into()
            }
        );
        assert_eq!(f.controller.state().current_target(), *f.primary.connection_url());
        assert_eq!(f.controller.state().failovers(), 2);
    }

    #[tokio::test]
    async fn test_rotates_through_n_endpoints() {
        let a = endpoint("a");
        let b = endpoint("b");
        let c = endpoint("c");
        let registry = Arc::new(ClusterRegistry::new(vec![a.clone(), b.clone(), c.clone()]).unwrap());
        let state = Arc::new(FailoverState::new(a.clone()));
        let prober = ScriptedProber::default();
        prober.always(a.health_url(), Unhealthy);
        prober.always(b.health_url(), Unhealthy);
        // b passes verification once, then fails as the active endpoint.
        prober.queue(b.health_url(), [Healthy]);
        let settings = MonitorSettings {
            interval: Duration::from_secs(1),
            failure_threshold: 0,
        };
        let controller = FailoverController::new(registry, state, prober.clone(), settings);

        assert_eq!(
            controller.tick().await,
            TickOutcome::SwitchedOver { from: "a".into(), to: "b".into() }
        );
        assert_eq!(
            controller.tick().await,
            TickOutcome::SwitchedOver { from: "b".into(), to: "c".into() }
        );
        assert_eq!(controller.tick().await, TickOutcome::Healthy);
        assert_eq!(controller.state().current_target(), *c.connection_url());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_loop_fails_over_and_stops_on_shutdown() {
        let f = fixture();
        f.prober.always(f.primary.health_url(), Unhealthy);
        let interval = f.controller.settings().interval;
        let state = f.controller.state().clone();

        let shutdown = Shutdown::new();
        let handle = tokio::spawn(f.controller.run(shutdown.listen()));

        // Nothing happens before the first interval elapses.
        time::sleep(interval / 2).await;
        assert_eq!(f.prober.calls_to(f.primary.health_url()), 0);

        time::sleep(interval * 10).await;
        assert_eq!(state.active_id().as_str(), "secondary");
        assert_eq!(state.consecutive_failures(), 0);
        assert_eq!(f.prober.calls_to(f.primary.health_url()), 10);

        shutdown.trigger();
        handle.await.unwrap();
    }

    /// Answers `Unhealthy` after a fixed delay, like an endpoint that times out.
    #[derive(Clone, Default)]
    struct SlowProber {
        calls: Arc<Mutex<Vec<time::Instant>>>,
    }

    impl Prober for SlowProber {
        async fn probe(&self, _url: &Url) -> HealthVerdict {
            self.calls.lock().unwrap().push(time::Instant::now());
            time::sleep(Duration::from_secs(5)).await;
            Unhealthy
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_loop_waits_full_interval_after_slow_checks() {
        let primary = endpoint("primary");
        let secondary = endpoint("secondary");
        let registry = Arc::new(ClusterRegistry::new(vec![primary.clone(), secondary]).unwrap());
        let state = Arc::new(FailoverState::new(primary));
        let prober = SlowProber::default();
        let controller = FailoverController::new(registry, state, prober.clone(), MonitorSettings::default());

        let shutdown = Shutdown::new();
        let start = time::Instant::now();
        let handle = tokio::spawn(controller.run(shutdown.listen()));

        // 3s sleep + 5s check per cycle.
        time::sleep(Duration::from_secs(80)).await;
        shutdown.trigger();
        handle.await.unwrap();

        let calls = prober.calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 10);
        assert_eq!(calls[0] - start, Duration::from_secs(3));
        for pair in calls.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::from_secs(8));
        }
    }

    fn critical_lines(lines: &[&str]) -> usize {
        lines
            .iter()
            .filter(|line| line.contains("Both endpoints appear to be down"))
            .filter(|line| line.contains("severity") && line.contains("\"critical\""))
            .count()
    }

    #[tokio::test]
    #[traced_test]
    async fn test_critical_log_only_when_both_endpoints_down() {
        // Healthy candidate: switch, nothing critical.
        let f = fixture();
        f.prober.always(f.primary.health_url(), Unhealthy);
        f.prober.always(f.secondary.health_url(), Healthy);
        run_ticks(&f.controller, 10).await;
        assert_eq!(f.controller.state().active_id().as_str(), "secondary");
        assert!(logs_contain("Switched active endpoint"));
        logs_assert(|lines: &[&str]| match critical_lines(lines) {
            0 => Ok(()),
            n => Err(format!("expected no critical records, found {}", n)),
        });

        // Candidate down too: exactly one critical record.
        let f = fixture();
        f.prober.always(f.primary.health_url(), Unhealthy);
        f.prober.always(f.secondary.health_url(), Unhealthy);
        run_ticks(&f.controller, 10).await;
        assert_eq!(f.controller.state().active_id().as_str(), "primary");
        assert_eq!(f.controller.state().consecutive_failures(), 0);
        assert_eq!(f.controller.state().failover_attempts(), 1);
        logs_assert(|lines: &[&str]| match critical_lines(lines) {
            1 => Ok(()),
            n => Err(format!("expected one critical record, found {}", n)),
        });
    }
}
