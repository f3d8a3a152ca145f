//! The poll loop.

use std::time::Duration;
use tokio::time::{sleep_until, timeout_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::ReconcileError;
use crate::handle::ResourceHandle;

use super::fetch::{FetchError, StatusFetcher};
use super::observed::TerminalOutcome;
use super::spec::{ReconciliationSpec, StatusClass, UnknownStatusPolicy};

/// Stand-in offset for instants that would overflow; roughly thirty years.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Drives one remote resource to a terminal state.
///
/// A reconciler owns no shared state; separate operations build separate
/// reconcilers and never coordinate.
#[derive(Debug)]
pub struct Reconciler<'a, F: StatusFetcher + ?Sized> {
    /// Status-fetch capability.
    fetcher: &'a F,
    /// Polling configuration.
    spec: &'a ReconciliationSpec,
    /// External cancellation signal.
    cancel: CancellationToken,
}

/// How a cancellable wait ended.
enum Wait {
    Elapsed,
    Cancelled,
}

/// Mutable bookkeeping for a single run.
struct Run<'h> {
    resource: &'h ResourceHandle,
    deadline: Instant,
    last_status: Option<String>,
    polls: u32,
}

impl<'a, F: StatusFetcher + ?Sized> Reconciler<'a, F> {
    /// Creates a reconciler that is only bounded by the spec's timeout.
    #[must_use]
    pub fn new(fetcher: &'a F, spec: &'a ReconciliationSpec) -> Self {
        Self {
            fetcher,
            spec,
            cancel: CancellationToken::new(),
        }
    }

    /// Attaches an external cancellation signal.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Polls `handle` until it reaches a terminal outcome.
    ///
    /// The deadline is fixed once at the start of the run. A fetch is never
    /// scheduled at or past it: when the next check would land there, the
    /// run returns [`ReconcileError::Timeout`] right away instead of
    /// sleeping. With a 1800s timeout and a 10s interval the last fetch
    /// happens at 1790s and the timeout is reported then. A deadline too
    /// far away to represent is treated as unbounded.
    ///
    /// The initial delay, every inter-poll sleep and an in-flight fetch are
    /// interrupted immediately by cancellation. A fetch still in flight at
    /// the deadline is abandoned.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::InvalidSpec`] before any fetch if the spec
    /// is invalid, [`ReconcileError::NotFound`] if the resource is absent,
    /// [`ReconcileError::Remote`] on any other fetch failure,
    /// [`ReconcileError::Failed`] on a failure status,
    /// [`ReconcileError::Timeout`] when the deadline is reached and
    /// [`ReconcileError::Cancelled`] when the caller aborts.
    pub async fn reconcile(&self, handle: &ResourceHandle) -> TerminalOutcome<F::Payload> {
        self.spec.validate()?;

        let start = Instant::now();
        let mut run = Run {
            resource: handle,
            deadline: offset(start, self.spec.timeout),
            last_status: None,
            polls: 0,
        };

        info!(
            "Waiting for {handle} to reach {} (timeout {:?})",
            self.spec.expected(),
            self.spec.timeout
        );

        if !self.spec.delay.is_zero() {
            let first_poll = offset(start, self.spec.delay);
            if first_poll >= run.deadline {
                return Err(self.timeout(&run));
            }
            if let Wait::Cancelled = self.wait_until(first_poll).await {
                return Err(Self::cancelled(&run));
            }
        }

        loop {
            let fetched = tokio::select! {
                biased;
                () = self.cancel.cancelled() => return Err(Self::cancelled(&run)),
                fetched = timeout_at(run.deadline, self.fetcher.fetch(handle)) => fetched,
            };
            run.polls += 1;

            let Ok(fetched) = fetched else {
                warn!("Status fetch for {handle} still in flight at the deadline");
                return Err(self.timeout(&run));
            };

            let observed = match fetched {
                Ok(observed) => observed,
                Err(FetchError::NotFound { message }) => {
                    debug!("{handle} not found on poll {}: {message}", run.polls);
                    return Err(ReconcileError::NotFound {
                        resource: handle.encode(),
                    });
                }
                Err(FetchError::Remote { message }) => {
                    return Err(ReconcileError::Remote {
                        resource: handle.encode(),
                        last_status: run.last_status,
                        message,
                    });
                }
            };

            match self.spec.classify(&observed.status) {
                StatusClass::Target => {
                    info!(
                        "{handle} reached {} after {} poll(s) in {:?}",
                        observed.status,
                        run.polls,
                        start.elapsed()
                    );
                    return Ok(observed);
                }
                StatusClass::Failure => {
                    return Err(ReconcileError::Failed {
                        resource: handle.encode(),
                        status: observed.status,
                    });
                }
                StatusClass::Pending => {
                    debug!("{handle} is {} (poll {})", observed.status, run.polls);
                }
                StatusClass::Unknown => match self.spec.unknown_status {
                    UnknownStatusPolicy::Tolerate => {
                        warn!(
                            "{handle} reported unexpected status '{}', treating it as pending",
                            observed.status
                        );
                    }
                    UnknownStatusPolicy::Fail => {
                        return Err(ReconcileError::Failed {
                            resource: handle.encode(),
                            status: observed.status,
                        });
                    }
                },
            }
            run.last_status = Some(observed.status);

            let next_poll = offset(Instant::now(), self.spec.poll_interval);
            if next_poll >= run.deadline {
                return Err(self.timeout(&run));
            }
            if let Wait::Cancelled = self.wait_until(next_poll).await {
                return Err(Self::cancelled(&run));
            }
        }
    }

    async fn wait_until(&self, when: Instant) -> Wait {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Wait::Cancelled,
            () = sleep_until(when) => Wait::Elapsed,
        }
    }

    fn timeout(&self, run: &Run<'_>) -> ReconcileError {
        warn!(
            "Gave up on {} after {} poll(s), last status {:?}",
            run.resource, run.polls, run.last_status
        );
        ReconcileError::Timeout {
            resource: run.resource.encode(),
            expected: self.spec.expected(),
            timeout: self.spec.timeout,
            last_status: run.last_status.clone(),
        }
    }

    fn cancelled(run: &Run<'_>) -> ReconcileError {
        info!("Reconciliation of {} cancelled", run.resource);
        ReconcileError::Cancelled {
            resource: run.resource.encode(),
            last_status: run.last_status.clone(),
        }
    }
}

/// `base + by`, saturating at a far-future instant.
fn offset(base: Instant, by: Duration) -> Instant {
    base.checked_add(by)
        .or_else(|| base.checked_add(FAR_FUTURE))
        .unwrap_or(base)
}

/// Polls `handle` with `fetcher` until a terminal outcome, honoring `cancel`.
///
/// Convenience wrapper around [`Reconciler`].
///
/// # Errors
///
/// See [`Reconciler::reconcile`].
pub async fn reconcile<F>(
    handle: &ResourceHandle,
    spec: &ReconciliationSpec,
    fetcher: &F,
    cancel: &CancellationToken,
) -> TerminalOutcome<F::Payload>
where
    F: StatusFetcher + ?Sized,
{
    Reconciler::new(fetcher, spec)
        .with_cancellation(cancel.clone())
        .reconcile(handle)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconciler::{fetch_fn, ObservedState};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio_test::assert_err;

    fn handle() -> ResourceHandle {
        ResourceHandle::new("cloud-instance", "dhcp-1").unwrap()
    }

    fn dhcp_spec() -> ReconciliationSpec {
        ReconciliationSpec::new(["Building"], ["ACTIVE"])
            .with_delay(Duration::from_secs(10))
            .with_poll_interval(Duration::from_secs(10))
            .with_timeout(Duration::from_secs(30 * 60))
    }

    /// Fetcher replaying `script` (the last entry repeats) and counting calls.
    fn scripted(
        script: Vec<Result<&'static str, FetchError>>,
        calls: Arc<AtomicU32>,
    ) -> impl StatusFetcher<Payload = u32> {
        fetch_fn(move |_handle: ResourceHandle| {
            let call = calls.fetch_add(1, Ordering::SeqCst);
            let index = (call as usize).min(script.len() - 1);
            let step = script[index].clone();
            async move { step.map(|status| ObservedState::new(status, call + 1)) }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_building_then_active() {
        let calls = Arc::new(AtomicU32::new(0));
        let fetcher = scripted(vec![Ok("Building"), Ok("Building"), Ok("ACTIVE")], calls.clone());

        let start = Instant::now();
        let observed = reconcile(&handle(), &dhcp_spec(), &fetcher, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(observed.status, "ACTIVE");
        assert_eq!(observed.payload, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 10s initial delay + two 10s intervals.
        assert_eq!(start.elapsed(), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_on_poll_n_fetches_exactly_n() {
        for n in 1..=5_usize {
            let calls = Arc::new(AtomicU32::new(0));
            let mut script = vec![Ok("Building"); n - 1];
            script.push(Ok("ACTIVE"));
            let fetcher = scripted(script, calls.clone());

            let outcome =
                reconcile(&handle(), &dhcp_spec(), &fetcher, &CancellationToken::new()).await;

            assert!(outcome.is_ok());
            assert_eq!(calls.load(Ordering::SeqCst) as usize, n);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_fetch_terminal_needs_no_sleep() {
        let calls = Arc::new(AtomicU32::new(0));
        let fetcher = scripted(vec![Ok("ACTIVE")], calls.clone());
        let spec = dhcp_spec().with_delay(Duration::ZERO);

        let start = Instant::now();
        let outcome = reconcile(&handle(), &spec, &fetcher, &CancellationToken::new()).await;

        assert!(outcome.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_pending_times_out() {
        let calls = Arc::new(AtomicU32::new(0));
        let fetcher = scripted(vec![Ok("Building")], calls.clone());
        let spec = dhcp_spec();

        let start = Instant::now();
        let err = assert_err!(
            reconcile(&handle(), &spec, &fetcher, &CancellationToken::new()).await
        );
        let elapsed = start.elapsed();

        match err {
            ReconcileError::Timeout {
                last_status,
                timeout,
                ..
            } => {
                assert_eq!(last_status.as_deref(), Some("Building"));
                assert_eq!(timeout, spec.timeout);
            }
            other => panic!("expected timeout, got {other:?}"),
        }

        // No fetch is ever scheduled at or past the deadline.
        assert!(elapsed < spec.timeout);
        assert!(elapsed >= spec.timeout - spec.poll_interval);
        // Fetches at 10s, 20s, ..., 1790s.
        assert_eq!(calls.load(Ordering::SeqCst), 179);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_is_immediate() {
        let calls = Arc::new(AtomicU32::new(0));
        let fetcher = scripted(vec![Err(FetchError::not_found("404"))], calls.clone());

        let start = Instant::now();
        let outcome = reconcile(&handle(), &dhcp_spec(), &fetcher, &CancellationToken::new()).await;

        assert_eq!(
            outcome,
            Err(ReconcileError::NotFound {
                resource: String::from("cloud-instance/dhcp-1"),
            })
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // Only the initial delay elapsed; no poll interval was slept.
        assert_eq!(start.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_error_stops_polling() {
        let calls = Arc::new(AtomicU32::new(0));
        let fetcher = scripted(
            vec![Ok("Building"), Err(FetchError::remote("malformed payload")), Ok("ACTIVE")],
            calls.clone(),
        );

        let outcome = reconcile(&handle(), &dhcp_spec(), &fetcher, &CancellationToken::new()).await;

        assert_eq!(
            outcome,
            Err(ReconcileError::Remote {
                resource: String::from("cloud-instance/dhcp-1"),
                last_status: Some(String::from("Building")),
                message: String::from("malformed payload"),
            })
        );
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconcile_is_idempotent_when_already_active() {
        let calls = Arc::new(AtomicU32::new(0));
        let fetcher = fetch_fn(move |_handle: ResourceHandle| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, FetchError>(ObservedState::new("ACTIVE", "payload")) }
        });
        let spec = dhcp_spec();
        let cancel = CancellationToken::new();

        let first = reconcile(&handle(), &spec, &fetcher, &cancel).await;
        let second = reconcile(&handle(), &spec, &fetcher, &cancel).await;

        assert_eq!(first, second);
        assert!(first.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_status_policy() {
        let calls = Arc::new(AtomicU32::new(0));
        let fetcher = scripted(vec![Ok("Provisioning"), Ok("ACTIVE")], calls.clone());
        assert!(
            reconcile(&handle(), &dhcp_spec(), &fetcher, &CancellationToken::new())
                .await
                .is_ok()
        );
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let calls = Arc::new(AtomicU32::new(0));
        let fetcher = scripted(vec![Ok("Provisioning"), Ok("ACTIVE")], calls.clone());
        let spec = dhcp_spec().with_unknown_status(UnknownStatusPolicy::Fail);
        let outcome = reconcile(&handle(), &spec, &fetcher, &CancellationToken::new()).await;

        assert!(matches!(outcome, Err(ReconcileError::Failed { ref status, .. }) if status == "Provisioning"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_status() {
        let calls = Arc::new(AtomicU32::new(0));
        let fetcher = scripted(vec![Ok("Building"), Ok("ERROR")], calls.clone());
        let spec = dhcp_spec().with_failure(["ERROR"]);

        let outcome = reconcile(&handle(), &spec, &fetcher, &CancellationToken::new()).await;

        assert!(matches!(outcome, Err(ReconcileError::Failed { ref status, .. }) if status == "ERROR"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_spec_never_fetches() {
        let calls = Arc::new(AtomicU32::new(0));
        let fetcher = scripted(vec![Ok("ACTIVE")], calls.clone());
        let spec = dhcp_spec().with_poll_interval(Duration::ZERO);

        let outcome = reconcile(&handle(), &spec, &fetcher, &CancellationToken::new()).await;

        assert!(matches!(outcome, Err(ReconcileError::InvalidSpec { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_past_deadline_times_out_without_fetch() {
        let calls = Arc::new(AtomicU32::new(0));
        let fetcher = scripted(vec![Ok("ACTIVE")], calls.clone());
        let spec = dhcp_spec()
            .with_delay(Duration::from_secs(60))
            .with_timeout(Duration::from_secs(30));

        let outcome = reconcile(&handle(), &spec, &fetcher, &CancellationToken::new()).await;

        assert!(matches!(outcome, Err(ReconcileError::Timeout { last_status: None, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_sleep() {
        let calls = Arc::new(AtomicU32::new(0));
        let fetcher = scripted(vec![Ok("Building")], calls.clone());
        let spec = dhcp_spec();
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(25)).await;
            trigger.cancel();
        });

        let start = Instant::now();
        let outcome = reconcile(&handle(), &spec, &fetcher, &cancel).await;

        assert_eq!(
            outcome,
            Err(ReconcileError::Cancelled {
                resource: String::from("cloud-instance/dhcp-1"),
                last_status: Some(String::from("Building")),
            })
        );
        // Polls at 10s and 20s; the sleep toward 30s is cut short at 25s.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(start.elapsed(), Duration::from_secs(25));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_fetch_is_abandoned_at_deadline() {
        let fetcher = fetch_fn(|_handle: ResourceHandle| async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok::<_, FetchError>(ObservedState::new("ACTIVE", ()))
        });
        let spec = dhcp_spec().with_timeout(Duration::from_secs(60));

        let start = Instant::now();
        let outcome = reconcile(&handle(), &spec, &fetcher, &CancellationToken::new()).await;

        assert!(matches!(outcome, Err(ReconcileError::Timeout { .. })));
        assert_eq!(start.elapsed(), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrepresentable_timeout_is_unbounded() {
        let calls = Arc::new(AtomicU32::new(0));
        let fetcher = scripted(vec![Ok("Building"), Ok("ACTIVE")], calls.clone());
        let spec = ReconciliationSpec::new(["Building"], ["ACTIVE"])
            .with_delay(Duration::ZERO)
            .with_timeout(Duration::from_secs(u64::MAX));
        assert!(spec.validate().is_ok());

        let start = Instant::now();
        let outcome = reconcile(&handle(), &spec, &fetcher, &CancellationToken::new()).await;

        assert!(outcome.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(start.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrepresentable_delay_and_interval_time_out() {
        let calls = Arc::new(AtomicU32::new(0));
        let fetcher = scripted(vec![Ok("Building")], calls.clone());

        let spec = dhcp_spec().with_delay(Duration::from_secs(u64::MAX));
        let outcome = reconcile(&handle(), &spec, &fetcher, &CancellationToken::new()).await;
        assert!(matches!(outcome, Err(ReconcileError::Timeout { last_status: None, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let spec = dhcp_spec().with_poll_interval(Duration::from_secs(u64::MAX));
        let outcome = reconcile(&handle(), &spec, &fetcher, &CancellationToken::new()).await;
        assert!(matches!(
            outcome,
            Err(ReconcileError::Timeout { last_status: Some(ref s), .. }) if s == "Building"
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_initial_delay() {
        let calls = Arc::new(AtomicU32::new(0));
        let fetcher = scripted(vec![Ok("ACTIVE")], calls.clone());
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(4)).await;
            trigger.cancel();
        });

        let start = Instant::now();
        let outcome = reconcile(&handle(), &dhcp_spec(), &fetcher, &cancel).await;

        assert_eq!(
            outcome,
            Err(ReconcileError::Cancelled {
                resource: String::from("cloud-instance/dhcp-1"),
                last_status: None,
            })
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(start.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_fetch_in_flight() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let fetcher = fetch_fn(move |_handle: ResourceHandle| {
            let call = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if call > 0 {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                }
                Ok::<_, FetchError>(ObservedState::new("Building", ()))
            }
        });
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(25)).await;
            trigger.cancel();
        });

        let start = Instant::now();
        let outcome = reconcile(&handle(), &dhcp_spec(), &fetcher, &cancel).await;

        // The first fetch answers at 10s; the second hangs from 20s until cancelled.
        assert_eq!(
            outcome,
            Err(ReconcileError::Cancelled {
                resource: String::from("cloud-instance/dhcp-1"),
                last_status: Some(String::from("Building")),
            })
        );
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(start.elapsed(), Duration::from_secs(25));
    }
}
