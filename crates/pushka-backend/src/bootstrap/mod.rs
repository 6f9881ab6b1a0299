//! Startup routing: decides once which of the three [`AppState`]s the
//! presentation layer should show.

pub mod readiness;

use std::{sync::Arc, time::Duration};

use pushka_bridge::app_state::AppState;
use tokio::sync::{Mutex, watch};

use crate::error::CheckError;

pub use readiness::{HttpReadinessCheck, ReadinessCheck, StaticDestination, TargetDestination};

/// How long the readiness check may take before falling back to [`AppState::Final`].
pub const BOOTSTRAP_TIMEOUT: Duration = Duration::from_secs(10);

/// Races a [`ReadinessCheck`] against [`BOOTSTRAP_TIMEOUT`].
///
/// The state starts at [`AppState::Fetch`] and moves forward at most once.
/// Observers subscribe through [`BootstrapStateMachine::subscribe`].
pub struct BootstrapStateMachine {
    readiness: Arc<dyn ReadinessCheck>,
    destination: Arc<dyn TargetDestination>,
    timeout: Duration,
    state: watch::Sender<AppState>,
    /// Held for the duration of one evaluation so the check runs at most once.
    evaluating: Mutex<()>,
}

impl BootstrapStateMachine {
    pub fn new(readiness: Arc<dyn ReadinessCheck>, destination: Arc<dyn TargetDestination>) -> Self {
        Self {
            readiness,
            destination,
            timeout: BOOTSTRAP_TIMEOUT,
            state: watch::Sender::new(AppState::default()),
            evaluating: Mutex::new(()),
        }
    }

    pub fn state(&self) -> AppState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    /// Settles the startup state and returns it.
    ///
    /// A known target destination wins immediately. Otherwise the readiness
    /// check runs as its own task; if the timer fires first that task is left
    /// running and its answer is ignored. Concurrent callers wait for the
    /// evaluation already in progress and share its outcome.
    pub async fn evaluate(&self) -> AppState {
        let _evaluating = self.evaluating.lock().await;
        let current = self.state();
        if current.is_terminal() {
            return current;
        }

        if let Some(url) = self.destination.target_url() {
            log::info!("Target destination {url} known, showing supplementary content");
            self.transition(AppState::Supplementary);
            return self.state();
        }

        let readiness = self.readiness.clone();
        let mut check = tokio::spawn(async move { readiness.should_show_content().await });
        let timer = tokio::time::sleep(self.timeout);
        tokio::pin!(timer);

        let next = tokio::select! {
            outcome = &mut check => {
                match outcome.unwrap_or_else(|error| Err(CheckError::Aborted(error.to_string()))) {
                    Ok(true) => AppState::Supplementary,
                    Ok(false) => AppState::Final,
                    Err(error) => {
                        log::warn!("Readiness check failed: {error}");
                        AppState::Final
                    }
                }
            }
            () = &mut timer => {
                log::info!(
                    "Readiness check still pending after {} seconds",
                    self.timeout.as_secs()
                );
                self.on_timeout();
                return self.state();
            }
        };

        self.transition(next);
        self.state()
    }

    /// Timer expiry. Moves to [`AppState::Final`] unless a terminal state was
    /// already reached; returns whether it changed anything.
    pub fn on_timeout(&self) -> bool {
        self.transition(AppState::Final)
    }

    fn transition(&self, next: AppState) -> bool {
        let changed = self.state.send_if_modified(|state| {
            if state.is_terminal() || *state == next {
                return false;
            }
            *state = next;
            true
        });
        if changed {
            log::info!("App state is now {next:?}");
        }
        changed
    }
}

impl std::fmt::Debug for BootstrapStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapStateMachine")
            .field("timeout", &self.timeout)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    };

    use async_trait::async_trait;
    use reqwest::Url;
    use tokio::{sync::oneshot, time::Instant};

    use super::*;

    /// Answers after a delay, counting how often it was asked.
    struct DelayedAnswer {
        delay: Duration,
        answer: Option<bool>,
        calls: AtomicUsize,
    }

    impl DelayedAnswer {
        fn new(delay: Duration, answer: Option<bool>) -> Arc<Self> {
            Arc::new(Self {
                delay,
                answer,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ReadinessCheck for DelayedAnswer {
        async fn should_show_content(&self) -> Result<bool, CheckError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.answer
                .ok_or_else(|| CheckError::Request("connection reset".to_string()))
        }
    }

    /// Resolves only when the test sends the answer.
    struct ManualAnswer {
        answer: Mutex<Option<oneshot::Receiver<bool>>>,
        resolved: AtomicBool,
    }

    #[async_trait]
    impl ReadinessCheck for ManualAnswer {
        async fn should_show_content(&self) -> Result<bool, CheckError> {
            let answer = self.answer.lock().unwrap().take();
            let Some(answer) = answer else {
                return Err(CheckError::Aborted("asked twice".to_string()));
            };
            let result = answer
                .await
                .map_err(|_| CheckError::Aborted("answer dropped".to_string()));
            self.resolved.store(true, Ordering::SeqCst);
            result
        }
    }

    fn no_destination() -> Arc<dyn TargetDestination> {
        Arc::new(StaticDestination::default())
    }

    #[tokio::test(start_paused = true)]
    async fn quick_true_answer_shows_supplementary_and_ignores_timer() {
        let check = DelayedAnswer::new(Duration::from_secs(1), Some(true));
        let machine = BootstrapStateMachine::new(check.clone(), no_destination());
        let mut observer = machine.subscribe();
        let started = Instant::now();

        assert_eq!(machine.evaluate().await, AppState::Supplementary);
        assert_eq!(started.elapsed(), Duration::from_secs(1));
        assert!(observer.has_changed().unwrap());
        assert_eq!(*observer.borrow_and_update(), AppState::Supplementary);

        assert!(!machine.on_timeout());
        tokio::time::sleep(BOOTSTRAP_TIMEOUT * 2).await;
        assert_eq!(machine.state(), AppState::Supplementary);
        assert!(!observer.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn pending_check_times_out_to_final_and_late_answer_is_ignored() {
        let (answer_tx, answer_rx) = oneshot::channel();
        let check = Arc::new(ManualAnswer {
            answer: Mutex::new(Some(answer_rx)),
            resolved: AtomicBool::new(false),
        });
        let machine = BootstrapStateMachine::new(check.clone(), no_destination());
        let started = Instant::now();

        assert_eq!(machine.evaluate().await, AppState::Final);
        assert_eq!(started.elapsed(), BOOTSTRAP_TIMEOUT);

        tokio::time::sleep(Duration::from_secs(2)).await;
        answer_tx.send(true).unwrap();
        for _ in 0..16 {
            if check.resolved.load(Ordering::SeqCst) {
                break;
            }
            tokio::task::yield_now().await;
        }

        assert!(check.resolved.load(Ordering::SeqCst));
        assert_eq!(machine.state(), AppState::Final);
        assert_eq!(machine.evaluate().await, AppState::Final);
    }

    #[tokio::test(start_paused = true)]
    async fn known_destination_skips_the_check() {
        let check = DelayedAnswer::new(Duration::from_secs(1), Some(false));
        let destination = StaticDestination::new(Some(Url::parse("https://deep.link/offer").unwrap()));
        let machine = BootstrapStateMachine::new(check.clone(), Arc::new(destination));

        assert_eq!(machine.evaluate().await, AppState::Supplementary);
        assert_eq!(check.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn false_answer_is_final() {
        let check = DelayedAnswer::new(Duration::from_millis(200), Some(false));
        let machine = BootstrapStateMachine::new(check, no_destination());
        assert_eq!(machine.evaluate().await, AppState::Final);
    }

    #[tokio::test(start_paused = true)]
    async fn failing_check_is_final() {
        let check = DelayedAnswer::new(Duration::from_millis(200), None);
        let machine = BootstrapStateMachine::new(check, no_destination());
        assert_eq!(machine.evaluate().await, AppState::Final);
    }

    #[tokio::test(start_paused = true)]
    async fn evaluating_twice_runs_the_check_once() {
        let check = DelayedAnswer::new(Duration::from_millis(200), Some(true));
        let machine = BootstrapStateMachine::new(check.clone(), no_destination());

        assert_eq!(machine.evaluate().await, AppState::Supplementary);
        assert_eq!(machine.evaluate().await, AppState::Supplementary);
        assert_eq!(check.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_evaluations_share_one_check() {
        let check = DelayedAnswer::new(Duration::from_secs(1), Some(true));
        let machine = BootstrapStateMachine::new(check.clone(), no_destination());

        let (first, second) = tokio::join!(machine.evaluate(), machine.evaluate());

        assert_eq!(first, AppState::Supplementary);
        assert_eq!(second, AppState::Supplementary);
        assert_eq!(check.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_before_evaluation_settles_final() {
        let check = DelayedAnswer::new(Duration::from_millis(200), Some(true));
        let machine = BootstrapStateMachine::new(check.clone(), no_destination());

        assert!(machine.on_timeout());
        assert_eq!(machine.evaluate().await, AppState::Final);
        assert_eq!(check.calls.load(Ordering::SeqCst), 0);
    }
}
