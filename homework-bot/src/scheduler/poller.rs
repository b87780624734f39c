//! Status poller
//!
//! Polls the review API for the latest homework status and relays changes to
//! the user. Each iteration either produces a status message or an error;
//! both paths are deduplicated against the last text actually delivered, so
//! an unchanged state is reported only once.

use homework_client::StatusPayload;
use std::sync::Arc;
use tokio::time::{self, Duration};
use tracing::{debug, error, info, warn};

use crate::error::PollError;
use crate::repository::{Notifier, StatusRepository};

/// Mutable state carried from one iteration to the next
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopState {
    /// Lower bound of the next query window (Unix timestamp)
    pub cursor: i64,

    /// Last status message delivered to the user
    pub last_message: String,

    /// Last error text delivered to the user
    pub last_error: String,
}

impl LoopState {
    pub fn new(cursor: i64) -> Self {
        Self {
            cursor,
            ..Self::default()
        }
    }
}

/// What a single iteration ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A new status message was delivered
    Notified,
    /// The status message equals the last delivered one
    Unchanged,
    /// The API reported no homework at all
    NothingNew,
    /// A new error text was delivered
    ErrorNotified,
    /// The error text equals the last delivered one
    ErrorSuppressed,
    /// The notifier failed; nothing was remembered
    DeliveryFailed,
}

/// Poller that relays homework status changes
pub struct StatusPoller {
    statuses: Arc<dyn StatusRepository>,
    notifier: Arc<dyn Notifier>,
    interval: Duration,
    state: LoopState,
}

impl StatusPoller {
    /// Creates a new poller starting its query window at `from_date`
    pub fn new(
        statuses: Arc<dyn StatusRepository>,
        notifier: Arc<dyn Notifier>,
        interval: Duration,
        from_date: i64,
    ) -> Self {
        Self {
            statuses,
            notifier,
            interval,
            state: LoopState::new(from_date),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &LoopState {
        &self.state
    }

    /// Runs the polling loop until the process is terminated
    pub async fn run(mut self) {
        info!(
            "Starting status poller (interval: {:?}, from_date: {})",
            self.interval, self.state.cursor
        );

        loop {
            let outcome = self.tick().await;
            debug!(?outcome, "Poll iteration finished");

            time::sleep(self.interval).await;
        }
    }

    /// Performs one iteration: fetch, interpret, and notify if needed
    ///
    /// Never fails; every error is logged and, when new, reported to the user.
    pub async fn tick(&mut self) -> TickOutcome {
        match self.poll_once().await {
            Ok(message) => self.report_message(message).await,
            Err(e) if e.is_nothing_new() => {
                debug!("No homework reported since {}", self.state.cursor);
                TickOutcome::NothingNew
            }
            Err(e) => self.report_error(e).await,
        }
    }

    async fn poll_once(&mut self) -> Result<String, PollError> {
        let payload = self.statuses.fetch(self.state.cursor).await?;
        self.advance_cursor(&payload);

        let latest = payload.extract_latest()?;
        Ok(latest.render_message()?)
    }

    fn advance_cursor(&mut self, payload: &StatusPayload) {
        match payload.current_date() {
            Some(date) => {
                debug!("Advancing cursor {} -> {}", self.state.cursor, date);
                self.state.cursor = date;
            }
            None if payload.has_current_date() => {
                warn!(
                    "Ignoring non-integer current_date, keeping cursor {}",
                    self.state.cursor
                );
            }
            None => {
                debug!("Response has no current_date, keeping cursor {}", self.state.cursor);
            }
        }
    }

    async fn report_message(&mut self, message: String) -> TickOutcome {
        if message == self.state.last_message {
            debug!("Homework status unchanged");
            return TickOutcome::Unchanged;
        }

        info!("Homework status changed, notifying: {}", message);

        match self.notifier.notify(&message).await {
            Ok(()) => {
                self.state.last_message = message;
                TickOutcome::Notified
            }
            Err(e) => {
                error!("Failed to deliver status message: {}", e);
                TickOutcome::DeliveryFailed
            }
        }
    }

    async fn report_error(&mut self, err: PollError) -> TickOutcome {
        if err.is_transient() {
            warn!("Poll iteration failed: {}", err);
        } else {
            error!("Poll iteration failed: {}", err);
        }

        let text = err.notification_text();
        if text == self.state.last_error {
            debug!("Error already reported, staying silent");
            return TickOutcome::ErrorSuppressed;
        }

        match self.notifier.notify(&text).await {
            Ok(()) => {
                self.state.last_error = text;
                TickOutcome::ErrorNotified
            }
            Err(e) => {
                // Not routed back into the error path
                error!("Failed to deliver error message: {}", e);
                TickOutcome::DeliveryFailed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::NotifyError;
    use async_trait::async_trait;
    use homework_client::ClientError;
    use serde_json::{Value, json};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use teloxide::{ApiError, RequestError};

    /// Returns scripted responses in order and records requested cursors
    struct ScriptedStatuses {
        responses: Mutex<VecDeque<Result<StatusPayload, ClientError>>>,
        cursors: Mutex<Vec<i64>>,
    }

    impl ScriptedStatuses {
        fn new(responses: Vec<Result<StatusPayload, ClientError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                cursors: Mutex::new(Vec::new()),
            })
        }

        fn cursors(&self) -> Vec<i64> {
            self.cursors.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StatusRepository for ScriptedStatuses {
        async fn fetch(&self, from_date: i64) -> Result<StatusPayload, ClientError> {
            self.cursors.lock().unwrap().push(from_date);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted response left")
        }
    }

    /// Records delivered texts; fails the first `failures` attempts
    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<String>>,
        attempts: AtomicUsize,
        failures: usize,
    }

    impl RecordingNotifier {
        fn failing(failures: usize) -> Arc<Self> {
            Arc::new(Self {
                failures,
                ..Self::default()
            })
        }

        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, text: &str) -> Result<(), NotifyError> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            if attempt < self.failures {
                return Err(RequestError::Api(ApiError::BotBlocked).into());
            }
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn ok(value: Value) -> Result<StatusPayload, ClientError> {
        Ok(StatusPayload::new(value))
    }

    fn approved_payload() -> Value {
        json!({
            "homeworks": [{"homework_name": "hw1", "status": "approved"}],
            "current_date": 1000
        })
    }

    fn poller(statuses: Arc<ScriptedStatuses>, notifier: Arc<RecordingNotifier>) -> StatusPoller {
        StatusPoller::new(statuses, notifier, Duration::from_secs(600), 14000000)
    }

    const APPROVED_TEXT: &str =
        "Изменился статус проверки работы \"hw1\". Работа проверена: ревьюеру всё понравилось. Ура!";

    #[tokio::test]
    async fn test_new_status_is_sent_and_cursor_advances() {
        let statuses = ScriptedStatuses::new(vec![ok(approved_payload())]);
        let notifier = RecordingNotifier::failing(0);
        let mut poller = poller(statuses.clone(), notifier.clone());

        assert_eq!(poller.tick().await, TickOutcome::Notified);
        assert_eq!(notifier.sent(), vec![APPROVED_TEXT.to_string()]);
        assert_eq!(poller.state().cursor, 1000);
        assert_eq!(poller.state().last_message, APPROVED_TEXT);
        assert_eq!(statuses.cursors(), vec![14000000]);
    }

    #[tokio::test]
    async fn test_identical_status_is_sent_once() {
        let statuses = ScriptedStatuses::new(vec![ok(approved_payload()), ok(approved_payload())]);
        let notifier = RecordingNotifier::failing(0);
        let mut poller = poller(statuses.clone(), notifier.clone());

        assert_eq!(poller.tick().await, TickOutcome::Notified);
        assert_eq!(poller.tick().await, TickOutcome::Unchanged);
        assert_eq!(notifier.sent().len(), 1);
        assert_eq!(statuses.cursors(), vec![14000000, 1000]);
    }

    #[tokio::test]
    async fn test_changed_status_is_sent_again() {
        let statuses = ScriptedStatuses::new(vec![
            ok(json!({"homeworks": [{"homework_name": "hw1", "status": "reviewing"}]})),
            ok(approved_payload()),
        ]);
        let notifier = RecordingNotifier::failing(0);
        let mut poller = poller(statuses, notifier.clone());

        poller.tick().await;
        poller.tick().await;

        let sent = notifier.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].contains("Работа взята на проверку ревьюером."));
        assert_eq!(sent[1], APPROVED_TEXT);
    }

    #[tokio::test]
    async fn test_repeated_http_error_is_sent_once() {
        let statuses = ScriptedStatuses::new(vec![
            Err(ClientError::http(503)),
            Err(ClientError::http(503)),
        ]);
        let notifier = RecordingNotifier::failing(0);
        let mut poller = poller(statuses.clone(), notifier.clone());

        assert_eq!(poller.tick().await, TickOutcome::ErrorNotified);
        assert_eq!(poller.tick().await, TickOutcome::ErrorSuppressed);

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("503"));
        assert_eq!(statuses.cursors(), vec![14000000, 14000000]);
    }

    #[tokio::test]
    async fn test_distinct_error_is_sent() {
        let statuses = ScriptedStatuses::new(vec![
            Err(ClientError::http(503)),
            Err(ClientError::Decode("invalid JSON".to_string())),
            Err(ClientError::Decode("invalid JSON".to_string())),
        ]);
        let notifier = RecordingNotifier::failing(0);
        let mut poller = poller(statuses, notifier.clone());

        assert_eq!(poller.tick().await, TickOutcome::ErrorNotified);
        assert_eq!(poller.tick().await, TickOutcome::ErrorNotified);
        assert_eq!(poller.tick().await, TickOutcome::ErrorSuppressed);
        assert_eq!(notifier.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_error_does_not_reset_message_memo() {
        let statuses = ScriptedStatuses::new(vec![
            ok(approved_payload()),
            Err(ClientError::http(500)),
            ok(approved_payload()),
        ]);
        let notifier = RecordingNotifier::failing(0);
        let mut poller = poller(statuses, notifier.clone());

        assert_eq!(poller.tick().await, TickOutcome::Notified);
        assert_eq!(poller.tick().await, TickOutcome::ErrorNotified);
        assert_eq!(poller.tick().await, TickOutcome::Unchanged);
        assert_eq!(notifier.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_list_is_silent_and_advances_cursor() {
        let statuses = ScriptedStatuses::new(vec![
            ok(json!({"homeworks": [], "current_date": 2000})),
            ok(json!({"homeworks": [], "current_date": 3000})),
        ]);
        let notifier = RecordingNotifier::failing(0);
        let mut poller = poller(statuses.clone(), notifier.clone());

        assert_eq!(poller.tick().await, TickOutcome::NothingNew);
        assert_eq!(poller.tick().await, TickOutcome::NothingNew);
        assert!(notifier.sent().is_empty());
        assert_eq!(poller.state().last_error, "");
        assert_eq!(statuses.cursors(), vec![14000000, 2000]);
        assert_eq!(poller.state().cursor, 3000);
    }

    #[tokio::test]
    async fn test_missing_current_date_keeps_cursor() {
        let statuses = ScriptedStatuses::new(vec![
            ok(json!({"homeworks": [{"homework_name": "hw1", "status": "approved"}]})),
            ok(json!({"homeworks": [], "current_date": "later"})),
        ]);
        let notifier = RecordingNotifier::failing(0);
        let mut poller = poller(statuses, notifier);

        poller.tick().await;
        assert_eq!(poller.state().cursor, 14000000);
        poller.tick().await;
        assert_eq!(poller.state().cursor, 14000000);
    }

    #[tokio::test]
    async fn test_validation_failure_is_reported() {
        let statuses = ScriptedStatuses::new(vec![
            ok(json!({"current_date": 1000})),
            ok(json!(["not", "a", "mapping"])),
        ]);
        let notifier = RecordingNotifier::failing(0);
        let mut poller = poller(statuses, notifier.clone());

        assert_eq!(poller.tick().await, TickOutcome::ErrorNotified);
        assert_eq!(poller.tick().await, TickOutcome::ErrorNotified);

        let sent = notifier.sent();
        assert!(sent[0].contains("homeworks"));
        assert!(sent[1].contains("expected an object"));
        assert_eq!(poller.state().cursor, 1000);
    }

    #[tokio::test]
    async fn test_unknown_status_is_reported_not_fatal() {
        let statuses = ScriptedStatuses::new(vec![
            ok(json!({"homeworks": [{"homework_name": "hw1", "status": "lost"}]})),
            ok(approved_payload()),
        ]);
        let notifier = RecordingNotifier::failing(0);
        let mut poller = poller(statuses, notifier.clone());

        assert_eq!(poller.tick().await, TickOutcome::ErrorNotified);
        assert_eq!(poller.tick().await, TickOutcome::Notified);

        let sent = notifier.sent();
        assert!(sent[0].contains("lost"));
        assert_eq!(sent[1], APPROVED_TEXT);
    }

    #[tokio::test]
    async fn test_failed_delivery_is_retried_next_tick() {
        let statuses = ScriptedStatuses::new(vec![ok(approved_payload()), ok(approved_payload())]);
        let notifier = RecordingNotifier::failing(1);
        let mut poller = poller(statuses, notifier.clone());

        assert_eq!(poller.tick().await, TickOutcome::DeliveryFailed);
        assert_eq!(poller.state().last_message, "");
        assert_eq!(poller.state().last_error, "");

        assert_eq!(poller.tick().await, TickOutcome::Notified);
        assert_eq!(notifier.sent(), vec![APPROVED_TEXT.to_string()]);
        assert_eq!(notifier.attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_error_delivery_is_not_renotified() {
        let statuses = ScriptedStatuses::new(vec![Err(ClientError::http(503))]);
        let notifier = RecordingNotifier::failing(1);
        let mut poller = poller(statuses, notifier.clone());

        assert_eq!(poller.tick().await, TickOutcome::DeliveryFailed);
        assert_eq!(notifier.attempts.load(Ordering::SeqCst), 1);
        assert!(notifier.sent().is_empty());
    }
}
