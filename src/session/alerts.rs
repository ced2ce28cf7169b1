//! Configuration-error aggregation
//!
//! Four concurrent requests failing for the same root cause (no API keys
//! configured) must not produce four popups. Signals arriving within a
//! short window are coalesced into one notification listing every distinct
//! provider seen since the last flush.
//!
//! The debounce logic is an explicit state machine (`Idle` /
//! `Collecting{deadline}`) driven by a caller-supplied monotonic instant,
//! so unit tests are fully deterministic. An async driver task bridges a
//! signal channel to [`PanelEvent::Alert`] using the tokio timer.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::session::events::{emit, EventSink, PanelEvent};

/// Default quiet period before a coalesced notification fires
pub const DEFAULT_ALERT_WINDOW: Duration = Duration::from_millis(300);

/// Debounce state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AggregatorState {
    /// No pending signals
    Idle,
    /// Signals collected; flush when `deadline` passes with no new signal
    Collecting {
        /// Time at which the pending set flushes
        deadline: Instant,
    },
}

/// Coalesces provider configuration-error signals
///
/// Pure state machine: `signal` records a provider name and pushes the
/// deadline out; `flush_due` returns the notification text once the
/// deadline has passed. Time is always passed in, never read internally.
#[derive(Debug)]
pub struct ErrorAggregator {
    state: AggregatorState,
    window: Duration,
    // Ordered, distinct display names seen since the last flush
    pending: Vec<String>,
}

impl ErrorAggregator {
    /// Create an aggregator with the given quiet window
    pub fn new(window: Duration) -> Self {
        Self {
            state: AggregatorState::Idle,
            window,
            pending: Vec::new(),
        }
    }

    /// Record a configuration-error signal for a provider
    ///
    /// Duplicate names within one window are kept once; every signal resets
    /// the debounce deadline.
    pub fn signal(&mut self, provider: impl Into<String>, now: Instant) {
        let provider = provider.into();
        if !self.pending.contains(&provider) {
            self.pending.push(provider);
        }
        self.state = AggregatorState::Collecting {
            deadline: now + self.window,
        };
    }

    /// Deadline of the current collecting window, if any
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            AggregatorState::Collecting { deadline } => Some(deadline),
            AggregatorState::Idle => None,
        }
    }

    /// Flush the pending set if the deadline has passed
    ///
    /// Returns the coalesced notification text and resets to `Idle`;
    /// returns `None` while the window is still open or nothing is pending.
    pub fn flush_due(&mut self, now: Instant) -> Option<String> {
        match self.state {
            AggregatorState::Collecting { deadline } if now >= deadline => {
                self.state = AggregatorState::Idle;
                let mut names = std::mem::take(&mut self.pending);
                // Concurrent requests settle in arbitrary order; list known
                // providers in slot order so the notification is stable.
                names.sort_by_key(|name| display_rank(name));
                Some(alert_text(&names))
            }
            _ => None,
        }
    }
}

impl Default for ErrorAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_ALERT_WINDOW)
    }
}

/// Join distinct provider names for display
///
/// One name stands alone; two are joined with `" & "`; three or more use
/// Oxford-comma style with `", & "` before the last.
///
/// # Examples
///
/// ```
/// use quadchat::session::alerts::join_provider_names;
///
/// assert_eq!(join_provider_names(&["ChatGPT".into()]), "ChatGPT");
/// assert_eq!(
///     join_provider_names(&["ChatGPT".into(), "Claude".into()]),
///     "ChatGPT & Claude"
/// );
/// assert_eq!(
///     join_provider_names(&["ChatGPT".into(), "Claude".into(), "Gemini".into()]),
///     "ChatGPT, Claude, & Gemini"
/// );
/// ```
pub fn join_provider_names(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [single] => single.clone(),
        [first, second] => format!("{} & {}", first, second),
        [head @ .., last] => format!("{}, & {}", head.join(", "), last),
    }
}

fn display_rank(name: &str) -> usize {
    crate::providers::ProviderFamily::ALL
        .iter()
        .position(|family| family.display_name() == name)
        .unwrap_or(usize::MAX)
}

fn alert_text(names: &[String]) -> String {
    format!(
        "{} not configured. Add API keys in settings to enable replies.",
        join_provider_names(names)
    )
}

/// Handle used to feed configuration-error signals to the aggregator task
#[derive(Clone)]
pub struct AggregatorHandle {
    tx: mpsc::UnboundedSender<String>,
}

impl AggregatorHandle {
    /// Report a configuration error for a provider display name
    pub fn report(&self, provider: impl Into<String>) {
        if self.tx.send(provider.into()).is_err() {
            tracing::debug!("aggregator signal dropped: task not running");
        }
    }
}

/// Spawn the aggregator driver task
///
/// The task collects signals from the returned handle and emits one
/// [`PanelEvent::Alert`] per quiet window. It exits when every handle is
/// dropped, flushing any pending set first.
pub fn spawn_aggregator(window: Duration, events: EventSink) -> AggregatorHandle {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        let mut aggregator = ErrorAggregator::new(window);
        loop {
            let deadline = aggregator.deadline();
            tokio::select! {
                signal = rx.recv() => match signal {
                    Some(provider) => {
                        tracing::debug!(provider = %provider, "configuration error signal");
                        aggregator.signal(provider, Instant::now());
                    }
                    None => {
                        // Senders gone; flush whatever is pending and stop.
                        if let Some(deadline) = aggregator.deadline() {
                            tokio::time::sleep_until(deadline).await;
                            if let Some(text) = aggregator.flush_due(Instant::now()) {
                                emit(&events, PanelEvent::Alert { text });
                            }
                        }
                        break;
                    }
                },
                _ = sleep_until_or_forever(deadline) => {
                    if let Some(text) = aggregator.flush_due(Instant::now()) {
                        emit(&events, PanelEvent::Alert { text });
                    }
                }
            }
        }
    });

    AggregatorHandle { tx }
}

async fn sleep_until_or_forever(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
