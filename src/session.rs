//! Chat session and turn handling
//!
//! `ChatSession` owns everything that changes during a conversation: the
//! transcript, the chart panel and the typing indicator. It is only
//! mutated through turn submission.
//!
//! `SessionController` drives a session in real time: each submitted
//! message schedules one delayed reply, and closing the controller
//! cancels whatever is still pending.

use crate::chart::{ChartState, ChartView};
use crate::classifier;
use crate::config::TypingConfig;
use crate::error::AdvisorError;
use crate::intents::Intent;
use crate::knowledge;
use crate::transcript::{ChatMessage, Transcript};
use crate::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

/// How long the assistant "types" before replying to a message of
/// `message_len` characters.
pub fn response_delay<R: Rng + ?Sized>(
    message_len: usize,
    typing: &TypingConfig,
    rng: &mut R,
) -> Duration {
    if !typing.enabled {
        return Duration::ZERO;
    }

    let chars = u32::try_from(message_len).unwrap_or(u32::MAX);
    let variable = typing.per_char.saturating_mul(chars).min(typing.variable_cap);

    let jitter_ms = typing.jitter.as_millis() as u64;
    let jitter = if jitter_ms > 0 {
        Duration::from_millis(rng.gen_range(0..jitter_ms))
    } else {
        Duration::ZERO
    };

    typing.base + variable + jitter
}

//
// ================= Session State =================
//

/// Result of one completed turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub intent: Intent,
    pub reply: ChatMessage,
    pub chart: ChartState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_view: Option<ChartView>,
}

/// Serializable view of a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub messages: Vec<ChatMessage>,
    pub chart: ChartState,
    pub is_typing: bool,
}

#[derive(Debug)]
pub struct ChatSession {
    id: Uuid,
    transcript: Transcript,
    chart: ChartState,
    typing: bool,
    greeted: bool,
    /// User message awaiting its reply
    pending: Option<Uuid>,
    closed: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    pub fn with_id(id: Uuid) -> Self {
        Self {
            id,
            transcript: Transcript::new(),
            chart: ChartState::default(),
            typing: false,
            greeted: false,
            pending: None,
            closed: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn chart(&self) -> ChartState {
        self.chart
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Post the opening greeting once
    pub fn greet(&mut self) -> Option<ChatMessage> {
        if self.greeted || self.closed {
            return None;
        }
        self.greeted = true;

        let message = ChatMessage::assistant(knowledge::GREETING);
        self.transcript.push(message.clone());
        Some(message)
    }

    /// Record the user's message and mark a reply as pending
    pub fn begin_turn(&mut self, text: &str) -> Result<ChatMessage> {
        if self.closed {
            return Err(AdvisorError::SessionClosed);
        }
        if text.trim().is_empty() {
            return Err(AdvisorError::EmptyMessage);
        }
        if self.typing {
            return Err(AdvisorError::TurnInFlight);
        }

        let message = ChatMessage::user(text);
        self.transcript.push(message.clone());
        self.typing = true;
        self.pending = Some(message.id);
        Ok(message)
    }

    /// Everything in the transcript except the user message being answered
    fn history_before_reply(&self) -> Vec<ChatMessage> {
        self.transcript
            .messages()
            .iter()
            .filter(|m| Some(m.id) != self.pending)
            .cloned()
            .collect()
    }

    /// Produce the reply for the pending turn
    pub fn complete_turn(&mut self, text: &str) -> TurnOutcome {
        let prior = self.history_before_reply();
        let answer = classifier::answer(text, &prior);

        self.chart.apply_turn(text, &answer.text);

        let reply = ChatMessage::assistant(answer.text);
        self.transcript.push(reply.clone());
        self.typing = false;
        self.pending = None;

        TurnOutcome {
            intent: answer.intent,
            reply,
            chart: self.chart,
            chart_view: self.chart.view(),
        }
    }

    /// Drop a pending turn without replying
    pub fn abandon_turn(&mut self) {
        self.typing = false;
        self.pending = None;
    }

    /// No greeting, turn or reply is accepted after this
    pub fn close(&mut self) {
        self.abandon_turn();
        self.closed = true;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            messages: self.transcript.messages().to_vec(),
            chart: self.chart,
            is_typing: self.typing,
        }
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

//
// ================= Controller =================
//

#[derive(Default)]
struct Timers {
    greeting: Option<JoinHandle<()>>,
    reply: Option<JoinHandle<()>>,
}

impl Timers {
    fn abort_all(&mut self) {
        for handle in [self.greeting.take(), self.reply.take()].into_iter().flatten() {
            handle.abort();
        }
    }
}

/// Drives one session with real delays
pub struct SessionController {
    session: Arc<Mutex<ChatSession>>,
    typing: TypingConfig,
    timers: std::sync::Mutex<Timers>,
    closed: AtomicBool,
    started: Instant,
    /// Milliseconds after `started` of the last submit or snapshot
    last_active_ms: AtomicU64,
}

impl SessionController {
    pub fn new(typing: TypingConfig) -> Self {
        Self::with_session(ChatSession::new(), typing)
    }

    pub fn with_session(session: ChatSession, typing: TypingConfig) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            typing,
            timers: std::sync::Mutex::new(Timers::default()),
            closed: AtomicBool::new(false),
            started: Instant::now(),
            last_active_ms: AtomicU64::new(0),
        }
    }

    /// Start the session: the greeting arrives after a short pause
    pub fn open(&self) -> Result<()> {
        self.ensure_open()?;

        let delay = if self.typing.enabled {
            self.typing.greeting_delay
        } else {
            Duration::ZERO
        };
        let session = Arc::clone(&self.session);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut session = session.lock().await;
            if session.greet().is_some() {
                info!(session_id = %session.id(), "Greeting sent");
            }
        });

        self.store_timer(|timers| timers.greeting = Some(handle));
        Ok(())
    }

    /// Submit a user message. The reply is delivered on the returned
    /// channel once the typing delay has elapsed.
    pub async fn submit(&self, text: &str) -> Result<oneshot::Receiver<TurnOutcome>> {
        self.ensure_open()?;
        self.touch();

        {
            let mut session = self.session.lock().await;
            session.begin_turn(text)?;
        }

        let delay = {
            let mut rng = rand::thread_rng();
            response_delay(text.chars().count(), &self.typing, &mut rng)
        };
        debug!(delay_ms = delay.as_millis() as u64, "Reply scheduled");

        let (tx, rx) = oneshot::channel();
        let session = Arc::clone(&self.session);
        let text = text.to_string();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let outcome = {
                let mut session = session.lock().await;
                // close() may have run before this timer was stored
                if session.is_closed() {
                    debug!("Reply dropped, session closed");
                    return;
                }
                session.complete_turn(&text)
            };
            info!(intent = ?outcome.intent, "Turn completed");
            let _ = tx.send(outcome);
        });

        self.store_timer(|timers| timers.reply = Some(handle));
        if self.is_closed() {
            self.store_timer(Timers::abort_all);
        }
        Ok(rx)
    }

    /// Submit and wait for the reply
    pub async fn submit_and_wait(&self, text: &str) -> Result<TurnOutcome> {
        let rx = self.submit(text).await?;
        rx.await.map_err(|_| AdvisorError::SessionClosed)
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.touch();
        self.session.lock().await.snapshot()
    }

    pub async fn is_typing(&self) -> bool {
        self.session.lock().await.is_typing()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Time since the last submit or snapshot
    pub fn idle_for(&self) -> Duration {
        let last = Duration::from_millis(self.last_active_ms.load(Ordering::Relaxed));
        self.started.elapsed().saturating_sub(last)
    }

    /// Cancel pending timers. Further submits fail with `SessionClosed`.
    pub async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.store_timer(Timers::abort_all);
        self.session.lock().await.close();
        info!("Session closed");
    }

    fn touch(&self) {
        let elapsed = self.started.elapsed().as_millis();
        self.last_active_ms
            .store(u64::try_from(elapsed).unwrap_or(u64::MAX), Ordering::Relaxed);
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            Err(AdvisorError::SessionClosed)
        } else {
            Ok(())
        }
    }

    fn store_timer<F: FnOnce(&mut Timers)>(&self, f: F) {
        match self.timers.lock() {
            Ok(mut timers) => f(&mut *timers),
            Err(poisoned) => {
                let mut timers = poisoned.into_inner();
                f(&mut *timers)
            }
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.store_timer(Timers::abort_all);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RiskLevel;
    use crate::transcript::Role;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_response_delay_bounds() {
        let typing = TypingConfig::default();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..50 {
            let short = response_delay(0, &typing, &mut rng);
            assert!(short >= Duration::from_millis(1000) && short < Duration::from_millis(1500));

            let medium = response_delay(10, &typing, &mut rng);
            assert!(medium >= Duration::from_millis(1200) && medium < Duration::from_millis(1700));

            let long = response_delay(5_000, &typing, &mut rng);
            assert!(long >= Duration::from_millis(3000) && long < Duration::from_millis(3500));
        }

        assert_eq!(
            response_delay(100, &TypingConfig::instant(), &mut rng),
            Duration::ZERO
        );
    }

    #[test]
    fn test_turn_lifecycle() {
        let mut session = ChatSession::new();
        assert!(session.greet().is_some());
        assert!(session.greet().is_none());

        session.begin_turn("tell me about etfs").unwrap();
        assert!(session.is_typing());
        assert!(matches!(
            session.begin_turn("another one"),
            Err(AdvisorError::TurnInFlight)
        ));

        let outcome = session.complete_turn("tell me about etfs");
        assert_eq!(outcome.intent, Intent::Etfs);
        assert_eq!(outcome.reply.content, knowledge::ETFS);
        assert!(!session.is_typing());
        assert_eq!(session.transcript().len(), 3);
    }

    #[test]
    fn test_blank_message_rejected() {
        let mut session = ChatSession::new();
        assert!(matches!(session.begin_turn("   "), Err(AdvisorError::EmptyMessage)));
        assert!(session.transcript().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_controller_greets_then_replies() {
        let controller = SessionController::new(TypingConfig::default());
        controller.open().unwrap();

        tokio::time::sleep(Duration::from_millis(1001)).await;
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.messages.len(), 1);
        assert_eq!(snapshot.messages[0].content, knowledge::GREETING);

        let outcome = controller.submit_and_wait("who created this").await.unwrap();
        assert_eq!(outcome.intent, Intent::Creator);
        assert!(!controller.is_typing().await);
        assert_eq!(controller.snapshot().await.messages.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_submit_rejected() {
        let controller = SessionController::new(TypingConfig::default());

        let pending = controller.submit("what are bonds").await.unwrap();
        let second = controller.submit("what are stocks").await;
        assert!(matches!(second, Err(AdvisorError::TurnInFlight)));

        let outcome = pending.await.unwrap();
        assert_eq!(outcome.reply.content, knowledge::BONDS);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_cancels_pending_reply() {
        let controller = SessionController::new(TypingConfig::default());

        let pending = controller.submit("what are bonds").await.unwrap();
        controller.close().await;

        assert!(pending.await.is_err());
        tokio::time::sleep(Duration::from_secs(5)).await;

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.messages.len(), 1);
        assert!(!snapshot.is_typing);
        assert!(matches!(
            controller.submit("hello").await,
            Err(AdvisorError::SessionClosed)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_racing_submit_delivers_nothing() {
        let controller = Arc::new(SessionController::new(TypingConfig::default()));

        // Hold the session so submit and close queue up behind it
        let guard = controller.session.lock().await;

        let submitter = Arc::clone(&controller);
        let submit = tokio::spawn(async move { submitter.submit("what are bonds").await });
        tokio::task::yield_now().await;

        let closer = Arc::clone(&controller);
        let close = tokio::spawn(async move { closer.close().await });
        tokio::task::yield_now().await;

        drop(guard);
        close.await.unwrap();

        let delivered = match submit.await.unwrap() {
            Ok(pending) => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                pending.await.is_ok()
            }
            Err(e) => {
                assert!(matches!(e, AdvisorError::SessionClosed));
                false
            }
        };
        assert!(!delivered);

        let snapshot = controller.snapshot().await;
        assert!(snapshot.messages.iter().all(|m| m.role == Role::User));
        assert!(!snapshot.is_typing);
    }

    #[test]
    fn test_closed_session_refuses_turns_and_greeting() {
        let mut session = ChatSession::new();
        session.close();
        assert!(session.greet().is_none());
        assert!(matches!(
            session.begin_turn("what are bonds"),
            Err(AdvisorError::SessionClosed)
        ));
    }

    #[test]
    fn test_greeting_mid_turn_stays_in_history() {
        let mut session = ChatSession::new();
        session.begin_turn("what is my risk tolerance").unwrap();
        session.greet();

        let prior = session.history_before_reply();
        assert_eq!(prior.len(), 1);
        assert_eq!(prior[0].content, knowledge::GREETING);

        let outcome = session.complete_turn("what is my risk tolerance");
        assert_eq!(outcome.reply.content, knowledge::RISK_ASSESSMENT);
        assert_eq!(session.transcript().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_time_resets_on_activity() {
        let controller = SessionController::new(TypingConfig::instant());

        tokio::time::sleep(Duration::from_secs(90)).await;
        assert!(controller.idle_for() >= Duration::from_secs(90));

        controller.submit_and_wait("what are bonds").await.unwrap();
        assert!(controller.idle_for() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_chart_scenario() {
        let controller = SessionController::new(TypingConfig::instant());

        let first = controller
            .submit_and_wait("display graph of the aggressive mix")
            .await
            .unwrap();
        assert_eq!(first.chart.current, Some(RiskLevel::Aggressive));

        let second = controller
            .submit_and_wait("what are bonds")
            .await
            .unwrap();
        assert!(!second.chart.visible);

        let third = controller
            .submit_and_wait("show me a graph of the aggressive portfolio")
            .await
            .unwrap();
        assert!(third.chart.visible);
        assert!(third.chart_view.is_some());
    }
}
