//! The companion agent loop.
//!
//! One instance per conversation. Each call to
//! [`CompanionAgent::process_message`] is one turn:
//!
//! 1. face goes idle while the turn is processed
//! 2. the utterance is appended to the window
//! 3. the backend is asked (directly, or through the tool loop when tools
//!    are attached)
//! 4. on success the reply is appended, facts are extracted and the
//!    context is trimmed
//! 5. face goes to talking and the reply is returned
//!
//! A backend failure never escapes a turn: the fixed fallback line is
//! returned instead and no assistant turn is recorded.

use crate::dispatch::ToolLoop;
use crate::events::{EventSink, TurnEvent};
use crate::extractor;
use crate::idle::{self, IdlePolicy};
use crate::profile::SamplingProfile;
use crate::protocol;
use lucy_config::AppConfig;
use lucy_core::error::ProviderError;
use lucy_core::face::{FaceNotifier, FaceState, NoopFace};
use lucy_core::message::{Role, Turn};
use lucy_core::provider::Provider;
use lucy_core::tool::ToolRegistry;
use lucy_memory::facts::{EMPTY_SUMMARY, FactStore};
use lucy_memory::transcript::Session;
use lucy_memory::window::ConversationWindow;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Returned to the user whenever the backend fails.
pub const FALLBACK_REPLY: &str =
    "Oops, I'm having trouble thinking right now. Can you say that again? 😅";

pub const GREETING_PROMPT: &str = "Say hello and introduce yourself briefly!";
pub const FAREWELL_PROMPT: &str = "Say goodbye briefly!";

/// Context bound: once it holds more than this many turns it is trimmed.
pub const MAX_CONTEXT: usize = 20;
/// Turns kept after the system prompt when trimming.
pub const KEEP_TAIL: usize = 18;

pub struct CompanionAgent {
    provider: Arc<dyn Provider>,
    model: String,
    system_prompt: String,
    memory_note: Option<String>,
    profile: SamplingProfile,
    tools: Option<(Arc<ToolRegistry>, usize)>,
    facts: FactStore,
    window: ConversationWindow,
    session: Session,
    face: Arc<dyn FaceNotifier>,
    events: EventSink,
    idle: IdlePolicy,
    last_interaction: Instant,
}

impl CompanionAgent {
    /// Build an agent. The memory summary is read from `facts` once, here.
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        system_prompt: impl Into<String>,
        facts: FactStore,
        session: Session,
    ) -> Self {
        let summary = facts.summary();
        let memory_note =
            (summary != EMPTY_SUMMARY).then(|| format!("[Memory] You remember: {summary}"));

        let mut agent = Self {
            provider,
            model: model.into(),
            system_prompt: system_prompt.into(),
            memory_note,
            profile: SamplingProfile::CHAT,
            tools: None,
            facts,
            window: ConversationWindow::new(),
            session,
            face: Arc::new(NoopFace),
            events: EventSink::none(),
            idle: IdlePolicy::default(),
            last_interaction: Instant::now(),
        };
        agent.reset_window();
        agent
    }

    /// Build an agent from configuration: persistent facts, transcripts
    /// under the memory directory, the configured prompt and model.
    pub fn from_config(config: &AppConfig, provider: Arc<dyn Provider>) -> Self {
        Self::new(
            provider,
            config.chat_model.clone(),
            config.system_prompt(),
            FactStore::open(config.facts_path()),
            Session::start(config.conversations_dir()),
        )
    }

    /// Route turns through the tool loop. Call before the first turn: the
    /// system prompt is rebuilt to list the tools.
    pub fn with_tools(mut self, tools: Arc<ToolRegistry>, max_iterations: usize) -> Self {
        self.tools = Some((tools, max_iterations));
        self.reset_window();
        self
    }

    pub fn with_profile(mut self, profile: SamplingProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_face(mut self, face: Arc<dyn FaceNotifier>) -> Self {
        self.face = face;
        self
    }

    pub fn with_events(mut self, events: EventSink) -> Self {
        self.events = events;
        self
    }

    pub fn with_idle_policy(mut self, idle: IdlePolicy) -> Self {
        self.idle = idle;
        self
    }

    fn system_turn(&self) -> Turn {
        match &self.tools {
            Some((tools, _)) => Turn::system(format!(
                "{}\n\n{}\n{}",
                self.system_prompt,
                tools.describe(),
                protocol::protocol_instructions()
            )),
            None => Turn::system(self.system_prompt.clone()),
        }
    }

    fn reset_window(&mut self) {
        let mut preamble = vec![self.system_turn()];
        if let Some(note) = &self.memory_note {
            preamble.push(Turn::system(note.clone()));
        }
        self.window = ConversationWindow::new().with_preamble(preamble);
    }

    /// Process one utterance and return the reply to speak.
    pub async fn process_message(&mut self, utterance: &str) -> String {
        self.face.set(FaceState::IDLE).await;
        self.window.append(Role::User, utterance);

        let reply = match self.respond().await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Backend call failed, using fallback reply");
                self.events.emit(TurnEvent::Error { content: FALLBACK_REPLY.into() });
                self.face.set(FaceState::TALKING).await;
                return FALLBACK_REPLY.to_string();
            }
        };

        if extractor::is_triggered(utterance) {
            for fact in extractor::extract(utterance, &reply) {
                let mentions = self.facts.remember(fact.category, fact.key, &fact.value);
                self.session.record_fact();
                info!(category = fact.category, key = fact.key, mentions, "Learned a fact");
            }
        }

        if self.window.trim_to(self.system_turn(), MAX_CONTEXT, KEEP_TAIL) {
            debug!("Context trimmed");
        }

        self.last_interaction = Instant::now();
        self.face.set(FaceState::TALKING).await;
        reply
    }

    /// Ask the backend and record the reply; tool flows go through the loop.
    async fn respond(&mut self) -> Result<String, ProviderError> {
        if let Some((tools, max_iterations)) = &self.tools {
            let result = ToolLoop::new(self.provider.clone(), tools.clone(), self.model.clone())
                .with_profile(self.profile)
                .with_max_iterations(*max_iterations)
                .with_events(self.events.clone())
                .run(&mut self.window)
                .await?;

            let text = result.outcome.text();
            if !result.outcome.is_error() {
                self.events.emit(TurnEvent::Assistant { content: text.clone() });
            }
            return Ok(text);
        }

        self.events.emit(TurnEvent::Thinking);
        let request = self.profile.request(&self.model, self.window.turns().to_vec());
        let reply = self.provider.complete(request).await?.content;
        if reply.trim().is_empty() {
            return Err(ProviderError::MalformedResponse("Empty reply".into()));
        }
        self.window.append(Role::Assistant, &reply);
        self.events.emit(TurnEvent::Assistant { content: reply.clone() });
        Ok(reply)
    }

    /// A one-shot reply to `prompt` that leaves the history untouched.
    async fn one_shot(&self, prompt: &str) -> String {
        let mut messages = self.window.turns().to_vec();
        messages.push(Turn::user(prompt));
        let request = self.profile.request(&self.model, messages);

        let reply = match self.provider.complete(request).await {
            Ok(response) => response.content,
            Err(e) => {
                warn!(error = %e, "Backend call failed, using fallback reply");
                FALLBACK_REPLY.to_string()
            }
        };
        self.face.set(FaceState::TALKING).await;
        reply
    }

    pub async fn greet(&self) -> String {
        self.one_shot(GREETING_PROMPT).await
    }

    pub async fn farewell(&self) -> String {
        self.one_shot(FAREWELL_PROMPT).await
    }

    /// Whether to say something unprompted right now.
    pub fn should_speak_up(&self) -> bool {
        self.idle.should_speak_up(self.last_interaction.elapsed())
    }

    pub fn idle_thought(&self) -> &'static str {
        idle::idle_thought()
    }

    /// Restart the idle clock, e.g. after speaking an idle thought.
    pub fn touch(&mut self) {
        self.last_interaction = Instant::now();
    }

    /// Flush the transcript. Only the first call writes anything.
    pub fn end(&mut self) -> Option<PathBuf> {
        self.session.end(self.window.log())
    }

    pub fn facts(&self) -> &FactStore {
        &self.facts
    }

    pub fn window(&self) -> &ConversationWindow {
        &self.window
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}
