//! The session controller: the single owner of application state.
//!
//! Commands go in, events come out. Operations that await an external
//! collaborator (the language model, speech recognition) run on spawned
//! tasks whose completions re-enter the command loop, so navigation and
//! stop-speaking stay responsive while a turn is in flight.

use crate::language::Language;
use crate::llm::{prompts, LanguageModel};
use crate::session::state::{
    CaptureState, ChecklistItem, Message, OverlayTarget, PlaybackState, Reminder, Role,
    SessionState, Theme, View,
};
use crate::speech::{SpeechRecognizer, SpeechSynthesizer};
use crate::store::{self, keys, KeyValueStore};
use chrono::{NaiveDate, NaiveTime};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// How many recent messages accompany each model call.
pub const CONTEXT_WINDOW: usize = 6;

const VOICE_UNSUPPORTED_NOTICE: &str = "Voice input is not supported on this device.";
const REMINDER_VALIDATION_NOTICE: &str = "Please enter what, when, and what time.";
const DOCUMENT_APOLOGY: &str =
    "I'm sorry, I couldn't understand that document. Could you try taking a clearer photo?";

/// Commands accepted by the controller, from the presentation layer and
/// from the platform adapters.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    /// Choose the language during onboarding, or again after a reset.
    ChooseLanguage(Language),

    /// Switch to a view. Always cancels in-progress speech.
    Navigate(View),

    /// Feed a typed utterance into the conversational turn.
    SendText(String),

    /// Start a primary (conversational) capture session.
    StartListening,

    /// Start a dictation session targeting a form field.
    StartOverlayListening(OverlayTarget),

    /// Cancel speech synthesis.
    StopSpeaking,

    /// Explain an uploaded document or photo.
    ExplainDocument { data: Vec<u8>, mime_type: String },

    /// The policy-check flow: two free-text answers synthesized into a
    /// conversational turn.
    PolicyCheck { age: String, occupation: String },

    SetReminderText(String),
    SetReminderDate(String),
    SetReminderTime(String),
    AddReminder,
    DeleteReminder(Uuid),

    SetChecklistText(String),
    AddChecklistItem,
    ToggleChecklistItem(Uuid),
    DeleteChecklistItem(Uuid),

    ToggleTheme,

    /// Clear the stored language choice and return to the picker.
    ResetLanguage,

    /// Clear all durable storage and return to first-launch state.
    ResetAll,

    /// Synthesis lifecycle callbacks from the platform adapter.
    SpeakingStarted,
    SpeakingFinished,

    /// A capture session ended. Stale generations are dropped.
    TranscriptCaptured {
        generation: u64,
        transcript: Option<String>,
    },

    /// A conversational turn completed. `None` means the call failed.
    ReplyArrived {
        epoch: u64,
        reply: Option<String>,
    },

    /// A document explanation completed. `None` means the call failed.
    ExplanationArrived {
        epoch: u64,
        explanation: Option<String>,
    },

    /// Stop the command loop.
    Shutdown,
}

/// Events emitted toward the presentation layer.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    ViewChanged(View),
    LanguageChanged(Language),
    ThemeChanged(Theme),
    MessageAppended(Message),
    LoadingChanged(bool),
    CaptureChanged(CaptureState),
    SpeakingChanged(bool),
    RemindersChanged,
    ChecklistChanged,

    /// A blocking user notice (missing capability or failed validation).
    Notice(String),

    /// All durable state was cleared; re-read everything.
    Reset,

    Shutdown,
}

/// Cloneable handle for sending commands into the controller.
#[derive(Clone)]
pub struct SessionHandle {
    command_tx: UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    pub fn send(&self, command: SessionCommand) {
        let _ = self.command_tx.send(command);
    }

    /// Synthesis adapters report playback lifecycle through these.
    pub fn speaking_started(&self) {
        self.send(SessionCommand::SpeakingStarted);
    }

    pub fn speaking_finished(&self) {
        self.send(SessionCommand::SpeakingFinished);
    }
}

/// The four external collaborators the controller is built over.
pub struct SessionDeps {
    pub store: Box<dyn KeyValueStore>,
    pub model: Arc<dyn LanguageModel>,
    pub recognizer: Arc<dyn SpeechRecognizer>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
}

pub struct SessionController {
    state: SessionState,
    store: Box<dyn KeyValueStore>,
    model: Arc<dyn LanguageModel>,
    recognizer: Arc<dyn SpeechRecognizer>,
    synthesizer: Arc<dyn SpeechSynthesizer>,

    command_tx: UnboundedSender<SessionCommand>,
    command_rx: UnboundedReceiver<SessionCommand>,
    event_tx: UnboundedSender<SessionEvent>,

    /// Bumped whenever a capture session starts or is terminated; results
    /// from older sessions are dropped.
    capture_generation: u64,

    /// Bumped on full reset so completions issued before the reset cannot
    /// land in the fresh session.
    epoch: u64,

    /// Spawned completions not yet delivered back into the loop.
    in_flight: usize,
}

impl SessionController {
    /// Build the controller and rehydrate durable state.
    ///
    /// When a stored language exists the session starts on the dashboard,
    /// and if no messages are persisted the onboarding greeting is seeded
    /// and spoken.
    pub fn new(
        deps: SessionDeps,
    ) -> (Self, SessionHandle, UnboundedReceiver<SessionEvent>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let mut state = SessionState::first_launch();
        state.theme = deps
            .store
            .load(keys::THEME)
            .and_then(|t| Theme::from_str(&t))
            .unwrap_or(Theme::Light);
        state.reminders = store::load_json(deps.store.as_ref(), keys::REMINDERS);
        state.checklist = store::load_json(deps.store.as_ref(), keys::CHECKLIST);
        state.messages = store::load_json(deps.store.as_ref(), keys::MESSAGES);

        let stored_language = deps
            .store
            .load(keys::LANGUAGE)
            .and_then(|code| Language::from_code(&code));

        let mut controller = Self {
            state,
            store: deps.store,
            model: deps.model,
            recognizer: deps.recognizer,
            synthesizer: deps.synthesizer,
            command_tx: command_tx.clone(),
            command_rx,
            event_tx,
            capture_generation: 0,
            epoch: 0,
            in_flight: 0,
        };

        if let Some(language) = stored_language {
            controller.state.language = language;
            controller.state.language_chosen = true;
            controller.state.view = View::Dashboard;
            if controller.state.messages.is_empty() {
                controller.seed_greeting();
            }
        }

        (controller, SessionHandle { command_tx }, event_rx)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Run the command loop until `Shutdown` or all handles are dropped.
    pub async fn run(mut self) {
        info!("Session controller started");
        while let Some(command) = self.command_rx.recv().await {
            let stop = matches!(command, SessionCommand::Shutdown);
            self.handle(command);
            if stop {
                break;
            }
        }
        info!("Session controller stopped");
    }

    /// Drain queued commands and wait out in-flight background work.
    ///
    /// For tests and single-shot embeddings; long-lived hosts use [`run`].
    ///
    /// [`run`]: SessionController::run
    pub async fn settle(&mut self) {
        loop {
            match self.command_rx.try_recv() {
                Ok(command) => {
                    self.handle(command);
                    continue;
                }
                Err(mpsc::error::TryRecvError::Empty) => {}
                Err(mpsc::error::TryRecvError::Disconnected) => break,
            }
            if self.in_flight == 0 {
                break;
            }
            match self.command_rx.recv().await {
                Some(command) => self.handle(command),
                None => break,
            }
        }
    }

    /// Apply one command. Never awaits; slow work is spawned.
    pub fn handle(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::ChooseLanguage(language) => self.choose_language(language),
            SessionCommand::Navigate(view) => self.navigate(view),
            SessionCommand::SendText(text) => {
                let text = text.trim().to_string();
                if !text.is_empty() {
                    self.begin_turn(text);
                }
            }
            SessionCommand::StartListening => {
                self.start_listening(CaptureState::ListeningPrimary)
            }
            SessionCommand::StartOverlayListening(target) => {
                self.start_listening(CaptureState::ListeningOverlay(target))
            }
            SessionCommand::StopSpeaking => self.stop_speaking(),
            SessionCommand::ExplainDocument { data, mime_type } => {
                self.begin_document_explanation(data, mime_type)
            }
            SessionCommand::PolicyCheck { age, occupation } => {
                self.policy_check(&age, &occupation)
            }
            SessionCommand::SetReminderText(value) => self.state.reminder_text = value,
            SessionCommand::SetReminderDate(value) => self.state.reminder_date = value,
            SessionCommand::SetReminderTime(value) => self.state.reminder_time = value,
            SessionCommand::AddReminder => self.add_reminder(),
            SessionCommand::DeleteReminder(id) => {
                self.state.delete_reminder(id);
                self.persist_reminders();
                self.emit(SessionEvent::RemindersChanged);
            }
            SessionCommand::SetChecklistText(value) => self.state.checklist_text = value,
            SessionCommand::AddChecklistItem => self.add_checklist_item(),
            SessionCommand::ToggleChecklistItem(id) => {
                self.state.toggle_checklist_item(id);
                self.persist_checklist();
                self.emit(SessionEvent::ChecklistChanged);
            }
            SessionCommand::DeleteChecklistItem(id) => {
                self.state.delete_checklist_item(id);
                self.persist_checklist();
                self.emit(SessionEvent::ChecklistChanged);
            }
            SessionCommand::ToggleTheme => self.toggle_theme(),
            SessionCommand::ResetLanguage => self.reset_language(),
            SessionCommand::ResetAll => self.reset_all(),
            SessionCommand::SpeakingStarted => self.set_playback(PlaybackState::Speaking),
            SessionCommand::SpeakingFinished => self.set_playback(PlaybackState::Silent),
            SessionCommand::TranscriptCaptured {
                generation,
                transcript,
            } => self.finish_capture(generation, transcript),
            SessionCommand::ReplyArrived { epoch, reply } => self.finish_turn(epoch, reply),
            SessionCommand::ExplanationArrived { epoch, explanation } => {
                self.finish_document_explanation(epoch, explanation)
            }
            SessionCommand::Shutdown => self.emit(SessionEvent::Shutdown),
        }
    }

    // --- onboarding and navigation ---

    fn choose_language(&mut self, language: Language) {
        self.state.language = language;
        self.state.language_chosen = true;
        self.store.save(keys::LANGUAGE, language.code());
        self.emit(SessionEvent::LanguageChanged(language));
        self.navigate(View::Dashboard);
        self.seed_greeting();
    }

    /// Seed the message list with exactly the localized greeting and speak
    /// it.
    fn seed_greeting(&mut self) {
        let greeting = Message::new(Role::Assistant, self.state.language.greeting());
        self.state.messages = vec![greeting.clone()];
        self.persist_messages();
        self.emit(SessionEvent::MessageAppended(greeting));
        self.speak(self.state.language.greeting());
    }

    fn navigate(&mut self, view: View) {
        // Leaving any view cancels in-progress speech.
        self.stop_speaking();
        if self.state.view != view {
            self.state.view = view;
            self.emit(SessionEvent::ViewChanged(view));
        }
    }

    // --- conversational turns ---

    /// Phase 1 of a turn: append the user message unconditionally and kick
    /// off the model call. Phase 2 lands in [`finish_turn`].
    ///
    /// [`finish_turn`]: SessionController::finish_turn
    fn begin_turn(&mut self, text: String) {
        // The window covers the conversation before this utterance.
        let context = context_window(&self.state.messages);

        let message = Message::new(Role::User, text.clone());
        self.state.push_message(message.clone());
        self.persist_messages();
        self.emit(SessionEvent::MessageAppended(message));
        self.set_loading(true);

        let model = Arc::clone(&self.model);
        let language = self.state.language;
        let epoch = self.epoch;
        let command_tx = self.command_tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let reply = match model.generate_reply(&text, language, &context).await {
                Ok(reply) => Some(reply),
                Err(e) => {
                    warn!("Reply generation failed, dropping turn: {}", e);
                    None
                }
            };
            let _ = command_tx.send(SessionCommand::ReplyArrived { epoch, reply });
        });
    }

    fn finish_turn(&mut self, epoch: u64, reply: Option<String>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if epoch != self.epoch {
            debug!("Dropping reply from before a reset");
            return;
        }
        self.set_loading(false);

        // A failed turn is dropped without a user-visible trace.
        let Some(reply) = reply else { return };

        let message = Message::new(Role::Assistant, reply.clone());
        self.state.push_message(message.clone());
        self.persist_messages();
        self.emit(SessionEvent::MessageAppended(message));
        self.speak(&reply);
    }

    fn policy_check(&mut self, age: &str, occupation: &str) {
        self.navigate(View::Dashboard);
        let age = age.trim();
        let occupation = occupation.trim();
        if age.is_empty() || occupation.is_empty() {
            return;
        }
        self.begin_turn(prompts::policy_check_utterance(age, occupation));
    }

    // --- document explanation ---

    fn begin_document_explanation(&mut self, data: Vec<u8>, mime_type: String) {
        self.navigate(View::Dashboard);
        self.set_loading(true);

        let model = Arc::clone(&self.model);
        let language = self.state.language;
        let epoch = self.epoch;
        let command_tx = self.command_tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let explanation = match model.explain_document(&data, &mime_type, language).await {
                Ok(text) => Some(text),
                Err(e) => {
                    warn!("Document explanation failed: {}", e);
                    None
                }
            };
            let _ = command_tx.send(SessionCommand::ExplanationArrived { epoch, explanation });
        });
    }

    fn finish_document_explanation(&mut self, epoch: u64, explanation: Option<String>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if epoch != self.epoch {
            debug!("Dropping explanation from before a reset");
            return;
        }
        self.set_loading(false);

        // Unlike a failed turn, a failed explanation is always surfaced.
        let text = explanation.unwrap_or_else(|| DOCUMENT_APOLOGY.to_string());
        let message = Message::new(Role::Assistant, text.clone());
        self.state.push_message(message.clone());
        self.persist_messages();
        self.emit(SessionEvent::MessageAppended(message));
        self.speak(&text);
    }

    // --- voice capture ---

    fn start_listening(&mut self, target: CaptureState) {
        if !self.recognizer.is_available() {
            self.emit(SessionEvent::Notice(VOICE_UNSUPPORTED_NOTICE.to_string()));
            return;
        }
        // Capturing while the assistant is speaking would feed it its own
        // voice.
        if target == CaptureState::ListeningPrimary
            && self.state.playback == PlaybackState::Speaking
        {
            self.stop_speaking();
        }

        // A new session supersedes any prior one.
        self.capture_generation += 1;
        let generation = self.capture_generation;
        self.set_capture(target);

        let recognizer = Arc::clone(&self.recognizer);
        let language = self.state.language;
        let command_tx = self.command_tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let transcript = recognizer.listen(language).await;
            let _ = command_tx.send(SessionCommand::TranscriptCaptured {
                generation,
                transcript,
            });
        });
    }

    fn finish_capture(&mut self, generation: u64, transcript: Option<String>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if generation != self.capture_generation {
            debug!("Dropping superseded capture result");
            return;
        }
        let target = self.state.capture;
        self.set_capture(CaptureState::Idle);

        // Recognition ending without a result is a quiet no-op.
        let Some(transcript) = transcript else { return };

        match target {
            CaptureState::Idle => {}
            CaptureState::ListeningPrimary => self.begin_turn(transcript),
            CaptureState::ListeningOverlay(OverlayTarget::Reminder) => {
                self.state.reminder_text = transcript;
            }
            CaptureState::ListeningOverlay(OverlayTarget::Checklist) => {
                self.state.checklist_text = transcript;
            }
        }
    }

    // --- speech playback ---

    /// Start playback, last-write-wins. An active primary capture session
    /// is terminated first.
    fn speak(&mut self, text: &str) {
        if self.state.capture == CaptureState::ListeningPrimary {
            self.capture_generation += 1;
            self.set_capture(CaptureState::Idle);
        }
        self.synthesizer.cancel();
        self.synthesizer.speak(text, self.state.language);
    }

    fn stop_speaking(&mut self) {
        self.synthesizer.cancel();
        self.set_playback(PlaybackState::Silent);
    }

    // --- reminders and checklist ---

    fn add_reminder(&mut self) {
        let date = self.state.reminder_date.trim().to_string();
        let time = self.state.reminder_time.trim().to_string();
        if self.state.reminder_text.trim().is_empty() || date.is_empty() || time.is_empty() {
            self.emit(SessionEvent::Notice(REMINDER_VALIDATION_NOTICE.to_string()));
            return;
        }

        let timestamp = match (
            NaiveDate::parse_from_str(&date, "%Y-%m-%d"),
            NaiveTime::parse_from_str(&time, "%H:%M"),
        ) {
            (Ok(d), Ok(t)) => d.and_time(t).and_utc().timestamp_millis(),
            _ => {
                self.emit(SessionEvent::Notice(REMINDER_VALIDATION_NOTICE.to_string()));
                return;
            }
        };

        let reminder = Reminder {
            id: Uuid::new_v4(),
            text: self.state.reminder_text.clone(),
            date,
            time,
            timestamp,
            confirmed: true,
        };
        self.state.prepend_reminder(reminder);
        self.persist_reminders();
        self.state.clear_reminder_draft();
        self.emit(SessionEvent::RemindersChanged);
    }

    fn add_checklist_item(&mut self) {
        if self.state.checklist_text.trim().is_empty() {
            return;
        }
        let item = ChecklistItem {
            id: Uuid::new_v4(),
            text: self.state.checklist_text.clone(),
            completed: false,
        };
        self.state.prepend_checklist_item(item);
        self.persist_checklist();
        self.state.checklist_text.clear();
        self.emit(SessionEvent::ChecklistChanged);
    }

    // --- settings ---

    fn toggle_theme(&mut self) {
        self.state.theme = self.state.theme.toggled();
        self.store.save(keys::THEME, self.state.theme.as_str());
        self.emit(SessionEvent::ThemeChanged(self.state.theme));
    }

    fn reset_language(&mut self) {
        self.store.remove(keys::LANGUAGE);
        self.state.language_chosen = false;
        self.navigate(View::LanguagePicker);
    }

    fn reset_all(&mut self) {
        self.synthesizer.cancel();
        self.store.clear();
        // Invalidate anything still in flight from the old session.
        self.capture_generation += 1;
        self.epoch += 1;
        self.state = SessionState::first_launch();
        self.emit(SessionEvent::Reset);
    }

    // --- plumbing ---

    fn set_loading(&mut self, loading: bool) {
        if self.state.loading != loading {
            self.state.loading = loading;
            self.emit(SessionEvent::LoadingChanged(loading));
        }
    }

    fn set_capture(&mut self, capture: CaptureState) {
        if self.state.capture != capture {
            self.state.capture = capture;
            self.emit(SessionEvent::CaptureChanged(capture));
        }
    }

    fn set_playback(&mut self, playback: PlaybackState) {
        if self.state.playback != playback {
            self.state.playback = playback;
            self.emit(SessionEvent::SpeakingChanged(
                playback == PlaybackState::Speaking,
            ));
        }
    }

    fn persist_messages(&mut self) {
        store::save_json(self.store.as_mut(), keys::MESSAGES, &self.state.messages);
    }

    fn persist_reminders(&mut self) {
        store::save_json(self.store.as_mut(), keys::REMINDERS, &self.state.reminders);
    }

    fn persist_checklist(&mut self) {
        store::save_json(self.store.as_mut(), keys::CHECKLIST, &self.state.checklist);
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.event_tx.send(event);
    }
}

/// Serialize the most recent messages as `role: text` lines, oldest first.
fn context_window(messages: &[Message]) -> String {
    let start = messages.len().saturating_sub(CONTEXT_WINDOW);
    messages[start..]
        .iter()
        .map(|m| format!("{}: {}", m.role.as_str(), m.text))
        .collect::<Vec<_>>()
        .join("\n")
}
