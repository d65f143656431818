//! Session state: the persisted collections, the transient flags, and the
//! pure mutations over them.

use crate::language::Language;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single chat message. Immutable once created; ordering is insertion
/// order, which the timestamp mirrors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A dated reminder. `timestamp` is the epoch-millisecond instant of
/// `date` combined with `time`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    pub id: Uuid,
    pub text: String,
    pub date: String,
    pub time: String,
    pub timestamp: i64,
    pub confirmed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: Uuid,
    pub text: String,
    pub completed: bool,
}

/// The five application views. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    LanguagePicker,
    Dashboard,
    Documents,
    Reminders,
    Checklist,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(&self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn from_str(s: &str) -> Option<Theme> {
        match s {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

/// Which form field an overlay dictation session targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayTarget {
    Reminder,
    Checklist,
}

/// Voice capture state, independent of the active view. At most one
/// listening session is active; a new one supersedes the old.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    ListeningPrimary,
    ListeningOverlay(OverlayTarget),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Silent,
    Speaking,
}

/// All mutable session state, exclusively owned by the controller.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub view: View,
    pub language: Language,
    /// Whether a language has been explicitly chosen (stored), as opposed
    /// to the pre-onboarding default.
    pub language_chosen: bool,
    pub theme: Theme,
    pub capture: CaptureState,
    pub playback: PlaybackState,
    pub loading: bool,

    pub messages: Vec<Message>,
    pub reminders: Vec<Reminder>,
    pub checklist: Vec<ChecklistItem>,

    // Transient form drafts, cleared on submit.
    pub reminder_text: String,
    pub reminder_date: String,
    pub reminder_time: String,
    pub checklist_text: String,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::first_launch()
    }
}

impl SessionState {
    /// The state of a fresh install: language picker, light theme, nothing
    /// persisted yet.
    pub fn first_launch() -> Self {
        Self {
            view: View::LanguagePicker,
            language: Language::default(),
            language_chosen: false,
            theme: Theme::Light,
            capture: CaptureState::Idle,
            playback: PlaybackState::Silent,
            loading: false,
            messages: Vec::new(),
            reminders: Vec::new(),
            checklist: Vec::new(),
            reminder_text: String::new(),
            reminder_date: String::new(),
            reminder_time: String::new(),
            checklist_text: String::new(),
        }
    }

    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Newest reminders first.
    pub fn prepend_reminder(&mut self, reminder: Reminder) {
        self.reminders.insert(0, reminder);
    }

    pub fn delete_reminder(&mut self, id: Uuid) {
        self.reminders.retain(|r| r.id != id);
    }

    pub fn prepend_checklist_item(&mut self, item: ChecklistItem) {
        self.checklist.insert(0, item);
    }

    pub fn delete_checklist_item(&mut self, id: Uuid) {
        self.checklist.retain(|i| i.id != id);
    }

    /// Flip `completed` on the matching item; other items are untouched.
    pub fn toggle_checklist_item(&mut self, id: Uuid) {
        if let Some(item) = self.checklist.iter_mut().find(|i| i.id == id) {
            item.completed = !item.completed;
        }
    }

    pub fn clear_reminder_draft(&mut self) {
        self.reminder_text.clear();
        self.reminder_date.clear();
        self.reminder_time.clear();
    }
}
