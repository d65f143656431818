pub mod controller;
pub mod state;

pub use controller::{
    SessionCommand, SessionController, SessionDeps, SessionEvent, SessionHandle,
};
pub use state::{
    CaptureState, ChecklistItem, Message, OverlayTarget, PlaybackState, Reminder, Role,
    SessionState, Theme, View,
};
