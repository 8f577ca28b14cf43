//! Session state: conversation, translation, share flow, screen machine.
//!
//! The model is owned by the core and only ever mutated inside
//! `App::update`; the shell reads a [`crate::ViewModel`] built from it.

use serde::{Deserialize, Serialize};

use crate::capabilities::InFlight;
use crate::config::ServiceConfig;

/// Fixed language set offered by the translation screen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Lang {
    EnUs,
    Es,
    Fr,
    De,
    Ta,
    Hi,
    Zh,
    Ar,
    Ja,
    Ko,
}

impl Lang {
    pub const ALL: [Self; 10] = [
        Self::EnUs,
        Self::Es,
        Self::Fr,
        Self::De,
        Self::Ta,
        Self::Hi,
        Self::Zh,
        Self::Ar,
        Self::Ja,
        Self::Ko,
    ];

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::EnUs => "en-US",
            Self::Es => "es",
            Self::Fr => "fr",
            Self::De => "de",
            Self::Ta => "ta",
            Self::Hi => "hi",
            Self::Zh => "zh",
            Self::Ar => "ar",
            Self::Ja => "ja",
            Self::Ko => "ko",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::EnUs => "English (US)",
            Self::Es => "Spanish",
            Self::Fr => "French",
            Self::De => "German",
            Self::Ta => "Tamil",
            Self::Hi => "Hindi",
            Self::Zh => "Chinese",
            Self::Ar => "Arabic",
            Self::Ja => "Japanese",
            Self::Ko => "Korean",
        }
    }

    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|lang| lang.code() == code)
    }
}

/// Monotonic correlation id for chat/translate requests. Completions
/// carrying a stale id are discarded instead of being applied to state the
/// request no longer belongs to.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

impl RequestId {
    pub fn advance(&mut self) -> Self {
        self.0 += 1;
        *self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// Ordered, append-only conversation log plus the single-in-flight chat
/// request state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationState {
    pub messages: Vec<Message>,
    pub pending: bool,
    pub model_id: Option<String>,
    pub req: RequestId,
}

impl ConversationState {
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message {
            role: Role::User,
            content: content.into(),
        });
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message {
            role: Role::Assistant,
            content: content.into(),
        });
    }

    /// Screen teardown. The request counter is deliberately kept: an
    /// outstanding completion must never match a future request id.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.pending = false;
        self.model_id = None;
    }
}

/// Language selection plus the single "translation or error-as-text" result
/// slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranslationState {
    pub source: Lang,
    pub target: Lang,
    pub pending: bool,
    pub result: Option<String>,
    pub req: RequestId,
}

impl Default for TranslationState {
    fn default() -> Self {
        Self {
            source: Lang::EnUs,
            target: Lang::Es,
            pending: false,
            result: None,
            req: RequestId::default(),
        }
    }
}

impl TranslationState {
    /// Screen teardown; keeps the request counter, see
    /// [`ConversationState::reset`].
    pub fn reset(&mut self) {
        self.pending = false;
        self.result = None;
        self.source = Lang::EnUs;
        self.target = Lang::Es;
    }
}

/// Where the share-location flow currently is. Only one share action runs
/// at a time; a new request while one is underway is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ShareFlow {
    #[default]
    Idle,
    RequestingPermission,
    AcquiringFix,
    /// Fix acquired; waiting for the user to pick SMS or email.
    Choosing {
        message: String,
    },
    LaunchingHandoff,
}

impl ShareFlow {
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// A user-visible alert raised by the emergency action dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    #[must_use]
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Screen {
    #[default]
    Main,
    Chat,
    LanguageHelp,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Model {
    pub screen: Screen,
    pub number_modal_open: bool,
    pub conversation: ConversationState,
    pub translation: TranslationState,
    pub share: ShareFlow,
    pub flashlight_on: bool,
    pub alert: Option<Alert>,
    pub in_flight: InFlight,
    pub config: ServiceConfig,
}

impl Model {
    /// `Main -> Chat`. Returns whether the transition happened.
    pub fn open_chat(&mut self) -> bool {
        if self.screen != Screen::Main {
            return false;
        }
        self.screen = Screen::Chat;
        self.number_modal_open = false;
        true
    }

    /// `Main -> LanguageHelp`. The number modal is not defined for this
    /// screen, so it closes on entry.
    pub fn open_language_help(&mut self) -> bool {
        if self.screen != Screen::Main {
            return false;
        }
        self.screen = Screen::LanguageHelp;
        self.number_modal_open = false;
        true
    }

    /// Back navigation. Leaving a screen tears down the state owned by it.
    pub fn go_back(&mut self) -> bool {
        match self.screen {
            Screen::Main => false,
            Screen::Chat => {
                self.conversation.reset();
                self.in_flight.finish(crate::capabilities::CallKind::Chat);
                self.in_flight.finish(crate::capabilities::CallKind::ModelInfo);
                self.screen = Screen::Main;
                self.number_modal_open = false;
                true
            }
            Screen::LanguageHelp => {
                self.translation.reset();
                self.in_flight.finish(crate::capabilities::CallKind::Translate);
                self.screen = Screen::Main;
                self.number_modal_open = false;
                true
            }
        }
    }

    /// The modal is only defined while `Main` or `Chat` is active.
    pub fn open_number_modal(&mut self) -> bool {
        if self.screen == Screen::LanguageHelp {
            return false;
        }
        self.number_modal_open = true;
        true
    }

    pub fn close_number_modal(&mut self) {
        self.number_modal_open = false;
    }

    pub fn set_alert(&mut self, alert: Alert) {
        self.alert = Some(alert);
    }

    pub fn clear_alert(&mut self) {
        self.alert = None;
    }
}
