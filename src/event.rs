//! Events: user commands from the shell plus capability completions.

use serde::{Deserialize, Serialize};

use crate::capabilities::{CallResult, DeviceResult, ShareChannel};
use crate::model::{Lang, RequestId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    /// Startup configuration override; invalid URLs are logged and ignored.
    Configured {
        chat_base: String,
        translate_base: String,
    },

    // Session navigation
    ChatOpened,
    LanguageHelpOpened,
    BackPressed,
    NumberModalOpened,
    NumberModalClosed,
    AlertDismissed,

    // Conversation
    MessageSubmitted {
        text: String,
    },
    ChatCompleted {
        req: RequestId,
        result: CallResult,
    },
    /// Re-request the model label, e.g. after the shell regains network.
    ModelInfoRequested,
    ModelInfoCompleted {
        result: CallResult,
    },

    // Translation
    SourceLangChanged {
        lang: Lang,
    },
    TargetLangChanged {
        lang: Lang,
    },
    TranslateRequested {
        text: String,
    },
    TranslateCompleted {
        req: RequestId,
        result: CallResult,
    },

    // Share-location flow
    ShareLocationRequested,
    LocationPermissionDecided {
        result: DeviceResult,
    },
    PositionAcquired {
        result: DeviceResult,
    },
    ShareVia {
        channel: ShareChannel,
    },
    ShareDismissed,
    ShareHandoffCompleted {
        result: DeviceResult,
    },

    // Call flow
    CallNumberRequested {
        number: String,
    },
    TelephonyChecked {
        number: String,
        result: DeviceResult,
    },
    DialCompleted {
        result: DeviceResult,
    },

    // Flashlight
    FlashlightToggled,
    TorchCompleted {
        result: DeviceResult,
    },
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Configured { .. } => "configured",
            Self::ChatOpened => "chat_opened",
            Self::LanguageHelpOpened => "language_help_opened",
            Self::BackPressed => "back_pressed",
            Self::NumberModalOpened => "number_modal_opened",
            Self::NumberModalClosed => "number_modal_closed",
            Self::AlertDismissed => "alert_dismissed",
            Self::MessageSubmitted { .. } => "message_submitted",
            Self::ChatCompleted { .. } => "chat_completed",
            Self::ModelInfoRequested => "model_info_requested",
            Self::ModelInfoCompleted { .. } => "model_info_completed",
            Self::SourceLangChanged { .. } => "source_lang_changed",
            Self::TargetLangChanged { .. } => "target_lang_changed",
            Self::TranslateRequested { .. } => "translate_requested",
            Self::TranslateCompleted { .. } => "translate_completed",
            Self::ShareLocationRequested => "share_location_requested",
            Self::LocationPermissionDecided { .. } => "location_permission_decided",
            Self::PositionAcquired { .. } => "position_acquired",
            Self::ShareVia { .. } => "share_via",
            Self::ShareDismissed => "share_dismissed",
            Self::ShareHandoffCompleted { .. } => "share_handoff_completed",
            Self::CallNumberRequested { .. } => "call_number_requested",
            Self::TelephonyChecked { .. } => "telephony_checked",
            Self::DialCompleted { .. } => "dial_completed",
            Self::FlashlightToggled => "flashlight_toggled",
            Self::TorchCompleted { .. } => "torch_completed",
        }
    }

    /// Commands issued by the user, as opposed to capability completions.
    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::ChatOpened
                | Self::LanguageHelpOpened
                | Self::BackPressed
                | Self::NumberModalOpened
                | Self::NumberModalClosed
                | Self::AlertDismissed
                | Self::MessageSubmitted { .. }
                | Self::SourceLangChanged { .. }
                | Self::TargetLangChanged { .. }
                | Self::TranslateRequested { .. }
                | Self::ShareLocationRequested
                | Self::ShareVia { .. }
                | Self::ShareDismissed
                | Self::CallNumberRequested { .. }
                | Self::FlashlightToggled
        )
    }
}
