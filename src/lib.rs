//! Shared core for the emergency assistance app.
//!
//! The core is pure: every outside effect (HTTP, permissions, geolocation,
//! telephony, torch, share sheets) is requested through a capability and
//! comes back as an [`Event`]. iOS and Android shells link this crate over
//! FFI and drive it with `update`/`view`.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod capabilities;
pub mod config;
pub mod event;
pub mod model;

pub use app::{App, LangOption, ShareView, ViewModel};
pub use capabilities::{Capabilities, Effect};
pub use event::Event;
pub use model::Model;

/// Base URL of the chat service, overridable via [`Event::Configured`].
pub const DEFAULT_CHAT_BASE_URL: &str = "https://ai.hackclub.com";

/// Base URL of the translation service, overridable via
/// [`Event::Configured`].
pub const DEFAULT_TRANSLATE_BASE_URL: &str = "https://translate.hackclub.dev";

pub const CHAT_TIMEOUT_MS: u64 = 30_000;
pub const TRANSLATE_TIMEOUT_MS: u64 = 20_000;
pub const MODEL_INFO_TIMEOUT_MS: u64 = 10_000;

/// Shown in the conversation when the chat service cannot be reached; the
/// exchange stays a valid user/assistant alternation.
pub const CHAT_FALLBACK_MESSAGE: &str =
    "Sorry, I had trouble connecting to the AI service. Please try again later.";

pub const PERMISSION_DENIED_ALERT_TITLE: &str = "Permission Denied";
pub const ERROR_ALERT_TITLE: &str = "Error";

pub const LOCATION_PERMISSION_MESSAGE: &str =
    "Location permission is required to share your current location.";
pub const LOCATION_ERROR_MESSAGE: &str =
    "An unexpected error occurred while fetching your location.";
pub const SHARE_ERROR_MESSAGE: &str =
    "An unexpected error occurred while sharing your location.";
pub const CALL_ERROR_MESSAGE: &str =
    "An unexpected error occurred while trying to make a call.";
pub const FLASHLIGHT_ERROR_MESSAGE: &str =
    "Flashlight functionality is not supported on this device.";

pub const EMAIL_SHARE_SUBJECT: &str = "My Location";
