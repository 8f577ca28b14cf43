//! The session controller: one `update` loop owning conversation,
//! translation, emergency actions and screen navigation.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::capabilities::{
    CallError, CallKind, CallResult, Capabilities, DeviceCapability, DeviceOutput,
    RemoteOperation, ShareChannel,
};
use crate::config::ValidatedUrl;
use crate::event::Event;
use crate::model::{Alert, Message, Model, Screen, ShareFlow};

#[derive(Default)]
pub struct App;

// --- Wire formats ---

#[derive(Serialize)]
struct ChatRequestBody<'a> {
    messages: &'a [Message],
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Serialize)]
struct TranslateRequestBody<'a> {
    text: &'a str,
    source_lang: &'a str,
    target_lang: &'a str,
}

#[derive(Deserialize, Default)]
struct TranslateResponseBody {
    #[serde(default)]
    translated_text: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

// --- Pure helpers ---

fn parse_chat_reply(body: &[u8]) -> Option<String> {
    let response: ChatCompletionResponse = serde_json::from_slice(body).ok()?;
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
}

/// The single "translation or error-as-text" slot contract: failures become
/// text prefixed `"Error: "` rather than a separate error channel.
fn translate_result_text(result: CallResult) -> String {
    match result {
        Ok(body) => match serde_json::from_slice::<TranslateResponseBody>(&body) {
            Ok(TranslateResponseBody {
                translated_text: Some(text),
                ..
            }) => text,
            Ok(TranslateResponseBody {
                error: Some(error), ..
            }) => format!("Error: {error}"),
            _ => "Error: invalid response from translation service".to_string(),
        },
        Err(CallError::Service { status, body }) => {
            let detail = serde_json::from_slice::<TranslateResponseBody>(body.as_bytes())
                .ok()
                .and_then(|response| response.error)
                .unwrap_or_else(|| format!("translation service returned status {status}"));
            format!("Error: {detail}")
        }
        Err(error) => format!("Error: {error}"),
    }
}

/// Fixed template embedded in the SMS/email body.
fn location_message(latitude: f64, longitude: f64) -> String {
    format!("My current location is:\nLatitude: {latitude}\nLongitude: {longitude}")
}

fn call_unsupported_message(number: &str) -> String {
    format!("Phone call functionality is not supported for number: {number}")
}

// --- View model ---

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LangOption {
    pub code: String,
    pub label: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ShareView {
    Hidden,
    /// Permission prompt, fix acquisition or handoff underway.
    Busy,
    /// The user must pick exactly one of the two channels.
    Choosing { message: String },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ViewModel {
    pub screen: Screen,
    pub number_modal_open: bool,
    pub messages: Vec<Message>,
    pub chat_pending: bool,
    pub can_send: bool,
    pub model_label: Option<String>,
    pub languages: Vec<LangOption>,
    pub source_lang: String,
    pub target_lang: String,
    pub translate_pending: bool,
    pub translated_text: Option<String>,
    pub share: ShareView,
    pub flashlight_on: bool,
    pub alert: Option<Alert>,
}

impl App {
    fn start_chat_request(model: &mut Model, caps: &Capabilities) {
        let req = model.conversation.req.advance();
        model.conversation.pending = true;

        match serde_json::to_vec(&ChatRequestBody {
            messages: &model.conversation.messages,
        }) {
            Ok(body) => {
                let operation = RemoteOperation::post_json(
                    CallKind::Chat,
                    model.config.chat_completions_url(),
                    body,
                );
                caps.remote
                    .invoke(operation, move |result| Event::ChatCompleted { req, result });
            }
            Err(error) => {
                // Degrades exactly like a failed call: the conversation log
                // stays a valid alternating sequence.
                warn!(%error, "failed to encode chat request");
                model.conversation.pending = false;
                model.in_flight.finish(CallKind::Chat);
                model.conversation.push_assistant(crate::CHAT_FALLBACK_MESSAGE);
            }
        }
    }

    fn fetch_model_info(model: &mut Model, caps: &Capabilities) {
        if model.conversation.model_id.is_some() {
            return;
        }
        if model.in_flight.try_begin(CallKind::ModelInfo).is_err() {
            debug!("model info request already in flight");
            return;
        }
        let operation = RemoteOperation::get(CallKind::ModelInfo, model.config.model_url());
        caps.remote
            .invoke(operation, |result| Event::ModelInfoCompleted { result });
    }

    fn apply_share_failure(model: &mut Model, message: &str) {
        model.share = ShareFlow::Idle;
        model.set_alert(Alert::new(crate::ERROR_ALERT_TITLE, message));
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        debug!(event = event.name(), "update");

        match event {
            Event::Configured {
                chat_base,
                translate_base,
            } => {
                match ValidatedUrl::new(chat_base) {
                    Ok(base) => model.config.chat_base = base,
                    Err(error) => warn!(%error, "ignoring chat base override"),
                }
                match ValidatedUrl::new(translate_base) {
                    Ok(base) => model.config.translate_base = base,
                    Err(error) => warn!(%error, "ignoring translate base override"),
                }
                caps.render.render();
            }

            // --- Session navigation ---
            Event::ChatOpened => {
                if model.open_chat() {
                    Self::fetch_model_info(model, caps);
                    caps.render.render();
                }
            }

            Event::LanguageHelpOpened => {
                if model.open_language_help() {
                    caps.render.render();
                }
            }

            Event::BackPressed => {
                if model.go_back() {
                    caps.render.render();
                }
            }

            Event::NumberModalOpened => {
                if model.open_number_modal() {
                    caps.render.render();
                } else {
                    debug!("number modal is not defined for this screen");
                }
            }

            Event::NumberModalClosed => {
                model.close_number_modal();
                caps.render.render();
            }

            Event::AlertDismissed => {
                model.clear_alert();
                caps.render.render();
            }

            // --- Conversation ---
            Event::MessageSubmitted { text } => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    debug!("rejected chat send: empty input");
                    return;
                }
                if model.conversation.pending {
                    debug!("rejected chat send: request pending");
                    return;
                }
                if let Err(error) = model.in_flight.try_begin(CallKind::Chat) {
                    warn!(%error, "rejected chat send");
                    return;
                }

                // The user's message is visible immediately, before the
                // network round-trip starts.
                model.conversation.push_user(trimmed);
                Self::start_chat_request(model, caps);
                caps.render.render();
            }

            Event::ChatCompleted { req, result } => {
                if !model.conversation.pending || req != model.conversation.req {
                    debug!("ignoring stale chat completion");
                    return;
                }
                model.in_flight.finish(CallKind::Chat);
                model.conversation.pending = false;

                let reply = match result {
                    Ok(body) => {
                        let parsed = parse_chat_reply(&body);
                        if parsed.is_none() {
                            warn!("chat service returned an unparseable response");
                        }
                        parsed
                    }
                    Err(error) => {
                        warn!(%error, "chat request failed");
                        None
                    }
                };

                // Failures become conversation content so the log stays a
                // valid alternating sequence.
                match reply {
                    Some(content) => model.conversation.push_assistant(content),
                    None => model.conversation.push_assistant(crate::CHAT_FALLBACK_MESSAGE),
                }
                caps.render.render();
            }

            Event::ModelInfoRequested => {
                if model.screen == Screen::Chat {
                    Self::fetch_model_info(model, caps);
                } else {
                    debug!("model info only applies to the chat screen");
                }
            }

            Event::ModelInfoCompleted { result } => {
                if !model.in_flight.is_pending(CallKind::ModelInfo) {
                    debug!("ignoring stale model info completion");
                    return;
                }
                model.in_flight.finish(CallKind::ModelInfo);
                match result {
                    Ok(body) => {
                        let id = String::from_utf8_lossy(&body).trim().to_string();
                        if !id.is_empty() && model.screen == Screen::Chat {
                            model.conversation.model_id = Some(id);
                            caps.render.render();
                        }
                    }
                    // The model label is cosmetic; failure leaves it unset.
                    Err(error) => debug!(%error, "model info request failed"),
                }
            }

            // --- Translation ---
            Event::SourceLangChanged { lang } => {
                model.translation.source = lang;
                caps.render.render();
            }

            Event::TargetLangChanged { lang } => {
                model.translation.target = lang;
                caps.render.render();
            }

            Event::TranslateRequested { text } => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    debug!("rejected translate: empty input");
                    return;
                }
                if let Err(error) = model.in_flight.try_begin(CallKind::Translate) {
                    debug!(%error, "rejected translate");
                    return;
                }

                let req = model.translation.req.advance();
                model.translation.pending = true;

                match serde_json::to_vec(&TranslateRequestBody {
                    text: trimmed,
                    source_lang: model.translation.source.code(),
                    target_lang: model.translation.target.code(),
                }) {
                    Ok(body) => {
                        let operation = RemoteOperation::post_json(
                            CallKind::Translate,
                            model.config.translate_url(),
                            body,
                        );
                        caps.remote.invoke(operation, move |result| {
                            Event::TranslateCompleted { req, result }
                        });
                    }
                    Err(error) => {
                        warn!(%error, "failed to encode translate request");
                        model.translation.pending = false;
                        model.in_flight.finish(CallKind::Translate);
                        model.translation.result = Some(format!("Error: {error}"));
                    }
                }
                caps.render.render();
            }

            Event::TranslateCompleted { req, result } => {
                if !model.translation.pending || req != model.translation.req {
                    debug!("ignoring stale translate completion");
                    return;
                }
                model.in_flight.finish(CallKind::Translate);
                model.translation.pending = false;
                model.translation.result = Some(translate_result_text(result));
                caps.render.render();
            }

            // --- Share location ---
            Event::ShareLocationRequested => {
                if !model.share.is_idle() {
                    debug!("share already underway");
                    return;
                }
                model.share = ShareFlow::RequestingPermission;
                caps.device
                    .request_permission(DeviceCapability::Location, |result| {
                        Event::LocationPermissionDecided { result }
                    });
                caps.render.render();
            }

            Event::LocationPermissionDecided { result } => {
                if model.share != ShareFlow::RequestingPermission {
                    debug!("ignoring stray permission decision");
                    return;
                }
                match result {
                    Ok(DeviceOutput::Permission(decision)) if decision.is_granted() => {
                        model.share = ShareFlow::AcquiringFix;
                        caps.device
                            .get_position(|result| Event::PositionAcquired { result });
                    }
                    Ok(DeviceOutput::Permission(_)) => {
                        model.share = ShareFlow::Idle;
                        model.set_alert(Alert::new(
                            crate::PERMISSION_DENIED_ALERT_TITLE,
                            crate::LOCATION_PERMISSION_MESSAGE,
                        ));
                    }
                    other => {
                        warn!(?other, "location permission request failed");
                        Self::apply_share_failure(model, crate::LOCATION_ERROR_MESSAGE);
                    }
                }
                caps.render.render();
            }

            Event::PositionAcquired { result } => {
                if model.share != ShareFlow::AcquiringFix {
                    debug!("ignoring stray position fix");
                    return;
                }
                match result {
                    Ok(DeviceOutput::Position(sample)) => {
                        model.share = ShareFlow::Choosing {
                            message: location_message(sample.latitude, sample.longitude),
                        };
                    }
                    other => {
                        warn!(?other, "position fix failed");
                        Self::apply_share_failure(model, crate::LOCATION_ERROR_MESSAGE);
                    }
                }
                caps.render.render();
            }

            Event::ShareVia { channel } => {
                let ShareFlow::Choosing { message } = &model.share else {
                    debug!("no share message to send");
                    return;
                };
                let body = message.clone();
                let subject = match channel {
                    ShareChannel::Email => Some(crate::EMAIL_SHARE_SUBJECT.to_string()),
                    ShareChannel::Sms => None,
                };
                model.share = ShareFlow::LaunchingHandoff;
                caps.device.launch_share(channel, subject, body, |result| {
                    Event::ShareHandoffCompleted { result }
                });
                caps.render.render();
            }

            Event::ShareDismissed => {
                if matches!(model.share, ShareFlow::Choosing { .. }) {
                    model.share = ShareFlow::Idle;
                    caps.render.render();
                }
            }

            Event::ShareHandoffCompleted { result } => {
                if model.share != ShareFlow::LaunchingHandoff {
                    debug!("ignoring stray share handoff result");
                    return;
                }
                match result {
                    Ok(DeviceOutput::ShareLaunched) => model.share = ShareFlow::Idle,
                    other => {
                        warn!(?other, "share handoff failed");
                        Self::apply_share_failure(model, crate::SHARE_ERROR_MESSAGE);
                    }
                }
                caps.render.render();
            }

            // --- Call a number ---
            Event::CallNumberRequested { number } => {
                caps.device
                    .check_telephony(number.clone(), move |result| Event::TelephonyChecked {
                        number,
                        result,
                    });
            }

            Event::TelephonyChecked { number, result } => match result {
                Ok(DeviceOutput::TelephonySupport { supported: true, .. }) => {
                    caps.device
                        .dial(number, |result| Event::DialCompleted { result });
                }
                Ok(DeviceOutput::TelephonySupport {
                    supported: false, ..
                }) => {
                    model.set_alert(Alert::new(
                        crate::ERROR_ALERT_TITLE,
                        call_unsupported_message(&number),
                    ));
                    caps.render.render();
                }
                other => {
                    warn!(?other, "telephony check failed");
                    model.set_alert(Alert::new(crate::ERROR_ALERT_TITLE, crate::CALL_ERROR_MESSAGE));
                    caps.render.render();
                }
            },

            Event::DialCompleted { result } => match result {
                Ok(DeviceOutput::Dialed) => {}
                other => {
                    warn!(?other, "dial handoff failed");
                    model.set_alert(Alert::new(crate::ERROR_ALERT_TITLE, crate::CALL_ERROR_MESSAGE));
                    caps.render.render();
                }
            },

            // --- Flashlight ---
            Event::FlashlightToggled => {
                let on = !model.flashlight_on;
                caps.device
                    .set_torch(on, |result| Event::TorchCompleted { result });
            }

            Event::TorchCompleted { result } => {
                match result {
                    // State only flips on confirmed success.
                    Ok(DeviceOutput::TorchSet { on }) => model.flashlight_on = on,
                    other => {
                        warn!(?other, "torch toggle failed");
                        model.set_alert(Alert::new(
                            crate::ERROR_ALERT_TITLE,
                            crate::FLASHLIGHT_ERROR_MESSAGE,
                        ));
                    }
                }
                caps.render.render();
            }
        }
    }

    fn view(&self, model: &Model) -> ViewModel {
        let languages = crate::model::Lang::ALL
            .iter()
            .map(|lang| LangOption {
                code: lang.code().to_string(),
                label: lang.label().to_string(),
            })
            .collect();

        let share = match &model.share {
            ShareFlow::Idle => ShareView::Hidden,
            ShareFlow::RequestingPermission
            | ShareFlow::AcquiringFix
            | ShareFlow::LaunchingHandoff => ShareView::Busy,
            ShareFlow::Choosing { message } => ShareView::Choosing {
                message: message.clone(),
            },
        };

        ViewModel {
            screen: model.screen,
            number_modal_open: model.number_modal_open,
            messages: model.conversation.messages.clone(),
            chat_pending: model.conversation.pending,
            can_send: !model.conversation.pending,
            model_label: model
                .conversation
                .model_id
                .as_ref()
                .map(|id| format!("Model: {id}")),
            languages,
            source_lang: model.translation.source.code().to_string(),
            target_lang: model.translation.target.code().to_string(),
            translate_pending: model.translation.pending,
            translated_text: model.translation.result.clone(),
            share,
            flashlight_on: model.flashlight_on,
            alert: model.alert.clone(),
        }
    }
}
