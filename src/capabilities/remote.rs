//! Remote Call Envelope.
//!
//! Every outbound HTTP call goes through this capability as a
//! [`RemoteOperation`]; the shell performs the actual request (honouring
//! `timeout_ms`) and resolves with a [`RemoteOutcome`]. The envelope
//! normalizes that outcome into the fixed [`CallError`] taxonomy before any
//! manager sees it, and [`InFlight`] enforces at most one pending call per
//! [`CallKind`].

use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CallKind {
    Chat,
    Translate,
    ModelInfo,
}

impl CallKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Translate => "translate",
            Self::ModelInfo => "model-info",
        }
    }

    #[must_use]
    pub const fn timeout_ms(self) -> u64 {
        match self {
            Self::Chat => crate::CHAT_TIMEOUT_MS,
            Self::Translate => crate::TRANSLATE_TIMEOUT_MS,
            Self::ModelInfo => crate::MODEL_INFO_TIMEOUT_MS,
        }
    }
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteOperation {
    pub kind: CallKind,
    pub method: HttpMethod,
    pub url: String,
    #[serde(default)]
    pub body: Option<Vec<u8>>,
    pub timeout_ms: u64,
}

impl RemoteOperation {
    #[must_use]
    pub fn get(kind: CallKind, url: impl Into<String>) -> Self {
        Self {
            kind,
            method: HttpMethod::Get,
            url: url.into(),
            body: None,
            timeout_ms: kind.timeout_ms(),
        }
    }

    #[must_use]
    pub fn post_json(kind: CallKind, url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            kind,
            method: HttpMethod::Post,
            url: url.into(),
            body: Some(body),
            timeout_ms: kind.timeout_ms(),
        }
    }
}

/// What the shell reports back. Raw, unclassified; the envelope turns this
/// into a [`CallResult`] so managers only ever see the fixed taxonomy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data")]
pub enum RemoteOutcome {
    Response { status: u16, body: Vec<u8> },
    NetworkFailure { message: String },
    TimedOut,
}

impl Operation for RemoteOperation {
    type Output = RemoteOutcome;
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum CallError {
    #[error("a {kind} call is already in flight")]
    AlreadyInFlight { kind: CallKind },

    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("network error: {message}")]
    Network { message: String },

    #[error("request timed out")]
    Timeout,

    #[error("service returned status {status}")]
    Service { status: u16, body: String },
}

pub type CallResult = Result<Vec<u8>, CallError>;

/// 2xx responses pass their body through; everything else maps onto the
/// error taxonomy.
pub fn classify(outcome: RemoteOutcome) -> CallResult {
    match outcome {
        RemoteOutcome::Response { status, body } if (200..300).contains(&status) => Ok(body),
        RemoteOutcome::Response { status, body } => Err(CallError::Service {
            status,
            body: String::from_utf8_lossy(&body).into_owned(),
        }),
        RemoteOutcome::NetworkFailure { message } => Err(CallError::Network { message }),
        RemoteOutcome::TimedOut => Err(CallError::Timeout),
    }
}

/// Per-kind in-flight bookkeeping, owned by the model. A new call of a kind
/// that is already pending is rejected, never queued and never cancelling
/// the prior call.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InFlight {
    chat: bool,
    translate: bool,
    model_info: bool,
}

impl InFlight {
    pub fn try_begin(&mut self, kind: CallKind) -> Result<(), CallError> {
        let slot = self.slot(kind);
        if *slot {
            return Err(CallError::AlreadyInFlight { kind });
        }
        *slot = true;
        Ok(())
    }

    pub fn finish(&mut self, kind: CallKind) {
        *self.slot(kind) = false;
    }

    #[must_use]
    pub const fn is_pending(&self, kind: CallKind) -> bool {
        match kind {
            CallKind::Chat => self.chat,
            CallKind::Translate => self.translate,
            CallKind::ModelInfo => self.model_info,
        }
    }

    fn slot(&mut self, kind: CallKind) -> &mut bool {
        match kind {
            CallKind::Chat => &mut self.chat,
            CallKind::Translate => &mut self.translate,
            CallKind::ModelInfo => &mut self.model_info,
        }
    }
}

pub struct Remote<Ev> {
    context: CapabilityContext<RemoteOperation, Ev>,
}

impl<Ev> Capability<Ev> for Remote<Ev> {
    type Operation = RemoteOperation;
    type MappedSelf<MappedEv> = Remote<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static,
    {
        Remote::new(self.context.map_event(f))
    }
}

impl<Ev> Remote<Ev> {
    pub fn new(context: CapabilityContext<RemoteOperation, Ev>) -> Self {
        Self { context }
    }
}

impl<Ev> Remote<Ev>
where
    Ev: Send + 'static,
{
    /// Hand the request to the shell and feed the classified result back as
    /// an event. The caller is responsible for having claimed the in-flight
    /// slot first.
    pub fn invoke<F>(&self, operation: RemoteOperation, make_event: F)
    where
        F: FnOnce(CallResult) -> Ev + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let outcome = context.request_from_shell(operation).await;
            context.update_app(make_event(classify(outcome)));
        });
    }
}
