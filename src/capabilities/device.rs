//! Device capability: OS permission prompts, geolocation fixes, telephony,
//! torch, and share-sheet handoff.
//!
//! Permission decisions are queried fresh on every request and never cached
//! as "denied forever" — a later request may re-prompt. Absence of a
//! hardware capability is a distinct outcome from a permission denial and
//! is reported distinctly.

use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DeviceCapability {
    Location,
    Telephony,
    Flashlight,
}

impl DeviceCapability {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Telephony => "telephony",
            Self::Flashlight => "flashlight",
        }
    }
}

impl fmt::Display for DeviceCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PermissionDecision {
    Granted,
    Denied,
    Undetermined,
}

impl PermissionDecision {
    #[must_use]
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

impl Default for PermissionDecision {
    fn default() -> Self {
        Self::Undetermined
    }
}

/// One position fix, captured per share action and never cached.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LocationSample {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ShareChannel {
    Sms,
    Email,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", content = "data")]
pub enum DeviceOperation {
    /// Query (and if needed prompt for) an OS permission.
    RequestPermission { capability: DeviceCapability },
    /// Acquire a single foreground position fix.
    GetPosition,
    /// Can the device place a call to this number at all?
    CheckTelephony { number: String },
    /// Hand off to the OS dialer.
    Dial { number: String },
    SetTorch { on: bool },
    /// Launch an SMS or email compose intent with a pre-filled body.
    LaunchShare {
        channel: ShareChannel,
        subject: Option<String>,
        body: String,
    },
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum DeviceError {
    #[error("{capability} permission denied")]
    PermissionDenied { capability: DeviceCapability },

    #[error("{capability} is not supported on this device")]
    CapabilityUnavailable { capability: DeviceCapability },

    #[error("hardware error: {message}")]
    Hardware { message: String },

    #[error("handoff failed: {message}")]
    Launch { message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum DeviceOutput {
    Permission(PermissionDecision),
    Position(LocationSample),
    TelephonySupport { number: String, supported: bool },
    Dialed,
    TorchSet { on: bool },
    ShareLaunched,
}

pub type DeviceResult = Result<DeviceOutput, DeviceError>;

impl Operation for DeviceOperation {
    type Output = DeviceResult;
}

pub struct Device<Ev> {
    context: CapabilityContext<DeviceOperation, Ev>,
}

impl<Ev> Capability<Ev> for Device<Ev> {
    type Operation = DeviceOperation;
    type MappedSelf<MappedEv> = Device<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static,
    {
        Device::new(self.context.map_event(f))
    }
}

impl<Ev> Device<Ev> {
    pub fn new(context: CapabilityContext<DeviceOperation, Ev>) -> Self {
        Self { context }
    }
}

impl<Ev> Device<Ev>
where
    Ev: Send + 'static,
{
    fn perform<F>(&self, operation: DeviceOperation, make_event: F)
    where
        F: FnOnce(DeviceResult) -> Ev + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context.request_from_shell(operation).await;
            context.update_app(make_event(result));
        });
    }

    /// May suspend while the OS prompt is shown.
    pub fn request_permission<F>(&self, capability: DeviceCapability, make_event: F)
    where
        F: FnOnce(DeviceResult) -> Ev + Send + 'static,
    {
        self.perform(DeviceOperation::RequestPermission { capability }, make_event);
    }

    pub fn get_position<F>(&self, make_event: F)
    where
        F: FnOnce(DeviceResult) -> Ev + Send + 'static,
    {
        self.perform(DeviceOperation::GetPosition, make_event);
    }

    pub fn check_telephony<F>(&self, number: impl Into<String>, make_event: F)
    where
        F: FnOnce(DeviceResult) -> Ev + Send + 'static,
    {
        self.perform(
            DeviceOperation::CheckTelephony { number: number.into() },
            make_event,
        );
    }

    pub fn dial<F>(&self, number: impl Into<String>, make_event: F)
    where
        F: FnOnce(DeviceResult) -> Ev + Send + 'static,
    {
        self.perform(DeviceOperation::Dial { number: number.into() }, make_event);
    }

    pub fn set_torch<F>(&self, on: bool, make_event: F)
    where
        F: FnOnce(DeviceResult) -> Ev + Send + 'static,
    {
        self.perform(DeviceOperation::SetTorch { on }, make_event);
    }

    pub fn launch_share<F>(
        &self,
        channel: ShareChannel,
        subject: Option<String>,
        body: impl Into<String>,
        make_event: F,
    ) where
        F: FnOnce(DeviceResult) -> Ev + Send + 'static,
    {
        self.perform(
            DeviceOperation::LaunchShare {
                channel,
                subject,
                body: body.into(),
            },
            make_event,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_decision_checks() {
        assert!(PermissionDecision::Granted.is_granted());
        assert!(!PermissionDecision::Denied.is_granted());
        assert!(!PermissionDecision::Undetermined.is_granted());
        assert_eq!(PermissionDecision::default(), PermissionDecision::Undetermined);
    }

    #[test]
    fn operation_serialization_round_trips() {
        let op = DeviceOperation::LaunchShare {
            channel: ShareChannel::Email,
            subject: Some("My Location".into()),
            body: "Latitude: 1.0".into(),
        };
        let json = serde_json::to_string(&op).unwrap();
        let back: DeviceOperation = serde_json::from_str(&json).unwrap();
        assert_eq!(op, back);
    }

    #[test]
    fn output_serialization_round_trips() {
        let output = DeviceOutput::Position(LocationSample {
            latitude: 40.7414,
            longitude: -74.1790,
        });
        let json = serde_json::to_string(&output).unwrap();
        let back: DeviceOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(output, back);
    }

    #[test]
    fn error_messages_distinguish_denial_from_absence() {
        let denied = DeviceError::PermissionDenied {
            capability: DeviceCapability::Location,
        };
        let absent = DeviceError::CapabilityUnavailable {
            capability: DeviceCapability::Telephony,
        };
        assert_eq!(denied.to_string(), "location permission denied");
        assert_eq!(absent.to_string(), "telephony is not supported on this device");
    }
}
