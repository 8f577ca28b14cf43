//! Crux capabilities: the Remote Call Envelope for outbound HTTP, the
//! Device capability for permission-gated OS actions, and Crux's built-in
//! Render capability for view updates.

mod device;
mod remote;

pub use self::device::{
    Device, DeviceCapability, DeviceError, DeviceOperation, DeviceOutput, DeviceResult,
    LocationSample, PermissionDecision, ShareChannel,
};
pub use self::remote::{
    classify, CallError, CallKind, CallResult, HttpMethod, InFlight, Remote, RemoteOperation,
    RemoteOutcome,
};

use crux_core::render::Render;

use crate::app::App;
use crate::event::Event;

#[derive(crux_core::macros::Effect)]
#[effect(app = "App")]
pub struct Capabilities {
    pub remote: Remote<Event>,
    pub device: Device<Event>,
    pub render: Render<Event>,
}
