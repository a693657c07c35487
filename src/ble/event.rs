//! Inbound side of the controller bus: events and the observer surfaces.

use heapless::Vec;

use super::bus::Token;
use super::slot::{Completion, Output, ResponseKind};
use super::{BleAddress, ServiceHandle, Status};
use crate::config::{BLE_CORE_SERVICE_ID, MAX_WRITE_LEN};

/// A message delivered by the bus, consumed by
/// [`BleClient::on_message`](super::BleClient::on_message).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventEnvelope {
    /// Token echoed from the command this responds to, when the controller
    /// echoes one. Unsolicited events carry `None`.
    pub token: Option<Token>,
    pub event: Event,
}

impl EventEnvelope {
    pub const fn new(event: Event) -> Self {
        Self { token: None, event }
    }

    pub const fn with_token(token: Token, event: Event) -> Self {
        Self {
            token: Some(token),
            event,
        }
    }
}

/// Everything the controller can send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // Responses to commands
    ServiceAvailable { service_id: u16 },
    ServiceOpened { service: ServiceHandle },
    ConfigWritten { status: Status },
    AddressRead { status: Status, address: BleAddress },
    SecurityConfigured { status: Status },
    AdvDataWritten { status: Status },
    ServiceAdded { status: Status, handle: u16 },
    IncludedServiceAdded { status: Status },
    CharacteristicAdded {
        status: Status,
        handles: CharacteristicHandles,
    },
    DescriptorAdded { status: Status, handle: u16 },
    AttributeValueSet { status: Status },
    NotificationSent { status: Status },
    IndicationSent { status: Status },
    DisconnectDone { status: Status },
    RssiReportSet { status: Status },

    // Acknowledgements nobody waits for
    AdvStarted { status: Status },
    AdvStopped { status: Status },

    // Unsolicited
    Connected { conn_handle: u16, peer: BleAddress },
    Disconnected { conn_handle: u16, reason: u8 },
    Timeout { conn_handle: u16, reason: TimeoutReason },
    Rssi { conn_handle: u16, rssi: i8 },
    PeerWrite(PeerWrite),

    /// Message kind this client does not know.
    Unknown { kind: u16 },
}

/// Handles assigned to a newly registered characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CharacteristicHandles {
    pub value: u16,
    /// Client characteristic configuration descriptor, 0 if absent.
    pub cccd: u16,
    /// Server characteristic configuration descriptor, 0 if absent.
    pub sccd: u16,
    /// User description descriptor, 0 if absent.
    pub user_desc: u16,
}

/// What ran out in a GAP timeout event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeoutReason {
    Advertising,
    Connection,
    Other(u8),
}

/// A peer wrote to a local attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerWrite {
    pub conn_handle: u16,
    pub attr_handle: u16,
    pub offset: u16,
    pub data: Vec<u8, MAX_WRITE_LEN>,
}

impl Event {
    /// The slot completion this event carries, if it answers a command.
    ///
    /// Output is only attached when the controller reported success.
    /// Availability of services other than the BLE core service is not a
    /// response to anything this client asked for.
    pub fn response(&self) -> Option<(ResponseKind, Completion)> {
        let (kind, status, output) = match *self {
            Event::ServiceAvailable { service_id } if service_id == BLE_CORE_SERVICE_ID => {
                (ResponseKind::ServiceAvailable, Status::Success, Output::None)
            }
            Event::ServiceOpened { service } => (
                ResponseKind::ServiceOpened,
                Status::Success,
                Output::Service(service),
            ),
            Event::ConfigWritten { status } => (ResponseKind::ConfigWritten, status, Output::None),
            Event::AddressRead { status, address } => {
                (ResponseKind::AddressRead, status, Output::Address(address))
            }
            Event::SecurityConfigured { status } => {
                (ResponseKind::SecurityConfigured, status, Output::None)
            }
            Event::AdvDataWritten { status } => (ResponseKind::AdvDataWritten, status, Output::None),
            Event::ServiceAdded { status, handle } => {
                (ResponseKind::ServiceAdded, status, Output::Handle(handle))
            }
            Event::IncludedServiceAdded { status } => {
                (ResponseKind::IncludedServiceAdded, status, Output::None)
            }
            Event::CharacteristicAdded { status, handles } => (
                ResponseKind::CharacteristicAdded,
                status,
                Output::Characteristic(handles),
            ),
            Event::DescriptorAdded { status, handle } => {
                (ResponseKind::DescriptorAdded, status, Output::Handle(handle))
            }
            Event::AttributeValueSet { status } => {
                (ResponseKind::AttributeValueSet, status, Output::None)
            }
            Event::NotificationSent { status } => {
                (ResponseKind::NotificationSent, status, Output::None)
            }
            Event::IndicationSent { status } => (ResponseKind::IndicationSent, status, Output::None),
            Event::DisconnectDone { status } => (ResponseKind::DisconnectDone, status, Output::None),
            Event::RssiReportSet { status } => (ResponseKind::RssiReportSet, status, Output::None),
            _ => return None,
        };

        let output = if status.is_success() {
            output
        } else {
            Output::None
        };
        Some((kind, Completion { status, output }))
    }
}

/// Normalized connection-family event tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GapEventKind {
    Connected,
    Disconnected,
    AdvertisingTimeout,
    ConnectionTimeout,
    RssiSample,
}

/// Normalized attribute-server event tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GattsEventKind {
    Write,
}

/// Receives connection lifecycle and link quality events.
///
/// Runs in the dispatcher's context: only non-blocking client operations
/// may be called from here.
pub trait GapObserver: Sync {
    fn on_gap_event(&self, kind: GapEventKind, envelope: &EventEnvelope);
}

/// Receives attribute-server events.
///
/// Same context rules as [`GapObserver`].
pub trait GattsObserver: Sync {
    fn on_gatts_event(&self, kind: GattsEventKind, envelope: &EventEnvelope);
}

impl<F> GapObserver for F
where
    F: Fn(GapEventKind, &EventEnvelope) + Sync,
{
    fn on_gap_event(&self, kind: GapEventKind, envelope: &EventEnvelope) {
        self(kind, envelope)
    }
}

impl<F> GattsObserver for F
where
    F: Fn(GattsEventKind, &EventEnvelope) + Sync,
{
    fn on_gatts_event(&self, kind: GattsEventKind, envelope: &EventEnvelope) {
        self(kind, envelope)
    }
}
