//! Bluetooth Low Energy client bridge.
//!
//! The controller only speaks a fire-and-forget message protocol: every
//! command is submitted on a [`Bus`](bus::Bus) and its outcome comes back
//! later as an [`EventEnvelope`](event::EventEnvelope) on the same inbound
//! path that carries connects, disconnects, timeouts, RSSI samples and peer
//! writes. This module turns that into:
//!
//! 1. **Blocking operations** - [`BleClient`] arms the [`CorrelationSlot`],
//!    submits, and spins on the [`wait`] primitive until the dispatcher
//!    completes the slot or the response timeout passes.
//! 2. **Event dispatch** - [`BleClient::on_message`] routes responses into
//!    the slot and unsolicited events into the session state and the
//!    registered GAP / GATTS observers.
//!
//! Only [`BleClient::start_advertising`] and [`BleClient::stop_advertising`]
//! are safe to call from inside an observer; every other operation blocks
//! and would time out there because the dispatcher is busy running the
//! observer.

pub mod bus;
pub mod client;
mod dispatch;
pub mod event;
mod gap;
mod gatts;
pub mod session;
pub mod slot;
pub mod wait;


pub use bus::{Bus, Command, CommandKind, Request, Token};
pub use client::BleClient;
pub use event::{
    Event, EventEnvelope, GapEventKind, GapObserver, GattsEventKind, GattsObserver, PeerWrite,
    TimeoutReason,
};
pub use session::Session;
pub use slot::{Completion, CorrelationSlot, Delivery, Output, ResponseKind};
pub use wait::{Monotonic, WaitOutcome};

/// Status code reported by the controller.
///
/// Codes the bridge does not know are carried through unmodified in
/// [`Status::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    Success,
    Pending,
    Timeout,
    NotSupported,
    NotAllowed,
    LinkTimeout,
    NotEnabled,
    Error,
    AlreadyRegistered,
    WrongState,
    InvalidParameter,
    Other(u16),
}

impl Status {
    pub const fn from_code(code: u16) -> Self {
        match code {
            0 => Status::Success,
            1 => Status::Pending,
            2 => Status::Timeout,
            3 => Status::NotSupported,
            4 => Status::NotAllowed,
            5 => Status::LinkTimeout,
            6 => Status::NotEnabled,
            7 => Status::Error,
            8 => Status::AlreadyRegistered,
            9 => Status::WrongState,
            10 => Status::InvalidParameter,
            other => Status::Other(other),
        }
    }

    pub const fn code(self) -> u16 {
        match self {
            Status::Success => 0,
            Status::Pending => 1,
            Status::Timeout => 2,
            Status::NotSupported => 3,
            Status::NotAllowed => 4,
            Status::LinkTimeout => 5,
            Status::NotEnabled => 6,
            Status::Error => 7,
            Status::AlreadyRegistered => 8,
            Status::WrongState => 9,
            Status::InvalidParameter => 10,
            Status::Other(code) => code,
        }
    }

    pub const fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }
}

impl From<u16> for Status {
    fn from(code: u16) -> Self {
        Status::from_code(code)
    }
}

/// BLE device address type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressType {
    Public,
    RandomStatic,
    RandomPrivateResolvable,
    RandomPrivateNonResolvable,
}

/// A 48-bit BLE device address (little-endian byte order, as on air).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BleAddress {
    pub kind: AddressType,
    pub bytes: [u8; 6],
}

impl BleAddress {
    pub const fn new(kind: AddressType, bytes: [u8; 6]) -> Self {
        Self { kind, bytes }
    }

    pub const fn public(bytes: [u8; 6]) -> Self {
        Self::new(AddressType::Public, bytes)
    }
}

/// Attribute UUID, either a SIG-assigned 16-bit alias or a full 128-bit value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Uuid {
    Uuid16(u16),
    Uuid128([u8; 16]),
}

/// Session handle the controller hands out when the core service is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServiceHandle(pub u32);
