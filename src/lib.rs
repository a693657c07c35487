//! Blocking BLE peripheral client over an asynchronous controller bus.
//!
//! The BLE controller accepts commands as fire-and-forget messages and
//! reports every outcome as a later event, interleaved with unsolicited
//! connection and attribute-server events. [`BleClient`] turns that into
//! call-and-wait operations and routes the unsolicited events to GAP and
//! GATTS observers.
//!
//! The platform supplies two things: a [`Bus`] that submits commands, and
//! a [`Monotonic`] uptime counter the blocking waits are timed against.
//! Inbound messages are handed to [`BleClient::on_message`].
//!
//! `no_std`, no `alloc`. Tests run on the host: `cargo test`.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod ble;
pub mod config;
pub mod error;

pub use ble::bus::{
    AdvParams, AdvProfile, Characteristic, ConnParams, Descriptor, GapConfig, NotifyParams,
    SecurityParams, ServiceKind,
};
pub use ble::event::CharacteristicHandles;
pub use ble::{
    AddressType, BleAddress, BleClient, Bus, Command, Event, EventEnvelope, GapEventKind,
    GapObserver, GattsEventKind, GattsObserver, Monotonic, ServiceHandle, Status, Token, Uuid,
};
pub use config::ClientConfig;
pub use error::{Error, SubmitError};
