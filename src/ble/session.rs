//! Per-client session state.
//!
//! The connection fields are written only by the dispatcher, from
//! connect / disconnect / timeout events.

use super::event::{GapObserver, GattsObserver};
use super::ServiceHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Session {
    service: Option<ServiceHandle>,
    conn_handle: Option<u16>,
    connected: bool,
}

impl Session {
    pub const fn new() -> Self {
        Self {
            service: None,
            conn_handle: None,
            connected: false,
        }
    }

    pub fn service(&self) -> Option<ServiceHandle> {
        self.service
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Current connection handle, only while connected.
    pub fn connection(&self) -> Option<u16> {
        if self.connected {
            self.conn_handle
        } else {
            None
        }
    }

    pub(crate) fn opened(&mut self, service: ServiceHandle) {
        self.service = Some(service);
    }

    pub(crate) fn on_connected(&mut self, conn_handle: u16) {
        self.conn_handle = Some(conn_handle);
        self.connected = true;
    }

    pub(crate) fn on_disconnected(&mut self) {
        self.conn_handle = None;
        self.connected = false;
    }
}

/// Observer registrations; installed once initialization has succeeded.
#[derive(Clone, Copy, Default)]
pub(crate) struct Observers<'a> {
    pub gap: Option<&'a dyn GapObserver>,
    pub gatts: Option<&'a dyn GattsObserver>,
}

impl Observers<'_> {
    pub const fn none() -> Self {
        Self {
            gap: None,
            gatts: None,
        }
    }
}
