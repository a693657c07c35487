//! The blocking client: owns the bus, the correlation slot and the session.
//!
//! Every blocking operation follows the same sequence (see [`BleClient::transact`]):
//!
//! 1. claim the slot (serializes concurrent callers),
//! 2. arm it with a fresh token and the expected response kind,
//! 3. submit - a refused submission returns immediately, nothing is awaited,
//! 4. spin until the dispatcher completes the slot or the timeout passes,
//! 5. turn the reported status into `Ok(output)` or `Err(Error::Controller)`.
//!
//! GAP operations live in `gap.rs`, GATT server operations in `gatts.rs`,
//! and the inbound side in `dispatch.rs`.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use super::bus::{Bus, Command, Request};
use super::event::{GapObserver, GattsObserver};
use super::session::{Observers, Session};
use super::slot::{CorrelationSlot, Output, ResponseKind};
use super::wait::{self, Monotonic, WaitOutcome};
use super::{ServiceHandle, Status};
use crate::config::{ClientConfig, BLE_CORE_SERVICE_ID};
use crate::error::Error;

/// Synchronous façade over an asynchronous controller bus.
///
/// `'a` is the lifetime of the registered observers. The client is `Sync`
/// when the bus and clock are, so the dispatcher may run on another thread
/// or in interrupt context while a caller is blocked.
pub struct BleClient<'a, B, M> {
    pub(super) bus: B,
    pub(super) clock: M,
    pub(super) config: ClientConfig,
    pub(super) slot: CorrelationSlot,
    pub(super) session: Mutex<CriticalSectionRawMutex, RefCell<Session>>,
    pub(super) observers: Mutex<CriticalSectionRawMutex, RefCell<Observers<'a>>>,
}

/// Releases the slot when a blocking operation ends, however it ends.
struct Claim<'s> {
    slot: &'s CorrelationSlot,
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        self.slot.release();
    }
}

impl<'a, B, M> BleClient<'a, B, M>
where
    B: Bus,
    M: Monotonic,
{
    pub const fn new(bus: B, clock: M) -> Self {
        Self::with_config(bus, clock, ClientConfig::DEFAULT)
    }

    pub const fn with_config(bus: B, clock: M, config: ClientConfig) -> Self {
        Self {
            bus,
            clock,
            config,
            slot: CorrelationSlot::new(),
            session: Mutex::new(RefCell::new(Session::new())),
            observers: Mutex::new(RefCell::new(Observers::none())),
        }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Snapshot of the session state.
    pub fn session(&self) -> Session {
        self.session.lock(|s| *s.borrow())
    }

    pub fn is_connected(&self) -> bool {
        self.session().is_connected()
    }

    /// Handle of the current connection, `None` while disconnected.
    pub fn conn_handle(&self) -> Option<u16> {
        self.session().connection()
    }

    /// Open service session, `None` until [`initialize`](Self::initialize) succeeded.
    pub fn service(&self) -> Option<ServiceHandle> {
        self.session().service()
    }

    pub fn is_initialized(&self) -> bool {
        self.service().is_some()
    }

    /// Bring up the transport and open the BLE core service.
    ///
    /// Waits for the service to become available, then for the open to be
    /// acknowledged. Observers are installed only after both steps
    /// succeeded, so no event reaches caller code earlier.
    pub fn initialize(
        &self,
        gap_observer: Option<&'a dyn GapObserver>,
        gatts_observer: Option<&'a dyn GattsObserver>,
    ) -> Result<(), Error> {
        self.bus.bring_up().map_err(Error::Submit)?;

        self.transact(
            ResponseKind::ServiceAvailable,
            Command::RegisterServiceAvailable {
                service_id: BLE_CORE_SERVICE_ID,
            },
        )?;

        wait::settle(&self.clock, self.config.settle_delay);

        let service = match self.transact(
            ResponseKind::ServiceOpened,
            Command::OpenService {
                service_id: BLE_CORE_SERVICE_ID,
            },
        )? {
            Output::Service(service) => service,
            _ => return Err(Error::Controller(Status::Error)),
        };

        self.session.lock(|s| s.borrow_mut().opened(service));
        self.observers.lock(|o| {
            *o.borrow_mut() = Observers {
                gap: gap_observer,
                gatts: gatts_observer,
            }
        });

        info!("BLE core service open: {}", service);
        Ok(())
    }

    /// Submit `command` and block until its response or the timeout.
    pub(super) fn transact(
        &self,
        expect: ResponseKind,
        command: Command<'_>,
    ) -> Result<Output, Error> {
        let _claim = self.claim()?;
        let token = self.slot.arm(expect);
        let kind = command.kind();

        let request = Request {
            service: self.service(),
            token,
            command,
        };
        if let Err(e) = self.bus.submit(request) {
            warn!("submit {} failed: {}", kind, e);
            self.slot.disarm();
            return Err(Error::Submit(e));
        }
        trace!("submitted {} token={}", kind, token.0);

        if wait::wait_until(&self.clock, self.config.response_timeout, || {
            self.slot.is_complete()
        }) == WaitOutcome::TimedOut
        {
            warn!("{} timed out (token={})", kind, token.0);
            self.slot.disarm();
            return Err(Error::Timeout);
        }

        let Some(completion) = self.slot.take() else {
            return Err(Error::Timeout);
        };

        if completion.status.is_success() {
            Ok(completion.output)
        } else {
            debug!("{} failed: {}", kind, completion.status);
            Err(Error::Controller(completion.status))
        }
    }

    /// Submit without waiting. The acknowledgement is discarded by the
    /// dispatcher. Never touches the slot, so it is safe from observers.
    pub(super) fn fire(&self, command: Command<'_>) -> Result<(), Error> {
        let kind = command.kind();
        let request = Request {
            service: self.service(),
            token: self.slot.next_token(),
            command,
        };
        self.bus.submit(request).map_err(|e| {
            warn!("submit {} failed: {}", kind, e);
            Error::Submit(e)
        })
    }

    /// Current connection handle, or `WrongState` before touching the bus.
    pub(super) fn require_connection(&self) -> Result<u16, Error> {
        self.conn_handle().ok_or(Error::WrongState)
    }

    /// Wait for exclusive use of the slot, bounded by the response timeout.
    fn claim(&self) -> Result<Claim<'_>, Error> {
        match wait::wait_until(&self.clock, self.config.response_timeout, || {
            self.slot.try_claim()
        }) {
            WaitOutcome::Ready => Ok(Claim { slot: &self.slot }),
            WaitOutcome::TimedOut => {
                warn!("slot busy, giving up");
                Err(Error::Timeout)
            }
        }
    }
}
