//! Correlation slot - hands a response from the dispatcher back to the
//! blocked caller.
//!
//! One request is outstanding at a time. The owner arms the slot with a
//! fresh [`Token`] and the [`ResponseKind`] it expects; the dispatcher
//! completes it with the first matching response. Anything else (wrong
//! kind, stale token, nothing armed, already completed) is rejected and
//! reported back as a [`Delivery`] so it can be logged and dropped.
//!
//! State sits behind a critical-section mutex, so writes from the
//! dispatcher's context are visible to the spinning caller.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use super::bus::Token;
use super::event::CharacteristicHandles;
use super::{BleAddress, ServiceHandle, Status};

/// Response categories a blocking operation can wait for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResponseKind {
    ServiceAvailable,
    ServiceOpened,
    ConfigWritten,
    AddressRead,
    SecurityConfigured,
    AdvDataWritten,
    ServiceAdded,
    IncludedServiceAdded,
    CharacteristicAdded,
    DescriptorAdded,
    AttributeValueSet,
    NotificationSent,
    IndicationSent,
    DisconnectDone,
    RssiReportSet,
}

/// Value a response hands back besides its status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Output {
    None,
    Service(ServiceHandle),
    Address(BleAddress),
    Handle(u16),
    Characteristic(CharacteristicHandles),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Completion {
    pub status: Status,
    pub output: Output,
}

/// What happened to a response offered to the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Delivery {
    Accepted,
    /// Nobody is waiting (late response after a timeout, or unsolicited).
    NotArmed,
    /// The armed request expects a different response.
    WrongKind,
    /// Token belongs to an earlier request.
    StaleToken,
    /// The armed request was already answered.
    AlreadyComplete,
}

#[derive(Clone, Copy)]
struct Pending {
    token: Token,
    expect: ResponseKind,
}

struct SlotState {
    next_token: u32,
    claimed: bool,
    pending: Option<Pending>,
    completion: Option<Completion>,
}

impl SlotState {
    fn issue_token(&mut self) -> Token {
        let token = Token(self.next_token);
        self.next_token = self.next_token.wrapping_add(1);
        token
    }
}

pub struct CorrelationSlot {
    state: Mutex<CriticalSectionRawMutex, RefCell<SlotState>>,
}

impl CorrelationSlot {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(SlotState {
                next_token: 1,
                claimed: false,
                pending: None,
                completion: None,
            })),
        }
    }

    /// Take exclusive ownership of the slot. Returns `false` if another
    /// operation holds it.
    pub fn try_claim(&self) -> bool {
        self.state.lock(|s| {
            let mut s = s.borrow_mut();
            if s.claimed {
                false
            } else {
                s.claimed = true;
                true
            }
        })
    }

    /// Give up ownership and forget any outstanding request.
    pub fn release(&self) {
        self.state.lock(|s| {
            let mut s = s.borrow_mut();
            s.claimed = false;
            s.pending = None;
            s.completion = None;
        });
    }

    /// Reset and wait for a response of kind `expect`.
    pub fn arm(&self, expect: ResponseKind) -> Token {
        self.state.lock(|s| {
            let mut s = s.borrow_mut();
            let token = s.issue_token();
            s.pending = Some(Pending { token, expect });
            s.completion = None;
            token
        })
    }

    /// Stop waiting; later responses are reported as [`Delivery::NotArmed`].
    pub fn disarm(&self) {
        self.state.lock(|s| {
            let mut s = s.borrow_mut();
            s.pending = None;
            s.completion = None;
        });
    }

    /// Token for a command nobody waits on (fire-and-forget).
    pub fn next_token(&self) -> Token {
        self.state.lock(|s| s.borrow_mut().issue_token())
    }

    /// Offer a response. `token` is `None` when the controller does not echo
    /// tokens; the kind check still applies.
    pub fn complete(
        &self,
        token: Option<Token>,
        kind: ResponseKind,
        completion: Completion,
    ) -> Delivery {
        self.state.lock(|s| {
            let mut s = s.borrow_mut();
            let Some(pending) = s.pending else {
                return Delivery::NotArmed;
            };
            if token.is_some_and(|t| t != pending.token) {
                return Delivery::StaleToken;
            }
            if pending.expect != kind {
                return Delivery::WrongKind;
            }
            if s.completion.is_some() {
                return Delivery::AlreadyComplete;
            }
            s.completion = Some(completion);
            Delivery::Accepted
        })
    }

    pub fn is_complete(&self) -> bool {
        self.state.lock(|s| s.borrow().completion.is_some())
    }

    /// Collect the completion and disarm.
    pub fn take(&self) -> Option<Completion> {
        self.state.lock(|s| {
            let mut s = s.borrow_mut();
            let completion = s.completion.take();
            if completion.is_some() {
                s.pending = None;
            }
            completion
        })
    }
}

impl Default for CorrelationSlot {
    fn default() -> Self {
        Self::new()
    }
}
