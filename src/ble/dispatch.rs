//! Inbound message router.
//!
//! Responses complete the correlation slot, advertising acks are dropped,
//! lifecycle events update the session before the observer runs, and
//! unknown kinds are dropped. Nothing here fails or blocks.

use super::bus::Bus;
use super::client::BleClient;
use super::event::{Event, EventEnvelope, GapEventKind, GattsEventKind, TimeoutReason};
use super::slot::Delivery;
use super::wait::Monotonic;

impl<'a, B, M> BleClient<'a, B, M>
where
    B: Bus,
    M: Monotonic,
{
    /// Handle one message from the bus. Call from whatever context the bus
    /// delivers in; the envelope is consumed.
    pub fn on_message(&self, envelope: EventEnvelope) {
        if let Some((kind, completion)) = envelope.event.response() {
            match self.slot.complete(envelope.token, kind, completion) {
                Delivery::Accepted => trace!("{} -> {}", kind, completion.status),
                dropped => debug!("dropped {} response: {}", kind, dropped),
            }
            return;
        }

        match &envelope.event {
            Event::AdvStarted { status } | Event::AdvStopped { status } => {
                trace!("advertising ack: {}", status);
            }
            Event::Connected { conn_handle, .. } => {
                info!("connected, handle={}", conn_handle);
                self.session.lock(|s| s.borrow_mut().on_connected(*conn_handle));
                self.notify_gap(GapEventKind::Connected, &envelope);
            }
            Event::Disconnected {
                conn_handle,
                reason,
            } => {
                info!("disconnected, handle={} reason={}", conn_handle, reason);
                self.session.lock(|s| s.borrow_mut().on_disconnected());
                self.notify_gap(GapEventKind::Disconnected, &envelope);
            }
            Event::Timeout { reason, .. } => {
                self.session.lock(|s| s.borrow_mut().on_disconnected());
                match reason {
                    TimeoutReason::Advertising => {
                        info!("advertising timed out");
                        self.notify_gap(GapEventKind::AdvertisingTimeout, &envelope);
                    }
                    TimeoutReason::Connection => {
                        info!("connection timed out");
                        self.notify_gap(GapEventKind::ConnectionTimeout, &envelope);
                    }
                    TimeoutReason::Other(code) => {
                        debug!("GAP timeout with unknown reason {}", code);
                    }
                }
            }
            Event::Rssi { .. } => self.notify_gap(GapEventKind::RssiSample, &envelope),
            Event::PeerWrite(_) => self.notify_gatts(GattsEventKind::Write, &envelope),
            Event::ServiceAvailable { service_id } => {
                trace!("ignoring availability of service {}", service_id);
            }
            Event::Unknown { kind } => trace!("unknown message kind {}", kind),
            // responses were routed above
            _ => {}
        }
    }

    fn notify_gap(&self, kind: GapEventKind, envelope: &EventEnvelope) {
        // copy out so the observer runs without the lock held
        let observer = self.observers.lock(|o| o.borrow().gap);
        if let Some(observer) = observer {
            observer.on_gap_event(kind, envelope);
        }
    }

    fn notify_gatts(&self, kind: GattsEventKind, envelope: &EventEnvelope) {
        let observer = self.observers.lock(|o| o.borrow().gatts);
        if let Some(observer) = observer {
            observer.on_gatts_event(kind, envelope);
        }
    }
}
