//! GATT server operations: attribute table registration and value updates.

use super::bus::{Bus, Characteristic, Command, Descriptor, NotifyParams, ServiceKind};
use super::client::BleClient;
use super::event::CharacteristicHandles;
use super::slot::{Output, ResponseKind};
use super::wait::Monotonic;
use super::{Status, Uuid};
use crate::error::Error;

impl<'a, B, M> BleClient<'a, B, M>
where
    B: Bus,
    M: Monotonic,
{
    /// Register a service; returns the handle the controller assigned.
    pub fn add_service(&self, uuid: Uuid, kind: ServiceKind) -> Result<u16, Error> {
        let output = self.transact(ResponseKind::ServiceAdded, Command::AddService { uuid, kind })?;
        handle_of(output)
    }

    /// Reference `included` from `primary` as an included service.
    pub fn include_service(&self, primary: u16, included: u16) -> Result<(), Error> {
        self.transact(
            ResponseKind::IncludedServiceAdded,
            Command::IncludeService { primary, included },
        )?;
        Ok(())
    }

    /// Add a characteristic to `service`.
    pub fn add_characteristic(
        &self,
        service: u16,
        characteristic: &Characteristic<'_>,
    ) -> Result<CharacteristicHandles, Error> {
        let output = self.transact(
            ResponseKind::CharacteristicAdded,
            Command::AddCharacteristic {
                service,
                characteristic,
            },
        )?;
        match output {
            Output::Characteristic(handles) => Ok(handles),
            _ => Err(Error::Controller(Status::Error)),
        }
    }

    /// Add a descriptor to the last characteristic of `service`.
    pub fn add_descriptor(&self, service: u16, descriptor: &Descriptor<'_>) -> Result<u16, Error> {
        let output = self.transact(
            ResponseKind::DescriptorAdded,
            Command::AddDescriptor {
                service,
                descriptor,
            },
        )?;
        handle_of(output)
    }

    /// Write `value` at `offset` into the local attribute `handle`.
    pub fn set_attribute_value(&self, handle: u16, offset: u16, value: &[u8]) -> Result<(), Error> {
        check_len(value)?;
        self.transact(
            ResponseKind::AttributeValueSet,
            Command::SetAttributeValue {
                handle,
                offset,
                value,
            },
        )?;
        Ok(())
    }

    /// Push a value to the connected peer, as an indication (acknowledged
    /// by the peer) or a notification.
    pub fn send_notification(
        &self,
        value_handle: u16,
        offset: u16,
        data: &[u8],
        indication: bool,
    ) -> Result<(), Error> {
        let conn_handle = self.require_connection()?;
        check_len(data)?;
        let params = NotifyParams {
            value_handle,
            offset,
            data,
        };
        let (expect, command) = if indication {
            (
                ResponseKind::IndicationSent,
                Command::SendIndication {
                    conn_handle,
                    params,
                },
            )
        } else {
            (
                ResponseKind::NotificationSent,
                Command::SendNotification {
                    conn_handle,
                    params,
                },
            )
        };
        self.transact(expect, command)?;
        Ok(())
    }
}

fn handle_of(output: Output) -> Result<u16, Error> {
    match output {
        Output::Handle(handle) => Ok(handle),
        _ => Err(Error::Controller(Status::Error)),
    }
}

/// Attribute lengths travel as u16.
fn check_len(value: &[u8]) -> Result<(), Error> {
    if value.len() > usize::from(u16::MAX) {
        return Err(Error::PayloadTooLarge {
            len: value.len(),
            max: usize::from(u16::MAX),
        });
    }
    Ok(())
}
