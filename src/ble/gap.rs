//! GAP operations: identity, advertising, connection control.

use super::bus::{
    AdvParams, AdvProfile, Bus, Command, ConnParams, GapConfig, RssiReportState, SecurityParams,
};
use super::client::BleClient;
use super::slot::{Output, ResponseKind};
use super::wait::Monotonic;
use super::{BleAddress, Status};
use crate::config::MAX_ADV_DATA_LEN;
use crate::error::Error;

impl<'a, B, M> BleClient<'a, B, M>
where
    B: Bus,
    M: Monotonic,
{
    /// Write device name, appearance and TX power together with the
    /// preferred connection parameters, then configure bonding.
    ///
    /// Two commands; a failure of the first skips the second.
    pub fn set_enable_config(&self, name: &str, appearance: u16, tx_power: i8) -> Result<(), Error> {
        let config = GapConfig {
            address: None,
            name,
            appearance,
            tx_power,
            peripheral_conn: ConnParams::preferred(),
            central_conn: ConnParams::preferred(),
        };
        self.transact(ResponseKind::ConfigWritten, Command::WriteConfig(&config))?;

        self.transact(
            ResponseKind::SecurityConfigured,
            Command::ConfigureSecurity(SecurityParams::bonding_no_io()),
        )?;
        Ok(())
    }

    /// Read the controller's own device address.
    pub fn read_address(&self) -> Result<BleAddress, Error> {
        match self.transact(ResponseKind::AddressRead, Command::ReadAddress)? {
            Output::Address(address) => Ok(address),
            _ => Err(Error::Controller(Status::Error)),
        }
    }

    /// Replace the advertising payload (at most 31 bytes).
    pub fn write_adv_data(&self, data: &[u8]) -> Result<(), Error> {
        if data.len() > MAX_ADV_DATA_LEN {
            return Err(Error::PayloadTooLarge {
                len: data.len(),
                max: MAX_ADV_DATA_LEN,
            });
        }
        self.transact(ResponseKind::AdvDataWritten, Command::WriteAdvData(data))?;
        Ok(())
    }

    /// Start connectable advertising with the ultra-fast preset.
    ///
    /// Fire-and-forget: returns the submission result without waiting, so
    /// it can be called from a disconnect observer to resume advertising.
    pub fn start_advertising(&self, timeout_secs: u16) -> Result<(), Error> {
        self.start_advertising_with(&AdvParams::from_profile(
            AdvProfile::UltraFast,
            timeout_secs,
        ))
    }

    /// [`start_advertising`](Self::start_advertising) with explicit parameters.
    pub fn start_advertising_with(&self, params: &AdvParams) -> Result<(), Error> {
        self.fire(Command::StartAdvertising(*params))
    }

    /// Stop advertising. Fire-and-forget, like `start_advertising`.
    pub fn stop_advertising(&self) -> Result<(), Error> {
        self.fire(Command::StopAdvertising)
    }

    /// Drop the current connection with an HCI reason code.
    pub fn disconnect(&self, reason: u8) -> Result<(), Error> {
        let conn_handle = self.require_connection()?;
        self.transact(
            ResponseKind::DisconnectDone,
            Command::Disconnect {
                conn_handle,
                reason,
            },
        )?;
        Ok(())
    }

    /// Turn RSSI sampling for the current connection on or off.
    pub fn set_rssi_report(&self, enable: bool) -> Result<(), Error> {
        let conn_handle = self.require_connection()?;
        let state = if enable {
            RssiReportState::Enable
        } else {
            RssiReportState::Disable
        };
        self.transact(
            ResponseKind::RssiReportSet,
            Command::SetRssiReport { conn_handle, state },
        )?;
        Ok(())
    }
}
