//! Outbound side of the controller bus: the command set and the submit contract.
//!
//! Payloads borrow from the caller for the duration of [`Bus::submit`]; a
//! bus implementation that queues commands must copy what it needs before
//! returning.

use core::ops::BitOr;

use super::{BleAddress, ServiceHandle, Uuid};
use crate::config;
use crate::error::SubmitError;

/// Correlation token attached to every submitted command.
///
/// Controllers that echo it back in the response let the dispatcher drop
/// responses that belong to an abandoned (timed-out) request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Token(pub u32);

/// Asynchronous command transport towards the controller.
pub trait Bus {
    /// Bring up the underlying transport. Called once by
    /// [`BleClient::initialize`](super::BleClient::initialize).
    fn bring_up(&self) -> Result<(), SubmitError> {
        Ok(())
    }

    /// Queue a command. Must not block on the controller's response.
    fn submit(&self, request: Request<'_>) -> Result<(), SubmitError>;
}

impl<B: Bus + ?Sized> Bus for &B {
    fn bring_up(&self) -> Result<(), SubmitError> {
        (**self).bring_up()
    }

    fn submit(&self, request: Request<'_>) -> Result<(), SubmitError> {
        (**self).submit(request)
    }
}

/// One outbound message.
#[derive(Debug, Clone, Copy)]
pub struct Request<'a> {
    /// Open service session, `None` until initialization opened it.
    pub service: Option<ServiceHandle>,
    pub token: Token,
    pub command: Command<'a>,
}

/// Every command the client can issue.
#[derive(Debug, Clone, Copy)]
pub enum Command<'a> {
    /// Ask to be told when `service_id` becomes available.
    RegisterServiceAvailable { service_id: u16 },
    /// Open a client session to `service_id`.
    OpenService { service_id: u16 },
    WriteConfig(&'a GapConfig<'a>),
    ConfigureSecurity(SecurityParams),
    ReadAddress,
    WriteAdvData(&'a [u8]),
    StartAdvertising(AdvParams),
    StopAdvertising,
    AddService {
        uuid: Uuid,
        kind: ServiceKind,
    },
    IncludeService {
        primary: u16,
        included: u16,
    },
    AddCharacteristic {
        service: u16,
        characteristic: &'a Characteristic<'a>,
    },
    AddDescriptor {
        service: u16,
        descriptor: &'a Descriptor<'a>,
    },
    SetAttributeValue {
        handle: u16,
        offset: u16,
        value: &'a [u8],
    },
    SendNotification {
        conn_handle: u16,
        params: NotifyParams<'a>,
    },
    SendIndication {
        conn_handle: u16,
        params: NotifyParams<'a>,
    },
    Disconnect {
        conn_handle: u16,
        reason: u8,
    },
    SetRssiReport {
        conn_handle: u16,
        state: RssiReportState,
    },
}

/// Payload-free tag of a [`Command`], for logging and bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandKind {
    RegisterServiceAvailable,
    OpenService,
    WriteConfig,
    ConfigureSecurity,
    ReadAddress,
    WriteAdvData,
    StartAdvertising,
    StopAdvertising,
    AddService,
    IncludeService,
    AddCharacteristic,
    AddDescriptor,
    SetAttributeValue,
    SendNotification,
    SendIndication,
    Disconnect,
    SetRssiReport,
}

impl Command<'_> {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::RegisterServiceAvailable { .. } => CommandKind::RegisterServiceAvailable,
            Command::OpenService { .. } => CommandKind::OpenService,
            Command::WriteConfig(_) => CommandKind::WriteConfig,
            Command::ConfigureSecurity(_) => CommandKind::ConfigureSecurity,
            Command::ReadAddress => CommandKind::ReadAddress,
            Command::WriteAdvData(_) => CommandKind::WriteAdvData,
            Command::StartAdvertising(_) => CommandKind::StartAdvertising,
            Command::StopAdvertising => CommandKind::StopAdvertising,
            Command::AddService { .. } => CommandKind::AddService,
            Command::IncludeService { .. } => CommandKind::IncludeService,
            Command::AddCharacteristic { .. } => CommandKind::AddCharacteristic,
            Command::AddDescriptor { .. } => CommandKind::AddDescriptor,
            Command::SetAttributeValue { .. } => CommandKind::SetAttributeValue,
            Command::SendNotification { .. } => CommandKind::SendNotification,
            Command::SendIndication { .. } => CommandKind::SendIndication,
            Command::Disconnect { .. } => CommandKind::Disconnect,
            Command::SetRssiReport { .. } => CommandKind::SetRssiReport,
        }
    }

    /// Connection the command is scoped to, if any.
    pub fn conn_handle(&self) -> Option<u16> {
        match self {
            Command::SendNotification { conn_handle, .. }
            | Command::SendIndication { conn_handle, .. }
            | Command::Disconnect { conn_handle, .. }
            | Command::SetRssiReport { conn_handle, .. } => Some(*conn_handle),
            _ => None,
        }
    }
}

// GAP payloads

/// Connection parameters in controller units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConnParams {
    /// 1.25 ms units.
    pub interval_min: u16,
    /// 1.25 ms units.
    pub interval_max: u16,
    pub slave_latency: u16,
    /// 10 ms units.
    pub link_sup_timeout: u16,
}

impl ConnParams {
    /// 80-150 ms interval, no latency, 6 s supervision timeout.
    pub const fn preferred() -> Self {
        Self {
            interval_min: config::CONN_INTERVAL_MIN,
            interval_max: config::CONN_INTERVAL_MAX,
            slave_latency: config::SLAVE_LATENCY,
            link_sup_timeout: config::CONN_SUP_TIMEOUT,
        }
    }
}

/// Device identity and connection preferences written in one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GapConfig<'a> {
    /// `None` keeps the controller's own address.
    pub address: Option<BleAddress>,
    pub name: &'a str,
    pub appearance: u16,
    /// dBm.
    pub tx_power: i8,
    pub peripheral_conn: ConnParams,
    pub central_conn: ConnParams,
}

/// Pairing I/O capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoCapabilities {
    DisplayOnly,
    DisplayYesNo,
    KeyboardOnly,
    NoInputNoOutput,
    KeyboardDisplay,
}

/// Security manager configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SecurityParams {
    pub bonding: bool,
    pub io_caps: IoCapabilities,
    pub key_size: u8,
}

impl SecurityParams {
    /// Bonding on, "just works" pairing, full-length key.
    pub const fn bonding_no_io() -> Self {
        Self {
            bonding: true,
            io_caps: IoCapabilities::NoInputNoOutput,
            key_size: config::SECURITY_KEY_SIZE,
        }
    }
}

/// Advertising PDU type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdvType {
    ConnectableUndirected,
    ConnectableDirected,
    ScannableUndirected,
    NonConnectableUndirected,
}

/// Which scan / connect requests the advertiser accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FilterPolicy {
    Any,
    FilterScan,
    FilterConnect,
    FilterBoth,
}

/// Advertising option bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdvOptions(pub u8);

impl AdvOptions {
    pub const DEFAULT: Self = Self(0x00);
    pub const SLOW: Self = Self(0x01);
    pub const NON_DISCOVERABLE: Self = Self(0x02);

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for AdvOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Advertising presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdvProfile {
    /// Fast discoverable advertising, used by `start_advertising`.
    UltraFast,
    /// Slow discoverable advertising.
    Discoverable,
    /// Fast advertising without the discoverable flag.
    NonDiscoverableFast,
    /// Slow advertising without the discoverable flag, no timeout.
    NonDiscoverableSlow,
}

impl AdvProfile {
    /// Interval (0.625 ms units) and default timeout (s) of the preset.
    pub const fn interval_and_timeout(self) -> (u16, u16) {
        match self {
            AdvProfile::UltraFast => (
                config::ULTRA_FAST_ADV_INTERVAL,
                config::ULTRA_FAST_ADV_TIMEOUT_SECS,
            ),
            AdvProfile::Discoverable => (config::DISC_ADV_INTERVAL, config::DISC_ADV_TIMEOUT_SECS),
            AdvProfile::NonDiscoverableFast => (
                config::NON_DISC_ADV_FAST_INTERVAL,
                config::NON_DISC_ADV_FAST_TIMEOUT_SECS,
            ),
            AdvProfile::NonDiscoverableSlow => (
                config::NON_DISC_ADV_SLOW_INTERVAL,
                config::NON_DISC_ADV_SLOW_TIMEOUT_SECS,
            ),
        }
    }

    pub const fn options(self) -> AdvOptions {
        match self {
            AdvProfile::UltraFast => AdvOptions::DEFAULT,
            AdvProfile::Discoverable => AdvOptions::SLOW,
            AdvProfile::NonDiscoverableFast => AdvOptions::NON_DISCOVERABLE,
            AdvProfile::NonDiscoverableSlow => {
                AdvOptions(AdvOptions::SLOW.0 | AdvOptions::NON_DISCOVERABLE.0)
            }
        }
    }
}

/// Advertising parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdvParams {
    /// Seconds, 0 = no timeout.
    pub timeout: u16,
    /// 0.625 ms units.
    pub interval_min: u16,
    /// 0.625 ms units.
    pub interval_max: u16,
    pub adv_type: AdvType,
    pub filter_policy: FilterPolicy,
    /// Target of directed advertising.
    pub peer: Option<BleAddress>,
    pub options: AdvOptions,
}

impl AdvParams {
    /// Connectable undirected advertising with a preset interval.
    pub const fn from_profile(profile: AdvProfile, timeout: u16) -> Self {
        let (interval, _) = profile.interval_and_timeout();
        Self {
            timeout,
            interval_min: interval,
            interval_max: interval,
            adv_type: AdvType::ConnectableUndirected,
            filter_policy: FilterPolicy::Any,
            peer: None,
            options: profile.options(),
        }
    }
}

/// RSSI reporting switch for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RssiReportState {
    Disable,
    Enable,
}

// GATT server payloads

/// Service declaration type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServiceKind {
    Primary,
    Secondary,
}

/// Characteristic property bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CharProps(pub u8);

impl CharProps {
    pub const BROADCAST: Self = Self(0x01);
    pub const READ: Self = Self(0x02);
    pub const WRITE_WITHOUT_RESPONSE: Self = Self(0x04);
    pub const WRITE: Self = Self(0x08);
    pub const NOTIFY: Self = Self(0x10);
    pub const INDICATE: Self = Self(0x20);

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for CharProps {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Access requirement for reading or writing an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Access {
    Denied,
    Open,
    Encrypted,
    Authenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AttrPerms {
    pub read: Access,
    pub write: Access,
}

impl AttrPerms {
    pub const READ_ONLY: Self = Self {
        read: Access::Open,
        write: Access::Denied,
    };
    pub const READ_WRITE: Self = Self {
        read: Access::Open,
        write: Access::Open,
    };
}

/// Characteristic to register inside a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Characteristic<'a> {
    pub uuid: Uuid,
    pub props: CharProps,
    pub perms: AttrPerms,
    pub init_value: &'a [u8],
    pub max_len: u16,
    /// Adds a user description descriptor when set.
    pub user_description: Option<&'a str>,
}

/// Extra descriptor attached to the most recently added characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor<'a> {
    pub uuid: Uuid,
    pub perms: AttrPerms,
    pub value: &'a [u8],
}

/// Value pushed to the peer by a notification or indication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotifyParams<'a> {
    pub value_handle: u16,
    pub offset: u16,
    pub data: &'a [u8],
}
