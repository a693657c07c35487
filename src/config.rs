//! Client-wide constants and runtime configuration.
//!
//! Connection parameters, advertising presets, security settings, and
//! timing bounds live here so they can be tuned in one place.

use core::time::Duration;

// Controller service

/// Service id of the BLE core service on the controller bus.
pub const BLE_CORE_SERVICE_ID: u16 = 4;

// Timing

/// Upper bound on each blocking wait for a controller response (ms).
pub const RESPONSE_TIMEOUT_MS: u64 = 1000;

/// Pause between "service available" and opening the service (µs).
/// Matches 32 ticks of the 32 768 Hz uptime counter.
pub const SERVICE_SETTLE_US: u64 = 977;

// Controller time units (µs per unit)

/// 0.625 ms - advertising intervals.
pub const UNIT_0_625_MS: u32 = 625;
/// 1.25 ms - connection intervals.
pub const UNIT_1_25_MS: u32 = 1250;
/// 10 ms - supervision timeouts.
pub const UNIT_10_MS: u32 = 10_000;

/// Convert milliseconds into controller units of `resolution_us` microseconds.
pub const fn msec_to_units(ms: u32, resolution_us: u32) -> u16 {
    ((ms * 1000) / resolution_us) as u16
}

// Connection parameters (peripheral preferred + central)

/// Minimum connection interval: 80 ms in 1.25 ms units.
pub const CONN_INTERVAL_MIN: u16 = msec_to_units(80, UNIT_1_25_MS);
/// Maximum connection interval: 150 ms in 1.25 ms units.
pub const CONN_INTERVAL_MAX: u16 = msec_to_units(150, UNIT_1_25_MS);
/// Connection events the peripheral may skip.
pub const SLAVE_LATENCY: u16 = 0;
/// Supervision timeout: 6 s in 10 ms units.
pub const CONN_SUP_TIMEOUT: u16 = msec_to_units(6000, UNIT_10_MS);

// Advertising presets (interval in 0.625 ms units, timeout in seconds)

pub const ULTRA_FAST_ADV_INTERVAL: u16 = 32;
pub const ULTRA_FAST_ADV_TIMEOUT_SECS: u16 = 180;

pub const DISC_ADV_INTERVAL: u16 = 160;
pub const DISC_ADV_TIMEOUT_SECS: u16 = 180;

pub const NON_DISC_ADV_FAST_INTERVAL: u16 = 160;
pub const NON_DISC_ADV_FAST_TIMEOUT_SECS: u16 = 30;

/// 0 = advertise until stopped.
pub const NON_DISC_ADV_SLOW_INTERVAL: u16 = 2056;
pub const NON_DISC_ADV_SLOW_TIMEOUT_SECS: u16 = 0;

// Security

/// Encryption key size negotiated during pairing (bytes).
pub const SECURITY_KEY_SIZE: u8 = 16;

// Payload limits

/// Legacy advertising payload limit (bytes).
pub const MAX_ADV_DATA_LEN: usize = 31;

/// Largest peer write carried in an event (ATT MTU 247 minus header).
pub const MAX_WRITE_LEN: usize = 244;

/// Runtime knobs for a [`BleClient`](crate::ble::BleClient).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// How long a blocking operation waits for its response.
    pub response_timeout: Duration,
    /// Delay inserted between service discovery and opening the service.
    pub settle_delay: Duration,
}

impl ClientConfig {
    pub const DEFAULT: Self = Self {
        response_timeout: Duration::from_millis(RESPONSE_TIMEOUT_MS),
        settle_delay: Duration::from_micros(SERVICE_SETTLE_US),
    };

    /// Same settings with a different response timeout.
    pub const fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_parameters_in_controller_units() {
        assert_eq!(CONN_INTERVAL_MIN, 64);
        assert_eq!(CONN_INTERVAL_MAX, 120);
        assert_eq!(SLAVE_LATENCY, 0);
        assert_eq!(CONN_SUP_TIMEOUT, 600);
    }

    #[test]
    fn msec_to_units_truncates() {
        assert_eq!(msec_to_units(1, UNIT_0_625_MS), 1);
        assert_eq!(msec_to_units(100, UNIT_0_625_MS), 160);
        assert_eq!(msec_to_units(7, UNIT_10_MS), 0);
    }

    #[test]
    fn default_config_waits_one_second() {
        let config = ClientConfig::default();
        assert_eq!(config.response_timeout, Duration::from_secs(1));
        assert!(config.settle_delay < Duration::from_millis(2));
    }

    #[test]
    fn with_response_timeout_keeps_settle_delay() {
        let config = ClientConfig::DEFAULT.with_response_timeout(Duration::from_millis(50));
        assert_eq!(config.response_timeout, Duration::from_millis(50));
        assert_eq!(config.settle_delay, ClientConfig::DEFAULT.settle_delay);
    }
}
