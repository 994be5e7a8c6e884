//! ZCL (Zigbee Cluster Library) identifiers used by the sensor profiles

/// ZCL cluster IDs
pub mod id {
    // General Clusters
    pub const BASIC: u16 = 0x0000;
    pub const POWER_CONFIG: u16 = 0x0001;

    // Measurement Clusters
    pub const TEMPERATURE_MEASUREMENT: u16 = 0x0402;
    pub const PRESSURE_MEASUREMENT: u16 = 0x0403;
    pub const HUMIDITY_MEASUREMENT: u16 = 0x0405;
}

/// Manufacturer-specific configuration attributes on the Basic cluster
pub mod config_attrs {
    /// uint16, seconds
    pub const SENSOR_READ_INTERVAL: u16 = 0xF000;
    /// int16, 0.01 °C
    pub const TEMPERATURE_OFFSET: u16 = 0xF001;
    /// int16, 0.01 %RH
    pub const HUMIDITY_OFFSET: u16 = 0xF002;
    /// int16, 0.01 kPa
    pub const PRESSURE_OFFSET: u16 = 0xF003;
    /// boolean
    pub const LED_ENABLE: u16 = 0xF004;
    /// uint16, 0.01 °C
    pub const REPORT_THRESHOLD_TEMPERATURE: u16 = 0xF010;
    /// uint16, 0.01 %RH
    pub const REPORT_THRESHOLD_HUMIDITY: u16 = 0xF011;
    /// uint16, 0.01 kPa
    pub const REPORT_THRESHOLD_PRESSURE: u16 = 0xF012;
}

/// First attribute ID of the manufacturer-specific range
pub const MANUFACTURER_SPECIFIC_START: u16 = 0xF000;

/// Check whether an attribute ID lies in the manufacturer-specific range
#[must_use]
pub fn is_manufacturer_specific(attribute_id: u16) -> bool {
    attribute_id >= MANUFACTURER_SPECIFIC_START
}

/// Expose access flags
pub mod access {
    /// Value is published in the device state
    pub const STATE: u8 = 0b001;
    /// Value can be written
    pub const SET: u8 = 0b010;
    /// Value can be read on demand
    pub const GET: u8 = 0b100;
    pub const STATE_SET: u8 = STATE | SET;
    pub const ALL: u8 = STATE | SET | GET;
}
