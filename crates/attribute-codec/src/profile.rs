//! Device profiles: one field table per supported firmware, keyed by model

use crate::cluster::{access, config_attrs, id};
use crate::error::CodecError;
use crate::field::{AttributeField, Domain, Encoding, FieldTable, WireType};
use crate::value::ConfigRecord;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Manufacturer code of the OpenBME280 firmware
pub const OPENBME280_MANUFACTURER_CODE: u16 = 0x1002;

const CENTI: Encoding = Encoding::FixedPoint { scale: 100 };

fn default_cluster() -> u16 {
    id::BASIC
}

fn default_endpoint() -> u8 {
    1
}

fn default_access() -> u8 {
    access::ALL
}

/// Everything the converter needs to know about one device family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    /// Model identifiers reported by the device's Basic cluster
    pub models: Vec<String>,
    pub vendor: String,
    pub description: String,
    /// Cluster carrying the configuration attributes
    #[serde(default = "default_cluster")]
    pub cluster: u16,
    #[serde(default = "default_endpoint")]
    pub endpoint: u8,
    /// Manufacturer qualifier attached to reads and writes
    #[serde(default)]
    pub manufacturer_code: Option<u16>,
    /// Clusters the host binds to the coordinator during configure
    #[serde(default)]
    pub bind_clusters: Vec<u16>,
    /// Expose access flags for the configuration fields
    #[serde(default = "default_access")]
    pub access: u8,
    pub fields: FieldTable,
}

impl DeviceProfile {
    /// Check whether this profile handles a model identifier
    #[must_use]
    pub fn matches(&self, model: &str) -> bool {
        self.models.iter().any(|m| m == model)
    }

    /// Firmware default configuration
    #[must_use]
    pub fn defaults(&self) -> ConfigRecord {
        self.fields
            .iter()
            .filter_map(|f| f.default.map(|v| (f.name.as_str(), v)))
            .collect()
    }
}

/// What differs between firmware builds sharing the attribute layout
struct FirmwareVariant {
    temperature_threshold: Domain,
    humidity_threshold: Domain,
    pressure_threshold: Domain,
    temperature_unit: &'static str,
    /// Attach the long field descriptions to exposes
    descriptions: bool,
}

fn bme280_fields(variant: &FirmwareVariant) -> Vec<AttributeField> {
    let mut fields = bme280_layout(variant);
    if !variant.descriptions {
        for field in &mut fields {
            field.description = None;
        }
    }
    fields
}

fn bme280_layout(variant: &FirmwareVariant) -> Vec<AttributeField> {
    vec![
        AttributeField::numeric(
            "sensor_read_interval",
            config_attrs::SENSOR_READ_INTERVAL,
            Encoding::Raw,
            WireType::Uint16,
            Domain::new(10.0, 3600.0, 1.0),
        )
        .with_unit("s")
        .with_description("Sensor reading interval (10-3600 seconds)")
        .with_default(60_i64),
        AttributeField::numeric(
            "temperature_offset",
            config_attrs::TEMPERATURE_OFFSET,
            CENTI,
            WireType::Int16,
            Domain::new(-5.0, 5.0, 0.01),
        )
        .with_unit(variant.temperature_unit)
        .with_description("Temperature calibration offset (-5.0 to +5.0°C)")
        .with_default(0.0),
        AttributeField::numeric(
            "humidity_offset",
            config_attrs::HUMIDITY_OFFSET,
            CENTI,
            WireType::Int16,
            Domain::new(-10.0, 10.0, 0.01),
        )
        .with_unit("%")
        .with_description("Humidity calibration offset (-10.0 to +10.0%)")
        .with_default(0.0),
        AttributeField::numeric(
            "pressure_offset",
            config_attrs::PRESSURE_OFFSET,
            CENTI,
            WireType::Int16,
            Domain::new(-5.0, 5.0, 0.01),
        )
        .with_unit("kPa")
        .with_description("Pressure calibration offset (-5.0 to +5.0 kPa)")
        .with_default(0.0),
        AttributeField::boolean("led_enable", config_attrs::LED_ENABLE)
            .with_description("Enable or disable LED indicator")
            .with_default(true),
        AttributeField::numeric(
            "report_threshold_temperature",
            config_attrs::REPORT_THRESHOLD_TEMPERATURE,
            CENTI,
            WireType::Uint16,
            variant.temperature_threshold,
        )
        .with_unit(variant.temperature_unit)
        .with_description("Temperature change threshold for reporting (default: 1.0°C)")
        .with_default(1.0),
        AttributeField::numeric(
            "report_threshold_humidity",
            config_attrs::REPORT_THRESHOLD_HUMIDITY,
            CENTI,
            WireType::Uint16,
            variant.humidity_threshold,
        )
        .with_unit("%")
        .with_description("Humidity change threshold for reporting (default: 1.0%)")
        .with_default(1.0),
        AttributeField::numeric(
            "report_threshold_pressure",
            config_attrs::REPORT_THRESHOLD_PRESSURE,
            CENTI,
            WireType::Uint16,
            variant.pressure_threshold,
        )
        .with_unit("kPa")
        .with_description("Pressure change threshold for reporting (default: 0.01 kPa)")
        .with_default(0.01),
    ]
}

/// Profiles compiled into the converter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinProfile {
    /// EFR32MG1P board with a BME280, no manufacturer qualifier
    Efr32Bme280,
    /// IKEA TRADFRI module running the OpenBME280 firmware
    TradfriBme280,
}

impl BuiltinProfile {
    pub const ALL: [BuiltinProfile; 2] = [BuiltinProfile::Efr32Bme280, BuiltinProfile::TradfriBme280];

    /// Build the profile definition
    #[must_use]
    #[allow(clippy::missing_panics_doc)] // Panic only on an inconsistent built-in table
    pub fn profile(self) -> DeviceProfile {
        match self {
            BuiltinProfile::Efr32Bme280 => {
                let variant = FirmwareVariant {
                    temperature_threshold: Domain::new(0.01, 10.0, 0.01),
                    humidity_threshold: Domain::new(0.01, 10.0, 0.01),
                    pressure_threshold: Domain::new(0.01, 10.0, 0.01),
                    temperature_unit: "°C",
                    descriptions: true,
                };
                DeviceProfile {
                    models: vec!["EFR32MG1P_BME280".to_string()],
                    vendor: "Custom".to_string(),
                    description: "BME280 Temperature, Humidity, and Pressure Sensor".to_string(),
                    cluster: id::BASIC,
                    endpoint: 1,
                    manufacturer_code: None,
                    bind_clusters: vec![
                        id::TEMPERATURE_MEASUREMENT,
                        id::HUMIDITY_MEASUREMENT,
                        id::PRESSURE_MEASUREMENT,
                        id::POWER_CONFIG,
                    ],
                    access: access::ALL,
                    fields: FieldTable::new(bme280_fields(&variant))
                        .expect("built-in field table is valid"),
                }
            }
            BuiltinProfile::TradfriBme280 => {
                let variant = FirmwareVariant {
                    temperature_threshold: Domain::new(0.0, 10.0, 0.01),
                    humidity_threshold: Domain::new(0.0, 100.0, 0.01),
                    pressure_threshold: Domain::new(0.0, 10.0, 0.01),
                    temperature_unit: "C",
                    descriptions: false,
                };
                DeviceProfile {
                    models: vec!["TRADFRI-BME280".to_string()],
                    vendor: "OpenBME280".to_string(),
                    description: "Zigbee BME280/BMP280 sensor".to_string(),
                    cluster: id::BASIC,
                    endpoint: 1,
                    manufacturer_code: Some(OPENBME280_MANUFACTURER_CODE),
                    bind_clusters: Vec::new(),
                    access: access::STATE_SET,
                    fields: FieldTable::new(bme280_fields(&variant))
                        .expect("built-in field table is valid"),
                }
            }
        }
    }
}

/// Resolves device model strings to profiles
///
/// Profiles registered later take precedence over earlier ones, so loaded
/// definitions can override the built-ins.
#[derive(Debug, Clone, Default)]
pub struct ProfileRegistry {
    profiles: Vec<Arc<DeviceProfile>>,
}

impl ProfileRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in profile
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for builtin in BuiltinProfile::ALL {
            registry.register(builtin.profile());
        }
        registry
    }

    /// Add a profile
    pub fn register(&mut self, profile: DeviceProfile) {
        tracing::debug!(
            "Registered profile {} ({} fields)",
            profile.models.join(", "),
            profile.fields.len()
        );
        self.profiles.push(Arc::new(profile));
    }

    /// Find the profile for a model identifier
    #[allow(clippy::missing_errors_doc)]
    pub fn resolve(&self, model: &str) -> Result<Arc<DeviceProfile>, CodecError> {
        self.profiles
            .iter()
            .rev()
            .find(|p| p.matches(model))
            .cloned()
            .ok_or_else(|| CodecError::UnknownModel(model.to_string()))
    }

    /// All supported model identifiers
    #[must_use]
    pub fn models(&self) -> Vec<String> {
        let mut models: Vec<String> = self
            .profiles
            .iter()
            .flat_map(|p| p.models.iter().cloned())
            .collect();
        models.sort();
        models.dedup();
        models
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FieldValue;

    #[test]
    fn test_builtin_tables_build() {
        for builtin in BuiltinProfile::ALL {
            let profile = builtin.profile();
            assert_eq!(profile.fields.len(), 8);
            assert!(profile.fields.iter().all(|f| crate::cluster::is_manufacturer_specific(f.attribute_id)));
        }
    }

    #[test]
    fn test_manufacturer_codes() {
        assert_eq!(BuiltinProfile::Efr32Bme280.profile().manufacturer_code, None);
        assert_eq!(
            BuiltinProfile::TradfriBme280.profile().manufacturer_code,
            Some(0x1002)
        );
    }

    #[test]
    fn test_threshold_domains_differ() {
        let efr = BuiltinProfile::Efr32Bme280.profile();
        let tradfri = BuiltinProfile::TradfriBme280.profile();
        assert_eq!(efr.fields.get("report_threshold_humidity").unwrap().domain.max, 10.0);
        assert_eq!(
            tradfri.fields.get("report_threshold_humidity").unwrap().domain.max,
            100.0
        );
        assert_eq!(efr.fields.get("report_threshold_pressure").unwrap().domain.min, 0.01);
    }

    #[test]
    fn test_presentation_differs_per_firmware() {
        let efr = BuiltinProfile::Efr32Bme280.profile();
        let tradfri = BuiltinProfile::TradfriBme280.profile();

        let offset = efr.fields.get("temperature_offset").unwrap();
        assert_eq!(offset.unit.as_deref(), Some("°C"));
        assert!(offset.description.is_some());

        let offset = tradfri.fields.get("temperature_offset").unwrap();
        assert_eq!(offset.unit.as_deref(), Some("C"));
        assert!(tradfri.fields.iter().all(|f| f.description.is_none()));
        assert_eq!(
            tradfri.fields.get("report_threshold_pressure").unwrap().unit.as_deref(),
            Some("kPa")
        );
    }

    #[test]
    fn test_defaults() {
        let defaults = BuiltinProfile::Efr32Bme280.profile().defaults();
        assert_eq!(defaults.len(), 8);
        assert_eq!(defaults.get("sensor_read_interval"), Some(&FieldValue::Integer(60)));
        assert_eq!(defaults.get("led_enable"), Some(&FieldValue::Bool(true)));
        assert_eq!(
            defaults.get("report_threshold_pressure"),
            Some(&FieldValue::Number(0.01))
        );
    }

    #[test]
    fn test_registry_resolve() {
        let registry = ProfileRegistry::with_builtins();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.resolve("TRADFRI-BME280").unwrap().vendor, "OpenBME280");
        assert!(matches!(
            registry.resolve("unknown"),
            Err(CodecError::UnknownModel(m)) if m == "unknown"
        ));
        assert_eq!(registry.models(), vec!["EFR32MG1P_BME280", "TRADFRI-BME280"]);
    }

    #[test]
    fn test_registry_later_profile_wins() {
        let mut registry = ProfileRegistry::with_builtins();
        let mut custom = BuiltinProfile::TradfriBme280.profile();
        custom.vendor = "Patched".to_string();
        registry.register(custom);
        assert_eq!(registry.resolve("TRADFRI-BME280").unwrap().vendor, "Patched");
    }
}
