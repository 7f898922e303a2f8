//! Runtime settings loaded from the environment.
//!
//! Every value has a default matching the published tariffs, so an empty
//! environment yields a working configuration.

use std::env;

use crate::model::CarrierId;
use crate::tax::TaxPolicy;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Who bears transit risk; selects the insurance percentage.
pub enum RiskBearer {
    /// The carrier insures the goods.
    #[default]
    Carrier,
    /// The owner keeps the risk and pays the lower rate.
    Owner,
}

impl RiskBearer {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "carrier" => Some(Self::Carrier),
            "owner" => Some(Self::Owner),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Fuel surcharge fractions by carrier.
pub struct FuelRates {
    /// Global Courier Cargo.
    pub global_cargo: f64,
    /// Shree Anjani Courier, applied to the pre-tax subtotal.
    pub anjani: f64,
    /// Safexpress.
    pub safexpress: f64,
    /// Bluedart, applied to base freight only.
    pub bluedart: f64,
}

impl Default for FuelRates {
    fn default() -> Self {
        Self {
            global_cargo: 0.10,
            anjani: 0.15,
            safexpress: 0.10,
            bluedart: 0.30,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Settings shared by every carrier configuration.
pub struct Settings {
    /// GST rates.
    pub tax: TaxPolicy,
    /// Insurance risk bearer.
    pub risk: RiskBearer,
    /// Storage days free of demurrage.
    pub free_storage_days: u32,
    /// Fuel surcharge fractions.
    pub fuel: FuelRates,
    /// Default tracing filter directive.
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tax: TaxPolicy::default(),
            risk: RiskBearer::default(),
            free_storage_days: 3,
            fuel: FuelRates::default(),
            log_level: "info".to_owned(),
        }
    }
}

impl Settings {
    /// Load settings from `FREIGHTQUOTE_*` variables, reading a `.env` file first when present.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a present value cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let fraction = |key: &str, fallback: f64| -> Result<f64, ConfigError> {
            lookup(key).map_or(Ok(fallback), |raw| parse_fraction(key, &raw))
        };

        let risk = match lookup("FREIGHTQUOTE_RISK") {
            Some(raw) => RiskBearer::parse(&raw).ok_or_else(|| ConfigError::InvalidChoice {
                key: "FREIGHTQUOTE_RISK".to_owned(),
                value: raw,
                expected: "carrier, owner",
            })?,
            None => defaults.risk,
        };

        let free_storage_days = match lookup("FREIGHTQUOTE_FREE_STORAGE_DAYS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_err| ConfigError::InvalidNumber {
                    key: "FREIGHTQUOTE_FREE_STORAGE_DAYS".to_owned(),
                    value: raw.clone(),
                })?,
            None => defaults.free_storage_days,
        };

        Ok(Self {
            tax: TaxPolicy {
                standard_rate: fraction("FREIGHTQUOTE_GST_RATE", defaults.tax.standard_rate)?,
                reduced_rate: fraction("FREIGHTQUOTE_REDUCED_GST_RATE", defaults.tax.reduced_rate)?,
            },
            risk,
            free_storage_days,
            fuel: FuelRates {
                global_cargo: fraction("FREIGHTQUOTE_FUEL_GLOBAL_CARGO", defaults.fuel.global_cargo)?,
                anjani: fraction("FREIGHTQUOTE_FUEL_ANJANI", defaults.fuel.anjani)?,
                safexpress: fraction("FREIGHTQUOTE_FUEL_SAFEXPRESS", defaults.fuel.safexpress)?,
                bluedart: fraction("FREIGHTQUOTE_FUEL_BLUEDART", defaults.fuel.bluedart)?,
            },
            log_level: lookup("FREIGHTQUOTE_LOG_LEVEL").unwrap_or(defaults.log_level),
        })
    }
}

fn parse_fraction(key: &str, raw: &str) -> Result<f64, ConfigError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && (0.0..=1.0).contains(value))
        .ok_or_else(|| ConfigError::InvalidNumber {
            key: key.to_owned(),
            value: raw.to_owned(),
        })
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Errors raised while loading settings or assembling carrier configurations.
pub enum ConfigError {
    /// A numeric setting could not be parsed or is out of range.
    #[error("{key} must be a number in range, got {value:?}")]
    InvalidNumber {
        /// Variable name.
        key: String,
        /// Raw value.
        value: String,
    },
    /// A setting is not one of the accepted values.
    #[error("{key} must be one of {expected}, got {value:?}")]
    InvalidChoice {
        /// Variable name.
        key: String,
        /// Raw value.
        value: String,
        /// Accepted values.
        expected: &'static str,
    },
    /// Final-total minimum combined with a pre-tax top-up step.
    #[error("{carrier}: a final-total minimum cannot be combined with a pre-tax top-up")]
    ConflictingMinimums {
        /// Carrier being configured.
        carrier: CarrierId,
    },
    /// Pre-tax top-up stage configured without a top-up step in the pipeline.
    #[error("{carrier}: pre-tax top-up stage requires a top-up step in the surcharge pipeline")]
    MissingTopUp {
        /// Carrier being configured.
        carrier: CarrierId,
    },
    /// A top-up step is present but the minimum stage does not declare it.
    #[error("{carrier}: surcharge pipeline tops up to a minimum but the minimum stage is {stage}")]
    UndeclaredTopUp {
        /// Carrier being configured.
        carrier: CarrierId,
        /// Declared stage.
        stage: &'static str,
    },
    /// A rate table has no entries.
    #[error("{carrier}: rate table {table} is empty")]
    EmptyRateTable {
        /// Carrier being configured.
        carrier: CarrierId,
        /// Table name.
        table: String,
    },
    /// Slab upper bounds are not strictly increasing or an open slab is not last.
    #[error("{carrier}: slabs in {table} are not in ascending order")]
    UnorderedSlabs {
        /// Carrier being configured.
        carrier: CarrierId,
        /// Table name.
        table: String,
    },
    /// A service subtype is configured more than once.
    #[error("{carrier}: service {service} is configured more than once")]
    DuplicateService {
        /// Carrier being configured.
        carrier: CarrierId,
        /// Service subtype name.
        service: String,
    },
    /// A fuel step sits in a pipeline whose engine applies fuel to the subtotal.
    #[error("{carrier}: fuel is applied to the subtotal and must not appear in the pipeline")]
    DuplicateFuel {
        /// Carrier being configured.
        carrier: CarrierId,
    },
}
