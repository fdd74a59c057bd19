use std::fmt;

use serde::Serialize;

use crate::error::FieldError;

/// Physical quantity of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Quantity {
    Undefined,
    WaterLevel,
    WaterDepth,
    Discharge,
    Temperature,
    Salinity,
    CurrentSpeed,
    WindSpeed,
    AirPressure,
    Precipitation,
    Concentration,
    SignificantWaveHeight,
    WaveEnergyDensity,
}

impl Quantity {
    /// Default unit for this quantity
    pub fn default_unit(&self) -> Unit {
        match self {
            Quantity::Undefined => Unit::Undefined,
            Quantity::WaterLevel | Quantity::WaterDepth => Unit::Meter,
            Quantity::Discharge => Unit::CubicMeterPerSecond,
            Quantity::Temperature => Unit::DegreeCelsius,
            Quantity::Salinity => Unit::Psu,
            Quantity::CurrentSpeed | Quantity::WindSpeed => Unit::MeterPerSecond,
            Quantity::AirPressure => Unit::Pascal,
            Quantity::Precipitation => Unit::MillimeterPerDay,
            Quantity::Concentration => Unit::KilogramPerCubicMeter,
            Quantity::SignificantWaveHeight => Unit::Meter,
            Quantity::WaveEnergyDensity => Unit::SquareMeterSecond,
        }
    }

    /// Units accepted for this quantity
    pub fn allowed_units(&self) -> &'static [Unit] {
        match self {
            Quantity::Undefined => &[Unit::Undefined],
            Quantity::WaterLevel | Quantity::WaterDepth => &[Unit::Meter, Unit::Millimeter],
            Quantity::Discharge => &[Unit::CubicMeterPerSecond],
            Quantity::Temperature => &[Unit::DegreeCelsius, Unit::Kelvin],
            Quantity::Salinity => &[Unit::Psu],
            Quantity::CurrentSpeed | Quantity::WindSpeed => &[Unit::MeterPerSecond],
            Quantity::AirPressure => &[Unit::Pascal, Unit::Hectopascal],
            Quantity::Precipitation => &[Unit::MillimeterPerDay, Unit::Millimeter],
            Quantity::Concentration => &[Unit::KilogramPerCubicMeter],
            Quantity::SignificantWaveHeight => &[Unit::Meter],
            Quantity::WaveEnergyDensity => &[Unit::SquareMeterSecond],
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Quantity::Undefined => "Undefined",
            Quantity::WaterLevel => "Water Level",
            Quantity::WaterDepth => "Water Depth",
            Quantity::Discharge => "Discharge",
            Quantity::Temperature => "Temperature",
            Quantity::Salinity => "Salinity",
            Quantity::CurrentSpeed => "Current Speed",
            Quantity::WindSpeed => "Wind Speed",
            Quantity::AirPressure => "Air Pressure",
            Quantity::Precipitation => "Precipitation",
            Quantity::Concentration => "Concentration",
            Quantity::SignificantWaveHeight => "Significant Wave Height",
            Quantity::WaveEnergyDensity => "Wave Energy Density",
        };
        write!(f, "{}", name)
    }
}

/// Physical unit of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Unit {
    Undefined,
    Meter,
    Millimeter,
    MeterPerSecond,
    CubicMeterPerSecond,
    DegreeCelsius,
    Kelvin,
    Psu,
    Pascal,
    Hectopascal,
    MillimeterPerDay,
    KilogramPerCubicMeter,
    SquareMeterSecond,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Unit::Undefined => "undefined",
            Unit::Meter => "m",
            Unit::Millimeter => "mm",
            Unit::MeterPerSecond => "m/s",
            Unit::CubicMeterPerSecond => "m^3/s",
            Unit::DegreeCelsius => "degC",
            Unit::Kelvin => "K",
            Unit::Psu => "PSU",
            Unit::Pascal => "Pa",
            Unit::Hectopascal => "hPa",
            Unit::MillimeterPerDay => "mm/day",
            Unit::KilogramPerCubicMeter => "kg/m^3",
            Unit::SquareMeterSecond => "m^2 s",
        };
        write!(f, "{}", name)
    }
}

/// Item metadata: name, physical quantity and unit
#[derive(Debug, Clone, PartialEq)]
pub struct ItemInfo {
    pub name: String,
    pub quantity: Quantity,
    pub unit: Unit,
}

impl ItemInfo {
    /// Create an item from a bare name (undefined quantity/unit)
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: Quantity::Undefined,
            unit: Quantity::Undefined.default_unit(),
        }
    }

    /// Create an item with a quantity and its default unit
    pub fn with_quantity(name: impl Into<String>, quantity: Quantity) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit: quantity.default_unit(),
        }
    }

    /// Create an item with an explicit unit, rejecting units that are not
    /// valid for the quantity
    pub fn checked(
        name: impl Into<String>,
        quantity: Quantity,
        unit: Unit,
    ) -> Result<Self, FieldError> {
        let name = name.into();
        if name.is_empty() {
            return Err(FieldError::InvalidItem("item name must not be empty".into()));
        }
        if !quantity.allowed_units().contains(&unit) {
            return Err(FieldError::InvalidItem(format!(
                "unit {} is not valid for quantity {}",
                unit, quantity
            )));
        }
        Ok(Self { name, quantity, unit })
    }
}

impl Default for ItemInfo {
    fn default() -> Self {
        Self::new("NoName")
    }
}

impl fmt::Display for ItemInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} <{}> ({})", self.name, self.quantity, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_item() {
        let item = ItemInfo::default();
        assert_eq!(item.name, "NoName");
        assert_eq!(item.quantity, Quantity::Undefined);
    }

    #[test]
    fn test_with_quantity_uses_default_unit() {
        let item = ItemInfo::with_quantity("wl", Quantity::WaterLevel);
        assert_eq!(item.unit, Unit::Meter);
    }

    #[test]
    fn test_checked_rejects_bad_unit() {
        let result = ItemInfo::checked("t", Quantity::Temperature, Unit::Meter);
        assert!(result.is_err());
    }

    #[test]
    fn test_checked_rejects_empty_name() {
        assert!(ItemInfo::checked("", Quantity::Temperature, Unit::Kelvin).is_err());
    }
}
