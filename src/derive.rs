//! Rule-driven recomputation of parameter bounds and defaults
//!
//! Two closed rule sets drive this stage:
//! - formula rules compute a value from [`RatedConstants`], optionally only
//!   for one commercial release
//! - auxiliary rules copy a default from the hardware configuration (DHCF),
//!   mapping enumerated settings to family-specific codes
//!
//! Every written value goes to both the offline and the online column of the
//! targeted bound.

use crate::config::AuxConfig;
use crate::error::{CurateError, Result};
use crate::table::{cell_text, Row, Table, Value};
use serde::{Deserialize, Serialize};

/// Family whose device codes differ from the rest of the range
pub const PF6000T: &str = "PF6000T";

const BUS_OVERVOLTAGE_FACTOR: f64 = 1.25;
const MEDIUM_VOLTAGE_BUS_FACTOR: f64 = 1.1;
const OVERLOAD_FACTOR: f64 = 1.5;
/// 120 x 60 Hz, synchronous speed numerator in rpm
const SYNCHRONOUS_SPEED_CONSTANT: f64 = 7200.0;

/// Rated electrical data of the target drive and motor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatedConstants {
    /// Line-to-line RMS volts
    pub rated_voltage: f64,
    /// Amps
    pub rated_current: f64,
    pub motor_poles: u32,
    /// Kilowatts
    pub rated_power: f64,
}

impl RatedConstants {
    /// Ratings must be positive and the motor needs an even pole count of at least two
    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("rated_voltage", self.rated_voltage),
            ("rated_current", self.rated_current),
            ("rated_power", self.rated_power),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(CurateError::invalid_config_value(key, value.to_string()));
            }
        }

        if self.motor_poles < 2 || self.motor_poles % 2 != 0 {
            return Err(CurateError::invalid_config_value(
                "motor_poles",
                self.motor_poles.to_string(),
            ));
        }

        Ok(())
    }
}

/// Which bound of a parameter a rule writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Minimum,
    Maximum,
    Default,
}

impl Bound {
    /// Offline and online columns holding this bound
    pub fn columns(self) -> [&'static str; 2] {
        match self {
            Self::Minimum => ["Offline Minimum", "Online Minimum"],
            Self::Maximum => ["Offline Maximum", "Online Maximum"],
            Self::Default => ["Offline Default", "Online Default"],
        }
    }
}

/// Closed set of derivation formulas over the rated constants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formula {
    /// Peak DC bus with overvoltage margin
    BusVoltageMax,
    /// Peak DC bus with the tighter medium-voltage margin
    MediumVoltageBusMax,
    /// Peak DC bus at rated voltage
    BusVoltageNominal,
    RatedVoltage,
    RatedCurrent,
    OverloadCurrent,
    RatedPower,
    /// Synchronous speed at 60 Hz for the motor pole count
    SpeedReferenceMax,
    MotorPoles,
}

impl Formula {
    pub fn evaluate(self, rated: &RatedConstants) -> Value {
        let peak_bus = rated.rated_voltage * std::f64::consts::SQRT_2;
        match self {
            Self::BusVoltageMax => round_tenths(peak_bus * BUS_OVERVOLTAGE_FACTOR),
            Self::MediumVoltageBusMax => round_tenths(peak_bus * MEDIUM_VOLTAGE_BUS_FACTOR),
            Self::BusVoltageNominal => round_tenths(peak_bus),
            Self::RatedVoltage => round_tenths(rated.rated_voltage),
            Self::RatedCurrent => round_tenths(rated.rated_current),
            Self::OverloadCurrent => round_tenths(rated.rated_current * OVERLOAD_FACTOR),
            Self::RatedPower => round_tenths(rated.rated_power),
            Self::SpeedReferenceMax => {
                let poles = f64::from(rated.motor_poles);
                Value::Int((SYNCHRONOUS_SPEED_CONSTANT / poles).round() as i64)
            }
            Self::MotorPoles => Value::Int(i64::from(rated.motor_poles)),
        }
    }
}

fn round_tenths(x: f64) -> Value {
    Value::Float((x * 10.0).round() / 10.0)
}

struct FormulaRule {
    parameter: &'static str,
    release: Option<&'static str>,
    bounds: &'static [Bound],
    formula: Formula,
}

const FORMULA_RULES: &[FormulaRule] = &[
    FormulaRule {
        parameter: "DC Bus Voltage Max",
        release: Some("MV_CR1"),
        bounds: &[Bound::Maximum, Bound::Default],
        formula: Formula::MediumVoltageBusMax,
    },
    FormulaRule {
        parameter: "DC Bus Voltage Max",
        release: Some("MV_CR2"),
        bounds: &[Bound::Maximum, Bound::Default],
        formula: Formula::MediumVoltageBusMax,
    },
    FormulaRule {
        parameter: "DC Bus Voltage Max",
        release: None,
        bounds: &[Bound::Maximum, Bound::Default],
        formula: Formula::BusVoltageMax,
    },
    FormulaRule {
        parameter: "DC Bus Voltage Nominal",
        release: None,
        bounds: &[Bound::Default],
        formula: Formula::BusVoltageNominal,
    },
    FormulaRule {
        parameter: "Motor Rated Voltage",
        release: None,
        bounds: &[Bound::Maximum, Bound::Default],
        formula: Formula::RatedVoltage,
    },
    FormulaRule {
        parameter: "Motor Rated Current",
        release: None,
        bounds: &[Bound::Default],
        formula: Formula::RatedCurrent,
    },
    FormulaRule {
        parameter: "Current Limit",
        release: None,
        bounds: &[Bound::Maximum, Bound::Default],
        formula: Formula::OverloadCurrent,
    },
    FormulaRule {
        parameter: "Motor Rated Power",
        release: None,
        bounds: &[Bound::Default],
        formula: Formula::RatedPower,
    },
    FormulaRule {
        parameter: "Speed Reference Max",
        release: None,
        bounds: &[Bound::Maximum],
        formula: Formula::SpeedReferenceMax,
    },
    FormulaRule {
        parameter: "Motor Poles",
        release: None,
        bounds: &[Bound::Default],
        formula: Formula::MotorPoles,
    },
];

/// Cell bypass contactor arrangement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BypassMode {
    None,
    /// Coil-held contactor, drops out on control power loss
    Coil,
    /// Mechanically latched contactor
    Latched,
}

impl BypassMode {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "none" | "no bypass" => Some(Self::None),
            "coil" => Some(Self::Coil),
            "latched" | "latch" => Some(Self::Latched),
            _ => None,
        }
    }

    /// Parameter code; the PF6000T swapped the coil and latched codes
    pub fn code(self, family: &str) -> i64 {
        match (self, family == PF6000T) {
            (Self::None, _) => 0,
            (Self::Coil, true) | (Self::Latched, false) => 1,
            (Self::Coil, false) | (Self::Latched, true) => 2,
        }
    }
}

/// Power cell cooling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoolingMethod {
    Air,
    Liquid,
}

impl CoolingMethod {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "air" | "air cooled" => Some(Self::Air),
            "liquid" | "water" | "liquid cooled" => Some(Self::Liquid),
            _ => None,
        }
    }

    /// Parameter code; PF6000T codes are one-based
    pub fn code(self, family: &str) -> i64 {
        let base = match self {
            Self::Air => 0,
            Self::Liquid => 1,
        };
        if family == PF6000T {
            base + 1
        } else {
            base
        }
    }
}

/// Input transformer secondary tap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformerTap {
    Minus5,
    Nominal,
    Plus5,
}

impl TransformerTap {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().trim_end_matches('%').trim() {
            "-5" => Some(Self::Minus5),
            "0" | "+0" | "nominal" | "Nominal" => Some(Self::Nominal),
            "5" | "+5" => Some(Self::Plus5),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Minus5 => 0,
            Self::Nominal => 1,
            Self::Plus5 => 2,
        }
    }
}

/// How a DHCF string becomes a parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuxKind {
    Integer,
    Float,
    Text,
    Bypass,
    Cooling,
    Tap,
}

struct AuxRule {
    parameter: &'static str,
    key: &'static str,
    kind: AuxKind,
}

const AUX_RULES: &[AuxRule] = &[
    AuxRule {
        parameter: "Number of Power Cells",
        key: "Power Cells Per Phase",
        kind: AuxKind::Integer,
    },
    AuxRule {
        parameter: "Input Line Frequency",
        key: "Line Frequency",
        kind: AuxKind::Float,
    },
    AuxRule {
        parameter: "Drive Serial Number",
        key: "Serial Number",
        kind: AuxKind::Text,
    },
    AuxRule {
        parameter: "Cell Bypass Type",
        key: "Bypass Type",
        kind: AuxKind::Bypass,
    },
    AuxRule {
        parameter: "Cooling Type",
        key: "Cooling",
        kind: AuxKind::Cooling,
    },
    AuxRule {
        parameter: "Input Transformer Tap",
        key: "Transformer Tap",
        kind: AuxKind::Tap,
    },
];

impl AuxRule {
    fn value(&self, aux: &AuxConfig, family: &str) -> Result<Value> {
        let raw = aux
            .get(self.key)
            .ok_or_else(|| CurateError::missing_config_key(self.key))?;
        let invalid = || CurateError::invalid_config_value(self.key, raw);

        let value = match self.kind {
            AuxKind::Integer => Value::Int(raw.trim().parse().map_err(|_| invalid())?),
            AuxKind::Float => Value::Float(raw.trim().parse().map_err(|_| invalid())?),
            AuxKind::Text => Value::text(raw),
            AuxKind::Bypass => Value::Int(BypassMode::parse(raw).ok_or_else(invalid)?.code(family)),
            AuxKind::Cooling => Value::Int(CoolingMethod::parse(raw).ok_or_else(invalid)?.code(family)),
            AuxKind::Tap => Value::Int(TransformerTap::parse(raw).ok_or_else(invalid)?.code()),
        };
        Ok(value)
    }
}

/// Applies the formula and auxiliary rules to one section
#[derive(Debug, Clone, Copy)]
pub struct ValueDeriver<'a> {
    pub name_column: &'a str,
    pub release_column: &'a str,
    pub family: &'a str,
    pub rated: &'a RatedConstants,
    pub aux: &'a AuxConfig,
}

impl ValueDeriver<'_> {
    /// New table with derived values written into matching rows
    pub fn derive(&self, table: &Table) -> Result<Table> {
        table.require_column(self.name_column)?;
        table.require_column(self.release_column)?;

        let rows = table
            .rows()
            .iter()
            .map(|row| self.derive_row(table, row))
            .collect::<Result<Vec<Row>>>()?;

        Ok(table.with_rows(rows))
    }

    fn derive_row(&self, table: &Table, row: &Row) -> Result<Row> {
        let name = cell_text(row.get(self.name_column).and_then(Option::as_ref));
        let release = cell_text(row.get(self.release_column).and_then(Option::as_ref));

        if let Some(rule) = formula_rule(&name, &release) {
            let value = rule.formula.evaluate(self.rated);
            return write_bounds(table, row, rule.bounds, &value);
        }

        if let Some(rule) = AUX_RULES.iter().find(|r| r.parameter == name) {
            let value = rule.value(self.aux, self.family)?;
            return write_bounds(table, row, &[Bound::Default], &value);
        }

        Ok(row.clone())
    }
}

/// Release-specific rules take precedence over release-agnostic ones
fn formula_rule(name: &str, release: &str) -> Option<&'static FormulaRule> {
    let candidates = || FORMULA_RULES.iter().filter(move |r| r.parameter == name);
    candidates()
        .find(|r| r.release == Some(release))
        .or_else(|| candidates().find(|r| r.release.is_none()))
}

fn write_bounds(table: &Table, row: &Row, bounds: &[Bound], value: &Value) -> Result<Row> {
    let mut updated = row.clone();
    for bound in bounds {
        for column in bound.columns() {
            table.require_column(column)?;
            updated.insert(column.to_string(), Some(value.clone()));
        }
    }
    Ok(updated)
}
