//! The closed set of recognized camera properties and their typed values.
//!
//! Property access goes through this fixed table instead of arbitrary
//! string lookup on the hardware handle; names outside the table are
//! rejected explicitly.

use std::fmt;

/// The recognized camera property names.
///
/// Mirrors the standard acquisition features of industrial cameras:
/// exposure, gain, sensor region geometry, flip flags, trigger mode,
/// white balance, and frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyKey {
    ExposureTime,
    Gain,
    Width,
    Height,
    OffsetX,
    OffsetY,
    ReverseX,
    ReverseY,
    TriggerMode,
    BalanceWhiteAuto,
    AcquisitionFrameRate,
}

/// Declared value type of a property, fixed per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    Bool,
    Int,
    Float,
    Text,
}

impl PropertyKey {
    pub const ALL: [PropertyKey; 11] = [
        PropertyKey::ExposureTime,
        PropertyKey::Gain,
        PropertyKey::Width,
        PropertyKey::Height,
        PropertyKey::OffsetX,
        PropertyKey::OffsetY,
        PropertyKey::ReverseX,
        PropertyKey::ReverseY,
        PropertyKey::TriggerMode,
        PropertyKey::BalanceWhiteAuto,
        PropertyKey::AcquisitionFrameRate,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            PropertyKey::ExposureTime => "ExposureTime",
            PropertyKey::Gain => "Gain",
            PropertyKey::Width => "Width",
            PropertyKey::Height => "Height",
            PropertyKey::OffsetX => "OffsetX",
            PropertyKey::OffsetY => "OffsetY",
            PropertyKey::ReverseX => "ReverseX",
            PropertyKey::ReverseY => "ReverseY",
            PropertyKey::TriggerMode => "TriggerMode",
            PropertyKey::BalanceWhiteAuto => "BalanceWhiteAuto",
            PropertyKey::AcquisitionFrameRate => "AcquisitionFrameRate",
        }
    }

    /// Resolves a property name against the closed set.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        PropertyKey::ALL.iter().copied().find(|k| k.as_str() == name)
    }

    /// Declared type per key; writes are coerced to this, never inferred
    /// from the caller's value.
    #[must_use]
    pub const fn value_type(self) -> PropertyType {
        match self {
            PropertyKey::ExposureTime
            | PropertyKey::Gain
            | PropertyKey::AcquisitionFrameRate => PropertyType::Float,
            PropertyKey::Width
            | PropertyKey::Height
            | PropertyKey::OffsetX
            | PropertyKey::OffsetY => PropertyType::Int,
            PropertyKey::ReverseX | PropertyKey::ReverseY => PropertyType::Bool,
            PropertyKey::TriggerMode | PropertyKey::BalanceWhiteAuto => PropertyType::Text,
        }
    }

    /// Whether get/set reports a numeric min/max range for this key.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self.value_type(), PropertyType::Int | PropertyType::Float)
    }

    /// Sensor-region keys whose writes require acquisition to be paused.
    #[must_use]
    pub const fn is_geometry(self) -> bool {
        matches!(
            self,
            PropertyKey::Width | PropertyKey::Height | PropertyKey::OffsetX | PropertyKey::OffsetY
        )
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed property value crossing the hardware boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl PropertyValue {
    /// Coerces this value to the declared `target` type.
    ///
    /// Scalar kinds convert freely between each other (truncating on
    /// float-to-int); any kind renders to text. Text never converts back
    /// to a scalar. Returns `None` when no conversion exists.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn coerce_to(&self, target: PropertyType) -> Option<PropertyValue> {
        match (self, target) {
            (PropertyValue::Bool(b), PropertyType::Bool) => Some(PropertyValue::Bool(*b)),
            (PropertyValue::Int(i), PropertyType::Bool) => Some(PropertyValue::Bool(*i != 0)),
            (PropertyValue::Float(x), PropertyType::Bool) => Some(PropertyValue::Bool(*x != 0.0)),

            (PropertyValue::Int(i), PropertyType::Int) => Some(PropertyValue::Int(*i)),
            (PropertyValue::Float(x), PropertyType::Int) => Some(PropertyValue::Int(*x as i64)),
            (PropertyValue::Bool(b), PropertyType::Int) => Some(PropertyValue::Int(i64::from(*b))),

            (PropertyValue::Float(x), PropertyType::Float) => Some(PropertyValue::Float(*x)),
            (PropertyValue::Int(i), PropertyType::Float) => Some(PropertyValue::Float(*i as f64)),
            (PropertyValue::Bool(b), PropertyType::Float) => {
                Some(PropertyValue::Float(f64::from(u8::from(*b))))
            }

            (PropertyValue::Text(s), PropertyType::Text) => Some(PropertyValue::Text(s.clone())),
            (other, PropertyType::Text) => Some(PropertyValue::Text(other.to_string())),

            (PropertyValue::Text(_), _) => None,
        }
    }

    /// Numeric view used for range checks; `None` for bool/text values.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Int(i) => Some(*i as f64),
            PropertyValue::Float(x) => Some(*x),
            PropertyValue::Bool(_) | PropertyValue::Text(_) => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Bool(b) => write!(f, "{b}"),
            PropertyValue::Int(i) => write!(f, "{i}"),
            PropertyValue::Float(x) => write!(f, "{x}"),
            PropertyValue::Text(s) => f.write_str(s),
        }
    }
}

/// A property read result: current value plus the numeric range when the
/// key declares one.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyNode {
    pub key: PropertyKey,
    pub value: PropertyValue,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl PropertyNode {
    #[must_use]
    pub fn new(key: PropertyKey, value: PropertyValue) -> Self {
        Self {
            key,
            value,
            min: None,
            max: None,
        }
    }

    #[must_use]
    pub fn with_range(key: PropertyKey, value: PropertyValue, min: f64, max: f64) -> Self {
        Self {
            key,
            value,
            min: Some(min),
            max: Some(max),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn every_key_round_trips_through_its_name() {
        for key in PropertyKey::ALL {
            assert_eq!(PropertyKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(PropertyKey::parse("UnknownThing"), None);
        assert_eq!(PropertyKey::parse("exposuretime"), None);
    }

    #[test]
    fn geometry_keys_are_exactly_the_roi_set() {
        let geometry: Vec<_> = PropertyKey::ALL
            .iter()
            .copied()
            .filter(|k| k.is_geometry())
            .collect();
        assert_eq!(
            geometry,
            vec![
                PropertyKey::Width,
                PropertyKey::Height,
                PropertyKey::OffsetX,
                PropertyKey::OffsetY
            ]
        );
    }

    #[test]
    fn scalar_coercions_follow_declared_type() {
        assert_eq!(
            PropertyValue::Int(12000).coerce_to(PropertyType::Float),
            Some(PropertyValue::Float(12000.0))
        );
        assert_eq!(
            PropertyValue::Float(640.9).coerce_to(PropertyType::Int),
            Some(PropertyValue::Int(640))
        );
        assert_eq!(
            PropertyValue::Int(1).coerce_to(PropertyType::Bool),
            Some(PropertyValue::Bool(true))
        );
        assert_eq!(
            PropertyValue::Bool(true).coerce_to(PropertyType::Text),
            Some(PropertyValue::Text("true".into()))
        );
    }

    #[test]
    fn text_never_coerces_to_scalars() {
        assert_eq!(
            PropertyValue::Text("640".into()).coerce_to(PropertyType::Int),
            None
        );
        assert_eq!(
            PropertyValue::Text("on".into()).coerce_to(PropertyType::Bool),
            None
        );
    }
}
