use std::fmt;

/// Identity of an enumerated camera device.
///
/// Value type produced by enumeration; never owns hardware state and is
/// freely copied into selection lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    /// Human-readable model name shown in pickers.
    pub display_name: String,
    /// Unique serial used to select a specific device on connect.
    pub serial_id: String,
    /// Unstructured vendor detail string.
    pub raw_info: String,
}

impl fmt::Display for DeviceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (serial {})", self.display_name, self.serial_id)
    }
}
