//! Verbindingen tussen nodes.

use std::fmt;

use super::node::NodeId;

/// Pin binnen een node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PinId(pub String);

impl From<&str> for PinId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for PinId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Verbinding tussen een output-pin en een input-pin.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Wire {
    pub from_node: NodeId,
    pub from_pin: PinId,
    pub to_node: NodeId,
    pub to_pin: PinId,
}

impl Wire {
    #[must_use]
    pub fn new<F, T, PF, PT>(from_node: F, from_pin: PF, to_node: T, to_pin: PT) -> Self
    where
        F: Into<NodeId>,
        T: Into<NodeId>,
        PF: Into<PinId>,
        PT: Into<PinId>,
    {
        Self {
            from_node: from_node.into(),
            from_pin: from_pin.into(),
            to_node: to_node.into(),
            to_pin: to_pin.into(),
        }
    }

    /// Verbinding op naam ("promotie"): output en input dragen dezelfde
    /// pinnaam.
    #[must_use]
    pub fn promoted<F, T>(from_node: F, to_node: T, pin: &str) -> Self
    where
        F: Into<NodeId>,
        T: Into<NodeId>,
    {
        Self::new(from_node, pin, to_node, pin)
    }

    #[must_use]
    pub fn is_promotion(&self) -> bool {
        self.from_pin == self.to_pin
    }
}

impl fmt::Display for Wire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} -> {}.{}",
            self.from_node.0, self.from_pin, self.to_node.0, self.to_pin
        )
    }
}
