//! Definitie van nodes binnen de ontwerpvariabelen-graph.

use std::collections::BTreeMap;

use super::value::Value;

/// Identifier voor een node binnen de graph.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default, Ord, PartialOrd)]
pub struct NodeId(pub usize);

impl NodeId {
    #[must_use]
    pub const fn new(id: usize) -> Self {
        Self(id)
    }
}

impl From<usize> for NodeId {
    fn from(value: usize) -> Self {
        Self::new(value)
    }
}

/// Waarde die meta-informatie over een node beschrijft (bv. eenheden of
/// spline-orde).
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    Number(f64),
    Integer(i64),
    Boolean(bool),
    Text(String),
    List(Vec<MetaValue>),
}

impl MetaValue {
    #[must_use]
    pub fn as_boolean(&self) -> Option<bool> {
        if let Self::Boolean(v) = self {
            Some(*v)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Leest een niet-negatieve integer als aantal.
    #[must_use]
    pub fn as_count(&self) -> Option<usize> {
        self.as_integer().and_then(|v| usize::try_from(v).ok())
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[MetaValue]> {
        match self {
            Self::List(values) => Some(values),
            _ => None,
        }
    }
}

impl From<f64> for MetaValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for MetaValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<usize> for MetaValue {
    fn from(value: usize) -> Self {
        Self::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<bool> for MetaValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl<T: Into<MetaValue>> From<Vec<T>> for MetaValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// Alias voor een verzameling meta-informatie.
pub type MetaMap = BTreeMap<String, MetaValue>;

/// Node representatie binnen de graph.
#[derive(Debug, Clone, Default)]
pub struct Node {
    /// Unieke identifier binnen de graph.
    pub id: NodeId,
    /// Naam van het component dat deze node evalueert.
    pub name: Option<String>,
    /// Instantienaam binnen het oppervlak, bv. `twist_bsp`.
    pub nickname: Option<String>,
    /// Ingangswaarden (standaardwaarden), per pinnaam.
    pub inputs: BTreeMap<String, Value>,
    /// Volgorde waarin inputpinnen gedeclareerd zijn.
    input_order: Vec<String>,
    /// Uitgangswaarden, per pinnaam.
    pub outputs: BTreeMap<String, Value>,
    /// Volgorde waarin outputpinnen gedeclareerd zijn.
    output_order: Vec<String>,
    /// Verdere metadata zoals eenheden en interpolatie-instellingen.
    pub meta: MetaMap,
}

impl Node {
    /// Maak een nieuwe node met een meegegeven identifier.
    #[must_use]
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Maak een node voor een component met een instantienaam. Het id wordt
    /// bij het toevoegen aan de graph uitgegeven.
    #[must_use]
    pub fn component(name: &str, nickname: &str) -> Self {
        Self {
            name: Some(name.to_owned()),
            nickname: Some(nickname.to_owned()),
            ..Self::default()
        }
    }

    fn register_input_order(&mut self, pin: &str) {
        if !self.input_order.iter().any(|existing| existing == pin) {
            self.input_order.push(pin.to_owned());
        }
    }

    fn register_output_order(&mut self, pin: &str) {
        if !self.output_order.iter().any(|existing| existing == pin) {
            self.output_order.push(pin.to_owned());
        }
    }

    /// Registreer een inputpin zonder direct een waarde toe te kennen.
    pub fn add_input_pin<S: Into<String>>(&mut self, pin: S) {
        let pin_string = pin.into();
        self.register_input_order(&pin_string);
    }

    /// Sla een input-waarde op.
    pub fn set_input<S: Into<String>>(&mut self, pin: S, value: Value) {
        let pin_string = pin.into();
        self.register_input_order(&pin_string);
        self.inputs.insert(pin_string, value);
    }

    /// Haal een verwijzing naar een input op.
    #[must_use]
    pub fn input(&self, pin: &str) -> Option<&Value> {
        self.inputs.get(pin)
    }

    #[must_use]
    pub fn has_input_pin(&self, pin: &str) -> bool {
        self.input_order.iter().any(|existing| existing == pin)
    }

    /// Registreer een outputpin zonder waarde.
    pub fn add_output_pin<S: Into<String>>(&mut self, pin: S) {
        let pin_string = pin.into();
        self.register_output_order(&pin_string);
    }

    /// Sla een output-waarde op.
    pub fn set_output<S: Into<String>>(&mut self, pin: S, value: Value) {
        let pin_string = pin.into();
        self.register_output_order(&pin_string);
        self.outputs.insert(pin_string, value);
    }

    /// Haal een output op.
    #[must_use]
    pub fn output(&self, pin: &str) -> Option<&Value> {
        self.outputs.get(pin)
    }

    #[must_use]
    pub fn has_output_pin(&self, pin: &str) -> bool {
        self.output_order.iter().any(|existing| existing == pin)
    }

    /// Bewaar meta-informatie bij de node.
    pub fn insert_meta<S: Into<String>, V: Into<MetaValue>>(&mut self, key: S, value: V) {
        self.meta.insert(key.into(), value.into());
    }

    /// Haal een meta-item op.
    #[must_use]
    pub fn meta(&self, key: &str) -> Option<&MetaValue> {
        self.meta.get(key)
    }

    /// Geeft de gedeclareerde volgorde van inputpinnen terug.
    #[must_use]
    pub fn input_order(&self) -> &[String] {
        &self.input_order
    }

    /// Geeft de gedeclareerde volgorde van outputpinnen terug.
    #[must_use]
    pub fn output_order(&self) -> &[String] {
        &self.output_order
    }

    /// Naam om de node in logs en foutmeldingen te tonen.
    #[must_use]
    pub fn label(&self) -> &str {
        self.nickname
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("<naamloos>")
    }
}
