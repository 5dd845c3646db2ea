//! Oppervlakdefinitie: welke ontwerpvariabelen zijn opgegeven, met welke
//! waarden, en welke daarvan vrij zijn.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::assembly::AssemblyError;
use crate::geom::ReferenceMesh;
use crate::graph::value::Value;

pub mod variables;

pub use variables::{
    DESCRIPTORS, FLAG_SUFFIX, OutputLength, Units, VariableDescriptor, VariableId,
    descriptor_for_key, descriptor_for_output,
};

/// Sleutels voor de roosterafmetingen van free-form-deformatie.
pub const LATTICE_ROWS_KEY: &str = "mx";
pub const LATTICE_COLUMNS_KEY: &str = "my";

/// Bovengrens voor het aantal roosterpunten `mx * my`.
pub const MAX_LATTICE_POINTS: usize = 1 << 20;

/// Controleert roosterafmetingen: elke dimensie minstens 1 en het totaal
/// binnen [`MAX_LATTICE_POINTS`].
pub fn check_lattice(rows: usize, columns: usize) -> Result<(usize, usize), AssemblyError> {
    match rows.checked_mul(columns) {
        Some(points) if rows >= 1 && columns >= 1 && points <= MAX_LATTICE_POINTS => {
            Ok((rows, columns))
        }
        _ => Err(AssemblyError::InvalidLatticeSize { rows, columns }),
    }
}

/// Waarde van een opgegeven variabele.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VariableDefinition {
    /// Eén waarde, uniform over de spanwijdte.
    Uniform(f64),
    /// Schaarse controlepunten die via interpolatie verdeeld worden.
    ControlPoints(Vec<f64>),
}

impl VariableDefinition {
    /// Converteert een graph-waarde. Alleen een getal of een lijst van
    /// getallen is een geldige definitie.
    pub fn from_value(key: &str, value: &Value) -> Result<Self, AssemblyError> {
        match value {
            Value::Number(number) => Ok(Self::Uniform(*number)),
            Value::List(_) => value
                .expect_numbers()
                .map(Self::ControlPoints)
                .map_err(|_| AssemblyError::ambiguous(key, value)),
            _ => Err(AssemblyError::ambiguous(key, value)),
        }
    }

    /// De waarde zoals ze in de graph belandt.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Uniform(number) => Value::Number(*number),
            Self::ControlPoints(values) => Value::numbers(values.iter().copied()),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Uniform(_) => 1,
            Self::ControlPoints(values) => values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<f64> for VariableDefinition {
    fn from(value: f64) -> Self {
        Self::Uniform(value)
    }
}

impl From<Vec<f64>> for VariableDefinition {
    fn from(values: Vec<f64>) -> Self {
        Self::ControlPoints(values)
    }
}

/// Getypeerde oppervlakdefinitie. Een afwezige variabele wordt niet
/// gemodelleerd; deze laag vult geen standaardwaarden in.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceSpec {
    pub name: String,
    pub mesh: ReferenceMesh,
    pub twist_cp: Option<VariableDefinition>,
    pub chord_cp: Option<VariableDefinition>,
    pub t_over_c_cp: Option<VariableDefinition>,
    pub xshear_cp: Option<VariableDefinition>,
    pub yshear_cp: Option<VariableDefinition>,
    pub zshear_cp: Option<VariableDefinition>,
    pub dihedral_distrib_cp: Option<VariableDefinition>,
    pub sweep: Option<VariableDefinition>,
    pub span: Option<VariableDefinition>,
    pub dihedral: Option<VariableDefinition>,
    pub taper: Option<VariableDefinition>,
    /// Expliciete vrij/vast-vlaggen; ontbrekende vlaggen volgen de
    /// standaard van de descriptor.
    pub design_flags: BTreeMap<VariableId, bool>,
    /// Roosterafmetingen `(mx, my)` voor free-form-deformatie.
    pub ffd_lattice: Option<(usize, usize)>,
}

impl SurfaceSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, mesh: ReferenceMesh) -> Self {
        Self {
            name: name.into(),
            mesh,
            twist_cp: None,
            chord_cp: None,
            t_over_c_cp: None,
            xshear_cp: None,
            yshear_cp: None,
            zshear_cp: None,
            dihedral_distrib_cp: None,
            sweep: None,
            span: None,
            dihedral: None,
            taper: None,
            design_flags: BTreeMap::new(),
            ffd_lattice: None,
        }
    }

    #[must_use]
    pub fn definition(&self, id: VariableId) -> Option<&VariableDefinition> {
        self.slot(id).as_ref()
    }

    fn slot(&self, id: VariableId) -> &Option<VariableDefinition> {
        match id {
            VariableId::Twist => &self.twist_cp,
            VariableId::Chord => &self.chord_cp,
            VariableId::ThicknessRatio => &self.t_over_c_cp,
            VariableId::XShear => &self.xshear_cp,
            VariableId::YShear => &self.yshear_cp,
            VariableId::ZShear => &self.zshear_cp,
            VariableId::DihedralDistribution => &self.dihedral_distrib_cp,
            VariableId::Sweep => &self.sweep,
            VariableId::Span => &self.span,
            VariableId::Dihedral => &self.dihedral,
            VariableId::Taper => &self.taper,
        }
    }

    fn slot_mut(&mut self, id: VariableId) -> &mut Option<VariableDefinition> {
        match id {
            VariableId::Twist => &mut self.twist_cp,
            VariableId::Chord => &mut self.chord_cp,
            VariableId::ThicknessRatio => &mut self.t_over_c_cp,
            VariableId::XShear => &mut self.xshear_cp,
            VariableId::YShear => &mut self.yshear_cp,
            VariableId::ZShear => &mut self.zshear_cp,
            VariableId::DihedralDistribution => &mut self.dihedral_distrib_cp,
            VariableId::Sweep => &mut self.sweep,
            VariableId::Span => &mut self.span,
            VariableId::Dihedral => &mut self.dihedral,
            VariableId::Taper => &mut self.taper,
        }
    }

    /// Zet (of vervangt) de definitie van een variabele.
    pub fn set(&mut self, id: VariableId, definition: impl Into<VariableDefinition>) {
        *self.slot_mut(id) = Some(definition.into());
    }

    #[must_use]
    pub fn with(mut self, id: VariableId, definition: impl Into<VariableDefinition>) -> Self {
        self.set(id, definition);
        self
    }

    #[must_use]
    pub fn with_design_flag(mut self, id: VariableId, free: bool) -> Self {
        self.design_flags.insert(id, free);
        self
    }

    #[must_use]
    pub fn with_ffd_lattice(mut self, rows: usize, columns: usize) -> Self {
        self.ffd_lattice = Some((rows, columns));
        self
    }

    /// Zet de roosterafmetingen na controle met [`check_lattice`].
    pub fn set_ffd_lattice(&mut self, rows: usize, columns: usize) -> Result<(), AssemblyError> {
        self.ffd_lattice = Some(check_lattice(rows, columns)?);
        Ok(())
    }

    /// Opgegeven variabelen in vaste volgorde.
    pub fn present(&self) -> impl Iterator<Item = (&'static VariableDescriptor, &VariableDefinition)> {
        DESCRIPTORS
            .iter()
            .filter_map(|descriptor| Some((descriptor, self.definition(descriptor.id)?)))
    }

    /// Is de variabele vrij voor een externe optimizer? Een expliciete
    /// `<sleutel>_dv` vlag wint van de standaard.
    #[must_use]
    pub fn is_free(&self, descriptor: &VariableDescriptor) -> bool {
        self.design_flags
            .get(&descriptor.id)
            .copied()
            .unwrap_or(descriptor.default_free)
    }

    /// Bouwt een definitie uit een platte sleutel/waarde-lijst, zoals de
    /// oppervlakwoordenboeken van een aanroeper.
    ///
    /// Onbekende sleutels worden genegeerd; lijkt zo'n sleutel sterk op een
    /// herkende sleutel, dan wordt een waarschuwing gelogd.
    pub fn from_entries<I, K>(
        name: impl Into<String>,
        mesh: ReferenceMesh,
        entries: I,
    ) -> Result<Self, AssemblyError>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        let mut spec = Self::new(name, mesh);
        let mut rows = None;
        let mut columns = None;

        for (key, value) in entries {
            let key = key.as_ref();

            if let Some(descriptor) = descriptor_for_key(key) {
                let definition = VariableDefinition::from_value(key, &value)?;
                if spec.definition(descriptor.id).is_some() {
                    return Err(AssemblyError::repeated(key));
                }
                spec.set(descriptor.id, definition);
            } else if let Some(descriptor) = key
                .strip_suffix(FLAG_SUFFIX)
                .and_then(descriptor_for_key)
            {
                let free = value
                    .expect_boolean()
                    .map_err(|_| AssemblyError::ambiguous(key, &value))?;
                if spec.design_flags.insert(descriptor.id, free).is_some() {
                    return Err(AssemblyError::repeated(key));
                }
            } else if key == LATTICE_ROWS_KEY {
                if rows.replace(lattice_count(key, &value)?).is_some() {
                    return Err(AssemblyError::repeated(key));
                }
            } else if key == LATTICE_COLUMNS_KEY {
                if columns.replace(lattice_count(key, &value)?).is_some() {
                    return Err(AssemblyError::repeated(key));
                }
            } else {
                warn_unknown_key(&spec.name, key);
            }
        }

        if let (Some(rows), Some(columns)) = (rows, columns) {
            spec.set_ffd_lattice(rows, columns)?;
        }

        Ok(spec)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lattice_count(key: &str, value: &Value) -> Result<usize, AssemblyError> {
    match value {
        Value::Number(number) if *number >= 1.0 && number.fract() == 0.0 => Ok(*number as usize),
        _ => Err(AssemblyError::ambiguous(key, value)),
    }
}

fn known_keys() -> impl Iterator<Item = String> {
    DESCRIPTORS
        .iter()
        .flat_map(|descriptor| [descriptor.key.to_owned(), descriptor.flag_key()])
        .chain([LATTICE_ROWS_KEY.to_owned(), LATTICE_COLUMNS_KEY.to_owned()])
}

/// Dichtstbijzijnde herkende sleutel binnen bewerkingsafstand 2.
#[must_use]
pub fn suggest_key(key: &str) -> Option<String> {
    let lowered = key.to_lowercase();
    known_keys()
        .map(|known| (levenshtein::levenshtein(&lowered, &known), known))
        .filter(|(distance, _)| *distance <= 2)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, known)| known)
}

fn warn_unknown_key(surface: &str, key: &str) {
    match suggest_key(key) {
        Some(suggestion) => log::warn!(
            "oppervlak `{surface}`: onbekende sleutel `{key}` genegeerd, bedoelde je `{suggestion}`?"
        ),
        None => log::debug!("oppervlak `{surface}`: sleutel `{key}` genegeerd"),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        MAX_LATTICE_POINTS, SurfaceSpec, VariableDefinition, VariableId, check_lattice,
        suggest_key,
    };
    use crate::assembly::AssemblyError;
    use crate::geom::crm_reference_mesh;
    use crate::graph::value::Value;

    #[test]
    fn entries_fill_typed_fields() {
        let spec = SurfaceSpec::from_entries(
            "wing",
            crm_reference_mesh(),
            [
                ("twist_cp", Value::numbers([2.0, 0.0, -2.0])),
                ("twist_cp_dv", Value::Boolean(false)),
                ("span", Value::Number(58.7)),
                ("num_x", Value::Number(3.0)),
            ],
        )
        .expect("geldige definitie");

        assert_eq!(
            spec.twist_cp,
            Some(VariableDefinition::ControlPoints(vec![2.0, 0.0, -2.0]))
        );
        assert_eq!(spec.span, Some(VariableDefinition::Uniform(58.7)));
        assert!(!spec.is_free(VariableId::Twist.descriptor()));
        assert!(spec.is_free(VariableId::Span.descriptor()));
        assert_eq!(spec.present().count(), 2);
    }

    #[test]
    fn non_boolean_flag_is_ambiguous() {
        let err = SurfaceSpec::from_entries(
            "wing",
            crm_reference_mesh(),
            [("span_dv", Value::Number(1.0))],
        )
        .unwrap_err();
        assert!(matches!(err, AssemblyError::AmbiguousVariableDefinition { ref key, .. } if key == "span_dv"));
    }

    #[test]
    fn nested_lists_are_ambiguous() {
        let nested = Value::List(vec![Value::numbers([1.0, 2.0])]);
        let err = SurfaceSpec::from_entries("wing", crm_reference_mesh(), [("chord_cp", nested)])
            .unwrap_err();
        assert!(matches!(err, AssemblyError::AmbiguousVariableDefinition { .. }));
    }

    #[test]
    fn lattice_size_needs_both_keys() {
        let spec = SurfaceSpec::from_entries(
            "wing",
            crm_reference_mesh(),
            [("mx", Value::Number(2.0)), ("my", Value::Number(3.0))],
        )
        .unwrap();
        assert_eq!(spec.ffd_lattice, Some((2, 3)));

        let spec =
            SurfaceSpec::from_entries("wing", crm_reference_mesh(), [("mx", Value::Number(2.0))])
                .unwrap();
        assert_eq!(spec.ffd_lattice, None);
    }

    #[test]
    fn repeated_keys_are_ambiguous() {
        let err = SurfaceSpec::from_entries(
            "wing",
            crm_reference_mesh(),
            [("span", Value::Number(50.0)), ("span", Value::Number(60.0))],
        )
        .unwrap_err();
        assert!(matches!(err, AssemblyError::AmbiguousVariableDefinition { ref key, .. } if key == "span"));

        let err = SurfaceSpec::from_entries(
            "wing",
            crm_reference_mesh(),
            [
                ("twist_cp_dv", Value::Boolean(true)),
                ("twist_cp_dv", Value::Boolean(false)),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, AssemblyError::AmbiguousVariableDefinition { ref key, .. } if key == "twist_cp_dv"));

        let err = SurfaceSpec::from_entries(
            "wing",
            crm_reference_mesh(),
            [("mx", Value::Number(2.0)), ("mx", Value::Number(3.0))],
        )
        .unwrap_err();
        assert!(matches!(err, AssemblyError::AmbiguousVariableDefinition { ref key, .. } if key == "mx"));
    }

    #[test]
    fn lattice_size_is_bounded() {
        assert_eq!(check_lattice(2, 3).unwrap(), (2, 3));
        assert!(matches!(
            check_lattice(0, 3),
            Err(AssemblyError::InvalidLatticeSize { rows: 0, columns: 3 })
        ));
        assert!(check_lattice(1 << 32, 1 << 32).is_err());
        assert!(check_lattice(MAX_LATTICE_POINTS, 2).is_err());

        let err = SurfaceSpec::from_entries(
            "wing",
            crm_reference_mesh(),
            [("mx", Value::Number(1e12)), ("my", Value::Number(1e12))],
        )
        .unwrap_err();
        assert!(matches!(err, AssemblyError::InvalidLatticeSize { .. }));
    }

    #[test]
    fn suggestions_for_typos() {
        assert_eq!(suggest_key("twist_dp").as_deref(), Some("twist_cp"));
        assert_eq!(suggest_key("Sweep").as_deref(), Some("sweep"));
        assert_eq!(suggest_key("wing_type"), None);
    }
}
