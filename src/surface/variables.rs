//! Vaste tabel van herkende ontwerpvariabelen.
//!
//! De volgorde van [`DESCRIPTORS`] is ook de volgorde waarin de assembler
//! nodes aanmaakt en poorten blootstelt.

use std::fmt;

use serde::Serialize;

use crate::geom::ReferenceMesh;

/// Identificatie van een herkende variabele.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableId {
    Twist,
    Chord,
    ThicknessRatio,
    XShear,
    YShear,
    ZShear,
    DihedralDistribution,
    Sweep,
    Span,
    Dihedral,
    Taper,
}

impl VariableId {
    /// De beschrijving van deze variabele in de vaste tabel.
    #[must_use]
    pub fn descriptor(self) -> &'static VariableDescriptor {
        &DESCRIPTORS[self as usize]
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.descriptor().key)
    }
}

/// Lengteregel voor de dichte uitvoer van een variabele.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputLength {
    /// Eén waarde per spanwijdte-station (N).
    Stations,
    /// Eén waarde per paneel (N - 1).
    Panels,
    /// Eén globale waarde.
    Scalar,
}

impl OutputLength {
    /// Aantal uitvoerwaarden voor een gegeven referentiemesh.
    #[must_use]
    pub fn resolve(self, mesh: &ReferenceMesh) -> usize {
        match self {
            Self::Stations => mesh.station_count(),
            Self::Panels => mesh.panel_count(),
            Self::Scalar => 1,
        }
    }
}

/// Fysische eenheid van een poort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Units {
    Degrees,
    Length,
    Dimensionless,
}

impl Units {
    /// Symbool zoals het in node-meta terechtkomt; dimensieloos heeft er geen.
    #[must_use]
    pub fn symbol(self) -> Option<&'static str> {
        match self {
            Self::Degrees => Some("deg"),
            Self::Length => Some("m"),
            Self::Dimensionless => None,
        }
    }
}

/// Beschrijving van één herkende variabele.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableDescriptor {
    pub id: VariableId,
    /// Sleutel in de oppervlakdefinitie (`twist_cp`, `span`, ...).
    pub key: &'static str,
    /// Naam van de controlepunt-poort; `None` voor globale scalars.
    pub control_point_name: Option<&'static str>,
    /// Naam van de dichte uitvoerpoort.
    pub output_name: &'static str,
    pub length: OutputLength,
    pub units: Units,
    pub default_free: bool,
}

impl VariableDescriptor {
    /// Sleutel van de vrij/vast-vlag, bv. `twist_cp_dv`.
    #[must_use]
    pub fn flag_key(&self) -> String {
        format!("{}{FLAG_SUFFIX}", self.key)
    }

    /// Verdeelde variabelen worden via controlepunten en interpolatie
    /// gedefinieerd.
    #[must_use]
    pub fn is_distributed(&self) -> bool {
        self.control_point_name.is_some()
    }
}

/// Achtervoegsel van vrij/vast-vlaggen.
pub const FLAG_SUFFIX: &str = "_dv";

pub const DESCRIPTORS: [VariableDescriptor; 11] = [
    distributed(VariableId::Twist, "twist_cp", "twist", OutputLength::Stations, Units::Degrees),
    distributed(VariableId::Chord, "chord_cp", "chord", OutputLength::Stations, Units::Length),
    distributed(
        VariableId::ThicknessRatio,
        "t_over_c_cp",
        "t_over_c",
        OutputLength::Panels,
        Units::Dimensionless,
    ),
    distributed(VariableId::XShear, "xshear_cp", "xshear", OutputLength::Stations, Units::Length),
    distributed(VariableId::YShear, "yshear_cp", "yshear", OutputLength::Stations, Units::Length),
    distributed(VariableId::ZShear, "zshear_cp", "zshear", OutputLength::Stations, Units::Length),
    distributed(
        VariableId::DihedralDistribution,
        "dihedral_distrib_cp",
        "dihedral_distrib",
        OutputLength::Panels,
        Units::Degrees,
    ),
    scalar(VariableId::Sweep, "sweep", Units::Degrees),
    scalar(VariableId::Span, "span", Units::Length),
    scalar(VariableId::Dihedral, "dihedral", Units::Degrees),
    scalar(VariableId::Taper, "taper", Units::Dimensionless),
];

const fn distributed(
    id: VariableId,
    control_point_name: &'static str,
    output_name: &'static str,
    length: OutputLength,
    units: Units,
) -> VariableDescriptor {
    VariableDescriptor {
        id,
        key: control_point_name,
        control_point_name: Some(control_point_name),
        output_name,
        length,
        units,
        default_free: true,
    }
}

const fn scalar(id: VariableId, name: &'static str, units: Units) -> VariableDescriptor {
    VariableDescriptor {
        id,
        key: name,
        control_point_name: None,
        output_name: name,
        length: OutputLength::Scalar,
        units,
        default_free: true,
    }
}

/// Zoekt een descriptor op zijn sleutel in de oppervlakdefinitie.
#[must_use]
pub fn descriptor_for_key(key: &str) -> Option<&'static VariableDescriptor> {
    DESCRIPTORS.iter().find(|descriptor| descriptor.key == key)
}

/// Zoekt een descriptor op de naam van zijn dichte uitvoerpoort.
#[must_use]
pub fn descriptor_for_output(name: &str) -> Option<&'static VariableDescriptor> {
    DESCRIPTORS
        .iter()
        .find(|descriptor| descriptor.output_name == name)
}

#[cfg(test)]
mod tests {
    use super::{DESCRIPTORS, OutputLength, VariableId, descriptor_for_key, descriptor_for_output};
    use crate::geom::crm_reference_mesh;

    #[test]
    fn table_is_indexed_by_id() {
        for (index, descriptor) in DESCRIPTORS.iter().enumerate() {
            assert_eq!(descriptor.id as usize, index);
            assert_eq!(descriptor.id.descriptor(), descriptor);
        }
    }

    #[test]
    fn panel_based_variables() {
        let panels: Vec<_> = DESCRIPTORS
            .iter()
            .filter(|d| d.length == OutputLength::Panels)
            .map(|d| d.output_name)
            .collect();
        assert_eq!(panels, vec!["t_over_c", "dihedral_distrib"]);

        let mesh = crm_reference_mesh();
        assert_eq!(OutputLength::Panels.resolve(&mesh), 19);
        assert_eq!(OutputLength::Stations.resolve(&mesh), 20);
    }

    #[test]
    fn keys_and_flags() {
        let twist = descriptor_for_key("twist_cp").expect("twist_cp is herkend");
        assert_eq!(twist.id, VariableId::Twist);
        assert_eq!(twist.flag_key(), "twist_cp_dv");
        assert!(twist.is_distributed());

        let span = descriptor_for_output("span").expect("span is herkend");
        assert_eq!(span.flag_key(), "span_dv");
        assert!(!span.is_distributed());
        assert_eq!(span.units.symbol(), Some("m"));

        assert!(descriptor_for_key("twist").is_none());
        assert_eq!(VariableId::ThicknessRatio.to_string(), "t_over_c_cp");
    }
}
