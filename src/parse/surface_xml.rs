//! Parser voor XML-oppervlakdefinities.
//!
//! ```xml
//! <surface name="wing">
//!   <planform reference="crm"/>
//!   <variable name="twist_cp" dv="false"><cp>2.0</cp><cp>0.0</cp><cp>-2.0</cp></variable>
//!   <variable name="span" value="58.7"/>
//!   <ffd mx="2" my="3"/>
//! </surface>
//! ```
//!
//! Meerdere oppervlakken kunnen in een `<surfaces>` root staan.

use std::collections::BTreeSet;
use std::num::ParseFloatError;

use quick_xml::de::from_str;
use serde::Deserialize;
use thiserror::Error;

use crate::assembly::AssemblyError;
use crate::geom::{PlanformStation, ReferenceMesh, build_reference_mesh, crm_reference_mesh};
use crate::graph::value::Value;
use crate::surface::{FLAG_SUFFIX, SurfaceSpec};

/// Result type voor het parsen van oppervlakdefinities.
pub type ParseResult<T> = Result<T, ParseError>;

/// Beschrijft fouten tijdens het parsen.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Het XML-document kon niet gede-serialiseerd worden.
    #[error("XML parsefout: {0}")]
    Xml(#[from] quick_xml::DeError),
    /// Fout tijdens het converteren van numerieke waarden.
    #[error("ongeldige numerieke waarde: {0}")]
    Number(#[from] ParseFloatError),
    /// De planform ontbreekt of is niet eenduidig.
    #[error("ongeldige planform: {0}")]
    Planform(String),
    /// Het document heeft geen `<surface>` of `<surfaces>` root.
    #[error("onbekend documentformaat: {0}")]
    Format(String),
    /// Twee oppervlakken in één document met dezelfde naam.
    #[error("oppervlak `{0}` komt meer dan eens voor")]
    DuplicateSurface(String),
    /// Een waarde is NaN of oneindig.
    #[error("`{key}` moet een eindig getal zijn")]
    NonFinite { key: String },
    /// De variabelen vormen geen geldige oppervlakdefinitie.
    #[error(transparent)]
    Surface(#[from] AssemblyError),
}

/// Leest een document met één of meer oppervlakken.
pub fn parse_str(input: &str) -> ParseResult<Vec<SurfaceSpec>> {
    let trimmed = strip_xml_preamble(input);
    let prefix = trimmed.chars().take(16).collect::<String>().to_lowercase();

    if prefix.starts_with("<surfaces") {
        let document: SurfacesDocument = from_str(input)?;
        log::debug!("{} oppervlakken gevonden", document.surfaces.len());

        let mut names = BTreeSet::new();
        if let Some(duplicate) = document
            .surfaces
            .iter()
            .find(|surface| !names.insert(surface.name.as_str()))
        {
            return Err(ParseError::DuplicateSurface(duplicate.name.clone()));
        }

        document
            .surfaces
            .into_iter()
            .map(SurfaceDocument::into_spec)
            .collect()
    } else if prefix.starts_with("<surface") {
        parse_surface(input).map(|spec| vec![spec])
    } else {
        Err(ParseError::Format(
            "geen <surface> of <surfaces> root gevonden".to_owned(),
        ))
    }
}

/// Leest een document met precies één `<surface>` root.
pub fn parse_surface(input: &str) -> ParseResult<SurfaceSpec> {
    let document: SurfaceDocument = from_str(input)?;
    document.into_spec()
}

fn strip_xml_preamble(input: &str) -> &str {
    let trimmed = input.trim_start_matches(|c: char| c == '\u{feff}' || c.is_whitespace());
    if let Some(rest) = trimmed.strip_prefix("<?xml") {
        if let Some(idx) = rest.find("?>") {
            return rest[idx + 2..].trim_start();
        }
    }
    trimmed
}

fn parse_f64(raw: &str) -> Result<f64, ParseFloatError> {
    raw.trim().replace(',', ".").parse::<f64>()
}

fn parse_finite(key: &str, raw: &str) -> ParseResult<f64> {
    let value = parse_f64(raw)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParseError::NonFinite {
            key: key.to_owned(),
        })
    }
}

fn parse_flag(key: &str, raw: &str) -> ParseResult<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(AssemblyError::AmbiguousVariableDefinition {
            key: key.to_owned(),
            found: format!("`{}`", raw.trim()),
        }
        .into()),
    }
}

#[derive(Debug, Deserialize)]
struct SurfacesDocument {
    #[serde(default, rename = "surface")]
    surfaces: Vec<SurfaceDocument>,
}

#[derive(Debug, Deserialize)]
struct SurfaceDocument {
    #[serde(rename = "@name")]
    name: String,
    #[serde(default)]
    planform: Option<PlanformElement>,
    #[serde(default, rename = "variable")]
    variables: Vec<VariableElement>,
    #[serde(default)]
    ffd: Option<FfdElement>,
}

#[derive(Debug, Deserialize)]
struct PlanformElement {
    #[serde(default, rename = "@reference")]
    reference: Option<String>,
    #[serde(default, rename = "station")]
    stations: Vec<StationElement>,
}

#[derive(Debug, Deserialize)]
struct StationElement {
    #[serde(rename = "@eta")]
    eta: f64,
    #[serde(rename = "@xle")]
    xle: f64,
    #[serde(rename = "@yle")]
    yle: f64,
    #[serde(rename = "@zle")]
    zle: f64,
    #[serde(default, rename = "@twist")]
    twist: f64,
    #[serde(rename = "@chord")]
    chord: f64,
}

#[derive(Debug, Deserialize)]
struct VariableElement {
    #[serde(rename = "@name")]
    name: String,
    #[serde(default, rename = "@dv")]
    dv: Option<String>,
    #[serde(default, rename = "@value")]
    value: Option<String>,
    #[serde(default, rename = "cp")]
    control_points: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct FfdElement {
    #[serde(rename = "@mx")]
    mx: usize,
    #[serde(rename = "@my")]
    my: usize,
}

impl SurfaceDocument {
    fn into_spec(self) -> ParseResult<SurfaceSpec> {
        let Self {
            name,
            planform,
            variables,
            ffd,
        } = self;
        log::debug!(
            "oppervlak `{name}`: {} variabelen gevonden",
            variables.len()
        );

        let mesh = planform
            .ok_or_else(|| ParseError::Planform(format!("oppervlak `{name}` heeft geen <planform>")))?
            .into_mesh()?;

        let mut entries = Vec::with_capacity(variables.len() * 2);
        for variable in variables {
            variable.push_entries(&mut entries)?;
        }

        let mut spec = SurfaceSpec::from_entries(name, mesh, entries)?;
        if let Some(ffd) = ffd {
            spec.set_ffd_lattice(ffd.mx, ffd.my)?;
        }
        Ok(spec)
    }
}

impl PlanformElement {
    fn into_mesh(self) -> ParseResult<ReferenceMesh> {
        match (self.reference, self.stations.is_empty()) {
            (Some(reference), true) if reference.trim().eq_ignore_ascii_case("crm") => {
                Ok(crm_reference_mesh())
            }
            (Some(reference), true) => Err(ParseError::Planform(format!(
                "onbekende referentie `{reference}`"
            ))),
            (Some(_), false) => Err(ParseError::Planform(
                "referentie en stations tegelijk opgegeven".to_owned(),
            )),
            (None, true) => Err(ParseError::Planform("geen stations opgegeven".to_owned())),
            (None, false) => {
                let table: Vec<PlanformStation> = self
                    .stations
                    .iter()
                    .map(|s| PlanformStation::new(s.eta, s.xle, s.yle, s.zle, s.twist, s.chord))
                    .collect();
                if table.iter().any(|station| {
                    [
                        station.eta,
                        station.xle,
                        station.yle,
                        station.zle,
                        station.twist,
                        station.chord,
                    ]
                    .iter()
                    .any(|value| !value.is_finite())
                }) {
                    return Err(ParseError::Planform(
                        "stations bevatten NaN of oneindige waarden".to_owned(),
                    ));
                }
                if table.windows(2).any(|pair| pair[1].eta <= pair[0].eta) {
                    return Err(ParseError::Planform(
                        "stations moeten op stijgende eta staan".to_owned(),
                    ));
                }
                Ok(build_reference_mesh(&table))
            }
        }
    }
}

impl VariableElement {
    fn push_entries(self, entries: &mut Vec<(String, Value)>) -> ParseResult<()> {
        let value = match (self.value, self.control_points.is_empty()) {
            (Some(raw), true) => Value::Number(parse_finite(&self.name, &raw)?),
            (None, false) => Value::List(
                self.control_points
                    .iter()
                    .map(|raw| parse_finite(&self.name, raw).map(Value::Number))
                    .collect::<ParseResult<_>>()?,
            ),
            (Some(_), false) => {
                return Err(AssemblyError::AmbiguousVariableDefinition {
                    key: self.name,
                    found: "value en cp".to_owned(),
                }
                .into());
            }
            (None, true) => {
                return Err(AssemblyError::AmbiguousVariableDefinition {
                    key: self.name,
                    found: "geen waarde".to_owned(),
                }
                .into());
            }
        };

        if let Some(raw) = self.dv {
            let flag_key = format!("{}{FLAG_SUFFIX}", self.name);
            let free = parse_flag(&flag_key, &raw)?;
            entries.push((flag_key, Value::Boolean(free)));
        }
        entries.push((self.name, value));
        Ok(())
    }
}
