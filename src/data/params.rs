use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::Serialize;

use super::error::{Result, VolumeError};
use super::units::UnitValue;

// ---------------------------------------------------------------------------
// ParamValue – one typed value from a parameter line
// ---------------------------------------------------------------------------

/// A parameter value, typed by the tag in front of the first `:`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// `s:` – a quoted string.
    String(String),
    /// `i:` – an integer.
    Integer(i64),
    /// `b:` – `"TRUE"` / `"FALSE"`.
    Bool(bool),
    /// `d:` – a number followed by its unit.
    Dimensioned(UnitValue),
    /// `sv:` – a count followed by that many quoted strings.
    StringVector(Vec<String>),
}

impl ParamValue {
    pub fn as_unit_value(&self) -> Option<&UnitValue> {
        match self {
            ParamValue::Dimensioned(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::String(s) => write!(f, "\"{s}\""),
            ParamValue::Integer(i) => write!(f, "{i}"),
            ParamValue::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            ParamValue::Dimensioned(v) => write!(f, "{v}"),
            ParamValue::StringVector(items) => {
                write!(f, "{}", items.len())?;
                for item in items {
                    write!(f, " \"{item}\"")?;
                }
                Ok(())
            }
        }
    }
}

/// All keys of one named component, e.g. everything under `Ge/Box/`.
pub type Component = BTreeMap<String, ParamValue>;

// ---------------------------------------------------------------------------
// Line classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Geometry,
    Source,
}

impl Section {
    fn marker(self) -> &'static str {
        match self {
            Section::Geometry => ":Ge/",
            Section::Source => ":So/",
        }
    }
}

/// A parameter line that classified and decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamLine {
    pub section: Section,
    pub component: String,
    pub key: String,
    pub value: ParamValue,
}

/// Classify and decode a single line of a parameter file.
///
/// Returns `None` for anything that is not a geometry or source parameter
/// with a supported type tag: blank lines, comments, other sections,
/// malformed values.
pub fn parse_line(line: &str) -> Option<ParamLine> {
    let line = line.split('#').next().unwrap_or("");

    let mut fields = line.split(':');
    let tag = fields.next()?.trim();
    let section = match fields.next()?.get(..2)? {
        "Ge" => Section::Geometry,
        "So" => Section::Source,
        _ => return None,
    };

    let marker = section.marker();
    let after_marker = &line[line.find(marker)? + marker.len()..];
    let (component, after_component) = after_marker.split_once('/')?;
    let (key, raw) = after_component.split_once('=')?;
    let key = key.trim();
    if component.is_empty() || key.is_empty() {
        return None;
    }

    let value = decode_value(tag, raw.trim())?;
    Some(ParamLine {
        section,
        component: component.to_string(),
        key: key.to_string(),
        value,
    })
}

fn decode_value(tag: &str, raw: &str) -> Option<ParamValue> {
    match tag {
        "s" => Some(ParamValue::String(unquote(raw).to_string())),
        "i" => raw.parse().ok().map(ParamValue::Integer),
        "b" => Some(ParamValue::Bool(unquote(raw).eq_ignore_ascii_case("TRUE"))),
        "d" => {
            let mut tokens = raw.split_whitespace();
            let magnitude = tokens.next()?.parse::<f64>().ok()?;
            let unit = tokens.next()?;
            Some(ParamValue::Dimensioned(UnitValue::new(magnitude, unit)))
        }
        "sv" => Some(ParamValue::StringVector(
            raw.split_whitespace()
                .skip(1)
                .map(|tok| unquote(tok).to_string())
                .collect(),
        )),
        _ => None,
    }
}

fn unquote(s: &str) -> &str {
    let s = s.strip_prefix('"').unwrap_or(s);
    s.strip_suffix('"').unwrap_or(s)
}

// ---------------------------------------------------------------------------
// ParameterFile – geometry and source sections of a parameter file
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParameterFile {
    /// component name → key → value, from `Ge/` lines.
    pub geometry: BTreeMap<String, Component>,
    /// component name → key → value, from `So/` lines.
    pub source: BTreeMap<String, Component>,
}

impl ParameterFile {
    /// Read a parameter file. Only an unreadable file is an error; lines that
    /// do not parse are skipped.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text =
            std::fs::read_to_string(path).map_err(|e| VolumeError::unreadable(path, e))?;
        Ok(Self::parse(&text))
    }

    pub fn parse(text: &str) -> Self {
        let mut params = ParameterFile::default();
        for (line_no, line) in text.lines().enumerate() {
            match parse_line(line) {
                Some(parsed) => params.insert(parsed),
                None => log::trace!("parameter line {} skipped: {line:?}", line_no + 1),
            }
        }
        params
    }

    fn insert(&mut self, line: ParamLine) {
        let section = match line.section {
            Section::Geometry => &mut self.geometry,
            Section::Source => &mut self.source,
        };
        section
            .entry(line.component)
            .or_default()
            .insert(line.key, line.value);
    }

    pub fn geometry_component(&self, name: &str) -> Option<&Component> {
        self.geometry.get(name)
    }

    pub fn source_component(&self, name: &str) -> Option<&Component> {
        self.source.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
# Phantom
s:Ge/Box/Type     = "TsBox"
s:Ge/Box/Parent   = "World"
d:Ge/Box/HLX      = 10.0 cm
d:Ge/Box/TransX   = 5.0 mm   # shifted
i:Ge/Box/XBins    = 20
b:Ge/Box/IsParallel = "true"
sv:Ge/Box/Materials = 2 "G4_WATER" "G4_AIR"
u:Ge/Box/Scale    = 1.5
d:Ge/Box/RotX     = Ge/Other/RotX deg

s:So/Beam/Type             = "Beam"
d:So/Beam/BeamEnergy       = 150 MeV
i:So/Beam/NumberOfHistoriesInRun = 1000
s:Sc/Dose/Quantity = "DoseToMedium"
includeFile = base.txt
"#;

    #[test]
    fn dimensioned_geometry_value() {
        let params = ParameterFile::parse("d:Ge/Box/TransX = 5.0 mm\n");
        assert_eq!(
            params.geometry["Box"]["TransX"],
            ParamValue::Dimensioned(UnitValue::new(5.0, "mm"))
        );
    }

    #[test]
    fn every_type_tag_decodes() {
        let params = ParameterFile::parse(SAMPLE);
        let bx = params.geometry_component("Box").unwrap();
        assert_eq!(bx["Type"], ParamValue::String("TsBox".into()));
        assert_eq!(bx["HLX"], ParamValue::Dimensioned(UnitValue::new(10.0, "cm")));
        assert_eq!(bx["TransX"], ParamValue::Dimensioned(UnitValue::new(5.0, "mm")));
        assert_eq!(bx["XBins"], ParamValue::Integer(20));
        assert_eq!(bx["IsParallel"], ParamValue::Bool(true));
        assert_eq!(
            bx["Materials"],
            ParamValue::StringVector(vec!["G4_WATER".into(), "G4_AIR".into()])
        );
    }

    #[test]
    fn unsupported_and_malformed_lines_contribute_nothing() {
        let params = ParameterFile::parse(SAMPLE);
        let bx = &params.geometry["Box"];
        assert!(!bx.contains_key("Scale"));
        assert!(!bx.contains_key("RotX"));
        assert_eq!(params.geometry.len(), 1);
    }

    #[test]
    fn source_section_is_separate() {
        let params = ParameterFile::parse(SAMPLE);
        let beam = params.source_component("Beam").unwrap();
        assert_eq!(beam["Type"].as_str(), Some("Beam"));
        assert_eq!(
            beam["BeamEnergy"].as_unit_value(),
            Some(&UnitValue::new(150.0, "MeV"))
        );
        assert_eq!(beam["NumberOfHistoriesInRun"], ParamValue::Integer(1000));
        assert!(!params.geometry.contains_key("Beam"));
    }

    #[test]
    fn bool_compare_ignores_case() {
        assert_eq!(
            parse_line(r#"b:Ge/Box/Invisible = "False""#).map(|l| l.value),
            Some(ParamValue::Bool(false))
        );
        assert_eq!(
            parse_line(r#"b:So/Beam/Active = "TRUE""#).map(|l| l.value),
            Some(ParamValue::Bool(true))
        );
    }

    #[test]
    fn comment_hides_rest_of_line() {
        assert_eq!(parse_line("# d:Ge/Box/HLX = 1 cm"), None);
        let line = parse_line("i:Ge/Box/ZBins = 4 # = 8").unwrap();
        assert_eq!(line.value, ParamValue::Integer(4));
    }

    #[test]
    fn classification_extracts_parts() {
        let line = parse_line("  d:Ge/Water Tank/HLZ = 2.5 m").unwrap();
        assert_eq!(line.section, Section::Geometry);
        assert_eq!(line.component, "Water Tank");
        assert_eq!(line.key, "HLZ");
        assert_eq!(line.value, ParamValue::Dimensioned(UnitValue::new(2.5, "m")));
    }

    #[test]
    fn garbage_is_skipped() {
        for line in ["", ":", "d:G", "i:Ge/Box/Bins = many", "d:Ge/Box/HLX = 1.0", "d:Ge//HLX = 1 cm"] {
            assert_eq!(parse_line(line), None, "{line:?}");
        }
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = ParameterFile::from_path(Path::new("/nonexistent/params.txt")).unwrap_err();
        assert!(matches!(err, VolumeError::FileNotReadable { .. }));
    }
}
