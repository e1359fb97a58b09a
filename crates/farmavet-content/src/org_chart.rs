//! Org chart organisation for the team page.
//!
//! Input rows are positions (`organigrama`) left-joined with the member
//! holding them (`equipo`); member columns carry a `miembro_` prefix. Output
//! is sections → subsections → positions, all in first-seen order, with
//! translatable text already resolved.

use std::collections::HashMap;

use farmavet_core::{FieldLookup, Language, resolve, resolve_text};
use serde::Serialize;
use serde_json::{Map, Value as Json};

/// Subsection name used for positions without one.
pub const NO_SUBSECTION: &str = "Sin subsección";

/// Column prefix of member fields in joined org chart rows.
pub const MEMBER_PREFIX: &str = "miembro_";

/// One section of the org chart (`direccion`, `tecnico`, …).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrgSection {
    /// Raw section identifier
    pub seccion: String,
    /// Subsections in first-seen order
    pub subsections: Vec<OrgSubsection>,
}

/// Positions sharing a subsection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrgSubsection {
    /// Raw subsection name, or [`NO_SUBSECTION`]
    pub name: String,
    /// Display title in the requested language
    pub title: String,
    /// Positions in input order
    pub positions: Vec<OrgPosition>,
}

/// A position, with the member holding it if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrgPosition {
    /// Position id
    pub id: Option<i64>,
    /// Resolved position title
    pub cargo: String,
    /// Resolved description
    pub descripcion: Option<String>,
    /// Manual ordering
    pub orden: i64,
    /// Member assigned to the position
    pub miembro: Option<OrgMember>,
}

/// A team member as shown on the team page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrgMember {
    /// Member id
    pub id: i64,
    /// Full name
    pub nombre: String,
    /// Resolved biography
    pub biografia: Option<String>,
    /// Contact e-mail
    pub email: Option<String>,
    /// Photo URL
    pub imagen: Option<String>,
    /// Photo zoom factor
    pub imagen_zoom: f64,
    /// Photo horizontal offset
    pub imagen_x: f64,
    /// Photo vertical offset
    pub imagen_y: f64,
    /// Tags decoded from the JSON column; empty when invalid
    pub tags: Vec<Json>,
    /// Social links decoded from the JSON column; empty when invalid
    pub redes_sociales: Map<String, Json>,
}

impl OrgMember {
    /// Build a member from columns named `{prefix}{field}`.
    ///
    /// Returns `None` when `{prefix}id` is missing or null (no member).
    pub fn from_row<R>(row: &R, prefix: &str, language: Language) -> Option<Self>
    where
        R: FieldLookup + ?Sized,
    {
        let col = |name: &str| format!("{prefix}{name}");
        let id = row.field(&col("id")).and_then(|v| v.as_i64())?;
        let text = |name: &str| optional_text(row, &col(name), language);
        let number = |name: &str, default: f64| {
            row.field(&col(name))
                .and_then(|v| v.as_f64())
                .unwrap_or(default)
        };
        let raw = |name: &str| {
            row.field(&col(name))
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };

        Some(Self {
            id,
            nombre: resolve_text(row, &col("nombre"), language),
            biografia: text("biografia"),
            email: text("email"),
            imagen: text("imagen"),
            imagen_zoom: number("imagen_zoom", 1.0),
            imagen_x: number("imagen_x", 0.0),
            imagen_y: number("imagen_y", 0.0),
            tags: parse_json_list(&raw("tags")),
            redes_sociales: parse_json_object(&raw("redes_sociales")),
        })
    }
}

/// A member of the direction section, with their position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectionMember {
    /// Member details
    #[serde(flatten)]
    pub member: OrgMember,
    /// Resolved position title
    pub cargo_nombre: String,
    /// Resolved position description
    pub cargo_descripcion: Option<String>,
}

/// Organise joined position/member rows for `language`.
pub fn organize_org_chart<R: FieldLookup>(rows: &[R], language: Language) -> Vec<OrgSection> {
    let mut sections: Vec<OrgSection> = Vec::new();
    let mut section_index: HashMap<String, usize> = HashMap::new();
    let mut subsection_index: HashMap<(usize, String), usize> = HashMap::new();

    for row in rows {
        let seccion = resolve_text(row, "seccion", Language::Es);
        let subseccion = match row.field("subseccion") {
            Some(v) if !v.is_blank() => v.to_text().into_owned(),
            _ => NO_SUBSECTION.to_string(),
        };

        let s = *section_index.entry(seccion.clone()).or_insert_with(|| {
            sections.push(OrgSection {
                seccion,
                subsections: Vec::new(),
            });
            sections.len() - 1
        });
        let subsections = &mut sections[s].subsections;
        let sub = *subsection_index
            .entry((s, subseccion.clone()))
            .or_insert_with(|| {
                let title = optional_text(row, "subseccion", language)
                    .unwrap_or_else(|| subseccion.clone());
                subsections.push(OrgSubsection {
                    name: subseccion,
                    title,
                    positions: Vec::new(),
                });
                subsections.len() - 1
            });

        subsections[sub].positions.push(OrgPosition {
            id: row.field("id").and_then(|v| v.as_i64()),
            cargo: resolve_text(row, "cargo", language),
            descripcion: optional_text(row, "descripcion", language),
            orden: row.field("orden").and_then(|v| v.as_i64()).unwrap_or(0),
            miembro: OrgMember::from_row(row, MEMBER_PREFIX, language),
        });
    }

    sections
}

/// Build the direction list from member rows joined with their position.
///
/// Position columns are `cargo_nombre` and `cargo_descripcion` (plus their
/// `_en` companions); a row without `cargo_nombre` falls back to the
/// member's legacy `cargo` column.
pub fn direction_members<R: FieldLookup>(rows: &[R], language: Language) -> Vec<DirectionMember> {
    rows.iter()
        .filter_map(|row| {
            let member = OrgMember::from_row(row, "", language)?;
            let cargo_nombre = optional_text(row, "cargo_nombre", language)
                .or_else(|| optional_text(row, "cargo", language))
                .unwrap_or_default();
            Some(DirectionMember {
                member,
                cargo_nombre,
                cargo_descripcion: optional_text(row, "cargo_descripcion", language),
            })
        })
        .collect()
}

/// Decode a JSON object column. Anything else yields an empty object.
///
/// # Examples
///
/// ```
/// use farmavet_content::org_chart::parse_json_object;
///
/// let links = parse_json_object(r#"{"linkedin": "https://linkedin.com/in/x"}"#);
/// assert_eq!(links.len(), 1);
/// assert!(parse_json_object("not json").is_empty());
/// assert!(parse_json_object("[1, 2]").is_empty());
/// ```
pub fn parse_json_object(raw: &str) -> Map<String, Json> {
    match serde_json::from_str(raw) {
        Ok(Json::Object(map)) => map,
        _ => Map::new(),
    }
}

/// Decode a JSON array column. Anything else yields an empty list.
pub fn parse_json_list(raw: &str) -> Vec<Json> {
    match serde_json::from_str(raw) {
        Ok(Json::Array(items)) => items,
        _ => Vec::new(),
    }
}

fn optional_text<R>(row: &R, field: &str, language: Language) -> Option<String>
where
    R: FieldLookup + ?Sized,
{
    resolve(row, field, language)
        .filter(|v| !v.is_blank())
        .map(|v| v.to_text().into_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use farmavet_core::{Record, Value};

    fn position(id: i64, seccion: &str, subseccion: Option<&str>, cargo: &str) -> Record {
        Record::new()
            .with("id", id)
            .with("seccion", seccion)
            .with("subseccion", subseccion)
            .with("subseccion_en", Value::Null)
            .with("cargo", cargo)
            .with("cargo_en", Value::Null)
            .with("descripcion", Value::Null)
            .with("orden", id)
            .with("miembro_id", Value::Null)
    }

    fn with_member(row: Record, id: i64, nombre: &str, redes: &str) -> Record {
        row.with("miembro_id", id)
            .with("miembro_nombre", nombre)
            .with("miembro_biografia", "Bio")
            .with("miembro_biografia_en", "Bio EN")
            .with("miembro_imagen_zoom", 1.5)
            .with("miembro_tags", r#"["HPLC", "QA"]"#)
            .with("miembro_redes_sociales", redes)
    }

    // ------------------------------------------------------------------------
    // organize_org_chart tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_sections_and_subsections_first_seen() {
        let rows = vec![
            position(1, "tecnico", Some("Operaciones"), "Analista"),
            position(2, "direccion", None, "Director"),
            position(3, "tecnico", Some("Calidad"), "Encargado"),
            position(4, "tecnico", Some("Operaciones"), "Técnico"),
        ];
        let chart = organize_org_chart(&rows, Language::Es);
        assert_eq!(chart.len(), 2);
        assert_eq!(chart[0].seccion, "tecnico");
        let subs: Vec<_> = chart[0].subsections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(subs, ["Operaciones", "Calidad"]);
        assert_eq!(chart[0].subsections[0].positions.len(), 2);
        assert_eq!(chart[1].subsections[0].name, NO_SUBSECTION);
    }

    #[test]
    fn test_blank_subsection_uses_placeholder() {
        let rows = vec![position(1, "calidad", Some("  "), "Jefe")];
        let chart = organize_org_chart(&rows, Language::Es);
        assert_eq!(chart[0].subsections[0].name, NO_SUBSECTION);
        assert_eq!(chart[0].subsections[0].title, NO_SUBSECTION);
    }

    #[test]
    fn test_english_titles() {
        let rows = vec![
            position(1, "tecnico", Some("Operaciones"), "Analista")
                .with("subseccion_en", "Operations")
                .with("cargo_en", "Analyst"),
        ];
        let chart = organize_org_chart(&rows, Language::En);
        let sub = &chart[0].subsections[0];
        assert_eq!(sub.name, "Operaciones");
        assert_eq!(sub.title, "Operations");
        assert_eq!(sub.positions[0].cargo, "Analyst");
    }

    #[test]
    fn test_position_with_member() {
        let rows = vec![with_member(
            position(1, "direccion", None, "Director"),
            7,
            "Dra. Pérez",
            r#"{"linkedin": "https://linkedin.com/in/perez"}"#,
        )];
        let chart = organize_org_chart(&rows, Language::En);
        let member = chart[0].subsections[0].positions[0].miembro.as_ref().unwrap();
        assert_eq!(member.id, 7);
        assert_eq!(member.nombre, "Dra. Pérez");
        assert_eq!(member.biografia.as_deref(), Some("Bio EN"));
        assert_eq!(member.imagen_zoom, 1.5);
        assert_eq!(member.imagen_x, 0.0);
        assert_eq!(member.tags.len(), 2);
        assert!(member.redes_sociales.contains_key("linkedin"));
    }

    #[test]
    fn test_invalid_social_links_become_empty() {
        let rows = vec![with_member(position(1, "tecnico", None, "A"), 1, "X", "{broken")];
        let chart = organize_org_chart(&rows, Language::Es);
        let member = chart[0].subsections[0].positions[0].miembro.as_ref().unwrap();
        assert!(member.redes_sociales.is_empty());
    }

    #[test]
    fn test_vacant_position() {
        let rows = vec![position(1, "tecnico", None, "Vacante")];
        let chart = organize_org_chart(&rows, Language::Es);
        assert!(chart[0].subsections[0].positions[0].miembro.is_none());
    }

    // ------------------------------------------------------------------------
    // direction_members tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_direction_members() {
        let rows = vec![
            Record::new()
                .with("id", 3_i64)
                .with("nombre", "Dr. Soto")
                .with("redes_sociales", Value::Null)
                .with("cargo_nombre", "Director")
                .with("cargo_nombre_en", "Director (EN)")
                .with("cargo_descripcion", "Dirige"),
            Record::new()
                .with("id", 4_i64)
                .with("nombre", "Sra. Rojas")
                .with("cargo", "Subdirectora"),
        ];
        let members = direction_members(&rows, Language::En);
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].cargo_nombre, "Director (EN)");
        assert_eq!(members[0].cargo_descripcion.as_deref(), Some("Dirige"));
        assert!(members[0].member.redes_sociales.is_empty());
        assert_eq!(members[1].cargo_nombre, "Subdirectora");
    }

    #[test]
    fn test_direction_member_serializes_flat() {
        let rows = vec![
            Record::new()
                .with("id", 3_i64)
                .with("nombre", "Dr. Soto")
                .with("cargo_nombre", "Director"),
        ];
        let json = serde_json::to_value(direction_members(&rows, Language::Es)).unwrap();
        assert_eq!(json[0]["nombre"], "Dr. Soto");
        assert_eq!(json[0]["cargo_nombre"], "Director");
    }

    // ------------------------------------------------------------------------
    // JSON column helpers
    // ------------------------------------------------------------------------

    #[test]
    fn test_parse_json_list() {
        assert_eq!(parse_json_list(r#"["a"]"#).len(), 1);
        assert!(parse_json_list("").is_empty());
        assert!(parse_json_list("{}").is_empty());
    }
}
