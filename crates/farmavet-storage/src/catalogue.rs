//! Static catalogue of content tables.
//!
//! Every table the admin can edit is described here: its columns, their
//! kinds, which are required and which have an `_en` translation companion.
//! The catalogue is the only source of identifiers interpolated into SQL;
//! everything else is bound as a parameter.

use farmavet_core::{Error as CoreError, Record, Value, translated_key};

use crate::error::{Error, Result};

/// Storage kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Free text
    Text,
    /// Whole number
    Integer,
    /// Floating point number
    Real,
    /// Boolean stored as 0/1
    Flag,
}

/// A column of a content table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Column name
    pub name: &'static str,
    /// Storage kind
    pub kind: ColumnKind,
    /// Must be non-blank on insert (and on update when present)
    pub required: bool,
    /// Has a `<name>_en` companion column
    pub translatable: bool,
}

impl Column {
    const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            translatable: false,
        }
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    const fn translatable(mut self) -> Self {
        self.translatable = true;
        self
    }
}

const fn text(name: &'static str) -> Column {
    Column::new(name, ColumnKind::Text)
}

const fn integer(name: &'static str) -> Column {
    Column::new(name, ColumnKind::Integer)
}

const fn real(name: &'static str) -> Column {
    Column::new(name, ColumnKind::Real)
}

const fn flag(name: &'static str) -> Column {
    Column::new(name, ColumnKind::Flag)
}

/// Columns maintained by the database itself.
pub const SYSTEM_COLUMNS: [&str; 3] = ["id", "created_at", "updated_at"];

/// A content table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Table {
    /// Table name
    pub name: &'static str,
    /// Editable base columns (translations implied by `translatable`)
    pub columns: &'static [Column],
    /// Flag column hiding rows from public pages
    pub activity_column: &'static str,
    /// `ORDER BY` clause used for listings
    pub order_by: &'static str,
}

/// Where a written column came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Base(Column),
    Translation(Column),
}

/// Whether a write creates a row or modifies one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Every required column must be present
    Insert,
    /// Only present columns are checked
    Update,
}

impl Table {
    /// Base column by name.
    pub fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Whether `name` is a readable column (base, translation, activity or system).
    pub fn has_column(&self, name: &str) -> bool {
        self.target(name).is_some() || SYSTEM_COLUMNS.contains(&name)
    }

    /// Base and translation column names, schema order.
    pub fn writable_columns(&self) -> Vec<String> {
        let mut names = Vec::new();
        for column in self.columns {
            names.push(column.name.to_string());
            if column.translatable {
                names.push(translated_key(column.name));
            }
        }
        names
    }

    fn target(&self, name: &str) -> Option<Target> {
        if let Some(column) = self.column(name) {
            return Some(Target::Base(*column));
        }
        let base = name.strip_suffix(farmavet_core::fields::TRANSLATION_SUFFIX)?;
        self.column(base)
            .filter(|c| c.translatable)
            .map(|c| Target::Translation(*c))
    }

    /// Validate and coerce `record` for writing.
    ///
    /// System columns are ignored. Unknown columns are rejected, required
    /// columns must be non-blank, values are coerced to the column kind and
    /// blank translations are stored as NULL.
    pub fn prepare_write(&self, record: &Record, mode: WriteMode) -> Result<Vec<(String, Value)>> {
        let mut out = Vec::with_capacity(record.len());
        for (key, value) in record.iter() {
            if SYSTEM_COLUMNS.contains(&key) {
                continue;
            }
            let target = self
                .target(key)
                .ok_or_else(|| Error::unknown_column(self.name, key))?;
            let coerced = match target {
                Target::Base(column) => {
                    let v = coerce(&column, key, value)?;
                    if column.required && v.is_blank() {
                        return Err(required(key));
                    }
                    v
                }
                Target::Translation(_) if value.is_blank() => Value::Null,
                Target::Translation(_) => Value::Text(value.to_text().into_owned()),
            };
            out.push((key.to_string(), coerced));
        }

        if mode == WriteMode::Insert {
            for column in self.columns.iter().filter(|c| c.required) {
                if !record.contains_key(column.name) {
                    return Err(required(column.name));
                }
            }
        }
        Ok(out)
    }
}

fn required(column: &str) -> Error {
    CoreError::validation_field(column, format!("{column} is required")).into()
}

fn invalid(column: &str, expected: &str, value: &Value) -> Error {
    CoreError::validation_field(
        column,
        format!("{column} must be {expected}, got '{}'", value.to_text()),
    )
    .into()
}

fn coerce(column: &Column, key: &str, value: &Value) -> Result<Value> {
    let coerced = match (column.kind, value) {
        (_, Value::Null) if column.kind == ColumnKind::Flag => Value::Integer(0),
        (_, Value::Null) => Value::Null,
        (ColumnKind::Text, v) => Value::Text(v.to_text().into_owned()),
        (ColumnKind::Flag, v) => Value::Integer(i64::from(v.is_truthy())),
        (ColumnKind::Integer | ColumnKind::Real, v) if v.is_blank() => Value::Null,
        (ColumnKind::Integer, Value::Real(f)) if f.fract() == 0.0 => Value::Integer(*f as i64),
        (ColumnKind::Integer, v) => Value::Integer(
            v.as_i64()
                .ok_or_else(|| invalid(key, "a whole number", v))?,
        ),
        (ColumnKind::Real, v) => Value::Real(v.as_f64().ok_or_else(|| invalid(key, "a number", v))?),
    };
    Ok(coerced)
}

/// Every content table.
pub static TABLES: &[Table] = &[
    Table {
        name: "programas",
        columns: &[
            text("tipo").required().translatable(),
            text("titulo").required().translatable(),
            text("descripcion").translatable(),
            text("modalidad").translatable(),
            text("horario").translatable(),
            text("patrocinio").translatable(),
            text("auspicio").translatable(),
            text("email_contacto"),
            text("texto_boton").translatable(),
            integer("orden"),
            flag("activo"),
        ],
        activity_column: "activo",
        order_by: "orden, id DESC",
    },
    Table {
        name: "testimonios",
        columns: &[
            text("titulo").required().translatable(),
            text("contenido").required().translatable(),
            text("autor"),
            text("categoria"),
            text("tags"),
            text("imagen"),
            integer("orden"),
            flag("activo"),
        ],
        activity_column: "activo",
        order_by: "orden, id DESC",
    },
    Table {
        name: "noticias",
        columns: &[
            text("titulo").required().translatable(),
            text("resumen").translatable(),
            text("contenido").translatable(),
            text("imagen"),
            real("imagen_zoom"),
            real("imagen_x"),
            real("imagen_y"),
            text("categoria").translatable(),
            text("fecha"),
            text("enlace_externo"),
            integer("orden"),
            flag("destacada"),
            flag("activa"),
        ],
        activity_column: "activa",
        order_by: "destacada DESC, fecha DESC, id DESC",
    },
    Table {
        name: "organigrama",
        columns: &[
            text("seccion").required(),
            text("subseccion").translatable(),
            text("cargo").required().translatable(),
            text("descripcion").translatable(),
            integer("orden"),
            flag("activo"),
        ],
        activity_column: "activo",
        order_by: "seccion, orden, id",
    },
    Table {
        name: "equipo",
        columns: &[
            text("nombre").required(),
            integer("cargo_id"),
            text("cargo"),
            text("biografia").translatable(),
            text("email"),
            text("imagen"),
            real("imagen_zoom"),
            real("imagen_x"),
            real("imagen_y"),
            text("tags"),
            text("redes_sociales"),
            integer("orden"),
            flag("activo"),
        ],
        activity_column: "activo",
        order_by: "orden, id",
    },
    Table {
        name: "clientes",
        columns: &[
            text("nombre").required().translatable(),
            text("logo"),
            text("enlace"),
            text("categoria"),
            flag("mostrar_en_index"),
            flag("mostrar_en_casa_omsa"),
            integer("orden"),
            flag("activo"),
        ],
        activity_column: "activo",
        order_by: "orden, id",
    },
    Table {
        name: "convenios",
        columns: &[
            text("nombre").required(),
            text("tipo"),
            text("descripcion"),
            text("logo"),
            text("enlace"),
            integer("orden"),
            flag("activo"),
        ],
        activity_column: "activo",
        order_by: "orden, id",
    },
    Table {
        name: "hero_media",
        columns: &[
            text("pagina").required(),
            text("tipo").required(),
            text("titulo").translatable(),
            text("contenido").translatable(),
            text("imagenes"),
            text("imagenes_ajustes"),
            integer("orden"),
            flag("activo"),
        ],
        activity_column: "activo",
        order_by: "pagina, orden, id",
    },
    Table {
        name: "tarjetas_destacadas",
        columns: &[
            text("pagina").required(),
            text("titulo").required().translatable(),
            text("contenido").required().translatable(),
            text("enlace"),
            text("texto_enlace").translatable(),
            integer("orden"),
            flag("activo"),
        ],
        activity_column: "activo",
        order_by: "orden, id",
    },
    Table {
        name: "estadisticas",
        columns: &[
            integer("numero").required(),
            text("sufijo"),
            text("etiqueta").required().translatable(),
            integer("orden"),
            flag("activo"),
        ],
        activity_column: "activo",
        order_by: "orden, id",
    },
    Table {
        name: "eventos",
        columns: &[
            text("titulo").required().translatable(),
            text("fecha").required(),
            text("meta").translatable(),
            text("descripcion").translatable(),
            text("enlace"),
            text("texto_boton").translatable(),
            integer("orden"),
            flag("activo"),
        ],
        activity_column: "activo",
        order_by: "orden, id",
    },
    Table {
        name: "contenido",
        columns: &[
            text("seccion").required(),
            text("titulo"),
            text("texto"),
            text("imagen"),
            integer("orden"),
            flag("activo"),
        ],
        activity_column: "activo",
        order_by: "orden, id",
    },
    Table {
        name: "proyectos",
        columns: &[
            text("titulo").required().translatable(),
            text("descripcion").translatable(),
            text("tipo").translatable(),
            text("enlace"),
            integer("orden"),
            flag("activo"),
        ],
        activity_column: "activo",
        order_by: "orden, id",
    },
    Table {
        name: "publicaciones",
        columns: &[
            text("titulo").required().translatable(),
            text("descripcion").translatable(),
            text("revista"),
            text("año"),
            text("enlace"),
            text("tags"),
            integer("orden"),
            flag("activo"),
        ],
        activity_column: "activo",
        order_by: "orden, id",
    },
    Table {
        name: "metodologias",
        columns: &[
            text("codigo"),
            text("nombre").required().translatable(),
            text("categoria"),
            text("analito").required().translatable(),
            text("matriz").required().translatable(),
            text("tecnica").translatable(),
            text("limite_deteccion"),
            text("limite_cuantificacion"),
            text("norma_referencia"),
            text("vigencia"),
            flag("acreditada"),
            integer("orden"),
            flag("activo"),
        ],
        activity_column: "activo",
        order_by: "categoria, nombre, matriz, orden, id",
    },
];

/// Look up a content table by name.
pub fn table(name: &str) -> Result<&'static Table> {
    TABLES
        .iter()
        .find(|t| t.name == name)
        .ok_or_else(|| Error::unknown_table(name))
}

/// Double-quote an identifier taken from the catalogue.
pub(crate) fn quote(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn noticias() -> &'static Table {
        table("noticias").unwrap()
    }

    // ------------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------------

    #[test]
    fn test_every_table_has_its_activity_column() {
        for t in TABLES {
            let column = t.column(t.activity_column).unwrap();
            assert_eq!(column.kind, ColumnKind::Flag, "{}", t.name);
        }
    }

    #[test]
    fn test_unknown_table() {
        assert!(matches!(table("recetas"), Err(Error::UnknownTable { .. })));
    }

    #[test]
    fn test_has_column() {
        let t = noticias();
        assert!(t.has_column("titulo"));
        assert!(t.has_column("titulo_en"));
        assert!(t.has_column("id"));
        assert!(!t.has_column("fecha_en"));
        assert!(!t.has_column("autor"));
    }

    #[test]
    fn test_writable_columns_include_translations() {
        let cols = table("estadisticas").unwrap().writable_columns();
        assert_eq!(
            cols,
            ["numero", "sufijo", "etiqueta", "etiqueta_en", "orden", "activo"]
        );
    }

    // ------------------------------------------------------------------------
    // prepare_write
    // ------------------------------------------------------------------------

    #[test]
    fn test_prepare_insert_coerces_kinds() {
        let record = Record::new()
            .with("titulo", "Nueva acreditación")
            .with("titulo_en", "  ")
            .with("imagen_zoom", "1.5")
            .with("orden", "3")
            .with("destacada", "on")
            .with("activa", Value::Null);
        let out = noticias().prepare_write(&record, WriteMode::Insert).unwrap();
        let get = |k: &str| out.iter().find(|(n, _)| n == k).map(|(_, v)| v.clone());
        assert_eq!(get("titulo_en"), Some(Value::Null));
        assert_eq!(get("imagen_zoom"), Some(Value::Real(1.5)));
        assert_eq!(get("orden"), Some(Value::Integer(3)));
        assert_eq!(get("destacada"), Some(Value::Integer(1)));
        assert_eq!(get("activa"), Some(Value::Integer(0)));
    }

    #[test]
    fn test_prepare_skips_system_columns() {
        let record = Record::new()
            .with("id", 4_i64)
            .with("titulo", "x")
            .with("created_at", "2024-01-01");
        let out = noticias().prepare_write(&record, WriteMode::Insert).unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_prepare_rejects_unknown_column() {
        let record = Record::new().with("titulo", "x").with("autor", "y");
        let err = noticias().prepare_write(&record, WriteMode::Insert).unwrap_err();
        assert!(matches!(err, Error::UnknownColumn { .. }));
    }

    #[test]
    fn test_prepare_rejects_translation_of_untranslatable() {
        let record = Record::new().with("titulo", "x").with("fecha_en", "y");
        assert!(noticias().prepare_write(&record, WriteMode::Insert).is_err());
    }

    #[test]
    fn test_prepare_insert_requires_columns() {
        let record = Record::new().with("resumen", "sin título");
        let err = noticias().prepare_write(&record, WriteMode::Insert).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("titulo"));
    }

    #[test]
    fn test_prepare_update_allows_partial() {
        let record = Record::new().with("resumen", "otro");
        assert!(noticias().prepare_write(&record, WriteMode::Update).is_ok());
    }

    #[test]
    fn test_prepare_update_rejects_blank_required() {
        let record = Record::new().with("titulo", "   ");
        assert!(noticias().prepare_write(&record, WriteMode::Update).is_err());
    }

    #[test]
    fn test_prepare_rejects_bad_integer() {
        let record = Record::new().with("numero", "muchos").with("etiqueta", "x");
        let err = table("estadisticas")
            .unwrap()
            .prepare_write(&record, WriteMode::Insert)
            .unwrap_err();
        assert!(err.to_string().contains("whole number"));
    }

    #[test]
    fn test_prepare_blank_optional_number_is_null() {
        let record = Record::new().with("titulo", "x").with("orden", "");
        let out = noticias().prepare_write(&record, WriteMode::Insert).unwrap();
        assert_eq!(out[1], ("orden".to_string(), Value::Null));
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("año"), "\"año\"");
        assert_eq!(quote("a\"b"), "\"a\"\"b\"");
    }
}
