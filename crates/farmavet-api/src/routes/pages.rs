//! Public page payloads.
//!
//! Each page returns the localised content a renderer needs, keyed by
//! section. Every page also carries its hero media and featured cards.

use axum::Json;
use axum::extract::{Path, State};
use farmavet_content::{
    CategoryGroups, LimitRange, MethodologyCount, count_unique, direction_members,
    group_methodologies, organize_org_chart,
};
use farmavet_core::{Language, Record, localize, resolve_text};
use farmavet_storage::{Database, ListFilter};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::error::Result;
use crate::extract::SiteLanguage;
use crate::state::AppState;

const FEATURED_NEWS: i64 = 3;

async fn localized(
    db: &Database,
    table: &str,
    filter: &ListFilter,
    language: Language,
) -> Result<Vec<Record>> {
    let rows = db.list(table, filter).await?;
    Ok(rows.iter().map(|r| localize(r, language)).collect())
}

fn to_json<T: Serialize>(value: &T) -> Result<JsonValue> {
    serde_json::to_value(value).map_err(|e| farmavet_core::Error::from(e).into())
}

/// `GET /api/pages/{page}`
pub async fn page(
    State(state): State<AppState>,
    SiteLanguage(language): SiteLanguage,
    Path(page): Path<String>,
) -> Result<Json<Map<String, JsonValue>>> {
    let db = &state.db;
    let mut out = Map::new();
    out.insert("pagina".into(), JsonValue::from(page.as_str()));
    out.insert("idioma".into(), JsonValue::from(language.code()));

    let active = ListFilter::active;
    match page.as_str() {
        "index" => {
            out.insert(
                "estadisticas".into(),
                to_json(&localized(db, "estadisticas", &active(), language).await?)?,
            );
            out.insert(
                "noticias".into(),
                to_json(&localized(db, "noticias", &active().limit(FEATURED_NEWS), language).await?)?,
            );
            let clientes = active().eq("mostrar_en_index", 1_i64);
            out.insert(
                "clientes".into(),
                to_json(&localized(db, "clientes", &clientes, language).await?)?,
            );
        }
        "docencia" => {
            out.insert(
                "programas".into(),
                to_json(&localized(db, "programas", &active(), language).await?)?,
            );
            out.insert(
                "testimonios".into(),
                to_json(&localized(db, "testimonios", &active(), language).await?)?,
            );
        }
        "noticias" => {
            out.insert(
                "noticias".into(),
                to_json(&localized(db, "noticias", &active(), language).await?)?,
            );
            out.insert(
                "eventos".into(),
                to_json(&localized(db, "eventos", &active(), language).await?)?,
            );
        }
        "equipo" => {
            let chart = db.org_chart_rows().await?;
            out.insert(
                "organigrama".into(),
                to_json(&organize_org_chart(&chart, language))?,
            );
            let direction = db.direction_rows().await?;
            out.insert(
                "direccion".into(),
                to_json(&direction_members(&direction, language))?,
            );
        }
        "convenios" => {
            out.insert(
                "convenios".into(),
                to_json(&localized(db, "convenios", &active(), language).await?)?,
            );
        }
        "casa-omsa" => {
            let clientes = active().eq("mostrar_en_casa_omsa", 1_i64);
            out.insert(
                "clientes".into(),
                to_json(&localized(db, "clientes", &clientes, language).await?)?,
            );
        }
        "investigacion" => {
            out.insert(
                "proyectos".into(),
                to_json(&localized(db, "proyectos", &active(), language).await?)?,
            );
            out.insert(
                "publicaciones".into(),
                to_json(&localized(db, "publicaciones", &active(), language).await?)?,
            );
        }
        "metodologias" => {
            let rows = db.active_methodologies().await?;
            let categories = group_methodologies(&rows, language);
            let views: Vec<CategoryView> = categories
                .iter()
                .map(|c| CategoryView::new(c, language))
                .collect();
            out.insert("categorias".into(), to_json(&views)?);
            out.insert("conteo".into(), to_json(&count_unique(&rows))?);
        }
        _ => {}
    }

    let page_filter = || active().eq("pagina", page.as_str());
    out.insert(
        "hero".into(),
        to_json(&localized(db, "hero_media", &page_filter(), language).await?)?,
    );
    out.insert(
        "tarjetas".into(),
        to_json(&localized(db, "tarjetas_destacadas", &page_filter(), language).await?)?,
    );
    Ok(Json(out))
}

/// Body of `GET /api/metodologias`.
#[derive(Debug, Serialize)]
pub struct MethodologyFeed {
    /// Active methodologies, localised
    pub metodologias: Vec<Record>,
    /// Unique counts
    pub conteo: MethodologyCount,
}

/// `GET /api/metodologias`: flat list for the search assistant.
pub async fn methodology_feed(
    State(state): State<AppState>,
    SiteLanguage(language): SiteLanguage,
) -> Result<Json<MethodologyFeed>> {
    let rows = state.db.active_methodologies().await?;
    let conteo = count_unique(&rows);
    let metodologias = rows.iter().map(|r| localize(r, language)).collect();
    Ok(Json(MethodologyFeed {
        metodologias,
        conteo,
    }))
}

/// One display group of the methodologies page.
#[derive(Debug, Serialize)]
pub struct MethodologyView {
    /// Method name
    pub nombre: String,
    /// Matrix
    pub matriz: String,
    /// Technique
    pub tecnica: String,
    /// Analytes covered, first-seen order
    pub analitos: Vec<String>,
    /// More than one analyte
    pub agrupada: bool,
    /// Accreditation
    pub acreditada: bool,
    /// Code of the first row
    pub codigo: String,
    /// Reference standard of the first row
    pub norma_referencia: String,
    /// Raw LOD shared by the group
    pub limite_deteccion: String,
    /// Raw LOQ shared by the group
    pub limite_cuantificacion: String,
    /// Numeric LOD range across rows
    pub rango_deteccion: Option<LimitRange>,
    /// Numeric LOQ range across rows
    pub rango_cuantificacion: Option<LimitRange>,
    /// Number of rows merged
    pub registros: usize,
}

/// One category of the methodologies page.
#[derive(Debug, Serialize)]
pub struct CategoryView {
    /// Category value, `"otros"` when blank
    pub categoria: String,
    /// Groups in display order
    pub metodologias: Vec<MethodologyView>,
    /// Rows in the category
    pub registros: usize,
}

impl CategoryView {
    fn new(category: &CategoryGroups<'_, Record>, language: Language) -> Self {
        let metodologias = category
            .groups
            .iter()
            .map(|g| MethodologyView {
                nombre: g.key.nombre.clone(),
                matriz: g.key.matriz.clone(),
                tecnica: g.key.tecnica.clone(),
                analitos: g.analytes.clone(),
                agrupada: g.is_grouped(),
                acreditada: g.acreditada(),
                codigo: resolve_text(g.representative, "codigo", language),
                norma_referencia: resolve_text(g.representative, "norma_referencia", language),
                limite_deteccion: g.key.limite_deteccion.clone(),
                limite_cuantificacion: g.key.limite_cuantificacion.clone(),
                rango_deteccion: g.detection_range(),
                rango_cuantificacion: g.quantification_range(),
                registros: g.members.len(),
            })
            .collect();
        Self {
            categoria: category.category.clone(),
            metodologias,
            registros: category.entry_count(),
        }
    }
}
