//! Joined queries behind the team page.

use farmavet_core::Record;

use crate::database::{Database, row_to_record};
use crate::error::Result;

const ORG_CHART_SQL: &str = "
SELECT o.id, o.seccion, o.subseccion, o.subseccion_en, o.cargo, o.cargo_en,
       o.descripcion, o.descripcion_en, o.orden,
       e.id AS miembro_id, e.nombre AS miembro_nombre,
       e.biografia AS miembro_biografia, e.biografia_en AS miembro_biografia_en,
       e.email AS miembro_email, e.imagen AS miembro_imagen,
       e.imagen_zoom AS miembro_imagen_zoom, e.imagen_x AS miembro_imagen_x,
       e.imagen_y AS miembro_imagen_y, e.tags AS miembro_tags,
       e.redes_sociales AS miembro_redes_sociales
FROM organigrama o
LEFT JOIN equipo e ON o.id = e.cargo_id AND e.activo = 1
WHERE o.activo = 1
ORDER BY o.seccion, o.orden, o.id, e.orden";

const DIRECTION_SQL: &str = "
SELECT e.*, o.cargo AS cargo_nombre, o.cargo_en AS cargo_nombre_en,
       o.descripcion AS cargo_descripcion, o.descripcion_en AS cargo_descripcion_en
FROM equipo e
INNER JOIN organigrama o ON e.cargo_id = o.id
WHERE e.activo = 1 AND o.seccion = 'direccion' AND o.activo = 1
ORDER BY e.orden, e.id";

impl Database {
    /// Active positions joined with their active members (`miembro_*` columns).
    ///
    /// A position without members yields one row with null member columns;
    /// a position with several members yields one row per member.
    pub async fn org_chart_rows(&self) -> Result<Vec<Record>> {
        let rows = sqlx::query(ORG_CHART_SQL).fetch_all(self.pool()).await?;
        rows.iter().map(row_to_record).collect()
    }

    /// Active members holding a position in the `direccion` section.
    pub async fn direction_rows(&self) -> Result<Vec<Record>> {
        let rows = sqlx::query(DIRECTION_SQL).fetch_all(self.pool()).await?;
        rows.iter().map(row_to_record).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use farmavet_core::Value;

    async fn seeded() -> Database {
        let db = Database::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        let director = db
            .insert(
                "organigrama",
                &Record::new()
                    .with("seccion", "direccion")
                    .with("cargo", "Director")
                    .with("cargo_en", "Director")
                    .with("orden", 1_i64),
            )
            .await
            .unwrap();
        let vacante = db
            .insert(
                "organigrama",
                &Record::new()
                    .with("seccion", "laboratorio")
                    .with("subseccion", "Residuos")
                    .with("cargo", "Analista")
                    .with("orden", 1_i64),
            )
            .await
            .unwrap();
        db.insert(
            "equipo",
            &Record::new()
                .with("nombre", "Ana Pérez")
                .with("cargo_id", director)
                .with("redes_sociales", r#"{"linkedin": "https://example.org/ana"}"#),
        )
        .await
        .unwrap();
        db.insert(
            "equipo",
            &Record::new()
                .with("nombre", "Inactivo")
                .with("cargo_id", vacante)
                .with("activo", false),
        )
        .await
        .unwrap();
        db
    }

    #[tokio::test]
    async fn test_org_chart_rows_left_join() {
        let db = seeded().await;
        let rows = db.org_chart_rows().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get_str("seccion"), Some("direccion"));
        assert_eq!(rows[0].get_str("miembro_nombre"), Some("Ana Pérez"));
        assert_eq!(rows[0].get("miembro_imagen_zoom"), Some(&Value::Real(1.0)));
        assert_eq!(rows[1].get_str("cargo"), Some("Analista"));
        assert_eq!(rows[1].get("miembro_id"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn test_direction_rows() {
        let db = seeded().await;
        let rows = db.direction_rows().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_str("nombre"), Some("Ana Pérez"));
        assert_eq!(rows[0].get_str("cargo_nombre"), Some("Director"));
        assert_eq!(rows[0].get_str("cargo_nombre_en"), Some("Director"));
    }
}
