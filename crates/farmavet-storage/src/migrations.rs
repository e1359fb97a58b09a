//! Versioned schema migrations.
//!
//! Migrations run once, in order, each inside its own transaction. Applied
//! versions are recorded in `schema_migrations`, so running [`Database::migrate`]
//! again is a no-op. Runtime code assumes the schema produced here.

use crate::database::Database;
use crate::error::{Error, Result};

/// One schema migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    /// Monotonic version number
    pub version: i64,
    /// Short description
    pub name: &'static str,
    /// SQL batch to execute
    pub sql: &'static str,
}

/// All migrations, in application order.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "content schema",
        sql: SCHEMA_V1,
    },
    Migration {
        version: 2,
        name: "methodologies",
        sql: SCHEMA_V2,
    },
    Migration {
        version: 3,
        name: "indexes",
        sql: SCHEMA_V3,
    },
];

const TRACKING_TABLE: &str = "
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
)";

const SCHEMA_V1: &str = r#"
CREATE TABLE admins (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT UNIQUE NOT NULL,
    password_hash TEXT NOT NULL,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE programas (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    tipo TEXT NOT NULL,
    tipo_en TEXT,
    titulo TEXT NOT NULL,
    titulo_en TEXT,
    descripcion TEXT,
    descripcion_en TEXT,
    modalidad TEXT,
    modalidad_en TEXT,
    horario TEXT,
    horario_en TEXT,
    patrocinio TEXT,
    patrocinio_en TEXT,
    auspicio TEXT,
    auspicio_en TEXT,
    email_contacto TEXT,
    texto_boton TEXT DEFAULT 'Postular',
    texto_boton_en TEXT,
    orden INTEGER DEFAULT 0,
    activo INTEGER DEFAULT 1,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE testimonios (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    titulo TEXT NOT NULL,
    titulo_en TEXT,
    contenido TEXT NOT NULL,
    contenido_en TEXT,
    autor TEXT,
    categoria TEXT,
    tags TEXT,
    imagen TEXT,
    orden INTEGER DEFAULT 0,
    activo INTEGER DEFAULT 1,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE noticias (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    titulo TEXT NOT NULL,
    titulo_en TEXT,
    resumen TEXT,
    resumen_en TEXT,
    contenido TEXT,
    contenido_en TEXT,
    imagen TEXT,
    imagen_zoom REAL DEFAULT 1.0,
    imagen_x REAL DEFAULT 0.0,
    imagen_y REAL DEFAULT 0.0,
    categoria TEXT,
    categoria_en TEXT,
    fecha TEXT,
    enlace_externo TEXT,
    orden INTEGER DEFAULT 0,
    destacada INTEGER DEFAULT 0,
    activa INTEGER DEFAULT 1,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE organigrama (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    seccion TEXT NOT NULL,
    subseccion TEXT,
    subseccion_en TEXT,
    cargo TEXT NOT NULL,
    cargo_en TEXT,
    descripcion TEXT,
    descripcion_en TEXT,
    orden INTEGER DEFAULT 0,
    activo INTEGER DEFAULT 1,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE equipo (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nombre TEXT NOT NULL,
    cargo_id INTEGER REFERENCES organigrama(id) ON DELETE SET NULL,
    cargo TEXT,
    biografia TEXT,
    biografia_en TEXT,
    email TEXT,
    imagen TEXT,
    imagen_zoom REAL DEFAULT 1.0,
    imagen_x REAL DEFAULT 0.0,
    imagen_y REAL DEFAULT 0.0,
    tags TEXT,
    redes_sociales TEXT,
    orden INTEGER DEFAULT 0,
    activo INTEGER DEFAULT 1,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE clientes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nombre TEXT NOT NULL,
    nombre_en TEXT,
    logo TEXT,
    enlace TEXT,
    categoria TEXT,
    mostrar_en_index INTEGER DEFAULT 0,
    mostrar_en_casa_omsa INTEGER DEFAULT 0,
    orden INTEGER DEFAULT 0,
    activo INTEGER DEFAULT 1,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE convenios (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nombre TEXT NOT NULL,
    tipo TEXT,
    descripcion TEXT,
    logo TEXT,
    enlace TEXT,
    orden INTEGER DEFAULT 0,
    activo INTEGER DEFAULT 1,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE hero_media (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    pagina TEXT NOT NULL,
    tipo TEXT NOT NULL DEFAULT 'imagen',
    titulo TEXT,
    titulo_en TEXT,
    contenido TEXT,
    contenido_en TEXT,
    imagenes TEXT,
    imagenes_ajustes TEXT,
    orden INTEGER DEFAULT 0,
    activo INTEGER DEFAULT 1,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE tarjetas_destacadas (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    pagina TEXT NOT NULL,
    titulo TEXT NOT NULL,
    titulo_en TEXT,
    contenido TEXT NOT NULL,
    contenido_en TEXT,
    enlace TEXT,
    texto_enlace TEXT,
    texto_enlace_en TEXT,
    orden INTEGER DEFAULT 0,
    activo INTEGER DEFAULT 1,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE estadisticas (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    numero INTEGER NOT NULL,
    sufijo TEXT,
    etiqueta TEXT NOT NULL,
    etiqueta_en TEXT,
    orden INTEGER DEFAULT 0,
    activo INTEGER DEFAULT 1,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE eventos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    titulo TEXT NOT NULL,
    titulo_en TEXT,
    fecha TEXT NOT NULL,
    meta TEXT,
    meta_en TEXT,
    descripcion TEXT,
    descripcion_en TEXT,
    enlace TEXT,
    texto_boton TEXT DEFAULT 'Ver más',
    texto_boton_en TEXT,
    orden INTEGER DEFAULT 0,
    activo INTEGER DEFAULT 1,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE contenido (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    seccion TEXT UNIQUE NOT NULL,
    titulo TEXT,
    texto TEXT,
    imagen TEXT,
    orden INTEGER DEFAULT 0,
    activo INTEGER DEFAULT 1,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE proyectos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    titulo TEXT NOT NULL,
    titulo_en TEXT,
    descripcion TEXT,
    descripcion_en TEXT,
    tipo TEXT,
    tipo_en TEXT,
    enlace TEXT,
    orden INTEGER DEFAULT 0,
    activo INTEGER DEFAULT 1,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE publicaciones (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    titulo TEXT NOT NULL,
    titulo_en TEXT,
    descripcion TEXT,
    descripcion_en TEXT,
    revista TEXT,
    "año" TEXT,
    enlace TEXT,
    tags TEXT,
    orden INTEGER DEFAULT 0,
    activo INTEGER DEFAULT 1,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT DEFAULT CURRENT_TIMESTAMP
);
"#;

const SCHEMA_V2: &str = "
CREATE TABLE metodologias (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    codigo TEXT,
    nombre TEXT NOT NULL,
    nombre_en TEXT,
    categoria TEXT,
    analito TEXT NOT NULL,
    analito_en TEXT,
    matriz TEXT NOT NULL,
    matriz_en TEXT,
    tecnica TEXT,
    tecnica_en TEXT,
    limite_deteccion TEXT,
    limite_cuantificacion TEXT,
    norma_referencia TEXT,
    vigencia TEXT,
    acreditada INTEGER DEFAULT 0,
    orden INTEGER DEFAULT 0,
    activo INTEGER DEFAULT 1,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT DEFAULT CURRENT_TIMESTAMP
);
";

const SCHEMA_V3: &str = "
CREATE INDEX idx_tarjetas_pagina ON tarjetas_destacadas (pagina, activo);
CREATE INDEX idx_hero_media_pagina ON hero_media (pagina, activo);
CREATE INDEX idx_equipo_cargo ON equipo (cargo_id);
CREATE INDEX idx_metodologias_codigo ON metodologias (codigo, analito, matriz);
CREATE INDEX idx_metodologias_nombre ON metodologias (nombre, analito, matriz);
";

impl Database {
    /// Apply pending migrations. Returns the versions applied by this call.
    pub async fn migrate(&self) -> Result<Vec<i64>> {
        sqlx::query(TRACKING_TABLE).execute(self.pool()).await?;
        let applied = self.applied_migrations().await?;

        let mut newly_applied = Vec::new();
        for migration in MIGRATIONS.iter().filter(|m| !applied.contains(&m.version)) {
            let failed = |source| Error::Migration {
                version: migration.version,
                name: migration.name.to_string(),
                source,
            };
            let mut tx = self.pool().begin().await?;
            sqlx::raw_sql(migration.sql)
                .execute(&mut *tx)
                .await
                .map_err(failed)?;
            sqlx::query("INSERT INTO schema_migrations (version, name) VALUES (?, ?)")
                .bind(migration.version)
                .bind(migration.name)
                .execute(&mut *tx)
                .await
                .map_err(failed)?;
            tx.commit().await?;
            log::info!(
                "Applied migration {} ({})",
                migration.version,
                migration.name
            );
            newly_applied.push(migration.version);
        }
        Ok(newly_applied)
    }

    /// Versions already recorded in `schema_migrations`, ascending.
    pub async fn applied_migrations(&self) -> Result<Vec<i64>> {
        sqlx::query(TRACKING_TABLE).execute(self.pool()).await?;
        let versions =
            sqlx::query_scalar("SELECT version FROM schema_migrations ORDER BY version")
                .fetch_all(self.pool())
                .await?;
        Ok(versions)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalogue::{SYSTEM_COLUMNS, TABLES};

    async fn table_columns(db: &Database, table: &str) -> Vec<String> {
        sqlx::query_scalar(&format!(
            "SELECT name FROM pragma_table_info('{table}') ORDER BY cid"
        ))
        .fetch_all(db.pool())
        .await
        .unwrap()
    }

    #[test]
    fn test_versions_are_increasing() {
        for pair in MIGRATIONS.windows(2) {
            assert!(pair[0].version < pair[1].version);
        }
    }

    #[tokio::test]
    async fn test_migrate_applies_all_once() {
        let db = Database::in_memory().await.unwrap();
        let first = db.migrate().await.unwrap();
        assert_eq!(first, [1, 2, 3]);
        let second = db.migrate().await.unwrap();
        assert!(second.is_empty());
        assert_eq!(db.applied_migrations().await.unwrap(), [1, 2, 3]);
    }

    #[tokio::test]
    async fn test_schema_matches_catalogue() {
        let db = Database::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        for table in TABLES {
            let columns = table_columns(&db, table.name).await;
            let mut expected = table.writable_columns();
            expected.extend(SYSTEM_COLUMNS.iter().map(|c| c.to_string()));
            let mut actual = columns.clone();
            actual.sort();
            expected.sort();
            assert_eq!(actual, expected, "schema drift in {}", table.name);
        }
    }

    #[tokio::test]
    async fn test_admins_table_exists() {
        let db = Database::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        let columns = table_columns(&db, "admins").await;
        assert_eq!(columns, ["id", "username", "password_hash", "created_at"]);
    }
}
