//! Handlers for the database and server commands.
//!
//! Handlers take an open [`Database`] and return the text to print, so they
//! can be exercised against an in-memory database.

use std::path::Path;

use farmavet_api::{AppState, Server, bootstrap};
use farmavet_auth::{check_password_strength, hash_password};
use farmavet_content::{
    SheetFormat, count_unique, parse_methodology_sheet, parse_methodology_workbook,
};
use farmavet_core::traits::ConfigManager;
use farmavet_core::{FarmavetConfig, Record};
use farmavet_storage::Database;

use crate::cli::{AdminAction, Cli, Command, MethodologyAction};
use crate::config_handlers::handle_config_command;
use crate::error::{Error, Result};

/// Run a parsed command line.
pub async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    if let Command::Config { action } = cli.command {
        handle_config_command(config_path, action)?;
        return Ok(());
    }

    let config = FarmavetConfig::load(config_path)?;
    let db = open_database(&config).await?;
    let output = match cli.command {
        Command::Serve => {
            serve(db, config).await?;
            return Ok(());
        }
        Command::Migrate => migration_report(&db).await?,
        Command::Admin { action } => match action {
            AdminAction::Create { username, password } => {
                create_admin(&db, &username, &password).await?
            }
            AdminAction::SetPassword { username, password } => {
                set_admin_password(&db, &username, &password).await?
            }
        },
        Command::Methodologies { action } => match action {
            MethodologyAction::Import { file, dry_run } => {
                import_sheet(&db, &file, dry_run).await?
            }
            MethodologyAction::Count => methodology_counts(&db).await?,
        },
        Command::Config { .. } => String::new(),
    };
    db.close().await;
    println!("{output}");
    Ok(())
}

/// Connect to the configured database and apply pending migrations.
pub async fn open_database(config: &FarmavetConfig) -> Result<Database> {
    let db = Database::connect(&config.database.path).await?;
    let applied = db.migrate().await?;
    if !applied.is_empty() {
        log::info!("Applied migrations {applied:?}");
    }
    Ok(db)
}

/// Seed the default admin if needed and serve until shutdown.
pub async fn serve(db: Database, config: FarmavetConfig) -> Result<()> {
    bootstrap::seed_default_admin(&db).await?;
    let server = Server::new(AppState::new(db.clone(), config));
    let result = server.run().await;
    db.close().await;
    Ok(result?)
}

/// Applied schema versions.
pub async fn migration_report(db: &Database) -> Result<String> {
    let versions = db.applied_migrations().await?;
    let list: Vec<String> = versions.iter().map(i64::to_string).collect();
    Ok(format!("Schema up to date (versions: {})", list.join(", ")))
}

/// `admin create`
pub async fn create_admin(db: &Database, username: &str, password: &str) -> Result<String> {
    let username = username.trim();
    if username.is_empty() {
        let err = farmavet_core::Error::validation_field("username", "username is required");
        return Err(err.into());
    }
    check_password_strength(password)?;
    let id = db.create_admin(username, &hash_password(password)?).await?;
    Ok(format!("Created admin '{username}' (id {id})"))
}

/// `admin set-password`
pub async fn set_admin_password(db: &Database, username: &str, password: &str) -> Result<String> {
    check_password_strength(password)?;
    let admin = db
        .find_admin_by_username(username.trim())
        .await?
        .ok_or_else(|| Error::UnknownAdmin(username.trim().to_string()))?;
    db.update_admin_password(admin.id, &hash_password(password)?)
        .await?;
    Ok(format!("Password updated for '{}'", admin.username))
}

/// `methodologies import`
///
/// `.xlsx` / `.xlsm` files are read as the laboratory workbook, anything else
/// as a CSV export.
pub async fn import_sheet(db: &Database, file: &Path, dry_run: bool) -> Result<String> {
    let reader = std::io::BufReader::new(
        std::fs::File::open(file).map_err(|e| farmavet_core::Error::io_with_path(e, file))?,
    );
    let sheet = match SheetFormat::from_path(file) {
        SheetFormat::Workbook => parse_methodology_workbook(reader)?,
        SheetFormat::Csv => parse_methodology_sheet(reader)?,
    };
    let parsed = format!(
        "{} rows in {} methods, {} skipped",
        sheet.drafts.len(),
        sheet.method_count(),
        sheet.skipped
    );
    if dry_run {
        return Ok(format!("Dry run: {parsed}"));
    }

    let records: Vec<Record> = sheet.drafts.iter().map(|d| d.to_record()).collect();
    let summary = db.import_methodologies(&records).await?;
    Ok(format!(
        "Imported {parsed}: {} inserted, {} updated",
        summary.inserted, summary.updated
    ))
}

/// `methodologies count`
pub async fn methodology_counts(db: &Database) -> Result<String> {
    let rows = db.active_methodologies().await?;
    let count = count_unique(&rows);
    Ok(format!(
        "unique: {}\naccredited: {}\nnot accredited: {}\nrows: {}",
        count.unique,
        count.accredited,
        count.not_accredited(),
        count.total_rows
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn database() -> Database {
        let db = Database::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    const SHEET: &str = "\
itlf,metodo,analito,equipo,ld,lc,matriz,acreditado
ITLF-01,Quinolonas,Enrofloxacino,LC-MS/MS,0.5,1.0,PP,si
,,Ciprofloxacino,,0.5,1.0,PP,si
,,,,,,,
ITLF-02,,Cloranfenicol,LC-MS/MS,0.1,0.3,phb,no
";

    // ------------------------------------------------------------------------
    // Admin accounts
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_create_admin_checks_strength() {
        let db = database().await;
        let err = create_admin(&db, "editor", "corta").await.unwrap_err();
        assert!(matches!(err, Error::Auth(_)));

        let out = create_admin(&db, "editor", "Laboratorio1").await.unwrap();
        assert!(out.starts_with("Created admin 'editor'"));
        let dup = create_admin(&db, "editor", "Laboratorio1").await.unwrap_err();
        assert!(dup.to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_set_password_unknown_admin() {
        let db = database().await;
        let err = set_admin_password(&db, "nadie", "Laboratorio1").await.unwrap_err();
        assert!(matches!(err, Error::UnknownAdmin(ref name) if name == "nadie"));
    }

    #[tokio::test]
    async fn test_set_password_replaces_hash() {
        let db = database().await;
        create_admin(&db, "editor", "Laboratorio1").await.unwrap();
        set_admin_password(&db, "editor", "Laboratorio2").await.unwrap();
        let admin = db.find_admin_by_username("editor").await.unwrap().unwrap();
        assert!(farmavet_auth::verify_password("Laboratorio2", &admin.password_hash));
    }

    // ------------------------------------------------------------------------
    // Methodology import
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_import_dry_run_writes_nothing() {
        let db = database().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resumen.csv");
        std::fs::write(&path, SHEET).unwrap();

        let out = import_sheet(&db, &path, true).await.unwrap();
        assert_eq!(out, "Dry run: 3 rows in 2 methods, 0 skipped");
        assert!(db.active_methodologies().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_import_then_reimport_updates() {
        let db = database().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resumen.csv");
        std::fs::write(&path, SHEET).unwrap();

        let first = import_sheet(&db, &path, false).await.unwrap();
        assert!(first.ends_with("3 inserted, 0 updated"));
        let second = import_sheet(&db, &path, false).await.unwrap();
        assert!(second.ends_with("0 inserted, 3 updated"));

        let counts = methodology_counts(&db).await.unwrap();
        assert!(counts.contains("rows: 3"));
    }

    #[tokio::test]
    async fn test_import_workbook() {
        let db = database().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("RESUMEN CLIENTES-LAB.xlsx");

        let mut book = rust_xlsxwriter::Workbook::new();
        let sheet = book.add_worksheet();
        let rows = [
            ["ITLF-01", "Quinolonas", "Enrofloxacino", "LC-MS/MS", "PP", "si"],
            ["", "", "Ciprofloxacino", "", "PP", "si"],
        ];
        for (row, cells) in (4u32..).zip(rows) {
            for (col, value) in [1u16, 2, 3, 4, 7, 8].into_iter().zip(cells) {
                sheet.write_string(row, col, value).unwrap();
            }
        }
        book.save(&path).unwrap();

        let out = import_sheet(&db, &path, false).await.unwrap();
        assert_eq!(out, "Imported 2 rows in 1 methods, 0 skipped: 2 inserted, 0 updated");
        let counts = methodology_counts(&db).await.unwrap();
        assert!(counts.contains("accredited: 1"));
    }

    #[tokio::test]
    async fn test_import_missing_file() {
        let db = database().await;
        let err = import_sheet(&db, Path::new("/nonexistent/resumen.csv"), true)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Core(_)));
    }

    #[tokio::test]
    async fn test_migration_report() {
        let db = database().await;
        let out = migration_report(&db).await.unwrap();
        assert_eq!(out, "Schema up to date (versions: 1, 2, 3)");
    }
}
