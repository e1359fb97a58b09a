//! Laboratory summary sheet parsing.
//!
//! The laboratory keeps its catalogue in an Excel workbook whose first sheet
//! has the columns `ITLF, MÉTODO, Analito, EQUIPO, LD, LC, MATRIZ,
//! ACREDITADO` in positions B to I, with data from the fifth row on. The
//! same columns may also arrive as a CSV export with a header row. Each
//! method occupies a block of rows: the first row carries the ITLF code,
//! method name and equipment, and following rows list one analyte each with
//! those cells left empty.
//!
//! Parsing only produces [`MethodologyDraft`]s; persisting them is the
//! storage layer's job.

use std::io::{Read, Seek};
use std::path::Path;

use calamine::{Data, Range, Reader, Xlsx};
use farmavet_core::Record;
use serde::Serialize;

use super::fields;
use crate::error::{Error, Result};

/// Category assigned to imported rows.
pub const IMPORT_CATEGORY: &str = "residuos";

/// Matrix stored when the sheet leaves it empty.
pub const UNSPECIFIED_MATRIX: &str = "No especificada";

/// Zero-based worksheet row where data starts; the rows above hold titles
/// and headers.
pub const WORKBOOK_FIRST_ROW: u32 = 4;

/// Zero-based worksheet column of `ITLF`; the next seven columns follow in
/// sheet order.
pub const WORKBOOK_FIRST_COLUMN: u32 = 1;

const ACCREDITED_MARKS: &[&str] = &[
    "ok",
    "si",
    "sí",
    "s",
    "yes",
    "true",
    "1",
    "acreditada",
    "acreditado",
];

/// One methodology row ready to be upserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodologyDraft {
    /// ITLF code of the method block
    pub codigo: Option<String>,
    /// Method name, or the analyte when the block has none
    pub nombre: String,
    /// Always [`IMPORT_CATEGORY`]
    pub categoria: String,
    /// Analyte
    pub analito: String,
    /// Expanded matrix name
    pub matriz: String,
    /// Equipment / technique
    pub tecnica: Option<String>,
    /// Raw LOD cell
    pub limite_deteccion: Option<String>,
    /// Raw LOQ cell
    pub limite_cuantificacion: Option<String>,
    /// Accreditation mark recognised
    pub acreditada: bool,
}

impl MethodologyDraft {
    /// Column values as a [`Record`], absent options stored as null.
    pub fn to_record(&self) -> Record {
        Record::new()
            .with(fields::CODIGO, self.codigo.clone())
            .with(fields::NOMBRE, self.nombre.as_str())
            .with(fields::CATEGORIA, self.categoria.as_str())
            .with(fields::ANALITO, self.analito.as_str())
            .with(fields::MATRIZ, self.matriz.as_str())
            .with(fields::TECNICA, self.tecnica.clone())
            .with(fields::LIMITE_DETECCION, self.limite_deteccion.clone())
            .with(fields::LIMITE_CUANTIFICACION, self.limite_cuantificacion.clone())
            .with(fields::ACREDITADA, self.acreditada)
    }
}

/// Outcome of parsing a sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SheetImport {
    /// Rows that produced a methodology
    pub drafts: Vec<MethodologyDraft>,
    /// Non-empty rows that did not (no analyte, or before the first block)
    pub skipped: usize,
}

impl SheetImport {
    /// Number of distinct ITLF codes among the drafts.
    pub fn method_count(&self) -> usize {
        let mut codes: Vec<&str> = self
            .drafts
            .iter()
            .filter_map(|d| d.codigo.as_deref())
            .collect();
        codes.sort_unstable();
        codes.dedup();
        codes.len()
    }
}

/// Expand the matrix abbreviations used in the sheet.
///
/// # Examples
///
/// ```
/// use farmavet_content::methodology::import::expand_matrix;
///
/// assert_eq!(expand_matrix(Some("PP")), "Productos pecuarios");
/// assert_eq!(expand_matrix(Some("phb")), "Productos hidrobiológicos");
/// assert_eq!(expand_matrix(Some(" Leche ")), "Leche");
/// assert_eq!(expand_matrix(None), "No especificada");
/// ```
pub fn expand_matrix(raw: Option<&str>) -> String {
    match raw.map(str::trim).filter(|m| !m.is_empty()) {
        None => UNSPECIFIED_MATRIX.to_string(),
        Some(m) => match m.to_lowercase().as_str() {
            "pp" => "Productos pecuarios".to_string(),
            "phb" => "Productos hidrobiológicos".to_string(),
            _ => m.to_string(),
        },
    }
}

/// Whether an `acreditado` cell marks the method as accredited.
pub fn is_accredited_mark(raw: Option<&str>) -> bool {
    raw.map(|v| v.trim().to_lowercase())
        .is_some_and(|v| ACCREDITED_MARKS.contains(&v.as_str()))
}

/// Input format of a methodology sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    /// Excel workbook, read by position
    Workbook,
    /// CSV export, read by header name
    Csv,
}

impl SheetFormat {
    /// Format implied by the file extension; anything but `xlsx`/`xlsm` is
    /// read as CSV.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use farmavet_content::methodology::import::SheetFormat;
    ///
    /// assert_eq!(SheetFormat::from_path(Path::new("RESUMEN CLIENTES-LAB.xlsx")), SheetFormat::Workbook);
    /// assert_eq!(SheetFormat::from_path(Path::new("resumen.csv")), SheetFormat::Csv);
    /// ```
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("xlsx" | "xlsm") => SheetFormat::Workbook,
            _ => SheetFormat::Csv,
        }
    }
}

/// The eight sheet cells of one row, trimmed, blanks as `None`.
#[derive(Debug, Default)]
struct SheetRow {
    itlf: Option<String>,
    metodo: Option<String>,
    analito: Option<String>,
    equipo: Option<String>,
    ld: Option<String>,
    lc: Option<String>,
    matriz: Option<String>,
    acreditado: Option<String>,
}

impl SheetRow {
    fn is_blank(&self) -> bool {
        [
            &self.itlf,
            &self.metodo,
            &self.analito,
            &self.equipo,
            &self.ld,
            &self.lc,
            &self.matriz,
            &self.acreditado,
        ]
        .iter()
        .all(|c| c.is_none())
    }
}

struct Block {
    itlf: String,
    metodo: Option<String>,
    equipo: Option<String>,
}

/// Row-by-row draft builder carrying the current method block.
#[derive(Default)]
struct SheetBuilder {
    out: SheetImport,
    block: Option<Block>,
}

impl SheetBuilder {
    fn push(&mut self, row: SheetRow) {
        if row.is_blank() {
            return;
        }

        if let Some(itlf) = row.itlf {
            self.block = Some(Block {
                itlf,
                metodo: row.metodo,
                equipo: row.equipo.clone(),
            });
        }

        let (Some(current), Some(analito)) = (self.block.as_ref(), row.analito) else {
            self.out.skipped += 1;
            return;
        };

        self.out.drafts.push(MethodologyDraft {
            codigo: Some(current.itlf.clone()),
            nombre: current.metodo.clone().unwrap_or_else(|| analito.clone()),
            categoria: IMPORT_CATEGORY.to_string(),
            matriz: expand_matrix(row.matriz.as_deref()),
            tecnica: current.equipo.clone().or(row.equipo),
            limite_deteccion: row.ld,
            limite_cuantificacion: row.lc,
            acreditada: is_accredited_mark(row.acreditado.as_deref()),
            analito,
        });
    }

    fn finish(self, source: &str) -> SheetImport {
        log::debug!(
            "Parsed methodology {source}: {} rows, {} skipped",
            self.out.drafts.len(),
            self.out.skipped
        );
        self.out
    }
}

// ============================================================================
// Workbook
// ============================================================================

/// Parse the laboratory's Excel workbook.
///
/// Only the first worksheet is read. Cells are taken by position from
/// [`WORKBOOK_FIRST_COLUMN`] and rows from [`WORKBOOK_FIRST_ROW`] on,
/// whatever the header rows say.
pub fn parse_methodology_workbook<RS: Read + Seek>(reader: RS) -> Result<SheetImport> {
    let mut workbook: Xlsx<RS> = Xlsx::new(reader)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(Error::EmptyWorkbook)??;
    Ok(parse_range(&range))
}

fn parse_range(range: &Range<Data>) -> SheetImport {
    let mut builder = SheetBuilder::default();
    let Some((last_row, _)) = range.end() else {
        return builder.finish("workbook");
    };

    for row in WORKBOOK_FIRST_ROW..=last_row {
        let at = |offset: u32| workbook_cell(range, row, WORKBOOK_FIRST_COLUMN + offset);
        builder.push(SheetRow {
            itlf: at(0),
            metodo: at(1),
            analito: at(2),
            equipo: at(3),
            ld: at(4),
            lc: at(5),
            matriz: at(6),
            acreditado: at(7),
        });
    }
    builder.finish("workbook")
}

fn workbook_cell(range: &Range<Data>, row: u32, column: u32) -> Option<String> {
    let text = match range.get_value((row, column))? {
        Data::Empty | Data::Error(_) => return None,
        Data::String(s) => s.trim().to_string(),
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

// ============================================================================
// CSV export
// ============================================================================

#[derive(Debug)]
struct Columns {
    itlf: Option<usize>,
    metodo: Option<usize>,
    analito: usize,
    equipo: Option<usize>,
    ld: Option<usize>,
    lc: Option<usize>,
    matriz: Option<usize>,
    acreditado: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| normalize_header(h) == name);
        Ok(Self {
            itlf: find("itlf"),
            metodo: find("metodo"),
            analito: find("analito").ok_or_else(|| Error::missing_column("analito"))?,
            equipo: find("equipo"),
            ld: find("ld"),
            lc: find("lc"),
            matriz: find("matriz"),
            acreditado: find("acreditado"),
        })
    }

    fn row(&self, record: &csv::StringRecord) -> SheetRow {
        SheetRow {
            itlf: cell(record, self.itlf),
            metodo: cell(record, self.metodo),
            analito: cell(record, Some(self.analito)),
            equipo: cell(record, self.equipo),
            ld: cell(record, self.ld),
            lc: cell(record, self.lc),
            matriz: cell(record, self.matriz),
            acreditado: cell(record, self.acreditado),
        }
    }
}

fn normalize_header(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' => 'u',
            other => other,
        })
        .collect()
}

fn cell(record: &csv::StringRecord, idx: Option<usize>) -> Option<String> {
    idx.and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Parse a CSV export of the laboratory summary sheet.
///
/// The first row must be a header naming at least `analito`; other columns
/// may be missing. Headers are matched case- and accent-insensitively.
pub fn parse_methodology_sheet<Rd: Read>(reader: Rd) -> Result<SheetImport> {
    let mut sheet = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let columns = Columns::from_headers(sheet.headers()?)?;

    let mut builder = SheetBuilder::default();
    for record in sheet.records() {
        builder.push(columns.row(&record?));
    }
    Ok(builder.finish("sheet"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SHEET: &str = "\
ITLF,Método,Analito,Equipo,LD,LC,Matriz,Acreditado
ITLF-01,Tetraciclinas,Tetraciclina,LC-MS/MS,0.5 ug/kg,1.0 ug/kg,pp,OK
,,Oxitetraciclina,,0.5 ug/kg,1.0 ug/kg,PP,sí
,,Clortetraciclina,,0.5 ug/kg,1.0 ug/kg,phb,
ITLF-02,,Cloranfenicol,GC-MS,0.1,0.3,,no
,,,,,,,
,Nota al pie,,,,,,
";

    // ------------------------------------------------------------------------
    // Sheet parsing
    // ------------------------------------------------------------------------

    #[test]
    fn test_parse_blocks() {
        let parsed = parse_methodology_sheet(SHEET.as_bytes()).unwrap();
        assert_eq!(parsed.drafts.len(), 4);
        assert_eq!(parsed.skipped, 1);
        assert_eq!(parsed.method_count(), 2);

        let first = &parsed.drafts[0];
        assert_eq!(first.codigo.as_deref(), Some("ITLF-01"));
        assert_eq!(first.nombre, "Tetraciclinas");
        assert_eq!(first.categoria, "residuos");
        assert_eq!(first.matriz, "Productos pecuarios");
        assert_eq!(first.tecnica.as_deref(), Some("LC-MS/MS"));
        assert_eq!(first.limite_deteccion.as_deref(), Some("0.5 ug/kg"));
        assert!(first.acreditada);
    }

    #[test]
    fn test_block_values_carry_forward() {
        let parsed = parse_methodology_sheet(SHEET.as_bytes()).unwrap();
        let second = &parsed.drafts[1];
        assert_eq!(second.codigo.as_deref(), Some("ITLF-01"));
        assert_eq!(second.nombre, "Tetraciclinas");
        assert_eq!(second.tecnica.as_deref(), Some("LC-MS/MS"));
        assert!(second.acreditada);

        let third = &parsed.drafts[2];
        assert_eq!(third.matriz, "Productos hidrobiológicos");
        assert!(!third.acreditada);
    }

    #[test]
    fn test_block_without_method_uses_analyte() {
        let parsed = parse_methodology_sheet(SHEET.as_bytes()).unwrap();
        let last = &parsed.drafts[3];
        assert_eq!(last.nombre, "Cloranfenicol");
        assert_eq!(last.matriz, UNSPECIFIED_MATRIX);
        assert!(!last.acreditada);
    }

    #[test]
    fn test_rows_before_first_block_skipped() {
        let sheet = "analito,matriz\nTetraciclina,pp\n";
        let parsed = parse_methodology_sheet(sheet.as_bytes()).unwrap();
        assert!(parsed.drafts.is_empty());
        assert_eq!(parsed.skipped, 1);
    }

    #[test]
    fn test_missing_analyte_column() {
        let sheet = "itlf,metodo\nA,B\n";
        let err = parse_methodology_sheet(sheet.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::MissingColumn { .. }));
    }

    #[test]
    fn test_csv_ignores_unmapped_columns() {
        let sheet = "itlf,analito,observaciones\nITLF-09,Ivermectina,revisar\n,,solo nota\n";
        let parsed = parse_methodology_sheet(sheet.as_bytes()).unwrap();
        assert_eq!(parsed.drafts.len(), 1);
        assert_eq!(parsed.skipped, 0);
    }

    #[test]
    fn test_draft_to_record() {
        let parsed = parse_methodology_sheet(SHEET.as_bytes()).unwrap();
        let record = parsed.drafts[3].to_record();
        assert_eq!(record.get_str("analito"), Some("Cloranfenicol"));
        assert_eq!(record.get_i64("acreditada"), Some(0));
        assert_eq!(record.get_str("tecnica"), Some("GC-MS"));
    }

    // ------------------------------------------------------------------------
    // Workbook parsing
    // ------------------------------------------------------------------------

    /// Workbook laid out like the laboratory's summary: a title, a header row
    /// at index 2, a sub-header at index 3, data from index 4 in columns B-I
    /// and a running number in column A.
    fn workbook(rows: &[[&str; 8]]) -> Vec<u8> {
        let mut book = rust_xlsxwriter::Workbook::new();
        let sheet = book.add_worksheet();
        sheet.write_string(0, 0, "RESUMEN CLIENTES-LAB").unwrap();
        let headers = [
            "ITLF", "MÉTODO", "Analito", "EQUIPO", "LD", "LC", "MATRIZ", "ACREDITADO",
        ];
        for (col, header) in (1u16..).zip(headers) {
            sheet.write_string(2, col, header).unwrap();
        }
        sheet.write_string(3, 1, "ITLF-00").unwrap();
        sheet.write_string(3, 3, "(µg/kg)").unwrap();

        for (row, cells) in (4u32..).zip(rows) {
            sheet.write_number(row, 0, f64::from(row - 3)).unwrap();
            for (col, value) in (1u16..).zip(cells) {
                if value.is_empty() {
                    continue;
                }
                match value.parse::<f64>() {
                    Ok(number) => sheet.write_number(row, col, number).unwrap(),
                    Err(_) => sheet.write_string(row, col, *value).unwrap(),
                };
            }
        }
        book.save_to_buffer().unwrap()
    }

    fn parse_workbook(bytes: Vec<u8>) -> SheetImport {
        parse_methodology_workbook(std::io::Cursor::new(bytes)).unwrap()
    }

    #[test]
    fn test_workbook_blocks_by_position() {
        let bytes = workbook(&[
            ["ITLF-01", "Tetraciclinas", "Tetraciclina", "LC-MS/MS", "0.5", "1", "pp", "OK"],
            ["", "", "Oxitetraciclina", "", "0.5", "1", "PHB", ""],
            ["", "", "", "", "", "", "", ""],
            ["ITLF-02", "", "Cloranfenicol", "GC-MS", "0.1", "0.3", "", "sí"],
        ]);
        let parsed = parse_workbook(bytes);
        assert_eq!(parsed.drafts.len(), 3);
        assert_eq!(parsed.skipped, 0);
        assert_eq!(parsed.method_count(), 2);

        let first = &parsed.drafts[0];
        assert_eq!(first.codigo.as_deref(), Some("ITLF-01"));
        assert_eq!(first.nombre, "Tetraciclinas");
        assert_eq!(first.tecnica.as_deref(), Some("LC-MS/MS"));
        assert_eq!(first.limite_deteccion.as_deref(), Some("0.5"));
        assert_eq!(first.limite_cuantificacion.as_deref(), Some("1"));
        assert_eq!(first.matriz, "Productos pecuarios");
        assert!(first.acreditada);

        let second = &parsed.drafts[1];
        assert_eq!(second.nombre, "Tetraciclinas");
        assert_eq!(second.tecnica.as_deref(), Some("LC-MS/MS"));
        assert_eq!(second.matriz, "Productos hidrobiológicos");
        assert!(!second.acreditada);

        let last = &parsed.drafts[2];
        assert_eq!(last.nombre, "Cloranfenicol");
        assert_eq!(last.matriz, UNSPECIFIED_MATRIX);
        assert!(last.acreditada);
    }

    #[test]
    fn test_workbook_rows_before_data_ignored() {
        // the ITLF cell at index 3 would open a block if it were read
        let bytes = workbook(&[["", "", "Tetraciclina", "", "", "", "", ""]]);
        let parsed = parse_workbook(bytes);
        assert!(parsed.drafts.is_empty());
        assert_eq!(parsed.skipped, 1);
    }

    #[test]
    fn test_workbook_column_a_ignored() {
        let bytes = workbook(&[["", "", "", "", "", "", "", ""]]);
        let parsed = parse_workbook(bytes);
        assert_eq!(parsed, SheetImport::default());
    }

    #[test]
    fn test_workbook_without_data_rows() {
        let parsed = parse_workbook(workbook(&[]));
        assert_eq!(parsed, SheetImport::default());
    }

    #[test]
    fn test_not_a_workbook() {
        let err = parse_methodology_workbook(std::io::Cursor::new(b"itlf,analito\n".to_vec()))
            .unwrap_err();
        assert!(matches!(err, Error::Workbook(_)));
    }

    #[test]
    fn test_sheet_format_from_extension() {
        assert_eq!(SheetFormat::from_path(Path::new("a.XLSX")), SheetFormat::Workbook);
        assert_eq!(SheetFormat::from_path(Path::new("a.xlsm")), SheetFormat::Workbook);
        assert_eq!(SheetFormat::from_path(Path::new("a.csv")), SheetFormat::Csv);
        assert_eq!(SheetFormat::from_path(Path::new("resumen")), SheetFormat::Csv);
    }

    // ------------------------------------------------------------------------
    // Cell helpers
    // ------------------------------------------------------------------------

    #[test]
    fn test_accredited_marks() {
        for mark in ["OK", "Sí", "si", "S", "yes", "TRUE", "1", "Acreditada", "acreditado"] {
            assert!(is_accredited_mark(Some(mark)), "{mark}");
        }
        for mark in ["no", "", "pendiente", "0"] {
            assert!(!is_accredited_mark(Some(mark)), "{mark}");
        }
        assert!(!is_accredited_mark(None));
    }

    #[test]
    fn test_header_normalisation() {
        assert_eq!(normalize_header(" Método "), "metodo");
        assert_eq!(normalize_header("ANALITO"), "analito");
    }
}
