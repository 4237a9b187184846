//! Parsing of CSV files and spreadsheets into canonical records.
//!
//! Both formats end up as a header row plus string cells, which go
//! through the same column mapping and row builders.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto};
use csv::StringRecord;
use samarth_dataset_models::{CropRecord, Dataset, DatasetKind, RainfallRecord};
use samarth_vocabulary::casing::{subdivision_case, title_case};

use crate::DatasetError;
use crate::progress::ProgressCallback;
use crate::schema::{
    CROP_REQUIRED, CROP_RULES, ColumnRule, CropField, RAINFALL_REQUIRED, RAINFALL_RULES,
    RainfallField, map_columns,
};

/// File extensions read as spreadsheets. Anything else is read as CSV.
const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

type CsvReadFn<T> = fn(File, &dyn ProgressCallback) -> Result<Vec<T>, DatasetError>;
type SheetReadFn<T> = fn(&Range<Data>, &dyn ProgressCallback) -> Result<Vec<T>, DatasetError>;

/// Reads the crop production dataset from `path`, as a spreadsheet or CSV
/// depending on the extension.
///
/// Never fails: any error yields an unavailable dataset whose
/// `load_error` describes the problem.
#[must_use]
pub fn load_crops(path: &Path, progress: &dyn ProgressCallback) -> Dataset<CropRecord> {
    load_file(path, DatasetKind::Agriculture, progress, read_crops, crops_from_sheet)
}

/// Reads the rainfall dataset from `path`.
///
/// Never fails; see [`load_crops`].
#[must_use]
pub fn load_rainfall(path: &Path, progress: &dyn ProgressCallback) -> Dataset<RainfallRecord> {
    load_file(path, DatasetKind::Rainfall, progress, read_rainfall, rainfall_from_sheet)
}

/// Whether `path` has a spreadsheet extension.
#[must_use]
pub fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SPREADSHEET_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

fn load_file<T>(
    path: &Path,
    kind: DatasetKind,
    progress: &dyn ProgressCallback,
    from_csv: CsvReadFn<T>,
    from_sheet: SheetReadFn<T>,
) -> Dataset<T> {
    progress.set_message(format!("Loading {} from {}", kind.label(), path.display()));

    let result = if is_spreadsheet(path) {
        first_sheet(path).and_then(|range| from_sheet(&range, progress))
    } else {
        File::open(path)
            .map_err(DatasetError::from)
            .and_then(|file| from_csv(file, progress))
    };

    match result {
        Ok(records) => {
            log::info!("Loaded {} {kind} rows from {}", records.len(), path.display());
            progress.finish(format!("{}: {} rows", kind.label(), records.len()));
            Dataset::new(kind, records)
        }
        Err(e) => {
            log::warn!("{} unavailable ({}): {e}", kind.label(), path.display());
            progress.finish_and_clear();
            Dataset::unavailable(kind, format!("{}: {e}", path.display()))
        }
    }
}

fn first_sheet(path: &Path) -> Result<Range<Data>, DatasetError> {
    let mut workbook = open_workbook_auto(path)?;
    let Some(sheet) = workbook.sheet_names().first().cloned() else {
        return Err(DatasetError::EmptyWorkbook);
    };
    log::debug!("Reading sheet '{sheet}' of {}", path.display());
    Ok(workbook.worksheet_range(&sheet)?)
}

/// Parses crop production rows from CSV text.
///
/// Rows with invalid UTF-8 are decoded lossily and rows the CSV parser
/// rejects are skipped, so one bad line never costs the whole file.
///
/// # Errors
///
/// * [`DatasetError::Csv`] if the header row cannot be read or the
///   underlying reader fails
/// * [`DatasetError::MissingColumn`] if no header supplies the state,
///   crop or year
pub fn read_crops<R: Read>(
    reader: R,
    progress: &dyn ProgressCallback,
) -> Result<Vec<CropRecord>, DatasetError> {
    read_csv(
        reader,
        DatasetKind::Agriculture,
        CROP_RULES,
        CROP_REQUIRED,
        progress,
        crop_record,
    )
}

/// Parses rainfall rows from CSV text.
///
/// # Errors
///
/// * [`DatasetError::Csv`] if the header row cannot be read or the
///   underlying reader fails
/// * [`DatasetError::MissingColumn`] if no header supplies the
///   subdivision or year
pub fn read_rainfall<R: Read>(
    reader: R,
    progress: &dyn ProgressCallback,
) -> Result<Vec<RainfallRecord>, DatasetError> {
    read_csv(
        reader,
        DatasetKind::Rainfall,
        RAINFALL_RULES,
        RAINFALL_REQUIRED,
        progress,
        rainfall_record,
    )
}

/// Parses crop production rows from a worksheet whose first row holds the
/// headers.
///
/// # Errors
///
/// Returns [`DatasetError::MissingColumn`] if no header supplies the
/// state, crop or year.
pub fn crops_from_sheet(
    range: &Range<Data>,
    progress: &dyn ProgressCallback,
) -> Result<Vec<CropRecord>, DatasetError> {
    read_sheet(
        range,
        DatasetKind::Agriculture,
        CROP_RULES,
        CROP_REQUIRED,
        progress,
        crop_record,
    )
}

/// Parses rainfall rows from a worksheet whose first row holds the headers.
///
/// # Errors
///
/// Returns [`DatasetError::MissingColumn`] if no header supplies the
/// subdivision or year.
pub fn rainfall_from_sheet(
    range: &Range<Data>,
    progress: &dyn ProgressCallback,
) -> Result<Vec<RainfallRecord>, DatasetError> {
    read_sheet(
        range,
        DatasetKind::Rainfall,
        RAINFALL_RULES,
        RAINFALL_REQUIRED,
        progress,
        rainfall_record,
    )
}

fn crop_record(row: &Row<'_, CropField>) -> Option<CropRecord> {
    let state = row.text(CropField::State)?;
    let crop = row.text(CropField::Crop)?;
    let year = row.year(CropField::Year)?;
    Some(CropRecord {
        state: title_case(state),
        district: row.text(CropField::District).map(title_case),
        crop: title_case(crop),
        year,
        production: row.number(CropField::Production),
        area_harvested: row.number(CropField::AreaHarvested),
    })
}

fn rainfall_record(row: &Row<'_, RainfallField>) -> Option<RainfallRecord> {
    let subdivision = row.text(RainfallField::Subdivision)?;
    let year = row.year(RainfallField::Year)?;
    Some(RainfallRecord {
        subdivision: subdivision_case(subdivision),
        year,
        annual: row.number(RainfallField::Annual),
    })
}

/// One data row viewed through the resolved column mapping.
struct Row<'a, F> {
    record: &'a StringRecord,
    columns: &'a BTreeMap<F, usize>,
}

impl<F: Ord> Row<'_, F> {
    /// Trimmed, non-blank value of `field`.
    fn text(&self, field: F) -> Option<&str> {
        let index = *self.columns.get(&field)?;
        let value = self.record.get(index)?.trim();
        (!value.is_empty()).then_some(value)
    }

    fn year(&self, field: F) -> Option<i32> {
        self.text(field).and_then(parse_year)
    }

    fn number(&self, field: F) -> Option<f64> {
        self.text(field).and_then(parse_number)
    }
}

fn read_csv<R, F, T>(
    reader: R,
    kind: DatasetKind,
    rules: &[ColumnRule<F>],
    required: &[F],
    progress: &dyn ProgressCallback,
    build: fn(&Row<'_, F>) -> Option<T>,
) -> Result<Vec<T>, DatasetError>
where
    R: Read,
    F: Copy + Ord + std::fmt::Display,
{
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).trim().to_owned())
        .collect();

    let mut io_error = None;
    let rows = reader
        .byte_records()
        .map_while(|result| match result {
            Ok(record) => Some(Some(StringRecord::from_byte_record_lossy(record))),
            Err(e) if e.is_io_error() => {
                io_error = Some(e);
                None
            }
            Err(e) => {
                log::warn!("Skipping malformed {kind} row: {e}");
                Some(None)
            }
        })
        .flatten();

    let records = build_records(kind, &headers, rows, rules, required, progress, build)?;

    match io_error {
        Some(e) => Err(e.into()),
        None => Ok(records),
    }
}

fn read_sheet<F, T>(
    range: &Range<Data>,
    kind: DatasetKind,
    rules: &[ColumnRule<F>],
    required: &[F],
    progress: &dyn ProgressCallback,
    build: fn(&Row<'_, F>) -> Option<T>,
) -> Result<Vec<T>, DatasetError>
where
    F: Copy + Ord + std::fmt::Display,
{
    let mut rows = range
        .rows()
        .map(|cells| cells.iter().map(cell_text).collect::<Vec<_>>());

    let headers: Vec<String> = rows
        .next()
        .unwrap_or_default()
        .into_iter()
        .map(|h| h.trim().to_owned())
        .collect();

    build_records(
        kind,
        &headers,
        rows.map(StringRecord::from),
        rules,
        required,
        progress,
        build,
    )
}

/// Spreadsheet cell as the text a CSV export would contain.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn build_records<F, T>(
    kind: DatasetKind,
    headers: &[String],
    rows: impl Iterator<Item = StringRecord>,
    rules: &[ColumnRule<F>],
    required: &[F],
    progress: &dyn ProgressCallback,
    build: fn(&Row<'_, F>) -> Option<T>,
) -> Result<Vec<T>, DatasetError>
where
    F: Copy + Ord + std::fmt::Display,
{
    let columns = map_columns(headers, rules);

    if let Some(missing) = required.iter().find(|f| !columns.contains_key(f)) {
        return Err(DatasetError::MissingColumn {
            kind,
            column: missing.to_string(),
        });
    }

    let mut records = Vec::new();
    let mut skipped = 0_u64;

    for (index, record) in rows.enumerate() {
        progress.inc(1);

        let row = Row {
            record: &record,
            columns: &columns,
        };
        if let Some(parsed) = build(&row) {
            records.push(parsed);
        } else {
            log::debug!("Skipping {kind} data row {}: missing name or year", index + 1);
            skipped += 1;
        }
    }

    if skipped > 0 {
        log::info!("Skipped {skipped} incomplete {kind} rows");
    }

    Ok(records)
}

/// Accepts `"2019"` and integral floats such as `"2019.0"`.
#[allow(clippy::cast_possible_truncation)]
fn parse_year(value: &str) -> Option<i32> {
    if let Ok(year) = value.parse::<i32>() {
        return Some(year);
    }
    let float = value.parse::<f64>().ok()?;
    (float.is_finite() && float.fract() == 0.0 && float.abs() < f64::from(i32::MAX))
        .then_some(float as i32)
}

/// Parses a number, tolerating thousands separators.
fn parse_number(value: &str) -> Option<f64> {
    value
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;
    use crate::progress::NullProgress;

    #[derive(Default)]
    struct CountingProgress(AtomicU64);

    impl ProgressCallback for CountingProgress {
        fn inc(&self, delta: u64) {
            self.0.fetch_add(delta, Ordering::Relaxed);
        }
        fn set_message(&self, _msg: String) {}
        fn finish(&self, _msg: String) {}
        fn finish_and_clear(&self) {}
    }

    #[test]
    fn reads_crop_rows_with_canonical_casing() {
        let csv = "\
State_Name,District_Name,Crop_Year,Season,Crop,Area Harvested,Production
tamil nadu,THANJAVUR,2019,Kharif,rice,\"1,200\",\"5,000.5\"
Tamil Nadu,,2019.0,Rabi,Banana,10,
";
        let records = read_crops(csv.as_bytes(), &NullProgress).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].state, "Tamil Nadu");
        assert_eq!(records[0].district.as_deref(), Some("Thanjavur"));
        assert_eq!(records[0].crop, "Rice");
        assert_eq!(records[0].year, 2019);
        assert_eq!(records[0].production, Some(5000.5));
        assert_eq!(records[0].area_harvested, Some(1200.0));
        assert_eq!(records[1].district, None);
        assert_eq!(records[1].year, 2019);
        assert_eq!(records[1].production, None);
    }

    #[test]
    fn skips_rows_missing_required_values() {
        let csv = "\
state,crop,year,production
Kerala,Coconut,2020,100
,Rice,2020,5
Kerala,,2020,5
Kerala,Rice,unknown,5
Kerala,Rice,2021,n/a
";
        let progress = CountingProgress::default();
        let records = read_crops(csv.as_bytes(), &progress).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].year, 2021);
        assert_eq!(records[1].production, None);
        assert_eq!(progress.0.load(Ordering::Relaxed), 5);
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let csv = "state,year,production\nKerala,2020,5\n";
        let err = read_crops(csv.as_bytes(), &NullProgress).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::MissingColumn { kind: DatasetKind::Agriculture, ref column } if column == "crop"
        ));
    }

    #[test]
    fn reads_rainfall_rows_upper_cased() {
        let csv = "\
SUBDIVISION,YEAR,JAN,ANNUAL
Tamil Nadu,2019,10.0,1000.5
KERALA,2019,20.0,
coastal karnataka,1901.0,5,3500
";
        let records = read_rainfall(csv.as_bytes(), &NullProgress).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].subdivision, "TAMIL NADU");
        assert_eq!(records[0].annual, Some(1000.5));
        assert_eq!(records[1].annual, None);
        assert_eq!(records[2].subdivision, "COASTAL KARNATAKA");
        assert_eq!(records[2].year, 1901);
    }

    #[test]
    fn short_rows_are_tolerated() {
        let csv = "SUBDIVISION,YEAR,ANNUAL\nKERALA,2019\n";
        let records = read_rainfall(csv.as_bytes(), &NullProgress).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].annual, None);
    }

    #[test]
    fn missing_file_yields_unavailable_dataset() {
        let dataset = load_rainfall(Path::new("/nonexistent/rainfall.csv"), &NullProgress);
        assert!(dataset.is_unavailable());
        assert!(dataset.is_empty());
        assert_eq!(dataset.kind, DatasetKind::Rainfall);
        assert!(
            dataset
                .load_error
                .as_deref()
                .is_some_and(|e| e.starts_with("/nonexistent/rainfall.csv"))
        );
    }

    #[test]
    fn invalid_utf8_row_does_not_lose_its_neighbours() {
        let csv: &[u8] =
            b"SUBDIVISION,YEAR,ANNUAL\nKERALA,2019,3000\nTAMIL NADU \xe9,2019,950\nKERALA,2020,2900\n";
        let records = read_rainfall(csv, &NullProgress).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].subdivision, "KERALA");
        assert_eq!(records[0].annual, Some(3000.0));
        assert!(records[1].subdivision.starts_with("TAMIL NADU"));
        assert_eq!(records[2].subdivision, "KERALA");
        assert_eq!(records[2].year, 2020);
    }

    fn sheet(rows: &[&[Data]]) -> Range<Data> {
        let height = u32::try_from(rows.len()).unwrap();
        let width = u32::try_from(rows[0].len()).unwrap();
        let mut range = Range::new((0, 0), (height - 1, width - 1));
        for (r, cells) in rows.iter().enumerate() {
            for (c, cell) in cells.iter().enumerate() {
                range.set_value(
                    (u32::try_from(r).unwrap(), u32::try_from(c).unwrap()),
                    cell.clone(),
                );
            }
        }
        range
    }

    fn text(s: &str) -> Data {
        Data::String(s.to_string())
    }

    #[test]
    fn reads_crop_rows_from_worksheet() {
        let range = sheet(&[
            &[text("State_Name"), text("District_Name"), text("Crop_Year"), text("Crop"), text("Production")],
            &[text("punjab"), text("LUDHIANA"), Data::Float(2014.0), text("wheat"), Data::Float(1500.5)],
            &[text("Punjab"), Data::Empty, Data::Int(2015), text("Rice"), Data::Empty],
            &[Data::Empty, text("Amritsar"), Data::Float(2015.0), text("Rice"), Data::Int(7)],
        ]);
        let progress = CountingProgress::default();
        let records = crops_from_sheet(&range, &progress).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].state, "Punjab");
        assert_eq!(records[0].district.as_deref(), Some("Ludhiana"));
        assert_eq!(records[0].crop, "Wheat");
        assert_eq!(records[0].year, 2014);
        assert_eq!(records[0].production, Some(1500.5));
        assert_eq!(records[1].district, None);
        assert_eq!(records[1].year, 2015);
        assert_eq!(records[1].production, None);
        assert_eq!(progress.0.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn worksheet_without_required_columns_is_rejected() {
        let range = sheet(&[&[text("SUBDIVISION"), text("ANNUAL")], &[text("KERALA"), Data::Float(3000.0)]]);
        let err = rainfall_from_sheet(&range, &NullProgress).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::MissingColumn { kind: DatasetKind::Rainfall, ref column } if column == "year"
        ));
    }

    #[test]
    fn picks_reader_by_extension() {
        assert!(is_spreadsheet(Path::new("data/crop.xlsx")));
        assert!(is_spreadsheet(Path::new("data/CROP.XLS")));
        assert!(!is_spreadsheet(Path::new("data/rainfall.csv")));
        assert!(!is_spreadsheet(Path::new("data/rainfall")));

        let dataset = load_crops(Path::new("/nonexistent/crop.xlsx"), &NullProgress);
        assert!(dataset.is_unavailable());
        assert_eq!(dataset.kind, DatasetKind::Agriculture);
    }

    #[test]
    fn csv_errors_are_not_prefixed_twice() {
        let mut strict = csv::ReaderBuilder::new().from_reader("a,b\n1\n".as_bytes());
        let err = strict.records().find_map(Result::err).unwrap();
        let expected = err.to_string();
        assert_eq!(DatasetError::from(err).to_string(), expected);
    }

    #[test]
    fn parses_years() {
        assert_eq!(parse_year("2019"), Some(2019));
        assert_eq!(parse_year("2019.0"), Some(2019));
        assert_eq!(parse_year("2019.5"), None);
        assert_eq!(parse_year("twenty"), None);
    }

    #[test]
    fn parses_numbers_with_separators() {
        assert_eq!(parse_number("1,234,567.5"), Some(1_234_567.5));
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number("NaN"), None);
    }
}
