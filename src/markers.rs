// markers.rs

use csv::StringRecord;
use log::{debug, info, warn};
use std::fs::File;
use std::io::{self, Read};
use std::ops::RangeInclusive;
use std::path::Path;

use crate::error::{ClumpError, RowParseError};

/// Minimum columns in the input table: name, chromosome, position, p-value.
pub const MIN_COLUMNS: usize = 4;

/// Autosomes analysed; anything else is rejected per row.
pub const CHROMOSOMES: RangeInclusive<u8> = 1..=22;

/// One row of GWAS summary statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub name: String,
    pub chromosome: u8,
    pub position: u64,
    pub p_value: f64,
}

/// Tab-delimited reader shared by the file loader and [`MarkerStore::from_rows`].
/// Rows may carry any number of columns and quotes are taken literally.
fn tsv_reader<R: Read>(reader: R, has_headers: bool) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(has_headers)
        .flexible(true)
        .quoting(false)
        .from_reader(reader)
}

/// Parses one data record. `line` is the 1-based line number in the source
/// file and is only used for diagnostics.
///
/// Column 0 is the marker name, column 1 the chromosome, column 2 the position
/// and the last column the p-value. Anything in between is ignored.
pub fn parse_marker_record(line: usize, record: &StringRecord) -> Result<Marker, RowParseError> {
    if record.len() < MIN_COLUMNS {
        return Err(RowParseError::MissingColumns {
            line,
            found: record.len(),
        });
    }

    let name = record[0].trim();
    let chromosome_str = record[1].trim();
    if chromosome_str.is_empty() {
        return Err(RowParseError::EmptyChromosome { line });
    }
    let chromosome = match chromosome_str.parse::<u8>() {
        Ok(chr) if CHROMOSOMES.contains(&chr) => chr,
        _ => {
            return Err(RowParseError::InvalidChromosome {
                line,
                value: chromosome_str.to_string(),
            })
        }
    };

    let position_str = record[2].trim();
    let position = position_str
        .parse::<u64>()
        .map_err(|_| RowParseError::InvalidPosition {
            line,
            marker: name.to_string(),
            value: position_str.to_string(),
        })?;

    let p_value_str = record[record.len() - 1].trim();
    let p_value = match p_value_str.parse::<f64>() {
        Ok(p) if p.is_finite() && (0.0..=1.0).contains(&p) => p,
        _ => {
            return Err(RowParseError::InvalidPValue {
                line,
                marker: name.to_string(),
                value: p_value_str.to_string(),
            })
        }
    };

    Ok(Marker {
        name: name.to_string(),
        chromosome,
        position,
        p_value,
    })
}

/// Markers that survived parsing, in file order. Read-only once loaded.
#[derive(Debug, Default, Clone)]
pub struct MarkerStore {
    markers: Vec<Marker>,
    skipped: usize,
    blank_chromosome: usize,
}

impl MarkerStore {
    /// Loads data rows whose header has already been stripped. The first row
    /// is reported as line 2 in diagnostics.
    pub fn from_rows<I, S>(rows: I) -> Result<Self, csv::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut text = String::new();
        for row in rows {
            text.push_str(row.as_ref());
            text.push('\n');
        }
        Self::from_reader(&mut tsv_reader(text.as_bytes(), false), 1)
    }

    /// Drains `reader`, adding `line_offset` to each record's line number.
    fn from_reader<R: Read>(reader: &mut csv::Reader<R>, line_offset: u64) -> Result<Self, csv::Error> {
        let mut store = MarkerStore::default();
        for result in reader.records() {
            let record = result?;
            let line = record.position().map_or(0, |pos| pos.line()) + line_offset;
            store.push_record(line as usize, &record);
        }
        Ok(store)
    }

    fn push_record(&mut self, line: usize, record: &StringRecord) {
        if record.iter().all(|field| field.trim().is_empty()) {
            return;
        }
        match parse_marker_record(line, record) {
            Ok(marker) => self.markers.push(marker),
            Err(RowParseError::EmptyChromosome { line }) => {
                debug!("Dropping line {}: empty chromosome.", line);
                self.blank_chromosome += 1;
            }
            Err(e) => {
                warn!("Skipping row: {}", e);
                self.skipped += 1;
            }
        }
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn into_markers(self) -> Vec<Marker> {
        self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Rows rejected with a warning (bad position, p-value, chromosome or column count).
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Rows silently dropped because the chromosome field was empty.
    pub fn blank_chromosome(&self) -> usize {
        self.blank_chromosome
    }
}

/// Reads a marker table from disk. The header row is required and must carry
/// at least [`MIN_COLUMNS`] columns. Bad data rows are skipped, I/O failures are fatal.
pub fn read_marker_file(path: &Path) -> Result<MarkerStore, ClumpError> {
    let file = File::open(path).map_err(|e| ClumpError::io(path, e))?;
    let mut reader = tsv_reader(io::BufReader::new(file), true);

    let columns = reader.headers().map_err(|e| ClumpError::csv(path, e))?.len();
    if columns == 0 {
        return Err(ClumpError::MissingHeader {
            path: path.to_path_buf(),
        });
    }
    if columns < MIN_COLUMNS {
        return Err(ClumpError::MalformedHeader {
            path: path.to_path_buf(),
            columns,
        });
    }

    // record positions already count the header line
    let store = MarkerStore::from_reader(&mut reader, 0).map_err(|e| ClumpError::csv(path, e))?;

    info!(
        "Loaded {} markers from {} ({} rows skipped, {} with empty chromosome).",
        store.len(),
        path.display(),
        store.skipped(),
        store.blank_chromosome()
    );
    Ok(store)
}
