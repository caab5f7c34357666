// output.rs

use csv::StringRecord;
use log::info;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ClumpError;
use crate::region::Region;

pub const HEADER: [&str; 11] = [
    "Region",
    "MarkerName",
    "Chr",
    "Position",
    "P-value",
    "RegionStart",
    "RegionStop",
    "NumSigMarkers",
    "NumSuggestiveMarkers",
    "NumTotalMarkers",
    "SizeOfRegion",
];

/// Writes the header and one tab-separated row per region, in the given order.
/// P-values use the shortest exponent form that parses back to the same `f64`.
pub fn write_regions<W: Write>(writer: &mut W, regions: &[Region]) -> io::Result<()> {
    writeln!(writer, "{}", HEADER.join("\t"))?;
    for r in regions {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{:e}\t{}\t{}\t{}\t{}\t{}\t{}",
            r.region_index,
            r.marker_name,
            r.chr,
            r.position,
            r.p_value,
            r.region_start,
            r.region_stop,
            r.num_sig_markers,
            r.num_suggestive_markers,
            r.num_total_markers,
            r.size_of_region
        )?;
    }
    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".partial");
    PathBuf::from(name)
}

/// Writes the region table to `path`.
///
/// Rows go to `<path>.partial` first and the file is renamed into place only
/// after a successful flush, so a failed write never leaves a truncated table
/// under the final name.
pub fn write_region_file(path: &Path, regions: &[Region]) -> Result<(), ClumpError> {
    let staging = partial_path(path);
    let written = File::create(&staging).and_then(|file| {
        let mut writer = BufWriter::new(file);
        write_regions(&mut writer, regions)?;
        writer.flush()
    });
    if let Err(e) = written {
        let _ = fs::remove_file(&staging);
        return Err(ClumpError::io(path, e));
    }
    if let Err(e) = fs::rename(&staging, path) {
        let _ = fs::remove_file(&staging);
        return Err(ClumpError::io(path, e));
    }

    info!("Wrote {} region(s) to {}", regions.len(), path.display());
    Ok(())
}

fn field<T: FromStr>(record: &StringRecord, column: usize, line: usize) -> Result<T, ClumpError> {
    record[column]
        .parse::<T>()
        .map_err(|_| ClumpError::RegionTable {
            line,
            message: format!("could not parse {} value '{}'", HEADER[column], &record[column]),
        })
}

/// Parses a table produced by [`write_regions`].
pub fn read_region_table<R: Read>(reader: R) -> Result<Vec<Region>, ClumpError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let header = reader
        .headers()
        .map_err(|e| ClumpError::csv("<region table>", e))?;
    if header.is_empty() {
        return Err(ClumpError::RegionTable {
            line: 1,
            message: "missing header".to_string(),
        });
    }
    if !header.iter().eq(HEADER) {
        return Err(ClumpError::RegionTable {
            line: 1,
            message: format!("unexpected header '{}'", header.iter().collect::<Vec<_>>().join("\t")),
        });
    }

    let mut regions = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| ClumpError::csv("<region table>", e))?;
        let line = record.position().map_or(0, |pos| pos.line()) as usize;
        if record.len() != HEADER.len() {
            return Err(ClumpError::RegionTable {
                line,
                message: format!("expected {} columns, found {}", HEADER.len(), record.len()),
            });
        }
        regions.push(Region {
            region_index: field(&record, 0, line)?,
            marker_name: record[1].to_string(),
            chr: field(&record, 2, line)?,
            position: field(&record, 3, line)?,
            p_value: field(&record, 4, line)?,
            region_start: field(&record, 5, line)?,
            region_stop: field(&record, 6, line)?,
            num_sig_markers: field(&record, 7, line)?,
            num_suggestive_markers: field(&record, 8, line)?,
            num_total_markers: field(&record, 9, line)?,
            size_of_region: field(&record, 10, line)?,
        });
    }
    Ok(regions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::io::BufReader;

    #[fixture]
    fn regions() -> Vec<Region> {
        vec![
            Region {
                region_index: 1,
                marker_name: "rs1".to_string(),
                chr: 1,
                position: 100,
                p_value: 1e-8,
                region_start: 100,
                region_stop: 200,
                num_sig_markers: 1,
                num_suggestive_markers: 2,
                num_total_markers: 2,
                size_of_region: 100,
            },
            Region {
                region_index: 2,
                marker_name: "rs77".to_string(),
                chr: 12,
                position: 123_456_789,
                p_value: 3.141592653589793e-12,
                region_start: 123_000_000,
                region_stop: 124_250_000,
                num_sig_markers: 4,
                num_suggestive_markers: 19,
                num_total_markers: 311,
                size_of_region: 1_250_000,
            },
        ]
    }

    #[rstest]
    fn test_write_format(regions: Vec<Region>) {
        let mut buf = Vec::new();
        write_regions(&mut buf, &regions[..1]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "Region\tMarkerName\tChr\tPosition\tP-value\tRegionStart\tRegionStop\tNumSigMarkers\tNumSuggestiveMarkers\tNumTotalMarkers\tSizeOfRegion\n\
             1\trs1\t1\t100\t1e-8\t100\t200\t1\t2\t2\t100\n"
        );
    }

    #[rstest]
    fn test_written_table_reads_back(regions: Vec<Region>) {
        let mut buf = Vec::new();
        write_regions(&mut buf, &regions).unwrap();
        let parsed = read_region_table(BufReader::new(buf.as_slice())).unwrap();
        assert_eq!(parsed, regions);
    }

    #[rstest]
    fn test_file_write_leaves_no_partial(regions: Vec<Region>) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regions.tsv");
        write_region_file(&path, &regions).unwrap();
        assert!(path.exists());
        assert!(!partial_path(&path).exists());
    }

    #[rstest]
    fn test_write_into_missing_directory_fails(regions: Vec<Region>) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("regions.tsv");
        let err = write_region_file(&path, &regions).unwrap_err();
        assert!(matches!(err, ClumpError::Io { .. }));
        assert!(!path.exists());
    }

    #[rstest]
    fn test_failed_rename_removes_staging_file(regions: Vec<Region>) {
        let dir = tempfile::tempdir().unwrap();
        // a non-empty directory under the target name makes the final rename fail
        let path = dir.path().join("regions.tsv");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        let err = write_region_file(&path, &regions).unwrap_err();
        assert!(matches!(err, ClumpError::Io { .. }));
        assert!(!partial_path(&path).exists());
        assert!(path.join("keep").exists());
    }

    #[rstest]
    fn test_read_rejects_short_row() {
        let text = format!("{}\n1\trs1\t1\t100\n", HEADER.join("\t"));
        let err = read_region_table(text.as_bytes()).unwrap_err();
        assert!(matches!(err, ClumpError::RegionTable { line: 2, .. }));
    }

    #[rstest]
    fn test_read_rejects_foreign_header() {
        let err = read_region_table("Region\tMarkerName\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ClumpError::RegionTable { line: 1, .. }));
    }

    #[rstest]
    fn test_read_rejects_bad_number() {
        let text = format!("{}\n1\trs1\t1\tx\t1e-8\t1\t2\t1\t1\t1\t1\n", HEADER.join("\t"));
        let err = read_region_table(BufReader::new(text.as_bytes())).unwrap_err();
        assert!(matches!(err, ClumpError::RegionTable { line: 2, .. }));
    }
}
