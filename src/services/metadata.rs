//! Embedded capture metadata (EXIF) extraction.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Read the EXIF tags of the primary image at `path`.
///
/// Never fails: a missing file, an unsupported container or an image without
/// EXIF data all produce an empty mapping.
pub fn extract(path: &Path) -> BTreeMap<String, String> {
    match read_exif(path) {
        Ok(fields) => fields,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Unable to retrieve EXIF");
            BTreeMap::new()
        }
    }
}

fn read_exif(path: &Path) -> Result<BTreeMap<String, String>, MetadataError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut reader)?;

    let fields = exif
        .fields()
        .filter(|f| f.ifd_num == exif::In::PRIMARY)
        // unknown tags have no registered name
        .filter(|f| f.tag.description().is_some())
        .map(|f| (f.tag.to_string(), field_value(f, &exif)))
        .collect();

    Ok(fields)
}

/// ASCII values as bare text; everything else in display form with its unit.
fn field_value(field: &exif::Field, exif: &exif::Exif) -> String {
    match &field.value {
        exif::Value::Ascii(parts) => parts
            .iter()
            .map(|p| String::from_utf8_lossy(p).trim_end_matches('\0').to_string())
            .collect::<Vec<_>>()
            .join(", "),
        _ => field.display_value().with_unit(exif).to_string(),
    }
}

#[derive(Debug, thiserror::Error)]
enum MetadataError {
    #[error("failed to open image: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse EXIF: {0}")]
    Exif(#[from] exif::Error),
}
