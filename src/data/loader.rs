use crate::data::{Dataset, Signal};
use crate::error::DataLoadError;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;
use tracing::{debug, info};

/// Load a vital-sign CSV from disk.
///
/// Returns a fresh dataset on every call. Both signal columns must be
/// present in the header; their contents are validated later, when a
/// computation actually reads them.
pub fn load_dataset(path: &Path) -> Result<Dataset, DataLoadError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataLoadError::NotFound {
            path: path.to_path_buf(),
        },
        _ => DataLoadError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let dataset = read_dataset(BufReader::new(file), path)?;

    info!(
        path = %path.display(),
        rows = dataset.len(),
        columns = dataset.headers().len(),
        "Loaded dataset"
    );

    Ok(dataset)
}

/// Parse CSV from any reader; `origin` is only used in error messages
pub fn read_dataset<R: Read>(reader: R, origin: &Path) -> Result<Dataset, DataLoadError> {
    let malformed = |source: csv::Error| DataLoadError::Malformed {
        path: origin.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(malformed)?
        .iter()
        .map(str::to_string)
        .collect();

    for signal in Signal::ALL {
        if !headers.iter().any(|h| h == signal.column()) {
            return Err(DataLoadError::MissingColumn {
                path: origin.to_path_buf(),
                column: signal.column().to_string(),
            });
        }
    }

    let mut dataset = Dataset::new(headers);
    for result in reader.records() {
        let record = result.map_err(malformed)?;
        dataset.push_row(record.iter().map(str::to_string).collect());
    }

    debug!(rows = dataset.len(), "Parsed input records");
    Ok(dataset)
}
