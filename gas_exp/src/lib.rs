#![deny(rust_2018_idioms)]

pub mod gas;
pub mod record;

// Re-exports.
pub use gas::{Bucket, GasValue, UserPhase};
pub use record::RunRecord;

use color_eyre::eyre::WrapErr;
use color_eyre::Report;
use std::io::Write;
use std::path::Path;

/// Writes `data` as a JSON result file. The report only reads results; this
/// is how tests of both crates write their fixture runs.
pub fn serialize<T>(data: T, file: impl AsRef<Path>) -> Result<(), Report>
where
    T: serde::Serialize,
{
    // if the file does not exist it will be created, otherwise truncated
    let file = std::fs::File::create(file).wrap_err("serialize create file")?;
    // create a buf writer
    let mut buf = std::io::BufWriter::new(file);
    // and try to serialize
    serde_json::to_writer(&mut buf, &data).wrap_err("serialize")?;
    buf.flush().wrap_err("serialize flush")?;
    Ok(())
}

/// Reads a JSON result file.
pub fn deserialize<T>(file: impl AsRef<Path>) -> Result<T, Report>
where
    T: serde::de::DeserializeOwned,
{
    // open the file in read-only
    let file = std::fs::File::open(file).wrap_err("deserialize open file")?;
    // create a buf reader
    let buf = std::io::BufReader::new(file);
    // and try to deserialize
    let data = serde_json::from_reader(buf).wrap_err("deserialize")?;
    Ok(data)
}
