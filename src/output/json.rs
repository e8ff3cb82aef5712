//! JSON output formatting
//!
//! One document per sampling call:
//!
//! ```json
//! {
//!   "operator": "sample_uniform",
//!   "input_shape": [2],
//!   "sample_shape": [2],
//!   "output_shape": [2, 2],
//!   "dtype": "float32",
//!   "seed": 42,
//!   "data": [0.31, 0.77, 2.9, 3.1]
//! }
//! ```
//!
//! `data` is row-major and keeps the output element type.

use super::SampleReport;
use crate::dtype::DType;
use crate::with_dyn_array;
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;

/// Serialized form of a `SampleReport`
#[derive(Debug, Clone, Serialize)]
pub struct JsonSampleOutput {
    pub operator: String,
    pub context: String,
    pub input_shape: Vec<usize>,
    pub sample_shape: Vec<usize>,
    pub output_shape: Vec<usize>,
    pub dtype: DType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub data: serde_json::Value,
}

/// Build the JSON document for a report
pub fn build_output(report: &SampleReport) -> Result<JsonSampleOutput> {
    let data = with_dyn_array!(&report.output, a, T => serde_json::to_value(a.data()))
        .context("Failed to serialize samples")?;

    Ok(JsonSampleOutput {
        operator: report.operator.to_string(),
        context: report.context.to_string(),
        input_shape: report.input_shape().to_vec(),
        sample_shape: report.sample_shape.clone(),
        output_shape: report.output_shape().to_vec(),
        dtype: report.output.dtype(),
        seed: report.seed,
        data,
    })
}

/// Write the report as JSON
pub fn write_json_output<W: Write>(writer: W, report: &SampleReport, pretty: bool) -> Result<()> {
    let output = build_output(report)?;
    if pretty {
        serde_json::to_writer_pretty(writer, &output)?;
    } else {
        serde_json::to_writer(writer, &output)?;
    }
    Ok(())
}

/// Print the report as pretty JSON on stdout
pub fn print_json(report: &SampleReport) -> Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    write_json_output(&mut handle, report, true)?;
    writeln!(handle)?;
    Ok(())
}
