// brewdex-core/src/parse/mod.rs
//! Turns formula source files into [`FormulaRecord`]s.

pub mod json;
pub mod ruby;

use std::path::Path;

use brewdex_common::error::{BrewdexError, Result};
use brewdex_common::model::FormulaRecord;

pub use json::parse_json_formulas;
pub use ruby::parse_ruby_formula;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Ruby,
    Json,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("rb") => Some(Self::Ruby),
            Some("json") => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parses already-read source text. `name_hint` only applies to Ruby sources.
pub fn parse_formula_source(
    format: SourceFormat,
    source: &str,
    name_hint: Option<&str>,
) -> Result<Vec<FormulaRecord>> {
    match format {
        SourceFormat::Ruby => parse_ruby_formula(source, name_hint).map(|record| vec![record]),
        SourceFormat::Json => parse_json_formulas(source),
    }
}

pub(crate) fn format_for(path: &Path) -> Result<SourceFormat> {
    SourceFormat::from_path(path).ok_or_else(|| {
        BrewdexError::ParseError(
            path.display().to_string(),
            "unsupported formula file extension".to_string(),
        )
    })
}

pub(crate) fn name_hint(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|stem| stem.to_str())
}

/// Reads and parses one formula file.
pub fn parse_formula_file(path: &Path) -> Result<Vec<FormulaRecord>> {
    let format = format_for(path)?;
    let source = brewdex_aio::fs::read_to_string(path)?;
    parse_formula_source(format, &source, name_hint(path)).map_err(|e| with_path(e, path))
}

/// Async variant of [`parse_formula_file`].
pub async fn parse_formula_file_async(path: &Path) -> Result<Vec<FormulaRecord>> {
    let format = format_for(path)?;
    let source = brewdex_aio::fs::read_to_string_async(path).await?;
    parse_formula_source(format, &source, name_hint(path)).map_err(|e| with_path(e, path))
}

fn with_path(err: BrewdexError, path: &Path) -> BrewdexError {
    match err {
        BrewdexError::ParseError(_, msg) => {
            BrewdexError::ParseError(path.display().to_string(), msg)
        }
        other => other,
    }
}
