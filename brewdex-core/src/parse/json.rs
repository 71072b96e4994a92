// brewdex-core/src/parse/json.rs
use brewdex_common::error::{BrewdexError, Result};
use brewdex_common::model::FormulaRecord;
use serde::Deserialize;

/// A JSON formula file holds either one record or a list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonFormulaFile {
    One(Box<FormulaRecord>),
    Many(Vec<FormulaRecord>),
}

pub fn parse_json_formulas(source: &str) -> Result<Vec<FormulaRecord>> {
    let parsed: JsonFormulaFile = serde_json::from_str(source).map_err(|e| {
        BrewdexError::ParseError("json formula".to_string(), e.to_string())
    })?;
    Ok(match parsed {
        JsonFormulaFile::One(record) => vec![*record],
        JsonFormulaFile::Many(records) => records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_single_record_and_list() {
        let one = r#"{
            "name": "nepcal",
            "version": "0.4.0",
            "source_url": "https://github.com/nepcal/nepcal/archive/v0.4.0.tar.gz",
            "checksum": { "digest": "4444444444444444444444444444444444444444444444444444444444444444" },
            "build_dependencies": [{ "name": "make", "phase": "build" }],
            "install_targets": [{ "artifact": "nepcal", "category": "bin" }]
        }"#;
        let records = parse_json_formulas(one).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].version, "0.4.0");
        assert!(records[0].has_checksum());

        let many = format!("[{one}, {one}]");
        assert_eq!(parse_json_formulas(&many).unwrap().len(), 2);
    }

    #[test]
    fn missing_required_field_is_a_parse_error() {
        let err = parse_json_formulas(r#"{ "name": "nepcal" }"#).unwrap_err();
        assert!(matches!(err, BrewdexError::ParseError(..)));
    }
}
