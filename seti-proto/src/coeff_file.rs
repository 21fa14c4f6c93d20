// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The DFB filter-coefficient file format: plain text, a three-line
//! header (`Length=`, `Foldings=`, `Overlap=`) followed by one coefficient per line;
//! lines starting with `#` are comments.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoeffFileError {
    #[error("missing required header field {0}")]
    MissingField(&'static str),
    #[error("header field {field} has invalid value {value:?}")]
    BadFieldValue { field: &'static str, value: String },
    #[error("coefficient line {line} is not a valid number: {value:?}")]
    BadCoefficient { line: usize, value: String },
    #[error("header declares {declared} coefficients but the file has {actual}")]
    LengthMismatch { declared: usize, actual: usize },
}

/// A parsed filter-coefficient file: the raw coefficient table plus the `Foldings=` and
/// `Overlap=` header values consumed by [`seti_dfb`]'s `setCoefficients`.
#[derive(Clone, Debug, PartialEq)]
pub struct CoeffFile {
    pub foldings: usize,
    pub overlap: usize,
    pub coefficients: Vec<f64>,
}

pub fn parse(text: &str) -> Result<CoeffFile, CoeffFileError> {
    let mut length: Option<usize> = None;
    let mut foldings: Option<usize> = None;
    let mut overlap: Option<usize> = None;
    let mut coefficients = Vec::new();

    for (idx, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(value) = line.strip_prefix("Length=") {
            length = Some(parse_header_usize("Length", value)?);
        }
        else if let Some(value) = line.strip_prefix("Foldings=") {
            foldings = Some(parse_header_usize("Foldings", value)?);
        }
        else if let Some(value) = line.strip_prefix("Overlap=") {
            overlap = Some(parse_header_usize("Overlap", value)?);
        }
        else {
            let value: f64 = line
                .parse()
                .map_err(|_| CoeffFileError::BadCoefficient { line: idx + 1, value: line.to_string() })?;
            coefficients.push(value);
        }
    }

    let length = length.ok_or(CoeffFileError::MissingField("Length"))?;
    let foldings = foldings.ok_or(CoeffFileError::MissingField("Foldings"))?;
    let overlap = overlap.ok_or(CoeffFileError::MissingField("Overlap"))?;

    if coefficients.len() != length {
        return Err(CoeffFileError::LengthMismatch { declared: length, actual: coefficients.len() });
    }

    Ok(CoeffFile { foldings, overlap, coefficients })
}

fn parse_header_usize(field: &'static str, value: &str) -> Result<usize, CoeffFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| CoeffFileError::BadFieldValue { field, value: value.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_and_body_ignoring_comments() {
        let text = "\
# reference filter, 4 foldings
Length=4
Foldings=2
Overlap=1
0.1
# a comment line mid-table
0.2
0.3
0.4
";
        let parsed = parse(text).unwrap();
        assert_eq!(parsed.foldings, 2);
        assert_eq!(parsed.overlap, 1);
        assert_eq!(parsed.coefficients, vec![0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn mismatched_length_is_an_error() {
        let text = "Length=3\nFoldings=1\nOverlap=0\n0.1\n0.2\n";
        assert!(matches!(parse(text), Err(CoeffFileError::LengthMismatch { declared: 3, actual: 2 })));
    }

    #[test]
    fn missing_header_field_is_an_error() {
        let text = "Foldings=1\nOverlap=0\n0.1\n";
        assert!(matches!(parse(text), Err(CoeffFileError::MissingField("Length"))));
    }
}
