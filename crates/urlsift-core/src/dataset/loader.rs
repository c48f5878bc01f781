//! CSV ingestion with encoding fallback.
//!
//! Training exports come from mixed tooling, so bytes are decoded as UTF-8 first, then
//! CP949 (Korean Windows), then Latin-1, which accepts any byte sequence.

use std::borrow::Cow;
use std::fmt;
use std::path::Path;

use anyhow::{bail, Context, Result};

use super::LabeledUrl;

/// Cells read as missing, matching the markers common spreadsheet and dataframe tools emit.
const NA_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Cp949,
    Latin1,
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Cp949 => "cp949",
            TextEncoding::Latin1 => "latin-1",
        })
    }
}

/// Decode with the first encoding that accepts every byte. A UTF-8 BOM is dropped.
pub fn decode_text(bytes: &[u8]) -> (Cow<'_, str>, TextEncoding) {
    if let Ok(text) = std::str::from_utf8(bytes) {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        return (Cow::Borrowed(text), TextEncoding::Utf8);
    }
    tracing::debug!("input is not valid utf-8; trying cp949");
    if let Some(text) = encoding_rs::EUC_KR.decode_without_bom_handling_and_without_replacement(bytes)
    {
        return (text, TextEncoding::Cp949);
    }
    tracing::debug!("input is not valid cp949; falling back to latin-1");
    let text: String = bytes.iter().map(|&b| char::from(b)).collect();
    (Cow::Owned(text), TextEncoding::Latin1)
}

/// Read `url` and `label` columns from a headered CSV file. Other columns are ignored and
/// short rows yield missing cells.
pub fn load_csv(path: &Path) -> Result<Vec<LabeledUrl>> {
    let bytes = std::fs::read(path).with_context(|| format!("read dataset: {}", path.display()))?;
    let (text, encoding) = decode_text(&bytes);
    tracing::info!(path = %path.display(), %encoding, "dataset decoded");
    parse_rows(&text).with_context(|| format!("parse dataset: {}", path.display()))
}

fn parse_rows(text: &str) -> Result<Vec<LabeledUrl>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = reader.headers().context("read csv header")?.clone();
    let column = |name: &str| headers.iter().position(|h| h == name);
    let (Some(url_col), Some(label_col)) = (column("url"), column("label")) else {
        bail!("csv header must contain `url` and `label` columns, found {:?}", headers);
    };

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("csv record {}", line + 1))?;
        rows.push(LabeledUrl {
            url: cell(record.get(url_col)),
            label: cell(record.get(label_col)),
        });
    }
    Ok(rows)
}

fn cell(raw: Option<&str>) -> Option<String> {
    raw.filter(|v| !NA_MARKERS.contains(v)).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_with_bom() {
        let (text, enc) = decode_text("\u{feff}url,label\n".as_bytes());
        assert_eq!(enc, TextEncoding::Utf8);
        assert_eq!(text, "url,label\n");
    }

    #[test]
    fn cp949_fallback() {
        // "정상" in CP949.
        let bytes = [0xC1, 0xA4, 0xBB, 0xF3];
        let (text, enc) = decode_text(&bytes);
        assert_eq!(enc, TextEncoding::Cp949);
        assert_eq!(text, "정상");
    }

    #[test]
    fn latin1_accepts_anything() {
        // 0xFF is a lead byte with no valid trail in cp949.
        let bytes = [b'a', 0xFF, b'b'];
        let (text, enc) = decode_text(&bytes);
        assert_eq!(enc, TextEncoding::Latin1);
        assert_eq!(text, "a\u{ff}b");
    }

    #[test]
    fn parses_columns_in_any_order() {
        let rows = parse_rows("label,extra,url\nbenign,x,http://a.com\nmalicious,y,http://b.com\n")
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].url.as_deref(), Some("http://a.com"));
        assert_eq!(rows[1].label.as_deref(), Some("malicious"));
    }

    #[test]
    fn na_markers_and_short_rows_are_missing() {
        let rows = parse_rows("url,label\n,benign\nNaN,benign\nhttp://a.com,NULL\nhttp://b.com\n")
            .unwrap();
        assert_eq!(rows.len(), 4);
        assert!(rows[0].url.is_none());
        assert!(rows[1].url.is_none());
        assert!(rows[2].label.is_none());
        assert_eq!(rows[3].url.as_deref(), Some("http://b.com"));
        assert!(rows[3].label.is_none());
    }

    #[test]
    fn missing_columns_are_an_error() {
        let err = parse_rows("address,label\nhttp://a.com,benign\n").unwrap_err();
        assert!(err.to_string().contains("`url` and `label`"));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.csv");
        std::fs::write(&path, "url,label\nhttp://a.com,benign\n").unwrap();
        let rows = load_csv(&path).unwrap();
        assert_eq!(rows.len(), 1);
    }
}
