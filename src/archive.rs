//! Archive-service plumbing
//!
//! Everything here is pure data handling around archive services: undoing
//! the Wayback Machine's URL rewriting, stripping its injected page
//! chrome, and decoding CDX snapshot listings. Fetching is deliberately
//! absent; callers bring their own bytes.

use crate::dom::Document;
use crate::error::{PalimpsestError, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Element ids of the Wayback Machine toolbar and footer injected into
/// archived pages
const WAYBACK_CHROME_IDS: &[&str] = &["wm-ipp", "wm-footer"];

/// Recover the original resource URL from a Wayback rewrite wrapper
///
/// Archived pages reference resources through
/// `https://web.archive.org/web/<timestamp>[<flag>]/<original>`; the
/// timestamp segment may carry a modifier suffix such as `im_` or `id_`.
/// URLs that don't match the wrapper shape are returned unchanged.
///
/// # Example
///
/// ```rust
/// use palimpsest::archive::original_url;
///
/// let wrapped = "https://web.archive.org/web/20200101000000im_/https://example.com/logo.png";
/// assert_eq!(original_url(wrapped), "https://example.com/logo.png");
/// assert_eq!(original_url("https://example.com/logo.png"), "https://example.com/logo.png");
/// ```
pub fn original_url(url: &str) -> &str {
    for prefix in ["https://web.archive.org/web/", "http://web.archive.org/web/"] {
        if let Some(rest) = url.strip_prefix(prefix) {
            if let Some(slash) = rest.find('/') {
                let stamp = &rest[..slash];
                let digits = stamp.chars().take_while(|c| c.is_ascii_digit()).count();
                if digits >= 4 && (digits == stamp.len() || stamp[digits..].ends_with('_')) {
                    return &rest[slash + 1..];
                }
            }
        }
    }
    url
}

/// Remove the Wayback Machine toolbar and footer from an archived page
///
/// The injected chrome would otherwise show up as removed content in
/// every comparison.
pub fn strip_wayback_chrome(doc: &mut Document) {
    for id in WAYBACK_CHROME_IDS {
        if let Some(node) = doc.element_by_id(id) {
            doc.detach(node);
            debug!("Removed wayback chrome element #{id}");
        }
    }
}

/// One archived snapshot of a page, as listed by an archive service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Archive service that holds the snapshot
    pub service: String,
    /// URL of the snapshot view
    pub url: String,
    /// Capture timestamp, 14 digits (`YYYYMMDDhhmmss`)
    pub timestamp: String,
    /// MIME type reported by the service
    pub mimetype: String,
    /// HTTP status the service recorded at capture time
    pub statuscode: String,
    /// Content digest reported by the service
    pub digest: String,
    /// Capture size in bytes, as reported (string-typed in the listing)
    pub length: String,
}

impl Snapshot {
    /// Parse the capture timestamp
    ///
    /// Returns `None` for timestamps that aren't the expected 14-digit
    /// format; listings occasionally contain truncated stamps.
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        NaiveDateTime::parse_from_str(&self.timestamp, "%Y%m%d%H%M%S")
            .ok()
            .map(|naive| Utc.from_utc_datetime(&naive))
    }
}

/// Decode a CDX API listing into snapshots, oldest first
///
/// The CDX JSON format is an array of arrays: a header row naming the
/// columns, then one row per capture. An empty listing (or a listing with
/// only the header row) decodes to an empty vector.
///
/// # Errors
///
/// Returns [`PalimpsestError::InvalidListing`] when the payload is not an
/// array of arrays, the header lacks a required column, or a data row is
/// shorter than the header.
pub fn parse_cdx_listing(json: &str) -> Result<Vec<Snapshot>> {
    let value: Value = serde_json::from_str(json)?;
    let rows = value
        .as_array()
        .ok_or_else(|| PalimpsestError::listing("top-level value is not an array"))?;
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let header = row_strings(&rows[0])?;
    let col = |name: &str| {
        header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| PalimpsestError::listing(format!("missing column {name:?}")))
    };
    let ts_col = col("timestamp")?;
    let original_col = col("original")?;
    let mime_col = col("mimetype")?;
    let status_col = col("statuscode")?;
    let digest_col = col("digest")?;
    let length_col = col("length")?;

    let mut snapshots = Vec::with_capacity(rows.len() - 1);
    for row in &rows[1..] {
        let fields = row_strings(row)?;
        if fields.len() < header.len() {
            return Err(PalimpsestError::listing(format!(
                "row has {} fields, header has {}",
                fields.len(),
                header.len()
            )));
        }
        let timestamp = fields[ts_col].clone();
        let original = &fields[original_col];
        snapshots.push(Snapshot {
            service: "web.archive.org".to_string(),
            url: format!("https://web.archive.org/web/{timestamp}/{original}"),
            timestamp,
            mimetype: fields[mime_col].clone(),
            statuscode: fields[status_col].clone(),
            digest: fields[digest_col].clone(),
            length: fields[length_col].clone(),
        });
    }

    // Fourteen-digit stamps order correctly as strings
    snapshots.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    debug!("Parsed CDX listing with {} snapshots", snapshots.len());
    Ok(snapshots)
}

fn row_strings(row: &Value) -> Result<Vec<String>> {
    row.as_array()
        .ok_or_else(|| PalimpsestError::listing("row is not an array"))?
        .iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| PalimpsestError::listing("row field is not a string"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"[
        ["urlkey", "timestamp", "original", "mimetype", "statuscode", "digest", "length"],
        ["com,example)/", "20210315120000", "https://example.com/", "text/html", "200", "AAAA", "5120"],
        ["com,example)/", "20190101083000", "https://example.com/", "text/html", "301", "BBBB", "512"]
    ]"#;

    #[test]
    fn test_original_url_strips_wrapper() {
        assert_eq!(
            original_url("https://web.archive.org/web/20210101000000/https://example.com/a"),
            "https://example.com/a"
        );
        assert_eq!(
            original_url("http://web.archive.org/web/20210101000000id_/http://example.com/b"),
            "http://example.com/b"
        );
    }

    #[test]
    fn test_original_url_passes_through_plain_urls() {
        assert_eq!(original_url("https://example.com/a.png"), "https://example.com/a.png");
        // Not a timestamp segment: left alone
        assert_eq!(
            original_url("https://web.archive.org/web/help/faq"),
            "https://web.archive.org/web/help/faq"
        );
    }

    #[test]
    fn test_strip_wayback_chrome() {
        let mut doc = Document::parse(
            r#"<body><div id="wm-ipp">toolbar</div><p>page</p><div id="wm-footer">foot</div></body>"#,
        )
        .unwrap();
        strip_wayback_chrome(&mut doc);
        assert_eq!(doc.body_html(), "<p>page</p>");
    }

    #[test]
    fn test_parse_cdx_listing_sorted_oldest_first() {
        let snapshots = parse_cdx_listing(LISTING).unwrap();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].timestamp, "20190101083000");
        assert_eq!(snapshots[0].statuscode, "301");
        assert_eq!(
            snapshots[1].url,
            "https://web.archive.org/web/20210315120000/https://example.com/"
        );
    }

    #[test]
    fn test_parse_cdx_listing_empty_cases() {
        assert!(parse_cdx_listing("[]").unwrap().is_empty());
        let header_only =
            r#"[["urlkey","timestamp","original","mimetype","statuscode","digest","length"]]"#;
        assert!(parse_cdx_listing(header_only).unwrap().is_empty());
    }

    #[test]
    fn test_parse_cdx_listing_rejects_bad_shapes() {
        assert!(matches!(
            parse_cdx_listing(r#"{"not": "an array"}"#),
            Err(PalimpsestError::InvalidListing(_))
        ));
        let missing_column = r#"[["urlkey", "timestamp"]]"#;
        assert!(matches!(
            parse_cdx_listing(missing_column),
            Err(PalimpsestError::InvalidListing(_))
        ));
        let short_row = format!(
            "[{},{}]",
            r#"["urlkey","timestamp","original","mimetype","statuscode","digest","length"]"#,
            r#"["com,example)/","20210101000000"]"#
        );
        assert!(matches!(
            parse_cdx_listing(&short_row),
            Err(PalimpsestError::InvalidListing(_))
        ));
    }

    #[test]
    fn test_snapshot_captured_at() {
        let snapshots = parse_cdx_listing(LISTING).unwrap();
        let when = snapshots[0].captured_at().unwrap();
        assert_eq!(when.to_rfc3339(), "2019-01-01T08:30:00+00:00");
        let bad = Snapshot {
            timestamp: "2021".to_string(),
            ..snapshots[0].clone()
        };
        assert!(bad.captured_at().is_none());
    }
}
