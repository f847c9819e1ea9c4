//! Deterministic object keys and vault file names
//!
//! Both derive from the case id, the ingestion timestamp (milliseconds) and
//! the original file name. Components are sanitized so that neither a case id
//! nor a file name can introduce path separators or parent references.

use chrono::{DateTime, Utc};
use setu_core::CaseId;

/// Suffix marking a sealed vault file
pub const SEALED_SUFFIX: &str = ".enc";

/// Replace anything outside `[A-Za-z0-9._-]` with `_` and drop leading dots
pub fn sanitize_component(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}

/// `{caseId}/{millis}_{fileName}`
pub fn object_key(case_id: &CaseId, ingested_at: DateTime<Utc>, file_name: &str) -> String {
    format!(
        "{}/{}_{}",
        sanitize_component(case_id.as_str()),
        ingested_at.timestamp_millis(),
        sanitize_component(file_name)
    )
}

/// Key tried on the `attempt`-th store of `base`: `base`, then `base-1`, `base-2`, ..
pub fn numbered_key(base: &str, attempt: u32) -> String {
    match attempt {
        0 => base.to_string(),
        n => format!("{base}-{n}"),
    }
}

/// `{caseId}_{millis}_{fileName}.enc`
pub fn vault_file_name(case_id: &CaseId, ingested_at: DateTime<Utc>, file_name: &str) -> String {
    format!(
        "{}_{}_{}{SEALED_SUFFIX}",
        sanitize_component(case_id.as_str()),
        ingested_at.timestamp_millis(),
        sanitize_component(file_name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_767_225_600_123).unwrap()
    }

    #[test]
    fn test_layout() {
        let case = CaseId::new("NYA-2026-001").unwrap();
        assert_eq!(
            object_key(&case, at(), "crime_scene_photo.png"),
            "NYA-2026-001/1767225600123_crime_scene_photo.png"
        );
        assert_eq!(
            vault_file_name(&case, at(), "crime_scene_photo.png"),
            "NYA-2026-001_1767225600123_crime_scene_photo.png.enc"
        );
        assert_eq!(numbered_key("C-1/5_a.png", 0), "C-1/5_a.png");
        assert_eq!(numbered_key("C-1/5_a.png", 2), "C-1/5_a.png-2");
    }

    #[test]
    fn test_components_cannot_escape() {
        assert_eq!(sanitize_component("../../etc/passwd"), "_.._etc_passwd");
        assert_eq!(sanitize_component(".."), "_");
        assert_eq!(sanitize_component("rapport final.pdf"), "rapport_final.pdf");
        assert_eq!(sanitize_component("फ़ोटो.jpg"), "____.jpg");

        assert_eq!(sanitize_component("ফটোট.jpg"), sanitize_component("ফটোক.jpg"));

        let case = CaseId::new("C/1").unwrap();
        assert_eq!(object_key(&case, at(), "a/b"), "C_1/1767225600123_a_b");
    }
}
