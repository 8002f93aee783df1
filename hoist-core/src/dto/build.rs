//! Build record wire shape

use serde::{Deserialize, Serialize};

/// A job's permanent build record as returned by `<build>/api/json`
///
/// `result` is absent (or null) while the build is still running; once it
/// is set, `duration` is fixed. `timestamp` and `duration` are epoch/delta
/// milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBuild {
    #[serde(rename = "_class")]
    pub class: String,
    pub number: u32,
    pub url: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub duration: i64,
    #[serde(default)]
    pub estimated_duration: i64,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub building: Option<bool>,
    #[serde(default)]
    pub built_on: Option<String>,
    #[serde(default)]
    pub full_display_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_build_deserializes_without_result() {
        let raw: RawBuild = serde_json::from_str(
            r#"{
                "_class": "hudson.model.FreeStyleBuild",
                "number": 12,
                "url": "http://localhost:8080/job/demo/12/",
                "timestamp": 1700000000000,
                "duration": 0,
                "building": true
            }"#,
        )
        .unwrap();

        assert_eq!(raw.number, 12);
        assert!(raw.result.is_none());
        assert_eq!(raw.building, Some(true));
        assert!(raw.built_on.is_none());
    }
}
