//! Calibration artifact loader (spec.md §6). The IFEval threshold is
//! tuned offline and written to a small JSON document; consumers fall
//! back to the hardcoded default rather than failing the request when
//! the file is absent or malformed.

use std::path::Path;

use serde::Deserialize;

use prompt_core::ifeval::DEFAULT_THRESHOLD;

#[derive(Debug, Clone, Deserialize)]
pub struct CalibrationArtifact {
    pub calibrated_threshold: f64,
    #[serde(default)]
    pub statistics: serde_json::Value,
    #[serde(default)]
    pub distribution: serde_json::Value,
}

/// Loads the calibrated IFEval threshold from `path`, falling back to
/// [`DEFAULT_THRESHOLD`] if the file is missing, unreadable, malformed,
/// or carries a threshold outside `[0.0, 1.0]`.
pub fn load_threshold(path: impl AsRef<Path>) -> f64 {
    let path = path.as_ref();
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "calibration artifact unreadable, using default threshold");
            return DEFAULT_THRESHOLD;
        }
    };

    match serde_json::from_str::<CalibrationArtifact>(&contents) {
        Ok(artifact) if (0.0..=1.0).contains(&artifact.calibrated_threshold) => {
            artifact.calibrated_threshold
        }
        Ok(artifact) => {
            tracing::warn!(
                threshold = artifact.calibrated_threshold,
                "calibration artifact threshold out of [0,1], using default threshold"
            );
            DEFAULT_THRESHOLD
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "calibration artifact malformed, using default threshold");
            DEFAULT_THRESHOLD
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_falls_back_to_default() {
        assert_eq!(load_threshold("/nonexistent/calibration.json"), DEFAULT_THRESHOLD);
    }

    #[test]
    fn malformed_file_falls_back_to_default() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not json").unwrap();
        assert_eq!(load_threshold(file.path()), DEFAULT_THRESHOLD);
    }

    #[test]
    fn out_of_range_threshold_falls_back_to_default() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"calibrated_threshold": 1.5, "statistics": {}, "distribution": {}}"#)
            .unwrap();
        assert_eq!(load_threshold(file.path()), DEFAULT_THRESHOLD);
    }

    #[test]
    fn valid_file_returns_its_threshold() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"calibrated_threshold": 0.82, "statistics": {}, "distribution": {}}"#)
            .unwrap();
        assert_eq!(load_threshold(file.path()), 0.82);
    }
}
