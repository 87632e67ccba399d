use serde::{Deserialize, Serialize};

use crate::errors::AppError;

const BYTES_PER_KB: u64 = 1024;
const BYTES_PER_MB: u64 = 1024 * 1024;

/// Maximum accepted upload size, configured in kilobytes.
///
/// The server uses it as the multipart total limit and the client checks
/// selected files against it before any network call, so both sides share a
/// single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadLimit {
    max_kb: u64,
}

impl UploadLimit {
    pub const DEFAULT_KB: u64 = 400_000;

    pub fn from_kilobytes(max_kb: u64) -> Self {
        UploadLimit { max_kb }
    }

    pub fn max_kb(&self) -> u64 {
        self.max_kb
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_kb.saturating_mul(BYTES_PER_KB)
    }

    /// Human label for the limit. Every 1000 KB count as one MB, so the
    /// default of 400 000 KB reads "400MB".
    pub fn label(&self) -> String {
        if self.max_kb >= 1000 {
            format!("{}MB", trim_decimals(self.max_kb as f64 / 1000.0))
        } else {
            format!("{}KB", self.max_kb)
        }
    }

    pub fn allows(&self, size_bytes: u64) -> bool {
        size_bytes <= self.max_bytes()
    }

    /// Rejects a video larger than the limit with a message citing both sizes.
    pub fn check_video(&self, size_bytes: u64) -> Result<(), AppError> {
        if self.allows(size_bytes) {
            return Ok(());
        }

        Err(AppError::Validation(format!(
            "El video excede el límite de {}. Tamaño actual: {}",
            self.label(),
            format_file_size(size_bytes)
        )))
    }

    pub fn summary(&self) -> UploadLimitSummary {
        UploadLimitSummary {
            max_upload_kb: self.max_kb,
            max_upload_bytes: self.max_bytes(),
            label: self.label(),
        }
    }
}

impl Default for UploadLimit {
    fn default() -> Self {
        UploadLimit::from_kilobytes(Self::DEFAULT_KB)
    }
}

impl From<UploadLimitSummary> for UploadLimit {
    fn from(summary: UploadLimitSummary) -> Self {
        UploadLimit::from_kilobytes(summary.max_upload_kb)
    }
}

/// Wire form of the limit served at `GET /upload/limits`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadLimitSummary {
    pub max_upload_kb: u64,
    pub max_upload_bytes: u64,
    pub label: String,
}

/// Formats a byte count as `X.XXMB` from one MiB upwards, `X.XXKB` below.
pub fn format_file_size(bytes: u64) -> String {
    if bytes >= BYTES_PER_MB {
        format!("{:.2}MB", bytes as f64 / BYTES_PER_MB as f64)
    } else {
        format!("{:.2}KB", bytes as f64 / BYTES_PER_KB as f64)
    }
}

fn trim_decimals(value: f64) -> String {
    let formatted = format!("{value:.2}");
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}
