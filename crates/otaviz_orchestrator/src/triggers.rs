//! External trigger types
//!
//! The dashboard's realtime channel forwards backend notifications as
//! JSON; these types deserialize those payloads directly. The orchestrator
//! never talks to the network itself.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Backend verification stage, as announced over the realtime channel
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerificationStage {
    #[default]
    Idle,
    HashVerification,
    CpabeDecryption,
    FinalDecryption,
}

/// Unknown stage string received from the backend
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown verification stage: {0:?}")]
pub struct StageParseError(pub String);

impl FromStr for VerificationStage {
    type Err = StageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(Self::Idle),
            "hash-verification" => Ok(Self::HashVerification),
            "cpabe-decryption" => Ok(Self::CpabeDecryption),
            "final-decryption" => Ok(Self::FinalDecryption),
            other => Err(StageParseError(other.to_string())),
        }
    }
}

impl fmt::Display for VerificationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::HashVerification => "hash-verification",
            Self::CpabeDecryption => "cpabe-decryption",
            Self::FinalDecryption => "final-decryption",
        };
        f.write_str(s)
    }
}

/// Metadata for the content-addressed update payload
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Content identifier
    pub cid: String,
    /// Display name
    pub name: String,
    /// Payload size in bytes
    pub size: u64,
}

impl FileInfo {
    /// Human-readable size for overlay labels
    pub fn size_display(&self) -> String {
        const MB: u64 = 1024 * 1024;
        const KB: u64 = 1024;
        if self.size >= MB {
            format!("{:.1} MB", self.size as f64 / MB as f64)
        } else if self.size >= KB {
            format!("{:.1} KB", self.size as f64 / KB as f64)
        } else {
            format!("{} B", self.size)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_round_trip() {
        for s in [
            "idle",
            "hash-verification",
            "cpabe-decryption",
            "final-decryption",
        ] {
            let stage: VerificationStage = s.parse().unwrap();
            assert_eq!(stage.to_string(), s);
        }
    }

    #[test]
    fn test_unknown_stage_rejected() {
        let err = "quantum-decryption".parse::<VerificationStage>().unwrap_err();
        assert_eq!(err, StageParseError("quantum-decryption".to_string()));
    }

    #[test]
    fn test_size_display() {
        let info = FileInfo {
            cid: "QmW12XF".into(),
            name: "fw_update_v2.5.0".into(),
            size: 10_240_306,
        };
        assert_eq!(info.size_display(), "9.8 MB");
    }
}
