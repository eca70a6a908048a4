// Output formatting for blob commands

use std::fmt::{self, Display};

use colored::Colorize;
use das_storage::{DataHash, ExpirationPolicy, encode_key};
use serde::Serialize;

/// A command result that prints as JSON under `--json` and as text otherwise
pub fn print_report<T: Serialize + Display>(report: &T, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{report}");
    }
    Ok(())
}

pub fn print_success(message: impl Display) {
    println!("{} {}", "✓".green(), message);
}

/// Digest and object key of a payload
#[derive(Serialize)]
pub struct BlobAddress {
    pub hash: String,
    pub key: String,
}

impl From<DataHash> for BlobAddress {
    fn from(hash: DataHash) -> Self {
        Self {
            hash: hash.to_hex(),
            key: encode_key(hash.as_bytes()),
        }
    }
}

impl Display for BlobAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "0x{}", self.hash)?;
        writeln!(f, "{}", self.key)
    }
}

/// Result of a successful `put`
#[derive(Serialize)]
pub struct StoredBlob {
    #[serde(flatten)]
    pub address: BlobAddress,
    pub size: usize,
    pub timeout: u64,
    pub backend: String,
}

impl Display for StoredBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} Stored {} bytes in {}",
            "✓".green(),
            self.size,
            self.backend
        )?;
        writeln!(f, "{} Hash: 0x{}", "ℹ".blue(), self.address.hash)?;
        writeln!(f, "{} Key: {}", "ℹ".blue(), self.address.key)?;
        if self.timeout > 0 {
            writeln!(f, "{} Expires at: {} (Unix seconds)", "ℹ".blue(), self.timeout)?;
        }
        Ok(())
    }
}

/// Configured backend and its expiration behavior
#[derive(Serialize)]
pub struct BackendInfo {
    pub backend: String,
    pub expiration_policy: ExpirationPolicy,
}

impl Display for BackendInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} Backend: {}", "ℹ".blue(), self.backend)?;
        writeln!(f, "{} Expiration policy: {}", "ℹ".blue(), self.expiration_policy)
    }
}
