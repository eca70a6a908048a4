use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context as AnyhowContext, Result};
use clap::Args;
use das_storage::{DataHash, keccak256};

use super::Context;
use crate::output::{BlobAddress, StoredBlob, print_report, print_success};

#[derive(Args)]
pub struct PutArgs {
    /// File to store
    file: PathBuf,

    /// Expiration as Unix seconds (only honored when the backend discards after timeout)
    #[arg(long, conflicts_with = "ttl")]
    timeout: Option<u64>,

    /// Expiration relative to now, in seconds
    #[arg(long)]
    ttl: Option<u64>,
}

#[derive(Args)]
pub struct GetArgs {
    /// Payload hash (hex, optional 0x prefix)
    hash: String,

    /// Output file (defaults to stdout)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
pub struct HashArgs {
    /// File to hash
    file: PathBuf,
}

pub async fn put(args: PutArgs, ctx: &Context) -> Result<()> {
    let data = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let timeout = resolve_timeout(args.timeout, args.ttl)?;

    let storage = ctx.open_storage().await?;
    let request = ctx.request();
    storage
        .put(&request, &data, timeout)
        .await
        .with_context(|| format!("Failed to store {}", args.file.display()))?;
    storage.sync(&request).await.context("Failed to sync storage")?;
    storage.close(&request).await.context("Failed to close storage")?;

    print_report(
        &StoredBlob {
            address: keccak256(&data).into(),
            size: data.len(),
            timeout,
            backend: storage.to_string(),
        },
        ctx.json_output,
    )
}

pub async fn get(args: GetArgs, ctx: &Context) -> Result<()> {
    let hash = DataHash::from_hex(&args.hash)
        .ok_or_else(|| anyhow::anyhow!("Invalid hash '{}': expected 32 hex bytes", args.hash))?;

    let storage = ctx.open_storage().await?;
    let request = ctx.request();
    let data = storage
        .get_by_hash(&request, hash.as_bytes())
        .await
        .with_context(|| format!("Failed to fetch 0x{hash}"))?;
    storage.close(&request).await.context("Failed to close storage")?;

    match args.output {
        Some(path) => {
            tokio::fs::write(&path, &data)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if !ctx.json_output {
                print_success(format!("Wrote {} bytes to {}", data.len(), path.display()));
            }
        }
        None => {
            use tokio::io::AsyncWriteExt;
            let mut stdout = tokio::io::stdout();
            stdout.write_all(&data).await?;
            stdout.flush().await?;
        }
    }
    Ok(())
}

pub async fn hash(args: HashArgs, ctx: &Context) -> Result<()> {
    let address = hash_file(&args.file).await?;
    print_report(&address, ctx.json_output)
}

async fn hash_file(path: &Path) -> Result<BlobAddress> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(keccak256(&data).into())
}

fn resolve_timeout(timeout: Option<u64>, ttl: Option<u64>) -> Result<u64> {
    match (timeout, ttl) {
        (Some(timeout), _) => Ok(timeout),
        (None, Some(ttl)) => {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .context("System clock is before the Unix epoch")?
                .as_secs();
            now.checked_add(ttl)
                .ok_or_else(|| anyhow::anyhow!("--ttl {ttl} overflows the expiration timestamp"))
        }
        (None, None) => Ok(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_timeout() {
        assert_eq!(resolve_timeout(Some(1_893_456_000), None).unwrap(), 1_893_456_000);
        assert_eq!(resolve_timeout(None, None).unwrap(), 0);
        assert!(resolve_timeout(None, Some(60)).unwrap() > 60);
        assert!(resolve_timeout(None, Some(u64::MAX)).is_err());
    }

    #[tokio::test]
    async fn test_hash_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"abc").unwrap();

        let address = hash_file(file.path()).await.unwrap();
        assert_eq!(
            address.hash,
            "4e03657aea45a94fc7d47ba826c8d667c0d1e6e33a64a036ec44f58fa12d6c45"
        );
        assert!(hash_file(&file.path().with_extension("missing")).await.is_err());
    }
}
