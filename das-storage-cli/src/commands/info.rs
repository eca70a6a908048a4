use anyhow::{Context as AnyhowContext, Result};

use super::Context;
use crate::output::{BackendInfo, print_report};

pub async fn run(ctx: &Context) -> Result<()> {
    let storage = ctx.open_storage().await?;
    let request = ctx.request();
    let expiration_policy = storage.expiration_policy(&request);
    storage.close(&request).await.context("Failed to close storage")?;

    print_report(
        &BackendInfo {
            backend: storage.to_string(),
            expiration_policy,
        },
        ctx.json_output,
    )
}
