use anyhow::Result;
use artsync_core::{TransferReport, TransferRequest};
use artsync_git_native::{resolve_prefix, ResolveOptions};
use artsync_s3::S3Store;

use crate::output::{print_failures, summary_line};

/// Push the request's source below the resolved prefix.
pub async fn run_upload(request: &TransferRequest, resolve: &ResolveOptions) -> Result<TransferReport> {
    println!("\nStarting upload operation...");

    let prefix = resolve_prefix(request.use_git, request.remote_base(), resolve);
    let store = S3Store::from_request(request).await;
    let report = artsync_core::upload(&store, &request.bucket, request.local_path(), &prefix).await?;

    print_failures(&report);
    println!("Uploaded {} of {} file(s)", report.transferred, report.attempted());
    println!("\n{}", summary_line("Upload", "to", &report));
    Ok(report)
}
