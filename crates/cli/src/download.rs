use anyhow::Result;
use artsync_core::{TransferReport, TransferRequest};
use artsync_git_native::{resolve_prefix, ResolveOptions};
use artsync_s3::S3Store;

use crate::output::{print_failures, summary_line};

/// Pull everything below the resolved prefix into the request's destination.
pub async fn run_download(
    request: &TransferRequest,
    resolve: &ResolveOptions,
) -> Result<TransferReport> {
    println!("\nStarting download operation...");

    let prefix = resolve_prefix(request.use_git, request.remote_base(), resolve);
    let store = S3Store::from_request(request).await;
    let report =
        artsync_core::download(&store, &request.bucket, &prefix, request.local_path()).await?;

    if report.matched() == 0 {
        println!("No files found under: {}", report.location);
        return Ok(report);
    }
    if report.attempted() == 0 {
        println!(
            "No downloadable files under: {} ({} key(s) skipped)",
            report.location, report.skipped
        );
        return Ok(report);
    }

    print_failures(&report);
    println!(
        "Downloaded {} of {} file(s) to {}",
        report.transferred,
        report.attempted(),
        request.local_path().display()
    );
    if report.skipped > 0 {
        println!("Skipped {} key(s) with no usable local path", report.skipped);
    }
    println!("\n{}", summary_line("Download", "from", &report));
    Ok(report)
}
