use std::io::Write;
use std::path::Path;

use artsync_core::TransferReport;

pub fn print_banner() {
    println!("{}", "=".repeat(50));
    println!("Artifact Sync");
    println!("{}", "=".repeat(50));
}

/// Print per-item failures collected during a pass.
pub fn print_failures(report: &TransferReport) {
    if report.failed.is_empty() {
        return;
    }
    println!("{} item(s) failed:", report.failed.len());
    for failure in &report.failed {
        println!("  - {}: {}", failure.key, failure.error);
    }
}

/// Final line for a pass, worded by outcome.
///
/// `verb` is `Upload` or `Download`; `direction` is `to` or `from`.
pub fn summary_line(verb: &str, direction: &str, report: &TransferReport) -> String {
    match report.failed.len() {
        0 => format!("{verb} completed successfully {direction}: {}", report.location),
        n if report.transferred == 0 => {
            format!("{verb} failed for all {n} file(s) {direction}: {}", report.location)
        }
        n => format!("{verb} completed with {n} failure(s) {direction}: {}", report.location),
    }
}

/// Append a `key=value` line to a CI step-output file.
pub fn write_ci_output(path: &Path, key: &str, value: &str) -> std::io::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    writeln!(file, "{key}={value}")
}

#[cfg(test)]
mod tests {
    use super::{summary_line, write_ci_output};
    use artsync_core::{TransferFailure, TransferReport};

    fn report(transferred: usize, failed: usize) -> TransferReport {
        TransferReport {
            location: "artifacts/app/main/SHA-abcdef1".to_string(),
            transferred,
            failed: (0..failed)
                .map(|i| TransferFailure {
                    key: format!("k{i}"),
                    error: "boom".to_string(),
                })
                .collect(),
            skipped: 0,
        }
    }

    #[test]
    fn summary_reports_success_only_without_failures() {
        assert_eq!(
            summary_line("Upload", "to", &report(3, 0)),
            "Upload completed successfully to: artifacts/app/main/SHA-abcdef1"
        );
        assert_eq!(
            summary_line("Download", "from", &report(2, 1)),
            "Download completed with 1 failure(s) from: artifacts/app/main/SHA-abcdef1"
        );
        assert_eq!(
            summary_line("Upload", "to", &report(0, 2)),
            "Upload failed for all 2 file(s) to: artifacts/app/main/SHA-abcdef1"
        );
    }

    #[test]
    fn ci_output_appends_lines() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("github_output");
        std::fs::write(&path, "existing=1\n").expect("seed output file");

        write_ci_output(&path, "artifact_path", "artifacts/app/main/SHA-abcdef1")
            .expect("write output");

        let body = std::fs::read_to_string(&path).expect("read output");
        assert_eq!(
            body,
            "existing=1\nartifact_path=artifacts/app/main/SHA-abcdef1\n"
        );
    }
}
