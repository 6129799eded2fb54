//! `check`: report which targets of a download script exist.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use datamirror_core::verify::{Target, VerifyReport, verify_script};

use crate::ProcessExit;
use crate::app::config::FileConfig;
use crate::app::{exit_handler, settings};
use crate::cli::CheckArgs;

pub(crate) fn run_check(args: &CheckArgs, file_config: Option<&FileConfig>) -> Result<ProcessExit> {
    let include = settings::include_prefixes(&args.include_prefix, file_config);
    let report = verify_script(&args.script, args.data_dir.as_deref(), &include)?;

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("failed to encode report")?;
        println!("{json}");
    } else {
        print!("{}", format_report(&report, args.show_existing));
    }
    Ok(exit_handler::outcome_for_check(&report))
}

fn target_line(out: &mut String, target: &Target) {
    let _ = writeln!(
        out,
        "{} -> {}",
        target.relative.as_str(),
        target.absolute.display()
    );
}

/// Plain-text report in script order.
pub(crate) fn format_report(report: &VerifyReport, show_existing: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "DATA_DIR: {}", report.data_root.display());
    let _ = writeln!(out, "Total unique targets: {}", report.total);
    let _ = writeln!(
        out,
        "Existing: {}  |  Missing: {}",
        report.existing_count, report.missing_count
    );

    if !report.missing.is_empty() {
        out.push_str("\n--- Missing files (relative -> absolute) ---\n");
        for target in &report.missing {
            target_line(&mut out, target);
        }
    }

    match &report.last_existing {
        Some(last) => {
            out.push_str("\n--- Last existing (by script order) ---\n");
            let _ = writeln!(out, "{}", last.relative.as_str());
            let _ = writeln!(out, "{}", last.absolute.display());
            if show_existing {
                out.push_str("\n--- All existing (in script order) ---\n");
                for target in &report.existing {
                    target_line(&mut out, target);
                }
            }
        }
        None => out.push_str("\nNo existing targets found.\n"),
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::Path;

    use datamirror_core::layout::{IncludePrefixes, LayoutConfig};
    use datamirror_core::verify::check_targets;
    use tempfile::TempDir;

    use super::*;

    fn report_with(present: &[&str], tokens: &[&str]) -> (TempDir, VerifyReport) {
        let dir = TempDir::new().unwrap();
        for rel in present {
            let path = dir.path().join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, b"x").unwrap();
        }
        let layout = LayoutConfig::new(dir.path(), "", IncludePrefixes::default());
        let tokens: Vec<String> = tokens.iter().map(|t| (*t).to_string()).collect();
        let report = check_targets(&tokens, &layout).unwrap();
        (dir, report)
    }

    #[test]
    fn test_format_lists_missing_and_last_existing() {
        let (dir, report) = report_with(&["a", "c"], &["$DATA_DIR/a", "$DATA_DIR/b", "$DATA_DIR/c"]);
        let text = format_report(&report, false);

        assert!(text.starts_with(&format!("DATA_DIR: {}\n", dir.path().display())));
        assert!(text.contains("Total unique targets: 3\n"));
        assert!(text.contains("Existing: 2  |  Missing: 1\n"));
        assert!(text.contains(&format!("b -> {}\n", dir.path().join("b").display())));
        assert!(text.contains(&format!(
            "--- Last existing (by script order) ---\nc\n{}\n",
            dir.path().join("c").display()
        )));
        assert!(!text.contains("All existing"));
    }

    #[test]
    fn test_format_show_existing_lists_all() {
        let (_dir, report) = report_with(&["a", "c"], &["$DATA_DIR/a", "$DATA_DIR/c"]);
        let text = format_report(&report, true);
        let section = text.split("--- All existing (in script order) ---\n").nth(1).unwrap();
        let rels: Vec<&str> = section
            .lines()
            .map(|line| line.split(" -> ").next().unwrap())
            .collect();
        assert_eq!(rels, vec!["a", "c"]);
        assert!(!text.contains("Missing files"));
    }

    #[test]
    fn test_format_without_existing_targets() {
        let (_dir, report) = report_with(&[], &["$DATA_DIR/a"]);
        let text = format_report(&report, true);
        assert!(text.ends_with("\nNo existing targets found.\n"));
        assert!(!text.contains("All existing"));
        assert!(Path::new(&report.missing[0].absolute).ends_with("a"));
    }
}
