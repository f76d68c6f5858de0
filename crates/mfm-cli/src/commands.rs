use std::fs;
use std::io::{self, Write};

use anyhow::Context;
use colored::Colorize;

use mfm_merge::{
    ConflictMode, ManifestMerger, MergeReport, MergerConfig, ReportResult, SystemProperty,
};
use mfm_model::{JsonFileLoader, KeyResolver, NodeKind};
use mfm_types::Severity;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Merge(args) => cmd_merge(&args, cli.format, cli.verbose),
        Command::Kinds => cmd_kinds(cli.format),
    }
}

fn cmd_merge(args: &MergeArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let MergeRun {
        report,
        simple_filenames: simple,
    } = run_merge(args)?;

    if let (Some(path), Some(document)) = (&args.out, report.merged_document()) {
        fs::write(path, document.to_xml())
            .with_context(|| format!("writing {}", path.display()))?;
    }
    if verbose {
        report.log_messages(simple);
    }
    if format == OutputFormat::Text {
        print_messages(&report, simple);
        if args.log {
            eprintln!("{}", report.log().render(simple));
        }
    }
    write_output(&report, format, args.out.is_none(), &mut io::stdout().lock())?;
    if format == OutputFormat::Text {
        print_result(&report);
    }

    if report.result().is_error() {
        let errors = report.messages_of(Severity::Error).count();
        anyhow::bail!("merge failed with {errors} error(s)");
    }
    Ok(())
}

/// A finished merge and how its locations should be printed.
struct MergeRun {
    report: MergeReport,
    simple_filenames: bool,
}

/// Build the merger from the command line and run it against the file system.
fn run_merge(args: &MergeArgs) -> anyhow::Result<MergeRun> {
    let config = merger_config(args)?;
    let simple_filenames = config.print_simple_filenames;
    let mut merger = ManifestMerger::new(args.main.display().to_string()).with_config(config);
    for library in &args.libraries {
        merger = merger.add_library(library.display().to_string());
    }
    for overlay in &args.overlays {
        merger = merger.add_overlay(overlay.display().to_string());
    }
    Ok(MergeRun {
        report: merger.merge(&JsonFileLoader::new())?,
        simple_filenames,
    })
}

/// Write what belongs on stdout: the JSON summary, or the merged XML when
/// it is not going to a file. Diagnostics go to stderr.
fn write_output(
    report: &MergeReport,
    format: OutputFormat,
    with_document: bool,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(&report.summary())?)?;
        }
        OutputFormat::Text => {
            if let Some(document) = report.merged_document().filter(|_| with_document) {
                write!(out, "{}", document.to_xml())?;
            }
        }
    }
    Ok(())
}

/// The configuration file, if any, with command-line settings applied on top.
fn merger_config(args: &MergeArgs) -> anyhow::Result<MergerConfig> {
    let mut config = match &args.config {
        Some(path) => MergerConfig::from_file(path)?,
        None => MergerConfig::default(),
    };
    for entry in &args.overrides {
        let (property, value) = entry
            .split_once('=')
            .with_context(|| format!("override {entry:?} is not PROPERTY=VALUE"))?;
        config = config.with_override(property.parse::<SystemProperty>()?, value);
    }
    if let Some(mode) = args.on_conflict {
        config.on_conflict = match mode {
            OnConflict::Abort => ConflictMode::AbortMerge,
            OnConflict::Skip => ConflictMode::SkipSubtree,
        };
    }
    if args.simple_filenames {
        config.print_simple_filenames = true;
    }
    Ok(config)
}

fn print_messages(report: &MergeReport, simple: bool) {
    for message in report.messages() {
        let label = match message.severity {
            Severity::Error => "error:".red().bold(),
            Severity::Warning => "warning:".yellow().bold(),
            Severity::Info => "info:".dimmed(),
        };
        eprintln!("{label} {}", message.print(simple));
    }
}

fn print_result(report: &MergeReport) {
    match report.result() {
        ReportResult::Success => eprintln!("{} Merge succeeded", "✓".green().bold()),
        ReportResult::Warning => eprintln!(
            "{} Merge succeeded with {} warning(s)",
            "!".yellow().bold(),
            report.messages_of(Severity::Warning).count()
        ),
        ReportResult::Error => eprintln!("{} Merge failed", "✗".red().bold()),
    }
}

fn key_description(kind: NodeKind) -> String {
    match kind.key_resolver() {
        KeyResolver::None => "-".to_string(),
        KeyResolver::Attribute { local, .. } => local.to_string(),
    }
}

fn cmd_kinds(format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let kinds: Vec<_> = NodeKind::ALL
                .iter()
                .map(|kind| {
                    serde_json::json!({
                        "kind": kind.xml_name(),
                        "policy": kind.policy().to_string(),
                        "key": key_description(*kind),
                        "package_dependent": kind.descriptor().package_dependent,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&kinds)?);
        }
        OutputFormat::Text => {
            println!("{:<20} {:<22} {}", "KIND".bold(), "POLICY".bold(), "KEY".bold());
            for kind in NodeKind::ALL {
                println!(
                    "{:<20} {:<22} {}",
                    kind.xml_name().cyan(),
                    kind.policy().to_string(),
                    key_description(kind)
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mfm_model::{RawDocument, RawElement};
    use std::path::{Path, PathBuf};

    fn write(dir: &Path, name: &str, raw: &RawDocument) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, serde_json::to_string(raw).unwrap()).unwrap();
        path
    }

    fn permission(name: &str) -> RawElement {
        RawElement::new("uses-permission").android("name", name)
    }

    #[test]
    fn overrides_and_mode_come_from_flags() {
        let args = MergeArgs {
            overrides: vec!["version-code=42".into(), "min_sdk_version=21".into()],
            on_conflict: Some(OnConflict::Skip),
            ..MergeArgs::default()
        };
        let config = merger_config(&args).unwrap();
        assert_eq!(config.on_conflict, ConflictMode::SkipSubtree);
        assert_eq!(
            config.overrides.get(&SystemProperty::VersionCode).map(String::as_str),
            Some("42")
        );
        assert_eq!(config.overrides.len(), 2);
    }

    #[test]
    fn malformed_override_is_rejected() {
        for entry in ["version_code", "colour=red"] {
            let args = MergeArgs {
                overrides: vec![entry.into()],
                ..MergeArgs::default()
            };
            assert!(merger_config(&args).is_err(), "{entry} should not parse");
        }
    }

    #[test]
    fn config_file_is_overridden_by_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merger.toml");
        fs::write(&path, "on_conflict = \"skip_subtree\"\nkeep_intermediary_stages = true\n").unwrap();
        let args = MergeArgs {
            config: Some(path),
            on_conflict: Some(OnConflict::Abort),
            ..MergeArgs::default()
        };
        let config = merger_config(&args).unwrap();
        assert!(config.keep_intermediary_stages);
        assert_eq!(config.on_conflict, ConflictMode::AbortMerge);
    }

    #[test]
    fn merges_files_and_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let main = write(
            dir.path(),
            "main.json",
            &RawDocument::manifest("main", "com.example").child(permission("a")),
        );
        let lib = write(
            dir.path(),
            "lib.json",
            &RawDocument::manifest("lib", "com.example.lib").child(permission("b")),
        );
        let out = dir.path().join("merged.xml");
        let args = MergeArgs {
            main,
            libraries: vec![lib],
            out: Some(out.clone()),
            ..MergeArgs::default()
        };
        cmd_merge(&args, OutputFormat::Text, false).unwrap();

        let xml = fs::read_to_string(out).unwrap();
        assert!(xml.contains("android:name=\"a\""));
        assert!(xml.contains("android:name=\"b\""));
    }

    #[test]
    fn conflicting_inputs_fail() {
        let dir = tempfile::tempdir().unwrap();
        let sdk = |level: &str| RawElement::new("uses-sdk").android("minSdkVersion", level);
        let main = write(
            dir.path(),
            "main.json",
            &RawDocument::manifest("main", "com.example").child(sdk("21")),
        );
        let lib = write(
            dir.path(),
            "lib.json",
            &RawDocument::manifest("lib", "com.example.lib").child(sdk("24")),
        );
        let args = MergeArgs {
            main,
            libraries: vec![lib],
            ..MergeArgs::default()
        };
        let run = run_merge(&args).unwrap();
        assert_eq!(run.report.result(), ReportResult::Error);
        assert!(cmd_merge(&args, OutputFormat::Json, false).is_err());
    }

    fn labelled_inputs(dir: &Path) -> (PathBuf, PathBuf) {
        let app = |label: &str| RawElement::new("application").android("label", label);
        let main = write(
            dir,
            "main.json",
            &RawDocument::manifest("main", "com.example").child(app("Main")),
        );
        let lib = write(
            dir,
            "lib.json",
            &RawDocument::manifest("lib", "com.example.lib").child(app("Lib")),
        );
        (main, lib)
    }

    #[test]
    fn stdout_carries_only_the_document() {
        let dir = tempfile::tempdir().unwrap();
        let (main, lib) = labelled_inputs(dir.path());
        let args = MergeArgs {
            main,
            libraries: vec![lib],
            ..MergeArgs::default()
        };
        let run = run_merge(&args).unwrap();
        assert_eq!(run.report.result(), ReportResult::Warning);

        let mut out = Vec::new();
        write_output(&run.report, OutputFormat::Text, true, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("<manifest "), "{text}");
        assert!(text.ends_with("</manifest>\n"), "{text}");
        assert!(!text.contains("warning"));

        let mut out = Vec::new();
        write_output(&run.report, OutputFormat::Text, false, &mut out).unwrap();
        assert!(out.is_empty());

        let mut out = Vec::new();
        write_output(&run.report, OutputFormat::Json, true, &mut out).unwrap();
        let summary: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(summary["result"], "warning");
    }

    #[test]
    fn config_file_shortens_locations() {
        let dir = tempfile::tempdir().unwrap();
        let (main, lib) = labelled_inputs(dir.path());
        let config = dir.path().join("merger.toml");
        fs::write(&config, "print_simple_filenames = true\n").unwrap();
        let args = MergeArgs {
            main,
            libraries: vec![lib],
            config: Some(config),
            ..MergeArgs::default()
        };
        let run = run_merge(&args).unwrap();
        assert!(run.simple_filenames);

        let warning = run.report.messages_of(Severity::Warning).next().unwrap();
        let printed = warning.print(run.simple_filenames);
        assert!(printed.starts_with("lib.json:"), "{printed}");

        let full = warning.print(false);
        assert!(full.starts_with(&dir.path().display().to_string()), "{full}");
    }

    #[test]
    fn missing_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = MergeArgs {
            main: dir.path().join("absent.json"),
            ..MergeArgs::default()
        };
        assert!(run_merge(&args).is_err());
    }
}
