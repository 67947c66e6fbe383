//! CLI application logic
//!
//! Contains the command-line interface implementation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use swmsgen_model::{Controls, PlanFile, RowSource, TaskLibrary, Vocabulary};
use swmsgen_ooxml::{
    build_document, bulletize, control_summary, BuildReport, BulletizeReport, DocxArchive,
};
use swmsgen_validate::{table_name, validate_archive, Violation};
use swmsgen_xlsx::{write_register_file, RegisterConfig, RiskEntry};

/// Output format for validation reports
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for CI/CD integration
    Json,
}

#[derive(Parser)]
#[command(name = "swmsgen")]
#[command(author, version, about = "SWMS document generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an SWMS document from a template and a plan
    Build {
        /// Template DOCX file
        #[arg(short, long)]
        template: PathBuf,

        /// Plan TOML file (plan, tasks, specs)
        #[arg(short, long)]
        plan: PathBuf,

        /// Output DOCX file (default: plan file with .docx extension)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Vocabulary TOML overriding the builtin resource
        #[arg(long)]
        vocab: Option<PathBuf>,
    },

    /// Write the risk-register workbook
    Register {
        /// Register config TOML file
        #[arg(short, long)]
        config: PathBuf,

        /// Output XLSX file
        #[arg(short, long)]
        out: PathBuf,

        /// Plan TOML whose task definitions are appended as register rows
        #[arg(long)]
        plan: Option<PathBuf>,

        /// Vocabulary TOML overriding the builtin resource
        #[arg(long)]
        vocab: Option<PathBuf>,
    },

    /// Convert consolidated-summary control cells to bullet lists
    Bulletize {
        /// Input DOCX file
        input: PathBuf,

        /// Output DOCX file (default: rewrite the input in place)
        output: Option<PathBuf>,
    },

    /// Run the PPE gate over a finished document
    Validate {
        /// Input DOCX file
        input: PathBuf,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            template,
            plan,
            out,
            vocab,
        } => {
            build_command(&template, &plan, out.as_deref(), vocab.as_deref())?;
        }
        Commands::Register {
            config,
            out,
            plan,
            vocab,
        } => {
            register_command(&config, &out, plan.as_deref(), vocab.as_deref())?;
        }
        Commands::Bulletize { input, output } => {
            bulletize_command(&input, output.as_deref())?;
        }
        Commands::Validate { input, format } => {
            let violations = validate_command(&input, format)?;
            if !violations.is_empty() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn load_vocabulary(path: Option<&Path>) -> Result<Vocabulary> {
    match path {
        Some(p) => Vocabulary::from_path(p)
            .with_context(|| format!("Failed to load vocabulary: {}", p.display())),
        None => Ok(Vocabulary::builtin()),
    }
}

/// Execute the build command
pub fn build_command(
    template: &Path,
    plan_path: &Path,
    out: Option<&Path>,
    vocab_path: Option<&Path>,
) -> Result<BuildReport> {
    println!("swmsgen v{}", crate::VERSION);
    println!("Building from: {}", template.display());

    if !template.exists() {
        anyhow::bail!("Template file not found: {}", template.display());
    }

    let plan_file = PlanFile::load(plan_path)
        .with_context(|| format!("Failed to load plan: {}", plan_path.display()))?;
    let vocab = load_vocabulary(vocab_path)?;
    let (library, raw_phrases) = plan_file
        .task_library(&vocab)
        .context("Failed to resolve task definitions")?;

    for phrase in &raw_phrases {
        println!("  note: control phrase bypasses the vocabulary: \"{phrase}\"");
    }

    let plan = &plan_file.plan;
    println!("  Plan: {} ({} rows)", plan.title, plan.rows.len());
    for (index, source) in plan.rows.iter().enumerate() {
        match source {
            RowSource::Reuse(row) => {
                println!("  row {}: reuse template row {row}", index + 1);
            }
            RowSource::New(key) => {
                let task = library.get(key)?;
                println!("  row {}: {} [{}]", index + 1, task.name, task.code);
            }
        }
    }

    let mut archive = DocxArchive::open(template)
        .with_context(|| format!("Failed to open template: {}", template.display()))?;
    let report = build_document(&mut archive, plan, &library)
        .context("Failed to build document")?;

    let out_path = match out {
        Some(p) => p.to_path_buf(),
        None if !plan.output.is_empty() => plan_path.with_file_name(&plan.output),
        None => plan_path.with_extension("docx"),
    };
    archive
        .write_to_file(&out_path)
        .with_context(|| format!("Failed to write output: {}", out_path.display()))?;

    println!();
    println!("Build complete: {}", out_path.display());
    println!(
        "  {} rows reused, {} rows built, {} list pairs allocated",
        report.rows_reused, report.rows_built, report.pairs_allocated
    );
    println!(
        "  {} checkboxes ticked, {} hold-point paragraphs renumbered, {} PPE texts updated",
        report.checkboxes_ticked, report.hold_points_renumbered, report.ppe_texts_changed
    );
    println!(
        "  {} level texts fixed, {} dashes bolded, {} labels bolded, {} fonts standardised",
        report.level_texts_fixed,
        report.em_dashes_bolded,
        report.labels_bolded,
        report.fonts_standardised
    );

    Ok(report)
}

/// Execute the register command
pub fn register_command(
    config_path: &Path,
    out: &Path,
    plan_path: Option<&Path>,
    vocab_path: Option<&Path>,
) -> Result<usize> {
    println!("swmsgen v{}", crate::VERSION);
    println!("Register config: {}", config_path.display());

    let mut config = RegisterConfig::load(config_path)
        .with_context(|| format!("Failed to load register config: {}", config_path.display()))?;

    if let Some(plan_path) = plan_path {
        let plan_file = PlanFile::load(plan_path)
            .with_context(|| format!("Failed to load plan: {}", plan_path.display()))?;
        let vocab = load_vocabulary(vocab_path)?;
        let (library, _) = plan_file
            .task_library(&vocab)
            .context("Failed to resolve task definitions")?;
        let derived = derive_entries(&plan_file, &library, config.risks.len())?;
        println!("  {} rows derived from plan", derived.len());
        config.risks.extend(derived);
    }

    write_register_file(&config, out)
        .with_context(|| format!("Failed to write workbook: {}", out.display()))?;

    println!();
    println!("Register written: {}", out.display());
    println!(
        "  {} risks, {} hold points",
        config.risks.len(),
        config.all_hold_points().len()
    );

    Ok(config.risks.len())
}

/// Register rows for the plan's synthesized tasks, in plan order. The
/// controls column carries the same summary text as the document's
/// control cell, CCVS marker included for hold-point tasks.
fn derive_entries(
    plan_file: &PlanFile,
    library: &TaskLibrary,
    existing: usize,
) -> Result<Vec<RiskEntry>> {
    let mut seen: Vec<&str> = Vec::new();
    let mut entries = Vec::new();
    for source in &plan_file.plan.rows {
        let RowSource::New(key) = source else {
            continue;
        };
        if seen.contains(&key.as_str()) {
            continue;
        }
        seen.push(key.as_str());
        let task = library.get(key)?;
        let hold_point = match &task.controls {
            Controls::HoldPoint { hold_points, .. } => hold_points.first().cloned(),
            Controls::Standard { .. } => None,
        };
        entries.push(RiskEntry {
            id: (existing + entries.len() + 1).to_string(),
            task: task.name.clone(),
            category: task.code_prefix().to_string(),
            description: task.hazard.clone(),
            likelihood: String::new(),
            consequence: String::new(),
            rating_initial: task.risk_pre,
            rating_residual: task.risk_post,
            controls: control_summary(task),
            hold_point,
            owner: task.responsibility.clone(),
        });
    }
    Ok(entries)
}

/// Execute the bulletize command
pub fn bulletize_command(input: &Path, output: Option<&Path>) -> Result<BulletizeReport> {
    println!("swmsgen v{}", crate::VERSION);
    println!("Bulletizing: {}", input.display());

    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let mut archive = DocxArchive::open(input)
        .with_context(|| format!("Failed to open document: {}", input.display()))?;
    let report = bulletize(&mut archive).context("Failed to convert summary cells")?;

    let out_path = output.unwrap_or(input);
    archive
        .write_to_file(out_path)
        .with_context(|| format!("Failed to write output: {}", out_path.display()))?;

    println!();
    println!("Bulletize complete: {}", out_path.display());
    println!(
        "  {} cells converted, {} bullets written",
        report.cells_converted, report.bullets_written
    );
    if report.created_numbering_part {
        println!("  numbering part created");
    }

    Ok(report)
}

/// Execute the validate command. The caller decides the exit code from
/// the returned violations.
pub fn validate_command(input: &Path, format: OutputFormat) -> Result<Vec<Violation>> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let archive = DocxArchive::open(input)
        .with_context(|| format!("Failed to open document: {}", input.display()))?;
    let outcome = validate_archive(&archive).context("Failed to scan document tables")?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&outcome.violations)
                .context("Failed to serialize violations to JSON")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            println!("swmsgen v{}", crate::VERSION);
            println!("Validating: {}", input.display());
            for note in &outcome.notes {
                println!("  warning: {note}");
            }
            if outcome.passed() {
                println!("PASS: no PPE violations found");
            } else {
                println!();
                for v in &outcome.violations {
                    println!(
                        "  [{}] row {} col {}: {}",
                        table_name(v.table),
                        v.row,
                        v.col,
                        v.detail
                    );
                    println!("      context: ...{}...", v.snippet);
                }
                println!();
                println!("FAIL: {} violation(s)", outcome.violations.len());
            }
        }
    }

    Ok(outcome.violations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_build() {
        let args = vec![
            "swmsgen",
            "build",
            "--template",
            "template.docx",
            "--plan",
            "works.toml",
            "--out",
            "swms.docx",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Build {
                template,
                plan,
                out,
                vocab,
            } => {
                assert_eq!(template, PathBuf::from("template.docx"));
                assert_eq!(plan, PathBuf::from("works.toml"));
                assert_eq!(out, Some(PathBuf::from("swms.docx")));
                assert!(vocab.is_none());
            }
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_cli_parse_build_default_out() {
        let args = vec![
            "swmsgen",
            "build",
            "--template",
            "template.docx",
            "--plan",
            "works.toml",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Build { out, .. } => assert!(out.is_none()),
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_cli_parse_register_with_plan() {
        let args = vec![
            "swmsgen",
            "register",
            "--config",
            "register.toml",
            "--out",
            "register.xlsx",
            "--plan",
            "works.toml",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Register {
                config, out, plan, ..
            } => {
                assert_eq!(config, PathBuf::from("register.toml"));
                assert_eq!(out, PathBuf::from("register.xlsx"));
                assert_eq!(plan, Some(PathBuf::from("works.toml")));
            }
            _ => panic!("Expected Register command"),
        }
    }

    #[test]
    fn test_cli_parse_bulletize_in_place() {
        let args = vec!["swmsgen", "bulletize", "swms.docx"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Bulletize { input, output } => {
                assert_eq!(input, PathBuf::from("swms.docx"));
                assert!(output.is_none());
            }
            _ => panic!("Expected Bulletize command"),
        }
    }

    #[test]
    fn test_cli_parse_validate_json() {
        let args = vec!["swmsgen", "validate", "swms.docx", "--format", "json"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Validate { input, format } => {
                assert_eq!(input, PathBuf::from("swms.docx"));
                assert!(matches!(format, OutputFormat::Json));
            }
            _ => panic!("Expected Validate command"),
        }
    }

    #[test]
    fn test_cli_parse_validate_default_format() {
        let args = vec!["swmsgen", "validate", "swms.docx"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Validate { format, .. } => {
                assert!(matches!(format, OutputFormat::Text));
            }
            _ => panic!("Expected Validate command"),
        }
    }

    #[test]
    fn test_missing_template_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.docx");
        let plan = dir.path().join("plan.toml");
        let err = build_command(&missing, &plan, None, None).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
