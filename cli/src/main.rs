//! docxfill CLI - DOCX template filling tool

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{json, Value};

use docxfill::output::{sanitize_prefix, DEFAULT_PREFIX};
use docxfill::{Docxfill, FieldMap, OutputDir, RewritePolicy, Template};

type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "docxfill")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Fill {{placeholder}} fields in DOCX templates", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the placeholder fields of a template
    Fields {
        #[command(flatten)]
        template: TemplateArgs,

        /// Print fields as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show which fields the supplied data would fill
    Preview {
        #[command(flatten)]
        template: TemplateArgs,

        #[command(flatten)]
        data: DataArgs,

        /// Print the preview as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fill a template and write the result
    #[command(alias = "gen")]
    Generate {
        #[command(flatten)]
        template: TemplateArgs,

        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// Write the document even if nothing was replaced
        #[arg(long)]
        allow_empty: bool,
    },

    /// Fill a template once per record of a JSON array
    Batch {
        #[command(flatten)]
        template: TemplateArgs,

        /// JSON file holding an array of field objects
        #[arg(long, value_name = "PATH")]
        data_file: PathBuf,

        #[command(flatten)]
        output: OutputArgs,

        /// Write documents even if nothing was replaced
        #[arg(long)]
        allow_empty: bool,
    },

    /// List previously generated documents, newest first
    History {
        /// Output directory
        #[arg(short, long, value_name = "DIR", env = "DOCXFILL_OUTPUT_DIR", default_value = "generated")]
        output_dir: PathBuf,

        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show template and environment information
    Info {
        #[command(flatten)]
        template: TemplateArgs,

        /// Output directory
        #[arg(short, long, value_name = "DIR", env = "DOCXFILL_OUTPUT_DIR", default_value = "generated")]
        output_dir: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
struct TemplateArgs {
    /// Template DOCX file
    #[arg(value_name = "TEMPLATE", env = "DOCXFILL_TEMPLATE")]
    path: PathBuf,

    /// Skip broken header/footer parts instead of failing
    #[arg(long)]
    lenient: bool,

    /// How rewritten paragraphs keep their runs
    #[arg(long, value_enum, default_value = "preserve")]
    policy: Policy,
}

impl TemplateArgs {
    fn load(&self) -> CliResult<Template> {
        let mut builder = Docxfill::new().with_policy(self.policy.into());
        if self.lenient {
            builder = builder.lenient();
        }
        Ok(builder.load(&self.path)?)
    }
}

#[derive(Args)]
struct DataArgs {
    /// Field values as a JSON object
    #[arg(short, long, value_name = "JSON", conflicts_with = "data_file")]
    data: Option<String>,

    /// JSON file holding the field values
    #[arg(long, value_name = "PATH")]
    data_file: Option<PathBuf>,
}

impl DataArgs {
    fn load(&self) -> CliResult<FieldMap> {
        load_fields(self.data.as_deref(), self.data_file.as_deref())
    }
}

#[derive(Args)]
struct OutputArgs {
    /// Output directory
    #[arg(short, long, value_name = "DIR", env = "DOCXFILL_OUTPUT_DIR", default_value = "generated")]
    output_dir: PathBuf,

    /// File name prefix
    #[arg(long)]
    prefix: Option<String>,

    /// Field whose value names the file when no prefix is given
    #[arg(long, default_value = "name")]
    name_field: String,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Policy {
    /// Keep run formatting outside replaced placeholders
    Preserve,
    /// Move each rewritten paragraph into its first run
    Collapse,
}

impl From<Policy> for RewritePolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Preserve => RewritePolicy::PreserveRuns,
            Policy::Collapse => RewritePolicy::Collapse,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Fields { template, json }) => cmd_fields(&template, json),
        Some(Commands::Preview {
            template,
            data,
            json,
        }) => cmd_preview(&template, &data, json),
        Some(Commands::Generate {
            template,
            data,
            output,
            allow_empty,
        }) => cmd_generate(&template, &data, &output, allow_empty),
        Some(Commands::Batch {
            template,
            data_file,
            output,
            allow_empty,
        }) => cmd_batch(&template, &data_file, &output, allow_empty),
        Some(Commands::History { output_dir, json }) => cmd_history(&output_dir, json),
        Some(Commands::Info {
            template,
            output_dir,
        }) => cmd_info(&template, &output_dir),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!("{}", "Usage: docxfill <COMMAND> <TEMPLATE> [OPTIONS]".yellow());
            println!("       docxfill --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Read field data from an inline JSON string or a JSON file.
fn load_fields(data: Option<&str>, data_file: Option<&Path>) -> CliResult<FieldMap> {
    if let Some(json) = data {
        return Ok(FieldMap::from_json(json)?);
    }
    if let Some(path) = data_file {
        let reader = BufReader::new(File::open(path)?);
        return Ok(FieldMap::from_json_reader(reader)?);
    }
    Ok(FieldMap::new())
}

/// Read batch records: a JSON array of objects, or a single object.
fn load_records(path: &Path) -> CliResult<Vec<FieldMap>> {
    let value: Value = serde_json::from_reader(BufReader::new(File::open(path)?))?;
    let records = match value {
        Value::Array(items) => items
            .into_iter()
            .map(FieldMap::from_json_value)
            .collect::<docxfill::Result<Vec<_>>>()?,
        other => vec![FieldMap::from_json_value(other)?],
    };
    Ok(records)
}

/// File name prefix: explicit prefix, else the name field's value, else the default.
fn resolve_prefix(prefix: Option<&str>, fields: &FieldMap, name_field: &str) -> String {
    let raw = prefix
        .or_else(|| fields.get(name_field))
        .filter(|p| !p.trim().is_empty())
        .unwrap_or(DEFAULT_PREFIX);
    sanitize_prefix(raw)
}

fn cmd_fields(args: &TemplateArgs, json: bool) -> CliResult {
    let template = args.load()?;
    let fields = template.fields();

    if json {
        let report = json!({
            "template": args.path.display().to_string(),
            "total": fields.len(),
            "fields": fields,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if fields.is_empty() {
        println!("{}", "No placeholder fields found".yellow());
        return Ok(());
    }

    println!("{} ({})", "Template Fields".cyan().bold(), fields.len());
    println!("{}", "─".repeat(40).dimmed());
    for name in fields {
        println!("  {{{{{}}}}}", name);
    }

    Ok(())
}

fn cmd_preview(args: &TemplateArgs, data: &DataArgs, json: bool) -> CliResult {
    let template = args.load()?;
    let fields = data.load()?;
    let preview = template.preview(&fields);

    if json {
        println!("{}", serde_json::to_string_pretty(&preview)?);
        return Ok(());
    }

    println!("{}", "Replacement Preview".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for status in &preview.fields {
        match status.value {
            Some(ref value) => println!("  {} {{{{{}}}}} → {}", "✓".green(), status.name, value),
            None => println!(
                "  {} {{{{{}}}}} → {}",
                "✗".red(),
                status.name,
                "(no value)".dimmed()
            ),
        }
    }

    if !preview.unknown_keys.is_empty() {
        println!();
        println!("{}", "Unused data keys".yellow().bold());
        for key in &preview.unknown_keys {
            println!("  {} {}", "•".dimmed(), key);
        }
    }

    println!();
    println!(
        "{}: {}/{} fields matched",
        "Summary".bold(),
        preview.matched_count(),
        preview.total_fields()
    );

    Ok(())
}

fn cmd_generate(
    args: &TemplateArgs,
    data: &DataArgs,
    output: &OutputArgs,
    allow_empty: bool,
) -> CliResult {
    let template = args.load()?;
    let fields = data.load()?;

    let generated = template.generate(&fields)?;
    if generated.is_unchanged() && !allow_empty {
        return Err("no placeholder was replaced; not writing an unchanged document (use --allow-empty)".into());
    }

    let prefix = resolve_prefix(output.prefix.as_deref(), &fields, &output.name_field);
    let path = OutputDir::new(&output.output_dir).write(&prefix, &generated.bytes)?;

    println!("{} {}", "Saved to".green(), path.display());
    println!(
        "{}: {} ({})",
        "Replacements".bold(),
        generated.replacements,
        generated.replaced_fields.join(", ")
    );

    let preview = template.preview(&fields);
    let missing: Vec<&str> = preview.unmatched().collect();
    if !missing.is_empty() {
        println!("{}: {}", "Unfilled fields".yellow(), missing.join(", "));
    }

    Ok(())
}

fn cmd_batch(
    args: &TemplateArgs,
    data_file: &Path,
    output: &OutputArgs,
    allow_empty: bool,
) -> CliResult {
    let template = args.load()?;
    let records = load_records(data_file)?;
    let out = OutputDir::new(&output.output_dir);

    let pb = ProgressBar::new(records.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    pb.set_message("Generating...");

    let results = template.generate_batch(&records);

    let mut written = 0;
    let mut failures = Vec::new();
    for (index, (fields, result)) in records.iter().zip(results).enumerate() {
        match result {
            Ok(generated) if generated.is_unchanged() && !allow_empty => {
                failures.push(format!("record {}: no placeholder was replaced", index + 1));
            }
            Ok(generated) => {
                let prefix = resolve_prefix(output.prefix.as_deref(), fields, &output.name_field);
                out.write(&prefix, &generated.bytes)?;
                written += 1;
            }
            Err(e) => failures.push(format!("record {}: {}", index + 1, e)),
        }
        pb.inc(1);
    }
    pb.finish_with_message("Done!");

    println!(
        "\n{} {} of {} documents written to {}",
        "Done!".green().bold(),
        written,
        records.len(),
        out.path().display()
    );
    for failure in &failures {
        println!("  {} {}", "✗".red(), failure);
    }

    if written == 0 && !records.is_empty() {
        return Err("no document was generated".into());
    }
    Ok(())
}

fn cmd_history(output_dir: &Path, json: bool) -> CliResult {
    let files = OutputDir::new(output_dir).list()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&files)?);
        return Ok(());
    }

    if files.is_empty() {
        println!("{} {}", "No generated documents in".yellow(), output_dir.display());
        return Ok(());
    }

    println!("{} ({})", "Generated Documents".cyan().bold(), files.len());
    println!("{}", "─".repeat(40).dimmed());
    for file in &files {
        println!(
            "  {}  {:>10}  {}",
            file.modified.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
            format_size(file.size),
            file.name
        );
    }

    Ok(())
}

fn cmd_info(args: &TemplateArgs, output_dir: &Path) -> CliResult {
    let template = args.load()?;
    let doc = template.document();
    let size = fs::metadata(&args.path)?.len();
    let format = docxfill::detect_format_from_path(&args.path)?;

    println!("{}", "Template Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), args.path.display());
    println!("{}: {}", "Size".bold(), format_size(size));
    println!("{}: {}", "Archive entries".bold(), format.entry_count);
    println!("{}: {}", "Main part".bold(), doc.main_part().name);
    println!("{}: {}", "Text parts".bold(), doc.parts.len());
    println!("{}: {}", "Sections".bold(), doc.sections.len());
    println!("{}: {}", "Tables".bold(), doc.table_count());
    println!("{}: {}", "Regions".bold(), doc.region_count());
    println!("{}: {}", "Fields".bold(), template.fields().len());

    println!();
    println!("{}", "Output".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let out = OutputDir::new(output_dir);
    println!("{}: {}", "Directory".bold(), out.path().display());
    println!(
        "{}: {}",
        "Exists".bold(),
        if out.path().is_dir() { "Yes" } else { "No" }
    );
    println!("{}: {}", "Generated files".bold(), out.list()?.len());

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "docxfill".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("DOCX template filling tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/docxfill".dimmed());
    println!("License: MIT");
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
