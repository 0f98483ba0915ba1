//! Formkit CLI - Validate, combine and export two-row schema CSV files
//!
//! # CSV Commands
//!
//! ```bash
//! formkit parse export.csv                 # Parse CSV to JSON
//! formkit validate a.csv b.csv             # Validate against the schema row
//! formkit combine a.csv b.csv -o all.csv   # Merge exports of the same template
//! ```
//!
//! # Form Logic Commands
//!
//! ```bash
//! formkit visible  --template t.json --data d.json
//! formkit progress --template t.json --data d.json --visited about,pets
//! formkit nullify  --template t.json --data d.json
//! formkit export   --template t.json --data d.json -o record.csv
//! formkit integrity --template t.json --data d.json --csv record.csv
//! ```
//!
//! Set `RUST_LOG=debug` for verbose logging.

use clap::{Parser, Subcommand};
use formkit::{
    calculate_progress, check_integrity, combine_csvs_with, decode_bytes, export_records, load_form_data,
    parse_table_with, update_conditional_fields_as_null, validate_csv_with, visible_fields, visible_sections,
    CliResult, CsvOptions, ExportRecord, Template,
};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "formkit")]
#[command(about = "Conditional form logic and two-row schema CSV tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a CSV file and output JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate CSV files against their schema row
    Validate {
        /// Input CSV files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Print raw validation results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Combine CSV files sharing the same headers and schema
    Combine {
        /// Input CSV files (the first one is the reference)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List visible sections and fields
    Visible {
        #[command(flatten)]
        form: FormArgs,
    },

    /// Compute completion percentage
    Progress {
        #[command(flatten)]
        form: FormArgs,

        /// Visited section ids (comma separated)
        #[arg(long, value_delimiter = ',')]
        visited: Vec<String>,

        /// Section ids marked not applicable (comma separated)
        #[arg(long, value_delimiter = ',')]
        na: Vec<String>,

        /// Treat every section as visited
        #[arg(long, conflicts_with = "visited")]
        all: bool,
    },

    /// Null out hidden conditional fields
    Nullify {
        #[command(flatten)]
        form: FormArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export form data as a submitted record
    Export {
        #[command(flatten)]
        form: FormArgs,

        /// Keep values of hidden conditional fields
        #[arg(long)]
        preserve: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check an exported CSV against its template and source data
    Integrity {
        #[command(flatten)]
        form: FormArgs,

        /// Exported CSV file
        #[arg(short, long)]
        csv: PathBuf,
    },
}

#[derive(clap::Args)]
struct FormArgs {
    /// Template JSON file
    #[arg(short, long)]
    template: PathBuf,

    /// Form data JSON file
    #[arg(short, long)]
    data: PathBuf,
}

impl FormArgs {
    fn load(&self) -> CliResult<(Template, formkit::FormData)> {
        let template = Template::from_file(&self.template)?;
        let data = load_form_data(&self.data)?;
        Ok((template, data))
    }
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = CsvOptions::from_env();

    let result = match cli.command {
        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref(), &options),

        Commands::Validate { inputs, json } => cmd_validate(&inputs, json, &options),

        Commands::Combine { inputs, output } => cmd_combine(&inputs, output.as_deref(), &options),

        Commands::Visible { form } => cmd_visible(&form),

        Commands::Progress {
            form,
            visited,
            na,
            all,
        } => cmd_progress(&form, &visited, &na, all),

        Commands::Nullify { form, output } => cmd_nullify(&form, output.as_deref()),

        Commands::Export {
            form,
            preserve,
            output,
        } => cmd_export(&form, preserve, output.as_deref()),

        Commands::Integrity { form, csv } => cmd_integrity(&form, &csv),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Read a CSV file with encoding detection.
fn read_csv(path: &Path) -> CliResult<String> {
    let bytes = fs::read(path)?;
    Ok(decode_bytes(&bytes))
}

fn cmd_parse(input: &Path, output: Option<&Path>, options: &CsvOptions) -> CliResult<bool> {
    eprintln!("📄 Parsing CSV: {}", input.display());

    let table = parse_table_with(&read_csv(input)?, options)?;
    eprintln!("   Columns: {}", table.headers.join(", "));
    eprintln!("✅ Parsed {} rows", table.row_count());

    let json = serde_json::to_string_pretty(&table)?;
    write_output(&json, output)?;
    Ok(true)
}

fn cmd_validate(inputs: &[PathBuf], as_json: bool, options: &CsvOptions) -> CliResult<bool> {
    let mut all_valid = true;
    let mut reports = Vec::new();

    for input in inputs {
        let result = validate_csv_with(&read_csv(input)?, options);
        all_valid &= result.is_valid;

        if as_json {
            reports.push(json!({ "file": input.display().to_string(), "result": result }));
            continue;
        }

        eprintln!("✔️  Validating: {}", input.display());
        eprintln!("   Columns: {}, rows: {}", result.column_count, result.row_count);
        for err in result.errors.iter().take(10) {
            eprintln!("   ❌ {}", err);
        }
        if result.errors.len() > 10 {
            eprintln!("   ... and {} more errors", result.errors.len() - 10);
        }
        for warning in result.warnings.iter().take(10) {
            eprintln!("   ⚠️  {}", warning);
        }
        if result.warnings.len() > 10 {
            eprintln!("   ... and {} more warnings", result.warnings.len() - 10);
        }
        if result.is_valid {
            eprintln!("   ✅ Valid ({} warnings)", result.warnings.len());
        }
    }

    if as_json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    Ok(all_valid)
}

fn cmd_combine(inputs: &[PathBuf], output: Option<&Path>, options: &CsvOptions) -> CliResult<bool> {
    eprintln!("📦 Combining {} files", inputs.len());

    let contents = inputs.iter().map(|p| read_csv(p)).collect::<CliResult<Vec<String>>>()?;
    let names: Vec<String> = inputs
        .iter()
        .map(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| p.display().to_string())
        })
        .collect();

    let combined = combine_csvs_with(&contents, Some(names.as_slice()), options)?;
    write_output(&combined, output)?;
    Ok(true)
}

fn cmd_visible(form: &FormArgs) -> CliResult<bool> {
    let (template, data) = form.load()?;

    let sections: Vec<_> = visible_sections(&template.sections, &data)
        .into_iter()
        .map(|section| {
            let fields: Vec<&str> = visible_fields(&section.fields, &data)
                .into_iter()
                .map(|f| f.id.as_str())
                .collect();
            json!({ "section": section.id, "fields": fields })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&sections)?);
    Ok(true)
}

fn cmd_progress(form: &FormArgs, visited: &[String], na: &[String], all: bool) -> CliResult<bool> {
    let (template, data) = form.load()?;

    let visited: Vec<String> = if all {
        template.sections.iter().map(|s| s.id.clone()).collect()
    } else {
        visited.to_vec()
    };

    let percent = calculate_progress(&template.sections, &data, &visited, na);
    println!("{}", percent);
    Ok(true)
}

fn cmd_nullify(form: &FormArgs, output: Option<&Path>) -> CliResult<bool> {
    let (template, data) = form.load()?;

    let updated = update_conditional_fields_as_null(&template.sections, &data);
    let nulled = updated
        .iter()
        .filter(|(key, value)| value.is_null() && data.get(*key).map_or(true, |v| !v.is_null()))
        .count();
    eprintln!("🧹 Nulled {} hidden fields", nulled);

    write_output(&serde_json::to_string_pretty(&updated)?, output)?;
    Ok(true)
}

fn cmd_export(form: &FormArgs, preserve: bool, output: Option<&Path>) -> CliResult<bool> {
    let (template, data) = form.load()?;

    let record = ExportRecord::submitted(data);
    eprintln!("📤 Exporting record {} for template '{}'", record.id, template.name);

    let csv = export_records(&template, &[record], preserve)?;
    write_output(&csv, output)?;
    Ok(true)
}

fn cmd_integrity(form: &FormArgs, csv: &Path) -> CliResult<bool> {
    let (template, data) = form.load()?;

    eprintln!("🔍 Checking integrity: {}", csv.display());
    let result = check_integrity(&template, &data, &read_csv(csv)?);

    let summary = &result.summary;
    eprintln!(
        "   Completeness: {}, accuracy: {}, integrity: {}",
        summary.completeness_score, summary.accuracy_score, summary.integrity_score
    );
    if result.is_valid {
        eprintln!("✅ Overall score {}", summary.overall_score);
    } else {
        eprintln!("❌ Overall score {}", summary.overall_score);
    }

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(result.is_valid)
}

fn write_output(content: &str, path: Option<&Path>) -> CliResult<()> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
