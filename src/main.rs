//! ids-editor CLI - inspect, normalize and create IDS documents

use clap::{Parser, Subcommand, ValueEnum};
use glob::glob;
use ids_editor::{
    parse, Document, EditorConfig, EditorSession, Encoder, Rule, ValueExpr,
};
use std::fmt::Write as _;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "ids-editor")]
#[command(about = "Inspect, normalize and create IDS rule documents")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the rules of an IDS file
    Show {
        /// IDS file (or - for stdin)
        file: String,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Re-encode IDS files in canonical layout
    Fmt {
        /// IDS files to format (supports globs, - for stdin)
        #[arg(required = true)]
        files: Vec<String>,

        /// Check if files are formatted (exit 1 if not)
        #[arg(short, long)]
        check: bool,

        /// Write formatted output back to files
        #[arg(short, long)]
        write: bool,

        /// Write to specific file (single input only)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Create an empty IDS document
    New {
        /// Document title
        #[arg(long)]
        title: Option<String>,

        /// Document author
        #[arg(long)]
        author: Option<String>,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match &cli.command {
        Command::Show { file, format } => {
            let source = read_source(file)?;
            let document = parse(&source)?;
            match format {
                OutputFormat::Text => print!("{}", summarize(&document)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&document)?),
            }
            Ok(())
        }
        Command::Fmt {
            files,
            check,
            write,
            output,
        } => {
            let config = build_config(&cli, files.first())?;
            let encoder = Encoder::with_config(config);
            let files = expand_files(files)?;

            tracing::debug!("Processing {} file(s)", files.len());

            let mut needs_formatting = false;
            for file in &files {
                let options = FmtOptions {
                    check: *check,
                    write: *write,
                    output: output.as_deref(),
                };
                match format_one(&encoder, file, &options) {
                    Ok(changed) => needs_formatting |= changed,
                    Err(e) => {
                        eprintln!("Error processing {}: {}", file, e);
                        return Err(e);
                    }
                }
            }

            if *check && needs_formatting {
                return Err("Some files need formatting".into());
            }
            Ok(())
        }
        Command::New {
            title,
            author,
            output,
        } => {
            let config = build_config(&cli, None)?;
            let mut session = EditorSession::new(config);
            if let Some(title) = title {
                session.info_mut().title = title.clone();
            }
            if let Some(author) = author {
                session.info_mut().author = author.clone();
            }

            let xml = session.save();
            match output {
                Some(path) => {
                    fs::write(path, &xml)?;
                    tracing::info!("Wrote {}", path.display());
                }
                None => io::stdout().write_all(xml.as_bytes())?,
            }
            Ok(())
        }
    }
}

fn build_config(
    cli: &Cli,
    first_file: Option<&String>,
) -> Result<EditorConfig, Box<dyn std::error::Error>> {
    if let Some(ref path) = cli.config {
        return Ok(EditorConfig::load(path)?);
    }

    let start_dir = match first_file {
        Some(file) if file != "-" => Path::new(file)
            .parent()
            .map(|p| if p.as_os_str().is_empty() { Path::new(".") } else { p })
            .map(Path::to_path_buf),
        _ => std::env::current_dir().ok(),
    };

    Ok(start_dir
        .and_then(|dir| EditorConfig::find_and_load(&dir))
        .unwrap_or_default())
}

fn expand_files(patterns: &[String]) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let mut files = Vec::new();

    for pattern in patterns {
        if pattern == "-" {
            files.push("-".to_string());
        } else if pattern.contains('*') || pattern.contains('?') {
            for entry in glob(pattern)? {
                files.push(entry?.to_string_lossy().to_string());
            }
        } else {
            files.push(pattern.clone());
        }
    }

    Ok(files)
}

fn read_source(file: &str) -> io::Result<String> {
    if file == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        fs::read_to_string(file)
    }
}

struct FmtOptions<'a> {
    check: bool,
    write: bool,
    output: Option<&'a Path>,
}

/// Re-encode one input; returns whether its text changed
fn format_one(
    encoder: &Encoder,
    file: &str,
    options: &FmtOptions,
) -> Result<bool, Box<dyn std::error::Error>> {
    let source = read_source(file)?;
    let formatted = encoder.encode(&parse(&source)?);
    let changed = source != formatted;

    if options.check {
        if changed {
            tracing::info!("{}: needs formatting", file);
        }
    } else if options.write && file != "-" {
        if changed {
            fs::write(file, &formatted)?;
            tracing::info!("{}: formatted", file);
        }
    } else if let Some(output_path) = options.output {
        fs::write(output_path, &formatted)?;
        tracing::info!("Wrote to {}", output_path.display());
    } else {
        io::stdout().write_all(formatted.as_bytes())?;
    }

    Ok(changed)
}

/// Human-readable outline of a document
fn summarize(document: &Document) -> String {
    let mut out = String::new();
    let info = &document.info;
    let _ = writeln!(out, "{} ({}, {})", info.title, info.version, info.date);

    for (i, spec) in document.specifications.iter().enumerate() {
        let _ = writeln!(
            out,
            "  [{}] {} ({}): {} applicability, {} requirements",
            i + 1,
            spec.name,
            spec.ifc_version,
            spec.applicability.len(),
            spec.requirements.len()
        );
        for rule in spec.applicability.iter().chain(spec.requirements.iter()) {
            let _ = writeln!(out, "      {}", describe_rule(rule));
        }
    }

    out
}

fn describe_rule(rule: &Rule) -> String {
    match rule {
        Rule::Entity(entity) => format!("entity {}", entity.value),
        Rule::Property(property) => {
            let value = match property.value() {
                ValueExpr::Literal(text) => format!("{:?}", text),
                ValueExpr::Enumeration(items) => format!("[{}]", items.join(", ")),
            };
            format!(
                "property {}.{} [{}, {}] {} {}",
                property.property_set,
                property.field,
                property.cardinality,
                property.data_type,
                property.condition().label().to_lowercase(),
                value
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ids_editor::{Cardinality, Condition, EntityRule, PropertyRule, Specification};

    #[test]
    fn test_output_format_from_str() {
        let _text = OutputFormat::from_str("text", true).unwrap();
        let _json = OutputFormat::from_str("json", true).unwrap();
    }

    #[test]
    fn test_summarize() {
        let mut doc = Document::new();
        doc.info.title = "Check".into();
        doc.info.date = "2024-01-02".into();
        let mut spec = Specification::new("Walls");
        spec.applicability.push(EntityRule::new("IfcWall"));
        spec.requirements.push(
            PropertyRule::new("Pset_WallCommon", "IsExternal")
                .with_cardinality(Cardinality::Required)
                .with_value(Condition::StartsWith, ValueExpr::literal("EXT"))
                .unwrap(),
        );
        doc.specifications.push(spec);

        let text = summarize(&doc);
        assert!(text.starts_with("Check (IFC4, 2024-01-02)\n"));
        assert!(text.contains("[1] Walls (IFC4): 1 applicability, 1 requirements"));
        assert!(text.contains("entity IfcWall"));
        assert!(text.contains(
            "property Pset_WallCommon.IsExternal [required, IFCTEXT] starts with \"EXT\""
        ));
    }

    #[test]
    fn test_expand_plain_files() {
        let files = expand_files(&["a.ids".to_string(), "-".to_string()]).unwrap();
        assert_eq!(files, vec!["a.ids".to_string(), "-".to_string()]);
    }
}
