//! OpenWS CLI - tooling for OpenWS spec documents.
//!
//! Commands:
//! - `validate` - Check one or more spec documents
//! - `inspect` - Summarize the methods, notifications, events and schemas of a document

#![forbid(unsafe_code)]

mod config;
mod logger;

use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::json;

use openws_core::logging::{info, targets};
use openws_protocol::load::parse_value;
use openws_protocol::{
    LoadError, MethodSpec, SchemaNode, SpecDocument, SpecFormat, validate_spec_detailed,
};

use crate::config::CliConfig;
use crate::logger::StderrLogger;

/// OpenWS CLI - Validate and inspect OpenWS spec documents.
#[derive(Parser)]
#[command(name = "openws")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log debug output to stderr.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Only log errors.
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate spec documents.
    ///
    /// Every file is checked; problems are listed with the path of the
    /// offending node. Exits non-zero if any document is invalid.
    Validate {
        /// Spec files (.json, .yaml, .yml or .toml).
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Parse every file as this format instead of guessing from the extension.
        #[arg(long)]
        input: Option<SpecFormat>,
    },

    /// Inspect a spec document.
    ///
    /// Lists the methods, notifications, events and named schemas the
    /// document describes.
    Inspect {
        /// Spec file.
        file: PathBuf,

        /// Parse the file as this format instead of guessing from the extension.
        #[arg(long)]
        input: Option<SpecFormat>,

        /// Output format (text, json).
        #[arg(long, short = 'f', default_value = "text")]
        format: InspectFormat,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum InspectFormat {
    Text,
    Json,
}

impl std::str::FromStr for InspectFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {s}. Expected: text, json")),
        }
    }
}

/// Failure of a CLI command.
#[derive(Debug)]
enum CliError {
    /// A document could not be read, parsed or validated.
    Load(PathBuf, LoadError),
    /// `validate` found invalid documents.
    Invalid(usize),
    /// Writing output failed.
    Io(io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Load(path, e) => write!(f, "{}: {e}", path.display()),
            CliError::Invalid(n) => write!(f, "{n} invalid document(s)"),
            CliError::Io(e) => write!(f, "cannot write output: {e}"),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Io(err)
    }
}

type CliResult<T> = Result<T, CliError>;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = CliConfig::from_env().with_flags(cli.verbose, cli.quiet);
    StderrLogger::try_init(&config);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let result = match cli.command {
        Commands::Validate { files, input } => cmd_validate(&mut out, &files, input),
        Commands::Inspect {
            file,
            input,
            format,
        } => cmd_inspect(&mut out, &file, input, format),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn read_value(path: &Path, input: Option<SpecFormat>) -> CliResult<serde_json::Value> {
    let format = input.unwrap_or_else(|| SpecFormat::from_path(path));
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::Load(path.to_path_buf(), LoadError::Io(e)))?;
    parse_value(&text, format).map_err(|e| CliError::Load(path.to_path_buf(), e))
}

/// Validate command: check every file and report all problems.
fn cmd_validate(out: &mut impl Write, files: &[PathBuf], input: Option<SpecFormat>) -> CliResult<()> {
    let mut invalid = 0;

    for path in files {
        let value = match read_value(path, input) {
            Ok(value) => value,
            Err(e) => {
                writeln!(out, "✗ {e}")?;
                invalid += 1;
                continue;
            }
        };

        match validate_spec_detailed(&value) {
            Ok(()) => {
                info!(target: targets::SPEC, "{} accepted", path.display());
                writeln!(out, "✓ {}", path.display())?;
            }
            Err(errors) => {
                invalid += 1;
                writeln!(out, "✗ {} ({} problem(s))", path.display(), errors.len())?;
                for err in errors {
                    writeln!(out, "    {err}")?;
                }
            }
        }
    }

    if invalid > 0 {
        Err(CliError::Invalid(invalid))
    } else {
        Ok(())
    }
}

/// Inspect command: summarize one document.
fn cmd_inspect(
    out: &mut impl Write,
    path: &Path,
    input: Option<SpecFormat>,
    format: InspectFormat,
) -> CliResult<()> {
    let value = read_value(path, input)?;
    let doc = SpecDocument::from_value(value)
        .map_err(|e| CliError::Load(path.to_path_buf(), LoadError::Document(e)))?;

    match format {
        InspectFormat::Text => write_text(out, &doc)?,
        InspectFormat::Json => {
            let summary = json!({
                "name": doc.info.name,
                "version": doc.info.version,
                "specVersion": doc.version,
                "basePath": doc.base_path,
                "methods": names(doc.methods.as_ref()),
                "notifications": names(doc.notifications.as_ref()),
                "events": names(doc.events.as_ref()),
                "schemas": names(doc.schemas.as_ref()),
            });
            let rendered = serde_json::to_string_pretty(&summary)
                .map_err(|e| CliError::Io(io::Error::other(e)))?;
            writeln!(out, "{rendered}")?;
        }
    }
    Ok(())
}

fn names<V>(section: Option<&BTreeMap<String, V>>) -> Vec<&str> {
    section
        .map(|m| m.keys().map(String::as_str).collect())
        .unwrap_or_default()
}

fn write_text(out: &mut impl Write, doc: &SpecDocument) -> io::Result<()> {
    let version = doc.info.version.as_deref().unwrap_or("-");
    writeln!(out, "{} {} (spec {})", doc.info.name, version, doc.version)?;
    if let Some(description) = &doc.info.description {
        writeln!(out, "  {description}")?;
    }
    if let Some(base) = &doc.base_path {
        writeln!(out, "  base path: {base}")?;
    }

    for (title, section) in [
        ("Methods", doc.methods.as_ref()),
        ("Notifications", doc.notifications.as_ref()),
        ("Events", doc.events.as_ref()),
    ] {
        let Some(entries) = section.filter(|s| !s.is_empty()) else {
            continue;
        };
        writeln!(out)?;
        writeln!(out, "{title}:")?;
        for (name, spec) in entries {
            writeln!(out, "  {}", describe_method(name, spec))?;
            if let Some(description) = &spec.description {
                writeln!(out, "      {description}")?;
            }
        }
    }

    if let Some(schemas) = doc.schemas.as_ref().filter(|s| !s.is_empty()) {
        writeln!(out)?;
        writeln!(out, "Schemas:")?;
        for (name, node) in schemas {
            writeln!(out, "  {name}: {}", describe_node(node))?;
        }
    }
    Ok(())
}

fn describe_method(name: &str, spec: &MethodSpec) -> String {
    let params = spec.params.as_ref().map_or_else(String::new, describe_node);
    let mut line = format!("{name}({params})");
    if let Some(result) = &spec.result {
        let _ = write!(line, " -> {}", describe_node(result));
    }
    if let Some(errors) = spec.errors.as_ref().filter(|e| !e.is_empty()) {
        let _ = write!(line, " ! {}", errors.join(", "));
    }
    line
}

/// One-line rendering of a schema node, e.g. `{name: string, tags?: [string]}`.
fn describe_node(node: &SchemaNode) -> String {
    if let Some(reference) = &node.reference {
        let name = reference
            .strip_prefix(openws_protocol::SCHEMA_REF_PREFIX)
            .unwrap_or(reference);
        return name.to_string();
    }
    if let Some(values) = &node.enum_values {
        let rendered: Vec<String> = values.iter().map(ToString::to_string).collect();
        return rendered.join(" | ");
    }
    match node.kind.as_deref() {
        Some("array") => match &node.items {
            Some(items) => format!("[{}]", describe_node(items)),
            None => "array".to_string(),
        },
        Some("object") if node.properties.is_some() => {
            let fields: Vec<String> = node
                .properties
                .iter()
                .flatten()
                .map(|(name, child)| {
                    let marker = if child.is_optional() { "?" } else { "" };
                    format!("{name}{marker}: {}", describe_node(child))
                })
                .collect();
            format!("{{{}}}", fields.join(", "))
        }
        Some(kind) => kind.to_string(),
        None => "?".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn spec_file(contents: &str, suffix: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    const CHAT: &str = r##"{
        "version": "1.0",
        "info": {"name": "chat", "version": "0.3"},
        "schemas": {"Message": {"type": "object", "properties": {
            "text": {"type": "string"},
            "tags": {"type": "array", "items": {"type": "string"}, "optional": true}
        }}},
        "methods": {"send": {
            "description": "Post a message",
            "params": {"$ref": "#/schemas/Message"},
            "result": {"type": "boolean"},
            "errors": ["RateLimited"]
        }},
        "events": {"message": {"params": {"$ref": "Message"}}}
    }"##;

    #[test]
    fn test_describe_node() {
        let node = SchemaNode::typed("object")
            .with_property("name", SchemaNode::typed("string"))
            .with_property("tags", SchemaNode::typed("array").with_items(SchemaNode::typed("string")).optional());
        assert_eq!(describe_node(&node), "{name: string, tags?: [string]}");
        assert_eq!(describe_node(&SchemaNode::reference("#/schemas/User")), "User");

        let mut colors = SchemaNode::typed("string");
        colors.enum_values = Some(vec![json!("red"), json!("green")]);
        assert_eq!(describe_node(&colors), r#""red" | "green""#);
    }

    #[test]
    fn test_validate_reports_each_file() {
        let good = spec_file(CHAT, ".json");
        let bad = spec_file("version: '1.0'\ninfo: {name: x}\nschemas:\n  Foo: {description: d}\n", ".yaml");

        let mut out = Vec::new();
        let result = cmd_validate(&mut out, &[good.path().to_path_buf(), bad.path().to_path_buf()], None);
        assert!(matches!(result, Err(CliError::Invalid(1))));

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("✓"));
        assert!(text.contains("root.schemas.Foo: must have either $ref or type"));
    }

    #[test]
    fn test_validate_unreadable_file() {
        let mut out = Vec::new();
        let result = cmd_validate(&mut out, &[PathBuf::from("/nonexistent/spec.json")], None);
        assert!(matches!(result, Err(CliError::Invalid(1))));
        assert!(String::from_utf8(out).unwrap().contains("I/O error"));
    }

    #[test]
    fn test_inspect_text() {
        let file = spec_file(CHAT, ".json");
        let mut out = Vec::new();
        cmd_inspect(&mut out, file.path(), None, InspectFormat::Text).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("chat 0.3 (spec 1.0)"));
        assert!(text.contains("send(Message) -> boolean ! RateLimited"));
        assert!(text.contains("Post a message"));
        assert!(text.contains("Events:"));
        assert!(text.contains("Message: {tags?: [string], text: string}"));
    }

    #[test]
    fn test_inspect_json_with_forced_input() {
        let file = spec_file(CHAT, ".txt");
        let mut out = Vec::new();
        cmd_inspect(&mut out, file.path(), Some(SpecFormat::Json), InspectFormat::Json).unwrap();
        let summary: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(summary["name"], "chat");
        assert_eq!(summary["methods"], json!(["send"]));
        assert_eq!(summary["events"], json!(["message"]));
        assert_eq!(summary["notifications"], json!([]));
    }

    #[test]
    fn test_inspect_rejects_invalid_document() {
        let file = spec_file(r#"{"version": "1.0"}"#, ".json");
        let mut out = Vec::new();
        let err = cmd_inspect(&mut out, file.path(), None, InspectFormat::Text).unwrap_err();
        assert!(err.to_string().contains("missing required field: info"));
    }

    #[test]
    fn test_inspect_format_parse() {
        assert_eq!("JSON".parse::<InspectFormat>().unwrap(), InspectFormat::Json);
        assert!("xml".parse::<InspectFormat>().is_err());
    }
}
