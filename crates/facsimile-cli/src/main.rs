use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use facsimile::value::PropertyKey;
use facsimile::{DuplicateOptions, Duplicator, RawBufferMode, Value, json};
use serde_json::json;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::fs;

#[derive(Parser)]
#[command(name = "facsimile")]
#[command(about = "Duplicate and inspect extended-JSON values")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Duplicate a document and print the copy
    Copy {
        /// Extended-JSON file, or `-` for stdin
        file: PathBuf,
        /// TOML options file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Keep cycles and shared sub-values intact
        #[arg(long)]
        track_cycles: bool,
        /// `zeroed`, `zeroed-byte-length` or `copy-bytes`
        #[arg(long)]
        raw_buffer: Option<RawBufferMode>,
    },
    /// Print the category of every value in a document
    Classify {
        /// Extended-JSON file, or `-` for stdin
        file: PathBuf,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Copy {
            file,
            config,
            track_cycles,
            raw_buffer,
        } => copy(&file, config.as_deref(), track_cycles, raw_buffer),
        Commands::Classify { file } => classify(&file),
    };

    match outcome {
        Ok(report) => println!("{}", report),
        Err(e) => {
            println!("{}", json!({ "status": "error", "error": format!("{:#}", e) }));
            std::process::exit(1);
        }
    }
}

fn read_document(file: &Path) -> Result<Value> {
    let source = if file == Path::new("-") {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("Failed to read stdin")?;
        source
    } else {
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?
    };
    json::parse(&source).with_context(|| format!("Failed to decode {}", file.display()))
}

fn copy(
    file: &Path,
    config: Option<&Path>,
    track_cycles: bool,
    raw_buffer: Option<RawBufferMode>,
) -> Result<serde_json::Value> {
    let mut options = match config {
        Some(path) => DuplicateOptions::load(path).context("Failed to load options")?,
        None => DuplicateOptions::default(),
    };
    // flags override the file
    options.track_cycles |= track_cycles;
    if let Some(mode) = raw_buffer {
        options.raw_buffer = mode;
    }
    log::debug!("duplicating {} with {:?}", file.display(), options);

    let value = read_document(file)?;
    let copy = Duplicator::new()
        .with_options(options)
        .duplicate(&value)
        .context("Duplication failed")?;

    let result = json::to_json(&copy);
    let identical = result == json::to_json(&value);
    Ok(json!({ "status": "ok", "result": result, "identical": identical }))
}

fn classify(file: &Path) -> Result<serde_json::Value> {
    let value = read_document(file)?;
    let mut categories = serde_json::Map::new();
    collect_categories(&value, "$".to_string(), &mut categories);
    Ok(serde_json::Value::Object(categories))
}

/// Record `path -> category` for `value` and everything nested in it.
fn collect_categories(value: &Value, path: String, out: &mut serde_json::Map<String, serde_json::Value>) {
    let entries = value.own_enumerable_entries().unwrap_or_default();
    out.insert(path.clone(), value.category().name().into());
    for (key, child) in entries {
        let child_path = match key {
            PropertyKey::Index(index) => format!("{}[{}]", path, index),
            PropertyKey::Name(name) => format!("{}.{}", path, name),
        };
        collect_categories(&child, child_path, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn copy_reports_identical_plain_documents() {
        let dir = TempDir::new().unwrap();
        let file = write(&dir, "doc.json", r#"{"b": [1, {"$date": 0}], "a": "x"}"#);

        let report = copy(&file, None, false, None).unwrap();
        assert_eq!(
            report,
            json!({
                "status": "ok",
                "result": {"b": [1, {"$date": 0}], "a": "x"},
                "identical": true,
            })
        );
    }

    #[test]
    fn raw_buffers_differ_in_the_default_mode() {
        let dir = TempDir::new().unwrap();
        let file = write(&dir, "doc.json", r#"{"$bytes": [1, 2, 3]}"#);

        let report = copy(&file, None, false, None).unwrap();
        assert_eq!(report["status"], "ok");
        assert_eq!(report["result"], json!({"$bytes": []}));
        assert_eq!(report["identical"], false);
    }

    #[test]
    fn flags_override_the_config_file() {
        let dir = TempDir::new().unwrap();
        let file = write(&dir, "doc.json", r#"{"$bytes": [1, 2, 3]}"#);
        let zeroed = write(&dir, "zeroed.toml", "raw_buffer = \"zeroed-byte-length\"\n");
        let copying = write(&dir, "copying.toml", "raw_buffer = \"copy-bytes\"\n");
        let plain = write(&dir, "plain.toml", "raw_buffer = \"zeroed\"\n");

        let report = copy(&file, Some(&plain), false, Some(RawBufferMode::CopyBytes)).unwrap();
        assert_eq!(report["identical"], true);

        let report = copy(&file, Some(&zeroed), false, None).unwrap();
        assert_eq!(report["result"], json!({"$bytes": [0, 0, 0]}));
        assert_eq!(report["identical"], false);

        let report = copy(&file, Some(&zeroed), false, Some(RawBufferMode::CopyBytes)).unwrap();
        assert_eq!(report["result"], json!({"$bytes": [1, 2, 3]}));
        assert_eq!(report["identical"], true);

        let report = copy(&file, Some(&copying), false, None).unwrap();
        assert_eq!(report["identical"], true);
    }

    #[test]
    fn copy_fails_on_bad_input() {
        let dir = TempDir::new().unwrap();
        let file = write(&dir, "doc.json", "{");
        let config = write(&dir, "bad.toml", "depth = 3\n");

        assert!(copy(&file, None, false, None).is_err());
        assert!(copy(&dir.path().join("missing.json"), None, false, None).is_err());

        let good = write(&dir, "good.json", "[1]");
        let error = copy(&good, Some(&config), false, None).unwrap_err();
        assert!(format!("{:#}", error).contains("Failed to load options"));
    }

    #[test]
    fn paths_follow_fields_and_indices() {
        let value = json::from_json(&json!({"a": [1, {"$date": 0}], "b": {"$set": []}})).unwrap();
        let mut categories = serde_json::Map::new();
        collect_categories(&value, "$".to_string(), &mut categories);

        assert_eq!(
            serde_json::Value::Object(categories),
            json!({
                "$": "record",
                "$.a": "sequence",
                "$.a[0]": "number",
                "$.a[1]": "instant",
                "$.b": "set",
            })
        );
    }
}
