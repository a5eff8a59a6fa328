//! Subcommand implementations

use anyhow::{Context, Result};
use msgmap_codec::{InputParser, MessageFormat, XmlSerializer};
use msgmap_mapping::{MappingEngine, RouteLoader};
use msgmap_ir::ParsedInput;
use msgmap_translator::Translator;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{info, warn};

fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read input file {}", path.display()))
}

fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("failed to write output file {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => println!("{content}"),
    }
    Ok(())
}

pub fn translate(routes_dir: &Path, input: &Path, output: Option<&Path>, route: &str) -> Result<()> {
    info!("Translating {} with route {}", input.display(), route);
    let content = read_input(input)?;
    let xml = Translator::new(routes_dir).translate_request(&content, route)?;
    write_output(output, &xml)
}

pub fn reply(
    routes_dir: &Path,
    input: &Path,
    output: Option<&Path>,
    route: &str,
    format: Option<MessageFormat>,
) -> Result<()> {
    info!("Translating reply {} with route {}", input.display(), route);
    let content = read_input(input)?;
    let reply = Translator::new(routes_dir).translate_response_as(&content, route, format)?;
    write_output(output, &reply)
}

pub fn parse(input: &Path, format: MessageFormat) -> Result<()> {
    let content = read_input(input)?;
    let parsed = InputParser::new()
        .parse(&content, format)
        .with_context(|| format!("failed to parse {}", input.display()))?;

    let normalized = match parsed {
        ParsedInput::Json(value) => serde_json::to_string_pretty(&value)?,
        ParsedInput::Xml(document) => XmlSerializer::new().serialize(&document),
    };
    write_output(None, &normalized)
}

/// Outcome of one batch item
struct BatchItem {
    input: PathBuf,
    result: Result<PathBuf>,
}

pub async fn batch(routes_dir: &Path, input_dir: &Path, output_dir: &Path, route: &str) -> Result<()> {
    let config = Arc::new(
        RouteLoader::new(routes_dir)
            .load(route)
            .with_context(|| format!("failed to load route {route}"))?,
    );
    let engine = Arc::new(MappingEngine::new());

    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output directory {}", output_dir.display()))?;

    let mut inputs: Vec<PathBuf> = fs::read_dir(input_dir)
        .with_context(|| format!("failed to read input directory {}", input_dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();
    inputs.sort();

    let mut tasks = JoinSet::new();
    for input in inputs {
        let config = Arc::clone(&config);
        let engine = Arc::clone(&engine);
        let output_dir = output_dir.to_path_buf();
        tasks.spawn_blocking(move || {
            let result = translate_file(&engine, &config, &input, &output_dir);
            BatchItem { input, result }
        });
    }

    let mut succeeded = 0usize;
    let mut failed: Vec<(PathBuf, String)> = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let item = joined.context("batch worker panicked")?;
        match item.result {
            Ok(path) => {
                succeeded += 1;
                info!("Translated {} -> {}", item.input.display(), path.display());
            }
            Err(e) => {
                warn!("Failed to translate {}: {:#}", item.input.display(), e);
                failed.push((item.input, format!("{e:#}")));
            }
        }
    }

    failed.sort();
    for (input, error) in &failed {
        println!("FAILED {}: {}", input.display(), error);
    }
    println!(
        "translated {} of {} files for route {}",
        succeeded,
        succeeded + failed.len(),
        route
    );
    Ok(())
}

fn translate_file(
    engine: &MappingEngine,
    config: &msgmap_mapping::MappingConfig,
    input: &Path,
    output_dir: &Path,
) -> Result<PathBuf> {
    let content = read_input(input)?;
    let xml = engine.transform_to_target(&content, config)?;

    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("cannot name output for {}", input.display()))?;
    let output = output_dir.join(format!("{stem}.xml"));
    fs::write(&output, xml).with_context(|| format!("failed to write {}", output.display()))?;
    Ok(output)
}
