use std::path::Path;

use colored::Colorize;
use serde_json::Value;

use dmport_import::{import_folder_entity, import_single_entity};
use dmport_store::{DocumentStore, HttpDocumentStore};

use crate::app_dir::{app_dir_structure, json_files_in_dir, sub_directories};
use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let store = HttpDocumentStore::new(&cli.url, cli.token.clone())?;
    match cli.command {
        Command::Entities(EntitiesCommand::Import(args)) => cmd_import(&store, &args, cli.force),
        Command::Entities(EntitiesCommand::Delete(args)) => cmd_delete(&store, &args),
        Command::DataSource(DataSourceCommand::Import(args)) => {
            cmd_data_source_import(&store, Path::new(&args.path))
        }
        Command::DataSource(DataSourceCommand::ImportAll(args)) => {
            cmd_data_source_import_all(&store, Path::new(&args.path))
        }
        Command::DataSource(DataSourceCommand::Init(args)) => {
            cmd_init(&store, Path::new(&args.path), None)
        }
        Command::DataSource(DataSourceCommand::Reset(args)) => {
            cmd_reset(&store, &args.data_source, Path::new(&args.path))
        }
    }
}

fn cmd_import(store: &dyn DocumentStore, args: &ImportArgs, force: bool) -> anyhow::Result<()> {
    let destination = args.destination.trim_end_matches(['/', '\\']);
    let source_path = Path::new(args.source.trim_end_matches(['/', '\\']));

    if source_path.is_dir() {
        // A trailing separator means "import the content, not the folder".
        if args.source.ends_with('/') || args.source.ends_with('\\') {
            println!("Importing all content from '{}' → '{}'", args.source, destination);
            let mut children: Vec<_> = std::fs::read_dir(source_path)?
                .filter_map(Result::ok)
                .map(|entry| entry.path())
                .collect();
            children.sort();
            for child in children {
                if child.is_dir() {
                    import_folder_entity(store, &child, destination, force)?;
                } else {
                    import_single_entity(store, &child, destination)?;
                }
                println!("  {} {}", "imported:".green(), child.display());
            }
            return Ok(());
        }

        println!("Importing PACKAGE '{}' → '{}'", args.source, destination);
        let summary = import_folder_entity(store, source_path, destination, force)?;
        println!(
            "{} Imported {} documents, {} files, {} blobs",
            "✓".green().bold(),
            summary.documents,
            summary.files,
            summary.blobs
        );
        return Ok(());
    }

    println!("Importing ENTITY '{}' → '{}'", args.source, destination);
    import_single_entity(store, source_path, destination)?;
    println!("{} Imported '{}'", "✓".green().bold(), args.source);
    Ok(())
}

fn cmd_delete(store: &dyn DocumentStore, args: &DeleteArgs) -> anyhow::Result<()> {
    store.remove_document(&args.target)?;
    println!("{} Deleted '{}'", "✓".green().bold(), args.target);
    Ok(())
}

fn cmd_data_source_import(store: &dyn DocumentStore, path: &Path) -> anyhow::Result<()> {
    if !path.is_file() {
        anyhow::bail!("the path '{}' is not a file", path.display());
    }
    let definition: Value = serde_json::from_slice(&std::fs::read(path)?)?;
    let name = definition
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow::anyhow!("data source definition '{}' has no name", path.display()))?
        .to_string();
    store.save_data_source(&name, &definition)?;
    println!("  {} data source '{}'", "imported:".green(), name.bold());
    Ok(())
}

fn cmd_data_source_import_all(store: &dyn DocumentStore, path: &Path) -> anyhow::Result<()> {
    if !path.is_dir() {
        anyhow::bail!("the path '{}' is not a directory", path.display());
    }
    println!("IMPORTING DATA SOURCES");
    let definitions = json_files_in_dir(path)?;
    if definitions.is_empty() {
        println!("{} no data source definitions found in '{}'", "warning:".yellow(), path.display());
    }
    for definition in definitions {
        cmd_data_source_import(store, &definition)?;
    }
    Ok(())
}

/// Initialize data sources and import their packages. With `only`, limit
/// the run to that data source.
fn cmd_init(store: &dyn DocumentStore, path: &Path, only: Option<&str>) -> anyhow::Result<()> {
    let (data_sources_dir, data_dir) = app_dir_structure(path)?;

    let definitions = json_files_in_dir(&data_sources_dir)?;
    if definitions.is_empty() {
        println!(
            "{} no data source definitions found in '{}'",
            "warning:".yellow(),
            data_sources_dir.display()
        );
    }

    for definition_path in definitions {
        let name = definition_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        if only.is_some_and(|wanted| wanted != name) {
            continue;
        }

        let data_source_data = data_dir.join(&name);
        if !data_source_data.is_dir() {
            println!(
                "{} no data directory for data source '{}' in '{}'",
                "warning:".yellow(),
                name,
                data_dir.display()
            );
            continue;
        }

        cmd_data_source_import(store, &definition_path)?;
        for root_package in sub_directories(&data_source_data)? {
            let package_name = root_package
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            // Start from a clean slate; deleting a missing package is fine.
            store.remove_document(&format!("{name}/{package_name}"))?;
            let summary = import_folder_entity(store, &root_package, &name, false)?;
            println!(
                "  {} {}/{} ({} documents)",
                "imported:".green(),
                name,
                package_name.bold(),
                summary.documents
            );
        }
    }
    Ok(())
}

fn cmd_reset(store: &dyn DocumentStore, data_source: &str, path: &Path) -> anyhow::Result<()> {
    let (data_sources_dir, data_dir) = app_dir_structure(path)?;
    if !data_sources_dir.join(format!("{data_source}.json")).is_file() {
        anyhow::bail!(
            "there is no data source definition for '{data_source}' in '{}'",
            data_sources_dir.display()
        );
    }
    if !data_dir.join(data_source).is_dir() {
        anyhow::bail!(
            "there is no data source directory for '{data_source}' in '{}'",
            data_dir.display()
        );
    }
    cmd_init(store, path, Some(data_source))
}
