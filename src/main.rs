use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use inquire::error::InquireResult;

mod catalog;
mod cli;
mod config;
mod import;
mod render;
mod storage;
mod suggest;

use catalog::{CatalogRecord, CatalogStore};
use config::Config;
use storage::BackendLocal;
use suggest::{EmbeddingModel, ScoringWeights, Suggester, Suggestion};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = cli::Args::parse();
    let config = Config::load();

    let backend = BackendLocal::new(config.base_path())
        .context("cannot create data directory")?;
    let mut catalog = CatalogStore::load(Box::new(backend))?;

    match args.command {
        cli::Command::Add {
            url,
            title,
            h1,
            h2,
            meta_description,
        } => {
            let record = CatalogRecord {
                url,
                title,
                h1,
                h2,
                meta_description,
                added_at: None,
            };
            catalog.add(record)?;
            println!("{} records in catalog", catalog.len());
            Ok(())
        }

        cli::Command::List {} => {
            println!("{}", serde_json::to_string_pretty(catalog.records())?);
            Ok(())
        }

        cli::Command::Delete { url } => {
            if catalog.delete(&url)? {
                println!("1 record removed");
            } else {
                println!("No record with url {url}");
            }
            Ok(())
        }

        cli::Command::Clear { yes } => {
            if !yes {
                match inquire::prompt_confirmation(format!(
                    "Are you sure you want to delete all {} records?",
                    catalog.len()
                )) {
                    InquireResult::Ok(true) => {}
                    InquireResult::Ok(false) => return Ok(()),
                    InquireResult::Err(err) => bail!("An error occurred: {}", err),
                }
            }
            catalog.clear()?;
            println!("Catalog cleared");
            Ok(())
        }

        cli::Command::Import { file } => {
            let outcome = import::import_csv(&file, &mut catalog)?;
            for error in &outcome.errors {
                eprintln!("{error}");
            }
            println!(
                "{} records imported, {} rows skipped",
                outcome.imported,
                outcome.errors.len()
            );
            Ok(())
        }

        cli::Command::Export { file } => {
            import::export_csv(&file, catalog.records())?;
            println!("{} records exported to {}", catalog.len(), file.display());
            Ok(())
        }

        cli::Command::Suggest {
            file,
            max,
            threshold,
            interactive,
            output,
        } => {
            if catalog.is_empty() {
                bail!("The catalog is empty; add or import records first");
            }

            let document = read_document(file)?;

            let sug = &config.suggester;
            let model = EmbeddingModel::new(&sug.model, config.base_path().to_path_buf())
                .context("cannot initialize embedding model")?;

            let suggester = Suggester::new(&model)
                .with_weights(ScoringWeights {
                    semantic: sug.semantic_weight,
                    keyword: sug.keyword_weight,
                })
                .with_chunk_target(sug.chunk_target_words);

            let suggestions = suggester.rank(
                &document,
                &catalog.snapshot(),
                max.unwrap_or(sug.max_suggestions),
                threshold.unwrap_or(sug.default_threshold),
            )?;

            if !interactive {
                println!("{}", serde_json::to_string_pretty(&suggestions)?);
                return Ok(());
            }

            let accepted = review_suggestions(&suggestions)?;
            println!("{} suggestions accepted", accepted.len());

            if let Some(output) = output {
                let linked = render::apply_links(&document, &accepted);
                std::fs::write(&output, linked)
                    .with_context(|| format!("cannot write {}", output.display()))?;
                println!("Linked document written to {}", output.display());
            } else {
                println!("{}", serde_json::to_string_pretty(&accepted)?);
            }
            Ok(())
        }
    }
}

fn read_document(file: Option<PathBuf>) -> anyhow::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display())),
        None => {
            let mut document = String::new();
            std::io::stdin()
                .read_to_string(&mut document)
                .context("cannot read document from stdin")?;
            Ok(document)
        }
    }
}

fn review_suggestions(suggestions: &[Suggestion]) -> anyhow::Result<Vec<Suggestion>> {
    let mut accepted = Vec::new();

    for suggestion in suggestions {
        println!();
        println!(
            "[{:?}] {:.2}  {} -> {}",
            suggestion.tier, suggestion.score, suggestion.anchor_text, suggestion.target_url
        );
        println!("  in chunk #{}: {}", suggestion.chunk_index, suggestion.context);

        match inquire::prompt_confirmation("Accept this link?") {
            InquireResult::Ok(true) => accepted.push(suggestion.clone()),
            InquireResult::Ok(false) => {}
            InquireResult::Err(err) => bail!("An error occurred: {}", err),
        }
    }

    Ok(accepted)
}
