use anyhow::{Context, Result};
use arc_wiki_to_json::{
    cli::{Cli, Commands},
    extract::{
        extract_crafting, extract_projects, extract_traders, extract_upgrades, extract_workshop,
    },
    fetch::WikiClient,
    icons::process_items,
    model::WorkshopData,
    output::{publish, read_json, write_json},
    report::check_missing_recipes,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    let start = Instant::now();
    let data_dir = cli.data_dir.clone();

    // Outputs written this run; published together at the end.
    let mut written: Vec<PathBuf> = Vec::new();

    match cli.command {
        Commands::All => {
            let client = client(&cli)?;
            written.push(save(&data_dir, "materials-info.json", &extract_traders(&client)?)?);
            written.push(save(&data_dir, "workshop_level_ups.json", &extract_workshop(&client)?)?);
            written.push(save(&data_dir, "expedition_projects.json", &extract_projects(&client)?)?);
        }

        Commands::Traders => {
            let client = client(&cli)?;
            written.push(save(&data_dir, "materials-info.json", &extract_traders(&client)?)?);
        }

        Commands::Workshop => {
            let client = client(&cli)?;
            written.push(save(&data_dir, "workshop_level_ups.json", &extract_workshop(&client)?)?);
        }

        Commands::Projects => {
            let client = client(&cli)?;
            written.push(save(&data_dir, "expedition_projects.json", &extract_projects(&client)?)?);
        }

        Commands::Crafting => {
            let client = client(&cli)?;
            let workshop = load_workshop(&data_dir)?;
            written.push(save(
                &data_dir,
                "crafting_recipes.json",
                &extract_crafting(&client, &workshop)?,
            )?);
        }

        Commands::Upgrades => {
            let client = client(&cli)?;
            let workshop = load_workshop(&data_dir)?;
            written.push(save(
                &data_dir,
                "upgrade_recipes.json",
                &extract_upgrades(&client, &workshop)?,
            )?);
        }

        Commands::Icons => {
            let client = client(&cli)?;
            let public_dir = cli
                .public_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from("public"));

            let stats = process_items(
                &client,
                &data_dir.join("items.json"),
                &public_dir.join("icons"),
            )?;
            println!(
                "\nDownloaded: {}, skipped: {}, failed: {}, updated: {} in {:.1}s",
                stats.downloaded,
                stats.skipped,
                stats.failed,
                stats.updated,
                start.elapsed().as_secs_f64()
            );
        }

        Commands::Check { checklist } => {
            check_missing_recipes(&data_dir, checklist.as_deref())?;
        }
    }

    if !written.is_empty() {
        if let Some(public_dir) = &cli.public_dir {
            let files: Vec<&Path> = written.iter().map(PathBuf::as_path).collect();
            publish(&files, public_dir)?;
        }
        println!(
            "\nWrote {} file(s) in {:.1}s",
            written.len(),
            start.elapsed().as_secs_f64()
        );
    }

    Ok(())
}

fn client(cli: &Cli) -> Result<WikiClient> {
    WikiClient::new(Duration::from_millis(cli.delay))
}

fn save<T: Serialize>(data_dir: &Path, name: &str, value: &T) -> Result<PathBuf> {
    let path = data_dir.join(name);
    write_json(&path, value)?;
    println!("Saved {:?}", path);
    Ok(path)
}

fn load_workshop(data_dir: &Path) -> Result<WorkshopData> {
    let path = data_dir.join("workshop_level_ups.json");
    read_json(&path).with_context(|| {
        format!(
            "Workshop data not found at {:?}; run the `workshop` command first",
            path
        )
    })
}
