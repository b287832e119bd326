use anyhow::Result;
use scraper::Html;

use crate::fetch::{WikiClient, FANDOM_URL};
use crate::model::Project;
use crate::parse::parse_requirements;
use crate::scrape::{classify, content_region, tables_in, TableKind, WikiTable};

const PROJECTS_PAGE: &str = "Expedition_Projects";

/// Scrape the expedition projects page.
pub fn extract_projects(client: &WikiClient) -> Result<Vec<Project>> {
    println!("Extracting projects data...");

    let Some(body) = client.fetch_wiki_page(FANDOM_URL, PROJECTS_PAGE)? else {
        println!("  Projects page unavailable");
        return Ok(Vec::new());
    };
    let document = Html::parse_document(&body);
    let Some(region) = content_region(&document) else {
        return Ok(Vec::new());
    };

    let mut projects = Vec::new();
    for table in tables_in(region) {
        if classify(&table) != TableKind::Project {
            continue;
        }
        projects.extend(projects_from_table(&table));
    }

    Ok(projects)
}

fn projects_from_table(table: &WikiTable) -> Vec<Project> {
    let name_col = table.find_column(&["caravan build", "name"]);
    let description_col = table.find_column(&["description"]);
    let materials_col = table.find_column(&["required materials", "materials"]);

    let mut projects = Vec::new();

    for row in &table.rows {
        if row.len() < 2 {
            continue;
        }

        let name = name_col
            .and_then(|col| row.get(col))
            .map(|cell| cell.replace('\n', " ").trim().to_string())
            .unwrap_or_default();
        if name.is_empty() || name.eq_ignore_ascii_case("none") {
            continue;
        }

        let description = description_col
            .and_then(|col| row.get(col))
            .map(|cell| cell.replace('\n', " ").trim().to_string())
            .unwrap_or_default();

        let required_materials = materials_col
            .and_then(|col| row.get(col))
            .map(|cell| parse_requirements(cell))
            .unwrap_or_default();

        projects.push(Project {
            name,
            description,
            required_materials,
        });
    }

    projects
}
