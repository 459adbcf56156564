//! `parley roles` -- list the role presets.

use anyhow::Result;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};

use parley_types::preset::RolePreset;

pub fn list_roles(json: bool) -> Result<()> {
    if json {
        let roles: Vec<_> = RolePreset::ALL
            .iter()
            .map(|r| {
                serde_json::json!({
                    "slug": r.slug(),
                    "label": r.label(),
                    "opening_prompt": r.opening_prompt(),
                    "default": *r == RolePreset::default(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&roles)?);
        return Ok(());
    }

    println!();
    println!("{}", roles_table());
    println!();

    Ok(())
}

fn roles_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Slug").fg(Color::White),
        Cell::new("Role").fg(Color::White),
        Cell::new("Opening prompt").fg(Color::White),
    ]);

    for role in RolePreset::ALL {
        table.add_row(vec![
            Cell::new(role.slug()).fg(Color::Cyan),
            Cell::new(role.label()),
            Cell::new(role.opening_prompt().unwrap_or("-")).fg(Color::DarkGrey),
        ]);
    }

    table
}
