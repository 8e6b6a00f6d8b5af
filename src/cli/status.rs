use super::ui;
use crate::core::{DataFetcher, Endpoint, Snapshot};
use crate::entities::{self, EntityState, ShoppingListTodo};
use anyhow::{Context, Result};
use chrono::Utc;
use comfy_table::Cell;
use std::sync::Arc;

/// Polls once and returns every entity evaluated against the fresh snapshot.
pub async fn poll(
    fetcher: &Arc<DataFetcher>,
    recent_count: usize,
) -> (Arc<Snapshot>, Vec<EntityState>) {
    let spinner = ui::new_spinner("Fetching Flatastic data...");
    let snapshot = fetcher.update_all().await;
    spinner.finish_and_clear();

    let now = Utc::now().timestamp();
    let todo = ShoppingListTodo::new(Arc::clone(fetcher));
    let mut sensors = entities::build_sensors(&snapshot, recent_count);
    sensors.push(Box::new(todo));

    let states = sensors
        .iter()
        .map(|entity| entities::render(entity.as_ref(), &snapshot, now))
        .collect();
    (snapshot, states)
}

pub async fn run(fetcher: &Arc<DataFetcher>, recent_count: usize, json: bool) -> Result<()> {
    let (snapshot, states) = poll(fetcher, recent_count).await;

    if json {
        let output =
            serde_json::to_string_pretty(&states).context("Failed to serialize entity states")?;
        println!("{output}");
    } else {
        println!("{}", render_status(&states, &snapshot.failures()));
    }
    Ok(())
}

/// Renders entity states as a table, followed by any endpoints that failed to load.
pub fn render_status(states: &[EntityState], failures: &[(Endpoint, &str)]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Entity"),
        ui::header_cell("State"),
        ui::header_cell("Attributes"),
    ]);

    for state in states {
        let attributes = state
            .attributes
            .iter()
            .map(|(key, value)| format!("{key}: {}", ui::format_value(value)))
            .collect::<Vec<_>>()
            .join("\n");

        table.add_row(vec![
            Cell::new(format!(
                "{}\n{}",
                state.name,
                ui::style_text(&state.unique_id, ui::StyleType::Subtle)
            )),
            ui::state_cell(&state.state),
            Cell::new(attributes),
        ]);
    }

    let mut output = format!(
        "{}\n\n",
        ui::style_text("Flatastic", ui::StyleType::Title)
    );
    output.push_str(&table.to_string());

    for (endpoint, reason) in failures {
        output.push_str(&format!(
            "\n{}",
            ui::style_text(
                &format!("Could not load {endpoint}: {reason}"),
                ui::StyleType::Error
            )
        ));
    }
    output
}
