use super::ui;
use crate::core::DataFetcher;
use crate::entities::{ShoppingListTodo, TodoItem, TodoStatus};
use anyhow::{Result, bail};
use comfy_table::{Cell, Color};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum ShoppingCommand {
    List,
    Add { name: String },
    Toggle { id: String },
    Delete { ids: Vec<String> },
}

pub async fn run(fetcher: Arc<DataFetcher>, command: ShoppingCommand) -> Result<()> {
    let todo = ShoppingListTodo::new(fetcher);

    let items = match command {
        ShoppingCommand::List => todo.update().await,
        ShoppingCommand::Add { name } => {
            if name.trim().is_empty() {
                bail!("Item name must not be empty");
            }
            let uid = todo.create(&name).await;
            println!("Added '{name}' ({uid})");
            todo.items().await
        }
        ShoppingCommand::Toggle { id } => {
            if !todo.toggle(&id).await {
                bail!("Failed to toggle shopping item {id}");
            }
            todo.items().await
        }
        ShoppingCommand::Delete { ids } => {
            todo.delete_many(&ids).await;
            todo.items().await
        }
    };

    println!("{}", render_items(&items));
    Ok(())
}

pub fn render_items(items: &[TodoItem]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Id"),
        ui::header_cell("Item"),
        ui::header_cell("Status"),
    ]);

    for item in items {
        let status = match item.status {
            TodoStatus::NeedsAction => Cell::new(item.status).fg(Color::Yellow),
            TodoStatus::Completed => Cell::new(item.status).fg(Color::Green),
        };
        table.add_row(vec![Cell::new(&item.uid), Cell::new(&item.summary), status]);
    }

    format!(
        "{}\n\n{}\n\n{} items",
        ui::style_text("Flatastic Shopping List", ui::StyleType::Title),
        table,
        items.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_items() {
        let items = vec![
            TodoItem {
                uid: "1".to_string(),
                summary: "Milk".to_string(),
                status: TodoStatus::NeedsAction,
            },
            TodoItem {
                uid: "2".to_string(),
                summary: "Eggs".to_string(),
                status: TodoStatus::Completed,
            },
        ];

        let output = render_items(&items);

        assert!(output.contains("Milk"));
        assert!(output.contains("needs_action"));
        assert!(output.contains("completed"));
        assert!(output.ends_with("2 items"));
    }
}
