//! Terminal rendering for lists, details and the pager.

use crate::logger::Logger;
use crate::models::{Product, Task};
use crate::pagination::PageWindow;
use comfy_table::Table;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Runs `fut` behind a spinner. The spinner is cleared before returning.
pub async fn with_spinner<F, T>(message: impl Into<String>, fut: F) -> T
where
    F: Future<Output = T>,
{
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(120));

    let out = fut.await;
    pb.finish_and_clear();
    out
}

pub fn status_label(completed: bool) -> &'static str {
    if completed { "Completed" } else { "Pending" }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} ({})", self.id, self.todo, status_label(self.completed))
    }
}

pub fn task_table(tasks: &[Task]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Description", "Status"]);
    for task in tasks {
        table.add_row(vec![
            task.id.to_string(),
            task.todo.clone(),
            status_label(task.completed).to_string(),
        ]);
    }
    table
}

pub fn product_table(products: &[Product]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Category", "Price", "Rating"]);
    for product in products {
        table.add_row(vec![
            product.id.to_string(),
            product.title.clone(),
            product.category.clone(),
            format!("${:.2}", product.price),
            product
                .rating
                .as_ref()
                .map(|r| format!("{:.1} ({})", r.rate, r.count))
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }
    table
}

pub fn task_details(task: &Task) -> Table {
    let mut table = Table::new();
    table.add_row(vec!["ID".to_string(), task.id.to_string()]);
    table.add_row(vec!["Task".to_string(), task.todo.clone()]);
    table.add_row(vec![
        "Status".to_string(),
        status_label(task.completed).to_string(),
    ]);
    table.add_row(vec!["User".to_string(), task.user_id.to_string()]);
    table
}

pub fn product_details(product: &Product) -> Table {
    let mut table = Table::new();
    table.add_row(vec!["ID".to_string(), product.id.to_string()]);
    table.add_row(vec!["Title".to_string(), product.title.clone()]);
    table.add_row(vec!["Category".to_string(), product.category.clone()]);
    table.add_row(vec!["Price".to_string(), format!("${:.2}", product.price)]);
    if let Some(rating) = &product.rating {
        table.add_row(vec![
            "Rating".to_string(),
            format!("{:.1} from {} reviews", rating.rate, rating.count),
        ]);
    }
    if let Some(stock) = product.stock {
        table.add_row(vec!["Stock".to_string(), stock.to_string()]);
    }
    table.add_row(vec!["Description".to_string(), product.description.clone()]);
    for image in product.image.iter().chain(product.images.iter()) {
        table.add_row(vec!["Image".to_string(), image.clone()]);
    }
    table
}

/// `‹ Previous  1 [2] 3  Next ›`, with disabled arrows dimmed.
pub fn pager_line(window: &PageWindow) -> String {
    let prev = if window.prev_disabled {
        Logger::dim("‹ Previous")
    } else {
        "‹ Previous".to_string()
    };
    let next = if window.next_disabled {
        Logger::dim("Next ›")
    } else {
        "Next ›".to_string()
    };

    let pages = window
        .pages()
        .map(|page| {
            if page == window.current {
                Logger::highlight(format!("[{}]", page))
            } else {
                page.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    format!("{}  {}  {}", prev, pages, next)
}

/// "Total Tasks: 254 | Page 2 of 26"
pub fn summary_line(noun: &str, total: u64, page: u32, pages: u32) -> String {
    format!("Total {}: {} | Page {} of {}", noun, total, page, pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::visible_pages;

    #[test]
    fn pager_marks_current_page() {
        colored::control::set_override(false);
        let window = visible_pages(1, 3, 5).unwrap();
        assert_eq!(pager_line(&window), "‹ Previous  [1] 2 3  Next ›");
    }

    #[test]
    fn task_table_has_a_row_per_task() {
        let tasks = vec![
            Task {
                id: 1,
                todo: "Read".into(),
                completed: true,
                user_id: 1,
            },
            Task {
                id: 2,
                todo: "Write".into(),
                completed: false,
                user_id: 1,
            },
        ];
        let rendered = task_table(&tasks).to_string();
        assert!(rendered.contains("Completed"));
        assert!(rendered.contains("Pending"));
        assert_eq!(task_table(&tasks).row_count(), 2);
    }

    #[test]
    fn summary_reads_naturally() {
        assert_eq!(summary_line("Tasks", 254, 2, 26), "Total Tasks: 254 | Page 2 of 26");
    }
}
