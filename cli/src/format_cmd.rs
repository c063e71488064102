use anyhow::Result;
use clap::Parser;
use clap::Subcommand;
use neighborly_formatters::Category;
use neighborly_formatters::Icon;
use neighborly_formatters::format_author_label;
use neighborly_formatters::format_badge_name;
use neighborly_formatters::format_name_with_last_initial;
use neighborly_formatters::format_us_phone_display;
use serde::Serialize;

#[derive(Debug, Parser)]
pub struct FormatCli {
    #[command(subcommand)]
    pub kind: FormatKind,
}

#[derive(Debug, Subcommand)]
pub enum FormatKind {
    /// Author label stored as `Name|Street`; omit for an anonymous author.
    Author { label: Option<String> },

    /// Full name shortened to first name and last initial.
    Name { name: String },

    /// Phone number in US display format.
    Phone { number: String },

    /// Badge key such as `top_reviewer`.
    Badge { key: String },
}

pub fn render(kind: &FormatKind) -> String {
    match kind {
        FormatKind::Author { label } => format_author_label(label.as_deref()),
        FormatKind::Name { name } => format_name_with_last_initial(name),
        FormatKind::Phone { number } => format_us_phone_display(number),
        FormatKind::Badge { key } => format_badge_name(key),
    }
}

#[derive(Debug, Serialize)]
struct CategoryRow {
    category: Category,
    emoji: &'static str,
    icon: Icon,
}

pub fn render_categories(json: bool) -> Result<String> {
    let rows: Vec<CategoryRow> = Category::all()
        .map(|category| CategoryRow {
            category,
            emoji: category.emoji(),
            icon: category.icon(),
        })
        .collect();

    if json {
        return Ok(serde_json::to_string_pretty(&rows)?);
    }

    let width = rows
        .iter()
        .map(|row| row.category.label().len())
        .max()
        .unwrap_or_default();
    let lines: Vec<String> = rows
        .iter()
        .map(|row| {
            format!(
                "{}  {:<width$}  {}",
                row.emoji,
                row.category.label(),
                row.icon.name()
            )
        })
        .collect();
    Ok(lines.join("\n"))
}
