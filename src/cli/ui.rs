use crate::core::Conversion;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Label,
    Value,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Label => style(text).bold(),
        StyleType::Value => style(text).green().bold(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Creates a ticking spinner for work of unknown length.
pub fn new_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Renders a conversion as a highlighted result line plus rate details.
pub fn render_conversion(conversion: &Conversion) -> String {
    let result_style = if conversion.is_available() {
        StyleType::Value
    } else {
        StyleType::Error
    };

    let mut output = format!(
        "{} {} = {} {}",
        conversion.amount.trim(),
        style_text(&conversion.pair.display_source(), StyleType::Label),
        style_text(&conversion.result, result_style),
        style_text(&conversion.pair.display_target(), StyleType::Label),
    );
    if let Some(label) = &conversion.rate_label {
        output.push_str(&format!("\nRate ({}): {}", conversion.mode, label));
    }
    output.push_str(&format!(
        "\n{}",
        style_text(
            &format!(
                "Last updated: {}",
                conversion.updated_at.format("%Y-%m-%d %H:%M:%S")
            ),
            StyleType::Subtle
        )
    ));
    output
}
