use super::ui;
use crate::core::Conversion;
use anyhow::Result;

/// Prints a one-shot conversion.
pub fn run(conversion: &Conversion) -> Result<()> {
    println!("{}", ui::render_conversion(conversion));
    Ok(())
}
