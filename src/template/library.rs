//! Built-in question templates used when the config declares none

use super::{Template, TemplateDef, ValidationError};

/// Definitions of the built-in templates
pub fn builtin_defs() -> Vec<TemplateDef> {
    vec![
        TemplateDef::new()
            .titled("Net revenue drivers")
            .text("What are the top Net Revenue drivers in ")
            .slot(
                "country",
                ["France", "United Kingdom", "Germany", "United States"],
            )
            .text(" for Oreo in QTD?"),
        TemplateDef::new()
            .titled("Sub-brand growth")
            .text("Which ")
            .slot("subBrand", ["Oreo", "Chips Ahoy!", "Milka", "Ritz"])
            .text(" sub-brand is driving growth in QTD?"),
        TemplateDef::new()
            .titled("Revenue trend")
            .text("What is the Oreo net revenue trend in ")
            .slot("timePeriod", ["QTD", "YTD", "MTD", "Month"])
            .text("?"),
    ]
}

/// The built-in templates, validated
pub fn builtin() -> Result<Vec<Template>, ValidationError> {
    builtin_defs().into_iter().map(TemplateDef::validate).collect()
}
