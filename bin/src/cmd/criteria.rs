//! Criteria listing command implementation.

use anyhow::Result;
use bluechip_screen::registry::{CriterionCategory, available_criteria, criteria_by_category};

const CATEGORIES: [(CriterionCategory, &str); 3] = [
    (CriterionCategory::Dividend, "Dividend"),
    (CriterionCategory::Ownership, "Ownership"),
    (CriterionCategory::Fundamental, "Fundamental"),
];

/// List screening criteria, optionally filtered by category.
pub(crate) fn list_criteria(category: Option<&str>, verbose: bool) -> Result<()> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                    Screening Criteria                        ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    for (cat, cat_name) in &CATEGORIES {
        if let Some(filter) = category
            && !cat_name.to_lowercase().contains(&filter.to_lowercase())
        {
            continue;
        }

        let infos = criteria_by_category(cat);
        if infos.is_empty() {
            continue;
        }

        println!("{cat_name}: {}", cat.description());
        println!("{}", "-".repeat(60));

        for info in infos {
            let marker = if info.placeholder { " (placeholder)" } else { "" };
            if verbose {
                println!("  {:25} - {}{marker}", info.name, info.description);
                if !info.requires.is_empty() {
                    println!("  {:25}   uses: {}", "", info.requires.join(", "));
                }
            } else {
                println!("  {}{marker}", info.name);
            }
        }
        println!();
    }

    if !verbose {
        println!("Use --verbose for descriptions and provider calls.\n");
    }
    let order: Vec<&str> = available_criteria().iter().map(|info| info.name).collect();
    println!("Evaluation order (stops at the first failure):");
    println!("  {}\n", order.join(" -> "));

    Ok(())
}
