//! `rules` command implementation.

use anyhow::{bail, Result};
use lintel_core::{strip_markers, Example, RuleDescription};
use lintel_rules::builtin_registry;
use std::collections::BTreeSet;

use crate::config_resolver::ConfigSource;

/// Lists every rule, or describes the one named by `identifier`.
pub fn run(identifier: Option<&str>, source: &ConfigSource) -> Result<()> {
    match identifier {
        Some(id) => describe(id),
        None => list(source),
    }
}

fn list(source: &ConfigSource) -> Result<()> {
    let registry = builtin_registry();
    let enabled: BTreeSet<&str> = source
        .load()?
        .resolve(&registry)
        .rules
        .iter()
        .map(|r| r.identifier())
        .collect();

    println!(
        "{:<36} {:<11} {:<7} {:<12} Enabled",
        "Identifier", "Kind", "Opt-in", "Correctable"
    );
    println!("{}", "-".repeat(76));
    for descriptor in registry.iter() {
        let d = descriptor.description;
        println!(
            "{:<36} {:<11} {:<7} {:<12} {}",
            d.identifier,
            d.kind.to_string(),
            yes_no(d.opt_in),
            yes_no(d.correctable),
            yes_no(enabled.contains(d.identifier)),
        );
    }
    println!("\nUse `lintel rules <identifier>` for details and examples.");
    Ok(())
}

fn describe(id: &str) -> Result<()> {
    let registry = builtin_registry();
    let Some(descriptor) = registry.get(id) else {
        bail!("Unknown rule: {id}. Run `lintel rules` to list them.");
    };
    print!("{}", render(descriptor.description));
    Ok(())
}

fn render(d: &RuleDescription) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let _ = writeln!(out, "{} ({})\n", d.name, d.identifier);
    let _ = writeln!(out, "{}\n", d.description);
    let _ = writeln!(out, "Kind: {}", d.kind);
    let _ = writeln!(out, "Opt-in: {}", yes_no(d.opt_in));
    let _ = writeln!(out, "Correctable: {}", yes_no(d.correctable));
    if !d.deprecated_aliases.is_empty() {
        let _ = writeln!(out, "Deprecated aliases: {}", d.deprecated_aliases.join(", "));
    }
    write_examples(&mut out, "Non-triggering examples", d.non_triggering_examples);
    write_examples(&mut out, "Triggering examples", d.triggering_examples);
    out
}

fn write_examples(out: &mut String, title: &str, examples: &[Example]) {
    use std::fmt::Write;

    let _ = writeln!(out, "\n{title}:");
    for example in examples {
        let (code, _) = strip_markers(example.code);
        let _ = writeln!(out);
        if let Some(configuration) = example.configuration {
            let _ = writeln!(out, "    # with {}", configuration.replace('\n', ", "));
        }
        for line in code.lines() {
            let _ = writeln!(out, "    {line}");
        }
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_strips_markers_and_lists_aliases() {
        let registry = builtin_registry();
        let text = render(registry.get("variable_name").unwrap().description);
        assert!(text.starts_with("Identifier Name (identifier_name)"));
        assert!(text.contains("Deprecated aliases: variable_name"));
        assert!(text.contains("    let MyLet = 0"));
        assert!(!text.contains('↓'));
    }

    #[test]
    fn unknown_rules_are_rejected() {
        assert!(describe("no_such_rule").is_err());
    }
}
