//! demo_sanitize - Sanitize an SVG file and summarize what was removed.
//!
//! This demo reads an SVG file, runs it through the validator in sanitize
//! mode, and prints a table of violations counted by rule and severity,
//! followed by the sanitized document.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example demo_sanitize <filename.svg>
//! ```
//!
//! # Output
//!
//! The table has columns:
//! - Rule: Violated policy rule
//! - Low / High / Critical: Number of violations at each severity

use std::collections::BTreeMap;
use std::env;

use safe_svg_rs::{validate_file, Severity, ValidationOptions, Violation, WriterConfig};

/// Violation counts for a single rule.
#[derive(Default, Debug, PartialEq, Eq)]
struct RuleCounts {
    low: usize,
    high: usize,
    critical: usize,
}

impl RuleCounts {
    fn add(&mut self, severity: Severity) {
        match severity {
            Severity::Low => self.low += 1,
            Severity::High => self.high += 1,
            Severity::Critical => self.critical += 1,
        }
    }
}

/// Count violations by rule name.
fn tally(violations: &[Violation]) -> BTreeMap<&'static str, RuleCounts> {
    let mut counts: BTreeMap<&'static str, RuleCounts> = BTreeMap::new();
    for v in violations {
        counts.entry(v.rule.as_str()).or_default().add(v.severity);
    }
    counts
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <filename.svg>", args[0]);
        std::process::exit(1);
    }

    let options = ValidationOptions::sanitize().with_writer_config(WriterConfig::pretty());
    let outcome = validate_file(&args[1], &options);

    if let Some(e) = outcome.error() {
        eprintln!("Error reading SVG: {}", e);
        std::process::exit(1);
    }

    println!("{}: {}", args[1], outcome.kind());
    println!();
    println!("{:<34} {:>6} {:>6} {:>9}", "Rule", "Low", "High", "Critical");

    for (rule, c) in tally(outcome.violations()) {
        println!("{:<34} {:>6} {:>6} {:>9}", rule, c.low, c.high, c.critical);
    }

    if let Some(svg) = outcome.sanitized_document() {
        println!();
        println!("{}", String::from_utf8_lossy(svg));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use safe_svg_rs::Rule;

    fn violation(rule: Rule, severity: Severity) -> Violation {
        Violation {
            path: "svg".to_string(),
            rule,
            severity,
            name: "x".to_string(),
        }
    }

    #[test]
    fn test_tally_empty() {
        assert!(tally(&[]).is_empty());
    }

    #[test]
    fn test_tally_groups_by_rule() {
        let violations = vec![
            violation(Rule::DisallowedElement, Severity::Critical),
            violation(Rule::DisallowedElement, Severity::Low),
            violation(Rule::DisallowedAttribute, Severity::Critical),
            violation(Rule::DisallowedElement, Severity::Critical),
        ];
        let counts = tally(&violations);
        assert_eq!(counts.len(), 2);
        assert_eq!(
            counts["DisallowedElement"],
            RuleCounts {
                low: 1,
                high: 0,
                critical: 2
            }
        );
        assert_eq!(counts["DisallowedAttribute"].critical, 1);
    }
}
