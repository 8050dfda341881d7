//! Repair Ladder for Malformed JSON
//!
//! An ordered table of named, pure text transforms. Each rung is applied at
//! most once, in table order, and each is idempotent, so the total work is
//! bounded by the ladder length. The rungs only ever remove text or add
//! single separating commas; none invents structure or content.

use once_cell::sync::Lazy;
use regex::Regex;

/// One repair strategy: a name for diagnostics and a pure transform.
pub struct RepairRung {
    pub name: &'static str,
    apply_fn: fn(&str) -> String,
}

impl RepairRung {
    pub fn apply(&self, text: &str) -> String {
        (self.apply_fn)(text)
    }
}

/// The repair strategies, in application order.
pub const LADDER: &[RepairRung] = &[
    RepairRung {
        name: "insert-missing-commas",
        apply_fn: insert_missing_commas,
    },
    RepairRung {
        name: "strip-trailing-commas",
        apply_fn: strip_trailing_commas,
    },
    RepairRung {
        name: "drop-structureless-lines",
        apply_fn: drop_structureless_lines,
    },
];

static TRAILING_COMMAS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:,\s*)+([}\]])").expect("trailing-comma pattern is valid"));

/// A line that ends a value followed by a line that opens one is missing the
/// separating comma. Covers `"a"` / `"b"`, `}` / `{` and `]` / `[` splits.
fn insert_missing_commas(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());

    for (i, line) in lines.iter().enumerate() {
        let current = line.trim_end();
        if ends_with_value(current) && next_line_opens_value(&lines[i + 1..]) {
            out.push(format!("{},", current));
        } else {
            out.push((*line).to_string());
        }
    }

    out.join("\n")
}

fn ends_with_value(line: &str) -> bool {
    match line.chars().last() {
        Some('"') | Some('}') | Some(']') => true,
        Some(c) if c.is_ascii_digit() => true,
        _ => line.ends_with("true") || line.ends_with("false") || line.ends_with("null"),
    }
}

fn next_line_opens_value(rest: &[&str]) -> bool {
    rest.iter()
        .map(|line| line.trim_start())
        .find(|line| !line.is_empty())
        .map(|line| line.starts_with('"') || line.starts_with('{') || line.starts_with('['))
        .unwrap_or(false)
}

/// Commas directly before a closing bracket are dropped, however many.
fn strip_trailing_commas(text: &str) -> String {
    TRAILING_COMMAS.replace_all(text, "$1").into_owned()
}

/// Lines carrying no JSON structure at all (no separators, no brackets, no
/// leading quote) are model prose; drop them.
fn drop_structureless_lines(text: &str) -> String {
    let kept: Vec<&str> = text
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            trimmed.is_empty()
                || trimmed.starts_with('"')
                || trimmed.contains(|c| matches!(c, ':' | ',' | '{' | '}' | '[' | ']'))
        })
        .collect();
    kept.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rung(name: &str) -> &'static RepairRung {
        LADDER
            .iter()
            .find(|r| r.name == name)
            .expect("rung exists")
    }

    #[test]
    fn test_ladder_order_is_stable() {
        let names: Vec<&str> = LADDER.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "insert-missing-commas",
                "strip-trailing-commas",
                "drop-structureless-lines"
            ]
        );
    }

    #[test]
    fn test_insert_missing_commas_between_strings() {
        let fixed = insert_missing_commas("[\n\"a\"\n\"b\"\n]");
        assert_eq!(fixed, "[\n\"a\",\n\"b\"\n]");
    }

    #[test]
    fn test_insert_missing_commas_skips_correct_json() {
        let text = "[\n\"a\",\n\"b\"\n]";
        assert_eq!(insert_missing_commas(text), text);
    }

    #[test]
    fn test_insert_missing_commas_handles_numbers_and_literals() {
        let fixed = insert_missing_commas("{\n\"a\": 1\n\"b\": true\n\"c\": null\n}");
        assert_eq!(fixed, "{\n\"a\": 1,\n\"b\": true,\n\"c\": null\n}");
    }

    #[test]
    fn test_strip_trailing_commas_collapses_runs() {
        assert_eq!(strip_trailing_commas("[1, 2,, ]"), "[1, 2]");
        assert_eq!(strip_trailing_commas("{\"a\": 1, }"), "{\"a\": 1}");
    }

    #[test]
    fn test_drop_structureless_lines_keeps_structure() {
        let fixed = drop_structureless_lines("{\nSure thing\n\"a\": 1\n}");
        assert_eq!(fixed, "{\n\"a\": 1\n}");
    }

    #[test]
    fn test_every_rung_is_idempotent() {
        let samples = [
            "[\n{\"name\": \"A\"}\n{\"name\": \"B\"}\n]",
            "{\"items\": [1, 2,],}",
            "[\nprose here\n{\"a\": 1},\nmore prose\n{\"b\": 2}\n]",
            "",
            "plain text with no json at all",
        ];
        for rung in LADDER {
            for sample in &samples {
                let once = rung.apply(sample);
                let twice = rung.apply(&once);
                assert_eq!(once, twice, "rung {} not idempotent", rung.name);
            }
        }
    }

    #[test]
    fn test_rungs_never_add_content_beyond_commas() {
        let sample = "{\"a\": 1\n\"b\": 2}";
        let repaired = rung("insert-missing-commas").apply(sample);
        let extra: String = repaired.chars().filter(|c| *c == ',').collect();
        assert_eq!(extra.len(), 1);
        assert_eq!(repaired.replace(',', ""), sample.replace(',', ""));
    }
}
