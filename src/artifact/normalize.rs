// Payload normalization
//
// Model output is mapped onto the schema first (see providers::parse), then
// passed through here so every artifact that reaches a caller holds the
// invariants: REQ-/TC- ids unique, steps contiguous from 1, tags deduplicated.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

use super::types::{RequirementItem, TestCase};

/// How requirement ids are assigned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdPolicy {
    /// First extraction: ids are `REQ-1..REQ-n` in document order
    Sequential,
    /// Refinement: keep well-formed unique ids, number the rest after them
    Preserve,
}

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static regex is valid"))
}

fn requirement_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"^REQ-(\d+)$")
}

fn test_case_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"^TC-(\d+)$")
}

/// Strip formatting artifacts a model or a markdown source leaves behind
pub fn clean_requirement_text(text: &str) -> String {
    static BOLD: OnceLock<Regex> = OnceLock::new();
    static ITALIC: OnceLock<Regex> = OnceLock::new();
    static UNDERLINE_BOLD: OnceLock<Regex> = OnceLock::new();
    static UNDERLINE: OnceLock<Regex> = OnceLock::new();
    static BULLET: OnceLock<Regex> = OnceLock::new();
    static NUMBERED: OnceLock<Regex> = OnceLock::new();

    let text = regex(&BOLD, r"\*\*([^*]+)\*\*").replace_all(text, "$1");
    let text = regex(&ITALIC, r"\*([^*\s](?:[^*]*[^*\s])?)\*").replace_all(&text, "$1");
    let text = regex(&UNDERLINE_BOLD, r"__([^_]+)__").replace_all(&text, "$1");
    let text = regex(&UNDERLINE, r"\b_([^_]+)_\b").replace_all(&text, "$1");
    let text = text.trim();
    let text = regex(&BULLET, r"^[-*•│├└]\s*").replace(text, "");
    let text = regex(&NUMBERED, r"^\d+[.)]\s*").replace(&text, "");

    text.replace(" (stub)", "")
        .replace("(stub)", "")
        .trim()
        .trim_matches(':')
        .trim()
        .to_string()
}

/// Clean, deduplicate and number a requirement list.
///
/// Items whose text is empty after cleanup are dropped; duplicates are
/// detected case-insensitively and the first occurrence wins.
pub fn normalize_requirements(items: Vec<RequirementItem>, policy: IdPolicy) -> Vec<RequirementItem> {
    let mut seen_text = HashSet::new();
    let mut cleaned: Vec<RequirementItem> = Vec::with_capacity(items.len());
    for item in items {
        let text = clean_requirement_text(&item.text);
        if text.is_empty() || !seen_text.insert(text.to_lowercase()) {
            continue;
        }
        cleaned.push(RequirementItem {
            id: item.id.trim().to_string(),
            text,
        });
    }

    match policy {
        IdPolicy::Sequential => {
            for (idx, item) in cleaned.iter_mut().enumerate() {
                item.id = format!("REQ-{}", idx + 1);
            }
        }
        IdPolicy::Preserve => assign_missing_ids(&mut cleaned, requirement_id_re(), "REQ", |r| {
            &mut r.id
        }),
    }
    cleaned
}

/// Renumber steps, deduplicate tags and fill in missing test case ids
pub fn normalize_test_cases(mut cases: Vec<TestCase>) -> Vec<TestCase> {
    for case in &mut cases {
        case.id = case.id.trim().to_string();
        // stable: equal step numbers keep the order the model wrote them in
        case.steps.sort_by_key(|s| s.step);
        for (idx, step) in case.steps.iter_mut().enumerate() {
            step.step = idx as u32 + 1;
        }

        let mut seen = HashSet::new();
        case.tags = std::mem::take(&mut case.tags)
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty() && seen.insert(t.clone()))
            .collect();
    }
    assign_missing_ids(&mut cases, test_case_id_re(), "TC", |c| &mut c.id);
    cases
}

/// Keep ids matching `re` (first occurrence only), give everything else the
/// next number above the highest kept one.
///
/// Numbers above `u32::MAX` are not kept, which leaves the `u64` counter
/// room for every renumbered item.
fn assign_missing_ids<T>(
    items: &mut [T],
    re: &Regex,
    prefix: &str,
    id_of: impl Fn(&mut T) -> &mut String,
) {
    let mut kept = HashSet::new();
    let mut needs_id = Vec::new();
    let mut max_seen = 0u64;

    for (idx, item) in items.iter_mut().enumerate() {
        let id = id_of(item);
        let number = re
            .captures(id)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok());
        match number {
            Some(n) if kept.insert(id.clone()) => max_seen = max_seen.max(u64::from(n)),
            _ => needs_id.push(idx),
        }
    }

    let mut next = max_seen.saturating_add(1);
    for idx in needs_id {
        *id_of(&mut items[idx]) = format!("{prefix}-{next}");
        next = next.saturating_add(1);
    }
}
