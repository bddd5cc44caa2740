use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::{Map, Value};

use crate::rules::{FieldRule, ListRule, RuleSet, ValueKind};

/// Evaluate a whole rule set against a document.
///
/// `fields` are resolved against the whole document, `lists` after them;
/// on a key collision the list result wins. Extraction itself never
/// fails: missing selectors, missing attributes, and unparseable
/// numbers all degrade to null.
pub fn extract(document: &Html, rules: &RuleSet) -> Map<String, Value> {
    let mut data = Map::new();

    if let Some(fields) = &rules.fields {
        for (name, rule) in fields {
            data.insert(name.clone(), eval_field(document, rule));
        }
    }
    if let Some(lists) = &rules.lists {
        for (name, rule) in lists {
            data.insert(name.clone(), eval_list(document, rule));
        }
    }
    data
}

/// Evaluate a field rule against the whole document. Document scope
/// includes the root `html` element itself, not just its descendants.
pub fn eval_field(document: &Html, rule: &FieldRule) -> Value {
    let Some(selector) = parse_selector(rule.selector.as_deref()) else {
        return Value::Null;
    };
    read_matches(document.select(&selector), rule)
}

/// Evaluate a field rule against the descendants of `scope`, the way a
/// list row sees only its own container's content.
pub fn eval_field_in(scope: ElementRef<'_>, rule: &FieldRule) -> Value {
    let Some(selector) = parse_selector(rule.selector.as_deref()) else {
        return Value::Null;
    };
    read_matches(scope.select(&selector), rule)
}

/// Evaluate a list rule: one row object per container element, in
/// document order. Each field sees only the descendants of its own
/// container. Zero matches yield an empty array, never null.
pub fn eval_list(document: &Html, rule: &ListRule) -> Value {
    let Ok(selector) = Selector::parse(&rule.selector) else {
        return Value::Array(Vec::new());
    };

    let rows = document
        .select(&selector)
        .map(|container| {
            let mut row = Map::new();
            for (name, field) in &rule.fields {
                row.insert(name.clone(), eval_field_in(container, field));
            }
            Value::Object(row)
        })
        .collect();
    Value::Array(rows)
}

// An absent or unparseable selector means the rule evaluates to null.
fn parse_selector(selector: Option<&str>) -> Option<Selector> {
    Selector::parse(selector?).ok()
}

fn read_matches<'a, I>(mut matches: I, rule: &FieldRule) -> Value
where
    I: Iterator<Item = ElementRef<'a>>,
{
    if rule.all {
        Value::Array(matches.map(|el| read_one(el, rule)).collect())
    } else {
        match matches.next() {
            Some(el) => read_one(el, rule),
            None => Value::Null,
        }
    }
}

fn read_one(element: ElementRef<'_>, rule: &FieldRule) -> Value {
    let mut value = match rule.attr.as_deref() {
        Some(attr) if attr != "text" => element.value().attr(attr).map(str::to_string),
        _ => match rule.kind {
            ValueKind::Html => Some(element.inner_html()),
            _ => Some(element.text().collect::<String>()),
        },
    };

    if rule.trim {
        value = value.map(|v| v.trim().to_string());
    }

    if let (Some(pattern), Some(v)) = (rule.regex.as_deref(), value.as_deref()) {
        // An unparseable pattern or a non-match leaves the value as-is.
        if let Some(hit) = Regex::new(pattern).ok().and_then(|re| {
            re.captures(v)
                .and_then(|caps| caps.get(1).or_else(|| caps.get(0)))
                .map(|m| m.as_str().to_string())
        }) {
            value = Some(hit);
        }
    }

    if rule.kind == ValueKind::Number {
        return match value.as_deref().and_then(parse_loose_number) {
            Some(n) => serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number),
            None => Value::Null,
        };
    }

    value.map_or(Value::Null, Value::String)
}

/// Locale-lenient numeric parsing: keep only `[0-9.,-]`, then decide
/// which separator is the decimal point. When both appear, periods are
/// thousands separators and the first comma is the decimal point;
/// otherwise the first comma becomes a period. Inputs with a lone
/// separator stay ambiguous ("1,234" parses as 1.234).
fn parse_loose_number(raw: &str) -> Option<f64> {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();

    let normalized = if kept.contains('.') && kept.contains(',') {
        kept.replace('.', "").replacen(',', ".", 1)
    } else {
        kept.replacen(',', ".", 1)
    };
    normalized.parse::<f64>().ok()
}
