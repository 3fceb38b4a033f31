use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

// Label portant l'uid de la base
pub const BDB_LABEL: &str = "bdb";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSample {
    pub entity_id: String,
    pub value: f64,
}

/// Valeurs d'une famille par entity-id (le dernier échantillon gagne)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricTable {
    values: HashMap<String, f64>,
}

impl MetricTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, sample: MetricSample) {
        self.values.insert(sample.entity_id, sample.value);
    }

    pub fn get(&self, entity_id: &str) -> Option<f64> {
        self.values.get(entity_id).copied()
    }

    pub fn get_or(&self, entity_id: &str, default: f64) -> f64 {
        self.get(entity_id).unwrap_or(default)
    }

    pub fn entity_ids(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<MetricSample> for MetricTable {
    fn from_iter<I: IntoIterator<Item = MetricSample>>(iter: I) -> Self {
        let mut table = MetricTable::new();
        for sample in iter {
            table.insert(sample);
        }
        table
    }
}

impl<const N: usize> From<[(&str, f64); N]> for MetricTable {
    fn from(pairs: [(&str, f64); N]) -> Self {
        pairs
            .into_iter()
            .map(|(id, value)| MetricSample { entity_id: id.to_string(), value })
            .collect()
    }
}

pub fn parse_metric(text: &str, metric_name: &str) -> MetricTable {
    let table: MetricTable = text
        .lines()
        .filter_map(|line| {
            let sample = parse_sample(line, metric_name);
            if sample.is_none() && is_sample_candidate(line, metric_name) {
                debug!(metric = metric_name, line, "skipping unparsable sample line");
            }
            sample
        })
        .collect();
    debug!(metric = metric_name, samples = table.len(), "parsed metric family");
    table
}

/// `None` si la ligne n'est pas un échantillon BDB de `metric_name`
pub fn parse_sample(line: &str, metric_name: &str) -> Option<MetricSample> {
    if metric_name.is_empty() {
        return None;
    }
    let rest = line.trim().strip_prefix(metric_name)?.strip_prefix('{')?;
    let (labels, tail) = parse_labels(rest)?;

    let entity_id = labels
        .into_iter()
        .find(|(name, _)| *name == BDB_LABEL)
        .map(|(_, value)| value)?;
    if entity_id.is_empty() || !entity_id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let value = parse_value_field(tail)?;
    Some(MetricSample { entity_id, value })
}

/// `name="value",...}` (accolade ouvrante déjà consommée)
fn parse_labels(input: &str) -> Option<(Vec<(&str, String)>, &str)> {
    let mut labels = Vec::new();
    let mut rest = input.trim_start();

    loop {
        if let Some(after) = rest.strip_prefix('}') {
            return Some((labels, after));
        }

        let (name, tail) = rest.split_at(label_name_len(rest)?);
        let tail = tail.trim_start().strip_prefix('=')?;
        let tail = tail.trim_start().strip_prefix('"')?;
        let (value, tail) = parse_quoted(tail)?;
        labels.push((name, value));

        rest = tail.trim_start();
        if let Some(after_comma) = rest.strip_prefix(',') {
            rest = after_comma.trim_start();
        } else if !rest.starts_with('}') {
            return None;
        }
    }
}

// `metric_name{` en tête de ligne
fn is_sample_candidate(line: &str, metric_name: &str) -> bool {
    !metric_name.is_empty()
        && line
            .trim()
            .strip_prefix(metric_name)
            .is_some_and(|rest| rest.starts_with('{'))
}

fn label_name_len(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => {}
        _ => return None,
    }
    Some(
        bytes
            .iter()
            .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
            .count(),
    )
}

fn parse_quoted(s: &str) -> Option<(String, &str)> {
    let mut value = String::new();
    let mut chars = s.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Some((value, &s[i + 1..])),
            '\\' => match chars.next()?.1 {
                'n' => value.push('\n'),
                other => value.push(other),
            },
            _ => value.push(c),
        }
    }
    None
}

fn parse_value_field(tail: &str) -> Option<f64> {
    if !tail.starts_with(char::is_whitespace) {
        return None;
    }
    let mut fields = tail.split_whitespace();
    let value = parse_numeric_literal(fields.next()?)?;

    match (fields.next(), fields.next()) {
        (None, _) => Some(value),
        (Some(ts), None) if is_timestamp(ts) => Some(value),
        _ => None,
    }
}

fn is_timestamp(token: &str) -> bool {
    let digits = token.strip_prefix('-').unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// `[+-]? (digits [. digits?] | . digits) ([eE] [+-]? digits)?`, fini uniquement
pub fn parse_numeric_literal(token: &str) -> Option<f64> {
    let bytes = token.as_bytes();
    let len = bytes.len();
    let digits_from = |mut i: usize| {
        while i < len && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_end = digits_from(i);
    let mut mantissa_digits = int_end - i;
    i = int_end;

    if i < len && bytes[i] == b'.' {
        let frac_end = digits_from(i + 1);
        mantissa_digits += frac_end - (i + 1);
        i = frac_end;
    }
    if mantissa_digits == 0 {
        return None;
    }

    if i < len && matches!(bytes[i], b'e' | b'E') {
        i += 1;
        if i < len && matches!(bytes[i], b'+' | b'-') {
            i += 1;
        }
        let exp_end = digits_from(i);
        if exp_end == i {
            return None;
        }
        i = exp_end;
    }

    if i != len {
        return None;
    }
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}
