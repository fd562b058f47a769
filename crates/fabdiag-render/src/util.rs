// Shared text helpers for the three emitters.

use rustc_hash::FxHashSet;
use std::fmt::Write as _;

/// Escapes text for XML attribute values. Newlines become `&#xa;` so multi-line labels survive
/// attribute normalization.
pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '\n' => out.push_str("&#xa;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escapes text for a double-quoted DOT string; newlines become `\n`.
pub(crate) fn escape_dot(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escapes text for a double-quoted Mermaid label; newlines become `<br>`.
pub(crate) fn escape_mermaid(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("#quot;"),
            '\n' => out.push_str("<br>"),
            _ => out.push(ch),
        }
    }
    out
}

/// Formats a coordinate with at most two decimals and no trailing zeros.
pub(crate) fn fmt_num(v: f64) -> String {
    let mut out = String::new();
    fmt_num_into(&mut out, v);
    out
}

pub(crate) fn fmt_num_into(out: &mut String, v: f64) {
    if !v.is_finite() || v.abs() < 0.005 {
        out.push('0');
        return;
    }
    let start = out.len();
    let _ = write!(out, "{v:.2}");
    while out.len() > start && out.ends_with('0') {
        out.pop();
    }
    if out.ends_with('.') {
        out.pop();
    }
}

pub(crate) fn round_to(v: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    let r = (v * scale).round() / scale;
    if r == 0.0 { 0.0 } else { r }
}

/// Replaces everything but ASCII letters and digits with `_`.
pub(crate) fn sanitize_id(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Hands out identifiers that are unique within one document.
///
/// A base that is already taken gets `_2`, `_3`, ... appended.
#[derive(Debug, Default)]
pub(crate) struct IdAllocator {
    taken: FxHashSet<String>,
}

impl IdAllocator {
    pub(crate) fn claim(&mut self, base: String) -> String {
        let mut candidate = base.clone();
        let mut n = 2;
        while !self.taken.insert(candidate.clone()) {
            candidate = format!("{base}_{n}");
            n += 1;
        }
        candidate
    }
}
