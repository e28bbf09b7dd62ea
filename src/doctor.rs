use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::constants::{
    CURRENCY_PREFIX, DEFAULT_EXPERIENCE_TEXT, DEFAULT_FEES, DEFAULT_FEES_WITH_SYMBOL,
    UNKNOWN_DOCTOR_NAME,
};

static EXPERIENCE_YEARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([0-9]+)\s*years?").expect("valid experience regex"));

/// A provider record with every optional upstream field resolved to a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub photo: String,
    pub specialties: Vec<String>,
    pub fees: String,
    pub fee_amount: i64,
    pub fees_with_symbol: String,
    pub experience_years: u32,
    pub experience_text: String,
    pub languages: Vec<String>,
    pub clinic: String,
    pub location: String,
    pub city: String,
    pub video_consult: bool,
    pub in_clinic: bool,
    pub qualification: String,
    pub symptoms: Vec<String>,
}

impl Doctor {
    /// `needle` must already be trimmed and lower-cased.
    pub fn matches_search(&self, needle: &str) -> bool {
        contains_lower(&self.name, needle)
            || self.specialties.iter().any(|s| contains_lower(s, needle))
            || contains_lower(&self.clinic, needle)
            || self.symptoms.iter().any(|s| contains_lower(s, needle))
    }

    pub fn has_any_specialty(&self, selected: &BTreeSet<String>) -> bool {
        self.specialties.iter().any(|s| selected.contains(s))
    }
}

fn contains_lower(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

pub fn normalize_doctors(payload: &Value) -> Vec<Doctor> {
    let Some(arr) = payload.as_array() else {
        return Vec::new();
    };
    arr.iter().map(normalize_doctor).collect()
}

pub fn normalize_doctor(raw: &Value) -> Doctor {
    let (fees, fees_with_symbol) = fee_texts(raw.get("fees"));
    let fee_amount = leading_integer(&fees).unwrap_or(0);

    let experience = non_empty_str(raw.get("experience"));

    let clinic = raw.get("clinic");
    let address = clinic.and_then(|c| c.get("address"));

    Doctor {
        id: id_text(raw.get("id")),
        name: non_empty_str(raw.get("name"))
            .unwrap_or(UNKNOWN_DOCTOR_NAME)
            .to_string(),
        photo: str_or_empty(raw.get("photo")),
        specialties: names(raw.get("specialities")),
        fees,
        fee_amount,
        fees_with_symbol,
        experience_years: experience.map(experience_years).unwrap_or(0),
        experience_text: experience
            .unwrap_or(DEFAULT_EXPERIENCE_TEXT)
            .to_string(),
        languages: raw
            .get("languages")
            .and_then(|x| x.as_array())
            .map(|a| {
                a.iter()
                    .filter_map(|x| x.as_str())
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default(),
        clinic: str_or_empty(clinic.and_then(|c| c.get("name"))),
        location: str_or_empty(address.and_then(|a| a.get("locality"))),
        city: str_or_empty(address.and_then(|a| a.get("city"))),
        video_consult: truthy(raw.get("video_consult")),
        in_clinic: truthy(raw.get("in_clinic")),
        qualification: str_or_empty(raw.get("doctor_introduction")),
        symptoms: names(raw.get("symptoms")),
    }
}

/// Years of experience from text like "13 Years of experience"; 0 when absent.
pub fn experience_years(text: &str) -> u32 {
    EXPERIENCE_YEARS_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .unwrap_or(0)
}

/// Parses the leading integer of `s` the way a browser's `parseInt` does:
/// leading whitespace, an optional sign, then digits up to the first non-digit.
pub fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let value: i64 = rest[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Every specialty name in the raw payload, deduplicated and sorted.
pub fn all_specialties(payload: &Value) -> Vec<String> {
    let Some(arr) = payload.as_array() else {
        return Vec::new();
    };
    let mut set = BTreeSet::new();
    for doctor in arr {
        set.extend(names(doctor.get("specialities")));
    }
    set.into_iter().collect()
}

/// Narrows the specialty options by the filter panel's own search box.
pub fn specialty_options<'a>(specialties: &'a [String], needle: &str) -> Vec<&'a str> {
    let needle = needle.trim().to_lowercase();
    specialties
        .iter()
        .map(String::as_str)
        .filter(|s| needle.is_empty() || s.to_lowercase().contains(&needle))
        .collect()
}

fn non_empty_str(v: Option<&Value>) -> Option<&str> {
    v.and_then(|x| x.as_str()).filter(|s| !s.is_empty())
}

fn str_or_empty(v: Option<&Value>) -> String {
    non_empty_str(v).unwrap_or("").to_string()
}

fn id_text(v: Option<&Value>) -> String {
    match v {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

// (display text without the currency prefix, text with it)
fn fee_texts(v: Option<&Value>) -> (String, String) {
    let (text, with_symbol) = match v {
        Some(Value::String(s)) if !s.is_empty() => {
            (s.replacen(CURRENCY_PREFIX, "", 1), s.clone())
        }
        Some(Value::Number(n)) => (n.to_string(), format!("{CURRENCY_PREFIX}{n}")),
        _ => return (DEFAULT_FEES.to_string(), DEFAULT_FEES_WITH_SYMBOL.to_string()),
    };
    let text = if text.is_empty() {
        DEFAULT_FEES.to_string()
    } else {
        text
    };
    (text, with_symbol)
}

// Accepts both `["Fever"]` and `[{"name": "Fever"}]`.
fn names(v: Option<&Value>) -> Vec<String> {
    let Some(arr) = v.and_then(|x| x.as_array()) else {
        return Vec::new();
    };
    arr.iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.as_str()),
            other => other.get("name").and_then(|x| x.as_str()),
        })
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn truthy(v: Option<&Value>) -> bool {
    match v {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("yes") || s == "1"
        }
        _ => false,
    }
}
