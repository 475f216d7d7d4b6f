//! Endpoint normalization
//!
//! Collapses concrete identifiers so that requests for different books,
//! languages or ids group under one endpoint.

use once_cell::sync::Lazy;
use regex::Regex;
use url::form_urlencoded;

const BOOK_CODES: [&str; 66] = [
    "GEN", "EXO", "LEV", "NUM", "DEU", "JOS", "JDG", "RUT", "1SA", "2SA", "1KI", "2KI", "1CH",
    "2CH", "EZR", "NEH", "EST", "JOB", "PSA", "PRO", "ECC", "SNG", "ISA", "JER", "LAM", "EZK",
    "DAN", "HOS", "JOL", "AMO", "OBA", "JON", "MIC", "NAM", "HAB", "ZEP", "HAG", "ZEC", "MAL",
    "MAT", "MRK", "LUK", "JHN", "ACT", "ROM", "1CO", "2CO", "GAL", "EPH", "PHP", "COL", "1TH",
    "2TH", "1TI", "2TI", "TIT", "PHM", "HEB", "JAS", "1PE", "2PE", "1JN", "2JN", "3JN", "JUD",
    "REV",
];

static NUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("Invalid numeric regex"));
static REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+:\d+(-\d+)?$").expect("Invalid reference regex"));
static USFM_FILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\d{2}-([1-3]?[A-Z]{2,3})\.usfm$").expect("Invalid USFM file regex")
});
static TSV_FILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^([a-z]+)_([1-3]?[A-Z]{2,3})\.tsv$").expect("Invalid TSV file regex")
});
static LANG_RESOURCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z]{2,3}(?:-[A-Za-z0-9]+)*_([a-z]+)$")
        .expect("Invalid language resource regex")
});

fn is_book(code: &str) -> bool {
    BOOK_CODES.contains(&code.to_ascii_uppercase().as_str())
}

fn normalize_segment(segment: &str) -> String {
    if NUMERIC.is_match(segment) {
        return "{id}".to_string();
    }
    if REFERENCE.is_match(segment) {
        return "{ref}".to_string();
    }
    if BOOK_CODES.contains(&segment) {
        return "{book}".to_string();
    }
    if let Some(caps) = USFM_FILE.captures(segment) {
        if is_book(&caps[1]) {
            return "{book}.usfm".to_string();
        }
    }
    if let Some(caps) = TSV_FILE.captures(segment) {
        if is_book(&caps[2]) {
            return format!("{}_{{book}}.tsv", &caps[1]);
        }
    }
    if let Some(caps) = LANG_RESOURCE.captures(segment) {
        return format!("{{lang}}_{}", &caps[1]);
    }
    segment.to_string()
}

fn normalize_query_value(key: &str, value: &str) -> String {
    match key.to_ascii_lowercase().as_str() {
        "lang" | "language" => "{lang}".to_string(),
        "book" => "{book}".to_string(),
        "reference" | "ref" => "{ref}".to_string(),
        _ if NUMERIC.is_match(value) => "{n}".to_string(),
        _ => value.to_string(),
    }
}

/// Normalize an endpoint path and its query string
pub fn normalize_endpoint(endpoint: &str) -> String {
    let (path, query) = match endpoint.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (endpoint, None),
    };

    let path = path
        .split('/')
        .map(normalize_segment)
        .collect::<Vec<_>>()
        .join("/");

    let Some(query) = query else {
        return path;
    };

    let mut pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
        .map(|(key, value)| {
            let value = normalize_query_value(&key, &value);
            (key.into_owned(), value)
        })
        .collect();
    if pairs.is_empty() {
        return path;
    }
    pairs.sort();

    let query = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", path, query)
}
