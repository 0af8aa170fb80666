//! Keyword filter over a harvested corpus: keeps ads that mention AI/ML terms.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;

use itertools::Itertools;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::classify::OccupationShape;
use crate::error::SinkError;

pub const DEFAULT_OUTPUT_FILE: &str = "ai_ads_final_analysis_data.jsonl";
pub const DEFAULT_PROGRESS_EVERY: usize = 20_000;

/// English and Swedish AI/ML vocabulary, plus products and vendors.
pub const AI_KEYWORDS: &[&str] = &[
    r"\bAI\b",
    r"\bML\b",
    r"\bNLP\b",
    r"\bLLM\b",
    r"artificiell intelligens",
    r"maskininlärning",
    r"machine learning",
    r"deep learning",
    r"neurala nätverk",
    r"neural networks",
    r"computer vision",
    r"datorseende",
    r"natural language processing",
    r"generativ ai",
    r"generative ai",
    r"genai",
    r"språkmodell",
    r"language model",
    r"reinforcement learning",
    r"prediktiv analys",
    r"predictive analysis",
    r"chatgpt",
    r"openai",
    r"gpt-3",
    r"gpt-4",
    r"gpt-4o",
    r"copilot",
    r"midjourney",
    r"dall-e",
    r"stable diffusion",
    r"hugging face",
    r"pytorch",
    r"tensorflow",
    r"keras",
    r"scikit-learn",
    r"langchain",
    r"gemini",
    r"anthropic",
    r"claude",
    r"bert",
    r"transformer model",
];

/// Precompiled case-insensitive alternation over a keyword list.
pub struct KeywordMatcher {
    re: Regex,
}

impl KeywordMatcher {
    pub fn new(patterns: &[&str]) -> Result<Self, regex::Error> {
        let re = Regex::new(&format!("(?i){}", patterns.iter().join("|")))?;
        Ok(KeywordMatcher { re })
    }

    pub fn ai() -> Result<Self, regex::Error> {
        Self::new(AI_KEYWORDS)
    }

    /// Distinct matched substrings, in order of first appearance.
    pub fn find_terms(&self, text: &str) -> Vec<String> {
        self.re
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .unique()
            .collect()
    }
}

/// Reduced record written for every matching ad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredAdRecord {
    pub id: Option<Value>,
    pub headline: String,
    pub employer_name: Option<Value>,
    pub publication_date: Option<Value>,
    pub employment_type: Option<Value>,
    pub municipality: Option<Value>,
    pub county: Option<Value>,
    pub region: Option<Value>,
    pub occupation_label: Option<Value>,
    pub match_keyword: String,
    pub full_description_text: String,
}

/// Check one corpus line. `None` for malformed JSON, missing description text,
/// or no keyword hit.
pub fn filter_line(line: &str, matcher: &KeywordMatcher) -> Option<FilteredAdRecord> {
    let data: Value = serde_json::from_str(line).ok()?;

    let headline = data
        .get("headline")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let ad_text = data
        .get("description")
        .and_then(|d| d.get("text"))
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())?;

    let searchable = format!("{} {}", headline, ad_text).to_lowercase();
    let terms = matcher.find_terms(&searchable);
    if terms.is_empty() {
        return None;
    }

    Some(FilteredAdRecord {
        id: field(&data, "id"),
        employer_name: field(&data, "employer_name"),
        publication_date: field(&data, "publication_date"),
        employment_type: field(&data, "employment_type"),
        municipality: field(&data, "municipality")
            .or_else(|| address_field(&data, "municipality")),
        county: field(&data, "county")
            .or_else(|| address_field(&data, "county"))
            .or_else(|| address_field(&data, "region")),
        region: field(&data, "region").or_else(|| address_field(&data, "region")),
        occupation_label: field(&data, "occupation_label").or_else(|| occupation_label(&data)),
        match_keyword: terms.join(", "),
        full_description_text: ad_text.to_string(),
        headline,
    })
}

fn field(data: &Value, key: &str) -> Option<Value> {
    data.get(key).filter(|v| !v.is_null()).cloned()
}

fn address_field(data: &Value, key: &str) -> Option<Value> {
    data.get("workplace_address").and_then(|a| field(a, key))
}

fn occupation_label(data: &Value) -> Option<Value> {
    OccupationShape::of(data.get("occupation"))
        .mapping()
        .and_then(|m| m.get("label"))
        .filter(|v| !v.is_null())
        .cloned()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSummary {
    pub lines: usize,
    pub matches: usize,
}

/// Stream `input` line by line and write every match to `output`.
pub fn filter_stream<R, W>(
    input: R,
    output: &mut W,
    matcher: &KeywordMatcher,
    progress_every: usize,
) -> Result<FilterSummary, SinkError>
where
    R: BufRead,
    W: Write,
{
    let mut summary = FilterSummary::default();

    for raw in input.split(b'\n') {
        let raw = raw?;
        summary.lines += 1;
        if progress_every > 0 && summary.lines % progress_every == 0 {
            info!(line = summary.lines, matches = summary.matches, "--> processing");
        }

        let Ok(line) = std::str::from_utf8(&raw) else {
            continue;
        };
        if let Some(record) = filter_line(line, matcher) {
            serde_json::to_writer(&mut *output, &record)?;
            output.write_all(b"\n")?;
            summary.matches += 1;
        }
    }

    output.flush()?;
    Ok(summary)
}

/// Filter `input_path` into `output_path`. Returns `Ok(None)` without creating
/// the output when the input file does not exist.
pub fn filter_file(
    input_path: &Path,
    output_path: &Path,
    matcher: &KeywordMatcher,
    progress_every: usize,
) -> Result<Option<FilterSummary>, SinkError> {
    let input = match File::open(input_path) {
        Ok(f) => BufReader::new(f),
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut output = BufWriter::new(File::create(output_path)?);
    let summary = filter_stream(input, &mut output, matcher, progress_every)?;
    Ok(Some(summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn matcher() -> KeywordMatcher {
        KeywordMatcher::ai().unwrap()
    }

    fn line(headline: &str, text: &str) -> String {
        json!({"id": "1", "headline": headline, "description": {"text": text}}).to_string()
    }

    #[test]
    fn keyword_list_compiles() {
        assert!(KeywordMatcher::ai().is_ok());
    }

    #[test]
    fn matches_machine_learning() {
        let rec = filter_line(&line("Data scientist", "Erfarenhet av machine learning."), &matcher())
            .unwrap();
        assert_eq!(rec.match_keyword, "machine learning");
        assert_eq!(rec.full_description_text, "Erfarenhet av machine learning.");
        assert_eq!(rec.headline, "Data scientist");
    }

    #[test]
    fn case_insensitive() {
        let rec = filter_line(&line("Utvecklare", "Machine Learning och PyTorch"), &matcher())
            .unwrap();
        assert!(rec.match_keyword.contains("machine learning"));
        assert!(rec.match_keyword.contains("pytorch"));
    }

    #[test]
    fn word_bounded_acronyms() {
        let rec = filter_line(&line("AI-utvecklare", "Vi bygger tjänster."), &matcher()).unwrap();
        assert_eq!(rec.match_keyword, "ai");
        assert!(filter_line(&line("Mailansvarig", "Hantera email."), &matcher()).is_none());
    }

    #[test]
    fn distinct_terms_in_order() {
        let rec = filter_line(
            &line("", "Maskininlärning, LLM och mer maskininlärning"),
            &matcher(),
        )
        .unwrap();
        assert_eq!(rec.match_keyword, "maskininlärning, llm");
    }

    #[test]
    fn headline_alone_is_not_enough() {
        let no_text = json!({"headline": "Machine learning engineer", "description": {}}).to_string();
        assert!(filter_line(&no_text, &matcher()).is_none());
        let no_desc = json!({"headline": "Machine learning engineer"}).to_string();
        assert!(filter_line(&no_desc, &matcher()).is_none());
        let null_desc =
            json!({"headline": "Machine learning engineer", "description": null}).to_string();
        assert!(filter_line(&null_desc, &matcher()).is_none());
    }

    #[test]
    fn malformed_line_skipped() {
        assert!(filter_line("{not json", &matcher()).is_none());
        assert!(filter_line("", &matcher()).is_none());
    }

    #[test]
    fn location_falls_back_to_address() {
        let l = json!({
            "headline": "ML-ingenjör",
            "description": {"text": "Deep learning i Umeå"},
            "workplace_address": {"municipality": "Umeå", "region": "Västerbottens län"},
            "occupation": {"label": "Mjukvaruutvecklare"},
            "employment_type": {"label": "Vanlig anställning"}
        })
        .to_string();
        let rec = filter_line(&l, &matcher()).unwrap();
        assert_eq!(rec.municipality, Some(json!("Umeå")));
        assert_eq!(rec.county, Some(json!("Västerbottens län")));
        assert_eq!(rec.region, Some(json!("Västerbottens län")));
        assert_eq!(rec.occupation_label, Some(json!("Mjukvaruutvecklare")));
        assert_eq!(rec.employment_type, Some(json!({"label": "Vanlig anställning"})));
    }

    #[test]
    fn stream_counts_lines_and_matches() {
        let corpus = format!(
            "{}\nnot json\n{}\n",
            line("Analytiker", "Vi använder machine learning"),
            line("Snickare", "Bygga hus")
        );
        let mut out = Vec::new();
        let summary = filter_stream(corpus.as_bytes(), &mut out, &matcher(), 1).unwrap();
        assert_eq!(summary, FilterSummary { lines: 3, matches: 1 });
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
