//! LLM-judge verdicts and their tally

use std::fmt;

use serde::{Deserialize, Serialize};

pub const VERDICT_CORRECT: &str = "正確";
pub const VERDICT_INCORRECT: &str = "不正確";

/// Benchmark files answered by a generation run, relative to the benchmark dir
pub const GENERATION_BENCHMARKS: [&str; 2] = ["faq.csv", "military_questions.csv"];

/// Prompt sent to the judge model; no ground truth is given
pub fn judge_prompt(question: &str, answer: &str) -> String {
    format!(
        "請根據以下 Question 判斷模型的回答是否合理：\n\nQuestion:\n{}\n\nAnswer:\n{}\n\n請只回答：「{}」或「{}」。",
        question, answer, VERDICT_CORRECT, VERDICT_INCORRECT
    )
}

/// One answered-and-judged benchmark question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRow {
    pub question: String,
    pub answer: String,
    /// Raw judge output, or `Error: ...` when the judge call failed
    pub evaluation: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect,
    Unrecognized(String),
}

impl Verdict {
    pub fn parse(raw: &str) -> Self {
        let normalized = normalize_verdict(raw);

        match normalized.as_str() {
            VERDICT_CORRECT => Verdict::Correct,
            VERDICT_INCORRECT => Verdict::Incorrect,
            _ => Verdict::Unrecognized(normalized),
        }
    }
}

/// Fold full-width forms to ASCII, trim, lowercase and drop wrapping quotes
/// or trailing punctuation such as `「正確」。`
pub fn normalize_verdict(raw: &str) -> String {
    let folded: String = raw
        .chars()
        .map(|c| match c {
            '\u{3000}' => ' ',
            '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
            _ => c,
        })
        .collect();

    folded
        .trim()
        .to_lowercase()
        .trim_matches(|c: char| {
            c.is_whitespace()
                || matches!(
                    c,
                    '"' | '\'' | '「' | '」' | '『' | '』' | '。' | '.' | '!' | '、' | '“' | '”'
                )
        })
        .to_string()
}

/// Counts of judge verdicts; unrecognised ones count toward neither side
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerdictTally {
    pub correct: usize,
    pub incorrect: usize,
    pub unrecognized: usize,
}

impl VerdictTally {
    pub fn record(&mut self, verdict: &Verdict) {
        match verdict {
            Verdict::Correct => self.correct += 1,
            Verdict::Incorrect => self.incorrect += 1,
            Verdict::Unrecognized(_) => self.unrecognized += 1,
        }
    }

    pub fn from_evaluations<'a>(evaluations: impl IntoIterator<Item = &'a str>) -> Self {
        let mut tally = Self::default();
        for raw in evaluations {
            tally.record(&Verdict::parse(raw));
        }
        tally
    }

    pub fn judged(&self) -> usize {
        self.correct + self.incorrect
    }

    /// Fraction correct among recognised verdicts
    pub fn accuracy(&self) -> Option<f64> {
        match self.judged() {
            0 => None,
            n => Some(self.correct as f64 / n as f64),
        }
    }
}

impl fmt::Display for VerdictTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.accuracy() {
            Some(acc) => write!(f, "{:.4} ({}/{})", acc, self.correct, self.judged()),
            None => write!(f, "n/a (0/0)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_verdicts() {
        assert_eq!(Verdict::parse("正確"), Verdict::Correct);
        assert_eq!(Verdict::parse("  不正確\n"), Verdict::Incorrect);
        assert_eq!(Verdict::parse("「正確」。"), Verdict::Correct);
        assert!(matches!(Verdict::parse("maybe"), Verdict::Unrecognized(_)));
    }

    #[test]
    fn test_normalize_full_width() {
        assert_eq!(normalize_verdict("ＥＲＲＯＲ"), "error");
        assert_eq!(normalize_verdict("\u{3000}正確\u{3000}"), "正確");
    }

    #[test]
    fn test_unrecognized_excluded_from_both_sides() {
        let tally = VerdictTally::from_evaluations(["正確", "正確", "不正確", "maybe", "Error: 429"]);

        assert_eq!(tally.correct, 2);
        assert_eq!(tally.incorrect, 1);
        assert_eq!(tally.unrecognized, 2);
        assert_eq!(tally.judged(), 3);
        assert!((tally.accuracy().unwrap() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_judged_rows() {
        let tally = VerdictTally::from_evaluations(["???"]);
        assert_eq!(tally.accuracy(), None);
        assert_eq!(tally.to_string(), "n/a (0/0)");
    }

    #[test]
    fn test_judge_prompt() {
        let prompt = judge_prompt("役男可以出國嗎？", "可以");

        assert!(prompt.contains("Question:\n役男可以出國嗎？"));
        assert!(prompt.contains("Answer:\n可以"));
        assert!(prompt.ends_with("請只回答：「正確」或「不正確」。"));
    }
}
