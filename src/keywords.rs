//! Vocabulary extraction from high-gravity entries.
//!
//! Entry content may interleave prompt lines (`[Query]: ...`) inserted by the
//! writing assistant with the user's answers (`[Log]: ...`). Only the answers
//! are counted.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::models::{JournalRecord, KeywordFrequency};

pub const PROMPT_MARKER: &str = "[Query]:";
pub const RESPONSE_MARKER: &str = "[Log]:";
pub const MAX_KEYWORDS: usize = 20;

const STOPWORDS: [&str; 25] = [
    "이것", "그것", "저것", "있다", "없다", "하다", "되다", "않다", "것이", "나는", "내가", "우리",
    "그리고", "하지만", "그런데", "the", "is", "am", "are", "and", "or", "but", "in", "on", "at",
];

fn hangul_words() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[가-힣]{2,}").unwrap())
}

fn latin_words() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[a-zA-Z]{2,}").unwrap())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Prompt,
    Response,
}

/// Returns the user-authored part of `content`.
///
/// Text after a response marker, including continuation lines, is kept until
/// the next prompt marker. Content without any response marker is returned
/// whole.
pub fn user_text(content: &str) -> String {
    let mut section = Section::Prompt;
    let mut saw_response = false;
    let mut parts: Vec<&str> = Vec::new();

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with(PROMPT_MARKER) {
            section = Section::Prompt;
        } else if let Some(rest) = trimmed.strip_prefix(RESPONSE_MARKER) {
            section = Section::Response;
            saw_response = true;
            let rest = rest.trim();
            if !rest.is_empty() {
                parts.push(rest);
            }
        } else if section == Section::Response && !trimmed.is_empty() {
            parts.push(trimmed);
        }
    }

    if saw_response {
        parts.join(" ")
    } else {
        content.to_string()
    }
}

/// Hangul tokens first, then Latin tokens, each lowercased, stopwords removed.
pub fn tokenize(text: &str) -> Vec<String> {
    hangul_words()
        .find_iter(text)
        .chain(latin_words().find_iter(text))
        .map(|token| token.as_str().to_lowercase())
        .filter(|token| !STOPWORDS.contains(&token.as_str()))
        .collect()
}

/// Most frequent words across the user text of records with gravity at or
/// above `gravity_threshold`. Equal counts keep first-seen order.
pub fn extract_keywords(records: &[JournalRecord], gravity_threshold: i32) -> Vec<KeywordFrequency> {
    let text = records
        .iter()
        .filter(|record| record.gravity() >= gravity_threshold)
        .map(|record| user_text(&record.content))
        .collect::<Vec<_>>();

    if text.is_empty() {
        return Vec::new();
    }

    let text = text.join(" ");
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut frequencies: Vec<KeywordFrequency> = Vec::new();

    for token in tokenize(&text) {
        match index.get(&token) {
            Some(&position) => frequencies[position].count += 1,
            None => {
                index.insert(token.clone(), frequencies.len());
                frequencies.push(KeywordFrequency {
                    word: token,
                    count: 1,
                });
            }
        }
    }

    frequencies.sort_by(|a, b| b.count.cmp(&a.count));
    frequencies.truncate(MAX_KEYWORDS);

    tracing::debug!(
        threshold = gravity_threshold,
        distinct = index.len(),
        kept = frequencies.len(),
        "keywords extracted"
    );

    frequencies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LogKind;

    fn record(id: i64, gravity: i32, content: &str) -> JournalRecord {
        JournalRecord {
            id,
            timestamp: "2024-12-05T09:18:00".to_string(),
            content: content.to_string(),
            external_pull: gravity,
            core_stability: 40,
            kind: LogKind::Daily,
        }
    }

    #[test]
    fn discards_prompt_segments() {
        let records = vec![record(
            1,
            75,
            "[Query]: ignored text\n[Log]: race condition race condition",
        )];
        let keywords = extract_keywords(&records, 70);
        assert_eq!(
            keywords[0],
            KeywordFrequency {
                word: "race".to_string(),
                count: 2
            }
        );
        assert_eq!(keywords[1].word, "condition");
        assert!(keywords.iter().all(|k| k.word != "ignored" && k.word != "text"));
    }

    #[test]
    fn keeps_continuation_lines_until_next_prompt() {
        let content = "[Query]: first question\n[Log]: deploy failed\n  rollback again\n\n[Query]: second question\n[Log]: 오늘 배포 실패";
        assert_eq!(user_text(content), "deploy failed rollback again 오늘 배포 실패");
    }

    #[test]
    fn content_without_markers_is_used_whole() {
        let content = "plain entry\nsecond line";
        assert_eq!(user_text(content), content);
    }

    #[test]
    fn empty_responses_still_drop_prompts() {
        assert_eq!(user_text("[Query]: what now?\n[Log]: "), "");
    }

    #[test]
    fn tokenizes_both_scripts_and_drops_stopwords() {
        let tokens = tokenize("The Server 서버가 다운 그리고 a 1234 x 나는 OK");
        assert_eq!(tokens, vec!["서버가", "다운", "server", "ok"]);
    }

    #[test]
    fn case_folds_before_counting() {
        let records = vec![record(1, 90, "Deploy DEPLOY deploy")];
        let keywords = extract_keywords(&records, 70);
        assert_eq!(keywords.len(), 1);
        assert_eq!(keywords[0].count, 3);
    }

    #[test]
    fn ignores_records_below_threshold() {
        let records = vec![record(1, 69, "burnout burnout"), record(2, 70, "sleep")];
        let keywords = extract_keywords(&records, 70);
        assert_eq!(keywords.len(), 1);
        assert_eq!(keywords[0].word, "sleep");
        assert!(extract_keywords(&records, 95).is_empty());
    }

    #[test]
    fn returns_at_most_twenty_words() {
        let words: Vec<String> = (0..30)
            .map(|i| format!("w{}", "abcdefghijklmnopqrstuvwxyz".chars().nth(i % 26).unwrap()))
            .collect();
        let content = words.join(" ");
        let keywords = extract_keywords(&[record(1, 80, &content)], 70);
        assert_eq!(keywords.len(), MAX_KEYWORDS);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let keywords = extract_keywords(&[record(1, 80, "zebra apple zebra apple mango")], 70);
        let words: Vec<&str> = keywords.iter().map(|k| k.word.as_str()).collect();
        assert_eq!(words, vec!["zebra", "apple", "mango"]);
    }
}
