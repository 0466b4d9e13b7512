//! Keyword evidence: skill phrases, experience requirements and resume sections

use crate::error::{Result, ResumeScorerError};
use aho_corasick::{AhoCorasick, MatchKind};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use strsim::jaro_winkler;
use unicode_segmentation::UnicodeSegmentation;

const MIN_SKILL_LEN: usize = 2;
const MAX_SKILL_LEN: usize = 40;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzySkillMatch {
    pub skill: String,
    pub matched_text: String,
    pub similarity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillCoverage {
    pub matched: Vec<String>,
    pub fuzzy: Vec<FuzzySkillMatch>,
    pub missing: Vec<String>,
    /// Share of skills found exactly or fuzzily, 1.0 when nothing was asked for
    pub coverage: f32,
}

pub struct SkillExtractor {
    cue_patterns: Vec<Regex>,
    list_separator: Regex,
    standalone: Regex,
    experience_patterns: Vec<Regex>,
}

impl Default for SkillExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SkillExtractor {
    pub fn new() -> Self {
        let cue_patterns = [
            r"(?i)(?:proficient|expert|skilled|experienced|knowledge|strong background|familiar|competent|working knowledge|hands-on experience) (?:in|with|of) ([^.;\n]+)",
            r"\b([A-Z][A-Z0-9&]*(?: [A-Z][A-Z0-9&]*)*) (?i:development|programming|engineering|design|analysis|management)\b",
            r"\b([A-Z][A-Z0-9&]*(?: [A-Z][A-Z0-9&]*)*) (?i:framework|library|tool|platform|system|service)\b",
            r"\b([A-Z][A-Z0-9&]*(?: [A-Z][A-Z0-9&]*)*) (?i:certification|certified)\b",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("Invalid skill regex"))
        .collect();

        let list_separator = Regex::new(r"(?i)\s*(?:,|\band\b|\bor\b)\s*")
            .expect("Invalid list separator regex");

        let standalone = Regex::new(r"\b[A-Z][A-Z0-9]+(?: [A-Z][A-Z0-9]+){0,2}\b")
            .expect("Invalid standalone skill regex");

        let experience_patterns = [
            r"(?i)(?:required|must have|looking for|seeking)[^.]*?(?:years|experience)[^.]*",
            r"(?i)(?:minimum|at least)[^.]*?(?:years|experience)[^.]*",
            r"(?i)(?:experience with|experience in)[^.]*",
            r"(?i)(?:proven track record|demonstrated experience)[^.]*",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("Invalid experience regex"))
        .collect();

        Self {
            cue_patterns,
            list_separator,
            standalone,
            experience_patterns,
        }
    }

    /// Skill phrases a job description asks for, in order of first mention
    pub fn extract_skills(&self, text: &str) -> Vec<String> {
        let mut found = Vec::new();

        for pattern in &self.cue_patterns {
            for cap in pattern.captures_iter(text) {
                if let Some(group) = cap.get(1) {
                    for piece in self.list_separator.split(group.as_str()) {
                        found.push((group.start(), piece.trim().to_string()));
                    }
                }
            }
        }

        for mat in self.standalone.find_iter(text) {
            found.push((mat.start(), mat.as_str().to_string()));
        }

        found.sort_by_key(|(pos, _)| *pos);
        dedup_case_insensitive(
            found
                .into_iter()
                .map(|(_, skill)| skill)
                .filter(|s| (MIN_SKILL_LEN..=MAX_SKILL_LEN).contains(&s.chars().count())),
        )
    }

    /// Sentences stating experience requirements, at least four words long
    pub fn extract_experience_requirements(&self, text: &str) -> Vec<String> {
        let mut found = Vec::new();
        for pattern in &self.experience_patterns {
            for mat in pattern.find_iter(text) {
                let sentence = mat.as_str().trim();
                if sentence.unicode_words().count() >= 4 {
                    found.push((mat.start(), sentence.to_string()));
                }
            }
        }
        found.sort_by_key(|(pos, _)| *pos);
        dedup_case_insensitive(found.into_iter().map(|(_, s)| s))
    }
}

fn dedup_case_insensitive(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .filter(|item| seen.insert(item.to_lowercase()))
        .collect()
}

/// Finds job skills inside a resume, exactly first and fuzzily second
pub struct SkillMatcher {
    fuzzy_threshold: f32,
}

impl Default for SkillMatcher {
    fn default() -> Self {
        Self { fuzzy_threshold: 0.9 }
    }
}

impl SkillMatcher {
    pub fn coverage(&self, skills: &[String], resume_text: &str) -> Result<SkillCoverage> {
        if skills.is_empty() {
            return Ok(SkillCoverage {
                matched: Vec::new(),
                fuzzy: Vec::new(),
                missing: Vec::new(),
                coverage: 1.0,
            });
        }

        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::Standard)
            .build(skills)
            .map_err(|e| ResumeScorerError::Processing(format!("Failed to build skill matcher: {}", e)))?;

        // Overlapping so "SQL" still counts when "SQL Server" covers it
        let hits: HashSet<usize> = matcher
            .find_overlapping_iter(resume_text)
            .filter(|m| is_word_boundary(resume_text, m.start(), m.end()))
            .map(|m| m.pattern().as_usize())
            .collect();

        let resume_words: Vec<String> = resume_text
            .unicode_words()
            .map(|w| w.to_lowercase())
            .collect();

        let mut matched = Vec::new();
        let mut fuzzy = Vec::new();
        let mut missing = Vec::new();

        for (idx, skill) in skills.iter().enumerate() {
            if hits.contains(&idx) {
                matched.push(skill.clone());
            } else if let Some(found) = self.best_fuzzy(skill, &resume_words) {
                fuzzy.push(found);
            } else {
                missing.push(skill.clone());
            }
        }

        let coverage = (matched.len() + fuzzy.len()) as f32 / skills.len() as f32;

        Ok(SkillCoverage {
            matched,
            fuzzy,
            missing,
            coverage,
        })
    }

    /// Single-word skills only; short words compare too loosely
    fn best_fuzzy(&self, skill: &str, resume_words: &[String]) -> Option<FuzzySkillMatch> {
        let skill_lower = skill.to_lowercase();
        if skill_lower.contains(' ') || skill_lower.chars().count() < 4 {
            return None;
        }

        resume_words
            .iter()
            .filter(|w| w.chars().count() >= 4)
            .map(|w| (w, jaro_winkler(&skill_lower, w) as f32))
            .filter(|(_, score)| *score >= self.fuzzy_threshold)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(w, score)| FuzzySkillMatch {
                skill: skill.to_string(),
                matched_text: w.clone(),
                similarity: score,
            })
    }
}

fn is_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.map_or(false, char::is_alphanumeric) && !after.map_or(false, char::is_alphanumeric)
}

/// Canonical resume section names keyed by the heading words that introduce them
const SECTION_HEADERS: &[(&str, &str)] = &[
    (r"professional summary|summary|profile", "Professional Summary"),
    (r"experience|work history|employment", "Professional Experience"),
    (r"education|academic", "Education"),
    (r"skills|technical skills|core competencies", "Skills"),
    (r"projects|key projects", "Projects"),
    (r"achievements|accomplishments", "Achievements"),
    (r"contact|personal information", "Contact Information"),
];

/// Heading lines are short, so body sentences mentioning "experience" do not count
const MAX_HEADING_WORDS: usize = 4;

pub struct SectionDetector {
    /// (heading line pattern, inline all-caps pattern, canonical name)
    headers: Vec<(Regex, Regex, &'static str)>,
}

impl Default for SectionDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionDetector {
    pub fn new() -> Self {
        let headers = SECTION_HEADERS
            .iter()
            .map(|(pattern, name)| {
                let line = Regex::new(&format!(r"(?i)\b(?:{})\b", pattern))
                    .expect("Invalid section regex");
                let inline = Regex::new(&format!(r"\b(?:{})\b", pattern.to_uppercase()))
                    .expect("Invalid inline section regex");
                (line, inline, *name)
            })
            .collect();
        Self { headers }
    }

    /// Canonical section names in order of first appearance.
    ///
    /// Short lines are matched as headings in any case. Long lines, such as
    /// PDF pages with their line breaks collapsed, only yield all-caps
    /// headings found inline.
    pub fn detect_sections(&self, text: &str) -> Vec<String> {
        let mut sections: Vec<String> = Vec::new();
        let mut push = |name: &str| {
            if !sections.iter().any(|s| s == name) {
                sections.push(name.to_string());
            }
        };

        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if line.unicode_words().count() <= MAX_HEADING_WORDS {
                if let Some((_, _, name)) = self.headers.iter().find(|(re, _, _)| re.is_match(line)) {
                    push(*name);
                }
                continue;
            }

            let mut inline: Vec<(usize, &str)> = self
                .headers
                .iter()
                .filter_map(|(_, re, name)| re.find(line).map(|m| (m.start(), *name)))
                .collect();
            inline.sort_by_key(|(pos, _)| *pos);
            for (_, name) in inline {
                push(name);
            }
        }

        sections
    }
}
