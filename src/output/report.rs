//! Report structures built from an analysis outcome

use crate::config::ScoreMode;
use crate::processing::analyzer::{AnalysisOutcome, RelevantMatch};
use crate::processing::classifier::{RequirementGap, RequirementMatch};
use crate::processing::skills::SkillCoverage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Complete match report, the input to every output formatter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    /// Overall match score (0-100)
    pub match_score: u8,

    /// One-line verdict for the score
    pub assessment: String,

    /// Requirements covered well, best first
    pub strengths: Vec<RequirementMatch>,

    /// Requirements covered partially, best first
    pub improvements: Vec<RequirementMatch>,

    /// Requirements with no good counterpart, worst first
    pub gaps: Vec<RequirementGap>,

    pub relevant_matches: Vec<RelevantMatch>,
    pub skill_coverage: SkillCoverage,
    pub resume_sections: Vec<String>,
    pub experience_requirements: Vec<String>,

    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub scorer_version: String,
    pub resume_source: String,
    pub job_source: String,
    pub embedding_model: String,
    pub score_mode: ScoreMode,
    pub raw_similarity: f32,
    pub processing_time_ms: u64,
    pub resume_segment_count: usize,
    pub requirement_count: usize,
    /// Totals per category before the top-N cut
    pub strength_count: usize,
    pub improvement_count: usize,
    pub gap_count: usize,
}

/// The plain response shape: rendered analysis text plus the score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub analysis: String,
    pub match_score: u8,
}

impl MatchReport {
    pub fn from_outcome(outcome: AnalysisOutcome, resume_source: &str, job_source: &str) -> Self {
        let metadata = ReportMetadata {
            generated_at: Utc::now(),
            scorer_version: env!("CARGO_PKG_VERSION").to_string(),
            resume_source: resume_source.to_string(),
            job_source: job_source.to_string(),
            embedding_model: outcome.embedding_model,
            score_mode: outcome.score_mode,
            raw_similarity: outcome.raw_similarity,
            processing_time_ms: outcome.processing_time_ms,
            resume_segment_count: outcome.resume_segment_count,
            requirement_count: outcome.requirement_count,
            strength_count: outcome.categorization.strength_count,
            improvement_count: outcome.categorization.improvement_count,
            gap_count: outcome.categorization.gap_count,
        };

        Self {
            match_score: outcome.match_score,
            assessment: outcome.assessment,
            strengths: outcome.categorization.strengths,
            improvements: outcome.categorization.improvements,
            gaps: outcome.categorization.gaps,
            relevant_matches: outcome.relevant_matches,
            skill_coverage: outcome.skill_coverage,
            resume_sections: outcome.resume_sections,
            experience_requirements: outcome.experience_requirements,
            metadata,
        }
    }

    pub fn strength_lines(&self) -> Vec<String> {
        self.strengths
            .iter()
            .map(|m| {
                format!(
                    "- Your experience in '{}' strongly aligns with the requirement: '{}'.",
                    m.resume_segment, m.requirement
                )
            })
            .collect()
    }

    pub fn improvement_lines(&self) -> Vec<String> {
        self.improvements
            .iter()
            .map(|m| {
                format!(
                    "- Your experience with '{}' partially matches the requirement: '{}'.",
                    m.resume_segment, m.requirement
                )
            })
            .collect()
    }

    pub fn gap_lines(&self) -> Vec<String> {
        self.gaps
            .iter()
            .map(|g| {
                format!(
                    "- The requirement '{}' is not well represented in your resume.",
                    g.requirement
                )
            })
            .collect()
    }

    /// Five numbered sections, one blank line between them
    pub fn analysis_text(&self) -> String {
        let mut text = String::new();

        let _ = writeln!(text, "1. Overall Match Score: {}/100", self.match_score);
        text.push('\n');

        push_section(&mut text, "2. Key Strengths:", &self.strength_lines(), "- No strong matches found");
        push_section(
            &mut text,
            "3. Suggested Improvements:",
            &self.improvement_lines(),
            "- No moderate matches found",
        );
        push_section(
            &mut text,
            "4. Areas that need attention:",
            &self.gap_lines(),
            "- No significant gaps found",
        );

        let _ = writeln!(text, "5. Overall Assessment:");
        text.push_str(&self.assessment);

        text
    }

    pub fn to_response(&self) -> AnalysisResponse {
        AnalysisResponse {
            analysis: self.analysis_text(),
            match_score: self.match_score,
        }
    }
}

fn push_section(text: &mut String, header: &str, lines: &[String], empty: &str) {
    let _ = writeln!(text, "{}", header);
    if lines.is_empty() {
        let _ = writeln!(text, "{}", empty);
    } else {
        for line in lines {
            let _ = writeln!(text, "{}", line);
        }
    }
    text.push('\n');
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::processing::classifier::Categorization;

    pub(crate) fn sample_outcome() -> AnalysisOutcome {
        AnalysisOutcome {
            match_score: 83,
            raw_similarity: 0.67,
            document_similarity: 0.67,
            score_mode: ScoreMode::Document,
            assessment: "Your resume shows strong alignment with the job requirements.".to_string(),
            categorization: Categorization {
                strengths: vec![RequirementMatch {
                    requirement: "Experience with Rust".to_string(),
                    resume_segment: "Built services in Rust".to_string(),
                    similarity: 0.82,
                }],
                improvements: vec![RequirementMatch {
                    requirement: "Kubernetes knowledge".to_string(),
                    resume_segment: "Deployed containers with Docker".to_string(),
                    similarity: 0.48,
                }],
                gaps: vec![RequirementGap {
                    requirement: "Mentoring junior engineers".to_string(),
                    best_similarity: 0.12,
                }],
                strength_count: 1,
                improvement_count: 1,
                gap_count: 1,
            },
            relevant_matches: vec![RelevantMatch {
                requirement: "Experience with Rust".to_string(),
                resume_segment: "Built services in Rust".to_string(),
                similarity: 0.82,
            }],
            skill_coverage: SkillCoverage {
                matched: vec!["Rust".to_string()],
                fuzzy: vec![],
                missing: vec!["Kubernetes".to_string()],
                coverage: 0.5,
            },
            experience_requirements: vec!["5+ years of backend development".to_string()],
            resume_sections: vec!["Experience".to_string(), "Skills".to_string()],
            resume_segment_count: 4,
            requirement_count: 3,
            embedding_model: "potion-base-8M".to_string(),
            processing_time_ms: 12,
        }
    }

    #[test]
    fn test_analysis_text_layout() {
        let report = MatchReport::from_outcome(sample_outcome(), "resume.pdf", "job.txt");

        let expected = "1. Overall Match Score: 83/100\n\
            \n\
            2. Key Strengths:\n\
            - Your experience in 'Built services in Rust' strongly aligns with the requirement: 'Experience with Rust'.\n\
            \n\
            3. Suggested Improvements:\n\
            - Your experience with 'Deployed containers with Docker' partially matches the requirement: 'Kubernetes knowledge'.\n\
            \n\
            4. Areas that need attention:\n\
            - The requirement 'Mentoring junior engineers' is not well represented in your resume.\n\
            \n\
            5. Overall Assessment:\n\
            Your resume shows strong alignment with the job requirements.";

        assert_eq!(report.analysis_text(), expected);
    }

    #[test]
    fn test_empty_categories_use_placeholders() {
        let mut outcome = sample_outcome();
        outcome.categorization.strengths.clear();
        outcome.categorization.improvements.clear();
        outcome.categorization.gaps.clear();
        let report = MatchReport::from_outcome(outcome, "resume.pdf", "job.txt");

        let text = report.analysis_text();
        assert!(text.contains("2. Key Strengths:\n- No strong matches found\n"));
        assert!(text.contains("3. Suggested Improvements:\n- No moderate matches found\n"));
        assert!(text.contains("4. Areas that need attention:\n- No significant gaps found\n"));
    }

    #[test]
    fn test_response_carries_score_and_text() {
        let report = MatchReport::from_outcome(sample_outcome(), "resume.pdf", "inline");
        let response = report.to_response();

        assert_eq!(response.match_score, 83);
        assert_eq!(response.analysis, report.analysis_text());
        assert_eq!(report.metadata.job_source, "inline");
        assert_eq!(report.metadata.embedding_model, "potion-base-8M");
    }
}
