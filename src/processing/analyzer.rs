//! Analysis engine: segment, embed once, compare, categorize, score

use crate::config::{AnalysisConfig, Config, ScoreMode};
use crate::error::{Result, ResumeScorerError};
use crate::processing::classifier::{Categorization, MatchClassifier};
use crate::processing::embeddings::SentenceEncoder;
use crate::processing::similarity::{cosine_similarity, SimilarityMatrix};
use crate::processing::skills::{SectionDetector, SkillCoverage, SkillExtractor, SkillMatcher};
use crate::processing::text_processor::TextProcessor;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Verdict thresholds on the 0-100 match score
const STRONG_ALIGNMENT_SCORE: u8 = 80;
const MODERATE_ALIGNMENT_SCORE: u8 = 50;

/// A resume segment that speaks to a requirement, above the relevance floor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelevantMatch {
    pub requirement: String,
    pub resume_segment: String,
    pub similarity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub match_score: u8,
    /// Cosine similarity the score was derived from
    pub raw_similarity: f32,
    pub document_similarity: f32,
    pub score_mode: ScoreMode,
    pub assessment: String,
    pub categorization: Categorization,
    pub relevant_matches: Vec<RelevantMatch>,
    pub skill_coverage: SkillCoverage,
    pub experience_requirements: Vec<String>,
    pub resume_sections: Vec<String>,
    pub resume_segment_count: usize,
    pub requirement_count: usize,
    pub embedding_model: String,
    pub processing_time_ms: u64,
}

/// Map a cosine similarity in [-1, 1] onto 0..=100
pub fn match_score(similarity: f32) -> u8 {
    ((similarity + 1.0) * 50.0).floor().clamp(0.0, 100.0) as u8
}

pub fn assessment_for(score: u8) -> &'static str {
    if score >= STRONG_ALIGNMENT_SCORE {
        "Your resume shows strong alignment with the job requirements."
    } else if score >= MODERATE_ALIGNMENT_SCORE {
        "Your resume shows moderate alignment with the job requirements."
    } else {
        "Your resume needs significant enhancement to better match the job requirements."
    }
}

/// Owns the encoder for the life of the process so the model loads once
pub struct ResumeAnalyzer<E: SentenceEncoder> {
    encoder: E,
    text_processor: TextProcessor,
    classifier: MatchClassifier,
    skill_extractor: SkillExtractor,
    skill_matcher: SkillMatcher,
    section_detector: SectionDetector,
    analysis: AnalysisConfig,
}

impl<E: SentenceEncoder> ResumeAnalyzer<E> {
    pub fn new(encoder: E, config: &Config) -> Self {
        Self {
            encoder,
            text_processor: TextProcessor::new(&config.processing.sentence_delimiters),
            classifier: MatchClassifier::new(&config.analysis),
            skill_extractor: SkillExtractor::new(),
            skill_matcher: SkillMatcher::default(),
            section_detector: SectionDetector::new(),
            analysis: config.analysis.clone(),
        }
    }

    pub fn with_score_mode(mut self, mode: ScoreMode) -> Self {
        self.analysis.score_mode = mode;
        self
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    pub fn analyze(&mut self, resume_text: &str, job_text: &str) -> Result<AnalysisOutcome> {
        let start_time = Instant::now();

        let job_text = job_text.trim();
        if job_text.is_empty() {
            return Err(ResumeScorerError::InvalidInput(
                "Job description is required".to_string(),
            ));
        }

        // Sections need the original line structure, so detect before cleaning
        let resume_sections = self.section_detector.detect_sections(resume_text);

        let cleaned_resume = self.text_processor.clean_resume_text(resume_text);
        if cleaned_resume.is_empty() {
            return Err(ResumeScorerError::InvalidInput(
                "Resume contains no readable text".to_string(),
            ));
        }

        let resume_segments = self.text_processor.split_segments(&cleaned_resume);
        let requirements = self.text_processor.split_segments(job_text);
        info!(
            "Analyzing {} resume segments against {} requirements",
            resume_segments.len(),
            requirements.len()
        );

        let documents = self
            .encoder
            .encode(&[cleaned_resume.clone(), job_text.to_string()])?;
        let (resume_vec, job_vec) = match documents.as_slice() {
            [resume_vec, job_vec] => (resume_vec, job_vec),
            _ => {
                return Err(ResumeScorerError::Embedding(format!(
                    "Expected 2 document embeddings, got {}",
                    documents.len()
                )))
            }
        };
        let document_similarity = cosine_similarity(resume_vec, job_vec)?;

        let resume_vecs = self.encode_checked(&resume_segments)?;
        let job_vecs = self.encode_checked(&requirements)?;
        let matrix = SimilarityMatrix::compute(&resume_vecs, &job_vecs)?;

        let categorization = self
            .classifier
            .categorize(&resume_segments, &requirements, &matrix);
        let relevant_matches = self.relevant_matches(&resume_segments, &requirements, &matrix);

        let raw_similarity = match self.analysis.score_mode {
            ScoreMode::Document => document_similarity,
            ScoreMode::RequirementCoverage if requirements.is_empty() => document_similarity,
            ScoreMode::RequirementCoverage => {
                let total: f32 = (0..matrix.cols()).map(|col| matrix.column_max(col)).sum();
                total / requirements.len() as f32
            }
        };
        let match_score = match_score(raw_similarity);
        debug!(
            "Similarity {:.4} ({:?}) -> match score {}",
            raw_similarity, self.analysis.score_mode, match_score
        );

        let skills = self.skill_extractor.extract_skills(job_text);
        let skill_coverage = self.skill_matcher.coverage(&skills, &cleaned_resume)?;
        let experience_requirements = self
            .skill_extractor
            .extract_experience_requirements(job_text);

        Ok(AnalysisOutcome {
            match_score,
            raw_similarity,
            document_similarity,
            score_mode: self.analysis.score_mode,
            assessment: assessment_for(match_score).to_string(),
            categorization,
            relevant_matches,
            skill_coverage,
            experience_requirements,
            resume_sections,
            resume_segment_count: resume_segments.len(),
            requirement_count: requirements.len(),
            embedding_model: self.encoder.model_name().to_string(),
            processing_time_ms: start_time.elapsed().as_millis() as u64,
        })
    }

    fn encode_checked(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let vectors = self.encoder.encode(texts)?;
        if vectors.len() != texts.len() {
            return Err(ResumeScorerError::Embedding(format!(
                "Encoder returned {} embeddings for {} texts",
                vectors.len(),
                texts.len()
            )));
        }
        Ok(vectors)
    }

    /// Up to `relevant_top_k` segments per requirement, strictly above the floor
    fn relevant_matches(
        &self,
        resume_segments: &[String],
        requirements: &[String],
        matrix: &SimilarityMatrix,
    ) -> Vec<RelevantMatch> {
        let mut matches = Vec::new();
        for (col, requirement) in requirements.iter().enumerate() {
            let mut ranked: Vec<(usize, f32)> = matrix.column(col).into_iter().enumerate().collect();
            ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

            matches.extend(
                ranked
                    .into_iter()
                    .take(self.analysis.relevant_top_k)
                    .filter(|(_, score)| *score > self.analysis.relevant_threshold)
                    .filter_map(|(row, score)| {
                        resume_segments.get(row).map(|segment| RelevantMatch {
                            requirement: requirement.clone(),
                            resume_segment: segment.clone(),
                            similarity: score,
                        })
                    }),
            );
        }
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_score_mapping() {
        assert_eq!(match_score(1.0), 100);
        assert_eq!(match_score(0.0), 50);
        assert_eq!(match_score(-1.0), 0);
        assert_eq!(match_score(0.599), 79);
        assert_eq!(match_score(0.6), 80);
        // out-of-range inputs are clamped
        assert_eq!(match_score(1.2), 100);
        assert_eq!(match_score(-1.5), 0);
    }

    #[test]
    fn test_assessment_bands() {
        assert!(assessment_for(80).contains("strong alignment"));
        assert!(assessment_for(79).contains("moderate alignment"));
        assert!(assessment_for(50).contains("moderate alignment"));
        assert!(assessment_for(49).contains("significant enhancement"));
    }
}
