//! Threshold-based categorization of job requirements

use crate::config::AnalysisConfig;
use crate::processing::similarity::SimilarityMatrix;
use serde::{Deserialize, Serialize};

/// A requirement together with the resume segment that best covers it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementMatch {
    pub requirement: String,
    pub resume_segment: String,
    pub similarity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementGap {
    pub requirement: String,
    pub best_similarity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchCategory {
    Strength,
    Improvement,
    Gap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Categorization {
    pub strengths: Vec<RequirementMatch>,
    pub improvements: Vec<RequirementMatch>,
    pub gaps: Vec<RequirementGap>,
    /// Per-category totals before truncation
    pub strength_count: usize,
    pub improvement_count: usize,
    pub gap_count: usize,
}

pub struct MatchClassifier {
    strength_threshold: f32,
    improvement_floor: f32,
    max_strengths: usize,
    max_improvements: usize,
    max_gaps: usize,
}

impl Default for MatchClassifier {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

impl MatchClassifier {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            strength_threshold: config.strength_threshold,
            improvement_floor: config.improvement_floor,
            max_strengths: config.max_strengths,
            max_improvements: config.max_improvements,
            max_gaps: config.max_gaps,
        }
    }

    /// Above the threshold is a strength, the band down to the floor
    /// (inclusive at both ends) an improvement, anything lower a gap.
    pub fn category(&self, similarity: f32) -> MatchCategory {
        if similarity > self.strength_threshold {
            MatchCategory::Strength
        } else if similarity >= self.improvement_floor {
            MatchCategory::Improvement
        } else {
            MatchCategory::Gap
        }
    }

    pub fn categorize(
        &self,
        resume_segments: &[String],
        requirements: &[String],
        matrix: &SimilarityMatrix,
    ) -> Categorization {
        let mut strengths = Vec::new();
        let mut improvements = Vec::new();
        let mut gaps = Vec::new();

        for (col, requirement) in requirements.iter().enumerate() {
            let best = matrix
                .column_best(col)
                .and_then(|(row, score)| resume_segments.get(row).map(|seg| (seg, score)));

            match best {
                Some((segment, score)) => {
                    let entry = RequirementMatch {
                        requirement: requirement.clone(),
                        resume_segment: segment.clone(),
                        similarity: score,
                    };
                    match self.category(score) {
                        MatchCategory::Strength => strengths.push(entry),
                        MatchCategory::Improvement => improvements.push(entry),
                        MatchCategory::Gap => gaps.push(RequirementGap {
                            requirement: requirement.clone(),
                            best_similarity: score,
                        }),
                    }
                }
                // Nothing in the resume to compare against
                None => gaps.push(RequirementGap {
                    requirement: requirement.clone(),
                    best_similarity: matrix.column_max(col),
                }),
            }
        }

        let strength_count = strengths.len();
        let improvement_count = improvements.len();
        let gap_count = gaps.len();

        // Stable sorts keep requirement order among equal scores
        strengths.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        strengths.truncate(self.max_strengths);

        improvements.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        improvements.truncate(self.max_improvements);

        gaps.sort_by(|a, b| a.best_similarity.total_cmp(&b.best_similarity));
        gaps.truncate(self.max_gaps);

        Categorization {
            strengths,
            improvements,
            gaps,
            strength_count,
            improvement_count,
            gap_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_category_boundaries() {
        let classifier = MatchClassifier::default();

        assert_eq!(classifier.category(0.61), MatchCategory::Strength);
        assert_eq!(classifier.category(0.6), MatchCategory::Improvement);
        assert_eq!(classifier.category(0.4), MatchCategory::Improvement);
        assert_eq!(classifier.category(0.3999), MatchCategory::Gap);
        assert_eq!(classifier.category(-0.2), MatchCategory::Gap);
    }

    #[test]
    fn test_each_requirement_lands_in_one_category() {
        let resume = segments(&["Rust services", "Team lead", "Gardening"]);
        let jobs = segments(&["Rust", "Leadership", "Kubernetes", "Mentoring"]);
        // rows: resume, cols: requirements
        let matrix = SimilarityMatrix::from_rows(vec![
            vec![0.9, 0.2, 0.1, 0.3],
            vec![0.1, 0.5, 0.2, 0.45],
            vec![0.0, 0.1, 0.05, 0.2],
        ])
        .unwrap();

        let result = MatchClassifier::default().categorize(&resume, &jobs, &matrix);

        assert_eq!(result.strengths.len(), 1);
        assert_eq!(result.strengths[0].requirement, "Rust");
        assert_eq!(result.strengths[0].resume_segment, "Rust services");

        let improved: Vec<_> = result.improvements.iter().map(|m| m.requirement.as_str()).collect();
        assert_eq!(improved, vec!["Leadership", "Mentoring"]);
        assert!(result.improvements.iter().all(|m| m.resume_segment == "Team lead"));

        assert_eq!(result.gaps.len(), 1);
        assert_eq!(result.gaps[0].requirement, "Kubernetes");
        assert!((result.gaps[0].best_similarity - 0.2).abs() < 1e-6);

        assert_eq!(result.strength_count + result.improvement_count + result.gap_count, 4);
    }

    #[test]
    fn test_sorting_and_truncation() {
        let resume = segments(&["only"]);
        let jobs = segments(&["a", "b", "c", "d", "e", "f", "g"]);
        let matrix =
            SimilarityMatrix::from_rows(vec![vec![0.1, 0.35, 0.0, 0.2, -0.1, 0.35, 0.05]]).unwrap();

        let result = MatchClassifier::default().categorize(&resume, &jobs, &matrix);

        assert_eq!(result.gap_count, 7);
        let gaps: Vec<_> = result.gaps.iter().map(|g| g.requirement.as_str()).collect();
        assert_eq!(gaps, vec!["e", "c", "g"]);
    }

    #[test]
    fn test_strengths_capped_at_five_highest() {
        let resume = segments(&["only"]);
        let jobs = segments(&["a", "b", "c", "d", "e", "f", "g"]);
        let matrix =
            SimilarityMatrix::from_rows(vec![vec![0.61, 0.9, 0.7, 0.8, 0.95, 0.65, 0.7]]).unwrap();

        let result = MatchClassifier::default().categorize(&resume, &jobs, &matrix);

        assert_eq!(result.strength_count, 7);
        let top: Vec<_> = result.strengths.iter().map(|m| m.requirement.as_str()).collect();
        // equal scores keep requirement order
        assert_eq!(top, vec!["e", "b", "d", "c", "g"]);
    }

    #[test]
    fn test_no_resume_segments_means_all_gaps() {
        let jobs = segments(&["Rust", "Go"]);
        let matrix = SimilarityMatrix::compute_on(&[], &[vec![1.0], vec![1.0]], &candle_core::Device::Cpu)
            .unwrap();

        let result = MatchClassifier::default().categorize(&[], &jobs, &matrix);

        assert!(result.strengths.is_empty());
        assert!(result.improvements.is_empty());
        assert_eq!(result.gaps.len(), 2);
        assert!(result.gaps.iter().all(|g| g.best_similarity == 0.0));
    }
}
