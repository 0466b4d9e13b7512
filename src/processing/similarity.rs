//! Cosine similarity between resume sentences and job requirements

use crate::error::{Result, ResumeScorerError};
use candle_core::{Device, Tensor};
use log::debug;
use serde::{Deserialize, Serialize};

/// Norm floor so zero vectors come out as all-zero rows instead of NaN
const NORM_EPSILON: f32 = 1e-12;

/// Pairwise similarities, rows are resume segments and columns job requirements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    rows: usize,
    cols: usize,
    values: Vec<f32>,
}

/// Cosine similarity between two embeddings
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(ResumeScorerError::Similarity(format!(
            "Embedding dimensions don't match: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok(dot_product / (norm_a * norm_b))
}

/// Selects the compute device based on enabled features, falling back to CPU
pub fn select_device() -> Device {
    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(device) => return device,
            Err(e) => log::warn!("Metal device unavailable, using CPU: {}", e),
        }
    }

    #[cfg(feature = "cuda")]
    {
        match Device::new_cuda(0) {
            Ok(device) => return device,
            Err(e) => log::warn!("CUDA device unavailable, using CPU: {}", e),
        }
    }

    Device::Cpu
}

impl SimilarityMatrix {
    /// Build the matrix with one normalized matmul on the default device
    pub fn compute(resume: &[Vec<f32>], job: &[Vec<f32>]) -> Result<Self> {
        Self::compute_on(resume, job, &select_device())
    }

    pub fn compute_on(resume: &[Vec<f32>], job: &[Vec<f32>], device: &Device) -> Result<Self> {
        let rows = resume.len();
        let cols = job.len();

        if rows == 0 || cols == 0 {
            return Ok(Self {
                rows,
                cols,
                values: Vec::new(),
            });
        }

        let dim = resume[0].len();
        if let Some(bad) = resume.iter().chain(job.iter()).find(|v| v.len() != dim) {
            return Err(ResumeScorerError::Similarity(format!(
                "Embedding dimensions don't match: {} vs {}",
                dim,
                bad.len()
            )));
        }
        if dim == 0 {
            return Ok(Self {
                rows,
                cols,
                values: vec![0.0; rows * cols],
            });
        }

        let a = Tensor::from_vec(normalized_rows(resume), (rows, dim), device)?;
        let b = Tensor::from_vec(normalized_rows(job), (cols, dim), device)?;
        let product = a.matmul(&b.t()?.contiguous()?)?;

        let values: Vec<f32> = product.to_vec2::<f32>()?.into_iter().flatten().collect();
        debug!("Computed {}x{} similarity matrix (dim {})", rows, cols, dim);

        Ok(Self { rows, cols, values })
    }

    /// Build directly from row-major values, mostly useful in tests
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        if rows.iter().any(|r| r.len() != cols) {
            return Err(ResumeScorerError::Similarity(
                "Rows of a similarity matrix must have equal length".to_string(),
            ));
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            values: rows.into_iter().flatten().collect(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row < self.rows && col < self.cols {
            Some(self.values[row * self.cols + col])
        } else {
            None
        }
    }

    /// Similarities of every resume segment against requirement `col`
    pub fn column(&self, col: usize) -> Vec<f32> {
        (0..self.rows).filter_map(|row| self.get(row, col)).collect()
    }

    /// Best resume segment for a requirement; ties go to the earliest segment
    pub fn column_best(&self, col: usize) -> Option<(usize, f32)> {
        self.column(col)
            .into_iter()
            .enumerate()
            .fold(None, |best, (row, score)| match best {
                Some((_, top)) if top >= score => best,
                _ => Some((row, score)),
            })
    }

    /// Best similarity for a requirement, 0.0 when there are no resume segments
    pub fn column_max(&self, col: usize) -> f32 {
        self.column_best(col).map(|(_, score)| score).unwrap_or(0.0)
    }
}

fn normalized_rows(vectors: &[Vec<f32>]) -> Vec<f32> {
    vectors
        .iter()
        .flat_map(|v| {
            let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(NORM_EPSILON);
            v.iter().map(move |x| x / norm)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_cosine_similarity() {
        assert!(approx(cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]).unwrap(), 1.0));
        assert!(approx(cosine_similarity(&[1.0, 0.0], &[0.0, 3.0]).unwrap(), 0.0));
        assert!(approx(cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]).unwrap(), -1.0));
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).unwrap(), 0.0);
        assert!(cosine_similarity(&[1.0], &[1.0, 0.0]).is_err());
    }

    #[test]
    fn test_matrix_matches_pairwise_cosine() {
        let resume = vec![vec![1.0, 0.0, 0.0], vec![0.6, 0.8, 0.0], vec![0.0, 0.0, 0.0]];
        let job = vec![vec![2.0, 0.0, 0.0], vec![0.0, 1.0, 1.0]];

        let matrix = SimilarityMatrix::compute_on(&resume, &job, &Device::Cpu).unwrap();

        assert_eq!((matrix.rows(), matrix.cols()), (3, 2));
        for (i, r) in resume.iter().enumerate() {
            for (j, q) in job.iter().enumerate() {
                let expected = cosine_similarity(r, q).unwrap();
                assert!(approx(matrix.get(i, j).unwrap(), expected), "cell ({}, {})", i, j);
            }
        }
    }

    #[test]
    fn test_column_best_prefers_first_on_ties() {
        let matrix = SimilarityMatrix::from_rows(vec![
            vec![0.5, 0.1],
            vec![0.9, 0.1],
            vec![0.9, 0.2],
        ])
        .unwrap();

        assert_eq!(matrix.column_best(0), Some((1, 0.9)));
        assert_eq!(matrix.column_best(1), Some((2, 0.2)));
        assert_eq!(matrix.column(1), vec![0.1, 0.1, 0.2]);
    }

    #[test]
    fn test_empty_resume_side() {
        let job = vec![vec![1.0, 0.0]];
        let matrix = SimilarityMatrix::compute_on(&[], &job, &Device::Cpu).unwrap();

        assert_eq!(matrix.rows(), 0);
        assert_eq!(matrix.cols(), 1);
        assert_eq!(matrix.column_best(0), None);
        assert_eq!(matrix.column_max(0), 0.0);
    }

    #[test]
    fn test_dimension_mismatch_is_an_error() {
        let resume = vec![vec![1.0, 0.0]];
        let job = vec![vec![1.0, 0.0, 0.0]];
        assert!(SimilarityMatrix::compute_on(&resume, &job, &Device::Cpu).is_err());
    }
}
