//! Suitability grades

use serde::{Deserialize, Serialize};
use std::fmt;

/// Grade of a 0-100 suitability score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    /// 90 and above
    S,
    /// 80-90
    A,
    /// 70-80
    B,
    /// 60-70
    C,
    /// Below 60
    D,
}

impl Grade {
    pub const ALL: [Grade; 5] = [Grade::S, Grade::A, Grade::B, Grade::C, Grade::D];

    /// `None` for NaN
    pub fn from_score(score: f64) -> Option<Self> {
        if score.is_nan() {
            return None;
        }
        Some(match score {
            s if s >= 90.0 => Grade::S,
            s if s >= 80.0 => Grade::A,
            s if s >= 70.0 => Grade::B,
            s if s >= 60.0 => Grade::C,
            _ => Grade::D,
        })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Grade::S => "excellent",
            Grade::A => "very good",
            Grade::B => "good",
            Grade::C => "moderate",
            Grade::D => "not recommended",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Cell counts per grade
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeHistogram {
    counts: [usize; 5],
}

impl GradeHistogram {
    pub fn from_scores(scores: impl IntoIterator<Item = f64>) -> Self {
        let mut hist = Self::default();
        for grade in scores.into_iter().filter_map(Grade::from_score) {
            hist.counts[grade.index()] += 1;
        }
        hist
    }

    pub fn count(&self, grade: Grade) -> usize {
        self.counts[grade.index()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Grade, usize)> + '_ {
        Grade::ALL.iter().map(|&g| (g, self.count(g)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(Grade::from_score(100.0), Some(Grade::S));
        assert_eq!(Grade::from_score(90.0), Some(Grade::S));
        assert_eq!(Grade::from_score(89.9), Some(Grade::A));
        assert_eq!(Grade::from_score(70.0), Some(Grade::B));
        assert_eq!(Grade::from_score(60.0), Some(Grade::C));
        assert_eq!(Grade::from_score(12.0), Some(Grade::D));
        assert_eq!(Grade::from_score(f64::NAN), None);
    }

    #[test]
    fn test_histogram() {
        let hist = GradeHistogram::from_scores([95.0, 91.0, 65.0, f64::NAN, 10.0]);
        assert_eq!(hist.count(Grade::S), 2);
        assert_eq!(hist.count(Grade::C), 1);
        assert_eq!(hist.count(Grade::D), 1);
        assert_eq!(hist.total(), 4);
        assert_eq!(hist.iter().count(), 5);
    }
}
