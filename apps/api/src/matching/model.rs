//! Data model for the matching pipeline. All entities are transient: built and
//! discarded within one orchestration call, surviving only through the result
//! cache.

use serde::{Deserialize, Serialize};

/// Reasoning text substituted into every category when a batch's analysis
/// fails. Kept for display parity; `is_error` is the authoritative flag.
pub const ANALYSIS_FAILED_REASONING: &str = "Analysis Failed.";

/// A document handed to the pipeline: the original file name (used as the
/// identifier throughout) plus a retrievable URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRef {
    pub file_name: String,
    pub url: String,
}

/// A document whose text extraction succeeded. Documents that fail extraction
/// are dropped (and surfaced as warnings), never carried with empty text.
#[derive(Debug, Clone)]
pub struct ExtractedCv {
    pub file_name: String,
    pub text: String,
}

/// Score and rationale for one rubric category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScore {
    pub score: u8,
    pub reasoning: String,
}

/// The fixed six-category rubric breakdown. Every category is required — a
/// model response missing one is rejected as a shape mismatch, not patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    pub experience: CategoryScore,
    pub hard_skills: CategoryScore,
    pub education: CategoryScore,
    pub soft_skills: CategoryScore,
    pub experience_diversity: CategoryScore,
    pub location_proximity: CategoryScore,
}

/// One candidate's analysis against the job description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateAnalysis {
    pub file_name: String,
    /// 0–100 overall match.
    pub match_score: u8,
    pub analysis: CategoryBreakdown,
    /// True for sentinel entries synthesized when the batch's analysis failed.
    /// The model never sets this, so it defaults to false on deserialization.
    #[serde(default)]
    pub is_error: bool,
}

impl CandidateAnalysis {
    /// Sentinel placeholder for a document whose batch analysis failed.
    /// Preserves output cardinality: the document still appears in the ranked
    /// list, at the bottom, instead of vanishing.
    pub fn failed(file_name: &str) -> Self {
        let zero = || CategoryScore {
            score: 0,
            reasoning: ANALYSIS_FAILED_REASONING.to_string(),
        };
        Self {
            file_name: file_name.to_string(),
            match_score: 0,
            analysis: CategoryBreakdown {
                experience: zero(),
                hard_skills: zero(),
                education: zero(),
                soft_skills: zero(),
                experience_diversity: zero(),
                location_proximity: zero(),
            },
            is_error: true,
        }
    }
}

/// A document that was excluded before batching, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionWarning {
    pub file_name: String,
    pub reason: String,
}

/// Final pipeline output: candidates sorted by `match_score` descending and
/// truncated to the caller's topN, plus per-document extraction warnings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedMatches {
    pub candidates: Vec<CandidateAnalysis>,
    pub warnings: Vec<ExtractionWarning>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_has_zero_scores_everywhere() {
        let sentinel = CandidateAnalysis::failed("cv.pdf");
        assert_eq!(sentinel.file_name, "cv.pdf");
        assert_eq!(sentinel.match_score, 0);
        assert!(sentinel.is_error);
        for category in [
            &sentinel.analysis.experience,
            &sentinel.analysis.hard_skills,
            &sentinel.analysis.education,
            &sentinel.analysis.soft_skills,
            &sentinel.analysis.experience_diversity,
            &sentinel.analysis.location_proximity,
        ] {
            assert_eq!(category.score, 0);
            assert_eq!(category.reasoning, ANALYSIS_FAILED_REASONING);
        }
    }

    #[test]
    fn test_candidate_analysis_deserializes_model_output() {
        let json = r#"{
            "fileName": "a.pdf",
            "matchScore": 87,
            "analysis": {
                "experience": {"score": 90, "reasoning": "8 years in backend roles"},
                "hardSkills": {"score": 85, "reasoning": "Rust, Postgres, Kafka"},
                "education": {"score": 70, "reasoning": "BSc Computer Science"},
                "softSkills": {"score": 80, "reasoning": "led a team of four"},
                "experienceDiversity": {"score": 75, "reasoning": "fintech and telecom"},
                "locationProximity": {"score": 60, "reasoning": "same country, remote"}
            }
        }"#;
        let parsed: CandidateAnalysis = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.match_score, 87);
        assert_eq!(parsed.analysis.hard_skills.score, 85);
        // Model output never carries isError — must default to false.
        assert!(!parsed.is_error);
    }

    #[test]
    fn test_missing_category_is_rejected() {
        // locationProximity omitted
        let json = r#"{
            "fileName": "a.pdf",
            "matchScore": 50,
            "analysis": {
                "experience": {"score": 50, "reasoning": "r"},
                "hardSkills": {"score": 50, "reasoning": "r"},
                "education": {"score": 50, "reasoning": "r"},
                "softSkills": {"score": 50, "reasoning": "r"},
                "experienceDiversity": {"score": 50, "reasoning": "r"}
            }
        }"#;
        let result: Result<CandidateAnalysis, _> = serde_json::from_str(json);
        assert!(result.is_err(), "missing category must fail deserialization");
    }

    #[test]
    fn test_ranked_matches_round_trips_through_json() {
        let ranked = RankedMatches {
            candidates: vec![CandidateAnalysis::failed("b.pdf")],
            warnings: vec![ExtractionWarning {
                file_name: "a.pdf".to_string(),
                reason: "extraction service returned empty text".to_string(),
            }],
        };
        let json = serde_json::to_string(&ranked).unwrap();
        let recovered: RankedMatches = serde_json::from_str(&json).unwrap();
        assert_eq!(recovered, ranked);
    }
}
