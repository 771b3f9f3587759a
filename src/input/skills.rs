//! Skill lists produced by the parsing stage

use crate::error::{Result, SkillMatchError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// A parsed job description. Only the skill lists take part in matching.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobDescription {
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub optional_skills: Vec<String>,
}

/// Load a candidate skill list: a JSON array of strings.
pub async fn load_candidate_skills(path: &Path) -> Result<Vec<String>> {
    let content = read_input(path).await?;
    serde_json::from_str(&content).map_err(|e| {
        SkillMatchError::InvalidInput(format!(
            "Candidate skills file '{}' must contain a JSON array of strings: {}",
            path.display(),
            e
        ))
    })
}

/// Load a job description: a JSON object with `required_skills` and optional `optional_skills`.
pub async fn load_job_description(path: &Path) -> Result<JobDescription> {
    let content = read_input(path).await?;
    serde_json::from_str(&content).map_err(|e| {
        SkillMatchError::InvalidInput(format!(
            "Job description file '{}' must be a JSON object with a 'required_skills' key: {}",
            path.display(),
            e
        ))
    })
}

async fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).await.map_err(|e| {
        SkillMatchError::InvalidInput(format!("Input file not found at '{}': {}", path.display(), e))
    })
}
