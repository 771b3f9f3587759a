//! Skill matcher library

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod processing;

pub use config::MatcherConfig;
pub use error::{Result, SkillMatchError};
pub use processing::matcher::{MatchOutcome, MatchRequest, SkillMatcher};
