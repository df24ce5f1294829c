use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::project::ExperienceLevel;
use crate::models::technology::Technology;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Experience {
    pub description: String,
    /// work, education, project, ...
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeveloperProfile {
    pub id: i32,
    pub name: String,
    pub experience_level: ExperienceLevel,
    pub motivation: String,
    pub skills: Vec<Technology>,
    pub experiences: Vec<Experience>,
}

impl DeveloperProfile {
    pub fn skill_names(&self) -> Vec<&str> {
        self.skills.iter().map(|s| s.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DeveloperRow {
    pub id: i32,
    pub name: String,
    pub experience_level: String,
    pub motivation: Option<String>,
}

impl DeveloperRow {
    pub fn into_profile(
        self,
        skills: Vec<Technology>,
        experiences: Vec<Experience>,
    ) -> DeveloperProfile {
        DeveloperProfile {
            id: self.id,
            name: self.name,
            experience_level: ExperienceLevel::parse(&self.experience_level).unwrap_or_default(),
            motivation: self.motivation.unwrap_or_default(),
            skills,
            experiences,
        }
    }
}
