use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::technology::Technology;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperienceLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "Beginner",
            ExperienceLevel::Intermediate => "Intermediate",
            ExperienceLevel::Advanced => "Advanced",
        }
    }

    /// Exact match against the fixed vocabulary. Anything else is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "Beginner" => Some(ExperienceLevel::Beginner),
            "Intermediate" => Some(ExperienceLevel::Intermediate),
            "Advanced" => Some(ExperienceLevel::Advanced),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectType {
    #[default]
    Web,
    Mobile,
    Desktop,
    #[serde(rename = "API")]
    Api,
    #[serde(rename = "Data Science")]
    DataScience,
    DevOps,
    Other,
}

impl ProjectType {
    pub const ALL: [ProjectType; 7] = [
        ProjectType::Web,
        ProjectType::Mobile,
        ProjectType::Desktop,
        ProjectType::Api,
        ProjectType::DataScience,
        ProjectType::DevOps,
        ProjectType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::Web => "Web",
            ProjectType::Mobile => "Mobile",
            ProjectType::Desktop => "Desktop",
            ProjectType::Api => "API",
            ProjectType::DataScience => "Data Science",
            ProjectType::DevOps => "DevOps",
            ProjectType::Other => "Other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }
}

/// A project as read from the directory, with its required technologies resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSpec {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub experience_level: ExperienceLevel,
    pub project_type: ProjectType,
    pub status: String,
    pub required_technologies: Vec<Technology>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub experience_level: String,
    pub project_type: String,
    pub status: String,
}

impl ProjectRow {
    /// Stored enum columns outside the vocabulary fall back to the defaults.
    pub fn into_spec(self, required_technologies: Vec<Technology>) -> ProjectSpec {
        ProjectSpec {
            id: self.id,
            name: self.name,
            description: self.description,
            experience_level: ExperienceLevel::parse(&self.experience_level).unwrap_or_default(),
            project_type: ProjectType::parse(&self.project_type).unwrap_or(ProjectType::Other),
            status: self.status,
            required_technologies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_type_serde_uses_display_names() {
        let json = serde_json::to_string(&ProjectType::DataScience).unwrap();
        assert_eq!(json, r#""Data Science""#);
        let parsed: ProjectType = serde_json::from_str(r#""API""#).unwrap();
        assert_eq!(parsed, ProjectType::Api);
    }

    #[test]
    fn test_project_type_parse_rejects_unknown() {
        assert_eq!(ProjectType::parse("DevOps"), Some(ProjectType::DevOps));
        assert_eq!(ProjectType::parse("Blockchain"), None);
        assert_eq!(ProjectType::parse("web"), None);
    }

    #[test]
    fn test_experience_level_parse() {
        assert_eq!(
            ExperienceLevel::parse(" Advanced "),
            Some(ExperienceLevel::Advanced)
        );
        assert_eq!(ExperienceLevel::parse("Expert"), None);
    }

    #[test]
    fn test_row_with_unknown_type_maps_to_other() {
        let row = ProjectRow {
            id: 1,
            name: "Coffee shop ordering system".to_string(),
            description: "Orders and menus".to_string(),
            experience_level: "Guru".to_string(),
            project_type: "Blockchain".to_string(),
            status: "Open".to_string(),
        };
        let spec = row.into_spec(vec![]);
        assert_eq!(spec.project_type, ProjectType::Other);
        assert_eq!(spec.experience_level, ExperienceLevel::Intermediate);
    }
}
