// Prompt templates for match analysis.

/// Semantic analysis of one developer against one project.
/// Replace: {project_name}, {project_description}, {required_technologies},
///          {developer_name}, {developer_skills}, {developer_level},
///          {developer_motivation}, {experiences}, {json_only}
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"You are an intelligent matching assistant.
Analyze whether the following developer fits this project and explain why.

Project:
Name: {project_name}
Description: {project_description}
Required technologies: {required_technologies}

Developer:
Name: {developer_name}
Skills: {developer_skills}
Experience level: {developer_level}
Motivation: {developer_motivation}

Previous Experiences:
{experiences}

Evaluate technical affinity, motivational affinity and experience relevance (0 to 100) considering both skills and relevant experiences.
Pay special attention to how past experiences might relate to the project domain, even if indirectly.

Return a JSON object with this EXACT schema:
{"technical_affinity": 0, "motivational_affinity": 0, "experience_relevance": 0, "comment": "brief explanation"}

{json_only}"#;

/// Used in place of an empty experience list.
pub const NO_EXPERIENCES: &str = "- None listed";
