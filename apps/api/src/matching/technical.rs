//! Technical Scorer: share of a project's required technologies that a
//! developer has. Pure and total; technologies compare by catalog id.

use std::collections::HashSet;

use crate::models::technology::Technology;

/// `|required ∩ skills| / |required| * 100`, or 0 when nothing is required.
pub fn score(required: &[Technology], skills: &[Technology]) -> f64 {
    let required: HashSet<i32> = required.iter().map(|t| t.id).collect();
    if required.is_empty() {
        return 0.0;
    }
    let skills: HashSet<i32> = skills.iter().map(|t| t.id).collect();
    let covered = required.intersection(&skills).count();
    covered as f64 / required.len() as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn techs(ids: &[(i32, &str)]) -> Vec<Technology> {
        ids.iter().map(|(id, name)| Technology::new(*id, name, None)).collect()
    }

    #[test]
    fn test_half_of_required_covered() {
        let required = techs(&[(1, "Java"), (3, "PostgreSQL")]);
        let skills = techs(&[(1, "Java"), (13, "React")]);
        assert_eq!(score(&required, &skills), 50.0);
    }

    #[test]
    fn test_empty_required_scores_zero() {
        let skills = techs(&[(1, "Java")]);
        assert_eq!(score(&[], &skills), 0.0);
        assert_eq!(score(&[], &[]), 0.0);
    }

    #[test]
    fn test_superset_of_skills_scores_full() {
        let required = techs(&[(9, "Python"), (10, "Django")]);
        let skills = techs(&[(9, "Python"), (10, "Django"), (3, "PostgreSQL")]);
        assert_eq!(score(&required, &skills), 100.0);
    }

    #[test]
    fn test_no_skills_scores_zero() {
        let required = techs(&[(9, "Python")]);
        assert_eq!(score(&required, &[]), 0.0);
    }

    #[test]
    fn test_duplicate_requirements_count_once() {
        let required = techs(&[(1, "Java"), (1, "Java"), (3, "PostgreSQL")]);
        let skills = techs(&[(1, "Java")]);
        assert_eq!(score(&required, &skills), 50.0);
    }

    #[test]
    fn test_compares_by_id_not_name() {
        let required = techs(&[(1, "Java")]);
        let skills = techs(&[(1, "java (renamed)")]);
        assert_eq!(score(&required, &skills), 100.0);
    }

    #[test]
    fn test_score_stays_in_range() {
        let required = techs(&[(1, "A"), (2, "B"), (3, "C")]);
        for skills in [techs(&[]), techs(&[(2, "B")]), techs(&[(1, "A"), (2, "B"), (3, "C")])] {
            let s = score(&required, &skills);
            assert!((0.0..=100.0).contains(&s));
        }
    }

    #[test]
    fn test_score_never_drops_as_skills_grow() {
        let required = techs(&[(1, "Java"), (3, "PostgreSQL"), (9, "Python"), (13, "React")]);
        let additions = techs(&[
            (20, "Go"),
            (3, "PostgreSQL"),
            (21, "Rust"),
            (1, "Java"),
            (3, "PostgreSQL"),
            (13, "React"),
            (9, "Python"),
        ]);

        let mut skills = Vec::new();
        let mut previous = score(&required, &skills);
        for skill in additions {
            skills.push(skill);
            let current = score(&required, &skills);
            assert!(current >= previous, "{current} < {previous} after {skills:?}");
            previous = current;
        }
        assert_eq!(previous, 100.0);
    }
}
