//! Compatibility heuristic between two profiles.
//!
//! The score is a weighted sum of three parts: shared interests (up to 40
//! points), a personality pairing table (up to 30) and an age-gap bucket
//! (up to 30). The total is rounded and capped at 100.

use std::collections::HashSet;

use crate::{entity::users, models::PersonalityType};

const INTEREST_WEIGHT: f64 = 40.0;

/// The subset of a profile that feeds the score.
#[derive(Debug, Clone, Default)]
pub struct CompatibilityInput<'a> {
    pub interests: &'a [String],
    pub personality_type: Option<PersonalityType>,
    pub age: Option<i32>,
}

impl<'a> From<&'a users::Model> for CompatibilityInput<'a> {
    fn from(user: &'a users::Model) -> Self {
        Self {
            interests: &user.interests,
            personality_type: user
                .personality_type
                .as_deref()
                .and_then(|p| p.parse().ok()),
            age: user.age,
        }
    }
}

/// Score between two stored users.
pub fn between(a: &users::Model, b: &users::Model) -> u8 {
    score(&a.into(), &b.into())
}

pub fn score(a: &CompatibilityInput<'_>, b: &CompatibilityInput<'_>) -> u8 {
    let total = interest_score(a.interests, b.interests)
        + personality_score(a.personality_type, b.personality_type)
        + age_score(a.age, b.age);
    total.round().min(100.0) as u8
}

fn interest_score(a: &[String], b: &[String]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let theirs: HashSet<&str> = b.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    let common = a
        .iter()
        .filter(|i| theirs.contains(i.as_str()) && seen.insert(i.as_str()))
        .count();
    common as f64 / a.len().max(b.len()) as f64 * INTEREST_WEIGHT
}

fn personality_score(a: Option<PersonalityType>, b: Option<PersonalityType>) -> f64 {
    use PersonalityType::*;
    match (a, b) {
        (Some(x), Some(y)) if x == y => 20.0,
        (Some(Introvert), Some(Extrovert)) | (Some(Extrovert), Some(Introvert)) => 30.0,
        (Some(_), Some(_)) => 25.0,
        _ => 0.0,
    }
}

fn age_score(a: Option<i32>, b: Option<i32>) -> f64 {
    let (Some(a), Some(b)) = (a, b) else {
        return 0.0;
    };
    match (a - b).abs() {
        0..=2 => 30.0,
        3..=4 => 20.0,
        5..=6 => 10.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PersonalityType::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn input(interests: &[String], p: Option<PersonalityType>, age: Option<i32>) -> CompatibilityInput<'_> {
        CompatibilityInput {
            interests,
            personality_type: p,
            age,
        }
    }

    #[test]
    fn identical_profiles_score_ninety() {
        let i = strings(&["music", "hiking"]);
        let a = input(&i, Some(Ambivert), Some(20));
        // 40 interests + 20 same type + 30 age
        assert_eq!(score(&a, &a), 90);
    }

    #[test]
    fn opposites_attract_and_close_ages_hit_the_cap() {
        let i = strings(&["chess", "films", "coding"]);
        let a = input(&i, Some(Introvert), Some(21));
        let b = input(&i, Some(Extrovert), Some(22));
        assert_eq!(score(&a, &b), 100);
    }

    #[test]
    fn interest_overlap_uses_the_larger_list() {
        let a_i = strings(&["a", "b"]);
        let b_i = strings(&["a", "c", "d", "e"]);
        let a = input(&a_i, None, None);
        let b = input(&b_i, None, None);
        // 1 / 4 * 40
        assert_eq!(score(&a, &b), 10);
    }

    #[test]
    fn mixed_personalities_get_the_middle_value() {
        let empty: Vec<String> = Vec::new();
        let a = input(&empty, Some(Ambivert), None);
        let b = input(&empty, Some(Introvert), None);
        assert_eq!(score(&a, &b), 25);
    }

    #[test]
    fn age_buckets() {
        let empty: Vec<String> = Vec::new();
        let cases = [(20, 22, 30), (20, 24, 20), (20, 26, 10), (20, 27, 0)];
        for (x, y, expected) in cases {
            let a = input(&empty, None, Some(x));
            let b = input(&empty, None, Some(y));
            assert_eq!(score(&a, &b), expected, "ages {x} and {y}");
        }
    }

    #[test]
    fn missing_data_scores_zero() {
        let empty: Vec<String> = Vec::new();
        let a = input(&empty, None, None);
        let b = input(&empty, Some(Extrovert), Some(19));
        assert_eq!(score(&a, &b), 0);
    }

    #[test]
    fn duplicate_interests_are_not_double_counted() {
        let a_i = strings(&["x", "x", "y"]);
        let b_i = strings(&["x", "z", "w"]);
        let a = input(&a_i, None, None);
        let b = input(&b_i, None, None);
        // one distinct common interest over max length 3
        assert_eq!(score(&a, &b), 13);
    }
}
