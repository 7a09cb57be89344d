use std::collections::HashSet;

use crate::features::FeatureVector;
use crate::persona::PersonaLabel;
use crate::scoring::ScoreResult;

pub const DEFAULT_MAX_RECOMMENDATIONS: usize = 6;

const HEAVY_USAGE_MINUTES: f64 = 120.0;

type Rule = fn(&ScoreResult, PersonaLabel, &FeatureVector) -> Vec<&'static str>;

// Order is diagnostic severity; the cap drops from the tail.
const RULES: [Rule; 9] = [
    happiness_band,
    stress_band,
    stress_exercise_follow_up,
    persona_habits,
    persona_offline,
    persona_usage_cap,
    sleep,
    exercise,
    social,
];

/// Ordered, deduplicated advice; never empty, at most `max` entries.
pub fn compose(
    scores: &ScoreResult,
    persona: PersonaLabel,
    features: &FeatureVector,
    max: usize,
) -> Vec<String> {
    let mut recommendations: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for rule in RULES {
        for text in rule(scores, persona, features) {
            let normalized = normalize_text(text);
            if normalized.is_empty() || !seen.insert(normalized) {
                continue;
            }
            recommendations.push(text.to_string());
        }
    }

    recommendations.truncate(max.max(1));
    recommendations
}

fn happiness_band(scores: &ScoreResult, _: PersonaLabel, _: &FeatureVector) -> Vec<&'static str> {
    if scores.happiness < 5.0 {
        vec![
            "Make room for activities that bring you joy and a sense of accomplishment.",
            "Spend more quality time with the people you care about.",
        ]
    } else if scores.happiness < 7.0 {
        vec!["You are doing well. Keep up your current routine."]
    } else {
        vec!["Great happiness level! Share that positive energy with the people around you."]
    }
}

fn stress_band(scores: &ScoreResult, _: PersonaLabel, _: &FeatureVector) -> Vec<&'static str> {
    if scores.stress > 7.0 {
        vec![
            "High stress detected. Try meditation or short mindfulness exercises.",
            "Make sure you get enough sleep (7-9 hours a night).",
        ]
    } else if scores.stress > 5.0 {
        vec!["Moderate stress. Look for a better balance between work and personal life."]
    } else {
        Vec::new()
    }
}

fn stress_exercise_follow_up(
    scores: &ScoreResult,
    _: PersonaLabel,
    features: &FeatureVector,
) -> Vec<&'static str> {
    if scores.stress > 7.0 && features.number_or("exercise_hours_per_week", 0.0) < 3.0 {
        vec!["Add physical activity: at least 30 minutes a day."]
    } else {
        Vec::new()
    }
}

fn persona_habits(_: &ScoreResult, persona: PersonaLabel, _: &FeatureVector) -> Vec<&'static str> {
    match persona {
        PersonaLabel::DoomScroller => vec![
            "Cut back on social media: set a daily time limit on Instagram.",
            "Turn off non-essential notifications to reduce anxiety.",
        ],
        PersonaLabel::Light | PersonaLabel::Moderate => {
            vec!["Healthy social media habits! Keep the balance."]
        }
    }
}

fn persona_offline(_: &ScoreResult, persona: PersonaLabel, _: &FeatureVector) -> Vec<&'static str> {
    if persona == PersonaLabel::DoomScroller {
        vec!["Spend more time on offline activities and hobbies."]
    } else {
        Vec::new()
    }
}

fn persona_usage_cap(
    _: &ScoreResult,
    persona: PersonaLabel,
    features: &FeatureVector,
) -> Vec<&'static str> {
    let minutes = features.number_or("daily_active_minutes_instagram", 0.0);
    if persona == PersonaLabel::DoomScroller && minutes > HEAVY_USAGE_MINUTES {
        vec!["Your Instagram time is high. Aim to keep it to 1-2 hours a day."]
    } else {
        Vec::new()
    }
}

fn sleep(_: &ScoreResult, _: PersonaLabel, features: &FeatureVector) -> Vec<&'static str> {
    if features.number_or("sleep_hours_per_night", 8.0) < 6.0 {
        vec!["You need more sleep. Aim for 7-9 hours every night."]
    } else {
        Vec::new()
    }
}

fn exercise(_: &ScoreResult, _: PersonaLabel, features: &FeatureVector) -> Vec<&'static str> {
    if features.number_or("exercise_hours_per_week", 0.0) < 2.5 {
        vec!["Be more physically active to support your mental health."]
    } else {
        Vec::new()
    }
}

fn social(_: &ScoreResult, _: PersonaLabel, features: &FeatureVector) -> Vec<&'static str> {
    if features.number_or("social_events_per_month", 0.0) < 4.0 {
        vec!["Meet people in person more often to strengthen your well-being."]
    } else {
        Vec::new()
    }
}

fn normalize_text(value: &str) -> String {
    value
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{normalize, FEATURE_NAMES};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn features(value: serde_json::Value) -> FeatureVector {
        normalize(value.as_object().expect("object"), &FEATURE_NAMES)
    }

    fn healthy_lifestyle() -> FeatureVector {
        features(json!({
            "sleep_hours_per_night": 8,
            "exercise_hours_per_week": 5,
            "social_events_per_month": 6,
            "daily_active_minutes_instagram": 30,
        }))
    }

    #[test]
    fn happy_light_user_gets_short_list() {
        let scores = ScoreResult {
            happiness: 8.2,
            stress: 2.0,
        };
        let list = compose(&scores, PersonaLabel::Light, &healthy_lifestyle(), 6);

        assert_eq!(
            list,
            vec![
                "Great happiness level! Share that positive energy with the people around you."
                    .to_string(),
                "Healthy social media habits! Keep the balance.".to_string(),
            ]
        );
    }

    #[test]
    fn severe_profile_is_capped_in_rule_order() {
        let scores = ScoreResult {
            happiness: 3.0,
            stress: 8.5,
        };
        let lifestyle = features(json!({
            "sleep_hours_per_night": 4,
            "exercise_hours_per_week": 1,
            "social_events_per_month": 0,
            "daily_active_minutes_instagram": 230,
        }));
        let list = compose(&scores, PersonaLabel::DoomScroller, &lifestyle, 6);

        assert_eq!(list.len(), 6);
        assert!(list[0].starts_with("Make room for activities"));
        assert!(list[2].starts_with("High stress detected"));
        assert_eq!(list[4], "Add physical activity: at least 30 minutes a day.");
        assert_eq!(list[5], "Cut back on social media: set a daily time limit on Instagram.");
        assert!(!list.iter().any(|item| item.starts_with("You need more sleep")));
    }

    #[test]
    fn tail_rules_apply_when_room_remains() {
        let scores = ScoreResult {
            happiness: 6.0,
            stress: 4.0,
        };
        let lifestyle = features(json!({
            "sleep_hours_per_night": 5,
            "exercise_hours_per_week": 1,
            "social_events_per_month": 1,
        }));
        let list = compose(&scores, PersonaLabel::Moderate, &lifestyle, 6);

        assert_eq!(
            list,
            vec![
                "You are doing well. Keep up your current routine.".to_string(),
                "Healthy social media habits! Keep the balance.".to_string(),
                "You need more sleep. Aim for 7-9 hours every night.".to_string(),
                "Be more physically active to support your mental health.".to_string(),
                "Meet people in person more often to strengthen your well-being.".to_string(),
            ]
        );
    }

    #[test]
    fn usage_cap_requires_heavy_minutes() {
        let scores = ScoreResult {
            happiness: 8.0,
            stress: 2.0,
        };
        let list = compose(&scores, PersonaLabel::DoomScroller, &healthy_lifestyle(), 6);

        assert!(list.iter().any(|item| item.contains("daily time limit on Instagram")));
        assert!(!list.iter().any(|item| item.contains("1-2 hours")));
    }

    #[test]
    fn never_empty_even_with_zero_cap() {
        let scores = ScoreResult {
            happiness: 5.5,
            stress: 5.5,
        };
        let list = compose(&scores, PersonaLabel::Light, &healthy_lifestyle(), 0);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn deduplicates_case_and_whitespace_variants() {
        assert_eq!(
            normalize_text("  Make sure   you get ENOUGH sleep "),
            "make sure you get enough sleep"
        );
    }
}
