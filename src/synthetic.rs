use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use serde_json::{json, Map, Value};

const GENDERS: [&str; 3] = ["Male", "Female", "Other"];
const COUNTRIES: [&str; 6] = ["Vietnam", "United States", "India", "Brazil", "Germany", "Japan"];
const URBAN_RURAL: [&str; 2] = ["Urban", "Rural"];
const INCOME_LEVELS: [&str; 3] = ["Low", "Medium", "High"];
const EMPLOYMENT: [&str; 4] = ["Employed", "Unemployed", "Student", "Self-employed"];
const EDUCATION: [&str; 4] = ["High School", "Bachelor", "Master", "PhD"];
const RELATIONSHIP: [&str; 3] = ["Single", "In a relationship", "Married"];
const DIET: [&str; 4] = ["Poor", "Average", "Good", "Excellent"];
const ALCOHOL: [&str; 4] = ["Never", "Rarely", "Weekly", "Daily"];
const YES_NO: [&str; 2] = ["Yes", "No"];

#[derive(Debug, Clone, Copy)]
enum UsageProfile {
    Light,
    Moderate,
    Heavy,
}

/// Deterministic raw records covering light to heavy usage.
pub fn generate_profiles(count: usize, seed: u64) -> Vec<Map<String, Value>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count).map(|_| generate_profile(&mut rng)).collect()
}

fn generate_profile(rng: &mut StdRng) -> Map<String, Value> {
    let profile = match rng.gen_range(0..3) {
        0 => UsageProfile::Light,
        1 => UsageProfile::Moderate,
        _ => UsageProfile::Heavy,
    };

    let (minutes, sessions, interactions, notification) = match profile {
        UsageProfile::Light => (5.0..60.0, 1..6, 0..15, 0.05..0.35),
        UsageProfile::Moderate => (60.0..170.0, 5..16, 10..50, 0.3..0.7),
        UsageProfile::Heavy => (170.0..300.0, 15..45, 40..120, 0.6..1.0),
    };

    let active = round1(rng.gen_range(minutes));
    let feed_share = rng.gen_range(0.2..0.6);
    let feed = round1(active * feed_share);
    let reels = round1(active * (1.0 - feed_share) * rng.gen_range(0.5..1.0));

    let record = json!({
        "age": rng.gen_range(13..80),
        "gender": pick(rng, &GENDERS),
        "country": pick(rng, &COUNTRIES),
        "urban_rural": pick(rng, &URBAN_RURAL),
        "income_level": pick(rng, &INCOME_LEVELS),
        "employment_status": pick(rng, &EMPLOYMENT),
        "education_level": pick(rng, &EDUCATION),
        "relationship_status": pick(rng, &RELATIONSHIP),
        "has_children": pick(rng, &YES_NO),
        "sleep_hours_per_night": round1(rng.gen_range(4.0..9.5)),
        "exercise_hours_per_week": round1(rng.gen_range(0.0..10.0)),
        "daily_steps_count": rng.gen_range(1_000..15_000),
        "diet_quality": pick(rng, &DIET),
        "smoking": pick(rng, &YES_NO),
        "alcohol_frequency": pick(rng, &ALCOHOL),
        "body_mass_index": round1(rng.gen_range(17.0..35.0)),
        "weekly_work_hours": round1(rng.gen_range(0.0..60.0)),
        "hobbies_count": rng.gen_range(0..6),
        "social_events_per_month": rng.gen_range(0..12),
        "daily_active_minutes_instagram": active,
        "sessions_per_day": rng.gen_range(sessions),
        "reels_watched_per_day": rng.gen_range(interactions.clone()),
        "stories_viewed_per_day": rng.gen_range(interactions.clone()),
        "time_on_feed_per_day": feed,
        "time_on_reels_per_day": reels,
        "likes_given_per_day": rng.gen_range(interactions.clone()),
        "comments_written_per_day": rng.gen_range(0..(interactions.end / 4).max(1)),
        "notification_response_rate": round2(rng.gen_range(notification)),
    });

    match record {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn pick(rng: &mut StdRng, options: &[&'static str]) -> &'static str {
    options.choose(rng).copied().unwrap_or("")
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
