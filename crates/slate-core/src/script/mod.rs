//! Scene splitting and manual scene parsing.
//!
//! Partitions script text into an ordered sequence of scenes using heading
//! heuristics, and derives per-scene data (characters, page estimate,
//! location) without any external call. The order of scenes is the order of
//! appearance in the text and is never re-sorted.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::Regex;

use crate::models::{RawScriptData, SceneData, SceneKind};

static HEADING_FULL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(INT\.?|EXT\.?)\s*\.?\s*\w+\s*-?\s*(DAY|NIGHT|DAWN|DUSK)").unwrap()
});
static HEADING_ANY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^(INT\.?|EXT\.?)").unwrap());
static HEADING_BABAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^BABAK\s+\d+:\s*(INT\.?|EXT\.?)").unwrap());
static HEADING_BABAK_FULL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^BABAK\s+\d+:\s*(INT\.?|EXT\.?)\s*(.+)").unwrap());
static HEADING_STANDARD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(INT\.?|EXT\.?)\s+(.+)").unwrap());
static PARENTHETICAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\([^)]*\)").unwrap());

const MAX_SAMPLE_LINES: usize = 5;
const MAX_SAMPLE_LEN: usize = 150;
const WORDS_PER_PAGE: f64 = 250.0;

/// Keywords that disqualify an all-caps line from being a character cue.
const EXCLUDED_PREFIXES: &[&str] = &["BABAK", "INT.", "EXT.", "FADE", "CUT", "CONTINUE"];

const PROP_KEYWORDS: &[&str] = &[
    "gun", "phone", "car", "knife", "bag", "laptop", "camera", "cup", "coffee", "table", "chair",
    "desk", "door", "window", "book", "paper", "pen", "telefon", "kereta", "meja", "kerusi",
    "pintu", "tingkap", "buku", "topi", "komputer", "radio", "jam", "cermin", "batu", "bola",
];

const SPECIAL_KEYWORDS: &[&str] = &[
    "explosion", "stunt", "effect", "buzzes", "rings", "crash", "gunshot", "letupan", "bunyi",
    "kemalangan", "tembakan", "jeritan",
];

/// Split script text into scene chunks, in order of appearance.
///
/// A scene starts at a heading line (`INT.`/`EXT.` forms, `BABAK n:` forms,
/// or a standalone scene number immediately followed by an INT/EXT line).
pub fn split_scenes(content: &str) -> Vec<String> {
    let lines: Vec<&str> = content.split('\n').collect();
    let mut scenes: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let stripped = line.trim();

        let is_heading = HEADING_FULL.is_match(stripped)
            || HEADING_ANY.is_match(stripped)
            || HEADING_BABAK.is_match(stripped);

        // Standalone scene number, only when the next line is an INT/EXT heading.
        let is_numbered = !stripped.is_empty()
            && stripped.chars().all(|c| c.is_ascii_digit())
            && i + 1 < lines.len()
            && HEADING_ANY.is_match(lines[i + 1].trim());

        if is_heading || is_numbered {
            // A bare scene number opens the scene of the heading that follows
            // it; don't flush it as a scene of its own.
            let only_marker = current.iter().all(|l| {
                let t = l.trim();
                t.is_empty() || t.chars().all(|c| c.is_ascii_digit())
            });
            let has_content = current.iter().any(|l| !l.trim().is_empty());

            if has_content && only_marker {
                current.push(line);
            } else {
                if has_content {
                    scenes.push(current.join("\n"));
                }
                current = vec![line];
            }
        } else {
            current.push(line);
        }
    }

    if current.iter().any(|l| !l.trim().is_empty()) {
        scenes.push(current.join("\n"));
    }

    tracing::debug!("Split script into {} scenes", scenes.len());
    scenes
}

/// Parse one scene chunk without any generation call.
///
/// `index` is the 0-based position of the scene in the script.
pub fn parse_scene(scene_text: &str, index: usize) -> SceneData {
    let lines: Vec<&str> = scene_text.split('\n').collect();

    let mut scene_header = String::new();
    let mut location = "UNKNOWN LOCATION".to_string();
    let mut time_of_day = "DAY".to_string();
    let mut scene_type = SceneKind::Int;

    for line in &lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let caps = HEADING_BABAK_FULL
            .captures(line)
            .or_else(|| HEADING_STANDARD.captures(line));
        if let Some(caps) = caps {
            scene_header = line.to_string();
            scene_type = SceneKind::from_str(&caps[1]);
            let location_time = caps[2].trim();

            let mut found = false;
            for separator in [" \u{2013} ", " - "] {
                if let Some((loc, tod)) = location_time.split_once(separator) {
                    location = loc.trim().to_string();
                    time_of_day = tod.trim().to_ascii_uppercase();
                    found = true;
                    break;
                }
            }
            if !found {
                location = location_time.to_string();
            }
            break;
        }
    }

    if scene_header.is_empty() {
        scene_header = format!("BABAK {}: INT. UNKNOWN LOCATION \u{2013} DAY", index + 1);
    }

    // BTreeSet keeps the character list deterministic for fallbacks and tests.
    let mut characters: BTreeSet<String> = BTreeSet::new();
    let mut dialogue_lines: Vec<String> = Vec::new();
    let mut action_lines: Vec<String> = Vec::new();
    let mut props_mentioned: BTreeSet<String> = BTreeSet::new();
    let mut special_requirements: Vec<String> = Vec::new();

    for line in lines.iter().skip(1) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if is_character_cue(line) {
            let clean = PARENTHETICAL.replace_all(line, "").trim().to_string();
            if !clean.is_empty() {
                characters.insert(clean);
            }
        } else if line != line.to_uppercase() {
            let lower = line.to_lowercase();

            for prop in PROP_KEYWORDS {
                if lower.contains(prop) {
                    props_mentioned.insert((*prop).to_string());
                }
            }

            if SPECIAL_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
                special_requirements.push(line.to_string());
            }

            let mentions_character = characters
                .iter()
                .any(|c| lower.contains(&c.to_lowercase()));
            if mentions_character || line.contains('(') {
                if dialogue_lines.len() < MAX_SAMPLE_LINES {
                    dialogue_lines.push(truncate(line, MAX_SAMPLE_LEN));
                }
            } else if action_lines.len() < MAX_SAMPLE_LINES {
                action_lines.push(truncate(line, MAX_SAMPLE_LEN));
            }
        }
    }

    let word_count = scene_text.split_whitespace().count();

    SceneData {
        scene_number: index + 1,
        scene_header,
        location,
        time_of_day,
        scene_type,
        characters_present: characters.into_iter().collect(),
        dialogue_lines,
        action_lines,
        estimated_pages: (word_count as f64 / WORDS_PER_PAGE).max(0.1),
        props_mentioned: props_mentioned.into_iter().collect(),
        special_requirements,
    }
}

fn is_character_cue(line: &str) -> bool {
    line == line.to_uppercase()
        && line.chars().any(|c| c.is_alphabetic())
        && line.split_whitespace().count() <= 4
        && line.len() > 1
        && !EXCLUDED_PREFIXES.iter().any(|p| line.starts_with(p))
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Aggregate per-scene data into whole-script statistics.
pub fn aggregate(scenes: Vec<SceneData>, content: &str) -> RawScriptData {
    let mut all_characters: BTreeSet<String> = BTreeSet::new();
    let mut all_locations: BTreeSet<String> = BTreeSet::new();
    let mut locations_by_type: HashMap<String, Vec<String>> = HashMap::from([
        ("INT".to_string(), Vec::new()),
        ("EXT".to_string(), Vec::new()),
    ]);

    for scene in &scenes {
        all_characters.extend(scene.characters_present.iter().cloned());
        if !scene.location.is_empty() {
            all_locations.insert(scene.location.clone());
            let bucket = locations_by_type
                .entry(scene.scene_type.as_str().to_string())
                .or_default();
            if !bucket.contains(&scene.location) {
                bucket.push(scene.location.clone());
            }
        }
    }

    let estimated_total_pages = scenes.iter().map(|s| s.estimated_pages).sum();
    let total_scene_count = scenes.len();

    RawScriptData {
        scenes,
        total_characters: all_characters.into_iter().collect(),
        total_locations: all_locations.into_iter().collect(),
        locations_by_type,
        language_detected: detect_language(content),
        estimated_total_pages,
        total_scene_count,
    }
}

/// Crude Malay-vs-English detection from indicator word frequency.
pub fn detect_language(content: &str) -> String {
    let text_lower = content.to_lowercase();

    let malay_indicators = ["yang", "dan", "dengan", "untuk", "adalah", "terima kasih"];
    let english_indicators = ["the", "and", "with", "for", "is", "thank you"];

    let malay = malay_indicators
        .iter()
        .filter(|w| text_lower.contains(*w))
        .count() as f64;
    let english = english_indicators
        .iter()
        .filter(|w| text_lower.contains(*w))
        .count() as f64;

    if malay > english * 1.3 {
        "Malay".to_string()
    } else if english > malay * 1.3 {
        "English".to_string()
    } else {
        "Mixed/Unknown".to_string()
    }
}

/// Last-resort extraction when no scene heading can be found: scan the whole
/// text for headings and character cues and produce at least one scene.
pub fn fallback_extraction(content: &str) -> RawScriptData {
    let mut characters: BTreeSet<String> = BTreeSet::new();
    let mut scene_headers: Vec<String> = Vec::new();

    for line in content.split('\n') {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if HEADING_STANDARD.is_match(line) || HEADING_BABAK.is_match(line) {
            scene_headers.push(line.to_string());
        } else if is_character_cue(line) {
            let clean = PARENTHETICAL.replace_all(line, "").trim().to_string();
            if !clean.is_empty() {
                characters.insert(clean);
            }
        }
    }

    let characters: Vec<String> = characters.into_iter().collect();
    let chars_per_page = 250.0;

    let scenes: Vec<SceneData> = if scene_headers.is_empty() {
        vec![SceneData {
            scene_number: 1,
            scene_header: "INT. UNKNOWN LOCATION - DAY".to_string(),
            location: "UNKNOWN LOCATION".to_string(),
            time_of_day: "DAY".to_string(),
            scene_type: SceneKind::Int,
            characters_present: characters.clone(),
            dialogue_lines: Vec::new(),
            action_lines: Vec::new(),
            estimated_pages: (content.len() as f64 / chars_per_page).max(1.0),
            props_mentioned: Vec::new(),
            special_requirements: Vec::new(),
        }]
    } else {
        let per_scene_pages =
            (content.len() as f64 / (chars_per_page * scene_headers.len() as f64)).max(1.0);
        scene_headers
            .iter()
            .enumerate()
            .map(|(i, header)| SceneData {
                scene_number: i + 1,
                scene_header: header.clone(),
                location: "UNKNOWN LOCATION".to_string(),
                time_of_day: "DAY".to_string(),
                scene_type: SceneKind::from_str(header),
                characters_present: characters.clone(),
                dialogue_lines: Vec::new(),
                action_lines: Vec::new(),
                estimated_pages: per_scene_pages,
                props_mentioned: Vec::new(),
                special_requirements: Vec::new(),
            })
            .collect()
    };

    let estimated_total_pages = scenes.iter().map(|s| s.estimated_pages).sum();
    let total_scene_count = scenes.len();

    RawScriptData {
        scenes,
        total_characters: characters,
        total_locations: vec!["UNKNOWN LOCATION".to_string()],
        locations_by_type: HashMap::from([
            ("INT".to_string(), vec!["UNKNOWN LOCATION".to_string()]),
            ("EXT".to_string(), Vec::new()),
        ]),
        language_detected: "English".to_string(),
        estimated_total_pages,
        total_scene_count,
    }
}
