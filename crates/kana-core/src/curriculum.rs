//! The built-in curriculum: both syllabaries in gojūon order, split into
//! ordered learning modules.
//!
//! Reference data is compiled in and seeded into the database at startup.
//! Characters and modules use stable human-readable slugs (`hira_ka`,
//! `hiragana_2`) rather than generated ids so re-seeding is idempotent.
//!
//! This module also owns [`readings_match`] — the one correctness rule for
//! comparing a submitted answer against a character's reading. Server-side
//! scoring and client-side optimistic scoring both call it, so the two can
//! never drift apart.

use serde::{Deserialize, Serialize};

/// Which of the two syllabaries a character belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    /// The cursive syllabary, taught first.
    Hiragana,
    /// The angular syllabary, used mainly for loanwords.
    Katakana,
}

impl Script {
    /// Stable storage string (`"hiragana"` / `"katakana"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hiragana => "hiragana",
            Self::Katakana => "katakana",
        }
    }

    /// Parse the storage string back into a [`Script`].
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "hiragana" => Some(Self::Hiragana),
            "katakana" => Some(Self::Katakana),
            _ => None,
        }
    }

    fn slug_prefix(self) -> &'static str {
        match self {
            Self::Hiragana => "hira",
            Self::Katakana => "kata",
        }
    }
}

/// One syllabary character as seeded into the database.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    /// Stable slug id (`hira_ka`).
    pub id: String,
    /// Display glyph (`か`).
    pub glyph: String,
    /// Romanized phonetic reading (`ka`).
    pub reading: String,
    /// Owning syllabary.
    pub script: Script,
    /// Gojūon ordinal within the syllabary, 1-based.
    pub position: i64,
}

/// One learning module: an ordered slice of a syllabary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSeed {
    /// Stable slug id (`hiragana_2`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Global ordinal across all modules, 1-based. Module N+1 unlocks when
    /// module N's progress reaches the unlock threshold.
    pub position: i64,
    /// Characters in presentation order.
    pub characters: Vec<Character>,
}

/// The single comparison rule for answer correctness.
///
/// Case-insensitive exact match on trimmed text. Both the server's
/// authoritative scoring and the client's optimistic scoring must go
/// through this function.
pub fn readings_match(submitted: &str, reading: &str) -> bool {
    submitted.trim().to_lowercase() == reading.trim().to_lowercase()
}

/// Gojūon table for one syllabary: (glyph, reading) in canonical order.
type Gojuon = &'static [(&'static str, &'static str)];

const HIRAGANA: Gojuon = &[
    ("あ", "a"), ("い", "i"), ("う", "u"), ("え", "e"), ("お", "o"),
    ("か", "ka"), ("き", "ki"), ("く", "ku"), ("け", "ke"), ("こ", "ko"),
    ("さ", "sa"), ("し", "shi"), ("す", "su"), ("せ", "se"), ("そ", "so"),
    ("た", "ta"), ("ち", "chi"), ("つ", "tsu"), ("て", "te"), ("と", "to"),
    ("な", "na"), ("に", "ni"), ("ぬ", "nu"), ("ね", "ne"), ("の", "no"),
    ("は", "ha"), ("ひ", "hi"), ("ふ", "fu"), ("へ", "he"), ("ほ", "ho"),
    ("ま", "ma"), ("み", "mi"), ("む", "mu"), ("め", "me"), ("も", "mo"),
    ("や", "ya"), ("ゆ", "yu"), ("よ", "yo"),
    ("ら", "ra"), ("り", "ri"), ("る", "ru"), ("れ", "re"), ("ろ", "ro"),
    ("わ", "wa"), ("を", "wo"), ("ん", "n"),
];

const KATAKANA: Gojuon = &[
    ("ア", "a"), ("イ", "i"), ("ウ", "u"), ("エ", "e"), ("オ", "o"),
    ("カ", "ka"), ("キ", "ki"), ("ク", "ku"), ("ケ", "ke"), ("コ", "ko"),
    ("サ", "sa"), ("シ", "shi"), ("ス", "su"), ("セ", "se"), ("ソ", "so"),
    ("タ", "ta"), ("チ", "chi"), ("ツ", "tsu"), ("テ", "te"), ("ト", "to"),
    ("ナ", "na"), ("ニ", "ni"), ("ヌ", "nu"), ("ネ", "ne"), ("ノ", "no"),
    ("ハ", "ha"), ("ヒ", "hi"), ("フ", "fu"), ("ヘ", "he"), ("ホ", "ho"),
    ("マ", "ma"), ("ミ", "mi"), ("ム", "mu"), ("メ", "me"), ("モ", "mo"),
    ("ヤ", "ya"), ("ユ", "yu"), ("ヨ", "yo"),
    ("ラ", "ra"), ("リ", "ri"), ("ル", "ru"), ("レ", "re"), ("ロ", "ro"),
    ("ワ", "wa"), ("ヲ", "wo"), ("ン", "n"),
];

/// Module boundaries within a gojūon table: (name suffix, start, end).
///
/// Every slice holds at least 8 characters with pairwise-distinct readings,
/// so a 4-option question can always draw 3 distractors from within the
/// module.
const MODULE_ROWS: &[(&str, usize, usize)] = &[
    ("Vowels & K", 0, 10),
    ("S & T", 10, 20),
    ("N & H", 20, 30),
    ("M & Y", 30, 38),
    ("R, W & N", 38, 46),
];

fn characters_of(script: Script, table: Gojuon) -> Vec<Character> {
    table
        .iter()
        .enumerate()
        .map(|(i, (glyph, reading))| Character {
            id: format!("{}_{reading}", script.slug_prefix()),
            glyph: (*glyph).to_string(),
            reading: (*reading).to_string(),
            script,
            position: (i + 1) as i64,
        })
        .collect()
}

/// Build the full curriculum: five hiragana modules followed by five
/// katakana modules, globally ordered.
pub fn modules() -> Vec<ModuleSeed> {
    let mut out = Vec::with_capacity(MODULE_ROWS.len() * 2);
    let mut position = 1;
    for (script, table) in [(Script::Hiragana, HIRAGANA), (Script::Katakana, KATAKANA)] {
        let chars = characters_of(script, table);
        for (idx, (name, start, end)) in MODULE_ROWS.iter().enumerate() {
            out.push(ModuleSeed {
                id: format!("{}_{}", script.as_str(), idx + 1),
                name: format!("{} {name}", script_display(script)),
                position,
                characters: chars[*start..*end].to_vec(),
            });
            position += 1;
        }
    }
    out
}

fn script_display(script: Script) -> &'static str {
    match script {
        Script::Hiragana => "Hiragana",
        Script::Katakana => "Katakana",
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
