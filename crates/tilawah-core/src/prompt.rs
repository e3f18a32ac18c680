//! Prompt text handed to the completion provider.

use indoc::{formatdoc, indoc};
use serde::{Deserialize, Serialize};

/// Persona for every AI exchange.
pub const SYSTEM_PROMPT: &str = indoc! {"
    You are a knowledgeable and patient Islamic teacher (Ustaz/Ustazah) helping Muslims learn and understand the Quran. You follow Malaysian Islamic guidelines (JAKIM/JAIS).

    Your responsibilities:
    1. Always provide accurate Quranic references in format: Surah [Name] ([Number]):[Ayat number]
    2. Be respectful, humble, and encouraging
    3. When quoting Quran, always mention the Surah name and number with Ayat
    4. For complex religious rulings (fatwa), advise users to consult certified scholars
    5. Base all answers on authentic Islamic sources (Quran, Hadith, scholarly consensus)
    6. Be supportive and patient with learners of all levels
    7. Maintain Islamic ethics (Adab) in all interactions
    8. Use respectful Islamic phrases like \"InshaAllah\", \"Alhamdulillah\", \"SubhanAllah\" appropriately
    9. Never make up Quranic verses - if unsure, say so
    10. Help users understand the context and meaning of verses

    Your tone should be:
    - Warm and welcoming
    - Patient and understanding
    - Knowledgeable but not preachy
    - Encouraging spiritual growth
    - Respectful of different levels of Islamic knowledge
"};

const HELP_SUFFIX: &str = "Provide brief, helpful guidance for using the app feature.";

/// What the user is looking at when they send a chat message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatContext {
    #[serde(default)]
    pub current_surah: Option<u32>,
    #[serde(default)]
    pub current_ayat: Option<u32>,
    #[serde(default)]
    pub screen: Option<String>,
}

impl ChatContext {
    /// `"Context: ..."` line, or `None` when nothing is known.
    pub fn render(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(surah) = self.current_surah {
            parts.push(format!("User is currently reading Surah {surah}"));
        }
        if let Some(ayat) = self.current_ayat {
            parts.push(format!("at Ayat {ayat}"));
        }
        if let Some(screen) = &self.screen {
            parts.push(format!("on the {screen} screen"));
        }
        if parts.is_empty() {
            None
        } else {
            Some(format!("Context: {}", parts.join(", ")))
        }
    }
}

/// System prompt for a chat turn, with the context line appended when present.
pub fn chat_system_prompt(context: Option<&ChatContext>) -> String {
    match context.and_then(ChatContext::render) {
        Some(line) => format!("{SYSTEM_PROMPT}\n{line}"),
        None => SYSTEM_PROMPT.to_string(),
    }
}

pub fn explain_verse_prompt(
    surah: u32,
    ayat: u32,
    surah_name: &str,
    arabic: &str,
    translation: &str,
) -> String {
    formatdoc!(
        "
            Please explain this verse from the Holy Quran:

            Surah {name} ({surah}), Ayat {ayat}

            Arabic: {arabic}
            Translation: {translation}

            Provide:
            1. Context and background of revelation (if known)
            2. Key themes and lessons
            3. Practical application in daily life
            4. Related verses if applicable

            Please structure your response clearly and keep it educational yet accessible.",
        name = surah_name,
        surah = surah,
        ayat = ayat,
        arabic = arabic,
        translation = translation,
    )
}

fn screen_help(screen: &str) -> &'static str {
    match screen {
        "home" => "Guide the user on how to start reading the Quran, explore features, and navigate the app.",
        "reading" => "Help the user understand how to read, listen to recitation, and use reading features.",
        "search" => "Explain how to search for verses, topics, and themes in the Quran.",
        "bookmarks" => "Guide on how to save, organize, and manage favorite verses.",
        "prayer" => "Explain prayer times feature and Qibla direction.",
        "progress" => "Help user understand their reading progress and streak.",
        _ => "Help the user with their current task in the app.",
    }
}

/// User prompt for in-app help on `screen`.
pub fn contextual_help_prompt(screen: &str, query: Option<&str>) -> String {
    let base = screen_help(screen);
    match query.map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => format!("{base}\n\nUser's specific question: {q}"),
        None => base.to_string(),
    }
}

/// System prompt for contextual help.
pub fn help_system_prompt() -> String {
    format!("{SYSTEM_PROMPT}\n{HELP_SUFFIX}")
}
