//! Language detection and exit commands.

use qa_agent_knowledge::Language;

/// Phrases that end a conversation when they appear anywhere in the input.
pub const EXIT_COMMANDS: [&str; 6] = ["exit", "quit", "goodbye", "bye", "وداعا", "إنهاء"];

/// Pick the reply language for `text`.
///
/// Any Arabic-script character makes the text Arabic; everything else is
/// English. With Arabic disabled the default language always wins.
pub fn detect_language(text: &str, enable_arabic: bool, default: Language) -> Language {
    if !enable_arabic {
        return default;
    }

    if text.chars().any(is_arabic_script) {
        Language::Ar
    } else {
        Language::En
    }
}

/// Substring match, so "bye now" and "I want to exit" both end the chat.
pub fn is_exit_command(text: &str) -> bool {
    let lower = text.to_lowercase();
    EXIT_COMMANDS.iter().any(|cmd| lower.contains(cmd))
}

fn is_arabic_script(c: char) -> bool {
    matches!(c,
        '\u{0600}'..='\u{06FF}'
        | '\u{0750}'..='\u{077F}'
        | '\u{08A0}'..='\u{08FF}'
        | '\u{FB50}'..='\u{FDFF}'
        | '\u{FE70}'..='\u{FEFF}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_arabic() {
        assert_eq!(
            detect_language("ما هي سياسة الإرجاع؟", true, Language::En),
            Language::Ar
        );
        // One Arabic word is enough
        assert_eq!(
            detect_language("Order 1234 شحن", true, Language::En),
            Language::Ar
        );
    }

    #[test]
    fn test_latin_text_is_english() {
        assert_eq!(
            detect_language("Where is my order?", true, Language::Ar),
            Language::En
        );
        assert_eq!(detect_language("", true, Language::Ar), Language::En);
    }

    #[test]
    fn test_disabled_arabic_uses_default() {
        assert_eq!(
            detect_language("مرحبا", false, Language::En),
            Language::En
        );
        assert_eq!(
            detect_language("hello", false, Language::Ar),
            Language::Ar
        );
    }

    #[test]
    fn test_exit_commands() {
        assert!(is_exit_command("exit"));
        assert!(is_exit_command("OK, Goodbye!"));
        assert!(is_exit_command("وداعا"));
        assert!(is_exit_command("أريد إنهاء المحادثة"));
        assert!(!is_exit_command("What is your return policy?"));
    }
}
