//! Fact extraction from what the child says.
//!
//! A handful of literal substring rules, nothing smarter. Substring matching
//! means "swim every day" contains "im " and reads as a name; that is a
//! known limitation of the rules, not something to patch here.

/// Phrases that make an utterance worth inspecting at all.
pub const TRIGGERS: [&str; 7] = [
    "my favorite",
    "i like",
    "i love",
    "i have",
    "my name is ",
    "i'm ",
    "im ",
];

/// Self-introduction phrases, tried in this order.
const NAME_PHRASES: [&str; 3] = ["my name is ", "i'm ", "im "];

/// One fact to write into the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFact {
    pub category: &'static str,
    pub key: &'static str,
    pub value: String,
}

pub fn is_triggered(utterance: &str) -> bool {
    let lower = utterance.to_lowercase();
    TRIGGERS.iter().any(|t| lower.contains(t))
}

/// Apply the extraction rules. At most one fact comes out.
///
/// The assistant reply is accepted for future rules but unused today.
pub fn extract(utterance: &str, _reply: &str) -> Vec<ExtractedFact> {
    let lower = utterance.to_lowercase();
    if !TRIGGERS.iter().any(|t| lower.contains(t)) {
        return Vec::new();
    }

    if let Some(phrase) = NAME_PHRASES.iter().find(|p| lower.contains(*p)) {
        return lower
            .split_once(phrase)
            .and_then(|(_, rest)| rest.split_whitespace().next())
            .map(|token| token.trim_matches(|c| matches!(c, '.' | ',' | '!' | '?')))
            .filter(|token| !token.is_empty())
            .map(|token| ExtractedFact {
                category: "kids",
                key: "current_child_name",
                value: title_case(token),
            })
            .into_iter()
            .collect();
    }

    if lower.contains("favorite") {
        if lower.contains("color") {
            return vec![ExtractedFact {
                category: "preferences",
                key: "favorite_color",
                value: utterance.to_string(),
            }];
        }
        if lower.contains("animal") {
            return vec![ExtractedFact {
                category: "preferences",
                key: "favorite_animal",
                value: utterance.to_string(),
            }];
        }
    }

    Vec::new()
}

/// Uppercase each letter that starts a run of letters, lowercase the rest.
fn title_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut prev_is_letter = false;
    for c in word.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(utterance: &str) -> ExtractedFact {
        let mut facts = extract(utterance, "");
        assert_eq!(facts.len(), 1, "expected one fact from {utterance:?}");
        facts.remove(0)
    }

    #[test]
    fn name_from_introduction() {
        let fact = single("My name is Alice!");
        assert_eq!(fact.category, "kids");
        assert_eq!(fact.key, "current_child_name");
        assert_eq!(fact.value, "Alice");
    }

    #[test]
    fn name_variants() {
        assert_eq!(single("Hi, I'm sam.").value, "Sam");
        assert_eq!(single("im JORDAN").value, "Jordan");
        assert_eq!(single("my name is mary-jane").value, "Mary-Jane");
    }

    #[test]
    fn first_matching_phrase_wins() {
        // Both "my name is " and "i'm " appear; the former is tried first.
        assert_eq!(single("My name is Leo and I'm six").value, "Leo");
    }

    #[test]
    fn favorite_animal_keeps_full_utterance() {
        let fact = single("My favorite animal is a dolphin");
        assert_eq!(fact.category, "preferences");
        assert_eq!(fact.key, "favorite_animal");
        assert_eq!(fact.value, "My favorite animal is a dolphin");
    }

    #[test]
    fn color_checked_before_animal() {
        let fact = single("My favorite color is blue and my favorite animal is a cat");
        assert_eq!(fact.key, "favorite_color");
    }

    #[test]
    fn name_rule_beats_favorites() {
        let fact = single("I'm Zoe and my favorite color is green");
        assert_eq!(fact.key, "current_child_name");
    }

    #[test]
    fn triggered_but_no_rule() {
        assert!(is_triggered("I like pizza"));
        assert!(extract("I like pizza", "").is_empty());
    }

    #[test]
    fn untriggered_utterances_yield_nothing() {
        assert!(!is_triggered("What color is the sky?"));
        assert!(extract("What is your favorite color?", "").is_empty());
    }

    #[test]
    fn substring_matching_is_literal() {
        // "swim " contains "im ": the rule fires on the next word.
        assert_eq!(single("I like to swim every day").value, "Every");
    }

    #[test]
    fn phrase_at_end_yields_nothing() {
        assert!(extract("my name is ", "").is_empty());
    }
}
