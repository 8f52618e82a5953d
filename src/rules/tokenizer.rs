//! Field name tokenizer for the name heuristic

use std::collections::BTreeSet;

/// Splits field, column and key names into normalized tokens
///
/// Names are split on any non-alphanumeric character and on case
/// boundaries (`zipCode`, `ZIPCode`), lowercased, and extended with the
/// concatenation of each adjacent pair and of the whole name so that
/// `last_name`, `LastName` and `lastname` all yield `lastname`.
pub struct NameTokenizer;

impl NameTokenizer {
    /// Tokenizes a name into a set of lowercase tokens
    pub fn tokenize(name: &str) -> BTreeSet<String> {
        let words = Self::split_words(name);
        let mut tokens: BTreeSet<String> = words.iter().cloned().collect();

        for pair in words.windows(2) {
            tokens.insert(pair.concat());
        }
        if words.len() > 2 {
            tokens.insert(words.concat());
        }

        tokens
    }

    /// Whether any token appears in the keyword set
    pub fn any_matches<S: AsRef<str>>(tokens: &BTreeSet<String>, keywords: &[S]) -> bool {
        keywords.iter().any(|k| tokens.contains(k.as_ref()))
    }

    fn split_words(name: &str) -> Vec<String> {
        let chars: Vec<char> = name.chars().collect();
        let mut words = Vec::new();
        let mut current = String::new();

        for (i, &c) in chars.iter().enumerate() {
            if !c.is_alphanumeric() {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
                continue;
            }

            if c.is_uppercase() && !current.is_empty() {
                let prev = chars[i - 1];
                let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
                // fooBar | FOOBar (acronym followed by a word)
                if prev.is_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_uppercase() && next_is_lower)
                {
                    words.push(std::mem::take(&mut current));
                }
            }

            current.extend(c.to_lowercase());
        }

        if !current.is_empty() {
            words.push(current);
        }

        words
    }
}
