use crate::util::count_words;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharClass {
    Correct,
    Incorrect,
    Untyped,
}

/// Result of diffing the typed text against the passage.
///
/// `classes` has one entry per passage character. Characters typed past the
/// end of the passage have no slot there but count as errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comparison {
    pub classes: Vec<CharClass>,
    pub correct: usize,
    pub errors: usize,
    pub typed: usize,
    pub words: usize,
    pub matches_target: bool,
}

impl Comparison {
    /// Nothing typed yet
    pub fn untyped(target: &str) -> Self {
        Self {
            classes: vec![CharClass::Untyped; target.chars().count()],
            ..Self::default()
        }
    }

    /// Index of the next character to type, clamped to the passage
    pub fn cursor(&self) -> usize {
        self.typed.min(self.classes.len())
    }
}

pub fn compare(target: &str, typed: &str) -> Comparison {
    let mut comparison = Comparison::untyped(target);
    let mut expected = target.chars();

    for (idx, c) in typed.chars().enumerate() {
        match expected.next() {
            Some(e) if e == c => {
                comparison.classes[idx] = CharClass::Correct;
                comparison.correct += 1;
            }
            Some(_) => {
                comparison.classes[idx] = CharClass::Incorrect;
                comparison.errors += 1;
            }
            None => comparison.errors += 1,
        }
        comparison.typed += 1;
    }

    comparison.words = count_words(typed);
    comparison.matches_target = typed == target;
    comparison
}

/// A key press the widget reacts to before the text changes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Keystroke {
    Char(char),
    Backspace,
}

/// Whether the key may reach the input under the current backspace setting
pub fn keystroke_allowed(key: Keystroke, allow_backspace: bool) -> bool {
    match key {
        Keystroke::Backspace => allow_backspace,
        Keystroke::Char(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CharClass::*;

    #[test]
    fn substitution_is_an_error() {
        let c = compare("abc", "abd");
        assert_eq!(c.classes, vec![Correct, Correct, Incorrect]);
        assert_eq!(c.correct, 2);
        assert_eq!(c.errors, 1);
        assert_eq!(c.typed, 3);
        assert!(!c.matches_target);
    }

    #[test]
    fn untyped_tail_is_neutral() {
        let c = compare("hello", "he");
        assert_eq!(c.classes, vec![Correct, Correct, Untyped, Untyped, Untyped]);
        assert_eq!(c.cursor(), 2);
    }

    #[test]
    fn empty_input() {
        let c = compare("abc", "");
        assert_eq!(c, Comparison::untyped("abc"));
        assert_eq!(c.words, 0);
        assert_eq!(c.cursor(), 0);
    }

    #[test]
    fn overflow_counts_as_errors() {
        let c = compare("ab", "abxy");
        assert_eq!(c.classes, vec![Correct, Correct]);
        assert_eq!(c.errors, 2);
        assert_eq!(c.typed, 4);
        assert_eq!(c.cursor(), 2);
    }

    #[test]
    fn compares_by_character_not_byte() {
        let c = compare("Привет", "Прив");
        assert_eq!(c.classes.len(), 6);
        assert_eq!(c.correct, 4);
        assert_eq!(c.errors, 0);

        let c = compare("oʻzbek", "ozbek");
        assert_eq!(c.classes[..2], [Correct, Incorrect]);
    }

    #[test]
    fn words_follow_live_input() {
        assert_eq!(compare("one two three", "one tw").words, 2);
        // deleting text lowers the count again
        assert_eq!(compare("one two three", "one ").words, 1);
        assert_eq!(compare("one two three", "   ").words, 0);
    }

    #[test]
    fn exact_match_detected() {
        let c = compare("hi there", "hi there");
        assert!(c.matches_target);
        assert_eq!(c.correct, 8);
        assert_eq!(c.words, 2);
    }

    #[test]
    fn backspace_policy() {
        assert!(keystroke_allowed(Keystroke::Backspace, true));
        assert!(!keystroke_allowed(Keystroke::Backspace, false));
        assert!(keystroke_allowed(Keystroke::Char('x'), false));
    }
}
