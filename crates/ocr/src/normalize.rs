use tracing::debug;

use crate::types::TextBox;

/// Drop unusable boxes and clean the text of the rest. Order is preserved.
pub fn normalize(boxes: &[TextBox], confidence_floor: f32) -> Vec<TextBox> {
    boxes
        .iter()
        .filter_map(|b| {
            if !b.confidence.is_finite() || b.confidence < confidence_floor {
                debug!(text = %b.text, confidence = b.confidence, "dropping low-confidence box");
                return None;
            }
            let text = clean_text(&b.text);
            if text.is_empty() {
                return None;
            }
            Some(TextBox { text, ..b.clone() })
        })
        .collect()
}

/// Collapse whitespace and repair digit look-alikes inside numeric tokens.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace()
        .map(fix_numeric_token)
        .collect::<Vec<_>>()
        .join(" ")
}

fn confusable_digit(c: char) -> Option<char> {
    match c {
        'O' | 'o' => Some('0'),
        'I' | 'l' | '|' => Some('1'),
        'S' => Some('5'),
        _ => None,
    }
}

/// `$4O.5O` → `$40.50`, `2O24-01-15` → `2024-01-15`. Tokens holding any
/// letter outside the confusable set (`Total:`, `SOLO`) are left alone.
fn fix_numeric_token(token: &str) -> String {
    let digits = token.chars().filter(char::is_ascii_digit).count();
    let confusables = token.chars().filter(|&c| confusable_digit(c).is_some()).count();
    let other_letters = token
        .chars()
        .filter(|&c| c.is_alphabetic() && confusable_digit(c).is_none())
        .count();

    if digits == 0 || confusables == 0 || other_letters > 0 || confusables > digits {
        return token.to_string();
    }
    token
        .chars()
        .map(|c| confusable_digit(c).unwrap_or(c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoundingBox;

    fn tb(text: &str, confidence: f32) -> TextBox {
        TextBox::new(text, confidence, BoundingBox::from_rect(0.0, 0.0, 10.0, 10.0))
    }

    #[test]
    fn drops_low_confidence_and_blank() {
        let boxes = vec![tb("ACME", 0.9), tb("noise", 0.1), tb("   ", 0.9), tb("Total", 0.3)];
        let out = normalize(&boxes, 0.3);
        let texts: Vec<_> = out.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, ["ACME", "Total"]);
    }

    #[test]
    fn drops_nan_confidence() {
        assert!(normalize(&[tb("x", f32::NAN)], 0.0).is_empty());
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert!(normalize(&[], 0.3).is_empty());
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(clean_text("  Acme \t  Corp\n"), "Acme Corp");
    }

    #[test]
    fn fixes_letters_in_numeric_tokens() {
        assert_eq!(clean_text("Total: $4O.5O"), "Total: $40.50");
        assert_eq!(clean_text("2O24-0l-15"), "2024-01-15");
        assert_eq!(clean_text("1S.00"), "15.00");
    }

    #[test]
    fn leaves_words_alone() {
        assert_eq!(clean_text("SOLO Coffee"), "SOLO Coffee");
        assert_eq!(clean_text("Suite 4B"), "Suite 4B");
        assert_eq!(clean_text("Oslo"), "Oslo");
    }
}
