// Placeholder parsing for translated rich text
// "Drag {1} into {target}." splits into text parts and references to the
// element's children, either by 1-based position or by id attribute.

use crate::error::PlaceholderError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text, trimmed
    Text(String),
    /// Raw contents between `{` and `}`
    Ref(String),
}

pub fn parse_placeholders(translation: &str) -> Result<Vec<Segment>, PlaceholderError> {
    let mut segments = Vec::new();
    let mut part = String::new();
    let mut open_at: Option<usize> = None;

    for (offset, ch) in translation.char_indices() {
        match ch {
            '{' => {
                if open_at.is_some() {
                    return Err(PlaceholderError::UnexpectedOpen { offset });
                }
                open_at = Some(offset);
                if !part.is_empty() {
                    segments.push(Segment::Text(part.trim().to_string()));
                    part.clear();
                }
            }
            '}' => {
                if open_at.take().is_none() {
                    return Err(PlaceholderError::UnexpectedClose { offset });
                }
                segments.push(Segment::Ref(std::mem::take(&mut part)));
            }
            _ => part.push(ch),
        }
    }

    if let Some(offset) = open_at {
        return Err(PlaceholderError::Unterminated { offset });
    }
    if !part.is_empty() {
        segments.push(Segment::Text(part.trim().to_string()));
    }
    Ok(segments)
}

/// Resolve a placeholder reference against `count` children.
///
/// Numeric references are 1-based positions; anything else is matched
/// against child ids by `id_of`.
pub fn resolve_reference<F>(name: &str, count: usize, id_of: F) -> Option<usize>
where
    F: Fn(usize) -> Option<String>,
{
    if let Ok(position) = name.trim().parse::<usize>() {
        if (1..=count).contains(&position) {
            return Some(position - 1);
        }
    }
    (0..count).find(|&i| id_of(i).as_deref() == Some(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_and_references() {
        let parts = parse_placeholders("Drag {1} into {target}.").unwrap();
        assert_eq!(
            parts,
            vec![
                Segment::Text("Drag".to_string()),
                Segment::Ref("1".to_string()),
                Segment::Text("into".to_string()),
                Segment::Ref("target".to_string()),
                Segment::Text(".".to_string()),
            ]
        );
    }

    #[test]
    fn test_malformed_braces() {
        assert_eq!(
            parse_placeholders("a {b {c}}"),
            Err(PlaceholderError::UnexpectedOpen { offset: 5 })
        );
        assert_eq!(
            parse_placeholders("a } b"),
            Err(PlaceholderError::UnexpectedClose { offset: 2 })
        );
        assert_eq!(
            parse_placeholders("tail {open"),
            Err(PlaceholderError::Unterminated { offset: 5 })
        );
    }

    #[test]
    fn test_resolve_reference() {
        let ids = [None, Some("sprite".to_string())];
        let id_of = |i: usize| ids[i].clone();
        assert_eq!(resolve_reference("2", 2, id_of), Some(1));
        assert_eq!(resolve_reference("sprite", 2, id_of), Some(1));
        assert_eq!(resolve_reference("3", 2, id_of), None);
        assert_eq!(resolve_reference("stage", 2, id_of), None);
    }

    #[test]
    fn test_snapshot_of_segments() {
        let parts = parse_placeholders("Click {1}!").unwrap();
        insta::assert_debug_snapshot!(parts, @r#"
        [
            Text(
                "Click",
            ),
            Ref(
                "1",
            ),
            Text(
                "!",
            ),
        ]
        "#);
    }
}
