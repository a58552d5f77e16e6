//! Balanced delimiter extraction over token streams. Every nested resolver
//! works on an inner token range produced here.

use crate::cursor::Cursor;
use crate::error::{ParseError, SqrError};
use crate::symbols::StructureKind;
use crate::token::{Token, TokenKind};

fn first_char(token: &Token) -> Option<char> {
    token.raw.chars().next()
}

/// Whether the token is the opening delimiter of `kind`.
pub fn opens(token: &Token, kind: StructureKind) -> bool {
    token
        .structure()
        .is_some_and(|s| s.kind == kind && first_char(token) == Some(s.open))
}

/// Digests an opening delimiter of `kind` and its balanced inner range,
/// returning the inner tokens without the delimiters themselves.
pub fn extract(tokens: &mut Cursor<Token>, kind: StructureKind) -> Result<Vec<Token>, SqrError> {
    let open_token = tokens.digest()?;
    let structure = open_token
        .structure()
        .filter(|s| s.kind == kind && first_char(&open_token) == Some(s.open))
        .ok_or_else(|| ParseError::UnexpectedStructure {
            raw: open_token.raw.clone(),
            row: open_token.row,
            col: open_token.col,
        })?;

    let mut inner = Vec::new();
    let mut depth = 1usize;
    while let Ok(token) = tokens.digest() {
        match first_char(&token) {
            Some(c) if c == structure.open => depth += 1,
            Some(c) if c == structure.close => {
                depth -= 1;
                if depth == 0 {
                    return Ok(inner);
                }
            }
            _ => {}
        }
        inner.push(token);
    }
    Err(ParseError::UnclosedStructure {
        open: structure.open,
        row: open_token.row,
        col: open_token.col,
    }
    .into())
}

fn split_where(tokens: Vec<Token>, at: impl Fn(&Token) -> bool) -> Vec<Vec<Token>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    let mut depth = 0usize;
    for token in tokens {
        if let Some(structure) = token.structure() {
            if structure.kind != StructureKind::Separator {
                if first_char(&token) == Some(structure.open) {
                    depth += 1;
                } else {
                    depth = depth.saturating_sub(1);
                }
            }
        }
        if depth == 0 && at(&token) {
            segments.push(std::mem::take(&mut current));
            continue;
        }
        current.push(token);
    }
    if !current.is_empty() || !segments.is_empty() {
        segments.push(current);
    }
    segments
}

/// Splits an extracted range on top-level separators. An empty range yields
/// no segments at all.
pub fn split_separated(tokens: Vec<Token>) -> Vec<Vec<Token>> {
    if tokens.is_empty() {
        return Vec::new();
    }
    split_where(tokens, |token| {
        token
            .structure()
            .is_some_and(|s| s.kind == StructureKind::Separator)
    })
}

/// Splits an extracted range on top-level statement terminators, for the
/// three segments of a `for` header.
pub fn split_statements(tokens: Vec<Token>) -> Vec<Vec<Token>> {
    split_where(tokens, |token| token.kind == TokenKind::End)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lexer::Lexer;
    use crate::symbols::Symbols;

    fn tokens(source: &str) -> Cursor<Token> {
        let symbols = Symbols::new();
        let mut chars = Cursor::new(source.chars().collect::<Vec<_>>());
        Cursor::new(Lexer::new(&symbols).resolve(&mut chars).unwrap())
    }

    #[test]
    fn test_extract_handles_nesting() {
        let mut cursor = tokens("(a + (b * c)) rest");
        let inner = extract(&mut cursor, StructureKind::Group).unwrap();
        let joined: String = inner.iter().map(|t| t.raw.as_str()).collect();
        assert_eq!(joined, "a+(b*c)");
        assert_eq!(cursor.peek().unwrap().raw, "rest");
    }

    #[test]
    fn test_extract_unclosed() {
        let mut cursor = tokens("(a + b");
        assert!(matches!(
            extract(&mut cursor, StructureKind::Group),
            Err(SqrError::Parse(ParseError::UnclosedStructure { .. }))
        ));
    }

    #[test]
    fn test_extract_wrong_delimiter() {
        let mut cursor = tokens("[1, 2]");
        assert!(matches!(
            extract(&mut cursor, StructureKind::Group),
            Err(SqrError::Parse(ParseError::UnexpectedStructure { .. }))
        ));
    }

    #[test]
    fn test_split_separated_respects_nesting() {
        let mut cursor = tokens("[1, [2, 3], f(4, 5)]");
        let inner = extract(&mut cursor, StructureKind::Qollection).unwrap();
        let segments = split_separated(inner);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0][0].raw, "1");
        assert_eq!(segments[1].len(), 5);
    }

    #[test]
    fn test_split_separated_empty_range() {
        let mut cursor = tokens("()");
        let inner = extract(&mut cursor, StructureKind::Group).unwrap();
        assert!(split_separated(inner).is_empty());
    }

    #[test]
    fn test_split_statements() {
        let mut cursor = tokens("(var i = 0; i < 3; i += 1)");
        let inner = extract(&mut cursor, StructureKind::Group).unwrap();
        let segments = split_statements(inner);
        assert_eq!(segments.len(), 3);
    }
}
