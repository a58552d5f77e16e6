use tracing::{debug, trace};

use crate::cursor::Cursor;
use crate::error::{LexicalError, SqrError};
use crate::symbols::Symbols;
use crate::token::Token;

/// The lexical class of a single character. Every character maps to exactly
/// one class; anything unmatched defaults to `Identifier`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Operator,
    Number,
    Quote,
    Structure,
    End,
    Accessor,
    TypeSigil,
    Whitespace,
    Comment,
    Identifier,
}

pub fn classify(c: char) -> CharClass {
    match c {
        '/' | '-' | '*' | '+' | '=' | '&' | '<' | '>' | '^' | '?' | '!' | '~' | '%' | '|' => {
            CharClass::Operator
        }
        '0'..='9' | '.' => CharClass::Number,
        '"' | '\'' => CharClass::Quote,
        '{' | '}' | '(' | ')' | '[' | ']' | ',' => CharClass::Structure,
        ';' => CharClass::End,
        ':' => CharClass::Accessor,
        '@' => CharClass::TypeSigil,
        '#' => CharClass::Comment,
        c if c.is_whitespace() => CharClass::Whitespace,
        _ => CharClass::Identifier,
    }
}

/// Character-level lexer: greedy maximal-munch runs per class, with the
/// exceptions described on [`read_raw`]. Whitespace and comments produce no
/// token.
pub struct Lexer<'s> {
    symbols: &'s Symbols,
}

impl<'s> Lexer<'s> {
    pub fn new(symbols: &'s Symbols) -> Self {
        Self { symbols }
    }

    pub fn resolve(&self, input: &mut Cursor<char>) -> Result<Vec<Token>, SqrError> {
        debug!("lexing {} characters", input.len());
        let mut result = Vec::new();
        let mut row: usize = 0;
        // Position of the last seen newline; col is measured from it.
        let mut line_start: usize = 0;

        while !input.done() {
            let pos = input.index();
            let Some(&current) = input.peek() else {
                break;
            };
            if current == '\n' {
                row += 1;
                line_start = pos;
            }
            let class = classify(current);
            let col = pos - line_start;
            let raw = self.read_raw(class, input, row, col)?;
            let end = input.index();
            if let Some(raw) = raw {
                result.push(Token::create(
                    raw,
                    class,
                    self.symbols,
                    row,
                    col,
                    pos,
                    end,
                )?);
            }
        }

        trace!(
            "{}",
            result
                .iter()
                .map(|t| format!("{:?}: '{}'", t.kind, t.raw))
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(result)
    }

    /// Accumulates one raw lexeme starting at the cursor. Returns `None`
    /// for discarded input (whitespace, comments).
    fn read_raw(
        &self,
        class: CharClass,
        input: &mut Cursor<char>,
        row: usize,
        col: usize,
    ) -> Result<Option<String>, SqrError> {
        match class {
            CharClass::Comment => {
                input.digest_until(&'\n');
                Ok(None)
            }
            CharClass::Whitespace => {
                input.digest()?;
                Ok(None)
            }
            CharClass::Quote => Ok(Some(self.read_string(input, row, col)?)),
            CharClass::TypeSigil => {
                let sigil = input.digest()?;
                let mut raw = String::from(sigil);
                raw.extend(self.read_identifier(input));
                Ok(Some(raw))
            }
            CharClass::Identifier => Ok(Some(self.read_identifier(input).into_iter().collect())),
            _ => {
                let mut raw = String::new();
                while let Some(&c) = input.peek() {
                    if classify(c) != class {
                        break;
                    }
                    raw.push(input.digest()?);
                    // Structural delimiters are always exactly one character.
                    if class == CharClass::Structure {
                        break;
                    }
                }
                Ok(Some(raw))
            }
        }
    }

    /// An identifier run also swallows digits, so `row2` is one token.
    fn read_identifier(&self, input: &mut Cursor<char>) -> Vec<char> {
        input.digest_while(|&c| classify(c) == CharClass::Identifier || c.is_ascii_digit())
    }

    /// Consumes until a matching unescaped closing quote; a backslash
    /// escapes the character that follows it. The quotes themselves are not
    /// part of the token's raw text.
    fn read_string(
        &self,
        input: &mut Cursor<char>,
        row: usize,
        col: usize,
    ) -> Result<String, SqrError> {
        let quote = input.digest()?;
        let mut buffer = String::new();

        while !input.done() {
            buffer.extend(input.digest_until(&quote));
            if buffer.ends_with('\\') {
                buffer.pop();
                match input.digest() {
                    Ok(escaped) => buffer.push(escaped),
                    Err(_) => break,
                }
            } else {
                break;
            }
        }

        if input.done() {
            return Err(LexicalError::UnterminatedString {
                content: buffer,
                row,
                col,
            }
            .into());
        }
        input.digest()?; // closing quote
        Ok(buffer)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::token::{TokenKind, TokenValue};

    fn lex(source: &str) -> Vec<Token> {
        let symbols = Symbols::new();
        let mut cursor = Cursor::new(source.chars().collect::<Vec<_>>());
        Lexer::new(&symbols).resolve(&mut cursor).unwrap()
    }

    fn lex_err(source: &str) -> SqrError {
        let symbols = Symbols::new();
        let mut cursor = Cursor::new(source.chars().collect::<Vec<_>>());
        Lexer::new(&symbols).resolve(&mut cursor).unwrap_err()
    }

    #[test]
    fn test_declaration_statement() {
        let tokens = lex("var x = 1;");
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Keyword,
                TokenKind::Identifier,
                TokenKind::Operator,
                TokenKind::Number,
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn test_comments_and_whitespace_are_discarded() {
        let tokens = lex("var x = 1; # the rest is noise\n");
        assert_eq!(tokens.len(), 5);
    }

    #[test]
    fn test_raw_concatenation_reproduces_residue() {
        let source = "var total = 4 + count * 2; # trailing";
        let residue: String = source
            .split('#')
            .next()
            .unwrap()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let joined: String = lex(source).iter().map(|t| t.raw.as_str()).collect();
        assert_eq!(joined, residue);
    }

    #[test]
    fn test_positions() {
        let tokens = lex("a\nbb cc");
        assert_eq!((tokens[0].row, tokens[0].col, tokens[0].pos), (0, 0, 0));
        // col counts from the newline character itself.
        assert_eq!((tokens[1].row, tokens[1].col, tokens[1].pos), (1, 1, 2));
        assert_eq!((tokens[2].row, tokens[2].col, tokens[2].pos), (1, 4, 5));
        assert_eq!(tokens[2].end, 7);
    }

    #[test]
    fn test_string_with_escape() {
        let tokens = lex(r#"var s = "he said \"hi\"";"#);
        assert_eq!(
            tokens[3].value,
            TokenValue::String("he said \"hi\"".to_string())
        );
    }

    #[test]
    fn test_single_quoted_string() {
        let tokens = lex("'abc'");
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].raw, "abc");
    }

    #[test]
    fn test_unterminated_string() {
        assert!(matches!(
            lex_err("\"never ends"),
            SqrError::Lexical(LexicalError::UnterminatedString { .. })
        ));
    }

    #[test]
    fn test_compound_operator_is_one_token() {
        let tokens = lex("a += 1;");
        assert_eq!(tokens[1].raw, "+=");
        assert!(tokens[1].operator().unwrap().is_mutator);
    }

    #[test]
    fn test_identifier_swallows_digits() {
        let tokens = lex("row2");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].raw, "row2");
    }

    #[test]
    fn test_type_sigil_token() {
        let tokens = lex("@Number n;");
        assert_eq!(tokens[0].kind, TokenKind::Type);
        assert_eq!(tokens[0].raw, "@Number");
    }

    #[test]
    fn test_structures_never_merge() {
        let tokens = lex("(()");
        assert_eq!(tokens.len(), 3);
    }
}
