use crate::error::{LexicalError, SqrError};
use crate::lexer::CharClass;
use crate::symbols::{Keyword, Operator, Structure, Symbols};

/// One lexical token. `raw` is the accumulated lexeme, `value` the result of
/// the value-parsing step. Position fields are zero-based; `col` is measured
/// from the last newline, `pos`/`end` are absolute character offsets.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub raw: String,
    pub value: TokenValue,
    pub row: usize,
    pub col: usize,
    pub pos: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Operator,
    Boolean,
    Number,
    String,
    Structure,
    Keyword,
    Identifier,
    Type,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    None,
    Boolean(bool),
    Number(f64),
    String(String),
    Operator(Operator),
    Structure(Structure),
    Keyword(Keyword),
    /// A type reference; the name is resolved against the type registry and
    /// the qontext at parse time, not here.
    Type(String),
}

impl Token {
    /// Parses a raw lexeme under its lexical classification. Failing to
    /// convert is a fatal lexical error carrying the text and position.
    pub fn create(
        raw: String,
        class: CharClass,
        symbols: &Symbols,
        row: usize,
        col: usize,
        pos: usize,
        end: usize,
    ) -> Result<Self, SqrError> {
        let (kind, value) = Self::parse(&raw, class, symbols, row, col)?;
        Ok(Self {
            kind,
            raw,
            value,
            row,
            col,
            pos,
            end,
        })
    }

    fn parse(
        raw: &str,
        class: CharClass,
        symbols: &Symbols,
        row: usize,
        col: usize,
    ) -> Result<(TokenKind, TokenValue), SqrError> {
        match class {
            CharClass::Quote => Ok((TokenKind::String, TokenValue::String(raw.to_string()))),
            CharClass::Number => {
                let number: f64 = raw.parse().map_err(|_| LexicalError::MalformedLiteral {
                    raw: raw.to_string(),
                    class: "Number",
                    row,
                    col,
                })?;
                Ok((TokenKind::Number, TokenValue::Number(number)))
            }
            CharClass::Operator | CharClass::Accessor => {
                let operator =
                    symbols
                        .operators
                        .get(raw)
                        .ok_or_else(|| LexicalError::UnknownSymbol {
                            raw: raw.to_string(),
                            row,
                            col,
                        })?;
                Ok((TokenKind::Operator, TokenValue::Operator(operator)))
            }
            CharClass::Structure => {
                let structure =
                    symbols
                        .structures
                        .get(raw)
                        .ok_or_else(|| LexicalError::UnknownSymbol {
                            raw: raw.to_string(),
                            row,
                            col,
                        })?;
                Ok((TokenKind::Structure, TokenValue::Structure(structure)))
            }
            CharClass::End => Ok((TokenKind::End, TokenValue::None)),
            CharClass::TypeSigil => {
                let name = raw.trim_start_matches('@');
                if name.is_empty() {
                    return Err(LexicalError::MalformedLiteral {
                        raw: raw.to_string(),
                        class: "Type",
                        row,
                        col,
                    }
                    .into());
                }
                Ok((TokenKind::Type, TokenValue::Type(name.to_string())))
            }
            CharClass::Identifier => {
                if raw == "true" || raw == "false" {
                    return Ok((TokenKind::Boolean, TokenValue::Boolean(raw == "true")));
                }
                if let Some(keyword) = symbols.keywords.get(raw) {
                    return Ok((TokenKind::Keyword, TokenValue::Keyword(keyword)));
                }
                Ok((TokenKind::Identifier, TokenValue::None))
            }
            CharClass::Whitespace | CharClass::Comment => Err(LexicalError::MalformedLiteral {
                raw: raw.to_string(),
                class: "discarded",
                row,
                col,
            }
            .into()),
        }
    }

    /// True for tokens that deposit directly into an operation node:
    /// literals and identifiers.
    pub fn is_value(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Boolean | TokenKind::Number | TokenKind::String | TokenKind::Identifier
        )
    }

    pub fn operator(&self) -> Option<Operator> {
        match self.value {
            TokenValue::Operator(operator) => Some(operator),
            _ => None,
        }
    }

    pub fn keyword(&self) -> Option<Keyword> {
        match self.value {
            TokenValue::Keyword(keyword) => Some(keyword),
            _ => None,
        }
    }

    pub fn structure(&self) -> Option<Structure> {
        match self.value {
            TokenValue::Structure(structure) => Some(structure),
            _ => None,
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?} [ {} ] @{}:{}, p{}",
            self.kind, self.raw, self.row, self.col, self.pos
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn create(raw: &str, class: CharClass) -> Result<Token, SqrError> {
        let symbols = Symbols::new();
        Token::create(raw.to_string(), class, &symbols, 0, 0, 0, raw.len())
    }

    #[test]
    fn test_boolean_wins_over_identifier() {
        let token = create("true", CharClass::Identifier).unwrap();
        assert_eq!(token.kind, TokenKind::Boolean);
        assert_eq!(token.value, TokenValue::Boolean(true));
    }

    #[test]
    fn test_number_parse() {
        let token = create("13.25", CharClass::Number).unwrap();
        assert_eq!(token.value, TokenValue::Number(13.25));
    }

    #[test]
    fn test_malformed_number_is_fatal() {
        assert!(matches!(
            create("1.2.3", CharClass::Number),
            Err(SqrError::Lexical(LexicalError::MalformedLiteral { .. }))
        ));
    }

    #[test]
    fn test_keyword_resolution() {
        let token = create("funq", CharClass::Identifier).unwrap();
        assert_eq!(token.kind, TokenKind::Keyword);
    }

    #[test]
    fn test_type_sigil() {
        let token = create("@Number", CharClass::TypeSigil).unwrap();
        assert_eq!(token.kind, TokenKind::Type);
        assert_eq!(token.value, TokenValue::Type("Number".to_string()));
    }

    #[test]
    fn test_unknown_operator_is_fatal() {
        assert!(matches!(
            create("=-", CharClass::Operator),
            Err(SqrError::Lexical(LexicalError::UnknownSymbol { .. }))
        ));
    }
}
