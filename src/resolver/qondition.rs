use crate::cursor::Cursor;
use crate::error::{ParseError, SqrError};
use crate::resolver::structure;
use crate::runtime::funqtion::Body;
use crate::runtime::Runtime;
use crate::symbols::{KeywordKind, StructureKind};
use crate::token::{Token, TokenKind};

/// A branch or loop, resolved down to its unresolved token bodies. The
/// executor re-resolves condition and body tokens on every pass, which is
/// what lets a loop see the effects of its own statements.
#[derive(Debug, Clone)]
pub enum Qondition {
    If {
        /// `(condition, body)` pairs in source order: the `if` arm first,
        /// then every `else if` arm.
        branches: Vec<(Body, Body)>,
        fallback: Option<Body>,
    },
    While {
        label: Option<String>,
        condition: Body,
        body: Body,
    },
    DoWhile {
        label: Option<String>,
        condition: Body,
        body: Body,
    },
    For {
        label: Option<String>,
        init: Body,
        condition: Body,
        step: Body,
        body: Body,
    },
}

impl Runtime {
    /// `keyword` is the already digested qondition keyword token.
    pub(crate) fn resolve_qondition(
        &self,
        keyword: &Token,
        tokens: &mut Cursor<Token>,
    ) -> Result<Qondition, SqrError> {
        let kind = keyword
            .keyword()
            .map(|k| k.kind)
            .ok_or_else(|| unexpected(keyword))?;
        match kind {
            KeywordKind::QonditionIf => self.resolve_if(tokens),
            KeywordKind::LoopWhile => {
                let label = take_label(tokens);
                let condition = Body::new(structure::extract(tokens, StructureKind::Group)?);
                let body = Body::new(structure::extract(tokens, StructureKind::Body)?);
                Ok(Qondition::While {
                    label,
                    condition,
                    body,
                })
            }
            KeywordKind::LoopDo => {
                let label = take_label(tokens);
                let body = Body::new(structure::extract(tokens, StructureKind::Body)?);
                let trailer = tokens.digest()?;
                if trailer.keyword().map(|k| k.kind) != Some(KeywordKind::LoopWhile) {
                    return Err(unexpected(&trailer));
                }
                let condition = Body::new(structure::extract(tokens, StructureKind::Group)?);
                Ok(Qondition::DoWhile {
                    label,
                    condition,
                    body,
                })
            }
            KeywordKind::LoopFor => {
                let label = take_label(tokens);
                let header = structure::extract(tokens, StructureKind::Group)?;
                let mut segments = structure::split_statements(header);
                if segments.len() != 3 {
                    return Err(ParseError::MalformedForHeader {
                        row: keyword.row,
                        col: keyword.col,
                    }
                    .into());
                }
                let step = Body::new(segments.pop().unwrap_or_default());
                let condition = Body::new(segments.pop().unwrap_or_default());
                let init = Body::new(segments.pop().unwrap_or_default());
                let body = Body::new(structure::extract(tokens, StructureKind::Body)?);
                Ok(Qondition::For {
                    label,
                    init,
                    condition,
                    step,
                    body,
                })
            }
            _ => Err(unexpected(keyword)),
        }
    }

    fn resolve_if(&self, tokens: &mut Cursor<Token>) -> Result<Qondition, SqrError> {
        let mut branches = Vec::new();
        let mut fallback = None;
        loop {
            let condition = Body::new(structure::extract(tokens, StructureKind::Group)?);
            let body = Body::new(structure::extract(tokens, StructureKind::Body)?);
            branches.push((condition, body));

            let chains = tokens
                .peek()
                .and_then(Token::keyword)
                .is_some_and(|k| k.kind == KeywordKind::QonditionElse);
            if !chains {
                break;
            }
            tokens.digest()?; // else
            let continues = tokens
                .peek()
                .and_then(Token::keyword)
                .is_some_and(|k| k.kind == KeywordKind::QonditionIf);
            if continues {
                tokens.digest()?; // if
                continue;
            }
            fallback = Some(Body::new(structure::extract(tokens, StructureKind::Body)?));
            break;
        }
        Ok(Qondition::If { branches, fallback })
    }
}

/// A loop label is a bare identifier between the loop keyword and its
/// condition group.
fn take_label(tokens: &mut Cursor<Token>) -> Option<String> {
    let label = tokens
        .peek()
        .filter(|token| token.kind == TokenKind::Identifier)
        .map(|token| token.raw.clone())?;
    let _ = tokens.digest();
    Some(label)
}

fn unexpected(token: &Token) -> SqrError {
    ParseError::UnexpectedKeyword {
        raw: token.raw.clone(),
        row: token.row,
        col: token.col,
    }
    .into()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lexer::Lexer;
    use crate::symbols::Symbols;

    fn qondition(source: &str) -> Qondition {
        let symbols = Symbols::new();
        let mut chars = Cursor::new(source.chars().collect::<Vec<_>>());
        let mut tokens = Cursor::new(Lexer::new(&symbols).resolve(&mut chars).unwrap());
        let keyword = tokens.digest().unwrap();
        let runtime = crate::runtime::Runtime::new(std::rc::Rc::new(std::cell::RefCell::new(
            Vec::<u8>::new(),
        )));
        runtime.resolve_qondition(&keyword, &mut tokens).unwrap()
    }

    #[test]
    fn test_if_else_chain() {
        let resolved = qondition("if (a) { 1; } else if (b) { 2; } else { 3; }");
        match resolved {
            Qondition::If { branches, fallback } => {
                assert_eq!(branches.len(), 2);
                assert!(fallback.is_some());
            }
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_labeled_while() {
        let resolved = qondition("while outer (a < 3) { a += 1; }");
        match resolved {
            Qondition::While { label, .. } => assert_eq!(label.as_deref(), Some("outer")),
            other => panic!("expected while, got {:?}", other),
        }
    }

    #[test]
    fn test_for_header_segments() {
        let resolved = qondition("for (var i = 0; i < 3; i += 1) { }");
        match resolved {
            Qondition::For {
                init, condition, ..
            } => {
                assert!(!init.is_empty());
                assert!(!condition.is_empty());
            }
            other => panic!("expected for, got {:?}", other),
        }
    }

    #[test]
    fn test_do_while_shape() {
        let resolved = qondition("do { a += 1; } while (a < 3)");
        assert!(matches!(resolved, Qondition::DoWhile { .. }));
    }
}
