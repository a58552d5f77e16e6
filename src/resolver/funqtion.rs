use crate::cursor::Cursor;
use crate::error::{ParseError, SqrError};
use crate::resolver::structure;
use crate::runtime::funqtion::{Body, Funqtion, Parameter};
use crate::runtime::qontext::QontextRef;
use crate::runtime::Runtime;
use crate::symbols::{OperatorKind, StructureKind};
use crate::token::{Token, TokenKind};

impl Runtime {
    /// Resolves `(params) [@Type] { body }` with the cursor on the opening
    /// parenthesis. `closure` is set by the inline-funqtion path only.
    pub(crate) fn resolve_funqtion(
        &self,
        name: Option<String>,
        tokens: &mut Cursor<Token>,
        qontext: &QontextRef,
        closure: Option<QontextRef>,
    ) -> Result<Funqtion, SqrError> {
        let header = structure::extract(tokens, StructureKind::Group)?;
        let parameters = self.resolve_parameters(header, qontext)?;

        let return_type = match tokens.peek() {
            Some(token) if token.kind == TokenKind::Type => {
                let token = tokens.digest()?;
                match &token.value {
                    crate::token::TokenValue::Type(type_name) => {
                        Some(self.types.resolve(type_name)?)
                    }
                    _ => None,
                }
            }
            _ => None,
        };

        let body = Body::new(structure::extract(tokens, StructureKind::Body)?);
        Ok(Funqtion {
            name,
            parameters,
            return_type,
            body,
            closure,
        })
    }

    /// One parameter is `[@Type] name [?] [= default]`. A default implies
    /// optional; only trailing parameters may be optional.
    fn resolve_parameters(
        &self,
        header: Vec<Token>,
        qontext: &QontextRef,
    ) -> Result<Vec<Parameter>, SqrError> {
        let mut parameters: Vec<Parameter> = Vec::new();
        for segment in structure::split_separated(header) {
            let mut entry = Cursor::new(segment);

            let declared_type = match entry.peek() {
                Some(token) if token.kind == TokenKind::Type => {
                    let token = entry.digest()?;
                    match &token.value {
                        crate::token::TokenValue::Type(type_name) => {
                            Some(self.types.resolve(type_name)?)
                        }
                        _ => None,
                    }
                }
                _ => None,
            };

            let name_token = entry.digest()?;
            if name_token.kind != TokenKind::Identifier {
                return Err(ParseError::ExpectedIdentifier {
                    raw: name_token.raw.clone(),
                    row: name_token.row,
                    col: name_token.col,
                }
                .into());
            }

            let mut optional = false;
            let mut default = None;
            while let Some(token) = entry.peek() {
                match token.operator().map(|op| op.kind) {
                    Some(OperatorKind::Optional) => {
                        entry.digest()?;
                        optional = true;
                    }
                    Some(OperatorKind::Assign) => {
                        entry.digest()?;
                        let rest = entry.digest_while(|_| true);
                        default = Some(self.evaluate_tokens(rest, qontext)?);
                        optional = true;
                    }
                    _ => {
                        return Err(ParseError::UnexpectedToken {
                            raw: token.raw.clone(),
                            row: token.row,
                            col: token.col,
                        }
                        .into())
                    }
                }
            }

            if !optional && parameters.iter().any(|p| p.optional) {
                return Err(ParseError::RequiredParameterAfterOptional {
                    name: name_token.raw.clone(),
                }
                .into());
            }
            parameters.push(Parameter {
                name: name_token.raw.clone(),
                declared_type,
                default,
                optional,
            });
        }
        Ok(parameters)
    }
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::lexer::Lexer;
    use crate::runtime::value::Value;
    use crate::symbols::Symbols;

    fn resolve(source: &str) -> Result<Funqtion, SqrError> {
        let symbols = Symbols::new();
        let mut chars = Cursor::new(source.chars().collect::<Vec<_>>());
        let mut tokens = Cursor::new(Lexer::new(&symbols).resolve(&mut chars).unwrap());
        let runtime = Runtime::new(Rc::new(RefCell::new(Vec::<u8>::new())));
        let root = Rc::clone(runtime.root());
        runtime.resolve_funqtion(None, &mut tokens, &root, None)
    }

    #[test]
    fn test_full_parameter_list() {
        let funqtion = resolve("(a, @Number b, c?, d = 1) @Number { }").unwrap();
        assert_eq!(funqtion.parameters.len(), 4);
        assert!(funqtion.parameters[0].declared_type.is_none());
        assert_eq!(
            funqtion.parameters[1].declared_type.as_ref().unwrap().name,
            "Number"
        );
        assert!(funqtion.parameters[2].optional);
        assert_eq!(funqtion.parameters[3].default, Some(Value::Number(1.0)));
        assert!(funqtion.parameters[3].optional);
        assert_eq!(funqtion.return_type.as_ref().unwrap().name, "Number");
    }

    #[test]
    fn test_required_after_optional_is_rejected() {
        assert!(matches!(
            resolve("(a?, b) { }"),
            Err(SqrError::Parse(
                ParseError::RequiredParameterAfterOptional { .. }
            ))
        ));
    }
}
