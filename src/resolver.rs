//! Operator-precedence resolver. One call to [`Runtime::resolve_one`]
//! consumes exactly one statement's worth of tokens and yields an
//! [`Operation`]: a binary tree plus a control-flow tag. Trees grow by
//! rotation: a tighter-binding operator nests into the current right
//! operand, a looser one wraps the whole tree as its new left operand.

use tracing::trace;

use crate::cursor::Cursor;
use crate::error::{NameError, ParseError, SqrError};
use crate::runtime::qontext::QontextRef;
use crate::runtime::value::Value;
use crate::runtime::Runtime;
use crate::symbols::{KeywordKind, OperatorKind, StructureKind};
use crate::token::{Token, TokenKind, TokenValue};

pub(crate) mod declaration;
mod funqtion;
pub mod node;
mod qlass;
mod qollection;
pub mod qondition;
pub(crate) mod structure;

pub use node::{Flow, Node, Operand, Operation, Signal};
pub use qondition::Qondition;

impl Runtime {
    /// Resolves the next statement. A leading `return` keyword (or the bare
    /// assignment operator, which the language treats the same way) tags
    /// the operation Return; `break`/`continue` produce an empty-tree
    /// operation immediately, with an optional label.
    pub fn resolve_one(
        &self,
        tokens: &mut Cursor<Token>,
        qontext: &QontextRef,
    ) -> Result<Operation, SqrError> {
        let mut signal = Signal::None;
        if let Some(token) = tokens.peek() {
            let keyword = token.keyword().map(|k| k.kind);
            let operator = token.operator().map(|op| op.kind);
            if keyword == Some(KeywordKind::FunqtionReturn) || operator == Some(OperatorKind::Assign)
            {
                tokens.digest()?;
                signal = Signal::Return;
            } else if let Some(kind @ (KeywordKind::LoopBreak | KeywordKind::LoopContinue)) = keyword
            {
                tokens.digest()?;
                let target = tokens
                    .peek()
                    .filter(|t| t.kind == TokenKind::Identifier)
                    .map(|t| t.raw.clone());
                if target.is_some() {
                    tokens.digest()?;
                }
                if tokens.peek().is_some_and(|t| t.kind == TokenKind::End) {
                    tokens.digest()?;
                }
                let signal = match kind {
                    KeywordKind::LoopBreak => Signal::Break,
                    _ => Signal::Continue,
                };
                return Ok(Operation {
                    tree: Node::default(),
                    signal,
                    target,
                });
            }
        }

        let tree = self.build(tokens, qontext, Node::default(), 0)?;
        Ok(Operation {
            tree,
            signal,
            target: None,
        })
    }

    /// Exhausts the cursor into a statement sequence, for contexts that
    /// need a fully parsed block instead of the incremental loop.
    pub fn resolve_all(
        &self,
        tokens: &mut Cursor<Token>,
        qontext: &QontextRef,
    ) -> Result<Vec<Operation>, SqrError> {
        let mut operations = Vec::new();
        while !tokens.done() {
            operations.push(self.resolve_one(tokens, qontext)?);
        }
        Ok(operations)
    }

    /// Builds one tree, consuming tokens until a statement terminator or
    /// end of input. `level` is the rotation depth: terminators are only
    /// digested at level zero, where an empty tree also coerces to Void.
    pub(crate) fn build(
        &self,
        tokens: &mut Cursor<Token>,
        qontext: &QontextRef,
        mut node: Node,
        level: usize,
    ) -> Result<Node, SqrError> {
        // Position of the last operator deposited at this level, for the
        // incomplete-node diagnostic below.
        let mut op_at = None;
        loop {
            let Some(token) = tokens.peek().cloned() else {
                break;
            };
            if token.is_value() {
                tokens.digest()?;
                self.handle_value(&token, tokens, qontext, &mut node)?;
            } else {
                match token.kind {
                    TokenKind::Keyword | TokenKind::Type => {
                        tokens.digest()?;
                        let complete =
                            self.handle_keyword(&token, tokens, qontext, &mut node, level)?;
                        if complete {
                            break;
                        }
                    }
                    TokenKind::Operator => {
                        tokens.digest()?;
                        op_at = Some((token.row, token.col));
                        self.handle_operator(&token, tokens, qontext, &mut node, level)?;
                    }
                    TokenKind::Structure => {
                        self.handle_structure(&token, tokens, qontext, &mut node)?;
                    }
                    TokenKind::End => {
                        if level == 0 {
                            tokens.digest()?;
                        }
                        break;
                    }
                    _ => return Err(unexpected(&token)),
                }
            }
        }

        if let Some((row, col)) = op_at {
            if node.op.is_some() && (node.left.is_none() || node.right.is_none()) {
                return Err(ParseError::MissingOperand { row, col }.into());
            }
        }
        if level == 0 && node.is_empty() {
            node.left = Some(Operand::Value(Value::Void));
        }
        trace!("built node at level {}: {:?}", level, node);
        Ok(node)
    }

    /// Deposits a literal or identifier. A standalone operator seen before
    /// any left operand becomes a unary left modifier here; a value
    /// immediately followed by `(` gathers its call arguments eagerly.
    fn handle_value(
        &self,
        token: &Token,
        tokens: &mut Cursor<Token>,
        qontext: &QontextRef,
        node: &mut Node,
    ) -> Result<(), SqrError> {
        if node.left.is_none() && node.right.is_none() {
            if let Some(op) = node.op.take() {
                node.left_mod = Some(op);
            }
        }

        let operand = match &token.value {
            TokenValue::Boolean(b) => Operand::Value(Value::Boolean(*b)),
            TokenValue::Number(n) => Operand::Value(Value::Number(*n)),
            TokenValue::String(s) => Operand::Value(Value::String(s.clone())),
            _ if member_position(node) => Operand::Value(Value::String(token.raw.clone())),
            _ => {
                let variable =
                    qontext
                        .borrow()
                        .lookup(&token.raw)
                        .ok_or(NameError::Unresolved {
                            name: token.raw.clone(),
                            row: token.row,
                            col: token.col,
                        })?;
                Operand::Variable(variable)
            }
        };

        let called = tokens
            .peek()
            .is_some_and(|next| structure::opens(next, StructureKind::Group));
        let arguments = if called {
            Some(self.resolve_arguments(tokens, qontext)?)
        } else {
            None
        };
        self.deposit(node, operand, arguments, token)
    }

    fn deposit(
        &self,
        node: &mut Node,
        operand: Operand,
        arguments: Option<Vec<Value>>,
        token: &Token,
    ) -> Result<(), SqrError> {
        if node.left.is_none() {
            node.left = Some(operand);
            node.data = arguments;
            return Ok(());
        }
        if member_position(node) {
            node.right = Some(operand);
            node.data = arguments;
            return Ok(());
        }
        if let Some(arguments) = arguments {
            // A call anywhere else wraps into its own sub-node so the
            // attached arguments travel with their callee.
            let sub = Node {
                left: Some(operand),
                data: Some(arguments),
                ..Node::default()
            };
            return self.deposit_plain(node, Operand::Sub(Box::new(sub)), token);
        }
        self.deposit_plain(node, operand, token)
    }

    fn deposit_plain(
        &self,
        node: &mut Node,
        operand: Operand,
        token: &Token,
    ) -> Result<(), SqrError> {
        if node.left.is_none() {
            node.left = Some(operand);
            return Ok(());
        }
        if node.right.is_none() {
            node.right = Some(operand);
            if node.op.is_none() {
                return Err(ParseError::MissingOperator {
                    row: token.row,
                    col: token.col,
                }
                .into());
            }
            return Ok(());
        }
        Err(ParseError::UnexpectedValue {
            raw: token.raw.clone(),
            row: token.row,
            col: token.col,
        }
        .into())
    }

    /// Returns `true` when the statement is complete and the build loop
    /// should stop (a qondition fills the whole tree by itself).
    fn handle_keyword(
        &self,
        token: &Token,
        tokens: &mut Cursor<Token>,
        qontext: &QontextRef,
        node: &mut Node,
        level: usize,
    ) -> Result<bool, SqrError> {
        if member_position(node) {
            // In member position a type or keyword token is just a name.
            let name = match &token.value {
                TokenValue::Type(type_name) => type_name.clone(),
                _ => token.raw.clone(),
            };
            self.deposit(node, Operand::Value(Value::String(name)), None, token)?;
            return Ok(false);
        }

        let kind = match &token.value {
            TokenValue::Type(_) => KeywordKind::DeclareTyped,
            TokenValue::Keyword(keyword) => keyword.kind,
            _ => return Err(unexpected(token)),
        };

        match kind {
            KeywordKind::InstanceCreate => {
                let value = self.resolve_spawn(tokens, qontext)?;
                self.deposit(node, Operand::Value(value), None, token)?;
                return Ok(false);
            }
            KeywordKind::FunqtionInline => {
                let funqtion = self.resolve_funqtion(
                    None,
                    tokens,
                    qontext,
                    Some(std::rc::Rc::clone(qontext)),
                )?;
                let value = Value::Qallable(std::rc::Rc::new(
                    crate::runtime::funqtion::Qallable::Funqtion(funqtion),
                ));
                self.deposit(node, Operand::Value(value), None, token)?;
                return Ok(false);
            }
            KeywordKind::Import => {
                return Err(ParseError::ReservedKeyword {
                    symbol: token.raw.clone(),
                }
                .into())
            }
            _ => {}
        }

        // Everything below starts a statement of its own.
        if !node.is_empty() || level != 0 {
            return Err(ParseError::UnexpectedKeyword {
                raw: token.raw.clone(),
                row: token.row,
                col: token.col,
            }
            .into());
        }

        if kind.is_qondition() {
            let qondition = self.resolve_qondition(token, tokens)?;
            node.left = Some(Operand::Qondition(qondition));
            return Ok(true);
        }

        if kind == KeywordKind::Export {
            let inner = tokens.digest()?;
            let inner_kind = match &inner.value {
                TokenValue::Keyword(k) => k.kind,
                TokenValue::Type(_) => KeywordKind::DeclareTyped,
                _ => return Err(unexpected(&inner)),
            };
            let declaration = match inner_kind {
                KeywordKind::DeclareQlass => self.resolve_qlass(tokens, qontext)?,
                k if k.is_declaration() => self.resolve_declaration(&inner, tokens, qontext)?,
                _ => return Err(unexpected(&inner)),
            };
            qontext
                .borrow()
                .export(&declaration.name, declaration.variable.clone());
            node.left = Some(Operand::Variable(declaration.variable));
            return Ok(ends_with_block(inner_kind));
        }

        if kind == KeywordKind::DeclareQlass {
            let declaration = self.resolve_qlass(tokens, qontext)?;
            node.left = Some(Operand::Variable(declaration.variable));
            return Ok(true);
        }

        if kind.is_declaration() {
            let declaration = self.resolve_declaration(token, tokens, qontext)?;
            node.left = Some(Operand::Variable(declaration.variable));
            // A block-bodied declaration is a whole statement; no
            // terminator is required after its closing brace.
            return Ok(ends_with_block(kind));
        }

        Err(ParseError::UnexpectedKeyword {
            raw: token.raw.clone(),
            row: token.row,
            col: token.col,
        }
        .into())
    }

    /// `new Name(args)`: the type reference and arguments resolve now, and
    /// the instance spawns now.
    fn resolve_spawn(
        &self,
        tokens: &mut Cursor<Token>,
        qontext: &QontextRef,
    ) -> Result<Value, SqrError> {
        let name_token = tokens.digest()?;
        let type_name = match &name_token.value {
            TokenValue::Type(type_name) => type_name.clone(),
            _ if name_token.kind == TokenKind::Identifier => name_token.raw.clone(),
            _ => {
                return Err(ParseError::ExpectedIdentifier {
                    raw: name_token.raw.clone(),
                    row: name_token.row,
                    col: name_token.col,
                }
                .into())
            }
        };
        let qlass = self.types.resolve(&type_name)?;
        let called = tokens
            .peek()
            .is_some_and(|next| structure::opens(next, StructureKind::Group));
        let arguments = if called {
            self.resolve_arguments(tokens, qontext)?
        } else {
            Vec::new()
        };
        self.spawn(&qlass, arguments, qontext)
    }

    fn handle_operator(
        &self,
        token: &Token,
        tokens: &mut Cursor<Token>,
        qontext: &QontextRef,
        node: &mut Node,
        level: usize,
    ) -> Result<(), SqrError> {
        let op = token.operator().ok_or_else(|| unexpected(token))?;
        if matches!(op.kind, OperatorKind::Reference | OperatorKind::Optional) {
            return Err(ParseError::UnexpectedOperator {
                symbol: op.symbol.to_string(),
                row: token.row,
                col: token.col,
            }
            .into());
        }

        match (&node.left, node.op, &node.right) {
            (_, None, _) => {
                node.op = Some(op);
                Ok(())
            }
            (Some(_), Some(_), None) => {
                node.right_mod = Some(op);
                Ok(())
            }
            (Some(_), Some(current), Some(_)) => {
                if op.weight > current.weight {
                    // Binds tighter: descend into the right operand.
                    let sub = Node {
                        left: node.right.take(),
                        op: Some(op),
                        ..Node::default()
                    };
                    let built = self.build(tokens, qontext, sub, level + 1)?;
                    if built.right.is_none() {
                        return Err(ParseError::MissingOperand {
                            row: token.row,
                            col: token.col,
                        }
                        .into());
                    }
                    node.right = Some(Operand::Sub(Box::new(built)));
                } else {
                    // Binds looser (ties included): the whole tree rotates
                    // down-left under a new outer node.
                    let inner = std::mem::take(node);
                    let outer = Node {
                        left: Some(Operand::Sub(Box::new(inner))),
                        op: Some(op),
                        ..Node::default()
                    };
                    *node = self.build(tokens, qontext, outer, level + 1)?;
                    if node.op.is_some() && node.right.is_none() {
                        return Err(ParseError::MissingOperand {
                            row: token.row,
                            col: token.col,
                        }
                        .into());
                    }
                }
                Ok(())
            }
            _ => Err(ParseError::UnexpectedOperator {
                symbol: op.symbol.to_string(),
                row: token.row,
                col: token.col,
            }
            .into()),
        }
    }

    fn handle_structure(
        &self,
        token: &Token,
        tokens: &mut Cursor<Token>,
        qontext: &QontextRef,
        node: &mut Node,
    ) -> Result<(), SqrError> {
        if node.left.is_none() && node.right.is_none() {
            if let Some(op) = node.op.take() {
                node.left_mod = Some(op);
            }
        }
        let structure = token.structure().ok_or_else(|| unexpected(token))?;
        match structure.kind {
            StructureKind::Group => {
                let inner = structure::extract(tokens, StructureKind::Group)?;
                let mut cursor = Cursor::new(inner);
                let sub = self.build(&mut cursor, qontext, Node::default(), 1)?;
                self.deposit_plain(node, Operand::Sub(Box::new(sub)), token)
            }
            StructureKind::Qollection => {
                let value = self.resolve_qollection_literal(tokens, qontext)?;
                self.deposit_plain(node, Operand::Value(value), token)
            }
            StructureKind::Body => {
                let value = self.resolve_objeqt_literal(tokens, qontext)?;
                self.deposit_plain(node, Operand::Value(value), token)
            }
            StructureKind::Separator => Err(ParseError::UnexpectedStructure {
                raw: token.raw.clone(),
                row: token.row,
                col: token.col,
            }
            .into()),
        }
    }

    /// Builds and immediately evaluates a detached token range: literal
    /// elements, call arguments, parameter defaults.
    pub(crate) fn evaluate_tokens(
        &self,
        tokens: Vec<Token>,
        qontext: &QontextRef,
    ) -> Result<Value, SqrError> {
        let mut cursor = Cursor::new(tokens);
        let node = self.build(&mut cursor, qontext, Node::default(), 0)?;
        self.execute_node(&node, qontext)
    }
}

/// Whether the next value lands in the right slot of an accessor node,
/// where identifiers and keywords alike are literal member names.
fn member_position(node: &Node) -> bool {
    node.op.is_some_and(|op| op.kind == OperatorKind::Accessor)
        && node.left.is_some()
        && node.right.is_none()
}

fn ends_with_block(kind: KeywordKind) -> bool {
    matches!(
        kind,
        KeywordKind::DeclareFunqtion | KeywordKind::DeclareQlass
    )
}

fn unexpected(token: &Token) -> SqrError {
    ParseError::UnexpectedToken {
        raw: token.raw.clone(),
        row: token.row,
        col: token.col,
    }
    .into()
}
