//! Recursive-descent parser for the SRQL statement grammar.
//!
//! ```text
//! query      := (SHOW | FIND) entity where? order_by? limit? LATEST?
//!             | COUNT entity where?
//! where      := WHERE chain
//! chain      := condition (logical_op condition)*
//! condition  := '(' chain ')'
//!             | field ( cmp value
//!                   | LIKE value | CONTAINS string
//!                   | IN '(' value (',' value)* ')'
//!                   | BETWEEN value AND value
//!                   | IS NOT? NULL )
//! field      := ident | ident '(' ident (',' ident)* ')'
//! order_by   := ORDER BY field (ASC | DESC)? (',' field (ASC | DESC)?)*
//! limit      := LIMIT integer
//! ```

use crate::{
    ast::{
        Comparison, Condition, DateKeyword, Entity, LogicalOp, Operator, OrderClause,
        OrderDirection, Predicate, Query, QueryKind, Value,
    },
    error::{ParseError, SyntaxError},
    lexer::{tokenize, Keyword, Token, TokenKind},
};

const MAX_LIST_VALUES: usize = 200;
const MAX_GROUP_DEPTH: usize = 16;

pub fn parse(input: &str) -> Result<Query, ParseError> {
    let tokens = tokenize(input)?;
    Parser {
        tokens,
        index: 0,
        depth: 0,
    }
    .query()
}

struct Parser {
    tokens: Vec<Token>,
    index: usize,
    depth: usize,
}

impl Parser {
    fn query(&mut self) -> Result<Query, ParseError> {
        let kind = match self.peek_kind() {
            TokenKind::Keyword(Keyword::Show | Keyword::Find) => QueryKind::Show,
            TokenKind::Keyword(Keyword::Count) => QueryKind::Count,
            _ => return Err(self.unexpected("SHOW, FIND or COUNT").into()),
        };
        self.advance();

        let entity = self.entity()?;

        let mut conditions = Vec::new();
        if self.eat_keyword(Keyword::Where) {
            conditions = self.conditions()?;
        }

        let mut order_by = Vec::new();
        let mut limit = None;
        let mut latest = false;
        if kind == QueryKind::Show {
            if self.eat_keyword(Keyword::Order) {
                self.expect_keyword(Keyword::By)?;
                order_by = self.order_items()?;
            }
            if self.eat_keyword(Keyword::Limit) {
                limit = Some(self.limit()?);
            }
            latest = self.eat_keyword(Keyword::Latest);
        }

        if !matches!(self.peek_kind(), TokenKind::Eof) {
            let expected = match kind {
                QueryKind::Show => "WHERE, ORDER BY, LIMIT, LATEST or end of query",
                QueryKind::Count => "WHERE or end of query",
            };
            return Err(self.unexpected(expected).into());
        }

        Ok(Query {
            kind,
            entity,
            conditions,
            order_by,
            limit,
            latest,
            pagination: None,
        })
    }

    fn entity(&mut self) -> Result<Entity, ParseError> {
        let token = self.peek().clone();
        let name = match &token.kind {
            TokenKind::Ident(name) => name.clone(),
            _ => return Err(self.unexpected("entity name").into()),
        };
        self.advance();

        Entity::from_name(&name).ok_or(ParseError::UnknownEntity {
            name,
            position: token.position,
        })
    }

    fn conditions(&mut self) -> Result<Vec<Condition>, SyntaxError> {
        let mut conditions = vec![self.condition(LogicalOp::None)?];

        loop {
            let logical_op = match self.peek_kind() {
                TokenKind::Keyword(Keyword::And) => LogicalOp::And,
                TokenKind::Keyword(Keyword::Or) => LogicalOp::Or,
                _ => break,
            };
            self.advance();
            conditions.push(self.condition(logical_op)?);
        }

        Ok(conditions)
    }

    fn condition(&mut self, logical_op: LogicalOp) -> Result<Condition, SyntaxError> {
        if matches!(self.peek_kind(), TokenKind::LParen) {
            return self.group(logical_op);
        }

        let field = self.field()?;

        let (operator, value) = match self.peek_kind().clone() {
            TokenKind::Compare(op) => {
                self.advance();
                (op, self.value()?)
            }
            TokenKind::Keyword(Keyword::Like) => {
                self.advance();
                (Operator::Like, self.value()?)
            }
            TokenKind::Keyword(Keyword::Contains) => {
                self.advance();
                match self.peek_kind().clone() {
                    TokenKind::Str(text) => {
                        self.advance();
                        (Operator::Contains, Value::String(text))
                    }
                    _ => return Err(self.unexpected("string literal after CONTAINS")),
                }
            }
            TokenKind::Keyword(Keyword::In) => {
                self.advance();
                (Operator::In, Value::List(self.value_list()?))
            }
            TokenKind::Keyword(Keyword::Between) => {
                self.advance();
                let low = self.value()?;
                self.expect_keyword(Keyword::And)?;
                let high = self.value()?;
                (Operator::Between, Value::List(vec![low, high]))
            }
            TokenKind::Keyword(Keyword::Is) => {
                self.advance();
                let negated = self.eat_keyword(Keyword::Not);
                self.expect_keyword(Keyword::Null)?;
                let op = if negated {
                    Operator::IsNotNull
                } else {
                    Operator::IsNull
                };
                (op, Value::Null)
            }
            _ => return Err(self.unexpected("comparison operator")),
        };

        Ok(Condition {
            predicate: Predicate::Compare(Comparison {
                field,
                operator,
                value,
            }),
            logical_op,
        })
    }

    fn group(&mut self, logical_op: LogicalOp) -> Result<Condition, SyntaxError> {
        let open = self.peek().position;
        if self.depth == MAX_GROUP_DEPTH {
            return Err(SyntaxError::new(
                open,
                format!("condition groups nest at most {MAX_GROUP_DEPTH} deep"),
            ));
        }
        self.advance();

        self.depth += 1;
        let conditions = self.conditions()?;
        self.depth -= 1;

        if !matches!(self.peek_kind(), TokenKind::RParen) {
            return Err(self.unexpected("AND, OR or ')'"));
        }
        self.advance();

        Ok(Condition {
            predicate: Predicate::Group { conditions },
            logical_op,
        })
    }

    fn field(&mut self) -> Result<String, SyntaxError> {
        let name = match self.peek_kind() {
            TokenKind::Ident(name) => name.clone(),
            _ => return Err(self.unexpected("field name")),
        };
        self.advance();

        if !matches!(self.peek_kind(), TokenKind::LParen) {
            return Ok(name);
        }
        self.advance();

        let mut args = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::Ident(arg) => {
                    args.push(arg.clone());
                    self.advance();
                }
                _ => return Err(self.unexpected("function argument")),
            }

            match self.peek_kind() {
                TokenKind::Comma => self.advance(),
                TokenKind::RParen => {
                    self.advance();
                    break;
                }
                _ => return Err(self.unexpected("',' or ')'")),
            }
        }

        Ok(format!("{}({})", name.to_ascii_lowercase(), args.join(", ")))
    }

    fn value(&mut self) -> Result<Value, SyntaxError> {
        let value = match self.peek_kind() {
            TokenKind::Str(text) => Value::String(text.clone()),
            TokenKind::Int(number) => Value::Int(*number),
            TokenKind::Float(number) => Value::Float(*number),
            TokenKind::Keyword(Keyword::True) => Value::Bool(true),
            TokenKind::Keyword(Keyword::False) => Value::Bool(false),
            TokenKind::Keyword(Keyword::Today) => Value::Keyword(DateKeyword::Today),
            TokenKind::Keyword(Keyword::Yesterday) => Value::Keyword(DateKeyword::Yesterday),
            _ => return Err(self.unexpected("literal value")),
        };
        self.advance();
        Ok(value)
    }

    fn value_list(&mut self) -> Result<Vec<Value>, SyntaxError> {
        let open = self.peek().position;
        if !matches!(self.peek_kind(), TokenKind::LParen) {
            return Err(self.unexpected("'(' to open a value list"));
        }
        self.advance();

        let mut values = vec![self.value()?];
        loop {
            match self.peek_kind() {
                TokenKind::Comma => {
                    self.advance();
                    values.push(self.value()?);
                }
                TokenKind::RParen => {
                    self.advance();
                    break;
                }
                _ => return Err(self.unexpected("',' or ')'")),
            }
        }

        if values.len() > MAX_LIST_VALUES {
            return Err(SyntaxError::new(
                open,
                format!("value lists support at most {MAX_LIST_VALUES} values"),
            ));
        }
        Ok(values)
    }

    fn order_items(&mut self) -> Result<Vec<OrderClause>, SyntaxError> {
        let mut items = Vec::new();
        loop {
            let field = self.field()?;
            let direction = match self.peek_kind() {
                TokenKind::Keyword(Keyword::Desc) => {
                    self.advance();
                    OrderDirection::Desc
                }
                TokenKind::Keyword(Keyword::Asc) => {
                    self.advance();
                    OrderDirection::Asc
                }
                _ => OrderDirection::Asc,
            };
            items.push(OrderClause { field, direction });

            if !matches!(self.peek_kind(), TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        Ok(items)
    }

    fn limit(&mut self) -> Result<u64, SyntaxError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Int(number) if number >= 0 => {
                self.advance();
                Ok(number as u64)
            }
            TokenKind::Int(_) => Err(SyntaxError::new(
                token.position,
                "limit must be a non-negative integer",
            )),
            _ => Err(self.unexpected("integer after LIMIT")),
        }
    }

    fn peek(&self) -> &Token {
        // The lexer always terminates the stream with Eof, and advance never moves past it.
        &self.tokens[self.index.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn advance(&mut self) {
        if self.index + 1 < self.tokens.len() {
            self.index += 1;
        }
    }

    fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        if matches!(self.peek_kind(), TokenKind::Keyword(kw) if *kw == keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), SyntaxError> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(self.unexpected(keyword.as_str()))
        }
    }

    fn unexpected(&self, expected: &str) -> SyntaxError {
        let token = self.peek();
        SyntaxError::new(
            token.position,
            format!("expected {expected}, found {}", token.kind.describe()),
        )
    }
}
