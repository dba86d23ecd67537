//! SRQL tokenizer. Keywords are case-folded here; identifiers and literals keep their casing.

use crate::{
    ast::Operator,
    error::{Position, SyntaxError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Show,
    Find,
    Count,
    Where,
    Order,
    By,
    Limit,
    Latest,
    Asc,
    Desc,
    And,
    Or,
    In,
    Between,
    Contains,
    Is,
    Not,
    Null,
    Like,
    True,
    False,
    Today,
    Yesterday,
}

impl Keyword {
    fn lookup(word: &str) -> Option<Self> {
        let keyword = match word.to_ascii_lowercase().as_str() {
            "show" => Keyword::Show,
            "find" => Keyword::Find,
            "count" => Keyword::Count,
            "where" => Keyword::Where,
            "order" => Keyword::Order,
            "by" => Keyword::By,
            "limit" => Keyword::Limit,
            "latest" => Keyword::Latest,
            "asc" => Keyword::Asc,
            "desc" => Keyword::Desc,
            "and" => Keyword::And,
            "or" => Keyword::Or,
            "in" => Keyword::In,
            "between" => Keyword::Between,
            "contains" => Keyword::Contains,
            "is" => Keyword::Is,
            "not" => Keyword::Not,
            "null" => Keyword::Null,
            "like" => Keyword::Like,
            "true" => Keyword::True,
            "false" => Keyword::False,
            "today" => Keyword::Today,
            "yesterday" => Keyword::Yesterday,
            _ => return None,
        };
        Some(keyword)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Show => "SHOW",
            Keyword::Find => "FIND",
            Keyword::Count => "COUNT",
            Keyword::Where => "WHERE",
            Keyword::Order => "ORDER",
            Keyword::By => "BY",
            Keyword::Limit => "LIMIT",
            Keyword::Latest => "LATEST",
            Keyword::Asc => "ASC",
            Keyword::Desc => "DESC",
            Keyword::And => "AND",
            Keyword::Or => "OR",
            Keyword::In => "IN",
            Keyword::Between => "BETWEEN",
            Keyword::Contains => "CONTAINS",
            Keyword::Is => "IS",
            Keyword::Not => "NOT",
            Keyword::Null => "NULL",
            Keyword::Like => "LIKE",
            Keyword::True => "TRUE",
            Keyword::False => "FALSE",
            Keyword::Today => "TODAY",
            Keyword::Yesterday => "YESTERDAY",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Keyword(Keyword),
    Ident(String),
    Str(String),
    Int(i64),
    Float(f64),
    Compare(Operator),
    Comma,
    LParen,
    RParen,
    Eof,
}

impl TokenKind {
    /// Human-readable rendering for error messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Keyword(kw) => format!("keyword {}", kw.as_str()),
            TokenKind::Ident(name) => format!("'{name}'"),
            TokenKind::Str(value) => format!("string '{value}'"),
            TokenKind::Int(value) => format!("integer {value}"),
            TokenKind::Float(value) => format!("number {value}"),
            TokenKind::Compare(op) => format!("operator '{op}'"),
            TokenKind::Comma => "','".to_string(),
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::Eof => "end of input".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Position,
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, SyntaxError> {
    Lexer::new(input).run()
}

struct Lexer<'a> {
    input: &'a str,
    chars: Vec<(usize, char)>,
    index: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().collect(),
            index: 0,
            line: 1,
            column: 1,
        }
    }

    fn run(mut self) -> Result<Vec<Token>, SyntaxError> {
        let mut tokens = Vec::new();

        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.bump();
                continue;
            }

            let position = self.position();
            let kind = match ch {
                '\'' | '"' => self.string(ch)?,
                '(' => {
                    self.bump();
                    TokenKind::LParen
                }
                ')' => {
                    self.bump();
                    TokenKind::RParen
                }
                ',' => {
                    self.bump();
                    TokenKind::Comma
                }
                '=' | '!' | '<' | '>' => self.comparison()?,
                '-' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => self.number()?,
                c if c.is_ascii_digit() => self.number()?,
                c if c.is_alphabetic() || c == '_' => self.word(),
                other => {
                    return Err(SyntaxError::new(
                        position,
                        format!("unexpected character '{other}'"),
                    ))
                }
            };
            tokens.push(Token { kind, position });
        }

        tokens.push(Token {
            kind: TokenKind::Eof,
            position: self.position(),
        });
        Ok(tokens)
    }

    fn position(&self) -> Position {
        Position {
            offset: self
                .chars
                .get(self.index)
                .map(|(offset, _)| *offset)
                .unwrap_or(self.input.len()),
            line: self.line,
            column: self.column,
        }
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.index + ahead).map(|(_, ch)| *ch)
    }

    fn bump(&mut self) -> Option<char> {
        let (_, ch) = *self.chars.get(self.index)?;
        self.index += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn string(&mut self, quote: char) -> Result<TokenKind, SyntaxError> {
        let start = self.position();
        self.bump();
        let mut value = String::new();

        loop {
            match self.bump() {
                Some('\\') => match self.bump() {
                    Some(escaped) => value.push(escaped),
                    None => break,
                },
                Some(ch) if ch == quote => return Ok(TokenKind::Str(value)),
                Some(ch) => value.push(ch),
                None => break,
            }
        }

        Err(SyntaxError::new(start, "unterminated string literal"))
    }

    fn comparison(&mut self) -> Result<TokenKind, SyntaxError> {
        let position = self.position();
        let first = self.bump().unwrap_or_default();
        let second = self.peek();

        let (op, consumed_second) = match (first, second) {
            ('=', Some('=')) => (Operator::Eq, true),
            ('=', _) => (Operator::Eq, false),
            ('!', Some('=')) => (Operator::Ne, true),
            ('<', Some('>')) => (Operator::Ne, true),
            ('<', Some('=')) => (Operator::Le, true),
            ('<', _) => (Operator::Lt, false),
            ('>', Some('=')) => (Operator::Ge, true),
            ('>', _) => (Operator::Gt, false),
            _ => {
                return Err(SyntaxError::new(
                    position,
                    format!("unexpected character '{first}'"),
                ))
            }
        };

        if consumed_second {
            self.bump();
        }
        Ok(TokenKind::Compare(op))
    }

    fn number(&mut self) -> Result<TokenKind, SyntaxError> {
        let position = self.position();
        let mut text = String::new();
        if self.peek() == Some('-') {
            text.push('-');
            self.bump();
        }

        let mut dots = 0usize;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.bump();
            } else if ch == '.' && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
                dots += 1;
                text.push(ch);
                self.bump();
            } else {
                break;
            }
        }

        match dots {
            0 => text.parse::<i64>().map(TokenKind::Int).map_err(|_| {
                SyntaxError::new(position, format!("integer literal '{text}' is out of range"))
            }),
            1 => text.parse::<f64>().map(TokenKind::Float).map_err(|_| {
                SyntaxError::new(position, format!("invalid number literal '{text}'"))
            }),
            3 if !text.starts_with('-') => Ok(TokenKind::Str(text)),
            _ => Err(SyntaxError::new(
                position,
                format!("invalid number literal '{text}'"),
            )),
        }
    }

    fn word(&mut self) -> TokenKind {
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' || ch == '.' {
                text.push(ch);
                self.bump();
            } else {
                break;
            }
        }

        match Keyword::lookup(&text) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Ident(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn folds_keywords_and_keeps_identifier_case() {
        assert_eq!(
            kinds("Show Devices WHERE Ip"),
            vec![
                TokenKind::Keyword(Keyword::Show),
                TokenKind::Ident("Devices".into()),
                TokenKind::Keyword(Keyword::Where),
                TokenKind::Ident("Ip".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_literals() {
        assert_eq!(
            kinds("'00:1A:2B' 42 -7 88.2 \"it\\'s\""),
            vec![
                TokenKind::Str("00:1A:2B".into()),
                TokenKind::Int(42),
                TokenKind::Int(-7),
                TokenKind::Float(88.2),
                TokenKind::Str("it's".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn bare_dotted_quad_is_a_string() {
        assert_eq!(
            kinds("10.0.0.1"),
            vec![TokenKind::Str("10.0.0.1".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn lexes_comparison_operators() {
        assert_eq!(
            kinds("= == != <> < <= > >="),
            vec![
                TokenKind::Compare(Operator::Eq),
                TokenKind::Compare(Operator::Eq),
                TokenKind::Compare(Operator::Ne),
                TokenKind::Compare(Operator::Ne),
                TokenKind::Compare(Operator::Lt),
                TokenKind::Compare(Operator::Le),
                TokenKind::Compare(Operator::Gt),
                TokenKind::Compare(Operator::Ge),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn tracks_line_and_column() {
        let tokens = tokenize("show\n  devices").unwrap();
        assert_eq!(tokens[1].position.line, 2);
        assert_eq!(tokens[1].position.column, 3);
        assert_eq!(tokens[1].position.offset, 7);
    }

    #[test]
    fn rejects_unterminated_string() {
        let err = tokenize("show devices where ip = '10.0").unwrap_err();
        assert_eq!(err.position.column, 25);
        assert!(err.to_string().contains("syntax error"));
        assert!(err.to_string().contains("unterminated"));
    }

    #[test]
    fn rejects_stray_characters() {
        let err = tokenize("show devices; drop").unwrap_err();
        assert!(err.message.contains("';'"));
    }
}
