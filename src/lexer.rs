// ABOUTME: Lexer — converts cleaned source text into a flat, typed token stream

use crate::error::InterpreterError;
use crate::value::ValueKind;

/// Reserved identifiers recognized only as whole words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Fun,
    Nfu,
    If,
    El,
    Fi,
    While,
    Ewhil,
    For,
    Rfo,
    Return,
    Continue,
}

impl Keyword {
    fn from_word(word: &str) -> Option<Keyword> {
        Some(match word {
            "fun" => Keyword::Fun,
            "nfu" => Keyword::Nfu,
            "if" => Keyword::If,
            "el" => Keyword::El,
            "fi" => Keyword::Fi,
            "while" => Keyword::While,
            "ewhil" => Keyword::Ewhil,
            "for" => Keyword::For,
            "rfo" => Keyword::Rfo,
            "return" => Keyword::Return,
            "continue" => Keyword::Continue,
            _ => return None,
        })
    }
}

fn type_name_from_word(word: &str) -> Option<ValueKind> {
    Some(match word {
        "number" => ValueKind::Number,
        "string" => ValueKind::String,
        "function" => ValueKind::Function,
        "object" => ValueKind::Object,
        "nil" => ValueKind::Nil,
        _ => return None,
    })
}

/// A lexical operator symbol. Whether it reads as unary or binary is
/// decided by the parser, not the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Lt,
    Le,
    Gt,
    Ge,
    EqEq,
    Ne,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Str(String),
    /// Includes the leading `$`.
    Variable(String),
    Keyword(Keyword),
    TypeName(ValueKind),
    Op(Op),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Assign,
    EmptyObject,
    Newline,
}

fn is_variable_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == ':' || c == '!'
}

fn is_word_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_word_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    tokens: Vec<Token>,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Lexer {
            chars: source.chars().collect(),
            pos: 0,
            tokens: Vec::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn push(&mut self, token: Token) {
        if token == Token::Newline && self.tokens.last() == Some(&Token::Newline) {
            return;
        }
        self.tokens.push(token);
    }

    fn run(mut self) -> Result<Vec<Token>, InterpreterError> {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' => {
                    self.advance();
                }
                '\n' => {
                    self.advance();
                    self.push(Token::Newline);
                }
                '"' => self.lex_string()?,
                '$' => self.lex_variable()?,
                '0'..='9' => self.lex_number(),
                '.' if self.peek_at(1).is_some_and(|n| n.is_ascii_digit()) => self.lex_number(),
                c if is_word_start(c) => self.lex_word()?,
                _ => self.lex_symbol()?,
            }
        }
        Ok(self.tokens)
    }

    fn lex_string(&mut self) -> Result<(), InterpreterError> {
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.advance() {
                None => return Err(InterpreterError::lex("unterminated string literal")),
                Some('"') => break,
                Some('\\') => match self.advance() {
                    Some('\\') => value.push('\\'),
                    Some('"') => value.push('"'),
                    Some('n') => value.push('\n'),
                    Some('x') => {
                        let hi = self
                            .advance()
                            .filter(|c| c.is_ascii_hexdigit())
                            .ok_or_else(|| InterpreterError::InvalidEscape("\\x".into()))?;
                        let lo = self
                            .advance()
                            .filter(|c| c.is_ascii_hexdigit())
                            .ok_or_else(|| {
                                InterpreterError::InvalidEscape(format!("\\x{hi}"))
                            })?;
                        let byte = u8::from_str_radix(&format!("{hi}{lo}"), 16)
                            .expect("validated hex digits");
                        value.push(byte as char);
                    }
                    Some(other) => {
                        return Err(InterpreterError::InvalidEscape(format!("\\{other}")))
                    }
                    None => return Err(InterpreterError::lex("unterminated string literal")),
                },
                Some(c) => value.push(c),
            }
        }
        self.push(Token::Str(value));
        Ok(())
    }

    fn lex_variable(&mut self) -> Result<(), InterpreterError> {
        let mut value = String::new();
        value.push(self.advance().expect("caller checked for '$'"));
        while let Some(c) = self.peek() {
            if is_variable_continue(c) {
                value.push(c);
                self.advance();
            } else {
                break;
            }
        }
        self.push(Token::Variable(value));
        Ok(())
    }

    fn lex_number(&mut self) {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|n| n.is_ascii_digit()) {
            text.push('.');
            self.advance();
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    text.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
        }
        let n: f64 = text.parse().expect("scanned only digits and at most one dot");
        self.push(Token::Number(n));
    }

    fn lex_word(&mut self) -> Result<(), InterpreterError> {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if is_word_continue(c) {
                word.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if let Some(kw) = Keyword::from_word(&word) {
            self.push(Token::Keyword(kw));
        } else if let Some(kind) = type_name_from_word(&word) {
            self.push(Token::TypeName(kind));
        } else {
            return Err(InterpreterError::lex(format!("unknown word '{word}'")));
        }
        Ok(())
    }

    fn lex_symbol(&mut self) -> Result<(), InterpreterError> {
        let two: Option<String> = self
            .peek()
            .zip(self.peek_at(1))
            .map(|(a, b)| [a, b].iter().collect());
        match two.as_deref() {
            Some("<=") => return self.consume_two(Token::Op(Op::Le)),
            Some(">=") => return self.consume_two(Token::Op(Op::Ge)),
            Some("==") => return self.consume_two(Token::Op(Op::EqEq)),
            Some("!=") => return self.consume_two(Token::Op(Op::Ne)),
            Some("{}") => return self.consume_two(Token::EmptyObject),
            _ => {}
        }

        let c = self.advance().expect("caller checked peek is Some");
        let token = match c {
            '+' => Token::Op(Op::Plus),
            '-' => Token::Op(Op::Minus),
            '*' => Token::Op(Op::Star),
            '/' => Token::Op(Op::Slash),
            '%' => Token::Op(Op::Percent),
            '!' => Token::Op(Op::Bang),
            '<' => Token::Op(Op::Lt),
            '>' => Token::Op(Op::Gt),
            '=' => Token::Assign,
            ',' => Token::Comma,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            other => return Err(InterpreterError::lex(format!("unexpected character '{other}'"))),
        };
        self.push(token);
        Ok(())
    }

    fn consume_two(&mut self, token: Token) -> Result<(), InterpreterError> {
        self.advance();
        self.advance();
        self.push(token);
        Ok(())
    }
}

/// Tokenizes already-cleaned source (see `source::clean`).
pub fn tokenize(source: &str) -> Result<Vec<Token>, InterpreterError> {
    Lexer::new(source).run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexes_numbers() {
        assert_eq!(tokenize("42").unwrap(), vec![Token::Number(42.0)]);
        assert_eq!(tokenize(".5").unwrap(), vec![Token::Number(0.5)]);
        assert_eq!(tokenize("3.14").unwrap(), vec![Token::Number(3.14)]);
    }

    #[test]
    fn lexes_strings_with_escapes() {
        assert_eq!(
            tokenize(r#""a\nb""#).unwrap(),
            vec![Token::Str("a\nb".into())]
        );
        assert_eq!(
            tokenize(r#""say \"hi\"""#).unwrap(),
            vec![Token::Str("say \"hi\"".into())]
        );
        assert_eq!(
            tokenize(r#""\x41""#).unwrap(),
            vec![Token::Str("A".into())]
        );
    }

    #[test]
    fn unterminated_string_is_lex_error() {
        assert!(tokenize(r#""abc"#).is_err());
    }

    #[test]
    fn bad_escape_is_invalid_escape_error() {
        assert!(matches!(
            tokenize(r#""\q""#),
            Err(InterpreterError::InvalidEscape(_))
        ));
    }

    #[test]
    fn lexes_variable_with_sigils_and_chaining() {
        assert_eq!(
            tokenize("$x").unwrap(),
            vec![Token::Variable("$x".into())]
        );
        assert_eq!(
            tokenize("$!x").unwrap(),
            vec![Token::Variable("$!x".into())]
        );
        assert_eq!(
            tokenize("$:a:b").unwrap(),
            vec![Token::Variable("$:a:b".into())]
        );
    }

    #[test]
    fn lexes_keywords_and_type_names_as_whole_words() {
        assert_eq!(tokenize("fun").unwrap(), vec![Token::Keyword(Keyword::Fun)]);
        assert_eq!(
            tokenize("number").unwrap(),
            vec![Token::TypeName(ValueKind::Number)]
        );
    }

    #[test]
    fn unknown_word_is_lex_error() {
        assert!(tokenize("frobnicate").is_err());
    }

    #[test]
    fn lexes_two_and_one_char_operators() {
        assert_eq!(
            tokenize("<= >= == != {}").unwrap(),
            vec![
                Token::Op(Op::Le),
                Token::Op(Op::Ge),
                Token::Op(Op::EqEq),
                Token::Op(Op::Ne),
                Token::EmptyObject,
            ]
        );
        assert_eq!(
            tokenize("+-*/%!<>=,()[]").unwrap(),
            vec![
                Token::Op(Op::Plus),
                Token::Op(Op::Minus),
                Token::Op(Op::Star),
                Token::Op(Op::Slash),
                Token::Op(Op::Percent),
                Token::Op(Op::Bang),
                Token::Op(Op::Lt),
                Token::Op(Op::Gt),
                Token::Assign,
                Token::Comma,
                Token::LParen,
                Token::RParen,
                Token::LBracket,
                Token::RBracket,
            ]
        );
    }

    #[test]
    fn collapses_adjacent_newlines() {
        assert_eq!(
            tokenize("1\n\n\n2").unwrap(),
            vec![Token::Number(1.0), Token::Newline, Token::Number(2.0)]
        );
    }

    #[test]
    fn unknown_character_is_lex_error() {
        assert!(tokenize("@").is_err());
    }
}
