use super::{LexError, LexErrorKind, Location, Point, Token, TokenKind};

/// Split `input` into tokens, collecting every error instead of stopping at
/// the first one.
pub fn lex(input: &str) -> (Vec<Token>, Vec<LexError>) {
    let mut lexer = Lexer::new(input);
    lexer.run();
    tracing::trace!(
        tokens = lexer.tokens.len(),
        errors = lexer.errors.len(),
        "Lexed input"
    );
    (lexer.tokens, lexer.errors)
}

struct Lexer<'a> {
    input: &'a str,
    start_pos: usize,
    curr_pos: usize,
    start_pt: Point,
    curr_pt: Point,
    tokens: Vec<Token>,
    errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            start_pos: 0,
            curr_pos: 0,
            start_pt: Point::default(),
            curr_pt: Point::default(),
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn run(&mut self) {
        while let Some(c) = self.bump() {
            match c {
                c if is_whitespace(c) => {
                    self.eat_while(is_whitespace);
                    self.update_start();
                }
                ',' => self.accept(TokenKind::Separator),
                '{' => self.accept(TokenKind::LBrace),
                '}' => self.accept(TokenKind::RBrace),
                '?' => self.accept(TokenKind::Optional),
                '[' => self.lex_list(),
                '"' => self.lex_literal(),
                '/' if self.peek() == Some('/') => {
                    self.eat_while(|c| c != '\n');
                    self.update_start();
                }
                c if c.is_ascii_alphabetic() => self.lex_word(),
                other => {
                    self.error(LexErrorKind::UnexpectedChar(other));
                    self.update_start();
                }
            }
        }
        self.accept(TokenKind::Eof);
    }

    fn lex_list(&mut self) {
        match self.peek() {
            Some(']') => {
                self.bump();
                self.accept(TokenKind::List);
            }
            Some(other) => {
                self.error(LexErrorKind::UnclosedList(other));
                self.update_start();
            }
            None => {
                self.error(LexErrorKind::UnclosedListAtEof);
                self.update_start();
            }
        }
    }

    fn lex_literal(&mut self) {
        self.eat_while(|c| c != '"');
        let terminated = self.bump().is_some();
        let content_end = if terminated {
            self.curr_pos - 1
        } else {
            self.error(LexErrorKind::UnterminatedLiteral);
            self.curr_pos
        };
        let value = self.input[self.start_pos + 1..content_end].to_string();
        self.accept_with_value(TokenKind::Literal, value);
    }

    fn lex_word(&mut self) {
        self.eat_while(|c| c.is_ascii_alphanumeric());
        let word = &self.input[self.start_pos..self.curr_pos];
        match TokenKind::keyword(word) {
            Some(kind) => self.accept(kind),
            None => {
                let word = word.to_string();
                self.accept_with_value(TokenKind::Id, word);
            }
        }
    }

    fn accept(&mut self, kind: TokenKind) {
        self.accept_with_value(kind, String::new());
    }

    fn accept_with_value(&mut self, kind: TokenKind, value: String) {
        let loc = self.current_location();
        self.tokens.push(Token::new(kind, value, loc));
        self.update_start();
    }

    fn error(&mut self, kind: LexErrorKind) {
        let loc = self.current_location();
        self.errors.push(LexError { kind, loc });
    }

    fn current_location(&self) -> Location {
        Location {
            byte_start: self.start_pos,
            byte_end: self.curr_pos,
            start: self.start_pt,
            end: self.curr_pt,
        }
    }

    fn update_start(&mut self) {
        self.start_pos = self.curr_pos;
        self.start_pt = self.curr_pt;
    }

    fn peek(&self) -> Option<char> {
        self.input[self.curr_pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.curr_pos += c.len_utf8();
        if c == '\n' {
            self.curr_pt.row += 1;
            self.curr_pt.col = 0;
        } else {
            self.curr_pt.col += c.len_utf16() as u32;
        }
        Some(c)
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !pred(c) {
                return;
            }
            self.bump();
        }
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}
