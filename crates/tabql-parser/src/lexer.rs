// TabQL lexer.
//
// Turns query text into a stream of tokens with byte spans. The scanner has
// two modes: query mode, where words resolve against the query keywords and
// multi-word phrases, and schema context, where words resolve against the
// schema-definition keywords and bracket accesses are split into separate
// tokens for the schema grammar.

use std::collections::VecDeque;

use memchr::{memchr, memchr2, memchr3, memmem};
use tabql_ast::TextSpan;
use tabql_error::{Diagnostic, DiagnosticCode, Result, TabqlError};

use crate::classifier::{CharClass, classify, classify_byte, is_ident_continue};
use crate::keywords::{is_keyword, match_phrase, multi_word_candidates};
use crate::metrics;
use crate::options::LexerOptions;
use crate::token::{KeyAccessKey, Token, TokenKind};
use crate::token_factory::{self, LexemeKind};

/// Number of resolved tokens kept for error context.
const HISTORY_LEN: usize = 5;

/// Integer suffixes, longest first.
const INTEGER_SUFFIXES: [&str; 8] = ["ub", "us", "ui", "ul", "b", "s", "i", "l"];

/// Query lexer with one token of state.
pub struct Lexer<'a> {
    input: &'a str,
    /// Current byte offset.
    pos: usize,
    /// Exclusive end of the scanned range.
    end: usize,
    current: Token,
    /// Kind of the last significant (non-trivia) token.
    last_kind: Option<TokenKind>,
    /// Tokens queued by a schema-context split, replayed FIFO.
    pending: VecDeque<Token>,
    schema_context: bool,
    history: VecDeque<TextSpan>,
    diagnostics: Vec<Diagnostic>,
    options: LexerOptions,
    tokens_resolved: u64,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over the whole of `input`.
    ///
    /// # Errors
    ///
    /// [`TabqlError::Configuration`] when `input` is empty or only
    /// whitespace.
    pub fn new(input: &'a str, options: LexerOptions) -> Result<Self> {
        if input.trim().is_empty() {
            return Err(TabqlError::configuration("query text is empty"));
        }
        Ok(Self::with_range(input, 0, input.len(), options))
    }

    /// Create a lexer over `input[start..end]`. Spans stay absolute, so
    /// tokens from the sub-lexer line up with the enclosing query.
    ///
    /// # Errors
    ///
    /// [`TabqlError::InvalidArgument`] when the range is out of bounds or
    /// splits a character.
    pub fn over_range(
        input: &'a str,
        start: usize,
        end: usize,
        options: LexerOptions,
    ) -> Result<Self> {
        if start > end || end > input.len() {
            return Err(TabqlError::invalid_argument(format!(
                "range {start}..{end} outside input of length {}",
                input.len()
            )));
        }
        if !input.is_char_boundary(start) || !input.is_char_boundary(end) {
            return Err(TabqlError::invalid_argument(format!(
                "range {start}..{end} splits a character"
            )));
        }
        Ok(Self::with_range(input, start, end, options))
    }

    fn with_range(input: &'a str, start: usize, end: usize, options: LexerOptions) -> Self {
        Self {
            input,
            pos: start,
            end,
            current: Token::eof(start),
            last_kind: None,
            pending: VecDeque::new(),
            schema_context: false,
            history: VecDeque::with_capacity(HISTORY_LEN),
            diagnostics: Vec::new(),
            options,
            tokens_resolved: 0,
        }
    }

    /// The most recently returned token.
    #[must_use]
    pub const fn current(&self) -> &Token {
        &self.current
    }

    /// Byte offset the next scan starts from.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    #[must_use]
    pub const fn input(&self) -> &'a str {
        self.input
    }

    /// Tokens returned so far, queued and trivia tokens included.
    #[must_use]
    pub const fn tokens_resolved(&self) -> u64 {
        self.tokens_resolved
    }

    /// Lexical diagnostics recorded in recovery mode.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    #[must_use]
    pub const fn is_schema_context(&self) -> bool {
        self.schema_context
    }

    /// Switch between query mode and schema context. Takes effect for the
    /// next scanned word.
    pub fn set_schema_context(&mut self, on: bool) {
        if self.schema_context != on {
            tracing::debug!(
                target: "tabql.parse",
                schema_context = on,
                position = self.pos,
                "lexer mode switch"
            );
        }
        self.schema_context = on;
    }

    /// Source text from the first to the last of the recently resolved
    /// tokens. Used as context in syntax errors.
    #[must_use]
    pub fn already_resolved_query_part(&self) -> String {
        match (self.history.front(), self.history.back()) {
            (Some(first), Some(last)) => self
                .input
                .get(first.start..last.end())
                .unwrap_or("")
                .to_owned(),
            _ => String::new(),
        }
    }

    /// Produce the next token. Returns [`TokenKind::Eof`] repeatedly once
    /// the range is exhausted.
    ///
    /// # Errors
    ///
    /// [`TabqlError::Lexical`] on an unknown character or an unterminated
    /// string, unless recovery is enabled.
    pub fn next_token(&mut self) -> Result<Token> {
        if let Some(queued) = self.pending.pop_front() {
            return Ok(self.settle(queued));
        }
        loop {
            let token = self.scan()?;
            match token.kind {
                TokenKind::Comment => continue,
                TokenKind::WhiteSpace if self.options.skip_whitespace => continue,
                TokenKind::ArrayIndex { .. } | TokenKind::KeyAccess { .. }
                    if self.schema_context =>
                {
                    let base = self.split_bracket_access(token)?;
                    metrics::record_token();
                    return Ok(self.settle(base));
                }
                _ => {
                    metrics::record_token();
                    return Ok(self.settle(token));
                }
            }
        }
    }

    /// Scan a custom lexeme. Skips leading whitespace, then asks `matcher`
    /// for the byte length of the lexeme at the cursor and hands the lexeme
    /// to `builder`. Leaves the lexer untouched when nothing matches.
    pub fn next_of<M, B>(&mut self, matcher: M, builder: B) -> Option<Token>
    where
        M: FnOnce(&str) -> Option<usize>,
        B: FnOnce(&str, TextSpan) -> Token,
    {
        if !self.pending.is_empty() {
            return None;
        }
        let mut start = self.pos;
        while let Some(c) = self.char_at(start) {
            if classify(c) != CharClass::Whitespace {
                break;
            }
            start += c.len_utf8();
        }
        let rest = &self.input[start..self.end];
        let len = matcher(rest)?;
        if len == 0 || len > rest.len() || !rest.is_char_boundary(len) {
            return None;
        }
        self.pos = start + len;
        let token = builder(&rest[..len], TextSpan::new(start, len));
        metrics::record_token();
        Some(self.settle(token))
    }

    /// Record `token` as the current one and update the context window.
    fn settle(&mut self, token: Token) -> Token {
        if !token.kind.is_trivia() && token.kind != TokenKind::Eof {
            if self.history.len() == HISTORY_LEN {
                self.history.pop_front();
            }
            self.history.push_back(token.span);
        }
        if !token.kind.is_trivia() {
            self.last_kind = Some(token.kind.clone());
        }
        self.tokens_resolved += 1;
        self.current = token.clone();
        token
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    fn scan(&mut self) -> Result<Token> {
        let start = self.pos;
        let Some(b) = self.byte_at(start) else {
            return Ok(Token::eof(self.end));
        };
        let class = if b < 0x80 {
            classify_byte(b)
        } else {
            self.char_at(start).map_or(CharClass::Unknown, classify)
        };
        match class {
            CharClass::Whitespace => Ok(self.scan_whitespace(start)),
            CharClass::IdentStart => Ok(self.scan_word(start)),
            CharClass::Digit => Ok(self.scan_number(start)),
            CharClass::Quote => self.scan_string(start),
            CharClass::Single => {
                self.pos = start + 1;
                Ok(self.emit(LexemeKind::Symbol, start))
            }
            CharClass::Ambiguous => self.scan_ambiguous(start),
            CharClass::Hash => self.scan_hash(start),
            CharClass::Dash => Ok(self.scan_dash(start)),
            CharClass::Slash => Ok(self.scan_slash(start)),
            CharClass::Dot => Ok(self.scan_dot(start)),
            CharClass::Bracket => Ok(self.scan_bracket(start)),
            CharClass::Colon => Ok(self.scan_colon(start)),
            CharClass::Unknown => self.unknown_character(start),
        }
    }

    fn emit(&self, kind: LexemeKind, start: usize) -> Token {
        token_factory::build(
            kind,
            &self.input[start..self.pos],
            TextSpan::from_bounds(start, self.pos),
        )
    }

    // -----------------------------------------------------------------------
    // Cursor helpers
    // -----------------------------------------------------------------------

    fn byte_at(&self, i: usize) -> Option<u8> {
        if i < self.end {
            self.input.as_bytes().get(i).copied()
        } else {
            None
        }
    }

    fn char_at(&self, i: usize) -> Option<char> {
        self.input.get(i..self.end)?.chars().next()
    }

    fn is_digit_at(&self, i: usize) -> bool {
        self.byte_at(i).is_some_and(|b| b.is_ascii_digit())
    }

    fn is_ident_continue_at(&self, i: usize) -> bool {
        self.char_at(i).is_some_and(is_ident_continue)
    }

    /// End offset of the identifier starting at `start`.
    fn word_end(&self, start: usize) -> usize {
        let mut i = start;
        while let Some(c) = self.char_at(i) {
            if !is_ident_continue(c) {
                break;
            }
            i += c.len_utf8();
        }
        i
    }

    /// Whether the last significant token can end an operand, in which case
    /// `-` and `.` are operators rather than part of a number.
    fn after_operand(&self) -> bool {
        self.last_kind.as_ref().is_some_and(TokenKind::ends_operand)
    }

    fn after_dot(&self) -> bool {
        matches!(self.last_kind, Some(TokenKind::Dot))
    }

    // -----------------------------------------------------------------------
    // Scan routines
    // -----------------------------------------------------------------------

    fn scan_whitespace(&mut self, start: usize) -> Token {
        let mut i = start;
        while let Some(c) = self.char_at(i) {
            if classify(c) != CharClass::Whitespace {
                break;
            }
            i += c.len_utf8();
        }
        self.pos = i;
        self.emit(LexemeKind::WhiteSpace, start)
    }

    fn scan_word(&mut self, start: usize) -> Token {
        let after_dot = self.after_dot();
        if !after_dot && !self.schema_context {
            let rest = &self.input[start..self.end];
            let first = self.input.as_bytes()[start];
            for phrase in multi_word_candidates(first) {
                if let Some(len) = match_phrase(rest, phrase) {
                    self.pos = start + len;
                    return self.emit(LexemeKind::Phrase, start);
                }
            }
        }

        let word_end = self.word_end(start);
        self.pos = word_end;

        if after_dot {
            if self.byte_at(word_end) == Some(b'(') {
                return self.emit(LexemeKind::Function, start);
            }
            if self.byte_at(word_end) == Some(b'[') {
                if let Some(kind) = self.bracket_access(word_end) {
                    return self.emit(kind, start);
                }
            }
            return self.emit(LexemeKind::Property, start);
        }

        let keyword = !self.schema_context && is_keyword(&self.input[start..word_end]);
        if !keyword {
            if let Some(kind) = self.compound_word(word_end) {
                return self.emit(kind, start);
            }
        }

        if self.schema_context {
            self.emit(LexemeKind::SchemaWord, start)
        } else {
            self.emit(LexemeKind::Word, start)
        }
    }

    /// Compound forms glued to a word ending at `word_end`: `name(`,
    /// `alias.method(`, `alias.*`, `name[...]`. Advances the cursor on a
    /// match.
    fn compound_word(&mut self, word_end: usize) -> Option<LexemeKind> {
        match self.byte_at(word_end)? {
            b'(' => Some(LexemeKind::Function),
            b'.' => {
                if self.byte_at(word_end + 1) == Some(b'*') {
                    self.pos = word_end + 2;
                    return Some(LexemeKind::AliasedStar);
                }
                let next = self.char_at(word_end + 1)?;
                if classify(next) != CharClass::IdentStart {
                    return None;
                }
                let method_end = self.word_end(word_end + 1);
                if self.byte_at(method_end) == Some(b'(') {
                    self.pos = method_end;
                    Some(LexemeKind::MethodAccess)
                } else {
                    None
                }
            }
            b'[' => self.bracket_access(word_end),
            _ => None,
        }
    }

    /// `[...]` at `open`: all digits is an array index, anything else a key.
    fn bracket_access(&mut self, open: usize) -> Option<LexemeKind> {
        let close = self.matching_bracket(open)?;
        let inner = &self.input[open + 1..close];
        if inner.trim().is_empty() {
            return None;
        }
        let kind = if inner.bytes().all(|b| b.is_ascii_digit()) && inner.parse::<i64>().is_ok() {
            LexemeKind::ArrayIndex
        } else {
            LexemeKind::KeyAccess
        };
        self.pos = close + 1;
        Some(kind)
    }

    /// Offset of the `]` closing the `[` at `open`. Nested brackets and
    /// string literals (with backslash escapes) are skipped.
    fn matching_bracket(&self, open: usize) -> Option<usize> {
        let bytes = self.input.as_bytes();
        let mut depth = 0usize;
        let mut i = open + 1;
        while i < self.end {
            i += memchr3(b'[', b']', b'\'', &bytes[i..self.end])?;
            match bytes[i] {
                b'[' => depth += 1,
                b']' if depth == 0 => return Some(i),
                b']' => depth -= 1,
                _ => i = self.closing_quote(i)?,
            }
            i += 1;
        }
        None
    }

    /// Offset of the quote closing the string literal opened at `quote`.
    fn closing_quote(&self, quote: usize) -> Option<usize> {
        let bytes = self.input.as_bytes();
        let mut i = quote + 1;
        while i < self.end {
            let hit = i + memchr2(b'\'', b'\\', &bytes[i..self.end])?;
            if bytes[hit] == b'\'' {
                return Some(hit);
            }
            i = hit + 2;
        }
        None
    }

    /// Radix literal kind and digit test when `0x`, `0b` or `0o` at `i` is
    /// followed by at least one valid digit.
    fn radix_prefix(&self, i: usize) -> Option<(LexemeKind, fn(u8) -> bool)> {
        if self.byte_at(i)? != b'0' {
            return None;
        }
        let (kind, valid): (LexemeKind, fn(u8) -> bool) =
            match self.byte_at(i + 1)?.to_ascii_lowercase() {
                b'x' => (LexemeKind::Hexadecimal, is_hex_digit),
                b'b' => (LexemeKind::Binary, is_binary_digit),
                b'o' => (LexemeKind::Octal, is_octal_digit),
                _ => return None,
            };
        valid(self.byte_at(i + 2)?).then_some((kind, valid))
    }

    /// Number starting at `start`, which may be a digit, a `-` directly
    /// followed by the number, or a leading `.`.
    fn scan_number(&mut self, start: usize) -> Token {
        let mut i = start;
        if self.byte_at(i) == Some(b'-') {
            i += 1;
        }

        if i == start {
            if let Some((kind, valid)) = self.radix_prefix(i) {
                i += 2;
                while self.byte_at(i).is_some_and(valid) {
                    i += 1;
                }
                self.pos = i;
                return self.emit(kind, start);
            }
        }

        while self.is_digit_at(i) {
            i += 1;
        }

        let mut decimal = false;
        if self.byte_at(i) == Some(b'.') && self.is_digit_at(i + 1) {
            i += 1;
            while self.is_digit_at(i) {
                i += 1;
            }
            decimal = true;
        }

        if matches!(self.byte_at(i), Some(b'd' | b'D')) && !self.is_ident_continue_at(i + 1) {
            self.pos = i + 1;
            return self.emit(LexemeKind::Decimal, start);
        }
        if decimal {
            self.pos = i;
            return self.emit(LexemeKind::Decimal, start);
        }

        let rest = self.input.get(i..self.end).unwrap_or("");
        for suffix in INTEGER_SUFFIXES {
            let Some(candidate) = rest.get(..suffix.len()) else {
                continue;
            };
            if candidate.eq_ignore_ascii_case(suffix) && !self.is_ident_continue_at(i + suffix.len())
            {
                i += suffix.len();
                break;
            }
        }
        self.pos = i;
        self.emit(LexemeKind::Integer, start)
    }

    fn scan_string(&mut self, start: usize) -> Result<Token> {
        let bytes = self.input.as_bytes();
        let mut i = start + 1;
        while i < self.end {
            let Some(offset) = memchr2(b'\'', b'\\', &bytes[i..self.end]) else {
                break;
            };
            let hit = i + offset;
            if bytes[hit] == b'\\' {
                i = hit + 2;
                continue;
            }
            self.pos = hit + 1;
            return Ok(self.emit(LexemeKind::String, start));
        }
        let line_end = memchr(b'\n', &bytes[start..self.end]).map_or(self.end, |off| start + off);
        self.lexical_error(
            DiagnosticCode::UnterminatedString,
            "unterminated string literal".to_owned(),
            start,
            line_end,
        )
    }

    fn scan_ambiguous(&mut self, start: usize) -> Result<Token> {
        let len = match (self.input.as_bytes()[start], self.byte_at(start + 1)) {
            (b'<', Some(b'=' | b'>' | b'<'))
            | (b'>', Some(b'=' | b'>'))
            | (b'=', Some(b'>'))
            | (b'!', Some(b'=')) => 2,
            (b'!', _) => return self.unknown_character(start),
            _ => 1,
        };
        self.pos = start + len;
        Ok(self.emit(LexemeKind::Symbol, start))
    }

    fn scan_hash(&mut self, start: usize) -> Result<Token> {
        match self.char_at(start + 1) {
            Some(c) if classify(c) == CharClass::IdentStart => {
                self.pos = self.word_end(start + 1);
                Ok(self.emit(LexemeKind::Schema, start))
            }
            _ => self.unknown_character(start),
        }
    }

    fn scan_dash(&mut self, start: usize) -> Token {
        if self.byte_at(start + 1) == Some(b'-') {
            let bytes = &self.input.as_bytes()[start..self.end];
            self.pos = memchr(b'\n', bytes).map_or(self.end, |off| start + off);
            return self.emit(LexemeKind::Comment, start);
        }
        let folds = !self.after_operand()
            && ((self.is_digit_at(start + 1) && self.radix_prefix(start + 1).is_none())
                || (self.byte_at(start + 1) == Some(b'.') && self.is_digit_at(start + 2)));
        if folds {
            return self.scan_number(start);
        }
        self.pos = start + 1;
        self.emit(LexemeKind::Symbol, start)
    }

    fn scan_slash(&mut self, start: usize) -> Token {
        if self.byte_at(start + 1) == Some(b'*') {
            let body = &self.input.as_bytes()[start + 2..self.end];
            self.pos = memmem::find(body, b"*/").map_or(self.end, |off| start + 2 + off + 2);
            return self.emit(LexemeKind::Comment, start);
        }
        self.pos = start + 1;
        self.emit(LexemeKind::Symbol, start)
    }

    fn scan_dot(&mut self, start: usize) -> Token {
        if self.is_digit_at(start + 1) && !self.after_operand() {
            return self.scan_number(start);
        }
        self.pos = start + 1;
        self.emit(LexemeKind::Symbol, start)
    }

    fn scan_bracket(&mut self, start: usize) -> Token {
        if !self.schema_context {
            let bytes = &self.input.as_bytes()[start + 1..self.end];
            if let Some(off) = memchr(b']', bytes) {
                if off > 0 {
                    self.pos = start + 1 + off + 1;
                    return self.emit(LexemeKind::QuotedIdentifier, start);
                }
            }
        }
        self.pos = start + 1;
        self.emit(LexemeKind::Symbol, start)
    }

    fn scan_colon(&mut self, start: usize) -> Token {
        if self.byte_at(start + 1) != Some(b':') {
            self.pos = start + 1;
            return self.emit(LexemeKind::Symbol, start);
        }
        let mut i = start + 2;
        while self.is_digit_at(i) {
            i += 1;
        }
        let digits = &self.input[start + 2..i];
        if !digits.is_empty() && digits.parse::<u32>().is_ok() {
            self.pos = i;
            return self.emit(LexemeKind::FieldLink, start);
        }
        self.pos = start + 2;
        self.emit(LexemeKind::Symbol, start)
    }

    fn unknown_character(&mut self, start: usize) -> Result<Token> {
        let ch = self.char_at(start).unwrap_or('\u{FFFD}');
        let end = (start + ch.len_utf8()).min(self.end);
        self.lexical_error(
            DiagnosticCode::UnknownCharacter,
            format!("unknown character '{ch}'"),
            start,
            end,
        )
    }

    /// Fail, or in recovery mode record a diagnostic, move the cursor to
    /// `resume` and return an error token covering `start..resume`.
    fn lexical_error(
        &mut self,
        code: DiagnosticCode,
        message: String,
        start: usize,
        resume: usize,
    ) -> Result<Token> {
        let span = TextSpan::from_bounds(start, resume);
        let diagnostic = Diagnostic::error(code, message, span, self.input);
        metrics::record_lexical_diagnostic();
        if !self.options.recover {
            return Err(TabqlError::Lexical(diagnostic));
        }
        tracing::warn!(
            target: "tabql.parse",
            code = %diagnostic.code,
            span = %span,
            message = %diagnostic.message,
            "recovered from lexical error"
        );
        self.diagnostics.push(diagnostic);
        self.pos = resume;
        Ok(self.emit(LexemeKind::Error, start))
    }

    // -----------------------------------------------------------------------
    // Schema-context splitting
    // -----------------------------------------------------------------------

    /// Split `name[inner]` into the base word, `[`, the inner tokens and `]`.
    /// Returns the base word and queues the rest.
    fn split_bracket_access(&mut self, token: Token) -> Result<Token> {
        let span = token.span;
        let (name_len, inner_tokens) = match &token.kind {
            TokenKind::ArrayIndex { name, .. } => (name.len(), None),
            TokenKind::KeyAccess {
                name,
                key: KeyAccessKey::Literal(_),
            } => (name.len(), None),
            TokenKind::KeyAccess {
                name,
                key: KeyAccessKey::Expression(inner),
            } => (name.len(), Some(*inner)),
            _ => return Ok(token),
        };

        let base_span = TextSpan::new(span.start, name_len);
        let base_kind = if self.after_dot() {
            LexemeKind::Property
        } else {
            LexemeKind::SchemaWord
        };
        let base = token_factory::build(base_kind, base_span.slice(self.input), base_span);

        let open = TextSpan::new(base_span.end(), 1);
        let close = TextSpan::new(span.end() - 1, 1);
        self.pending
            .push_back(token_factory::build(LexemeKind::Symbol, "[", open));
        metrics::record_token();

        let inner = inner_tokens.unwrap_or_else(|| TextSpan::from_bounds(open.end(), close.start));
        let mut sub = Self::over_range(
            self.input,
            inner.start,
            inner.end(),
            self.options,
        )?;
        loop {
            let t = sub.next_token()?;
            if t.kind == TokenKind::Eof {
                break;
            }
            self.pending.push_back(t);
        }
        self.diagnostics.append(&mut sub.diagnostics);

        self.pending
            .push_back(token_factory::build(LexemeKind::Symbol, "]", close));
        metrics::record_token();
        Ok(base)
    }
}

const fn is_hex_digit(b: u8) -> bool {
    b.is_ascii_hexdigit()
}

const fn is_binary_digit(b: u8) -> bool {
    matches!(b, b'0' | b'1')
}

const fn is_octal_digit(b: u8) -> bool {
    matches!(b, b'0'..=b'7')
}

/// Tokenize all of `input`, including the trailing [`TokenKind::Eof`].
///
/// # Errors
///
/// Whatever [`Lexer::new`] or [`Lexer::next_token`] reports.
pub fn tokenize(input: &str, options: LexerOptions) -> Result<Vec<Token>> {
    let mut lexer = Lexer::new(input, options)?;
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let is_eof = token.kind == TokenKind::Eof;
        tokens.push(token);
        if is_eof {
            break;
        }
    }
    Ok(tokens)
}
