// Schema definitions: `binary Name { ... }` and `text Name { ... }`.
//
// The lexer is switched into schema context while the body is read, so the
// primitive type names and modifiers come through as schema keywords and
// `name[...]` is split into separate tokens.

use tabql_ast::{
    Endianness, FieldType, PrimitiveType, SchemaDefinition, SchemaField, SchemaKind,
    StringEncoding, TextMatcher,
};
use tabql_error::Result;

use crate::parser::Parser;
use crate::token::{SchemaKeyword, TokenKind};

const fn primitive(keyword: SchemaKeyword) -> Option<PrimitiveType> {
    let ty = match keyword {
        SchemaKeyword::Byte => PrimitiveType::Byte,
        SchemaKeyword::SByte => PrimitiveType::SByte,
        SchemaKeyword::Short => PrimitiveType::Short,
        SchemaKeyword::UShort => PrimitiveType::UShort,
        SchemaKeyword::Int => PrimitiveType::Int,
        SchemaKeyword::UInt => PrimitiveType::UInt,
        SchemaKeyword::Long => PrimitiveType::Long,
        SchemaKeyword::ULong => PrimitiveType::ULong,
        SchemaKeyword::Float => PrimitiveType::Float,
        SchemaKeyword::Double => PrimitiveType::Double,
        SchemaKeyword::Bool => PrimitiveType::Bool,
        _ => return None,
    };
    Some(ty)
}

impl Parser<'_> {
    pub(crate) fn parse_schema_definition(&mut self) -> Result<SchemaDefinition> {
        let start = self.current.span.start;
        let kind = match &self.current.kind {
            TokenKind::Identifier(word) if word.eq_ignore_ascii_case("binary") => {
                SchemaKind::Binary
            }
            TokenKind::Identifier(word) if word.eq_ignore_ascii_case("text") => SchemaKind::Text,
            _ => return Err(self.err_expected("BINARY or TEXT")),
        };
        // Everything after the keyword is lexed in schema context.
        self.lexer.set_schema_context(true);
        let result = self.parse_schema_body(kind, start);
        self.lexer.set_schema_context(false);
        result
    }

    fn parse_schema_body(&mut self, kind: SchemaKind, start: usize) -> Result<SchemaDefinition> {
        self.advance()?;
        let name = self.expect_name("a schema name")?;
        self.expect(&TokenKind::LeftCurly, "'{' after schema name")?;

        let mut fields = Vec::new();
        while !self.check(&TokenKind::RightCurly) {
            fields.push(self.parse_schema_field(kind)?);
            if !self.eat(&TokenKind::Comma)? {
                break;
            }
        }
        if !self.check(&TokenKind::RightCurly) {
            return Err(self.err_expected("',' or '}' after schema field"));
        }
        // The token after `}` belongs to the query grammar again.
        self.lexer.set_schema_context(false);
        self.advance()?;

        Ok(SchemaDefinition {
            kind,
            name,
            fields,
            span: self.span_from(start),
        })
    }

    fn parse_schema_field(&mut self, kind: SchemaKind) -> Result<SchemaField> {
        let start = self.current.span.start;
        let name = match &self.current.kind {
            TokenKind::Identifier(name) | TokenKind::QuotedIdentifier(name) => name.clone(),
            // Field names may reuse modifier words such as `rest` or `token`.
            TokenKind::SchemaKeyword(_) => self.current.span.slice(self.source).to_owned(),
            _ => return Err(self.err_expected("a field name")),
        };
        self.advance()?;
        self.expect(&TokenKind::Colon, "':' after field name")?;
        let ty = match kind {
            SchemaKind::Binary => self.parse_binary_type()?,
            SchemaKind::Text => self.parse_text_type()?,
        };
        Ok(SchemaField {
            name,
            ty,
            span: self.span_from(start),
        })
    }

    // -----------------------------------------------------------------------
    // Binary fields
    // -----------------------------------------------------------------------

    fn parse_binary_type(&mut self) -> Result<FieldType> {
        match self.current.kind.clone() {
            TokenKind::SchemaKeyword(SchemaKeyword::String) => {
                self.advance()?;
                let length = self.parse_length()?;
                let encoding = match self.current.kind {
                    TokenKind::SchemaKeyword(SchemaKeyword::Utf8) => Some(StringEncoding::Utf8),
                    TokenKind::SchemaKeyword(SchemaKeyword::Ascii) => Some(StringEncoding::Ascii),
                    _ => None,
                };
                if encoding.is_some() {
                    self.advance()?;
                }
                Ok(FieldType::String { length, encoding })
            }
            TokenKind::SchemaKeyword(keyword) => {
                let Some(ty) = primitive(keyword) else {
                    return Err(self.err_expected("a binary field type"));
                };
                self.advance()?;
                let length = if self.check(&TokenKind::LeftSquare) {
                    Some(self.parse_length()?)
                } else {
                    None
                };
                let endianness = match self.current.kind {
                    TokenKind::SchemaKeyword(SchemaKeyword::Le) => Some(Endianness::Little),
                    TokenKind::SchemaKeyword(SchemaKeyword::Be) => Some(Endianness::Big),
                    _ => None,
                };
                if endianness.is_some() {
                    self.advance()?;
                }
                let element = FieldType::Primitive { ty, endianness };
                Ok(match length {
                    Some(length) => FieldType::Array {
                        element: Box::new(element),
                        length,
                    },
                    None => element,
                })
            }
            TokenKind::Identifier(name) => {
                self.advance()?;
                let element = FieldType::Reference(name);
                if self.check(&TokenKind::LeftSquare) {
                    let length = self.parse_length()?;
                    return Ok(FieldType::Array {
                        element: Box::new(element),
                        length,
                    });
                }
                Ok(element)
            }
            _ => Err(self.err_expected("a binary field type")),
        }
    }

    /// `[expr]`.
    fn parse_length(&mut self) -> Result<tabql_ast::Expr> {
        self.expect(&TokenKind::LeftSquare, "'[' before length")?;
        let length = self.parse_expr()?;
        self.expect(&TokenKind::RightSquare, "']' after length")?;
        Ok(length)
    }

    // -----------------------------------------------------------------------
    // Text fields
    // -----------------------------------------------------------------------

    fn parse_text_type(&mut self) -> Result<FieldType> {
        let TokenKind::SchemaKeyword(keyword) = self.current.kind else {
            return Err(self.err_expected("a text field matcher"));
        };
        let matcher = match keyword {
            SchemaKeyword::Until => {
                self.advance()?;
                TextMatcher::Until(self.expect_string("a delimiter after UNTIL")?)
            }
            SchemaKeyword::Between => {
                self.advance()?;
                let open = self.expect_string("an opening marker after BETWEEN")?;
                let close = self.expect_string("a closing marker after BETWEEN")?;
                TextMatcher::Between(open, close)
            }
            SchemaKeyword::Pattern => {
                self.advance()?;
                TextMatcher::Pattern(self.expect_string("a pattern after PATTERN")?)
            }
            SchemaKeyword::Literal => {
                self.advance()?;
                TextMatcher::Literal(self.expect_string("text after LITERAL")?)
            }
            SchemaKeyword::Token => {
                self.advance()?;
                TextMatcher::Token
            }
            SchemaKeyword::Whitespace => {
                self.advance()?;
                TextMatcher::Whitespace
            }
            SchemaKeyword::Rest => {
                self.advance()?;
                TextMatcher::Rest
            }
            _ => return Err(self.err_expected("a text field matcher")),
        };
        let trim = self.eat(&TokenKind::SchemaKeyword(SchemaKeyword::Trim))?;
        Ok(FieldType::Text { matcher, trim })
    }

    fn expect_string(&mut self, what: &str) -> Result<String> {
        let TokenKind::StringLiteral(value) = self.current.kind.clone() else {
            return Err(self.err_expected(what));
        };
        self.advance()?;
        Ok(value)
    }
}
