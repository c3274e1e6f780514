//! The expression parser.
//!
//! A recursive descent parser over the token stream produced by the scanner.
//! Binary operators are parsed by precedence climbing; everything else is a
//! direct transcription of the grammar. The tree is allocated in the caller's
//! arena and parsing stops at the first error.

use bumpalo::Bump;
use dynex_ast::node::*;
use dynex_ast::syntax_kind::SyntaxKind;
use dynex_binder::{SymbolTable, IMPLICIT_PARAMETER_NAME};
use dynex_core::text::TextSpan;
use dynex_diagnostics::{messages, DiagnosticMessage, ParseFailure, SyntaxError};
use dynex_options::ParserOptions;
use dynex_scanner::Scanner;
use dynex_types::{lookup_type_name, KnownType};

use crate::precedence::{
    get_binary_operator_precedence, normalize_binary_operator, right_operand_precedence,
    OperatorPrecedence,
};

type ParseResult<T> = Result<T, ParseFailure>;

/// Move a Vec into the arena as a slice.
fn alloc_vec_in<T>(arena: &Bump, vec: Vec<T>) -> &[T] {
    if vec.is_empty() {
        return &[];
    }
    arena.alloc_slice_fill_iter(vec)
}

/// The parser produces an expression tree from expression text.
pub struct Parser<'a, 't> {
    arena: &'a Bump,
    scanner: Scanner,
    symbols: &'t SymbolTable,
    options: &'t ParserOptions,
    /// End of the most recently consumed token.
    previous_end: u32,
    /// Tracks recursion depth to prevent stack overflow on deeply nested input.
    recursion_depth: u32,
}

impl<'a, 't> Parser<'a, 't> {
    pub fn new(
        arena: &'a Bump,
        text: &str,
        symbols: &'t SymbolTable,
        options: &'t ParserOptions,
    ) -> Self {
        Self::from_scanner(arena, Scanner::new(text), symbols, options)
    }

    /// Parse only the character range `start..end` of `text`. Spans in the
    /// resulting tree and in errors stay relative to the whole text.
    pub fn with_range(
        arena: &'a Bump,
        text: &str,
        start: usize,
        end: usize,
        symbols: &'t SymbolTable,
        options: &'t ParserOptions,
    ) -> Self {
        Self::from_scanner(arena, Scanner::with_range(text, start, end), symbols, options)
    }

    fn from_scanner(
        arena: &'a Bump,
        scanner: Scanner,
        symbols: &'t SymbolTable,
        options: &'t ParserOptions,
    ) -> Self {
        let previous_end = scanner.token_start() as u32;
        Self {
            arena,
            scanner,
            symbols,
            options,
            previous_end,
            recursion_depth: 0,
        }
    }

    /// Parse one complete expression. Any token left over after it is an error.
    pub fn parse_expression(mut self) -> ParseResult<&'a Expression<'a>> {
        self.next_token()?;
        let expression = self.parse_conditional_expression()?;
        if self.current_token() != SyntaxKind::EndOfFileToken {
            return Err(self.unexpected_token());
        }
        Ok(self.arena.alloc(expression))
    }

    // ========================================================================
    // Token management
    // ========================================================================

    #[inline]
    fn current_token(&self) -> SyntaxKind {
        self.scanner.token()
    }

    #[inline]
    fn next_token(&mut self) -> ParseResult<SyntaxKind> {
        self.previous_end = self.scanner.token_end() as u32;
        Ok(self.scanner.scan()?)
    }

    #[inline]
    fn token_pos(&self) -> u32 {
        self.scanner.token_start() as u32
    }

    #[inline]
    fn token_span(&self) -> TextSpan {
        self.scanner.token_span()
    }

    #[inline]
    fn token_value(&self) -> &str {
        self.scanner.token_value()
    }

    /// Copy the current token's value into the arena.
    fn alloc_token_value(&self) -> &'a str {
        self.arena.alloc_str(self.scanner.token_value())
    }

    fn peek_token(&mut self) -> Option<SyntaxKind> {
        self.scanner.look_ahead(|scanner| scanner.scan().ok())
    }

    fn expect_token(&mut self, kind: SyntaxKind) -> ParseResult<()> {
        if self.current_token() == kind {
            self.next_token()?;
            Ok(())
        } else {
            let text = kind.punctuation_text().or_else(|| kind.keyword_text()).unwrap_or("token");
            Err(self.error(&messages::_0_EXPECTED, &[text], self.token_span()))
        }
    }

    fn error(&self, message: &DiagnosticMessage, args: &[&str], span: TextSpan) -> ParseFailure {
        SyntaxError::new(message, args, span).into()
    }

    fn unexpected_token(&self) -> ParseFailure {
        if self.current_token() == SyntaxKind::EndOfFileToken {
            return self.error(&messages::EXPRESSION_EXPECTED, &[], self.token_span());
        }
        let text = self.scanner.token_text();
        self.error(&messages::UNEXPECTED_TOKEN, &[&text], self.token_span())
    }

    fn enter_nested(&mut self) -> ParseResult<()> {
        self.recursion_depth += 1;
        if self.recursion_depth > self.options.max_recursion_depth {
            let limit = self.options.max_recursion_depth.to_string();
            return Err(self.error(&messages::EXPRESSION_NESTED_TOO_DEEPLY, &[&limit], self.token_span()));
        }
        Ok(())
    }

    fn leave_nested(&mut self) {
        self.recursion_depth -= 1;
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn parse_conditional_expression(&mut self) -> ParseResult<Expression<'a>> {
        self.enter_nested()?;
        let result = self.parse_conditional_expression_worker();
        self.leave_nested();
        result
    }

    fn parse_conditional_expression_worker(&mut self) -> ParseResult<Expression<'a>> {
        let condition = self.parse_binary_expression(OperatorPrecedence::Lowest)?;
        if self.current_token() != SyntaxKind::QuestionToken {
            return Ok(condition);
        }
        self.next_token()?;
        let when_true = self.parse_conditional_expression()?;
        self.expect_token(SyntaxKind::ColonToken)?;
        let when_false = self.parse_conditional_expression()?;
        let span = condition.span().union(&when_false.span());
        Ok(Expression::Conditional(ConditionalExpression {
            data: NodeData { kind: SyntaxKind::ConditionalExpression, span },
            condition: self.arena.alloc(condition),
            when_true: self.arena.alloc(when_true),
            when_false: self.arena.alloc(when_false),
        }))
    }

    /// Left-associative chains grow the tree one level per operator, so each
    /// wrap of `left` is charged against the recursion limit until the loop ends.
    fn parse_binary_expression(&mut self, min_precedence: OperatorPrecedence) -> ParseResult<Expression<'a>> {
        let mut charged = 0;
        let result = self.parse_binary_expression_worker(min_precedence, &mut charged);
        self.recursion_depth -= charged;
        result
    }

    fn parse_binary_expression_worker(
        &mut self,
        min_precedence: OperatorPrecedence,
        charged: &mut u32,
    ) -> ParseResult<Expression<'a>> {
        let mut left = self.parse_unary_expression()?;
        loop {
            let operator = self.current_token();
            let precedence = get_binary_operator_precedence(operator);
            if precedence == OperatorPrecedence::Invalid || precedence <= min_precedence {
                break;
            }
            self.next_token()?;
            *charged += 1;
            self.enter_nested()?;

            if operator == SyntaxKind::InKeyword {
                left = self.parse_membership_expression(left)?;
                continue;
            }

            self.enter_nested()?;
            let right = self.parse_binary_expression(right_operand_precedence(operator, precedence));
            self.leave_nested();
            let right = right?;

            let span = left.span().union(&right.span());
            left = Expression::Binary(BinaryExpression {
                data: NodeData { kind: SyntaxKind::BinaryExpression, span },
                left: self.arena.alloc(left),
                operator: normalize_binary_operator(operator),
                right: self.arena.alloc(right),
            });
        }
        Ok(left)
    }

    /// `x in (a, b, c)` or `x in Source`. The `in` token has been consumed.
    fn parse_membership_expression(&mut self, operand: Expression<'a>) -> ParseResult<Expression<'a>> {
        let candidates = if self.current_token() == SyntaxKind::OpenParenToken {
            self.next_token()?;
            let items = self.parse_argument_list(SyntaxKind::CloseParenToken)?;
            MembershipCandidates::List(alloc_vec_in(self.arena, items))
        } else {
            let source = self.parse_binary_expression(OperatorPrecedence::Relational)?;
            MembershipCandidates::Source(self.arena.alloc(source))
        };
        let span = TextSpan::from_bounds(operand.span().start, self.previous_end);
        Ok(Expression::Membership(MembershipExpression {
            data: NodeData { kind: SyntaxKind::MembershipExpression, span },
            operand: self.arena.alloc(operand),
            candidates,
        }))
    }

    fn parse_unary_expression(&mut self) -> ParseResult<Expression<'a>> {
        let operator = match self.current_token() {
            SyntaxKind::MinusToken => SyntaxKind::MinusToken,
            SyntaxKind::ExclamationToken | SyntaxKind::NotKeyword => SyntaxKind::ExclamationToken,
            _ => return self.parse_postfix_expression(),
        };
        let pos = self.token_pos();

        // A minus directly applied to a numeric literal becomes part of the
        // literal, so that `-2147483648` is a valid Int32.
        if operator == SyntaxKind::MinusToken
            && matches!(
                self.peek_token(),
                Some(SyntaxKind::IntegerLiteral | SyntaxKind::RealLiteral)
            )
        {
            self.next_token()?;
            let literal = self.parse_numeric_literal(Some(pos))?;
            return self.parse_postfix_operators(literal);
        }

        self.next_token()?;
        self.enter_nested()?;
        let operand = self.parse_unary_expression();
        self.leave_nested();
        let operand = operand?;
        let span = TextSpan::from_bounds(pos, operand.span().end());
        Ok(Expression::PrefixUnary(PrefixUnaryExpression {
            data: NodeData { kind: SyntaxKind::PrefixUnaryExpression, span },
            operator,
            operand: self.arena.alloc(operand),
        }))
    }

    fn parse_postfix_expression(&mut self) -> ParseResult<Expression<'a>> {
        let primary = self.parse_primary_expression()?;
        self.parse_postfix_operators(primary)
    }

    /// Member access, method calls and indexers following a primary. Each
    /// suffix nests the tree one level deeper and is charged like a binary operator.
    fn parse_postfix_operators(&mut self, expression: Expression<'a>) -> ParseResult<Expression<'a>> {
        let mut charged = 0;
        let result = self.parse_postfix_operators_worker(expression, &mut charged);
        self.recursion_depth -= charged;
        result
    }

    fn parse_postfix_operators_worker(
        &mut self,
        mut expression: Expression<'a>,
        charged: &mut u32,
    ) -> ParseResult<Expression<'a>> {
        loop {
            if matches!(self.current_token(), SyntaxKind::DotToken | SyntaxKind::OpenBracketToken) {
                *charged += 1;
                self.enter_nested()?;
            }
            match self.current_token() {
                SyntaxKind::DotToken => {
                    self.next_token()?;
                    if !self.current_token().is_identifier_or_keyword() {
                        return Err(self.error(&messages::IDENTIFIER_EXPECTED, &[], self.token_span()));
                    }
                    let name = self.alloc_token_value();
                    let name_span = self.token_span();
                    self.next_token()?;
                    let start = expression.span().start;

                    expression = if self.current_token() == SyntaxKind::OpenParenToken {
                        self.next_token()?;
                        let arguments = self.parse_argument_list(SyntaxKind::CloseParenToken)?;
                        Expression::Call(CallExpression {
                            data: NodeData::new(SyntaxKind::CallExpression, start, self.previous_end),
                            target: Some(self.arena.alloc(expression)),
                            name,
                            name_span,
                            arguments: alloc_vec_in(self.arena, arguments),
                        })
                    } else {
                        Expression::MemberAccess(MemberAccessExpression {
                            data: NodeData::new(SyntaxKind::MemberAccessExpression, start, name_span.end()),
                            expression: self.arena.alloc(expression),
                            name,
                            name_span,
                        })
                    };
                }
                SyntaxKind::OpenBracketToken => {
                    let bracket = self.token_span();
                    self.next_token()?;
                    let arguments = self.parse_argument_list(SyntaxKind::CloseBracketToken)?;
                    if arguments.is_empty() {
                        return Err(self.error(&messages::EXPRESSION_EXPECTED, &[], bracket));
                    }
                    let start = expression.span().start;
                    expression = Expression::Index(IndexExpression {
                        data: NodeData::new(SyntaxKind::IndexExpression, start, self.previous_end),
                        expression: self.arena.alloc(expression),
                        arguments: alloc_vec_in(self.arena, arguments),
                    });
                }
                SyntaxKind::OpenParenToken => {
                    return Err(self.error(
                        &messages::ONLY_NAMED_METHODS_CAN_BE_INVOKED,
                        &[],
                        self.token_span(),
                    ));
                }
                _ => return Ok(expression),
            }
        }
    }

    /// Comma-separated expressions up to and including `close`. The opening
    /// token has been consumed.
    fn parse_argument_list(&mut self, close: SyntaxKind) -> ParseResult<Vec<Expression<'a>>> {
        let mut arguments = Vec::new();
        if self.current_token() == close {
            self.next_token()?;
            return Ok(arguments);
        }
        loop {
            arguments.push(self.parse_conditional_expression()?);
            if self.current_token() == SyntaxKind::CommaToken {
                self.next_token()?;
                continue;
            }
            self.expect_token(close)?;
            return Ok(arguments);
        }
    }

    // ========================================================================
    // Primary expressions
    // ========================================================================

    fn parse_primary_expression(&mut self) -> ParseResult<Expression<'a>> {
        match self.current_token() {
            SyntaxKind::IntegerLiteral | SyntaxKind::RealLiteral => self.parse_numeric_literal(None),
            SyntaxKind::StringLiteral => {
                let value = LiteralValue::String(self.alloc_token_value());
                self.parse_simple_literal(value)
            }
            SyntaxKind::CharLiteral => self.parse_char_literal(),
            SyntaxKind::TrueKeyword => self.parse_simple_literal(LiteralValue::True),
            SyntaxKind::FalseKeyword => self.parse_simple_literal(LiteralValue::False),
            SyntaxKind::NullKeyword => self.parse_simple_literal(LiteralValue::Null),
            SyntaxKind::ItKeyword => {
                let span = self.token_span();
                self.next_token()?;
                Ok(Expression::Identifier(Identifier {
                    data: NodeData { kind: SyntaxKind::IdentifierExpression, span },
                    name: IMPLICIT_PARAMETER_NAME,
                }))
            }
            SyntaxKind::IifKeyword => self.parse_iif_expression(),
            SyntaxKind::NewKeyword => self.parse_new_expression(),
            SyntaxKind::OpenParenToken => {
                self.next_token()?;
                let expression = self.parse_conditional_expression()?;
                self.expect_token(SyntaxKind::CloseParenToken)?;
                Ok(expression)
            }
            SyntaxKind::Identifier => self.parse_identifier_expression(),
            _ => Err(self.unexpected_token()),
        }
    }

    fn parse_simple_literal(&mut self, value: LiteralValue<'a>) -> ParseResult<Expression<'a>> {
        let span = self.token_span();
        let text = self.arena.alloc_str(&self.scanner.token_text());
        self.next_token()?;
        Ok(Expression::Literal(Literal {
            data: NodeData { kind: SyntaxKind::LiteralExpression, span },
            value,
            text,
        }))
    }

    fn parse_char_literal(&mut self) -> ParseResult<Expression<'a>> {
        let mut chars = self.token_value().chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => self.parse_simple_literal(LiteralValue::Char(ch)),
            _ => Err(self.error(
                &messages::CHARACTER_LITERAL_MUST_CONTAIN_ONE_CHARACTER,
                &[],
                self.token_span(),
            )),
        }
    }

    /// Integer or real literal. `minus` is the position of a folded `-`.
    fn parse_numeric_literal(&mut self, minus: Option<u32>) -> ParseResult<Expression<'a>> {
        let raw = self.token_value().to_string();
        let start = minus.unwrap_or_else(|| self.token_pos());
        let span = TextSpan::from_bounds(start, self.scanner.token_end() as u32);
        let negative = minus.is_some();

        let value = if self.current_token() == SyntaxKind::IntegerLiteral {
            let (digits, suffix) = split_integer_suffix(&raw);
            let magnitude = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
                Some(hex) => u64::from_str_radix(hex, 16),
                None => digits.parse::<u64>(),
            }
            .map_err(|_| self.error(&messages::INVALID_INTEGER_LITERAL, &[&raw], span))?;
            LiteralValue::Integer { magnitude, negative, suffix }
        } else {
            let (number, suffix) = split_real_suffix(&raw);
            let value = number
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| self.error(&messages::INVALID_REAL_LITERAL, &[&raw], span))?;
            LiteralValue::Real { value: if negative { -value } else { value }, suffix }
        };

        let text = if negative { format!("-{}", raw) } else { raw };
        self.next_token()?;
        Ok(Expression::Literal(Literal {
            data: NodeData { kind: SyntaxKind::LiteralExpression, span },
            value,
            text: self.arena.alloc_str(&text),
        }))
    }

    /// `iif(test, a, b)`. Arity is checked during binding.
    fn parse_iif_expression(&mut self) -> ParseResult<Expression<'a>> {
        let name_span = self.token_span();
        self.next_token()?;
        self.expect_token(SyntaxKind::OpenParenToken)?;
        let arguments = self.parse_argument_list(SyntaxKind::CloseParenToken)?;
        Ok(Expression::Call(CallExpression {
            data: NodeData::new(SyntaxKind::CallExpression, name_span.start, self.previous_end),
            target: None,
            name: "iif",
            name_span,
            arguments: alloc_vec_in(self.arena, arguments),
        }))
    }

    fn parse_identifier_expression(&mut self) -> ParseResult<Expression<'a>> {
        let name = self.alloc_token_value();
        let span = self.token_span();
        self.next_token()?;

        // A predefined type name means the type unless a declared parameter
        // shadows it. Members of `it` depend on the lambda scope and are
        // resolved by the checker.
        if let Some(known) = lookup_type_name(name) {
            if !self.symbols.lookup(name).is_some_and(|symbol| symbol.is_parameter()) {
                let target_type = TypeReference {
                    data: NodeData { kind: SyntaxKind::TypeReference, span },
                    name,
                    known,
                };
                if self.current_token() != SyntaxKind::OpenParenToken {
                    return Ok(Expression::TypeReference(target_type));
                }
                self.next_token()?;
                let arguments = self.parse_argument_list(SyntaxKind::CloseParenToken)?;
                return Ok(Expression::Conversion(ConversionExpression {
                    data: NodeData::new(SyntaxKind::ConversionExpression, span.start, self.previous_end),
                    target_type,
                    arguments: alloc_vec_in(self.arena, arguments),
                }));
            }
        }

        if self.current_token() == SyntaxKind::OpenParenToken {
            self.next_token()?;
            let arguments = self.parse_argument_list(SyntaxKind::CloseParenToken)?;
            return Ok(Expression::Call(CallExpression {
                data: NodeData::new(SyntaxKind::CallExpression, span.start, self.previous_end),
                target: None,
                name,
                name_span: span,
                arguments: alloc_vec_in(self.arena, arguments),
            }));
        }

        Ok(Expression::Identifier(Identifier {
            data: NodeData { kind: SyntaxKind::IdentifierExpression, span },
            name,
        }))
    }

    // ========================================================================
    // Construction
    // ========================================================================

    fn parse_new_expression(&mut self) -> ParseResult<Expression<'a>> {
        let pos = self.token_pos();
        self.next_token()?;
        match self.current_token() {
            SyntaxKind::OpenBraceToken => {
                self.next_token()?;
                self.parse_new_object(pos, SyntaxKind::CloseBraceToken)
            }
            SyntaxKind::OpenParenToken => {
                self.next_token()?;
                self.parse_new_object(pos, SyntaxKind::CloseParenToken)
            }
            SyntaxKind::OpenBracketToken => {
                self.next_token()?;
                self.expect_token(SyntaxKind::CloseBracketToken)?;
                self.parse_array_initializer(pos, None)
            }
            SyntaxKind::Identifier => {
                let name = self.alloc_token_value();
                let span = self.token_span();
                let known = match lookup_type_name(name) {
                    Some(known @ KnownType::Primitive(_)) => known,
                    _ => return Err(self.error(&messages::_0_EXPECTED, &["{"], span)),
                };
                self.next_token()?;
                if self.current_token() == SyntaxKind::OpenBracketToken {
                    self.next_token()?;
                    self.expect_token(SyntaxKind::CloseBracketToken)?;
                }
                let element_type = TypeReference {
                    data: NodeData { kind: SyntaxKind::TypeReference, span },
                    name,
                    known,
                };
                self.parse_array_initializer(pos, Some(element_type))
            }
            _ => Err(self.error(&messages::_0_EXPECTED, &["{"], self.token_span())),
        }
    }

    fn parse_new_object(&mut self, pos: u32, close: SyntaxKind) -> ParseResult<Expression<'a>> {
        let mut properties = Vec::new();
        if self.current_token() == close {
            self.next_token()?;
        } else {
            loop {
                properties.push(self.parse_projection_property()?);
                if self.current_token() == SyntaxKind::CommaToken {
                    self.next_token()?;
                    continue;
                }
                self.expect_token(close)?;
                break;
            }
        }
        Ok(Expression::NewObject(NewObjectExpression {
            data: NodeData::new(SyntaxKind::NewObjectExpression, pos, self.previous_end),
            properties: alloc_vec_in(self.arena, properties),
        }))
    }

    /// `Name: expr`, `expr as Name`, or an expression whose name can be
    /// inferred (a parameter or member access).
    fn parse_projection_property(&mut self) -> ParseResult<ProjectionProperty<'a>> {
        if self.current_token().is_identifier_or_keyword()
            && self.peek_token() == Some(SyntaxKind::ColonToken)
        {
            let name = self.alloc_token_value();
            let name_span = self.token_span();
            self.next_token()?;
            self.next_token()?;
            let expression = self.parse_conditional_expression()?;
            return Ok(ProjectionProperty { name, name_span, expression });
        }

        let expression = self.parse_conditional_expression()?;
        if self.current_token() == SyntaxKind::AsKeyword {
            self.next_token()?;
            if !self.current_token().is_identifier_or_keyword() {
                return Err(self.error(&messages::IDENTIFIER_EXPECTED, &[], self.token_span()));
            }
            let name = self.alloc_token_value();
            let name_span = self.token_span();
            self.next_token()?;
            return Ok(ProjectionProperty { name, name_span, expression });
        }

        match expression.inferred_property_name() {
            Some(name) => Ok(ProjectionProperty { name, name_span: expression.span(), expression }),
            None => Err(self.error(
                &messages::EXPRESSION_IS_MISSING_AN_AS_CLAUSE,
                &[],
                expression.span(),
            )),
        }
    }

    fn parse_array_initializer(
        &mut self,
        pos: u32,
        element_type: Option<TypeReference<'a>>,
    ) -> ParseResult<Expression<'a>> {
        self.expect_token(SyntaxKind::OpenBraceToken)?;
        let elements = self.parse_argument_list(SyntaxKind::CloseBraceToken)?;
        Ok(Expression::NewArray(NewArrayExpression {
            data: NodeData::new(SyntaxKind::NewArrayExpression, pos, self.previous_end),
            element_type,
            elements: alloc_vec_in(self.arena, elements),
        }))
    }
}

fn split_integer_suffix(raw: &str) -> (&str, IntegerSuffix) {
    let digits = raw.trim_end_matches(['u', 'U', 'l', 'L']);
    let suffix = match raw[digits.len()..].to_ascii_uppercase().as_str() {
        "U" => IntegerSuffix::Unsigned,
        "L" => IntegerSuffix::Long,
        "UL" | "LU" => IntegerSuffix::UnsignedLong,
        _ => IntegerSuffix::None,
    };
    (digits, suffix)
}

fn split_real_suffix(raw: &str) -> (&str, RealSuffix) {
    let suffix = match raw.chars().last() {
        Some('f' | 'F') => RealSuffix::Single,
        Some('d' | 'D') => RealSuffix::Double,
        Some('m' | 'M') => RealSuffix::Decimal,
        _ => return (raw, RealSuffix::None),
    };
    (&raw[..raw.len() - 1], suffix)
}
