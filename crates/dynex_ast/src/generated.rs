//! Helpers and utilities for syntax nodes.
//!
//! Node kind checks, span access and other per-variant dispatch.

use crate::node::*;
use crate::syntax_kind::SyntaxKind;
use dynex_core::text::TextSpan;

/// Helper to get the NodeData from any expression.
impl<'a> Expression<'a> {
    pub fn data(&self) -> &NodeData {
        match self {
            Expression::Literal(n) => &n.data,
            Expression::Identifier(n) => &n.data,
            Expression::TypeReference(n) => &n.data,
            Expression::MemberAccess(n) => &n.data,
            Expression::Index(n) => &n.data,
            Expression::Call(n) => &n.data,
            Expression::Conversion(n) => &n.data,
            Expression::PrefixUnary(n) => &n.data,
            Expression::Binary(n) => &n.data,
            Expression::Conditional(n) => &n.data,
            Expression::Membership(n) => &n.data,
            Expression::NewObject(n) => &n.data,
            Expression::NewArray(n) => &n.data,
        }
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.data().kind
    }

    #[inline]
    pub fn span(&self) -> TextSpan {
        self.data().span
    }

    /// The property name a projection infers for this expression when no
    /// explicit name is given: the identifier itself, or the last member of
    /// an access chain.
    pub fn inferred_property_name(&self) -> Option<&'a str> {
        match self {
            Expression::Identifier(id) if !id.name.eq_ignore_ascii_case("it") => Some(id.name),
            Expression::MemberAccess(access) => Some(access.name),
            _ => None,
        }
    }

    /// Whether this is the `null` literal.
    pub fn is_null_literal(&self) -> bool {
        matches!(self, Expression::Literal(Literal { value: LiteralValue::Null, .. }))
    }

    /// Number of nodes in this subtree.
    pub fn node_count(&self) -> usize {
        let children: usize = match self {
            Expression::Literal(_) | Expression::Identifier(_) | Expression::TypeReference(_) => 0,
            Expression::MemberAccess(n) => n.expression.node_count(),
            Expression::Index(n) => {
                n.expression.node_count() + n.arguments.iter().map(Expression::node_count).sum::<usize>()
            }
            Expression::Call(n) => {
                n.target.map_or(0, Expression::node_count)
                    + n.arguments.iter().map(Expression::node_count).sum::<usize>()
            }
            Expression::Conversion(n) => n.arguments.iter().map(Expression::node_count).sum(),
            Expression::PrefixUnary(n) => n.operand.node_count(),
            Expression::Binary(n) => n.left.node_count() + n.right.node_count(),
            Expression::Conditional(n) => {
                n.condition.node_count() + n.when_true.node_count() + n.when_false.node_count()
            }
            Expression::Membership(n) => {
                n.operand.node_count()
                    + match &n.candidates {
                        MembershipCandidates::List(items) => {
                            items.iter().map(Expression::node_count).sum()
                        }
                        MembershipCandidates::Source(source) => source.node_count(),
                    }
            }
            Expression::NewObject(n) => n.properties.iter().map(|p| p.expression.node_count()).sum(),
            Expression::NewArray(n) => n.elements.iter().map(Expression::node_count).sum(),
        };
        children + 1
    }
}
