use crate::ast::{Expr, GeometryKind, IntervalEnd, Operator, Scalar};

/// One method per expression variant.
///
/// All methods default to no-ops, so a visitor implements only the kinds it
/// cares about. Traversal order is the visitor's responsibility; `C` is an
/// optional context threaded through every dispatch, which lets consumers
/// track paths or scopes as they descend.
#[allow(unused_variables)]
pub trait Visitor<C = ()> {
    fn visit_literal(&mut self, value: &Scalar, ctx: Option<&C>) {}
    fn visit_property(&mut self, name: &str, ctx: Option<&C>) {}
    fn visit_unary(&mut self, op: &Operator, operand: &Expr, ctx: Option<&C>) {}
    fn visit_binary(&mut self, op: &Operator, left: &Expr, right: &Expr, ctx: Option<&C>) {}
    fn visit_function(&mut self, op: &Operator, args: &[Expr], ctx: Option<&C>) {}
    fn visit_advanced_comparison(
        &mut self,
        op: &Operator,
        args: &[Expr],
        negate: bool,
        ctx: Option<&C>,
    ) {
    }
    fn visit_grouping(&mut self, inner: &Expr, ctx: Option<&C>) {}
    fn visit_array(&mut self, items: &[Expr], ctx: Option<&C>) {}
    fn visit_interval(&mut self, start: &IntervalEnd, end: &IntervalEnd, ctx: Option<&C>) {}
    fn visit_bbox(&mut self, values: &[Expr], ctx: Option<&C>) {}
    fn visit_geometry(&mut self, kind: GeometryKind, coords: &[Expr], ctx: Option<&C>) {}
    fn visit_geometry_collection(&mut self, members: &[Expr], ctx: Option<&C>) {}
    fn visit_is_null(&mut self, expr: &Expr, negate: bool, ctx: Option<&C>) {}
}

impl Expr {
    /// Dispatch this node to the matching visitor method.
    ///
    /// One exhaustive match; adding an expression variant without a visitor
    /// method is a compile error.
    pub fn accept<C>(&self, visitor: &mut dyn Visitor<C>, ctx: Option<&C>) {
        match self {
            Expr::Literal(value) => visitor.visit_literal(value, ctx),
            Expr::Property(name) => visitor.visit_property(name, ctx),
            Expr::Unary { op, operand } => visitor.visit_unary(op, operand, ctx),
            Expr::Binary { op, left, right } => visitor.visit_binary(op, left, right, ctx),
            Expr::Function { op, args } => visitor.visit_function(op, args, ctx),
            Expr::AdvancedComparison { op, args, negate } => {
                visitor.visit_advanced_comparison(op, args, *negate, ctx)
            }
            Expr::Grouping(inner) => visitor.visit_grouping(inner, ctx),
            Expr::Array(items) => visitor.visit_array(items, ctx),
            Expr::Interval { start, end } => visitor.visit_interval(start, end, ctx),
            Expr::BBox(values) => visitor.visit_bbox(values, ctx),
            Expr::Geometry { kind, coords } => visitor.visit_geometry(*kind, coords, ctx),
            Expr::GeometryCollection(members) => visitor.visit_geometry_collection(members, ctx),
            Expr::IsNull { expr, negate } => visitor.visit_is_null(expr, *negate, ctx),
        }
    }
}
