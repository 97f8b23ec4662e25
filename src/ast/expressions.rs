use crate::ast::{Operator, Scalar};

/// Geometry-literal type tag.
///
/// `depth()` is how many levels of coordinate-list nesting sit between the
/// literal and its individual positions: a point holds bare numbers, a
/// polygon holds rings of positions, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
}

impl GeometryKind {
    /// WKT-style tag used by the Text encoding.
    pub fn tag(&self) -> &'static str {
        match self {
            GeometryKind::Point => "POINT",
            GeometryKind::MultiPoint => "MULTIPOINT",
            GeometryKind::LineString => "LINESTRING",
            GeometryKind::MultiLineString => "MULTILINESTRING",
            GeometryKind::Polygon => "POLYGON",
            GeometryKind::MultiPolygon => "MULTIPOLYGON",
        }
    }

    /// GeoJSON `type` name used by the JSON encoding.
    pub fn type_name(&self) -> &'static str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::MultiPoint => "MultiPoint",
            GeometryKind::LineString => "LineString",
            GeometryKind::MultiLineString => "MultiLineString",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::MultiPolygon => "MultiPolygon",
        }
    }

    /// Coordinate-list nesting depth below the literal itself.
    pub fn depth(&self) -> usize {
        match self {
            GeometryKind::Point => 0,
            GeometryKind::LineString | GeometryKind::MultiPoint => 1,
            GeometryKind::Polygon | GeometryKind::MultiLineString => 2,
            GeometryKind::MultiPolygon => 3,
        }
    }

    pub fn from_type_name(name: &str) -> Option<GeometryKind> {
        let kind = match name {
            "Point" => GeometryKind::Point,
            "MultiPoint" => GeometryKind::MultiPoint,
            "LineString" => GeometryKind::LineString,
            "MultiLineString" => GeometryKind::MultiLineString,
            "Polygon" => GeometryKind::Polygon,
            "MultiPolygon" => GeometryKind::MultiPolygon,
            _ => return None,
        };
        Some(kind)
    }
}

/// One end of a temporal interval.
#[derive(Debug, Clone, PartialEq)]
pub enum IntervalEnd {
    /// The `..` marker: unbounded on this side.
    Open,
    /// A temporal literal bound.
    At(Box<Expr>),
}

/// Abstract Syntax Tree node for a parsed CQL2 filter expression.
///
/// Both encodings (Text and JSON) parse into this one shape, and every node
/// serializes back to both via [`Expr::to_text`] and [`Expr::to_json`].
/// Nodes are immutable once built; parsing constructs them bottom-up,
/// children before parents, left to right.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Scalar literal (string, number, boolean, null, date, timestamp)
    Literal(Scalar),

    /// Reference to a named property of the item being filtered
    ///
    /// # Example
    /// ```text
    /// cityName
    /// ```
    Property(String),

    /// Operator with one operand (`NOT x`, `CASEI(x)`)
    Unary { op: Operator, operand: Box<Expr> },

    /// Operator with two operands
    ///
    /// # Example
    /// ```text
    /// depth + 10
    /// ```
    Binary {
        op: Operator,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Function call with an ordered, arbitrary-arity argument list
    ///
    /// # Example
    /// ```text
    /// s_intersects(geometry, POINT(1 2))
    /// ```
    Function { op: Operator, args: Vec<Expr> },

    /// LIKE / BETWEEN / IN, with optional NOT
    ///
    /// `args` holds 2 entries for LIKE and IN (the IN list is a single
    /// [`Expr::Array`]) and 3 for BETWEEN.
    AdvancedComparison {
        op: Operator,
        args: Vec<Expr>,
        negate: bool,
    },

    /// Parenthesized sub-expression
    ///
    /// Preserved in the Text encoding; transparent in JSON, which has no
    /// parenthesis concept.
    Grouping(Box<Expr>),

    /// Ordered expression list, `(a, b, c)` in text
    Array(Vec<Expr>),

    /// Temporal interval with possibly-open ends
    ///
    /// # Example
    /// ```text
    /// INTERVAL('2020-01-01', '..')
    /// ```
    Interval { start: IntervalEnd, end: IntervalEnd },

    /// Bounding box of 4 or 6 numeric sub-expressions
    BBox(Vec<Expr>),

    /// WKT-like geometry literal
    ///
    /// `coords` nesting follows [`GeometryKind::depth`]: bare numbers for a
    /// point, arrays of positions for a line string, arrays of rings for a
    /// polygon, one deeper for multipolygons.
    Geometry {
        kind: GeometryKind,
        coords: Vec<Expr>,
    },

    /// Ordered list of geometry expressions
    GeometryCollection(Vec<Expr>),

    /// `x IS [NOT] NULL`
    IsNull { expr: Box<Expr>, negate: bool },
}

impl Expr {
    /// Shorthand for a boxed grouping around `inner`.
    pub fn grouping(inner: Expr) -> Expr {
        Expr::Grouping(Box::new(inner))
    }

    /// Shorthand for a binary node.
    pub fn binary(left: Expr, op: Operator, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Shorthand for a unary node.
    pub fn unary(op: Operator, operand: Expr) -> Expr {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }
}
