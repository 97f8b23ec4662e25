// tests/parser_tests.rs

use cql2_filter::ast::{Expr, GeometryKind, IntervalEnd, Operator, Scalar, Visitor};
use cql2_filter::dispatch::parse_text;
use cql2_filter::{Error, MAX_DEPTH};

fn parse(input: &str) -> Expr {
    parse_text(input).unwrap()
}

fn text_error(input: &str) -> cql2_filter::ParseTextError {
    match parse_text(input) {
        Err(Error::Text(e)) => e,
        other => panic!("expected a text parse error, got {:?}", other),
    }
}

// ============================================================================
// Precedence and structure
// ============================================================================

#[test]
fn test_comparison() {
    let expr = parse("depth > 100");
    assert!(matches!(expr, Expr::Binary { ref op, .. } if op.json() == ">"));
}

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    // Should be: Add(1, Multiply(2, 3))
    let expr = parse("1 + 2 * 3");
    match expr {
        Expr::Binary { op, left, right } => {
            assert_eq!(op.json(), "+");
            assert!(matches!(*left, Expr::Literal(Scalar::Number(n)) if n == 1.0));
            match *right {
                Expr::Binary { op, left, right } => {
                    assert_eq!(op.json(), "*");
                    assert!(matches!(*left, Expr::Literal(Scalar::Number(n)) if n == 2.0));
                    assert!(matches!(*right, Expr::Literal(Scalar::Number(n)) if n == 3.0));
                }
                _ => panic!("Expected multiplication"),
            }
        }
        _ => panic!("Expected addition"),
    }
}

#[test]
fn test_grouping_overrides_precedence() {
    let expr = parse("(1 + 2) * 3");
    match expr {
        Expr::Binary { op, left, .. } => {
            assert_eq!(op.json(), "*");
            assert!(matches!(*left, Expr::Grouping(_)));
        }
        _ => panic!("Expected multiplication"),
    }
}

#[test]
fn test_and_binds_tighter_than_or() {
    let expr = parse("a = 1 OR b = 2 AND c = 3");
    match expr {
        Expr::Binary { op, right, .. } => {
            assert_eq!(op.json(), "or");
            assert!(matches!(*right, Expr::Binary { ref op, .. } if op.json() == "and"));
        }
        _ => panic!("Expected OR at the root"),
    }
}

#[test]
fn test_exponent_is_right_associative() {
    let expr = parse("2 ^ 3 ^ 2");
    match expr {
        Expr::Binary { op, left, right } => {
            assert_eq!(op.json(), "^");
            assert!(matches!(*left, Expr::Literal(Scalar::Number(n)) if n == 2.0));
            assert!(matches!(*right, Expr::Binary { ref op, .. } if op.json() == "^"));
        }
        _ => panic!("Expected exponentiation"),
    }
}

#[test]
fn test_modulo_and_integer_division() {
    let expr = parse("value % 2 = 0");
    match expr {
        Expr::Binary { op, left, .. } => {
            assert_eq!(op.json(), "=");
            assert!(matches!(*left, Expr::Binary { ref op, .. } if op.json() == "%"));
        }
        _ => panic!("Expected equality"),
    }

    let expr = parse("value DIV 10");
    assert!(matches!(expr, Expr::Binary { ref op, .. } if op.json() == "div"));
}

#[test]
fn test_not_prefix() {
    let expr = parse("NOT started");
    match expr {
        Expr::Unary { op, operand } => {
            assert_eq!(op.json(), "not");
            assert!(matches!(*operand, Expr::Property(ref name) if name == "started"));
        }
        _ => panic!("Expected NOT"),
    }
}

// ============================================================================
// Literals and primaries
// ============================================================================

#[test]
fn test_literals() {
    assert!(matches!(parse("42"), Expr::Literal(Scalar::Number(n)) if n == 42.0));
    assert!(matches!(parse("'x'"), Expr::Literal(Scalar::String(ref s)) if s == "x"));
    assert!(matches!(parse("TRUE"), Expr::Literal(Scalar::Boolean(true))));
    assert!(matches!(parse("NULL"), Expr::Literal(Scalar::Null)));
}

#[test]
fn test_property_reference() {
    assert!(matches!(parse("cityName"), Expr::Property(ref name) if name == "cityName"));
}

#[test]
fn test_function_call() {
    let expr = parse("avg(windSpeed)");
    match expr {
        Expr::Function { op, args } => {
            assert_eq!(op.json(), "avg");
            assert_eq!(args.len(), 1);
        }
        _ => panic!("Expected function call"),
    }
}

#[test]
fn test_function_call_no_args() {
    let expr = parse("now()");
    assert!(matches!(expr, Expr::Function { ref args, .. } if args.is_empty()));
}

#[test]
fn test_empty_parens_are_an_empty_array() {
    assert!(matches!(parse("()"), Expr::Array(ref items) if items.is_empty()));
}

#[test]
fn test_comma_list_is_an_array() {
    let expr = parse("(1, 2, 3)");
    assert!(matches!(expr, Expr::Array(ref items) if items.len() == 3));
}

#[test]
fn test_single_parenthesized_expression_is_a_grouping() {
    assert!(matches!(parse("(1)"), Expr::Grouping(_)));
}

#[test]
fn test_date_literal() {
    let expr = parse("DATE('2020-02-29')");
    assert!(matches!(expr, Expr::Literal(Scalar::Date(ref d)) if d == "2020-02-29"));
}

#[test]
fn test_timestamp_literal() {
    let expr = parse("TIMESTAMP('2020-01-01T12:31:22.483Z')");
    assert!(matches!(expr, Expr::Literal(Scalar::Timestamp(_))));
}

#[test]
fn test_interval_with_open_end() {
    let expr = parse("INTERVAL('2020-01-01', '..')");
    match expr {
        Expr::Interval { start, end } => {
            assert!(matches!(start, IntervalEnd::At(_)));
            assert_eq!(end, IntervalEnd::Open);
        }
        _ => panic!("Expected interval"),
    }
}

#[test]
fn test_interval_bound_must_be_temporal() {
    let err = text_error("INTERVAL('soon', '..')");
    assert!(err.message.contains("'soon'"));
}

// ============================================================================
// Advanced comparisons
// ============================================================================

#[test]
fn test_like() {
    let expr = parse("name LIKE 'To%'");
    match expr {
        Expr::AdvancedComparison { op, args, negate } => {
            assert_eq!(op.json(), "like");
            assert_eq!(args.len(), 2);
            assert!(!negate);
        }
        _ => panic!("Expected LIKE"),
    }
}

#[test]
fn test_not_like() {
    let expr = parse("name NOT LIKE 'To%'");
    assert!(matches!(expr, Expr::AdvancedComparison { negate: true, .. }));
}

#[test]
fn test_between() {
    let expr = parse("depth BETWEEN 100 AND 150");
    match expr {
        Expr::AdvancedComparison { op, args, negate } => {
            assert_eq!(op.json(), "between");
            assert_eq!(args.len(), 3);
            assert!(!negate);
        }
        _ => panic!("Expected BETWEEN"),
    }
}

#[test]
fn test_between_interacts_with_logical_and() {
    // The AND inside BETWEEN belongs to BETWEEN; the outer one is logical.
    let expr = parse("depth BETWEEN 100 AND 150 AND started");
    assert!(matches!(expr, Expr::Binary { ref op, .. } if op.json() == "and"));
}

#[test]
fn test_in_list_becomes_array_argument() {
    let expr = parse("cityName IN ('Toronto', 'Frankfurt')");
    match expr {
        Expr::AdvancedComparison { op, args, .. } => {
            assert_eq!(op.json(), "in");
            assert!(matches!(args[1], Expr::Array(ref items) if items.len() == 2));
        }
        _ => panic!("Expected IN"),
    }
}

#[test]
fn test_not_in() {
    let expr = parse("code NOT IN (1, 2)");
    assert!(matches!(expr, Expr::AdvancedComparison { negate: true, .. }));
}

#[test]
fn test_dangling_not_without_advanced_comparison() {
    let err = text_error("depth NOT 4");
    assert!(err.message.contains("LIKE, BETWEEN or IN"));
}

// ============================================================================
// IS NULL
// ============================================================================

#[test]
fn test_is_null() {
    let expr = parse("geometry IS NULL");
    assert!(matches!(expr, Expr::IsNull { negate: false, .. }));
}

#[test]
fn test_is_not_null() {
    let expr = parse("geometry IS NOT NULL");
    assert!(matches!(expr, Expr::IsNull { negate: true, .. }));
}

#[test]
fn test_is_without_null() {
    let err = text_error("geometry IS 4");
    assert!(err.message.contains("NULL"));
}

// ============================================================================
// Insensitivity wrappers
// ============================================================================

#[test]
fn test_casei_wrapper() {
    let expr = parse("CASEI(road_class) = CASEI('Main')");
    match expr {
        Expr::Binary { left, .. } => match *left {
            Expr::Unary { op, .. } => assert_eq!(op.json(), "casei"),
            _ => panic!("Expected CASEI"),
        },
        _ => panic!("Expected equality"),
    }
}

#[test]
fn test_accenti_wrapper() {
    let expr = parse("ACCENTI(name)");
    assert!(matches!(expr, Expr::Unary { ref op, .. } if op.json() == "accenti"));
}

// ============================================================================
// Spatial literals
// ============================================================================

#[test]
fn test_point() {
    let expr = parse("POINT(43.5845 -79.5442)");
    match expr {
        Expr::Geometry { kind, coords } => {
            assert_eq!(kind, GeometryKind::Point);
            assert_eq!(coords.len(), 2);
            assert!(matches!(coords[1], Expr::Literal(Scalar::Number(n)) if n == -79.5442));
        }
        _ => panic!("Expected point"),
    }
}

#[test]
fn test_point_with_elevation() {
    let expr = parse("POINT(1 2 3)");
    assert!(matches!(expr, Expr::Geometry { ref coords, .. } if coords.len() == 3));
}

#[test]
fn test_point_rejects_four_coordinates() {
    let err = text_error("POINT(1 2 3 4)");
    assert!(err.message.contains("2 or 3"));
}

#[test]
fn test_linestring() {
    let expr = parse("LINESTRING(0 0, 1 1, 2 0)");
    match expr {
        Expr::Geometry { kind, coords } => {
            assert_eq!(kind, GeometryKind::LineString);
            assert_eq!(coords.len(), 3);
            assert!(matches!(coords[0], Expr::Array(ref pos) if pos.len() == 2));
        }
        _ => panic!("Expected linestring"),
    }
}

#[test]
fn test_polygon_has_rings() {
    let expr = parse("POLYGON((0 0, 4 0, 4 4, 0 0))");
    match expr {
        Expr::Geometry { kind, coords } => {
            assert_eq!(kind, GeometryKind::Polygon);
            assert_eq!(coords.len(), 1);
            match &coords[0] {
                Expr::Array(ring) => assert_eq!(ring.len(), 4),
                _ => panic!("Expected ring"),
            }
        }
        _ => panic!("Expected polygon"),
    }
}

#[test]
fn test_multipolygon_nests_one_deeper() {
    let expr = parse("MULTIPOLYGON(((0 0, 1 0, 1 1, 0 0)), ((5 5, 6 5, 6 6, 5 5)))");
    match expr {
        Expr::Geometry { kind, coords } => {
            assert_eq!(kind, GeometryKind::MultiPolygon);
            assert_eq!(coords.len(), 2);
        }
        _ => panic!("Expected multipolygon"),
    }
}

#[test]
fn test_geometry_collection() {
    let expr = parse("GEOMETRYCOLLECTION(POINT(1 2), LINESTRING(0 0, 1 1))");
    match expr {
        Expr::GeometryCollection(members) => {
            assert_eq!(members.len(), 2);
            assert!(matches!(
                members[0],
                Expr::Geometry {
                    kind: GeometryKind::Point,
                    ..
                }
            ));
        }
        _ => panic!("Expected collection"),
    }
}

#[test]
fn test_geometry_collection_rejects_non_geometry() {
    let err = text_error("GEOMETRYCOLLECTION(4)");
    assert!(err.message.contains("geometry"));
}

#[test]
fn test_bbox() {
    let expr = parse("BBOX(-140.99778, 41.6751050889, -52.6480987209, 83.23324)");
    assert!(matches!(expr, Expr::BBox(ref values) if values.len() == 4));
}

#[test]
fn test_bbox_with_six_numbers() {
    let expr = parse("BBOX(0, 0, 0, 1, 1, 1)");
    assert!(matches!(expr, Expr::BBox(ref values) if values.len() == 6));
}

#[test]
fn test_bbox_rejects_five_numbers() {
    let err = text_error("BBOX(1, 2, 3, 4, 5)");
    assert!(err.message.contains("4 or 6"));
}

#[test]
fn test_spatial_predicate_is_a_plain_function() {
    let expr = parse("s_intersects(geometry, POINT(1 2))");
    match expr {
        Expr::Function { op, args } => {
            assert_eq!(op.json(), "s_intersects");
            assert_eq!(args.len(), 2);
            assert!(matches!(args[1], Expr::Geometry { .. }));
        }
        _ => panic!("Expected function"),
    }
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_lone_open_paren_reports_index_zero() {
    let err = text_error("(");
    assert_eq!(err.token.offset, 0);
}

#[test]
fn test_error_message_shape() {
    let err = text_error("depth >");
    assert!(err.to_string().ends_with("at character index 6."));
}

#[test]
fn test_trailing_input_is_an_error() {
    let err = text_error("1 2");
    assert!(err.message.contains("end of input"));
}

#[test]
fn test_unclosed_function_call() {
    let err = text_error("avg(windSpeed");
    assert!(err.message.contains("')'"));
}

#[test]
fn test_nesting_depth_is_bounded() {
    let deep = format!("{}1{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
    let err = text_error(&deep);
    assert!(err.message.contains("nesting"));
}

#[test]
fn test_geometry_collection_nesting_is_bounded() {
    let deep = format!(
        "{}POINT(1 2){}",
        "GEOMETRYCOLLECTION(".repeat(MAX_DEPTH + 1),
        ")".repeat(MAX_DEPTH + 1)
    );
    let err = text_error(&deep);
    assert!(err.message.contains("nesting"));
}

// ============================================================================
// Operator metadata
// ============================================================================

#[test]
fn test_registry_precedence_ordering() {
    assert!(Operator::new("or").precedence() < Operator::new("and").precedence());
    assert!(Operator::new("and").precedence() < Operator::new("=").precedence());
    assert!(Operator::new("+").precedence() < Operator::new("*").precedence());
    assert!(Operator::new("*").precedence() < Operator::new("^").precedence());
}

#[test]
fn test_registry_spellings() {
    let op = Operator::new("div");
    assert_eq!(op.text(), "DIV");
    assert_eq!(op.json(), "div");
    assert_eq!(op.arity(), 2);
}

#[test]
fn test_unknown_operator_falls_back_to_variadic_function() {
    use cql2_filter::ast::Notation;
    let op = Operator::new("add");
    assert!(!op.is_registered());
    assert_eq!(op.arity(), 0);
    assert_eq!(op.notation(), Notation::Function);
    assert_eq!(op.text(), "add");
}

#[test]
fn test_exponent_associativity() {
    use cql2_filter::ast::Associativity;
    assert_eq!(Operator::new("^").associativity(), Associativity::Right);
    assert_eq!(Operator::new("+").associativity(), Associativity::Left);
}

// ============================================================================
// Visitor dispatch
// ============================================================================

struct PropertyCollector(Vec<String>);

impl Visitor for PropertyCollector {
    fn visit_property(&mut self, name: &str, _ctx: Option<&()>) {
        self.0.push(name.to_string());
    }

    fn visit_binary(&mut self, _op: &Operator, left: &Expr, right: &Expr, ctx: Option<&()>) {
        left.accept(self, ctx);
        right.accept(self, ctx);
    }

    fn visit_advanced_comparison(
        &mut self,
        _op: &Operator,
        args: &[Expr],
        _negate: bool,
        ctx: Option<&()>,
    ) {
        for arg in args {
            arg.accept(self, ctx);
        }
    }
}

#[test]
fn test_visitor_collects_properties_left_to_right() {
    let expr = parse("depth BETWEEN lower AND upper OR speed > 4");
    let mut collector = PropertyCollector(Vec::new());
    expr.accept(&mut collector, None);
    assert_eq!(collector.0, vec!["depth", "lower", "upper", "speed"]);
}
