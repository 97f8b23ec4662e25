//! Serialization of expressions back to the two CQL2 encodings.
//!
//! The Text form is canonical: one space around infix operators, no space
//! after a function's opening parenthesis, `", "` between arguments, and
//! single-quoted strings. Parsing canonical text and serializing again
//! reproduces it byte for byte.
//!
//! The JSON form follows the CQL2 JSON encoding: `{"op": ..., "args": ...}`
//! nodes, `{"property": ...}` references, tagged temporal objects, and
//! GeoJSON-shaped geometry. Groupings vanish in JSON, which has no
//! parenthesis concept; negated nodes serialize as their plain form wrapped
//! in `{"op": "not", ...}`.

use serde_json::{Value, json};

use crate::ast::{Expr, IntervalEnd, Notation, Operator, Scalar};

/// Render a number without a trailing `.0` when it is integral.
fn number_text(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 9e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Integral numbers become JSON integers, everything else stays a float.
fn number_json(n: f64) -> Value {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 9e15 {
        json!(n as i64)
    } else {
        json!(n)
    }
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn scalar_text(scalar: &Scalar) -> String {
    match scalar {
        Scalar::String(s) => quote(s),
        Scalar::Number(n) => number_text(*n),
        Scalar::Boolean(true) => "TRUE".to_string(),
        Scalar::Boolean(false) => "FALSE".to_string(),
        Scalar::Null => "NULL".to_string(),
        Scalar::Date(d) => format!("DATE({})", quote(d)),
        Scalar::Timestamp(t) => format!("TIMESTAMP({})", quote(t)),
    }
}

fn scalar_json(scalar: &Scalar) -> Value {
    match scalar {
        Scalar::String(s) => json!(s),
        Scalar::Number(n) => number_json(*n),
        Scalar::Boolean(b) => json!(b),
        Scalar::Null => Value::Null,
        Scalar::Date(d) => json!({ "date": d }),
        Scalar::Timestamp(t) => json!({ "timestamp": t }),
    }
}

/// One left-to-right pass over the template; substituted operand text is
/// never re-scanned, so operands containing `{N}` pass through untouched.
fn fill_template(template: &str, operands: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let bytes = template.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'{'
            && i + 2 < bytes.len()
            && bytes[i + 1].is_ascii_digit()
            && bytes[i + 2] == b'}'
        {
            let index = (bytes[i + 1] - b'0') as usize;
            if let Some(operand) = operands.get(index) {
                out.push_str(operand);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i] as char);
        i += 1;
    }
    out
}

/// Apply an operator's text-format rule, inserting `NOT` before the spelling
/// when the node is negated.
fn op_text(op: &Operator, operands: &[String], negate: bool) -> String {
    match op.template() {
        Some(template) => {
            let template = if negate {
                template.replacen(op.text(), &format!("NOT {}", op.text()), 1)
            } else {
                template.to_string()
            };
            fill_template(&template, operands)
        }
        None => format!("{}({})", op.text(), operands.join(", ")),
    }
}

/// Interval bounds are bare quoted strings in text and bare strings in JSON,
/// without the `DATE(...)` / `{"date": ...}` wrappers.
fn interval_end_text(end: &IntervalEnd) -> String {
    match end {
        IntervalEnd::Open => "'..'".to_string(),
        IntervalEnd::At(expr) => match expr.as_ref() {
            Expr::Literal(Scalar::Date(d)) => quote(d),
            Expr::Literal(Scalar::Timestamp(t)) => quote(t),
            other => other.to_text(),
        },
    }
}

fn interval_end_json(end: &IntervalEnd) -> Value {
    match end {
        IntervalEnd::Open => json!(".."),
        IntervalEnd::At(expr) => match expr.as_ref() {
            Expr::Literal(Scalar::Date(d)) => json!(d),
            Expr::Literal(Scalar::Timestamp(t)) => json!(t),
            other => other.to_json(),
        },
    }
}

/// Geometry coordinates, `depth` levels of list nesting above bare numbers.
fn coords_text(coords: &[Expr], depth: usize) -> String {
    if depth == 0 {
        return coords
            .iter()
            .map(|c| match c {
                Expr::Literal(Scalar::Number(n)) => number_text(*n),
                other => other.to_text(),
            })
            .collect::<Vec<_>>()
            .join(" ");
    }
    coords
        .iter()
        .map(|item| {
            let inner = match item {
                Expr::Array(items) => coords_text(items, depth - 1),
                other => other.to_text(),
            };
            if depth == 1 {
                inner
            } else {
                format!("({})", inner)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn coords_json(coords: &[Expr]) -> Value {
    Value::Array(
        coords
            .iter()
            .map(|c| match c {
                Expr::Literal(Scalar::Number(n)) => number_json(*n),
                Expr::Array(items) => coords_json(items),
                other => other.to_json(),
            })
            .collect(),
    )
}

impl Expr {
    /// Serialize to canonical CQL2 Text.
    pub fn to_text(&self) -> String {
        match self {
            Expr::Literal(scalar) => scalar_text(scalar),
            Expr::Property(name) => name.clone(),
            Expr::Unary { op, operand } => op_text(op, &[operand.to_text()], false),
            Expr::Binary { op, left, right } => {
                op_text(op, &[left.to_text(), right.to_text()], false)
            }
            Expr::Function { op, args } => {
                let rendered: Vec<String> = args.iter().map(Expr::to_text).collect();
                match op.notation() {
                    Notation::Function => format!("{}({})", op.text(), rendered.join(", ")),
                    _ => op_text(op, &rendered, false),
                }
            }
            Expr::AdvancedComparison { op, args, negate } => {
                let rendered: Vec<String> = args.iter().map(Expr::to_text).collect();
                op_text(op, &rendered, *negate)
            }
            Expr::Grouping(inner) => format!("({})", inner.to_text()),
            Expr::Array(items) => {
                let rendered: Vec<String> = items.iter().map(Expr::to_text).collect();
                format!("({})", rendered.join(", "))
            }
            Expr::Interval { start, end } => format!(
                "INTERVAL({}, {})",
                interval_end_text(start),
                interval_end_text(end)
            ),
            Expr::BBox(values) => {
                let rendered: Vec<String> = values.iter().map(Expr::to_text).collect();
                format!("BBOX({})", rendered.join(", "))
            }
            Expr::Geometry { kind, coords } => {
                format!("{}({})", kind.tag(), coords_text(coords, kind.depth()))
            }
            Expr::GeometryCollection(members) => {
                let rendered: Vec<String> = members.iter().map(Expr::to_text).collect();
                format!("GEOMETRYCOLLECTION({})", rendered.join(", "))
            }
            Expr::IsNull { expr, negate } => format!(
                "{} IS {}NULL",
                expr.to_text(),
                if *negate { "NOT " } else { "" }
            ),
        }
    }

    /// Serialize to the CQL2 JSON encoding.
    pub fn to_json(&self) -> Value {
        match self {
            Expr::Literal(scalar) => scalar_json(scalar),
            Expr::Property(name) => json!({ "property": name }),
            Expr::Unary { op, operand } => json!({
                "op": op.json(),
                "args": [operand.to_json()],
            }),
            Expr::Binary { op, left, right } => json!({
                "op": op.json(),
                "args": [left.to_json(), right.to_json()],
            }),
            Expr::Function { op, args } => json!({
                "op": op.json(),
                "args": args.iter().map(Expr::to_json).collect::<Vec<_>>(),
            }),
            Expr::AdvancedComparison { op, args, negate } => {
                let plain = json!({
                    "op": op.json(),
                    "args": args.iter().map(Expr::to_json).collect::<Vec<_>>(),
                });
                if *negate {
                    json!({ "op": "not", "args": [plain] })
                } else {
                    plain
                }
            }
            Expr::Grouping(inner) => inner.to_json(),
            Expr::Array(items) => {
                Value::Array(items.iter().map(Expr::to_json).collect())
            }
            Expr::Interval { start, end } => json!({
                "interval": [interval_end_json(start), interval_end_json(end)],
            }),
            Expr::BBox(values) => json!({
                "bbox": values.iter().map(Expr::to_json).collect::<Vec<_>>(),
            }),
            Expr::Geometry { kind, coords } => json!({
                "type": kind.type_name(),
                "coordinates": coords_json(coords),
            }),
            Expr::GeometryCollection(members) => json!({
                "type": "GeometryCollection",
                "geometries": members.iter().map(Expr::to_json).collect::<Vec<_>>(),
            }),
            Expr::IsNull { expr, negate } => {
                let plain = json!({ "op": "isNull", "args": [expr.to_json()] });
                if *negate {
                    json!({ "op": "not", "args": [plain] })
                } else {
                    plain
                }
            }
        }
    }
}
