//! CQL2 JSON encoding -> AST.
//!
//! Structural, depth-first mapping over an already-decoded
//! [`serde_json::Value`], children before parents, left to right. Produces
//! the same node shapes as the text parser for equivalent input, so the two
//! encodings stay interchangeable.

use serde_json::Value;

use crate::ast::{Expr, GeometryKind, IntervalEnd, Operator, Scalar};
use crate::parser::MAX_DEPTH;
use crate::temporal;

/// One step from a JSON node to one of its children.
#[derive(Debug, Clone, PartialEq)]
pub enum PathStep {
    Key(String),
    Index(usize),
}

/// Location of a node in the input document, from the root down.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JsonPath(pub Vec<PathStep>);

impl std::fmt::Display for JsonPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "$")?;
        for step in &self.0 {
            match step {
                PathStep::Key(key) => write!(f, ".{}", key)?,
                PathStep::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// Structural violation in CQL2 JSON input, located by path.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseJsonError {
    pub path: JsonPath,
    pub message: String,
}

impl std::fmt::Display for ParseJsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}.", self.message, self.path)
    }
}

impl std::error::Error for ParseJsonError {}

/// Map a JSON value to an expression tree.
pub fn from_json(value: &Value) -> Result<Expr, ParseJsonError> {
    let mut path = Vec::new();
    convert(value, &mut path)
}

fn fail<T>(path: &[PathStep], message: impl Into<String>) -> Result<T, ParseJsonError> {
    Err(ParseJsonError {
        path: JsonPath(path.to_vec()),
        message: message.into(),
    })
}

fn convert(value: &Value, path: &mut Vec<PathStep>) -> Result<Expr, ParseJsonError> {
    if path.len() >= MAX_DEPTH {
        return fail(path, format!("Expression nesting exceeds {} levels", MAX_DEPTH));
    }

    match value {
        Value::Null => Ok(Expr::Literal(Scalar::Null)),
        Value::Bool(b) => Ok(Expr::Literal(Scalar::Boolean(*b))),
        Value::Number(n) => match n.as_f64() {
            Some(n) => Ok(Expr::Literal(Scalar::Number(n))),
            None => fail(path, format!("Unrepresentable number {}", n)),
        },
        Value::String(s) => Ok(Expr::Literal(Scalar::String(s.clone()))),
        Value::Array(items) => {
            let mut converted = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                path.push(PathStep::Index(index));
                converted.push(convert(item, path)?);
                path.pop();
            }
            Ok(Expr::Array(converted))
        }
        Value::Object(map) => {
            if let Some(property) = map.get("property") {
                return match property.as_str() {
                    Some(name) => Ok(Expr::Property(name.to_string())),
                    None => fail(path, format!("Expected a string 'property' in {}", value)),
                };
            }
            if map.contains_key("date") || map.contains_key("timestamp") {
                return convert_temporal(value, map, path);
            }
            if let Some(interval) = map.get("interval") {
                return convert_interval(interval, path);
            }
            if let Some(bbox) = map.get("bbox") {
                return convert_bbox(bbox, path);
            }
            if map.contains_key("type") {
                return convert_geometry(value, map, path);
            }
            convert_operation(value, map, path)
        }
    }
}

fn convert_temporal(
    value: &Value,
    map: &serde_json::Map<String, Value>,
    path: &mut Vec<PathStep>,
) -> Result<Expr, ParseJsonError> {
    let (key, decode): (_, fn(&str) -> Result<Scalar, String>) = if map.contains_key("date") {
        ("date", temporal::decode_date)
    } else {
        ("timestamp", temporal::decode_timestamp)
    };
    let Some(text) = map.get(key).and_then(Value::as_str) else {
        return fail(path, format!("Expected a string '{}' in {}", key, value));
    };
    path.push(PathStep::Key(key.to_string()));
    let result = match decode(text) {
        Ok(scalar) => Ok(Expr::Literal(scalar)),
        Err(message) => fail(path, message),
    };
    path.pop();
    result
}

fn convert_interval(bounds: &Value, path: &mut Vec<PathStep>) -> Result<Expr, ParseJsonError> {
    path.push(PathStep::Key("interval".to_string()));
    let result = interval_from(bounds, path);
    path.pop();
    result
}

fn interval_from(bounds: &Value, path: &mut Vec<PathStep>) -> Result<Expr, ParseJsonError> {
    let Some(items) = bounds.as_array() else {
        return fail(path, format!("Expected an array of two bounds, got {}", bounds));
    };
    if items.len() != 2 {
        return fail(path, format!("Expected an array of two bounds, got {}", bounds));
    }
    let mut ends = Vec::with_capacity(2);
    for (index, bound) in items.iter().enumerate() {
        path.push(PathStep::Index(index));
        let end = match bound.as_str() {
            Some("..") => IntervalEnd::Open,
            Some(text) => match temporal::decode_temporal(text) {
                Ok(scalar) => IntervalEnd::At(Box::new(Expr::Literal(scalar))),
                Err(message) => return fail(path, message),
            },
            None => return fail(path, format!("Expected a string bound, got {}", bound)),
        };
        path.pop();
        ends.push(end);
    }
    let end = ends.pop().unwrap_or(IntervalEnd::Open);
    let start = ends.pop().unwrap_or(IntervalEnd::Open);
    Ok(Expr::Interval { start, end })
}

fn convert_bbox(bbox: &Value, path: &mut Vec<PathStep>) -> Result<Expr, ParseJsonError> {
    path.push(PathStep::Key("bbox".to_string()));
    let values = match bbox.as_array() {
        Some(items) if items.len() == 4 || items.len() == 6 => items,
        _ => return fail(path, format!("Expected 4 or 6 numbers in bbox, got {}", bbox)),
    };
    let mut converted = Vec::with_capacity(values.len());
    for (index, item) in values.iter().enumerate() {
        match item.as_f64() {
            Some(n) => converted.push(Expr::Literal(Scalar::Number(n))),
            None => {
                path.push(PathStep::Index(index));
                return fail(path, format!("Expected a number, got {}", item));
            }
        }
    }
    path.pop();
    Ok(Expr::BBox(converted))
}

fn convert_geometry(
    value: &Value,
    map: &serde_json::Map<String, Value>,
    path: &mut Vec<PathStep>,
) -> Result<Expr, ParseJsonError> {
    let Some(type_name) = map.get("type").and_then(Value::as_str) else {
        return fail(path, format!("Expected a string 'type' in {}", value));
    };

    if type_name == "GeometryCollection" {
        let Some(members) = map.get("geometries").and_then(Value::as_array) else {
            return fail(path, format!("Expected an array 'geometries' in {}", value));
        };
        path.push(PathStep::Key("geometries".to_string()));
        let mut converted = Vec::with_capacity(members.len());
        for (index, member) in members.iter().enumerate() {
            path.push(PathStep::Index(index));
            converted.push(convert(member, path)?);
            path.pop();
        }
        path.pop();
        return Ok(Expr::GeometryCollection(converted));
    }

    let Some(kind) = GeometryKind::from_type_name(type_name) else {
        return fail(path, format!("Unknown geometry type '{}'", type_name));
    };
    let Some(coordinates) = map.get("coordinates") else {
        return fail(path, format!("Expected 'coordinates' in {}", value));
    };
    path.push(PathStep::Key("coordinates".to_string()));
    let coords = positions(coordinates, kind.depth(), path)?;
    path.pop();
    Ok(Expr::Geometry { kind, coords })
}

/// Coordinate lists, `depth` levels of nesting above a bare position.
fn positions(
    value: &Value,
    depth: usize,
    path: &mut Vec<PathStep>,
) -> Result<Vec<Expr>, ParseJsonError> {
    let Some(items) = value.as_array() else {
        return fail(path, format!("Expected a coordinate array, got {}", value));
    };
    if depth == 0 {
        if items.len() != 2 && items.len() != 3 {
            return fail(path, format!("Expected 2 or 3 coordinates, got {}", value));
        }
        let mut numbers = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match item.as_f64() {
                Some(n) => numbers.push(Expr::Literal(Scalar::Number(n))),
                None => {
                    path.push(PathStep::Index(index));
                    return fail(path, format!("Expected a number, got {}", item));
                }
            }
        }
        return Ok(numbers);
    }
    let mut lists = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        path.push(PathStep::Index(index));
        lists.push(Expr::Array(positions(item, depth - 1, path)?));
        path.pop();
    }
    Ok(lists)
}

/// The general `{"op": ..., "args": [...]}` case, with the special shapes
/// (isNull, negated advanced comparisons) checked first.
fn convert_operation(
    value: &Value,
    map: &serde_json::Map<String, Value>,
    path: &mut Vec<PathStep>,
) -> Result<Expr, ParseJsonError> {
    let op_name = match map.get("op") {
        Some(Value::String(name)) => name.as_str(),
        Some(other) => return fail(path, format!("Expected a string 'op', got {}", other)),
        None => return fail(path, format!("Missing 'op' in {}", value)),
    };
    let args = match map.get("args") {
        Some(Value::Array(args)) => args,
        Some(other) => return fail(path, format!("Expected an array 'args', got {}", other)),
        None => return fail(path, format!("Missing 'args' in {}", value)),
    };

    // not(isNull(x)) and not(like/between/in) fold into their operand's
    // negate flag instead of a wrapping Unary.
    if op_name == "not" && args.len() == 1 {
        if let Some(inner_op) = args[0].get("op").and_then(Value::as_str) {
            if matches!(inner_op, "isNull" | "like" | "between" | "in") {
                path.push(PathStep::Key("args".to_string()));
                path.push(PathStep::Index(0));
                let inner = convert(&args[0], path)?;
                path.pop();
                path.pop();
                return match inner {
                    Expr::IsNull { expr, .. } => Ok(Expr::IsNull { expr, negate: true }),
                    Expr::AdvancedComparison { op, args, .. } => Ok(Expr::AdvancedComparison {
                        op,
                        args,
                        negate: true,
                    }),
                    other => Ok(Expr::unary(Operator::new("not"), other)),
                };
            }
        }
    }

    if op_name == "isNull" {
        let mut converted = convert_args(value, op_name, args, 1, path)?;
        let expr = converted.pop().unwrap_or(Expr::Literal(Scalar::Null));
        return Ok(Expr::IsNull {
            expr: Box::new(expr),
            negate: false,
        });
    }

    if let Some(arity) = advanced_arity(op_name) {
        let converted = convert_args(value, op_name, args, arity, path)?;
        return Ok(Expr::AdvancedComparison {
            op: Operator::new(op_name),
            args: converted,
            negate: false,
        });
    }

    let op = Operator::new(op_name);
    match op.arity() {
        1 => {
            let mut converted = convert_args(value, op_name, args, 1, path)?;
            let operand = converted.pop().unwrap_or(Expr::Literal(Scalar::Null));
            Ok(Expr::unary(op, operand))
        }
        2 => {
            let mut converted = convert_args(value, op_name, args, 2, path)?;
            let right = converted.pop().unwrap_or(Expr::Literal(Scalar::Null));
            let left = converted.pop().unwrap_or(Expr::Literal(Scalar::Null));
            Ok(Expr::binary(left, op, right))
        }
        3 => {
            let converted = convert_args(value, op_name, args, 3, path)?;
            Ok(Expr::Function {
                op,
                args: converted,
            })
        }
        _ => {
            // Variadic: any argument count goes.
            let converted = convert_args(value, op_name, args, args.len(), path)?;
            Ok(Expr::Function {
                op,
                args: converted,
            })
        }
    }
}

/// Fixed arities of the advanced comparisons.
fn advanced_arity(op_name: &str) -> Option<usize> {
    match op_name {
        "like" => Some(2),
        "in" => Some(2),
        "between" => Some(3),
        _ => None,
    }
}

fn convert_args(
    value: &Value,
    op_name: &str,
    args: &[Value],
    expected: usize,
    path: &mut Vec<PathStep>,
) -> Result<Vec<Expr>, ParseJsonError> {
    if args.len() != expected {
        return fail(
            path,
            format!(
                "Operator '{}' expects {} arguments, got {} in {}",
                op_name,
                expected,
                args.len(),
                value
            ),
        );
    }
    path.push(PathStep::Key("args".to_string()));
    let mut converted = Vec::with_capacity(args.len());
    for (index, arg) in args.iter().enumerate() {
        path.push(PathStep::Index(index));
        converted.push(convert(arg, path)?);
        path.pop();
    }
    path.pop();
    Ok(converted)
}
