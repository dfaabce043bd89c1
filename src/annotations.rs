//! Page annotations, represented as a tagged variant per kind with a
//! single `to_dict` match, following the same encoding idiom as
//! `src/object/value.rs`.

use crate::object::{Dictionary, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    Text {
        rect: (f64, f64, f64, f64),
        contents: String,
        open: bool,
    },
    Link {
        rect: (f64, f64, f64, f64),
        uri: String,
    },
    FreeText {
        rect: (f64, f64, f64, f64),
        contents: String,
    },
    Highlight {
        quad_points: Vec<(f64, f64)>,
        color: (f64, f64, f64),
    },
}

impl Annotation {
    pub fn to_dict(&self) -> Dictionary {
        let mut dict = Dictionary::new();
        dict.set("Type", "Annot");
        match self {
            Annotation::Text { rect, contents, open } => {
                dict.set("Subtype", "Text");
                set_rect(&mut dict, *rect);
                dict.set("Contents", Value::LiteralString(contents.clone().into_bytes()));
                dict.set("Open", *open);
            }
            Annotation::Link { rect, uri } => {
                dict.set("Subtype", "Link");
                set_rect(&mut dict, *rect);
                let mut action = Dictionary::new();
                action.set("Type", "Action");
                action.set("S", "URI");
                action.set("URI", Value::LiteralString(uri.clone().into_bytes()));
                dict.set("A", Value::Dict(action));
            }
            Annotation::FreeText { rect, contents } => {
                dict.set("Subtype", "FreeText");
                set_rect(&mut dict, *rect);
                dict.set("Contents", Value::LiteralString(contents.clone().into_bytes()));
            }
            Annotation::Highlight { quad_points, color } => {
                dict.set("Subtype", "Highlight");
                let bounds = bounding_rect(quad_points);
                set_rect(&mut dict, bounds);
                let quads: Vec<Value> = quad_points
                    .iter()
                    .flat_map(|(x, y)| {
                        [Value::number(*x).unwrap_or(Value::Integer(0)), Value::number(*y).unwrap_or(Value::Integer(0))]
                    })
                    .collect();
                dict.set("QuadPoints", Value::Array(quads));
                let (r, g, b) = *color;
                dict.set(
                    "C",
                    Value::Array(vec![
                        Value::number(r).unwrap_or(Value::Integer(0)),
                        Value::number(g).unwrap_or(Value::Integer(0)),
                        Value::number(b).unwrap_or(Value::Integer(0)),
                    ]),
                );
            }
        }
        dict
    }
}

fn set_rect(dict: &mut Dictionary, rect: (f64, f64, f64, f64)) {
    let (x0, y0, x1, y1) = rect;
    dict.set(
        "Rect",
        Value::Array(vec![
            Value::number(x0).unwrap_or(Value::Integer(0)),
            Value::number(y0).unwrap_or(Value::Integer(0)),
            Value::number(x1).unwrap_or(Value::Integer(0)),
            Value::number(y1).unwrap_or(Value::Integer(0)),
        ]),
    );
}

fn bounding_rect(points: &[(f64, f64)]) -> (f64, f64, f64, f64) {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(x, y) in points {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    if points.is_empty() {
        (0.0, 0.0, 0.0, 0.0)
    } else {
        (min_x, min_y, max_x, max_y)
    }
}
