//! Interactive form fields, using the same tagged-union shape as
//! annotations.

use crate::object::{Dictionary, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum FormField {
    Text {
        name: String,
        rect: (f64, f64, f64, f64),
        value: String,
        max_len: Option<u32>,
    },
    Checkbox {
        name: String,
        rect: (f64, f64, f64, f64),
        checked: bool,
    },
    Choice {
        name: String,
        rect: (f64, f64, f64, f64),
        options: Vec<String>,
        selected: Option<usize>,
    },
}

impl FormField {
    pub fn to_dict(&self) -> Dictionary {
        let mut dict = Dictionary::new();
        dict.set("Type", "Annot");
        dict.set("Subtype", "Widget");
        match self {
            FormField::Text { name, rect, value, max_len } => {
                dict.set("FT", "Tx");
                dict.set("T", Value::LiteralString(name.clone().into_bytes()));
                set_rect(&mut dict, *rect);
                dict.set("V", Value::LiteralString(value.clone().into_bytes()));
                if let Some(max) = max_len {
                    dict.set("MaxLen", Value::Integer(*max as i64));
                }
            }
            FormField::Checkbox { name, rect, checked } => {
                dict.set("FT", "Btn");
                dict.set("T", Value::LiteralString(name.clone().into_bytes()));
                set_rect(&mut dict, *rect);
                dict.set("V", if *checked { "Yes" } else { "Off" });
                dict.set("AS", if *checked { "Yes" } else { "Off" });
            }
            FormField::Choice { name, rect, options, selected } => {
                dict.set("FT", "Ch");
                dict.set("T", Value::LiteralString(name.clone().into_bytes()));
                set_rect(&mut dict, *rect);
                let option_values: Vec<Value> = options
                    .iter()
                    .map(|o| Value::LiteralString(o.clone().into_bytes()))
                    .collect();
                dict.set("Opt", Value::Array(option_values));
                if let Some(index) = selected {
                    if let Some(label) = options.get(*index) {
                        dict.set("V", Value::LiteralString(label.clone().into_bytes()));
                    }
                }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkbox_sets_matching_v_and_as() {
        let field = FormField::Checkbox {
            name: "agree".to_string(),
            rect: (0.0, 0.0, 10.0, 10.0),
            checked: true,
        };
        let dict = field.to_dict();
        assert_eq!(dict.get("V"), dict.get("AS"));
    }
}
