/*
 * helpers.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Default helper functions available to every template.
//!
//! These are ordinary user functions: they live in the default
//! [`FunctionRegistry`] and can be overridden by name.

use minijinja::value::{ValueKind, from_args};
use minijinja::{Error, ErrorKind, Value};
use once_cell::sync::Lazy;

use crate::functions::{FunctionRegistry, TemplateFunction};

static DEFAULT_FUNCTIONS: Lazy<FunctionRegistry> = Lazy::new(build_default_functions);

/// The helper library shared by every node that does not replace it.
///
/// Copies share their callables, so every default registry has the same
/// fingerprint and templates compiled against it are cached once.
pub fn default_functions() -> FunctionRegistry {
    DEFAULT_FUNCTIONS.clone()
}

fn build_default_functions() -> FunctionRegistry {
    let mut registry = FunctionRegistry::new();
    let mut add = |name: &str, f: TemplateFunction| {
        registry.insert(name, f);
    };

    add("safeHTML", string_fn(|s| Ok(Value::from_safe_string(s))));
    add("upper", string_fn(|s| Ok(Value::from(s.to_uppercase()))));
    add("lower", string_fn(|s| Ok(Value::from(s.to_lowercase()))));
    add("trimSpace", string_fn(|s| Ok(Value::from(s.trim()))));
    add("title", string_fn(|s| Ok(Value::from(title(&s)))));
    add("ucfirst", string_fn(|s| Ok(Value::from(ucfirst(&s)))));
    add(
        "urlencode",
        string_fn(|s| {
            Ok(Value::from(
                url::form_urlencoded::byte_serialize(s.as_bytes()).collect::<String>(),
            ))
        }),
    );
    add(
        "urldecode",
        string_fn(|s| {
            let decoded: String = url::form_urlencoded::parse(format!("v={s}").as_bytes())
                .map(|(_, v)| v.into_owned())
                .collect();
            Ok(Value::from(decoded))
        }),
    );
    add(
        "trim",
        TemplateFunction::new(|args| {
            let (s, cutset): (String, String) = from_args(args)?;
            Ok(Value::from(s.trim_matches(|c| cutset.contains(c))))
        }),
    );
    add(
        "trimPrefix",
        TemplateFunction::new(|args| {
            let (s, prefix): (String, String) = from_args(args)?;
            Ok(Value::from(s.strip_prefix(prefix.as_str()).unwrap_or(&s)))
        }),
    );
    add(
        "trimSuffix",
        TemplateFunction::new(|args| {
            let (s, suffix): (String, String) = from_args(args)?;
            Ok(Value::from(s.strip_suffix(suffix.as_str()).unwrap_or(&s)))
        }),
    );
    add(
        "contains",
        TemplateFunction::new(|args| {
            let (s, needle): (String, String) = from_args(args)?;
            Ok(Value::from(s.contains(needle.as_str())))
        }),
    );
    add(
        "containsAny",
        TemplateFunction::new(|args| {
            let (s, chars): (String, String) = from_args(args)?;
            Ok(Value::from(s.chars().any(|c| chars.contains(c))))
        }),
    );
    add(
        "hasPrefix",
        TemplateFunction::new(|args| {
            let (s, prefix): (String, String) = from_args(args)?;
            Ok(Value::from(s.starts_with(prefix.as_str())))
        }),
    );
    add(
        "hasSuffix",
        TemplateFunction::new(|args| {
            let (s, suffix): (String, String) = from_args(args)?;
            Ok(Value::from(s.ends_with(suffix.as_str())))
        }),
    );
    add(
        "repeat",
        TemplateFunction::new(|args| {
            let (s, count): (String, usize) = from_args(args)?;
            if s.len().checked_mul(count).is_none() {
                return Err(Error::new(
                    ErrorKind::InvalidOperation,
                    format!("repeat count {count} is too large"),
                ));
            }
            Ok(Value::from(s.repeat(count)))
        }),
    );
    add(
        "replace",
        TemplateFunction::new(|args| {
            let (s, old, new, n): (String, String, String, Option<i64>) = from_args(args)?;
            let replaced = match n {
                Some(n) if n >= 0 => s.replacen(old.as_str(), &new, n as usize),
                _ => s.replace(old.as_str(), &new),
            };
            Ok(Value::from(replaced))
        }),
    );
    add(
        "split",
        TemplateFunction::new(|args| {
            let (s, sep): (String, String) = from_args(args)?;
            let parts: Vec<Value> = s.split(sep.as_str()).map(Value::from).collect();
            Ok(Value::from(parts))
        }),
    );
    add(
        "join",
        TemplateFunction::new(|args| {
            let (items, sep): (Vec<Value>, String) = from_args(args)?;
            let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
            Ok(Value::from(parts.join(&sep)))
        }),
    );
    add(
        "stringSlice",
        TemplateFunction::new(|args| {
            let parts: Vec<Value> = args.iter().map(|v| Value::from(v.to_string())).collect();
            Ok(Value::from(parts))
        }),
    );
    add(
        "substr",
        TemplateFunction::new(|args| {
            let (s, start, length): (String, i64, i64) = from_args(args)?;
            Ok(Value::from(substr(&s, start, length)))
        }),
    );
    add(
        "compare",
        TemplateFunction::new(|args| {
            let (a, b): (String, String) = from_args(args)?;
            Ok(Value::from(a.cmp(&b) as i64))
        }),
    );
    add(
        "equalFold",
        TemplateFunction::new(|args| {
            let (a, b): (String, String) = from_args(args)?;
            Ok(Value::from(a.to_lowercase() == b.to_lowercase()))
        }),
    );
    add(
        "first",
        TemplateFunction::new(|args| {
            let (items,): (Vec<Value>,) = from_args(args)?;
            Ok(items.first().cloned().unwrap_or(Value::UNDEFINED))
        }),
    );
    add(
        "last",
        TemplateFunction::new(|args| {
            let (items,): (Vec<Value>,) = from_args(args)?;
            Ok(items.last().cloned().unwrap_or(Value::UNDEFINED))
        }),
    );
    add(
        "hasKey",
        TemplateFunction::new(|args| {
            let (map, key): (Value, String) = from_args(args)?;
            if map.kind() != ValueKind::Map {
                return Ok(Value::from(false));
            }
            Ok(Value::from(!map.get_attr(&key)?.is_undefined()))
        }),
    );
    add(
        "keys",
        TemplateFunction::new(|args| {
            let (map,): (Value,) = from_args(args)?;
            if map.kind() != ValueKind::Map {
                return Err(Error::new(
                    ErrorKind::InvalidOperation,
                    format!("keys expects a map, got {}", map.kind()),
                ));
            }
            let keys: Vec<Value> = map.try_iter()?.collect();
            Ok(Value::from(keys))
        }),
    );
    add(
        "debug",
        TemplateFunction::new(|args| {
            let (value,): (Value,) = from_args(args)?;
            let text = serde_json::to_string(&value).unwrap_or_else(|_| format!("{value:?}"));
            Ok(Value::from(text))
        }),
    );

    registry
}

/// Wrap a single-string-argument helper.
fn string_fn<F>(f: F) -> TemplateFunction
where
    F: Fn(String) -> Result<Value, Error> + Send + Sync + 'static,
{
    TemplateFunction::new(move |args| {
        let (s,): (String,) = from_args(args)?;
        f(s)
    })
}

/// Capitalize the first letter of every whitespace-separated word and
/// lowercase the rest.
pub fn title(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut capitalize_next = true;
    for c in s.chars() {
        if c.is_whitespace() {
            capitalize_next = true;
            out.push(c);
        } else if capitalize_next {
            out.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

/// Capitalize the first character.
pub fn ucfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Up to `length` characters starting at character `start`.
pub fn substr(s: &str, start: i64, length: i64) -> String {
    if start < 0 || length <= 0 {
        return String::new();
    }
    s.chars()
        .skip(start as usize)
        .take(length as usize)
        .collect()
}
