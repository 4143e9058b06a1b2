//! Helper functions and filters available in every template.
//!
//! Functions take named arguments (`{{ str_contains(s=message, substr="Not") }}`),
//! `json`, `int` and `escape_html` also work as filters (`{{ message | json }}`).

use std::collections::HashMap;
use std::fmt::{self, Write as _};

use chrono::{DateTime, Local, TimeZone, Utc};
use tera::{Tera, Value};

use super::l10n;

type Args = HashMap<String, Value>;

/// Register the request-independent helpers on `tera`.
pub fn register_builtins(tera: &mut Tera, hostname: String) {
    tera.register_function("now", now);
    tera.register_function("hostname", move |_: &Args| -> tera::Result<Value> {
        Ok(Value::String(hostname.clone()))
    });
    tera.register_function("json", |args: &Args| -> tera::Result<Value> {
        json(arg(args, "value", "json")?)
    });
    tera.register_function("int", |args: &Args| -> tera::Result<Value> {
        Ok(Value::from(to_int(arg(args, "value", "int")?)))
    });
    tera.register_function("version", |_: &Args| -> tera::Result<Value> {
        Ok(Value::from(env!("CARGO_PKG_VERSION")))
    });
    tera.register_function("str_count", str_count);
    tera.register_function("str_contains", str_contains);
    tera.register_function("str_trim_space", str_trim_space);
    tera.register_function("str_trim_prefix", str_trim_prefix);
    tera.register_function("str_trim_suffix", str_trim_suffix);
    tera.register_function("str_replace", str_replace);
    tera.register_function("str_index", str_index);
    tera.register_function("str_fields", str_fields);
    tera.register_function("env", env);
    tera.register_function("escape_html", |args: &Args| -> tera::Result<Value> {
        Ok(Value::from(tera::escape_html(&str_arg(args, "s", "escape_html")?)))
    });
    tera.register_function("l10n_script", |_: &Args| -> tera::Result<Value> {
        Ok(Value::from(l10n::script()))
    });

    tera.register_filter("json", |value: &Value, _: &Args| -> tera::Result<Value> { json(value) });
    tera.register_filter("int", |value: &Value, _: &Args| -> tera::Result<Value> {
        Ok(Value::from(to_int(value)))
    });
    tera.register_filter("escape_html", |value: &Value, _: &Args| -> tera::Result<Value> {
        Ok(Value::from(tera::escape_html(&value_to_string(value))))
    });
}

/// Best-effort integer cast: numbers are truncated, unparseable strings yield 0.
pub fn to_int(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn json(value: &Value) -> tera::Result<Value> {
    serde_json::to_string(value)
        .map(Value::String)
        .map_err(|e| tera::Error::msg(format!("json: {e}")))
}

/// `now()` is RFC 3339 local time, `now(utc=true)`, `now(format="%H:%M")`.
fn now(args: &Args) -> tera::Result<Value> {
    let utc = args.get("utc").and_then(Value::as_bool).unwrap_or(false);
    let format = args.get("format").and_then(Value::as_str);

    let rendered = match (utc, format) {
        (true, Some(f)) => format_time(Utc::now(), f)?,
        (true, None) => Utc::now().to_rfc3339(),
        (false, Some(f)) => format_time(Local::now(), f)?,
        (false, None) => Local::now().to_rfc3339(),
    };

    Ok(Value::String(rendered))
}

/// Format with a template-supplied strftime string; unknown specifiers are an error.
fn format_time<Tz>(time: DateTime<Tz>, format: &str) -> tera::Result<String>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let mut out = String::new();
    write!(out, "{}", time.format(format))
        .map_err(|_| tera::Error::msg(format!("now: invalid format {format:?}")))?;
    Ok(out)
}

fn str_count(args: &Args) -> tera::Result<Value> {
    let s = str_arg(args, "s", "str_count")?;
    let substr = str_arg(args, "substr", "str_count")?;

    // an empty needle matches between every character
    let count = if substr.is_empty() {
        s.chars().count() + 1
    } else {
        s.matches(substr.as_str()).count()
    };

    Ok(Value::from(count))
}

fn str_contains(args: &Args) -> tera::Result<Value> {
    let s = str_arg(args, "s", "str_contains")?;
    let substr = str_arg(args, "substr", "str_contains")?;
    Ok(Value::Bool(s.contains(substr.as_str())))
}

fn str_trim_space(args: &Args) -> tera::Result<Value> {
    Ok(Value::from(str_arg(args, "s", "str_trim_space")?.trim()))
}

fn str_trim_prefix(args: &Args) -> tera::Result<Value> {
    let s = str_arg(args, "s", "str_trim_prefix")?;
    let prefix = str_arg(args, "prefix", "str_trim_prefix")?;
    Ok(Value::from(s.strip_prefix(prefix.as_str()).unwrap_or(&s)))
}

fn str_trim_suffix(args: &Args) -> tera::Result<Value> {
    let s = str_arg(args, "s", "str_trim_suffix")?;
    let suffix = str_arg(args, "suffix", "str_trim_suffix")?;
    Ok(Value::from(s.strip_suffix(suffix.as_str()).unwrap_or(&s)))
}

fn str_replace(args: &Args) -> tera::Result<Value> {
    let s = str_arg(args, "s", "str_replace")?;
    let old = str_arg(args, "old", "str_replace")?;
    let new = str_arg(args, "new", "str_replace")?;
    Ok(Value::from(s.replace(old.as_str(), &new)))
}

fn str_index(args: &Args) -> tera::Result<Value> {
    let s = str_arg(args, "s", "str_index")?;
    let substr = str_arg(args, "substr", "str_index")?;
    let idx = s.find(substr.as_str()).map_or(-1, |i| i as i64);
    Ok(Value::from(idx))
}

fn str_fields(args: &Args) -> tera::Result<Value> {
    let s = str_arg(args, "s", "str_fields")?;
    Ok(Value::Array(s.split_whitespace().map(Value::from).collect()))
}

fn env(args: &Args) -> tera::Result<Value> {
    let key = str_arg(args, "key", "env")?;
    Ok(Value::from(std::env::var(key).unwrap_or_default()))
}

fn arg<'a>(args: &'a Args, name: &str, func: &str) -> tera::Result<&'a Value> {
    args.get(name)
        .ok_or_else(|| tera::Error::msg(format!("function `{func}` requires the `{name}` argument")))
}

/// Strings pass through, numbers and booleans are stringified.
fn str_arg(args: &Args, name: &str, func: &str) -> tera::Result<String> {
    match arg(args, name, func)? {
        Value::Array(_) | Value::Object(_) => Err(tera::Error::msg(format!(
            "function `{func}`: argument `{name}` must be a string"
        ))),
        value => Ok(value_to_string(value)),
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_int() {
        assert_eq!(to_int(&json!("42")), 42);
        assert_eq!(to_int(&json!(" 42 ")), 42);
        assert_eq!(to_int(&json!(42)), 42);
        assert_eq!(to_int(&json!(3.7)), 3);
        assert_eq!(to_int(&json!("test")), 0);
        assert_eq!(to_int(&json!("42test")), 0);
        assert_eq!(to_int(&json!(null)), 0);
        assert_eq!(to_int(&json!([1])), 0);
    }

    #[test]
    fn test_str_count_empty_needle() {
        let args: Args = [("s".to_string(), json!("abc")), ("substr".to_string(), json!(""))].into();
        assert_eq!(str_count(&args).unwrap(), json!(4));
    }

    #[test]
    fn test_now_with_bad_format_is_an_error() {
        let args: Args = [("format".to_string(), json!("%Q"))].into();
        let err = now(&args).unwrap_err();
        assert!(err.to_string().contains("%Q"), "{err}");

        let args: Args = [("format".to_string(), json!("%Y")), ("utc".to_string(), json!(true))].into();
        assert_eq!(now(&args).unwrap().as_str().map(str::len), Some(4));
    }

    #[test]
    fn test_missing_argument() {
        let err = str_contains(&Args::new()).unwrap_err();
        assert!(err.to_string().contains("`s`"));
    }
}
