//! Extended JSON: plain JSON plus `$`-tagged single-key objects for the
//! categories JSON cannot express.
//!
//! ```json
//! {"when": {"$date": 1484438400000}, "re": {"$regex": {"source": "a+", "flags": "g"}}}
//! ```
//!
//! Callables, deferred values, generators, modules and weak collections are
//! written as `{"$opaque": "<category>"}` and cannot be read back. Encoding
//! follows references naively, so a cyclic value does not terminate.

use serde_json::{Map, Number, json};
use thiserror::Error;

use crate::value::{
    BufferError, BufferKind, BufferView, ErrorObject, Instant, MapValue, NumericBuffer,
    OpaqueConstant, Pattern, PatternError, RawBuffer, SerializedPayload, SetValue, Symbol, Value,
};

#[derive(Debug, Error)]
pub enum JsonError {
    #[error(transparent)]
    Syntax(#[from] serde_json::Error),
    #[error("`{tag}` expects {expected}")]
    Malformed {
        tag: &'static str,
        expected: &'static str,
    },
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error(transparent)]
    Buffer(#[from] BufferError),
    #[error("unknown constant `{0}`")]
    UnknownConstant(String),
    #[error("a `{0}` value cannot be decoded")]
    Opaque(String),
}

/// Largest integer an `f64` holds exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

fn encode_number(n: f64) -> serde_json::Value {
    if n.is_nan() {
        return json!({ "$number": "NaN" });
    }
    if n.is_infinite() {
        let label = if n > 0.0 { "Infinity" } else { "-Infinity" };
        return json!({ "$number": label });
    }
    let negative_zero = n == 0.0 && n.is_sign_negative();
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER && !negative_zero {
        return serde_json::Value::Number(Number::from(n as i64));
    }
    Number::from_f64(n).map_or(serde_json::Value::Null, serde_json::Value::Number)
}

pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Undefined => json!({ "$undefined": true }),
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => encode_number(*n),
        Value::Text(s) => serde_json::Value::String(s.to_string()),
        Value::Symbol(symbol) => json!({ "$symbol": symbol.description() }),
        Value::Record(record) => serde_json::Value::Object(
            record
                .entries()
                .into_iter()
                .map(|(key, value)| (key.to_string(), to_json(&value)))
                .collect(),
        ),
        Value::Sequence(sequence) => {
            serde_json::Value::Array(sequence.values().iter().map(to_json).collect())
        }
        Value::Instant(instant) => {
            let ms = instant.value_of();
            let ms = if ms.is_nan() { serde_json::Value::Null } else { encode_number(ms) };
            json!({ "$date": ms })
        }
        Value::Pattern(pattern) => json!({
            "$regex": { "source": pattern.source(), "flags": pattern.flags().to_string() }
        }),
        Value::Error(error) => json!({
            "$error": { "name": error.name(), "message": error.message() }
        }),
        Value::Map(map) => {
            let entries: Vec<_> = map
                .entries()
                .iter()
                .map(|(key, value)| json!([to_json(key), to_json(value)]))
                .collect();
            json!({ "$map": entries })
        }
        Value::Set(set) => {
            let members: Vec<_> = set.values().iter().map(to_json).collect();
            json!({ "$set": members })
        }
        Value::RawBuffer(buffer) => json!({ "$bytes": buffer.to_vec() }),
        Value::BufferView(view) => json!({
            "$view": {
                "bytes": view.buffer().to_vec(),
                "offset": view.byte_offset(),
                "length": view.byte_length(),
            }
        }),
        Value::NumericBuffer(buffer) => {
            let elements: Vec<_> = buffer.to_vec().into_iter().map(encode_number).collect();
            let mut tagged = Map::new();
            tagged.insert(format!("${}", buffer.kind().name()), elements.into());
            serde_json::Value::Object(tagged)
        }
        Value::Opaque(constant) => json!({ "$constant": constant.name() }),
        Value::Serialized(payload) => json!({ "$json": payload.document() }),
        Value::Callable(_)
        | Value::Deferred(_)
        | Value::Generator(_)
        | Value::Module(_)
        | Value::WeakMap(_)
        | Value::WeakSet(_) => json!({ "$opaque": value.category().name() }),
    }
}

pub fn parse(source: &str) -> Result<Value, JsonError> {
    let document: serde_json::Value = serde_json::from_str(source)?;
    from_json(&document)
}

pub fn from_json(document: &serde_json::Value) -> Result<Value, JsonError> {
    Ok(match document {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => Value::text(s.as_str()),
        serde_json::Value::Array(items) => Value::sequence(
            items
                .iter()
                .map(from_json)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        serde_json::Value::Object(fields) => {
            if fields.len() == 1
                && let Some((tag, body)) = fields.iter().next()
                && let Some(value) = decode_tagged(tag, body)?
            {
                return Ok(value);
            }
            let mut entries = Vec::with_capacity(fields.len());
            for (key, value) in fields {
                entries.push((key.as_str(), from_json(value)?));
            }
            Value::record(entries)
        }
    })
}

/// `Ok(None)` when `tag` is not one of ours; the object is then a plain record.
fn decode_tagged(tag: &str, body: &serde_json::Value) -> Result<Option<Value>, JsonError> {
    let Some(name) = tag.strip_prefix('$') else {
        return Ok(None);
    };
    if let Some(kind) = BufferKind::from_name(name) {
        let numbers = body
            .as_array()
            .ok_or(malformed("$<kind>", "an array of numbers"))?
            .iter()
            .map(decode_number)
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Some(Value::NumericBuffer(NumericBuffer::from_numbers(kind, &numbers))));
    }

    let value = match name {
        "undefined" => Value::Undefined,
        "number" => Value::Number(decode_number(&json!({ "$number": body }))?),
        "symbol" => match body {
            serde_json::Value::Null => Value::Symbol(Symbol::new(None)),
            serde_json::Value::String(description) => Value::symbol(description.as_str()),
            _ => return Err(malformed("$symbol", "a description string or null")),
        },
        "date" => Value::Instant(match body {
            serde_json::Value::Null => Instant::from_millis(f64::NAN),
            serde_json::Value::String(text) => Instant::parse(text),
            other => Instant::from_millis(
                other
                    .as_f64()
                    .ok_or(malformed("$date", "epoch milliseconds, a date string or null"))?,
            ),
        }),
        "regex" => {
            let source = str_field(body, "source").ok_or(malformed("$regex", "{source, flags}"))?;
            let flags = str_field(body, "flags").unwrap_or("");
            Value::Pattern(Pattern::new(source, flags)?)
        }
        "error" => {
            let name = str_field(body, "name").unwrap_or("Error");
            let message = str_field(body, "message").unwrap_or("");
            Value::Error(ErrorObject::new(name, message))
        }
        "map" => {
            let pairs = body.as_array().ok_or(malformed("$map", "an array of [key, value] pairs"))?;
            let mut entries = Vec::with_capacity(pairs.len());
            for pair in pairs {
                match pair.as_array().map(Vec::as_slice) {
                    Some([key, value]) => entries.push((from_json(key)?, from_json(value)?)),
                    _ => return Err(malformed("$map", "an array of [key, value] pairs")),
                }
            }
            Value::Map(MapValue::from_entries(entries))
        }
        "set" => {
            let members = body
                .as_array()
                .ok_or(malformed("$set", "an array"))?
                .iter()
                .map(from_json)
                .collect::<Result<Vec<_>, _>>()?;
            Value::Set(SetValue::from_values(members))
        }
        "bytes" => Value::RawBuffer(RawBuffer::from_bytes(decode_bytes("$bytes", body)?)),
        "view" => {
            let bytes = body
                .get("bytes")
                .ok_or(malformed("$view", "{bytes, offset, length}"))?;
            let buffer = RawBuffer::from_bytes(decode_bytes("$view", bytes)?);
            let offset = usize_field(body, "offset").unwrap_or(0);
            let length = usize_field(body, "length");
            Value::BufferView(BufferView::new(buffer, offset, length)?)
        }
        "constant" => match body.as_str() {
            Some("Math") => Value::Opaque(OpaqueConstant::math()),
            Some(other) => return Err(JsonError::UnknownConstant(other.to_string())),
            None => return Err(malformed("$constant", "a constant name")),
        },
        "json" => Value::Serialized(SerializedPayload::new(body.clone())),
        "opaque" => {
            return Err(JsonError::Opaque(
                body.as_str().unwrap_or("unknown").to_string(),
            ));
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}

fn malformed(tag: &'static str, expected: &'static str) -> JsonError {
    JsonError::Malformed { tag, expected }
}

/// A plain JSON number or a `{"$number": "NaN" | "Infinity" | "-Infinity"}`.
fn decode_number(value: &serde_json::Value) -> Result<f64, JsonError> {
    if let Some(n) = value.as_f64() {
        return Ok(n);
    }
    match value.get("$number").and_then(serde_json::Value::as_str) {
        Some("NaN") => Ok(f64::NAN),
        Some("Infinity") => Ok(f64::INFINITY),
        Some("-Infinity") => Ok(f64::NEG_INFINITY),
        _ => Err(malformed("$number", "a number, \"NaN\", \"Infinity\" or \"-Infinity\"")),
    }
}

fn decode_bytes(tag: &'static str, value: &serde_json::Value) -> Result<Vec<u8>, JsonError> {
    value
        .as_array()
        .ok_or(malformed(tag, "an array of bytes"))?
        .iter()
        .map(|byte| {
            byte.as_u64()
                .and_then(|byte| u8::try_from(byte).ok())
                .ok_or(malformed(tag, "an array of bytes"))
        })
        .collect()
}

fn str_field<'a>(value: &'a serde_json::Value, field: &str) -> Option<&'a str> {
    value.get(field).and_then(serde_json::Value::as_str)
}

fn usize_field(value: &serde_json::Value, field: &str) -> Option<usize> {
    value
        .get(field)
        .and_then(serde_json::Value::as_u64)
        .and_then(|n| usize::try_from(n).ok())
}
