use std::collections::HashMap;

use qdrant_client::qdrant::{Value as QdrantValue, value::Kind};
use serde_json::{Map, Number, Value};

pub fn payload_to_json(payload: &HashMap<String, QdrantValue>) -> Map<String, Value> {
	let mut out = Map::with_capacity(payload.len());

	for (key, value) in payload {
		out.insert(key.clone(), value_to_json(value));
	}

	out
}

pub fn value_to_json(value: &QdrantValue) -> Value {
	match &value.kind {
		None | Some(Kind::NullValue(_)) => Value::Null,
		Some(Kind::BoolValue(flag)) => Value::Bool(*flag),
		Some(Kind::IntegerValue(number)) => Value::from(*number),
		Some(Kind::DoubleValue(number)) =>
			Number::from_f64(*number).map(Value::Number).unwrap_or(Value::Null),
		Some(Kind::StringValue(text)) => Value::String(text.clone()),
		Some(Kind::ListValue(list)) => Value::Array(list.values.iter().map(value_to_json).collect()),
		Some(Kind::StructValue(inner)) => Value::Object(payload_to_json(&inner.fields)),
	}
}
