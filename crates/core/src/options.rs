//! Option merging and the adapter-reserved keys
//!
//! Options reach a task from three layers: the defaults the task asks for,
//! the task-level `options` and the target-level `options`. Later layers win
//! key by key; nothing is merged deeper than the top level.

use serde_json::Value as JsonValue;

use closure_task_protocol::{OptionMap, ARGS_OPTION, JS_OPTION, REQUIRE_INPUT_FILES_OPTION};

/// Shallow merge of `layers` in order, later keys overriding earlier ones
pub fn merge_options<'a>(layers: impl IntoIterator<Item = &'a OptionMap>) -> OptionMap {
    let mut merged = OptionMap::new();
    for layer in layers {
        for (key, value) in layer {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// Defaults for the adapter-reserved keys
pub fn adapter_defaults() -> OptionMap {
    let mut defaults = OptionMap::new();
    defaults.insert(REQUIRE_INPUT_FILES_OPTION.to_string(), JsonValue::Bool(true));
    defaults.insert(ARGS_OPTION.to_string(), JsonValue::Null);
    defaults
}

/// Merged options split into the reserved keys and the compiler pass-through
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterOptions {
    pub require_input_files: bool,
    pub args: Option<Vec<String>>,
    pub compiler_options: OptionMap,
}

impl AdapterOptions {
    /// Remove `requireInputFiles` and `args` from `options`
    ///
    /// A list is used as-is; any other truthy value is stringified into a
    /// one-element list. Falsy values (`null`, `false`, `""`, `0`) mean "not set".
    pub fn extract(mut options: OptionMap) -> Self {
        let require_input_files = options
            .shift_remove(REQUIRE_INPUT_FILES_OPTION)
            .map(|value| truthy(&value))
            .unwrap_or(true);

        let args = match options.shift_remove(ARGS_OPTION) {
            None => None,
            Some(value) if !truthy(&value) => None,
            Some(JsonValue::Array(items)) => Some(items.iter().map(value_to_arg).collect()),
            Some(other) => Some(vec![value_to_arg(&other)]),
        };

        Self {
            require_input_files,
            args,
            compiler_options: options,
        }
    }
}

/// Append `sources` to whatever `js` value the options already carry
pub fn merge_sources(options: &mut OptionMap, sources: impl IntoIterator<Item = String>) {
    let mut js = match options.shift_remove(JS_OPTION) {
        Some(JsonValue::Array(items)) => items,
        Some(JsonValue::Null) | None => Vec::new(),
        Some(single) => vec![single],
    };
    js.extend(sources.into_iter().map(JsonValue::String));
    options.insert(JS_OPTION.to_string(), JsonValue::Array(js));
}

/// Render a JSON option value the way it appears on a command line
pub fn value_to_arg(value: &JsonValue) -> String {
    match value {
        JsonValue::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Bool(flag) => *flag,
        JsonValue::Null => false,
        JsonValue::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        JsonValue::String(text) => !text.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}
