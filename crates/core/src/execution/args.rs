//! Compiler flag formatting
//!
//! Closure Compiler takes `--flag=value` arguments. Options are rendered in
//! map order:
//! - `true` becomes a bare `--flag`; `false` and `null` are dropped
//! - strings and numbers become `--flag=value`
//! - arrays repeat the flag once per element
//! - objects are passed as their JSON text

use serde_json::Value as JsonValue;

use closure_task_protocol::{CompilerInvocation, OptionMap};

use crate::options::value_to_arg;

/// Arguments for one invocation, without the compiler program itself
pub fn invocation_args(invocation: &CompilerInvocation) -> Vec<String> {
    match invocation {
        CompilerInvocation::Options(options) => format_options(options),
        CompilerInvocation::Args(args) => args.clone(),
    }
}

pub fn format_options(options: &OptionMap) -> Vec<String> {
    let mut args = Vec::new();
    for (key, value) in options {
        match value {
            JsonValue::Array(items) => {
                for item in items {
                    push_flag(&mut args, key, item);
                }
            }
            other => push_flag(&mut args, key, other),
        }
    }
    args
}

fn push_flag(args: &mut Vec<String>, key: &str, value: &JsonValue) {
    match value {
        JsonValue::Bool(true) => args.push(format!("--{}", key)),
        JsonValue::Bool(false) | JsonValue::Null => {}
        other => args.push(format!("--{}={}", key, value_to_arg(other))),
    }
}

/// Render a command line for display, quoting arguments that need it
pub fn display_command(parts: &[String]) -> String {
    parts
        .iter()
        .map(|part| {
            if !part.is_empty() && !part.contains(|c: char| c.is_whitespace() || c == '\'' || c == '"') {
                part.clone()
            } else {
                format!("'{}'", part.replace('\'', r"'\''"))
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options(value: JsonValue) -> OptionMap {
        match value {
            JsonValue::Object(map) => map,
            _ => unreachable!("test helper expects an object"),
        }
    }

    #[test]
    fn formats_each_value_kind() {
        let args = format_options(&options(json!({
            "js": ["a.js", "b.js"],
            "js_output_file": "out.js",
            "compilation_level": "ADVANCED",
            "create_source_map": true,
            "debug": false,
            "externs": null,
            "summary_detail_level": 3
        })));

        assert_eq!(
            args,
            vec![
                "--js=a.js",
                "--js=b.js",
                "--js_output_file=out.js",
                "--compilation_level=ADVANCED",
                "--create_source_map",
                "--summary_detail_level=3",
            ]
        );
    }

    #[test]
    fn raw_args_pass_through_untouched() {
        let invocation =
            CompilerInvocation::Args(vec!["--js".to_string(), "a b.js".to_string()]);
        assert_eq!(invocation_args(&invocation), vec!["--js", "a b.js"]);
    }

    #[test]
    fn display_quotes_only_when_needed() {
        let line = display_command(&[
            "google-closure-compiler".to_string(),
            "--js=my file.js".to_string(),
            "--define=NAME='x'".to_string(),
        ]);
        assert_eq!(
            line,
            r#"google-closure-compiler '--js=my file.js' '--define=NAME='\''x'\'''"#
        );
    }
}
