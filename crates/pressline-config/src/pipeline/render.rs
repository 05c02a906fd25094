//! Render a [`PipelineConfig`] as a CommonJS bundler configuration module.
//!
//! Plain JSON cannot express regular expressions, `require()` calls or plugin
//! instances, so the config is emitted as JavaScript. Option values may embed
//! two escape objects:
//!
//! - `{"$require": "module"}` renders as `require("module")`
//! - `{"$regex": "source", "$flags": "g"}` renders as `new RegExp("source", "g")`
//!
//! A reporter plugin is appended that prints one [`STATS_MARKER`] line with the
//! JSON stats of every finished build.

use serde_json::Value;
use std::fmt::Write as _;
use std::path::Path;

use super::{PipelineConfig, PluginConfig, RuleConfig, StatsProfile};

/// Prefix of the stdout line carrying a build report.
pub const STATS_MARKER: &str = "__PRESSLINE_STATS__";

const INDENT: &str = "  ";

/// Render the module source. Relative `context` and `output.path` are
/// resolved against `root`.
pub fn render_module(config: &PipelineConfig, stats: &StatsProfile, root: &Path) -> String {
    let context = root.join(&config.context);
    let output_path = root.join(&config.output.path);

    let mut out = String::new();
    out.push_str("// Generated by pressline. Edits are overwritten on every build.\n");
    out.push_str("\"use strict\";\n\n");
    out.push_str("module.exports = {\n");

    let _ = writeln!(out, "{INDENT}context: {},", js_string(&context.to_string_lossy()));
    let _ = writeln!(out, "{INDENT}entry: {},", render_value(&entry_value(config)));
    let _ = writeln!(out, "{INDENT}watch: {},", config.watch);
    let _ = writeln!(out, "{INDENT}devtool: {},", js_string(&config.devtool));
    let _ = writeln!(out, "{INDENT}stats: \"none\",");
    let _ = writeln!(
        out,
        "{INDENT}output: {{ path: {}, filename: {} }},",
        js_string(&output_path.to_string_lossy()),
        js_string(&config.output.filename)
    );

    let _ = writeln!(out, "{INDENT}module: {{");
    let _ = writeln!(out, "{INDENT}{INDENT}rules: [");
    let rules: Vec<String> = config.rules.iter().map(render_rule).collect();
    for (i, rule) in rules.iter().enumerate() {
        let sep = if i + 1 < rules.len() { "," } else { "" };
        let _ = writeln!(out, "{INDENT}{INDENT}{INDENT}{rule}{sep}");
    }
    let _ = writeln!(out, "{INDENT}{INDENT}]");
    let _ = writeln!(out, "{INDENT}}},");

    let _ = writeln!(out, "{INDENT}plugins: [");
    for plugin in &config.plugins {
        let _ = writeln!(out, "{INDENT}{INDENT}{},", render_plugin(plugin));
    }
    out.push_str(&render_reporter(stats));
    let _ = writeln!(out, "{INDENT}]");
    out.push_str("};\n");
    out
}

fn entry_value(config: &PipelineConfig) -> Value {
    serde_json::to_value(&config.entry).unwrap_or(Value::Null)
}

fn render_rule(rule: &RuleConfig) -> String {
    let mut parts = vec![format!("test: {}", regex_literal(&rule.test, ""))];
    if let Some(exclude) = &rule.exclude {
        parts.push(format!("exclude: {}", regex_literal(exclude, "")));
    }

    let loaders: Vec<String> = rule
        .loaders
        .iter()
        .map(|loader| match &loader.options {
            Some(options) => format!(
                "{{ loader: {}, options: {} }}",
                js_string(&loader.loader),
                render_value(options)
            ),
            None => format!("{{ loader: {} }}", js_string(&loader.loader)),
        })
        .collect();
    let chain = format!("[{}]", loaders.join(", "));

    let use_expr = match &rule.extract {
        Some(module) => format!("require({}).extract({{ use: {} }})", js_string(module), chain),
        None => chain,
    };
    parts.push(format!("use: {use_expr}"));

    format!("{{ {} }}", parts.join(", "))
}

fn render_plugin(plugin: &PluginConfig) -> String {
    let mut constructor = format!("require({})", js_string(&plugin.module));
    if let Some(export) = &plugin.export {
        for segment in export.split('.').filter(|s| !s.is_empty()) {
            let _ = write!(constructor, "[{}]", js_string(segment));
        }
    }
    let args = plugin.options.as_ref().map(render_value).unwrap_or_default();
    format!("new ({constructor})({args})")
}

fn render_reporter(stats: &StatsProfile) -> String {
    let profile = serde_json::to_string(stats).unwrap_or_else(|_| "{}".to_string());
    let marker = js_string(STATS_MARKER);
    format!(
        "{INDENT}{INDENT}{{\n\
         {INDENT}{INDENT}{INDENT}apply(compiler) {{\n\
         {INDENT}{INDENT}{INDENT}{INDENT}const report = (stats) => console.log({marker} + \" \" + JSON.stringify(stats.toJson({profile})));\n\
         {INDENT}{INDENT}{INDENT}{INDENT}if (compiler.hooks) {{\n\
         {INDENT}{INDENT}{INDENT}{INDENT}{INDENT}compiler.hooks.done.tap(\"pressline\", report);\n\
         {INDENT}{INDENT}{INDENT}{INDENT}}} else {{\n\
         {INDENT}{INDENT}{INDENT}{INDENT}{INDENT}compiler.plugin(\"done\", report);\n\
         {INDENT}{INDENT}{INDENT}{INDENT}}}\n\
         {INDENT}{INDENT}{INDENT}}}\n\
         {INDENT}{INDENT}}}\n"
    )
}

/// Render a JSON value as a JavaScript expression, expanding escape objects.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(module)) = map.get("$require") {
                if map.len() == 1 {
                    return format!("require({})", js_string(module));
                }
            }
            if let Some(Value::String(source)) = map.get("$regex") {
                let flags = map.get("$flags").and_then(Value::as_str).unwrap_or("");
                return regex_literal(source, flags);
            }

            let fields: Vec<String> = map
                .iter()
                .map(|(key, value)| format!("{}: {}", js_string(key), render_value(value)))
                .collect();
            format!("{{ {} }}", fields.join(", "))
        }
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(render_value).collect();
            format!("[{}]", items.join(", "))
        }
        scalar => scalar.to_string(),
    }
}

fn regex_literal(source: &str, flags: &str) -> String {
    if flags.is_empty() {
        format!("new RegExp({})", js_string(source))
    } else {
        format!("new RegExp({}, {})", js_string(source), js_string(flags))
    }
}

fn js_string(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}
