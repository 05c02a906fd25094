use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::{LoaderConfig, PluginConfig, RuleConfig};

const EXTRACT_TEXT: &str = "extract-text-webpack-plugin";

pub(super) fn context() -> PathBuf {
    PathBuf::from("src")
}

pub(super) fn entry() -> BTreeMap<String, Vec<String>> {
    BTreeMap::from([(
        "main".to_string(),
        vec!["./app.js".to_string(), "../_sass/main.scss".to_string()],
    )])
}

pub(super) fn watch() -> bool {
    true
}

pub(super) fn devtool() -> String {
    "eval-source-map".to_string()
}

pub(super) fn output_path() -> PathBuf {
    PathBuf::from("js")
}

pub(super) fn output_filename() -> String {
    "bundle.js".to_string()
}

pub(super) fn rules() -> Vec<RuleConfig> {
    vec![
        RuleConfig {
            test: r"\.jsx?$".to_string(),
            exclude: Some("(node_modules|bower_components)".to_string()),
            loaders: vec![LoaderConfig::new("babel-loader")
                .with_options(json!({ "presets": ["env", "react"] }))],
            extract: None,
        },
        RuleConfig {
            test: r"\.json$".to_string(),
            exclude: Some("(node_modules)".to_string()),
            loaders: vec![LoaderConfig::new("json-loader")],
            extract: None,
        },
        RuleConfig {
            test: r"\.(css|scss)".to_string(),
            exclude: None,
            loaders: vec![
                LoaderConfig::new("css-loader")
                    .with_options(json!({ "importLoaders": 1, "sourceMap": true })),
                LoaderConfig::new("postcss-loader").with_options(json!({
                    "plugins": [require("autoprefixer")],
                    "sourceMap": true
                })),
                LoaderConfig::new("sass-loader").with_options(json!({ "sourceMap": true })),
            ],
            extract: Some(EXTRACT_TEXT.to_string()),
        },
    ]
}

pub(super) fn plugins() -> Vec<PluginConfig> {
    vec![PluginConfig::new(EXTRACT_TEXT).with_options(json!({ "filename": "../css/[name].css" }))]
}

pub(super) fn production_devtool() -> String {
    "source-map".to_string()
}

pub(super) fn production_plugins() -> Vec<PluginConfig> {
    vec![
        PluginConfig::new("webpack")
            .export("DefinePlugin")
            .with_options(json!({
                "process.env": { "NODE_ENV": "\"production\"" }
            })),
        PluginConfig::new("webpack")
            .export("optimize.UglifyJsPlugin")
            .with_options(json!({
                "compress": { "warnings": false },
                "sourceMap": true
            })),
        PluginConfig::new("optimize-css-assets-webpack-plugin").with_options(json!({
            "assetNameRegExp": regex(r"\.css$", "g"),
            "cssProcessorOptions": {
                "discardComments": { "removeAll": true },
                "map": { "inline": false }
            },
            "canPrint": true
        })),
        PluginConfig::new("webpack").export("optimize.ModuleConcatenationPlugin"),
    ]
}

fn require(module: &str) -> Value {
    json!({ "$require": module })
}

fn regex(source: &str, flags: &str) -> Value {
    json!({ "$regex": source, "$flags": flags })
}
