//! Code generation core of a visual form builder.
//!
//! A [`model::FormModel`] becomes three artifacts: a React component, a zod
//! schema module and a setup snippet. The same validation rules drive the
//! runtime preview.

pub mod config;
pub mod defaults;
pub mod document;
pub mod emit;
pub mod install;
pub mod markup;
pub mod measure;
pub mod model;
pub mod naming;
pub mod preview;
pub mod schema;
pub mod setup;
pub mod store;
pub mod values;

use serde::Serialize;
use serde_json::json;
use wasm_bindgen::prelude::*;

use config::OutputConfig;
use install::{InstallCommand, Shell};
use markup::{CodegenOptions, ComponentGenerator};
use model::FormModel;

/// The three exported source files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifacts {
    pub component: String,
    pub schema: String,
    pub setup: String,
}

pub fn generate_artifacts(model: &FormModel, options: &CodegenOptions) -> Artifacts {
    Artifacts {
        component: ComponentGenerator::new(options.clone()).generate(&model.fields, &model.settings),
        schema: schema::generate(&model.fields).into_source(),
        setup: setup::generate(&model.fields),
    }
}

/// Initialize logging and the panic hook in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);
    }
}

fn load_model(document: &str) -> Result<FormModel, String> {
    document::import(document)
        .map(|(model, _)| model)
        .map_err(|e| e.to_string())
}

fn load_options(options: Option<String>) -> Result<CodegenOptions, String> {
    match options.as_deref() {
        None | Some("") => Ok(CodegenOptions::default()),
        Some(json) => serde_json::from_str(json).map_err(|e| e.to_string()),
    }
}

/// All three artifacts as `{ component, schema, setup }`
#[wasm_bindgen(js_name = "generateArtifacts")]
pub fn generate_artifacts_js(document: &str, options: Option<String>) -> Result<js_sys::Object, String> {
    let artifacts = generate_artifacts(&load_model(document)?, &load_options(options)?);

    let object = js_sys::Object::new();
    for (key, text) in [
        ("component", &artifacts.component),
        ("schema", &artifacts.schema),
        ("setup", &artifacts.setup),
    ] {
        js_sys::Reflect::set(&object, &JsValue::from_str(key), &JsValue::from_str(text))
            .map_err(|_| format!("failed to set '{}'", key))?;
    }
    Ok(object)
}

#[wasm_bindgen(js_name = "generateComponent")]
pub fn generate_component(document: &str, options: Option<String>) -> Result<String, String> {
    let model = load_model(document)?;
    let generator = ComponentGenerator::new(load_options(options)?);
    Ok(generator.generate(&model.fields, &model.settings))
}

#[wasm_bindgen(js_name = "generateSchema")]
pub fn generate_schema(document: &str) -> Result<String, String> {
    Ok(schema::generate(&load_model(document)?.fields).into_source())
}

#[wasm_bindgen(js_name = "generateSetup")]
pub fn generate_setup(document: &str) -> Result<String, String> {
    Ok(setup::generate(&load_model(document)?.fields))
}

/// Validate a JSON record of values against the form's runtime schema.
/// Returns `{ "valid": bool, "issues": [{ "field", "message" }] }`.
#[wasm_bindgen(js_name = "validateValues")]
pub fn validate_values(document: &str, record: &str) -> Result<String, String> {
    let model = load_model(document)?;
    let raw: serde_json::Value = serde_json::from_str(record).map_err(|e| e.to_string())?;
    let form_values = values::values_from_json(&model.fields, &raw).map_err(|e| e.to_string())?;

    let issues = match schema::generate(&model.fields).validate(&form_values) {
        Ok(()) => Vec::new(),
        Err(errors) => errors.issues,
    };
    let report = json!({ "valid": issues.is_empty(), "issues": issues });
    Ok(report.to_string())
}

/// Install command for `bash` or `powershell`. Returns
/// `{ "command", "scriptName"?, "script"? }`.
#[wasm_bindgen(js_name = "installCommand")]
pub fn install_command(
    document: &str,
    shell: &str,
    options: Option<String>,
    max_inline: Option<usize>,
) -> Result<String, String> {
    let shell: Shell = shell.parse()?;
    let artifacts = generate_artifacts(&load_model(document)?, &load_options(options)?);
    let max_inline = max_inline.unwrap_or(install::DEFAULT_MAX_INLINE);

    let report = match install::command(&artifacts, &OutputConfig::default(), shell, max_inline) {
        InstallCommand::Inline(command) => json!({ "command": command }),
        InstallCommand::Script {
            script_name,
            script,
            command,
        } => json!({ "command": command, "scriptName": script_name, "script": script }),
    };
    Ok(report.to_string())
}
