use std::path::Path;

use log::{debug, error};
use minijinja::{context, Environment, Error as JinjaError};
use thiserror::Error;

use crate::models::ClientKind;
use crate::Settings;

const CLASH_TEMPLATE: &str = include_str!("../../base/templates/clash.tpl");
const SURGE_TEMPLATE: &str = include_str!("../../base/templates/surge.tpl");

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Failed to read template {0}: {1}")]
    Read(String, std::io::Error),

    #[error("Template render failed! Reason: {0}")]
    Render(#[from] JinjaError),
}

/// Template arguments container
#[derive(Debug, Clone, Default)]
pub struct TemplateArgs {
    /// Full URL of the incoming request
    pub url: String,
    /// Rewritten subscription body
    pub body: String,
}

/// Load the template source for a client.
///
/// `<template_path>/<name>.tpl` overrides the built-in template when present.
fn template_source(kind: ClientKind, template_path: &str) -> Result<String, TemplateError> {
    if !template_path.is_empty() {
        let path = Path::new(template_path).join(format!("{}.tpl", kind.template_name()));
        if path.is_file() {
            debug!("Using template {}", path.display());
            return std::fs::read_to_string(&path)
                .map_err(|e| TemplateError::Read(path.display().to_string(), e));
        }
    }

    Ok(match kind {
        ClientKind::Clash => CLASH_TEMPLATE,
        ClientKind::Surge => SURGE_TEMPLATE,
    }
    .to_string())
}

/// Wrap a rewritten subscription in the presentation template of its client
///
/// # Arguments
/// * `kind` - The client the result is served to
/// * `args` - Template arguments
///
/// # Returns
/// * `Ok(String)` - The rendered template
/// * `Err(TemplateError)` - If the template cannot be loaded or rendered
pub fn render_template(kind: ClientKind, args: &TemplateArgs) -> Result<String, TemplateError> {
    let source = template_source(kind, &Settings::current().template_path)?;

    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);
    let template = env.template_from_str(&source).map_err(|e| {
        error!("Failed to parse template: {}", e);
        TemplateError::Render(e)
    })?;

    let rendered = match kind {
        ClientKind::Clash => template.render(context! {
            url => &args.url,
            proxies_and_groups => &args.body,
        }),
        ClientKind::Surge => template.render(context! {
            url => &args.url,
            result => &args.body,
        }),
    };
    rendered.map_err(|e| {
        error!("Template render failed! Reason: {}", e);
        TemplateError::Render(e)
    })
}
