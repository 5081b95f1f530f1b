//! Shader template rendering
//!
//! Templates use brace placeholders: `{tilt}` is replaced by the parameter of
//! that name, `{{` and `}}` produce literal braces. GLSL bodies are full of
//! braces, so every one that is not a placeholder must be doubled.
//!
//! Template text always comes from the caller; the renderer only substitutes.

use std::collections::BTreeMap;

use holoplay_device::{DerivedConfig, Scalar};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Unknown template parameter '{name}' at byte {offset}")]
    UnknownKey { name: String, offset: usize },

    #[error("Unclosed '{{' at byte {offset}")]
    Unclosed { offset: usize },

    #[error("Single '}}' at byte {offset}; write '}}}}' for a literal brace")]
    StrayBrace { offset: usize },
}

/// Format a value the way GLSL source expects it.
///
/// Floats always carry a decimal point or exponent so `1536.0` stays a float
/// literal.
pub fn glsl_literal(value: &Scalar) -> String {
    match value {
        Scalar::Integer(i) => i.to_string(),
        Scalar::Number(n) => format!("{n:?}"),
        Scalar::Flag(b) => b.to_string(),
        Scalar::Text(s) => s.clone(),
        Scalar::Other(v) => v.to_string(),
    }
}

/// Parameter set for a quilt shader: the derived configuration plus the quilt
/// layout as `tilesX`/`tilesY`
pub fn quilt_parameters(
    config: &DerivedConfig,
    tiles_x: u32,
    tiles_y: u32,
) -> BTreeMap<String, Scalar> {
    config.shader_parameters([
        ("tilesX", Scalar::Integer(tiles_x.into())),
        ("tilesY", Scalar::Integer(tiles_y.into())),
    ])
}

/// Substitute `params` into `template`
pub fn render(template: &str, params: &BTreeMap<String, Scalar>) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len() + 256);
    let mut rest = template;
    let mut offset = 0;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let at = offset + pos;
        let tail = &rest[pos..];

        let consumed = if tail.starts_with("{{") {
            out.push('{');
            2
        } else if tail.starts_with("}}") {
            out.push('}');
            2
        } else if tail.starts_with('}') {
            return Err(TemplateError::StrayBrace { offset: at });
        } else {
            let close = tail.find('}').ok_or(TemplateError::Unclosed { offset: at })?;
            let name = &tail[1..close];
            let value = params.get(name).ok_or_else(|| TemplateError::UnknownKey {
                name: name.to_string(),
                offset: at,
            })?;
            out.push_str(&glsl_literal(value));
            close + 1
        };

        rest = &tail[consumed..];
        offset = at + consumed;
    }
    out.push_str(rest);
    Ok(out)
}
