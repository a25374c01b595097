//! Shared helpers for command handlers.

use spogo_core::{ItemKind, Resource};

use crate::error::CliError;

/// Full URI for `input`; bare ids are taken as `default_kind`.
pub fn uri_arg(input: &str, default_kind: ItemKind) -> Result<String, CliError> {
    let resource = Resource::parse(input)?;
    let kind = resource.kind.unwrap_or(default_kind);
    Ok(kind.uri(&resource.id))
}

/// Id of a resource that must be of `kind`.
pub fn id_arg(input: &str, kind: ItemKind) -> Result<String, CliError> {
    Ok(Resource::parse_as(input, kind)?.id)
}

pub fn id_args(inputs: &[String], kind: ItemKind) -> Result<Vec<String>, CliError> {
    inputs.iter().map(|i| id_arg(i, kind)).collect()
}

pub fn uri_args(inputs: &[String], default_kind: ItemKind) -> Result<Vec<String>, CliError> {
    inputs.iter().map(|i| uri_arg(i, default_kind)).collect()
}

/// Uri plus kind, refusing bare ids.
pub fn typed_resource(input: &str) -> Result<(ItemKind, String), CliError> {
    let resource = Resource::parse(input)?;
    match resource.kind {
        Some(kind) => Ok((kind, resource.id)),
        None => Err(CliError::InvalidResource {
            input: input.into(),
            reason: "a bare id does not say what it refers to".into(),
        }),
    }
}

/// "Showing 1-10 of 42" footer for offset pages.
pub fn page_footer(offset: u32, shown: usize, total: u64) -> String {
    if shown == 0 {
        return format!("No results (total {total})");
    }
    let first = u64::from(offset) + 1;
    let last = u64::from(offset) + u64::try_from(shown).unwrap_or(u64::MAX);
    format!("Showing {first}-{last} of {total}")
}
