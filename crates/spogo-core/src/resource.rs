// ── Resource parsing ──
//
// Accepts `spotify:<kind>:<id>` URIs, `open.spotify.com/<kind>/<id>` links
// (with or without scheme, `intl-xx` locale segment and query string) and
// bare ids.

use url::Url;

use crate::error::CoreError;
use crate::model::ItemKind;

const WEB_HOST: &str = "open.spotify.com";

/// A parsed reference; `kind` is `None` for bare ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub kind: Option<ItemKind>,
    pub id: String,
}

impl Resource {
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(invalid(input, "empty input"));
        }

        if let Some(rest) = input.strip_prefix("spotify:") {
            let mut parts = rest.split(':');
            let (Some(kind), Some(id)) = (parts.next(), parts.next()) else {
                return Err(invalid(input, "invalid spotify uri"));
            };
            return Self::typed(input, kind, id);
        }

        if input.contains(&format!("{WEB_HOST}/")) {
            return Self::parse_url(input);
        }

        Ok(Self {
            kind: None,
            id: input.to_owned(),
        })
    }

    /// Parse and require `expected`; bare ids adopt it.
    pub fn parse_as(input: &str, expected: ItemKind) -> Result<Self, CoreError> {
        let mut resource = Self::parse(input)?;
        match resource.kind {
            None => resource.kind = Some(expected),
            Some(kind) if kind != expected => {
                return Err(invalid(
                    input,
                    &format!("expected a {expected}, got a {kind}"),
                ));
            }
            Some(_) => {}
        }
        Ok(resource)
    }

    /// `spotify:<kind>:<id>`, when the kind is known.
    pub fn uri(&self) -> Option<String> {
        self.kind.map(|kind| kind.uri(&self.id))
    }

    fn parse_url(input: &str) -> Result<Self, CoreError> {
        let absolute = if input.starts_with("http://") || input.starts_with("https://") {
            input.to_owned()
        } else {
            format!("https://{input}")
        };
        let url = Url::parse(&absolute).map_err(|e| invalid(input, &e.to_string()))?;

        let mut segments = url
            .path_segments()
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .peekable();
        if segments.peek().is_some_and(|s| s.starts_with("intl-")) {
            segments.next();
        }
        let (Some(kind), Some(id)) = (segments.next(), segments.next()) else {
            return Err(invalid(input, "invalid spotify url"));
        };
        Self::typed(input, kind, id)
    }

    fn typed(input: &str, kind: &str, id: &str) -> Result<Self, CoreError> {
        let kind: ItemKind = kind
            .parse()
            .map_err(|_| invalid(input, "unsupported spotify type"))?;
        if id.is_empty() {
            return Err(invalid(input, "missing id"));
        }
        Ok(Self {
            kind: Some(kind),
            id: id.to_owned(),
        })
    }
}

fn invalid(input: &str, reason: &str) -> CoreError {
    CoreError::InvalidResource {
        input: input.to_owned(),
        reason: reason.to_owned(),
    }
}
