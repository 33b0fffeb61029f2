use reflekt_core::error::{Error, Result};

pub const TYPE_MARKER: &str = "-t:";
pub const PATH_MARKER: &str = "-p:";

/// How an expression's text selects its evaluation root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Evaluated against the context value passed at call time.
    Instance { path: String },
    /// Evaluated against a named type, starting from one of its statics.
    Static { type_name: String, path: String },
}

impl Directive {
    pub fn parse(text: &str) -> Result<Directive> {
        let type_name = find_directive(text, TYPE_MARKER);
        let path = find_directive(text, PATH_MARKER);
        match (type_name, path) {
            (Some(type_name), Some(path)) => {
                if type_name.is_empty() || path.is_empty() {
                    return Err(Error::parse(text, "`-t:` and `-p:` need a value"));
                }
                Ok(Directive::Static {
                    type_name: type_name.to_string(),
                    path: path.to_string(),
                })
            }
            (Some(_), None) => Err(Error::parse(text, "`-t:` requires a `-p:` path")),
            (None, Some(path)) if path.is_empty() => Err(Error::parse(text, "`-p:` needs a value")),
            (None, Some(path)) => Ok(Directive::Instance {
                path: path.to_string(),
            }),
            (None, None) => Ok(Directive::Instance {
                path: text.trim().to_string(),
            }),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Directive::Instance { path } | Directive::Static { path, .. } => path,
        }
    }
}

/// The value following `marker`, up to the next ` -` or end of text. A marker
/// counts only at the start or after whitespace.
pub fn find_directive<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    let start = text.match_indices(marker).find_map(|(idx, _)| {
        let boundary = text[..idx]
            .chars()
            .next_back()
            .map_or(true, char::is_whitespace);
        boundary.then_some(idx + marker.len())
    })?;
    let rest = &text[start..];
    let end = rest.find(" -").unwrap_or(rest.len());
    Some(rest[..end].trim())
}
