use crate::literal::parse_args;
use crate::overload::select_overload;
use crate::step::{CompiledPath, MemberRef, PathStep};
use reflekt_core::config::ParserConfig;
use reflekt_core::error::{Error, Result};
use reflekt_core::registry::{IndexKind, MemberInfo, MemberScope, TypeSystem};
use reflekt_core::{Ty, Value};

/// One dot-separated piece of a path: `Name`, `Name(args)`, each optionally
/// followed by `[n]` suffixes.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment<'a> {
    pub name: &'a str,
    pub args: Option<Vec<Value>>,
    pub indices: Vec<usize>,
}

/// Splits on `.` outside of parentheses, brackets and quoted literals.
pub fn split_segments(path: &str) -> Result<Vec<&str>> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;
    for (idx, c) in path.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' if depth > 0 => quote = Some(c),
            '(' | '[' => depth += 1,
            ')' | ']' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| Error::parse(path, format!("unbalanced `{}`", c)))?;
            }
            '.' if depth == 0 => {
                out.push(&path[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    if quote.is_some() {
        return Err(Error::parse(path, "unterminated string literal"));
    }
    if depth != 0 {
        return Err(Error::parse(path, "unbalanced parentheses or brackets"));
    }
    out.push(&path[start..]);
    if let Some(empty) = out.iter().position(|segment| segment.trim().is_empty()) {
        return Err(Error::parse(path, format!("segment {} is empty", empty)));
    }
    Ok(out)
}

pub fn parse_segment<'a>(path: &str, raw: &'a str) -> Result<Segment<'a>> {
    let raw = raw.trim();
    let name_len = raw
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(raw.len());
    let name = &raw[..name_len];
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(Error::parse(path, format!("`{}` is not a member name", raw)));
    }
    let mut rest = &raw[name_len..];

    let mut args = None;
    if rest.starts_with('(') {
        let close = matching_paren(rest)
            .ok_or_else(|| Error::parse(path, format!("unclosed call in `{}`", raw)))?;
        let parsed = parse_args(&rest[1..close]).map_err(|message| Error::parse(path, message))?;
        args = Some(parsed);
        rest = &rest[close + 1..];
    }

    let mut indices = Vec::new();
    while let Some(after) = rest.strip_prefix('[') {
        let close = after
            .find(']')
            .ok_or_else(|| Error::parse(path, format!("unclosed index in `{}`", raw)))?;
        let index = after[..close].trim().parse::<usize>().map_err(|_| {
            Error::parse(
                path,
                format!("index `{}` is not a non-negative integer", &after[..close]),
            )
        })?;
        indices.push(index);
        rest = &after[close + 1..];
    }

    if !rest.is_empty() {
        return Err(Error::parse(path, format!("unexpected `{}` after `{}`", rest, name)));
    }
    Ok(Segment {
        name,
        args,
        indices,
    })
}

fn matching_paren(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (idx, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

pub struct PathParser<'a> {
    types: &'a dyn TypeSystem,
    config: ParserConfig,
}

impl<'a> PathParser<'a> {
    pub fn new(types: &'a dyn TypeSystem, config: ParserConfig) -> Self {
        Self { types, config }
    }

    /// Resolves every segment of `text` against `root`.
    ///
    /// Syntax errors, indexing a non-indexable type and a static path that
    /// does not start at a static member are [`Error::Parse`]. A segment the
    /// owner type has no member for is [`Error::MemberNotFound`] instead, so
    /// callers rejecting bad paths should match both.
    pub fn parse(&self, root: &Ty, text: &str, is_static: bool) -> Result<CompiledPath> {
        if text.trim().is_empty() {
            return Err(Error::parse(text, "path is empty"));
        }
        let mut steps = Vec::new();
        let mut current = root.clone();
        for (position, raw) in split_segments(text)?.into_iter().enumerate() {
            let segment = parse_segment(text, raw)?;
            let static_hop = is_static && position == 0;
            let step = self
                .resolve_member(&current, &segment, static_hop, text)
                .map_err(|err| match err {
                    Error::MemberNotFound { .. } if static_hop => Error::parse(
                        text,
                        format!("`{}` is not a static member of `{}`", segment.name, current),
                    ),
                    other => other,
                })?;
            current = step.result_ty();
            steps.push(step);
            for index in segment.indices {
                let step = self.index_step(&current, index, text)?;
                current = step.result_ty();
                steps.push(step);
            }
        }
        reflekt_core::trace!("compiled `{}` on `{}` into {} steps", text, root, steps.len());
        Ok(CompiledPath {
            root: root.clone(),
            text: text.to_string(),
            is_static,
            steps,
        })
    }

    fn resolve_member(
        &self,
        owner: &Ty,
        segment: &Segment<'_>,
        is_static: bool,
        path: &str,
    ) -> Result<PathStep> {
        let scope = if is_static {
            MemberScope::STATIC
        } else {
            MemberScope::INSTANCE
        };
        let members = self.types.find_members(owner, segment.name, scope);

        if let Some(args) = &segment.args {
            return self.call_step(owner, segment.name, &members, args.clone(), is_static);
        }

        let field = members.iter().find_map(|member| match member {
            MemberInfo::Field(field) => Some(field.clone()),
            _ => None,
        });
        if let Some(field) = field {
            return Ok(PathStep::Member {
                result_ty: field.ty.clone(),
                member: MemberRef::Field(field),
                is_static,
            });
        }

        let property = members.iter().find_map(|member| match member {
            MemberInfo::Property(prop) => Some(prop.clone()),
            _ => None,
        });
        if let Some(prop) = property {
            return Ok(PathStep::Member {
                result_ty: prop.ty.clone(),
                member: MemberRef::Property(prop),
                is_static,
            });
        }

        let has_methods = members
            .iter()
            .any(|member| matches!(member, MemberInfo::Method(_)));
        if !has_methods {
            return Err(Error::member_not_found(owner, segment.name));
        }
        if !self.config.implicit_calls {
            return Err(Error::parse(
                path,
                format!("`{}` is a method; call it as `{}()`", segment.name, segment.name),
            ));
        }
        reflekt_core::debug!(
            "`{}` on `{}` resolved as the call `{}()`",
            segment.name,
            owner,
            segment.name
        );
        self.call_step(owner, segment.name, &members, Vec::new(), is_static)
    }

    fn call_step(
        &self,
        owner: &Ty,
        name: &str,
        members: &[MemberInfo],
        args: Vec<Value>,
        is_static: bool,
    ) -> Result<PathStep> {
        let arg_types: Vec<Ty> = args.iter().map(Value::type_of).collect();
        let method = select_overload(self.types, owner, name, members, &arg_types)?;
        Ok(PathStep::Member {
            result_ty: method.ret.clone(),
            member: MemberRef::Method { method, args },
            is_static,
        })
    }

    fn index_step(&self, owner: &Ty, index: usize, path: &str) -> Result<PathStep> {
        match self.types.index_kind(owner) {
            Some(IndexKind::Array(elem_ty)) => Ok(PathStep::ArrayElement { index, elem_ty }),
            Some(IndexKind::TypedList(elem_ty)) => {
                Ok(PathStep::TypedListElement { index, elem_ty })
            }
            Some(IndexKind::UntypedList) => Ok(PathStep::UntypedListElement { index }),
            None => Err(Error::parse(path, format!("`{}` is not indexable", owner))),
        }
    }
}
