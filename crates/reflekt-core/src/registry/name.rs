use crate::error::{Error, Result};
use crate::registry::def::TypeDef;
use crate::ty::Ty;
use std::sync::Arc;

/// Parses `Name`, `Name<A, B>` and any number of `[]` suffixes, resolving
/// each name through `lookup`.
pub fn parse_type_name(
    text: &str,
    lookup: &dyn Fn(&str) -> Option<Arc<TypeDef>>,
) -> Result<Ty> {
    let mut parser = TypeNameParser {
        text,
        pos: 0,
        lookup,
    };
    let ty = parser.parse_type()?;
    parser.skip_ws();
    if parser.pos != text.len() {
        return Err(Error::type_resolution(
            text,
            format!("unexpected `{}`", &text[parser.pos..]),
        ));
    }
    Ok(ty)
}

struct TypeNameParser<'a> {
    text: &'a str,
    pos: usize,
    lookup: &'a dyn Fn(&str) -> Option<Arc<TypeDef>>,
}

impl TypeNameParser<'_> {
    fn rest(&self) -> &str {
        &self.text[self.pos..]
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.text.len() - trimmed.len();
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_ws();
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn error(&self, reason: impl Into<String>) -> Error {
        Error::type_resolution(self.text, reason)
    }

    fn parse_type(&mut self) -> Result<Ty> {
        self.skip_ws();
        let ident_len = self
            .rest()
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.'))
            .unwrap_or(self.rest().len());
        if ident_len == 0 {
            return Err(self.error("expected a type name"));
        }
        let name = self.rest()[..ident_len].to_string();
        self.pos += ident_len;

        let def = (self.lookup)(&name)
            .ok_or_else(|| Error::type_resolution(name.clone(), "unknown type"))?;

        let mut args = Vec::new();
        if self.eat("<") {
            loop {
                args.push(self.parse_type()?);
                if self.eat(",") {
                    continue;
                }
                if self.eat(">") {
                    break;
                }
                return Err(self.error("expected `,` or `>` in type argument list"));
            }
        }

        let mut ty = if args.is_empty() {
            def.self_ty()
        } else if args.len() == def.params.len() {
            Ty::generic(name, args)
        } else {
            return Err(Error::type_resolution(
                name,
                format!(
                    "expected {} type arguments, found {}",
                    def.params.len(),
                    args.len()
                ),
            ));
        };

        while self.eat("[") {
            if !self.eat("]") {
                return Err(self.error("expected `]`"));
            }
            ty = Ty::array(ty);
        }
        Ok(ty)
    }
}
