use itertools::Itertools;
use reflekt_core::error::{Error, Result};
use reflekt_core::registry::{MemberInfo, MethodInfo, TypeSystem};
use reflekt_core::Ty;
use std::sync::Arc;

/// Picks the first method among `members` whose arity matches and whose
/// parameters accept `arg_types`, in declaration order.
pub fn select_overload(
    types: &dyn TypeSystem,
    owner: &Ty,
    name: &str,
    members: &[MemberInfo],
    arg_types: &[Ty],
) -> Result<Arc<MethodInfo>> {
    let methods = members
        .iter()
        .filter_map(|member| match member {
            MemberInfo::Method(method) => Some(method.clone()),
            _ => None,
        })
        .collect_vec();
    if methods.is_empty() {
        return Err(Error::member_not_found(owner, name));
    }

    let mut first_mismatch: Option<(usize, String)> = None;
    for method in methods.iter().filter(|method| method.arity() == arg_types.len()) {
        let mismatch = method
            .params
            .iter()
            .zip(arg_types)
            .position(|(param, arg)| !types.is_assignable(&param.ty, arg));
        match mismatch {
            None => return Ok(method.clone()),
            Some(index) if first_mismatch.is_none() => {
                first_mismatch = Some((
                    index,
                    format!(
                        "`{}` expects `{}` but got `{}`",
                        method.signature(),
                        method.params[index].ty,
                        arg_types[index]
                    ),
                ));
            }
            Some(_) => {}
        }
    }

    let (index, reason) = match first_mismatch {
        Some((index, reason)) => (Some(index), reason),
        None => (
            None,
            format!(
                "no overload takes {} argument(s); candidates: {}",
                arg_types.len(),
                methods.iter().map(|method| method.signature()).join(", ")
            ),
        ),
    };
    Err(Error::OverloadMismatch {
        method: format!("{}.{}", owner, name),
        index,
        reason,
    })
}
