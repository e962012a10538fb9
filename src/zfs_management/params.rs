// zfs_management/params.rs
// `key=value` parameter list <-> lustre:<key> user properties

use super::backend::{DatasetHandle, ZfsBackend};
use super::bridge::{self, LDD_PREFIX};
use super::helpers::is_valid_user_property_name;
use super::types::{Result, ZfsError};
use log::{debug, warn};

/// Longest parameter string a record can carry
pub const LDD_PARAM_LEN: usize = 4096;

/// Split a parameter string into its well-formed `key=value` pairs.
///
/// Runs of `=` separate fields and empty fields are skipped, so `=k=v`
/// and `k==v` both give `("k", "v")`. Only the first two fields count:
/// `a=b=c` gives `("a", "b")`. Tokens with fewer than two fields are
/// dropped.
pub fn parse_params(params: &str) -> impl Iterator<Item = (&str, &str)> {
    params.split_whitespace().filter_map(|token| {
        let mut fields = token.split('=').filter(|field| !field.is_empty());
        let pair = fields.next().zip(fields.next());
        if pair.is_none() {
            debug!("skipping malformed parameter '{}'", token);
        }
        pair
    })
}

/// Append `key=value` to a parameter string
pub fn add_param(params: &mut String, key: &str, value: &str) -> Result<()> {
    let extra = usize::from(!params.is_empty()) + key.len() + 1 + value.len();
    if params.len() + extra > LDD_PARAM_LEN {
        return Err(ZfsError::InvalidArgument(format!(
            "parameters exceed {} bytes while adding {}={}",
            LDD_PARAM_LEN, key, value
        )));
    }

    if !params.is_empty() {
        params.push(' ');
    }
    params.push_str(key);
    params.push('=');
    params.push_str(value);
    Ok(())
}

/// Map `<key>=<value> ...` pairs to `lustre:<key>=<value>` properties.
/// Malformed pairs and keys owned by a fixed LDD field are skipped. A key
/// that does not form a valid user property name fails the write.
pub fn set_prop_params<B: ZfsBackend>(backend: &B, dataset: &B::Dataset, params: &str) -> Result<()> {
    for (key, value) in parse_params(params) {
        let prop_name = format!("{}{}", LDD_PREFIX, key);

        if bridge::is_reserved(&prop_name) {
            warn!("skipping parameter '{}', {} is a fixed field", key, prop_name);
            continue;
        }
        if !is_valid_user_property_name(&prop_name) {
            return Err(ZfsError::InvalidArgument(format!(
                "parameter '{}={}' on {}: invalid property name {}",
                key,
                value,
                dataset.name(),
                prop_name
            )));
        }

        debug!("  {}={}", prop_name, value);
        backend.set_user_property(dataset, &prop_name, value)?;
    }

    Ok(())
}

/// Collect every `lustre:` property without a fixed field into `params`
pub fn get_prop_params<B: ZfsBackend>(
    backend: &B,
    dataset: &B::Dataset,
    params: &mut String,
) -> Result<()> {
    for (name, value) in backend.user_properties(dataset)? {
        let key = match name.strip_prefix(LDD_PREFIX) {
            Some(key) if !key.is_empty() => key,
            _ => continue,
        };
        if bridge::is_reserved(&name) {
            continue;
        }

        add_param(params, key, &value).map_err(|e| match e {
            ZfsError::InvalidArgument(reason) => {
                ZfsError::InvalidArgument(format!("{}: {}", dataset.name(), reason))
            }
            other => other,
        })?;
    }

    Ok(())
}
