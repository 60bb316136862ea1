//! Host keyword substitution for CNI configs
//!
//! CNI configs may carry placeholders that only make sense on a given host.
//! A string value `__host_label__: <label>` is replaced by the value of that
//! label on the host, or by the empty string when the label is missing, empty
//! or not named at all.
//!
//! Only mappings are walked. Strings are checked for the keyword, every other
//! value is handed back to the walker, which leaves non-mappings untouched
//! (arrays are not descended into).

use crate::models::Host;
use serde_json::Value;
use tracing::debug;

/// Reserved prefix of host label placeholders
pub const HOST_LABEL_KEYWORD: &str = "__host_label__";

/// Loosely-typed configuration tree
pub type ConfigNode = Value;

/// Replace host keywords in `config` in place
pub fn substitute_in_place(config: &mut ConfigNode, host: &Host) {
    let Value::Object(props) = config else {
        return;
    };

    for (key, value) in props.iter_mut() {
        match value {
            Value::String(raw) => {
                if let Some(resolved) = resolve_keyword(raw, host) {
                    debug!("Substituted host keyword for key {}: {:?} -> {:?}", key, raw, resolved);
                    *raw = resolved;
                }
            }
            nested => substitute_in_place(nested, host),
        }
    }
}

/// Replace host keywords in `config` and hand it back
pub fn substitute(mut config: ConfigNode, host: &Host) -> ConfigNode {
    substitute_in_place(&mut config, host);
    config
}

/// Resolved value for a keyword string, `None` when `raw` is not a keyword
fn resolve_keyword(raw: &str, host: &Host) -> Option<String> {
    if !raw.starts_with(HOST_LABEL_KEYWORD) {
        return None;
    }

    let resolved = raw
        .split_once(':')
        .map(|(_, label)| label.trim())
        .and_then(|label| host.labels.get(label))
        .filter(|value| !value.is_empty())
        .cloned()
        .unwrap_or_default();

    Some(resolved)
}
