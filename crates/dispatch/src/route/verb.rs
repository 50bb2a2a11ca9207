use http::Method;

/// Verbs an action can be bound to. Actions without a verb prefix answer all of them.
pub static SUPPORTED_METHODS: [Method; 7] =
    [Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE, Method::HEAD, Method::OPTIONS];

/// Splits a leading verb token (`post_edit`) off an action name.
///
/// Only the first token is looked at: `post_get_item` yields `POST` and `get_item`.
/// A bare verb name such as `get` is not a prefix, it is the whole action name.
pub fn split_verb_prefix(action: &str) -> (Option<Method>, &str) {
    for method in &SUPPORTED_METHODS {
        let token = method.as_str();
        let Some(head) = action.get(..token.len()) else {
            continue;
        };
        if !head.eq_ignore_ascii_case(token) {
            continue;
        }
        if let Some(rest) = action[token.len()..].strip_prefix('_')
            && !rest.is_empty()
        {
            return (Some(method.clone()), rest);
        }
    }
    (None, action)
}

/// Verb-shaped `_` separated tokens found in `rest`, e.g. `["get"]` for `get_item`.
pub fn embedded_verb_tokens(rest: &str) -> Vec<&str> {
    rest.split('_')
        .filter(|token| SUPPORTED_METHODS.iter().any(|method| method.as_str().eq_ignore_ascii_case(token)))
        .collect()
}
