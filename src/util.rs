//! Name helpers shared by the resolver, the tag model and the source
//! walker.
//!
//! Class names are handled as plain strings in their canonical form:
//! no leading `\`, segments separated by `\`.

/// Strip a single leading `\` (PHP fully-qualified prefix).
pub fn strip_leading_backslash(name: &str) -> &str {
    name.strip_prefix('\\').unwrap_or(name)
}

/// The last segment of a namespaced name.
///
/// - `App\Models\User` → `User`
/// - `User` → `User`
pub fn short_name(name: &str) -> &str {
    let name = strip_leading_backslash(name);
    name.rsplit('\\').next().unwrap_or(name)
}

/// Everything before the last `\` of a namespaced name, or `None` for a
/// name in the global namespace.
///
/// - `App\Models\User` → `Some("App\Models")`
/// - `User` → `None`
pub fn namespace_of(name: &str) -> Option<&str> {
    let name = strip_leading_backslash(name);
    name.rfind('\\').map(|idx| &name[..idx])
}

/// Join a namespace and a relative name.  An empty namespace yields the
/// name unchanged.
pub fn qualify(namespace: &str, name: &str) -> String {
    let name = strip_leading_backslash(name);
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}\\{}", namespace.trim_end_matches('\\'), name)
    }
}

/// Normalise a tag name to the key used by tag collections.
///
/// Dashes separate words, each following word is capitalised:
/// `property-read` → `propertyRead`, `phpstan-return` → `phpstanReturn`.
/// Vendor prefixes written with a colon or backslash are kept verbatim.
pub fn normalize_tag_name(tag: &str) -> String {
    let mut out = String::with_capacity(tag.len());
    let mut upper_next = false;
    for c in tag.chars() {
        if c == '-' {
            upper_next = !out.is_empty();
            continue;
        }
        if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Whether `s` is a valid PHP identifier (label).
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_alphanumeric())
}

/// Whether `s` is a (possibly qualified) PHP class name.
pub fn is_class_name(s: &str) -> bool {
    let s = strip_leading_backslash(s);
    !s.is_empty() && s.split('\\').all(is_identifier)
}
