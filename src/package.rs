/// Strips a trailing multi-user suffix: `"com.foo@10"` -> `"com.foo"`.
///
/// Anything that does not end in `@<digits>` is returned unchanged.
pub fn normalize_package_name(package: &str) -> &str {
    match split_user_suffix(package) {
        Some((base, _)) => base,
        None => package,
    }
}

/// Returns the user id of a `<base>@<integer>` identifier.
pub fn user_suffix(package: &str) -> Option<&str> {
    split_user_suffix(package).map(|(_, user)| user)
}

pub fn has_user_suffix(package: &str) -> bool {
    split_user_suffix(package).is_some()
}

fn split_user_suffix(package: &str) -> Option<(&str, &str)> {
    let (base, user) = package.rsplit_once('@')?;
    if !user.is_empty() && user.bytes().all(|b| b.is_ascii_digit()) {
        Some((base, user))
    } else {
        None
    }
}

/// Two identifiers are equivalent when their suffix-stripped forms match.
pub fn is_equivalent(a: &str, b: &str) -> bool {
    normalize_package_name(a) == normalize_package_name(b)
}
