/// Escape path separators in an object key: `/` becomes `-`, then `\` becomes `_`.
///
/// Nothing else is escaped. A key of `..` survives unchanged.
pub fn sanitize_key(key: &str) -> String {
    key.replace('/', "-").replace('\\', "_")
}

/// Join `name` onto `folder` with POSIX path semantics and normalize the result.
///
/// Empty parts are skipped, `.` segments dropped, `..` pops the previous
/// segment (or is kept when a relative path has nothing left to pop), and
/// repeated separators collapse. An empty relative result is `.`.
pub fn join_normalized(folder: &str, name: &str) -> String {
    let joined = match (folder.is_empty(), name.is_empty()) {
        (true, true) => return ".".to_string(),
        (true, false) => name.to_string(),
        (false, true) => folder.to_string(),
        (false, false) => format!("{}/{}", folder, name),
    };

    let absolute = joined.starts_with('/');
    let trailing = joined.ends_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if absolute => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let mut normalized = segments.join("/");
    if normalized.is_empty() && !absolute {
        normalized.push('.');
    }
    if trailing && !normalized.is_empty() {
        normalized.push('/');
    }
    if absolute {
        normalized.insert(0, '/');
    }
    normalized
}

/// Storage path for `key` under `folder`.
pub fn storage_path(folder: &str, key: &str) -> String {
    join_normalized(folder, &sanitize_key(key))
}
