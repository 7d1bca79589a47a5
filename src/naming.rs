use crate::store::ModelError;

/// Words that cannot be used as object keys in destructuring or as bindings
/// in the generated sources.
const RESERVED: &[&str] = &[
    "arguments", "await", "break", "case", "catch", "class", "const", "continue",
    "debugger", "default", "delete", "do", "else", "enum", "eval", "export", "extends",
    "false", "finally", "for", "function", "if", "implements", "import", "in",
    "instanceof", "interface", "let", "new", "null", "package", "private", "protected",
    "public", "return", "static", "super", "switch", "this", "throw", "true", "try",
    "typeof", "undefined", "var", "void", "while", "with", "yield",
];

pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}

/// Letters, digits, `_` and `$`, not starting with a digit.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.is_empty() {
        return Err(ModelError::EmptyName);
    }
    if !is_identifier(name) {
        return Err(ModelError::InvalidName(name.to_string()));
    }
    if is_reserved(name) {
        return Err(ModelError::ReservedName(name.to_string()));
    }
    Ok(())
}

/// First `{prefix}{n}` (n >= 1) not accepted by `taken`.
pub fn next_free_name(prefix: &str, taken: impl Fn(&str) -> bool) -> String {
    let mut n = 1usize;
    loop {
        let candidate = format!("{}{}", prefix, n);
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
