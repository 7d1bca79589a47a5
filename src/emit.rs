/// Double-quoted JS/TS string literal.
pub fn js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Text placed between JSX tags. Falls back to an expression container when
/// the text would otherwise be parsed as markup or collapse whitespace.
pub fn jsx_text(s: &str) -> String {
    let needs_expr = s.is_empty()
        || s.trim() != s
        || s.chars().any(|c| matches!(c, '{' | '}' | '<' | '>' | '&' | '\n' | '\r'));
    if needs_expr {
        format!("{{{}}}", js_string(s))
    } else {
        s.to_string()
    }
}

/// A JSX attribute value including the quotes or braces. Quoted attributes
/// decode HTML entities, so `&` goes through an expression too.
pub fn jsx_attr(s: &str) -> String {
    if s.chars().any(|c| matches!(c, '"' | '&' | '\\' | '\n' | '\r')) {
        format!("{{{}}}", js_string(s))
    } else {
        format!("\"{}\"", s)
    }
}

/// Numeric literal without a trailing `.0` for whole numbers.
pub fn js_number(n: f64) -> String {
    if !n.is_finite() {
        return "0".to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Line-oriented writer with two-space indentation.
#[derive(Debug, Default)]
pub struct CodeWriter {
    buf: String,
    depth: usize,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_depth(depth: usize) -> Self {
        Self {
            buf: String::new(),
            depth,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn line(&mut self, text: &str) -> &mut Self {
        if !text.is_empty() {
            for _ in 0..self.depth {
                self.buf.push_str("  ");
            }
            self.buf.push_str(text);
        }
        self.buf.push('\n');
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.buf.push('\n');
        self
    }

    /// Append pre-rendered lines at the current depth.
    pub fn block(&mut self, text: &str) -> &mut Self {
        for l in text.lines() {
            self.line(l);
        }
        self
    }

    pub fn indent(&mut self) -> &mut Self {
        self.depth += 1;
        self
    }

    pub fn dedent(&mut self) -> &mut Self {
        self.depth = self.depth.saturating_sub(1);
        self
    }

    pub fn finish(self) -> String {
        self.buf
    }
}
