use chrono::{Datelike, NaiveDate};

use super::rules::{Base, Check, FieldRule, Presence, CHOICE_MESSAGE, REQUIRED_MESSAGE};
use crate::emit::{js_number, js_string, CodeWriter};
use crate::measure::LineMetrics;

pub const SCHEMA_NAME: &str = "formSchema";
pub const SCHEMA_TYPE: &str = "FormSchema";

/// Helper emitted next to the schema whenever a file field filters by type.
pub const ACCEPT_HELPER: &str = r#"const matchesAccept = (file: File, accept: string[]) =>
  accept.some((entry) =>
    entry.startsWith(".")
      ? file.name.toLowerCase().endsWith(entry.toLowerCase())
      : entry.endsWith("/*")
        ? file.type.startsWith(entry.slice(0, -1))
        : file.type === entry
  )"#;

/// Local-midnight date literal, matching what a date picker produces.
pub fn date_literal(date: NaiveDate) -> String {
    format!("new Date({}, {}, {})", date.year(), date.month0(), date.day())
}

fn message_arg(message: &str) -> String {
    format!("{{ message: {} }}", js_string(message))
}

fn string_list(values: &[String]) -> String {
    let items: Vec<String> = values.iter().map(|v| js_string(v)).collect();
    format!("[{}]", items.join(", "))
}

/// Chain segments after the leading `z`: `.string()`, `.min(..)`, ...
fn segments(rule: &FieldRule) -> Vec<String> {
    let required = rule.presence == Presence::Required;
    let required_param = format!("{{ required_error: {} }}", js_string(REQUIRED_MESSAGE));

    let mut out = vec![match &rule.base {
        Base::String if required => format!(".string({})", required_param),
        Base::String => ".string()".to_string(),
        Base::Enum(values) if required => {
            format!(".enum({}, {})", string_list(values), message_arg(CHOICE_MESSAGE))
        }
        Base::Enum(values) => format!(
            ".union([z.literal(\"\"), z.enum({})])",
            string_list(values)
        ),
        Base::Boolean if required => format!(".boolean({})", required_param),
        Base::Boolean => ".boolean()".to_string(),
        Base::Number if required => format!(".number({})", required_param),
        Base::Number => ".number()".to_string(),
        Base::Date if required => format!(".date({})", required_param),
        Base::Date => ".date()".to_string(),
        Base::File if required => format!(".instanceof(File, {})", message_arg(REQUIRED_MESSAGE)),
        Base::File => ".instanceof(File)".to_string(),
    }];

    for check in &rule.checks {
        let msg = message_arg(check.message());
        out.push(match check {
            Check::Email { .. } => format!(".email({})", msg),
            Check::Url { .. } => format!(".url({})", msg),
            Check::MinLength { length, .. } => format!(".min({}, {})", length, msg),
            Check::MaxLength { length, .. } => format!(".max({}, {})", length, msg),
            Check::Pattern { source, .. } => {
                format!(".regex(new RegExp({}), {})", js_string(source), msg)
            }
            Check::MinValue { value, .. } => format!(".min({}, {})", js_number(*value), msg),
            Check::MaxValue { value, .. } => format!(".max({}, {})", js_number(*value), msg),
            Check::MinDate { date, .. } => format!(".min({}, {})", date_literal(*date), msg),
            Check::MaxDate { date, .. } => format!(".max({}, {})", date_literal(*date), msg),
            Check::Accept { entries, .. } => format!(
                ".refine((file) => matchesAccept(file, {}), {})",
                string_list(entries),
                msg
            ),
            Check::MaxSize { bytes, .. } => {
                format!(".refine((file) => file.size <= {}, {})", bytes, msg)
            }
            Check::NonEmpty { .. } => format!(".min(1, {})", msg),
            Check::MustBeTrue { .. } => format!(".refine((value) => value === true, {})", msg),
        });
    }

    if !required {
        out.push(".optional()".to_string());
    }
    out
}

/// The zod expression for one rule on a single line.
pub fn render_expression(rule: &FieldRule) -> String {
    format!("z{}", segments(rule).concat())
}

fn write_property(w: &mut CodeWriter, metrics: &LineMetrics, rule: &FieldRule) {
    let single = format!("{}: {},", rule.name, render_expression(rule));
    if metrics.fits(w.depth(), &single) {
        w.line(&single);
        return;
    }

    w.line(&format!("{}: z", rule.name));
    w.indent();
    let segs = segments(rule);
    let last = segs.len() - 1;
    for (i, seg) in segs.iter().enumerate() {
        if i == last {
            w.line(&format!("{},", seg));
        } else {
            w.line(seg);
        }
    }
    w.dedent();
}

/// `const`-free `z.object({...})` expression; the first line is unindented
/// and nested lines start at `depth + 1`.
pub fn render_object(rules: &[FieldRule], depth: usize) -> String {
    if rules.is_empty() {
        return "z.object({})".to_string();
    }
    let metrics = LineMetrics::default();
    let mut w = CodeWriter::with_depth(depth + 1);
    for rule in rules {
        write_property(&mut w, &metrics, rule);
    }
    let mut out = String::from("z.object({\n");
    out.push_str(&w.finish());
    out.push_str(&"  ".repeat(depth));
    out.push_str("})");
    out
}

pub fn needs_accept_helper(rules: &[FieldRule]) -> bool {
    rules
        .iter()
        .flat_map(|r| r.checks.iter())
        .any(|c| matches!(c, Check::Accept { .. }))
}

/// Schema declaration block: optional helper, the schema and its type.
pub fn render_declarations(rules: &[FieldRule], export: bool) -> String {
    let keyword = if export { "export " } else { "" };
    let mut w = CodeWriter::new();
    if needs_accept_helper(rules) {
        w.block(ACCEPT_HELPER).blank();
    }
    w.block(&format!(
        "{}const {} = {}",
        keyword,
        SCHEMA_NAME,
        render_object(rules, 0)
    ));
    w.blank();
    w.line(&format!(
        "{}type {} = z.infer<typeof {}>",
        keyword, SCHEMA_TYPE, SCHEMA_NAME
    ));
    w.finish()
}

/// Complete schema module.
pub fn render_module(rules: &[FieldRule]) -> String {
    let mut out = String::from("import { z } from \"zod\"\n\n");
    out.push_str(&render_declarations(rules, true));
    out
}
