use super::imports::{ImportSet, UI_BUTTON, UI_FORM};
use crate::emit::{js_number, jsx_attr, jsx_text, CodeWriter};
use crate::measure::LineMetrics;
use crate::model::{FieldDefinition, FieldType};
use crate::schema::rules::numeric_bounds;
use crate::schema::source::date_literal;
use crate::values::parse_date;

const UI_INPUT: &str = "@/components/ui/input";
const UI_TEXTAREA: &str = "@/components/ui/textarea";
const UI_SELECT: &str = "@/components/ui/select";
const UI_CHECKBOX: &str = "@/components/ui/checkbox";
const UI_RADIO: &str = "@/components/ui/radio-group";
const UI_SWITCH: &str = "@/components/ui/switch";
const UI_SLIDER: &str = "@/components/ui/slider";
const UI_CALENDAR: &str = "@/components/ui/calendar";
const UI_POPOVER: &str = "@/components/ui/popover";

/// Levels above a control body once placed in the component: the `FormField`
/// shell plus the `return`, `Form` and `form` wrappers.
const BODY_NESTING: usize = 6;

/// Rendered block plus the imports it relies on.
#[derive(Debug, Clone)]
pub struct FieldFragment {
    pub imports: ImportSet,
    pub markup: String,
}

/// Contents of the `FormItem` for one field.
struct Control {
    item_class: Option<&'static str>,
    imports: ImportSet,
    body: String,
}

type ControlBuilder = fn(&FieldDefinition) -> Control;

fn control_builder(field_type: FieldType) -> ControlBuilder {
    match field_type {
        FieldType::Text | FieldType::Password => input_control,
        FieldType::Textarea => textarea_control,
        FieldType::Select => select_control,
        FieldType::Checkbox => checkbox_control,
        FieldType::Radio => radio_control,
        FieldType::Switch => switch_control,
        FieldType::Slider => slider_control,
        FieldType::Date => date_control,
        FieldType::File => file_control,
    }
}

/// Full `<FormField ... />` block. `extra_class` is appended to the item's
/// class list (used for grid spans).
pub fn render_field(field: &FieldDefinition, extra_class: Option<&str>) -> FieldFragment {
    let control = control_builder(field.field_type)(field);

    let class = match (control.item_class, extra_class) {
        (Some(a), Some(b)) => Some(format!("{} {}", a, b)),
        (Some(a), None) => Some(a.to_string()),
        (None, Some(b)) => Some(b.to_string()),
        (None, None) => None,
    };
    let item_open = match class {
        Some(c) => format!("<FormItem className=\"{}\">", c),
        None => "<FormItem>".to_string(),
    };

    let mut w = CodeWriter::new();
    w.line("<FormField")
        .indent()
        .line("control={form.control}")
        .line(&format!("name=\"{}\"", field.name))
        .line("render={({ field }) => (")
        .indent()
        .line(&item_open)
        .indent()
        .block(&control.body)
        .dedent()
        .line("</FormItem>")
        .dedent()
        .line(")}")
        .dedent()
        .line("/>");

    FieldFragment {
        imports: control.imports,
        markup: w.finish(),
    }
}

fn label_text(field: &FieldDefinition) -> String {
    let label = if field.label.trim().is_empty() {
        field.name.as_str()
    } else {
        field.label.as_str()
    };
    if field.is_required() && !field.field_type.has_inline_label() {
        format!("{} *", label)
    } else {
        label.to_string()
    }
}

fn write_label(w: &mut CodeWriter, field: &FieldDefinition) {
    w.line(&format!("<FormLabel>{}</FormLabel>", jsx_text(&label_text(field))));
}

fn write_description(w: &mut CodeWriter, imports: &mut ImportSet, field: &FieldDefinition) {
    if let Some(text) = field.description.as_deref().filter(|d| !d.trim().is_empty()) {
        imports.add(UI_FORM, "FormDescription");
        w.line(&format!("<FormDescription>{}</FormDescription>", jsx_text(text)));
    }
}

/// Self-closing tag, wrapped one attribute per line when too wide.
fn write_tag(w: &mut CodeWriter, tag: &str, attrs: &[String]) {
    let single = format!("<{} {} />", tag, attrs.join(" "));
    if LineMetrics::default().fits(w.depth() + BODY_NESTING, &single) {
        w.line(&single);
        return;
    }
    w.line(&format!("<{}", tag)).indent();
    for attr in attrs {
        w.line(attr);
    }
    w.dedent().line("/>");
}

fn placeholder_attr(field: &FieldDefinition) -> Option<String> {
    field
        .placeholder
        .as_deref()
        .filter(|p| !p.is_empty())
        .map(|p| format!("placeholder={}", jsx_attr(p)))
}

fn wrapped_control(field: &FieldDefinition, imports: &mut ImportSet, tag: &str, attrs: &[String]) -> String {
    let mut w = CodeWriter::new();
    write_label(&mut w, field);
    w.line("<FormControl>").indent();
    write_tag(&mut w, tag, attrs);
    w.dedent().line("</FormControl>");
    write_description(&mut w, imports, field);
    w.line("<FormMessage />");
    w.finish()
}

fn input_control(field: &FieldDefinition) -> Control {
    let mut imports = ImportSet::new();
    imports.add(UI_INPUT, "Input");

    let input_type = match field.field_type {
        FieldType::Password => "password",
        _ if field.validation.email == Some(true) => "email",
        _ if field.validation.url == Some(true) => "url",
        _ => "text",
    };
    let mut attrs = vec![format!("type=\"{}\"", input_type)];
    attrs.extend(placeholder_attr(field));
    attrs.push("{...field}".to_string());

    let body = wrapped_control(field, &mut imports, "Input", &attrs);
    Control {
        item_class: None,
        imports,
        body,
    }
}

fn textarea_control(field: &FieldDefinition) -> Control {
    let mut imports = ImportSet::new();
    imports.add(UI_TEXTAREA, "Textarea");

    let mut attrs: Vec<String> = placeholder_attr(field).into_iter().collect();
    attrs.push("className=\"resize-none\"".to_string());
    attrs.push("{...field}".to_string());

    let body = wrapped_control(field, &mut imports, "Textarea", &attrs);
    Control {
        item_class: None,
        imports,
        body,
    }
}

fn select_control(field: &FieldDefinition) -> Control {
    let mut imports = ImportSet::new();
    imports.add_all(
        UI_SELECT,
        &["Select", "SelectContent", "SelectItem", "SelectTrigger", "SelectValue"],
    );
    let placeholder = field
        .placeholder
        .as_deref()
        .filter(|p| !p.is_empty())
        .unwrap_or("Select an option");

    let mut w = CodeWriter::new();
    write_label(&mut w, field);
    w.line("<Select onValueChange={field.onChange} value={field.value}>")
        .indent()
        .line("<FormControl>")
        .indent()
        .line("<SelectTrigger>")
        .indent()
        .line(&format!("<SelectValue placeholder={} />", jsx_attr(placeholder)))
        .dedent()
        .line("</SelectTrigger>")
        .dedent()
        .line("</FormControl>")
        .line("<SelectContent>")
        .indent();
    for option in &field.options {
        w.line(&format!(
            "<SelectItem value={}>{}</SelectItem>",
            jsx_attr(&option.value),
            jsx_text(&option.label)
        ));
    }
    w.dedent().line("</SelectContent>").dedent().line("</Select>");
    write_description(&mut w, &mut imports, field);
    w.line("<FormMessage />");

    Control {
        item_class: None,
        imports,
        body: w.finish(),
    }
}

fn checkbox_control(field: &FieldDefinition) -> Control {
    let mut imports = ImportSet::new();
    imports.add(UI_CHECKBOX, "Checkbox");

    let mut w = CodeWriter::new();
    w.line("<FormControl>")
        .indent()
        .line("<Checkbox checked={field.value} onCheckedChange={field.onChange} />")
        .dedent()
        .line("</FormControl>")
        .line("<div className=\"space-y-1 leading-none\">")
        .indent();
    write_label(&mut w, field);
    write_description(&mut w, &mut imports, field);
    w.line("<FormMessage />").dedent().line("</div>");

    Control {
        item_class: Some("flex flex-row items-start space-x-3 space-y-0"),
        imports,
        body: w.finish(),
    }
}

fn switch_control(field: &FieldDefinition) -> Control {
    let mut imports = ImportSet::new();
    imports.add(UI_SWITCH, "Switch");

    let mut w = CodeWriter::new();
    w.line("<div className=\"space-y-0.5\">").indent();
    write_label(&mut w, field);
    write_description(&mut w, &mut imports, field);
    w.line("<FormMessage />")
        .dedent()
        .line("</div>")
        .line("<FormControl>")
        .indent()
        .line("<Switch checked={field.value} onCheckedChange={field.onChange} />")
        .dedent()
        .line("</FormControl>");

    Control {
        item_class: Some("flex flex-row items-center justify-between rounded-lg border p-3"),
        imports,
        body: w.finish(),
    }
}

fn radio_control(field: &FieldDefinition) -> Control {
    let mut imports = ImportSet::new();
    imports.add_all(UI_RADIO, &["RadioGroup", "RadioGroupItem"]);

    let mut w = CodeWriter::new();
    write_label(&mut w, field);
    w.line("<FormControl>")
        .indent()
        .line("<RadioGroup")
        .indent()
        .line("onValueChange={field.onChange}")
        .line("value={field.value}")
        .line("className=\"flex flex-col space-y-1\"")
        .dedent()
        .line(">")
        .indent();
    for option in &field.options {
        w.line("<FormItem className=\"flex items-center space-x-3 space-y-0\">")
            .indent()
            .line("<FormControl>")
            .indent()
            .line(&format!("<RadioGroupItem value={} />", jsx_attr(&option.value)))
            .dedent()
            .line("</FormControl>")
            .line(&format!(
                "<FormLabel className=\"font-normal\">{}</FormLabel>",
                jsx_text(&option.label)
            ))
            .dedent()
            .line("</FormItem>");
    }
    w.dedent()
        .line("</RadioGroup>")
        .dedent()
        .line("</FormControl>");
    write_description(&mut w, &mut imports, field);
    w.line("<FormMessage />");

    Control {
        item_class: Some("space-y-3"),
        imports,
        body: w.finish(),
    }
}

fn slider_control(field: &FieldDefinition) -> Control {
    let mut imports = ImportSet::new();
    imports.add(UI_SLIDER, "Slider");

    // only the bounds the schema enforces
    let (min, max) = numeric_bounds(field);
    let mut attrs: Vec<String> = [("min", min), ("max", max)]
        .into_iter()
        .filter_map(|(key, bound)| bound.map(|b| format!("{}={{{}}}", key, js_number(b))))
        .collect();
    attrs.extend([
        format!("step={{{}}}", js_number(field.step.unwrap_or(1.0))),
        "value={[field.value]}".to_string(),
        "onValueChange={(vals) => field.onChange(vals[0])}".to_string(),
    ]);

    let body = wrapped_control(field, &mut imports, "Slider", &attrs);
    Control {
        item_class: None,
        imports,
        body,
    }
}

fn date_control(field: &FieldDefinition) -> Control {
    let mut imports = ImportSet::new();
    imports
        .add("date-fns", "format")
        .add("lucide-react", "CalendarIcon")
        .add("@/lib/utils", "cn")
        .add(UI_BUTTON, "Button")
        .add(UI_CALENDAR, "Calendar")
        .add_all(UI_POPOVER, &["Popover", "PopoverContent", "PopoverTrigger"]);

    let placeholder = field
        .placeholder
        .as_deref()
        .filter(|p| !p.is_empty())
        .unwrap_or("Pick a date");

    let v = &field.validation;
    let mut bounds = Vec::new();
    if let Some(d) = v.min_date.as_deref().and_then(parse_date) {
        bounds.push(format!("date < {}", date_literal(d)));
    }
    if let Some(d) = v.max_date.as_deref().and_then(parse_date) {
        bounds.push(format!("date > {}", date_literal(d)));
    }

    let mut w = CodeWriter::new();
    write_label(&mut w, field);
    w.line("<Popover>")
        .indent()
        .line("<PopoverTrigger asChild>")
        .indent()
        .line("<FormControl>")
        .indent()
        .line("<Button")
        .indent()
        .line("variant=\"outline\"")
        .line("className={cn(")
        .indent()
        .line("\"w-full pl-3 text-left font-normal\",")
        .line("!field.value && \"text-muted-foreground\"")
        .dedent()
        .line(")}")
        .dedent()
        .line(">")
        .indent()
        .line(&format!(
            "{{field.value ? format(field.value, \"PPP\") : <span>{}</span>}}",
            jsx_text(placeholder)
        ))
        .line("<CalendarIcon className=\"ml-auto h-4 w-4 opacity-50\" />")
        .dedent()
        .line("</Button>")
        .dedent()
        .line("</FormControl>")
        .dedent()
        .line("</PopoverTrigger>")
        .line("<PopoverContent className=\"w-auto p-0\" align=\"start\">")
        .indent()
        .line("<Calendar")
        .indent()
        .line("mode=\"single\"")
        .line("selected={field.value}")
        .line("onSelect={field.onChange}");
    if !bounds.is_empty() {
        w.line(&format!("disabled={{(date) => {}}}", bounds.join(" || ")));
    }
    w.line("initialFocus")
        .dedent()
        .line("/>")
        .dedent()
        .line("</PopoverContent>")
        .dedent()
        .line("</Popover>");
    write_description(&mut w, &mut imports, field);
    w.line("<FormMessage />");

    Control {
        item_class: Some("flex flex-col"),
        imports,
        body: w.finish(),
    }
}

fn file_control(field: &FieldDefinition) -> Control {
    let mut imports = ImportSet::new();
    imports.add(UI_INPUT, "Input");

    let mut attrs = vec!["type=\"file\"".to_string()];
    if let (Some(_), Some(accept)) = (field.accept_filter(), &field.accept) {
        attrs.push(format!("accept={}", jsx_attr(accept)));
    }
    attrs.extend([
        "name={field.name}".to_string(),
        "ref={field.ref}".to_string(),
        "onBlur={field.onBlur}".to_string(),
        "onChange={(event) => field.onChange(event.target.files?.[0])}".to_string(),
    ]);

    let body = wrapped_control(field, &mut imports, "Input", &attrs);
    Control {
        item_class: None,
        imports,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldOption;

    fn render(field: &FieldDefinition) -> String {
        render_field(field, None).markup
    }

    #[test]
    fn test_text_block_shape() {
        let mut f = FieldDefinition::new("1", FieldType::Text, "firstName");
        f.label = "First name".to_string();
        f.placeholder = Some("Ada".to_string());
        f.validation.required = Some(true);
        let out = render(&f);
        assert!(out.starts_with("<FormField\n  control={form.control}\n  name=\"firstName\"\n"));
        assert!(out.contains("<FormLabel>First name *</FormLabel>"));
        assert!(out.contains("<Input type=\"text\" placeholder=\"Ada\" {...field} />"));
        assert!(out.contains("<FormMessage />"));
        assert!(out.ends_with("  )}\n/>\n"));
    }

    #[test]
    fn test_required_marker_only_for_labelled_types() {
        for ty in FieldType::ALL {
            let mut f = FieldDefinition::new("1", ty, "f");
            f.label = "Label".to_string();
            f.validation.required = Some(true);
            let out = render(&f);
            assert_eq!(out.contains("Label *"), !ty.has_inline_label(), "{:?}", ty);
        }
    }

    #[test]
    fn test_select_options_in_order() {
        let mut f = FieldDefinition::new("1", FieldType::Select, "country");
        f.options = vec![
            FieldOption::new("United States", "us"),
            FieldOption::new("Côte d'Ivoire", "ci"),
            FieldOption::new("A & B", "ab"),
        ];
        let out = render(&f);
        let us = out.find("<SelectItem value=\"us\">United States</SelectItem>").unwrap();
        let ci = out.find("<SelectItem value=\"ci\">Côte d'Ivoire</SelectItem>").unwrap();
        let ab = out.find("<SelectItem value=\"ab\">{\"A & B\"}</SelectItem>").unwrap();
        assert!(us < ci && ci < ab);
    }

    #[test]
    fn test_radio_renders_options_as_units() {
        let f = FieldDefinition::new("1", FieldType::Radio, "plan");
        let out = render(&f);
        assert!(out.contains("<RadioGroupItem value=\"option1\" />"));
        assert!(out.contains("<FormLabel className=\"font-normal\">Option 2</FormLabel>"));
        assert!(out.contains("<FormItem className=\"space-y-3\">"));
    }

    #[test]
    fn test_slider_literals() {
        let mut f = FieldDefinition::new("1", FieldType::Slider, "volume");
        f.min = Some(10.0);
        f.max = Some(90.0);
        f.step = Some(0.5);
        let out = render(&f);
        assert!(out.contains("min={10}"));
        assert!(out.contains("max={90}"));
        assert!(out.contains("step={0.5}"));
        assert!(out.contains("value={[field.value]}"));
        assert!(out.contains("onValueChange={(vals) => field.onChange(vals[0])}"));
    }

    #[test]
    fn test_slider_bounds_match_schema() {
        let mut f = FieldDefinition::new("1", FieldType::Slider, "level");
        f.min = None;
        f.max = None;
        f.validation.max = Some(5.0);
        let out = render(&f);
        assert!(!out.contains("min={"));
        assert!(out.contains("max={5}"));
        assert!(out.contains("step={1}"));
    }

    #[test]
    fn test_select_option_values_verbatim() {
        let mut f = FieldDefinition::new("1", FieldType::Select, "dept");
        f.options = vec![FieldOption::new("R&D", "R&amp;D")];
        let out = render(&f);
        assert!(out.contains("<SelectItem value={\"R&amp;D\"}>{\"R&D\"}</SelectItem>"));
    }

    #[test]
    fn test_date_calendar_bounds() {
        let mut f = FieldDefinition::new("1", FieldType::Date, "start");
        f.validation.min_date = Some("2024-01-01".to_string());
        let out = render(&f);
        assert!(out.contains("<PopoverTrigger asChild>"));
        assert!(out.contains("disabled={(date) => date < new Date(2024, 0, 1)}"));
        let imports = render_field(&f, None).imports;
        assert!(imports.contains("date-fns", "format"));
        assert!(imports.contains("@/components/ui/calendar", "Calendar"));
    }

    #[test]
    fn test_file_accept_passthrough() {
        let mut f = FieldDefinition::new("1", FieldType::File, "avatar");
        f.accept = Some("image/png,image/jpeg".to_string());
        let out = render(&f);
        assert!(out.contains("accept=\"image/png,image/jpeg\""));
        assert!(out.contains("field.onChange(event.target.files?.[0])"));

        f.accept = Some("*".to_string());
        assert!(!render(&f).contains("accept="));
        f.accept = Some(String::new());
        assert!(!render(&f).contains("accept="));
    }

    #[test]
    fn test_description_adds_import() {
        let mut f = FieldDefinition::new("1", FieldType::Switch, "alerts");
        f.description = Some("Email me about <things>".to_string());
        let fragment = render_field(&f, None);
        assert!(fragment.markup.contains("<FormDescription>{\"Email me about <things>\"}</FormDescription>"));
        assert!(fragment.imports.contains(UI_FORM, "FormDescription"));
    }

    #[test]
    fn test_extra_class_is_appended() {
        let f = FieldDefinition::new("1", FieldType::Date, "start");
        let out = render_field(&f, Some("md:col-span-2")).markup;
        assert!(out.contains("<FormItem className=\"flex flex-col md:col-span-2\">"));
    }
}
