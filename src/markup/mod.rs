pub mod fields;
pub mod imports;

use serde::{Deserialize, Serialize};

use crate::defaults::{self, DefaultValues};
use crate::emit::{js_string, jsx_attr, jsx_text, CodeWriter};
use crate::model::{FieldDefinition, FormLayout, FormSettings, GRID_COLUMNS};
use crate::schema::source::{SCHEMA_NAME, SCHEMA_TYPE};
use fields::render_field;
use imports::ImportSet;

pub const DEFAULT_COMPONENT_NAME: &str = "GeneratedForm";
pub const DEFAULT_SCHEMA_IMPORT: &str = "@/lib/form-schema";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodegenOptions {
    pub component_name: String,
    pub schema_import: String,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            component_name: DEFAULT_COMPONENT_NAME.to_string(),
            schema_import: DEFAULT_SCHEMA_IMPORT.to_string(),
        }
    }
}

/// `const form = useForm(...)` declaration, unindented. Shared with the
/// setup generator so both emit the same resolver and defaults.
pub fn use_form_block(defaults: &DefaultValues) -> String {
    format!(
        "const form = useForm<{ty}>({{\n  resolver: zodResolver({schema}),\n  defaultValues: {values},\n}})",
        ty = SCHEMA_TYPE,
        schema = SCHEMA_NAME,
        values = defaults.to_source(1),
    )
}

/// Grid span for a field inside the two-column wrapper.
fn span_class(field: &FieldDefinition, settings: &FormSettings) -> Option<&'static str> {
    let wide = field
        .layout
        .as_ref()
        .is_some_and(|l| l.w > GRID_COLUMNS / 2);
    (settings.layout == FormLayout::TwoColumn && wide).then_some("md:col-span-2")
}

#[derive(Debug, Clone, Default)]
pub struct ComponentGenerator {
    options: CodegenOptions,
}

impl ComponentGenerator {
    pub fn new(options: CodegenOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CodegenOptions {
        &self.options
    }

    pub fn generate(&self, fields: &[FieldDefinition], settings: &FormSettings) -> String {
        if fields.is_empty() {
            return self.placeholder();
        }

        let mut imports = ImportSet::form_base();
        imports
            .add(&self.options.schema_import, SCHEMA_NAME)
            .add(&self.options.schema_import, &format!("type {}", SCHEMA_TYPE));
        if settings.show_success_message {
            imports.add("sonner", "toast");
        }

        let blocks: Vec<String> = fields
            .iter()
            .map(|field| {
                let fragment = render_field(field, span_class(field, settings));
                imports.merge(&fragment.imports);
                fragment.markup
            })
            .collect();

        let mut w = CodeWriter::new();
        w.line("\"use client\"").blank();
        w.block(&imports.render()).blank();
        w.line(&format!("export function {}() {{", self.options.component_name))
            .indent();
        w.block(&use_form_block(&defaults::generate(fields))).blank();
        self.write_submit_handler(&mut w, settings);
        w.blank().line("return (").indent();
        w.line("<Form {...form}>").indent();
        w.line(&format!(
            "<form onSubmit={{form.handleSubmit(onSubmit)}} className=\"{} {}\">",
            settings.spacing.class(),
            settings.form_width.class()
        ))
        .indent();

        let two_column = settings.layout == FormLayout::TwoColumn;
        if two_column {
            w.line(&format!(
                "<div className=\"grid grid-cols-1 md:grid-cols-2 {}\">",
                settings.spacing.gap_class()
            ))
            .indent();
        }
        for block in &blocks {
            w.block(block);
        }
        if two_column {
            w.dedent().line("</div>");
        }
        write_buttons(&mut w, settings);

        w.dedent().line("</form>");
        w.dedent().line("</Form>");
        w.dedent().line(")");
        w.dedent().line("}");

        let out = w.finish();
        log::debug!(
            "component {}: {} fields, {} bytes",
            self.options.component_name,
            fields.len(),
            out.len()
        );
        out
    }

    fn placeholder(&self) -> String {
        let mut w = CodeWriter::new();
        w.line(&format!("export function {}() {{", self.options.component_name))
            .indent()
            .line("return (")
            .indent()
            .line("<div className=\"p-4 text-sm text-muted-foreground\">")
            .indent()
            .line("No fields yet. Add fields to generate a form.")
            .dedent()
            .line("</div>")
            .dedent()
            .line(")")
            .dedent()
            .line("}");
        w.finish()
    }

    fn write_submit_handler(&self, w: &mut CodeWriter, settings: &FormSettings) {
        w.line(&format!("function onSubmit(values: {}) {{", SCHEMA_TYPE))
            .indent()
            .line("console.log(values)");
        if settings.show_success_message {
            w.line(&format!("toast.success({})", js_string(settings.success_text())));
        }
        if settings.reset_on_submit {
            w.line("form.reset()");
        }
        w.dedent().line("}");
    }
}

fn write_buttons(w: &mut CodeWriter, settings: &FormSettings) {
    if !settings.show_submit_button && !settings.show_cancel_button {
        return;
    }
    w.line("<div className=\"flex gap-4\">").indent();
    if settings.show_submit_button {
        w.line(&format!(
            "<Button type=\"submit\">{}</Button>",
            jsx_text(settings.submit_label())
        ));
    }
    if settings.show_cancel_button {
        w.line(&format!(
            "<Button type=\"button\" variant={} onClick={{() => form.reset()}}>",
            jsx_attr("outline")
        ))
        .indent()
        .line(&jsx_text(settings.cancel_label()))
        .dedent()
        .line("</Button>");
    }
    w.dedent().line("</div>");
}

pub fn generate(fields: &[FieldDefinition], settings: &FormSettings) -> String {
    ComponentGenerator::default().generate(fields, settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldType, GridPlacement};
    use proptest::prelude::*;

    fn field(ty: FieldType, name: &str) -> FieldDefinition {
        FieldDefinition::new(format!("id-{}", name), ty, name)
    }

    #[test]
    fn test_empty_form_is_placeholder() {
        let out = generate(&[], &FormSettings::default());
        assert!(out.starts_with("export function GeneratedForm() {"));
        assert!(!out.contains("import"));
        assert!(!out.contains("useForm"));
    }

    #[test]
    fn test_component_skeleton() {
        let out = generate(&[field(FieldType::Text, "name")], &FormSettings::default());
        assert!(out.starts_with("\"use client\"\n\nimport { zodResolver } from \"@hookform/resolvers/zod\"\n"));
        assert!(out.contains("import { toast } from \"sonner\"\n"));
        assert!(out.contains("import { formSchema, type FormSchema } from \"@/lib/form-schema\"\n"));
        assert!(out.contains("  const form = useForm<FormSchema>({\n    resolver: zodResolver(formSchema),\n    defaultValues: {\n      name: \"\",\n    },\n  })\n"));
        assert!(out.contains("toast.success(\"Form submitted successfully!\")"));
        assert!(!out.contains("form.reset()"));
        assert!(out.contains("<form onSubmit={form.handleSubmit(onSubmit)} className=\"space-y-6 max-w-2xl\">"));
        assert!(out.contains("<Button type=\"submit\">Submit</Button>"));
        assert!(!out.contains("Cancel"));
        assert!(out.ends_with("  )\n}\n"));
    }

    #[test]
    fn test_imports_follow_field_types() {
        let out = generate(&[field(FieldType::Text, "a")], &FormSettings::default());
        assert!(!out.contains("@/components/ui/slider"));
        let out = generate(
            &[field(FieldType::Slider, "a"), field(FieldType::Slider, "b")],
            &FormSettings::default(),
        );
        assert_eq!(out.matches("import { Slider } from \"@/components/ui/slider\"").count(), 1);
    }

    #[test]
    fn test_button_settings() {
        let fields = [field(FieldType::Text, "a")];
        let mut settings = FormSettings {
            show_cancel_button: true,
            submit_button_text: "Send".to_string(),
            cancel_button_text: String::new(),
            ..FormSettings::default()
        };
        let out = generate(&fields, &settings);
        assert!(out.contains("<Button type=\"submit\">Send</Button>"));
        assert!(out.contains("onClick={() => form.reset()}>\n"));
        assert!(out.contains("            Cancel\n"));

        settings.show_submit_button = false;
        settings.show_cancel_button = false;
        let out = generate(&fields, &settings);
        assert!(!out.contains("<Button type="));
        assert!(!out.contains("flex gap-4"));
    }

    #[test]
    fn test_two_column_wraps_fields() {
        let mut wide = field(FieldType::Textarea, "bio");
        wide.layout = Some(GridPlacement { x: 0, y: 0, w: 12, h: 2 });
        let narrow = field(FieldType::Text, "first");
        let settings = FormSettings {
            layout: FormLayout::TwoColumn,
            ..FormSettings::default()
        };
        let out = generate(&[narrow.clone(), wide.clone()], &settings);
        assert!(out.contains("<div className=\"grid grid-cols-1 md:grid-cols-2 gap-6\">"));
        assert!(out.contains("<FormItem className=\"md:col-span-2\">"));

        let out = generate(&[narrow, wide], &FormSettings::default());
        assert!(!out.contains("grid-cols"));
        assert!(!out.contains("md:col-span-2"));
    }

    #[test]
    fn test_submit_handler_honours_settings() {
        let settings = FormSettings {
            reset_on_submit: true,
            show_success_message: false,
            ..FormSettings::default()
        };
        let out = generate(&[field(FieldType::Text, "a")], &settings);
        assert!(out.contains("    console.log(values)\n    form.reset()\n"));
        assert!(!out.contains("sonner"));
    }

    #[test]
    fn test_custom_options() {
        let generator = ComponentGenerator::new(CodegenOptions {
            component_name: "ContactForm".to_string(),
            schema_import: "@/schemas/contact".to_string(),
        });
        let out = generator.generate(&[field(FieldType::Text, "a")], &FormSettings::default());
        assert!(out.contains("export function ContactForm() {"));
        assert!(out.contains("from \"@/schemas/contact\""));
    }

    #[test]
    fn test_every_field_has_message_slot() {
        let fields: Vec<FieldDefinition> = FieldType::ALL
            .iter()
            .enumerate()
            .map(|(i, ty)| field(*ty, &format!("f{}", i)))
            .collect();
        let out = generate(&fields, &FormSettings::default());
        assert_eq!(out.matches("<FormField").count(), fields.len());
        assert_eq!(out.matches("<FormMessage />").count(), fields.len());
    }

    fn arb_field_type() -> impl Strategy<Value = FieldType> {
        (0..FieldType::ALL.len()).prop_map(|i| FieldType::ALL[i])
    }

    proptest! {
        #[test]
        fn prop_markers_follow_field_order(types in prop::collection::vec(arb_field_type(), 1..15)) {
            let fields: Vec<FieldDefinition> = types
                .iter()
                .enumerate()
                .map(|(i, ty)| field(*ty, &format!("field{}", i)))
                .collect();
            let out = generate(&fields, &FormSettings::default());
            let mut last = 0;
            for f in &fields {
                let marker = format!("name=\"{}\"", f.name);
                let pos = out.find(&marker);
                prop_assert!(pos.is_some());
                let pos = pos.unwrap();
                prop_assert!(pos > last);
                last = pos;
            }
        }

        #[test]
        fn prop_generation_is_deterministic(types in prop::collection::vec(arb_field_type(), 0..15)) {
            let fields: Vec<FieldDefinition> = types
                .iter()
                .enumerate()
                .map(|(i, ty)| field(*ty, &format!("f{}", i)))
                .collect();
            let copy = fields.clone();
            prop_assert_eq!(
                generate(&fields, &FormSettings::default()),
                generate(&copy, &FormSettings::default())
            );
        }
    }
}
