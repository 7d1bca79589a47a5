use std::collections::HashSet;

use crate::defaults;
use crate::emit::CodeWriter;
use crate::markup::fields::render_field;
use crate::markup::imports::{ImportSet, ZOD};
use crate::markup::use_form_block;
use crate::model::{FieldDefinition, FieldType};
use crate::schema::{build_rules, source::render_declarations};

pub const HOOK_NAME: &str = "useGeneratedForm";
pub const EXAMPLE_NAME: &str = "ExampleUsage";

/// Select, radio, date and file need non-trivial wiring, so each of them gets
/// its own example. Other types are shown once.
fn is_complex(field_type: FieldType) -> bool {
    matches!(
        field_type,
        FieldType::Select | FieldType::Radio | FieldType::Date | FieldType::File
    )
}

/// Fields shown in the example component, in form order.
pub fn example_fields(fields: &[FieldDefinition]) -> Vec<&FieldDefinition> {
    let mut seen = HashSet::new();
    fields
        .iter()
        .filter(|f| is_complex(f.field_type) || seen.insert(f.field_type))
        .collect()
}

pub fn generate(fields: &[FieldDefinition]) -> String {
    let examples = example_fields(fields);

    let mut imports = ImportSet::form_base();
    imports.add(ZOD, "z");
    let blocks: Vec<String> = examples
        .iter()
        .map(|field| {
            let fragment = render_field(field, None);
            imports.merge(&fragment.imports);
            fragment.markup
        })
        .collect();

    let mut w = CodeWriter::new();
    w.line("\"use client\"").blank();
    w.block(&imports.render()).blank();
    w.block(&render_declarations(&build_rules(fields), false)).blank();

    w.line(&format!("export function {}() {{", HOOK_NAME)).indent();
    w.block(&use_form_block(&defaults::generate(fields))).blank();
    w.line("return form").dedent().line("}").blank();

    w.line(&format!("export function {}() {{", EXAMPLE_NAME))
        .indent()
        .line(&format!("const form = {}()", HOOK_NAME))
        .blank()
        .line("return (")
        .indent()
        .line("<Form {...form}>")
        .indent()
        .line("<form")
        .indent()
        .line("onSubmit={form.handleSubmit((values) => console.log(values))}")
        .line("className=\"space-y-6\"")
        .dedent()
        .line(">")
        .indent();
    for block in &blocks {
        w.block(block);
    }
    w.line("<Button type=\"submit\">Submit</Button>")
        .dedent()
        .line("</form>")
        .dedent()
        .line("</Form>")
        .dedent()
        .line(")")
        .dedent()
        .line("}");

    let out = w.finish();
    log::debug!(
        "setup: {} of {} fields shown, {} bytes",
        examples.len(),
        fields.len(),
        out.len()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup;
    use crate::model::FormSettings;

    fn field(ty: FieldType, name: &str) -> FieldDefinition {
        FieldDefinition::new(format!("id-{}", name), ty, name)
    }

    #[test]
    fn test_empty_form_keeps_wiring() {
        let out = generate(&[]);
        assert!(out.contains("const formSchema = z.object({})"));
        assert!(out.contains("    resolver: zodResolver(formSchema),\n"));
        assert!(out.contains("    defaultValues: {},\n"));
        assert!(out.contains("import { z } from \"zod\""));
        assert!(out.contains("export function useGeneratedForm() {"));
    }

    #[test]
    fn test_example_subset() {
        let fields = vec![
            field(FieldType::Text, "first"),
            field(FieldType::Text, "last"),
            field(FieldType::Checkbox, "terms"),
            field(FieldType::Select, "country"),
            field(FieldType::Select, "region"),
            field(FieldType::Date, "start"),
            field(FieldType::File, "resume"),
            field(FieldType::Checkbox, "news"),
        ];
        let names: Vec<&str> = example_fields(&fields).iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["first", "terms", "country", "region", "start", "resume"]);

        let out = generate(&fields);
        assert!(out.contains("name=\"country\""));
        assert!(out.contains("name=\"region\""));
        assert!(!out.contains("name=\"last\""));
        assert!(out.contains("<PopoverTrigger asChild>"));
        assert!(out.contains("event.target.files?.[0]"));
    }

    #[test]
    fn test_defaults_match_component() {
        let mut volume = field(FieldType::Slider, "volume");
        volume.min = Some(5.0);
        let fields = vec![field(FieldType::Text, "name"), volume, field(FieldType::Date, "start")];

        let block = use_form_block(&defaults::generate(&fields));
        let indented: String = block.lines().map(|l| format!("  {}\n", l)).collect();
        assert!(generate(&fields).contains(&indented));
        assert!(markup::generate(&fields, &FormSettings::default()).contains(&indented));
    }

    #[test]
    fn test_schema_is_inline_and_not_exported() {
        let mut f = field(FieldType::Text, "email");
        f.validation.email = Some(true);
        let out = generate(&[f]);
        assert!(out.contains("\nconst formSchema = z.object({\n  email: z.string().email("));
        assert!(out.contains("\ntype FormSchema = z.infer<typeof formSchema>\n"));
        assert!(!out.contains("export const formSchema"));
    }
}
