use std::collections::{BTreeMap, BTreeSet};

use crate::measure::LineMetrics;

pub const RESOLVER: &str = "@hookform/resolvers/zod";
pub const REACT_HOOK_FORM: &str = "react-hook-form";
pub const ZOD: &str = "zod";
pub const UI_BUTTON: &str = "@/components/ui/button";
pub const UI_FORM: &str = "@/components/ui/form";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSet {
    modules: BTreeMap<String, BTreeSet<String>>,
}

impl ImportSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, module: &str, name: &str) -> &mut Self {
        self.modules
            .entry(module.to_string())
            .or_default()
            .insert(name.to_string());
        self
    }

    pub fn add_all(&mut self, module: &str, names: &[&str]) -> &mut Self {
        for name in names {
            self.add(module, name);
        }
        self
    }

    pub fn merge(&mut self, other: &ImportSet) {
        for (module, names) in &other.modules {
            let entry = self.modules.entry(module.clone()).or_default();
            entry.extend(names.iter().cloned());
        }
    }

    pub fn contains(&self, module: &str, name: &str) -> bool {
        self.modules.get(module).is_some_and(|n| n.contains(name))
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Form-wiring imports every generated form needs.
    pub fn form_base() -> Self {
        let mut set = Self::new();
        set.add(RESOLVER, "zodResolver")
            .add(REACT_HOOK_FORM, "useForm")
            .add(UI_BUTTON, "Button")
            .add_all(
                UI_FORM,
                &["Form", "FormControl", "FormField", "FormItem", "FormLabel", "FormMessage"],
            );
        set
    }

    /// Package imports first, then `@/` aliases, separated by a blank line.
    pub fn render(&self) -> String {
        let metrics = LineMetrics::default();
        let (packages, aliases): (Vec<_>, Vec<_>) = self
            .modules
            .iter()
            .partition(|(module, _)| !module.starts_with("@/"));

        let mut groups = Vec::new();
        for group in [packages, aliases] {
            if group.is_empty() {
                continue;
            }
            let mut text = String::new();
            for (module, names) in group {
                text.push_str(&render_statement(&metrics, module, names));
            }
            groups.push(text);
        }
        groups.join("\n")
    }
}

fn render_statement(metrics: &LineMetrics, module: &str, names: &BTreeSet<String>) -> String {
    let list: Vec<&str> = names.iter().map(String::as_str).collect();
    let single = format!("import {{ {} }} from \"{}\"", list.join(", "), module);
    if metrics.fits(0, &single) {
        return format!("{}\n", single);
    }

    let mut out = String::from("import {\n");
    for name in list {
        out.push_str(&format!("  {},\n", name));
    }
    out.push_str(&format!("}} from \"{}\"\n", module));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_and_sorting() {
        let mut set = ImportSet::new();
        set.add("@/components/ui/input", "Input")
            .add("zod", "z")
            .add("@/components/ui/button", "Button")
            .add("@/components/ui/input", "Input");

        assert_eq!(
            set.render(),
            "import { z } from \"zod\"\n\
             \n\
             import { Button } from \"@/components/ui/button\"\n\
             import { Input } from \"@/components/ui/input\"\n"
        );
    }

    #[test]
    fn test_long_statement_wraps() {
        let rendered = ImportSet::form_base().render();
        assert!(rendered.contains("import {\n  Form,\n  FormControl,\n"));
        assert!(rendered.contains("} from \"@/components/ui/form\"\n"));
        assert!(rendered.starts_with("import { zodResolver } from \"@hookform/resolvers/zod\"\n"));
    }

    #[test]
    fn test_insertion_order_does_not_matter() {
        let mut a = ImportSet::new();
        a.add("x", "B").add("y", "A").add("x", "A");
        let mut b = ImportSet::new();
        b.add("y", "A").add("x", "A").add("x", "B");
        assert_eq!(a.render(), b.render());
    }
}
