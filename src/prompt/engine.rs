use tera::Tera;

/// Tera-backed template engine for building structured prompts.
///
/// Templates are registered under names without an `.html`/`.xml` suffix, so
/// Tera never autoescapes: values are rendered verbatim.
pub struct TeraEngine {
    tera: Tera,
}

impl TeraEngine {
    /// Create with inline templates (no filesystem).
    pub fn new() -> anyhow::Result<Self> {
        let tera = Tera::default();
        Ok(Self { tera })
    }

    /// Create and register a fixed set of `(name, source)` templates.
    pub fn with_templates(templates: &[(&str, &str)]) -> anyhow::Result<Self> {
        let mut engine = Self::new()?;
        for (name, source) in templates {
            engine.add_template(name, source)?;
        }
        Ok(engine)
    }

    /// Register a template from a string.
    pub fn add_template(&mut self, name: &str, content: &str) -> anyhow::Result<()> {
        self.tera.add_raw_template(name, content)?;
        Ok(())
    }

    /// Render a named template with the given context.
    pub fn render(&self, template_name: &str, context: &tera::Context) -> anyhow::Result<String> {
        let rendered = self.tera.render(template_name, context)?;
        Ok(rendered)
    }
}
