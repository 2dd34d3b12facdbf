use minijinja::{context, Environment};
use std::error::Error;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum PromptError {
    Io(std::io::Error),
    Render(minijinja::Error),
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptError::Io(e) => write!(f, "Failed to read prompt template: {}", e),
            PromptError::Render(e) => write!(f, "Failed to render prompt template: {}", e),
        }
    }
}

impl Error for PromptError {}

/// Renders the on-disk prompt template. The file is re-read on every query
/// so template edits take effect without a restart; the `schema` and
/// `question` values are substituted verbatim, without escaping.
pub struct PromptRenderer {
    template_path: PathBuf,
}

impl PromptRenderer {
    pub fn new(template_path: impl Into<PathBuf>) -> Self {
        Self {
            template_path: template_path.into(),
        }
    }

    pub fn render(&self, schema: &str, question: &str) -> Result<String, PromptError> {
        let template = std::fs::read_to_string(&self.template_path).map_err(PromptError::Io)?;

        let env = Environment::new();
        env.render_str(&template, context! { schema => schema, question => question })
            .map_err(PromptError::Render)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    struct TempTemplate(PathBuf);

    impl TempTemplate {
        fn new(name: &str, contents: &str) -> Self {
            let path = std::env::temp_dir().join(format!("speakql-{}-{}", std::process::id(), name));
            fs::write(&path, contents).expect("write temp template");
            Self(path)
        }
    }

    impl Drop for TempTemplate {
        fn drop(&mut self) {
            let _ = fs::remove_file(&self.0);
        }
    }

    #[test]
    fn substitutes_both_placeholders_verbatim() {
        let template = TempTemplate::new(
            "basic.txt",
            "Schema follows:\n{{ schema }}\nAnswer the question `{{ question }}` in SQL.",
        );
        let renderer = PromptRenderer::new(&template.0);

        let schema = "CREATE TABLE t (a INT); -- 100% of rows";
        let question = "how many rows are in t?";
        let rendered = renderer.render(schema, question).expect("render");

        assert!(rendered.contains(schema));
        assert!(rendered.contains(question));
        // Unrelated template text must come through untouched
        assert!(rendered.starts_with("Schema follows:\n"));
        assert!(rendered.contains("` in SQL."));
    }

    #[test]
    fn template_is_read_fresh_each_render() {
        let template = TempTemplate::new("fresh.txt", "v1 {{ question }}");
        let renderer = PromptRenderer::new(&template.0);

        assert!(renderer.render("s", "q").expect("render").starts_with("v1"));

        fs::write(&template.0, "v2 {{ question }}").expect("rewrite template");
        assert!(renderer.render("s", "q").expect("render").starts_with("v2"));
    }

    #[test]
    fn missing_template_is_an_io_error() {
        let renderer = PromptRenderer::new("/definitely/not/here.txt");
        assert!(matches!(
            renderer.render("s", "q"),
            Err(PromptError::Io(_))
        ));
    }
}
