//! HTML page and index templates.
//!
//! Both templates are parsed once into a shared [`minijinja::Environment`]
//! with HTML auto-escaping. The rendered markup fragment is inserted as a
//! safe string; titles and file names are escaped.

use minijinja::{Environment, UndefinedBehavior, Value, context};

const PAGE_NAME: &str = "page.html";
const INDEX_NAME: &str = "index.html";

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{{ title }}</title>
<style>
body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; max-width: 800px; margin: 0 auto; padding: 20px; line-height: 1.6; }
pre { background: #f4f4f4; padding: 10px; border-radius: 5px; overflow-x: auto; }
code { background: #f4f4f4; padding: 2px 5px; border-radius: 3px; }
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
th { background-color: #f2f2f2; }
</style>
</head>
<body>
{{ content }}
</body>
</html>
"#;

const INDEX_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<title>{{ title }}</title>
<style>
body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; max-width: 800px; margin: 0 auto; padding: 20px; }
ul { list-style-type: none; padding: 0; }
li { margin: 10px 0; }
a { color: #0366d6; text-decoration: none; }
a:hover { text-decoration: underline; }
</style>
</head>
<body>
<h1>{{ heading }}</h1>
<ul>
{%- for page in pages %}
<li><a href="{{ page }}">{{ page }}</a></li>
{%- endfor %}
</ul>
</body>
</html>
"#;

/// Parsed site templates, shared read-only by all build workers.
#[derive(Debug)]
pub struct SiteTemplates {
    env: Environment<'static>,
}

impl SiteTemplates {
    /// Parse the built-in page and index templates.
    ///
    /// # Errors
    ///
    /// Returns an error if a template fails to parse.
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.add_template(PAGE_NAME, PAGE_TEMPLATE)?;
        env.add_template(INDEX_NAME, INDEX_TEMPLATE)?;
        Ok(Self { env })
    }

    /// Wrap a rendered fragment in a complete HTML document.
    pub fn render_page(&self, title: &str, content: String) -> Result<String, minijinja::Error> {
        self.env.get_template(PAGE_NAME)?.render(context! {
            title,
            content => Value::from_safe_string(content),
        })
    }

    /// Render the index listing `pages` in the given order.
    pub fn render_index(
        &self,
        title: &str,
        heading: &str,
        pages: &[&str],
    ) -> Result<String, minijinja::Error> {
        self.env
            .get_template(INDEX_NAME)?
            .render(context! { title, heading, pages })
    }
}
