use std::sync::OnceLock;

use minijinja::{Environment, Value};

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("film_detail.html", include_str!("../templates/film_detail.html")),
    ("film_add.html", include_str!("../templates/film_add.html")),
    ("film_edit.html", include_str!("../templates/film_edit.html")),
    ("error.html", include_str!("../templates/error.html")),
];

/// Compiled-in HTML templates. Names ending in `.html` are auto-escaped.
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    /// Process-wide instance for callers without access to the app state,
    /// such as error responses.
    pub fn shared() -> Result<&'static Templates, String> {
        static SHARED: OnceLock<Result<Templates, String>> = OnceLock::new();
        SHARED
            .get_or_init(|| Templates::new().map_err(|e| e.to_string()))
            .as_ref()
            .map_err(Clone::clone)
    }

    pub fn render(&self, name: &str, ctx: Value) -> Result<String, minijinja::Error> {
        self.env.get_template(name)?.render(ctx)
    }
}
