use crate::error::PatternCompileError;
use crate::router::ParamVec;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Fragment used for placeholders that have no registered pattern.
pub const DEFAULT_PARAM_PATTERN: &str = "[^/]+";

/// `{name}` placeholder token. Names follow identifier rules so they are
/// always valid capture-group names.
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder regex should be valid")
});

/// Placeholder-name → regex-fragment table used to compile templates.
///
/// Last registration for a name wins. Fragments are not validated here; a
/// broken fragment surfaces as a [`PatternCompileError`] when a template
/// that uses it is compiled.
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    fragments: HashMap<String, String>,
    default_fragment: String,
}

impl Default for PatternRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::with_default_fragment(DEFAULT_PARAM_PATTERN)
    }

    /// Registry whose unregistered placeholders use `fragment` instead of `[^/]+`.
    #[must_use]
    pub fn with_default_fragment(fragment: impl Into<String>) -> Self {
        Self {
            fragments: HashMap::new(),
            default_fragment: fragment.into(),
        }
    }

    /// Store the fragment for `name`, returning the one it replaced.
    pub fn register(&mut self, name: impl Into<String>, fragment: impl Into<String>) -> Option<String> {
        let name = name.into();
        let fragment = fragment.into();
        debug!(placeholder = %name, fragment = %fragment, "Pattern registered");
        let previous = self.fragments.insert(name.clone(), fragment);
        if let Some(ref old) = previous {
            warn!(placeholder = %name, replaced = %old, "Pattern overwritten");
        }
        previous
    }

    /// Fragment a placeholder compiles to (registered or default).
    #[must_use]
    pub fn fragment(&self, name: &str) -> &str {
        self.fragments
            .get(name)
            .map_or(self.default_fragment.as_str(), String::as_str)
    }

    #[must_use]
    pub fn default_fragment(&self) -> &str {
        &self.default_fragment
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Compile a path template.
    ///
    /// Literal text is escaped, each `{name}` becomes `(?P<name>fragment)`,
    /// and the whole rule is anchored with `^…$`.
    pub fn compile(&self, template: &str) -> Result<CompiledTemplate, PatternCompileError> {
        self.compile_with(template, false)
    }

    /// Compile a domain template such as `{sub}.example.com`.
    ///
    /// Same substitution as [`compile`](Self::compile), but hosts are
    /// case-insensitive: literal text is lowercased and the regex carries the
    /// `(?i)` flag. Match hosts with [`CompiledRule::matches_host`].
    pub fn compile_domain(&self, template: &str) -> Result<CompiledTemplate, PatternCompileError> {
        self.compile_with(template, true)
    }

    fn compile_with(
        &self,
        template: &str,
        ignore_case: bool,
    ) -> Result<CompiledTemplate, PatternCompileError> {
        let names = placeholder_names(template);
        if names.is_empty() {
            let text = if ignore_case {
                template.to_ascii_lowercase()
            } else {
                template.to_string()
            };
            return Ok(CompiledTemplate {
                template: template.to_string(),
                rule: CompiledRule::Literal(text),
            });
        }

        let mut pattern = String::with_capacity(template.len() * 2 + 8);
        pattern.push('^');
        if ignore_case {
            pattern.push_str("(?i)");
        }

        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(template) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            pattern.push_str(&regex::escape(&template[last..whole.start()]));
            pattern.push_str("(?P<");
            pattern.push_str(name.as_str());
            pattern.push('>');
            pattern.push_str(self.fragment(name.as_str()));
            pattern.push(')');
            last = whole.end();
        }
        pattern.push_str(&regex::escape(&template[last..]));
        pattern.push('$');

        let regex = Regex::new(&pattern).map_err(|source| PatternCompileError {
            template: template.to_string(),
            pattern: pattern.clone(),
            source,
        })?;

        debug!(template = %template, regex = %pattern, params = ?names, "Template compiled");

        Ok(CompiledTemplate {
            template: template.to_string(),
            rule: CompiledRule::Pattern {
                regex,
                params: names.into_iter().map(Arc::from).collect(),
            },
        })
    }
}

/// A template together with its compiled rule.
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    /// Raw template with `{name}` placeholders, kept for URL generation
    pub template: String,
    pub rule: CompiledRule,
}

/// Matchable form of a template.
#[derive(Debug, Clone)]
pub enum CompiledRule {
    /// Placeholder-free template; matched by string equality
    Literal(String),
    /// Anchored regex plus the placeholder names it captures, in template order
    Pattern { regex: Regex, params: Vec<Arc<str>> },
}

impl CompiledRule {
    #[inline]
    #[must_use]
    pub fn is_literal(&self) -> bool {
        matches!(self, CompiledRule::Literal(_))
    }

    /// Match `input` against the rule, appending named captures to `params`.
    ///
    /// On a failed match `params` is left untouched.
    pub fn matches(&self, input: &str, params: &mut ParamVec) -> bool {
        match self {
            CompiledRule::Literal(text) => text == input,
            CompiledRule::Pattern { regex, params: names } => {
                let Some(caps) = regex.captures(input) else {
                    return false;
                };
                for name in names {
                    if let Some(value) = caps.name(name) {
                        params.push((Arc::clone(name), value.as_str().to_string()));
                    }
                }
                true
            }
        }
    }

    /// Like [`matches`](Self::matches), but a literal rule compares ASCII
    /// case-insensitively. Used for domain rules.
    pub fn matches_host(&self, host: &str, params: &mut ParamVec) -> bool {
        match self {
            CompiledRule::Literal(text) => text.eq_ignore_ascii_case(host),
            CompiledRule::Pattern { .. } => self.matches(host, params),
        }
    }

    /// Source text of the rule (literal text or regex source).
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            CompiledRule::Literal(text) => text,
            CompiledRule::Pattern { regex, .. } => regex.as_str(),
        }
    }
}

/// Placeholder names in a template, in order of appearance.
#[must_use]
pub fn placeholder_names(template: &str) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Substitute each `{name}` in `template` with the matching value.
///
/// An empty parameter list returns the template unchanged, and names
/// without a value stay in the output as literal `{name}` text.
#[must_use]
pub fn expand_template<K, V>(template: &str, params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    if params.is_empty() {
        return template.to_string();
    }

    let mut url = template.to_string();
    for (name, value) in params {
        let token = format!("{{{}}}", name.as_ref());
        url = url.replace(&token, value.as_ref());
    }
    url
}
