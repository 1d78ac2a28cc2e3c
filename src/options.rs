use regex::Regex;

/// Nesting ceiling used by [`Options::default`].
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Settings for one extraction run.
#[derive(Debug, Clone)]
pub struct Options {
    /// Maximum object/array nesting before a binding is abandoned as too deep
    pub max_depth: usize,
    /// Also collect declarations inside blocks, functions and parentheses
    pub nested_declarations: bool,
    /// Keep only bindings whose name matches
    pub name_filter: Option<Regex>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            max_depth: DEFAULT_MAX_DEPTH,
            nested_declarations: false,
            name_filter: None,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn nested_declarations(mut self, nested: bool) -> Self {
        self.nested_declarations = nested;
        self
    }

    pub fn name_filter(mut self, filter: Regex) -> Self {
        self.name_filter = Some(filter);
        self
    }

    pub(crate) fn accepts_name(&self, name: &str) -> bool {
        self.name_filter
            .as_ref()
            .is_none_or(|filter| filter.is_match(name))
    }
}
