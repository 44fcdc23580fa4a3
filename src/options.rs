//! Configuration options for DT text output.
//!
//! ## Examples
//!
//! ```rust
//! use serde_dt::{dump_text_string, load_text, TextOptions};
//!
//! let value = load_text(b"{ name: Alice tags: [a b] }").unwrap();
//!
//! // Relaxed, compact form
//! let dt = dump_text_string(&value, &TextOptions::new());
//! assert_eq!(dt, "{ name:Alice tags:[ a b ] }");
//!
//! // Strict JSON
//! let json = dump_text_string(&value, &TextOptions::json());
//! assert_eq!(json, r#"{ "name":"Alice", "tags":[ "a", "b" ] }"#);
//! ```

/// Configuration options for DT text output.
///
/// Controls quoting, separators and layout.
///
/// # Examples
///
/// ```rust
/// use serde_dt::TextOptions;
///
/// // Default compact options
/// let options = TextOptions::new();
/// assert!(!options.force_json);
///
/// // JSON-compatible, one element per line, 4-space indent
/// let options = TextOptions::json().with_pretty(true).with_indent(4);
/// assert!(options.force_json && options.pretty);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextOptions {
    /// Quote every string and key, separate elements with commas and write
    /// non-finite floats as `null`, so strict JSON readers accept the output.
    pub force_json: bool,
    /// Put every element on its own line.
    pub pretty: bool,
    /// Spaces per nesting level when `pretty` is set.
    pub indent: usize,
}

impl Default for TextOptions {
    fn default() -> Self {
        TextOptions {
            force_json: false,
            pretty: false,
            indent: 2,
        }
    }
}

impl TextOptions {
    /// Creates default options (relaxed, compact, 2-space indent).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for strict JSON output.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_dt::TextOptions;
    ///
    /// let options = TextOptions::json();
    /// assert!(options.force_json);
    /// assert!(!options.pretty);
    /// ```
    #[must_use]
    pub fn json() -> Self {
        TextOptions {
            force_json: true,
            ..Default::default()
        }
    }

    /// Creates options for pretty-printed output with newlines and indentation.
    #[must_use]
    pub fn pretty() -> Self {
        TextOptions {
            pretty: true,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_force_json(mut self, force_json: bool) -> Self {
        self.force_json = force_json;
        self
    }

    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Sets the indentation size (number of spaces per level).
    ///
    /// Default is 2. Only affects pretty-printed output.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_dt::TextOptions;
    ///
    /// let options = TextOptions::pretty().with_indent(4);
    /// assert_eq!(options.indent, 4);
    /// ```
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}
