//! Translation strings for client-side scripts.
//!
//! Pages register the strings their scripts need; the helper resolves them
//! through a [`Translator`] and renders a single assignment statement:
//!
//! ```text
//! catalogString = {"loading":"Loading&hellip;","bulk_noitems_advice":"..."};
//! ```

use crate::error::Result;
use indexmap::IndexMap;
use std::collections::HashMap;

pub const DEFAULT_VAR_NAME: &str = "catalogString";

/// Resolves a message key to display text.
pub trait Translator: Send + Sync {
    fn translate(&self, text: &str, params: &IndexMap<String, String>) -> String;
}

/// In-memory message catalog.
///
/// Unknown keys translate to themselves. Parameters are substituted for
/// `%%name%%` placeholders after lookup.
#[derive(Debug, Clone, Default)]
pub struct CatalogTranslator {
    messages: HashMap<String, String>,
}

impl CatalogTranslator {
    pub fn new(messages: HashMap<String, String>) -> Self {
        CatalogTranslator { messages }
    }

    pub fn insert(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.messages.insert(key.into(), message.into());
    }
}

impl FromIterator<(String, String)> for CatalogTranslator {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        CatalogTranslator {
            messages: iter.into_iter().collect(),
        }
    }
}

impl Translator for CatalogTranslator {
    fn translate(&self, text: &str, params: &IndexMap<String, String>) -> String {
        let mut out = self
            .messages
            .get(text)
            .cloned()
            .unwrap_or_else(|| text.to_string());
        for (name, value) in params {
            out = out.replace(&format!("%%{}%%", name), value);
        }
        out
    }
}

/// One string to hand to client scripts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationEntry {
    /// Key the script looks the string up by.
    pub key: String,
    /// Message key passed to the translator.
    pub text: String,
    pub params: IndexMap<String, String>,
    /// HTML-escape the translated text. Off for strings that carry markup.
    pub escape: bool,
}

impl TranslationEntry {
    pub fn escaped(key: impl Into<String>, text: impl Into<String>) -> Self {
        TranslationEntry {
            key: key.into(),
            text: text.into(),
            params: IndexMap::new(),
            escape: true,
        }
    }

    pub fn raw(key: impl Into<String>, text: impl Into<String>) -> Self {
        TranslationEntry {
            escape: false,
            ..Self::escaped(key, text)
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Collects [`TranslationEntry`]s for a page and renders them as one script
/// assignment to `var_name`.
pub struct JsTranslations<T: Translator> {
    translator: T,
    var_name: String,
    strings: IndexMap<String, TranslationEntry>,
}

impl<T: Translator> JsTranslations<T> {
    pub fn new(translator: T, var_name: impl Into<String>) -> Self {
        JsTranslations {
            translator,
            var_name: var_name.into(),
            strings: IndexMap::new(),
        }
    }

    pub fn with_default_name(translator: T) -> Self {
        Self::new(translator, DEFAULT_VAR_NAME)
    }

    pub fn var_name(&self) -> &str {
        &self.var_name
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Add strings. A key added again replaces the earlier entry but keeps its position.
    pub fn add_strings<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = TranslationEntry>,
    {
        for entry in entries {
            self.strings.insert(entry.key.clone(), entry);
        }
    }

    /// JSON object of every added string, translated.
    pub fn get_json(&self) -> Result<String> {
        self.render(self.strings.values())
    }

    /// JSON object of `entries` only, ignoring anything added before.
    pub fn get_json_from_entries(&self, entries: &[TranslationEntry]) -> Result<String> {
        self.render(entries.iter())
    }

    /// `var_name = {json};`
    pub fn get_script(&self) -> Result<String> {
        Ok(format!("{} = {};", self.var_name, self.get_json()?))
    }

    fn render<'a, I>(&self, entries: I) -> Result<String>
    where
        I: Iterator<Item = &'a TranslationEntry>,
    {
        let mut map = serde_json::Map::new();
        for entry in entries {
            let translated = self.translator.translate(&entry.text, &entry.params);
            let value = if entry.escape {
                escape_html(&translated)
            } else {
                translated
            };
            map.insert(entry.key.clone(), serde_json::Value::String(value));
        }
        tracing::trace!(count = map.len(), var = %self.var_name, "rendered js translations");
        Ok(serde_json::to_string(&map)?)
    }
}
