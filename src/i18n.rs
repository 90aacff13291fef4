use std::collections::HashMap;

use serde::Deserialize;

pub const MSG_BORN: &str = "Born: %s";
pub const MSG_DIED: &str = "Died: %s";
pub const MSG_DECEASED: &str = "Deceased";
pub const MSG_ZOOM_HINT: &str = "Use Ctrl + scroll to zoom in the view";
pub const MSG_MOVE_HINT: &str = "Move the view with two fingers";

const RTL_LANGUAGES: [&str; 8] = ["ar", "ckb", "dv", "fa", "he", "ps", "ur", "yi"];

pub trait Translator {
    /// Translates `msgid`, then fills each `%s` with the next argument.
    fn translate(&self, msgid: &str, args: &[&str]) -> String;

    /// Whether the active locale is written right to left.
    fn is_rtl(&self) -> bool;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Catalog {
    pub locale: String,
    pub rtl: Option<bool>,
    pub messages: HashMap<String, String>,
}

impl Catalog {
    pub fn english() -> Self {
        Self {
            locale: "en-US".to_string(),
            rtl: None,
            messages: HashMap::new(),
        }
    }

    pub fn new(locale: &str, messages: HashMap<String, String>) -> Self {
        Self {
            locale: locale.to_string(),
            rtl: None,
            messages,
        }
    }
}

impl Translator for Catalog {
    fn translate(&self, msgid: &str, args: &[&str]) -> String {
        let template = self
            .messages
            .get(msgid)
            .map(String::as_str)
            .unwrap_or(msgid);
        substitute(template, args)
    }

    fn is_rtl(&self) -> bool {
        self.rtl.unwrap_or_else(|| locale_is_rtl(&self.locale))
    }
}

pub fn locale_is_rtl(locale: &str) -> bool {
    let language = locale
        .split(['-', '_'])
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();
    RTL_LANGUAGES.contains(&language.as_str())
}

fn substitute(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut pieces = template.split("%s");
    if let Some(first) = pieces.next() {
        out.push_str(first);
    }
    for piece in pieces {
        out.push_str(args.next().copied().unwrap_or(""));
        out.push_str(piece);
    }
    out
}
