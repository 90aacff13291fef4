//! Decomposition of marked-up display names.
//!
//! Names arrive as small HTML-like fragments, e.g.
//! `<span class="NAME">Johann <span class="starredname">Karl</span> <span class="SURN">Müller</span></span>`.
//! Only four markers carry meaning:
//!
//! | marker    | tag form      | class form                  |
//! |-----------|---------------|-----------------------------|
//! | name      | `<name>`      | `class="NAME"`              |
//! | surname   | `<surname>`   | `class="SURN"`              |
//! | nickname  | `<nickname>`  | `<q class="wt-nickname">`   |
//! | preferred | `<preferred>` | `class="starredname"`       |
//!
//! Everything else is plain structure. Malformed markup never fails: unclosed
//! elements end with the input, stray closing tags are dropped, and a `<`
//! that does not start a tag is kept as text.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^<(?P<close>/)?(?P<name>[A-Za-z][A-Za-z0-9:_-]*)(?P<attrs>(?:\s[^<>]*?)?)(?P<selfclose>/)?\s*>$",
    )
    .unwrap()
});
static CLASS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:^|\s)class\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#).unwrap()
});
static ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z]+);").unwrap());

const VOID_TAGS: [&str; 4] = ["br", "hr", "img", "wbr"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameParts {
    pub first_names: Vec<String>,
    pub last_names: Vec<String>,
    pub preferred_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Name,
    Surname,
    Nickname,
    Preferred,
    Other,
}

impl Role {
    fn classify(tag: &str, classes: &str) -> Self {
        let tag = tag.to_ascii_lowercase();
        match tag.as_str() {
            "name" => return Self::Name,
            "surname" => return Self::Surname,
            "nickname" => return Self::Nickname,
            "preferred" => return Self::Preferred,
            _ => {}
        }
        for class in classes.split_whitespace() {
            match class {
                "NAME" => return Self::Name,
                "SURN" => return Self::Surname,
                "wt-nickname" => return Self::Nickname,
                "starredname" => return Self::Preferred,
                _ => {}
            }
        }
        Self::Other
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Open {
        tag: String,
        role: Role,
        self_closing: bool,
    },
    Close {
        tag: String,
    },
    Text(String),
}

#[derive(Debug, Clone)]
enum Child {
    Text(String),
    Element(usize),
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    role: Role,
    children: Vec<Child>,
}

/// Element tree over a name fragment; index 0 is the synthetic document root.
#[derive(Debug, Clone)]
struct Fragment {
    elements: Vec<Element>,
}

impl Fragment {
    fn parse(input: &str) -> Self {
        let mut elements = vec![Element {
            tag: String::new(),
            role: Role::Other,
            children: Vec::new(),
        }];
        let mut open: Vec<usize> = vec![0];

        for token in tokenize(input) {
            let parent = *open.last().unwrap_or(&0);
            match token {
                Token::Text(text) => elements[parent].children.push(Child::Text(text)),
                Token::Open {
                    tag,
                    role,
                    self_closing,
                } => {
                    let idx = elements.len();
                    let void = self_closing || VOID_TAGS.contains(&tag.as_str());
                    elements.push(Element {
                        tag,
                        role,
                        children: Vec::new(),
                    });
                    elements[parent].children.push(Child::Element(idx));
                    if !void {
                        open.push(idx);
                    }
                }
                Token::Close { tag } => {
                    // Close up to the nearest matching element; ignore if none is open.
                    let matching = open
                        .iter()
                        .rposition(|&idx| idx != 0 && elements[idx].tag == tag);
                    if let Some(pos) = matching {
                        open.truncate(pos);
                    }
                }
            }
        }

        Self { elements }
    }

    fn find_all(&self, role: Role) -> Vec<usize> {
        let mut found = Vec::new();
        self.walk(0, &mut |idx| {
            if self.elements[idx].role == role {
                found.push(idx);
            }
        });
        found
    }

    fn find_first(&self, role: Role) -> Option<usize> {
        self.find_all(role).into_iter().next()
    }

    /// Pre-order visit of `idx` and every element below it.
    fn walk(&self, idx: usize, visit: &mut dyn FnMut(usize)) {
        visit(idx);
        let mut stack = vec![self.elements[idx].children.iter()];
        while let Some(children) = stack.last_mut() {
            match children.next() {
                Some(Child::Element(child_idx)) => {
                    visit(*child_idx);
                    stack.push(self.elements[*child_idx].children.iter());
                }
                Some(Child::Text(_)) => {}
                None => {
                    stack.pop();
                }
            }
        }
    }

    /// Concatenated text below `idx`, leaving out subtrees whose role is in `skip`.
    fn text(&self, idx: usize, skip: &[Role]) -> String {
        let mut out = String::new();
        self.collect_text(idx, skip, &mut out);
        out
    }

    fn collect_text(&self, idx: usize, skip: &[Role], out: &mut String) {
        let mut stack = vec![self.elements[idx].children.iter()];
        while let Some(children) = stack.last_mut() {
            match children.next() {
                Some(Child::Text(text)) => out.push_str(text),
                Some(Child::Element(child_idx)) => {
                    if !skip.contains(&self.elements[*child_idx].role) {
                        stack.push(self.elements[*child_idx].children.iter());
                    }
                }
                None => {
                    stack.pop();
                }
            }
        }
    }

    /// The first name-tagged element, or the whole fragment when none is tagged.
    fn name_region(&self) -> usize {
        self.find_first(Role::Name).unwrap_or(0)
    }
}

fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut rest = input;

    while let Some(lt) = rest.find('<') {
        text.push_str(&rest[..lt]);
        let candidate = &rest[lt..];
        if let Some(comment_body) = candidate.strip_prefix("<!--") {
            match comment_body.find("-->") {
                Some(end) => {
                    rest = &comment_body[end + 3..];
                    continue;
                }
                None => {
                    rest = "";
                    break;
                }
            }
        }
        let Some(gt) = candidate.find('>') else {
            text.push_str(candidate);
            rest = "";
            break;
        };
        if candidate[1..gt].contains('<') {
            text.push('<');
            rest = &candidate[1..];
            continue;
        }
        let raw_tag = &candidate[..=gt];
        match parse_tag(raw_tag) {
            Some(token) => {
                flush_text(&mut text, &mut tokens);
                tokens.push(token);
            }
            None => text.push_str(raw_tag),
        }
        rest = &candidate[gt + 1..];
    }
    text.push_str(rest);
    flush_text(&mut text, &mut tokens);
    tokens
}

fn flush_text(text: &mut String, tokens: &mut Vec<Token>) {
    if !text.is_empty() {
        tokens.push(Token::Text(decode_entities(text)));
        text.clear();
    }
}

fn parse_tag(raw: &str) -> Option<Token> {
    let caps = TAG_RE.captures(raw)?;
    let tag = caps["name"].to_ascii_lowercase();
    if caps.name("close").is_some() {
        return Some(Token::Close { tag });
    }
    let attrs = caps.name("attrs").map(|m| m.as_str()).unwrap_or("");
    let classes = CLASS_RE
        .captures(attrs)
        .and_then(|c| c.get(1).or_else(|| c.get(2)).or_else(|| c.get(3)))
        .map(|m| m.as_str())
        .unwrap_or("");
    Some(Token::Open {
        role: Role::classify(&tag, classes),
        self_closing: caps.name("selfclose").is_some(),
        tag,
    })
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    ENTITY_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let body = &caps[1];
            let decoded = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match body {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some('\u{a0}'),
                    _ => None,
                }
            };
            decoded.map(String::from).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn split_tokens(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits a marked-up primary name into given names, surnames and the preferred name.
pub fn decompose(markup: &str) -> NameParts {
    let fragment = Fragment::parse(markup);
    let region = fragment.name_region();

    let last_names = fragment
        .find_all(Role::Surname)
        .into_iter()
        .map(|idx| collapse_whitespace(&fragment.text(idx, &[])))
        .filter(|surname| !surname.is_empty())
        .collect();

    let first_names = split_tokens(&fragment.text(region, &[Role::Surname, Role::Nickname]));

    let preferred_name = fragment
        .find_first(Role::Preferred)
        .map(|idx| collapse_whitespace(&fragment.text(idx, &[])))
        .unwrap_or_default();

    NameParts {
        first_names,
        last_names,
        preferred_name,
    }
}

/// Tokens of the name region of an alternate name, surnames included.
pub fn alternative_names(markup: &str) -> Vec<String> {
    let fragment = Fragment::parse(markup);
    split_tokens(&fragment.text(fragment.name_region(), &[Role::Nickname]))
}

/// All text of the fragment with markup removed and whitespace collapsed.
pub fn plain_text(markup: &str) -> String {
    let fragment = Fragment::parse(markup);
    collapse_whitespace(&fragment.text(0, &[]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_surname_marker() {
        let parts = decompose("<surname>Smith</surname> John");
        assert_eq!(parts.last_names, vec!["Smith"]);
        assert_eq!(parts.first_names, vec!["John"]);
        assert_eq!(parts.preferred_name, "");
    }

    #[test]
    fn class_markers_with_preferred_and_nickname() {
        let markup = r#"<span class="NAME" dir="auto" translate="no">Johann <span class="starredname">Karl</span> <q class="wt-nickname">Charly</q> <span class="SURN">Müller</span></span>"#;
        let parts = decompose(markup);
        assert_eq!(parts.first_names, vec!["Johann", "Karl"]);
        assert_eq!(parts.last_names, vec!["Müller"]);
        assert_eq!(parts.preferred_name, "Karl");
    }

    #[test]
    fn multiple_surnames_in_document_order() {
        let markup = r#"<span class="NAME">Anna <span class="SURN">Meier</span> geb. <span class="SURN">Schulz</span></span>"#;
        let parts = decompose(markup);
        assert_eq!(parts.last_names, vec!["Meier", "Schulz"]);
        assert_eq!(parts.first_names, vec!["Anna", "geb."]);
    }

    #[test]
    fn text_outside_name_region_is_ignored_for_given_names() {
        let markup = r#"Dr. <span class="NAME">Paul <span class="SURN">Roth</span></span> Jr."#;
        let parts = decompose(markup);
        assert_eq!(parts.first_names, vec!["Paul"]);
        assert_eq!(parts.last_names, vec!["Roth"]);
    }

    #[test]
    fn missing_markers_give_empty_parts() {
        assert_eq!(decompose(""), NameParts::default());
        let parts = decompose("<span></span>");
        assert!(parts.first_names.is_empty());
        assert!(parts.last_names.is_empty());
    }

    #[test]
    fn malformed_markup_degrades() {
        let parts = decompose(r#"<span class="NAME">Eva <span class="SURN">Kuhn"#);
        assert_eq!(parts.first_names, vec!["Eva"]);
        assert_eq!(parts.last_names, vec!["Kuhn"]);

        let parts = decompose("</b>Max <surname>Lang</i></surname>");
        assert_eq!(parts.first_names, vec!["Max"]);
        assert_eq!(parts.last_names, vec!["Lang"]);

        let parts = decompose("Tom < Jerry <surname>Cat");
        assert_eq!(parts.first_names, vec!["Tom", "<", "Jerry"]);
        assert_eq!(parts.last_names, vec!["Cat"]);
    }

    #[test]
    fn deeply_nested_markup_decomposes_on_a_small_stack() {
        let markup = format!("{}John{}", "<b>".repeat(200_000), "</b>".repeat(200_000));
        let parts = std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(move || decompose(&markup))
            .unwrap()
            .join()
            .unwrap();
        assert_eq!(parts.first_names, vec!["John"]);
        assert!(parts.last_names.is_empty());
    }

    #[test]
    fn entities_are_decoded() {
        let parts = decompose("<surname>O&#39;Brien &amp; Co</surname> Se&aacute;n");
        assert_eq!(parts.last_names, vec!["O'Brien & Co"]);
        assert_eq!(parts.first_names, vec!["Se&aacute;n"]);
        assert_eq!(plain_text("A&nbsp;B"), "A B");
    }

    #[test]
    fn alternative_names_keep_surnames() {
        let markup = r#"<span class="NAME">יוסף <span class="SURN">כהן</span></span>"#;
        assert_eq!(alternative_names(markup), vec!["יוסף", "כהן"]);
        assert!(alternative_names("").is_empty());
    }

    #[test]
    fn plain_text_strips_markup() {
        let markup = r#"<span class="NAME">John <!-- x --><span class="SURN">Smith</span></span><br/>"#;
        assert_eq!(plain_text(markup), "John Smith");
    }
}
