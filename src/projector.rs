use crate::i18n::{MSG_BORN, MSG_DECEASED, MSG_DIED, Translator};
use crate::ir::{AncestorNode, PersonRecord, Sex};
use crate::names;
use crate::script::is_rtl_text;
use crate::theme::{ColorResolver, FALLBACK_BACKGROUND};
use crate::tree::ChartContext;

/// Projects one individual into its chart record. `children` is left unset.
pub fn project(
    person: Option<&PersonRecord>,
    generation: u32,
    ctx: &ChartContext<'_>,
) -> AncestorNode {
    let color = background_color(person, ctx.colors);
    let Some(person) = person else {
        return AncestorNode {
            id: 0,
            xref: String::new(),
            generation,
            name: String::new(),
            first_names: Vec::new(),
            last_names: Vec::new(),
            preferred_name: String::new(),
            alternative_names: Vec::new(),
            is_alt_rtl: false,
            sex: Sex::U,
            timespan: String::new(),
            color,
            colors: [Vec::new(), Vec::new()],
            children: None,
        };
    };

    let parts = names::decompose(&person.name);
    let alternate = person
        .alternate_name
        .as_deref()
        .filter(|markup| !markup.trim().is_empty());

    AncestorNode {
        id: 0,
        xref: person.xref.clone(),
        generation,
        name: names::plain_text(&person.name),
        first_names: parts.first_names,
        last_names: parts.last_names,
        preferred_name: parts.preferred_name,
        alternative_names: alternate.map(names::alternative_names).unwrap_or_default(),
        is_alt_rtl: alternate
            .map(|markup| is_rtl_text(&names::plain_text(markup)))
            .unwrap_or(false),
        sex: person.sex,
        timespan: timespan(person, ctx.translator),
        color,
        colors: [Vec::new(), Vec::new()],
        children: None,
    }
}

pub fn timespan(person: &PersonRecord, translator: &dyn Translator) -> String {
    match (person.birth, person.death) {
        (Some(birth), Some(death)) => format!("{birth}-{death}"),
        (Some(birth), None) => translator.translate(MSG_BORN, &[birth.to_string().as_str()]),
        (None, Some(death)) => translator.translate(MSG_DIED, &[death.to_string().as_str()]),
        (None, None) if person.deceased => translator.translate(MSG_DECEASED, &[]),
        (None, None) => String::new(),
    }
}

pub fn background_color(person: Option<&PersonRecord>, resolver: &dyn ColorResolver) -> String {
    let sex = person.map(|p| p.sex).unwrap_or(Sex::U);
    resolver
        .color(sex.color_key())
        .or_else(|| resolver.color(Sex::U.color_key()))
        .unwrap_or_else(|| FALLBACK_BACKGROUND.to_string())
}
