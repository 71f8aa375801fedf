//! Shared extended-link machinery for the four relationship linkbases.
//!
//! Every linkbase follows the same XLink shape: an extended link element
//! carrying a role URI, `loc` locators mapping labels to concept hrefs,
//! resource elements (labels, footnotes), and arcs connecting labels. Arcs
//! whose endpoints do not resolve through the locator table are dropped.

use crate::error::Result;
use crate::model::QName;
use crate::xmlutil::{attr, href_fragment, is_element, local_name};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::HashMap;

/// An arc between two xlink labels, before locator resolution.
#[derive(Clone, Debug)]
pub(crate) struct RawArc {
    pub(crate) from: String,
    pub(crate) to: String,
    pub(crate) order: f64,
    pub(crate) arcrole: Option<String>,
    pub(crate) weight: Option<f64>,
    pub(crate) preferred_label: Option<String>,
}

/// A resource element (label or footnote) carrying text.
#[derive(Clone, Debug)]
pub(crate) struct RawResource {
    pub(crate) label: String,
    pub(crate) role: Option<String>,
    pub(crate) lang: Option<String>,
    pub(crate) text: String,
}

/// One parsed extended link: role, locator table, arcs and resources.
#[derive(Clone, Debug)]
pub(crate) struct ExtendedLink {
    pub(crate) role: String,
    pub(crate) locators: HashMap<String, QName>,
    pub(crate) arcs: Vec<RawArc>,
    pub(crate) resources: Vec<RawResource>,
}

impl ExtendedLink {
    /// Resolves an arc endpoint through the locator table.
    pub(crate) fn concept(&self, label: &str) -> Option<&QName> {
        self.locators.get(label)
    }
}

/// Parses all extended links named `link_kind` from a linkbase document,
/// collecting `arc_kind` arcs and (optionally) `resource_kind` resources.
pub(crate) fn parse_extended_links(
    bytes: &[u8],
    link_kind: &str,
    arc_kind: &str,
    resource_kind: Option<&str>,
) -> Result<Vec<ExtendedLink>> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut links: Vec<ExtendedLink> = Vec::new();
    let mut current: Option<ExtendedLink> = None;
    // (resource under construction, accumulated text)
    let mut open_resource: Option<RawResource> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e)
                if is_element(e.name().as_ref(), link_kind) =>
            {
                if let Some(link) = current.take() {
                    links.push(link);
                }
                current = Some(ExtendedLink {
                    role: attr(&e, "role").unwrap_or_default(),
                    locators: HashMap::new(),
                    arcs: Vec::new(),
                    resources: Vec::new(),
                });
            }
            Event::End(e) if is_element(e.name().as_ref(), link_kind) => {
                if let Some(link) = current.take() {
                    links.push(link);
                }
            }
            Event::Start(e) | Event::Empty(e) if is_element(e.name().as_ref(), "loc") => {
                if let Some(link) = current.as_mut()
                    && let (Some(label), Some(href)) = (attr(&e, "label"), attr(&e, "href"))
                    && let Some(fragment) = href_fragment(&href)
                {
                    link.locators.insert(label, QName::new(fragment));
                }
            }
            Event::Start(e) | Event::Empty(e) if is_element(e.name().as_ref(), arc_kind) => {
                if let Some(link) = current.as_mut()
                    && let (Some(from), Some(to)) = (attr(&e, "from"), attr(&e, "to"))
                {
                    link.arcs.push(RawArc {
                        from,
                        to,
                        order: attr(&e, "order")
                            .and_then(|o| o.parse().ok())
                            .unwrap_or(0.0),
                        arcrole: attr(&e, "arcrole"),
                        weight: attr(&e, "weight").and_then(|w| w.parse().ok()),
                        preferred_label: attr(&e, "preferredLabel"),
                    });
                }
            }
            Event::Start(e)
                if resource_kind.is_some_and(|kind| is_element(e.name().as_ref(), kind)) =>
            {
                if current.is_some()
                    && let Some(label) = attr(&e, "label")
                {
                    open_resource = Some(RawResource {
                        label,
                        role: attr(&e, "role"),
                        lang: attr(&e, "lang"),
                        text: String::new(),
                    });
                }
            }
            Event::Text(t) => {
                if let Some(resource) = open_resource.as_mut() {
                    resource.text.push_str(&t.unescape().unwrap_or_default());
                }
            }
            Event::End(e)
                if resource_kind.is_some_and(|kind| is_element(e.name().as_ref(), kind)) =>
            {
                if let (Some(link), Some(resource)) = (current.as_mut(), open_resource.take()) {
                    link.resources.push(resource);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(links)
}

/// Sniffs which relationship linkbases a document contains by scanning for
/// arc element names. Linkbase files are routinely referenced without a type
/// annotation, and some filers combine several link kinds in one file.
pub(crate) fn sniff_link_kinds(bytes: &[u8]) -> LinkKinds {
    let mut kinds = LinkKinds::default();
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    while let Ok(event) = reader.read_event_into(&mut buf) {
        match event {
            Event::Start(e) | Event::Empty(e) => match local_name(e.name().as_ref()) {
                b"presentationArc" => kinds.presentation = true,
                b"calculationArc" => kinds.calculation = true,
                b"definitionArc" => kinds.definition = true,
                b"labelArc" => kinds.label = true,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    kinds
}

/// Which relationship kinds a linkbase document carries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct LinkKinds {
    pub(crate) presentation: bool,
    pub(crate) calculation: bool,
    pub(crate) definition: bool,
    pub(crate) label: bool,
}
