use std::collections::HashMap;
use std::io::{Read, Seek};

use super::{WML_NS, read_zip_text, wml, wml_bool, wml_underline};

/// Bold/italic/underline as declared by one style. `None` defers to the
/// next level of the hierarchy.
#[derive(Clone, Debug, Default)]
pub(super) struct StyleProps {
    pub(super) bold: Option<bool>,
    pub(super) italic: Option<bool>,
    pub(super) underline: Option<bool>,
    pub(super) based_on: Option<String>,
}

impl StyleProps {
    fn from_rpr(rpr: Option<roxmltree::Node>, based_on: Option<String>) -> Self {
        Self {
            bold: rpr.and_then(|n| wml_bool(n, "b")),
            italic: rpr.and_then(|n| wml_bool(n, "i")),
            underline: rpr.and_then(wml_underline),
            based_on,
        }
    }
}

pub(super) struct StyleDefaults {
    pub(super) bold: bool,
    pub(super) italic: bool,
    pub(super) underline: bool,
}

pub(super) struct StylesInfo {
    pub(super) defaults: StyleDefaults,
    pub(super) paragraph_styles: HashMap<String, StyleProps>,
    pub(super) character_styles: HashMap<String, StyleProps>,
}

impl StylesInfo {
    fn empty() -> Self {
        StylesInfo {
            defaults: StyleDefaults {
                bold: false,
                italic: false,
                underline: false,
            },
            paragraph_styles: HashMap::new(),
            character_styles: HashMap::new(),
        }
    }
}

pub(super) fn parse_styles<R: Read + Seek>(zip: &mut zip::ZipArchive<R>) -> StylesInfo {
    let mut info = StylesInfo::empty();

    let Some(xml_content) = read_zip_text(zip, "word/styles.xml") else {
        return info;
    };
    let Ok(xml) = roxmltree::Document::parse(&xml_content) else {
        log::warn!("word/styles.xml is not valid XML, ignoring styles");
        return info;
    };

    let root = xml.root_element();

    if let Some(rpr) = wml(root, "docDefaults")
        .and_then(|n| wml(n, "rPrDefault"))
        .and_then(|n| wml(n, "rPr"))
    {
        info.defaults.bold = wml_bool(rpr, "b").unwrap_or(false);
        info.defaults.italic = wml_bool(rpr, "i").unwrap_or(false);
        info.defaults.underline = wml_underline(rpr).unwrap_or(false);
    }

    for style_node in root.children() {
        if style_node.tag_name().name() != "style"
            || style_node.tag_name().namespace() != Some(WML_NS)
        {
            continue;
        }
        let Some(style_id) = style_node.attribute((WML_NS, "styleId")) else {
            continue;
        };
        let based_on = wml(style_node, "basedOn")
            .and_then(|n| n.attribute((WML_NS, "val")))
            .map(|s| s.to_string());
        let props = StyleProps::from_rpr(wml(style_node, "rPr"), based_on);

        match style_node.attribute((WML_NS, "type")) {
            Some("paragraph") => {
                info.paragraph_styles.insert(style_id.to_string(), props);
            }
            Some("character") => {
                info.character_styles.insert(style_id.to_string(), props);
            }
            _ => {}
        }
    }

    resolve_based_on(&mut info.paragraph_styles);
    resolve_based_on(&mut info.character_styles);

    log::debug!(
        "Styles: {} paragraph, {} character",
        info.paragraph_styles.len(),
        info.character_styles.len()
    );
    info
}

fn resolve_based_on(styles: &mut HashMap<String, StyleProps>) {
    let ids: Vec<String> = styles.keys().cloned().collect();
    for id in ids {
        let mut chain: Vec<String> = Vec::new();
        let mut current = id.clone();
        loop {
            if chain.contains(&current) {
                break;
            }
            chain.push(current.clone());
            match styles.get(&current).and_then(|s| s.based_on.clone()) {
                Some(parent) => current = parent,
                None => break,
            }
        }

        // Walk ancestors from furthest to closest; closer ones override.
        let mut inh = StyleProps::default();
        for ancestor_id in chain.iter().rev() {
            if let Some(s) = styles.get(ancestor_id) {
                inh.bold = s.bold.or(inh.bold);
                inh.italic = s.italic.or(inh.italic);
                inh.underline = s.underline.or(inh.underline);
            }
        }

        if let Some(s) = styles.get_mut(&id) {
            s.bold = s.bold.or(inh.bold);
            s.italic = s.italic.or(inh.italic);
            s.underline = s.underline.or(inh.underline);
        }
    }
}
