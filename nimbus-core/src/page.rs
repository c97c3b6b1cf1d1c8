//! In-memory stand-in for the dashboard page.

use std::collections::BTreeMap;

use crate::{
    registry::{ALL_ZONES, CityRegistry},
    render::escape_html,
};

/// Elements the controller writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementId {
    AlertCard,
    WeatherContainer,
    LocationContainer,
    ZoneSubtitle,
}

impl ElementId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementId::AlertCard => "alerta-card",
            ElementId::WeatherContainer => "clima-container",
            ElementId::LocationContainer => "ubicacion-container",
            ElementId::ZoneSubtitle => "subtitulo-zona",
        }
    }

    pub const fn all() -> &'static [ElementId] {
        &[
            ElementId::ZoneSubtitle,
            ElementId::LocationContainer,
            ElementId::AlertCard,
            ElementId::WeatherContainer,
        ]
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Element {
    html: String,
    classes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    elements: BTreeMap<ElementId, Element>,
    active_zone: Option<String>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inner_html(&self, id: ElementId) -> &str {
        self.elements.get(&id).map(|e| e.html.as_str()).unwrap_or_default()
    }

    pub fn classes(&self, id: ElementId) -> &[String] {
        self.elements
            .get(&id)
            .map(|e| e.classes.as_slice())
            .unwrap_or_default()
    }

    /// Replace the element's content.
    pub fn set_html(&mut self, id: ElementId, html: impl Into<String>) {
        self.elements.entry(id).or_default().html = html.into();
    }

    pub fn append_html(&mut self, id: ElementId, html: &str) {
        self.elements.entry(id).or_default().html.push_str(html);
    }

    /// Replace the element's content with plain text.
    pub fn set_text(&mut self, id: ElementId, text: &str) {
        self.set_html(id, escape_html(text));
    }

    pub fn add_classes(&mut self, id: ElementId, classes: &[&str]) {
        let element = self.elements.entry(id).or_default();
        for class in classes {
            if !element.classes.iter().any(|c| c.as_str() == *class) {
                element.classes.push((*class).to_string());
            }
        }
    }

    pub fn active_zone(&self) -> Option<&str> {
        self.active_zone.as_deref()
    }

    /// Mark the nav link whose `data-zona` matches as active.
    pub fn set_active_zone(&mut self, zone: &str) {
        self.active_zone = Some(zone.to_string());
    }

    fn nav(&self, registry: &CityRegistry) -> String {
        let zones = registry
            .zones()
            .iter()
            .map(|z| z.name.as_str())
            .chain(std::iter::once(ALL_ZONES));

        let mut links = String::new();
        for zone in zones {
            let class = if self.active_zone() == Some(zone) {
                "nav-link active fw-bold"
            } else {
                "nav-link"
            };
            let zone = escape_html(zone);
            links.push_str(&format!(
                "        <a class=\"{class}\" href=\"#\" data-zona=\"{zone}\">{zone}</a>\n"
            ));
        }

        format!("    <nav class=\"nav\">\n{links}    </nav>\n")
    }

    fn element_tag(&self, id: ElementId, tag: &str, base_class: &str) -> String {
        let mut class = base_class.to_string();
        for extra in self.classes(id) {
            class.push(' ');
            class.push_str(&escape_html(extra));
        }

        format!(
            "    <{tag} id=\"{id}\" class=\"{class}\">\n{html}\n    </{tag}>\n",
            html = self.inner_html(id),
        )
    }

    /// Serialize the whole page, nav included.
    pub fn render_page(&self, registry: &CityRegistry) -> String {
        let mut body = self.nav(registry);
        for &id in ElementId::all() {
            let (tag, class) = match id {
                ElementId::ZoneSubtitle => ("h2", "mt-3"),
                ElementId::LocationContainer => ("section", "col-12 col-lg-4"),
                ElementId::AlertCard => ("div", "card"),
                ElementId::WeatherContainer => ("div", "row g-3"),
            };
            body.push_str(&self.element_tag(id, tag, class));
        }

        format!(
            r#"<!DOCTYPE html>
<html lang="es">
<head>
    <meta charset="utf-8">
    <title>Nimbus Clima</title>
    <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css">
</head>
<body class="container">
{body}</body>
</html>
"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_append() {
        let mut doc = Document::new();
        doc.set_html(ElementId::WeatherContainer, "<p>spinner</p>");
        doc.set_html(ElementId::WeatherContainer, "");
        doc.append_html(ElementId::WeatherContainer, "<a/>");
        doc.append_html(ElementId::WeatherContainer, "<b/>");

        assert_eq!(doc.inner_html(ElementId::WeatherContainer), "<a/><b/>");
        assert_eq!(doc.inner_html(ElementId::AlertCard), "");
    }

    #[test]
    fn set_text_escapes() {
        let mut doc = Document::new();
        doc.set_text(ElementId::ZoneSubtitle, "Clima en <Sur>");
        assert_eq!(doc.inner_html(ElementId::ZoneSubtitle), "Clima en &lt;Sur&gt;");
    }

    #[test]
    fn classes_are_not_duplicated() {
        let mut doc = Document::new();
        doc.add_classes(ElementId::AlertCard, &["border", "shadow-sm"]);
        doc.add_classes(ElementId::AlertCard, &["border", "border-warning"]);

        assert_eq!(
            doc.classes(ElementId::AlertCard),
            ["border", "shadow-sm", "border-warning"]
        );
    }

    #[test]
    fn page_marks_active_zone_and_ids() {
        let mut doc = Document::new();
        doc.set_active_zone("sur");
        doc.add_classes(ElementId::AlertCard, &["border-warning"]);

        let page = doc.render_page(&CityRegistry::mendoza());

        assert!(page.contains(
            r##"<a class="nav-link active fw-bold" href="#" data-zona="sur">sur</a>"##
        ));
        assert!(page.contains(r##"<a class="nav-link" href="#" data-zona="todas">todas</a>"##));
        assert!(page.contains(r#"id="alerta-card" class="card border-warning""#));
        for id in ElementId::all() {
            assert!(page.contains(&format!("id=\"{id}\"")));
        }
    }
}
