//! HATEOAS link and image URL annotation.
//!
//! Links are a pure function of (kind, id) and the configured base URL.

use super::kind::{Dimension, EntityKind};
use super::types::{
    ComponentItem, DimensionEntity, ImageUrls, Link, NoteItem, PerfumeComposition, PerfumeInfo,
};

const GET: &str = "GET";

/// Link rel prefix of the perfume kinds.
const PERFUME_REL: &str = "Perfum";

/// Builds links and image URLs from a base URL.
#[derive(Debug, Clone)]
pub struct LinkAnnotator {
    base_url: String,
}

impl LinkAnnotator {
    /// Create an annotator. A trailing slash on `base_url` is ignored.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    /// `GET {base}/{segment}/{id}`
    pub fn info_link(&self, kind: EntityKind, id: &str) -> Link {
        Link {
            href: format!("{}/{}/{id}", self.base_url, kind.segment()),
            rel: format!("{}Info", rel_prefix(kind)),
            method: GET,
        }
    }

    /// `GET {base}/{segment}/{id}/perfums`
    pub fn perfums_link(&self, kind: EntityKind, id: &str) -> Link {
        Link {
            href: format!("{}/{}/{id}/perfums", self.base_url, kind.segment()),
            rel: format!("{}Perfums", rel_prefix(kind)),
            method: GET,
        }
    }

    /// Info and related-perfumes links of a dimension entity.
    pub fn dimension_links(&self, dimension: Dimension, id: &str) -> Vec<Link> {
        let kind = EntityKind::Dimension(dimension);
        vec![self.info_link(kind, id), self.perfums_link(kind, id)]
    }

    /// Image URLs for an optional image reference. Absent stays absent.
    pub fn image_urls(&self, image_id: Option<&str>) -> ImageUrls {
        match image_id.filter(|id| !id.is_empty()) {
            Some(id) => ImageUrls {
                small: Some(format!("{}/image/{id}/small", self.base_url)),
                large: Some(format!("{}/image/{id}/large", self.base_url)),
            },
            None => ImageUrls::default(),
        }
    }
}

fn rel_prefix(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Perfume | EntityKind::Composition => PERFUME_REL,
        EntityKind::Dimension(d) => d.descriptor().rel,
    }
}

/// Attach links and image URLs in place.
pub trait Annotate {
    fn annotate(&mut self, links: &LinkAnnotator);
}

impl Annotate for PerfumeInfo {
    fn annotate(&mut self, links: &LinkAnnotator) {
        self.links = vec![links.info_link(EntityKind::Perfume, &self.id)];
        let urls = links.image_urls(self.image_id.as_deref());
        self.small_img_url = urls.small;
        self.large_img_url = urls.large;
    }
}

impl Annotate for DimensionEntity {
    fn annotate(&mut self, links: &LinkAnnotator) {
        self.links = links.dimension_links(self.dimension, &self.id);
        let urls = links.image_urls(self.image_id.as_deref());
        self.small_img_url = urls.small;
        self.large_img_url = urls.large;
    }
}

impl Annotate for ComponentItem {
    fn annotate(&mut self, links: &LinkAnnotator) {
        self.links = links.dimension_links(Dimension::Component, &self.id);
    }
}

impl Annotate for NoteItem {
    fn annotate(&mut self, links: &LinkAnnotator) {
        self.links = links.dimension_links(Dimension::Note, &self.id);
        for component in &mut self.components {
            component.annotate(links);
        }
    }
}

impl Annotate for PerfumeComposition {
    fn annotate(&mut self, links: &LinkAnnotator) {
        let info = &self.info;
        let mut out = Vec::with_capacity(Dimension::DIRECT.len() * 2 + 1);
        for d in Dimension::DIRECT {
            let id = match d {
                Dimension::Brand => &info.brand_id,
                Dimension::Country => &info.country_id,
                Dimension::Gender => &info.gender_id,
                Dimension::Group => &info.group_id,
                Dimension::Season => &info.season_id,
                Dimension::TimeOfDay => &info.tsod_id,
                Dimension::Type => &info.type_id,
                Dimension::Component | Dimension::Note => continue,
            };
            out.extend(links.dimension_links(d, id));
        }
        out.push(links.info_link(EntityKind::Perfume, &info.id));

        let urls = links.image_urls(info.image_id.as_deref());
        self.info.links = out;
        self.info.small_img_url = urls.small;
        self.info.large_img_url = urls.large;

        for note in &mut self.notes {
            note.annotate(links);
        }
    }
}
