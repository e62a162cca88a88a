//! Catalog entities, store rows and paginated results.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use super::error::{CatalogError, CatalogResult};
use super::kind::{Dimension, EntityKind};

/// HATEOAS link. Always derived from an entity kind and id, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub href: String,
    pub rel: String,
    pub method: &'static str,
}

/// Small and large image URLs derived from an image reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageUrls {
    pub small: Option<String>,
    pub large: Option<String>,
}

/// Serialize an absent URL as an empty string.
fn url_or_empty<S: Serializer>(url: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(url.as_deref().unwrap_or_default())
}

// -------------------------------------------------------------------------
// Store rows
// -------------------------------------------------------------------------

/// Row of the perfume info listing query.
#[derive(Debug, Clone, Deserialize)]
pub struct PerfumeInfoRow {
    pub info_uuid: String,
    pub name: String,
    pub description_uuid: String,
    pub description: String,
    pub info_year: i64,
    pub brand_uuid: String,
    pub brand_name: String,
    pub gender_uuid: String,
    pub gender_name: String,
    pub group_uuid: String,
    pub group_name: String,
    pub country_uuid: String,
    pub country_name: String,
    pub season_uuid: String,
    pub season_name: String,
    pub tsod_uuid: String,
    pub tsod_name: String,
    pub type_uuid: String,
    pub type_name: String,
    pub img_uuid: Option<String>,
    pub stars_uuid: Option<String>,
    pub shop_uuid: Option<String>,
}

/// Row of a dimension listing query.
#[derive(Debug, Clone, Deserialize)]
pub struct DimensionRow {
    pub id: String,
    pub name: String,
    pub img_uuid: Option<String>,
    #[serde(default)]
    pub perfums_count: i64,
}

/// One denormalized (perfume, note, component) row of the composition join.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompositionRow {
    #[serde(rename = "info_uuid")]
    pub perfume_id: String,
    #[serde(rename = "note_uuid")]
    pub note_id: String,
    pub note_name: String,
    #[serde(rename = "component_uuid")]
    pub component_id: String,
    pub component_name: String,
}

/// Row of the perfume search query.
#[derive(Debug, Clone, Deserialize)]
pub struct PerfumeIdRow {
    pub info_uuid: String,
}

// -------------------------------------------------------------------------
// Entities
// -------------------------------------------------------------------------

/// Flat perfume attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerfumeInfo {
    pub id: String,
    pub name: String,
    pub description_id: String,
    pub description: String,
    pub year: i64,
    pub brand_id: String,
    pub brand_name: String,
    pub gender_id: String,
    pub gender_name: String,
    pub group_id: String,
    pub group_name: String,
    pub country_id: String,
    pub country_name: String,
    pub season_id: String,
    pub season_name: String,
    pub tsod_id: String,
    pub tsod_name: String,
    pub type_id: String,
    pub type_name: String,
    #[serde(skip)]
    pub image_id: Option<String>,
    pub stars_id: Option<String>,
    pub shop_id: Option<String>,
    pub links: Vec<Link>,
    #[serde(serialize_with = "url_or_empty")]
    pub small_img_url: Option<String>,
    #[serde(serialize_with = "url_or_empty")]
    pub large_img_url: Option<String>,
}

impl From<PerfumeInfoRow> for PerfumeInfo {
    fn from(row: PerfumeInfoRow) -> Self {
        Self {
            id: row.info_uuid,
            name: row.name,
            description_id: row.description_uuid,
            description: row.description,
            year: row.info_year,
            brand_id: row.brand_uuid,
            brand_name: row.brand_name,
            gender_id: row.gender_uuid,
            gender_name: row.gender_name,
            group_id: row.group_uuid,
            group_name: row.group_name,
            country_id: row.country_uuid,
            country_name: row.country_name,
            season_id: row.season_uuid,
            season_name: row.season_name,
            tsod_id: row.tsod_uuid,
            tsod_name: row.tsod_name,
            type_id: row.type_uuid,
            type_name: row.type_name,
            image_id: row.img_uuid,
            stars_id: row.stars_uuid,
            shop_id: row.shop_uuid,
            links: Vec::new(),
            small_img_url: None,
            large_img_url: None,
        }
    }
}

/// One entity of an attribute dimension (brand, note, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimensionEntity {
    #[serde(skip)]
    pub dimension: Dimension,
    pub id: String,
    pub name: String,
    #[serde(skip)]
    pub image_id: Option<String>,
    pub perfums_count: i64,
    pub links: Vec<Link>,
    #[serde(serialize_with = "url_or_empty")]
    pub small_img_url: Option<String>,
    #[serde(serialize_with = "url_or_empty")]
    pub large_img_url: Option<String>,
}

impl DimensionEntity {
    pub fn from_row(dimension: Dimension, row: DimensionRow) -> Self {
        Self {
            dimension,
            id: row.id,
            name: row.name,
            image_id: row.img_uuid,
            perfums_count: row.perfums_count,
            links: Vec::new(),
            small_img_url: None,
            large_img_url: None,
        }
    }
}

/// Scent component inside a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentItem {
    #[serde(rename = "component_id")]
    pub id: String,
    #[serde(rename = "component_name")]
    pub name: String,
    pub links: Vec<Link>,
}

/// Scent note of a perfume with its components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteItem {
    #[serde(rename = "note_id")]
    pub id: String,
    #[serde(rename = "note_name")]
    pub name: String,
    pub components: Vec<ComponentItem>,
    pub links: Vec<Link>,
    pub component_count: i64,
}

/// Perfume with its notes and components folded in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerfumeComposition {
    #[serde(flatten)]
    pub info: PerfumeInfo,
    pub notes: Vec<NoteItem>,
    pub total_components: i64,
}

// -------------------------------------------------------------------------
// Paginated results
// -------------------------------------------------------------------------

/// One page of a listing.
///
/// `amount` is not stored: it is always the number of items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    list_key: &'static str,
    pub items: Vec<T>,
    /// Matching entities before pagination.
    pub total: i64,
    pub offset: i64,
}

impl<T> Page<T> {
    /// Create a page of a listing of `kind`.
    pub fn new(kind: EntityKind, items: Vec<T>, total: i64, offset: i64) -> Self {
        Self::with_key(kind.list_key(), items, total, offset)
    }

    /// Create a page serialized under an explicit list key.
    pub fn with_key(list_key: &'static str, items: Vec<T>, total: i64, offset: i64) -> Self {
        Self {
            list_key,
            items,
            total,
            offset,
        }
    }

    /// Empty page.
    pub fn empty(kind: EntityKind, offset: i64) -> Self {
        Self::new(kind, Vec::new(), 0, offset)
    }

    /// Number of items on this page.
    pub fn amount(&self) -> i64 {
        self.items.len() as i64
    }
}

impl<T: Serialize> Serialize for Page<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry(self.list_key, &self.items)?;
        map.serialize_entry("total", &self.total)?;
        map.serialize_entry("offset", &self.offset)?;
        map.serialize_entry("amount", &self.amount())?;
        map.end()
    }
}

/// Any catalog response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Listing {
    Perfumes(Page<PerfumeInfo>),
    Compositions(Page<PerfumeComposition>),
    Dimensions(Page<DimensionEntity>),
    /// Perfume search results, one self link per match.
    Links(Page<Link>),
}

impl Listing {
    pub fn total(&self) -> i64 {
        match self {
            Listing::Perfumes(p) => p.total,
            Listing::Compositions(p) => p.total,
            Listing::Dimensions(p) => p.total,
            Listing::Links(p) => p.total,
        }
    }

    pub fn amount(&self) -> i64 {
        match self {
            Listing::Perfumes(p) => p.amount(),
            Listing::Compositions(p) => p.amount(),
            Listing::Dimensions(p) => p.amount(),
            Listing::Links(p) => p.amount(),
        }
    }

    /// Render the wire format.
    pub fn to_json_bytes(&self) -> CatalogResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(CatalogError::Encode)
    }
}
