//! Entity kinds and their static descriptors.
//!
//! Every listing, count, link and cross filter is driven by a
//! [`KindDescriptor`]. The descriptors are process-lifetime constants and are
//! read concurrently without synchronization.

use std::fmt;

/// Base table holding one row per perfume.
pub const PERFUME_TABLE: &str = "parfum_info";

/// Link table holding one row per (perfume, note, component) triple.
pub const COMPOSITION_TABLE: &str = "parfums";

/// Column in [`COMPOSITION_TABLE`] referencing [`PERFUME_TABLE`].
pub const COMPOSITION_PERFUME_COLUMN: &str = "parfum_info_id";

/// Internal primary key column shared by every table.
pub const ROW_ID_COLUMN: &str = "id";

/// Public identifier column shared by every table.
pub const PUBLIC_ID_COLUMN: &str = "uuid";

/// Display name column shared by every dimension table.
pub const NAME_COLUMN: &str = "name";

/// Attribute dimensions a perfume is classified by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dimension {
    Brand,
    Component,
    Country,
    Gender,
    Group,
    Note,
    Season,
    TimeOfDay,
    Type,
}

/// How rows of `parfum_info` reference a dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Foreign key column on `parfum_info` itself.
    Direct { column: &'static str },
    /// Foreign key column on the `parfums` link table.
    Through { column: &'static str },
}

/// Static description of one dimension table.
#[derive(Debug)]
pub struct KindDescriptor {
    /// Table name.
    pub table: &'static str,
    /// URL path segment used by links (`/brand/{id}`).
    pub segment: &'static str,
    /// Plural collection path (`/brands`).
    pub plural: &'static str,
    /// Prefix of link rels (`BrandInfo`, `BrandPerfums`).
    pub rel: &'static str,
    /// Key of the item list in serialized pages.
    pub list_key: &'static str,
    /// Prefix of the aliased columns in the perfume info listing.
    pub column_prefix: &'static str,
    /// How perfumes reference this dimension.
    pub relation: Relation,
}

const BRAND: KindDescriptor = KindDescriptor {
    table: "brands",
    segment: "brand",
    plural: "brands",
    rel: "Brand",
    list_key: "brands_list",
    column_prefix: "brand",
    relation: Relation::Direct { column: "brand_id" },
};

const COMPONENT: KindDescriptor = KindDescriptor {
    table: "components",
    segment: "component",
    plural: "components",
    rel: "Component",
    list_key: "components",
    column_prefix: "component",
    relation: Relation::Through {
        column: "component_id",
    },
};

const COUNTRY: KindDescriptor = KindDescriptor {
    table: "countries",
    segment: "country",
    plural: "countries",
    rel: "Country",
    list_key: "countries_list",
    column_prefix: "country",
    relation: Relation::Direct {
        column: "country_id",
    },
};

const GENDER: KindDescriptor = KindDescriptor {
    table: "gender",
    segment: "gender",
    plural: "genders",
    rel: "Gender",
    list_key: "gender_list",
    column_prefix: "gender",
    relation: Relation::Direct {
        column: "gender_id",
    },
};

const GROUP: KindDescriptor = KindDescriptor {
    table: "groups",
    segment: "group",
    plural: "groups",
    rel: "Group",
    list_key: "groups_list",
    column_prefix: "group",
    relation: Relation::Direct { column: "group_id" },
};

const NOTE: KindDescriptor = KindDescriptor {
    table: "notes",
    segment: "note",
    plural: "notes",
    rel: "Note",
    list_key: "notes_list",
    column_prefix: "note",
    relation: Relation::Through { column: "note_id" },
};

const SEASON: KindDescriptor = KindDescriptor {
    table: "seasons",
    segment: "season",
    plural: "seasons",
    rel: "Season",
    list_key: "seasons_list",
    column_prefix: "season",
    relation: Relation::Direct {
        column: "season_id",
    },
};

const TIME_OF_DAY: KindDescriptor = KindDescriptor {
    table: "times_of_day",
    segment: "timeofday",
    plural: "timesofday",
    rel: "Timeofday",
    list_key: "timeofday_list",
    column_prefix: "tsod",
    relation: Relation::Direct { column: "tsod_id" },
};

const TYPE: KindDescriptor = KindDescriptor {
    table: "types",
    segment: "type",
    plural: "types",
    rel: "Type",
    list_key: "types_list",
    column_prefix: "type",
    relation: Relation::Direct { column: "type_id" },
};

impl Dimension {
    /// All dimensions, in declaration order.
    pub const ALL: [Dimension; 9] = [
        Dimension::Brand,
        Dimension::Component,
        Dimension::Country,
        Dimension::Gender,
        Dimension::Group,
        Dimension::Note,
        Dimension::Season,
        Dimension::TimeOfDay,
        Dimension::Type,
    ];

    /// Dimensions stored as a foreign key on `parfum_info`, in the order
    /// their links appear on a composition.
    pub const DIRECT: [Dimension; 7] = [
        Dimension::Brand,
        Dimension::Country,
        Dimension::Gender,
        Dimension::Group,
        Dimension::Season,
        Dimension::TimeOfDay,
        Dimension::Type,
    ];

    /// Static descriptor for this dimension.
    pub fn descriptor(self) -> &'static KindDescriptor {
        match self {
            Dimension::Brand => &BRAND,
            Dimension::Component => &COMPONENT,
            Dimension::Country => &COUNTRY,
            Dimension::Gender => &GENDER,
            Dimension::Group => &GROUP,
            Dimension::Note => &NOTE,
            Dimension::Season => &SEASON,
            Dimension::TimeOfDay => &TIME_OF_DAY,
            Dimension::Type => &TYPE,
        }
    }

    /// Parse a search parameter name or URL segment (`brand`, `timeofday`).
    pub fn from_param(param: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.descriptor().segment == param)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.descriptor().segment)
    }
}

/// Every kind of listing the catalog serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Flat perfume info rows.
    Perfume,
    /// Perfumes with their notes and components folded in.
    Composition,
    /// One of the attribute dimensions.
    Dimension(Dimension),
}

impl EntityKind {
    /// Table the listing reads from.
    pub fn table(self) -> &'static str {
        match self {
            EntityKind::Perfume | EntityKind::Composition => PERFUME_TABLE,
            EntityKind::Dimension(d) => d.descriptor().table,
        }
    }

    /// URL path segment used by links.
    pub fn segment(self) -> &'static str {
        match self {
            EntityKind::Perfume | EntityKind::Composition => "perfum",
            EntityKind::Dimension(d) => d.descriptor().segment,
        }
    }

    /// Key of the item list in serialized pages.
    pub fn list_key(self) -> &'static str {
        match self {
            EntityKind::Perfume => "perfums_info_list",
            EntityKind::Composition => "perfums_composition",
            EntityKind::Dimension(d) => d.descriptor().list_key,
        }
    }

    /// Kind returned when listing entities related to ids of this kind.
    ///
    /// Dimensions relate to perfume info rows, a perfume relates to its own
    /// composition, and a composition relates to nothing further.
    pub fn related_target(self) -> Option<EntityKind> {
        match self {
            EntityKind::Perfume => Some(EntityKind::Composition),
            EntityKind::Composition => None,
            EntityKind::Dimension(_) => Some(EntityKind::Perfume),
        }
    }

    /// Short label used in logs and metrics.
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Perfume => "perfum",
            EntityKind::Composition => "composition",
            EntityKind::Dimension(d) => d.descriptor().segment,
        }
    }
}

impl From<Dimension> for EntityKind {
    fn from(dimension: Dimension) -> Self {
        EntityKind::Dimension(dimension)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_parse() {
        for d in Dimension::ALL {
            assert_eq!(Dimension::from_param(d.descriptor().segment), Some(d));
        }
        assert_eq!(Dimension::from_param("perfum"), None);
    }

    #[test]
    fn perfume_kinds_share_segment() {
        assert_eq!(EntityKind::Perfume.segment(), "perfum");
        assert_eq!(EntityKind::Composition.segment(), "perfum");
        assert_eq!(EntityKind::Dimension(Dimension::TimeOfDay).segment(), "timeofday");
    }

    #[test]
    fn notes_and_components_go_through_link_table() {
        for d in Dimension::ALL {
            let through = matches!(d.descriptor().relation, Relation::Through { .. });
            assert_eq!(through, matches!(d, Dimension::Note | Dimension::Component));
            assert_eq!(!through, Dimension::DIRECT.contains(&d));
        }
    }

    #[test]
    fn related_targets() {
        assert_eq!(
            EntityKind::Dimension(Dimension::Brand).related_target(),
            Some(EntityKind::Perfume)
        );
        assert_eq!(
            EntityKind::Perfume.related_target(),
            Some(EntityKind::Composition)
        );
        assert_eq!(EntityKind::Composition.related_target(), None);
    }

    #[test]
    fn list_keys_match_wire_format() {
        assert_eq!(EntityKind::Perfume.list_key(), "perfums_info_list");
        assert_eq!(EntityKind::Composition.list_key(), "perfums_composition");
        assert_eq!(Dimension::Gender.descriptor().list_key, "gender_list");
        assert_eq!(Dimension::Component.descriptor().list_key, "components");
        assert_eq!(Dimension::TimeOfDay.descriptor().list_key, "timeofday_list");
    }
}
