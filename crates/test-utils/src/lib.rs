//! Perfumery test utilities.
//!
//! Helpers for integration testing: store row fixtures shaped like the
//! catalog queries' output, and assertion utilities for listing bodies.

use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Create a perfume fixture with default attributes.
pub fn test_perfume(name: &str) -> TestPerfume {
    TestPerfume {
        id: Uuid::now_v7().to_string(),
        name: name.to_string(),
        year: 2001,
        description: format!("About {name}"),
        brand: ("brand-1".to_string(), "Maison".to_string()),
        image: None,
        stars: None,
        shop: None,
    }
}

/// A perfume info row builder.
#[derive(Debug, Clone)]
pub struct TestPerfume {
    pub id: String,
    pub name: String,
    pub year: i64,
    pub description: String,
    pub brand: (String, String),
    pub image: Option<String>,
    pub stars: Option<String>,
    pub shop: Option<String>,
}

impl TestPerfume {
    /// Set a custom ID.
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    /// Set the brand.
    pub fn with_brand(mut self, id: &str, name: &str) -> Self {
        self.brand = (id.to_string(), name.to_string());
        self
    }

    /// Set the image reference.
    pub fn with_image(mut self, image: &str) -> Self {
        self.image = Some(image.to_string());
        self
    }

    /// Set the release year.
    pub fn with_year(mut self, year: i64) -> Self {
        self.year = year;
        self
    }

    /// Set the rating and shop references.
    pub fn with_shop(mut self, stars: &str, shop: &str) -> Self {
        self.stars = Some(stars.to_string());
        self.shop = Some(shop.to_string());
        self
    }

    /// Render as a row of the perfume info listing query.
    pub fn row(&self) -> JsonValue {
        serde_json::json!({
            "info_uuid": self.id,
            "name": self.name,
            "description_uuid": format!("{}-description", self.id),
            "description": self.description,
            "info_year": self.year,
            "brand_uuid": self.brand.0,
            "brand_name": self.brand.1,
            "gender_uuid": "gender-1",
            "gender_name": "Unisex",
            "group_uuid": "group-1",
            "group_name": "Chypre",
            "country_uuid": "country-1",
            "country_name": "France",
            "season_uuid": "season-1",
            "season_name": "Autumn",
            "tsod_uuid": "tsod-1",
            "tsod_name": "Evening",
            "type_uuid": "type-1",
            "type_name": "Eau de Parfum",
            "img_uuid": self.image,
            "stars_uuid": self.stars,
            "shop_uuid": self.shop,
        })
    }
}

/// Create a dimension entity fixture.
pub fn test_dimension(name: &str) -> TestDimension {
    TestDimension {
        id: Uuid::now_v7().to_string(),
        name: name.to_string(),
        image: None,
        perfums_count: 0,
    }
}

/// A dimension row builder.
#[derive(Debug, Clone)]
pub struct TestDimension {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub perfums_count: i64,
}

impl TestDimension {
    /// Set a custom ID.
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    /// Set the image reference.
    pub fn with_image(mut self, image: &str) -> Self {
        self.image = Some(image.to_string());
        self
    }

    /// Set the related perfume count.
    pub fn with_perfums_count(mut self, count: i64) -> Self {
        self.perfums_count = count;
        self
    }

    /// Render as a row of a dimension listing query.
    pub fn row(&self) -> JsonValue {
        serde_json::json!({
            "id": self.id,
            "name": self.name,
            "img_uuid": self.image,
            "perfums_count": self.perfums_count,
        })
    }
}

/// Render one (perfume, note, component) row of the composition join.
pub fn composition_row(
    perfume_id: &str,
    note: (&str, &str),
    component: (&str, &str),
) -> JsonValue {
    serde_json::json!({
        "info_uuid": perfume_id,
        "note_uuid": note.0,
        "note_name": note.1,
        "component_uuid": component.0,
        "component_name": component.1,
    })
}

/// Assertion helpers for listing bodies.
pub mod assert {
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{}', got: {}",
            key,
            value
        );
    }

    /// Assert the pagination fields of a listing body.
    ///
    /// `amount` must always equal the number of listed items.
    pub fn page(value: &Value, list_key: &str, total: i64, offset: i64, amount: usize) {
        let items = value
            .get(list_key)
            .and_then(Value::as_array)
            .unwrap_or_else(|| panic!("Expected list under '{list_key}', got: {value}"));
        assert_eq!(items.len(), amount, "item count mismatch in {value}");
        assert_eq!(value["amount"], amount as i64, "amount mismatch in {value}");
        assert_eq!(value["total"], total, "total mismatch in {value}");
        assert_eq!(value["offset"], offset, "offset mismatch in {value}");
    }

    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{}'\nActual: {}",
            needle,
            haystack
        );
    }
}
