//! Request-derived filter specifications.
//!
//! A [`FilterSpec`] is built once per request from query parameters and is
//! never mutated after validation.

use std::collections::{BTreeMap, BTreeSet};

use super::error::{CatalogError, CatalogResult};
use super::kind::{Dimension, EntityKind};

/// Attribute a free-text search term applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SearchField {
    /// Name of the listed entity itself.
    Name,
    /// Name or id of a related dimension.
    Dimension(Dimension),
}

impl SearchField {
    /// Parse a query parameter name.
    pub fn from_param(param: &str) -> Option<Self> {
        if param == "name" {
            return Some(SearchField::Name);
        }
        Dimension::from_param(param).map(SearchField::Dimension)
    }
}

/// Free-text terms keyed by the attribute they search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTerms(BTreeMap<SearchField, String>);

impl SearchTerms {
    /// Add a term. Blank terms are ignored; later terms replace earlier ones.
    pub fn insert(&mut self, field: SearchField, term: impl AsRef<str>) {
        let term = term.as_ref().trim();
        if term.is_empty() {
            return;
        }
        self.0.insert(field, term.to_string());
    }

    /// Term for one field.
    pub fn get(&self, field: SearchField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Iterate terms in field order.
    pub fn iter(&self) -> impl Iterator<Item = (SearchField, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Restriction of a listing to entities related to ids of another kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossFilter {
    /// Kind the foreign ids belong to.
    pub source: EntityKind,
    /// Public ids of the source entities.
    pub ids: Vec<String>,
}

/// Selection criteria and pagination window for one listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    /// Restrict to these public ids of the listed kind.
    pub ids: Option<BTreeSet<String>>,
    /// Rows to skip.
    pub offset: Option<i64>,
    /// Maximum rows to return. `None` means unbounded.
    pub limit: Option<i64>,
    /// Cross-entity filter, AND-ed with `ids`.
    pub extra: Option<CrossFilter>,
    /// Free-text terms.
    pub search: SearchTerms,
}

impl FilterSpec {
    /// Parse the HTTP parameter form.
    ///
    /// `ids` is comma separated. `offset` and `limit` must be non-negative
    /// integers. Every remaining parameter must name a [`SearchField`].
    pub fn from_params<I, K, V>(
        ids: Option<&str>,
        offset: Option<&str>,
        limit: Option<&str>,
        terms: I,
    ) -> CatalogResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut spec = FilterSpec {
            ids: ids.map(split_ids),
            offset: offset.map(|v| parse_window_value("offset", v)).transpose()?,
            limit: limit.map(|v| parse_window_value("limit", v)).transpose()?,
            ..Default::default()
        };

        for (key, value) in terms {
            let key = key.as_ref();
            let field = SearchField::from_param(key).ok_or_else(|| {
                CatalogError::InvalidArgs(format!("unknown search attribute '{key}'"))
            })?;
            spec.search.insert(field, value);
        }

        Ok(spec)
    }

    /// Restrict to the given public ids.
    pub fn with_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    /// Set the pagination window.
    pub fn with_window(mut self, offset: Option<i64>, limit: Option<i64>) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }

    /// Drop the pagination window.
    pub fn without_window(mut self) -> Self {
        self.offset = None;
        self.limit = None;
        self
    }

    /// Restrict to entities related to `ids` of kind `source`.
    pub fn with_extra<I, S>(mut self, source: EntityKind, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra = Some(CrossFilter {
            source,
            ids: ids.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Add a search term.
    pub fn with_term(mut self, field: SearchField, term: impl AsRef<str>) -> Self {
        self.search.insert(field, term);
        self
    }

    /// Foreign ids of the cross filter, if any.
    pub fn extra_ids(&self) -> Option<&[String]> {
        self.extra.as_ref().map(|x| x.ids.as_slice())
    }

    /// Offset reported in paginated results.
    pub fn offset_or_default(&self) -> i64 {
        self.offset.unwrap_or(0)
    }

    /// Check the spec can be rendered for a listing of `kind`.
    ///
    /// `ids` and the cross filter are always AND-ed; an empty set in either
    /// is ambiguous and rejected rather than read as "all" or "none".
    pub fn validate_for(&self, kind: EntityKind) -> CatalogResult<()> {
        if let Some(offset) = self.offset
            && offset < 0
        {
            return Err(CatalogError::InvalidArgs(format!(
                "offset must not be negative, got {offset}"
            )));
        }
        if let Some(limit) = self.limit
            && limit < 0
        {
            return Err(CatalogError::InvalidArgs(format!(
                "limit must not be negative, got {limit}"
            )));
        }

        if let Some(ids) = &self.ids
            && ids.is_empty()
        {
            return Err(CatalogError::InvalidFilter(
                "id filter is present but empty".to_string(),
            ));
        }

        if let Some(extra) = &self.extra {
            if extra.ids.is_empty() {
                return Err(CatalogError::InvalidFilter(format!(
                    "cross filter on {} has no ids",
                    extra.source
                )));
            }
            if extra.source.related_target() != Some(kind) {
                return Err(CatalogError::InvalidFilter(format!(
                    "{} ids cannot filter a {kind} listing",
                    extra.source
                )));
            }
        }

        if let EntityKind::Dimension(listed) = kind {
            for (field, _) in self.search.iter() {
                if let SearchField::Dimension(other) = field
                    && other != listed
                {
                    return Err(CatalogError::InvalidFilter(format!(
                        "{other} search term cannot filter a {listed} listing"
                    )));
                }
            }
        }

        Ok(())
    }
}

fn split_ids(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_window_value(name: &str, raw: &str) -> CatalogResult<i64> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| CatalogError::InvalidArgs(format!("{name} must be an integer, got '{raw}'")))?;
    if value < 0 {
        return Err(CatalogError::InvalidArgs(format!(
            "{name} must not be negative, got {value}"
        )));
    }
    Ok(value)
}
