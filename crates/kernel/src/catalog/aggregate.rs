//! Folding of flat composition join rows into perfume → note → component
//! trees.
//!
//! All state lives on the caller's stack for one call. Output order does not
//! depend on row arrival order:
//! - perfumes ascending by id
//! - notes and components ascending by name, id as tie-break

use std::collections::{BTreeMap, HashMap};

use tracing::warn;

use super::error::{CatalogError, CatalogResult};
use super::types::{ComponentItem, CompositionRow, NoteItem, PerfumeComposition, PerfumeInfo};

#[derive(Debug, Default)]
struct NoteAcc {
    name: String,
    components: BTreeMap<String, String>,
}

/// Fold `rows` into one composition per distinct perfume id.
///
/// `infos` holds the side-loaded perfume attributes keyed by perfume id.
/// Malformed rows reject the whole batch.
pub fn aggregate(
    rows: Vec<CompositionRow>,
    infos: &HashMap<String, PerfumeInfo>,
) -> CatalogResult<Vec<PerfumeComposition>> {
    let mut perfumes: BTreeMap<String, BTreeMap<String, NoteAcc>> = BTreeMap::new();

    for row in rows {
        check_row(&row)?;

        let note = perfumes
            .entry(row.perfume_id)
            .or_default()
            .entry(row.note_id)
            .or_default();
        note.name = row.note_name;
        note.components.insert(row.component_id, row.component_name);
    }

    let mut out = Vec::with_capacity(perfumes.len());
    for (perfume_id, notes) in perfumes {
        let info = infos.get(&perfume_id).cloned().ok_or_else(|| {
            warn!(perfume_id = %perfume_id, "composition rows reference unlisted perfume");
            CatalogError::Aggregation(format!(
                "no perfume attributes for perfume '{perfume_id}'"
            ))
        })?;

        let mut notes: Vec<NoteItem> = notes
            .into_iter()
            .map(|(id, acc)| materialize_note(id, acc))
            .collect();
        notes.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

        let total_components = notes.iter().map(|n| n.component_count).sum();
        out.push(PerfumeComposition {
            info,
            notes,
            total_components,
        });
    }

    Ok(out)
}

fn materialize_note(id: String, acc: NoteAcc) -> NoteItem {
    let mut components: Vec<ComponentItem> = acc
        .components
        .into_iter()
        .map(|(id, name)| ComponentItem {
            id,
            name,
            links: Vec::new(),
        })
        .collect();
    components.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

    NoteItem {
        id,
        name: acc.name,
        component_count: components.len() as i64,
        components,
        links: Vec::new(),
    }
}

fn check_row(row: &CompositionRow) -> CatalogResult<()> {
    let missing = [
        ("perfume id", row.perfume_id.is_empty()),
        ("note id", row.note_id.is_empty()),
        ("note name", row.note_name.is_empty()),
        ("component id", row.component_id.is_empty()),
        ("component name", row.component_name.is_empty()),
    ]
    .into_iter()
    .find_map(|(field, empty)| empty.then_some(field));

    match missing {
        Some(field) => {
            warn!(
                perfume_id = %row.perfume_id,
                note_id = %row.note_id,
                component_id = %row.component_id,
                field,
                "malformed composition row"
            );
            Err(CatalogError::Aggregation(format!(
                "composition row has empty {field}"
            )))
        }
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(perfume: &str, note: &str, note_name: &str, comp: &str, comp_name: &str) -> CompositionRow {
        CompositionRow {
            perfume_id: perfume.to_string(),
            note_id: note.to_string(),
            note_name: note_name.to_string(),
            component_id: comp.to_string(),
            component_name: comp_name.to_string(),
        }
    }

    fn info(id: &str) -> PerfumeInfo {
        PerfumeInfo {
            id: id.to_string(),
            name: format!("Perfume {id}"),
            description_id: "d".to_string(),
            description: String::new(),
            year: 2001,
            brand_id: "b".to_string(),
            brand_name: "Brand".to_string(),
            gender_id: "g".to_string(),
            gender_name: "Gender".to_string(),
            group_id: "gr".to_string(),
            group_name: "Group".to_string(),
            country_id: "c".to_string(),
            country_name: "Country".to_string(),
            season_id: "s".to_string(),
            season_name: "Season".to_string(),
            tsod_id: "t".to_string(),
            tsod_name: "Evening".to_string(),
            type_id: "ty".to_string(),
            type_name: "Type".to_string(),
            image_id: None,
            stars_id: None,
            shop_id: None,
            links: Vec::new(),
            small_img_url: None,
            large_img_url: None,
        }
    }

    fn infos(ids: &[&str]) -> HashMap<String, PerfumeInfo> {
        ids.iter().map(|id| (id.to_string(), info(id))).collect()
    }

    #[test]
    fn folds_rows_per_perfume() {
        let rows = vec![
            row("P1", "N1", "Top", "C2", "Musk"),
            row("P1", "N1", "Top", "C1", "Amber"),
            row("P2", "N2", "Base", "C1", "Amber"),
        ];
        let out = aggregate(rows, &infos(&["P1", "P2"])).unwrap();

        assert_eq!(out.len(), 2);
        let p1 = &out[0];
        assert_eq!(p1.info.id, "P1");
        assert_eq!(p1.notes.len(), 1);
        assert_eq!(p1.notes[0].component_count, 2);
        let names: Vec<_> = p1.notes[0].components.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Amber", "Musk"]);
        assert_eq!(p1.total_components, 2);

        let p2 = &out[1];
        assert_eq!(p2.notes[0].id, "N2");
        assert_eq!(p2.notes[0].component_count, 1);
        assert_eq!(p2.total_components, 1);
    }

    #[test]
    fn repeated_component_counts_once() {
        let rows = vec![
            row("P1", "N1", "Top", "C1", "Amber"),
            row("P1", "N1", "Top", "C1", "Amber"),
        ];
        let out = aggregate(rows, &infos(&["P1"])).unwrap();
        assert_eq!(out[0].notes[0].component_count, 1);
    }

    #[test]
    fn notes_sorted_by_name_then_id() {
        let rows = vec![
            row("P1", "N3", "Heart", "C1", "Rose"),
            row("P1", "N2", "Base", "C2", "Oud"),
            row("P1", "N1", "Heart", "C3", "Iris"),
        ];
        let out = aggregate(rows, &infos(&["P1"])).unwrap();
        let ids: Vec<_> = out[0].notes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["N2", "N1", "N3"]);
        assert_eq!(out[0].total_components, 3);
    }

    #[test]
    fn output_ignores_row_order() {
        let rows = vec![
            row("P2", "N1", "Top", "C1", "Lemon"),
            row("P1", "N2", "Base", "C3", "Vanilla"),
            row("P1", "N1", "Top", "C2", "Bergamot"),
            row("P1", "N1", "Top", "C1", "Lemon"),
        ];
        let mut reversed = rows.clone();
        reversed.reverse();
        let mut rotated = rows.clone();
        rotated.rotate_left(2);

        let ids = infos(&["P1", "P2"]);
        let expected = aggregate(rows, &ids).unwrap();
        assert_eq!(aggregate(reversed, &ids).unwrap(), expected);
        assert_eq!(aggregate(rotated, &ids).unwrap(), expected);
        assert_eq!(expected[0].info.id, "P1");
    }

    #[test]
    fn empty_name_rejects_batch() {
        let rows = vec![
            row("P1", "N1", "Top", "C1", "Amber"),
            row("P1", "N1", "", "C2", "Musk"),
        ];
        let err = aggregate(rows, &infos(&["P1"])).unwrap_err();
        assert!(matches!(err, CatalogError::Aggregation(_)));

        let rows = vec![row("P1", "N1", "Top", "C1", "")];
        assert!(aggregate(rows, &infos(&["P1"])).is_err());
    }

    #[test]
    fn empty_id_rejects_batch() {
        for bad in [
            row("", "N1", "Top", "C1", "Amber"),
            row("P1", "", "Top", "C1", "Amber"),
            row("P1", "N1", "Top", "", "Amber"),
        ] {
            let rows = vec![row("P1", "N1", "Top", "C2", "Musk"), bad.clone()];
            let err = aggregate(rows, &infos(&["", "P1"])).unwrap_err();
            assert!(
                matches!(&err, CatalogError::Aggregation(msg) if msg.contains("id")),
                "{bad:?} accepted: {err:?}"
            );
        }
    }

    #[test]
    fn unknown_perfume_is_an_error() {
        let rows = vec![row("P9", "N1", "Top", "C1", "Amber")];
        let err = aggregate(rows, &infos(&["P1"])).unwrap_err();
        assert!(matches!(err, CatalogError::Aggregation(_)));
    }

    #[test]
    fn no_rows_no_output() {
        assert!(aggregate(Vec::new(), &infos(&["P1"])).unwrap().is_empty());
    }
}
