// src/services/aggregate.rs

//! Grouping of case rows by category.

use indexmap::IndexMap;

use crate::models::Detail;

/// Case rows grouped by category, in first-seen category order.
///
/// Categories are compared as raw strings: `東京都` and `東京` are distinct.
#[derive(Debug, Clone, Default)]
pub struct CategoryGroups {
    groups: IndexMap<String, Vec<Detail>>,
}

impl CategoryGroups {
    /// Add a row to its category's group.
    pub fn push(&mut self, detail: Detail) {
        self.groups
            .entry(detail.category().to_string())
            .or_default()
            .push(detail);
    }

    /// Rows recorded for `category`.
    pub fn get(&self, category: &str) -> Option<&[Detail]> {
        self.groups.get(category).map(Vec::as_slice)
    }

    /// Iterate over `(category, rows)` in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Detail])> {
        self.groups
            .iter()
            .map(|(category, rows)| (category.as_str(), rows.as_slice()))
    }

    /// `(category, row count)` pairs in first-seen order.
    pub fn counts(&self) -> Vec<(&str, u64)> {
        self.iter()
            .map(|(category, rows)| (category, rows.len() as u64))
            .collect()
    }

    /// Number of distinct categories.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of rows across all categories.
    pub fn total_rows(&self) -> u64 {
        self.groups.values().map(|rows| rows.len() as u64).sum()
    }
}

impl FromIterator<Detail> for CategoryGroups {
    fn from_iter<I: IntoIterator<Item = Detail>>(iter: I) -> Self {
        let mut groups = Self::default();
        for detail in iter {
            groups.push(detail);
        }
        groups
    }
}

/// Group rows by their prefecture field.
pub fn group_by_category(rows: impl IntoIterator<Item = Detail>) -> CategoryGroups {
    rows.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(no: &str, prefecture: &str) -> Detail {
        Detail {
            no: no.to_string(),
            prefecture: prefecture.to_string(),
            ..Detail::default()
        }
    }

    #[test]
    fn test_groups_in_first_seen_order() {
        let groups = group_by_category(vec![
            row("1", "大阪府"),
            row("2", "東京都"),
            row("3", "大阪府"),
            row("4", "北海道"),
        ]);

        assert_eq!(
            groups.counts(),
            vec![("大阪府", 2), ("東京都", 1), ("北海道", 1)]
        );
        let osaka: Vec<_> = groups
            .get("大阪府")
            .unwrap()
            .iter()
            .map(|d| d.no.as_str())
            .collect();
        assert_eq!(osaka, vec!["1", "3"]);
        assert!(groups.get("京都府").is_none());
    }

    #[test]
    fn test_returning_category_keeps_its_position() {
        let mut groups = group_by_category(vec![row("1", "東京都"), row("2", "大阪府")]);
        groups.push(row("3", "東京都"));
        assert_eq!(groups.counts(), vec![("東京都", 2), ("大阪府", 1)]);
        let categories: Vec<_> = groups.iter().map(|(category, _)| category).collect();
        assert_eq!(categories, vec!["東京都", "大阪府"]);
    }

    #[test]
    fn test_no_spelling_normalization() {
        let groups = group_by_category(vec![row("1", "東京都"), row("2", "東京")]);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_counts_sum_to_row_total() {
        let inputs = [
            vec![],
            vec![row("1", "A")],
            vec![row("1", "A"), row("2", "B"), row("3", "A"), row("4", "")],
            (0..25)
                .map(|i| row(&i.to_string(), ["X", "Y", "Z"][i % 3]))
                .collect(),
        ];
        for rows in inputs {
            let expected = rows.len() as u64;
            let groups = group_by_category(rows);
            let summed: u64 = groups.counts().iter().map(|(_, n)| n).sum();
            assert_eq!(summed, expected);
            assert_eq!(groups.total_rows(), expected);
        }
    }

    #[test]
    fn test_empty() {
        let groups = group_by_category(Vec::new());
        assert!(groups.is_empty());
        assert_eq!(groups.total_rows(), 0);
    }
}
