use super::model::{Dimensional, Selection, Table};

/// Rows of a table that survived a [`Selection`], borrowed in source order.
pub type Filtered<'a, R> = Vec<&'a R>;

/// Return indices of rows that pass all active constraints.
///
/// A row passes when, for every dimension set in `selection`, its cell is
/// present and equal to the selected value. Unset dimensions impose nothing.
pub fn filtered_indices<R: Dimensional>(rows: &[R], selection: &Selection) -> Vec<usize> {
    rows.iter()
        .enumerate()
        .filter(|(_, row)| selection.matches(row.org()))
        .map(|(i, _)| i)
        .collect()
}

/// Apply `selection` to a table, preserving row order.
pub fn filter_table<'a, R: Dimensional>(table: &'a Table<R>, selection: &Selection) -> Filtered<'a, R> {
    if selection.is_empty() {
        return table.rows.iter().collect();
    }
    filtered_indices(&table.rows, selection)
        .into_iter()
        .map(|i| &table.rows[i])
        .collect()
}
