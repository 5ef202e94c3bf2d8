//! FILENAME: core/table-engine/src/view.rs
//! Flatten & Paginate - turns the sorted tree into the rows the UI renders.
//!
//! The visible sequence is a pre-order walk of the tree: a group header is
//! followed by its children only when the group is expanded. Pagination
//! slices that sequence; an out-of-range page index is clamped to the last
//! page instead of producing an empty page.

use records::{ColumnDef, ColumnId, ColumnRegistry, Row, RowId, Value};
use serde::{Deserialize, Serialize};

use crate::definition::{GroupPath, PageState, RowIndex, SortKey, TableOptions};
use crate::group::{NodeId, RowNode, RowTree};

// ============================================================================
// VISIBLE SEQUENCE
// ============================================================================

/// One entry of the visible sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DisplayNode {
    #[serde(rename_all = "camelCase")]
    Group {
        node: NodeId,
        path: GroupPath,
        column_id: ColumnId,
        value: Value,
        depth: usize,
        expanded: bool,
        /// Number of direct children (sub-groups or records).
        child_count: usize,
        /// Number of records under the group.
        leaf_count: usize,
    },
    #[serde(rename_all = "camelCase")]
    Leaf {
        node: NodeId,
        row: RowIndex,
        id: RowId,
        depth: usize,
    },
}

impl DisplayNode {
    pub fn node(&self) -> NodeId {
        match self {
            DisplayNode::Group { node, .. } | DisplayNode::Leaf { node, .. } => *node,
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            DisplayNode::Group { depth, .. } | DisplayNode::Leaf { depth, .. } => *depth,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, DisplayNode::Group { .. })
    }

    /// The record index, for leaves.
    pub fn row(&self) -> Option<RowIndex> {
        match self {
            DisplayNode::Leaf { row, .. } => Some(*row),
            DisplayNode::Group { .. } => None,
        }
    }
}

/// Flattens `tree` into its visible sequence.
pub fn flatten(tree: &RowTree, rows: &[Row]) -> Vec<DisplayNode> {
    let mut out = Vec::new();
    for &root in tree.roots() {
        flatten_node(tree, rows, root, &mut out);
    }
    out
}

fn flatten_node(tree: &RowTree, rows: &[Row], id: NodeId, out: &mut Vec<DisplayNode>) {
    match tree.node(id) {
        RowNode::Leaf(leaf) => out.push(DisplayNode::Leaf {
            node: id,
            row: leaf.row,
            id: rows[leaf.row].id().clone(),
            depth: leaf.depth,
        }),
        RowNode::Group(group) => {
            out.push(DisplayNode::Group {
                node: id,
                path: group.path.clone(),
                column_id: group.column_id.clone(),
                value: group.value.clone(),
                depth: group.depth,
                expanded: group.expanded,
                child_count: group.children.len(),
                leaf_count: group.leaf_count,
            });
            if group.expanded {
                for &child in &group.children {
                    flatten_node(tree, rows, child, out);
                }
            }
        }
    }
}

// ============================================================================
// PAGINATION
// ============================================================================

/// One page of a sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub rows: Vec<T>,
    /// The page actually shown, after clamping.
    pub page_index: usize,
    pub page_size: usize,
    pub page_count: usize,
    pub can_go_prev: bool,
    pub can_go_next: bool,
    /// Length of the whole sequence.
    pub total_rows: usize,
}

/// Number of pages needed for `len` entries.
pub fn page_count(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1))
}

/// Clamps a requested page index into `[0, page_count)`, or 0 when there
/// are no pages.
pub fn clamp_page_index(page_index: usize, page_count: usize) -> usize {
    page_index.min(page_count.saturating_sub(1))
}

/// Returns the requested page of `sequence`.
pub fn paginate<T: Clone>(sequence: &[T], page: &PageState) -> Page<T> {
    let page_size = page.page_size.max(1);
    let count = page_count(sequence.len(), page_size);
    let index = clamp_page_index(page.page_index, count);

    let start = (index * page_size).min(sequence.len());
    let end = (start + page_size).min(sequence.len());

    Page {
        rows: sequence[start..end].to_vec(),
        page_index: index,
        page_size,
        page_count: count,
        can_go_prev: index > 0,
        can_go_next: index + 1 < count,
        total_rows: sequence.len(),
    }
}

// ============================================================================
// CELLS
// ============================================================================

/// How a cell is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellKind {
    /// The grouping value of a group header.
    Grouped,
    /// An aggregate on a group header.
    Aggregated,
    /// A repeated grouping value on a record, or nothing on a header.
    Placeholder,
    /// A record's own value.
    Plain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewCell {
    pub column_id: ColumnId,
    pub kind: CellKind,
    pub value: Value,
    /// Text to show.
    pub display: String,
}

/// A visible row with one cell per registry column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewRow {
    #[serde(flatten)]
    pub node: DisplayNode,
    pub cells: Vec<ViewCell>,
}

/// Cuts `text` to `max_chars` characters, marking the cut with `...`.
pub fn truncate_display(text: &str, max_chars: usize) -> String {
    if max_chars == 0 || text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

/// Label of a group value; empty values get the configured blank label.
pub fn group_label(value: &Value, options: &TableOptions) -> String {
    if value.is_empty() {
        options.blank_label.clone()
    } else {
        value.to_string()
    }
}

/// Renders the cells of one visible row.
pub fn render_row(
    node: &DisplayNode,
    tree: &RowTree,
    rows: &[Row],
    registry: &ColumnRegistry,
    options: &TableOptions,
) -> ViewRow {
    let cells = registry
        .iter()
        .map(|column| render_cell(node, column, tree, rows, options))
        .collect();
    ViewRow { node: node.clone(), cells }
}

fn render_cell(
    node: &DisplayNode,
    column: &ColumnDef,
    tree: &RowTree,
    rows: &[Row],
    options: &TableOptions,
) -> ViewCell {
    let is_grouped = tree.group_by().iter().any(|g| *g == column.id);

    let (kind, value, display) = match node {
        DisplayNode::Leaf { row, .. } => {
            let value = column.value(&rows[*row]).clone();
            let display = truncate_display(&value.to_string(), options.max_cell_chars);
            let kind = if is_grouped { CellKind::Placeholder } else { CellKind::Plain };
            (kind, value, display)
        }
        DisplayNode::Group { node, column_id, value, child_count, .. } => {
            if *column_id == column.id {
                let display = format!("{} ({})", group_label(value, options), child_count);
                (CellKind::Grouped, value.clone(), display)
            } else {
                let aggregate = tree.node(*node).as_group().and_then(|g| g.aggregate(&column.id));
                match aggregate {
                    Some(n) => {
                        let value = Value::Number(n);
                        let display = value.to_string();
                        (CellKind::Aggregated, value, display)
                    }
                    None => (CellKind::Placeholder, Value::Empty, String::new()),
                }
            }
        }
    };

    ViewCell {
        column_id: column.id.clone(),
        kind,
        value,
        display,
    }
}

// ============================================================================
// TABLE VIEW
// ============================================================================

/// Everything the UI needs to render one page of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView {
    pub rows: Vec<ViewRow>,
    pub page_index: usize,
    pub page_size: usize,
    pub page_count: usize,
    pub can_go_prev: bool,
    pub can_go_next: bool,
    /// Length of the whole visible sequence.
    pub total_visible: usize,
    /// Records passing every filter.
    pub filtered_count: usize,
    /// Records passing the column filters, before the global search.
    pub pre_global_filtered_count: usize,
    pub group_by: Vec<ColumnId>,
    pub sort_by: Vec<SortKey>,
}

impl TableView {
    /// Records shown on this page, in display order.
    pub fn row_indices(&self) -> Vec<RowIndex> {
        self.rows.iter().filter_map(|r| r.node.row()).collect()
    }

    pub fn cell(&self, row: usize, column_id: &str) -> Option<&ViewCell> {
        self.rows
            .get(row)
            .and_then(|r| r.cells.iter().find(|c| c.column_id == column_id))
    }
}
