//! SQL synthesis
//!
//! Renders a [`LogicalQueryPlan`] into a single SQL string. Every
//! identifier that reaches this module was lowercased and validated when
//! the metadata snapshot or the request was built, so no quoting or
//! escaping happens here.

use crate::plan::{LogicalQueryPlan, Projection, QualifiedColumn};

/// Renders a logical plan as SQL.
pub fn render(plan: &LogicalQueryPlan) -> String {
    match plan {
        LogicalQueryPlan::Select {
            tables,
            projection,
            join_key,
        } => render_select(tables, projection, join_key.as_deref()),
        LogicalQueryPlan::ShowPartitions { table } => format!("SHOW PARTITIONS {}", table),
    }
}

fn render_select(tables: &[String], projection: &Projection, join_key: Option<&str>) -> String {
    let select_list = match projection {
        Projection::Star => "*".to_string(),
        Projection::Columns(columns) => columns
            .iter()
            .map(qualify)
            .collect::<Vec<_>>()
            .join(", "),
    };

    let mut sql = format!("SELECT {} FROM {}", select_list, tables[0]);
    if let Some(key) = join_key {
        let anchor = &tables[0];
        for other in &tables[1..] {
            sql.push_str(&format!(
                " INNER JOIN {} ON {}.{} = {}.{}",
                other, anchor, key, other, key
            ));
        }
    }
    sql
}

fn qualify(column: &QualifiedColumn) -> String {
    format!("{}.{}", column.table, column.column)
}
