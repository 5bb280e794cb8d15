//! Text rendering of results and schemas for the CLI.

use crate::db::{DatabaseSchema, ResultSet};

/// Renders a result set as one text table per statement.
pub fn render_result_set(result_set: &ResultSet) -> String {
    let mut out = String::new();

    for statement in result_set {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&statement.stmt);
        out.push('\n');

        if statement.header.is_empty() && statement.rows.is_empty() {
            out.push_str("(no output)\n");
        } else {
            out.push_str(&render_table(&statement.header, &statement.rows));
        }
    }

    out
}

/// Renders a database schema as an indented listing.
pub fn render_schema(schema: &DatabaseSchema) -> String {
    let mut out = format!("Database: {} ({})\n", schema.name, schema.path.display());

    for table in &schema.tables {
        out.push_str(&format!(
            "  {} {} ({} columns)\n",
            table.kind.as_str(),
            table.name,
            table.columns.len()
        ));
        for column in &table.columns {
            let mut line = format!("    {} {}", column.name, column.type_name);
            if column.pk > 0 {
                line.push_str(" PK");
            }
            if column.notnull {
                line.push_str(" NOT NULL");
            }
            if let Some(default) = &column.default_value {
                line.push_str(&format!(" DEFAULT {default}"));
            }
            line.push('\n');
            out.push_str(&line);
        }
    }

    out
}

fn render_table(header: &[String], rows: &[Vec<String>]) -> String {
    let columns = header
        .len()
        .max(rows.iter().map(Vec::len).max().unwrap_or(0));

    let mut widths = vec![0usize; columns];
    for (i, cell) in header.iter().enumerate() {
        widths[i] = cell.chars().count();
    }
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    if !header.is_empty() {
        out.push_str(&render_row(header, &widths));
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&render_row(&rule, &widths));
    }
    for row in rows {
        out.push_str(&render_row(row, &widths));
    }

    out
}

fn render_row(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(i, &width)| {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            format!("{cell:<width$}")
        })
        .collect();

    format!("{}\n", padded.join(" | ").trim_end())
}
