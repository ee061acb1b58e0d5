use notion_api::prelude::*;

pub trait TableRow {
    fn headers() -> &'static [&'static str];
    fn row(&self) -> Vec<String>;
}

pub fn render_table<T: TableRow>(items: &[T]) -> String {
    let headers = T::headers();
    let rows: Vec<Vec<String>> = items.iter().map(TableRow::row).collect();
    let widths = column_widths(headers, &rows);

    let mut out = format_row(
        &headers.iter().map(ToString::to_string).collect::<Vec<_>>(),
        &widths,
    );
    out.push('\n');
    out.push_str(&format_separator(&widths));

    for row in rows {
        out.push('\n');
        out.push_str(&format_row(&row, &widths));
    }

    out
}

fn column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            if idx >= widths.len() {
                widths.push(len);
            } else {
                widths[idx] = widths[idx].max(len);
            }
        }
    }
    widths
}

fn format_row(row: &[String], widths: &[usize]) -> String {
    use std::fmt::Write as _;
    let mut out = String::new();
    for (idx, cell) in row.iter().enumerate() {
        if idx > 0 {
            out.push_str("  ");
        }
        let width = widths.get(idx).copied().unwrap_or(0);
        let _ = write!(out, "{cell:<width$}");
    }
    out.trim_end().to_string()
}

fn format_separator(widths: &[usize]) -> String {
    widths
        .iter()
        .map(|width| "-".repeat(*width))
        .collect::<Vec<_>>()
        .join("  ")
}

/// Title of a page from its embedded title property. Long titles may be truncated by the API.
pub fn page_title(page: &Page) -> String {
    page.properties
        .values()
        .find(|prop| prop.kind == PropertyType::Title)
        .and_then(|prop| prop.value.get("title"))
        .and_then(|title| serde_json::from_value::<Vec<RichText>>(title.clone()).ok())
        .map(|title| plain_text(&title))
        .unwrap_or_default()
}

impl TableRow for Page {
    fn headers() -> &'static [&'static str] {
        &["id", "title", "created", "archived"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            page_title(self),
            self.created_time.format("%Y-%m-%d %H:%M:%S").to_string(),
            self.archived.to_string(),
        ]
    }
}

/// A column of a database schema
#[derive(serde::Serialize)]
pub struct SchemaColumn<'a> {
    #[serde(skip)]
    pub name: &'a str,
    #[serde(flatten)]
    pub property: &'a DatabaseProperty,
}

impl TableRow for SchemaColumn<'_> {
    fn headers() -> &'static [&'static str] {
        &["name", "id", "type", "options"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.to_string(),
            self.property.id.clone(),
            self.property.kind.to_string(),
            self.property
                .options()
                .iter()
                .map(|o| o.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row(&'static str, &'static str);

    impl TableRow for Row {
        fn headers() -> &'static [&'static str] {
            &["a", "bee"]
        }

        fn row(&self) -> Vec<String> {
            vec![self.0.to_string(), self.1.to_string()]
        }
    }

    #[test]
    fn test_render_table_aligns_columns() {
        let table = render_table(&[Row("long value", "x"), Row("s", "yy")]);
        let lines = table.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "a           bee");
        assert_eq!(lines[1], "----------  ---");
        assert_eq!(lines[2], "long value  x");
        assert_eq!(lines[3], "s           yy");
    }

    #[test]
    fn test_schema_column_row() {
        let prop = DatabaseProperty::new("cat", PropertyType::Select)
            .with_options(vec![SelectOption::named("a"), SelectOption::named("b")]);
        let column = SchemaColumn {
            name: "cat",
            property: &prop,
        };
        assert_eq!(column.row(), vec!["cat", "", "select", "a, b"]);
    }
}
