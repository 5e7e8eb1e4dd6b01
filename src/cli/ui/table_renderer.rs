use crate::cli::output::current_preferences;

/// Describes how a column should align its contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
    Center,
}

/// Specifies the configuration for a single column in the rendered table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableColumn {
    pub header: String,
    pub min_width: usize,
    pub max_width: Option<usize>,
    pub alignment: Alignment,
}

impl TableColumn {
    pub fn new(header: impl Into<String>, alignment: Alignment) -> Self {
        Self {
            header: header.into(),
            min_width: 0,
            max_width: None,
            alignment,
        }
    }

    pub fn with_max_width(mut self, max_width: usize) -> Self {
        self.max_width = Some(max_width);
        self
    }
}

/// Column-aligned text table. Cells may span several lines; a row is as tall
/// as its tallest cell.
pub struct Table {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Vec<String>>,
    pub show_headers: bool,
    pub padding: usize,
}

impl Table {
    pub fn new(columns: Vec<TableColumn>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            show_headers: true,
            padding: 1,
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Content widths per column: the widest line of any cell or header,
    /// clamped to the column limits.
    pub fn compute_widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                let mut width = visible_width(&column.header).max(column.min_width);
                for row in &self.rows {
                    if let Some(cell) = row.get(idx) {
                        let widest = cell.lines().map(visible_width).max().unwrap_or(0);
                        width = width.max(widest);
                    }
                }
                if let Some(max_width) = column.max_width {
                    width = width.min(max_width);
                }
                width
            })
            .collect()
    }

    fn render_header(&self, widths: &[usize]) -> String {
        let header: Vec<String> = self.columns.iter().map(|c| c.header.clone()).collect();
        self.render_row(&header, widths)
    }

    /// Renders one logical row, which becomes as many output lines as its
    /// tallest cell.
    pub fn render_row(&self, row: &[String], widths: &[usize]) -> String {
        let cell_lines: Vec<Vec<&str>> = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, _)| {
                row.get(idx)
                    .map(|cell| cell.lines().collect())
                    .unwrap_or_default()
            })
            .collect();
        let height = cell_lines.iter().map(Vec::len).max().unwrap_or(0).max(1);

        let separator = if current_preferences().plain_mode() {
            "|"
        } else {
            "│"
        };

        (0..height)
            .map(|line| {
                let cells: Vec<String> = self
                    .columns
                    .iter()
                    .enumerate()
                    .map(|(idx, column)| {
                        let text = cell_lines[idx].get(line).copied().unwrap_or("");
                        render_cell(text, widths[idx], &column.alignment, self.padding)
                    })
                    .collect();
                cells.join(separator).trim_end().to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn render(&self) -> String {
        let widths = self.compute_widths();
        let mut out = String::new();

        if self.show_headers {
            out.push_str(&self.render_header(&widths));
            out.push('\n');
            out.push_str(&horizontal_rule(&widths, self.padding));
            if !self.rows.is_empty() {
                out.push('\n');
            }
        }

        let rule = horizontal_rule(&widths, self.padding);
        for (idx, row) in self.rows.iter().enumerate() {
            out.push_str(&self.render_row(row, &widths));
            if idx + 1 < self.rows.len() {
                out.push('\n');
                if row.iter().any(|cell| cell.contains('\n')) {
                    out.push_str(&rule);
                    out.push('\n');
                }
            }
        }

        out
    }
}

/// Character count ignoring ANSI escape sequences.
pub fn visible_width(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut idx = 0;
    let mut width = 0;

    while idx < bytes.len() {
        if bytes[idx] == 0x1b {
            idx += 1;
            if idx < bytes.len() && bytes[idx] == b'[' {
                idx += 1;
                while idx < bytes.len() {
                    let byte = bytes[idx];
                    idx += 1;
                    if (0x40..=0x7E).contains(&byte) {
                        break;
                    }
                }
                continue;
            }
        }

        if let Some(ch) = text[idx..].chars().next() {
            width += 1;
            idx += ch.len_utf8();
        } else {
            break;
        }
    }

    width
}

fn truncate_text(text: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }

    if visible_width(text) <= width {
        return text.to_string();
    }

    if width == 1 {
        return "…".to_string();
    }

    let target = width - 1;
    let bytes = text.as_bytes();
    let mut idx = 0;
    let mut visible = 0;
    let mut result = String::new();
    let mut saw_ansi = false;

    while idx < bytes.len() && visible < target {
        if bytes[idx] == 0x1b {
            let start = idx;
            idx += 1;
            if idx < bytes.len() && bytes[idx] == b'[' {
                idx += 1;
                while idx < bytes.len() {
                    let byte = bytes[idx];
                    idx += 1;
                    if (0x40..=0x7E).contains(&byte) {
                        break;
                    }
                }
            }
            result.push_str(&text[start..idx]);
            saw_ansi = true;
            continue;
        }

        if let Some(ch) = text[idx..].chars().next() {
            let len = ch.len_utf8();
            result.push_str(&text[idx..idx + len]);
            visible += 1;
            idx += len;
        } else {
            break;
        }
    }

    result.push('…');
    if saw_ansi {
        result.push_str("\u{1b}[0m");
    }
    result
}

/// Renders a single-line cell with padding and alignment applied.
pub fn render_cell(text: &str, width: usize, alignment: &Alignment, padding: usize) -> String {
    let fitted = truncate_text(text, width);
    let remaining = width.saturating_sub(visible_width(&fitted));

    let (left_spaces, right_spaces) = match alignment {
        Alignment::Left => (0, remaining),
        Alignment::Right => (remaining, 0),
        Alignment::Center => (remaining / 2, remaining - (remaining / 2)),
    };

    let mut cell = String::new();
    cell.push_str(&" ".repeat(padding + left_spaces));
    cell.push_str(&fitted);
    cell.push_str(&" ".repeat(right_spaces + padding));
    cell
}

/// Builds a horizontal rule that spans the width of the table.
pub fn horizontal_rule(widths: &[usize], padding: usize) -> String {
    if widths.is_empty() {
        return String::new();
    }

    let total_width: usize =
        widths.iter().map(|w| w + (padding * 2)).sum::<usize>() + widths.len().saturating_sub(1);
    let ch = if current_preferences().plain_mode() {
        '-'
    } else {
        '─'
    };
    ch.to_string().repeat(total_width)
}
