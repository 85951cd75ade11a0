//! Grid tables in the `+---+` / `+===+` style used for reports.

pub struct GridTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    show_index: bool,
}

impl GridTable {
    pub fn new<S: AsRef<str>>(headers: &[S]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.as_ref().to_string()).collect(),
            rows: Vec::new(),
            show_index: false,
        }
    }

    /// Prepends a 0-based row index column.
    pub fn with_index(mut self) -> Self {
        self.show_index = true;
        self
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn extend_rows<I: IntoIterator<Item = Vec<String>>>(&mut self, rows: I) {
        self.rows.extend(rows);
    }

    pub fn render(&self) -> String {
        let mut headers = self.headers.clone();
        let mut rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                let mut cells: Vec<String> = row.iter().map(|c| flatten(c)).collect();
                cells.resize(headers.len(), String::new());
                cells
            })
            .collect();

        if self.show_index {
            headers.insert(0, String::new());
            for (i, row) in rows.iter_mut().enumerate() {
                row.insert(0, i.to_string());
            }
        }

        let widths: Vec<usize> = (0..headers.len())
            .map(|col| {
                rows.iter()
                    .map(|r| width(&r[col]))
                    .chain(std::iter::once(width(&headers[col])))
                    .max()
                    .unwrap_or(0)
            })
            .collect();
        let numeric: Vec<bool> = (0..headers.len())
            .map(|col| !rows.is_empty() && rows.iter().all(|r| is_numeric(&r[col])))
            .collect();

        let mut out = Vec::with_capacity(rows.len() * 2 + 3);
        out.push(border(&widths, '-'));
        out.push(line(&headers, &widths, &vec![false; widths.len()]));
        out.push(border(&widths, '='));
        for row in &rows {
            out.push(line(row, &widths, &numeric));
            out.push(border(&widths, '-'));
        }
        if rows.is_empty() {
            out.pop();
            out.push(border(&widths, '-'));
        }
        out.join("\n")
    }
}

fn flatten(cell: &str) -> String {
    cell.replace(['\r', '\n'], " ")
}

fn width(cell: &str) -> usize {
    cell.chars().count()
}

fn is_numeric(cell: &str) -> bool {
    !cell.is_empty() && cell.parse::<f64>().is_ok()
}

fn border(widths: &[usize], fill: char) -> String {
    let segments: Vec<String> = widths
        .iter()
        .map(|w| fill.to_string().repeat(w + 2))
        .collect();
    format!("+{}+", segments.join("+"))
}

fn line(cells: &[String], widths: &[usize], right_align: &[bool]) -> String {
    let segments: Vec<String> = cells
        .iter()
        .zip(widths)
        .zip(right_align)
        .map(|((cell, w), right)| {
            let pad = " ".repeat(w - width(cell));
            if *right {
                format!(" {}{} ", pad, cell)
            } else {
                format!(" {}{} ", cell, pad)
            }
        })
        .collect();
    format!("|{}|", segments.join("|"))
}
