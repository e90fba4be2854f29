// Box-drawn tables for book listings. Cells wider than the column limit
// wrap on word boundaries; words longer than the limit are split.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const MAX_COL_WIDTH: usize = 20;

/// Split a word into pieces no wider than `width` columns. A single
/// character wider than `width` still gets a piece of its own.
fn split_word(word: &str, width: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut piece_width = 0usize;
    for c in word.chars() {
        let w = c.width().unwrap_or(0);
        if piece_width + w > width && !piece.is_empty() {
            pieces.push(std::mem::take(&mut piece));
            piece_width = 0;
        }
        piece.push(c);
        piece_width += w;
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

/// Wrap `text` into lines at most `width` terminal columns wide.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_width = 0usize;

    for word in text.split_whitespace() {
        let mut pieces = split_word(word, width);
        let last = match pieces.pop() {
            Some(last) => last,
            None => continue,
        };
        if !pieces.is_empty() && line_width > 0 {
            lines.push(std::mem::take(&mut line));
            line_width = 0;
        }
        lines.extend(pieces);

        let word_width = last.width();
        if line_width > 0 && line_width + 1 + word_width > width {
            lines.push(std::mem::take(&mut line));
            line_width = 0;
        }
        if line_width > 0 {
            line.push(' ');
            line_width += 1;
        }
        line.push_str(&last);
        line_width += word_width;
    }
    if line_width > 0 || lines.is_empty() {
        lines.push(line);
    }
    lines
}

fn border(widths: &[usize], left: char, fill: char, mid: char, right: char) -> String {
    let mut out = String::new();
    out.push(left);
    for (i, w) in widths.iter().enumerate() {
        if i > 0 {
            out.push(mid);
        }
        out.extend(std::iter::repeat(fill).take(w + 2));
    }
    out.push(right);
    out
}

fn wrap_cells(cells: &[&str]) -> Vec<Vec<String>> {
    cells.iter().map(|c| wrap(c, MAX_COL_WIDTH)).collect()
}

fn render_row(out: &mut Vec<String>, cells: &[Vec<String>], widths: &[usize]) {
    let height = cells.iter().map(Vec::len).max().unwrap_or(1);
    for line in 0..height {
        let mut text = String::from("│");
        for (cell, w) in cells.iter().zip(widths) {
            let part = cell.get(line).map(String::as_str).unwrap_or("");
            let pad = w.saturating_sub(part.width());
            text.push(' ');
            text.push_str(part);
            text.extend(std::iter::repeat(' ').take(pad + 1));
            text.push('│');
        }
        out.push(text);
    }
}

/// Render a grid with a double rule under the header and single rules
/// between body rows.
pub fn render(headers: &[&str], rows: &[Vec<String>]) -> String {
    let head = wrap_cells(headers);
    let body: Vec<Vec<Vec<String>>> = rows
        .iter()
        .map(|r| {
            let mut cells: Vec<&str> = r.iter().map(String::as_str).collect();
            cells.resize(headers.len(), "");
            wrap_cells(&cells)
        })
        .collect();

    let mut widths = vec![0usize; headers.len()];
    for row in std::iter::once(&head).chain(body.iter()) {
        for (w, cell) in widths.iter_mut().zip(row) {
            let longest = cell.iter().map(|l| l.width()).max().unwrap_or(0);
            *w = (*w).max(longest);
        }
    }

    let mut out = vec![border(&widths, '╒', '═', '╤', '╕')];
    render_row(&mut out, &head, &widths);
    out.push(border(&widths, '╞', '═', '╪', '╡'));
    for (i, row) in body.iter().enumerate() {
        if i > 0 {
            out.push(border(&widths, '├', '─', '┼', '┤'));
        }
        render_row(&mut out, row, &widths);
    }
    out.push(border(&widths, '╘', '═', '╧', '╛'));
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_on_words() {
        assert_eq!(wrap("The Left Hand of Darkness", 20), vec!["The Left Hand of", "Darkness"]);
        assert_eq!(wrap("", 20), vec![""]);
        assert_eq!(wrap("short", 20), vec!["short"]);
    }

    #[test]
    fn wrap_splits_long_words() {
        assert_eq!(wrap("abcdefghij xy", 4), vec!["abcd", "efgh", "ij", "xy"]);
    }

    #[test]
    fn wide_characters_count_double() {
        let lines = wrap("ノルウェイの森ノルウェイの森", 20);
        assert_eq!(lines, vec!["ノルウェイの森ノルウ", "ェイの森"]);
        assert!(lines.iter().all(|l| l.width() <= 20));
    }

    #[test]
    fn grid_stays_aligned_with_wide_characters() {
        let rows = vec![vec!["ノルウェイの森".to_string(), "Murakami".to_string()]];
        let table = render(&["Title", "Author"], &rows);
        let widths: Vec<usize> = table.lines().map(|l| l.width()).collect();
        assert!(widths.iter().all(|w| *w == widths[0]), "uneven widths {widths:?}");
        assert_eq!(table.lines().nth(3), Some("│ ノルウェイの森 │ Murakami │"));
    }

    #[test]
    fn renders_grid() {
        let rows = vec![
            vec!["Dune".to_string(), "Frank Herbert".to_string()],
            vec!["Emma".to_string()],
        ];
        let expected = [
            "╒═══════╤═══════════════╕",
            "│ Title │ Author        │",
            "╞═══════╪═══════════════╡",
            "│ Dune  │ Frank Herbert │",
            "├───────┼───────────────┤",
            "│ Emma  │               │",
            "╘═══════╧═══════════════╛",
        ]
        .join("\n");
        assert_eq!(render(&["Title", "Author"], &rows), expected);
    }

    #[test]
    fn wrapped_cells_take_several_lines() {
        let rows = vec![vec!["The Left Hand of Darkness".to_string(), "Le Guin".to_string()]];
        let table = render(&["Title", "Author"], &rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[3], "│ The Left Hand of │ Le Guin │");
        assert_eq!(lines[4], "│ Darkness         │         │");
    }
}
