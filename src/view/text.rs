//! Plain-text rendering of a [`ViewState`]: a status line, the hex grid
//! with its text column, and the inspector block.
//!
//! Every hex cell is prefixed by a marker character: `>` for the caret,
//! `^` for the mark, `:` inside the live selection, `#` inside a tagged
//! selection.

use crate::model::inspector;
use crate::model::selection;
use crate::util;
use crate::view::ViewState;

/* label, little-endian and big-endian columns of the inspector */
const INSPECTOR_COLUMNS: [usize; 3] = [0, 6, 18];
const INSPECTOR_LABELS: [&str; 6] = ["   8", "±  8", "  16", "± 16", "  32", "± 32"];
const BINARY_STRIDE: usize = 9;

const ADDRESS_GUTTER: usize = 10;

/// Character cells written at arbitrary positions, like a tiny terminal.
#[derive(Debug, Default)]
struct Canvas {
    lines: Vec<Vec<char>>,
}

impl Canvas {
    fn write(&mut self, col: usize, row: usize, text: &str) {
        if self.lines.len() <= row {
            self.lines.resize_with(row + 1, Vec::new);
        }

        let line = &mut self.lines[row];
        for (i, c) in text.chars().enumerate() {
            if line.len() <= col + i {
                line.resize(col + i + 1, ' ');
            }
            line[col + i] = c;
        }
    }

    fn into_lines(self) -> Vec<String> {
        self.lines.into_iter()
            .map(|line| line.into_iter().collect::<String>().trim_end().to_string())
            .collect()
    }
}

pub fn render<V: ViewState + ?Sized>(view: &V) -> String {
    let mut lines = vec![render_status(view)];
    lines.extend(render_grid(view));

    let inspector = render_inspector(view.panels());
    if !inspector.is_empty() {
        lines.push(String::new());
        lines.extend(inspector);
    }

    lines.join("\n")
}

pub fn render_status<V: ViewState + ?Sized>(view: &V) -> String {
    format!("caret {}  lane {}  mark {}  tags {}  limit {:#x}",
            view.address(),
            view.lane(),
            view.mark().map(|m| format!("{:#x}", m)).unwrap_or_else(|| "-".to_string()),
            view.selections().len(),
            view.limit())
}

fn marker<V: ViewState + ?Sized>(view: &V, live: Option<selection::Selection>, tags: &imbl::Vector<selection::Selection>, addr: u64) -> char {
    if addr == view.caret() {
        '>'
    } else if view.mark() == Some(addr) {
        '^'
    } else if live.is_some_and(|s| s.includes(addr)) {
        ':'
    } else if tags.iter().any(|s| s.includes(addr)) {
        '#'
    } else {
        ' '
    }
}

/// Column header followed by one line per row of the page. Cells show the
/// page through the current bit lane.
pub fn render_grid<V: ViewState + ?Sized>(view: &V) -> Vec<String> {
    let cols = view.cols() as usize;
    let bytes = view.lane_bytes();
    let rows = view.page_bytes().len().div_ceil(cols).clamp(1, view.rows() as usize);

    let live = view.live_selection();
    let tags = view.selections();

    let mut lines = Vec::with_capacity(rows + 1);

    let mut header = " ".repeat(ADDRESS_GUTTER);
    for col in 0..cols {
        header.push(' ');
        header.extend(util::byte_to_hex(col as u8));
    }
    lines.push(header);

    for row in 0..rows {
        let start = view.offset() + (row * cols) as u64;

        let mut line = util::fmt_address(start);
        line.push_str("  ");
        let mut text = String::with_capacity(cols);

        for col in 0..cols {
            line.push(marker(view, live, &tags, start + col as u64));

            match bytes.get(row * cols + col) {
                Some(b) => {
                    line.extend(util::byte_to_hex(*b));
                    text.push(util::display_char(*b));
                },
                None => {
                    line.push_str("  ");
                    text.push(' ');
                },
            }
        }

        line.push_str("  ");
        line.push_str(&text);
        lines.push(line.trim_end().to_string());
    }

    lines
}

/// Six labelled rows of unsigned and signed values, little-endian in the
/// first value column and big-endian in the second. The first row also
/// carries a binary dump of the working bytes. Negative values start one
/// column early so the digits stay aligned with the unsigned row above.
pub fn render_inspector(panels: &inspector::Panels) -> Vec<String> {
    if panels.is_empty() {
        return Vec::new();
    }

    let [label, le, be] = INSPECTOR_COLUMNS;
    let mut canvas = Canvas::default();

    for (row, text) in INSPECTOR_LABELS.iter().enumerate() {
        canvas.write(label, row, text);
    }

    for (i, dump) in panels.binary().iter().enumerate() {
        canvas.write(be + i * BINARY_STRIDE, 0, dump);
    }

    let values = [
        (0, le, panels.u8.map(u64::from), panels.i8.map(i64::from)),
        (2, le, panels.u16_le.map(u64::from), panels.i16_le.map(i64::from)),
        (2, be, panels.u16_be.map(u64::from), panels.i16_be.map(i64::from)),
        (4, le, panels.u32_le.map(u64::from), panels.i32_le.map(i64::from)),
        (4, be, panels.u32_be.map(u64::from), panels.i32_be.map(i64::from)),
    ];

    for (row, col, unsigned, signed) in values {
        if let Some(value) = unsigned {
            canvas.write(col, row, &value.to_string());
        }
        if let Some(value) = signed {
            canvas.write(if value < 0 { col - 1 } else { col }, row + 1, &value.to_string());
        }
    }

    canvas.into_lines()
}

#[cfg(test)]
mod tests {
    use super::*;

    use hex_literal::hex;
    use pretty_assertions::assert_eq;

    use crate::config;
    use crate::model::addr;
    use crate::model::navigation;
    use crate::model::navigation::Command;
    use crate::model::space::memory;

    fn model(bytes: Vec<u8>, cols: u32, rows: u32) -> navigation::NavigationModel {
        let mut nav = navigation::NavigationModel::new(&config::Config { cols, rows, ..config::Config::default() });
        nav.attach(memory::MemorySource::new(bytes, "text").into()).unwrap();
        nav
    }

    fn at(byte: u64) -> Command {
        Command::Goto(addr::Address::new(byte, 0))
    }

    #[test]
    fn full_view() {
        let nav = model(b"Hi!\n\x00\xff".to_vec(), 4, 2);

        assert_eq!(render(&nav), [
            "caret 0x0  lane 0  mark -  tags 0  limit 0x5",
            "           00 01 02 03",
            "00000000  >48 69 21 0A  Hi!.",
            "00000004   00 FF        .ÿ",
            "",
            "   8  72          01001000 01101001 00100001 00001010",
            "±  8  72",
            "  16  26952       18537",
            "± 16  26952       18537",
            "  32  169961800   1214849290",
            "± 32  169961800   1214849290",
        ].join("\n"));
    }

    #[test]
    fn negative_values_shift_left() {
        let lines = render_inspector(&inspector::Panels::decode(&hex!("ff fe ff ff")));

        assert_eq!(lines, vec![
            "   8  255         11111111 11111110 11111111 11111111",
            "±  8 -1",
            "  16  65279       65534",
            "± 16 -257        -2",
            "  32  4294967039  4294901759",
            "± 32 -257        -65537",
        ]);
    }

    #[test]
    fn short_working_slice() {
        let lines = render_inspector(&inspector::Panels::decode(&hex!("80")));

        assert_eq!(lines, vec![
            "   8  128         10000000",
            "±  8 -128",
            "  16",
            "± 16",
            "  32",
            "± 32",
        ]);
        assert!(render_inspector(&inspector::Panels::default()).is_empty());
    }

    #[test]
    fn selection_markers() {
        let mut nav = model((0..12).collect(), 4, 3);

        nav.apply(at(1)).unwrap();
        nav.apply(Command::BeginSelecting).unwrap();
        nav.apply(at(6)).unwrap();
        nav.apply(Command::ConfirmSelection).unwrap();
        nav.apply(at(10)).unwrap();

        assert_eq!(render_grid(&nav), vec![
            "           00 01 02 03",
            "00000000   00^01:02:03  ....",
            "00000004  :04:05:06:07  ....",
            "00000008  :08:09>0A 0B  ....",
        ]);

        nav.apply(Command::EndSelecting).unwrap();
        nav.apply(Command::MoveRight).unwrap();

        assert_eq!(render_grid(&nav), vec![
            "           00 01 02 03",
            "00000000   00#01#02#03  ....",
            "00000004  #04#05#06 07  ....",
            "00000008   08 09 0A>0B  ....",
        ]);
        assert_eq!(render_status(&nav), "caret 0xb  lane 0  mark 0xb  tags 1  limit 0xb");
    }

    #[test]
    fn lane_shifted_grid() {
        let mut nav = model(hex!("21 7b bb 73").to_vec(), 4, 1);
        for _ in 0..4 {
            nav.apply(Command::ShiftLane(1)).unwrap();
        }

        assert_eq!(render_status(&nav), "caret 0x0.4  lane 4  mark -  tags 0  limit 0x3");
        assert_eq!(render_grid(&nav)[1], "00000000  >17 BB B7     .»·");
    }

    #[test]
    fn empty_source() {
        let nav = model(Vec::new(), 4, 4);

        assert_eq!(render(&nav), [
            "caret 0x0  lane 0  mark -  tags 0  limit 0x0",
            "           00 01 02 03",
            "00000000  >",
        ].join("\n"));
    }
}
