//! Listing shape over a multi-level tree.

use diskette::{list, list_json, Image, ImageBuilder};

/// root -> [A (A1 -> [deep], a.txt), b.txt]
fn fixture() -> Image {
    let mut builder = ImageBuilder::new("SHELF");
    let root = builder.root();
    let a = builder.add_dir(root, "A~Subject~");
    let a1 = builder.add_dir(a, "A1~Subject~");
    builder.add_file(a1, "Deep~Text~", b"d".to_vec());
    builder.add_file(a, "Shallow~Text~", b"s".to_vec());
    builder.add_file(root, "Top~Text~", b"t".to_vec());
    Image::from_vec(builder.finish()).unwrap()
}

fn indent_of(row: &str) -> usize {
    row.len() - row.trim_start_matches(' ').len()
}

#[test]
fn one_row_per_entry_in_traversal_order() {
    let image = fixture();
    let mut out = Vec::new();
    list(&image, "shelf.img", &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    // Rows follow the 128-dash frame under the column header.
    let rows: Vec<&str> = text
        .lines()
        .skip_while(|l| !(l.starts_with('-') && l.len() == 128))
        .skip(1)
        .collect();
    assert_eq!(rows.len(), 5);

    let names: Vec<&str> = rows.iter().map(|r| r.split_whitespace().next().unwrap()).collect();
    assert_eq!(names, vec!["A", "A1", "Deep", "Shallow", "Top"]);
}

#[test]
fn indent_grows_by_two_per_level() {
    let image = fixture();
    let mut out = Vec::new();
    list(&image, "shelf.img", &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    let row_for = |name: &str| {
        text.lines()
            .find(|l| l.trim_start().starts_with(name))
            .unwrap()
            .to_string()
    };

    assert_eq!(indent_of(&row_for("A ")), 0);
    assert_eq!(indent_of(&row_for("A1")), 2);
    assert_eq!(indent_of(&row_for("Deep")), 4);
    assert_eq!(indent_of(&row_for("Shallow")), 2);
    assert_eq!(indent_of(&row_for("Top")), 0);
}

#[test]
fn json_mode_reports_kind_and_depth() {
    let image = fixture();
    let mut out = Vec::new();
    list_json(&image, &mut out).unwrap();

    let rows: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 5);

    let depths: Vec<u64> = rows.iter().map(|r| r["depth"].as_u64().unwrap()).collect();
    assert_eq!(depths, vec![0, 1, 2, 1, 0]);

    let kinds: Vec<&str> = rows.iter().map(|r| r["kind"].as_str().unwrap()).collect();
    assert_eq!(kinds, vec!["directory", "directory", "file", "file", "file"]);
}
