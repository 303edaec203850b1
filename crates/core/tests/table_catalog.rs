mod common;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use common::{u32le, ScrBuilder};
use lifepack_core::scr::ScrFile;
use lifepack_core::table::{
    BitField, CellValue, ColumnDef, ColumnType, FormatSpec, TableCatalog, TableDef, TablePaths,
};
use lifepack_core::Error;
use tempfile::tempdir;

fn column(name: &str, kind: ColumnType, offset: u32) -> ColumnDef {
    ColumnDef {
        name: name.to_string(),
        kind,
        offset,
        format: String::new(),
        columns: Vec::new(),
        labels: BTreeMap::new(),
    }
}

fn bit(name: &str, offset: u32, length: u32) -> BitField {
    BitField { name: name.to_string(), offset, length, format: String::new() }
}

/// 12-byte weapon rows: name pointer, u16 attack, u8 kind, u8 flags, 4 unknown bytes.
fn weapons_scr() -> Vec<u8> {
    let mut scr = ScrBuilder::new(12, 2);
    let rows = [("Iron Axe", 300u16, 1u8, 0b0000_0101u8), ("Oak Sword", 12, 0, 0)];
    let pointers: Vec<u32> = rows.iter().map(|(name, ..)| scr.text(name)).collect();
    for ((_, attack, kind, flags), pointer) in rows.iter().zip(pointers) {
        let mut row = u32le(pointer);
        row.extend_from_slice(&attack.to_le_bytes());
        row.push(*kind);
        row.push(*flags);
        row.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
        scr.row(&row);
    }
    scr.build()
}

fn weapons_def(path: &str) -> TableDef {
    let mut attack = column("attack", ColumnType::U16, 4);
    attack.format = "04X".to_string();

    let mut kind = column("kind", ColumnType::Enum8, 6);
    kind.labels.insert("0".to_string(), "Sword".to_string());
    kind.labels.insert("1".to_string(), "Axe".to_string());

    let mut flags = column("flags", ColumnType::Bit8, 7);
    flags.columns = vec![bit("rare", 0, 1), bit("tier", 1, 3)];

    TableDef {
        paths: TablePaths::Single(path.to_string()),
        row_length: 12,
        endianness: None,
        columns: vec![column("name", ColumnType::Str, 0), attack, kind, flags],
    }
}

#[test]
fn decodes_typed_columns() {
    let scr = ScrFile::from_bytes(weapons_scr()).expect("parse scr");
    let schema = weapons_def("weapons.scr").compile().expect("compile");

    assert_eq!(schema.row_length(), 12);
    assert_eq!(schema.headers(), vec!["name", "attack", "kind", "rare", "tier", "c8"]);

    let rows = schema.decode_all(&scr).expect("decode");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].to_text(), "Iron Axe\t012C\tAxe\t1\t2\tdeadbeef");
    assert_eq!(rows[1].to_text(), "Oak Sword\t000C\tSword\t0\t0\tdeadbeef");

    assert_eq!(rows[0].get("attack"), Some(&CellValue::UInt(300)));
    assert_eq!(rows[0].get("flags"), Some(&CellValue::UInt(5)));
    assert_eq!(rows[0].get("name"), Some(&CellValue::Text("Iron Axe".to_string())));
}

/// Bytes before, between, and after columns become hex gap columns.
#[test]
fn uncovered_bytes_become_gap_columns() {
    let def = TableDef {
        paths: TablePaths::Single("x.scr".to_string()),
        row_length: 12,
        endianness: None,
        columns: vec![column("attack", ColumnType::U16, 4)],
    };
    let schema = def.compile().expect("compile");
    assert_eq!(schema.headers(), vec!["c0", "attack", "c6"]);
}

#[test]
fn big_endian_tables_decode_accordingly() {
    let mut scr = ScrBuilder::new(4, 1);
    scr.row(&[0x00, 0x00, 0x01, 0x2C]);
    let scr = ScrFile::from_bytes(scr.build()).expect("parse");

    let def = TableDef {
        paths: TablePaths::Single("x.scr".to_string()),
        row_length: 4,
        endianness: Some(">".to_string()),
        columns: vec![column("value", ColumnType::U32, 0)],
    };
    let rows = def.compile().expect("compile").decode_all(&scr).expect("decode");
    assert_eq!(rows[0].get("value"), Some(&CellValue::UInt(300)));
}

#[test]
fn invalid_definitions_are_rejected() {
    let mut overlapping = weapons_def("x.scr");
    overlapping.columns.push(column("late", ColumnType::U8, 5));
    assert!(matches!(overlapping.compile(), Err(Error::Layout(_))));

    let mut past_end = weapons_def("x.scr");
    past_end.columns.push(column("tail", ColumnType::U64, 8));
    assert!(matches!(past_end.compile(), Err(Error::Layout(_))));

    let mut wide_bits = weapons_def("x.scr");
    wide_bits.columns[3].columns.push(bit("overflow", 6, 4));
    assert!(matches!(wide_bits.compile(), Err(Error::Layout(_))));

    let mut wrapping_bits = weapons_def("x.scr");
    wrapping_bits.columns[3].columns.push(bit("wrap", u32::MAX, 2));
    assert!(matches!(wrapping_bits.compile(), Err(Error::Layout(_))));

    let mut no_labels = weapons_def("x.scr");
    no_labels.columns[2].labels.clear();
    assert!(matches!(no_labels.compile(), Err(Error::Layout(_))));
}

#[test]
fn unlabeled_enum_value_fails_decoding() {
    let scr = ScrFile::from_bytes(weapons_scr()).expect("parse");
    let mut def = weapons_def("x.scr");
    def.columns[2].labels.remove("1");

    let err = def.compile().expect("compile").decode_all(&scr).expect_err("missing label");
    assert!(matches!(err, Error::Layout(_)), "got {err:?}");
}

#[test]
fn row_length_must_match_the_file() {
    let scr = ScrFile::from_bytes(weapons_scr()).expect("parse");
    let mut def = weapons_def("x.scr");
    def.row_length = 16;

    let err = def.compile().expect("compile").decode_all(&scr).expect_err("length mismatch");
    assert!(matches!(err, Error::Layout(_)), "got {err:?}");
}

#[test]
fn format_specs_render_numbers() {
    let render = |spec: &str, value: CellValue| FormatSpec::parse(spec).expect(spec).render(&value);

    assert_eq!(render("", CellValue::UInt(42)), "42");
    assert_eq!(render("08X", CellValue::UInt(255)), "000000FF");
    assert_eq!(render("x", CellValue::UInt(255)), "ff");
    assert_eq!(render("b", CellValue::UInt(5)), "101");
    assert_eq!(render("5d", CellValue::Int(-3)), "   -3");
    assert_eq!(render("05d", CellValue::Int(-3)), "-0003");
    assert_eq!(render(".2f", CellValue::Float(1.5)), "1.50");
    assert_eq!(render("6s", CellValue::Text("ab".to_string())), "ab    ");

    assert!(FormatSpec::parse("zz").is_err());
    assert!(FormatSpec::parse(".x").is_err());
}

/// Catalog files may spell the byte-order key `endianess`; YAML works too.
#[test]
fn loads_json_and_yaml_catalogs() {
    let tmp = tempdir().expect("tempdir");

    let json_path = tmp.path().join("tables.json");
    fs::write(
        &json_path,
        r#"{
            "items": {
                "paths": {"en": "data/00000124.scr", "jp": "data/00000120.scr"},
                "row_length": 8,
                "endianess": ">",
                "columns": [{"name": "id", "type": "u16", "offset": 0, "format": "04x"}]
            }
        }"#,
    )
    .expect("write json");
    let catalog = TableCatalog::load(&json_path).expect("load json");
    let items = catalog.get("items").expect("items table");
    assert_eq!(items.endianness.as_deref(), Some(">"));
    assert_eq!(items.languages(), vec!["en", "jp"]);
    assert_eq!(items.path_for(Some("jp")).expect("jp path"), "data/00000120.scr");
    assert!(items.path_for(None).is_err());
    assert!(items.path_for(Some("fr")).is_err());

    let yaml_path = tmp.path().join("tables.yaml");
    fs::write(
        &yaml_path,
        concat!(
            "weapons:\n",
            "  paths: weapons.scr\n",
            "  row_length: 4\n",
            "  columns:\n",
            "    - {name: atk, type: s32, offset: 0}\n",
        ),
    )
    .expect("write yaml");
    let catalog = TableCatalog::load(&yaml_path).expect("load yaml");
    let weapons = catalog.get("weapons").expect("weapons table");
    assert_eq!(weapons.paths, TablePaths::Single("weapons.scr".to_string()));
    assert_eq!(weapons.columns[0].kind, ColumnType::S32);
}

#[test]
fn load_table_resolves_relative_paths() {
    let tmp = tempdir().expect("tempdir");
    fs::create_dir_all(tmp.path().join("data")).expect("mkdir");
    fs::write(tmp.path().join("data").join("weapons.scr"), weapons_scr()).expect("write scr");

    let mut catalog = TableCatalog::new();
    catalog.insert("weapons", weapons_def("data/weapons.scr")).expect("insert");
    assert!(catalog.insert("weapons", weapons_def("other.scr")).is_err());

    let rows = catalog.load_table("weapons", None, tmp.path()).expect("load table");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].get("kind"), Some(&CellValue::Text("Sword".to_string())));

    assert!(catalog.load_table("missing", None, tmp.path()).is_err());
}

#[test]
fn save_and_reload_preserves_definitions() {
    let tmp = tempdir().expect("tempdir");
    let mut catalog = TableCatalog::new();
    catalog.insert("weapons", weapons_def("weapons.scr")).expect("insert");

    for name in ["tables.json", "tables.yml"] {
        let path = tmp.path().join(name);
        catalog.save(&path).expect("save");
        assert_eq!(TableCatalog::load(&path).expect("reload"), catalog);
    }
}

fn write_numbered(dir: &Path, first: u32, count: u32) {
    for n in first..first + count {
        fs::write(dir.join(format!("{n:08}.scr")), weapons_scr()).expect("write scr");
    }
}

#[test]
fn append_language_series_numbers_files_by_language() {
    let tmp = tempdir().expect("tempdir");
    write_numbered(tmp.path(), 120, 5);
    let first = tmp.path().join("00000120.scr");

    let mut catalog = TableCatalog::new();
    catalog.append_language_series("weapons", &first, "en").expect("append");

    let def = catalog.get("weapons").expect("weapons");
    assert_eq!(def.row_length, 12);
    assert!(def.columns.is_empty());
    assert_eq!(def.languages(), vec!["en", "es", "fr", "it", "uk"]);

    let expected = tmp.path().join("00000123.scr").to_string_lossy().replace('\\', "/");
    assert_eq!(def.path_for(Some("it")).expect("it path"), expected);

    let all = catalog.load_all_languages("weapons", tmp.path()).expect("load all");
    assert_eq!(all.len(), 5);
    assert!(all.values().all(|rows| rows.len() == 2));
}

#[test]
fn append_language_series_rejects_bad_input() {
    let tmp = tempdir().expect("tempdir");
    write_numbered(tmp.path(), 7, 1);
    let first = tmp.path().join("00000007.scr");
    let named = tmp.path().join("weapons.scr");
    fs::write(&named, weapons_scr()).expect("write named");

    let mut catalog = TableCatalog::new();
    assert!(catalog.append_language_series("t", &first, "xx").is_err());
    assert!(catalog.append_language_series("t", &named, "en").is_err());

    catalog.append_language_series("t", &first, "uk").expect("append last language");
    assert!(catalog.append_language_series("t", &first, "uk").is_err());
    assert_eq!(catalog.len(), 1);
}
