//! ### CBM Display Module
//!
//! Renders a `Catalog` the way `LOAD"$",8` followed by `LIST` shows it,
//! or as JSON for scripts.

use super::{Catalog,CatalogEntry};
use super::types::{self,NAME_LEN};

/// `0 "DISK NAME       " ID 2A`
pub fn header_line(catalog: &Catalog) -> String {
    format!("0 \"{}",catalog.header)
}

/// Blocks, quoted name padded to 16 columns, splat if not closed, type, `<` if locked.
pub fn entry_line(entry: &CatalogEntry,catalog: &Catalog) -> String {
    let pad = NAME_LEN.saturating_sub(entry.name.chars().count());
    format!("{:<5}\"{}\"{}{}{}{}",
        entry.blocks,
        entry.name,
        " ".repeat(pad),
        match entry.is_closed() { true => ' ', false => '*' },
        catalog.charset.apply_case(&types::type_name(entry.type_code())),
        match entry.is_locked() { true => '<', false => ' ' }
    )
}

pub fn trailer_line(catalog: &Catalog) -> String {
    format!("{} {}",catalog.blocks_free,catalog.charset.apply_case("BLOCKS FREE."))
}

/// Complete listing, including the leading and trailing blank lines.
pub fn listing(catalog: &Catalog) -> String {
    let mut ans = String::from("\n");
    ans += &header_line(catalog);
    ans += "\n";
    for entry in &catalog.entries {
        ans += &entry_line(entry,catalog);
        ans += "\n";
    }
    ans += &trailer_line(catalog);
    ans += "\n\n";
    ans
}

/// Catalog as a JSON string, pretty printed if `indent` is given.
pub fn to_json(catalog: &Catalog,indent: Option<u16>) -> String {
    let mut root = json::JsonValue::new_object();
    root["label"] = json::JsonValue::String(catalog.label.clone());
    root["id"] = json::JsonValue::String(catalog.disk_id.clone());
    root["dos_type"] = json::JsonValue::String(catalog.dos_type.clone());
    root["blocks_free"] = catalog.blocks_free.into();
    let files: Vec<json::JsonValue> = catalog.entries.iter().map(|entry| {
        let mut obj = json::JsonValue::new_object();
        obj["name"] = json::JsonValue::String(entry.name.clone());
        obj["raw_name"] = json::JsonValue::String(hex::encode(&entry.raw_name));
        obj["type"] = json::JsonValue::String(types::type_name(entry.type_code()));
        obj["blocks"] = entry.blocks.into();
        obj["closed"] = entry.is_closed().into();
        obj["locked"] = entry.is_locked().into();
        obj["track"] = entry.start[0].into();
        obj["sector"] = entry.start[1].into();
        if entry.type_code()==types::FileType::Relative as u8 {
            obj["record_length"] = entry.record_len.into();
            obj["side_track"] = entry.side[0].into();
            obj["side_sector"] = entry.side[1].into();
        }
        obj
    }).collect();
    root["files"] = json::JsonValue::Array(files);
    match indent {
        Some(spaces) => json::stringify_pretty(root,spaces),
        None => json::stringify(root)
    }
}
