//! Built-in dictionary of well-known property names.
//!
//! Ids are part of the wire format: a string's id is its index here.

pub const SYSTEM_STRINGS: [&str; 32] = [
    "$s",
    "$t",
    "$v",
    "_attachments",
    "_etag",
    "_rid",
    "_self",
    "_ts",
    "attachments/",
    "coordinates",
    "geometry",
    "GeometryCollection",
    "id",
    "inE",
    "inV",
    "label",
    "LineString",
    "link",
    "MultiLineString",
    "MultiPoint",
    "MultiPolygon",
    "name",
    "outE",
    "outV",
    "Point",
    "Polygon",
    "properties",
    "type",
    "value",
    "Feature",
    "FeatureCollection",
    "_id",
];

pub fn system_string_id(value: &[u8]) -> Option<usize> {
    if value.len() < 2 || value.len() > 18 {
        return None;
    }
    SYSTEM_STRINGS.iter().position(|s| s.as_bytes() == value)
}

pub fn system_string(id: usize) -> Option<&'static str> {
    SYSTEM_STRINGS.get(id).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_inverse() {
        for (id, s) in SYSTEM_STRINGS.iter().enumerate() {
            assert_eq!(system_string_id(s.as_bytes()), Some(id));
            assert_eq!(system_string(id), Some(*s));
        }
        assert_eq!(system_string_id(b"ID"), None);
        assert_eq!(system_string(32), None);
    }

    #[test]
    fn test_well_known_ids() {
        assert_eq!(system_string_id(b"id"), Some(12));
        assert_eq!(system_string_id(b"_ts"), Some(7));
        assert_eq!(system_string_id(b"FeatureCollection"), Some(30));
    }
}
