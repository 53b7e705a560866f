use std::collections::BTreeMap;

use rest_expander::{DbRef, Expandable, Link, Shape};
use serde::Serialize;

#[derive(Expandable)]
struct Simple {
    s: String,
    b: bool,
    i: i32,
    f: f64,
    ui: u8,
}

#[derive(Serialize, Expandable)]
struct Renamed {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "ignored")]
    #[expandable(rename = "L")]
    link: Link,
    #[serde(skip)]
    secret: String,
    #[expandable(skip)]
    cache_key: u64,
}

#[derive(Expandable)]
struct Page<T> {
    items: Vec<T>,
    total: usize,
}

#[derive(Expandable)]
struct GroupId(DbRef);

#[derive(Expandable)]
struct Point(i64, i64);

#[derive(Expandable)]
struct Marker;

#[derive(Expandable)]
struct Nested {
    inner: Option<Simple>,
    tags: BTreeMap<String, bool>,
}

fn fields(shape: Shape) -> Vec<(String, Shape)> {
    match shape {
        Shape::Object(fields) => fields,
        other => panic!("expected an object, got {:?}", other),
    }
}

fn keys(shape: Shape) -> Vec<String> {
    fields(shape).into_iter().map(|(k, _)| k).collect()
}

#[test]
fn test_field_order_and_scalars() {
    let value = Simple {
        s: "bar".into(),
        b: false,
        i: -1,
        f: 1.1,
        ui: 1,
    };

    assert_eq!(
        fields(value.describe()),
        vec![
            ("s".to_string(), Shape::Text("bar".into())),
            ("b".to_string(), Shape::Bool(false)),
            ("i".to_string(), Shape::Int(-1)),
            ("f".to_string(), Shape::Float(1.1)),
            ("ui".to_string(), Shape::UInt(1)),
        ]
    );
}

#[test]
fn test_renames_and_skips() {
    let value = Renamed {
        name: "x".into(),
        link: Link::get("http://valid", "self"),
        secret: "hidden".into(),
        cache_key: 7,
    };

    let described = fields(value.describe());
    let names: Vec<_> = described.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(names, vec!["Name", "L"]);
    assert!(matches!(described[1].1, Shape::Reference(_)));
}

#[test]
fn test_generic_record() {
    let page = Page {
        items: vec![Link::get("http://a", "item"), Link::get("http://b", "item")],
        total: 2,
    };

    let described = fields(page.describe());
    match &described[0].1 {
        Shape::Sequence(items) => {
            assert_eq!(items.len(), 2);
            assert!(items.iter().all(|i| matches!(i, Shape::Reference(_))));
        }
        other => panic!("expected a sequence, got {:?}", other),
    }
    assert_eq!(described[1].1, Shape::UInt(2));
}

#[test]
fn test_newtype_is_transparent() {
    let id = GroupId(DbRef::new("groups", 7, "test"));
    assert!(matches!(id.describe(), Shape::Reference(_)));
}

#[test]
fn test_tuple_and_unit_structs() {
    assert_eq!(
        Point(1, 2).describe(),
        Shape::Sequence(vec![Shape::Int(1), Shape::Int(2)])
    );
    assert_eq!(Marker.describe(), Shape::Null);
}

#[test]
fn test_nested_records() {
    let mut tags = BTreeMap::new();
    tags.insert("key1".to_string(), true);

    let nested = Nested { inner: None, tags };
    let described = fields(nested.describe());
    assert_eq!(described[0].1, Shape::Null);
    assert_eq!(keys(described[1].1.clone()), vec!["key1"]);
}
