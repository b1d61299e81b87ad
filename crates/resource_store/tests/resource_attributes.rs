use resource_store::db::open_db_in_memory;
use resource_store::{
    AttributeValue, LookupMode, ResourceId, ResourceRepository, SqliteResourceRepository,
};
use rusqlite::{params, Connection};

type StoredColumns = (Option<i64>, Option<f64>, Option<String>);

#[test]
fn set_attribute_then_get_attribute_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteResourceRepository::try_new(&conn).unwrap();

    repo.set_attribute(1, "title", Some("My title")).unwrap();
    repo.set_attribute(1, "x", Some(5.to_string().as_str())).unwrap();

    assert_eq!(
        repo.get_attribute(1, "title").unwrap(),
        Some(AttributeValue::Text("My title".into()))
    );
    let x = repo.get_attribute(1, "x").unwrap().unwrap();
    assert_eq!(x, AttributeValue::Int(5));
    assert_eq!(x, 5_i64);
    assert_eq!(x, "5");
}

#[test]
fn set_attribute_with_none_removes_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteResourceRepository::try_new(&conn).unwrap();

    repo.set_attribute(1, "title", Some("draft")).unwrap();
    repo.set_attribute(1, "title", None).unwrap();
    repo.set_attribute(1, "never-set", None).unwrap();

    assert_eq!(repo.get_attribute(1, "title").unwrap(), None);
    assert_eq!(attribute_row_count(&conn, 1), 0);
}

#[test]
fn classification_selects_exactly_one_column() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteResourceRepository::try_new(&conn).unwrap();

    repo.set_attribute(1, "n", Some("5")).unwrap();
    assert_eq!(stored_columns(&conn, 1, "n"), (Some(5), None, None));

    repo.set_attribute(1, "n", Some("5.0")).unwrap();
    assert_eq!(stored_columns(&conn, 1, "n"), (None, Some(5.0), None));

    repo.set_attribute(1, "n", Some("abc")).unwrap();
    assert_eq!(
        stored_columns(&conn, 1, "n"),
        (None, None, Some("abc".to_string()))
    );
    assert_eq!(attribute_row_count(&conn, 1), 1);
}

#[test]
fn exponent_without_decimal_point_lands_in_int_column() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteResourceRepository::try_new(&conn).unwrap();

    repo.set_attribute(1, "n", Some("1e3")).unwrap();
    assert_eq!(stored_columns(&conn, 1, "n"), (Some(1000), None, None));

    repo.set_attribute(1, "huge", Some("99999999999999999999")).unwrap();
    let (value_int, value_real, _) = stored_columns(&conn, 1, "huge");
    assert_eq!(value_int, None);
    assert!(value_real.is_some());
}

#[test]
fn real_values_read_back_as_real() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteResourceRepository::try_new(&conn).unwrap();

    repo.set_attribute(3, "ratio", Some("5.0")).unwrap();
    let ratio = repo.get_attribute(3, "ratio").unwrap().unwrap();

    assert_eq!(ratio, AttributeValue::Real(5.0));
    assert_eq!(ratio, "5.0");
    assert_eq!(ratio, 5_i64);
}

#[test]
fn set_attributes_writes_mapping_without_extra_keys() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteResourceRepository::try_new(&conn).unwrap();

    repo.set_attributes(7, Some(&[("b", Some("x")), ("a", Some("1"))][..]))
        .unwrap();

    let attributes = repo.get_attributes(7).unwrap();
    assert_eq!(attributes.len(), 2);
    assert_eq!(attributes["a"], AttributeValue::Int(1));
    assert_eq!(attributes["b"], AttributeValue::Text("x".into()));
}

#[test]
fn set_attributes_keeps_attributes_not_mentioned() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteResourceRepository::try_new(&conn).unwrap();

    repo.set_attributes(7, Some(&[("old", Some("kept")), ("a", Some("1"))][..]))
        .unwrap();
    repo.set_attributes(7, Some(&[("a", Some("2")), ("gone", None)][..]))
        .unwrap();

    let attributes = repo.get_attributes(7).unwrap();
    assert_eq!(attributes.len(), 2);
    assert_eq!(attributes["old"], AttributeValue::Text("kept".into()));
    assert_eq!(attributes["a"], AttributeValue::Int(2));
}

#[test]
fn set_attributes_none_clears_only_that_resource() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteResourceRepository::try_new(&conn).unwrap();

    repo.set_attributes(1, Some(&[("a", Some("1")), ("b", Some("2"))][..]))
        .unwrap();
    repo.set_attribute(2, "a", Some("1")).unwrap();

    repo.set_attributes::<&str, &str>(1, None).unwrap();

    assert!(repo.get_attributes(1).unwrap().is_empty());
    assert_eq!(repo.get_attributes(2).unwrap().len(), 1);
}

#[test]
fn positional_list_uses_index_as_name() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteResourceRepository::try_new(&conn).unwrap();

    repo.set_attribute_list(3, &[Some("5.0"), Some("5")]).unwrap();

    let attributes = repo.get_attributes(3).unwrap();
    assert_eq!(attributes["0"], AttributeValue::Real(5.0));
    assert_eq!(attributes["1"], AttributeValue::Int(5));
}

#[test]
fn get_attributes_for_unknown_id_is_empty_not_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteResourceRepository::try_new(&conn).unwrap();

    assert!(repo.get_attributes(12345).unwrap().is_empty());
    assert_eq!(repo.get_attribute(12345, "x").unwrap(), None);
}

#[test]
fn compat_lookup_treats_falsy_values_as_absent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteResourceRepository::try_new(&conn).unwrap();
    assert_eq!(repo.lookup_mode(), LookupMode::Compat);

    repo.set_attributes(
        4,
        Some(&[("zero", Some("0")), ("zero_real", Some("0.0")), ("empty", Some(""))][..]),
    )
    .unwrap();

    assert_eq!(repo.get_attribute(4, "zero").unwrap(), None);
    assert_eq!(repo.get_attribute(4, "zero_real").unwrap(), None);
    assert_eq!(repo.get_attribute(4, "empty").unwrap(), None);

    let attributes = repo.get_attributes(4).unwrap();
    assert_eq!(attributes.len(), 3);
    assert_eq!(attributes["zero"], AttributeValue::Int(0));
}

#[test]
fn strict_lookup_distinguishes_empty_from_absent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteResourceRepository::try_new(&conn)
        .unwrap()
        .with_lookup_mode(LookupMode::Strict);

    repo.set_attribute(4, "zero", Some("0")).unwrap();
    repo.set_attribute(4, "empty", Some("")).unwrap();

    assert_eq!(
        repo.get_attribute(4, "zero").unwrap(),
        Some(AttributeValue::Int(0))
    );
    assert_eq!(
        repo.get_attribute(4, "empty").unwrap(),
        Some(AttributeValue::Text(String::new()))
    );
    assert_eq!(repo.get_attribute(4, "missing").unwrap(), None);
}

#[test]
fn all_null_row_reads_as_absent() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO resource_attribute (id, attribute) VALUES (?1, ?2);",
        params![8, "hollow"],
    )
    .unwrap();
    let repo = SqliteResourceRepository::try_new(&conn)
        .unwrap()
        .with_lookup_mode(LookupMode::Strict);

    assert_eq!(repo.get_attribute(8, "hollow").unwrap(), None);
    assert!(repo.get_attributes(8).unwrap().is_empty());
}

#[test]
fn non_atomic_batch_leaves_partial_writes_on_failure() {
    let conn = open_db_in_memory().unwrap();
    install_reject_trigger(&conn, "boom");
    let repo = SqliteResourceRepository::try_new(&conn).unwrap();

    let result = repo.set_attributes(
        6,
        Some(&[("first", Some("1")), ("boom", Some("2")), ("third", Some("3"))][..]),
    );

    assert!(result.is_err());
    let attributes = repo.get_attributes(6).unwrap();
    assert_eq!(attributes.len(), 1);
    assert_eq!(attributes["first"], AttributeValue::Int(1));
}

fn stored_columns(conn: &Connection, id: ResourceId, name: &str) -> StoredColumns {
    conn.query_row(
        "SELECT value_int, value_real, value_text
         FROM resource_attribute
         WHERE id = ?1 AND attribute = ?2;",
        params![id, name],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )
    .unwrap()
}

fn attribute_row_count(conn: &Connection, id: ResourceId) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM resource_attribute WHERE id = ?1;",
        [id],
        |row| row.get(0),
    )
    .unwrap()
}

fn install_reject_trigger(conn: &Connection, attribute: &str) {
    conn.execute_batch(&format!(
        "CREATE TRIGGER reject_{attribute}
         BEFORE INSERT ON resource_attribute
         WHEN NEW.attribute = '{attribute}'
         BEGIN
             SELECT RAISE(ABORT, 'rejected attribute');
         END;"
    ))
    .unwrap();
}
