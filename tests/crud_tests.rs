//! CRUD Operations Tests
//!
//! Create, read, update and delete through the public `Database` API,
//! including the constraint scenarios callers rely on.

use tabledb::*;

const ALL: &[&str] = &[];

fn users_schema() -> Schema {
    Schema::default()
        .with_column(Column::new("id", ColumnType::Int).primary_key())
        .with_column(Column::new("name", ColumnType::String).not_null())
        .with_column(Column::new("email", ColumnType::String).unique())
}

fn setup_users() -> Database {
    let db = Database::new();
    db.create_table("users", users_schema()).unwrap();
    db
}

fn user(id: i64, name: &str, email: &str) -> Row {
    Row::new().with("id", id).with("name", name).with("email", email)
}

#[test]
fn test_duplicate_primary_key_leaves_one_row() {
    let db = setup_users();

    db.insert("users", user(1, "a", "a@x")).unwrap();
    let err = db.insert("users", user(1, "b", "b@x")).unwrap_err();

    assert_eq!(
        err,
        DbError::PrimaryKeyViolation {
            table: "users".into(),
            column: "id".into(),
            value: Value::Int(1),
        }
    );
    assert_eq!(db.select("users", ALL, None).unwrap().len(), 1);
}

#[test]
fn test_unique_violation_and_null_exemption() {
    let db = setup_users();

    db.insert("users", user(1, "a", "a@x")).unwrap();
    let err = db.insert("users", user(2, "b", "a@x")).unwrap_err();
    assert!(matches!(err, DbError::UniqueViolation { ref column, .. } if column == "email"));

    // Omitted and explicit-null unique values never collide
    db.insert("users", Row::new().with("id", 3).with("name", "c")).unwrap();
    db.insert("users", Row::new().with("id", 4).with("name", "d")).unwrap();
    db.insert(
        "users",
        Row::new().with("id", 5).with("name", "e").with("email", Value::Null),
    )
    .unwrap();

    assert_eq!(db.select("users", ALL, None).unwrap().len(), 4);
}

#[test]
fn test_missing_required_columns() {
    let db = setup_users();

    let err = db.insert("users", Row::new().with("name", "a")).unwrap_err();
    assert_eq!(
        err,
        DbError::MissingRequiredColumn {
            table: "users".into(),
            column: "id".into(),
        }
    );

    let err = db.insert("users", Row::new().with("id", 1)).unwrap_err();
    assert_eq!(
        err,
        DbError::MissingRequiredColumn {
            table: "users".into(),
            column: "name".into(),
        }
    );

    assert!(db.select("users", ALL, None).unwrap().is_empty());
}

#[test]
fn test_insert_into_missing_table() {
    let db = Database::new();
    assert_eq!(
        db.insert("ghosts", Row::new().with("id", 1)),
        Err(DbError::TableNotFound("ghosts".into()))
    );
}

#[test]
fn test_insert_then_select_by_primary_key() {
    let db = setup_users();
    let row = user(42, "zoe", "zoe@x");
    db.insert("users", row.clone()).unwrap();
    db.insert("users", user(43, "other", "o@x")).unwrap();

    let rows = db
        .select("users", ALL, Some(&Condition::equals("id", 42)))
        .unwrap();
    assert_eq!(rows, vec![row]);
}

#[test]
fn test_select_returns_copies() {
    let db = setup_users();
    db.insert("users", user(1, "a", "a@x")).unwrap();

    let mut rows = db.select("users", ALL, None).unwrap();
    rows[0].set("name", "mutated");

    let again = db.select("users", ALL, None).unwrap();
    assert_eq!(again[0].get("name"), Some(&Value::from("a")));
}

#[test]
fn test_select_specific_columns() {
    let db = setup_users();
    db.insert("users", user(1, "a", "a@x")).unwrap();

    let rows = db.select("users", &["email", "nonexistent", "id"], None).unwrap();
    let columns: Vec<&str> = rows[0].columns().collect();
    assert_eq!(columns, vec!["email", "id"]);
}

#[test]
fn test_select_ordering_conditions() {
    let db = setup_users();
    for (id, name) in [(1, "ann"), (2, "bob"), (3, "cat"), (4, "dan")] {
        db.insert("users", user(id, name, &format!("{}@x", name))).unwrap();
    }

    let ge = db
        .select("users", &["id"], Some(&Condition::new("id", Operator::GtEq, 3)))
        .unwrap();
    assert_eq!(ge.len(), 2);

    let ne = db
        .select("users", &["id"], Some(&Condition::new("name", Operator::NotEq, "bob")))
        .unwrap();
    assert_eq!(ne.len(), 3);

    let lt = db
        .select("users", &["id"], Some(&Condition::new("name", Operator::Lt, "c")))
        .unwrap();
    assert_eq!(lt.len(), 2);
}

/// Unorderable comparisons are "not satisfied", never "equal": a `>` and a
/// `<=` against a mismatched type must both match nothing.
#[test]
fn test_unorderable_comparison_matches_nothing() {
    let db = setup_users();
    db.insert("users", user(1, "a", "a@x")).unwrap();
    db.insert("users", user(2, "b", "b@x")).unwrap();

    for op in [Operator::Gt, Operator::Lt, Operator::GtEq, Operator::LtEq] {
        let rows = db
            .select("users", ALL, Some(&Condition::new("id", op, "1")))
            .unwrap();
        assert!(rows.is_empty(), "{} against a string matched", op);
    }
}

#[test]
fn test_update_rows() {
    let db = setup_users();
    db.insert("users", user(1, "a", "a@x")).unwrap();
    db.insert("users", user(2, "b", "b@x")).unwrap();

    let n = db
        .update(
            "users",
            &Row::new().with("name", "renamed"),
            Some(&Condition::equals("id", 2)),
        )
        .unwrap();
    assert_eq!(n, 1);

    let rows = db
        .select("users", &["name"], Some(&Condition::equals("id", 2)))
        .unwrap();
    assert_eq!(rows[0].get("name"), Some(&Value::from("renamed")));
}

#[test]
fn test_update_primary_key_to_taken_value() {
    let db = setup_users();
    db.insert("users", user(1, "a", "a@x")).unwrap();
    db.insert("users", user(2, "b", "b@x")).unwrap();

    let err = db
        .update(
            "users",
            &Row::new().with("id", 1),
            Some(&Condition::equals("id", 2)),
        )
        .unwrap_err();
    assert_eq!(err.rows_affected, 0);
    assert!(matches!(err.source, DbError::PrimaryKeyViolation { .. }));

    // Keeping the same key is fine
    let n = db
        .update(
            "users",
            &Row::new().with("id", 2).with("email", "b@x"),
            Some(&Condition::equals("id", 2)),
        )
        .unwrap();
    assert_eq!(n, 1);
}

#[test]
fn test_update_to_null_required_column() {
    let db = setup_users();
    db.insert("users", user(1, "a", "a@x")).unwrap();

    let err = db
        .update("users", &Row::new().with("name", Value::Null), None)
        .unwrap_err();
    assert!(matches!(
        err.source,
        DbError::MissingRequiredColumn { ref column, .. } if column == "name"
    ));

    let rows = db.select("users", ALL, None).unwrap();
    assert_eq!(rows[0].get("name"), Some(&Value::from("a")));
}

#[test]
fn test_update_clearing_primary_key_reports_missing_key_first() {
    let db = setup_users();
    db.insert("users", user(1, "a", "a@x")).unwrap();
    db.insert("users", user(2, "b", "b@x")).unwrap();

    let err = db
        .update(
            "users",
            &Row::new().with("id", Value::Null).with("email", "a@x"),
            Some(&Condition::equals("id", 2)),
        )
        .unwrap_err();
    assert_eq!(err.rows_affected, 0);
    assert_eq!(
        err.source,
        DbError::MissingRequiredColumn {
            table: "users".into(),
            column: "id".into(),
        }
    );

    let rows = db
        .select("users", ALL, Some(&Condition::equals("id", 2)))
        .unwrap();
    assert_eq!(rows, vec![user(2, "b", "b@x")]);
}

#[test]
fn test_not_null_violations_name_first_declared_column() {
    let db = Database::new();
    let schema = Schema::default()
        .with_column(Column::new("id", ColumnType::Int).primary_key())
        .with_column(Column::new("first", ColumnType::String).not_null())
        .with_column(Column::new("last", ColumnType::String).not_null());
    db.create_table("people", schema).unwrap();

    let err = db.insert("people", Row::new().with("id", 1)).unwrap_err();
    assert_eq!(
        err,
        DbError::MissingRequiredColumn {
            table: "people".into(),
            column: "first".into(),
        }
    );
}

#[test]
fn test_update_no_match() {
    let db = setup_users();
    db.insert("users", user(1, "a", "a@x")).unwrap();

    let n = db
        .update(
            "users",
            &Row::new().with("name", "x"),
            Some(&Condition::equals("id", 99)),
        )
        .unwrap();
    assert_eq!(n, 0);
}

#[test]
fn test_delete_then_select() {
    let db = setup_users();
    for i in 1..=10 {
        db.insert("users", user(i, &format!("u{}", i), &format!("u{}@x", i)))
            .unwrap();
    }

    let condition = Condition::new("id", Operator::Gt, 6);
    let deleted = db.delete("users", Some(&condition)).unwrap();
    assert_eq!(deleted, 4);

    let remaining = db.select("users", ALL, None).unwrap();
    assert_eq!(remaining.len(), 10 - deleted);
    assert!(remaining.iter().all(|row| !condition.matches(row)));
}

#[test]
fn test_delete_from_missing_table() {
    let db = Database::new();
    assert_eq!(
        db.delete("ghosts", None),
        Err(DbError::TableNotFound("ghosts".into()))
    );
}

#[test]
fn test_type_enforcement_can_be_disabled() {
    let db = setup_users();
    let err = db
        .insert("users", Row::new().with("id", "one").with("name", "a"))
        .unwrap_err();
    assert!(matches!(err, DbError::InvalidValueType { ref column, .. } if column == "id"));

    let relaxed = Database::with_config(DatabaseConfig {
        enforce_column_types: false,
        ..DatabaseConfig::default()
    });
    relaxed.create_table("users", users_schema()).unwrap();
    relaxed
        .insert("users", Row::new().with("id", "one").with("name", "a"))
        .unwrap();
}

#[test]
fn test_multiple_primary_keys_rejected() {
    let db = Database::new();
    let schema = Schema::default()
        .with_column(Column::new("a", ColumnType::Int).primary_key())
        .with_column(Column::new("b", ColumnType::Int).primary_key());

    assert_eq!(
        db.create_table("t", schema),
        Err(DbError::MultiplePrimaryKeys { table: "t".into() })
    );
    assert!(!db.table_exists("t"));
}

#[test]
fn test_rows_from_json() {
    let db = setup_users();
    let row: Row = serde_json::from_str(r#"{"id": 9, "name": "json", "email": null}"#).unwrap();
    db.insert("users", row).unwrap();

    let rows = db
        .select("users", ALL, Some(&Condition::equals("id", 9)))
        .unwrap();
    assert_eq!(
        serde_json::to_string(&rows).unwrap(),
        r#"[{"id":9,"name":"json","email":null}]"#
    );
}
