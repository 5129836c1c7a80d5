use tabledb::*;
use tracing_subscriber::EnvFilter;

const ALL: &[&str] = &[];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("📦 Tabledb: users and posts\n");

    let db = Database::new();

    db.create_table(
        "users",
        Schema::default()
            .with_column(Column::new("id", ColumnType::Int).primary_key())
            .with_column(Column::new("name", ColumnType::String).not_null())
            .with_column(Column::new("email", ColumnType::String).unique()),
    )?;
    db.create_table(
        "posts",
        Schema::default()
            .with_column(Column::new("id", ColumnType::Int).primary_key())
            .with_column(Column::new("user_id", ColumnType::Int))
            .with_column(Column::new("title", ColumnType::String)),
    )?;
    println!("   ✓ Tables: {:?}", db.list_tables());

    db.insert("users", Row::new().with("id", 1).with("name", "Alice").with("email", "alice@example.com"))?;
    db.insert("users", Row::new().with("id", 2).with("name", "Bob").with("email", "bob@example.com"))?;
    for (id, user_id, title) in [(1, 1, "Hello"), (2, 1, "Indexes"), (3, 2, "Joins")] {
        db.insert("posts", Row::new().with("id", id).with("user_id", user_id).with("title", title))?;
    }

    // Constraint violations come back as values
    match db.insert("users", Row::new().with("id", 1).with("name", "Mallory")) {
        Ok(()) => println!("   ✗ duplicate key accepted"),
        Err(e) => println!("   ✓ Rejected: {}", e),
    }

    let alice = db.select("users", &["name", "email"], Some(&Condition::equals("id", 1)))?;
    println!("   ✓ User 1: {}", serde_json::to_string(&alice)?);

    db.create_index("posts", "user_id")?;
    let joined = db.inner_join(
        "posts",
        "users",
        &JoinCondition::new("user_id", "id"),
        &["posts.title", "users.name"],
    )?;
    println!("\n🔗 Posts with authors:");
    for row in &joined {
        println!("   {}", serde_json::to_string(row)?);
    }

    let renamed = db.update("users", &Row::new().with("name", "Robert"), Some(&Condition::equals("id", 2)))?;
    let removed = db.delete("posts", Some(&Condition::new("id", Operator::GtEq, 3)))?;
    println!("\n   ✓ Updated {} user(s), deleted {} post(s)", renamed, removed);

    let info = db.describe_table("posts")?;
    println!("   ✓ posts: {} rows, indexes {:?}", info.row_count, info.indexed_columns);
    println!("   ✓ Remaining posts: {}", db.select("posts", ALL, None)?.len());

    Ok(())
}
