use sqlite_relay::prelude::*;
use tempfile::tempdir;

fn unique_db_path(prefix: &str) -> String {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join(format!("{prefix}.db"));
    // Leak the tempdir so the file persists for the duration of the test binary.
    std::mem::forget(dir);
    path.to_string_lossy().into_owned()
}

async fn open_scratch(prefix: &str) -> Result<SqliteConnection, SqliteRelayError> {
    SqliteConnection::open(unique_db_path(prefix)).await
}

#[tokio::test]
async fn bound_values_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let conn = open_scratch("roundtrip").await?;

    let cases = [
        (Value::Integer(512), ColumnType::Integer),
        (Value::Integer(68_719_476_736), ColumnType::Integer),
        (Value::Float(-140.25), ColumnType::Float),
        (Value::Text("let it be".into()), ColumnType::Text),
        (Value::Null, ColumnType::Null),
    ];

    for (value, tag) in cases {
        let mut stmt = conn.prepare("select ?").await?;
        stmt.bind(value.clone())?;
        assert_eq!(stmt.step().await?, StepOutcome::Row);
        assert_eq!(stmt.column_type(0)?, tag);
        assert_eq!(stmt.column(0)?, value);
        assert_eq!(stmt.step().await?, StepOutcome::Done);
        stmt.finalize()?;
    }

    conn.close().await?;
    Ok(())
}

#[tokio::test]
async fn typed_readers_return_native_values() -> Result<(), Box<dyn std::error::Error>> {
    let conn = open_scratch("typedread").await?;

    let mut stmt = conn
        .prepare("select 96000, 17188322307, 340.5, 'Hello, World!'")
        .await?;
    assert_eq!(stmt.step().await?, StepOutcome::Row);
    assert_eq!(stmt.column_count(), 4);
    assert_eq!(stmt.column_integer(0)?, 96_000);
    assert_eq!(stmt.column_integer(1)?, 17_188_322_307);
    assert_eq!(stmt.column_float(2)?, 340.5);
    assert_eq!(stmt.column_text(3)?, "Hello, World!");
    // Cross-typed reads follow the engine's coercions.
    assert_eq!(stmt.column_text(0)?, "96000");
    assert_eq!(stmt.column_float(0)?, 96_000.0);
    stmt.finalize()?;

    conn.close().await?;
    Ok(())
}

#[tokio::test]
async fn bind_all_matches_indexed_binds() -> Result<(), Box<dyn std::error::Error>> {
    let conn = open_scratch("bindall").await?;
    conn.execute("create table t (id integer primary key, v integer)", &[])
        .await?;

    let mut insert = conn.prepare("insert into t (id, v) values (?, ?)").await?;
    insert.bind_all(&[Value::Integer(100), Value::Integer(1414)])?;
    assert_eq!(insert.step().await?, StepOutcome::Done);
    insert.finalize()?;

    let mut select = conn.prepare("select id, v from t").await?;
    assert_eq!(select.step().await?, StepOutcome::Row);
    assert_eq!(select.column_integer(0)?, 100);
    assert_eq!(select.column_type(1)?, ColumnType::Integer);
    assert_eq!(select.column_integer(1)?, 1414);
    select.finalize()?;

    conn.close().await?;
    Ok(())
}

#[tokio::test]
async fn clear_bindings_resets_cursor_and_values() -> Result<(), Box<dyn std::error::Error>> {
    let conn = open_scratch("clearbind").await?;
    conn.execute("create table t (id integer primary key, v integer)", &[])
        .await?;

    let mut insert = conn.prepare("insert into t (id, v) values (?, ?)").await?;
    insert.bind(1)?;
    insert.bind(1200)?;
    assert_eq!(insert.step().await?, StepOutcome::Done);

    // After clear_bindings the cursor is back at 1 and no value stays bound,
    // so the single rebind lands at position 1 and position 2 inserts NULL.
    insert.reset()?;
    insert.clear_bindings()?;
    insert.bind(2)?;
    assert_eq!(insert.step().await?, StepOutcome::Done);
    insert.finalize()?;

    let mut select = conn.prepare("select id, v from t order by id").await?;
    assert_eq!(select.step().await?, StepOutcome::Row);
    assert_eq!(select.column_integer(0)?, 1);
    assert_eq!(select.column_type(1)?, ColumnType::Integer);
    assert_eq!(select.column_integer(1)?, 1200);

    assert_eq!(select.step().await?, StepOutcome::Row);
    assert_eq!(select.column_integer(0)?, 2);
    assert_eq!(select.column_type(1)?, ColumnType::Null);

    assert_eq!(select.step().await?, StepOutcome::Done);
    select.finalize()?;

    conn.close().await?;
    Ok(())
}

#[tokio::test]
async fn reset_retains_bound_values() -> Result<(), Box<dyn std::error::Error>> {
    let conn = open_scratch("reset").await?;
    conn.execute("create table t (id integer primary key)", &[])
        .await?;
    conn.execute("insert into t (id) values (1)", &[]).await?;
    conn.execute("insert into t (id) values (2)", &[]).await?;

    let mut select = conn
        .prepare("select id from t where id >= ? order by id")
        .await?;
    select.bind(1)?;

    for _ in 0..2 {
        assert_eq!(select.step().await?, StepOutcome::Row);
        assert_eq!(select.column_integer(0)?, 1);
        assert_eq!(select.step().await?, StepOutcome::Row);
        assert_eq!(select.column_integer(0)?, 2);
        assert_eq!(select.step().await?, StepOutcome::Done);
        // Rewind and step again without rebinding; the same rows come back.
        select.reset()?;
    }

    select.finalize()?;
    conn.close().await?;
    Ok(())
}

#[tokio::test]
async fn column_dispatches_on_type_tag() -> Result<(), Box<dyn std::error::Error>> {
    let conn = open_scratch("dispatch").await?;

    let mut stmt = conn
        .prepare("select 96000, 340.5, 'Hello, World!', null, x'1011'")
        .await?;
    assert_eq!(stmt.step().await?, StepOutcome::Row);

    assert_eq!(stmt.column(0)?, Value::Integer(96_000));
    assert_eq!(stmt.column(1)?, Value::Float(340.5));
    assert_eq!(stmt.column(2)?, Value::Text("Hello, World!".into()));
    assert_eq!(stmt.column(3)?, Value::Null);

    assert_eq!(stmt.column_type(4)?, ColumnType::Blob);
    let err = stmt.column(4).unwrap_err();
    assert!(matches!(err, SqliteRelayError::Usage(_)));

    stmt.finalize()?;
    conn.close().await?;
    Ok(())
}

#[tokio::test]
async fn bind_index_validation() -> Result<(), Box<dyn std::error::Error>> {
    let conn = open_scratch("bindindex").await?;
    let mut stmt = conn.prepare("select ?").await?;

    let err = stmt.bind_at(1, 0).unwrap_err();
    assert!(matches!(err, SqliteRelayError::Usage(_)));

    let err = stmt.bind_at(1, 2).unwrap_err();
    assert_eq!(err.engine_code(), Some(sqlite_relay::codes::SQLITE_RANGE));

    // The cursor advances past the only parameter, so a second unindexed bind
    // runs out of range exactly like the engine would report it.
    stmt.bind(5)?;
    let err = stmt.bind(6).unwrap_err();
    assert_eq!(err.engine_code(), Some(sqlite_relay::codes::SQLITE_RANGE));

    stmt.finalize()?;
    conn.close().await?;
    Ok(())
}

#[tokio::test]
async fn lifecycle_violations_are_usage_errors() -> Result<(), Box<dyn std::error::Error>> {
    let conn = open_scratch("lifecycle").await?;

    let mut stmt = conn.prepare("select 1").await?;

    // Column reads need a stepped row.
    assert!(matches!(
        stmt.column(0).unwrap_err(),
        SqliteRelayError::Usage(_)
    ));

    assert_eq!(stmt.step().await?, StepOutcome::Row);

    // Rebinding mid-execution is rejected before the engine is involved.
    assert!(matches!(
        stmt.bind(1).unwrap_err(),
        SqliteRelayError::Usage(_)
    ));

    assert_eq!(stmt.step().await?, StepOutcome::Done);
    assert!(matches!(
        stmt.step().await.unwrap_err(),
        SqliteRelayError::Usage(_)
    ));

    stmt.finalize()?;
    assert!(matches!(
        stmt.finalize().unwrap_err(),
        SqliteRelayError::Usage(_)
    ));
    assert!(matches!(
        stmt.reset().unwrap_err(),
        SqliteRelayError::Usage(_)
    ));
    assert!(matches!(
        stmt.step().await.unwrap_err(),
        SqliteRelayError::Usage(_)
    ));

    conn.close().await?;
    Ok(())
}

#[tokio::test]
async fn statements_interleave_on_one_connection() -> Result<(), Box<dyn std::error::Error>> {
    let conn = open_scratch("interleave").await?;
    conn.execute("create table t (id integer primary key)", &[])
        .await?;

    let mut insert = conn.prepare("insert into t (id) values (?)").await?;
    let mut count = conn.prepare("select count(*) from t").await?;

    for id in 1..=3i64 {
        insert.bind_at(id, 1)?;
        assert_eq!(insert.step().await?, StepOutcome::Done);
        insert.reset()?;

        assert_eq!(count.step().await?, StepOutcome::Row);
        assert_eq!(count.column_integer(0)?, id);
        assert_eq!(count.step().await?, StepOutcome::Done);
        count.reset()?;
    }

    insert.finalize()?;
    count.finalize()?;
    conn.close().await?;
    Ok(())
}

#[tokio::test]
async fn sql_returns_source_text() -> Result<(), Box<dyn std::error::Error>> {
    let conn = open_scratch("sqltext").await?;
    let source = "select 1 as one";
    let mut stmt = conn.prepare(source).await?;
    assert_eq!(stmt.sql(), source);
    stmt.finalize()?;
    conn.close().await?;
    Ok(())
}
