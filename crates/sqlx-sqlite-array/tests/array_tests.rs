use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx_sqlite_array::{Error, Int64Array, StringArray};
use tempfile::TempDir;

async fn create_test_pool() -> (SqlitePool, TempDir) {
   let _ = tracing_subscriber::fmt().with_test_writer().try_init();

   let temp_dir = TempDir::new().expect("Failed to create temp directory");
   let options = SqliteConnectOptions::new()
      .filename(temp_dir.path().join("test.db"))
      .create_if_missing(true);
   let pool = SqlitePoolOptions::new()
      .max_connections(1)
      .connect_with(options)
      .await
      .expect("Failed to connect to test database");

   sqlx::query("CREATE TABLE posts (id INTEGER PRIMARY KEY, tags TEXT, scores TEXT)")
      .execute(&pool)
      .await
      .unwrap();

   (pool, temp_dir)
}

async fn insert(pool: &SqlitePool, id: i64, tags: StringArray, scores: Int64Array) {
   sqlx::query("INSERT INTO posts (id, tags, scores) VALUES ($1, $2, $3)")
      .bind(id)
      .bind(tags)
      .bind(scores)
      .execute(pool)
      .await
      .unwrap();
}

async fn raw_text(pool: &SqlitePool, id: i64) -> (Option<String>, Option<String>) {
   sqlx::query_as("SELECT tags, scores FROM posts WHERE id = $1")
      .bind(id)
      .fetch_one(pool)
      .await
      .unwrap()
}

// ─── Round Trips ───

#[tokio::test]
async fn string_array_round_trips_through_text_column() {
   let (pool, _temp) = create_test_pool().await;
   let tags = StringArray::from(vec!["a", "b,c", "x\"y", "", "z\\w"]);
   insert(&pool, 1, tags.clone(), Int64Array::null()).await;

   let (raw, _) = raw_text(&pool, 1).await;
   assert_eq!(raw.as_deref(), Some(r#"{"a","b,c","x\"y","","z\\w"}"#));

   let fetched: StringArray = sqlx::query_scalar("SELECT tags FROM posts WHERE id = 1")
      .fetch_one(&pool)
      .await
      .unwrap();
   assert_eq!(fetched, tags);
}

#[tokio::test]
async fn int_array_round_trips_through_text_column() {
   let (pool, _temp) = create_test_pool().await;
   let scores = Int64Array::from(vec![-1, 0, 9_223_372_036_854_775_807]);
   insert(&pool, 1, StringArray::null(), scores.clone()).await;

   let (_, raw) = raw_text(&pool, 1).await;
   assert_eq!(raw.as_deref(), Some("{-1,0,9223372036854775807}"));

   let row = sqlx::query("SELECT scores FROM posts WHERE id = 1")
      .fetch_one(&pool)
      .await
      .unwrap();
   assert_eq!(row.get::<Int64Array, _>("scores"), scores);
}

// ─── NULL vs Empty ───

#[tokio::test]
async fn null_and_empty_arrays_stay_distinct() {
   let (pool, _temp) = create_test_pool().await;
   insert(&pool, 1, StringArray::null(), Int64Array::null()).await;
   insert(&pool, 2, StringArray::new(Vec::new()), Int64Array::new(Vec::new())).await;

   assert_eq!(raw_text(&pool, 1).await, (None, None));
   assert_eq!(
      raw_text(&pool, 2).await,
      (Some("{}".to_string()), Some("{}".to_string()))
   );

   let rows: Vec<(StringArray, Int64Array)> =
      sqlx::query_as("SELECT tags, scores FROM posts ORDER BY id")
         .fetch_all(&pool)
         .await
         .unwrap();

   assert!(rows[0].0.is_null());
   assert!(rows[0].1.is_null());
   assert_eq!(rows[1].0.as_slice(), Some([].as_slice()));
   assert_eq!(rows[1].1.as_slice(), Some([].as_slice()));
}

#[tokio::test]
async fn empty_text_decodes_as_null() {
   let (pool, _temp) = create_test_pool().await;
   sqlx::query("INSERT INTO posts (id, tags, scores) VALUES (1, '', '')")
      .execute(&pool)
      .await
      .unwrap();

   let (tags, scores): (StringArray, Int64Array) =
      sqlx::query_as("SELECT tags, scores FROM posts WHERE id = 1")
         .fetch_one(&pool)
         .await
         .unwrap();

   assert!(tags.is_null());
   assert!(scores.is_null());
}

// ─── Stored Literals ───

#[tokio::test]
async fn decodes_bare_and_spaced_literals_written_by_hand() {
   let (pool, _temp) = create_test_pool().await;
   sqlx::query(r#"INSERT INTO posts (id, tags, scores) VALUES (1, '{red, "dark blue",,x}', '{3,2,1}')"#)
      .execute(&pool)
      .await
      .unwrap();

   let (tags, scores): (StringArray, Int64Array) =
      sqlx::query_as("SELECT tags, scores FROM posts WHERE id = 1")
         .fetch_one(&pool)
         .await
         .unwrap();

   assert_eq!(tags.as_slice().unwrap(), ["red", "dark blue", "", "x"]);
   assert_eq!(scores.as_slice().unwrap(), [3, 2, 1]);
}

#[tokio::test]
async fn decodes_blob_values() {
   let (pool, _temp) = create_test_pool().await;
   sqlx::query("INSERT INTO posts (id, tags) VALUES (1, CAST('{\"a\",\"b\"}' AS BLOB))")
      .execute(&pool)
      .await
      .unwrap();

   let tags: StringArray = sqlx::query_scalar("SELECT tags FROM posts WHERE id = 1")
      .fetch_one(&pool)
      .await
      .unwrap();

   assert_eq!(tags.as_slice().unwrap(), ["a", "b"]);
}

// ─── Decode Errors ───

#[tokio::test]
async fn malformed_literals_fail_to_decode() {
   let (pool, _temp) = create_test_pool().await;
   for (id, tags) in [(1, "{a,b"), (2, "{a}b"), (3, "a,b}")] {
      sqlx::query("INSERT INTO posts (id, tags) VALUES ($1, $2)")
         .bind(id)
         .bind(tags)
         .execute(&pool)
         .await
         .unwrap();
   }

   let rows = sqlx::query("SELECT tags FROM posts ORDER BY id")
      .fetch_all(&pool)
      .await
      .unwrap();

   let errors: Vec<String> = rows
      .iter()
      .map(|row| {
         let err = row.try_get::<StringArray, _>("tags").unwrap_err();
         match err {
            sqlx::Error::ColumnDecode { source, .. } => source
               .downcast_ref::<Error>()
               .map(Error::error_code)
               .unwrap_or_default(),
            other => panic!("unexpected error: {other}"),
         }
      })
      .collect();

   assert_eq!(
      errors,
      ["MISSING_CLOSE_BRACKET", "TRAILING_DATA", "MISSING_OPEN_BRACKET"]
   );
}

#[tokio::test]
async fn unparsable_integer_fails_to_decode() {
   let (pool, _temp) = create_test_pool().await;
   sqlx::query("INSERT INTO posts (id, scores) VALUES (1, '{1,two}')")
      .execute(&pool)
      .await
      .unwrap();

   let err = sqlx::query_scalar::<_, Int64Array>("SELECT scores FROM posts WHERE id = 1")
      .fetch_one(&pool)
      .await
      .unwrap_err();

   assert!(matches!(err, sqlx::Error::ColumnDecode { .. }));
}

#[tokio::test]
async fn integer_storage_class_is_rejected() {
   let (pool, _temp) = create_test_pool().await;
   let row = sqlx::query("SELECT 42 AS tags").fetch_one(&pool).await.unwrap();

   assert!(row.try_get::<StringArray, _>("tags").is_err());

   let err = row.try_get_unchecked::<StringArray, _>("tags").unwrap_err();
   let sqlx::Error::ColumnDecode { source, .. } = err else {
      panic!("expected a column decode error");
   };
   assert!(matches!(
      source.downcast_ref::<Error>(),
      Some(Error::UnsupportedSource { type_name }) if type_name == "INTEGER"
   ));
}
