#![cfg(feature = "sqlite")]
use std::fs;

use sql_template::prelude::*;

#[test]
fn builder_wires_template_dir_and_database() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    fs::create_dir_all(dir.path().join("setup"))?;
    fs::write(
        dir.path().join("setup/create.tpl"),
        "CREATE TABLE kv (k TEXT PRIMARY KEY, v TEXT);\nINSERT INTO kv VALUES (:k, :v);\n",
    )?;
    fs::write(dir.path().join("get.tpl"), "/* lookup */\nSELECT v FROM kv WHERE k = :k")?;
    let db_path = dir.path().join("engine.db");

    let mut exec = EngineOptionsBuilder::new(dir.path())
        .extension("tpl")
        .database(db_path.to_string_lossy())
        .build()?;

    let created = exec.execute(
        "setup/create",
        &ParamSet::new().with("k", "color").with("v", "teal"),
        &FetchMode::Default,
    )?;
    assert_eq!(created.rows_affected(), 1);

    let value = exec
        .execute_one("get", &ParamSet::new().with("k", "color"), &FetchMode::Default)?
        .into_first()
        .and_then(|row| row.as_record()?.get("v")?.as_text().map(str::to_string));
    assert_eq!(value.as_deref(), Some("teal"));

    assert!(db_path.exists());
    Ok(())
}

#[test]
fn function_factory_over_real_rows() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    fs::write(
        dir.path().join("pairs.sql"),
        "SELECT 'b' AS second_col, 'a' AS first_col UNION ALL SELECT 'd', 'c';",
    )?;
    let mut exec = QueryExecutor::new(TemplateStore::from_dir(dir.path()), SqliteBackend::open_in_memory()?);

    let mode = FetchMode::function(|args| {
        let joined: Vec<&str> = args.iter().filter_map(RowValues::as_text).collect();
        Ok(HydratedRow::entity(joined.join("")))
    });
    let rows = exec.execute("pairs", &ParamSet::new(), &mode)?.into_rows();
    let values: Vec<&str> = rows
        .iter()
        .filter_map(|r| r.downcast_ref::<String>().map(String::as_str))
        .collect();
    assert_eq!(values, vec!["ba", "dc"]);
    Ok(())
}
