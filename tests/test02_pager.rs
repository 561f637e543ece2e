#![cfg(feature = "sqlite")]
use sql_template::prelude::*;

const SCHEMA: &str = include_str!("sql/schema.sql");

/// Backend wrapper that counts count/slice queries.
struct CountingBackend {
    inner: SqliteBackend,
    count_queries: usize,
    slice_queries: usize,
}

impl Backend for CountingBackend {
    fn run(&mut self, sql: &str, params: &ParamSet) -> Result<ResultSet, SqlTemplateError> {
        if sql.contains("pager_count") {
            self.count_queries += 1;
        } else if sql.contains("pager_slice") {
            self.slice_queries += 1;
        }
        self.inner.run(sql, params)
    }
}

fn executor(rows: usize) -> Result<QueryExecutor<CountingBackend>, SqlTemplateError> {
    let inner = SqliteBackend::open_in_memory()?;
    inner.execute_batch(SCHEMA)?;
    for i in 1..=rows {
        inner.execute_batch(&format!("INSERT INTO todo (title, done) VALUES ('task {i}', 0);"))?;
    }
    inner.execute_batch("INSERT INTO todo (title, done) VALUES ('finished', 1);")?;
    let store = TemplateStore::new(FsTemplateSource::new(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/sql"
    )));
    Ok(QueryExecutor::new(
        store,
        CountingBackend {
            inner,
            count_queries: 0,
            slice_queries: 0,
        },
    ))
}

#[test]
fn pages_over_twenty_five_rows() -> Result<(), Box<dyn std::error::Error>> {
    let mut exec = executor(25)?;
    let params = ParamSet::new().with("done", false);
    {
        let mut pager = exec.paginate("todo/open_paged", &params, &PerPage::Fixed(10), FetchMode::Default)?;
        assert_eq!(pager.count()?, 25);
        assert_eq!(pager.total_pages()?, 3);

        let first = pager.page(1)?;
        assert_eq!(first.len(), 10);
        assert!(!first.has_previous());
        assert!(first.has_next());
        assert_eq!(first.total_count(), 25);
        assert_eq!(
            first.rows()[0].as_record().unwrap().get("title").and_then(RowValues::as_text),
            Some("task 1")
        );

        let last = pager.page(3)?;
        assert_eq!(last.len(), 5);
        assert!(!last.has_next());
        assert!(last.has_previous());
        assert_eq!(
            last.rows()[4].as_record().unwrap().get("title").and_then(RowValues::as_text),
            Some("task 25")
        );

        let again = pager.page(1)?;
        assert_eq!(again.len(), 10);
        assert!(pager.is_cached(1) && pager.is_cached(3) && !pager.is_cached(2));

        let beyond = pager.page(4)?;
        assert!(beyond.is_empty());
        assert!(!beyond.has_next());
    }
    let backend = exec.backend();
    assert_eq!(backend.count_queries, 1);
    assert_eq!(backend.slice_queries, 3);
    Ok(())
}

#[test]
fn nothing_runs_until_observed() -> Result<(), Box<dyn std::error::Error>> {
    let mut exec = executor(3)?;
    {
        let _pager = exec.paginate(
            "todo/open_paged",
            &ParamSet::new().with("done", false),
            &PerPage::Fixed(2),
            FetchMode::Default,
        )?;
    }
    assert_eq!(exec.backend().count_queries, 0);
    assert_eq!(exec.backend().slice_queries, 0);
    Ok(())
}

#[test]
fn per_page_from_parameter() -> Result<(), Box<dyn std::error::Error>> {
    let mut exec = executor(7)?;
    let params = ParamSet::new().with("done", false).with("limit", "3");
    let mut pager = exec.paginate("todo/open_paged", &params, &PerPage::from("limit"), FetchMode::Default)?;
    assert_eq!(pager.per_page(), 3);
    let page = pager.page(3)?;
    assert_eq!(page.len(), 1);
    assert_eq!(page.total_pages(), 3);
    Ok(())
}

#[test]
fn absent_per_page_parameter_is_invalid() -> Result<(), Box<dyn std::error::Error>> {
    let mut exec = executor(1)?;
    let err = exec
        .paginate(
            "todo/open_paged",
            &ParamSet::new().with("done", false),
            &PerPage::from("per_page"),
            FetchMode::Default,
        )
        .unwrap_err();
    assert!(matches!(err, SqlTemplateError::InvalidPagerConfiguration(_)));
    Ok(())
}

#[test]
fn page_zero_is_invalid() -> Result<(), Box<dyn std::error::Error>> {
    let mut exec = executor(1)?;
    let mut pager = exec.paginate(
        "todo/open_paged",
        &ParamSet::new().with("done", false),
        &PerPage::Fixed(5),
        FetchMode::Default,
    )?;
    assert!(matches!(
        pager.page(0),
        Err(SqlTemplateError::InvalidPagerConfiguration(_))
    ));
    Ok(())
}

#[test]
fn pages_hydrate_entities() -> Result<(), Box<dyn std::error::Error>> {
    #[derive(Debug)]
    struct Title(String);

    let mut exec = executor(4)?;
    exec.registry_mut().register(EntityClass::with_constructor("Title", 2, |args| {
        Ok(Title(args[1].as_text().unwrap_or_default().to_string()))
    }));
    let mut pager = exec.paginate(
        "todo/open_paged",
        &ParamSet::new().with("done", false),
        &PerPage::Fixed(3),
        FetchMode::class("Title"),
    )?;
    let page = pager.page(2)?;
    assert_eq!(page.rows()[0].downcast_ref::<Title>().map(|t| t.0.as_str()), Some("task 4"));
    Ok(())
}

#[test]
fn commented_template_pages_like_it_executes() -> Result<(), Box<dyn std::error::Error>> {
    let mut exec = executor(5)?;
    let params = ParamSet::new().with("done", false);
    let executed = exec
        .execute("todo/commented_paged", &params, &FetchMode::Default)?
        .into_rows();
    assert_eq!(executed.len(), 5);

    let mut pager = exec.paginate("todo/commented_paged", &params, &PerPage::Fixed(2), FetchMode::Default)?;
    assert_eq!(pager.count()?, 5);
    let last = pager.page(3)?;
    assert_eq!(last.len(), 1);
    assert_eq!(
        last.rows()[0].as_record().unwrap().get("title").and_then(RowValues::as_text),
        Some("task 5")
    );
    Ok(())
}

#[test]
fn template_limit_and_offset_are_replaced() -> Result<(), Box<dyn std::error::Error>> {
    let mut exec = executor(12)?;
    let params = ParamSet::new().with("done", false);
    let mut pager = exec.paginate("todo/limited_paged", &params, &PerPage::Fixed(5), FetchMode::Default)?;
    assert_eq!(pager.count()?, 12);
    let second = pager.page(2)?;
    assert_eq!(second.len(), 5);
    assert_eq!(
        second.rows()[0].as_record().unwrap().get("title").and_then(RowValues::as_text),
        Some("task 6")
    );
    Ok(())
}

#[test]
fn limit_word_in_literal_is_left_alone() -> Result<(), Box<dyn std::error::Error>> {
    let mut exec = executor(5)?;
    let mut pager = exec.paginate(
        "todo/literal_paged",
        &ParamSet::new().with("done", false),
        &PerPage::Fixed(10),
        FetchMode::Default,
    )?;
    assert_eq!(pager.count()?, 5);
    assert_eq!(pager.page(1)?.len(), 5);
    Ok(())
}

#[test]
fn exact_multiple_has_no_next_on_last_page() -> Result<(), Box<dyn std::error::Error>> {
    let mut exec = executor(20)?;
    let params = ParamSet::new().with("done", false).with("perPage", 10_i64);
    let mut pager = exec.paginate("todo/open_paged", &params, &PerPage::from("perPage"), FetchMode::Default)?;
    assert_eq!(pager.total_pages()?, 2);
    assert!(pager.page(1)?.has_next());
    let last = pager.page(2)?;
    assert_eq!(last.len(), 10);
    assert!(!last.has_next());
    assert!(last.has_previous());
    Ok(())
}
