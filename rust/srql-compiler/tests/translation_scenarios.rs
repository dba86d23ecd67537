use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use srql_compiler::{
    ast::{Condition, Entity, PageDirection, Pagination, Predicate, QueryKind},
    bind::BindParam,
    dialect::Backend,
    error::{ParseError, TranslationError},
    pagination, parse,
    time::FixedClock,
    translate, translate_literal,
};

fn clock() -> FixedClock {
    FixedClock::at_date(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
}

fn field(condition: &Condition) -> &str {
    match &condition.predicate {
        Predicate::Compare(comparison) => &comparison.field,
        other => panic!("expected a comparison, got {other:?}"),
    }
}

fn literal(text: &str, backend: Backend) -> String {
    let query = parse(text).expect("query should parse");
    translate_literal(&query, backend, &clock())
        .expect("query should translate")
        .statement
}

#[test]
fn show_devices_on_every_backend() {
    assert_eq!(
        literal("show devices", Backend::ClickHouse),
        "SELECT * FROM devices"
    );
    assert_eq!(
        literal("show devices", Backend::ArangoDb),
        "FOR doc IN devices\n  RETURN doc"
    );
    assert_eq!(
        literal("show devices", Backend::Proton),
        "SELECT * FROM table(unified_devices)"
    );
}

#[test]
fn string_equality_is_single_quoted() {
    assert_eq!(
        literal("show devices where ip = '192.168.1.1'", Backend::ClickHouse),
        "SELECT * FROM devices WHERE ip = '192.168.1.1'"
    );
}

#[test]
fn date_function_and_today_per_backend() {
    let text = "show sweep_results where date(timestamp) = TODAY and available = true";
    assert_eq!(
        literal(text, Backend::Proton),
        "SELECT * FROM table(sweep_results) WHERE to_date(timestamp) = today() AND available = true"
    );
    assert_eq!(
        literal(text, Backend::ClickHouse),
        "SELECT * FROM sweep_results WHERE toDate(timestamp) = today() AND available = true"
    );
    assert_eq!(
        literal(text, Backend::ArangoDb),
        "FOR doc IN sweep_results\n  FILTER SUBSTRING(doc.timestamp, 0, 10) == '2025-03-01' AND doc.available == true\n  RETURN doc"
    );
}

#[test]
fn yesterday_per_backend() {
    let text = "show sweep_results where date(timestamp) = YESTERDAY";
    assert_eq!(
        literal(text, Backend::ClickHouse),
        "SELECT * FROM sweep_results WHERE toDate(timestamp) = yesterday()"
    );
    assert_eq!(
        literal(text, Backend::Proton),
        "SELECT * FROM table(sweep_results) WHERE to_date(timestamp) = yesterday()"
    );
    assert_eq!(
        literal(text, Backend::ArangoDb),
        "FOR doc IN sweep_results\n  FILTER SUBSTRING(doc.timestamp, 0, 10) == '2025-02-28'\n  RETURN doc"
    );

    let query = parse(text).unwrap();
    for backend in [Backend::ClickHouse, Backend::Proton] {
        let artifact = translate(&query, backend, &clock()).unwrap();
        assert!(artifact.statement.ends_with("= yesterday()"), "{}", artifact.statement);
        assert!(artifact.params.is_empty());
    }
}

#[test]
fn null_checks_per_backend() {
    let text = "show devices where hostname is null and mac is not null";
    assert_eq!(
        literal(text, Backend::ClickHouse),
        "SELECT * FROM devices WHERE hostname IS NULL AND mac IS NOT NULL"
    );
    assert_eq!(
        literal(text, Backend::Proton),
        "SELECT * FROM table(unified_devices) WHERE hostname IS NULL AND mac IS NOT NULL"
    );
    assert_eq!(
        literal(text, Backend::ArangoDb),
        "FOR doc IN devices\n  FILTER doc.hostname == null AND doc.mac != null\n  RETURN doc"
    );

    let query = parse(text).unwrap();
    for backend in Backend::ALL {
        assert!(translate(&query, backend, &clock()).unwrap().params.is_empty());
    }
}

#[test]
fn grouped_conditions_per_backend() {
    let text = "show devices where (ip = '10.0.0.1' or hostname is null) and is_available = true";
    assert_eq!(
        literal(text, Backend::Proton),
        "SELECT * FROM table(unified_devices) \
         WHERE (ip = '10.0.0.1' OR hostname IS NULL) AND is_available = true"
    );
    assert_eq!(
        literal(text, Backend::ArangoDb),
        "FOR doc IN devices\n  FILTER (doc.ip == '10.0.0.1' OR doc.hostname == null) \
         AND doc.is_available == true\n  RETURN doc"
    );

    let artifact = translate(&parse(text).unwrap(), Backend::ClickHouse, &clock()).unwrap();
    assert_eq!(
        artifact.statement,
        "SELECT * FROM devices WHERE (ip = $1 OR hostname IS NULL) AND is_available = $2"
    );
    assert_eq!(
        artifact.params,
        vec![BindParam::Text("10.0.0.1".into()), BindParam::Bool(true)]
    );
}

#[test]
fn count_wraps_projection() {
    assert_eq!(
        literal(
            "count sweep_results where date(timestamp) = TODAY",
            Backend::Proton
        ),
        "SELECT COUNT(*) FROM table(sweep_results) WHERE to_date(timestamp) = today()"
    );
}

#[test]
fn misspelled_keyword_is_a_syntax_error() {
    let err = parse("shoe devices").unwrap_err();
    assert!(matches!(err, ParseError::Syntax(_)));
    assert!(err.to_string().contains("syntax error"), "{err}");
}

#[test]
fn casing_is_normalized_by_the_translator() {
    let upper = parse("SHOW DEVICES WHERE IP = '192.168.1.1' ORDER BY IP DESC LIMIT 10").unwrap();
    let mixed = parse("Show Devices Where Ip = '192.168.1.1' Order By Ip Asc").unwrap();

    assert_eq!(field(&upper.conditions[0]), "IP");
    assert_eq!(field(&mixed.conditions[0]), "Ip");
    assert_eq!(upper.order_by[0].field, "IP");

    let clock = clock();
    assert_eq!(
        translate_literal(&upper, Backend::ClickHouse, &clock)
            .unwrap()
            .statement,
        "SELECT * FROM devices WHERE ip = '192.168.1.1' ORDER BY ip DESC LIMIT 10"
    );
    assert_eq!(
        translate_literal(&mixed, Backend::ClickHouse, &clock)
            .unwrap()
            .statement,
        "SELECT * FROM devices WHERE ip = '192.168.1.1' ORDER BY ip ASC"
    );
}

#[test]
fn keyword_casing_yields_identical_statements() {
    let variants = ["show devices", "SHOW DEVICES", "Show Devices"];
    for backend in Backend::ALL {
        let statements: Vec<String> = variants
            .iter()
            .map(|text| {
                let query = parse(text).unwrap();
                assert_eq!(query.kind, QueryKind::Show);
                assert_eq!(query.entity, Entity::Devices);
                translate(&query, backend, &clock()).unwrap().statement
            })
            .collect();
        assert!(
            statements.windows(2).all(|pair| pair[0] == pair[1]),
            "{backend}: {statements:?}"
        );
    }
}

#[test]
fn field_casing_yields_identical_statements() {
    for backend in Backend::ALL {
        let a = parse("show devices where IP = '10.0.0.1' order by HostName").unwrap();
        let b = parse("show devices where ip = '10.0.0.1' order by hostname").unwrap();
        assert_eq!(
            translate(&a, backend, &clock()).unwrap(),
            translate(&b, backend, &clock()).unwrap()
        );
    }
}

#[test]
fn translation_is_deterministic() {
    let queries = [
        "show flows where src_port between 1000 and 2000 or dst_addr in ('10.0.0.1', '10.0.0.2') order by timestamp desc limit 50",
        "count sweep_results where date(timestamp) = YESTERDAY and available = false",
        "find devices where hostname like 'core-%' and is_available is not null",
    ];
    for backend in Backend::ALL {
        for text in queries {
            let query = parse(text).unwrap();
            let first = translate(&query, backend, &clock()).unwrap();
            let second = translate(&query, backend, &clock()).unwrap();
            assert_eq!(first, second);
        }
    }
}

#[test]
fn both_modes_express_the_same_query() {
    let query = parse("show devices where hostname = 'edge-1' and is_available = true").unwrap();
    let safe = translate(&query, Backend::ClickHouse, &clock()).unwrap();
    let embedded = translate_literal(&query, Backend::ClickHouse, &clock()).unwrap();

    assert_eq!(
        safe.statement,
        "SELECT * FROM devices WHERE hostname = $1 AND is_available = $2"
    );
    assert_eq!(
        safe.params,
        vec![BindParam::Text("edge-1".into()), BindParam::Bool(true)]
    );
    assert_eq!(
        embedded.statement,
        "SELECT * FROM devices WHERE hostname = 'edge-1' AND is_available = true"
    );
}

#[test]
fn injection_attempts_stay_inside_parameters() {
    let query = parse("show devices where hostname = 'x'' OR 1=1 --'").unwrap_err();
    // Doubled quotes are not an escape: the trailing text is left unparsed.
    assert!(matches!(query, ParseError::Syntax(_)));

    let query = parse(r"show devices where hostname = 'x\' OR 1=1 --'").unwrap();
    let artifact = translate(&query, Backend::Proton, &clock()).unwrap();
    assert_eq!(
        artifact.statement,
        "SELECT * FROM table(unified_devices) WHERE hostname = $1"
    );
    assert_eq!(
        artifact.params,
        vec![BindParam::Text("x' OR 1=1 --".into())]
    );
}

#[test]
fn pagination_cutoff_is_strict() {
    let full = pagination::plan(None, Some(10), 10).unwrap();
    assert!(full.next_cursor.is_some());

    let short = pagination::plan(None, Some(10), 9).unwrap();
    assert_eq!(short.next_cursor, None);
    assert_eq!(short.limit, Some(10));
}

#[test]
fn pagination_continues_from_translated_page() {
    let mut query = parse("show devices order by last_seen desc limit 25").unwrap();
    query.pagination = Some(Pagination {
        cursor: pagination::encode_cursor(25),
        direction: PageDirection::Next,
        mode: None,
    });

    let artifact = translate(&query, Backend::ClickHouse, &clock()).unwrap();
    assert_eq!(
        artifact.statement,
        "SELECT * FROM devices ORDER BY last_seen DESC LIMIT 25 OFFSET 25"
    );

    let outcome = pagination::plan(query.pagination.as_ref(), query.limit, 25).unwrap();
    let next = outcome.next_cursor.expect("full page should continue");
    assert_eq!(pagination::decode_cursor(&next).unwrap(), 50);
}

#[test]
fn every_entity_maps_or_fails_with_unsupported_entity() {
    for backend in Backend::ALL {
        for entity in Entity::ALL {
            let query = parse(&format!("show {entity}")).unwrap();
            match translate(&query, backend, &clock()) {
                Ok(artifact) => assert!(
                    artifact.statement.contains(entity.as_str())
                        || artifact.statement.contains("unified_devices"),
                    "{backend}/{entity}: {}",
                    artifact.statement
                ),
                Err(err) => assert_eq!(
                    err,
                    TranslationError::UnsupportedEntity {
                        entity: entity.to_string(),
                        backend,
                    }
                ),
            }
        }
    }
}

#[test]
fn metrics_are_not_in_the_graph_store() {
    let query = parse("show cpu_metrics").unwrap();
    let err = translate(&query, Backend::ArangoDb, &clock()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "entity 'cpu_metrics' is not available on backend 'arangodb'"
    );
}

#[test]
fn unknown_entity_is_semantic() {
    let err = parse("show widgets").unwrap_err();
    assert!(matches!(err, ParseError::UnknownEntity { ref name, .. } if name == "widgets"));
}
