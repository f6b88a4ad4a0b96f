use std::time::Duration;

use pretty_assertions::assert_eq;
use userquery::{
    EntitySchema, FieldDeclaration, Queryable, SchemaDeclaration, SchemaError, TypeClass, Value,
    compile, evaluate,
};

#[derive(Debug, Clone)]
struct TestModel {
    id: u32,
    name: &'static str,
    ivalue: i64,
    score: f64,
    length: Duration,
    album: Option<&'static str>,
    genre: &'static str,
}

impl Queryable for TestModel {
    fn declare() -> SchemaDeclaration<Self> {
        SchemaDeclaration::new("testmodel")
            .field(FieldDeclaration::new("id", TypeClass::Int).hidden().read(|m: &TestModel| m.id.into()))
            .field(FieldDeclaration::new("Name", TypeClass::String).query_name("name").read(|m: &TestModel| m.name.into()))
            .field(FieldDeclaration::new("IntValue", TypeClass::Int).query_name("ivalue").read(|m: &TestModel| m.ivalue.into()))
            .field(FieldDeclaration::new("score", TypeClass::Float).read(|m: &TestModel| m.score.into()))
            .field(FieldDeclaration::new("length", TypeClass::Duration).read(|m: &TestModel| m.length.into()))
            .field(FieldDeclaration::new("album", TypeClass::String).read(|m: &TestModel| m.album.into()))
            .field(
                FieldDeclaration::new("genre", TypeClass::Enum)
                    .variants(["Rock", "Jazz", "Folk"])
                    .read(|m: &TestModel| Value::Enum(m.genre.to_string())),
            )
            .default_field("Name")
    }
}

fn model(id: u32, name: &'static str, ivalue: i64) -> TestModel {
    TestModel {
        id,
        name,
        ivalue,
        score: 0.0,
        length: Duration::ZERO,
        album: None,
        genre: "Rock",
    }
}

fn root() -> Vec<TestModel> {
    vec![model(1, "Item1", 1), model(2, "Item2", 5), model(3, "Item3", 10)]
}

fn schema() -> EntitySchema<TestModel> {
    TestModel::schema().unwrap()
}

/// Names of matching records, in result order.
fn run(query: &str, records: &[TestModel]) -> Vec<&'static str> {
    let schema = schema();
    let compiled = compile(query, &schema).unwrap_or_else(|e| panic!("{:?}: {}", query, e));
    compiled.apply(records).iter().map(|m| m.name).collect()
}

/// Names of matching records, sorted, for set comparisons.
fn run_set(query: &str) -> Vec<&'static str> {
    let mut names = run(query, &root());
    names.sort();
    names
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_operators() {
    let cases: Vec<(&str, Vec<&str>)> = vec![
        ("ivalue = 1", vec!["Item1"]),
        ("ivalue != 5", vec!["Item1", "Item3"]),
        ("ivalue < 5", vec!["Item1"]),
        ("ivalue <= 5", vec!["Item1", "Item2"]),
        ("ivalue > 1", vec!["Item2", "Item3"]),
        ("ivalue >= 10", vec!["Item3"]),
        ("name = 'Item1'", vec!["Item1"]),
        ("name != 'Item1'", vec!["Item2", "Item3"]),
        ("name ^ 'Item'", vec!["Item1", "Item2", "Item3"]),
        ("name !^ 'Item3'", vec!["Item1", "Item2"]),
        ("name * 'em2'", vec!["Item2"]),
        ("name !* '3'", vec!["Item1", "Item2"]),
        ("name $ 'm3'", vec!["Item3"]),
        ("name !$ 'm3'", vec!["Item1", "Item2"]),
    ];

    for (query, expected) in cases {
        assert_eq!(run_set(query), expected, "Failed for query: {}", query);
    }
}

#[test]
fn test_string_comparisons_ignore_case() {
    assert_eq!(run_set("name = 'ITEM1'"), vec!["Item1"]);
    assert_eq!(run_set("name ^ 'iTeM'"), vec!["Item1", "Item2", "Item3"]);
    assert_eq!(run_set("name * 'EM2'"), vec!["Item2"]);
    assert_eq!(run_set("name $ 'M3'"), vec!["Item3"]);
}

#[test]
fn test_and_groups() {
    let cases: Vec<(&str, Vec<&str>)> = vec![
        ("ivalue = 1 & name = 'Item1'", vec!["Item1"]),
        ("ivalue > 1 & ivalue < 10", vec!["Item2"]),
        ("name * 'Item' & ivalue >= 5", vec!["Item2", "Item3"]),
        ("ivalue = 1 & ivalue = 5", vec![]),
    ];

    for (query, expected) in cases {
        assert_eq!(run_set(query), expected, "Failed for query: {}", query);
    }
}

#[test]
fn test_or_groups() {
    let cases: Vec<(&str, Vec<&str>)> = vec![
        ("ivalue = 1, ivalue = 5", vec!["Item1", "Item2"]),
        ("name = 'Item2', name = 'Item3'", vec!["Item2", "Item3"]),
        ("ivalue = 1, ivalue = 5 & name = 'Item2'", vec!["Item1", "Item2"]),
        ("ivalue = 1, ivalue = 5 & name = 'Item3'", vec!["Item1"]),
    ];

    for (query, expected) in cases {
        assert_eq!(run_set(query), expected, "Failed for query: {}", query);
    }
}

#[test]
fn test_second_group_needs_both_terms() {
    let schema = schema();
    let records = root();
    let compiled = compile("ivalue = 1, ivalue = 5 & name * 'beans'", &schema).unwrap();
    let ids: Vec<u32> = compiled.apply(&records).iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![1]);
}

#[test]
fn test_unterminated_quote_is_an_error() {
    let schema = schema();
    assert!(compile("\"unterminated", &schema).is_err());
}

#[test]
fn test_or_is_commutative() {
    let queries = [
        ("ivalue = 1, ivalue > 5", "ivalue > 5, ivalue = 1"),
        ("name * '2', ivalue < 5 & name !* '1'", "ivalue < 5 & name !* '1', name * '2'"),
    ];
    for (a, b) in queries {
        assert_eq!(run_set(a), run_set(b), "{:?} vs {:?}", a, b);
    }
}

#[test]
fn test_empty_query_returns_everything_in_order() {
    assert_eq!(run("", &root()), vec!["Item1", "Item2", "Item3"]);
}

#[test]
fn test_filter_preserves_input_order() {
    let mut records = root();
    records.reverse();
    assert_eq!(run("ivalue >= 5", &records), vec!["Item3", "Item2"]);
}

#[test]
fn test_bare_literal_and_free_text() {
    assert_eq!(run_set("'em3'"), vec!["Item3"]);
    assert_eq!(run_set("em3"), vec!["Item3"]);
    assert_eq!(run_set("ivalue < 10 & 'item'"), vec!["Item1", "Item2"]);
}

#[test]
fn test_hidden_field_is_not_queryable() {
    // `id` is hidden, so the whole query becomes free text against the name.
    assert_eq!(run_set("id = 1"), Vec::<&str>::new());
}

// ============================================================================
// Sorting
// ============================================================================

#[test]
fn test_orderby_descending() {
    assert_eq!(run("ivalue > 1 orderbydescending ivalue", &root()), vec!["Item3", "Item2"]);
}

#[test]
fn test_orderby_leading() {
    let mut records = root();
    records.reverse();
    assert_eq!(run("orderby ivalue", &records), vec!["Item1", "Item2", "Item3"]);
}

#[test]
fn test_last_sort_wins() {
    let records = vec![model(1, "b", 1), model(2, "a", 2), model(3, "c", 0)];
    assert_eq!(run("orderby name orderbydescending ivalue", &records), vec!["a", "b", "c"]);
    assert_eq!(run("orderbydescending ivalue orderby name", &records), vec!["a", "b", "c"]);
    assert_eq!(run("orderby ivalue", &records), vec!["c", "b", "a"]);
}

#[test]
fn test_sort_integers_by_magnitude() {
    let records = vec![model(1, "ten", 10), model(2, "two", 2), model(3, "one", 1), model(4, "minus", -3)];
    assert_eq!(run("orderby ivalue", &records), vec!["minus", "one", "two", "ten"]);
}

#[test]
fn test_sort_floats_by_magnitude() {
    let mut records = root();
    records[0].score = 2.5;
    records[1].score = -1.0;
    records[2].score = 10.25;
    assert_eq!(run("orderby score", &records), vec!["Item2", "Item1", "Item3"]);
}

#[test]
fn test_sort_durations_by_length() {
    let mut records = root();
    records[0].length = Duration::from_secs(600);
    records[1].length = Duration::from_secs(59);
    records[2].length = Duration::from_secs(3_600);
    assert_eq!(run("orderbydescending length", &records), vec!["Item3", "Item1", "Item2"]);
}

#[test]
fn test_sort_strings_ignoring_case() {
    let records = vec![model(1, "banana", 0), model(2, "Apple", 0), model(3, "cherry", 0), model(4, "apple", 0)];
    assert_eq!(run("orderby name", &records), vec!["Apple", "apple", "banana", "cherry"]);
}

#[test]
fn test_sort_enums_by_declaration() {
    let mut records = root();
    records[0].genre = "Folk";
    records[1].genre = "Rock";
    records[2].genre = "Jazz";
    assert_eq!(run("orderby genre", &records), vec!["Item2", "Item3", "Item1"]);
}

#[test]
fn test_sort_is_stable() {
    let records = vec![model(1, "first", 1), model(2, "second", 0), model(3, "third", 1), model(4, "fourth", 0)];
    assert_eq!(run("orderby ivalue", &records), vec!["second", "fourth", "first", "third"]);
    assert_eq!(run("orderbydescending ivalue", &records), vec!["first", "third", "second", "fourth"]);
}

// ============================================================================
// Types
// ============================================================================

#[test]
fn test_duration_literals() {
    let mut records = root();
    records[0].length = Duration::from_secs(185);
    records[1].length = Duration::from_secs(3 * 3_600);
    records[2].length = Duration::from_secs(2 * 86_400);

    let schema = schema();
    let names = |query: &str| -> Vec<&'static str> {
        let compiled = compile(query, &schema).unwrap();
        compiled.apply(&records).iter().map(|m| m.name).collect()
    };

    assert_eq!(names("length = '00:03:05'"), vec!["Item1"]);
    assert_eq!(names("length > '01:00'"), vec!["Item2", "Item3"]);
    assert_eq!(names("length >= 1"), vec!["Item3"]);
    assert_eq!(names("length < '1.00:00:00'"), vec!["Item1", "Item2"]);
}

#[test]
fn test_float_literals() {
    let mut records = root();
    records[0].score = 4.5;
    records[1].score = 4.0;
    records[2].score = 5.0;
    assert_eq!(run("score >= 4.5", &records), vec!["Item1", "Item3"]);
    assert_eq!(run("score = 4", &records), vec!["Item2"]);
}

#[test]
fn test_enum_literals_ignore_case() {
    let mut records = root();
    records[1].genre = "Jazz";
    assert_eq!(run("genre = 'jazz'", &records), vec!["Item2"]);
    assert_eq!(run("genre != 'JAZZ'", &records), vec!["Item1", "Item3"]);
}

#[test]
fn test_optional_values() {
    let mut records = root();
    records[0].album = Some("Breakfast");
    records[1].album = Some("Lunch");

    assert_eq!(run("album * 'break'", &records), vec!["Item1"]);
    assert_eq!(run("album !* 'break'", &records), vec!["Item2", "Item3"]);
    assert_eq!(run("album != 'Lunch'", &records), vec!["Item1", "Item3"]);
    assert_eq!(run("album ^ ''", &records), vec!["Item1", "Item2"]);
    assert_eq!(run("orderbydescending album", &records), vec!["Item2", "Item1", "Item3"]);
    assert_eq!(run("orderby album", &records), vec!["Item3", "Item1", "Item2"]);
}

#[test]
fn test_field_to_field() {
    let mut records = root();
    records[0].score = 2.0;
    records[1].score = 2.0;
    records[2].score = 20.0;
    records[0].album = Some("item1");

    assert_eq!(run("score = score", &records), vec!["Item1", "Item2", "Item3"]);
    assert_eq!(run("name = album", &records), vec!["Item1"]);
    assert_eq!(run("name != album", &records), vec!["Item2", "Item3"]);
    assert_eq!(run("album * name", &records), vec!["Item1"]);
}

// ============================================================================
// Sharing
// ============================================================================

#[test]
fn test_compiled_query_reused_across_collections() {
    let schema = schema();
    let compiled = compile("ivalue > 1", &schema).unwrap();
    let first = root();
    let second = vec![model(9, "Other", 7), model(8, "Small", 0)];

    assert_eq!(compiled.apply(&first).len(), 2);
    assert_eq!(compiled.apply(&second).iter().map(|m| m.name).collect::<Vec<_>>(), vec!["Other"]);
    assert_eq!(compiled.filter(&first).count(), 2);
}

#[test]
fn test_evaluate_parts() {
    let schema = schema();
    let (query, sort) = compile("ivalue < 10 orderbydescending name", &schema).unwrap().into_parts();
    let records = root();
    let names: Vec<_> = evaluate(&query, sort.as_ref(), &records).iter().map(|m| m.name).collect();
    assert_eq!(names, vec!["Item2", "Item1"]);
}

#[test]
fn test_schema_shared_between_threads() {
    let schema = schema();
    let records = root();

    std::thread::scope(|scope| {
        let handles: Vec<_> = ["ivalue = 1", "ivalue = 5", "ivalue = 10"]
            .into_iter()
            .map(|query| {
                let schema = &schema;
                let records = &records;
                scope.spawn(move || {
                    let compiled = compile(query, schema).unwrap();
                    compiled.apply(records).len()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 1);
        }
    });
}

#[test]
fn test_schema_declaration_errors() {
    let err = SchemaDeclaration::<TestModel>::new("broken")
        .field(FieldDeclaration::new("name", TypeClass::String))
        .default_field("name");
    assert!(matches!(userquery::build_schema(err), Err(SchemaError::Unreadable { .. })));
}
