use std::collections::BTreeMap;

use pretty_assertions::assert_eq;

use facetstore::{FileStore, FragmentStore, Multiplicity, ParameterStore, Pattern, Persistence, Slot, Value};

fn mapping<P: Persistence>(store: &ParameterStore<P>) -> BTreeMap<String, Vec<Value>> {
    store.names().map(|name| (name.to_string(), store.values(name))).collect()
}

fn exposed_store(exposed: Vec<&str>) -> ParameterStore<FragmentStore> {
    ParameterStore::builder()
        .exposed(exposed)
        .persistence(FragmentStore::new())
        .build()
}

#[test]
fn duplicate_value_is_rejected() {
    let mut store = ParameterStore::new();
    assert_eq!(store.add_by_value("fq", "type:article"), vec![true]);
    assert_eq!(store.add_by_value("fq", "type:article"), vec![false]);
    assert_eq!(store.values("fq"), vec![Value::from("type:article")]);
}

#[test]
fn list_for_repeatable_name_serializes_in_order() {
    let mut store = ParameterStore::new();
    assert_eq!(store.add_by_value("fq", vec!["a:1", "a:2"]), vec![true, true]);
    assert_eq!(store.string(), "fq=a%3A1&fq=a%3A2");
}

#[test]
fn parse_query_string() {
    let mut store = ParameterStore::new();
    store.parse_string("q=test&fq=a%3A1&fq=a%3A2");
    assert_eq!(store.values("q"), vec![Value::from("test")]);
    assert_eq!(store.values("fq"), vec![Value::from("a:1"), Value::from("a:2")]);
}

#[test]
fn exposed_string_skips_hidden_names() {
    let mut store = exposed_store(vec!["q"]);
    store.add_by_value("q", "test");
    store.add_by_value("sort", "score desc");
    assert_eq!(store.exposed_string(), "q=test");
    assert_eq!(store.string(), "q=test&sort=score%20desc");
}

#[test]
fn remove_by_value_keeps_the_rest() {
    let mut store = ParameterStore::new();
    store.add_by_value("fq", vec!["a:1", "a:2"]);
    assert!(store.remove_by_value("fq", "a:1").is_some());
    assert_eq!(store.values("fq"), vec![Value::from("a:2")]);
}

#[test]
fn slots_follow_multiplicity() {
    let mut store = ParameterStore::new();
    store.parse_string("q=a&fq=b&facet.field=c&rows=10&q=d&fq=e");
    store.remove("fq", Some(0));
    store.add_by_value("facet.query", "x:[* TO 5]");
    store.get("pf");
    store.get("start");

    let names: Vec<String> = store.names().map(String::from).collect();
    for name in names {
        let multi = store.peek(&name).map(Slot::is_multi).unwrap();
        assert_eq!(multi, store.is_multiple(&name), "{}", name);
        for param in store.peek(&name).unwrap().parameters() {
            assert_eq!(param.name(), name);
        }
    }
}

#[test]
fn round_trip_through_a_fresh_store() {
    let queries = [
        "q=test&fq=a%3A1&fq=a%3A2",
        "q=caf%C3%A9%20au%20lait&rows=10&start=0&sort=score%20desc",
        "facet=true&facet.field=type&facet.field=year&fq=%7B!tag%3Dt%7Dtype%3Aarticle&facet.query=x%3A%5B*%20TO%205%5D",
        "fl=id%2Cscore&q.op=AND&hl.fl=title",
    ];
    for query in queries.iter() {
        let mut first = ParameterStore::new();
        first.parse_string(query);
        let mut second = ParameterStore::new();
        second.parse_string(&first.string());
        assert_eq!(mapping(&first), mapping(&second), "{}", query);
        assert_eq!(first.string(), second.string());
    }
}

#[test]
fn reparsing_collapses_repeated_values() {
    let mut store = ParameterStore::new();
    store.parse_string("fq=a%3A1&fq=a%3A2");
    let query = store.string();
    store.parse_string(&query);
    assert_eq!(store.string(), query);
}

#[test]
fn save_and_load_exposed_names() {
    let mut store = exposed_store(vec!["q", "fq"]);
    store.add_by_value("q", "test");
    store.add_by_value("fq", vec!["a:1", "b:2"]);
    store.add_by_value("rows", 10);
    store.save().unwrap();
    assert_eq!(store.persistence().fragment(), "#q=test&fq=a%3A1&fq=b%3A2");

    store.add_by_value("q", "changed");
    store.remove("fq", None);
    store.add_by_value("rows", 50);
    store.load(true).unwrap();

    assert_eq!(store.values("q"), vec![Value::from("test")]);
    assert_eq!(store.values("fq"), vec![Value::from("a:1"), Value::from("b:2")]);
    assert_eq!(store.values("rows"), vec![Value::from(50)]);
}

#[test]
fn load_clears_exposed_names_missing_from_state() {
    let mut store = exposed_store(vec!["q", "fq"]);
    store.add_by_value("q", "test");
    store.save().unwrap();

    store.add_by_value("fq", "stale:1");
    store.load(true).unwrap();
    assert!(store.peek("fq").is_none());
    assert_eq!(store.exposed_string(), "q=test");
}

#[test]
fn load_from_empty_state_clears_everything_exposed() {
    let mut store = exposed_store(vec!["q"]);
    store.add_by_value("q", "test");
    store.add_by_value("rows", 10);
    store.load(true).unwrap();
    assert_eq!(store.string(), "rows=10");
}

#[test]
fn state_survives_a_new_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.txt");

    let mut store = ParameterStore::builder()
        .exposed(vec!["q", "fq"])
        .persistence(FileStore::new(&path))
        .param("rows", 20)
        .build();
    store.add_by_value("q", "solr");
    store.add_by_value("fq", "year:2020");
    store.save().unwrap();

    let mut restored = ParameterStore::builder()
        .exposed(vec!["q", "fq"])
        .persistence(FileStore::new(&path))
        .param("rows", 20)
        .build();
    restored.load(true).unwrap();
    assert_eq!(restored.string(), "rows=20&q=solr&fq=year%3A2020");
    assert_eq!(restored.stored_string().unwrap(), "q=solr&fq=year%3A2020");
}

#[test]
fn find_by_pattern() {
    let mut store = ParameterStore::builder()
        .multiple(Multiplicity::names(vec!["fq"]))
        .build();
    store.parse_string("fq=type%3Aarticle&fq=type%3Abook&fq=year%3A2020&facet.field=type");
    let removed = store.remove_by_value("fq", Pattern::regex("^type:").unwrap());
    assert!(removed.is_some());
    assert_eq!(store.values("fq"), vec![Value::from("year:2020")]);
    assert!(!store.get("facet.field").is_multi());
}

#[test]
fn editing_through_get_keeps_repeatable_values_distinct() {
    let mut store = ParameterStore::new();
    store.add_by_value("fq", vec!["a:1", "a:2"]);
    assert!(!store.get("fq").set_val(0, "a:2"));
    assert!(store.get("fq").set_val(0, "a:3"));
    assert_eq!(store.string(), "fq=a%3A3&fq=a%3A2");
    assert_eq!(store.add_by_value("fq", "a:3"), vec![false]);
    assert!(store.peek("fq").map(Slot::is_multi).unwrap());
}

#[test]
fn numbers_survive_a_round_trip() {
    let mut store = ParameterStore::new();
    store.add_by_value("start", 9_007_199_254_740_993i64);
    store.add_by_value("fq", f64::NAN);
    store.add_by_value("fq", f64::NAN);
    assert_eq!(store.string(), "start=9007199254740993&fq=NaN");
}
