//! Integration tests for matching parsed queries against JSON records.

use serde_json::{Value, json};
use xlucene::error::Result;
use xlucene::matcher::{DocumentMatcher, compile};
use xlucene::parser::{Variables, parse};
use xlucene::types::{FieldType, TypeConfig};

fn type_config() -> TypeConfig {
    TypeConfig::new()
        .with_field("name", FieldType::String)
        .with_field("age", FieldType::Integer)
        .with_field("score", FieldType::Float)
        .with_field("active", FieldType::Boolean)
        .with_field("created", FieldType::Date)
        .with_field("ip", FieldType::Ip)
        .with_field("location", FieldType::GeoPoint)
        .with_field("area", FieldType::GeoJson)
        .with_field("bio", FieldType::String)
}

fn matcher(query: &str) -> Result<DocumentMatcher> {
    Ok(DocumentMatcher::new(&parse(query, &type_config(), &Variables::new())?))
}

fn people() -> Vec<Value> {
    vec![
        json!({"name": "bob", "age": 30, "active": true, "ip": "192.168.1.10",
               "created": "2021-03-01T10:00:00Z", "location": "33.41,-111.8",
               "bio": "Likes hiking and Rust"}),
        json!({"name": "alice", "age": 17, "active": false, "ip": "10.0.0.1",
               "created": "2019-12-31T23:59:59Z", "location": {"lat": 40.0, "lon": -100.0}}),
        json!({"name": ["carol", "caroline"], "age": 45, "score": 9.5}),
    ]
}

fn names(query: &str) -> Result<Vec<String>> {
    let matcher = matcher(query)?;
    Ok(people()
        .iter()
        .filter(|record| matcher.matches(record))
        .map(|record| match &record["name"] {
            Value::Array(items) => items[0].as_str().unwrap_or_default().to_string(),
            other => other.as_str().unwrap_or_default().to_string(),
        })
        .collect())
}

#[test]
fn test_conjunction() -> Result<()> {
    let config = TypeConfig::new()
        .with_field("a", FieldType::Integer)
        .with_field("b", FieldType::Integer);
    let matcher = DocumentMatcher::new(&parse("a:1 AND b:1", &config, &Variables::new())?);

    assert!(matcher.matches(&json!({"a": 1, "b": 1})));
    assert!(!matcher.matches(&json!({"a": 1, "b": 2})));
    assert!(!matcher.matches(&json!({"a": 1})));
    Ok(())
}

#[test]
fn test_boolean_logic() -> Result<()> {
    assert_eq!(names("name:bob OR name:alice")?, vec!["bob", "alice"]);
    assert_eq!(names("age:>20 AND NOT name:bob")?, vec!["carol"]);
    assert_eq!(names("NOT active:true")?, vec!["alice", "carol"]);
    assert_eq!(names("(name:bob OR age:45) AND _exists_:score")?, vec!["carol"]);
    Ok(())
}

#[test]
fn test_juxtaposed_negation() -> Result<()> {
    // no implicit AND: a bare NOT clause is its own OR branch
    let loose = matcher("name:bob NOT age:30")?;
    assert!(loose.matches(&json!({})));
    assert!(loose.matches(&json!({"name": "alice"})));
    assert!(!loose.matches(&json!({"age": 30})));

    let strict = matcher("name:bob AND NOT age:30")?;
    assert!(!strict.matches(&json!({})));
    assert!(strict.matches(&json!({"name": "bob", "age": 31})));
    assert!(!strict.matches(&people()[0]));
    Ok(())
}

#[test]
fn test_fractional_bound_on_integer_field() -> Result<()> {
    assert_eq!(names("age:>=29.5")?, vec!["bob", "carol"]);
    assert_eq!(names("age:[16.5 TO 17.5]")?, vec!["alice"]);
    Ok(())
}

#[test]
fn test_array_values_match_any_element() -> Result<()> {
    assert_eq!(names("name:caroline")?, vec!["carol"]);
    assert_eq!(names("name:car*")?, vec!["carol"]);
    Ok(())
}

#[test]
fn test_numeric_ranges() -> Result<()> {
    assert_eq!(names("age:[17 TO 30]")?, vec!["bob", "alice"]);
    assert_eq!(names("age:{17 TO 30]")?, vec!["bob"]);
    assert_eq!(names("age:>=45")?, vec!["carol"]);
    assert_eq!(names("score:[9 TO *]")?, vec!["carol"]);
    Ok(())
}

#[test]
fn test_date_ranges() -> Result<()> {
    assert_eq!(names("created:[\"2020-01-01\" TO *]")?, vec!["bob"]);
    assert_eq!(names("created:<\"2020-01-01\"")?, vec!["alice"]);
    assert_eq!(names("created:\"2021-03-01T10:00:00Z\"")?, vec!["bob"]);
    Ok(())
}

#[test]
fn test_ip_terms_and_ranges() -> Result<()> {
    assert_eq!(names("ip:\"192.168.0.0/16\"")?, vec!["bob"]);
    assert_eq!(names("ip:\"10.0.0.1\"")?, vec!["alice"]);
    assert_eq!(names("ip:[\"10.0.0.0\" TO \"10.255.255.255\"]")?, vec!["alice"]);
    Ok(())
}

#[test]
fn test_patterns_and_exists() -> Result<()> {
    assert_eq!(names("name:/b.b/")?, vec!["bob"]);
    assert_eq!(names("name:?lice")?, vec!["alice"]);
    assert_eq!(names("_exists_:ip")?, vec!["bob", "alice"]);
    Ok(())
}

#[test]
fn test_tokenized_sub_field() -> Result<()> {
    assert_eq!(names("bio.word:rust")?, vec!["bob"]);
    assert!(names("bio.word:python")?.is_empty());
    Ok(())
}

#[test]
fn test_geo_functions() -> Result<()> {
    assert_eq!(
        names("location:geoDistance(point:\"33.4,-111.8\" distance:5000m)")?,
        vec!["bob"]
    );
    assert_eq!(
        names("location:geoBox(top_left:\"41,-101\" bottom_right:\"39,-99\")")?,
        vec!["alice"]
    );
    assert_eq!(
        names("location:(_geo_point_:\"40,-100\" _geo_distance_:10km)")?,
        vec!["alice"]
    );
    Ok(())
}

#[test]
fn test_geo_shape_records() -> Result<()> {
    let matcher = matcher("area:geoContainsPoint(point:\"5,5\")")?;
    let square = json!({"area": {"type": "Polygon", "coordinates": [
        [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]]
    ]}});
    assert!(matcher.matches(&square));
    assert!(!matcher.matches(&json!({"area": {"type": "Point", "coordinates": [50.0, 50.0]}})));
    Ok(())
}

#[test]
fn test_unsupported_nodes_never_match() -> Result<()> {
    let matcher = matcher("location:somewhere OR name:bob")?;
    assert!(!matcher.is_complete());
    assert_eq!(matcher.unsupported().len(), 1);
    assert!(matcher.unsupported()[0].starts_with("term on location"));

    // the rest of the query is still evaluated
    assert!(matcher.matches(&people()[0]));
    assert!(!matcher.matches(&people()[1]));
    Ok(())
}

#[test]
fn test_empty_query_matches_everything() -> Result<()> {
    let matcher = matcher("")?;
    assert!(matcher.is_complete());
    assert!(people().iter().all(|record| matcher.matches(record)));
    assert!(matcher.matches(&json!({})));
    Ok(())
}

#[test]
fn test_predicate_is_shareable() -> Result<()> {
    let ast = parse("age:>18", &type_config(), &Variables::new())?;
    let predicate = compile(&ast);

    let records = people();
    let adults = std::thread::scope(|scope| {
        let handle = scope.spawn(|| records.iter().filter(|r| predicate(*r)).count());
        handle.join().unwrap()
    });
    assert_eq!(adults, 2);
    Ok(())
}
