//! End-to-end tests through the public `highlight` entry point and the
//! node matcher.

use std::collections::HashMap;

use diffmark::path::{compare_paths, PathStyle};
use diffmark::{
    highlight, parse_str, DiffMessage, Error, Format, KeyRules, NodeMatcher, ResultType,
};
use pretty_assertions::assert_eq;

fn no_rules() -> HashMap<String, Vec<String>> {
    HashMap::new()
}

fn rules(key: &str, values: &[&str]) -> HashMap<String, Vec<String>> {
    let mut map = HashMap::new();
    map.insert(
        key.to_string(),
        values.iter().map(|v| v.to_string()).collect(),
    );
    map
}

#[test]
fn plain_text_single_line_change() {
    let diffs = vec![DiffMessage::new(1, "2", "2", ResultType::Modified)];
    let out = highlight(Format::Text, &diffs, "foo\nbar", "foo\nbaz", &no_rules()).unwrap();

    assert_eq!(
        out.er.to_html(),
        "foo\n<span class=\"MODIFIED\" data-order-id=\"1\">bar</span>"
    );
    assert_eq!(
        out.ar.to_html(),
        "foo\n<span class=\"MODIFIED\" data-order-id=\"1\">baz</span>"
    );
    assert!(out.combined.is_none());
}

#[test]
fn json_missing_field_leaves_actual_object_alone() {
    let diffs = vec![DiffMessage::new(1, "/b", "", ResultType::Missed)];
    let out = highlight(
        Format::Json,
        &diffs,
        r#"{"a":1,"b":2}"#,
        r#"{"a":1}"#,
        &no_rules(),
    )
    .unwrap();

    assert!(out
        .er
        .to_html()
        .contains("<span class=\"MISSED\" data-order-id=\"1\">\"b\": 2</span>"));
    assert_eq!(out.ar.to_html(), "{\n  \"a\": 1\n}");
}

#[test]
fn json_reverse_order_insertions_land_at_origin_offsets() {
    let diffs = vec![
        DiffMessage::new(1, "/0", "parent:/", ResultType::Missed),
        DiffMessage::new(2, "/2", "parent:/", ResultType::Missed),
    ];
    let out = highlight(
        Format::Json,
        &diffs,
        r#"["p0","a0","p2","a1","a2"]"#,
        r#"["a0","a1","a2"]"#,
        &no_rules(),
    )
    .unwrap();

    let ar = out.ar.to_html();
    let values: Vec<&str> = ar.lines().skip(1).take(5).collect();
    assert_eq!(values.len(), 5);
    assert!(values[0].contains("MISSED") && values[0].contains("p0"));
    assert_eq!(values[1], "  \"a0\",");
    assert!(values[2].contains("MISSED") && values[2].contains("p2"));
    assert_eq!(values[3], "  \"a1\",");
    assert_eq!(values[4], "  \"a2\"");
}

#[test]
fn table_row_count_is_union_of_rows_and_placeholders() {
    let er = r#"{"t": {"header": ["k", "v"], "rows": [["1", "a"], ["2", "b"], ["3", "c"]]}}"#;
    let ar = r#"{"t": {"header": ["k", "v"], "rows": [["1", "a"], ["3", "c"], ["4", "d"]]}}"#;
    let diffs = vec![
        DiffMessage::new(1, "t:1,-1", "parent:t", ResultType::Missed),
        DiffMessage::new(2, "parent:t", "t:2,-1", ResultType::Extra),
    ];
    let out = highlight(Format::Table, &diffs, er, ar, &no_rules()).unwrap();

    // Header row plus four data rows on each side.
    assert_eq!(out.er.to_html().matches("<tr").count(), 5);
    assert_eq!(out.ar.to_html().matches("<tr").count(), 5);
    assert!(out
        .ar
        .to_html()
        .contains("<tr class=\"MISSED\" data-order-id=\"1\"><td></td><td></td></tr>"));
    assert!(out
        .er
        .to_html()
        .contains("<tr class=\"EXTRA\" data-order-id=\"2\"><td></td><td></td></tr>"));
    assert!(out.combined.unwrap().contains("<td colspan=\"2\">ar</td>"));
}

#[test]
fn table_name_mismatch_is_reported() {
    let doc = r#"{"t": {"header": ["k"], "rows": [["1"]]}}"#;
    let diffs = vec![DiffMessage::new(1, "other:0,0", "other:0,0", ResultType::Modified)];
    let result = highlight(Format::Table, &diffs, doc, doc, &no_rules());
    assert!(matches!(result, Err(Error::Comparator(_))));
}

#[test]
fn xml_missed_element_is_mirrored_into_actual() {
    let diffs = vec![DiffMessage::new(5, "/r/b", "parent:/r", ResultType::Missed)
        .with_description("b is missing")];
    let out = highlight(
        Format::Xml,
        &diffs,
        "<r><a>1</a><b>2</b></r>",
        "<r><a>1</a></r>",
        &no_rules(),
    )
    .unwrap();

    let er = out.er.as_tree().unwrap();
    let ar = out.ar.as_tree().unwrap();
    assert_eq!(er.row_count(), ar.row_count());
    assert_eq!(er.to_html(), ar.to_html());
    let row = ar.row(3).unwrap();
    assert_eq!(row.validation_status, ResultType::Missed);
    assert!(row.value.contains("title=\"b is missing\""));
    assert!(row.value.contains("data-order-id=\"5\""));
}

#[test]
fn empty_inputs_render_for_every_format() {
    for format in [
        Format::Xml,
        Format::Json,
        Format::Table,
        Format::Text,
        Format::FullText,
    ] {
        let out = highlight(format, &[], "", "", &no_rules()).unwrap();
        assert_eq!(out.er.to_html(), "", "{format}");
        assert_eq!(out.ar.to_html(), "", "{format}");
    }
}

#[test]
fn malformed_documents_are_fatal() {
    assert!(highlight(Format::Xml, &[], "<a>", "<a/>", &no_rules()).is_err());
    assert!(highlight(Format::Json, &[], "{", "{}", &no_rules()).is_err());
    assert!(highlight(Format::Table, &[], "[1]", "{}", &no_rules()).is_err());
}

#[test]
fn configuration_errors_come_before_parsing() {
    let bad_regex = rules("replace", &["(==x"]);
    assert!(matches!(
        highlight(Format::Xml, &[], "<a>", "", &bad_regex),
        Err(Error::Regex(_))
    ));

    let bad_sort = rules("sort", &["a/b"]);
    assert!(matches!(
        highlight(Format::Xml, &[], "<a>", "", &bad_sort),
        Err(Error::Config(_))
    ));
}

#[test]
fn replace_rules_run_before_parsing() {
    let map = rules("replace", &[r"\d{4}-\d{2}-\d{2}==DATE"]);
    let out = highlight(
        Format::Text,
        &[],
        "run 2024-01-01",
        "run 2025-02-02",
        &map,
    )
    .unwrap();
    assert_eq!(out.er.to_html(), "run DATE");
    assert_eq!(out.ar.to_html(), "run DATE");
}

#[test]
fn excluded_paths_are_not_marked() {
    let map = rules("exclude-path", &["/r/ts"]);
    let diffs = vec![
        DiffMessage::new(1, "/r/ts/text()", "/r/ts/text()", ResultType::Modified),
        DiffMessage::new(2, "/r/v/text()", "/r/v/text()", ResultType::Modified),
    ];
    let out = highlight(
        Format::Xml,
        &diffs,
        "<r><ts>1</ts><v>a</v></r>",
        "<r><ts>2</ts><v>b</v></r>",
        &map,
    )
    .unwrap();
    let html = out.er.to_html();
    assert!(!html.contains("data-order-id=\"1\""));
    assert!(html.contains("data-order-id=\"2\""));
}

#[test]
fn skipped_and_identical_results_are_never_rendered() {
    let diffs = vec![
        DiffMessage::new(1, "1", "1", ResultType::Skipped),
        DiffMessage::new(2, "1", "1", ResultType::Identical),
    ];
    let out = highlight(Format::Text, &diffs, "x", "x", &no_rules()).unwrap();
    assert_eq!(out.er.to_html(), "x");
    assert_eq!(out.ar.to_html(), "x");
}

#[test]
fn format_names_round_trip() {
    assert_eq!("full-text".parse::<Format>().unwrap(), Format::FullText);
    assert_eq!(Format::Table.to_string(), "table");
    assert!("yaml".parse::<Format>().is_err());
}

#[test]
fn rendered_output_serializes_as_json() {
    let diffs = vec![DiffMessage::new(1, "/a", "/a", ResultType::Modified)];
    let out = highlight(Format::Json, &diffs, r#"{"a":1}"#, r#"{"a":2}"#, &no_rules()).unwrap();
    let value = serde_json::to_value(&out).unwrap();
    assert!(value["er"]["html"].as_str().unwrap().contains("MODIFIED"));
    assert!(value.get("combined").is_none());

    let text = highlight(Format::Text, &[], "x", "y", &no_rules()).unwrap();
    let value = serde_json::to_value(&text).unwrap();
    assert!(value["ar"]["tree"].is_object());
}

#[test]
fn segment_sort_is_numeric_and_idempotent() {
    let mut paths = vec!["/a/10", "/a/9", "/a", "/a/9/b", "/b"];
    paths.sort_by(|a, b| compare_paths(a, b, PathStyle::Json));
    assert_eq!(paths, vec!["/a", "/a/9", "/a/9/b", "/a/10", "/b"]);

    let again = {
        let mut p = paths.clone();
        p.sort_by(|a, b| compare_paths(a, b, PathStyle::Json));
        p
    };
    assert_eq!(again, paths);
}

#[test]
fn key_rule_pairs_records_regardless_of_order() {
    let control = parse_str(r#"<list><item id="A">1</item><item id="B">2</item></list>"#).unwrap();
    let test = parse_str(r#"<list><item id="B">2</item><item id="A">1</item></list>"#).unwrap();
    let key_rules = KeyRules::from_map(&rules("item", &["@id"])).unwrap();
    let matcher = NodeMatcher::with_key_rules(key_rules);

    let control_list = control.children(control.root())[0];
    let test_list = test.children(test.root())[0];
    let pairs = matcher.match_children(&control, control_list, &test, test_list);

    let ids: Vec<(&str, &str)> = pairs
        .iter()
        .map(|(c, t)| {
            (
                control.element(*c).unwrap().attribute("id").unwrap(),
                test.element(*t).unwrap().attribute("id").unwrap(),
            )
        })
        .collect();
    assert_eq!(ids, vec![("A", "A"), ("B", "B")]);
}
