use pretty_assertions::assert_eq;
use rustypull::{
    Attributes, Document, DocumentStatus, EntityTable, ErrorKind, Event, ExternalId, ParseError,
    ParserConfig, PullParser,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

fn events(input: &str) -> Result<Vec<Event>, ParseError> {
    PullParser::new(input).collect()
}

fn error(input: &str) -> ParseError {
    events(input).unwrap_err()
}

fn attrs(pairs: &[(&str, &str)]) -> Attributes {
    pairs.iter().copied().collect()
}

#[test]
fn nested_elements_with_self_close() {
    assert_eq!(
        events("<r><a>1</a><b/></r>").unwrap(),
        vec![
            Event::start("r", Attributes::new()),
            Event::start("a", Attributes::new()),
            Event::text("1"),
            Event::end("a"),
            Event::start("b", Attributes::new()),
            Event::end("b"),
            Event::end("r"),
            Event::EndDocument,
        ]
    );
}

#[test]
fn attributes_keep_raw_values() {
    assert_eq!(
        events(r#"<r a="1 &amp; 2" b='x'/>"#).unwrap()[0],
        Event::start("r", attrs(&[("a", "1 &amp; 2"), ("b", "x")]))
    );
}

#[test]
fn doctype_entity_is_resolved_by_consumer() {
    let mut parser = PullParser::new(r#"<!DOCTYPE r [<!ENTITY x "hi">]><r>&x;</r>"#);
    let mut table = EntityTable::new();
    let mut raw = None;

    loop {
        match parser.pull().unwrap() {
            Event::EntityDecl(decl) => {
                assert_eq!(decl.name, "x");
                assert!(!decl.is_parameter);
                table.insert(decl.name.clone(), decl.internal_value().unwrap().to_string());
            }
            Event::Text(text) => raw = Some(text),
            Event::EndDocument => break,
            _ => {}
        }
    }

    let raw = raw.unwrap();
    assert_eq!(raw, "&x;");
    assert_eq!(parser.unnormalize(&raw, Some(&table)).unwrap(), "hi");
    assert_eq!(parser.entity_expansion_count(), 1);
}

#[test]
fn doctype_event_sequence() {
    let evs = events(r#"<!DOCTYPE r SYSTEM "r.dtd"><r/>"#).unwrap();
    assert_eq!(
        evs[0],
        Event::StartDoctype {
            name: "r".into(),
            external_id: Some(ExternalId::System {
                system: "r.dtd".into()
            }),
        }
    );
    assert_eq!(evs[1], Event::EndDoctype);
    assert!(evs[2].is_start_element());
}

#[test]
fn duplicate_attribute_is_structural() {
    let err = error(r#"<a x="1" x="2"/>"#);
    assert_eq!(err.kind, ErrorKind::Structural);
    assert!(err.message.contains("Duplicate attribute"), "{}", err.message);
}

#[test]
fn colliding_expanded_names_is_namespace_error() {
    let err = error(r#"<r xmlns:a="u" xmlns:b="u" a:foo="1" b:foo="2"/>"#);
    assert_eq!(err.kind, ErrorKind::Namespace);
    assert!(err.message.contains("\"a\""), "{}", err.message);
    assert!(err.message.contains("\"b\""), "{}", err.message);
}

#[test]
fn namespace_conflict_points_at_second_attribute() {
    let input = "<r xmlns:a=\"u\" xmlns:b=\"u\"\n   a:foo=\"1\" b:foo=\"2\"/>";
    let err = error(input);
    assert_eq!(err.kind, ErrorKind::Namespace);
    assert_eq!(err.position, input.find("b:foo").unwrap());
    assert_eq!((err.line, err.column), (2, 14));
}

#[test]
fn undefined_prefix() {
    let err = error("<a:x/>");
    assert_eq!(err.kind, ErrorKind::Namespace);
    assert_eq!(err.message, "undefined namespace prefix a");
}

#[test]
fn mismatched_end_tag_names_both() {
    let err = error("<a><b></a>");
    assert_eq!(err.kind, ErrorKind::Structural);
    assert_eq!(err.message, "Missing end tag for 'b' (got 'a')");
}

#[test]
fn missing_end_tags_report_path() {
    let err = error("<a><b>");
    assert_eq!(err.kind, ErrorKind::EndOfInput);
    assert_eq!(err.message, "Missing end tag for '/a/b'");
}

#[test]
fn error_carries_line_and_column() {
    let err = error("<r>\n  <a></b>\n</r>");
    assert_eq!((err.line, err.column), (2, 6));
    assert_eq!(
        err.to_string(),
        "structural error: Missing end tag for 'a' (got 'b') (line 2, column 6)"
    );
}

#[test]
fn expansion_bomb_is_bounded() {
    let input = concat!(
        "<!DOCTYPE bomb [",
        "<!ENTITY a \"aaaaaaaaaa\">",
        "<!ENTITY b \"&a;&a;&a;&a;&a;&a;&a;&a;&a;&a;\">",
        "<!ENTITY c \"&b;&b;&b;&b;&b;&b;&b;&b;&b;&b;\">",
        "<!ENTITY d \"&c;&c;&c;&c;&c;&c;&c;&c;&c;&c;\">",
        "<!ENTITY e \"&d;&d;&d;&d;&d;&d;&d;&d;&d;&d;\">",
        "]><bomb>&e;</bomb>"
    );
    let err = Document::parse(input).unwrap_err();
    assert_eq!(err.kind, ErrorKind::SecurityLimit);
}

#[test]
fn expansion_count_limit_configurable() {
    let input = r#"<!DOCTYPE r [<!ENTITY a "x">]><r>&a;&a;&a;</r>"#;
    let config = ParserConfig::default().with_entity_expansion_limit(2);
    let mut parser = PullParser::with_config(input, config);
    let mut table = EntityTable::new();
    table.insert("a".into(), "x".into());

    let err = parser.unnormalize("&a;&a;&a;", Some(&table)).unwrap_err();
    assert_eq!(err.kind, ErrorKind::SecurityLimit);
    assert_eq!(
        err.message,
        "number of entity expansions exceeded, processing aborted."
    );
    // The failure is latched
    assert_eq!(parser.pull().unwrap_err(), err);
}

#[test]
fn peek_twice_then_pull() {
    let mut parser = PullParser::new("<r><a/>t</r>");
    let first = parser.peek(2).unwrap().clone();
    let second = parser.peek(2).unwrap().clone();
    assert_eq!(first, second);
    assert_eq!(first, Event::end("a"));
    assert_eq!(parser.pull().unwrap(), Event::start("r", Attributes::new()));
    assert_eq!(parser.pull().unwrap(), Event::start("a", Attributes::new()));
    assert_eq!(parser.pull().unwrap(), first);
}

#[test]
fn unshift_puts_event_back() {
    let mut parser = PullParser::new("<r/>");
    let start = parser.pull().unwrap();
    parser.unshift(start.clone());
    assert_eq!(parser.pull().unwrap(), start);
    assert_eq!(parser.pull().unwrap(), Event::end("r"));
}

#[test]
fn namespace_scopes_restore() {
    let mut parser = PullParser::new(r#"<r xmlns:p="one"><c xmlns:p="two"><p:x/></c><p:y/></r>"#);

    parser.pull().unwrap();
    assert_eq!(parser.namespace_uri("p"), Some("one"));
    parser.pull().unwrap();
    assert_eq!(parser.namespace_uri("p"), Some("two"));
    assert_eq!(parser.depth(), 2);
    // p:x and its synthesized end
    parser.pull().unwrap();
    parser.pull().unwrap();
    assert_eq!(parser.depth(), 2);
    assert_eq!(parser.pull().unwrap(), Event::end("c"));
    assert_eq!(parser.namespace_uri("p"), Some("one"));
    assert_eq!(parser.depth(), 1);
}

#[test]
fn self_closed_declarations_do_not_leak() {
    let mut parser = PullParser::new(r#"<r><a xmlns:q="u"/><b/></r>"#);
    parser.pull().unwrap();
    parser.pull().unwrap();
    assert_eq!(parser.depth(), 1);
    assert_eq!(parser.namespace_uri("q"), None);
    assert_eq!(parser.pull().unwrap(), Event::end("a"));
    assert_eq!(parser.depth(), 1);
    assert!(parser.pull().unwrap().is_start_element());
}

#[test]
fn listeners_see_each_event_once() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let mut parser = PullParser::new("<r>t</r>");
    parser.add_listener(move |event: &Event| sink.borrow_mut().push(event.kind()));

    parser.peek(1).unwrap();
    let all: Vec<_> = parser.by_ref().collect::<Result<_, _>>().unwrap();

    assert_eq!(all.len(), 4);
    assert_eq!(
        *seen.borrow(),
        ["start_element", "text", "end_element", "end_document"]
    );
}

#[test]
fn status_follows_document_structure() {
    let mut parser = PullParser::new("<!DOCTYPE r [<!ELEMENT r ANY>]><r/>");
    assert_eq!(parser.status(), DocumentStatus::Prolog);
    parser.pull().unwrap();
    assert_eq!(parser.status(), DocumentStatus::InDoctypeInternalSubset);
    assert_eq!(parser.pull().unwrap(), Event::ElementDecl("<!ELEMENT r ANY".into()));
    assert_eq!(parser.pull().unwrap(), Event::EndDoctype);
    assert_eq!(parser.status(), DocumentStatus::AfterDoctype);
    parser.pull().unwrap();
    assert_eq!(parser.status(), DocumentStatus::InElement);
}

#[test]
fn utf16_input_is_decoded() {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in "<r>é</r>".encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    let parser = PullParser::from_bytes(bytes).unwrap();
    let evs: Vec<_> = parser.collect::<Result<_, _>>().unwrap();
    assert_eq!(evs[1], Event::text("é"));
}

#[test]
fn tree_round_trip_preserves_nesting() {
    let input = r#"<r><a x="1"><b>t</b></a><c/><!--n--></r>"#;
    let doc = Document::parse(input).unwrap();
    assert_eq!(doc.to_xml(), input);

    let again = Document::parse(&doc.to_xml()).unwrap();
    let shape = |d: &Document| -> Vec<(u16, String)> {
        d.descendants(0)
            .filter_map(|id| d.get_node(id))
            .map(|n| (n.depth, n.name.clone()))
            .collect()
    };
    assert_eq!(shape(&doc), shape(&again));
}

#[test]
fn has_next_until_input_drained() {
    let mut parser = PullParser::new("<r/>");
    assert!(parser.has_next());
    parser.pull().unwrap();
    // the synthesized end tag is still pending
    assert!(parser.has_next());
    parser.pull().unwrap();
    assert!(!parser.has_next());
    assert_eq!(parser.pull().unwrap(), Event::EndDocument);
}

#[test]
fn text_limit_set_on_live_parser() {
    let mut parser = PullParser::new("<r/>");
    parser.set_entity_expansion_text_limit(8);
    assert_eq!(parser.entity_expansion_text_limit(), 8);

    let mut table = EntityTable::new();
    table.insert("big".into(), "0123456789".into());
    let err = parser.unnormalize("&big;", Some(&table)).unwrap_err();
    assert_eq!(err.kind, ErrorKind::SecurityLimit);
    assert_eq!(err.message, "entity expansion has grown too large");
    assert!(parser.error().is_some());
}

#[test]
fn document_from_latin1_bytes() {
    let doc = Document::parse_bytes(b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><r>caf\xe9</r>".to_vec())
        .unwrap();
    let root = doc.root_element_id().unwrap();
    assert_eq!(doc.text(root), "café");
    assert_eq!(
        doc.declaration().and_then(|d| d.encoding.as_deref()),
        Some("ISO-8859-1")
    );
}

#[test]
fn long_run_of_bare_ampersands_parses_in_linear_time() {
    let run = "&".repeat(1_000_000);
    let input = format!("<r a=\"{run}\">{run}</r>");

    let started = Instant::now();
    let doc = Document::parse(&input).unwrap();
    assert!(started.elapsed() < Duration::from_secs(2), "{:?}", started.elapsed());

    let root = doc.root_element_id().unwrap();
    assert_eq!(doc.text(root), run);
    assert_eq!(doc.get_attribute(root, "a"), Some(run.as_str()));
}
