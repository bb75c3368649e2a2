use kdl_relaxed::{
    parse, parse_reader_with_options, parse_with_options, to_string, to_string_with_options,
    Document, Error, ErrorKind, Node, Number, ParseOptions, Relaxed, Scanner, ScanErrorKind,
    TokenKind, Value, ValueFlag, WriteOptions,
};
use std::io::Cursor;

fn relaxed(input: &str, relaxed: Relaxed) -> Document {
    let options = ParseOptions::new().with_relaxed(relaxed);
    parse_with_options(input.as_bytes(), &options).unwrap()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

#[test]
fn test_string_argument() {
    let doc = parse("name \"Bob\"").unwrap();
    assert_eq!(doc.len(), 1);
    let node = &doc.nodes()[0];
    assert_eq!(node.name().as_str(), Some("name"));
    assert_eq!(node.arguments().len(), 1);
    assert_eq!(node.arguments()[0].as_str(), Some("Bob"));
}

#[test]
fn test_properties_in_order() {
    let doc = parse("point x=1 y=2").unwrap();
    let node = &doc.nodes()[0];
    assert!(node.arguments().is_empty());
    let props: Vec<_> = node
        .properties()
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_i64()))
        .collect();
    assert_eq!(props, [("x", Some(1)), ("y", Some(2))]);
}

#[test]
fn test_child_block() {
    let doc = parse("parent { child }").unwrap();
    assert_eq!(doc.len(), 1);
    let parent = &doc.nodes()[0];
    assert_eq!(parent.name().as_str(), Some("parent"));
    assert!(parent.arguments().is_empty());
    assert_eq!(parent.children().len(), 1);
    let child = &parent.children()[0];
    assert_eq!(child.name().as_str(), Some("child"));
    assert!(child.arguments().is_empty());
    assert!(child.children().is_empty());
}

#[test]
fn test_hexadecimal_is_preserved() {
    let doc = parse("n 0xFF").unwrap();
    let value = &doc.nodes()[0].arguments()[0];
    assert_eq!(value.as_i64(), Some(255));
    assert_eq!(value.flag(), ValueFlag::Hexadecimal);
    assert_eq!(to_string(&doc).unwrap(), "n 0xff\n");
}

#[test]
fn test_slashdash_node() {
    let doc = parse("/-foo 1\nbar 2").unwrap();
    assert_eq!(doc.len(), 1);
    let bar = &doc.nodes()[0];
    assert_eq!(bar.name().as_str(), Some("bar"));
    assert_eq!(bar.arguments()[0].as_i64(), Some(2));
}

#[test]
fn test_repeated_property_keeps_first_position() {
    let doc = parse("node a=1 b=2 a=3").unwrap();
    let node = &doc.nodes()[0];
    assert_eq!(node.properties().len(), 2);
    let keys: Vec<_> = node.properties().keys().cloned().collect();
    assert_eq!(keys, ["a", "b"]);
    assert_eq!(node.get("a").and_then(Value::as_i64), Some(3));
    assert_eq!(to_string(&doc).unwrap(), "node a=3 b=2\n");
}

#[test]
fn test_slashdash_argument() {
    let doc = parse("foo /-\"ignored\" \"kept\"").unwrap();
    let args = doc.nodes()[0].arguments();
    assert_eq!(args.len(), 1);
    assert_eq!(args[0].as_str(), Some("kept"));
}

#[test]
fn test_big_numbers_are_lossless() {
    let doc = parse("big -18446744073709551617 0x1_0000_0000_0000_0000 1.5e400").unwrap();
    let args = doc.nodes()[0].arguments();
    assert!(matches!(args[0].as_number(), Some(Number::BigInt(_))));
    assert!(matches!(args[1].as_number(), Some(Number::BigInt(_))));
    assert!(matches!(args[2].as_number(), Some(Number::BigDecimal(_))));
    assert_eq!(args[0].as_i64(), None);

    let out = to_string(&doc).unwrap();
    assert_eq!(
        out,
        "big -18446744073709551617 0x10000000000000000 1.5E+400\n"
    );
    assert_eq!(parse(&out).unwrap(), doc);
}

#[test]
fn test_round_trip_is_a_fixed_point() {
    let input = "\
title \"Config\" version=2
(u8)flags 0b1010 0o17 0xdead_beef
server \"main\" port=8080 enabled=true ratio=0.75 {
    listen r#\"0.0.0.0:\"8080\"\"#
    empty null
    \"quoted name\" (tag)\"value\"
}
";
    let doc = parse(input).unwrap();
    let once = to_string(&doc).unwrap();
    let twice = to_string(&parse(&once).unwrap()).unwrap();
    assert_eq!(once, twice);
    assert!(once.contains("0b1010 0o17 0xdeadbeef"));
    assert!(once.contains("\tlisten \"0.0.0.0:\\\"8080\\\"\"\n"));
    assert!(once.contains("\t\"quoted name\" (tag)\"value\"\n"));
}

#[test]
fn test_nginx_dialect() {
    let input = "location / {\n\t# comment\n\troot /var/www/html;\n}";
    let doc = relaxed(input, Relaxed::NGINX_SYNTAX);
    let options = WriteOptions::new().with_indent("    ");
    assert_eq!(
        to_string_with_options(&doc, &options).unwrap(),
        "location \"/\" {\n    root \"/var/www/html\"\n}\n"
    );
}

#[test]
fn test_nginx_directives() {
    let input = "\
server {
    listen 80 default_server;
    server_name example.com www.example.com;
    location ~ \\.php$ {
        try_files $uri $uri/ /index.php;
    }
}
";
    let doc = relaxed(input, Relaxed::NGINX_SYNTAX);
    let server = &doc.nodes()[0];
    let listen = server.child("listen").unwrap();
    assert_eq!(listen.arguments()[0].as_i64(), Some(80));
    assert_eq!(listen.arguments()[1].as_str(), Some("default_server"));
    assert_eq!(server.child("server_name").unwrap().arguments().len(), 2);
    let location = server.child("location").unwrap();
    assert_eq!(location.arguments()[1].as_str(), Some("\\.php$"));
    assert_eq!(location.children()[0].arguments().len(), 3);
}

#[test]
fn test_yaml_toml_dialect() {
    let input = "yaml-like: 1234\ntoml-like=1234\ntoml-like-2 = 5678";
    let doc = relaxed(input, Relaxed::YAML_TOML_ASSIGNMENTS);
    let nodes: Vec<_> = doc
        .iter()
        .map(|n| (n.name().value_string(), n.arguments()[0].as_i64()))
        .collect();
    assert_eq!(
        nodes,
        [
            ("yaml-like".to_string(), Some(1234)),
            ("toml-like".to_string(), Some(1234)),
            ("toml-like-2".to_string(), Some(5678)),
        ]
    );

    let options = WriteOptions::new().with_add_colons(true);
    assert_eq!(
        to_string_with_options(&doc, &options).unwrap(),
        "yaml-like: 1234\ntoml-like: 1234\ntoml-like-2: 5678\n"
    );
}

#[test]
fn test_multiplier_suffixes() {
    let doc = relaxed(
        "limits memory=512Mb burst=2k\ntimeout 1h30m",
        Relaxed::MULTIPLIER_SUFFIXES,
    );
    let limits = &doc.nodes()[0];
    let memory = limits.get("memory").and_then(Value::as_suffixed).unwrap();
    assert_eq!(memory.as_number().unwrap(), Number::Integer(512 << 20));
    let burst = limits.get("burst").and_then(Value::as_suffixed).unwrap();
    assert_eq!(burst.as_number().unwrap(), Number::Integer(2_000));

    let timeout = doc.nodes()[1].arguments()[0].as_suffixed().unwrap();
    assert_eq!(timeout.as_duration().unwrap(), chrono::Duration::minutes(90));

    assert_eq!(
        to_string(&doc).unwrap(),
        "limits memory=512Mb burst=2k\ntimeout 1h30m\n"
    );
    assert!(parse("timeout 1h30m").is_err());
}

#[test]
fn test_comments_round_trip() {
    let input = "\
// Server configuration

// primary listener
server \"main\" port=8080 {
\t// transport
\ttls true // required

\t// trailing note
}
// end of file
";
    let options = ParseOptions::new().with_parse_comments(true);
    let doc = parse_with_options(input.as_bytes(), &options).unwrap();
    assert_eq!(to_string(&doc).unwrap(), input);

    let plain = parse(input).unwrap();
    assert_eq!(
        to_string(&plain).unwrap(),
        "server \"main\" port=8080 {\n\ttls true\n}\n"
    );
}

#[test]
fn test_blank_lines_between_plain_nodes_are_dropped() {
    let options = ParseOptions::new().with_parse_comments(true);
    let doc = parse_with_options(b"a\n\n\nb\n", &options).unwrap();
    assert_eq!(to_string(&doc).unwrap(), "a\nb\n");
}

#[test]
fn test_scan_error_snippet() {
    let err = parse("node 1\nnode \"bad\" <").unwrap_err();
    match &err {
        Error::Scan { kind, position, .. } => {
            assert_eq!(*kind, ScanErrorKind::UnexpectedCharacter('<'));
            assert_eq!((position.line, position.column), (2, 12));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(err.snippet(), Some("node \"bad\" <\n           ^"));
    assert!(err.to_string().contains("line 2, column 12"));
}

#[test]
fn test_parse_error_snippet() {
    let err = parse("a {\n\tb 1\n").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Grammar);
    assert!(err.to_string().contains("unexpected EOF in state Children"));
    assert_eq!(err.position().map(|p| p.line), Some(3));
}

#[test]
fn test_long_line_snippet_is_elided() {
    let input = format!("long \"{}\" <", "x".repeat(70));
    let err = parse(&input).unwrap_err();
    let snippet = err.snippet().unwrap();
    assert!(snippet.starts_with("..."));
    assert!(snippet.ends_with(&format!("\n{}^", " ".repeat(63))));
    let line = snippet.lines().next().unwrap();
    assert_eq!(line.chars().nth(63), Some('<'));
}

#[test]
fn test_value_errors() {
    let err = parse("a \"\\u{d800}\"").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Value);
    assert_eq!(err.position().map(|p| p.column), Some(3));
    assert_eq!(err.snippet(), Some("a \"\\u{d800}\"\n  ^"));
    assert!(err.to_string().ends_with("at line 1, column 3\na \"\\u{d800}\"\n  ^"));
}

#[test]
fn test_plain_decimal_underflow_is_lossless() {
    let literal = format!("0.{}1", "0".repeat(400));
    let doc = parse(&format!("n {literal}")).unwrap();
    let value = &doc.nodes()[0].arguments()[0];
    assert!(matches!(value.as_number(), Some(Number::BigDecimal(_))));
    assert_eq!(to_string(&doc).unwrap(), "n 1E-401\n");
}

#[test]
fn test_streaming_with_small_buffer() {
    init_tracing();
    let mut input = String::new();
    for i in 0..200 {
        input.push_str(&format!(
            "node{i} \"value {i}\" r#\"raw {i}\"# count={i} /* skipped */ {{ leaf 0x{i:x} }}\n"
        ));
    }

    let mut slice = Scanner::from_slice(input.as_bytes(), Relaxed::STRICT);
    let mut stream = Scanner::with_capacity(Cursor::new(input.as_bytes()), 16, Relaxed::STRICT);
    loop {
        let expected = slice.next_token().unwrap();
        let actual = stream.next_token().unwrap();
        assert_eq!(actual.kind, expected.kind);
        assert_eq!(actual.bytes(), expected.bytes());
        assert_eq!(actual.offset, expected.offset);
        if expected.kind == TokenKind::Eof {
            break;
        }
    }

    let options = ParseOptions::new().with_buffer_size(16);
    let doc = parse_reader_with_options(Cursor::new(input.as_bytes()), &options).unwrap();
    assert_eq!(doc.len(), 200);
    assert_eq!(doc, parse(&input).unwrap());
}

#[test]
fn test_json_dump() {
    let doc = parse("server \"main\" port=8080 { (path)root \"/srv\" }").unwrap();
    let json = serde_json::to_value(&doc).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{
            "name": "server",
            "type": null,
            "arguments": ["main"],
            "properties": { "port": 8080 },
            "children": [{
                "name": "root",
                "type": "path",
                "arguments": ["/srv"],
                "properties": {},
                "children": []
            }]
        }])
    );
}

#[test]
fn test_built_documents_serialize() {
    let mut node = Node::new("build");
    node.add_argument(Value::from(7).with_flag(ValueFlag::Octal));
    node.add_property("name", "two words");
    node.add_child(Node::new("step").with_argument(1.5));
    let doc: Document = vec![node].into();

    let out = to_string(&doc).unwrap();
    assert_eq!(out, "build 0o7 name=\"two words\" {\n\tstep 1.5\n}\n");
    assert_eq!(parse(&out).unwrap().nodes()[0].children().len(), 1);
}

#[test]
fn test_built_values_read_back() {
    let negative_big: num_bigint::BigInt = "-18446744073709551617".parse().unwrap();
    let doc: Document = vec![
        Node::new(5),
        Node::new(true).with_argument(Value::default()),
        Node::new(Value::default()),
        Node::new("n")
            .with_argument(Value::from(-255).with_flag(ValueFlag::Hexadecimal))
            .with_argument(Value::from(-8).with_flag(ValueFlag::Octal))
            .with_argument(Value::from(-5).with_flag(ValueFlag::Binary))
            .with_argument(Value::from(negative_big).with_flag(ValueFlag::Hexadecimal))
            .with_argument(Value::from(255).with_flag(ValueFlag::Hexadecimal)),
    ]
    .into();

    let out = to_string(&doc).unwrap();
    assert_eq!(
        out,
        "\"5\"\n\"true\" null\n\"null\"\nn -255 -8 -5 -18446744073709551617 0xff\n"
    );
    let reparsed = parse(&out).unwrap();
    assert_eq!(reparsed.nodes()[0].name().as_str(), Some("5"));
    assert_eq!(reparsed.nodes()[3].arguments()[0].as_i64(), Some(-255));
    assert_eq!(to_string(&reparsed).unwrap(), out);
}
