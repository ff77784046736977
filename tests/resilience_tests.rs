use quadbox::domain::{ConvertError, ParseError};
use quadbox::infra::write_units;
use quadbox::test_support::MemorySink;
use quadbox::{UnitFileOptions, convert_compose, convert_run_command, parse_run_command};

#[test]
fn test_sink_failure_stops_at_failing_unit() {
    let yaml = "services:\n  a:\n    image: alpine\n  b:\n    image: alpine\n  c:\n    image: alpine\n";
    let units = convert_compose(yaml, &UnitFileOptions::default()).unwrap();

    let mut sink = MemorySink::new();
    sink.set_fail_on("b.container");

    let err = write_units(&mut sink, &units).unwrap_err();
    assert!(format!("{:#}", err).contains("Mock failure on: b.container"));
    assert_eq!(sink.file_names(), vec!["a.container"]);
}

#[test]
fn test_unterminated_quote_does_not_panic() {
    let config = parse_run_command("docker run -e \"BROKEN=value nginx");
    assert!(config.image.is_empty());
    assert_eq!(config.environment, vec!["BROKEN=value nginx"]);

    let err = convert_run_command("docker run -e \"BROKEN=value nginx", &UnitFileOptions::default())
        .unwrap_err();
    assert!(matches!(err, ConvertError::Validation(_)));
}

#[test]
fn test_empty_input_reports_missing_image() {
    for input in ["", "docker", "podman run", "docker run -d --rm"] {
        let err = convert_run_command(input, &UnitFileOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "image is required", "{input:?}");
    }
}

#[test]
fn test_flag_missing_its_value_is_ignored() {
    let config = parse_run_command("docker run nginx");
    assert_eq!(config.image, "nginx");

    let config = parse_run_command("docker run --name");
    assert!(config.container_name.is_none());
    assert!(config.image.is_empty());
}

#[test]
fn test_all_port_errors_are_collected() {
    let err = convert_run_command(
        "docker run -p 0:80 -p 8080:http -p 53:53/sctp nginx",
        &UnitFileOptions::default(),
    )
    .unwrap_err();

    match err {
        ConvertError::Validation(e) => assert_eq!(e.errors().len(), 3),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_valid_port_forms_pass() {
    let input = "docker run -p 80 -p 8080:80 -p 127.0.0.1:8080:80 -p 127.0.0.1::80 \
                 -p 5353:53/udp -p 443:443/tcp nginx";
    assert!(convert_run_command(input, &UnitFileOptions::default()).is_ok());
}

#[test]
fn test_compose_errors_surface_in_order() {
    let cases: &[(&str, fn(&ParseError) -> bool)] = &[
        ("services: [", |e: &ParseError| matches!(e, ParseError::Yaml(_))),
        ("- just\n- a list\n", |e: &ParseError| matches!(e, ParseError::NotAnObject)),
        (
            "secrets:\n  token:\n    file: ./t\n",
            |e: &ParseError| matches!(e, ParseError::UnsupportedFeature(k) if k == "secrets"),
        ),
        ("version: '3'\n", |e: &ParseError| matches!(e, ParseError::MissingServices)),
        (
            "services:\n  web:\n    image: [1, 2]\n",
            |e: &ParseError| matches!(e, ParseError::InvalidService { service, .. } if service == "web"),
        ),
        (
            "services:\n  web:\n    ports: [\"80:80\"]\n",
            |e: &ParseError| matches!(e, ParseError::MissingImage { service } if service == "web"),
        ),
    ];

    for (yaml, check) in cases {
        match convert_compose(yaml, &UnitFileOptions::default()) {
            Err(ConvertError::Parse(e)) => assert!(check(&e), "{yaml:?} -> {e}"),
            other => panic!("{yaml:?} -> {other:?}"),
        }
    }
}

#[test]
fn test_unsupported_service_keys_do_not_abort() {
    let yaml = r#"
services:
  app:
    image: app:1
    deploy:
      resources:
        limits:
          cpus: "0.5"
    links:
      - db
    frobnicate: true
"#;
    let units = convert_compose(yaml, &UnitFileOptions::default()).unwrap();
    assert_eq!(units.len(), 1);
    assert!(units[0].contents.contains("Image=app:1\n"));
}
