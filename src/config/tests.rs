use super::*;

#[test]
fn defaults_resolve_without_any_source() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.addr.to_string(), "127.0.0.1:3047");
    assert_eq!(settings.server.graceful_shutdown, Duration::from_secs(30));
    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
    assert_eq!(settings.cache.capacity.get(), DEFAULT_CACHE_CAPACITY);
    assert_eq!(settings.source.timeout, Duration::from_secs(30));
    match settings.source.backend {
        SourceBackend::Google {
            docs_api_base,
            drive_api_base,
            access_token,
        } => {
            assert_eq!(docs_api_base.as_str(), "https://docs.googleapis.com/");
            assert_eq!(drive_api_base.as_str(), "https://www.googleapis.com/");
            assert!(access_token.is_none());
        }
        other => panic!("unexpected backend {other:?}"),
    }
    assert!(matches!(
        settings.assets.backend,
        AssetBackend::Filesystem { ref directory } if directory == &PathBuf::from("assets")
    ));
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());

    let overrides = ServeOverrides {
        server_port: Some(4321),
        common: CommonOverrides {
            log_level: Some("debug".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = CommonOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_common_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn directory_backends_can_be_selected() {
    let mut raw = RawSettings::default();
    raw.apply_common_overrides(&CommonOverrides {
        source_backend: Some("directory".to_string()),
        source_directory: Some(PathBuf::from("fixtures")),
        assets_backend: Some("memory".to_string()),
        ..Default::default()
    });

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(matches!(
        settings.source.backend,
        SourceBackend::Directory { ref path } if path == &PathBuf::from("fixtures")
    ));
    assert!(matches!(settings.assets.backend, AssetBackend::Memory));
}

#[test]
fn unknown_backend_names_the_key() {
    let mut raw = RawSettings::default();
    raw.source.backend = Some("dropbox".to_string());

    let err = Settings::from_raw(raw).expect_err("invalid backend");
    assert!(matches!(err, LoadError::Invalid { key: "source.backend", .. }));
}

#[test]
fn zero_cache_capacity_is_rejected() {
    let mut raw = RawSettings::default();
    raw.cache.capacity = Some(0);

    let err = Settings::from_raw(raw).expect_err("invalid capacity");
    assert!(matches!(err, LoadError::Invalid { key: "cache.capacity", .. }));
}

#[test]
fn invalid_public_base_url_is_rejected() {
    let mut raw = RawSettings::default();
    raw.assets.public_base_url = Some("not a url".to_string());

    let err = Settings::from_raw(raw).expect_err("invalid url");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "assets.public_base_url",
            ..
        }
    ));
}

#[test]
fn blank_access_token_is_treated_as_absent() {
    let mut raw = RawSettings::default();
    raw.source.access_token = Some("   ".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(matches!(
        settings.source.backend,
        SourceBackend::Google {
            access_token: None,
            ..
        }
    ));
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["docweave"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_render_arguments() {
    let args = CliArgs::parse_from([
        "docweave",
        "render",
        "1AbCdE",
        "--fresh",
        "--output",
        "out.html",
        "--source-backend",
        "directory",
    ]);

    match args.command.expect("command") {
        Command::Render(render) => {
            assert_eq!(render.id, "1AbCdE");
            assert!(render.fresh);
            assert_eq!(render.output, Some(PathBuf::from("out.html")));
            assert_eq!(render.overrides.source_backend.as_deref(), Some("directory"));
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn parse_sweep_arguments() {
    let args = CliArgs::parse_from(["docweave", "sweep", "--assets-directory", "/srv/assets"]);
    match args.command.expect("command") {
        Command::Sweep(sweep) => assert_eq!(
            sweep.overrides.assets_directory,
            Some(PathBuf::from("/srv/assets"))
        ),
        other => panic!("unexpected command {other:?}"),
    }
}
