mod path_codec_tests {
    use crate::error::StashError;
    use crate::path_codec::{MAX_DEPTH, StashPath, contains, delete, get, set};
    use crate::stash_value::{Document, StashValue, document_depth, document_from_json};
    use serde_json::json;

    fn path(raw: &str) -> StashPath {
        StashPath::parse(raw).unwrap()
    }

    fn deep_key(depth: usize) -> String {
        vec!["n"; depth].join("/")
    }

    fn sample_doc() -> Document {
        document_from_json(json!({
            "name": "Alice",
            "nothing": null,
            "profile": {
                "bio": "Developer",
                "settings": { "theme": "dark", "level": 3 }
            }
        }))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Path parsing
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_parse_splits_on_slash() {
        let p = path("sports/baseball/stats");
        let segments: Vec<&str> = p.segments().iter().map(|s| s.as_str()).collect();
        assert_eq!(segments, vec!["sports", "baseball", "stats"]);
        assert_eq!(p.len(), 3);
        assert_eq!(p.to_string(), "sports/baseball/stats");
    }

    #[test]
    fn test_parse_trims_whole_key_only() {
        let p = path("  a/ b  ");
        let segments: Vec<&str> = p.segments().iter().map(|s| s.as_str()).collect();
        assert_eq!(segments, vec!["a", " b"]);
    }

    #[test]
    fn test_parse_rejects_empty_and_blank() {
        assert!(matches!(StashPath::parse(""), Err(StashError::InvalidPath(_))));
        assert!(matches!(StashPath::parse("   "), Err(StashError::InvalidPath(_))));
    }

    #[test]
    fn test_parse_rejects_empty_segments() {
        for raw in ["a//b", "/a", "a/", "/"] {
            assert!(
                matches!(StashPath::parse(raw), Err(StashError::InvalidPath(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_accepts_max_depth_and_rejects_deeper() {
        assert_eq!(path(&deep_key(MAX_DEPTH)).len(), MAX_DEPTH);
        assert!(matches!(
            StashPath::parse(&deep_key(MAX_DEPTH + 1)),
            Err(StashError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_from_str() {
        let p: StashPath = "a/b".parse().unwrap();
        assert_eq!(p, path("a/b"));
    }

    // ═══════════════════════════════════════════════════════════════════════
    // get
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_get_top_level_and_nested() {
        let doc = sample_doc();
        assert_eq!(get(&doc, &path("name")), Some(&StashValue::from("Alice")));
        assert_eq!(
            get(&doc, &path("profile/settings/level")).and_then(StashValue::as_i64),
            Some(3)
        );
        let settings = get(&doc, &path("profile/settings")).and_then(StashValue::as_object);
        assert_eq!(settings.map(|m| m.len()), Some(2));
    }

    #[test]
    fn test_get_distinguishes_null_from_absent() {
        let doc = sample_doc();
        assert_eq!(get(&doc, &path("nothing")), Some(&StashValue::Null));
        assert_eq!(get(&doc, &path("missing")), None);
        assert!(contains(&doc, &path("nothing")));
        assert!(!contains(&doc, &path("missing")));
    }

    #[test]
    fn test_get_missing_intermediate_is_not_found() {
        let doc = sample_doc();
        assert_eq!(get(&doc, &path("profile/missing/theme")), None);
    }

    #[test]
    fn test_get_through_terminal_is_not_found() {
        let doc = sample_doc();
        assert_eq!(get(&doc, &path("name/first")), None);
        assert_eq!(get(&doc, &path("nothing/x")), None);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // set
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_set_then_get_returns_value() {
        let mut doc = sample_doc();
        let p = path("profile/settings/theme");
        set(&mut doc, &p, StashValue::from("light")).unwrap();
        assert_eq!(get(&doc, &p), Some(&StashValue::from("light")));
        // Sibling untouched.
        assert_eq!(
            get(&doc, &path("profile/settings/level")).and_then(StashValue::as_i64),
            Some(3)
        );
    }

    #[test]
    fn test_set_creates_intermediates() {
        let mut doc = Document::new();
        set(&mut doc, &path("a/b/c"), StashValue::from(5i64)).unwrap();

        assert_eq!(get(&doc, &path("a/b/c")), Some(&StashValue::from(5i64)));
        let expected = StashValue::Object(document_from_json(json!({"c": 5})));
        assert_eq!(get(&doc, &path("a/b")), Some(&expected));
    }

    #[test]
    fn test_set_overwrites_nested_with_scalar() {
        let mut doc = sample_doc();
        set(&mut doc, &path("profile"), StashValue::from(true)).unwrap();
        assert_eq!(get(&doc, &path("profile")), Some(&StashValue::from(true)));
        assert_eq!(get(&doc, &path("profile/bio")), None);
    }

    #[test]
    fn test_set_explicit_null() {
        let mut doc = Document::new();
        set(&mut doc, &path("x/y"), StashValue::Null).unwrap();
        assert_eq!(get(&doc, &path("x/y")), Some(&StashValue::Null));
    }

    #[test]
    fn test_set_through_terminal_is_type_mismatch() {
        let mut doc = sample_doc();
        let before = doc.clone();
        let err = set(&mut doc, &path("profile/bio/short"), StashValue::from("dev")).unwrap_err();
        match err {
            StashError::TypeMismatch { path, expected, found } => {
                assert_eq!(path, "profile/bio");
                assert_eq!(expected, "object");
                assert_eq!(found, "string");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(doc, before);
    }

    #[test]
    fn test_set_at_max_depth() {
        let mut doc = Document::new();
        set(&mut doc, &path(&deep_key(MAX_DEPTH)), StashValue::from(1i64)).unwrap();
        assert_eq!(document_depth(&doc), MAX_DEPTH);
        assert_eq!(get(&doc, &path(&deep_key(MAX_DEPTH))), Some(&StashValue::from(1i64)));
    }

    #[test]
    fn test_set_nested_value_past_max_depth_is_refused() {
        let mut doc = sample_doc();
        let before = doc.clone();
        let short = path(&deep_key(MAX_DEPTH - 1));

        // An empty object adds one level: exactly at the limit.
        let mut at_limit = doc.clone();
        set(&mut at_limit, &short, StashValue::from(json!({}))).unwrap();
        assert_eq!(document_depth(&at_limit), MAX_DEPTH);

        let err = set(&mut doc, &short, StashValue::from(json!({"x": 1}))).unwrap_err();
        match err {
            StashError::TooDeep { depth, limit, .. } => {
                assert_eq!(depth, MAX_DEPTH + 1);
                assert_eq!(limit, MAX_DEPTH);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(doc, before);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // delete
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_delete_returns_removed_value() {
        let mut doc = sample_doc();
        let removed = delete(&mut doc, &path("profile/settings/theme")).unwrap();
        assert_eq!(removed, Some(StashValue::from("dark")));
        assert_eq!(get(&doc, &path("profile/settings/theme")), None);
        // Parent survives, now with one key.
        let settings = get(&doc, &path("profile/settings")).and_then(StashValue::as_object);
        assert_eq!(settings.map(|m| m.len()), Some(1));
    }

    #[test]
    fn test_delete_missing_intermediate_leaves_doc_unchanged() {
        let mut doc = sample_doc();
        let before = doc.clone();
        assert_eq!(delete(&mut doc, &path("profile/nope/theme")).unwrap(), None);
        assert_eq!(delete(&mut doc, &path("absent")).unwrap(), None);
        assert_eq!(doc, before);
    }

    #[test]
    fn test_delete_through_terminal_is_type_mismatch() {
        let mut doc = sample_doc();
        let err = delete(&mut doc, &path("name/first")).unwrap_err();
        assert!(matches!(err, StashError::TypeMismatch { found: "string", .. }));
    }

    #[test]
    fn test_delete_explicit_null_returns_null() {
        let mut doc = sample_doc();
        assert_eq!(delete(&mut doc, &path("nothing")).unwrap(), Some(StashValue::Null));
        assert!(!contains(&doc, &path("nothing")));
    }
}
