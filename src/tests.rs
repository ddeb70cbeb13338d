//! Integration tests for palimpsest
//!
//! End-to-end scenarios exercising the whole pipeline through the public
//! API, from raw markup to annotated output.

#[cfg(test)]
mod integration_tests {
    use crate::*;

    const ARCHIVED_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="description" content="A page about foxes">
<link rel="stylesheet" href="site.css">
<title>Foxes</title>
</head>
<body>
<div id="wm-ipp">Wayback Machine toolbar</div>
<h1>All about foxes</h1>
<p>The quick fox jumps over the lazy dog</p>
<p>Foxes are small omnivorous mammals</p>
<img src="https://web.archive.org/web/20200101000000im_/https://example.com/fox.png">
<p>This paragraph was later deleted entirely from the page</p>
</body>
</html>"#;

    const CURRENT_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="description" content="A page about red foxes">
<link rel="stylesheet" href="site.css">
<title>Foxes</title>
</head>
<body>
<h1>All about foxes</h1>
<p>The quick brown fox jumps over the lazy dog</p>
<p>Foxes are small omnivorous mammals</p>
<img src="https://example.com/fox.png">
<img src="https://example.com/den.png">
</body>
</html>"#;

    #[test]
    fn test_full_comparison_workflow() {
        let report =
            compare_documents(ARCHIVED_PAGE, CURRENT_PAGE, &CompareOptions::default()).unwrap();

        // The reworded sentence is fuzzy-paired and word-diffed
        assert!(report
            .current_html
            .contains("<span class=\"added\">brown</span>"));

        // The deleted paragraph is wrapped whole on the archived side
        assert!(report.archived_html.contains(
            "<span class=\"removed\">This paragraph was later deleted entirely from the page</span>"
        ));

        // The wayback toolbar never reaches the output
        assert!(!report.archived_html.contains("Wayback Machine toolbar"));

        // fox.png matches through the rewrite wrapper; den.png is new
        assert_eq!(report.stats.images_removed, 0);
        assert_eq!(report.stats.images_added, 1);
        assert!(report
            .current_html
            .contains("<span class=\"added\"><img src=\"https://example.com/den.png\"></span>"));

        // The metadata change shows up in the table fragment
        assert!(report
            .meta_table_html
            .contains("<span class=\"removed\">A page about foxes</span>"));
        assert!(report
            .meta_table_html
            .contains("<span class=\"added\">A page about red foxes</span>"));

        // Stylesheets carry over into the self-contained pages
        assert!(report
            .archived_html
            .contains("<link rel=\"stylesheet\" href=\"site.css\">"));
    }

    #[test]
    fn test_leaf_accounting_matches_extraction() {
        let report =
            compare_documents(ARCHIVED_PAGE, CURRENT_PAGE, &CompareOptions::default()).unwrap();
        let archived_doc = Document::parse(ARCHIVED_PAGE).unwrap();
        let current_doc = Document::parse(CURRENT_PAGE).unwrap();

        // Chrome stripping removes one archived leaf before alignment
        let archived_total = fingerprint::collect_text_leaves(&archived_doc).len() - 1;
        let current_total = fingerprint::collect_text_leaves(&current_doc).len();
        assert_eq!(report.stats.archived_leaves(), archived_total);
        assert_eq!(report.stats.current_leaves(), current_total);
    }

    #[test]
    fn test_similarity_is_full_only_for_exact_preservation() {
        let identical = compare_documents(CURRENT_PAGE, CURRENT_PAGE, &CompareOptions::default())
            .unwrap();
        assert_eq!(identical.similarity, 100);

        let drifted =
            compare_documents(ARCHIVED_PAGE, CURRENT_PAGE, &CompareOptions::default()).unwrap();
        assert!(drifted.similarity < 100);
    }

    #[test]
    fn test_threshold_zero_pairs_everything_in_gaps() {
        let archived = "<body><p>anchor</p><p>completely unrelated words</p></body>";
        let current = "<body><p>anchor</p><p>nothing shared here at all</p></body>";
        let loose = CompareOptions {
            similarity_threshold: 0.0,
            ..Default::default()
        };
        let report = compare_documents(archived, current, &loose).unwrap();
        assert_eq!(report.stats.fuzzy_paired, 1);
        assert_eq!(report.stats.leaves_removed, 0);
        assert_eq!(report.stats.leaves_added, 0);
    }

    #[test]
    fn test_annotated_output_reparses_cleanly() {
        // The rendered pages must be self-contained documents: writing
        // them out and feeding them back through the parser should work
        // and keep the annotations intact.
        let report =
            compare_documents(ARCHIVED_PAGE, CURRENT_PAGE, &CompareOptions::default()).unwrap();

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("current.diff.html");
        std::fs::write(&path, &report.current_html).unwrap();

        let reread = std::fs::read_to_string(&path).unwrap();
        let doc = Document::parse(&reread).unwrap();
        let serialized = doc.body_html();
        assert!(serialized.contains("<span class=\"added\">brown</span>"));
    }

    #[test]
    fn test_both_inputs_must_parse() {
        assert!(compare_documents("<p>fine</p>", "   ", &CompareOptions::default()).is_err());
        assert!(compare_documents("   ", "<p>fine</p>", &CompareOptions::default()).is_err());
    }
}
