use postgrab_core::{
    is_valid_post_link, parse_link_list, post_from_document, post_json_url, BatchReport,
    LinkListError, Permalink, PermalinkError, PostRecord, PostResultKind,
};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn permalink_segments_are_split() {
    let post = PostRecord::new(json!({ "permalink": "/r/test/comments/abc/My_Title/" }));
    let permalink = post.permalink().unwrap();
    assert_eq!(
        permalink,
        Permalink {
            collection: "test".into(),
            post_id: "abc".into(),
            title: "My_Title".into(),
        }
    );
    assert_eq!(permalink.folder_name(), "abc_My_Title");
}

#[test]
fn absolute_permalinks_are_accepted() {
    let permalink =
        Permalink::parse("https://www.reddit.com/r/rust/comments/xyz/some_title/").unwrap();
    assert_eq!(permalink.collection, "rust");
    assert_eq!(permalink.title, "some_title");
}

#[test]
fn malformed_and_missing_permalinks_are_errors() {
    assert_eq!(
        PostRecord::new(json!({})).permalink(),
        Err(PermalinkError::Missing)
    );
    assert!(matches!(
        Permalink::parse("/user/someone/"),
        Err(PermalinkError::Malformed(_))
    ));
}

#[test]
fn single_post_document_is_unwrapped() {
    let document = json!([
        { "kind": "Listing", "data": { "children": [ { "kind": "t3", "data": { "name": "t3_abc" } } ] } },
        { "kind": "Listing", "data": { "children": [] } }
    ]);
    let post = post_from_document(&document).unwrap();
    assert_eq!(post.fullname(), Some("t3_abc"));
    assert_eq!(post_from_document(&json!({ "data": {} })), None);
}

#[test]
fn json_suffix_is_added_once() {
    assert_eq!(
        post_json_url("https://www.reddit.com/r/a/comments/b/c/"),
        "https://www.reddit.com/r/a/comments/b/c/.json"
    );
    assert_eq!(
        post_json_url("https://www.reddit.com/r/a/comments/b/c/.json"),
        "https://www.reddit.com/r/a/comments/b/c/.json"
    );
}

#[test]
fn post_links_are_validated() {
    assert!(is_valid_post_link("https://www.reddit.com/r/rust/comments/abc123/"));
    assert!(is_valid_post_link("http://reddit.com/r/rust/comments/abc123/title/"));
    assert!(!is_valid_post_link("https://www.reddit.com/r/rust/"));
    assert!(!is_valid_post_link("https://example.com/r/rust/comments/abc/"));
}

#[test]
fn link_list_skips_blanks_and_duplicates() {
    let raw = "https://www.reddit.com/r/a/comments/1/x/\n\n  https://www.reddit.com/r/b/comments/2/y/ \nhttps://www.reddit.com/r/a/comments/1/x/\n";
    assert_eq!(
        parse_link_list(raw).unwrap(),
        vec![
            "https://www.reddit.com/r/a/comments/1/x/".to_string(),
            "https://www.reddit.com/r/b/comments/2/y/".to_string(),
        ]
    );
}

#[test]
fn one_bad_line_rejects_the_list() {
    let raw = "https://www.reddit.com/r/a/comments/1/x/\nnot a link\n";
    assert_eq!(
        parse_link_list(raw),
        Err(LinkListError::InvalidLink {
            line: 2,
            link: "not a link".into()
        })
    );
    assert_eq!(parse_link_list(" \n"), Err(LinkListError::Empty));
}

#[test]
fn batch_report_tallies_results() {
    let mut report = BatchReport::default();
    report.record(PostResultKind::Saved);
    report.record(PostResultKind::Saved);
    report.record(PostResultKind::Skipped);
    report.record(PostResultKind::Failed);
    assert_eq!(report.total(), 4);
    assert_eq!(report.to_string(), "4 posts: 2 saved, 1 skipped, 1 failed");
}
