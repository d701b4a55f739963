use action_locator::{ElementResolver, LocatorConfig};
use action_primitives::fake::{FakeNode, FakePage, PageCall};
use action_primitives::{ActionExecutor, Tempo};
use browser_tools::{ToolBox, ToolContext, ToolError};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_test::{assert_err, assert_ok};

fn toolbox(page: &Arc<FakePage>, tempo: Tempo, dir: &Path) -> ToolBox {
    let resolver = ElementResolver::new(
        ActionExecutor::new(page.clone(), tempo),
        LocatorConfig::default(),
    );
    ToolBox::new(ToolContext::new(resolver, dir))
}

fn login_page() -> Vec<FakeNode> {
    vec![
        FakeNode::new("div").text("Sign up today"),
        FakeNode::new("input").id("email").attr("type", "email"),
        FakeNode::new("button").id("go").text("Sign in"),
        FakeNode::new("a").attr("href", "/home").text("Home"),
        FakeNode::new("span").attr("role", "button").text("Menu"),
    ]
}

#[tokio::test(start_paused = true)]
async fn lists_the_six_builtin_tools() {
    let page = Arc::new(FakePage::new(vec![]));
    let tools = toolbox(&page, Tempo::instant(), Path::new("."));

    let names: Vec<String> = tools.definitions().into_iter().map(|d| d.name).collect();
    assert_eq!(
        names,
        vec![
            "open_url",
            "take_screenshot",
            "find_and_click_element",
            "fill_input",
            "get_page_structure",
            "wait_and_verify",
        ]
    );

    let fill = tools.get("fill_input").unwrap();
    assert_eq!(fill.definition().required_params(), vec!["selectors", "value"]);
}

#[tokio::test(start_paused = true)]
async fn unknown_tool_and_bad_params_never_touch_the_page() {
    let page = Arc::new(FakePage::new(login_page()));
    let tools = toolbox(&page, Tempo::instant(), Path::new("."));

    let err = assert_err!(tools.call("hover", json!({})).await);
    assert!(matches!(err, ToolError::NotFound(ref name) if name == "hover"));

    let err = assert_err!(tools.call("fill_input", json!({ "value": "x" })).await);
    assert_eq!(err.kind(), "invalid_params");

    let err = assert_err!(tools.call("open_url", json!("https://example.com")).await);
    assert_eq!(err.kind(), "invalid_params");

    let err = assert_err!(tools.call("open_url", json!({ "url": "not a url" })).await);
    assert_eq!(err.kind(), "invalid_params");

    assert!(page.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn open_url_navigates_then_settles() {
    let page = Arc::new(
        FakePage::new(vec![]).with_route("https://example.com/", login_page()),
    );
    let tools = toolbox(&page, Tempo::default(), Path::new("."));

    let started = Instant::now();
    let result = assert_ok!(tools.call("open_url", json!({ "url": "https://example.com" })).await);
    assert!(started.elapsed() >= Duration::from_millis(3000));
    assert_eq!(result, json!({ "success": true, "url": "https://example.com/" }));
    assert_eq!(
        page.calls(),
        vec![PageCall::Navigate("https://example.com/".into())]
    );
}

#[tokio::test]
async fn screenshot_is_written_as_png() {
    let dir = tempfile::tempdir().unwrap();
    let shots = dir.path().join("shots");
    let page = Arc::new(FakePage::new(vec![]));
    let tools = toolbox(&page, Tempo::instant(), &shots);

    let result = assert_ok!(
        tools
            .call("take_screenshot", json!({ "target_element": "login form", "inline": true }))
            .await
    );

    let file_path = result["file_path"].as_str().unwrap();
    let name = Path::new(file_path).file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("screenshot-") && name.ends_with(".png"));
    assert_eq!(result["bytes"], 8);
    assert_eq!(result["target_element"], "login form");
    assert_eq!(result["image_base64"], "iVBORw0KGgo=");

    let written = std::fs::read(file_path).unwrap();
    assert_eq!(&written[..4], &[0x89, b'P', b'N', b'G']);
}

#[tokio::test]
async fn screenshot_without_inline_omits_image() {
    let dir = tempfile::tempdir().unwrap();
    let page = Arc::new(FakePage::new(vec![]));
    let tools = toolbox(&page, Tempo::instant(), dir.path());

    let result = assert_ok!(tools.call("take_screenshot", json!({})).await);
    assert!(result.get("image_base64").is_none());
    assert!(result.get("target_element").is_none());
}

#[tokio::test(start_paused = true)]
async fn find_and_click_reports_strategy() {
    let page = Arc::new(FakePage::new(login_page()));
    let tools = toolbox(&page, Tempo::instant(), Path::new("."));

    let result = assert_ok!(
        tools
            .call("find_and_click_element", json!({ "targetText": "sign in" }))
            .await
    );
    assert_eq!(result["success"], true);
    assert_eq!(result["method"], "exact_text");
    assert_eq!(result["selector"], "button");
    assert!(result.get("error").is_none());
    assert_eq!(page.clicks().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn find_and_click_missing_target_is_element_not_found() {
    let page = Arc::new(FakePage::new(login_page()));
    let tools = toolbox(&page, Tempo::instant(), Path::new("."));

    let err = assert_err!(
        tools
            .call(
                "find_and_click_element",
                json!({ "target_text": "Nonexistent Button X", "wait_time": 50 })
            )
            .await
    );
    assert_eq!(err.kind(), "element_not_found");
    assert!(page.clicks().is_empty());
}

#[tokio::test(start_paused = true)]
async fn fill_input_types_into_first_working_candidate() {
    let page = Arc::new(FakePage::new(login_page()));
    let tools = toolbox(&page, Tempo::instant(), Path::new("."));

    let result = assert_ok!(
        tools
            .call(
                "fill_input",
                json!({ "selectors": ["#missing", "#email"], "value": "me@example.com" })
            )
            .await
    );
    assert_eq!(result["method"], "selector");
    assert_eq!(result["selector"], "#email");
    assert_eq!(page.value_of("email").as_deref(), Some("me@example.com"));

    let err = assert_err!(
        tools
            .call("fill_input", json!({ "selectors": [], "value": "x" }))
            .await
    );
    assert_eq!(err.kind(), "input_fill_failed");
}

#[tokio::test(start_paused = true)]
async fn page_structure_lists_interactive_elements() {
    let page = Arc::new(FakePage::new(login_page()));
    let tools = toolbox(&page, Tempo::instant(), Path::new("."));

    let result = assert_ok!(tools.call("get_page_structure", json!({})).await);
    assert_eq!(result["count"], 4);

    let entries = result["structure"].as_array().unwrap();
    let found: Vec<(&str, &str)> = entries
        .iter()
        .map(|e| (e["selector"].as_str().unwrap(), e["tag"].as_str().unwrap()))
        .collect();
    assert_eq!(
        found,
        vec![
            ("button", "button"),
            ("a", "a"),
            ("input", "input"),
            ("[role=\"button\"]", "span"),
        ]
    );
    assert_eq!(entries[2]["type"], "email");
    assert_eq!(entries[2]["id"], "email");
}

#[tokio::test(start_paused = true)]
async fn page_structure_search_flags_clickable_nodes() {
    let page = Arc::new(FakePage::new(login_page()));
    let tools = toolbox(&page, Tempo::instant(), Path::new("."));

    let result = assert_ok!(
        tools
            .call("get_page_structure", json!({ "searchTerm": "  SIGN " }))
            .await
    );
    assert_eq!(result["count"], 2);
    let entries = result["structure"].as_array().unwrap();
    assert_eq!(entries[0]["text"], "Sign up today");
    assert_eq!(entries[0]["clickable"], false);
    assert_eq!(entries[1]["tag"], "button");
    assert_eq!(entries[1]["clickable"], true);
    assert!(entries[1].get("selector").is_none());
}

#[tokio::test(start_paused = true)]
async fn wait_and_verify_matches_url_fragment() {
    let page = Arc::new(FakePage::new(vec![]).with_url("https://example.com/dashboard"));
    let tools = toolbox(&page, Tempo::instant(), Path::new("."));

    let result = assert_ok!(
        tools
            .call("wait_and_verify", json!({ "expected_url": "dashboard" }))
            .await
    );
    assert_eq!(
        result,
        json!({
            "current_url": "https://example.com/dashboard",
            "success": true,
            "matched": true
        })
    );
}

#[tokio::test(start_paused = true)]
async fn wait_and_verify_mismatch_is_reported_not_raised() {
    let page = Arc::new(FakePage::new(vec![]).with_url("https://example.com/login"));
    let tools = toolbox(&page, Tempo::instant(), Path::new("."));

    let started = Instant::now();
    let result = assert_ok!(
        tools
            .call(
                "wait_and_verify",
                json!({ "expectedUrl": "checkout", "waitTime": 500 })
            )
            .await
    );
    assert!(started.elapsed() >= Duration::from_millis(500));
    assert_eq!(result["success"], true);
    assert_eq!(result["matched"], false);
    assert_eq!(result["current_url"], "https://example.com/login");
}

#[tokio::test(start_paused = true)]
async fn wait_and_verify_without_expectation_just_waits() {
    let page = Arc::new(FakePage::new(vec![]).with_url("https://example.com/"));
    let tools = toolbox(&page, Tempo::instant(), Path::new("."));

    let started = Instant::now();
    let result = assert_ok!(tools.call("wait_and_verify", json!({})).await);
    assert!(started.elapsed() >= Duration::from_millis(3000));
    assert!(result["matched"].is_null());
    assert_eq!(result["current_url"], "https://example.com/");
}

#[tokio::test(start_paused = true)]
async fn concurrent_calls_run_one_at_a_time() {
    let page = Arc::new(
        FakePage::new(vec![])
            .with_route("https://a.example/", vec![])
            .with_route("https://b.example/", vec![]),
    );
    let tools = toolbox(&page, Tempo::default(), Path::new("."));

    let started = Instant::now();
    let (a, b) = tokio::join!(
        tools.call("open_url", json!({ "url": "https://a.example/" })),
        tools.call("open_url", json!({ "url": "https://b.example/" })),
    );
    assert_ok!(a);
    assert_ok!(b);
    assert!(started.elapsed() >= Duration::from_millis(6000));
    assert_eq!(
        page.calls(),
        vec![
            PageCall::Navigate("https://a.example/".into()),
            PageCall::Navigate("https://b.example/".into()),
        ]
    );
}
