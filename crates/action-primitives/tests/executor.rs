use action_primitives::fake::{FakeNode, FakePage, PageCall};
use action_primitives::{
    wait_for_node, ActionError, ActionExecutor, PageSession, Selector, Tempo,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_test::{assert_err, assert_ok};

async fn first_handle(page: &FakePage, css: &str) -> action_primitives::ElementHandle {
    page.query(&Selector::Css(css.to_string()))
        .await
        .unwrap()
        .remove(0)
        .handle
}

#[tokio::test(start_paused = true)]
async fn scroll_and_click_settles_around_the_click() {
    let page = Arc::new(FakePage::new(vec![FakeNode::new("button").id("go")]));
    let executor = ActionExecutor::new(page.clone(), Tempo::default());
    let handle = first_handle(&page, "#go").await;
    page.reset_calls();

    let started = Instant::now();
    assert_ok!(executor.scroll_and_click(&handle).await);
    assert!(started.elapsed() >= Duration::from_millis(1500));
    assert_eq!(
        page.calls(),
        vec![
            PageCall::ScrollIntoView(handle.to_string()),
            PageCall::Click(handle.to_string()),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn click_on_stale_handle_fails() {
    let page = Arc::new(FakePage::new(vec![FakeNode::new("button").id("go")]));
    let executor = ActionExecutor::new(page.clone(), Tempo::instant());
    let handle = first_handle(&page, "#go").await;

    page.navigate("https://example.com/next").await.unwrap();
    let err = assert_err!(executor.scroll_and_click(&handle).await);
    assert!(matches!(err, ActionError::StaleHandle(_)));
}

#[tokio::test(start_paused = true)]
async fn clear_and_type_replaces_value() {
    let page = Arc::new(FakePage::new(vec![
        FakeNode::new("input").id("email").attr("value", "old@example.com"),
    ]));
    let executor = ActionExecutor::new(page.clone(), Tempo::instant());
    let handle = first_handle(&page, "#email").await;

    assert_ok!(executor.clear_and_type(&handle, "new@example.com").await);
    assert_eq!(page.value_of("email").as_deref(), Some("new@example.com"));
}

#[tokio::test(start_paused = true)]
async fn wait_for_node_honours_visibility() {
    let page = FakePage::new(vec![FakeNode::new("input").id("pw").hidden()]);
    let selector = Selector::Css("#pw".into());

    let present = wait_for_node(
        &page,
        &selector,
        false,
        Duration::from_millis(100),
        Duration::from_millis(10),
    )
    .await;
    assert!(present.is_ok());

    let visible = wait_for_node(
        &page,
        &selector,
        true,
        Duration::from_millis(100),
        Duration::from_millis(10),
    )
    .await;
    assert!(matches!(visible, Err(ActionError::WaitTimeout(_))));
}

#[tokio::test(start_paused = true)]
async fn routes_replace_the_document_on_navigation() {
    let page = FakePage::new(vec![FakeNode::new("a").text("Login")]).with_route(
        "https://example.com/login",
        vec![FakeNode::new("input").id("user")],
    );

    page.navigate("https://example.com/login").await.unwrap();
    assert_eq!(page.current_url().await.unwrap(), "https://example.com/login");
    assert!(page.query_tag("a").await.unwrap().is_empty());
    assert_eq!(page.query_tag("input").await.unwrap().len(), 1);
}
