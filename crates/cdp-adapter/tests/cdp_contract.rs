//! Contract tests against a real Chromium binary. Ignored by default because
//! they require Chrome/Chromium on the host machine.

use std::env;

use action_primitives::{ActionError, PageSession, Selector};
use cdp_adapter::{CdpConfig, ChromiumBrowser};

fn contract_enabled() -> bool {
    env::var("PAGEPILOT_CDP_CONTRACT")
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

const FORM_PAGE: &str = "data:text/html,<html><body>\
<button id='go' onclick=\"document.title='clicked'\">Go</button>\
<input id='email' value='old'>\
<div style='display:none' id='hidden'>Hidden</div>\
</body></html>";

#[test]
fn browser_section_parses_from_yaml() {
    let cfg: CdpConfig = serde_yaml::from_str(
        "debugger_url: http://localhost:9333\nheadless: false\n",
    )
    .unwrap();
    assert_eq!(cfg.debugger_url, "http://localhost:9333");
    assert!(!cfg.headless);
    assert!(!cfg.launch);
    assert_eq!(cfg.navigation_timeout_ms, 30_000);
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires Chrome/Chromium; set PAGEPILOT_CDP_CONTRACT=1"]
async fn contract_query_click_and_type() {
    if !contract_enabled() {
        eprintln!("skipping CDP contract test (PAGEPILOT_CDP_CONTRACT not enabled)");
        return;
    }

    let cfg = CdpConfig {
        launch: true,
        ..CdpConfig::default()
    };
    let browser = ChromiumBrowser::start(&cfg).await.expect("browser starts");
    let page = browser.page().await.expect("page available");

    page.navigate(FORM_PAGE).await.expect("navigate succeeds");

    let buttons = page.query_tag("button").await.expect("query buttons");
    assert_eq!(buttons.len(), 1);
    assert_eq!(buttons[0].text_content.trim(), "Go");

    let hidden = page
        .query(&Selector::Css("#hidden".into()))
        .await
        .expect("query hidden");
    assert!(!hidden[0].visible);

    let by_xpath = page
        .query(&Selector::XPath("//*[contains(text(), 'Go')]".into()))
        .await
        .expect("xpath query");
    assert_eq!(by_xpath[0].handle, buttons[0].handle);

    page.scroll_into_view(&buttons[0].handle)
        .await
        .expect("scroll");
    page.click(&buttons[0].handle).await.expect("click");
    let title = page
        .evaluate("document.title")
        .await
        .expect("evaluate title");
    assert_eq!(title, serde_json::json!("clicked"));

    let input = page
        .query(&Selector::Css("#email".into()))
        .await
        .expect("query input")
        .remove(0);
    page.focus(&input.handle).await.expect("focus");
    page.clear(&input.handle).await.expect("clear");
    page.type_text(&input.handle, "a@b.c", std::time::Duration::ZERO)
        .await
        .expect("type");
    let typed = page
        .query(&Selector::Css("#email".into()))
        .await
        .expect("requery input");
    assert_eq!(typed[0].attribute("value"), Some("a@b.c"));

    let err = page
        .query(&Selector::Css(r#"button:contains("Go")"#.into()))
        .await
        .unwrap_err();
    assert!(matches!(err, ActionError::InvalidSelector(_)));

    let found = page.query_text("  GO ", 100).await.expect("text query");
    assert!(found.iter().any(|n| n.tag == "button" && n.text_content == "Go"));
    assert!(found.iter().all(|n| n.text_content.chars().count() <= 100));

    page.navigate("about:blank").await.expect("navigate away");
    let stale = page.click(&buttons[0].handle).await.unwrap_err();
    assert!(matches!(stale, ActionError::StaleHandle(_)));

    let png = page.screenshot().await.expect("screenshot");
    assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);

    // close plus wait on the launched child process
    tokio::time::timeout(std::time::Duration::from_secs(15), browser.shutdown())
        .await
        .expect("launched browser exits on shutdown");
}
