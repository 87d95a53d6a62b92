//! Integration tests against a live Chrome.
//!
//! These require Chrome running with remote debugging on port 9333:
//!
//! ```bash
//! google-chrome --headless=new --remote-debugging-port=9333 &
//! cargo test --test integration_test -- --ignored --nocapture
//! ```

use pageground::{Browser, BrowserConfig, GroundingConfig, ToolStatus, UNBOUNDED_VIEWPORT};

fn test_config() -> BrowserConfig {
    BrowserConfig {
        debug_port: 9333,
        ..Default::default()
    }
}

/// A small page with one interactive and one text element.
const FIXTURE: &str = "data:text/html,<html><body>\
<button id='submit'>Submit</button>\
<p>Some visible paragraph text.</p>\
<a id='far' href='/away' style='position:absolute;top:9000px'>Far away link</a>\
</body></html>";

#[tokio::test]
#[ignore = "requires Chrome with --remote-debugging-port=9333"]
async fn ground_returns_button_and_paragraph() {
    let browser = Browser::connect(test_config()).await.unwrap();
    let page = browser.open_page(Some(FIXTURE)).await.unwrap();
    page.wait_for_ready().await.unwrap();
    let tools = browser.tools(page.clone());

    let reply = tools.ground_and_screenshot().await;
    assert_eq!(reply.status, ToolStatus::Success, "{:?}", reply.message);

    let data = reply.data.unwrap();
    let elements = data["elements"].as_array().unwrap().clone();
    assert_eq!(elements.len(), 2);
    assert_eq!(elements[0]["index"], 0);
    assert_eq!(elements[0]["tag"], "button");
    assert_eq!(elements[0]["is_interactive"], true);
    assert_eq!(elements[0]["text"], "Submit");
    assert_eq!(elements[1]["index"], 1);
    assert_eq!(elements[1]["tag"], "p");
    assert_eq!(elements[1]["is_interactive"], false);

    // PNG magic bytes after base64 decode.
    use base64::Engine as _;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(data["screenshot"].as_str().unwrap())
        .unwrap();
    assert_eq!(&bytes[..4], &[0x89, b'P', b'N', b'G']);

    // Cleanup property: no overlay nodes remain after the call.
    let dom = tools.read_dom().await;
    let html = dom.data.unwrap()["dom_content"].as_str().unwrap().to_string();
    assert!(!html.contains("pageground-overlay"));

    browser.close_page(&page).await.unwrap();
}

#[tokio::test]
#[ignore = "requires Chrome with --remote-debugging-port=9333"]
async fn viewport_expansion_controls_offscreen_inclusion() {
    let browser = Browser::connect(test_config()).await.unwrap();
    let page = browser.open_page(Some(FIXTURE)).await.unwrap();
    page.wait_for_ready().await.unwrap();
    let tools = browser.tools(page.clone());

    let visible_only = tools
        .ground_with(&GroundingConfig {
            viewport_expansion: 0,
            ..Default::default()
        })
        .await;
    let visible_count = visible_only.data.unwrap()["elements"]
        .as_array()
        .unwrap()
        .len();

    let unbounded = tools
        .ground_with(&GroundingConfig {
            viewport_expansion: UNBOUNDED_VIEWPORT,
            ..Default::default()
        })
        .await;
    let unbounded_count = unbounded.data.unwrap()["elements"]
        .as_array()
        .unwrap()
        .len();

    // The absolutely-positioned link at y=9000 only shows up unbounded.
    assert_eq!(unbounded_count, visible_count + 1);

    browser.close_page(&page).await.unwrap();
}

#[tokio::test]
#[ignore = "requires Chrome with --remote-debugging-port=9333"]
async fn overlay_boxes_land_on_returned_geometry() {
    let browser = Browser::connect(test_config()).await.unwrap();
    let page = browser.open_page(Some(FIXTURE)).await.unwrap();
    page.wait_for_ready().await.unwrap();
    let tools = browser.tools(page.clone());

    let reply = tools.ground_and_screenshot().await;
    assert_eq!(reply.status, ToolStatus::Success, "{:?}", reply.message);
    let data = reply.data.unwrap();

    use base64::Engine as _;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(data["screenshot"].as_str().unwrap())
        .unwrap();
    let img = image::load_from_memory(&bytes).unwrap().to_rgba8();

    // Element 0 draws the first palette color (tomato). Sample the
    // midpoint of the box's top border in the decoded screenshot.
    let bbox = &data["elements"][0]["bounding_box"];
    let x = (bbox["x"].as_f64().unwrap() + bbox["width"].as_f64().unwrap() / 2.0) as u32;
    let y = (bbox["y"].as_f64().unwrap() + 1.0) as u32;
    let border = img.get_pixel(x, y);
    assert!(
        border[0] > 200 && border[1] < 160 && border[2] < 160,
        "expected tomato border at ({}, {}), got {:?}",
        x,
        y,
        border
    );

    // Well away from every box the page background is plain white.
    let background = img.get_pixel(img.width() - 2, img.height() - 2);
    assert_ne!(border, background);

    browser.close_page(&page).await.unwrap();
}

#[tokio::test]
#[ignore = "requires Chrome with --remote-debugging-port=9333"]
async fn repeated_grounding_is_idempotent() {
    let browser = Browser::connect(test_config()).await.unwrap();
    let page = browser.open_page(Some(FIXTURE)).await.unwrap();
    page.wait_for_ready().await.unwrap();
    let tools = browser.tools(page.clone());

    let first = tools.ground_and_screenshot().await.data.unwrap();
    let second = tools.ground_and_screenshot().await.data.unwrap();
    assert_eq!(first["elements"], second["elements"]);

    browser.close_page(&page).await.unwrap();
}

#[tokio::test]
#[ignore = "requires Chrome with --remote-debugging-port=9333"]
async fn grounding_a_closed_page_reports_error_status() {
    let browser = Browser::connect(test_config()).await.unwrap();
    let page = browser.open_page(None).await.unwrap();
    let tools = browser.tools(page.clone());

    browser.close_page(&page).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    let reply = tools.ground_and_screenshot().await;
    assert_eq!(reply.status, ToolStatus::Error);
    assert!(reply.message.is_some());
}

#[tokio::test]
#[ignore = "requires Chrome with --remote-debugging-port=9333"]
async fn simple_tools_report_uniform_status() {
    let browser = Browser::connect(test_config()).await.unwrap();
    let page = browser.open_page(Some(FIXTURE)).await.unwrap();
    page.wait_for_ready().await.unwrap();
    let tools = browser.tools(page.clone());

    let reply = tools.click("#submit").await;
    assert_eq!(reply.status, ToolStatus::Success);

    let reply = tools.press_enter().await;
    assert_eq!(reply.status, ToolStatus::Success);

    let reply = tools.scroll(0.0, 200.0).await;
    assert_eq!(reply.status, ToolStatus::Success);

    let reply = tools.read_dom().await;
    assert_eq!(reply.status, ToolStatus::Success);
    assert!(
        reply.data.unwrap()["dom_content"]
            .as_str()
            .unwrap()
            .contains("Submit")
    );

    browser.close_page(&page).await.unwrap();
}
