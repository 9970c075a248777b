//! Shared fixtures: a small documentation site served by wiremock

use doc_taxonomy::config::Config;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Wraps content in a page with navigation chrome around it
pub fn page(title: &str, main: &str) -> String {
    format!(
        r#"<html><head><title>{}</title></head><body>
        <nav><a href="/">Home</a></nav>
        <main>{}</main>
        <footer><p>Copyright Example Corp. All rights reserved.</p></footer>
        </body></html>"#,
        title, main
    )
}

pub const ACCOUNT_SECTION: &str = r#"
    <h2>Account Settings</h2>
    <p>Account settings hold your profile details and sign-in preferences for the whole workspace.</p>
    <h3>Change Username</h3>
    <p>Change username from the profile tab. A username must be unique across the workspace and can be changed once a month.</p>
    <h3>Privacy Settings</h3>
    <p>Privacy settings control who can see your profile, your activity history and the teams you belong to in the directory.</p>
"#;

pub const BILLING_SECTION: &str = r#"
    <h2>Billing</h2>
    <p>Billing shows invoices and the payment method on file. Invoices are issued on the first day of each month.</p>
"#;

/// Seed linking to three pages; two of them document Account Settings
pub async fn mount_docs_site(server: &MockServer) {
    let seed = page(
        "Documentation",
        r#"<h1>Product Documentation</h1>
        <p>This documentation explains every part of the product, from the first login to the
        administration of large workspaces with many teams.</p>
        <ul>
          <li><a href="/account">Account</a></li>
          <li><a href="/profile">Profile</a></li>
          <li><a href="/billing">Billing</a></li>
        </ul>"#,
    );

    serve(server, "/", seed).await;
    serve(server, "/account", page("Account", ACCOUNT_SECTION)).await;
    serve(server, "/profile", page("Profile", ACCOUNT_SECTION)).await;
    serve(server, "/billing", page("Billing", BILLING_SECTION)).await;
}

/// Serves `html` as text/html at `route`
pub async fn serve(server: &MockServer, route: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html, "text/html"))
        .mount(server)
        .await;
}

/// Fast, permissive configuration for local servers
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.crawler.max_depth = 2;
    config.crawler.max_pages_per_site = 10;
    config.crawler.politeness_delay_ms = 0;
    config.crawler.request_timeout_ms = 5_000;
    config.crawler.site_budget_ms = 30_000;
    config.user_agent.crawler_name = "TestBot".to_string();
    config
}

pub fn seed_url(server: &MockServer) -> String {
    format!("{}/", server.uri())
}
