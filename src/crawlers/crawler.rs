use crate::error::Result;

/// The browser commands the crawl controller and the discoverer rely on.
///
/// Elements are addressed by XPath. Implemented for a fantoccini WebDriver
/// client in `web`; tests drive the crawler with an in-memory fake.
#[allow(async_fn_in_trait)]
pub trait BrowserSession {
    /// Navigate the current window to `url`
    async fn goto(&mut self, url: &str) -> Result<()>;

    /// HTML source of the current page
    async fn source(&mut self) -> Result<String>;

    /// Click the first element matching `xpath`
    async fn click_xpath(&mut self, xpath: &str) -> Result<()>;

    /// Type `text` into the first element matching `xpath`
    async fn fill_xpath(&mut self, xpath: &str, text: &str) -> Result<()>;

    /// Clear the first input matching `xpath`
    async fn clear_xpath(&mut self, xpath: &str) -> Result<()>;

    /// Rendered text of the first element matching `xpath`
    async fn text_xpath(&mut self, xpath: &str) -> Result<String>;

    async fn current_url(&mut self) -> Result<String>;

    /// Focus the most recently opened window
    async fn switch_to_newest_window(&mut self) -> Result<()>;
}
