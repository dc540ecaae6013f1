use super::crawler::BrowserSession;
use crate::error::{Error, Result};
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{Map, Value, json};

impl BrowserSession for Client {
    async fn goto(&mut self, url: &str) -> Result<()> {
        Client::goto(self, url).await?;
        Ok(())
    }

    async fn source(&mut self) -> Result<String> {
        Ok(Client::source(self).await?)
    }

    async fn click_xpath(&mut self, xpath: &str) -> Result<()> {
        self.find(Locator::XPath(xpath)).await?.click().await?;
        Ok(())
    }

    async fn fill_xpath(&mut self, xpath: &str, text: &str) -> Result<()> {
        self.find(Locator::XPath(xpath)).await?.send_keys(text).await?;
        Ok(())
    }

    async fn clear_xpath(&mut self, xpath: &str) -> Result<()> {
        self.find(Locator::XPath(xpath)).await?.clear().await?;
        Ok(())
    }

    async fn text_xpath(&mut self, xpath: &str) -> Result<String> {
        Ok(self.find(Locator::XPath(xpath)).await?.text().await?)
    }

    async fn current_url(&mut self) -> Result<String> {
        Ok(Client::current_url(self).await?.to_string())
    }

    async fn switch_to_newest_window(&mut self) -> Result<()> {
        let newest = self
            .windows()
            .await?
            .pop()
            .ok_or_else(|| Error::MissingElement("browser window".to_string()))?;
        self.switch_to_window(newest).await?;
        Ok(())
    }
}

/// Chrome capabilities, optionally without a visible window
fn capabilities(headless: bool) -> Map<String, Value> {
    let mut args = vec!["--disable-gpu", "--window-size=1400,1200"];
    if headless {
        args.push("--headless");
    }
    let mut caps = Map::new();
    caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
    caps
}

/// Connects to the WebDriver instance, trying common local ports when the
/// configured one is unreachable
pub async fn connect(webdriver_url: &str, headless: bool) -> Result<Client> {
    let mut builder = ClientBuilder::native();
    builder.capabilities(capabilities(headless));

    let first_error = match builder.connect(webdriver_url).await {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", webdriver_url);
            return Ok(client);
        }
        Err(e) => {
            ::log::error!("Failed to connect to WebDriver at {}: {}", webdriver_url, e);
            e
        }
    };

    let fallback_urls = [
        "http://localhost:9515", // ChromeDriver default
        "http://localhost:4444", // Selenium / geckodriver default
        "http://127.0.0.1:4444",
    ];

    for url in fallback_urls.iter() {
        if *url == webdriver_url {
            continue;
        }

        ::log::info!("Trying fallback WebDriver URL: {}", url);
        if let Ok(client) = builder.connect(url).await {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Ok(client);
        }
    }

    ::log::error!(
        "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
    );
    Err(Error::Session(first_error))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_flag_reaches_chrome_args() {
        let caps = capabilities(true);
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(args.iter().any(|a| a == "--headless"));

        let caps = capabilities(false);
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(!args.iter().any(|a| a == "--headless"));
    }
}
