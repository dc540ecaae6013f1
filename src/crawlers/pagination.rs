use serde::{Deserialize, Serialize};

/// How the crawler reaches a numbered search-results page.
///
/// The results page only shows a sliding window of page buttons, so a
/// distant page is reached by clicking `first_jump`, then every `step`-th
/// page after it, and finally the page itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationPolicy {
    /// First intermediate button clicked on the way to a later page
    pub first_jump: u32,

    /// Distance between successive intermediate buttons
    pub step: u32,

    /// XPath of a page button; `{page}` is replaced by the page number
    pub click_xpath: String,

    /// CSS selector of the highlighted page button
    pub selected_page_css: String,
}

impl Default for PaginationPolicy {
    fn default() -> Self {
        Self {
            first_jump: 5,
            step: 2,
            click_xpath: "//*[@id='MainCol']/div[2]/div/div[1]//*[text()={page}]".to_string(),
            selected_page_css: "button.page.selected".to_string(),
        }
    }
}

impl PaginationPolicy {
    /// Page buttons to click, in order, to land on `page_index`
    pub fn click_path(&self, page_index: u32) -> Vec<u32> {
        let mut path = Vec::new();
        let mut jump = self.first_jump;
        // A zero step would never reach the target
        let step = self.step.max(1);
        while page_index > jump {
            path.push(jump);
            jump += step;
        }
        path.push(page_index);
        path
    }

    /// XPath of the button for `page`
    pub fn click_target(&self, page: u32) -> String {
        self.click_xpath.replace("{page}", &page.to_string())
    }
}
